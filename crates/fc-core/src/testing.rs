//! Scripted kernel for pipeline tests

use std::path::{Path, PathBuf};

use fc_cad::{
    BrepDocument, BrepKernel, CadError, CadKernel, CadModel, CadObject, CadResult, Edge,
    EdgeLoop, PlanarFace, ProjectionPlane,
};
use glam::DVec3;
use parking_lot::Mutex;

/// What the importer did to the kernel
#[derive(Debug, Default, Clone)]
pub struct Calls {
    /// Parsed paths, with whether the file existed and its content at parse time
    pub parsed: Vec<(PathBuf, bool, Vec<u8>)>,
    pub face_queries: usize,
    pub projections: Vec<ProjectionPlane>,
    pub released: usize,
}

#[derive(Debug, Default)]
struct Script {
    unavailable: bool,
    fail_parse: bool,
    fail_face_query: bool,
    fail_aligned_projection: bool,
}

/// Reference kernel over a fixed document, with switchable faults
pub struct ScriptedKernel {
    inner: BrepKernel,
    document: BrepDocument,
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

impl ScriptedKernel {
    pub fn new(document: BrepDocument) -> Self {
        Self {
            inner: BrepKernel::new(),
            document,
            script: Mutex::new(Script::default()),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn unavailable(self) -> Self {
        self.script.lock().unavailable = true;
        self
    }

    pub fn fail_parse(&self) {
        self.script.lock().fail_parse = true;
    }

    pub fn fail_face_query(&self) {
        self.script.lock().fail_face_query = true;
    }

    /// Fail every projection except onto the top-down plane
    pub fn fail_aligned_projection(&self) {
        self.script.lock().fail_aligned_projection = true;
    }

    /// Load the document directly, bypassing `parse_model`
    pub fn model(&self) -> CadModel {
        self.inner.load_document(self.document.clone())
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().clone()
    }

    /// Objects still held by the wrapped kernel
    pub fn live_objects(&self) -> usize {
        self.inner.object_count()
    }
}

impl CadKernel for ScriptedKernel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        !self.script.lock().unavailable
    }

    fn parse_model(&self, path: &Path) -> CadResult<CadModel> {
        let content = std::fs::read(path).ok();
        self.calls.lock().parsed.push((
            path.to_path_buf(),
            content.is_some(),
            content.unwrap_or_default(),
        ));
        if self.script.lock().fail_parse {
            return Err(CadError::Parse("scripted parse failure".into()));
        }
        Ok(self.model())
    }

    fn planar_faces(&self, object: &CadObject) -> CadResult<Vec<PlanarFace>> {
        self.calls.lock().face_queries += 1;
        if self.script.lock().fail_face_query {
            return Err(CadError::OperationFailed("scripted face query failure".into()));
        }
        self.inner.planar_faces(object)
    }

    fn project_onto_plane(
        &self,
        object: &CadObject,
        plane: &ProjectionPlane,
    ) -> CadResult<Vec<EdgeLoop>> {
        self.calls.lock().projections.push(*plane);
        if self.script.lock().fail_aligned_projection && *plane != ProjectionPlane::top_down() {
            return Err(CadError::OperationFailed("scripted projection failure".into()));
        }
        self.inner.project_onto_plane(object, plane)
    }

    fn discretize(&self, edge: &Edge, tolerance: f64) -> CadResult<Vec<DVec3>> {
        self.inner.discretize(edge, tolerance)
    }

    fn release_model(&self, model: &CadModel) {
        self.calls.lock().released += 1;
        self.inner.release_model(model);
    }
}
