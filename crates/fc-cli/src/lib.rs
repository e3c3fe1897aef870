//! flatcut command line
//!
//! Reads a model file, flattens it through [`StepImporter`] and writes the
//! outline as SVG at its physical size.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use fc_cad::{BrepKernel, CadKernel};
use fc_core::export::{ExportError, save_manifest, save_svg};
use fc_core::{AlignmentOutcome, ImportError, ImportOptions, OptionsError, StepImporter};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "flatcut", about = "Flatten a CAD model into a 2D cut outline")]
pub struct Cli {
    /// Model file to import
    pub input: PathBuf,

    /// SVG output path (defaults to the input path with an .svg extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the payload manifest (RON) to this path
    #[arg(long)]
    pub payload: Option<PathBuf>,

    /// Import options file (RON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Curve discretization tolerance in model units
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Project onto the model's default plane instead of its largest face
    #[arg(long)]
    pub no_align: bool,

    /// Keep the model's Y axis pointing up
    #[arg(long)]
    pub no_flip: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Import options from the config file, overridden by flags
    pub fn import_options(&self) -> Result<ImportOptions, CliError> {
        let mut options = match &self.config {
            Some(path) => ImportOptions::load(path)?,
            None => ImportOptions::default(),
        };
        if let Some(tolerance) = self.tolerance {
            options.tolerance = tolerance;
        }
        if self.no_align {
            options.auto_align = false;
        }
        if self.no_flip {
            options.flip_y = false;
        }
        options.validate()?;
        Ok(options)
    }

    /// Where the SVG goes
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("svg"))
    }

    /// Default log filter for this invocation
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "fc_cli=debug,fc_core=debug,fc_cad=debug"
        } else {
            "fc_cli=info,fc_core=info,fc_cad=info"
        }
    }
}

/// Command line failures, each with its own exit code
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] OptionsError),

    #[error("Failed to read '{path}': {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Failed to write output: {0}")]
    Write(#[from] ExportError),
}

impl CliError {
    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 1,
            CliError::Read { .. } => 2,
            CliError::Import(_) => 3,
            CliError::Write(_) => 4,
        }
    }
}

/// Run one conversion with the reference kernel
pub fn run(cli: &Cli) -> Result<PathBuf, CliError> {
    run_with_kernel(cli, Arc::new(BrepKernel::new()))
}

/// Run one conversion with the given kernel, returning the SVG path
pub fn run_with_kernel(cli: &Cli, kernel: Arc<dyn CadKernel>) -> Result<PathBuf, CliError> {
    let options = cli.import_options()?;
    let raw_data = read_input(&cli.input)?;

    if !StepImporter::handles(&cli.input) {
        tracing::warn!(
            "{} is not a {} file ({}), trying anyway",
            cli.input.display(),
            StepImporter::LABEL,
            StepImporter::EXTENSIONS.join(", ")
        );
    }

    let importer = StepImporter::new(kernel, options);
    tracing::info!(
        "Importing {} with kernel '{}' at tolerance {}",
        cli.input.display(),
        importer.kernel().name(),
        importer.options().tolerance
    );
    let outcome = importer.try_import(&raw_data, &cli.input)?;

    match &outcome.alignment {
        AlignmentOutcome::Aligned { face_area, .. } => {
            tracing::info!("Aligned to largest face, area {:.3}", face_area)
        }
        AlignmentOutcome::Fallback(reason) => {
            tracing::info!("Projected onto default plane ({})", reason)
        }
    }

    let output = cli.output_path();
    save_svg(&outcome.payload, &output)?;
    tracing::info!("Wrote {}", output.display());

    if let Some(path) = &cli.payload {
        save_manifest(&outcome.payload, path)?;
        tracing::info!("Wrote payload manifest {}", path.display());
    }

    Ok(output)
}

fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| CliError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
