//! SVG generation for path geometry

use glam::DVec2;

use crate::geometry::PathGeometry;

/// Build an SVG document for unit-space geometry drawn at `width × height` mm
pub fn geometry_to_svg(geometry: &PathGeometry, width: f64, height: f64) -> String {
    svg_document(geometry, width, height, None)
}

pub(super) fn svg_document(
    geometry: &PathGeometry,
    width: f64,
    height: f64,
    title: Option<&str>,
) -> String {
    let (w, h) = (format_number(width), format_number(height));
    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n"
    ));
    if let Some(title) = title {
        svg.push_str(&format!("  <title>{}</title>\n", xml_escape(title)));
    }
    svg.push_str(&format!(
        "  <path fill=\"none\" stroke=\"black\" stroke-width=\"0.1\" d=\"{}\"/>\n",
        path_data(geometry, DVec2::new(width, height))
    ));
    svg.push_str("</svg>\n");
    svg
}

/// `M`/`L` commands for every subpath, scaled by `size`
pub fn path_data(geometry: &PathGeometry, size: DVec2) -> String {
    let mut commands: Vec<String> = Vec::new();
    for subpath in geometry.subpaths() {
        for (i, point) in subpath.points().iter().enumerate() {
            let p = *point * size;
            let op = if i == 0 { 'M' } else { 'L' };
            commands.push(format!("{op}{} {}", format_number(p.x), format_number(p.y)));
        }
        if subpath.is_closed() {
            commands.push("Z".to_string());
        }
    }
    commands.join(" ")
}

/// Fixed six decimals, never `-0`
pub fn format_number(value: f64) -> String {
    let text = format!("{:.6}", value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Escape special XML characters
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
