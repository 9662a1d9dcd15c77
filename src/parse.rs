use log::warn;
use std::fs;
use std::path::Path;

use crate::types::PolygonAnnotation;

/// Parse one polygon label line: `class_id x1 y1 x2 y2 ... xn yn`, all
/// whitespace-separated floats with coordinates normalized to [0, 1].
///
/// Returns None for lines that fail the lenient-parsing policy: empty lines,
/// lines with a non-numeric token, lines with a negative class id, and lines
/// with fewer than 3 vertices. A trailing unpaired coordinate is ignored.
pub fn parse_polygon_line(line: &str) -> Option<PolygonAnnotation> {
    let mut fields = Vec::new();
    for token in line.split_whitespace() {
        fields.push(token.parse::<f64>().ok()?);
    }
    if fields.is_empty() {
        return None;
    }

    // A negative class id would saturate to 0 and masquerade as a valid
    // class; treat it as malformed instead.
    if fields[0] < 0.0 {
        return None;
    }
    let class_id = fields[0] as u32;
    let coords = &fields[1..];
    // Fewer than 6 coordinate values means fewer than 3 vertices.
    if coords.len() < 6 {
        return None;
    }

    let points = coords
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    Some(PolygonAnnotation { class_id, points })
}

/// Read a label file into its valid polygon records, counting dropped lines.
///
/// Malformed lines are a filtering rule, not an error; only the file read
/// itself can fail.
pub fn read_label_file(path: &Path) -> std::io::Result<(Vec<PolygonAnnotation>, usize)> {
    let content = fs::read_to_string(path)?;
    let mut polygons = Vec::new();
    let mut skipped = 0;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_polygon_line(line) {
            Some(polygon) => polygons.push(polygon),
            None => {
                warn!("Skipping malformed line in {}: {:?}", path.display(), line);
                skipped += 1;
            }
        }
    }
    Ok((polygons, skipped))
}
