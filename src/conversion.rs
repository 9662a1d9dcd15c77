use indicatif::ProgressBar;
use log::error;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::io::{collect_label_files, create_output_directory};
use crate::parse::read_label_file;
use crate::types::{PolygonAnnotation, ProcessingStats, YoloBbox};
use crate::utils::create_progress_bar;

/// Derive a normalized YOLO box from a polygon's vertex extrema. The supplied
/// class id replaces the polygon's own (single-class dataset).
pub fn bbox_from_polygon(polygon: &PolygonAnnotation, class_id: u32) -> YoloBbox {
    let (x_min, y_min, x_max, y_max) = polygon.points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x_min, y_min, x_max, y_max), &(x, y)| {
            (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
        },
    );

    YoloBbox {
        class_id,
        x_center: (x_min + x_max) / 2.0,
        y_center: (y_min + y_max) / 2.0,
        width: x_max - x_min,
        height: y_max - y_min,
    }
}

/// Convert polygon records to bbox label-file text: one record per line,
/// newline-separated, no trailing newline after the last record.
pub fn convert_to_bbox_format(polygons: &[PolygonAnnotation], class_id: u32) -> String {
    polygons
        .iter()
        .map(|polygon| bbox_from_polygon(polygon, class_id).to_line())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert a single polygon label file into a bbox label file.
///
/// A file with zero valid records still produces an (empty) output file.
/// Returns the number of emitted records and the number of skipped lines.
pub fn convert_label_file(
    input: &Path,
    output: &Path,
    class_id: u32,
) -> std::io::Result<(usize, usize)> {
    let (polygons, skipped) = read_label_file(input)?;
    let bbox_data = convert_to_bbox_format(&polygons, class_id);

    let mut writer = BufWriter::new(File::create(output)?);
    writer.write_all(bbox_data.as_bytes())?;

    Ok((polygons.len(), skipped))
}

/// Convert every polygon label file under `label_dir` into a bbox label file
/// under `output_dir`, creating `output_dir` if absent.
pub fn convert_label_dir(
    label_dir: &Path,
    output_dir: &Path,
    class_id: u32,
    stats: &ProcessingStats,
    pb: &ProgressBar,
) -> Result<()> {
    create_output_directory(output_dir)?;

    let label_files = collect_label_files(label_dir)?;
    pb.set_length(label_files.len() as u64);

    label_files.par_iter().for_each(|input| {
        let output = output_dir.join(input.file_name().expect("label path has a file name"));
        match convert_label_file(input, &output, class_id) {
            Ok((_, skipped)) => {
                stats.increment_converted();
                stats.add_skipped_lines(skipped);
            }
            Err(e) => {
                error!("Failed to convert {}: {}", input.display(), e);
                stats.increment_failed();
            }
        }
        pb.inc(1);
    });
    pb.finish_with_message("Label conversion complete");

    Ok(())
}

/// Convenience wrapper used by tests and library consumers; drives
/// [`convert_label_dir`] with a hidden progress bar.
pub fn convert_label_dir_quiet(
    label_dir: &Path,
    output_dir: &Path,
    class_id: u32,
) -> Result<ProcessingStats> {
    let stats = ProcessingStats::new();
    let pb = create_progress_bar(0, "Labels");
    pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    convert_label_dir(label_dir, output_dir, class_id, &stats, &pb)?;
    Ok(stats)
}
