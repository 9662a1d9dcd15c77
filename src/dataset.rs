use dashmap::DashMap;
use indicatif::ProgressBar;
use log::{error, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Connectivity;
use crate::error::{PrepError, Result};
use crate::io::collect_image_files;
use crate::mask::extract_masks_and_boxes;
use crate::parse::read_label_file;
use crate::types::{InstanceMask, PixelBbox, ProcessingStats};
use crate::utils::{image_stem, resolve_label_path};

/// Key-aligned mappings produced by the aggregation pass: image stem to
/// instance masks and image stem to pixel boxes, index-aligned per key.
pub type DatasetMaps = (
    BTreeMap<String, Vec<InstanceMask>>,
    BTreeMap<String, Vec<PixelBbox>>,
);

/// Aggregate per-instance masks and boxes for every image under `image_dir`.
///
/// Each image is independent, so the batch is a parallel map; the returned
/// BTreeMaps sort keys so downstream artifacts are deterministic regardless
/// of scheduling. An image without a label file gets an empty entry and an
/// unreadable image is skipped; neither aborts the batch.
pub fn aggregate_dataset(
    image_dir: &Path,
    label_dir: &Path,
    connectivity: Connectivity,
    split_polygons: bool,
    stats: &ProcessingStats,
    pb: &ProgressBar,
) -> Result<DatasetMaps> {
    let image_files = collect_image_files(image_dir)?;
    pb.set_length(image_files.len() as u64);

    let masks_by_key: DashMap<String, Vec<InstanceMask>> = DashMap::new();
    let boxes_by_key: DashMap<String, Vec<PixelBbox>> = DashMap::new();

    image_files.par_iter().for_each(|image_path| {
        let outcome = process_image(
            image_path,
            label_dir,
            connectivity,
            split_polygons,
            &masks_by_key,
            &boxes_by_key,
            stats,
        );
        match outcome {
            Ok(()) => stats.increment_images(),
            Err(e @ PrepError::MissingLabelFile(_)) => {
                warn!("{}; recording an empty entry", e);
                stats.increment_missing_label();
            }
            Err(e @ PrepError::UnreadableImage { .. }) => {
                warn!("{}; skipping", e);
                stats.increment_unreadable_image();
            }
            Err(e) => {
                error!("Failed to process {}: {}", image_path.display(), e);
                stats.increment_failed();
            }
        }
        pb.inc(1);
    });
    pb.finish_with_message("Mask extraction complete");

    Ok((
        masks_by_key.into_iter().collect(),
        boxes_by_key.into_iter().collect(),
    ))
}

/// Process one image: probe its dimensions, parse its label file, extract
/// instances, store both under the image's stem.
fn process_image(
    image_path: &Path,
    label_dir: &Path,
    connectivity: Connectivity,
    split_polygons: bool,
    masks_by_key: &DashMap<String, Vec<InstanceMask>>,
    boxes_by_key: &DashMap<String, Vec<PixelBbox>>,
    stats: &ProcessingStats,
) -> std::result::Result<(), PrepError> {
    let key = image_stem(image_path).ok_or_else(|| PrepError::UnreadableImage {
        path: image_path.to_path_buf(),
        reason: "path has no usable stem".to_string(),
    })?;
    let label_path = resolve_label_path(label_dir, image_path)
        .expect("stem was resolved above");

    // Only the pixel dimensions are consulted; a header probe avoids
    // decoding the image.
    let (height, width) = match imagesize::size(image_path) {
        Ok(dim) => (dim.height as u32, dim.width as u32),
        Err(e) => {
            return Err(PrepError::UnreadableImage {
                path: image_path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    if !label_path.exists() {
        masks_by_key.insert(key.clone(), Vec::new());
        boxes_by_key.insert(key, Vec::new());
        return Err(PrepError::MissingLabelFile(label_path));
    }

    let (polygons, skipped) = read_label_file(&label_path)?;
    stats.add_skipped_lines(skipped);

    let (masks, boxes) =
        extract_masks_and_boxes(&polygons, height, width, connectivity.into(), split_polygons);

    masks_by_key.insert(key.clone(), masks);
    boxes_by_key.insert(key, boxes);
    Ok(())
}
