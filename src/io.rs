use glob::glob;
use log::info;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};
use crate::types::{InstanceMask, PixelBbox, IMG_FORMATS};

pub const MASKS_FILE: &str = "masks.bin";
pub const BOXES_FILE: &str = "boxes.bin";

/// Create an output directory if absent. Existing directories (and their
/// contents) are left alone so reruns stay idempotent.
pub fn create_output_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|source| PrepError::InvalidOutputPath {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

/// Collect all `.txt` label files directly under `label_dir`, sorted for a
/// deterministic processing order.
pub fn collect_label_files(label_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.txt", label_dir.display());
    let mut files: Vec<_> = glob(&pattern)
        .map_err(|e| PrepError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    Ok(files)
}

/// Collect all image files directly under `image_dir`, sorted for a
/// deterministic processing order.
pub fn collect_image_files(image_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for ext in IMG_FORMATS {
        let pattern = format!("{}/*.{}", image_dir.display(), ext);
        let entries = glob(&pattern)
            .map_err(|e| PrepError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
        files.extend(entries.filter_map(|entry| entry.ok()));
    }
    files.sort();
    Ok(files)
}

/// Persist the two key-aligned dataset mappings under `output_dir` as
/// `masks.bin` and `boxes.bin`. Keys are image stems; the BTreeMaps keep the
/// serialized key order deterministic.
pub fn write_dataset_artifacts(
    masks: &BTreeMap<String, Vec<InstanceMask>>,
    boxes: &BTreeMap<String, Vec<PixelBbox>>,
    output_dir: &Path,
) -> Result<()> {
    create_output_directory(output_dir)?;

    let masks_path = output_dir.join(MASKS_FILE);
    let writer = BufWriter::new(File::create(&masks_path)?);
    bincode::serialize_into(writer, masks)?;
    info!("Wrote {} mask entries to {}", masks.len(), masks_path.display());

    let boxes_path = output_dir.join(BOXES_FILE);
    let writer = BufWriter::new(File::create(&boxes_path)?);
    bincode::serialize_into(writer, boxes)?;
    info!("Wrote {} box entries to {}", boxes.len(), boxes_path.display());

    Ok(())
}

/// Load both dataset mappings back from `output_dir`. Consumers recover, per
/// key, index-aligned masks and boxes.
pub fn read_dataset_artifacts(
    output_dir: &Path,
) -> Result<(
    BTreeMap<String, Vec<InstanceMask>>,
    BTreeMap<String, Vec<PixelBbox>>,
)> {
    let reader = BufReader::new(File::open(output_dir.join(MASKS_FILE))?);
    let masks = bincode::deserialize_from(reader)?;
    let reader = BufReader::new(File::open(output_dir.join(BOXES_FILE))?);
    let boxes = bincode::deserialize_from(reader)?;
    Ok((masks, boxes))
}
