//! Pothole dataset preparation
//!
//! This library converts YOLO polygon (segmentation) label files into the two
//! artifacts the downstream training workflows need: normalized bounding-box
//! label files for object detection, and per-instance binary masks with
//! pixel-space boxes for a promptable segmentation fine-tune.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod mask;
pub mod parse;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, Connectivity};
pub use conversion::{bbox_from_polygon, convert_label_dir, convert_label_file};
pub use dataset::{aggregate_dataset, DatasetMaps};
pub use error::{PrepError, Result};
pub use io::{read_dataset_artifacts, write_dataset_artifacts};
pub use mask::{extract_masks_and_boxes, rasterize_polygons};
pub use parse::{parse_polygon_line, read_label_file};
pub use types::{InstanceMask, PixelBbox, PolygonAnnotation, ProcessingStats, YoloBbox};
