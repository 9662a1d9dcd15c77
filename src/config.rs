use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments parser for preparing a pothole dataset from YOLO
/// polygon labels.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing polygon label files (.txt)
    #[arg(short = 'l', long = "label_dir")]
    pub label_dir: PathBuf,

    /// Directory containing the annotated images; mask extraction is skipped
    /// when omitted
    #[arg(short = 'i', long = "image_dir")]
    pub image_dir: Option<PathBuf>,

    /// Output root directory
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Class id written to every emitted bounding box (single-class dataset)
    #[arg(long = "class_id", default_value_t = 0)]
    pub class_id: u32,

    /// Pixel connectivity used to split the rasterized mask into instances
    #[arg(long = "connectivity", value_enum, default_value = "eight")]
    pub connectivity: Connectivity,

    /// Rasterize each polygon into its own instance instead of merging
    /// touching polygons through connected-component labeling
    #[arg(long = "split_polygons")]
    pub split_polygons: bool,
}

// Connectivity mode for component labeling
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Connectivity {
    /// Edge-adjacent pixels only
    Four,
    /// Edge- and corner-adjacent pixels
    Eight,
}

impl From<Connectivity> for imageproc::region_labelling::Connectivity {
    fn from(value: Connectivity) -> Self {
        match value {
            Connectivity::Four => imageproc::region_labelling::Connectivity::Four,
            Connectivity::Eight => imageproc::region_labelling::Connectivity::Eight,
        }
    }
}
