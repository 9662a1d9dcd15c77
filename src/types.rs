use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

// Supported image formats
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "dng", "jpeg", "jpg", "mpo", "png", "tif", "tiff", "webp", "pfm",
];

// A single polygon record from a label file: class id plus an ordered list of
// normalized (x, y) vertices, each in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonAnnotation {
    pub class_id: u32,
    pub points: Vec<(f64, f64)>,
}

/// A normalized YOLO detection box derived from a polygon's vertex extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBbox {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloBbox {
    /// Format as a label-file record: five space-separated fields, numeric
    /// values with exactly six digits after the decimal point.
    pub fn to_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// A pixel-space box in corner form, half-open on the max side:
/// `(x_min, y_min, x_max, y_max)` covers columns `x_min..x_max` and rows
/// `y_min..y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBbox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl PixelBbox {
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }
}

/// A binary instance mask matching the source image's (height, width).
/// Pixels are stored row-major, one byte per pixel, value 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl InstanceMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.data[(y as usize) * (self.width as usize) + (x as usize)] = value;
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Tight half-open box around the mask's foreground pixels, or None for
    /// an all-background mask.
    pub fn foreground_bbox(&self) -> Option<PixelBbox> {
        let (mut x_min, mut y_min) = (u32::MAX, u32::MAX);
        let (mut x_max, mut y_max) = (0u32, 0u32);
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) != 0 {
                    any = true;
                    x_min = x_min.min(x);
                    y_min = y_min.min(y);
                    x_max = x_max.max(x);
                    y_max = y_max.max(y);
                }
            }
        }
        if any {
            Some(PixelBbox {
                x_min,
                y_min,
                x_max: x_max + 1,
                y_max: y_max + 1,
            })
        } else {
            None
        }
    }
}

// Struct to hold processing statistics. Counters are atomic so the parallel
// per-image loop can share one instance.
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub images_processed: AtomicUsize,
    pub label_files_converted: AtomicUsize,
    pub lines_skipped: AtomicUsize,
    pub missing_label_files: AtomicUsize,
    pub unreadable_images: AtomicUsize,
    pub failed: AtomicUsize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_images(&self) {
        self.images_processed.fetch_add(1, Relaxed);
    }

    pub fn increment_converted(&self) {
        self.label_files_converted.fetch_add(1, Relaxed);
    }

    pub fn add_skipped_lines(&self, n: usize) {
        self.lines_skipped.fetch_add(n, Relaxed);
    }

    pub fn increment_missing_label(&self) {
        self.missing_label_files.fetch_add(1, Relaxed);
    }

    pub fn increment_unreadable_image(&self) {
        self.unreadable_images.fetch_add(1, Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Relaxed);
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Images processed: {}", self.images_processed.load(Relaxed));
        log::info!(
            "Label files converted: {}",
            self.label_files_converted.load(Relaxed)
        );
        log::info!(
            "Malformed lines skipped: {}",
            self.lines_skipped.load(Relaxed)
        );

        let missing = self.missing_label_files.load(Relaxed);
        let unreadable = self.unreadable_images.load(Relaxed);
        let failed = self.failed.load(Relaxed);
        if missing > 0 {
            log::warn!("Images without a label file: {}", missing);
        }
        if unreadable > 0 {
            log::warn!("Unreadable images skipped: {}", unreadable);
        }
        if failed > 0 {
            log::warn!("Failed images: {}", failed);
        }
    }
}
