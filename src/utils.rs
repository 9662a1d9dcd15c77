use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .expect("progress template is valid")
            .progress_chars("#>-"),
    );
    pb
}

/// The image's base filename without extension, used as its dataset key.
pub fn image_stem(image_path: &Path) -> Option<String> {
    image_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
}

/// Resolve the label file for an image: same stem, `.txt` extension, under
/// `label_dir`.
pub fn resolve_label_path(label_dir: &Path, image_path: &Path) -> Option<PathBuf> {
    image_stem(image_path).map(|stem| label_dir.join(format!("{stem}.txt")))
}
