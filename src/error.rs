use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the preparation pipeline.
///
/// `MissingLabelFile` and `UnreadableImage` are per-image conditions: the
/// batch logs them and keeps going. `InvalidOutputPath` and `Serialize` are
/// fatal for the pass that hits them.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("no label file for image: {0}")]
    MissingLabelFile(PathBuf),

    #[error("unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("cannot create output path {path}: {source}")]
    InvalidOutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize dataset artifact: {0}")]
    Serialize(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;
