use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tracker algorithm `{0}` (expected `kalman` or `template`)")]
    UnknownTracker(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no image frames found in {0}")]
    EmptyFrameSource(PathBuf),

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
