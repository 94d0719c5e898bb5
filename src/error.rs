//! Error type shared by every generation stage.

use thiserror::Error;

/// Errors raised while building or exporting a map
#[derive(Debug, Error)]
pub enum MapError {
    /// A numeric argument is outside the range an operation accepts
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The Delaunay triangulation rejected an input point
    #[error("triangulation failed: {0}")]
    Triangulation(#[from] spade::InsertionError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl MapError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MapError::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
