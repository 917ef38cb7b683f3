//! Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TracerError>;

#[derive(Debug, Error)]
pub enum TracerError {
    /// A moving sphere needs two distinct, finite shutter times to interpolate between
    #[error("degenerate time interval [{time0}, {time1}] for moving sphere")]
    DegenerateTimeInterval { time0: f64, time1: f64 },

    #[error("invalid image settings: {0}")]
    InvalidImage(String),

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("object references unknown material `{0}`")]
    UnknownMaterial(String),

    #[error("render cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
