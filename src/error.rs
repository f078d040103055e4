//! Error type for the few operations where absence or bad input is fatal.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    /// Indexed read of a key that is not present.
    #[error("key {key} not found")]
    KeyNotFound { key: String },
    /// Growth threshold must be finite and strictly positive.
    #[error("growth threshold must be finite and > 0, got {0}")]
    InvalidThreshold(f64),
}

pub type Result<T, E = MapError> = core::result::Result<T, E>;
