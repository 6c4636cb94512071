//! Error types for index construction and the data-loading boundary.
//!
//! Tree operations themselves are total; only record validation, configuration
//! and GeoJSON/I/O loading can fail.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LocateError>;

#[derive(Debug, Error)]
pub enum LocateError {
    /// A polygon record failed validation (too few ring points, non-finite coordinates, ...).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Input parsed as JSON but is not the expected GeoJSON shape.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationErrorWithContext(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
