//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading failed (image decode, malformed data URI).
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// No usable font face was found.
    #[error("No usable font: {0}")]
    Font(String),

    /// Raster surface allocation failed.
    #[error("Canvas allocation failed: {0}")]
    Canvas(String),

    /// Encoding or PDF assembly failed.
    #[error("Export failed: {0}")]
    Export(String),
}
