//! Diagram error types.

use std::path::PathBuf;

/// Error raised while resolving or rendering a diagram.
///
/// Remote fetch failures carry the URL and HTTP status so the failure can be
/// traced back to the exact rendering request. All variants are fatal to the
/// build; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Remote rendering service returned a non-2xx status.
    #[error("diagram fetch failed: HTTP {status} for {url}")]
    Http { url: String, status: u16 },
    /// Network-level failure talking to the rendering service.
    #[error("diagram fetch failed for {url}: {message}")]
    Network { url: String, message: String },
    /// I/O error reading or writing a diagram image.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
