//! Assembly error types.

use std::path::PathBuf;

use treedocs_diagrams::DiagramError;

/// Error raised while assembling output documents.
///
/// PDF conversion failures are deliberately absent: they are logged and
/// swallowed at the call site instead of propagating (see `pdf` module).
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// I/O error writing an output file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Diagram resolution failure, fatal to the build.
    #[error(transparent)]
    Diagram(#[from] DiagramError),
    /// Homepage template rendering failure.
    #[error("Homepage template error: {0}")]
    Template(String),
}

impl AssembleError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
