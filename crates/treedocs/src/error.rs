//! CLI error types.

use treedocs_assemble::AssembleError;
use treedocs_config::ConfigError;
use treedocs_diagrams::DiagramError;
use treedocs_tree::TreeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Diagram(#[from] DiagramError),

    #[error("{0}")]
    Assemble(#[from] AssembleError),
}
