//! Document assembly for treedocs.
//!
//! The assemblers share one node list (built by `treedocs-tree`) and one
//! [`DiagramResolver`](treedocs_diagrams::DiagramResolver), and differ only
//! in link-relativity rules and output layout:
//! - [`assemble_markdown`]: one Markdown page per folder with navigation
//! - [`assemble_pdf`]: one PDF per folder through the [`PdfEngine`] seam
//! - [`assemble_complete_markdown`] / [`assemble_complete_pdf`]: a single
//!   concatenated document at the destination root
//! - [`assemble_website`]: per-node pages with flattened diagram paths, a
//!   sidebar index, and a homepage from the [`HomepageTemplate`] strategy
//!
//! All assemblers report progress through a `Fn(done, total)` callback after
//! each completed node.

mod complete;
mod error;
mod markdown;
mod navigation;
mod node_render;
mod pdf;
mod website;

pub use complete::{assemble_complete_markdown, assemble_complete_pdf};
pub use error::AssembleError;
pub use markdown::assemble_markdown;
pub use navigation::LinkStyle;
pub use node_render::{PageOptions, render_node};
pub use pdf::{CommandPdfEngine, PdfEngine, PdfError, PdfMargins, PdfOptions, assemble_pdf};
pub use website::{
    DocsifyTemplate, HomepageContext, HomepageTemplate, WebsiteOptions, assemble_website,
};

/// Progress callback invoked after each completed node or file, carrying
/// (completed count, total count).
pub type Progress<'a> = &'a (dyn Fn(usize, usize) + Sync);
