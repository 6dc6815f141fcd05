//! Diagram resolution and rendering for treedocs.
//!
//! This crate turns diagram source files into Markdown image fragments:
//! - [`DiagramFormat`]: output image format with the ditaa PNG override
//! - [`DiagramResolver`]: computes the image URL (local or remote) for one
//!   diagram and emits the Markdown fragment, optionally embedding the image
//!   as base64 data
//! - [`substitute_inline`]: rewrites inline diagram references in Markdown
//!   text, resolving matches concurrently while preserving source order
//! - [`generate_images`]: renders every diagram in the tree to disk ahead of
//!   assembly, through the opaque [`DiagramRenderer`] seam
//!
//! Remote rendering uses the PlantUML server's hex addressing scheme: the
//! diagram source is encoded into the URL, so no upload step is needed.

mod error;
mod format;
mod generate;
mod resolver;
mod server;
mod substitute;

pub use error::DiagramError;
pub use format::DiagramFormat;
pub use generate::{DiagramRenderer, RemoteRenderer, generate_images};
pub use resolver::{DiagramResolver, ResolverOptions};
pub use server::{HttpFetcher, ImageFetcher, create_agent, diagram_url};
pub use substitute::{Substitution, substitute_inline};
