//! Source tree walking and node model for treedocs.
//!
//! This crate builds the in-memory representation of a documentation source
//! tree:
//! - [`Node`]: one record per source folder with its Markdown and diagram
//!   contents
//! - [`TreeBuilder`]: recursive pre-order walk that produces the node list,
//!   mirrors the folder structure into the destination root, and copies
//!   non-documentation files
//! - [`paths`]: display-name and relative-link helpers shared by the
//!   document assemblers

mod builder;
mod node;
pub mod paths;

pub use builder::{TreeBuilder, TreeError};
pub use node::{DiagramFile, Node};
