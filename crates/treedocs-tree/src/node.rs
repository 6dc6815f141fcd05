//! Node model for source folders.

use std::path::{Path, PathBuf};

/// A diagram source file found directly in a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramFile {
    /// File name without the diagram extension (e.g., `"sequence"` for
    /// `sequence.puml`).
    pub name: String,
    /// Raw diagram source text.
    pub source: String,
}

/// In-memory record for one source folder and its direct contents.
///
/// Nodes are produced once per build by [`TreeBuilder`](crate::TreeBuilder)
/// in pre-order (a folder always appears before its descendants) and are
/// read-only afterwards; assemblers share the same list.
#[derive(Debug, Clone)]
pub struct Node {
    /// Filesystem location of the source folder. Identity key, unique per tree.
    pub path: PathBuf,
    /// Unencoded path relative to the source root with forward slashes
    /// (`""` for the root). Used for destination mirroring and breadcrumbs.
    pub rel_path: String,
    /// Percent-encoded form of [`rel_path`](Self::rel_path), for web links.
    pub url_path: String,
    /// Resolved folder label (homepage name at the root, base name elsewhere).
    pub display_name: String,
    /// 1-based nesting level, root = 1. A child's depth is always the
    /// parent's depth + 1.
    pub depth: usize,
    /// Path of the immediate parent folder. `None` at the root.
    pub parent_path: Option<PathBuf>,
    /// Raw Markdown file contents found directly in the folder, in read order.
    pub markdown_contents: Vec<String>,
    /// Diagram files found directly in the folder, sorted by file name.
    pub diagram_files: Vec<DiagramFile>,
    /// Immediate child folder names, used for the descendants navigation menu.
    pub child_folder_names: Vec<String>,
}

impl Node {
    /// Whether this node is the source root.
    pub fn is_root(&self) -> bool {
        self.rel_path.is_empty()
    }

    /// Mirrored destination directory for this node.
    pub fn dist_dir(&self, dist_root: &Path) -> PathBuf {
        if self.is_root() {
            dist_root.to_path_buf()
        } else {
            dist_root.join(&self.rel_path)
        }
    }
}
