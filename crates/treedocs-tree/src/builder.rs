//! Tree construction by recursive filesystem walking.
//!
//! The builder performs a single pre-order walk of the source root. For each
//! folder it reads Markdown and diagram sources into a [`Node`], mirrors the
//! folder into the destination root, and copies every file that is not part
//! of the generated documents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::node::{DiagramFile, Node};
use crate::paths;

/// Markdown source file extension.
const MARKDOWN_EXT: &str = "md";
/// Diagram source file extension.
const DIAGRAM_EXT: &str = "puml";
/// Prefix excluding a file or folder from document inclusion.
const PRIVATE_MARKER: char = '_';

/// Error raised while building the source tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Source root missing or not a directory.
    #[error("Source root not found: {}", .0.display())]
    RootNotFound(PathBuf),
    /// Filesystem error, surfaced unmodified with the path it occurred on.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Attach a path to an I/O error.
fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> TreeError + '_ {
    move |source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Builds the ordered node list for a documentation source tree.
///
/// Walking is fail-fast: the first filesystem error aborts the whole build
/// with no partial result.
pub struct TreeBuilder {
    root: PathBuf,
    dist: PathBuf,
    homepage_name: String,
}

impl TreeBuilder {
    /// Create a builder for the given source root and destination root.
    pub fn new(root: impl Into<PathBuf>, dist: impl Into<PathBuf>, homepage_name: &str) -> Self {
        Self {
            root: root.into(),
            dist: dist.into(),
            homepage_name: homepage_name.to_owned(),
        }
    }

    /// Walk the source tree and return its nodes in pre-order.
    ///
    /// Side effects: mirrors the folder structure under the destination root
    /// and copies files that are neither Markdown nor diagram sources (or
    /// that carry the private `_` prefix) into the mirrored folders.
    pub fn build(&self) -> Result<Vec<Node>, TreeError> {
        if !self.root.is_dir() {
            return Err(TreeError::RootNotFound(self.root.clone()));
        }
        let mut nodes = Vec::new();
        self.walk(&self.root, "", 1, None, &mut nodes)?;
        Ok(nodes)
    }

    /// Process one folder and recurse into its children.
    fn walk(
        &self,
        dir: &Path,
        rel_path: &str,
        depth: usize,
        parent: Option<&Path>,
        nodes: &mut Vec<Node>,
    ) -> Result<(), TreeError> {
        let dist_dir = if rel_path.is_empty() {
            self.dist.clone()
        } else {
            self.dist.join(rel_path)
        };
        // Idempotent; awaited before any file write targeting it.
        fs::create_dir_all(&dist_dir).map_err(io_err(&dist_dir))?;

        // Sort entries by name so node contents and child ordering are
        // stable across platforms.
        let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
            .map_err(io_err(dir))?
            .collect::<Result<_, _>>()
            .map_err(io_err(dir))?;
        entries.sort_by_key(fs::DirEntry::file_name);

        let mut markdown_contents = Vec::new();
        let mut diagram_files = Vec::new();
        let mut child_folder_names = Vec::new();
        let mut subdirs = Vec::new();

        for entry in &entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry
                .file_type()
                .map_err(io_err(&path))?
                .is_dir();

            if is_dir {
                // Private folders are excluded from the descendants menu but
                // still walked: folders are never filtered from the tree.
                if !name.starts_with(PRIVATE_MARKER) {
                    child_folder_names.push(name.clone());
                }
                subdirs.push((path, name));
                continue;
            }

            let private = name.starts_with(PRIVATE_MARKER);
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();

            if !private && ext == MARKDOWN_EXT {
                let content = fs::read_to_string(&path).map_err(io_err(&path))?;
                markdown_contents.push(content);
            } else if !private && ext == DIAGRAM_EXT {
                let source = fs::read_to_string(&path).map_err(io_err(&path))?;
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                diagram_files.push(DiagramFile { name: stem, source });
            } else {
                // "Other" files (including privately-marked ones) are copied
                // into the mirrored destination unchanged.
                let dest = dist_dir.join(&name);
                fs::copy(&path, &dest).map_err(io_err(&path))?;
                debug!(file = %path.display(), "copied non-documentation file");
            }
        }

        diagram_files.sort_by(|a, b| a.name.cmp(&b.name));

        nodes.push(Node {
            path: dir.to_path_buf(),
            rel_path: rel_path.to_owned(),
            url_path: paths::encode_path(rel_path),
            display_name: paths::display_name(dir, rel_path.is_empty(), &self.homepage_name),
            depth,
            parent_path: parent.map(Path::to_path_buf),
            markdown_contents,
            diagram_files,
            child_folder_names,
        });

        for (path, name) in subdirs {
            let child_rel = if rel_path.is_empty() {
                name
            } else {
                format!("{rel_path}/{name}")
            };
            self.walk(&path, &child_rel, depth + 1, Some(dir), nodes)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// root/
    ///   index.md
    ///   logo.svg
    ///   A/
    ///     a.md
    ///     z.puml
    ///     b.puml
    ///     B/
    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.md"), "# Hello").unwrap();
        fs::write(dir.path().join("logo.svg"), "<svg/>").unwrap();
        let a = dir.path().join("A");
        fs::create_dir(&a).unwrap();
        fs::write(a.join("a.md"), "content a").unwrap();
        fs::write(a.join("z.puml"), "@startuml\nZ\n@enduml").unwrap();
        fs::write(a.join("b.puml"), "@startuml\nB\n@enduml").unwrap();
        fs::create_dir(a.join("B")).unwrap();
        dir
    }

    fn build(src: &tempfile::TempDir) -> (Vec<Node>, tempfile::TempDir) {
        let dist = tempfile::tempdir().unwrap();
        let nodes = TreeBuilder::new(src.path(), dist.path(), "Home")
            .build()
            .unwrap();
        (nodes, dist)
    }

    #[test]
    fn node_list_is_preorder_with_depths() {
        let src = fixture();
        let (nodes, _dist) = build(&src);

        let labels: Vec<_> = nodes.iter().map(|n| n.rel_path.as_str()).collect();
        assert_eq!(labels, vec!["", "A", "A/B"]);
        let depths: Vec<_> = nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn parent_links_and_display_names() {
        let src = fixture();
        let (nodes, _dist) = build(&src);

        assert_eq!(nodes[0].display_name, "Home");
        assert!(nodes[0].parent_path.is_none());
        assert_eq!(nodes[1].display_name, "A");
        assert_eq!(nodes[1].parent_path.as_deref(), Some(src.path()));
        assert_eq!(
            nodes[2].parent_path.as_deref(),
            Some(src.path().join("A").as_path())
        );
    }

    #[test]
    fn markdown_and_diagrams_collected() {
        let src = fixture();
        let (nodes, _dist) = build(&src);

        assert_eq!(nodes[0].markdown_contents, vec!["# Hello".to_owned()]);
        assert_eq!(nodes[1].markdown_contents, vec!["content a".to_owned()]);
        assert!(nodes[2].markdown_contents.is_empty());
    }

    #[test]
    fn diagram_files_sorted_by_name() {
        let src = fixture();
        let (nodes, _dist) = build(&src);

        let names: Vec<_> = nodes[1].diagram_files.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "z"]);
    }

    #[test]
    fn mirrors_structure_and_copies_other_files() {
        let src = fixture();
        let (_nodes, dist) = build(&src);

        assert!(dist.path().join("A/B").is_dir());
        assert!(dist.path().join("logo.svg").is_file());
        // Documentation sources are not copied verbatim.
        assert!(!dist.path().join("index.md").exists());
        assert!(!dist.path().join("A/z.puml").exists());
    }

    #[test]
    fn private_files_copied_but_excluded_from_content() {
        let src = fixture();
        fs::write(src.path().join("_notes.md"), "secret").unwrap();
        let (nodes, dist) = build(&src);

        assert_eq!(nodes[0].markdown_contents, vec!["# Hello".to_owned()]);
        assert!(dist.path().join("_notes.md").is_file());
    }

    #[test]
    fn private_folders_become_nodes_but_not_children() {
        let src = fixture();
        fs::create_dir(src.path().join("_assets")).unwrap();
        let (nodes, _dist) = build(&src);

        // Folders are never filtered from the node list.
        assert_eq!(nodes.len(), 4);
        assert!(nodes.iter().any(|n| n.rel_path == "_assets"));
        assert_eq!(nodes[0].child_folder_names, vec!["A".to_owned()]);
    }

    #[test]
    fn url_path_is_percent_encoded() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir(src.path().join("User Guide")).unwrap();
        let (nodes, _dist) = build(&src);

        let guide = nodes.iter().find(|n| n.rel_path == "User Guide").unwrap();
        assert_eq!(guide.url_path, "User%20Guide");
    }

    #[test]
    fn missing_root_fails() {
        let dist = tempfile::tempdir().unwrap();
        let err = TreeBuilder::new("/nonexistent-treedocs-root", dist.path(), "Home")
            .build()
            .unwrap_err();
        assert!(matches!(err, TreeError::RootNotFound(_)));
    }

    #[test]
    fn node_count_matches_folder_count() {
        let src = fixture();
        fs::create_dir_all(src.path().join("C/D/E")).unwrap();
        let (nodes, _dist) = build(&src);

        // root, A, A/B, C, C/D, C/D/E
        assert_eq!(nodes.len(), 6);
    }
}
