//! Per-node Markdown assembly.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::debug;

use treedocs_diagrams::DiagramResolver;
use treedocs_tree::Node;

use crate::Progress;
use crate::error::AssembleError;
use crate::navigation::{LinkStyle, compose_page};
use crate::node_render::PageOptions;

/// Write one Markdown file per node into the mirrored destination tree.
///
/// Nodes are assembled concurrently; the first failure aborts the pass.
/// Progress is reported after each completed node.
pub fn assemble_markdown(
    nodes: &[Node],
    resolver: &DiagramResolver,
    options: PageOptions,
    file_name: &str,
    dist_root: &Path,
    progress: Progress<'_>,
) -> Result<(), AssembleError> {
    let total = nodes.len();
    let done = AtomicUsize::new(0);
    let style = LinkStyle::RelativeFile { file_name };

    nodes.par_iter().try_for_each(|node| {
        let page = compose_page(nodes, node, resolver, options, style, false)?;
        let dest = node.dist_dir(dist_root).join(format!("{file_name}.md"));
        fs::write(&dest, page).map_err(AssembleError::io(&dest))?;
        debug!(file = %dest.display(), "wrote node page");
        progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use treedocs_diagrams::{DiagramFormat, ResolverOptions};
    use treedocs_tree::{DiagramFile, TreeBuilder};

    fn resolver(dist: &Path) -> DiagramResolver {
        DiagramResolver::new(ResolverOptions {
            format: DiagramFormat::Png,
            local_images: true,
            embed: false,
            include_link: false,
            server_url: "https://uml.example.com/plantuml".to_owned(),
            dist_root: dist.to_path_buf(),
        })
    }

    /// root (index.md) / A (a.md, diagram.puml) / A/B (empty)
    fn fixture() -> (Vec<Node>, tempfile::TempDir) {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("index.md"), "welcome").unwrap();
        let a = src.path().join("A");
        std::fs::create_dir(&a).unwrap();
        std::fs::write(a.join("a.md"), "section a").unwrap();
        std::fs::write(a.join("diagram.puml"), "@startuml\nA -> B\n@enduml").unwrap();
        std::fs::create_dir(a.join("B")).unwrap();

        let dist = tempfile::tempdir().unwrap();
        let nodes = TreeBuilder::new(src.path(), dist.path(), "Home")
            .build()
            .unwrap();
        (nodes, dist)
    }

    #[test]
    fn writes_one_file_per_node_with_progress() {
        let (nodes, dist) = fixture();
        let options = PageOptions {
            include_table_of_contents: true,
            include_navigation: true,
            ..PageOptions::default()
        };
        let seen = Mutex::new(Vec::new());

        assemble_markdown(
            &nodes,
            &resolver(dist.path()),
            options,
            "README",
            dist.path(),
            &|done, total| seen.lock().unwrap().push((done, total)),
        )
        .unwrap();

        assert!(dist.path().join("README.md").is_file());
        assert!(dist.path().join("A/README.md").is_file());
        assert!(dist.path().join("A/B/README.md").is_file());

        let mut calls = seen.lock().unwrap().clone();
        calls.sort_unstable();
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn page_contains_title_content_and_trailing_diagram() {
        let (nodes, dist) = fixture();
        assemble_markdown(
            &nodes,
            &resolver(dist.path()),
            PageOptions::default(),
            "README",
            dist.path(),
            &|_, _| {},
        )
        .unwrap();

        let page = std::fs::read_to_string(dist.path().join("A/README.md")).unwrap();
        assert!(page.starts_with("# A\n"));
        assert!(page.contains("section a"));
        assert!(page.contains("![diagram](A/diagram.png)"));
    }

    #[test]
    fn toc_links_climb_from_nested_nodes() {
        let (nodes, dist) = fixture();
        let options = PageOptions {
            include_table_of_contents: true,
            ..PageOptions::default()
        };
        assemble_markdown(
            &nodes,
            &resolver(dist.path()),
            options,
            "README",
            dist.path(),
            &|_, _| {},
        )
        .unwrap();

        let page = std::fs::read_to_string(dist.path().join("A/B/README.md")).unwrap();
        assert!(page.contains("- [Home](../../README.md)"));
        assert!(page.contains("[**B**](../../A/B/README.md)"));
    }

    #[test]
    fn unreferenced_diagram_rendered_exactly_once() {
        let (mut nodes, dist) = fixture();
        // Add an inline reference for one diagram and one pending diagram.
        nodes[1].markdown_contents = vec!["see ![x](diagram.puml)".to_owned()];
        nodes[1].diagram_files.push(DiagramFile {
            name: "extra".to_owned(),
            source: "@startuml\nE\n@enduml".to_owned(),
        });

        assemble_markdown(
            &nodes,
            &resolver(dist.path()),
            PageOptions::default(),
            "README",
            dist.path(),
            &|_, _| {},
        )
        .unwrap();

        let page = std::fs::read_to_string(dist.path().join("A/README.md")).unwrap();
        assert_eq!(page.matches("diagram.png").count(), 1);
        assert_eq!(page.matches("extra.png").count(), 1);
    }

    #[test]
    fn node_count_matches_folder_count() {
        let (nodes, _dist) = fixture();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.iter().map(|n| n.depth).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
