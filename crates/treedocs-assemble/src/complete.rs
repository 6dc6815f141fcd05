//! Concatenated single-document assembly.
//!
//! All nodes are stitched into one Markdown document at the destination
//! root, in the same pre-order as the tree walk, with an anchor-based table
//! of contents instead of file links.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use treedocs_diagrams::DiagramResolver;
use treedocs_tree::Node;

use crate::Progress;
use crate::error::AssembleError;
use crate::navigation::{LinkStyle, link_to};
use crate::node_render::{PageOptions, render_node};
use crate::pdf::{PdfEngine, PdfOptions, convert_document};

/// Build the concatenated document: title, anchor table of contents, then
/// one `##` section per node in pre-order.
///
/// Sections are rendered concurrently and joined in tree order. Diagram
/// paths stay folder-qualified since the document sits at the destination
/// root.
fn compose_document(
    nodes: &[Node],
    resolver: &DiagramResolver,
    options: PageOptions,
    project_name: &str,
    progress: Progress<'_>,
) -> Result<String, AssembleError> {
    let total = nodes.len();
    let done = AtomicUsize::new(0);

    let sections = nodes
        .par_iter()
        .map(|node| {
            let body = render_node(resolver, node, options.diagrams_on_top, false)?;
            let mut section = format!("## {}\n", node.display_name);
            if options.include_breadcrumbs {
                section.push_str(&format!("\n`/{}`\n", node.rel_path));
            }
            if !body.is_empty() {
                section.push('\n');
                section.push_str(body.trim_end());
                section.push('\n');
            }
            progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            Ok(section)
        })
        .collect::<Result<Vec<_>, AssembleError>>()?;

    let mut document = format!("# {project_name}\n\n");
    for node in nodes {
        let indent = "  ".repeat(node.depth - 1);
        let link = link_to(LinkStyle::Anchor, node.depth, node);
        document.push_str(&format!("{indent}- [{}]({link})\n", node.display_name));
    }
    for section in sections {
        document.push('\n');
        document.push_str(&section);
    }
    Ok(document)
}

/// Write the whole tree as one Markdown document at `{dist}/{project_name}.md`.
pub fn assemble_complete_markdown(
    nodes: &[Node],
    resolver: &DiagramResolver,
    options: PageOptions,
    project_name: &str,
    dist_root: &Path,
    progress: Progress<'_>,
) -> Result<(), AssembleError> {
    let document = compose_document(nodes, resolver, options, project_name, progress)?;
    let dest = dist_root.join(format!("{project_name}.md"));
    fs::write(&dest, document).map_err(AssembleError::io(&dest))?;
    debug!(file = %dest.display(), "wrote complete document");
    Ok(())
}

/// Convert the whole tree to one PDF at `{dist}/{project_name}.pdf`.
///
/// A converter failure is logged and swallowed like the per-node PDF pass.
#[allow(clippy::too_many_arguments)]
pub fn assemble_complete_pdf(
    nodes: &[Node],
    resolver: &DiagramResolver,
    options: PageOptions,
    pdf_options: &PdfOptions,
    engine: &dyn PdfEngine,
    project_name: &str,
    dist_root: &Path,
    progress: Progress<'_>,
) -> Result<(), AssembleError> {
    let document = compose_document(nodes, resolver, options, project_name, progress)?;
    let dest = dist_root.join(format!("{project_name}.pdf"));
    match convert_document(engine, &document, pdf_options, &dest) {
        Ok(()) => debug!(file = %dest.display(), "wrote complete PDF"),
        Err(e) => warn!("{e}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use treedocs_diagrams::{DiagramFormat, ResolverOptions};
    use treedocs_tree::TreeBuilder;

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
    fn single_document_with_anchor_toc_and_preorder_sections() {
        let (nodes, dist) = fixture();
        let seen = Mutex::new(Vec::new());

        assemble_complete_markdown(
            &nodes,
            &resolver(dist.path()),
            PageOptions::default(),
            "manual",
            dist.path(),
            &|done, total| seen.lock().unwrap().push((done, total)),
        )
        .unwrap();

        let document = std::fs::read_to_string(dist.path().join("manual.md")).unwrap();
        assert!(document.starts_with("# manual\n"));
        assert!(document.contains("- [Home](#home)\n  - [A](#a)\n    - [B](#b)\n"));

        // Sections appear once each, in tree order.
        let home = document.find("## Home").unwrap();
        let a = document.find("## A").unwrap();
        let b = document.find("## B").unwrap();
        assert!(home < a && a < b);
        assert_eq!(document.matches("## A").count(), 1);

        assert!(document.contains("welcome"));
        assert!(document.contains("section a"));
        assert!(document.contains("![diagram](A/diagram.png)"));
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn complete_pdf_failure_is_swallowed() {
        struct FailingEngine;
        impl PdfEngine for FailingEngine {
            fn convert(
                &self,
                _source: &Path,
                _options: &PdfOptions,
                dest: &Path,
            ) -> Result<(), crate::PdfError> {
                Err(crate::PdfError {
                    path: dest.to_path_buf(),
                    message: "simulated converter failure".to_owned(),
                })
            }
        }

        let (nodes, dist) = fixture();
        let result = assemble_complete_pdf(
            &nodes,
            &resolver(dist.path()),
            PageOptions::default(),
            &PdfOptions::default(),
            &FailingEngine,
            "manual",
            dist.path(),
            &|_, _| {},
        );

        assert!(result.is_ok());
        assert!(!dist.path().join("manual.pdf").exists());
    }

    #[test]
    fn breadcrumbs_apply_per_section() {
        let (nodes, dist) = fixture();
        let options = PageOptions {
            include_breadcrumbs: true,
            ..PageOptions::default()
        };

        assemble_complete_markdown(
            &nodes,
            &resolver(dist.path()),
            options,
            "manual",
            dist.path(),
            &|_, _| {},
        )
        .unwrap();

        let document = std::fs::read_to_string(dist.path().join("manual.md")).unwrap();
        assert!(document.contains("## A\n\n`/A`\n"));
        assert!(document.contains("## B\n\n`/A/B`\n"));
    }
}
