//! Per-node Markdown rendering.
//!
//! Composes one node's content: its Markdown file contents with inline
//! diagram references substituted, plus trailing images for diagrams never
//! referenced inline. The node itself is not mutated; the consumed set from
//! substitution is threaded through functionally, so the same node can be
//! rendered by several assemblers in one build.

use treedocs_diagrams::{DiagramResolver, substitute_inline};
use treedocs_tree::Node;

use crate::error::AssembleError;

/// Per-page content options shared by all assemblers.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PageOptions {
    /// Include a raw-folder-path breadcrumb.
    pub include_breadcrumbs: bool,
    /// Include a full-tree table of contents.
    pub include_table_of_contents: bool,
    /// Include parent link and child-folder navigation.
    pub include_navigation: bool,
    /// Place trailing diagram images before the Markdown content.
    pub diagrams_on_top: bool,
}

/// Render a node's Markdown content.
///
/// A diagram referenced inline is never also rendered as a trailing image;
/// a diagram never referenced inline is rendered as a trailing image exactly
/// once.
pub fn render_node(
    resolver: &DiagramResolver,
    node: &Node,
    diagrams_on_top: bool,
    flatten: bool,
) -> Result<String, AssembleError> {
    let text = node.markdown_contents.join("\n\n");
    let substitution = substitute_inline(resolver, node, &text, flatten)?;

    let mut trailing = String::new();
    for diagram in &node.diagram_files {
        if substitution.consumed.contains(&diagram.name) {
            continue;
        }
        let fragment = resolver.resolve(node, &diagram.name, &diagram.source, flatten)?;
        if !trailing.is_empty() {
            trailing.push('\n');
        }
        trailing.push_str(&fragment);
    }

    let content = substitution.text;
    let rendered = match (diagrams_on_top, trailing.is_empty(), content.is_empty()) {
        (_, true, _) => content,
        (_, false, true) => trailing,
        (true, false, false) => format!("{trailing}\n{content}"),
        (false, false, false) => format!("{content}\n\n{trailing}"),
    };
    Ok(rendered)
}
