//! Cross-linking: breadcrumbs, tables of contents, parent/child navigation.
//!
//! The four output modes share the same source tree but differ in
//! link-relativity rules, captured here as [`LinkStyle`].

use treedocs_diagrams::DiagramResolver;
use treedocs_tree::{Node, paths};

use crate::error::AssembleError;
use crate::node_render::{PageOptions, render_node};

/// Link-relativity rule for one output mode.
#[derive(Debug, Clone, Copy)]
pub enum LinkStyle<'a> {
    /// Relative file links between mirrored folders (per-node Markdown/PDF).
    /// `file_name` is the per-node base name without extension.
    RelativeFile { file_name: &'a str },
    /// Site-root routes for the website (no extension, docsify style).
    SiteRoot { file_name: &'a str },
    /// In-document anchors for the concatenated document.
    Anchor,
}

/// Link from a node at `from_depth` to `target` under the given style.
pub fn link_to(style: LinkStyle<'_>, from_depth: usize, target: &Node) -> String {
    match style {
        LinkStyle::RelativeFile { file_name } => {
            let prefix = paths::relative_prefix(from_depth);
            if target.is_root() {
                format!("{prefix}{file_name}.md")
            } else {
                format!("{prefix}{}/{file_name}.md", target.url_path)
            }
        }
        LinkStyle::SiteRoot { file_name } => {
            if target.is_root() {
                "/".to_owned()
            } else {
                format!("/{}/{file_name}", target.url_path)
            }
        }
        LinkStyle::Anchor => format!("#{}", anchor_slug(&target.display_name)),
    }
}

/// Anchor slug for a section heading.
fn anchor_slug(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == ' ' || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// Breadcrumb line: the node's raw folder path.
pub fn breadcrumb(node: &Node) -> String {
    format!("`/{}`\n", node.rel_path)
}

/// Full-tree table of contents, bolding the current node.
///
/// One bullet per node, indented by nesting depth; link depth is computed
/// from the current node's depth.
pub fn table_of_contents(nodes: &[Node], current: &Node, style: LinkStyle<'_>) -> String {
    let mut toc = String::new();
    for node in nodes {
        let indent = "  ".repeat(node.depth - 1);
        let label = if node.path == current.path {
            format!("**{}**", node.display_name)
        } else {
            node.display_name.clone()
        };
        let link = link_to(style, current.depth, node);
        toc.push_str(&format!("{indent}- [{label}]({link})\n"));
    }
    toc
}

/// Parent link and child-folder list for one node.
pub fn node_navigation(nodes: &[Node], node: &Node, style: LinkStyle<'_>) -> String {
    let mut nav = String::new();

    if let Some(parent_path) = &node.parent_path
        && let Some(parent) = nodes.iter().find(|n| &n.path == parent_path)
    {
        let link = link_to(style, node.depth, parent);
        nav.push_str(&format!("[↑ {}]({link})\n", parent.display_name));
    }

    if !node.child_folder_names.is_empty() {
        if !nav.is_empty() {
            nav.push('\n');
        }
        for name in &node.child_folder_names {
            let child_rel = if node.is_root() {
                name.clone()
            } else {
                format!("{}/{}", node.rel_path, name)
            };
            if let Some(child) = nodes.iter().find(|n| n.rel_path == child_rel) {
                let link = link_to(style, node.depth, child);
                nav.push_str(&format!("- [{}]({link})\n", child.display_name));
            }
        }
    }
    nav
}

/// Compose one node's full page: title, optional breadcrumb, optional table
/// of contents, optional navigation, then the rendered content.
pub(crate) fn compose_page(
    nodes: &[Node],
    node: &Node,
    resolver: &DiagramResolver,
    options: PageOptions,
    style: LinkStyle<'_>,
    flatten: bool,
) -> Result<String, AssembleError> {
    let mut page = format!("# {}\n\n", node.display_name);
    if options.include_breadcrumbs {
        page.push_str(&breadcrumb(node));
        page.push('\n');
    }
    if options.include_table_of_contents {
        page.push_str(&table_of_contents(nodes, node, style));
        page.push('\n');
    }
    if options.include_navigation {
        let nav = node_navigation(nodes, node, style);
        if !nav.is_empty() {
            page.push_str(&nav);
            page.push('\n');
        }
    }
    page.push_str(&render_node(resolver, node, options.diagrams_on_top, flatten)?);
    Ok(page)
}
