//! Static website assembly in the docsify layout.
//!
//! Per-node pages are written next to their copied assets with flattened
//! diagram references, so the site router resolves images relative to each
//! page's folder. The destination root additionally gets a sidebar index,
//! a `.nojekyll` marker, and an `index.html` homepage rendered from the
//! [`HomepageTemplate`] strategy.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use minijinja::{Environment, context};
use rayon::prelude::*;
use tracing::debug;

use treedocs_diagrams::DiagramResolver;
use treedocs_tree::Node;

use crate::Progress;
use crate::error::AssembleError;
use crate::navigation::{LinkStyle, compose_page, link_to};
use crate::node_render::PageOptions;

const HOMEPAGE_TEMPLATE: &str = include_str!("templates/index.html.j2");

/// Values available to the homepage template.
#[derive(Debug, Clone)]
pub struct HomepageContext {
    pub project_name: String,
    /// Repository link shown in the site corner, if any.
    pub repo_url: Option<String>,
    /// Per-node page base name without extension.
    pub homepage_file: String,
    /// Stylesheet URL.
    pub theme: String,
}

/// Strategy producing the site's `index.html`.
pub trait HomepageTemplate {
    fn render(&self, ctx: &HomepageContext) -> Result<String, AssembleError>;
}

/// Homepage template for the docsify site shell.
///
/// Defaults to the built-in template; [`DocsifyTemplate::from_file`] loads a
/// user-provided override with the same template variables.
pub struct DocsifyTemplate {
    source: String,
}

impl Default for DocsifyTemplate {
    fn default() -> Self {
        Self {
            source: HOMEPAGE_TEMPLATE.to_owned(),
        }
    }
}

impl DocsifyTemplate {
    pub fn from_file(path: &Path) -> Result<Self, AssembleError> {
        let source = fs::read_to_string(path).map_err(AssembleError::io(path))?;
        Ok(Self { source })
    }
}

impl HomepageTemplate for DocsifyTemplate {
    fn render(&self, ctx: &HomepageContext) -> Result<String, AssembleError> {
        let mut env = Environment::new();
        // The context values are URLs and names destined for a script block;
        // HTML entity escaping would corrupt them.
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.add_template("index.html", &self.source)
            .map_err(|e| AssembleError::Template(e.to_string()))?;
        let template = env
            .get_template("index.html")
            .map_err(|e| AssembleError::Template(e.to_string()))?;
        template
            .render(context! {
                project_name => ctx.project_name,
                repo_url => ctx.repo_url,
                homepage_file => ctx.homepage_file,
                theme => ctx.theme,
            })
            .map_err(|e| AssembleError::Template(e.to_string()))
    }
}

/// Site-wide settings for website assembly.
#[derive(Debug, Clone)]
pub struct WebsiteOptions {
    pub project_name: String,
    pub repo_url: Option<String>,
    /// Per-node page base name without extension.
    pub web_file_name: String,
    /// Stylesheet URL for the homepage.
    pub theme: String,
    pub page: PageOptions,
}

/// Sidebar index: one bullet per node, indented by depth, with site-root
/// routes.
fn sidebar(nodes: &[Node], web_file_name: &str) -> String {
    let style = LinkStyle::SiteRoot {
        file_name: web_file_name,
    };
    let mut index = String::new();
    for node in nodes {
        let indent = "  ".repeat(node.depth - 1);
        let route = link_to(style, node.depth, node);
        index.push_str(&format!("{indent}- [{}]({route})\n", node.display_name));
    }
    index
}

/// Write the website: per-node pages, `_sidebar.md`, `.nojekyll`, and the
/// homepage `index.html`.
pub fn assemble_website(
    nodes: &[Node],
    resolver: &DiagramResolver,
    options: &WebsiteOptions,
    template: &dyn HomepageTemplate,
    dist_root: &Path,
    progress: Progress<'_>,
) -> Result<(), AssembleError> {
    let total = nodes.len();
    let done = AtomicUsize::new(0);
    let style = LinkStyle::SiteRoot {
        file_name: &options.web_file_name,
    };

    nodes.par_iter().try_for_each(|node| -> Result<(), AssembleError> {
        // Flattened diagram paths: the router serves each page from its own
        // folder, so bare file names resolve to the copied assets.
        let page = compose_page(nodes, node, resolver, options.page, style, true)?;
        let dest = node
            .dist_dir(dist_root)
            .join(format!("{}.md", options.web_file_name));
        fs::write(&dest, page).map_err(AssembleError::io(&dest))?;
        debug!(file = %dest.display(), "wrote site page");
        progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
        Ok(())
    })?;

    let sidebar_path = dist_root.join("_sidebar.md");
    fs::write(&sidebar_path, sidebar(nodes, &options.web_file_name))
        .map_err(AssembleError::io(&sidebar_path))?;

    // Keeps GitHub Pages from running the site through Jekyll.
    let nojekyll = dist_root.join(".nojekyll");
    fs::write(&nojekyll, "").map_err(AssembleError::io(&nojekyll))?;

    let ctx = HomepageContext {
        project_name: options.project_name.clone(),
        repo_url: options.repo_url.clone(),
        homepage_file: options.web_file_name.clone(),
        theme: options.theme.clone(),
    };
    let homepage = template.render(&ctx)?;
    let index_path = dist_root.join("index.html");
    fs::write(&index_path, homepage).map_err(AssembleError::io(&index_path))?;
    debug!(file = %index_path.display(), "wrote homepage");
    Ok(())
}
