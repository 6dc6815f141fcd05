//! Batch image generation for local-image mode.
//!
//! Renders every diagram in the tree to the mirrored destination before any
//! document assembly runs. Rendering is sequential per diagram because the
//! external renderer streams its output to disk one diagram at a time.

use std::fs;
use std::path::Path;

use tracing::debug;
use ureq::Agent;

use treedocs_tree::Node;

use crate::error::DiagramError;
use crate::format::DiagramFormat;
use crate::server::{self, DEFAULT_TIMEOUT, create_agent};

/// Opaque diagram rendering engine.
///
/// Accepts diagram source text and writes the rendered image to the
/// destination path in the requested format.
pub trait DiagramRenderer {
    fn render(
        &self,
        source: &str,
        format: DiagramFormat,
        charset: &str,
        dest: &Path,
    ) -> Result<(), DiagramError>;
}

/// Renderer backed by the remote rendering service.
///
/// Fetches the image from the source-addressed service URL and streams it to
/// the destination file. The configured charset is forwarded to the service
/// as a query parameter.
pub struct RemoteRenderer {
    server_url: String,
    agent: Agent,
}

impl RemoteRenderer {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }
}

impl DiagramRenderer for RemoteRenderer {
    fn render(
        &self,
        source: &str,
        format: DiagramFormat,
        charset: &str,
        dest: &Path,
    ) -> Result<(), DiagramError> {
        let url = server::with_charset(
            &server::diagram_url(&self.server_url, format, source),
            charset,
        );
        let data = server::fetch(&self.agent, &url)?;
        fs::write(dest, data).map_err(|source| DiagramError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }
}

/// Render every diagram in the tree to disk.
///
/// Images land next to their node's generated page in the mirrored
/// destination, named `{diagram}.{format}` with the per-source format
/// resolution (ditaa forces PNG). Progress is reported after each diagram.
pub fn generate_images(
    nodes: &[Node],
    dist_root: &Path,
    renderer: &dyn DiagramRenderer,
    default_format: DiagramFormat,
    charset: &str,
    progress: &dyn Fn(usize, usize),
) -> Result<(), DiagramError> {
    let total: usize = nodes.iter().map(|n| n.diagram_files.len()).sum();
    let mut done = 0;

    for node in nodes {
        let dir = node.dist_dir(dist_root);
        for diagram in &node.diagram_files {
            let format = default_format.for_source(&diagram.source);
            let dest = dir.join(format!("{}.{}", diagram.name, format.as_str()));
            renderer.render(&diagram.source, format, charset, &dest)?;
            debug!(image = %dest.display(), "rendered diagram");
            done += 1;
            progress(done, total);
        }
    }
    Ok(())
}
