//! Diagram reference resolution.
//!
//! For a single diagram the resolver decides the output format, computes the
//! image URL (local file next to the page, or the remote rendering-service
//! URL), and emits the Markdown fragment for it. In embed mode the image
//! bytes are inlined as base64 data instead.

use std::fs;
use std::path::PathBuf;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use treedocs_tree::{Node, paths};

use crate::error::DiagramError;
use crate::format::DiagramFormat;
use crate::server::{self, HttpFetcher, ImageFetcher};

/// Title marker telling the website's link rewriting to leave a link alone.
const LINK_IGNORE_MARKER: &str = ":ignore";

/// Configuration for diagram resolution (immutable after setup).
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Default output format; ditaa sources force PNG regardless.
    pub format: DiagramFormat,
    /// Whether images are generated locally on disk. When false, image URLs
    /// point at the remote rendering service.
    pub local_images: bool,
    /// Inline images as base64 data instead of referencing them by URL.
    pub embed: bool,
    /// Emit a secondary "go to diagram" link next to each image.
    pub include_link: bool,
    /// Rendering service URL.
    pub server_url: String,
    /// Destination root holding locally generated images.
    pub dist_root: PathBuf,
}

/// Resolves one diagram reference into a Markdown fragment.
pub struct DiagramResolver {
    options: ResolverOptions,
    /// Source of image bytes for embed mode.
    fetcher: Box<dyn ImageFetcher>,
}

impl DiagramResolver {
    /// Create a resolver fetching embed-mode bytes over HTTP.
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_fetcher(options, Box::new(HttpFetcher::new()))
    }

    /// Create a resolver with an explicit fetcher.
    pub fn with_fetcher(options: ResolverOptions, fetcher: Box<dyn ImageFetcher>) -> Self {
        Self { options, fetcher }
    }

    /// Resolve a diagram into a Markdown fragment.
    ///
    /// `flatten` suppresses folder-relative path segments, used by output
    /// modes that place all content at one directory level.
    pub fn resolve(
        &self,
        node: &Node,
        name: &str,
        source: &str,
        flatten: bool,
    ) -> Result<String, DiagramError> {
        let format = self.options.format.for_source(source);
        let file_name = format!("{}.{}", paths::encode_segment(name), format.as_str());

        // Two URL candidates: folder-qualified and flat. Remote rendering
        // replaces both with the service URL that encodes the source.
        let (folder_url, flat_url) = if self.options.local_images {
            let qualified = if node.url_path.is_empty() {
                file_name.clone()
            } else {
                format!("{}/{}", node.url_path, file_name)
            };
            (qualified, file_name)
        } else {
            let remote = server::diagram_url(&self.options.server_url, format, source);
            (remote.clone(), remote)
        };
        let image_url = if flatten { &flat_url } else { &folder_url };

        if self.options.embed {
            let data = self.image_bytes(node, name, format, &folder_url)?;
            let encoded = BASE64_STANDARD.encode(&data);
            return Ok(format!(
                "![{name}](data:{};base64,{encoded})\n\n[Download {name} diagram]({folder_url} \"{LINK_IGNORE_MARKER}\")\n",
                format.media_type(),
            ));
        }

        let mut fragment = format!("![{name}]({image_url})\n");
        if self.options.include_link {
            // The secondary link always uses the folder-qualified URL, even
            // when the image itself used the flat one.
            fragment.push_str(&format!("\n[Go to {name} diagram]({folder_url})\n"));
        }
        Ok(fragment)
    }

    /// Obtain image bytes for embed mode: from the locally generated file,
    /// or fetched from the remote rendering service.
    fn image_bytes(
        &self,
        node: &Node,
        name: &str,
        format: DiagramFormat,
        remote_url: &str,
    ) -> Result<Vec<u8>, DiagramError> {
        if self.options.local_images {
            let path = node
                .dist_dir(&self.options.dist_root)
                .join(format!("{name}.{}", format.as_str()));
            fs::read(&path).map_err(|source| DiagramError::Io { path, source })
        } else {
            self.fetcher.fetch(remote_url)
        }
    }
}
