//! Per-node PDF assembly through the external converter seam.
//!
//! Conversion failures are deliberately non-fatal: each failed document is
//! logged and left unconverted while the rest of the build continues. This
//! is the one leniency in the error policy; every other failure aborts.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use treedocs_diagrams::DiagramResolver;
use treedocs_tree::Node;

use crate::Progress;
use crate::error::AssembleError;
use crate::navigation::{LinkStyle, compose_page};
use crate::node_render::PageOptions;

/// Page margins passed to the converter.
#[derive(Debug, Clone, Serialize)]
pub struct PdfMargins {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
}

/// Page-layout options for the external PDF converter.
///
/// Serializes to the converter's camelCase `--pdf-options` JSON; the
/// stylesheet travels as its own flag and is excluded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    pub scale: f32,
    pub display_header_footer: bool,
    pub print_background: bool,
    pub landscape: bool,
    /// Empty string means all pages.
    pub page_ranges: String,
    /// Paper size name.
    pub format: String,
    pub margin: PdfMargins,
    /// Optional stylesheet reference.
    #[serde(skip)]
    pub stylesheet: Option<String>,
}

impl Default for PdfOptions {
    /// Fixed layout used for generated documents: A4, 1.5cm/1cm margins,
    /// background graphics on, no header/footer.
    fn default() -> Self {
        Self {
            scale: 1.0,
            display_header_footer: false,
            print_background: true,
            landscape: false,
            page_ranges: String::new(),
            format: "A4".to_owned(),
            margin: PdfMargins {
                top: "1.5cm".to_owned(),
                bottom: "1.5cm".to_owned(),
                left: "1cm".to_owned(),
                right: "1cm".to_owned(),
            },
            stylesheet: None,
        }
    }
}

/// Error from one PDF conversion. Logged and swallowed, never propagated.
#[derive(Debug, thiserror::Error)]
#[error("PDF conversion failed for {}: {message}", .path.display())]
pub struct PdfError {
    pub path: PathBuf,
    pub message: String,
}

/// Opaque PDF typesetting engine.
///
/// Converts a Markdown document on disk into a PDF at the destination path.
pub trait PdfEngine: Sync {
    fn convert(&self, source: &Path, options: &PdfOptions, dest: &Path) -> Result<(), PdfError>;
}

/// PDF engine invoking an external converter binary.
pub struct CommandPdfEngine {
    program: String,
}

impl CommandPdfEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PdfEngine for CommandPdfEngine {
    fn convert(&self, source: &Path, options: &PdfOptions, dest: &Path) -> Result<(), PdfError> {
        let err = |message: String| PdfError {
            path: dest.to_path_buf(),
            message,
        };

        let options_json = serde_json::to_string(options).map_err(|e| err(e.to_string()))?;
        let mut command = Command::new(&self.program);
        command
            .arg(source)
            .arg("--pdf-options")
            .arg(options_json);
        if let Some(stylesheet) = &options.stylesheet {
            command.arg("--stylesheet").arg(stylesheet);
        }
        command.arg("--dest").arg(dest);

        let status = command.status().map_err(|e| err(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(err(format!("converter exited with {status}")))
        }
    }
}

/// Convert one assembled Markdown document to PDF through a temporary file.
///
/// The temporary source is removed when this returns. A conversion failure
/// is reported to the caller as a per-document result, not an abort.
pub(crate) fn convert_document(
    engine: &dyn PdfEngine,
    content: &str,
    options: &PdfOptions,
    dest: &Path,
) -> Result<(), PdfError> {
    let dir = dest.parent().unwrap_or(Path::new("."));
    let temp = tempfile::Builder::new()
        .suffix(".md")
        .tempfile_in(dir)
        .map_err(|e| PdfError {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })?;
    fs::write(temp.path(), content).map_err(|e| PdfError {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;
    engine.convert(temp.path(), options, dest)
    // temp deleted on drop
}

/// Write one PDF per node into the mirrored destination tree.
///
/// Diagram and I/O failures abort the pass; converter failures are logged
/// per document and skipped. Progress is reported after each node whether
/// its conversion succeeded or not.
#[allow(clippy::too_many_arguments)]
pub fn assemble_pdf(
    nodes: &[Node],
    resolver: &DiagramResolver,
    options: PageOptions,
    pdf_options: &PdfOptions,
    engine: &dyn PdfEngine,
    file_name: &str,
    dist_root: &Path,
    progress: Progress<'_>,
) -> Result<(), AssembleError> {
    let total = nodes.len();
    let done = AtomicUsize::new(0);
    let style = LinkStyle::RelativeFile { file_name };

    nodes.par_iter().try_for_each(|node| {
        let page = compose_page(nodes, node, resolver, options, style, false)?;
        let dest = node.dist_dir(dist_root).join(format!("{file_name}.pdf"));
        match convert_document(engine, &page, pdf_options, &dest) {
            Ok(()) => debug!(file = %dest.display(), "wrote node PDF"),
            Err(e) => warn!("{e}"),
        }
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
        std::fs::create_dir(src.path().join("A")).unwrap();
        std::fs::write(src.path().join("A/a.md"), "section a").unwrap();

        let dist = tempfile::tempdir().unwrap();
        let nodes = TreeBuilder::new(src.path(), dist.path(), "Home")
            .build()
            .unwrap();
        (nodes, dist)
    }

    /// Engine double writing a marker file, optionally failing for one node.
    struct FakeEngine {
        fail_for: Option<&'static str>,
        converted: Mutex<Vec<PathBuf>>,
    }

    impl FakeEngine {
        fn new(fail_for: Option<&'static str>) -> Self {
            Self {
                fail_for,
                converted: Mutex::new(Vec::new()),
            }
        }
    }

    impl PdfEngine for FakeEngine {
        fn convert(
            &self,
            source: &Path,
            _options: &PdfOptions,
            dest: &Path,
        ) -> Result<(), PdfError> {
            assert!(source.exists(), "temp source must exist during conversion");
            let folder = dest.parent().and_then(Path::file_name);
            if let Some(marker) = self.fail_for
                && folder.is_some_and(|name| name == marker)
            {
                return Err(PdfError {
                    path: dest.to_path_buf(),
                    message: "simulated converter failure".to_owned(),
                });
            }
            fs::write(dest, b"%PDF-fake").unwrap();
            self.converted.lock().unwrap().push(dest.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn converts_every_node_and_cleans_temp_files() {
        let (nodes, dist) = fixture();
        let engine = FakeEngine::new(None);

        assemble_pdf(
            &nodes,
            &resolver(dist.path()),
            PageOptions::default(),
            &PdfOptions::default(),
            &engine,
            "README",
            dist.path(),
            &|_, _| {},
        )
        .unwrap();

        assert!(dist.path().join("README.pdf").is_file());
        assert!(dist.path().join("A/README.pdf").is_file());
        // No stray temporary Markdown sources remain.
        let leftovers: Vec<_> = fs::read_dir(dist.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let (nodes, dist) = fixture();
        let engine = FakeEngine::new(Some("A"));
        let seen = Mutex::new(Vec::new());

        let result = assemble_pdf(
            &nodes,
            &resolver(dist.path()),
            PageOptions::default(),
            &PdfOptions::default(),
            &engine,
            "README",
            dist.path(),
            &|done, total| seen.lock().unwrap().push((done, total)),
        );

        // The pass itself succeeds; only the failing document is missing.
        assert!(result.is_ok());
        assert!(dist.path().join("README.pdf").is_file());
        assert!(!dist.path().join("A/README.pdf").exists());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn default_layout_is_a4_with_fixed_margins() {
        let options = PdfOptions::default();
        assert_eq!(options.format, "A4");
        assert_eq!(options.margin.top, "1.5cm");
        assert_eq!(options.margin.left, "1cm");
        assert!(options.print_background);
        assert!(!options.display_header_footer);
        assert!(!options.landscape);
    }

    #[test]
    fn options_serialize_for_the_converter() {
        let json = serde_json::to_string(&PdfOptions::default()).unwrap();
        assert!(json.contains("\"format\":\"A4\""));
        assert!(json.contains("\"printBackground\":true"));
        assert!(json.contains("\"displayHeaderFooter\":false"));
        assert!(json.contains("\"top\":\"1.5cm\""));
        // The stylesheet travels as its own converter flag.
        assert!(!json.contains("stylesheet"));
    }

    #[test]
    fn option_strings_are_escaped_in_json() {
        let options = PdfOptions {
            page_ranges: "1-2\"".to_owned(),
            ..PdfOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();

        assert!(json.contains(r#""pageRanges":"1-2\"""#));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["pageRanges"], "1-2\"");
        assert_eq!(parsed["margin"]["left"], "1cm");
    }
}
