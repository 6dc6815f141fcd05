//! `treedocs generate` command implementation.

use std::path::PathBuf;

use clap::Args;

use treedocs_assemble::{
    CommandPdfEngine, DocsifyTemplate, PageOptions, PdfOptions, WebsiteOptions,
    assemble_complete_markdown, assemble_complete_pdf, assemble_markdown, assemble_pdf,
    assemble_website,
};
use treedocs_config::{CliSettings, Config};
use treedocs_diagrams::{
    DiagramFormat, DiagramResolver, RemoteRenderer, ResolverOptions, generate_images,
};
use treedocs_tree::TreeBuilder;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct GenerateArgs {
    /// Documentation source root (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Output destination root (overrides config).
    #[arg(short, long)]
    dist: Option<PathBuf>,

    /// Project name (overrides config).
    #[arg(long)]
    project_name: Option<String>,

    /// Skip per-folder Markdown output.
    #[arg(long)]
    no_md: bool,

    /// Generate one PDF per folder.
    #[arg(long)]
    pdf: bool,

    /// Generate the documentation website.
    #[arg(long)]
    website: bool,

    /// Generate a single concatenated Markdown document.
    #[arg(long)]
    complete_md: bool,

    /// Generate a single concatenated PDF document.
    #[arg(long)]
    complete_pdf: bool,

    /// Render diagram images to local files instead of linking the server.
    #[arg(long)]
    local_images: bool,

    /// Diagram output format: "png" or "svg" (overrides config).
    #[arg(long)]
    format: Option<String>,

    /// Embed diagrams as base64 data.
    #[arg(long)]
    embed: bool,

    /// PlantUML server URL (overrides config).
    #[arg(long)]
    server_url: Option<String>,

    /// Markdown-to-PDF converter program.
    #[arg(long, default_value = "md-to-pdf")]
    pdf_converter: String,

    /// Path to configuration file (default: auto-discover treedocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl GenerateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            root_folder: self.root.clone(),
            dist_folder: self.dist.clone(),
            project_name: self.project_name.clone(),
            generate_md: self.no_md.then_some(false),
            generate_pdf: self.pdf.then_some(true),
            generate_website: self.website.then_some(true),
            generate_complete_md: self.complete_md.then_some(true),
            generate_complete_pdf: self.complete_pdf.then_some(true),
            generate_local_images: self.local_images.then_some(true),
            diagram_format: self.format.clone(),
            embed_diagram: self.embed.then_some(true),
            plantuml_server_url: self.server_url.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(config = %path.display(), "loaded configuration");
        }

        let root = &config.paths_resolved.root_folder;
        let dist = &config.paths_resolved.dist_folder;
        output.info(&format!("Source: {}", root.display()));
        output.info(&format!("Output: {}", dist.display()));

        let nodes = TreeBuilder::new(root, dist, &config.project.homepage_name).build()?;
        output.info(&format!("Found {} folders", nodes.len()));

        // Unknown formats are rejected during config validation.
        let format = DiagramFormat::parse(&config.diagrams.format).unwrap_or_default();

        // Local images must exist before any assembler references or embeds them.
        if config.output.generate_local_images {
            let renderer = RemoteRenderer::new(config.diagrams.server_url.clone());
            generate_images(
                &nodes,
                dist,
                &renderer,
                format,
                &config.diagrams.charset,
                &|done, total| output.progress("images", done, total),
            )?;
            output.success("Generated diagram images");
        }

        let resolver = DiagramResolver::new(ResolverOptions {
            format,
            local_images: config.output.generate_local_images,
            embed: config.diagrams.embed,
            include_link: config.diagrams.include_link,
            server_url: config.diagrams.server_url.clone(),
            dist_root: dist.clone(),
        });
        let page_options = PageOptions {
            include_breadcrumbs: config.content.include_breadcrumbs,
            include_table_of_contents: config.content.include_table_of_contents,
            include_navigation: config.content.include_navigation,
            diagrams_on_top: config.content.diagrams_on_top,
        };
        let pdf_options = PdfOptions {
            stylesheet: config.website.pdf_css.clone(),
            ..PdfOptions::default()
        };
        let engine = CommandPdfEngine::new(self.pdf_converter.as_str());

        if config.output.generate_md {
            assemble_markdown(
                &nodes,
                &resolver,
                page_options,
                &config.output.md_file_name,
                dist,
                &|done, total| output.progress("pages", done, total),
            )?;
            output.success("Generated Markdown pages");
        }

        if config.output.generate_pdf {
            assemble_pdf(
                &nodes,
                &resolver,
                page_options,
                &pdf_options,
                &engine,
                &config.output.md_file_name,
                dist,
                &|done, total| output.progress("pdfs", done, total),
            )?;
            output.success("Generated PDF pages");
        }

        if config.output.generate_complete_md {
            assemble_complete_markdown(
                &nodes,
                &resolver,
                page_options,
                &config.project.name,
                dist,
                &|done, total| output.progress("sections", done, total),
            )?;
            output.success(&format!("Generated {}.md", config.project.name));
        }

        if config.output.generate_complete_pdf {
            assemble_complete_pdf(
                &nodes,
                &resolver,
                page_options,
                &pdf_options,
                &engine,
                &config.project.name,
                dist,
                &|done, total| output.progress("sections", done, total),
            )?;
            output.success(&format!("Generated {}.pdf", config.project.name));
        }

        if config.output.generate_website {
            let template = match &config.website.template_path {
                Some(path) => DocsifyTemplate::from_file(path)?,
                None => DocsifyTemplate::default(),
            };
            let repo_url = &config.project.repo_url;
            let website_options = WebsiteOptions {
                project_name: config.project.name.clone(),
                repo_url: (!repo_url.is_empty()).then(|| repo_url.clone()),
                web_file_name: config.output.web_file_name.clone(),
                theme: config.website.theme.clone(),
                page: page_options,
            };
            assemble_website(
                &nodes,
                &resolver,
                &website_options,
                &template,
                dist,
                &|done, total| output.progress("pages", done, total),
            )?;
            output.success("Generated website");
        }

        output.success(&format!(
            "Documentation generated to {}",
            dist.display()
        ));
        Ok(())
    }
}
