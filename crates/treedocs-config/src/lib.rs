//! Configuration management for treedocs.
//!
//! Parses `treedocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `project.repo_url`
//! - `diagrams.server_url`

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "treedocs.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override documentation source root.
    pub root_folder: Option<PathBuf>,
    /// Override output destination root.
    pub dist_folder: Option<PathBuf>,
    /// Override project name.
    pub project_name: Option<String>,
    /// Override per-node Markdown generation.
    pub generate_md: Option<bool>,
    /// Override per-node PDF generation.
    pub generate_pdf: Option<bool>,
    /// Override website generation.
    pub generate_website: Option<bool>,
    /// Override concatenated Markdown generation.
    pub generate_complete_md: Option<bool>,
    /// Override concatenated PDF generation.
    pub generate_complete_pdf: Option<bool>,
    /// Override local image generation.
    pub generate_local_images: Option<bool>,
    /// Override diagram output format.
    pub diagram_format: Option<String>,
    /// Override diagram embedding.
    pub embed_diagram: Option<bool>,
    /// Override PlantUML server URL.
    pub plantuml_server_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project identity and links.
    pub project: ProjectConfig,
    /// Source and destination paths (relative strings from TOML).
    paths: PathsConfigRaw,
    /// Output mode toggles.
    pub output: OutputConfig,
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,
    /// Document content options (navigation, breadcrumbs, ordering).
    pub content: ContentConfig,
    /// Website generation options.
    pub website: WebsiteConfig,

    /// Resolved paths configuration (set after loading).
    #[serde(skip)]
    pub paths_resolved: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project identity configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used for concatenated output filenames and the website title.
    pub name: String,
    /// Display name for the root folder node.
    pub homepage_name: String,
    /// Link to the source repository, shown on the website homepage.
    pub repo_url: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "docs".to_owned(),
            homepage_name: "Home".to_owned(),
            repo_url: String::new(),
        }
    }
}

/// Raw paths configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PathsConfigRaw {
    root_folder: Option<String>,
    dist_folder: Option<String>,
}

/// Resolved paths configuration with absolute paths.
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Documentation source root.
    pub root_folder: PathBuf,
    /// Output destination root.
    pub dist_folder: PathBuf,
}

/// Output mode toggles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputConfig {
    /// Generate one Markdown file per folder.
    pub generate_md: bool,
    /// Generate one PDF file per folder.
    pub generate_pdf: bool,
    /// Generate a linked website with sidebar and homepage.
    pub generate_website: bool,
    /// Generate a single concatenated Markdown document.
    pub generate_complete_md: bool,
    /// Generate a single concatenated PDF document.
    pub generate_complete_pdf: bool,
    /// Render diagram images to disk instead of linking the remote service.
    pub generate_local_images: bool,
    /// Base name for per-node Markdown/PDF files.
    pub md_file_name: String,
    /// Base name for per-node website Markdown files.
    pub web_file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            generate_md: true,
            generate_pdf: false,
            generate_website: false,
            generate_complete_md: false,
            generate_complete_pdf: false,
            generate_local_images: false,
            md_file_name: "README".to_owned(),
            web_file_name: "HOME".to_owned(),
        }
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Default output image format ("png" or "svg").
    pub format: String,
    /// Character set for diagram sources.
    pub charset: String,
    /// Inline diagrams as base64 data instead of image references.
    pub embed: bool,
    /// Emit a secondary "go to diagram" link next to each image.
    pub include_link: bool,
    /// PlantUML rendering server URL.
    pub server_url: String,
    /// PlantUML version selector ("latest" or "1.<year>.<patch>").
    pub version: String,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            format: "png".to_owned(),
            charset: "utf-8".to_owned(),
            embed: false,
            include_link: false,
            server_url: "https://www.plantuml.com/plantuml".to_owned(),
            version: "latest".to_owned(),
        }
    }
}

impl DiagramsConfig {
    /// Validate the PlantUML version selector.
    ///
    /// Accepted values are `latest` or a `1.<year>.<patch>` version string.
    /// This runs before any tree walk so an unsupported renderer version
    /// fails the build up front.
    pub fn validate_version(&self) -> Result<(), ConfigError> {
        let v = self.version.as_str();
        let well_formed = v == "latest"
            || v.strip_prefix("1.").is_some_and(|rest| {
                let mut parts = rest.split('.');
                matches!(
                    (parts.next(), parts.next(), parts.next()),
                    (Some(year), Some(patch), None)
                        if year.chars().all(|c| c.is_ascii_digit())
                            && patch.chars().all(|c| c.is_ascii_digit())
                            && !year.is_empty()
                            && !patch.is_empty()
                )
            });
        if well_formed {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedPlantUmlVersion(self.version.clone()))
        }
    }
}

/// Document content options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ContentConfig {
    /// Include a raw-folder-path breadcrumb above each node section.
    pub include_breadcrumbs: bool,
    /// Include a full-tree table of contents on each page.
    pub include_table_of_contents: bool,
    /// Include parent link and child-folder navigation.
    pub include_navigation: bool,
    /// Place trailing diagram images before the Markdown content.
    pub diagrams_on_top: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            include_breadcrumbs: false,
            include_table_of_contents: true,
            include_navigation: true,
            diagrams_on_top: false,
        }
    }
}

/// Website generation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    /// Docsify theme stylesheet reference.
    pub theme: String,
    /// Optional stylesheet passed to the PDF converter.
    pub pdf_css: Option<String>,
    /// Optional homepage template file overriding the built-in template.
    pub template_path: Option<PathBuf>,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            theme: "//cdn.jsdelivr.net/npm/docsify/themes/vue.css".to_owned(),
            pdf_css: None,
            template_path: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Unsupported PlantUML version selector.
    #[error("Unsupported PlantUML version: {0} (expected \"latest\" or \"1.<year>.<patch>\")")]
    UnsupportedPlantUmlVersion(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., `diagrams.server_url`).
        field: String,
        /// Error message.
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `treedocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root_folder {
            self.paths_resolved.root_folder.clone_from(root);
        }
        if let Some(dist) = &settings.dist_folder {
            self.paths_resolved.dist_folder.clone_from(dist);
        }
        if let Some(name) = &settings.project_name {
            self.project.name.clone_from(name);
        }
        if let Some(v) = settings.generate_md {
            self.output.generate_md = v;
        }
        if let Some(v) = settings.generate_pdf {
            self.output.generate_pdf = v;
        }
        if let Some(v) = settings.generate_website {
            self.output.generate_website = v;
        }
        if let Some(v) = settings.generate_complete_md {
            self.output.generate_complete_md = v;
        }
        if let Some(v) = settings.generate_complete_pdf {
            self.output.generate_complete_pdf = v;
        }
        if let Some(v) = settings.generate_local_images {
            self.output.generate_local_images = v;
        }
        if let Some(format) = &settings.diagram_format {
            self.diagrams.format.clone_from(format);
        }
        if let Some(v) = settings.embed_diagram {
            self.diagrams.embed = v;
        }
        if let Some(url) = &settings.plantuml_server_url {
            self.diagrams.server_url.clone_from(url);
        }
    }

    /// Validate configuration values.
    ///
    /// Called automatically at the end of [`Config::load`], after CLI
    /// settings are applied.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.is_empty() {
            return Err(ConfigError::Validation(
                "project.name cannot be empty".to_owned(),
            ));
        }
        if self.output.md_file_name.is_empty() {
            return Err(ConfigError::Validation(
                "output.md_file_name cannot be empty".to_owned(),
            ));
        }
        if !matches!(self.diagrams.format.as_str(), "png" | "svg") {
            return Err(ConfigError::Validation(format!(
                "diagrams.format must be \"png\" or \"svg\", got \"{}\"",
                self.diagrams.format
            )));
        }
        self.diagrams.validate_version()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            project: ProjectConfig::default(),
            paths: PathsConfigRaw::default(),
            output: OutputConfig::default(),
            diagrams: DiagramsConfig::default(),
            content: ContentConfig::default(),
            website: WebsiteConfig::default(),
            paths_resolved: PathsConfig {
                root_folder: base.join("docs"),
                dist_folder: base.join("dist"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand `${VAR}` references in string configuration values.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.project.repo_url = expand_field(&self.project.repo_url, "project.repo_url")?;
        self.diagrams.server_url =
            expand_field(&self.diagrams.server_url, "diagrams.server_url")?;
        Ok(())
    }

    /// Resolve relative path strings against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |raw: Option<&String>, default: &str| {
            let path = raw.map_or_else(|| PathBuf::from(default), PathBuf::from);
            if path.is_absolute() {
                path
            } else {
                config_dir.join(path)
            }
        };
        self.paths_resolved = PathsConfig {
            root_folder: resolve(self.paths.root_folder.as_ref(), "docs"),
            dist_folder: resolve(self.paths.dist_folder.as_ref(), "dist"),
        };
    }
}

/// Expand environment variables in a single field value.
fn expand_field(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}
