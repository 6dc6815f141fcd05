//! Output format for rendered diagrams.

/// Dialect marker forcing PNG output: the ditaa renderer only produces PNG.
const DITAA_MARKER: &str = "@startditaa";

/// Output format for rendered diagram images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramFormat {
    /// Raster output (default).
    #[default]
    Png,
    /// Vector output.
    Svg,
}

impl DiagramFormat {
    /// Parse format from a configuration value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Return format as string representation (also the file extension).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Media type for embedded image data.
    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }

    /// Resolve the output format for a diagram source.
    ///
    /// Returns the configured default unless the source contains the ditaa
    /// dialect marker (case-insensitive), which forces PNG regardless of
    /// configuration.
    #[must_use]
    pub fn for_source(self, source: &str) -> Self {
        if source.to_lowercase().contains(DITAA_MARKER) {
            Self::Png
        } else {
            self
        }
    }
}
