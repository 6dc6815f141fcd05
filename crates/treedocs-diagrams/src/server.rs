//! PlantUML server addressing and HTTP fetching.
//!
//! The rendering service is URL-addressable: the diagram source is encoded
//! into the URL itself using the server's `~h` hex scheme, so a plain GET
//! returns the rendered image.

use std::time::Duration;

use ureq::Agent;

use crate::error::DiagramError;
use crate::format::DiagramFormat;

/// Default HTTP timeout for rendering requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create HTTP agent with the specified timeout.
///
/// Use this to create a reusable agent for connection pooling when making
/// multiple fetch calls.
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Build the rendering-service URL for a diagram source.
///
/// Uses the PlantUML server hex addressing scheme:
/// `{server}/{format}/~h{hex(source)}`.
pub fn diagram_url(server_url: &str, format: DiagramFormat, source: &str) -> String {
    let server = server_url.trim_end_matches('/');
    let encoded = hex::encode(source.as_bytes());
    format!("{server}/{}/~h{encoded}", format.as_str())
}

/// Append the source charset to a rendering URL as a query parameter.
pub fn with_charset(url: &str, charset: &str) -> String {
    if charset.is_empty() {
        url.to_owned()
    } else {
        format!("{url}?charset={charset}")
    }
}

/// Fetches rendered image bytes by URL.
///
/// The production implementation is [`HttpFetcher`]; tests substitute fakes
/// to exercise embed-mode resolution without a rendering service.
pub trait ImageFetcher: Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DiagramError>;
}

/// HTTP fetcher with a pooled agent.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DiagramError> {
        fetch(&self.agent, url)
    }
}

/// Fetch an image from the rendering service.
///
/// 2xx is success; anything else fails with the URL and status code.
pub fn fetch(agent: &Agent, url: &str) -> Result<Vec<u8>, DiagramError> {
    let response = agent.get(url).call().map_err(|e| DiagramError::Network {
        url: url.to_owned(),
        message: e.to_string(),
    })?;

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Err(DiagramError::Http {
            url: url.to_owned(),
            status,
        });
    }

    response
        .into_body()
        .read_to_vec()
        .map_err(|e| DiagramError::Network {
            url: url.to_owned(),
            message: e.to_string(),
        })
}
