use crate::adapters::http::{DEFAULT_RELEASES_URL, STREAM_PLACEHOLDER};
use crate::core::graph::DEFAULT_BASEARCH;
use crate::core::ConfigProvider;
use crate::utils::error::{FakeupError, Result};
use crate::utils::template::substitute_vars;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 9876;
pub const DEFAULT_REFRESH_PAUSE_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STREAMS: [&str; 3] = ["bodhi-updates", "testing", "testing-devel"];

/// Service configuration. Every key is optional in the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub scraper: ScraperConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub streams: Vec<String>,
    pub refresh_pause_secs: u64,
    pub releases_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            streams: DEFAULT_STREAMS.iter().map(|s| s.to_string()).collect(),
            refresh_pause_secs: DEFAULT_REFRESH_PAUSE_SECS,
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub default_basearch: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_basearch: DEFAULT_BASEARCH.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FakeupError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML document, expanding `${VAR}` from the environment first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FakeupError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `${stream}` belongs to the releases URL template and is never expanded here.
    fn substitute_env_vars(content: &str) -> String {
        substitute_vars(content, |name| {
            if name == "stream" {
                return None;
            }
            std::env::var(name).ok()
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.address, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.scraper.request_timeout_secs)
    }
}

impl ConfigProvider for ServiceConfig {
    fn streams(&self) -> &[String] {
        &self.scraper.streams
    }

    fn refresh_pause(&self) -> Duration {
        Duration::from_secs(self.scraper.refresh_pause_secs)
    }

    fn releases_url(&self) -> &str {
        &self.scraper.releases_url
    }

    fn default_basearch(&self) -> &str {
        &self.graph.default_basearch
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("server.port", self.server.port.into(), 1)?;

        validation::validate_non_empty_list("scraper.streams", &self.scraper.streams)?;
        validation::validate_positive_number(
            "scraper.refresh_pause_secs",
            self.scraper.refresh_pause_secs,
            1,
        )?;
        validation::validate_positive_number(
            "scraper.request_timeout_secs",
            self.scraper.request_timeout_secs,
            1,
        )?;

        validation::validate_contains(
            "scraper.releases_url",
            &self.scraper.releases_url,
            STREAM_PLACEHOLDER,
        )?;
        // Check the template as it will be requested.
        for stream in &self.scraper.streams {
            let url = self.scraper.releases_url.replace(STREAM_PLACEHOLDER, stream);
            validation::validate_url("scraper.releases_url", &url)?;
        }

        validation::validate_non_empty_string("graph.default_basearch", &self.graph.default_basearch)?;
        Ok(())
    }
}
