use crate::domain::model::{Release, ReleasesJson};
use crate::domain::ports::ReleaseSource;
use crate::utils::error::Result;
use crate::utils::template::substitute_vars;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

/// Placeholder in the releases URL template replaced by the stream name.
pub const STREAM_PLACEHOLDER: &str = "${stream}";

pub const DEFAULT_RELEASES_URL: &str =
    "https://builds.coreos.fedoraproject.org/prod/streams/${stream}/releases.json";

/// Fetches `releases.json` documents over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReleaseSource {
    client: Client,
    url_template: String,
}

impl HttpReleaseSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    /// Index URL for `stream`.
    pub fn releases_url(&self, stream: &str) -> Result<Url> {
        let full = substitute_vars(&self.url_template, |name| {
            (name == "stream").then(|| stream.to_string())
        });
        Ok(Url::parse(&full)?)
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn latest_release(&self, stream: &str) -> Result<Option<Release>> {
        let url = self.releases_url(stream)?;
        tracing::debug!("Fetching releases for '{}' from {}", stream, url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let mut index: ReleasesJson = response.json().await?;

        tracing::debug!(
            "Stream '{}' lists {} release(s)",
            stream,
            index.releases.len()
        );
        Ok(index.releases.pop())
    }
}
