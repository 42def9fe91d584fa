use crate::domain::model::Release;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the scraper gets release indexes from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Latest release published on `stream`, if the stream has any.
    async fn latest_release(&self, stream: &str) -> Result<Option<Release>>;
}

pub trait ConfigProvider: Send + Sync {
    fn streams(&self) -> &[String];
    fn refresh_pause(&self) -> std::time::Duration;
    fn releases_url(&self) -> &str;
    fn default_basearch(&self) -> &str;
}
