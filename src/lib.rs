pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::HttpReleaseSource;
pub use api::{router, AppState};
pub use config::{CliConfig, ServiceConfig};
pub use crate::core::scraper::Scraper;
pub use utils::error::{FakeupError, Result};
