pub mod graph;
pub mod scraper;

pub use crate::domain::model::{CincinnatiPayload, Graph, Release};
pub use crate::domain::ports::{ConfigProvider, ReleaseSource};
pub use crate::utils::error::Result;
