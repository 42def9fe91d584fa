use crate::core::{CincinnatiPayload, Graph, Result};
use crate::domain::model::CLIENT_VERSION;
use crate::utils::error::FakeupError;
use serde::Deserialize;

pub const DEFAULT_BASEARCH: &str = "x86_64";

/// Raw query parameters of a graph request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQuery {
    pub current_os: Option<String>,
    pub os_checksum: Option<String>,
    pub stream: Option<String>,
    pub basearch: Option<String>,
}

/// A validated graph request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    pub os: String,
    pub stream: String,
    pub basearch: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl GraphQuery {
    /// `current_os` wins over `os_checksum`; one of them and `stream` are required.
    pub fn into_request(self, default_basearch: &str) -> Result<GraphRequest> {
        let os = non_empty(&self.current_os)
            .or_else(|| non_empty(&self.os_checksum))
            .ok_or_else(|| FakeupError::MissingParameter {
                name: "current_os".to_string(),
            })?
            .to_string();

        let stream = non_empty(&self.stream)
            .ok_or_else(|| FakeupError::MissingParameter {
                name: "stream".to_string(),
            })?
            .to_string();

        let basearch = non_empty(&self.basearch)
            .unwrap_or(default_basearch)
            .to_string();

        Ok(GraphRequest {
            os,
            stream,
            basearch,
        })
    }
}

impl GraphRequest {
    /// Source node standing for the requesting client.
    pub fn client_node(&self) -> CincinnatiPayload {
        CincinnatiPayload::checksum_node(CLIENT_VERSION.to_string(), self.os.clone(), 0)
    }
}

/// Two-node graph with a single edge from the client to `latest`.
pub fn build_graph(current: CincinnatiPayload, latest: CincinnatiPayload) -> Graph {
    Graph {
        nodes: vec![current, latest],
        edges: vec![(0, 1)],
    }
}
