use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SCHEME_KEY: &str = "org.fedoraproject.coreos.scheme";
pub const AGE_INDEX_KEY: &str = "org.fedoraproject.coreos.releases.age_index";

/// Version label of the synthesized node describing the requesting client.
pub const CLIENT_VERSION: &str = "client-os-version";

/// A node in the update graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CincinnatiPayload {
    pub version: String,
    pub metadata: HashMap<String, String>,
    pub payload: String,
}

impl CincinnatiPayload {
    /// Node whose payload is an OS checksum, tagged with its age in the release history.
    pub fn checksum_node(version: String, checksum: String, age_index: u32) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(SCHEME_KEY.to_string(), "checksum".to_string());
        metadata.insert(AGE_INDEX_KEY.to_string(), age_index.to_string());
        Self {
            version,
            metadata,
            payload: checksum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<CincinnatiPayload>,
    pub edges: Vec<(u64, u64)>,
}

/// Upstream `releases.json` document for a single stream.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleasesJson {
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub version: String,
    pub commits: Vec<ReleaseCommit>,
    #[serde(default)]
    pub metadata: Option<String>,
}

impl Release {
    /// Checksum of the last commit built for `basearch`.
    pub fn checksum_for(&self, basearch: &str) -> Option<&str> {
        self.commits
            .iter()
            .rev()
            .find(|commit| commit.architecture == basearch)
            .map(|commit| commit.checksum.as_str())
            .filter(|checksum| !checksum.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseCommit {
    pub architecture: String,
    pub checksum: String,
}
