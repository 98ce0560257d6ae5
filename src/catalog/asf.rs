//! ASF SearchAPI-backed stack provider.
//!
//! Wraps a persistent [`ureq::Agent`] with a global timeout and queries the
//! baseline endpoint for one reference scene at a time. Transport failures
//! map to the retryable [`CatalogError::Search`] category; bodies that
//! decode but do not match the expected shape map to
//! [`CatalogError::Malformed`] and are not retried.

use std::time::Duration;

use serde::Deserialize;
use ureq::Agent;

use super::{CatalogError, StackEntry, StackProvider};

const DEFAULT_ENDPOINT: &str = "https://api.daac.asf.alaska.edu/services/search/baseline";

/// Production catalog client.
#[derive(Debug, Clone)]
pub struct AsfCatalog {
    http_client: Agent,
    endpoint: String,
}

impl AsfCatalog {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Point the client at a non-default endpoint (e.g. a staging mirror).
    pub fn with_endpoint(endpoint: &str) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build();
        AsfCatalog {
            http_client: config.into(),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for AsfCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the baseline endpoint response.
#[derive(Debug, Deserialize)]
struct StackRecord {
    #[serde(rename = "sceneName")]
    scene_name: String,
    #[serde(rename = "temporalBaseline")]
    temporal_baseline: Option<f64>,
    #[serde(rename = "perpendicularBaseline")]
    perpendicular_baseline: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StackResponse {
    results: Vec<StackRecord>,
}

impl StackProvider for AsfCatalog {
    fn fetch_stack(&self, reference: &str) -> Result<Vec<StackEntry>, CatalogError> {
        let url = format!("{}?reference={}&output=json", self.endpoint, reference);
        let body = self
            .http_client
            .get(&url)
            .call()
            .map_err(|e| CatalogError::Search(e.to_string()))?
            .body_mut()
            .read_to_string()
            .map_err(|e| CatalogError::Search(e.to_string()))?;
        let parsed: StackResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Ok(parsed
            .results
            .into_iter()
            .map(|record| StackEntry {
                id: record.scene_name,
                temporal_days: record.temporal_baseline,
                perpendicular_m: record.perpendicular_baseline,
            })
            .collect())
    }
}
