//! # Catalog: the networked acquisition-stack boundary
//!
//! The baseline builder needs, for every acquisition lacking orbit state,
//! the acquisition's *related stack*: the catalog-computed temporal and
//! perpendicular baselines against every other scene on the same
//! track/frame. That network dependency is narrowed to the
//! [`StackProvider`] trait so the selection pipeline can be driven by a
//! mock catalog in tests and by [`asf::AsfCatalog`] in production.
//!
//! Errors are split into a **retryable** search/transport category and a
//! non-retryable malformed-response category; the retry loop around each
//! fetch lives in [`retry::RetryPolicy`].

pub mod asf;
pub mod retry;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::AcquisitionId;

/// One related scene in a fetched stack, with the catalog-computed
/// baselines relative to the stack's reference scene.
///
/// Baseline values are optional on the wire: the catalog omits them for
/// scenes it could not co-register. Missing values are mapped to the
/// [`MISSING_BASELINE`](crate::constants::MISSING_BASELINE) sentinel when
/// the entry is stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StackEntry {
    pub id: AcquisitionId,
    pub temporal_days: Option<f64>,
    pub perpendicular_m: Option<f64>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Search/transport failure. Transient by assumption: retried.
    #[error("stack search failed: {0}")]
    Search(String),

    /// Response decoded but did not match the expected shape. Not retried.
    #[error("malformed stack response: {0}")]
    Malformed(String),
}

impl CatalogError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Search(_))
    }
}

/// Source of related-acquisition stacks.
///
/// Implementations must be [`Sync`]: the baseline builder calls
/// `fetch_stack` concurrently from its worker pool.
pub trait StackProvider: Sync {
    /// Fetch the related stack for `reference`, with baselines computed
    /// by the catalog relative to that scene.
    fn fetch_stack(&self, reference: &str) -> Result<Vec<StackEntry>, CatalogError>;
}
