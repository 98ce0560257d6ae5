//! Shared fixtures for the integration tests: an in-memory catalog with
//! scriptable transient failures, and builders for synthetic stacks.

use std::collections::HashMap;
use std::sync::Mutex;

use hifitime::Epoch;

use stackpair::catalog::{CatalogError, StackEntry, StackProvider};
use stackpair::constants::{GroupKey, UNGROUPED};
use stackpair::Acquisition;

/// In-memory stand-in for the baseline catalog.
///
/// Every reference id fetches the stack scripted for it, after failing
/// `failures_before_success` times with a retryable search error. Call
/// counts are recorded per reference so tests can assert retry behavior.
pub struct MockCatalog {
    stacks: HashMap<String, Vec<StackEntry>>,
    failures_before_success: u32,
    calls: Mutex<HashMap<String, u32>>,
}

impl MockCatalog {
    pub fn new(stacks: HashMap<String, Vec<StackEntry>>) -> Self {
        Self::flaky(stacks, 0)
    }

    /// A catalog whose every fetch fails `failures_before_success` times
    /// before the scripted stack comes through.
    pub fn flaky(stacks: HashMap<String, Vec<StackEntry>>, failures_before_success: u32) -> Self {
        MockCatalog {
            stacks,
            failures_before_success,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// How many times `fetch_stack` was called for `reference`.
    pub fn call_count(&self, reference: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(reference)
            .copied()
            .unwrap_or(0)
    }
}

impl StackProvider for MockCatalog {
    fn fetch_stack(&self, reference: &str) -> Result<Vec<StackEntry>, CatalogError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(reference.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if attempt <= self.failures_before_success {
            return Err(CatalogError::Search(format!(
                "scripted outage for {reference} (attempt {attempt})"
            )));
        }
        self.stacks
            .get(reference)
            .cloned()
            .ok_or_else(|| CatalogError::Malformed(format!("no scripted stack for {reference}")))
    }
}

/// An acquisition `day` days into the synthetic campaign, without orbit
/// state, so its baselines come from the catalog.
pub fn remote_acquisition(id: &str, day: f64) -> Acquisition {
    remote_acquisition_in(id, day, UNGROUPED)
}

pub fn remote_acquisition_in(id: &str, day: f64, group: GroupKey) -> Acquisition {
    Acquisition::from_epoch(id, Epoch::from_mjd_utc(59000.0 + day), None, group)
}

/// Script a full catalog for `scenes`, each `(id, day, cross_track_m)`:
/// every reference's stack lists every other scene with the signed
/// baseline differences the real service would report.
pub fn scripted_stacks(scenes: &[(&str, f64, f64)]) -> HashMap<String, Vec<StackEntry>> {
    scenes
        .iter()
        .map(|(reference, ref_day, ref_cross)| {
            let stack = scenes
                .iter()
                .filter(|(id, _, _)| id != reference)
                .map(|(id, day, cross)| StackEntry {
                    id: (*id).to_string(),
                    temporal_days: Some(day - ref_day),
                    perpendicular_m: Some(cross - ref_cross),
                })
                .collect();
            ((*reference).to_string(), stack)
        })
        .collect()
}
