//! # Interferometric pair selection
//!
//! The entry points of the crate. [`select_pairs`] runs the pipeline on a
//! flat acquisition list; [`select_pairs_grouped`] runs it independently
//! per (track, frame) group. Both produce a [`PairSelection`] per group:
//! the sparse pair network together with the baseline table it was drawn
//! from, so callers can inspect the baselines behind every selected pair.
//!
//! The pipeline per group is:
//!
//! 1. order acquisitions by time,
//! 2. build the baseline table ([`crate::baseline::builder`]),
//! 3. keep pairs near a target interval and under the baseline caps,
//! 4. repair and bound connectivity ([`connectivity`]).

pub mod connectivity;

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;
use log::info;

use crate::acquisitions::Acquisition;
use crate::baseline::builder::build_baseline_table;
use crate::baseline::{BaselineTable, Pair};
use crate::catalog::retry::RetryPolicy;
use crate::catalog::StackProvider;
use crate::constants::{
    AcquisitionGroups, Days, GroupKey, GroupedSelections, Meter, DEFAULT_DT_MAX,
    DEFAULT_DT_TARGETS, DEFAULT_DT_TOLERANCE, DEFAULT_FETCH_WIDTH, DEFAULT_MAX_DEGREE,
    DEFAULT_MIN_DEGREE, DEFAULT_PB_MAX, UNGROUPED,
};
use crate::stackpair_errors::StackpairError;

/// Tuning knobs for the selection pipeline.
///
/// The defaults reproduce the standard short-baseline configuration:
/// pairs near the usual revisit multiples, capped at 120 days and 150 m,
/// every acquisition connected to at least 3 neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Temporal separations (days) the primary filter aims for.
    pub dt_targets: Vec<Days>,
    /// Half-width (days) of the window around each target.
    pub dt_tolerance: Days,
    /// Hard cap on temporal baseline, inclusive.
    pub dt_max: Days,
    /// Hard cap on perpendicular baseline, inclusive.
    pub pb_max: Meter,
    /// Minimum degree the connectivity pass restores (when `force_connect`).
    pub min_degree: usize,
    /// Maximum degree the connectivity pass trims down to.
    pub max_degree: usize,
    /// Whether under-connected acquisitions get extra pairs added.
    pub force_connect: bool,
    /// Worker pool width for catalog fetches.
    pub fetch_width: usize,
    /// Retry schedule for each catalog fetch.
    pub retry: RetryPolicy,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            dt_targets: DEFAULT_DT_TARGETS.to_vec(),
            dt_tolerance: DEFAULT_DT_TOLERANCE,
            dt_max: DEFAULT_DT_MAX,
            pb_max: DEFAULT_PB_MAX,
            min_degree: DEFAULT_MIN_DEGREE,
            max_degree: DEFAULT_MAX_DEGREE,
            force_connect: true,
            fetch_width: DEFAULT_FETCH_WIDTH,
            retry: RetryPolicy::default(),
        }
    }
}

/// The outcome of the pipeline for one group.
#[derive(Debug, Clone)]
pub struct PairSelection {
    /// Selected pairs, in canonical order.
    pub pairs: Vec<Pair>,
    /// The baseline table the pairs were selected from.
    pub table: BaselineTable,
}

impl PairSelection {
    /// Number of selected pairs each acquisition participates in.
    ///
    /// Acquisitions appearing in no pair are absent from the map.
    pub fn degree_counts(&self) -> HashMap<String, usize> {
        let mut degrees = HashMap::new();
        for pair in &self.pairs {
            *degrees.entry(pair.earlier.clone()).or_insert(0) += 1;
            *degrees.entry(pair.later.clone()).or_insert(0) += 1;
        }
        degrees
    }
}

/// Select pairs from a flat acquisition list.
///
/// Arguments
/// -----------------
/// * `acquisitions`: the stack, in any order.
/// * `provider`: catalog used for acquisitions lacking orbit state.
/// * `config`: pipeline tuning, see [`SelectionConfig`].
///
/// Return
/// ----------
/// * The selection, or an error if the stack is degenerate or a catalog
///   fetch was exhausted.
///
/// See also
/// ------------
/// * [`select_pairs_grouped`] -- per-(track, frame) variant.
pub fn select_pairs<P: StackProvider>(
    acquisitions: &[Acquisition],
    provider: &P,
    config: &SelectionConfig,
) -> Result<PairSelection, StackpairError> {
    select_group(UNGROUPED, acquisitions, provider, config)
}

/// Select pairs independently within each (track, frame) group.
///
/// Groups are processed in ascending key order; the first failing group
/// aborts the whole call.
pub fn select_pairs_grouped<P: StackProvider>(
    groups: &AcquisitionGroups,
    provider: &P,
    config: &SelectionConfig,
) -> Result<GroupedSelections, StackpairError> {
    let mut selections = HashMap::with_capacity(groups.len());
    for key in groups.keys().sorted() {
        let selection = select_group(*key, &groups[key], provider, config)?;
        selections.insert(*key, selection);
    }
    Ok(selections)
}

fn select_group<P: StackProvider>(
    key: GroupKey,
    acquisitions: &[Acquisition],
    provider: &P,
    config: &SelectionConfig,
) -> Result<PairSelection, StackpairError> {
    if acquisitions.len() < 2 {
        return Err(StackpairError::DegenerateInput {
            group: group_label(key),
            count: acquisitions.len(),
        });
    }

    let mut ordered: Vec<&Acquisition> = acquisitions.iter().collect();
    ordered.sort_by(|a, b| {
        a.epoch
            .partial_cmp(&b.epoch)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let table = build_baseline_table(acquisitions, provider, &config.retry, config.fetch_width)?;
    let candidates = primary_filter(&table, config);
    info!(
        "group {}: {} candidate pair(s) from {} table entr(ies)",
        group_label(key),
        candidates.len(),
        table.len()
    );
    let pairs = connectivity::enforce(&candidates, &table, &ordered, config);
    Ok(PairSelection { pairs, table })
}

/// Keep the pairs close to a target interval and within both baseline caps.
///
/// All comparisons are inclusive. The result is in canonical pair order.
pub fn primary_filter(table: &BaselineTable, config: &SelectionConfig) -> Vec<Pair> {
    table
        .iter()
        .filter(|(_, entry)| {
            let near_target = config
                .dt_targets
                .iter()
                .any(|target| (entry.temporal_days - target).abs() <= config.dt_tolerance);
            near_target
                && entry.temporal_days <= config.dt_max
                && entry.perpendicular_m <= config.pb_max
        })
        .map(|(pair, _)| pair.clone())
        .sorted()
        .collect()
}

fn group_label(key: GroupKey) -> String {
    if key == UNGROUPED {
        "ungrouped".to_string()
    } else {
        format!("({}, {})", key.0, key.1)
    }
}
