//! # Baseline table construction (hybrid local / network)
//!
//! Builds the [`BaselineTable`] for one acquisition group in two passes:
//!
//! - **Local pass**: acquisitions carrying an [`OrbitState`] are anchored
//!   to one common reference in O(N); pairwise perpendicular baselines are
//!   anchor differences, temporal baselines come from the parsed epochs.
//!   No network traffic.
//! - **Network pass**: acquisitions without orbit state have their related
//!   stack fetched from the [`StackProvider`], concurrently over a bounded
//!   worker pool with per-fetch retry. Workers accumulate results locally
//!   and hand them to the single table owner over a channel; the owner
//!   merges first-writer-wins.
//!
//! A fetch that exhausts its retry budget fails the whole build: a partial
//! table would be misread downstream as "no valid pair" instead of "data
//! unavailable".

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use itertools::Itertools;
use log::{debug, info};

use crate::acquisitions::{temporal_baseline_days, Acquisition};
use crate::baseline::{BaselineEntry, BaselineTable, Pair};
use crate::catalog::retry::RetryPolicy;
use crate::catalog::{CatalogError, StackEntry, StackProvider};
use crate::stackpair_errors::StackpairError;

/// One worker's accumulated fetches: indices into the remote partition,
/// each with the stack returned by the catalog.
type FetchBatch = Vec<(usize, Vec<StackEntry>)>;

/// Build the baseline table covering every pair the selection algorithm
/// may need for `acquisitions`.
///
/// Arguments
/// -----------------
/// * `acquisitions`: one group's acquisitions (any order).
/// * `provider`: source of related-acquisition stacks for the network pass.
/// * `retry`: retry schedule applied to each individual fetch.
/// * `fetch_width`: worker pool width for the network pass (clamped to at
///   least 1 and at most the number of remote acquisitions).
///
/// Return
/// ----------
/// * The complete table, or [`StackpairError::FetchExhausted`] if any
///   remote acquisition's stack could not be fetched.
pub fn build_baseline_table<P: StackProvider>(
    acquisitions: &[Acquisition],
    provider: &P,
    retry: &RetryPolicy,
    fetch_width: usize,
) -> Result<BaselineTable, StackpairError> {
    let mut table = BaselineTable::new();

    let (local, remote): (Vec<&Acquisition>, Vec<&Acquisition>) =
        acquisitions.iter().partition(|a| a.orbit.is_some());
    info!(
        "building baseline table: {} acquisitions with orbit state, {} needing catalog fetches",
        local.len(),
        remote.len()
    );

    fill_local_entries(&local, &mut table);
    if !remote.is_empty() {
        fill_remote_entries(acquisitions, &remote, provider, retry, fetch_width, &mut table)?;
    }
    Ok(table)
}

/// O(N) anchored pass over the orbit-carrying partition.
fn fill_local_entries(local: &[&Acquisition], table: &mut BaselineTable) {
    // Earliest orbit-carrying acquisition is the common anchor reference;
    // any choice gives identical pairwise values, earliest is deterministic.
    let Some(reference) = local
        .iter()
        .copied()
        .reduce(|best, a| if a.epoch < best.epoch { a } else { best })
    else {
        return;
    };
    let Some(ref_orbit) = reference.orbit else {
        return;
    };

    let anchors: Vec<(&Acquisition, f64)> = local
        .iter()
        .filter_map(|a| {
            a.orbit
                .as_ref()
                .map(|orbit| (*a, orbit.anchored_perpendicular(&ref_orbit)))
        })
        .collect();

    for (&(a, anchor_a), &(b, anchor_b)) in anchors.iter().tuple_combinations() {
        let entry = BaselineEntry {
            temporal_days: temporal_baseline_days(&a.epoch, &b.epoch),
            perpendicular_m: (anchor_a - anchor_b).abs(),
        };
        table.insert_first(Pair::ordered(a, b), entry);
    }
}

/// Concurrent catalog pass over the partition lacking orbit state.
fn fill_remote_entries<P: StackProvider>(
    all: &[Acquisition],
    remote: &[&Acquisition],
    provider: &P,
    retry: &RetryPolicy,
    fetch_width: usize,
    table: &mut BaselineTable,
) -> Result<(), StackpairError> {
    let by_id: HashMap<&str, &Acquisition> = all.iter().map(|a| (a.id.as_str(), a)).collect();

    let width = fetch_width.clamp(1, remote.len());
    let cursor = AtomicUsize::new(0);
    let aborted = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<Result<FetchBatch, StackpairError>>();

    thread::scope(|scope| {
        for _ in 0..width {
            let tx = tx.clone();
            let cursor = &cursor;
            let aborted = &aborted;
            scope.spawn(move || {
                let mut fetched: FetchBatch = Vec::new();
                loop {
                    if aborted.load(Ordering::Relaxed) {
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(acquisition) = remote.get(index) else {
                        break;
                    };
                    debug!("fetching related stack for {}", acquisition.id);
                    match retry.run(CatalogError::is_retryable, || {
                        provider.fetch_stack(&acquisition.id)
                    }) {
                        Ok(stack) => fetched.push((index, stack)),
                        Err(exhausted) => {
                            aborted.store(true, Ordering::Relaxed);
                            let _ = tx.send(Err(StackpairError::FetchExhausted {
                                id: acquisition.id.clone(),
                                attempts: exhausted.attempts,
                                source: exhausted.last,
                            }));
                            return;
                        }
                    }
                }
                let _ = tx.send(Ok(fetched));
            });
        }
        drop(tx);

        // Single writer: the channel serializes worker batches, so the
        // table is only ever touched from this loop.
        let mut first_error = None;
        for message in rx {
            match message {
                Ok(batch) => {
                    for (index, stack) in batch {
                        merge_stack(remote[index], stack, &by_id, table);
                    }
                }
                Err(error) if first_error.is_none() => first_error = Some(error),
                Err(_) => {}
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    })
}

/// Merge one fetched stack into the table, first-writer-wins.
fn merge_stack(
    reference: &Acquisition,
    stack: Vec<StackEntry>,
    by_id: &HashMap<&str, &Acquisition>,
    table: &mut BaselineTable,
) {
    for entry in stack {
        if entry.id == reference.id {
            continue;
        }
        // Scenes outside the working set are not candidates.
        let Some(other) = by_id.get(entry.id.as_str()) else {
            continue;
        };
        let baselines = BaselineEntry::from_catalog(entry.temporal_days, entry.perpendicular_m);
        table.insert_first(Pair::ordered(reference, other), baselines);
    }
}
