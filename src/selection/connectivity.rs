//! # Connectivity repair and degree bounding
//!
//! The primary filter looks at each pair in isolation, so the network it
//! produces can leave an acquisition nearly (or fully) disconnected, or
//! pile too many pairs onto one acquisition. [`enforce`] repairs both in
//! two phases over the acquisitions in time order:
//!
//! - **Boost**: any acquisition below the minimum degree gets extra pairs
//!   drawn from the baseline table, nearest in time first, as long as they
//!   honor the hard baseline caps.
//! - **Trim**: any acquisition above the maximum degree sheds its worst
//!   pairs (longest temporal, then longest perpendicular baseline), but
//!   never below the minimum degree of either endpoint. When the two
//!   bounds cannot both hold, the minimum wins and the excess is kept.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use log::{debug, warn};
use ordered_float::OrderedFloat;

use crate::acquisitions::{temporal_baseline_days, Acquisition};
use crate::baseline::{BaselineEntry, BaselineTable, Pair};
use crate::constants::MISSING_BASELINE;
use crate::selection::SelectionConfig;

/// Selected pairs plus the degree bookkeeping both phases share.
struct Network {
    selected: BTreeSet<Pair>,
    neighbours: HashMap<String, HashSet<String>>,
}

impl Network {
    fn from_candidates(candidates: &[Pair]) -> Self {
        let mut network = Network {
            selected: BTreeSet::new(),
            neighbours: HashMap::new(),
        };
        for pair in candidates {
            network.add(pair.clone());
        }
        network
    }

    fn degree(&self, id: &str) -> usize {
        self.neighbours.get(id).map_or(0, HashSet::len)
    }

    fn add(&mut self, pair: Pair) {
        self.neighbours
            .entry(pair.earlier.clone())
            .or_default()
            .insert(pair.later.clone());
        self.neighbours
            .entry(pair.later.clone())
            .or_default()
            .insert(pair.earlier.clone());
        self.selected.insert(pair);
    }

    fn remove(&mut self, pair: &Pair) {
        if let Some(set) = self.neighbours.get_mut(&pair.earlier) {
            set.remove(&pair.later);
        }
        if let Some(set) = self.neighbours.get_mut(&pair.later) {
            set.remove(&pair.earlier);
        }
        self.selected.remove(pair);
    }

    fn edges_of(&self, id: &str) -> Vec<Pair> {
        self.selected
            .iter()
            .filter(|pair| pair.earlier == id || pair.later == id)
            .cloned()
            .collect()
    }
}

/// Repair and bound the degree of every acquisition in the candidate
/// network.
///
/// Arguments
/// -----------------
/// * `candidates`: pairs that passed the primary filter.
/// * `table`: the full baseline table, the pool boosting draws from.
/// * `ordered`: the group's acquisitions in ascending time order, fixing
///   the order both phases visit them in.
/// * `config`: degree bounds, baseline caps and the `force_connect` switch.
///
/// Return
/// ----------
/// * The adjusted pair network, in canonical order.
pub fn enforce(
    candidates: &[Pair],
    table: &BaselineTable,
    ordered: &[&Acquisition],
    config: &SelectionConfig,
) -> Vec<Pair> {
    let mut network = Network::from_candidates(candidates);

    if config.force_connect {
        boost(&mut network, table, ordered, config);
    }
    trim(&mut network, table, ordered, config);

    network.selected.into_iter().collect()
}

/// Raise every under-connected acquisition to the minimum degree, nearest
/// candidate first.
fn boost(
    network: &mut Network,
    table: &BaselineTable,
    ordered: &[&Acquisition],
    config: &SelectionConfig,
) {
    for acquisition in ordered {
        let id = acquisition.id.as_str();
        if network.degree(id) >= config.min_degree {
            continue;
        }

        // The node's other acquisitions, nearest in time first. Sorted
        // once per node and walked in order as edges are added.
        let nearest: Vec<&Acquisition> = ordered
            .iter()
            .filter(|other| other.id != acquisition.id)
            .copied()
            .sorted_by_key(|other| {
                (
                    OrderedFloat(temporal_baseline_days(&acquisition.epoch, &other.epoch)),
                    other.id.clone(),
                )
            })
            .collect();

        for other in nearest {
            if network.degree(id) >= config.min_degree {
                break;
            }
            let pair = Pair::ordered(acquisition, other);
            if network.selected.contains(&pair) {
                continue;
            }
            let Some(entry) = table.get(&pair) else {
                continue;
            };
            if entry.temporal_days > config.dt_max || entry.perpendicular_m > config.pb_max {
                continue;
            }
            debug!(
                "boosting {id}: adding {pair} (dt {:.1} d, pb {:.1} m)",
                entry.temporal_days, entry.perpendicular_m
            );
            network.add(pair);
        }

        if network.degree(id) < config.min_degree {
            warn!(
                "{id} stays under-connected: degree {} of minimum {}, no eligible pair left",
                network.degree(id),
                config.min_degree
            );
        }
    }
}

/// Bring every over-connected acquisition down to the maximum degree,
/// dropping its worst pairs first without breaching the minimum anywhere.
fn trim(
    network: &mut Network,
    table: &BaselineTable,
    ordered: &[&Acquisition],
    config: &SelectionConfig,
) {
    for acquisition in ordered {
        let id = acquisition.id.as_str();
        while network.degree(id) > config.max_degree {
            let Some(pair) = worst_removable_edge(network, table, id, config) else {
                warn!(
                    "degree conflict for {id}: degree {} exceeds maximum {} but trimming would \
                     breach minimum {}",
                    network.degree(id),
                    config.max_degree,
                    config.min_degree
                );
                break;
            };
            debug!("trimming {id}: removing {pair}");
            network.remove(&pair);
        }
    }
}

/// Worst edge of `id` that can be removed without dropping either endpoint
/// below the minimum degree. Prefers a counterpart with slack beyond the
/// minimum, so trimming one hub does not immediately force boosting its
/// neighbours back up.
fn worst_removable_edge(
    network: &Network,
    table: &BaselineTable,
    id: &str,
    config: &SelectionConfig,
) -> Option<Pair> {
    if network.degree(id) <= config.min_degree {
        return None;
    }

    let mut edges = network.edges_of(id);
    edges.sort_by_key(|pair| {
        let entry = table.get(pair).copied().unwrap_or(BaselineEntry {
            temporal_days: MISSING_BASELINE,
            perpendicular_m: MISSING_BASELINE,
        });
        (
            Reverse(OrderedFloat(entry.temporal_days)),
            Reverse(OrderedFloat(entry.perpendicular_m)),
            pair.clone(),
        )
    });

    let counterpart_degree = |pair: &Pair| network.degree(pair.other(id));
    edges
        .iter()
        .find(|&pair| counterpart_degree(pair) > config.min_degree + 1)
        .or_else(|| {
            edges
                .iter()
                .find(|&pair| counterpart_degree(pair) > config.min_degree)
        })
        .cloned()
}
