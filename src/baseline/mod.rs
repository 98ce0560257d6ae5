//! # Baseline pairs and the baseline table
//!
//! A [`Pair`] is the epoch-ordered key `(earlier, later)` over two
//! acquisition ids; a [`BaselineEntry`] carries the pair's temporal and
//! perpendicular baselines; the [`BaselineTable`] maps every pair the
//! selection algorithm may need to its entry.
//!
//! The table is **write-once per key**: [`BaselineTable::insert_first`]
//! keeps the first value and ignores later writers, which makes the
//! concurrent network merge idempotent (values for a given pair are
//! catalog-derived and expected identical across workers).

pub mod builder;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::acquisitions::Acquisition;
use crate::constants::{AcquisitionId, Days, Meter, MISSING_BASELINE};

/// Epoch-ordered pair of acquisition ids.
///
/// Invariant: `earlier.epoch <= later.epoch` at construction time.
/// `Ord` compares `(earlier, later)` ids, which is the sort order of every
/// pair list this crate returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub earlier: AcquisitionId,
    pub later: AcquisitionId,
}

impl Pair {
    /// Build the epoch-ordered key for two acquisitions. Equal epochs fall
    /// back to id order so the key stays deterministic.
    pub fn ordered(a: &Acquisition, b: &Acquisition) -> Self {
        let flip = b.epoch < a.epoch || (b.epoch == a.epoch && b.id < a.id);
        let (first, second) = if flip { (b, a) } else { (a, b) };
        Pair {
            earlier: first.id.clone(),
            later: second.id.clone(),
        }
    }

    /// The endpoint opposite to `id`.
    ///
    /// `id` must be one of the pair's endpoints; debug builds assert it.
    pub fn other(&self, id: &str) -> &str {
        debug_assert!(
            self.earlier == id || self.later == id,
            "{id} is not an endpoint of {self}"
        );
        if self.earlier == id {
            &self.later
        } else {
            &self.earlier
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.earlier, self.later)
    }
}

/// Temporal and perpendicular baselines for one pair, both non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineEntry {
    pub temporal_days: Days,
    pub perpendicular_m: Meter,
}

impl BaselineEntry {
    /// Build an entry from optional catalog values: absolute value where
    /// present, the failing sentinel where missing.
    pub fn from_catalog(temporal_days: Option<f64>, perpendicular_m: Option<f64>) -> Self {
        BaselineEntry {
            temporal_days: temporal_days.map_or(MISSING_BASELINE, f64::abs),
            perpendicular_m: perpendicular_m.map_or(MISSING_BASELINE, f64::abs),
        }
    }
}

/// Pair → baseline mapping for one acquisition group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineTable {
    entries: HashMap<Pair, BaselineEntry>,
}

impl BaselineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the pair is already present (first-writer-wins).
    ///
    /// Return
    /// ----------
    /// * `true` if the entry was stored, `false` if the pair already had one.
    pub fn insert_first(&mut self, pair: Pair, entry: BaselineEntry) -> bool {
        match self.entries.entry(pair) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, pair: &Pair) -> Option<&BaselineEntry> {
        self.entries.get(pair)
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.entries.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pair, &BaselineEntry)> {
        self.entries.iter()
    }
}
