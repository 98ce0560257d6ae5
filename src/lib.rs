//! # stackpair: interferometric pair selection for SAR acquisition stacks
//!
//! This crate selects a sparse, well-connected graph of interferometric
//! pairs from a time-ordered set of SAR acquisitions, subject to temporal
//! spacing and perpendicular-baseline constraints, with minimum and maximum
//! per-node connectivity guarantees.
//!
//! ## Pipeline
//!
//! 1. **Baseline table** ([`baseline::builder`]) — pairwise temporal and
//!    perpendicular baselines, computed offline from orbit state where
//!    available and fetched from a catalog service otherwise.
//! 2. **Primary filter** ([`selection::primary_filter`]) — pure threshold
//!    rules on temporal spacing targets and baseline caps.
//! 3. **Connectivity enforcement** ([`selection::connectivity`]) — boost
//!    under-connected nodes up to a minimum degree, trim over-connected
//!    nodes down to a maximum degree.
//!
//! The orchestrating entry points are [`selection::select_pairs`] (flat
//! acquisition list) and [`selection::select_pairs_grouped`] (one
//! independent baseline network per track/frame group).
//!
//! Network access goes through the [`catalog::StackProvider`] trait so the
//! whole pipeline runs deterministically against a mock catalog in tests;
//! [`catalog::asf::AsfCatalog`] is the production implementation.

pub mod acquisitions;
pub mod baseline;
pub mod catalog;
pub mod constants;
pub mod selection;
pub mod stackpair_errors;

pub use acquisitions::{Acquisition, OrbitState};
pub use baseline::{BaselineEntry, BaselineTable, Pair};
pub use selection::{select_pairs, select_pairs_grouped, PairSelection, SelectionConfig};
pub use stackpair_errors::StackpairError;
