//! # Constants and type definitions for stackpair
//!
//! This module centralizes the **threshold defaults**, the missing-value
//! **sentinel**, and the **common type aliases** used throughout the crate,
//! together with the container types that organize acquisitions and
//! selected pairs per track/frame group.
//!
//! The default thresholds reproduce the operational values used for
//! Sentinel-1 small-baseline stacks (6/12-day repeat orbits).

use std::collections::HashMap;

use crate::acquisitions::Acquisition;
use crate::selection::PairSelection;

// -------------------------------------------------------------------------------------------------
// Sentinel and default thresholds
// -------------------------------------------------------------------------------------------------

/// Sentinel stored when the catalog reports no baseline value for a pair.
///
/// Chosen to fail every realistic threshold by construction: a missing
/// value must read as "no valid pair", never as a null.
pub const MISSING_BASELINE: f64 = 10_000.0;

/// Preferred temporal spacings between pair members, in days.
pub const DEFAULT_DT_TARGETS: [Days; 7] = [6.0, 12.0, 24.0, 36.0, 48.0, 72.0, 96.0];

/// Tolerance in days around each temporal spacing target.
pub const DEFAULT_DT_TOLERANCE: Days = 3.0;

/// Maximum temporal baseline in days.
pub const DEFAULT_DT_MAX: Days = 120.0;

/// Maximum perpendicular baseline in meters.
pub const DEFAULT_PB_MAX: Meter = 150.0;

/// Minimum number of connections per acquisition.
pub const DEFAULT_MIN_DEGREE: usize = 3;

/// Maximum number of connections per acquisition.
pub const DEFAULT_MAX_DEGREE: usize = 999;

/// Width of the catalog fetch worker pool.
pub const DEFAULT_FETCH_WIDTH: usize = 8;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Elapsed time in days
pub type Days = f64;
/// Distance in meters
pub type Meter = f64;
/// Stable scene identifier of one acquisition
pub type AcquisitionId = String;

/// Identifier partitioning acquisitions into independent baseline
/// networks: `(track, frame)`.
pub type GroupKey = (u32, u32);

/// Group key used for acquisitions supplied as a flat list.
pub const UNGROUPED: GroupKey = (0, 0);

// -------------------------------------------------------------------------------------------------
// Data containers
// -------------------------------------------------------------------------------------------------

/// Acquisitions partitioned by track/frame group
pub type AcquisitionGroups = HashMap<GroupKey, Vec<Acquisition>>;

/// Selection outcome per track/frame group, keyed like the input groups
pub type GroupedSelections = HashMap<GroupKey, PairSelection>;
