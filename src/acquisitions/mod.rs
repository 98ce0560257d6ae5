//! # Acquisitions: SAR scenes and their orbital state
//!
//! An [`Acquisition`] is one remote-sensing capture: a stable scene id, an
//! epoch, a track/frame group key, and — when orbit metadata is available —
//! an [`OrbitState`] sufficient to estimate perpendicular baselines offline
//! without consulting the catalog service.
//!
//! ## Anchored baselines
//!
//! The offline estimator does not compute pairwise baselines directly.
//! Each orbit-carrying acquisition is projected once onto the cross-track
//! axis of a single common reference, yielding a *signed* scalar anchor;
//! the perpendicular baseline of any pair is then the absolute difference
//! of the two anchors. The projection is linear in the position offset, so
//! anchoring against one arbitrary reference is exact — preserve this
//! formula as is, it is a domain modeling choice.

use std::str::FromStr;

use hifitime::{Epoch, Unit};
use nalgebra::Vector3;

use crate::constants::{AcquisitionId, Days, GroupKey, Meter};
use crate::stackpair_errors::StackpairError;

/// Sensor position and velocity at acquisition time, in an Earth-centered
/// frame (meters, meters per second).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl OrbitState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        OrbitState { position, velocity }
    }

    /// Signed perpendicular-baseline anchor of `self` relative to `reference`.
    ///
    /// The anchor is the projection of the position offset onto the
    /// reference's cross-track unit axis `normalize(v × r̂)`. For two
    /// acquisitions `a` and `b` anchored against the same reference, the
    /// pairwise perpendicular baseline is `|anchor_a - anchor_b|`.
    ///
    /// Arguments
    /// -----------------
    /// * `reference`: the orbit state every anchor in a group is measured against.
    ///
    /// Return
    /// ----------
    /// * The signed cross-track separation in meters.
    pub fn anchored_perpendicular(&self, reference: &OrbitState) -> Meter {
        let radial = reference.position.normalize();
        let cross_track = reference.velocity.cross(&radial).normalize();
        (self.position - reference.position).dot(&cross_track)
    }
}

/// A single remote-sensing capture.
///
/// # Fields
///
/// * `id` - Stable scene identifier, unique within a run
/// * `epoch` - Acquisition instant
/// * `orbit` - Optional orbit state enabling offline baseline estimation
/// * `group` - Track/frame key partitioning independent baseline networks
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub id: AcquisitionId,
    pub epoch: Epoch,
    pub orbit: Option<OrbitState>,
    pub group: GroupKey,
}

impl Acquisition {
    /// Create an acquisition from an ISO-8601 timestamp string.
    ///
    /// Arguments
    /// -----------------
    /// * `id`: stable scene identifier.
    /// * `timestamp`: ISO-8601 instant, e.g. `"2020-06-01T00:31:55 UTC"`.
    /// * `orbit`: orbit state if local baseline estimation is possible.
    /// * `group`: track/frame group key.
    ///
    /// Return
    /// ----------
    /// * The acquisition, or [`StackpairError::TimestampParse`] if the
    ///   timestamp cannot be parsed.
    pub fn new(
        id: impl Into<AcquisitionId>,
        timestamp: &str,
        orbit: Option<OrbitState>,
        group: GroupKey,
    ) -> Result<Self, StackpairError> {
        let id = id.into();
        let epoch = Epoch::from_str(timestamp).map_err(|e| StackpairError::TimestampParse {
            id: id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Acquisition {
            id,
            epoch,
            orbit,
            group,
        })
    }

    /// Create an acquisition from an already-parsed epoch.
    pub fn from_epoch(
        id: impl Into<AcquisitionId>,
        epoch: Epoch,
        orbit: Option<OrbitState>,
        group: GroupKey,
    ) -> Self {
        Acquisition {
            id: id.into(),
            epoch,
            orbit,
            group,
        }
    }
}

/// Absolute elapsed time between two epochs, in days.
pub fn temporal_baseline_days(a: &Epoch, b: &Epoch) -> Days {
    (*b - *a).abs().to_unit(Unit::Day)
}
