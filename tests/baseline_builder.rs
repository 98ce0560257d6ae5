//! Baseline-table construction against the mock catalog: retry behavior,
//! abort-on-exhaustion, and the hybrid local/network split.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use approx::assert_relative_eq;
use hifitime::Epoch;
use nalgebra::Vector3;

use common::{remote_acquisition, scripted_stacks, MockCatalog};
use stackpair::baseline::builder::build_baseline_table;
use stackpair::baseline::Pair;
use stackpair::catalog::retry::RetryPolicy;
use stackpair::catalog::StackEntry;
use stackpair::constants::{MISSING_BASELINE, UNGROUPED};
use stackpair::{Acquisition, OrbitState, StackpairError};

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
    }
}

fn orbital_acquisition(id: &str, day: f64, cross_track_m: f64) -> Acquisition {
    // Reference orbit on the x axis flying along y; the cross-track axis
    // is then -z, so poses offset in z differ by a known perpendicular
    // baseline.
    let orbit = OrbitState::new(
        Vector3::new(7_000_000.0, 0.0, -cross_track_m),
        Vector3::new(0.0, 7_500.0, 0.0),
    );
    Acquisition::from_epoch(id, Epoch::from_mjd_utc(59000.0 + day), Some(orbit), UNGROUPED)
}

#[test]
fn test_transient_failures_are_retried_until_the_stack_comes_through() {
    let scenes = [("A00", 0.0, 0.0), ("A12", 12.0, 40.0)];
    let catalog = MockCatalog::flaky(scripted_stacks(&scenes), 2);
    let acquisitions = vec![remote_acquisition("A00", 0.0), remote_acquisition("A12", 12.0)];

    let table = build_baseline_table(&acquisitions, &catalog, &fast_retry(5), 8).unwrap();

    assert_eq!(table.len(), 1);
    // Two scripted failures, then success, for each reference.
    assert_eq!(catalog.call_count("A00"), 3);
    assert_eq!(catalog.call_count("A12"), 3);
}

#[test]
fn test_rebuilding_from_stable_input_gives_an_identical_table() {
    let scenes = [("A00", 0.0, 0.0), ("A12", 12.0, 40.0), ("A24", 24.0, 15.0)];
    let catalog = MockCatalog::new(scripted_stacks(&scenes));
    let acquisitions: Vec<Acquisition> = scenes
        .iter()
        .map(|(id, day, _)| remote_acquisition(id, *day))
        .collect();

    let first = build_baseline_table(&acquisitions, &catalog, &fast_retry(5), 8).unwrap();
    let second = build_baseline_table(&acquisitions, &catalog, &fast_retry(5), 8).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_exhausted_fetch_aborts_the_build() {
    let scenes = [("A00", 0.0, 0.0), ("A12", 12.0, 40.0)];
    let catalog = MockCatalog::flaky(scripted_stacks(&scenes), u32::MAX);
    let acquisitions = vec![remote_acquisition("A00", 0.0), remote_acquisition("A12", 12.0)];

    match build_baseline_table(&acquisitions, &catalog, &fast_retry(3), 8) {
        Err(StackpairError::FetchExhausted { id, attempts, .. }) => {
            assert!(id == "A00" || id == "A12");
            assert_eq!(attempts, 3);
        }
        other => panic!("expected FetchExhausted, got {other:?}"),
    }
}

#[test]
fn test_orbit_state_avoids_the_catalog() {
    // A00 and A12 carry orbit state; only A24 needs the catalog.
    let a00 = orbital_acquisition("A00", 0.0, 0.0);
    let a12 = orbital_acquisition("A12", 12.0, 40.0);
    let a24 = remote_acquisition("A24", 24.0);

    let mut stacks = HashMap::new();
    stacks.insert(
        "A24".to_string(),
        vec![
            StackEntry {
                id: "A00".to_string(),
                temporal_days: Some(-24.0),
                perpendicular_m: Some(15.0),
            },
            StackEntry {
                id: "A12".to_string(),
                temporal_days: Some(-12.0),
                perpendicular_m: Some(-25.0),
            },
        ],
    );
    let catalog = MockCatalog::new(stacks);

    let table = build_baseline_table(
        &[a00.clone(), a12.clone(), a24.clone()],
        &catalog,
        &fast_retry(5),
        8,
    )
    .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(catalog.call_count("A00"), 0);
    assert_eq!(catalog.call_count("A12"), 0);
    assert_eq!(catalog.call_count("A24"), 1);

    // Local pair: anchor difference of the two orbit states.
    let local = table.get(&Pair::ordered(&a00, &a12)).unwrap();
    assert_relative_eq!(local.perpendicular_m, 40.0, epsilon = 1e-6);
    assert_relative_eq!(local.temporal_days, 12.0, epsilon = 1e-9);
    // Catalog pair: absolute values of the signed wire numbers.
    let fetched = table.get(&Pair::ordered(&a12, &a24)).unwrap();
    assert_relative_eq!(fetched.perpendicular_m, 25.0, epsilon = 1e-9);
    assert_relative_eq!(fetched.temporal_days, 12.0, epsilon = 1e-9);
}

#[test]
fn test_stack_entries_outside_the_working_set_are_ignored() {
    let a00 = remote_acquisition("A00", 0.0);
    let a12 = remote_acquisition("A12", 12.0);

    let mut stacks = HashMap::new();
    stacks.insert(
        "A00".to_string(),
        vec![
            // Self-reference and a scene from another campaign.
            StackEntry {
                id: "A00".to_string(),
                temporal_days: Some(0.0),
                perpendicular_m: Some(0.0),
            },
            StackEntry {
                id: "ZZ99".to_string(),
                temporal_days: Some(6.0),
                perpendicular_m: Some(3.0),
            },
            StackEntry {
                id: "A12".to_string(),
                temporal_days: Some(12.0),
                perpendicular_m: None,
            },
        ],
    );
    stacks.insert("A12".to_string(), Vec::new());
    let catalog = MockCatalog::new(stacks);

    let table = build_baseline_table(&[a00.clone(), a12.clone()], &catalog, &fast_retry(5), 8)
        .unwrap();

    assert_eq!(table.len(), 1);
    let entry = table.get(&Pair::ordered(&a00, &a12)).unwrap();
    // Missing wire value maps to the sentinel.
    assert_eq!(entry.perpendicular_m, MISSING_BASELINE);
}

#[test]
fn test_first_fetched_value_is_kept() {
    // The two references disagree about their shared pair; with a single
    // worker the fetch order is the input order, so A00's value lands
    // first and stays.
    let a00 = remote_acquisition("A00", 0.0);
    let a12 = remote_acquisition("A12", 12.0);

    let mut stacks = HashMap::new();
    stacks.insert(
        "A00".to_string(),
        vec![StackEntry {
            id: "A12".to_string(),
            temporal_days: Some(12.0),
            perpendicular_m: Some(10.0),
        }],
    );
    stacks.insert(
        "A12".to_string(),
        vec![StackEntry {
            id: "A00".to_string(),
            temporal_days: Some(-12.0),
            perpendicular_m: Some(99.0),
        }],
    );
    let catalog = MockCatalog::new(stacks);

    let table = build_baseline_table(&[a00.clone(), a12.clone()], &catalog, &fast_retry(5), 1)
        .unwrap();

    assert_eq!(table.len(), 1);
    let entry = table.get(&Pair::ordered(&a00, &a12)).unwrap();
    assert_relative_eq!(entry.perpendicular_m, 10.0, epsilon = 1e-9);
}
