//! Integration Tests for the Marshaling Core
//!
//! The in-process fake engine plays the role of the shared library: it reads
//! the encoded input through raw pointers, allocates results itself and
//! frees them in its own `free_*` functions. The tests drive the full
//! encode -> call -> guard -> decode -> release cycle on raw handles.

mod fake_engine;

use ccore_bridge::ffi::{
    ClusterOutcome, ClusteringHandle, DynamicsHandle, ForeignPointSet, MarshalError,
    PackageHandle,
};

use fake_engine::{
    echo_package, free_clustering_result, free_dynamic_result, free_pyclustering_package, freed,
    sign_clustering, simulate,
};

// =============================================================================
// Clustering round trips
// =============================================================================

fn cluster_by_sign(sample: &[Vec<f64>], report_noise: bool) -> Result<ClusterOutcome, MarshalError> {
    let data = ForeignPointSet::encode(sample)?;
    let handle = unsafe {
        ClusteringHandle::from_raw(sign_clustering(data.as_ptr()), free_clustering_result)
    };
    let set = handle.decode_clusters_and_release()?;
    Ok(ClusterOutcome::from_groups(set, report_noise))
}

#[test]
fn test_clustering_cycle_without_noise() {
    let before = freed();
    let sample = vec![
        vec![-1.0, 0.0],
        vec![2.0, 1.0],
        vec![0.0, 5.0],
        vec![-3.0, 1.0],
        vec![4.0, 4.0],
    ];

    let outcome = cluster_by_sign(&sample, false).unwrap();
    assert_eq!(outcome.clusters, vec![vec![0, 3], vec![1, 4]]);
    assert_eq!(outcome.noise, None);
    assert_eq!(freed(), before + 1);
}

#[test]
fn test_clustering_cycle_with_noise() {
    let before = freed();
    let sample = vec![vec![0.0], vec![1.0], vec![0.0]];

    let outcome = cluster_by_sign(&sample, true).unwrap();
    assert_eq!(outcome.clusters, vec![vec![], vec![1]]);
    assert_eq!(outcome.noise, Some(vec![0, 2]));
    assert_eq!(freed(), before + 1);

    let json = serde_json::to_string(&outcome).unwrap();
    assert_eq!(json, r#"{"clusters":[[],[1]],"noise":[0,2]}"#);
}

#[test]
fn test_invalid_input_never_reaches_engine() {
    let before = freed();
    let ragged = vec![vec![1.0, 2.0], vec![3.0]];
    assert!(matches!(
        cluster_by_sign(&ragged, false),
        Err(MarshalError::InvalidShape(_))
    ));
    assert_eq!(
        cluster_by_sign(&[], false).unwrap_err(),
        MarshalError::EmptyInput
    );
    assert_eq!(freed(), before);
}

// =============================================================================
// Package round trips
// =============================================================================

#[test]
fn test_package_echo_matches_input() {
    let before = freed();
    let sample = vec![vec![0.25, -1.5, 3.0], vec![1e-12, 0.0, -0.0]];
    let data = ForeignPointSet::encode(&sample).unwrap();

    let handle = unsafe { PackageHandle::from_raw(echo_package(data.as_ptr()), free_pyclustering_package) };
    let value = handle.decode_and_release().unwrap();
    assert_eq!(freed(), before + 1);

    let matrix = value.into_f64_matrix().unwrap();
    assert_eq!(matrix.len(), 2);
    for (decoded, original) in matrix.iter().zip(&sample) {
        let a: Vec<u64> = decoded.iter().map(|v| v.to_bits()).collect();
        let b: Vec<u64> = original.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a, b);
    }
}

#[test]
fn test_package_decoded_twice_released_once() {
    let before = freed();
    let data = ForeignPointSet::encode(&[[1.0], [2.0]]).unwrap();
    let handle = unsafe { PackageHandle::from_raw(echo_package(data.as_ptr()), free_pyclustering_package) };

    let first = handle.decode().unwrap();
    let second = handle.decode().unwrap();
    assert_eq!(first, second);
    assert_eq!(freed(), before);

    drop(handle);
    assert_eq!(freed(), before + 1);
}

// =============================================================================
// Dynamics round trips
// =============================================================================

#[test]
fn test_dynamics_cycle() {
    let before = freed();
    let handle = unsafe { DynamicsHandle::from_raw(simulate(4, 3), free_dynamic_result) };
    let trace = handle.decode_dynamics_and_release().unwrap();

    assert_eq!(trace.steps(), 4);
    assert_eq!(trace.network_size(), 3);
    assert_eq!(trace.times().len(), trace.values().len());
    assert!(trace.values().iter().all(|row| row.len() == 3));
    assert_eq!(trace.values()[0], vec![0.0, 1.0, 2.0]);
    assert_eq!(freed(), before + 1);
}

#[test]
fn test_dynamics_not_run_is_reported_and_released() {
    let before = freed();
    let handle = unsafe { DynamicsHandle::from_raw(simulate(0, 3), free_dynamic_result) };
    let err = handle.decode_dynamics_and_release().unwrap_err();

    assert!(matches!(err, MarshalError::MalformedDynamics(_)));
    assert!(err.is_protocol_error());
    assert_eq!(freed(), before + 1);
}
