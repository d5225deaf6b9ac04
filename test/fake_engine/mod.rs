//! In-process stand-in for the ccore library
//!
//! Entry points have the exact C signatures of the real exports, allocate
//! their results with the Rust allocator and free them again in their own
//! `free_*`/`destroy_*` functions. Thread-local counters record every call,
//! free and destroy so tests can assert ownership behavior.

#![allow(dead_code)]

use std::cell::Cell;
use std::ffi::c_void;

use ccore_bridge::engine::symbols;
use ccore_bridge::ffi::layout::{
    ClusterRepresentation, ClusteringResult, DataRepresentation, DynamicResult, PackageHeader,
};
use ccore_bridge::ffi::TypeTag;
use ccore_bridge::Engine;

thread_local! {
    static CALLS: Cell<usize> = Cell::new(0);
    static FREED: Cell<usize> = Cell::new(0);
    static DESTROYED: Cell<usize> = Cell::new(0);
}

/// Entry points invoked on this thread
pub fn calls() -> usize {
    CALLS.with(Cell::get)
}

/// Results freed on this thread
pub fn freed() -> usize {
    FREED.with(Cell::get)
}

/// Stateful objects destroyed on this thread
pub fn destroyed() -> usize {
    DESTROYED.with(Cell::get)
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    counter.with(|c| c.set(c.get() + 1));
}

// =============================================================================
// Allocation helpers
// =============================================================================

pub fn leak_slice<T>(values: Vec<T>) -> *mut T {
    Box::into_raw(values.into_boxed_slice()) as *mut T
}

pub unsafe fn reclaim_slice<T>(ptr: *mut T, len: usize) -> Box<[T]> {
    Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len))
}

pub unsafe fn input_rows(data: *const DataRepresentation) -> Vec<Vec<f64>> {
    let data = &*data;
    let rows = std::slice::from_raw_parts(data.pointer_objects, data.number_objects as usize);
    rows.iter()
        .map(|&row| std::slice::from_raw_parts(row, data.dimension as usize).to_vec())
        .collect()
}

fn clustering_result(groups: Vec<Vec<u32>>) -> *mut ClusteringResult {
    let clusters: Vec<ClusterRepresentation> = groups
        .into_iter()
        .map(|group| ClusterRepresentation {
            number_objects: group.len() as u32,
            pointer_objects: leak_slice(group),
        })
        .collect();
    let number_clusters = clusters.len() as u32;
    Box::into_raw(Box::new(ClusteringResult {
        number_clusters,
        pointer_clusters: leak_slice(clusters),
    }))
}

fn package<T>(tag: u32, values: Vec<T>) -> *mut PackageHeader {
    let size = values.len() as u32;
    Box::into_raw(Box::new(PackageHeader {
        size,
        type_: tag,
        data: leak_slice(values).cast(),
    }))
}

fn package_list(children: Vec<*mut PackageHeader>) -> *mut PackageHeader {
    package(TypeTag::LIST, children)
}

unsafe fn free_package_tree(ptr: *mut PackageHeader) {
    let header = Box::from_raw(ptr);
    let len = header.size as usize;
    match header.type_ {
        TypeTag::LIST => {
            for &child in reclaim_slice(header.data as *mut *mut PackageHeader, len).iter() {
                free_package_tree(child);
            }
        }
        TypeTag::DOUBLE => drop(reclaim_slice(header.data as *mut f64, len)),
        TypeTag::UNSIGNED_INT => drop(reclaim_slice(header.data as *mut u32, len)),
        other => panic!("fake engine never builds tag {}", other),
    }
}

// =============================================================================
// Result families
// =============================================================================

/// Groups points by the sign of their first coordinate. Points at exactly
/// zero go to the trailing noise group.
pub unsafe extern "C" fn sign_clustering(data: *const DataRepresentation) -> *mut ClusteringResult {
    bump(&CALLS);
    let mut negative = Vec::new();
    let mut positive = Vec::new();
    let mut noise = Vec::new();
    for (index, row) in input_rows(data).iter().enumerate() {
        let index = index as u32;
        if row[0] < 0.0 {
            negative.push(index);
        } else if row[0] > 0.0 {
            positive.push(index);
        } else {
            noise.push(index);
        }
    }
    clustering_result(vec![negative, positive, noise])
}

pub unsafe extern "C" fn free_clustering_result(ptr: *mut c_void) {
    let result = Box::from_raw(ptr as *mut ClusteringResult);
    let clusters = reclaim_slice(result.pointer_clusters, result.number_clusters as usize);
    for cluster in clusters.iter() {
        drop(reclaim_slice(
            cluster.pointer_objects,
            cluster.number_objects as usize,
        ));
    }
    bump(&FREED);
}

/// Echoes the input back as a list of double packages, one per row.
pub unsafe extern "C" fn echo_package(data: *const DataRepresentation) -> *mut PackageHeader {
    bump(&CALLS);
    let children = input_rows(data)
        .into_iter()
        .map(|row| package(TypeTag::DOUBLE, row))
        .collect();
    package_list(children)
}

pub unsafe extern "C" fn free_pyclustering_package(ptr: *mut c_void) {
    free_package_tree(ptr as *mut PackageHeader);
    bump(&FREED);
}

/// Linear phase drift: node `n` at step `s` has value `s * 0.1 + n`.
pub unsafe extern "C" fn simulate(steps: u32, nodes: u32) -> *mut DynamicResult {
    bump(&CALLS);
    let times: Vec<f64> = (0..steps).map(|s| s as f64 * 0.1).collect();
    let rows: Vec<*mut f64> = (0..steps)
        .map(|s| leak_slice((0..nodes).map(|n| s as f64 * 0.1 + n as f64).collect()))
        .collect();
    Box::into_raw(Box::new(DynamicResult {
        size_dynamic: steps,
        size_network: nodes,
        times: leak_slice(times),
        dynamic: leak_slice(rows),
    }))
}

pub unsafe extern "C" fn free_dynamic_result(ptr: *mut c_void) {
    let result = Box::from_raw(ptr as *mut DynamicResult);
    let steps = result.size_dynamic as usize;
    drop(reclaim_slice(result.times, steps));
    for &row in reclaim_slice(result.dynamic, steps).iter() {
        drop(reclaim_slice(row, result.size_network as usize));
    }
    bump(&FREED);
}

// =============================================================================
// Exported entry points
// =============================================================================

unsafe extern "C" fn dbscan_algorithm(
    data: *const DataRepresentation,
    _eps: f64,
    _min_neighbors: u32,
) -> *mut ClusteringResult {
    sign_clustering(data)
}

/// Oscillator count of a fake sync network
struct FakeNetwork {
    size: u32,
}

unsafe extern "C" fn create_sync_network(
    size: u32,
    _weight: f64,
    _frequency: f64,
    _conn_type: u32,
    _initial_phases: u32,
) -> *mut c_void {
    bump(&CALLS);
    Box::into_raw(Box::new(FakeNetwork { size })).cast()
}

unsafe extern "C" fn destroy_sync_network(ptr: *mut c_void) {
    drop(Box::from_raw(ptr as *mut FakeNetwork));
    bump(&DESTROYED);
}

unsafe extern "C" fn simulate_sync_network(
    network: *mut c_void,
    steps: u32,
    _time: f64,
    _solver: u32,
    _collect_dynamic: bool,
) -> *mut DynamicResult {
    simulate(steps, (*(network as *const FakeNetwork)).size)
}

/// All oscillators in one ensemble
unsafe extern "C" fn allocate_sync_ensembles_sync_network(
    network: *mut c_void,
    _tolerance: f64,
) -> *mut ClusteringResult {
    bump(&CALLS);
    let size = (*(network as *const FakeNetwork)).size;
    clustering_result(vec![(0..size).collect()])
}

unsafe extern "C" fn sync_order(_network: *mut c_void) -> f64 {
    bump(&CALLS);
    1.0
}

/// Map where neuron 0 captures every object
struct FakeSom {
    neurons: u32,
    objects: u32,
}

unsafe extern "C" fn som_create(
    data: *const DataRepresentation,
    rows: u32,
    cols: u32,
    _epochs: u32,
    _conn_type: u32,
    _init_type: u32,
) -> *mut c_void {
    bump(&CALLS);
    Box::into_raw(Box::new(FakeSom {
        neurons: rows * cols,
        objects: (*data).number_objects,
    }))
    .cast()
}

unsafe extern "C" fn null_som_create(
    _data: *const DataRepresentation,
    _rows: u32,
    _cols: u32,
    _epochs: u32,
    _conn_type: u32,
    _init_type: u32,
) -> *mut c_void {
    bump(&CALLS);
    std::ptr::null_mut()
}

unsafe extern "C" fn som_destroy(ptr: *mut c_void) {
    drop(Box::from_raw(ptr as *mut FakeSom));
    bump(&DESTROYED);
}

unsafe extern "C" fn som_train(_som: *mut c_void, autostop: bool) -> u32 {
    bump(&CALLS);
    if autostop {
        3
    } else {
        10
    }
}

unsafe extern "C" fn som_get_size(som: *mut c_void) -> u32 {
    (*(som as *const FakeSom)).neurons
}

unsafe extern "C" fn som_get_awards(som: *mut c_void) -> *mut PackageHeader {
    bump(&CALLS);
    let som = &*(som as *const FakeSom);
    let awards = (0..som.neurons)
        .map(|n| if n == 0 { som.objects } else { 0 })
        .collect();
    package(TypeTag::UNSIGNED_INT, awards)
}

unsafe extern "C" fn som_get_capture_objects(som: *mut c_void) -> *mut PackageHeader {
    bump(&CALLS);
    let som = &*(som as *const FakeSom);
    let children = (0..som.neurons)
        .map(|n| {
            let captured: Vec<u32> = if n == 0 { (0..som.objects).collect() } else { Vec::new() };
            package(TypeTag::UNSIGNED_INT, captured)
        })
        .collect();
    package_list(children)
}

unsafe extern "C" fn som_get_weights(som: *mut c_void) -> *mut PackageHeader {
    bump(&CALLS);
    let som = &*(som as *const FakeSom);
    let children = (0..som.neurons)
        .map(|n| package(TypeTag::DOUBLE, vec![n as f64, -(n as f64)]))
        .collect();
    package_list(children)
}

// =============================================================================
// Engine construction
// =============================================================================

/// Every entry point the fake implements, under its real export name
pub fn exports() -> Vec<(&'static str, *const c_void)> {
    vec![
        (symbols::DBSCAN, dbscan_algorithm as *const c_void),
        (symbols::FREE_CLUSTERING_RESULT, free_clustering_result as *const c_void),
        (symbols::FREE_DYNAMIC_RESULT, free_dynamic_result as *const c_void),
        (symbols::FREE_PACKAGE, free_pyclustering_package as *const c_void),
        (symbols::CREATE_SYNC_NETWORK, create_sync_network as *const c_void),
        (symbols::DESTROY_SYNC_NETWORK, destroy_sync_network as *const c_void),
        (symbols::SIMULATE_SYNC_NETWORK, simulate_sync_network as *const c_void),
        (
            symbols::ALLOCATE_SYNC_ENSEMBLES,
            allocate_sync_ensembles_sync_network as *const c_void,
        ),
        (symbols::SYNC_ORDER, sync_order as *const c_void),
        (symbols::SOM_CREATE, som_create as *const c_void),
        (symbols::SOM_DESTROY, som_destroy as *const c_void),
        (symbols::SOM_TRAIN, som_train as *const c_void),
        (symbols::SOM_GET_SIZE, som_get_size as *const c_void),
        (symbols::SOM_GET_AWARDS, som_get_awards as *const c_void),
        (symbols::SOM_GET_CAPTURE_OBJECTS, som_get_capture_objects as *const c_void),
        (symbols::SOM_GET_WEIGHTS, som_get_weights as *const c_void),
    ]
}

/// Engine backed by every fake export
pub fn engine() -> Engine {
    engine_with(exports())
}

/// Engine backed by exactly `entries`
pub fn engine_with(entries: Vec<(&'static str, *const c_void)>) -> Engine {
    // Safety: every address is one of the functions above, declared with
    // the signature the bindings expect for that name.
    unsafe { Engine::from_symbols("fake-ccore", entries) }
}

/// `exports()` without the named symbols
pub fn engine_without(missing: &[&str]) -> Engine {
    engine_with(
        exports()
            .into_iter()
            .filter(|(name, _)| !missing.contains(name))
            .collect(),
    )
}

/// `exports()` with `som_create` replaced by a constructor returning null
pub fn engine_with_null_som() -> Engine {
    let mut entries = exports();
    for entry in entries.iter_mut() {
        if entry.0 == symbols::SOM_CREATE {
            entry.1 = null_som_create as *const c_void;
        }
    }
    engine_with(entries)
}
