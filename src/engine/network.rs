//! Oscillatory network objects
//!
//! Each network lives inside the engine and is destroyed when its Rust
//! owner is dropped. Simulation results are decoded and released before
//! the method returns.

use libc::{c_double, c_uint, c_void};

use super::params::{ConnectionType, InitialPhases, Solver};
use super::{symbols, Engine, EngineResult};
use crate::ffi::layout::{ClusteringResult, DataRepresentation, DynamicResult};
use crate::ffi::{ClusterSet, DynamicsTrace, ForeignPointSet, ObjectHandle};

type Object = *mut c_void;

type CreateSyncFn = unsafe extern "C" fn(c_uint, c_double, c_double, c_uint, c_uint) -> Object;
type SimulateSyncFn = unsafe extern "C" fn(Object, c_uint, c_double, c_uint, bool) -> *mut DynamicResult;
type SimulateDynamicSyncFn = unsafe extern "C" fn(
    Object,
    c_double,
    c_uint,
    bool,
    c_double,
    c_double,
    c_double,
) -> *mut DynamicResult;
type AllocateEnsemblesFn = unsafe extern "C" fn(Object, c_double) -> *mut ClusteringResult;
type OrderFn = unsafe extern "C" fn(Object) -> c_double;

type CreateSyncNetFn =
    unsafe extern "C" fn(*const DataRepresentation, c_double, c_uint, bool) -> Object;
type ProcessFn = unsafe extern "C" fn(Object, c_double, c_uint, bool) -> *mut DynamicResult;
type ClustersFn = unsafe extern "C" fn(Object, c_double) -> *mut ClusteringResult;

type CreateHSyncNetFn = unsafe extern "C" fn(*const DataRepresentation, c_uint, c_uint) -> Object;

/// Kuramoto-style sync network
pub struct SyncNetwork<'lib> {
    engine: &'lib Engine,
    handle: ObjectHandle<'lib>,
}

impl Engine {
    /// Create a sync network of `num_osc` oscillators
    pub fn create_sync_network(
        &self,
        num_osc: u32,
        weight: f64,
        frequency: f64,
        conn_type: ConnectionType,
        initial_phases: InitialPhases,
    ) -> EngineResult<SyncNetwork<'_>> {
        let destroy = self.release_fn(symbols::DESTROY_SYNC_NETWORK)?;
        let handle = unsafe {
            let create: CreateSyncFn = self.function(symbols::CREATE_SYNC_NETWORK)?;
            let raw = create(
                num_osc,
                weight,
                frequency,
                conn_type.code(),
                initial_phases.code(),
            );
            self.take_object(symbols::CREATE_SYNC_NETWORK, raw, destroy)?
        };
        Ok(SyncNetwork {
            engine: self,
            handle,
        })
    }

    /// Create a SyncNet clustering network over `sample`
    pub fn create_syncnet<R: AsRef<[f64]>>(
        &self,
        sample: &[R],
        radius: f64,
        initial_phases: InitialPhases,
        enable_conn_weight: bool,
    ) -> EngineResult<SyncNet<'_>> {
        let data = ForeignPointSet::encode(sample)?;
        let destroy = self.release_fn(symbols::DESTROY_SYNCNET)?;
        let handle = unsafe {
            let create: CreateSyncNetFn = self.function(symbols::CREATE_SYNCNET)?;
            let raw = create(
                data.as_ptr(),
                radius,
                initial_phases.code(),
                enable_conn_weight,
            );
            self.take_object(symbols::CREATE_SYNCNET, raw, destroy)?
        };
        Ok(SyncNet {
            engine: self,
            handle,
        })
    }

    /// Create a hierarchical SyncNet that stops at `number_clusters`
    pub fn create_hsyncnet<R: AsRef<[f64]>>(
        &self,
        sample: &[R],
        number_clusters: u32,
        initial_phases: InitialPhases,
    ) -> EngineResult<HSyncNet<'_>> {
        let data = ForeignPointSet::encode(sample)?;
        let destroy = self.release_fn(symbols::DESTROY_HSYNCNET)?;
        let handle = unsafe {
            let create: CreateHSyncNetFn = self.function(symbols::CREATE_HSYNCNET)?;
            let raw = create(data.as_ptr(), number_clusters, initial_phases.code());
            self.take_object(symbols::CREATE_HSYNCNET, raw, destroy)?
        };
        Ok(HSyncNet {
            engine: self,
            handle,
        })
    }
}

impl SyncNetwork<'_> {
    /// Simulate a fixed number of steps over `time`
    pub fn simulate(
        &self,
        steps: u32,
        time: f64,
        solver: Solver,
        collect_dynamic: bool,
    ) -> EngineResult<DynamicsTrace> {
        let free = self.engine.release_fn(symbols::FREE_DYNAMIC_RESULT)?;
        unsafe {
            let entry: SimulateSyncFn = self.engine.function(symbols::SIMULATE_SYNC_NETWORK)?;
            let raw = entry(
                self.handle.as_raw(),
                steps,
                time,
                solver.code(),
                collect_dynamic,
            );
            self.engine.take_dynamics(raw, free)
        }
    }

    /// Simulate until the order parameter reaches `order`
    pub fn simulate_dynamic(
        &self,
        order: f64,
        solver: Solver,
        collect_dynamic: bool,
        step: f64,
        int_step: f64,
        threshold_changes: f64,
    ) -> EngineResult<DynamicsTrace> {
        let free = self.engine.release_fn(symbols::FREE_DYNAMIC_RESULT)?;
        unsafe {
            let entry: SimulateDynamicSyncFn =
                self.engine.function(symbols::SIMULATE_DYNAMIC_SYNC_NETWORK)?;
            let raw = entry(
                self.handle.as_raw(),
                order,
                solver.code(),
                collect_dynamic,
                step,
                int_step,
                threshold_changes,
            );
            self.engine.take_dynamics(raw, free)
        }
    }

    /// Groups of oscillators whose phases agree within `tolerance`
    pub fn allocate_sync_ensembles(&self, tolerance: f64) -> EngineResult<ClusterSet> {
        let free = self.engine.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: AllocateEnsemblesFn =
                self.engine.function(symbols::ALLOCATE_SYNC_ENSEMBLES)?;
            self.engine
                .take_clusters(entry(self.handle.as_raw(), tolerance), free)
        }
    }

    /// Global synchronization order parameter
    pub fn sync_order(&self) -> EngineResult<f64> {
        unsafe {
            let entry: OrderFn = self.engine.function(symbols::SYNC_ORDER)?;
            Ok(entry(self.handle.as_raw()))
        }
    }

    /// Local synchronization order parameter
    pub fn sync_local_order(&self) -> EngineResult<f64> {
        unsafe {
            let entry: OrderFn = self.engine.function(symbols::SYNC_LOCAL_ORDER)?;
            Ok(entry(self.handle.as_raw()))
        }
    }
}

/// SyncNet clustering network
pub struct SyncNet<'lib> {
    engine: &'lib Engine,
    handle: ObjectHandle<'lib>,
}

impl SyncNet<'_> {
    /// Run until the network reaches `order`
    pub fn process(
        &self,
        order: f64,
        solver: Solver,
        collect_dynamic: bool,
    ) -> EngineResult<DynamicsTrace> {
        process_network(
            self.engine,
            &self.handle,
            symbols::PROCESS_SYNCNET,
            order,
            solver,
            collect_dynamic,
        )
    }

    /// Clusters formed by synchronized oscillators
    pub fn clusters(&self, tolerance: f64) -> EngineResult<ClusterSet> {
        let free = self.engine.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: ClustersFn = self.engine.function(symbols::GET_CLUSTERS_SYNCNET)?;
            self.engine
                .take_clusters(entry(self.handle.as_raw(), tolerance), free)
        }
    }
}

/// Hierarchical SyncNet clustering network
pub struct HSyncNet<'lib> {
    engine: &'lib Engine,
    handle: ObjectHandle<'lib>,
}

impl HSyncNet<'_> {
    /// Run until `number_clusters` ensembles remain
    pub fn process(
        &self,
        order: f64,
        solver: Solver,
        collect_dynamic: bool,
    ) -> EngineResult<DynamicsTrace> {
        process_network(
            self.engine,
            &self.handle,
            symbols::PROCESS_HSYNCNET,
            order,
            solver,
            collect_dynamic,
        )
    }
}

fn process_network(
    engine: &Engine,
    handle: &ObjectHandle<'_>,
    entry_name: &str,
    order: f64,
    solver: Solver,
    collect_dynamic: bool,
) -> EngineResult<DynamicsTrace> {
    let free = engine.release_fn(symbols::FREE_DYNAMIC_RESULT)?;
    unsafe {
        let entry: ProcessFn = engine.function(entry_name)?;
        let raw = entry(handle.as_raw(), order, solver.code(), collect_dynamic);
        engine.take_dynamics(raw, free)
    }
}
