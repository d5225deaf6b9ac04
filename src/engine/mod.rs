//! Engine Binding
//!
//! Loads the ccore shared library once and exposes its entry points as
//! safe methods. Every method follows the same sequence:
//!
//! ```text
//! encode input ──▶ resolve entry + free symbols ──▶ call
//!      ──▶ guard result ──▶ decode ──▶ guard drops (engine free)
//! ```
//!
//! Free symbols are resolved before the call so a missing symbol can never
//! leave a result without its release function.
//!
//! # Example
//!
//! ```ignore
//! use ccore_bridge::Engine;
//!
//! let engine = Engine::load("/opt/ccore/libccore.so")?;
//! let sample = vec![vec![0.0, 0.1], vec![0.1, 0.0], vec![5.0, 5.1]];
//! let outcome = engine.dbscan(&sample, 0.5, 1, true)?;
//! println!("{:?} noise={:?}", outcome.clusters, outcome.noise);
//! ```

mod loader;
mod network;
mod params;
mod som;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libc::{c_double, c_uint, c_void};
use libloading::{Library, Symbol};
use serde::Serialize;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::ffi::layout::{ClusteringResult, DataRepresentation, DynamicResult, PackageHeader};
use crate::ffi::{
    ClusterOutcome, ClusterSet, ClusteringHandle, DynamicsHandle, DynamicsTrace, ForeignPointSet,
    MarshalError, NestedValue, ObjectHandle, PackageHandle, ReleaseFn,
};

pub use loader::{library_filename, LibraryLoader};
pub use network::{HSyncNet, SyncNet, SyncNetwork};
pub use params::{ConnectionType, InitialPhases, Solver, SomConnection, SomInit};
pub use som::Som;

/// Exported symbol names
pub mod symbols {
    pub const DBSCAN: &str = "dbscan_algorithm";
    pub const CURE: &str = "cure_algorithm";
    pub const HIERARCHICAL: &str = "hierarchical_algorithm";
    pub const KMEANS: &str = "kmeans_algorithm";
    pub const ROCK: &str = "rock_algorithm";
    pub const XMEANS: &str = "xmeans_algorithm";

    pub const CREATE_SYNC_NETWORK: &str = "create_sync_network";
    pub const DESTROY_SYNC_NETWORK: &str = "destroy_sync_network";
    pub const SIMULATE_SYNC_NETWORK: &str = "simulate_sync_network";
    pub const SIMULATE_DYNAMIC_SYNC_NETWORK: &str = "simulate_dynamic_sync_network";
    pub const ALLOCATE_SYNC_ENSEMBLES: &str = "allocate_sync_ensembles_sync_network";
    pub const SYNC_ORDER: &str = "sync_order";
    pub const SYNC_LOCAL_ORDER: &str = "sync_local_order";

    pub const CREATE_SYNCNET: &str = "create_syncnet_network";
    pub const DESTROY_SYNCNET: &str = "destroy_syncnet_network";
    pub const PROCESS_SYNCNET: &str = "process_syncnet";
    pub const GET_CLUSTERS_SYNCNET: &str = "get_clusters_syncnet";

    pub const CREATE_HSYNCNET: &str = "create_hsyncnet";
    pub const DESTROY_HSYNCNET: &str = "destroy_hsyncnet_network";
    pub const PROCESS_HSYNCNET: &str = "process_hsyncnet";

    pub const SOM_CREATE: &str = "som_create";
    pub const SOM_DESTROY: &str = "som_destroy";
    pub const SOM_TRAIN: &str = "som_train";
    pub const SOM_SIMULATE: &str = "som_simulate";
    pub const SOM_GET_WINNER_NUMBER: &str = "som_get_winner_number";
    pub const SOM_GET_SIZE: &str = "som_get_size";
    pub const SOM_GET_CAPTURE_OBJECTS: &str = "som_get_capture_objects";
    pub const SOM_GET_WEIGHTS: &str = "som_get_weights";
    pub const SOM_GET_AWARDS: &str = "som_get_awards";
    pub const SOM_GET_NEIGHBORS: &str = "som_get_neighbors";

    pub const FREE_CLUSTERING_RESULT: &str = "free_clustering_result";
    pub const FREE_DYNAMIC_RESULT: &str = "free_dynamic_result";
    pub const FREE_PACKAGE: &str = "free_pyclustering_package";
    pub const DESTROY_OBJECT: &str = "destroy_object";

    /// Every symbol the bindings may resolve
    pub const ALL: &[&str] = &[
        DBSCAN,
        CURE,
        HIERARCHICAL,
        KMEANS,
        ROCK,
        XMEANS,
        CREATE_SYNC_NETWORK,
        DESTROY_SYNC_NETWORK,
        SIMULATE_SYNC_NETWORK,
        SIMULATE_DYNAMIC_SYNC_NETWORK,
        ALLOCATE_SYNC_ENSEMBLES,
        SYNC_ORDER,
        SYNC_LOCAL_ORDER,
        CREATE_SYNCNET,
        DESTROY_SYNCNET,
        PROCESS_SYNCNET,
        GET_CLUSTERS_SYNCNET,
        CREATE_HSYNCNET,
        DESTROY_HSYNCNET,
        PROCESS_HSYNCNET,
        SOM_CREATE,
        SOM_DESTROY,
        SOM_TRAIN,
        SOM_SIMULATE,
        SOM_GET_WINNER_NUMBER,
        SOM_GET_SIZE,
        SOM_GET_CAPTURE_OBJECTS,
        SOM_GET_WEIGHTS,
        SOM_GET_AWARDS,
        SOM_GET_NEIGHBORS,
        FREE_CLUSTERING_RESULT,
        FREE_DYNAMIC_RESULT,
        FREE_PACKAGE,
        DESTROY_OBJECT,
    ];
}

type Data = *const DataRepresentation;

type DbscanFn = unsafe extern "C" fn(Data, c_double, c_uint) -> *mut ClusteringResult;
type CureFn = unsafe extern "C" fn(Data, c_uint, c_uint, c_double) -> *mut ClusteringResult;
type HierarchicalFn = unsafe extern "C" fn(Data, c_uint) -> *mut ClusteringResult;
type KmeansFn = unsafe extern "C" fn(Data, Data, c_double) -> *mut ClusteringResult;
type RockFn = unsafe extern "C" fn(Data, c_double, c_uint, c_double) -> *mut ClusteringResult;
type XmeansFn = unsafe extern "C" fn(Data, Data, c_uint, c_double) -> *mut ClusteringResult;

/// Errors raised while loading or calling the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine library not found: {0}")]
    LibraryNotFound(String),

    #[error("failed to load engine library '{}': {source}", path.display())]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol '{name}' not found in engine: {source}")]
    SymbolNotFound {
        name: String,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol '{0}' not registered with the in-process engine")]
    SymbolNotRegistered(String),

    #[error("engine returned a null handle from '{0}'")]
    NullHandle(&'static str),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Which known symbols a loaded library exports
#[derive(Debug, Clone, Serialize)]
pub struct EngineProbe {
    pub path: PathBuf,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl EngineProbe {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// A loaded engine library, or an engine linked into the process
///
/// Handles and stateful objects borrow the engine, so the library stays
/// loaded for as long as any of them exist.
pub struct Engine {
    path: PathBuf,
    entries: SymbolSource,
}

/// Where entry points are resolved from
enum SymbolSource {
    /// Shared library opened at runtime
    Library(Library),
    /// Addresses of an engine linked into this process
    Table(HashMap<String, usize>),
}

impl Engine {
    /// Load the engine from an explicit path
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();

        // Safety: loading runs the library's initializers. The engine is a
        // trusted component selected by the caller.
        let library = unsafe { Library::new(&path) }.map_err(|source| EngineError::LoadFailed {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loaded engine library");
        Ok(Self {
            path,
            entries: SymbolSource::Library(library),
        })
    }

    /// Use an engine that is linked into this process instead of loaded.
    ///
    /// `label` stands in for the library path in logs and probe reports.
    /// Null addresses are treated as missing symbols.
    ///
    /// # Safety
    ///
    /// Every address must be an `extern "C"` function with exactly the
    /// signature the engine exports under that name, and must stay callable
    /// for the lifetime of the returned engine.
    pub unsafe fn from_symbols<I, S>(label: impl Into<PathBuf>, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, *const c_void)>,
        S: Into<String>,
    {
        let table: HashMap<String, usize> = entries
            .into_iter()
            .filter(|(_, address)| !address.is_null())
            .map(|(name, address)| (name.into(), address as usize))
            .collect();
        let path = label.into();
        tracing::debug!(label = %path.display(), symbols = table.len(), "registered in-process engine");
        Self {
            path,
            entries: SymbolSource::Table(table),
        }
    }

    /// Resolve the library named in `config` and load it
    pub fn open(config: &EngineConfig) -> EngineResult<Self> {
        let loader = LibraryLoader::from_config(config);
        let path = loader
            .find_library(&config.library)
            .ok_or_else(|| EngineError::LibraryNotFound(config.library.clone()))?;
        Self::load(path)
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the library exports `name`
    pub fn has_symbol(&self, name: &str) -> bool {
        match &self.entries {
            // Safety: the symbol is only looked up, never called.
            SymbolSource::Library(library) => {
                unsafe { library.get::<*const c_void>(name.as_bytes()) }.is_ok()
            }
            SymbolSource::Table(table) => table.contains_key(name),
        }
    }

    /// Report which known entry points the library exports
    pub fn probe(&self) -> EngineProbe {
        let (present, missing): (Vec<&str>, Vec<&str>) =
            symbols::ALL.iter().copied().partition(|name| self.has_symbol(name));
        EngineProbe {
            path: self.path.clone(),
            present: present.into_iter().map(String::from).collect(),
            missing: missing.into_iter().map(String::from).collect(),
        }
    }

    /// Resolve a function symbol.
    ///
    /// # Safety
    ///
    /// `F` must be the exact `extern "C"` signature of the exported symbol,
    /// and the returned pointer must not be used after `self` is dropped.
    unsafe fn function<F: Copy>(&self, name: &str) -> EngineResult<F> {
        let function = match &self.entries {
            SymbolSource::Library(library) => {
                let symbol: Symbol<F> =
                    library
                        .get(name.as_bytes())
                        .map_err(|source| EngineError::SymbolNotFound {
                            name: name.to_string(),
                            source,
                        })?;
                *symbol
            }
            SymbolSource::Table(table) => {
                let address = table
                    .get(name)
                    .ok_or_else(|| EngineError::SymbolNotRegistered(name.to_string()))?;
                debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<usize>());
                std::mem::transmute_copy::<usize, F>(address)
            }
        };
        tracing::debug!(symbol = name, "resolved engine symbol");
        Ok(function)
    }

    fn release_fn(&self, name: &str) -> EngineResult<ReleaseFn> {
        // Safety: every free/destroy entry point takes a single pointer.
        unsafe { self.function::<ReleaseFn>(name) }
    }

    /// Guard, decode and release a clustering result.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a clustering result freshly returned by this
    /// engine that nothing else will free.
    unsafe fn take_clusters(
        &self,
        raw: *mut ClusteringResult,
        free: ReleaseFn,
    ) -> EngineResult<ClusterSet> {
        let handle: ClusteringHandle<'_> = ClusteringHandle::from_raw(raw, free);
        Ok(handle.decode_clusters_and_release()?)
    }

    /// Guard, decode and release a dynamics result.
    ///
    /// # Safety
    ///
    /// Same contract as [`Engine::take_clusters`], for dynamics results.
    unsafe fn take_dynamics(
        &self,
        raw: *mut DynamicResult,
        free: ReleaseFn,
    ) -> EngineResult<DynamicsTrace> {
        let handle: DynamicsHandle<'_> = DynamicsHandle::from_raw(raw, free);
        Ok(handle.decode_dynamics_and_release()?)
    }

    /// Guard, decode and release a generic package.
    ///
    /// # Safety
    ///
    /// Same contract as [`Engine::take_clusters`], for packages.
    unsafe fn take_package(
        &self,
        raw: *mut PackageHeader,
        free: ReleaseFn,
    ) -> EngineResult<NestedValue> {
        let handle: PackageHandle<'_> = PackageHandle::from_raw(raw, free);
        Ok(handle.decode_and_release()?)
    }

    /// Guard a stateful object returned by a constructor.
    ///
    /// # Safety
    ///
    /// `raw` must be null or an object freshly created by this engine, and
    /// `destroy` must be the destructor matching its constructor.
    unsafe fn take_object(
        &self,
        constructor: &'static str,
        raw: *mut c_void,
        destroy: ReleaseFn,
    ) -> EngineResult<ObjectHandle<'_>> {
        let handle = ObjectHandle::from_raw(raw, destroy);
        if handle.is_null() {
            return Err(EngineError::NullHandle(constructor));
        }
        tracing::debug!(constructor, "created engine object");
        Ok(handle)
    }

    // =========================================================================
    // Clustering algorithms
    // =========================================================================

    /// DBSCAN. The engine appends unclustered points as a final group; it is
    /// split off and returned only when `report_noise` is set.
    pub fn dbscan<R: AsRef<[f64]>>(
        &self,
        sample: &[R],
        eps: f64,
        min_neighbors: u32,
        report_noise: bool,
    ) -> EngineResult<ClusterOutcome> {
        let data = ForeignPointSet::encode(sample)?;
        let free = self.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        let set = unsafe {
            let entry: DbscanFn = self.function(symbols::DBSCAN)?;
            self.take_clusters(entry(data.as_ptr(), eps, min_neighbors), free)?
        };
        Ok(ClusterOutcome::from_groups(set, report_noise))
    }

    /// CURE
    pub fn cure<R: AsRef<[f64]>>(
        &self,
        sample: &[R],
        number_clusters: u32,
        number_represent_points: u32,
        compression: f64,
    ) -> EngineResult<ClusterSet> {
        let data = ForeignPointSet::encode(sample)?;
        let free = self.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: CureFn = self.function(symbols::CURE)?;
            self.take_clusters(
                entry(
                    data.as_ptr(),
                    number_clusters,
                    number_represent_points,
                    compression,
                ),
                free,
            )
        }
    }

    /// Agglomerative hierarchical clustering
    pub fn hierarchical<R: AsRef<[f64]>>(
        &self,
        sample: &[R],
        number_clusters: u32,
    ) -> EngineResult<ClusterSet> {
        let data = ForeignPointSet::encode(sample)?;
        let free = self.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: HierarchicalFn = self.function(symbols::HIERARCHICAL)?;
            self.take_clusters(entry(data.as_ptr(), number_clusters), free)
        }
    }

    /// K-Means from explicit initial centers
    pub fn kmeans<R: AsRef<[f64]>, C: AsRef<[f64]>>(
        &self,
        sample: &[R],
        centers: &[C],
        tolerance: f64,
    ) -> EngineResult<ClusterSet> {
        let data = ForeignPointSet::encode(sample)?;
        let initial = ForeignPointSet::encode(centers)?;
        let free = self.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: KmeansFn = self.function(symbols::KMEANS)?;
            self.take_clusters(entry(data.as_ptr(), initial.as_ptr(), tolerance), free)
        }
    }

    /// ROCK
    pub fn rock<R: AsRef<[f64]>>(
        &self,
        sample: &[R],
        eps: f64,
        number_clusters: u32,
        threshold: f64,
    ) -> EngineResult<ClusterSet> {
        let data = ForeignPointSet::encode(sample)?;
        let free = self.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: RockFn = self.function(symbols::ROCK)?;
            self.take_clusters(entry(data.as_ptr(), eps, number_clusters, threshold), free)
        }
    }

    /// X-Means, growing from `centers` up to `kmax` clusters
    pub fn xmeans<R: AsRef<[f64]>, C: AsRef<[f64]>>(
        &self,
        sample: &[R],
        centers: &[C],
        kmax: u32,
        tolerance: f64,
    ) -> EngineResult<ClusterSet> {
        let data = ForeignPointSet::encode(sample)?;
        let initial = ForeignPointSet::encode(centers)?;
        let free = self.release_fn(symbols::FREE_CLUSTERING_RESULT)?;
        unsafe {
            let entry: XmeansFn = self.function(symbols::XMEANS)?;
            self.take_clusters(
                entry(data.as_ptr(), initial.as_ptr(), kmax, tolerance),
                free,
            )
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("path", &self.path).finish()
    }
}
