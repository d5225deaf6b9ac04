//! Self-organizing feature map

use libc::{c_uint, c_void};

use super::params::{SomConnection, SomInit};
use super::{symbols, Engine, EngineResult};
use crate::ffi::layout::{DataRepresentation, PackageHeader};
use crate::ffi::{ForeignPointSet, NestedValue, ObjectHandle};

type Object = *mut c_void;

type SomCreateFn = unsafe extern "C" fn(
    *const DataRepresentation,
    c_uint,
    c_uint,
    c_uint,
    c_uint,
    c_uint,
) -> Object;
type SomTrainFn = unsafe extern "C" fn(Object, bool) -> c_uint;
type SomSimulateFn = unsafe extern "C" fn(Object, *const DataRepresentation) -> c_uint;
type SomCountFn = unsafe extern "C" fn(Object) -> c_uint;
type SomPackageFn = unsafe extern "C" fn(Object) -> *mut PackageHeader;

/// A trained or untrained SOM living inside the engine
pub struct Som<'lib> {
    engine: &'lib Engine,
    handle: ObjectHandle<'lib>,
}

impl Engine {
    /// Create a `rows` x `cols` map over `data`
    pub fn som_create<R: AsRef<[f64]>>(
        &self,
        data: &[R],
        rows: u32,
        cols: u32,
        epochs: u32,
        conn_type: SomConnection,
        init_type: SomInit,
    ) -> EngineResult<Som<'_>> {
        let sample = ForeignPointSet::encode(data)?;
        let destroy = self.release_fn(symbols::SOM_DESTROY)?;
        let handle = unsafe {
            let create: SomCreateFn = self.function(symbols::SOM_CREATE)?;
            let raw = create(
                sample.as_ptr(),
                rows,
                cols,
                epochs,
                conn_type.code(),
                init_type.code(),
            );
            self.take_object(symbols::SOM_CREATE, raw, destroy)?
        };
        Ok(Som {
            engine: self,
            handle,
        })
    }
}

impl Som<'_> {
    /// Train; returns the number of epochs actually run
    pub fn train(&self, autostop: bool) -> EngineResult<u32> {
        unsafe {
            let entry: SomTrainFn = self.engine.function(symbols::SOM_TRAIN)?;
            Ok(entry(self.handle.as_raw(), autostop))
        }
    }

    /// Index of the winning neuron for one pattern, without learning
    pub fn simulate(&self, pattern: &[f64]) -> EngineResult<u32> {
        let encoded = ForeignPointSet::encode(&[pattern])?;
        unsafe {
            let entry: SomSimulateFn = self.engine.function(symbols::SOM_SIMULATE)?;
            Ok(entry(self.handle.as_raw(), encoded.as_ptr()))
        }
    }

    /// Number of neurons that won at least once in the last epoch
    pub fn winner_number(&self) -> EngineResult<u32> {
        self.count(symbols::SOM_GET_WINNER_NUMBER)
    }

    /// Number of neurons
    pub fn size(&self) -> EngineResult<u32> {
        self.count(symbols::SOM_GET_SIZE)
    }

    /// Object indices captured by each neuron
    pub fn capture_objects(&self) -> EngineResult<Vec<Vec<u32>>> {
        Ok(self.package(symbols::SOM_GET_CAPTURE_OBJECTS)?.into_index_lists()?)
    }

    /// Weight vector of each neuron
    pub fn weights(&self) -> EngineResult<Vec<Vec<f64>>> {
        Ok(self.package(symbols::SOM_GET_WEIGHTS)?.into_f64_matrix()?)
    }

    /// Number of captured objects per neuron
    pub fn awards(&self) -> EngineResult<Vec<u32>> {
        Ok(self.package(symbols::SOM_GET_AWARDS)?.into_index_vec()?)
    }

    /// Neighbor indices of each neuron
    pub fn neighbors(&self) -> EngineResult<Vec<Vec<u32>>> {
        Ok(self.package(symbols::SOM_GET_NEIGHBORS)?.into_index_lists()?)
    }

    fn count(&self, name: &str) -> EngineResult<u32> {
        unsafe {
            let entry: SomCountFn = self.engine.function(name)?;
            Ok(entry(self.handle.as_raw()))
        }
    }

    fn package(&self, name: &str) -> EngineResult<NestedValue> {
        let free = self.engine.release_fn(symbols::FREE_PACKAGE)?;
        unsafe {
            let entry: SomPackageFn = self.engine.function(name)?;
            self.engine.take_package(entry(self.handle.as_raw()), free)
        }
    }
}
