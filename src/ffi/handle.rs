//! Ownership guards for engine-allocated memory
//!
//! Every pointer the engine hands back is wrapped in a [`ForeignHandle`]
//! together with the engine function that frees it. The guard releases on
//! drop, so early returns and `?` cannot leak a handle, and releasing
//! explicitly consumes the guard:
//!
//! ```compile_fail
//! use ccore_bridge::ffi::PackageHandle;
//!
//! unsafe extern "C" fn free_package(_: *mut std::ffi::c_void) {}
//!
//! let handle: PackageHandle<'static> =
//!     unsafe { PackageHandle::from_raw(std::ptr::null_mut(), free_package) };
//! handle.release();
//! let _ = handle.decode(); // decode after release
//! ```
//!
//! ```compile_fail
//! use ccore_bridge::ffi::PackageHandle;
//!
//! unsafe extern "C" fn free_package(_: *mut std::ffi::c_void) {}
//!
//! let handle: PackageHandle<'static> =
//!     unsafe { PackageHandle::from_raw(std::ptr::null_mut(), free_package) };
//! handle.release();
//! handle.release(); // double release
//! ```
//!
//! The same sequence without the misuse compiles:
//!
//! ```
//! use ccore_bridge::ffi::PackageHandle;
//!
//! unsafe extern "C" fn free_package(_: *mut std::ffi::c_void) {}
//!
//! let handle: PackageHandle<'static> =
//!     unsafe { PackageHandle::from_raw(std::ptr::null_mut(), free_package) };
//! let value = handle.decode().unwrap();
//! handle.release();
//! assert!(value.is_empty());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use libc::c_void;

use super::layout::{ClusteringResult, DynamicResult, PackageHeader};

/// Engine function that frees one handle
pub type ReleaseFn = unsafe extern "C" fn(*mut c_void);

/// Scoped owner of one engine allocation
///
/// `'lib` ties the handle to the loaded engine library so the library
/// cannot be unloaded while the handle is alive. The guard holds a
/// `NonNull`, which keeps it on the thread that received it.
pub struct ForeignHandle<'lib, T> {
    raw: Option<NonNull<T>>,
    release: ReleaseFn,
    _lib: PhantomData<&'lib ()>,
}

/// Generic tagged package
pub type PackageHandle<'lib> = ForeignHandle<'lib, PackageHeader>;
/// Fixed-layout clustering result
pub type ClusteringHandle<'lib> = ForeignHandle<'lib, ClusteringResult>;
/// Fixed-layout simulation result
pub type DynamicsHandle<'lib> = ForeignHandle<'lib, DynamicResult>;
/// Opaque stateful engine object (network or map)
pub type ObjectHandle<'lib> = ForeignHandle<'lib, c_void>;

impl<'lib, T> ForeignHandle<'lib, T> {
    /// Take ownership of an engine allocation.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a live `T` allocated by the engine
    /// that nothing else will free, and `release` must be the engine
    /// function that frees it. A null pointer is never passed to `release`.
    pub unsafe fn from_raw(ptr: *mut T, release: ReleaseFn) -> Self {
        Self {
            raw: NonNull::new(ptr),
            release,
            _lib: PhantomData,
        }
    }

    /// True when the engine returned a null pointer
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Borrow the record behind the handle.
    pub(crate) fn record(&self) -> Option<&T> {
        // Safety: `from_raw` requires a live allocation, and it stays live
        // until `self` is dropped.
        self.raw.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Address to hand back to the engine while the guard is alive.
    pub(crate) fn as_raw(&self) -> *mut T {
        self.raw.map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Release now. Consumes the guard, so the handle cannot be used again.
    pub fn release(self) {
        drop(self)
    }
}

impl<T> Drop for ForeignHandle<'_, T> {
    fn drop(&mut self) {
        if let Some(ptr) = self.raw.take() {
            tracing::debug!(
                handle = std::any::type_name::<T>(),
                address = ?ptr.as_ptr(),
                "releasing engine handle"
            );
            // Safety: the pointer came from the engine together with this
            // release function, and `take` guarantees a single call.
            unsafe { (self.release)(ptr.as_ptr().cast()) }
        }
    }
}

impl<T> fmt::Debug for ForeignHandle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignHandle")
            .field("kind", &std::any::type_name::<T>())
            .field("null", &self.is_null())
            .finish()
    }
}
