//! C-compatible record layouts shared with the engine
//!
//! Field order and widths mirror the engine headers exactly. Every record
//! is `#[repr(C)]` and holds raw pointers, so none of them are `Send`.

use libc::{c_double, c_uint, c_void};

/// Input point set: `number_objects` rows of `dimension` doubles each.
#[repr(C)]
#[derive(Debug)]
pub struct DataRepresentation {
    /// Number of rows
    pub number_objects: c_uint,
    /// Length of every row
    pub dimension: c_uint,
    /// `number_objects` row addresses
    pub pointer_objects: *mut *mut c_double,
}

/// One cluster inside a [`ClusteringResult`].
#[repr(C)]
#[derive(Debug)]
pub struct ClusterRepresentation {
    /// Number of indices in `pointer_objects`
    pub number_objects: c_uint,
    /// Object indices into the input point set
    pub pointer_objects: *mut c_uint,
}

/// Fixed-layout clustering output.
#[repr(C)]
#[derive(Debug)]
pub struct ClusteringResult {
    /// Number of entries in `pointer_clusters`
    pub number_clusters: c_uint,
    /// Contiguous array of clusters
    pub pointer_clusters: *mut ClusterRepresentation,
}

/// Fixed-layout simulation output.
#[repr(C)]
#[derive(Debug)]
pub struct DynamicResult {
    /// Number of recorded steps
    pub size_dynamic: c_uint,
    /// Number of oscillators per step
    pub size_network: c_uint,
    /// `size_dynamic` timestamps
    pub times: *mut c_double,
    /// `size_dynamic` rows of `size_network` values
    pub dynamic: *mut *mut c_double,
}

/// Header of the generic self-describing package.
#[repr(C)]
#[derive(Debug)]
pub struct PackageHeader {
    /// Element count
    pub size: c_uint,
    /// Raw type tag, see [`super::TypeTag`]
    pub type_: c_uint,
    /// Scalars of the tagged width, or `size` pointers to sub-packages
    pub data: *mut c_void,
}
