//! Foreign-memory marshaling for the ccore engine
//!
//! Host data goes out as C records, engine results come back as handles
//! that are decoded into plain Rust values and then released.
//!
//! # Architecture
//!
//! ```text
//! &[Vec<f64>] ──encode──▶ ForeignPointSet ──as_ptr──▶ engine entry point
//!                                                          │
//!                                                          ▼
//!                                               raw result pointer
//!                                                          │
//!                                        ForeignHandle::from_raw(ptr, free)
//!                                                          │
//!            ┌──────────────────────┬──────────────────────┤
//!            ▼                      ▼                      ▼
//!     decode() (package)   decode_clusters()      decode_dynamics()
//!            │                      │                      │
//!            ▼                      ▼                      ▼
//!       NestedValue             ClusterSet           DynamicsTrace
//!
//!                 guard dropped ──▶ engine free function (once)
//! ```
//!
//! # Example
//!
//! ```
//! use ccore_bridge::ffi::ForeignPointSet;
//!
//! let points = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
//! let encoded = ForeignPointSet::encode(&points).unwrap();
//! assert_eq!(encoded.count(), 2);
//! assert_eq!(encoded.row(1), Some(&[3.0, 4.0][..]));
//! ```

mod encode;
mod error;
mod handle;
pub mod layout;
mod package;
mod results;
mod types;

pub use encode::{ForeignPointSet, PointSet};
pub use error::{MarshalError, MarshalResult};
pub use handle::{
    ClusteringHandle, DynamicsHandle, ForeignHandle, ObjectHandle, PackageHandle, ReleaseFn,
};
pub use results::{split_trailing_group_as_noise, ClusterOutcome, ClusterSet, DynamicsTrace};
pub use types::{NestedValue, Scalar, ScalarKind, TypeTag};
