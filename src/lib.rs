//! ccore-bridge - marshaling between Rust and the ccore clustering engine
//!
//! The engine is a C/C++ shared library that runs clustering algorithms,
//! oscillatory network simulations and self-organizing maps. It shares no
//! type system or allocator with the caller: inputs go out as C records of
//! raw pointers, results come back as engine-allocated handles that must be
//! decoded and then freed through the engine.
//!
//! # Layers
//!
//! - [`ffi`]: the marshaling core. Point-set encoding, the tagged package
//!   decoder, the fixed-layout clustering/dynamics decoders and the
//!   ownership guards that release every handle exactly once.
//! - [`engine`]: dynamic loading of the library plus typed entry points.
//! - [`config`]: `ccore.toml` lookup.
//!
//! # Example
//!
//! ```rust
//! use ccore_bridge::ffi::{ForeignPointSet, MarshalError};
//!
//! let sample = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
//! let encoded = ForeignPointSet::encode(&sample).unwrap();
//! assert_eq!(encoded.dimension(), 2);
//!
//! let ragged = vec![vec![0.0, 1.0], vec![2.0]];
//! assert!(matches!(
//!     ForeignPointSet::encode(&ragged),
//!     Err(MarshalError::InvalidShape(_))
//! ));
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod ffi;

// Re-export commonly used types
pub use config::{BridgeConfig, ConfigError, EngineConfig};
pub use engine::{Engine, EngineError, EngineProbe, EngineResult};
pub use ffi::{
    split_trailing_group_as_noise, ClusterOutcome, ClusterSet, DynamicsTrace, ForeignPointSet,
    MarshalError, NestedValue, PointSet, Scalar,
};
