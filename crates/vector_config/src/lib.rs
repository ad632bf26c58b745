//! Named-Vector Configuration
//!
//! An insertion-ordered map from variable names to dense vectors, used by
//! iterative optimizers to hold the current estimate and apply updates:
//! - Elementwise arithmetic between maps (`try_add`, `try_sub`, `scale`)
//! - Inner products (`dot`)
//! - Incremental updates from a partial delta map or a flat delta vector
//!   (`exmap`, `exmap_vector`)
//! - Tolerant comparison (`equals`)
//!
//! Lookups of missing keys and dimension mismatches are reported as
//! [`VectorConfigError`] after logging the offending contents.

mod config;
mod error;
pub mod vector;

pub use config::{dot, VectorConfig};
pub use error::{VectorConfigError, VectorConfigResult};
pub use vector::Vector;
