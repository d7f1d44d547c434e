//! Layered configuration model for warden.
//!
//! Provides the [`Layer`]/[`LayerSet`] snapshot types, read-only loading of
//! `warden.yaml` layer files, and the ordered include-file resolver shared by
//! the reconciler and the CLI.

pub mod error;
pub mod layers;
pub mod resolver;
pub mod types;

pub use error::LayerError;
pub use types::{Layer, LayerName, LayerSet};
