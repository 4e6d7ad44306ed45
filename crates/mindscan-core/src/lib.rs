//! MindScan Core
//!
//! Core types and utilities shared across MindScan components.
//!
//! This crate provides:
//! - The error taxonomy and result alias used by every crate
//! - Corpus rows, raw posts, and per-post predictions

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{LabeledExample, PostPrediction, RawPost};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{LabeledExample, PostPrediction, RawPost};
}
