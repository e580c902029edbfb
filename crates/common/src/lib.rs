//! KineSync Common Utilities
//!
//! Shared infrastructure for all KineSync crates:
//! - Error types and result aliases
//! - Epoch/timestamp conversions used when rebasing recordings
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
