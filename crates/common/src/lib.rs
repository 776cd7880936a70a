//! Storyboard Common Utilities
//!
//! Shared infrastructure for all Storyboard crates:
//! - Error types and result aliases
//! - Timecode formatting, request pacing and cooperative cancellation
//! - The user-facing activity log
//! - Tracing/logging initialization
//! - Configuration loading

pub mod activity;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use activity::*;
pub use cancel::*;
pub use clock::*;
pub use config::*;
pub use error::*;
