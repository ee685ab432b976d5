//! Cross-platform utilities and helpers
//!
//! - [`paths`] - Expansion of `~` and environment variables in configured paths, and
//!   absolutizing of relative paths

pub mod paths;

pub use paths::{absolutize, expand_path};
