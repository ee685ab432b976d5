//! Core types for pfs-finder
//!
//! This module holds the error taxonomy shared by the filter, matching, discovery and
//! locator layers, together with the helpers the binary uses to present failures.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`FinderError`] - Enumerated error types covering every failure mode
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//!
//! # Examples
//!
//! ```rust
//! use pfs_finder::core::{FinderError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(FinderError::invalid_query("both a set and a range").into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, FinderError, user_friendly_error};

/// Result alias used by the library layers.
pub type Result<T, E = FinderError> = std::result::Result<T, E>;
