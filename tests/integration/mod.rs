//! Integration test suite for pfs-finder
//!
//! End-to-end tests over real directory trees, through the library API and through the
//! `pfsfind` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **locator**: `find`/`locate`/`load` over a populated repository
//! - **roots**: Root resolution from reference paths, defaults and explicit directories
//! - **config_env**: Configuration file and environment variable layering
//! - **cli**: The `pfsfind` binary

mod cli;
mod config_env;
mod locator;
mod roots;
