//! Test utilities for pfs-finder
//!
//! Available to unit tests, and to integration tests through the `test-utils` feature.
//!
//! - [`init_test_logging`] - One-time tracing setup writing through the test harness
//! - [`DataTree`] - A temporary data repository populated with empty product files
//!
//! # Example
//!
//! ```rust,no_run
//! use pfs_finder::test_utils::DataTree;
//!
//! let tree = DataTree::new().unwrap();
//! tree.design(0x1234).unwrap();
//! tree.config("2024-05-01", 0x1234, 123).unwrap();
//! tree.single("v1", 1, 2, "1,1", 0x2a, 123).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::DataTree;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=pfs_finder=trace cargo test discovery
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
