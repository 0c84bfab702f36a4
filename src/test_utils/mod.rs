//! Test utilities for stepref
//!
//! Helpers shared by unit and integration tests: one-time logging setup and
//! fixtures for schemas, elements and documents.
//!
//! # Example
//!
//! ```rust,no_run
//! use stepref::test_utils::fixtures::{sample_plan, sample_schema};
//!
//! let schema = sample_schema();
//! let (document, handles) = sample_plan(&schema);
//! assert_eq!(document.root(), Some(handles.root));
//! ```

pub mod fixtures;

pub use fixtures::{sample_plan, sample_schema};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=stepref=debug cargo test
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
