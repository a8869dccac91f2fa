//! Shared test fixtures for ScoreForge crates.
//!
//! This crate provides data types and descriptors for testing.
//! It does NOT depend on `scoreforge-scoring` to avoid circular dependencies.
//!
//! - [`entity`] - Entities with a group and a planning variable
//! - [`list`] - Entities with a planning list variable
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! scoreforge-test = { workspace = true }
//! ```

pub mod entity;
pub mod list;

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// Re-export commonly used types at crate root for convenience
pub use entity::{descriptor, TestEntity, TestEntityGroup, TestSolution, TestValue};
pub use list::{list_descriptor, TestListEntity, TestListSolution, TestListValue};

static INIT: OnceLock<()> = OnceLock::new();

/// Routes `tracing` output to the test harness.
///
/// Filtered by `RUST_LOG`, `warn` by default. Safe to call from every test;
/// only the first call has effect.
pub fn init_test_logging() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
