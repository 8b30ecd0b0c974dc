//! ethtool-exporter-core: parsing and normalization engine for ethtool output.
//!
//! Provides:
//! - `collector`: interface discovery, ethtool invocation, line parsing,
//!   statistic aggregation and field classification
//! - `metrics`: metric families, Prometheus text exposition, textfile writer
//! - `config`: resolved, immutable exporter configuration

pub mod collector;
pub mod config;
pub mod metrics;

/// Crate version, shared with the binary for `--version` and start-up logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status used when ethtool cannot be found or executed.
pub const EXIT_FATAL: i32 = 1;
