//! Mock implementations for testing.
//!
//! This module provides `MockFs`, `MockRunner` and pre-built scenarios for
//! testing the collector without a real `/sys/class/net` or ethtool binary.

mod filesystem;
mod runner;
pub mod scenarios;

pub use filesystem::MockFs;
pub use runner::{MockResponse, MockRunner};
