//! ethtool metrics collector for Linux.
//!
//! This module discovers physical network interfaces in `/sys/class/net`,
//! runs `ethtool` against each of them and normalizes the text reports into
//! metric families. Both the filesystem and the ethtool binary sit behind
//! traits so the whole pipeline runs against fixtures in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  interfaces         │   │  ethtool                    │  │
//! │  │  - /sys/class/net   │   │  - parser (lines, units)    │  │
//! │  │  - name regex       │   │  - stats  (-S, queues)      │  │
//! │  └──────────┬──────────┘   │  - fields (settings, -m)    │  │
//! │             │              └──────────────┬──────────────┘  │
//! │      ┌──────▼──────┐               ┌──────▼──────┐          │
//! │      │  FileSystem │ (trait)       │CommandRunner│ (trait)  │
//! │      └──────┬──────┘               └──────┬──────┘          │
//! └─────────────┼─────────────────────────────┼─────────────────┘
//!               │                             │
//!        ┌──────┴──────┐               ┌──────┴──────┐
//!        │             │               │             │
//!   ┌────▼────┐  ┌─────▼────┐   ┌──────▼──────┐ ┌────▼──────┐
//!   │ RealFs  │  │  MockFs  │   │EthtoolRunner│ │MockRunner │
//!   └─────────┘  └──────────┘   └─────────────┘ └───────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use ethtool_exporter_core::collector::{Collector, EthtoolRunner, RealFs};
//! use ethtool_exporter_core::config::ExporterConfig;
//!
//! let runner = EthtoolRunner::locate()?;
//! let mut collector = Collector::new(RealFs::new(), runner, ExporterConfig::default());
//! let collection = collector.collect()?;
//! ```
//!
//! ## Testing (with mocks)
//!
//! ```
//! use ethtool_exporter_core::collector::{Collector, MockFs, MockRunner};
//! use ethtool_exporter_core::config::ExporterConfig;
//!
//! let mut collector = Collector::new(
//!     MockFs::typical_host(),
//!     MockRunner::typical_host(),
//!     ExporterConfig::default(),
//! );
//! let collection = collector.collect().unwrap();
//! assert_eq!(collection.families.len(), 5);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod ethtool;
pub mod interfaces;
pub mod mock;
pub mod runner;
pub mod traits;

pub use collector::{
    BASIC_INFO_METRIC, CollectError, Collector, CollectorTiming, STATISTICS_METRIC,
    XCVR_ALARMS_METRIC, XCVR_INFO_METRIC, XCVR_SENSORS_METRIC,
};
pub use interfaces::find_physical_interfaces;
pub use mock::{MockFs, MockRunner};
pub use runner::{CommandRunner, EthtoolMode, EthtoolRunner, RunError};
pub use traits::{FileSystem, RealFs};
