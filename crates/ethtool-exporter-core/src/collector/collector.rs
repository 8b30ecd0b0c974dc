//! Main collector that turns ethtool reports into metric families.
//!
//! The `Collector` struct runs one synchronous pass per call: enumerate the
//! physical interfaces, run ethtool for each enabled report, and assemble the
//! families in a fixed order.

use std::io;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::collector::ethtool::fields::{parse_basic_info, parse_module_info};
use crate::collector::ethtool::stats::StatAggregator;
use crate::collector::interfaces::find_physical_interfaces;
use crate::collector::runner::{CommandRunner, EthtoolMode, RunError};
use crate::collector::traits::FileSystem;
use crate::config::ExporterConfig;
use crate::metrics::{Collection, MetricFamily};

pub const BASIC_INFO_METRIC: &str = "node_net_ethtool_info";
pub const XCVR_INFO_METRIC: &str = "node_net_ethtool_xcvr_info";
pub const XCVR_SENSORS_METRIC: &str = "node_net_ethtool_xcvr_sensors";
pub const XCVR_ALARMS_METRIC: &str = "node_net_ethtool_xcvr_alarms";
pub const STATISTICS_METRIC: &str = "node_net_ethtool";

const SENSOR_LABELS: [&str; 2] = ["device", "type"];
const ALARM_LABELS: [&str; 3] = ["device", "type", "value"];
const SUMMARIZED_STAT_LABELS: [&str; 2] = ["device", "type"];
const QUEUED_STAT_LABELS: [&str; 3] = ["device", "type", "queue"];

/// Error type for a failed collection pass.
#[derive(Debug)]
pub enum CollectError {
    /// ethtool could not be executed; no pass can ever succeed.
    Fatal(RunError),
    /// The discovery directory could not be listed.
    Discovery(io::Error),
}

impl CollectError {
    /// Returns `true` if the process should stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::Fatal(_))
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Fatal(e) => write!(f, "{}", e),
            CollectError::Discovery(e) => write!(f, "interface discovery failed: {}", e),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Fatal(e) => Some(e),
            CollectError::Discovery(e) => Some(e),
        }
    }
}

impl From<RunError> for CollectError {
    fn from(e: RunError) -> Self {
        CollectError::Fatal(e)
    }
}

/// Timing information for each collector phase.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total pass time.
    pub total: Duration,
    /// Time to enumerate interfaces.
    pub discovery: Duration,
    /// Time spent on `ethtool <dev>`.
    pub basic_info: Duration,
    /// Time spent on `ethtool -m <dev>`.
    pub sfp_diagnostics: Duration,
    /// Time spent on `ethtool -S <dev>`.
    pub statistics: Duration,
    /// Number of interfaces scraped.
    pub interfaces: usize,
}

/// Main collector that gathers ethtool metrics.
pub struct Collector<F: FileSystem, R: CommandRunner> {
    fs: F,
    runner: R,
    config: ExporterConfig,
    /// Timing information from the last collect call.
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem, R: CommandRunner> Collector<F, R> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `runner` - ethtool runner (real or mock)
    /// * `config` - Resolved configuration, fixed for the collector's lifetime
    pub fn new(fs: F, runner: R, config: ExporterConfig) -> Self {
        Self {
            fs,
            runner,
            config,
            last_timing: None,
        }
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Returns timing information from the last collect call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Runs one collection pass.
    ///
    /// Families appear in a fixed order: basic info, transceiver info,
    /// transceiver sensors, transceiver alarms, statistics. Disabled
    /// collectors contribute nothing; an enabled collector always contributes
    /// its families, even when they end up empty.
    pub fn collect(&mut self) -> Result<Collection, CollectError> {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();

        if self.config.all_collectors_disabled() {
            debug!("all collectors disabled");
            return Ok(Collection::default());
        }

        let t = Instant::now();
        let interfaces = find_physical_interfaces(&self.fs, &self.config)
            .map_err(CollectError::Discovery)?;
        timing.discovery = t.elapsed();
        timing.interfaces = interfaces.len();

        let mut families = Vec::with_capacity(5);
        if self.config.collect_basic_info {
            let t = Instant::now();
            families.push(self.collect_basic_info(&interfaces)?);
            timing.basic_info = t.elapsed();
        }

        if self.config.collect_sfp_diagnostics {
            let t = Instant::now();
            families.extend(self.collect_sfp_diagnostics(&interfaces)?);
            timing.sfp_diagnostics = t.elapsed();
        }

        if self.config.collect_statistics {
            let t = Instant::now();
            families.push(self.collect_statistics(&interfaces)?);
            timing.statistics = t.elapsed();
        }

        let collection = Collection { families };
        timing.total = start.elapsed();
        debug!(
            total_ms = timing.total.as_millis() as u64,
            discovery_ms = timing.discovery.as_millis() as u64,
            basic_info_ms = timing.basic_info.as_millis() as u64,
            sfp_diagnostics_ms = timing.sfp_diagnostics.as_millis() as u64,
            statistics_ms = timing.statistics.as_millis() as u64,
            interfaces = timing.interfaces,
            series = collection.series_count(),
            "collection pass finished"
        );
        self.last_timing = Some(timing);

        Ok(collection)
    }

    fn collect_basic_info(&self, interfaces: &[String]) -> Result<MetricFamily, CollectError> {
        let mut family = MetricFamily::info(BASIC_INFO_METRIC, "Ethtool device information");

        for device in interfaces {
            let Some(output) = self.run_text(device, EthtoolMode::Settings)? else {
                continue;
            };
            let record = parse_basic_info(device, &output);
            family.add_info(record.into_labels());
        }

        Ok(family)
    }

    fn collect_sfp_diagnostics(
        &self,
        interfaces: &[String],
    ) -> Result<[MetricFamily; 3], CollectError> {
        let mut info =
            MetricFamily::info(XCVR_INFO_METRIC, "Ethtool device transceiver information");
        let mut sensors = MetricFamily::gauge(XCVR_SENSORS_METRIC, "Ethtool transceiver sensors");
        let mut alarms =
            MetricFamily::gauge(XCVR_ALARMS_METRIC, "Ethtool transceiver sensor alarms");

        for device in interfaces {
            let Some(output) = self.run_text(device, EthtoolMode::ModuleInfo)? else {
                // Usually no module is plugged in.
                info!(device = %device, "cannot get transceiver data");
                continue;
            };

            let report = parse_module_info(device, &output);
            info.add_info(report.info.into_labels());
            for reading in report.sensors {
                sensors.add_metric(
                    &SENSOR_LABELS,
                    vec![reading.device, reading.type_label],
                    reading.value,
                );
            }
            for alarm in report.alarms {
                alarms.add_metric(
                    &ALARM_LABELS,
                    vec![alarm.device, alarm.type_label, alarm.value_text],
                    1.0,
                );
            }
        }

        Ok([info, sensors, alarms])
    }

    fn collect_statistics(&self, interfaces: &[String]) -> Result<MetricFamily, CollectError> {
        let mut family = MetricFamily::gauge(STATISTICS_METRIC, "Ethtool data");
        let label_names: &[&str] = if self.config.summarize_queues {
            &SUMMARIZED_STAT_LABELS
        } else {
            &QUEUED_STAT_LABELS
        };

        for device in interfaces {
            let Some(output) = self.run_text(device, EthtoolMode::Statistics)? else {
                continue;
            };

            let mut aggregator = StatAggregator::new(
                device,
                &self.config.stat_filter,
                self.config.summarize_queues,
            );
            aggregator.add_output(&output);
            for entry in aggregator.into_entries() {
                family.add_metric(label_names, entry.labels, entry.value);
            }
        }

        Ok(family)
    }

    /// Runs ethtool and decodes its output as UTF-8.
    ///
    /// `Ok(None)` means no data for this device: a non-zero exit (already
    /// logged by the runner), empty output or undecodable output.
    fn run_text(&self, device: &str, mode: EthtoolMode) -> Result<Option<String>, RunError> {
        let Some(stdout) = self.runner.run(device, mode)? else {
            return Ok(None);
        };
        if stdout.is_empty() {
            debug!(device, ?mode, "ethtool printed nothing");
            return Ok(None);
        }
        match String::from_utf8(stdout) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                error!(device, ?mode, error = %e, "ethtool output is not valid UTF-8");
                Ok(None)
            }
        }
    }
}
