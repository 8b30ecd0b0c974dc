//! Aggregation of `ethtool -S` statistics for one device.
//!
//! Some drivers (Broadcom bnxt, for example) print the same counter once per
//! hardware queue:
//!
//! ```text
//!      [0]: rx_ucast_packets: 1000
//!      [1]: rx_ucast_packets: 2000
//! ```
//!
//! With queue summarization these become one `rx_ucast_packets` series worth
//! 3000. Without it each queue keeps its own series with a `queue` label, and
//! queue-less counters get queue `"0"` so every series has the same labels.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::collector::ethtool::parser::parse_stat_line;
use crate::config::FilterPolicy;

/// Queue label used for statistics without a queue prefix.
pub const DEFAULT_QUEUE: &str = "0";

/// One aggregated statistic, ready to become a series.
#[derive(Debug, Clone, PartialEq)]
pub struct StatEntry {
    /// Deduplication key: the name, or name+queue when queues are kept apart.
    pub aggregation_key: String,
    /// `[device, name]` or `[device, name, queue]`.
    pub labels: Vec<String>,
    pub value: f64,
}

/// Accumulates statistic records for a single device during one pass.
pub struct StatAggregator<'a> {
    device: &'a str,
    filter: &'a FilterPolicy,
    summarize_queues: bool,
    entries: Vec<StatEntry>,
    index: HashMap<String, usize>,
}

impl<'a> StatAggregator<'a> {
    /// Creates an empty aggregator for `device`.
    pub fn new(device: &'a str, filter: &'a FilterPolicy, summarize_queues: bool) -> Self {
        Self {
            device,
            filter,
            summarize_queues,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds one record.
    ///
    /// Filtered keys are dropped silently; unparsable values are dropped with a
    /// warning. A repeated key is summed when summarizing queues and otherwise
    /// dropped (the first value wins).
    pub fn add_statistic(&mut self, queue: Option<&str>, key: &str, raw_value: &str) {
        if !self.filter.allows(key) {
            return;
        }

        let value: f64 = match raw_value.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(
                    device = self.device,
                    key, raw_value, "failed parsing statistic value"
                );
                return;
            }
        };

        let aggregation_key = match queue {
            Some(q) if !self.summarize_queues => format!("{}{}", key, q),
            _ => key.to_string(),
        };

        if let Some(&idx) = self.index.get(&aggregation_key) {
            let entry = &mut self.entries[idx];
            if self.summarize_queues {
                debug!(
                    device = self.device,
                    key = %aggregation_key,
                    current = entry.value,
                    added = value,
                    "statistic already exists, summing queues"
                );
                entry.value += value;
            } else {
                warn!(
                    device = self.device,
                    key = %aggregation_key,
                    value,
                    "statistic already exists and queue summarization is disabled, skipping"
                );
            }
            return;
        }

        let mut labels = vec![self.device.to_string(), key.to_string()];
        if !self.summarize_queues {
            labels.push(queue.unwrap_or(DEFAULT_QUEUE).to_string());
        }

        self.index.insert(aggregation_key.clone(), self.entries.len());
        self.entries.push(StatEntry {
            aggregation_key,
            labels,
            value,
        });
    }

    /// Feeds every line of an `ethtool -S` report.
    pub fn add_output(&mut self, output: &str) {
        for line in output.lines() {
            if let Some(stat) = parse_stat_line(line) {
                self.add_statistic(stat.queue, stat.key, stat.value);
            }
        }
    }

    /// Returns the entries in first-seen order.
    pub fn into_entries(self) -> Vec<StatEntry> {
        self.entries
    }
}
