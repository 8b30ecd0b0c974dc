//! Metric families produced by one collection pass.
//!
//! A [`Collection`] is a plain value: the collector builds it, and the
//! exposition encoder or textfile writer consumes it. Nothing here knows about
//! ethtool.

pub mod exposition;
pub mod textfile;

pub use exposition::{CONTENT_TYPE, format_prometheus};
pub use textfile::write_textfile;

/// How a family is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Numeric gauge.
    Gauge,
    /// Constant 1.0 gauge carrying descriptive labels. Label sets may differ
    /// between samples.
    Info,
}

impl MetricKind {
    /// `# TYPE` keyword in the 0.0.4 text format, which has no info type.
    pub fn type_name(self) -> &'static str {
        match self {
            MetricKind::Gauge | MetricKind::Info => "gauge",
        }
    }
}

/// One series: ordered label pairs and a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    /// Returns the value of label `name`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A named metric with its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    /// Exposed name, e.g. `node_net_ethtool_info`.
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn gauge(name: &str, help: &str) -> Self {
        Self::new(name, help, MetricKind::Gauge)
    }

    pub fn info(name: &str, help: &str) -> Self {
        Self::new(name, help, MetricKind::Info)
    }

    fn new(name: &str, help: &str, kind: MetricKind) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            samples: Vec::new(),
        }
    }

    /// Adds a sample whose label names are given separately from the values.
    ///
    /// `names` and `values` are zipped; both must have the same length.
    pub fn add_metric(&mut self, names: &[&str], values: Vec<String>, value: f64) {
        debug_assert_eq!(names.len(), values.len(), "label arity mismatch");
        let labels = names
            .iter()
            .map(|n| n.to_string())
            .zip(values)
            .collect();
        self.samples.push(Sample { labels, value });
    }

    /// Adds an info sample with value 1.0.
    pub fn add_info(&mut self, labels: Vec<(String, String)>) {
        self.samples.push(Sample { labels, value: 1.0 });
    }
}

/// The ordered families of one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub families: Vec<MetricFamily>,
}

impl Collection {
    /// Returns `true` when no family is present.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Total number of series across all families.
    pub fn series_count(&self) -> usize {
        self.families.iter().map(|f| f.samples.len()).sum()
    }

    /// Looks a family up by exposed name.
    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|f| f.name == name)
    }
}
