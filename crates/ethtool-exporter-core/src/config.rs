//! Resolved exporter configuration.
//!
//! The CLI glue builds one [`ExporterConfig`] at start-up. It is immutable
//! afterwards, so the statistics label arity (which depends on
//! `summarize_queues`) cannot change while the process runs.

use std::path::PathBuf;

use regex::Regex;

/// Default directory listing network devices.
pub const DEFAULT_DISCOVERY_DIR: &str = "/sys/class/net";

/// Error type for configuration failures.
#[derive(Debug)]
pub enum ConfigError {
    /// A user-supplied pattern did not compile.
    InvalidRegex { pattern: String, source: regex::Error },
    /// Both an allow and a deny pattern were supplied.
    ConflictingFilters,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidRegex { pattern, source } => {
                write!(f, "invalid regex '{}': {}", pattern, source)
            }
            ConfigError::ConflictingFilters => {
                write!(f, "whitelist and blacklist regexes are mutually exclusive")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidRegex { source, .. } => Some(source),
            ConfigError::ConflictingFilters => None,
        }
    }
}

/// Compiles `pattern` so that it only matches at the start of the input.
///
/// Matches the prefix semantics users expect from `-I`, `-w` and `-b`:
/// `eth` selects `eth0` but not `veth0`.
pub fn anchored_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|source| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Allow/deny policy applied to raw statistic names.
#[derive(Debug, Clone, Default)]
pub enum FilterPolicy {
    /// Every statistic passes.
    #[default]
    AllowAll,
    /// Only statistics matching the pattern pass.
    Whitelist(Regex),
    /// Statistics matching the pattern are dropped.
    Blacklist(Regex),
}

impl FilterPolicy {
    /// Builds a policy from optional whitelist/blacklist patterns.
    pub fn from_patterns(
        whitelist: Option<&str>,
        blacklist: Option<&str>,
    ) -> Result<Self, ConfigError> {
        match (whitelist, blacklist) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingFilters),
            (Some(w), None) => Ok(FilterPolicy::Whitelist(anchored_regex(w)?)),
            (None, Some(b)) => Ok(FilterPolicy::Blacklist(anchored_regex(b)?)),
            (None, None) => Ok(FilterPolicy::AllowAll),
        }
    }

    /// Returns `true` if the statistic named `stat_name` should be kept.
    pub fn allows(&self, stat_name: &str) -> bool {
        match self {
            FilterPolicy::AllowAll => true,
            FilterPolicy::Whitelist(re) => re.is_match(stat_name),
            FilterPolicy::Blacklist(re) => !re.is_match(stat_name),
        }
    }
}

/// Everything the collector needs to run a pass.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Directory whose symlinks name the candidate devices.
    pub discovery_dir: PathBuf,
    /// Only devices whose name matches are scraped.
    pub interface_regex: Regex,
    /// Filter applied to `ethtool -S` statistic names.
    pub stat_filter: FilterPolicy,
    /// Collect `ethtool -S` statistics.
    pub collect_statistics: bool,
    /// Collect `ethtool <dev>` link settings.
    pub collect_basic_info: bool,
    /// Collect `ethtool -m` transceiver diagnostics.
    pub collect_sfp_diagnostics: bool,
    /// Sum per-queue statistics into one series per name.
    pub summarize_queues: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            discovery_dir: PathBuf::from(DEFAULT_DISCOVERY_DIR),
            interface_regex: Regex::new(".*").expect("static pattern"),
            stat_filter: FilterPolicy::AllowAll,
            collect_statistics: true,
            collect_basic_info: true,
            collect_sfp_diagnostics: true,
            summarize_queues: true,
        }
    }
}

impl ExporterConfig {
    /// Replaces the device-name pattern.
    pub fn with_interface_regex(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.interface_regex = anchored_regex(pattern)?;
        Ok(self)
    }

    /// Replaces the discovery directory.
    pub fn with_discovery_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.discovery_dir = dir.into();
        self
    }

    /// Returns `true` if no metric family would be produced.
    pub fn all_collectors_disabled(&self) -> bool {
        !self.collect_statistics && !self.collect_basic_info && !self.collect_sfp_diagnostics
    }
}
