//! Parsers for ethtool text output.
//!
//! These are pure functions over single lines. They never validate numbers;
//! numeric conversion happens in the stat aggregator and field classifiers.

use tracing::{debug, warn};

/// Header printed by `ethtool -S`.
pub const STATS_HEADER: &str = "NIC statistics:";

/// Prefix of the header printed by `ethtool <dev>`.
pub const SETTINGS_HEADER_PREFIX: &str = "Settings for ";

/// Key/value delimiter used by every ethtool report.
pub const DELIMITER: &str = ": ";

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// One record from an `ethtool -S` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine<'a> {
    /// Queue number for `[N]: key: value` lines (Broadcom bnxt and friends).
    pub queue: Option<&'a str>,
    pub key: &'a str,
    pub value: &'a str,
}

/// Returns `true` for blank lines and the fixed report headers.
pub fn is_skippable(line: &str) -> bool {
    line.is_empty() || line == STATS_HEADER || line.starts_with(SETTINGS_HEADER_PREFIX)
}

/// Splits `line` at the first `": "`.
///
/// Lines without the delimiter are continuation lines (e.g. the wrapped
/// "Supported link modes" list) and yield `None`.
pub fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let parsed = line.split_once(DELIMITER);
    if parsed.is_none() {
        debug!(line, "failed to parse key and value from line");
    }
    parsed
}

/// Parses one line of `ethtool -S` output.
///
/// Accepts `key: value` and `[queue]: key: value`. Headers, blank lines and
/// lines without a delimiter yield `None`. Lines with any other shape are
/// logged as warnings and yield `None`.
pub fn parse_stat_line(line: &str) -> Option<StatLine<'_>> {
    let line = line.trim();
    if is_skippable(line) {
        return None;
    }
    parse_key_value(line)?;

    match split_stat_fields(line) {
        Ok(stat) => Some(stat),
        Err(e) => {
            warn!(line, error = %e, "failed parsing statistics line");
            None
        }
    }
}

fn split_stat_fields(line: &str) -> Result<StatLine<'_>, ParseError> {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    match parts.as_slice() {
        [key, value] => Ok(StatLine {
            queue: None,
            key: key.trim(),
            value: value.trim(),
        }),
        [queue, key, value] => {
            let queue = queue
                .strip_prefix('[')
                .and_then(|q| q.strip_suffix(']'))
                .filter(|q| !q.is_empty() && q.bytes().all(|b| b.is_ascii_digit()))
                .ok_or_else(|| ParseError::new(format!("invalid queue prefix '{}'", queue)))?;
            Ok(StatLine {
                queue: Some(queue),
                key: key.trim(),
                value: value.trim(),
            })
        }
        _ => Err(ParseError::new(format!(
            "expected 1 or 2 delimiters, got {}",
            parts.len() - 1
        ))),
    }
}

/// Replaces separators with underscores so the text can be used as a label
/// fragment: trims, then maps `,` `.` and space to `_`.
pub fn remove_separators(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ',' | '.' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// Normalizes a field name from `ethtool <dev>` ("Link detected" → "link_detected").
pub fn normalize_settings_key(key: &str) -> String {
    key.trim().replace(' ', "_").to_lowercase()
}

/// Normalizes a field name from `ethtool -m`
/// ("Length (62.5um)" → "length_62_5um", "Length (SMF,km)" → "length_smf_km").
pub fn normalize_module_key(key: &str) -> String {
    remove_separators(key)
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect::<String>()
        .to_lowercase()
}

/// Speed suffixes and their multipliers to bits per second.
const SPEED_SUFFIXES: [(&str, f64); 3] = [("Kb/s", 1e3), ("Mb/s", 1e6), ("Gb/s", 1e9)];

/// Converts a link speed to bits per second.
///
/// `"1000Mb/s"` → `"1000000000"`, `"Unknown!"` → `"0"`. Text without a known
/// suffix is returned unchanged. A known suffix with a non-numeric prefix is an
/// error.
pub fn decode_speed(speed: &str) -> Result<String, ParseError> {
    for (suffix, multiplier) in SPEED_SUFFIXES {
        if let Some(number) = speed.strip_suffix(suffix) {
            let number: f64 = number
                .trim()
                .parse()
                .map_err(|_| ParseError::new(format!("invalid speed '{}'", speed)))?;
            return Ok(format!("{}", number * multiplier));
        }
    }
    if speed == "Unknown!" {
        return Ok("0".to_string());
    }
    Ok(speed.to_string())
}

/// Splits a sensor value like `"6.784 mA"` into its number and a label-safe
/// unit (`"degrees C"` → `"degrees_C"`).
pub fn split_value_unit(text: &str) -> Result<(f64, String), ParseError> {
    let (value, unit) = text
        .trim()
        .split_once(' ')
        .ok_or_else(|| ParseError::new(format!("missing unit in '{}'", text)))?;
    let value: f64 = value
        .parse()
        .map_err(|_| ParseError::new(format!("invalid number '{}'", value)))?;
    Ok((value, remove_separators(unit)))
}
