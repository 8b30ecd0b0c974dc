//! Parsing of ethtool reports.
//!
//! - `parser`: line splitting, key normalization, speed and unit decoding
//! - `stats`: `ethtool -S` aggregation with queue handling and filtering
//! - `fields`: allow-listed fields of `ethtool <dev>` and `ethtool -m <dev>`

pub mod fields;
pub mod parser;
pub mod stats;

pub use fields::{
    AlarmEvent, InfoRecord, ModuleReport, SensorReading, parse_basic_info, parse_module_info,
};
pub use parser::{ParseError, StatLine, parse_stat_line};
pub use stats::{StatAggregator, StatEntry};
