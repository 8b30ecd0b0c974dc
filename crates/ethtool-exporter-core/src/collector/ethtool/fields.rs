//! Field classifiers for `ethtool <dev>` and `ethtool -m <dev>` output.
//!
//! Each category owns a closed allow-list. Fields outside every list are
//! ignored, so new ethtool releases cannot grow the label set by surprise.

use tracing::warn;

use crate::collector::ethtool::parser::{
    decode_speed, is_skippable, normalize_module_key, normalize_settings_key, parse_key_value,
    split_value_unit,
};

/// Fields kept from `ethtool <dev>`.
pub const BASIC_INFO_FIELDS: [&str; 4] = ["speed", "duplex", "port", "link_detected"];

/// Descriptive and threshold fields kept from `ethtool -m <dev>`.
pub const XCVR_INFO_FIELDS: [&str; 36] = [
    "identifier",
    "extended_identifier",
    "connector",
    "transceiver_type",
    "length_smf_km",
    "length_smf",
    "length_50um",
    "length_62_5um",
    "length_copper",
    "length_om3",
    "laser_wavelength",
    "vendor_name",
    "vendor_oui",
    "vendor_pn",
    "vendor_rev",
    "vendor_sn",
    "laser_bias_current_high_alarm_threshold",
    "laser_bias_current_low_alarm_threshold",
    "laser_bias_current_high_warning_threshold",
    "laser_bias_current_low_warning_threshold",
    "laser_output_power_high_alarm_threshold",
    "laser_output_power_low_alarm_threshold",
    "laser_output_power_high_warning_threshold",
    "laser_output_power_low_warning_threshold",
    "module_temperature_high_alarm_threshold",
    "module_temperature_low_alarm_threshold",
    "module_temperature_high_warning_threshold",
    "module_temperature_low_warning_threshold",
    "module_voltage_high_alarm_threshold",
    "module_voltage_low_alarm_threshold",
    "module_voltage_high_warning_threshold",
    "module_voltage_low_warning_threshold",
    "laser_rx_power_high_alarm_threshold",
    "laser_rx_power_low_alarm_threshold",
    "laser_rx_power_high_warning_threshold",
    "laser_rx_power_low_warning_threshold",
];

/// Sensor fields with exactly one "value unit" reading.
pub const SINGLE_VALUE_SENSORS: [&str; 2] = ["module_voltage", "laser_bias_current"];

/// Sensor fields that may report several units, e.g. "0.5678 mW / -2.46 dBm".
pub const MULTI_VALUE_SENSORS: [&str; 3] = [
    "laser_output_power",
    "receiver_signal_average_optical_power",
    "module_temperature",
];

/// Alarm bases; combined with [`ALARM_SUFFIXES`] they give the 20 alarm flags.
pub const ALARM_BASES: [&str; 5] = [
    "laser_bias_current",
    "laser_output_power",
    "module_temperature",
    "module_voltage",
    "laser_rx_power",
];

pub const ALARM_SUFFIXES: [&str; 4] = [
    "_high_alarm",
    "_low_alarm",
    "_high_warning",
    "_low_warning",
];

/// Alarm text meaning "not raised".
pub const ALARM_INACTIVE: &str = "Off";

/// Separator between the values of a multi-value sensor.
const MULTI_VALUE_SEPARATOR: &str = " / ";

/// What a normalized `ethtool -m` key is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleField {
    Info,
    SingleSensor,
    MultiSensor,
    Alarm,
    Ignored,
}

/// Classifies a normalized `ethtool -m` key. Info wins over the other lists
/// so alarm thresholds are never mistaken for alarm flags.
pub fn classify_module_key(key: &str) -> ModuleField {
    if XCVR_INFO_FIELDS.contains(&key) {
        ModuleField::Info
    } else if SINGLE_VALUE_SENSORS.contains(&key) {
        ModuleField::SingleSensor
    } else if MULTI_VALUE_SENSORS.contains(&key) {
        ModuleField::MultiSensor
    } else if is_alarm_field(key) {
        ModuleField::Alarm
    } else {
        ModuleField::Ignored
    }
}

/// Returns `true` for the 20 `<base><suffix>` alarm keys.
pub fn is_alarm_field(key: &str) -> bool {
    ALARM_BASES.iter().any(|base| {
        key.strip_prefix(base)
            .is_some_and(|rest| ALARM_SUFFIXES.contains(&rest))
    })
}

/// Info labels for one device, `device` first, in first-seen order.
///
/// Setting an existing field replaces its value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRecord {
    labels: Vec<(String, String)>,
}

impl InfoRecord {
    pub fn new(device: &str) -> Self {
        Self {
            labels: vec![("device".to_string(), device.to_string())],
        }
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.labels.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = value,
            None => self.labels.push((field.to_string(), value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<(String, String)> {
        self.labels
    }
}

/// One numeric transceiver sensor value.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub device: String,
    /// `<field>_<unit>`, e.g. `module_temperature_degrees_C`.
    pub type_label: String,
    pub value: f64,
}

/// A raised transceiver alarm or warning flag.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmEvent {
    pub device: String,
    pub type_label: String,
    /// The raw flag text, e.g. `On`.
    pub value_text: String,
}

/// Everything extracted from one `ethtool -m` report.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleReport {
    pub info: InfoRecord,
    pub sensors: Vec<SensorReading>,
    pub alarms: Vec<AlarmEvent>,
}

/// Builds the basic-info record from `ethtool <dev>` output.
pub fn parse_basic_info(device: &str, output: &str) -> InfoRecord {
    let mut record = InfoRecord::new(device);

    for line in output.lines() {
        let line = line.trim();
        if is_skippable(line) || !line.contains(':') {
            continue;
        }
        let Some((key, value)) = parse_key_value(line) else {
            continue;
        };

        let key = normalize_settings_key(key);
        if !BASIC_INFO_FIELDS.contains(&key.as_str()) {
            continue;
        }

        let value = if key == "speed" {
            match decode_speed(value.trim()) {
                Ok(speed) => speed,
                Err(e) => {
                    warn!(device, line, error = %e, "failed to parse speed");
                    continue;
                }
            }
        } else {
            value.trim().to_string()
        };
        record.set(&key, value);
    }

    record
}

/// Splits `ethtool -m` output into info labels, sensor readings and alarms.
pub fn parse_module_info(device: &str, output: &str) -> ModuleReport {
    let mut report = ModuleReport {
        info: InfoRecord::new(device),
        sensors: Vec::new(),
        alarms: Vec::new(),
    };

    for line in output.lines() {
        let line = line.trim();
        if is_skippable(line) || !line.contains(':') {
            continue;
        }
        let Some((key, value)) = parse_key_value(line) else {
            continue;
        };

        let key = normalize_module_key(key);
        let value = value.trim();

        match classify_module_key(&key) {
            ModuleField::Info => report.info.set(&key, value),
            ModuleField::SingleSensor => {
                push_sensor(&mut report.sensors, device, &key, value, line);
            }
            ModuleField::MultiSensor => {
                for part in value.split(MULTI_VALUE_SEPARATOR) {
                    if !push_sensor(&mut report.sensors, device, &key, part, line) {
                        break;
                    }
                }
            }
            ModuleField::Alarm => {
                if value != ALARM_INACTIVE {
                    report.alarms.push(AlarmEvent {
                        device: device.to_string(),
                        type_label: key,
                        value_text: value.to_string(),
                    });
                }
            }
            ModuleField::Ignored => {}
        }
    }

    report
}

/// Parses one "value unit" fragment; returns `false` (after logging) when the
/// fragment is malformed.
fn push_sensor(
    sensors: &mut Vec<SensorReading>,
    device: &str,
    field: &str,
    fragment: &str,
    line: &str,
) -> bool {
    match split_value_unit(fragment) {
        Ok((value, unit)) => {
            sensors.push(SensorReading {
                device: device.to_string(),
                type_label: format!("{}_{}", field, unit),
                value,
            });
            true
        }
        Err(e) => {
            warn!(device, line, error = %e, "failed parsing sensor value");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS_OUTPUT: &str = "\
Settings for eth0:
	Supported ports: [ TP ]
	Supported link modes:   10baseT/Half 10baseT/Full
	                        100baseT/Half 100baseT/Full
	                        1000baseT/Full
	Supports auto-negotiation: Yes
	Speed: 1000Mb/s
	Duplex: Full
	Port: Twisted Pair
	PHYAD: 1
	Transceiver: internal
	Auto-negotiation: on
	Link detected: yes
";

    const MODULE_OUTPUT: &str = "\
	Identifier                                : 0x03 (SFP)
	Extended identifier                       : 0x04 (GBIC/SFP defined by 2-wire interface ID)
	Connector                                 : 0x07 (LC)
	Transceiver type                          : 10G Ethernet: 10G Base-SR
	Length (50um)                             : 80m
	Length (62.5um)                           : 30m
	Laser wavelength                          : 850nm
	Vendor name                               : FINISAR CORP.
	Vendor OUI                                : 00:90:65
	Vendor PN                                 : FTLX8571D3BCL
	Laser bias current                        : 6.784 mA
	Laser output power                        : 0.5678 mW / -2.46 dBm
	Receiver signal average optical power     : 0.4410 mW / -3.56 dBm
	Module temperature                        : 35.54 degrees C / 95.97 degrees F
	Module voltage                            : 3.3260 V
	Alarm/warning flags implemented           : Yes
	Laser bias current high alarm             : Off
	Laser bias current low alarm              : On
	Module temperature high warning           : Off
	Laser rx power low warning                : On
	Laser bias current high alarm threshold   : 13.200 mA
	Laser rx power low warning threshold      : 0.0200 mW / -16.99 dBm
";

    #[test]
    fn test_alarm_field_product() {
        let count = ALARM_BASES
            .iter()
            .flat_map(|b| ALARM_SUFFIXES.iter().map(move |s| format!("{b}{s}")))
            .filter(|k| is_alarm_field(k))
            .count();
        assert_eq!(count, 20);
        assert!(!is_alarm_field("laser_bias_current"));
        assert!(!is_alarm_field("laser_bias_current_high_alarm_threshold"));
    }

    #[test]
    fn test_classify_module_key() {
        assert_eq!(classify_module_key("vendor_name"), ModuleField::Info);
        assert_eq!(
            classify_module_key("module_voltage_low_alarm_threshold"),
            ModuleField::Info
        );
        assert_eq!(classify_module_key("module_voltage"), ModuleField::SingleSensor);
        assert_eq!(classify_module_key("module_temperature"), ModuleField::MultiSensor);
        assert_eq!(classify_module_key("module_voltage_low_alarm"), ModuleField::Alarm);
        assert_eq!(classify_module_key("encoding"), ModuleField::Ignored);
    }

    #[test]
    fn test_info_record_last_value_wins_in_place() {
        let mut record = InfoRecord::new("eth0");
        record.set("speed", "1");
        record.set("duplex", "Full");
        record.set("speed", "2");

        let names: Vec<&str> = record.labels().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["device", "speed", "duplex"]);
        assert_eq!(record.get("speed"), Some("2"));
    }

    #[test]
    fn test_parse_basic_info() {
        let record = parse_basic_info("eth0", SETTINGS_OUTPUT);
        assert_eq!(
            record.labels(),
            &[
                ("device".to_string(), "eth0".to_string()),
                ("speed".to_string(), "1000000000".to_string()),
                ("duplex".to_string(), "Full".to_string()),
                ("port".to_string(), "Twisted Pair".to_string()),
                ("link_detected".to_string(), "yes".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_basic_info_unknown_speed() {
        let output = "Settings for eth1:\n\tSpeed: Unknown!\n\tDuplex: Unknown! (255)\n";
        let record = parse_basic_info("eth1", output);
        assert_eq!(record.get("speed"), Some("0"));
        assert_eq!(record.get("duplex"), Some("Unknown! (255)"));
    }

    #[test]
    fn test_parse_basic_info_bad_speed_is_skipped() {
        let output = "\tSpeed: fastMb/s\n\tDuplex: Full\n";
        let record = parse_basic_info("eth0", output);
        assert_eq!(record.get("speed"), None);
        assert_eq!(record.get("duplex"), Some("Full"));
    }

    #[test]
    fn test_parse_basic_info_empty_output() {
        let record = parse_basic_info("eth0", "");
        assert_eq!(record.labels().len(), 1);
    }

    #[test]
    fn test_parse_module_info_fields() {
        let report = parse_module_info("eth0", MODULE_OUTPUT);
        let info = &report.info;
        assert_eq!(info.get("identifier"), Some("0x03 (SFP)"));
        assert_eq!(info.get("transceiver_type"), Some("10G Ethernet: 10G Base-SR"));
        assert_eq!(info.get("length_62_5um"), Some("30m"));
        assert_eq!(info.get("vendor_oui"), Some("00:90:65"));
        assert_eq!(
            info.get("laser_rx_power_low_warning_threshold"),
            Some("0.0200 mW / -16.99 dBm")
        );
        assert_eq!(info.get("alarm/warning_flags_implemented"), None);
    }

    #[test]
    fn test_parse_module_info_sensors() {
        let report = parse_module_info("eth0", MODULE_OUTPUT);
        let types: Vec<(&str, f64)> = report
            .sensors
            .iter()
            .map(|s| (s.type_label.as_str(), s.value))
            .collect();
        assert_eq!(
            types,
            vec![
                ("laser_bias_current_mA", 6.784),
                ("laser_output_power_mW", 0.5678),
                ("laser_output_power_dBm", -2.46),
                ("receiver_signal_average_optical_power_mW", 0.4410),
                ("receiver_signal_average_optical_power_dBm", -3.56),
                ("module_temperature_degrees_C", 35.54),
                ("module_temperature_degrees_F", 95.97),
                ("module_voltage_V", 3.3260),
            ]
        );
    }

    #[test]
    fn test_two_values_give_two_readings() {
        let report = parse_module_info("eth0", "Laser output power : 3.01 dBm / 2.00 mW\n");
        assert_eq!(report.sensors.len(), 2);
        assert_eq!(report.sensors[0].type_label, "laser_output_power_dBm");
        assert_eq!(report.sensors[1].type_label, "laser_output_power_mW");
    }

    #[test]
    fn test_parse_module_info_alarms() {
        let report = parse_module_info("eth0", MODULE_OUTPUT);
        assert_eq!(
            report.alarms,
            vec![
                AlarmEvent {
                    device: "eth0".to_string(),
                    type_label: "laser_bias_current_low_alarm".to_string(),
                    value_text: "On".to_string(),
                },
                AlarmEvent {
                    device: "eth0".to_string(),
                    type_label: "laser_rx_power_low_warning".to_string(),
                    value_text: "On".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_off_alarm_never_emitted() {
        let report = parse_module_info("eth0", "Module voltage high alarm : Off\n");
        assert!(report.alarms.is_empty());
    }

    #[test]
    fn test_malformed_sensor_is_skipped() {
        let output = "\
Module voltage : 3.3260
Module temperature : 35.54 degrees C / bogus
Laser bias current : 6.784 mA
";
        let report = parse_module_info("eth0", output);
        let types: Vec<&str> = report.sensors.iter().map(|s| s.type_label.as_str()).collect();
        assert_eq!(
            types,
            vec!["module_temperature_degrees_C", "laser_bias_current_mA"]
        );
    }
}
