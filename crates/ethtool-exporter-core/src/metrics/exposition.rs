//! Prometheus text exposition format (version 0.0.4).
//!
//! Samples of one family may carry different label sets, as info families do.

use std::fmt::Write;

use crate::metrics::{Collection, MetricFamily};

/// Content-Type of a scrape response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Formats every family of `collection`.
///
/// Families without samples still get their `# HELP` and `# TYPE` lines.
pub fn format_prometheus(collection: &Collection) -> String {
    let mut output = String::new();
    for family in &collection.families {
        format_family(&mut output, family);
    }
    output
}

fn format_family(output: &mut String, family: &MetricFamily) {
    // Writing into a String cannot fail.
    let _ = writeln!(output, "# HELP {} {}", family.name, escape_help(&family.help));
    let _ = writeln!(output, "# TYPE {} {}", family.name, family.kind.type_name());

    for sample in &family.samples {
        output.push_str(&family.name);
        if !sample.labels.is_empty() {
            output.push('{');
            for (i, (name, value)) in sample.labels.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                let _ = write!(output, "{}=\"{}\"", name, escape_label_value(value));
            }
            output.push('}');
        }
        output.push(' ');
        output.push_str(&format_value(sample.value));
        output.push('\n');
    }
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
pub fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// HELP text escapes only backslash and newline.
fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Renders a sample value: integral values keep one decimal (`5.0`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{:?}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_collection() -> Collection {
        let mut info = MetricFamily::info("node_net_ethtool_info", "Ethtool device information");
        info.add_info(vec![
            ("device".to_string(), "eth0".to_string()),
            ("speed".to_string(), "1000000000".to_string()),
            ("port".to_string(), "Twisted Pair".to_string()),
        ]);

        let mut stats = MetricFamily::gauge("node_net_ethtool", "Ethtool data");
        stats.add_metric(
            &["device", "type"],
            vec!["eth0".to_string(), "rx_packets".to_string()],
            5.0,
        );
        stats.add_metric(
            &["device", "type"],
            vec!["eth0".to_string(), "rx_temperature".to_string()],
            41.5,
        );

        Collection {
            families: vec![info, stats],
        }
    }

    #[test]
    fn test_format_prometheus() {
        let text = format_prometheus(&sample_collection());
        let expected = "\
# HELP node_net_ethtool_info Ethtool device information
# TYPE node_net_ethtool_info gauge
node_net_ethtool_info{device=\"eth0\",speed=\"1000000000\",port=\"Twisted Pair\"} 1.0
# HELP node_net_ethtool Ethtool data
# TYPE node_net_ethtool gauge
node_net_ethtool{device=\"eth0\",type=\"rx_packets\"} 5.0
node_net_ethtool{device=\"eth0\",type=\"rx_temperature\"} 41.5
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_family_keeps_headers() {
        let collection = Collection {
            families: vec![MetricFamily::gauge(
                "node_net_ethtool_xcvr_alarms",
                "Ethtool transceiver sensor alarms",
            )],
        };
        assert_eq!(
            format_prometheus(&collection),
            "# HELP node_net_ethtool_xcvr_alarms Ethtool transceiver sensor alarms\n\
             # TYPE node_net_ethtool_xcvr_alarms gauge\n"
        );
    }

    #[test]
    fn test_info_label_sets_differ_per_sample() {
        let mut family = MetricFamily::info(
            "node_net_ethtool_xcvr_info",
            "Ethtool device transceiver information",
        );
        family.add_info(vec![
            ("device".to_string(), "eth0".to_string()),
            ("vendor_name".to_string(), "FINISAR CORP.".to_string()),
        ]);
        family.add_info(vec![("device".to_string(), "eth1".to_string())]);
        let collection = Collection {
            families: vec![family],
        };

        let text = format_prometheus(&collection);
        assert!(text.contains(
            "node_net_ethtool_xcvr_info{device=\"eth0\",vendor_name=\"FINISAR CORP.\"} 1.0\n"
        ));
        assert!(text.ends_with("node_net_ethtool_xcvr_info{device=\"eth1\"} 1.0\n"));
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(format_prometheus(&Collection::default()), "");
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("plain"), "plain");
        assert_eq!(escape_label_value("a\"b"), "a\\\"b");
        assert_eq!(escape_label_value("a\\b"), "a\\\\b");
        assert_eq!(escape_label_value("a\nb"), "a\\nb");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(5.0), "5.0");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(-2.46), "-2.46");
        assert_eq!(format_value(73560124745.0), "73560124745.0");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn test_sample_without_labels() {
        let mut family = MetricFamily::gauge("up", "Exporter up");
        family.samples.push(crate::metrics::Sample {
            labels: Vec::new(),
            value: 1.0,
        });
        let text = format_prometheus(&Collection {
            families: vec![family],
        });
        assert!(text.ends_with("\nup 1.0\n"));
    }
}
