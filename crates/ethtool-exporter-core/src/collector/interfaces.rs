//! Discovery of physical network interfaces.
//!
//! Every entry in `/sys/class/net` is a symlink into the kernel device tree.
//! Virtual devices (loopback, bridges, veth pairs, bonds) point below
//! `devices/virtual`; anything else is backed by real hardware and worth
//! asking ethtool about.

use std::io;

use tracing::debug;

use crate::collector::traits::FileSystem;
use crate::config::ExporterConfig;

/// Path fragment identifying virtual devices in a link target.
const VIRTUAL_MARKER: &str = "virtual";

/// Returns the names of physical interfaces matching the configured pattern,
/// in directory enumeration order.
///
/// Fails only when the discovery directory itself cannot be listed.
pub fn find_physical_interfaces<F: FileSystem>(
    fs: &F,
    config: &ExporterConfig,
) -> io::Result<Vec<String>> {
    let mut interfaces = Vec::new();

    for path in fs.read_dir(&config.discovery_dir)? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !fs.is_symlink(&path) {
            continue;
        }
        let target = match fs.read_link(&path) {
            Ok(target) => target,
            Err(e) => {
                debug!(device = name, error = %e, "failed to read interface link");
                continue;
            }
        };
        if target.to_string_lossy().contains(VIRTUAL_MARKER) {
            continue;
        }
        if !config.interface_regex.is_match(name) {
            continue;
        }
        interfaces.push(name.to_string());
    }

    debug!(count = interfaces.len(), ?interfaces, "found physical interfaces");
    Ok(interfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use crate::collector::traits::RealFs;

    const ROOT: &str = "/sys/class/net";

    fn host() -> MockFs {
        let mut fs = MockFs::new();
        fs.add_physical_nic(ROOT, "eno1");
        fs.add_physical_nic(ROOT, "enp3s0f0");
        fs.add_physical_nic(ROOT, "enp3s0f1");
        fs.add_virtual_nic(ROOT, "lo");
        fs.add_virtual_nic(ROOT, "docker0");
        fs.add_virtual_nic(ROOT, "veth1a2b3c");
        fs.add_file("/sys/class/net/bonding_masters");
        fs
    }

    #[test]
    fn test_only_physical_interfaces() {
        let interfaces = find_physical_interfaces(&host(), &ExporterConfig::default()).unwrap();
        assert_eq!(interfaces, vec!["eno1", "enp3s0f0", "enp3s0f1"]);
    }

    #[test]
    fn test_interface_regex_is_prefix_match() {
        let config = ExporterConfig::default()
            .with_interface_regex("enp3s0")
            .unwrap();
        let interfaces = find_physical_interfaces(&host(), &config).unwrap();
        assert_eq!(interfaces, vec!["enp3s0f0", "enp3s0f1"]);

        let config = ExporterConfig::default().with_interface_regex("s0f1").unwrap();
        assert!(find_physical_interfaces(&host(), &config).unwrap().is_empty());
    }

    #[test]
    fn test_custom_discovery_dir() {
        let mut fs = MockFs::new();
        fs.add_physical_nic("/host/sys/class/net", "eth0");

        let config = ExporterConfig::default().with_discovery_dir("/host/sys/class/net");
        assert_eq!(find_physical_interfaces(&fs, &config).unwrap(), vec!["eth0"]);
    }

    #[test]
    fn test_empty_discovery_dir() {
        let mut fs = MockFs::new();
        fs.add_dir(ROOT);
        let interfaces = find_physical_interfaces(&fs, &ExporterConfig::default()).unwrap();
        assert!(interfaces.is_empty());
    }

    #[test]
    fn test_missing_discovery_dir_fails() {
        let err = find_physical_interfaces(&MockFs::new(), &ExporterConfig::default()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_discovery() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(
            "../../devices/pci0000:00/0000:00:1f.6/net/eno1",
            dir.path().join("eno1"),
        )
        .unwrap();
        std::os::unix::fs::symlink("../../devices/virtual/net/lo", dir.path().join("lo")).unwrap();
        std::fs::write(dir.path().join("bonding_masters"), "").unwrap();

        let config = ExporterConfig::default().with_discovery_dir(dir.path());
        let interfaces = find_physical_interfaces(&RealFs::new(), &config).unwrap();
        assert_eq!(interfaces, vec!["eno1"]);
    }
}
