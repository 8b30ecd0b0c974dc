//! Pre-built host scenarios for testing.
//!
//! The outputs below are trimmed captures from real drivers so the parsers see
//! the quirks they meet in production: wrapped link-mode lists, per-queue
//! counters, and `ethtool -m` values with several units.

use crate::collector::runner::EthtoolMode;

use super::filesystem::MockFs;
use super::runner::{MockResponse, MockRunner};

/// Sysfs root used by the scenarios.
pub const SYSFS_NET: &str = "/sys/class/net";

/// Intel X710 port (i40e) with a 10G SR optic.
pub const I40E_DEVICE: &str = "enp3s0f0";

/// Broadcom BCM57416 port (bnxt_en) with per-queue statistics, no module.
pub const BNXT_DEVICE: &str = "eno1";

/// Copper port with plain statistics and no module.
pub const COPPER_DEVICE: &str = "enp5s0";

pub const I40E_SETTINGS: &str = "\
Settings for enp3s0f0:
	Supported ports: [ FIBRE ]
	Supported link modes:   10000baseSR/Full
	Supported pause frame use: Symmetric Receive-only
	Supports auto-negotiation: No
	Supported FEC modes: Not reported
	Advertised link modes:  Not applicable
	Advertised pause frame use: No
	Advertised auto-negotiation: No
	Advertised FEC modes: Not reported
	Speed: 10000Mb/s
	Duplex: Full
	Auto-negotiation: off
	Port: FIBRE
	PHYAD: 0
	Transceiver: internal
	Supports Wake-on: g
	Wake-on: d
	Current message level: 0x00000007 (7)
			       drv probe link
	Link detected: yes
";

pub const I40E_STATISTICS: &str = "\
NIC statistics:
     rx_packets: 73560124745
     tx_packets: 61239834511
     rx_bytes: 82391245871231
     tx_bytes: 49123445782211
     rx_errors: 0
     tx_errors: 0
     rx_dropped: 1023
     tx_dropped: 0
     collisions: 0
     rx_length_errors: 0
     rx_crc_errors: 0
     tx-0.tx_packets: 3123456
     tx-0.tx_bytes: 412345678
     rx-0.rx_packets: 4123456
     rx-0.rx_bytes: 512345678
     port.rx_dropped: 0
     port.tx_timeout: 0
";

pub const I40E_MODULE: &str = "\
	Identifier                                : 0x03 (SFP)
	Extended identifier                       : 0x04 (GBIC/SFP defined by 2-wire interface ID)
	Connector                                 : 0x07 (LC)
	Transceiver codes                         : 0x10 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00
	Transceiver type                          : 10G Ethernet: 10G Base-SR
	Encoding                                  : 0x06 (64B/66B)
	BR, Nominal                               : 10300MBd
	Rate identifier                           : 0x00 (unspecified)
	Length (SMF,km)                           : 0km
	Length (SMF)                              : 0m
	Length (50um)                             : 80m
	Length (62.5um)                           : 30m
	Length (Copper)                           : 0m
	Length (OM3)                              : 300m
	Laser wavelength                          : 850nm
	Vendor name                               : FINISAR CORP.
	Vendor OUI                                : 00:90:65
	Vendor PN                                 : FTLX8571D3BCL
	Vendor rev                                : A
	Option values                             : 0x00 0x1a
	Option                                    : RX_LOS implemented
	Option                                    : TX_FAULT implemented
	BR margin, max                            : 0%
	BR margin, min                            : 0%
	Vendor SN                                 : AQG0K8D
	Date code                                 : 150521
	Optical diagnostics support               : Yes
	Laser bias current                        : 6.784 mA
	Laser output power                        : 0.5678 mW / -2.46 dBm
	Receiver signal average optical power     : 0.4410 mW / -3.56 dBm
	Module temperature                        : 35.54 degrees C / 95.97 degrees F
	Module voltage                            : 3.3260 V
	Alarm/warning flags implemented           : Yes
	Laser bias current high alarm             : Off
	Laser bias current low alarm              : Off
	Laser bias current high warning           : Off
	Laser bias current low warning            : Off
	Laser output power high alarm             : Off
	Laser output power low alarm              : Off
	Laser output power high warning           : Off
	Laser output power low warning            : Off
	Module temperature high alarm             : Off
	Module temperature low alarm              : Off
	Module temperature high warning           : Off
	Module temperature low warning            : Off
	Module voltage high alarm                 : Off
	Module voltage low alarm                  : Off
	Module voltage high warning               : Off
	Module voltage low warning                : Off
	Laser rx power high alarm                 : Off
	Laser rx power low alarm                  : Off
	Laser rx power high warning               : Off
	Laser rx power low warning                : On
	Laser bias current high alarm threshold   : 13.200 mA
	Laser bias current low alarm threshold    : 4.000 mA
	Laser bias current high warning threshold : 12.600 mA
	Laser bias current low warning threshold  : 5.000 mA
	Laser output power high alarm threshold   : 1.2589 mW / 1.00 dBm
	Laser output power low alarm threshold    : 0.1862 mW / -7.30 dBm
	Laser output power high warning threshold : 0.7943 mW / -1.00 dBm
	Laser output power low warning threshold  : 0.2512 mW / -6.00 dBm
	Module temperature high alarm threshold   : 78.00 degrees C / 172.40 degrees F
	Module temperature low alarm threshold    : -13.00 degrees C / 8.60 degrees F
	Module temperature high warning threshold : 73.00 degrees C / 163.40 degrees F
	Module temperature low warning threshold  : -8.00 degrees C / 17.60 degrees F
	Module voltage high alarm threshold       : 3.7000 V
	Module voltage low alarm threshold        : 2.9000 V
	Module voltage high warning threshold     : 3.6000 V
	Module voltage low warning threshold      : 3.0000 V
	Laser rx power high alarm threshold       : 1.0000 mW / 0.00 dBm
	Laser rx power low alarm threshold        : 0.0100 mW / -20.00 dBm
	Laser rx power high warning threshold     : 0.7943 mW / -1.00 dBm
	Laser rx power low warning threshold      : 0.0200 mW / -16.99 dBm
";

pub const BNXT_SETTINGS: &str = "\
Settings for eno1:
	Supported ports: [ TP ]
	Supported link modes:   100baseT/Full
	                        1000baseT/Full
	                        10000baseT/Full
	Supported pause frame use: Symmetric Receive-only
	Supports auto-negotiation: Yes
	Advertised link modes:  100baseT/Full
	                        1000baseT/Full
	                        10000baseT/Full
	Advertised auto-negotiation: Yes
	Speed: 10000Mb/s
	Duplex: Full
	Port: Twisted Pair
	PHYAD: 12
	Transceiver: internal
	Auto-negotiation: on
	MDI-X: Unknown
	Supports Wake-on: d
	Wake-on: d
	Current message level: 0x00002081 (8321)
			       drv tx_done hw
	Link detected: yes
";

pub const BNXT_STATISTICS: &str = "\
NIC statistics:
     [0]: rx_ucast_packets: 1000
     [0]: rx_mcast_packets: 10
     [0]: rx_discards: 5
     [0]: tx_ucast_packets: 900
     [1]: rx_ucast_packets: 2500
     [1]: rx_mcast_packets: 20
     [1]: rx_discards: 10
     [1]: tx_ucast_packets: 1100
     rx_total_discard_pkts: 15
     tx_total_discard_pkts: 0
     link_down_events: 2
";

pub const COPPER_SETTINGS: &str = "\
Settings for enp5s0:
	Supported ports: [ TP MII ]
	Supported link modes:   10baseT/Half 10baseT/Full
	                        100baseT/Half 100baseT/Full
	                        1000baseT/Full
	Supported pause frame use: Symmetric Receive-only
	Supports auto-negotiation: Yes
	Advertised link modes:  10baseT/Half 10baseT/Full
	                        100baseT/Half 100baseT/Full
	                        1000baseT/Full
	Advertised auto-negotiation: Yes
	Speed: Unknown!
	Duplex: Unknown! (255)
	Port: Twisted Pair
	PHYAD: 0
	Transceiver: external
	Auto-negotiation: on
	Link detected: no
";

pub const COPPER_STATISTICS: &str = "\
NIC statistics:
     tx_packets: 0
     rx_packets: 0
     tx_errors: 0
     rx_errors: 0
     rx_missed: 0
     align_errors: 0
     tx_single_collisions: 0
     tx_multi_collisions: 0
     unicast: 0
     broadcast: 0
     multicast: 0
     tx_aborted: 0
     tx_underrun: 0
";

impl MockFs {
    /// Creates a host with the three scenario NICs plus the usual virtual
    /// devices and the bonding control file.
    pub fn typical_host() -> Self {
        let mut fs = Self::new();
        fs.add_physical_nic(SYSFS_NET, BNXT_DEVICE);
        fs.add_physical_nic(SYSFS_NET, I40E_DEVICE);
        fs.add_physical_nic(SYSFS_NET, COPPER_DEVICE);
        fs.add_virtual_nic(SYSFS_NET, "lo");
        fs.add_virtual_nic(SYSFS_NET, "docker0");
        fs.add_virtual_nic(SYSFS_NET, "veth9f3c2a1");
        fs.add_file(format!("{SYSFS_NET}/bonding_masters"));
        fs
    }

    /// Creates a host with a single physical NIC.
    pub fn single_nic(name: &str) -> Self {
        let mut fs = Self::new();
        fs.add_physical_nic(SYSFS_NET, name);
        fs.add_virtual_nic(SYSFS_NET, "lo");
        fs
    }
}

impl MockRunner {
    /// Canned outputs for every device of [`MockFs::typical_host`].
    ///
    /// Only the i40e port has a module; `-m` on the others fails like it does
    /// without an optic plugged in.
    pub fn typical_host() -> Self {
        let mut runner = Self::new();

        runner.add_output(I40E_DEVICE, EthtoolMode::Settings, I40E_SETTINGS);
        runner.add_output(I40E_DEVICE, EthtoolMode::Statistics, I40E_STATISTICS);
        runner.add_output(I40E_DEVICE, EthtoolMode::ModuleInfo, I40E_MODULE);

        runner.add_output(BNXT_DEVICE, EthtoolMode::Settings, BNXT_SETTINGS);
        runner.add_output(BNXT_DEVICE, EthtoolMode::Statistics, BNXT_STATISTICS);
        runner.add_response(BNXT_DEVICE, EthtoolMode::ModuleInfo, MockResponse::Failure);

        runner.add_output(COPPER_DEVICE, EthtoolMode::Settings, COPPER_SETTINGS);
        runner.add_output(COPPER_DEVICE, EthtoolMode::Statistics, COPPER_STATISTICS);
        runner.add_response(COPPER_DEVICE, EthtoolMode::ModuleInfo, MockResponse::Failure);

        runner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::runner::CommandRunner;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_typical_host_layout() {
        let fs = MockFs::typical_host();
        let entries = fs.read_dir(Path::new(SYSFS_NET)).unwrap();
        assert_eq!(entries.len(), 7);
        assert!(fs.is_symlink(&Path::new(SYSFS_NET).join(I40E_DEVICE)));
    }

    #[test]
    fn test_typical_host_runner() {
        let runner = MockRunner::typical_host();
        assert!(
            runner
                .run(I40E_DEVICE, EthtoolMode::ModuleInfo)
                .unwrap()
                .is_some()
        );
        assert!(
            runner
                .run(BNXT_DEVICE, EthtoolMode::ModuleInfo)
                .unwrap()
                .is_none()
        );
    }
}
