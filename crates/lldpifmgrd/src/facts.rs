//! Parsers for LLDP facts collected from a device CLI.
//!
//! `show lldp interface detail` output is turned into raw field values and
//! then validated into a [`ConfigSnapshot`]:
//!
//! ```text
//! Interface: Ethernet1
//!   LLDP: enabled
//!   Rx: enabled
//!   Tx: disabled
//!   TLVs: system-name, port-description
//! ```
//!
//! `show lldp neighbors detail` entries are separated by dashed lines and
//! yield the neighbors seen on each local interface.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use lldp_cfgmgr_common::{CfgMgrError, CfgMgrResult, FieldValues, FieldValuesExt};

use crate::fields;
use crate::types::ConfigSnapshot;

/// CLI error messages that mean the device has no LLDP facts to report
const LLDP_UNAVAILABLE: &[&str] = &["Invalid input", "LLDP is not enabled"];

/// Marker the CLI puts in front of error lines
const CLI_ERROR_PREFIX: char = '%';

static INTERFACE_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Interface:\s*(\S+)\s*$").expect("Invalid regex pattern"));

static ATTRIBUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+([A-Za-z][A-Za-z ]*?)\s*:\s*(.*?)\s*$").expect("Invalid regex pattern"));

static INTERFACE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z-]*)\s*([0-9][0-9/.:]*)$").expect("Invalid regex pattern")
});

static NEIGHBOR_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^-{10,}[ \t]*$").expect("Invalid regex pattern"));

static LOCAL_INTF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Local Intf: (.+?)[ \t]*$").expect("Invalid regex pattern"));

static SYSTEM_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)System Name: (.+?)[ \t]*$").expect("Invalid regex pattern"));

static PORT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)Port id: (.+?)[ \t]*$").expect("Invalid regex pattern"));

static NEIGHBOR_IP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]+IP: (.+?)[ \t]*$").expect("Invalid regex pattern"));

/// Abbreviation prefixes and the interface type they expand to.
///
/// Checked in order, so longer prefixes sharing a start come first.
const INTERFACE_TYPES: &[(&str, &str)] = &[
    ("twe", "TwentyFiveGigE"),
    ("tw", "TwoGigabitEthernet"),
    ("te", "TenGigabitEthernet"),
    ("gi", "GigabitEthernet"),
    ("fa", "FastEthernet"),
    ("fo", "FortyGigabitEthernet"),
    ("hu", "HundredGigE"),
    ("et", "Ethernet"),
    ("vl", "Vlan"),
    ("lo", "Loopback"),
    ("po", "Port-channel"),
    ("mg", "Mgmt"),
];

/// Expands an abbreviated interface name to its full form
///
/// `Eth1` becomes `Ethernet1`, `Gi1/0/1` becomes `GigabitEthernet1/0/1`.
/// Names that do not look like `<type><number>` or whose type is unknown
/// are returned unchanged.
pub fn normalize_interface_name(name: &str) -> String {
    let trimmed = name.trim();
    let Some(caps) = INTERFACE_NAME_RE.captures(trimmed) else {
        return trimmed.to_string();
    };

    let if_type = caps[1].to_ascii_lowercase();
    let number = &caps[2];

    match INTERFACE_TYPES
        .iter()
        .find(|(prefix, _)| if_type.starts_with(prefix))
    {
        Some((_, full)) => format!("{}{}", full, number),
        None => trimmed.to_string(),
    }
}

fn attribute_field(label: &str) -> Option<&'static str> {
    match label.to_ascii_lowercase().as_str() {
        "lldp" => Some(fields::ENABLED),
        "rx" => Some(fields::RECEIVE),
        "tx" => Some(fields::TRANSMIT),
        "tlvs" => Some(fields::TLV_SELECT),
        _ => None,
    }
}

/// Only error lines count; the same words inside a neighbor name or an
/// interface description are data.
fn lldp_unavailable(output: &str) -> bool {
    output
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with(CLI_ERROR_PREFIX))
        .any(|line| LLDP_UNAVAILABLE.iter().any(|err| line.contains(err)))
}

/// Splits `show lldp interface detail` output into raw facts per interface
///
/// Unknown attribute lines (state machine details and the like) are skipped.
/// An interface appearing twice is rejected.
pub fn parse_lldp_interface_facts(output: &str) -> CfgMgrResult<BTreeMap<String, FieldValues>> {
    let mut facts: BTreeMap<String, FieldValues> = BTreeMap::new();

    if lldp_unavailable(output) {
        warn!("LLDP facts unavailable on device");
        return Ok(facts);
    }

    let mut current: Option<String> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = INTERFACE_HEADER_RE.captures(line) {
            let name = normalize_interface_name(&caps[1]);
            if facts.contains_key(&name) {
                return Err(CfgMgrError::malformed_facts(
                    name,
                    "interface reported more than once",
                ));
            }
            facts.insert(name.clone(), FieldValues::new());
            current = Some(name);
            continue;
        }

        let Some(name) = current.as_ref() else {
            debug!("Skipping line outside of an interface block: {}", line);
            continue;
        };

        if let Some(caps) = ATTRIBUTE_RE.captures(line) {
            if let Some(field) = attribute_field(&caps[1]) {
                if let Some(fvs) = facts.get_mut(name) {
                    fvs.set_field(field, &caps[2]);
                }
            }
        }
    }

    Ok(facts)
}

/// Parses `show lldp interface detail` output into a validated snapshot
pub fn parse_lldp_interfaces(output: &str) -> CfgMgrResult<ConfigSnapshot> {
    let raw = parse_lldp_interface_facts(output)?;
    ConfigSnapshot::from_raw_facts(&raw)
}

/// A neighbor learned over LLDP on a local interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpNeighbor {
    /// Neighbor system name
    pub host: Option<String>,
    /// Neighbor port identifier
    pub port: Option<String>,
    /// Neighbor management address
    pub ip: Option<String>,
}

fn capture(re: &Regex, entry: &str) -> Option<String> {
    re.captures(entry).map(|caps| caps[1].to_string())
}

/// Parses `show lldp neighbors detail` output into neighbors per local interface
///
/// Parsing stops at the first entry without a `Local Intf:` line.
pub fn parse_lldp_neighbors(output: &str) -> BTreeMap<String, Vec<LldpNeighbor>> {
    let mut neighbors: BTreeMap<String, Vec<LldpNeighbor>> = BTreeMap::new();

    if lldp_unavailable(output) {
        return neighbors;
    }

    for entry in NEIGHBOR_SEPARATOR_RE.split(output) {
        if entry.trim().is_empty() {
            continue;
        }

        let Some(local_intf) = capture(&LOCAL_INTF_RE, entry) else {
            debug!("Neighbor entry without local interface, stopping");
            break;
        };

        neighbors
            .entry(normalize_interface_name(&local_intf))
            .or_default()
            .push(LldpNeighbor {
                host: capture(&SYSTEM_NAME_RE, entry),
                port: capture(&PORT_ID_RE, entry),
                ip: capture(&NEIGHBOR_IP_RE, entry),
            });
    }

    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InterfaceState, Tlv};
    use pretty_assertions::assert_eq;

    const INTERFACE_OUTPUT: &str = "\
Interface: Ethernet1
  LLDP: enabled
  Rx: enabled
  Tx: disabled
  Tx state: IDLE
  TLVs: system-name, port-description

Interface: Eth2
  LLDP: disabled
  Rx: disabled
  Tx: disabled
  TLVs: none
";

    const NEIGHBORS_OUTPUT: &str = "\
------------------------------------------------
Local Intf: Gi1/0/1
Chassis id: 0050.56ff.0001
Port id: Gi0/2
System Name: spine1.example.net

Management Addresses:
    IP: 10.0.0.2
------------------------------------------------
Local Intf: Gi1/0/1
Chassis id: 0050.56ff.0002
Port id: Gi0/3
System Name: spine2.example.net
------------------------------------------------
Local Intf: Eth3
Port id: Ethernet7
System Name: leaf9
";

    #[test]
    fn test_normalize_interface_name() {
        assert_eq!(normalize_interface_name("Eth1"), "Ethernet1");
        assert_eq!(normalize_interface_name("Ethernet1"), "Ethernet1");
        assert_eq!(normalize_interface_name("Gi1/0/1"), "GigabitEthernet1/0/1");
        assert_eq!(normalize_interface_name("te1/1"), "TenGigabitEthernet1/1");
        assert_eq!(normalize_interface_name("Twe1/0/1"), "TwentyFiveGigE1/0/1");
        assert_eq!(normalize_interface_name("Po10"), "Port-channel10");
        assert_eq!(normalize_interface_name("Port-channel10"), "Port-channel10");
        assert_eq!(normalize_interface_name("Vl100"), "Vlan100");
        assert_eq!(normalize_interface_name("Gi 1/0/2"), "GigabitEthernet1/0/2");
    }

    #[test]
    fn test_normalize_leaves_unknown_names() {
        assert_eq!(normalize_interface_name("Tunnel5"), "Tunnel5");
        assert_eq!(normalize_interface_name("bond0"), "bond0");
        assert_eq!(normalize_interface_name("mgmt"), "mgmt");
    }

    #[test]
    fn test_parse_lldp_interfaces() {
        let snapshot = parse_lldp_interfaces(INTERFACE_OUTPUT).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.get("Ethernet1"),
            Some(&InterfaceState::new(
                true,
                true,
                [Tlv::PortDescription, Tlv::SystemName].into_iter().collect(),
                false,
            ))
        );
        assert_eq!(snapshot.get("Ethernet2"), Some(&InterfaceState::disabled()));
    }

    #[test]
    fn test_parse_missing_attribute_is_malformed() {
        let output = "Interface: Ethernet1\n  LLDP: enabled\n  Rx: enabled\n  TLVs: none\n";
        match parse_lldp_interfaces(output) {
            Err(CfgMgrError::MalformedFacts { interface, message }) => {
                assert_eq!(interface, "Ethernet1");
                assert!(message.contains("transmit"));
            }
            other => panic!("Expected MalformedFacts, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_duplicate_interface_is_malformed() {
        let output = "Interface: Eth1\n  LLDP: enabled\nInterface: Ethernet1\n  LLDP: enabled\n";
        assert!(matches!(
            parse_lldp_interface_facts(output),
            Err(CfgMgrError::MalformedFacts { .. })
        ));
    }

    #[test]
    fn test_parse_lldp_not_enabled() {
        let snapshot = parse_lldp_interfaces("% LLDP is not enabled").unwrap();
        assert!(snapshot.is_empty());

        let output = "show lldp interface detail\n      ^\n% Invalid input detected at '^' marker.\n";
        assert!(parse_lldp_interfaces(output).unwrap().is_empty());
    }

    #[test]
    fn test_error_words_outside_error_line_are_data() {
        let output = "\
Interface: Ethernet1
  Description: Invalid input filter uplink
  LLDP: enabled
  Rx: enabled
  Tx: enabled
  TLVs: none
";
        let snapshot = parse_lldp_interfaces(output).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("Ethernet1").unwrap().enabled);

        let neighbors = parse_lldp_neighbors(
            "Local Intf: Eth3\nPort id: Ethernet7\nSystem Name: LLDP is not enabled lab\n",
        );
        assert_eq!(neighbors["Ethernet3"].len(), 1);
    }

    #[test]
    fn test_parse_lldp_neighbors() {
        let neighbors = parse_lldp_neighbors(NEIGHBORS_OUTPUT);

        assert_eq!(neighbors.len(), 2);
        let gi = &neighbors["GigabitEthernet1/0/1"];
        assert_eq!(gi.len(), 2);
        assert_eq!(
            gi[0],
            LldpNeighbor {
                host: Some("spine1.example.net".to_string()),
                port: Some("Gi0/2".to_string()),
                ip: Some("10.0.0.2".to_string()),
            }
        );
        assert_eq!(gi[1].ip, None);
        assert_eq!(neighbors["Ethernet3"][0].host.as_deref(), Some("leaf9"));
    }

    #[test]
    fn test_parse_neighbors_stops_at_entry_without_interface() {
        let output = "\
Local Intf: Eth1
System Name: a
------------------------------------------------
Chassis id: 0050.56ff.0009
------------------------------------------------
Local Intf: Eth2
System Name: b
";
        let neighbors = parse_lldp_neighbors(output);
        assert_eq!(neighbors.len(), 1);
        assert!(neighbors.contains_key("Ethernet1"));
    }
}
