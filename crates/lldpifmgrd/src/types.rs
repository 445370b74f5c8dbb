//! Type definitions for lldpifmgrd

use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use lldp_cfgmgr_common::{CfgMgrError, CfgMgrResult, FieldValues, FieldValuesExt};

use crate::constants::{FALSE_VALUES, TLV_NONE, TLV_SEPARATOR, TRUE_VALUES};
use crate::fields;

/// LLDP TLV that can be selected for advertisement on an interface
///
/// Variant order is alphabetical and drives command ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tlv {
    #[serde(alias = "management-address")]
    ManagementAddress,
    #[serde(alias = "port-description")]
    PortDescription,
    #[serde(alias = "system-capabilities")]
    SystemCapabilities,
    #[serde(alias = "system-description")]
    SystemDescription,
    #[serde(alias = "system-name")]
    SystemName,
}

impl Tlv {
    /// Every selectable TLV, in order
    pub const ALL: [Tlv; 5] = [
        Tlv::ManagementAddress,
        Tlv::PortDescription,
        Tlv::SystemCapabilities,
        Tlv::SystemDescription,
        Tlv::SystemName,
    ];

    /// Returns the device keyword for this TLV
    pub fn as_str(&self) -> &'static str {
        match self {
            Tlv::ManagementAddress => "management-address",
            Tlv::PortDescription => "port-description",
            Tlv::SystemCapabilities => "system-capabilities",
            Tlv::SystemDescription => "system-description",
            Tlv::SystemName => "system-name",
        }
    }

    /// Returns the full TLV set
    pub fn all() -> BTreeSet<Tlv> {
        Tlv::ALL.into_iter().collect()
    }
}

impl fmt::Display for Tlv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tlv {
    type Err = CfgMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword = s.trim().to_ascii_lowercase().replace('_', "-");
        Tlv::ALL
            .into_iter()
            .find(|tlv| tlv.as_str() == keyword)
            .ok_or_else(|| {
                CfgMgrError::invalid_config(fields::TLV_SELECT, format!("unknown TLV '{}'", s))
            })
    }
}

/// Reconciliation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Desired attributes are merged onto the current state
    Merged,
    /// Desired interfaces are replaced, unspecified attributes reset
    Replaced,
    /// Like replaced, and unmentioned interfaces are reset
    Overridden,
    /// Named (or all) interfaces are reset to defaults
    Deleted,
}

impl Mode {
    /// Returns the mode name
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Merged => "merged",
            Mode::Replaced => "replaced",
            Mode::Overridden => "overridden",
            Mode::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CfgMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merged" => Ok(Mode::Merged),
            "replaced" => Ok(Mode::Replaced),
            "overridden" => Ok(Mode::Overridden),
            "deleted" => Ok(Mode::Deleted),
            other => Err(CfgMgrError::invalid_config(
                "state",
                format!("unknown mode '{}'", other),
            )),
        }
    }
}

/// Per-interface LLDP state as observed on (or projected for) a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceState {
    /// LLDP enabled on the interface
    pub enabled: bool,

    /// LLDPDU reception enabled
    pub receive: bool,

    /// TLVs advertised on the interface
    pub tlv_select: BTreeSet<Tlv>,

    /// LLDPDU transmission enabled
    pub transmit: bool,
}

impl InterfaceState {
    /// Creates a new InterfaceState
    pub fn new(enabled: bool, receive: bool, tlv_select: BTreeSet<Tlv>, transmit: bool) -> Self {
        Self {
            enabled,
            receive,
            tlv_select,
            transmit,
        }
    }

    /// LLDP fully off with no TLVs selected
    pub fn disabled() -> Self {
        Self::new(false, false, BTreeSet::new(), false)
    }

    /// LLDP fully on, advertising every TLV
    pub fn factory() -> Self {
        Self::new(true, true, Tlv::all(), true)
    }

    /// Builds a validated state from raw collected facts
    ///
    /// Every field is required; unknown boolean spellings and unknown TLV
    /// keywords are rejected.
    pub fn from_field_values(interface: &str, raw: &FieldValues) -> CfgMgrResult<Self> {
        let enabled = parse_flag(interface, raw, fields::ENABLED)?;
        let receive = parse_flag(interface, raw, fields::RECEIVE)?;
        let transmit = parse_flag(interface, raw, fields::TRANSMIT)?;

        let tlv_raw = require_field(interface, raw, fields::TLV_SELECT)?;
        let mut tlv_select = BTreeSet::new();
        for keyword in tlv_raw.split(TLV_SEPARATOR) {
            let keyword = keyword.trim();
            if keyword.is_empty() || keyword.eq_ignore_ascii_case(TLV_NONE) {
                continue;
            }
            let tlv = keyword.parse::<Tlv>().map_err(|_| {
                CfgMgrError::malformed_facts(interface, format!("unknown TLV '{}'", keyword))
            })?;
            tlv_select.insert(tlv);
        }

        Ok(Self::new(enabled, receive, tlv_select, transmit))
    }

    /// Renders this state as raw facts
    pub fn to_field_values(&self) -> FieldValues {
        let tlvs = if self.tlv_select.is_empty() {
            TLV_NONE.to_string()
        } else {
            self.tlv_select
                .iter()
                .map(Tlv::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };

        vec![
            (fields::ENABLED.to_string(), self.enabled.to_string()),
            (fields::RECEIVE.to_string(), self.receive.to_string()),
            (fields::TLV_SELECT.to_string(), tlvs),
            (fields::TRANSMIT.to_string(), self.transmit.to_string()),
        ]
    }
}

fn require_field<'a>(interface: &str, raw: &'a FieldValues, field: &str) -> CfgMgrResult<&'a str> {
    raw.get_field(field)
        .ok_or_else(|| CfgMgrError::malformed_facts(interface, format!("missing field '{}'", field)))
}

fn parse_flag(interface: &str, raw: &FieldValues, field: &str) -> CfgMgrResult<bool> {
    let value = require_field(interface, raw, field)?;
    let normalized = value.trim().to_ascii_lowercase();

    if TRUE_VALUES.contains(&normalized.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&normalized.as_str()) {
        Ok(false)
    } else {
        Err(CfgMgrError::malformed_facts(
            interface,
            format!("invalid value '{}' for field '{}'", value, field),
        ))
    }
}

/// Declarative configuration for one interface
///
/// `None` means the attribute was not specified by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlv_select: Option<BTreeSet<Tlv>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmit: Option<bool>,
}

impl InterfaceConfig {
    /// Creates a config with nothing specified
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_receive(mut self, receive: bool) -> Self {
        self.receive = Some(receive);
        self
    }

    pub fn with_transmit(mut self, transmit: bool) -> Self {
        self.transmit = Some(transmit);
        self
    }

    pub fn with_tlv_select<I>(mut self, tlvs: I) -> Self
    where
        I: IntoIterator<Item = Tlv>,
    {
        self.tlv_select = Some(tlvs.into_iter().collect());
        self
    }
}

impl From<&InterfaceState> for InterfaceConfig {
    fn from(state: &InterfaceState) -> Self {
        Self {
            enabled: Some(state.enabled),
            receive: Some(state.receive),
            tlv_select: Some(state.tlv_select.clone()),
            transmit: Some(state.transmit),
        }
    }
}

/// Snapshot of LLDP state for every interface of a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    interfaces: BTreeMap<String, InterfaceState>,
}

impl ConfigSnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interface, builder style
    pub fn with_interface(mut self, name: impl Into<String>, state: InterfaceState) -> Self {
        self.insert(name, state);
        self
    }

    /// Inserts or replaces an interface
    pub fn insert(&mut self, name: impl Into<String>, state: InterfaceState) {
        self.interfaces.insert(name.into(), state);
    }

    /// Gets the state of an interface
    pub fn get(&self, name: &str) -> Option<&InterfaceState> {
        self.interfaces.get(name)
    }

    /// Checks whether an interface is present
    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// Iterates interfaces sorted by name
    pub fn iter(&self) -> btree_map::Iter<'_, String, InterfaceState> {
        self.interfaces.iter()
    }

    /// Interface names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Builds a validated snapshot from raw per-interface facts
    pub fn from_raw_facts<'a, I>(raw: I) -> CfgMgrResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a FieldValues)>,
    {
        let mut snapshot = Self::new();
        for (name, fvs) in raw {
            let state = InterfaceState::from_field_values(name, fvs)?;
            snapshot.insert(name.clone(), state);
        }
        Ok(snapshot)
    }
}

impl FromIterator<(String, InterfaceState)> for ConfigSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, InterfaceState)>>(iter: T) -> Self {
        Self {
            interfaces: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConfigSnapshot {
    type Item = (&'a String, &'a InterfaceState);
    type IntoIter = btree_map::Iter<'a, String, InterfaceState>;

    fn into_iter(self) -> Self::IntoIter {
        self.interfaces.iter()
    }
}

/// Desired LLDP configuration keyed by interface name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesiredConfig {
    interfaces: BTreeMap<String, InterfaceConfig>,
}

impl DesiredConfig {
    /// Creates an empty desired config
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interface, builder style
    pub fn with_interface(mut self, name: impl Into<String>, config: InterfaceConfig) -> Self {
        self.interfaces.insert(name.into(), config);
        self
    }

    /// Names an interface without specifying any attribute
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_interface(name, InterfaceConfig::new())
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceConfig> {
        self.interfaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, InterfaceConfig> {
        self.interfaces.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Returns a copy with every interface name passed through `normalize`
    ///
    /// Entries whose names collapse onto the same key are merged, later
    /// specified attributes winning.
    pub fn map_names<F>(&self, normalize: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let mut interfaces: BTreeMap<String, InterfaceConfig> = BTreeMap::new();
        for (name, config) in &self.interfaces {
            let entry = interfaces.entry(normalize(name)).or_default();
            if config.enabled.is_some() {
                entry.enabled = config.enabled;
            }
            if config.receive.is_some() {
                entry.receive = config.receive;
            }
            if config.tlv_select.is_some() {
                entry.tlv_select = config.tlv_select.clone();
            }
            if config.transmit.is_some() {
                entry.transmit = config.transmit;
            }
        }
        Self { interfaces }
    }
}

impl From<&ConfigSnapshot> for DesiredConfig {
    fn from(snapshot: &ConfigSnapshot) -> Self {
        Self {
            interfaces: snapshot
                .iter()
                .map(|(name, state)| (name.clone(), InterfaceConfig::from(state)))
                .collect(),
        }
    }
}

impl FromIterator<(String, InterfaceConfig)> for DesiredConfig {
    fn from_iter<T: IntoIterator<Item = (String, InterfaceConfig)>>(iter: T) -> Self {
        Self {
            interfaces: iter.into_iter().collect(),
        }
    }
}

/// Ordered sequence of device commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandList(Vec<String>);

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for CommandList {
    fn from(commands: Vec<String>) -> Self {
        Self(commands)
    }
}

impl FromIterator<String> for CommandList {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
