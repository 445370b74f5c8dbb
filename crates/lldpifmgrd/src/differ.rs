//! Structural diff between a device snapshot and a desired configuration.
//!
//! The differ computes, per interface, the effective target state implied by
//! the reconciliation mode and records every attribute whose value changes.
//! Entries are ordered by interface name and then by attribute name, so the
//! same inputs always yield the same diff.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::types::{ConfigSnapshot, DesiredConfig, InterfaceConfig, InterfaceState, Mode, Tlv};

/// LLDP interface attribute, ordered alphabetically by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Enabled,
    Receive,
    TlvSelect,
    Transmit,
}

impl Attribute {
    /// Every attribute in evaluation order
    pub const ALL: [Attribute; 4] = [
        Attribute::Enabled,
        Attribute::Receive,
        Attribute::TlvSelect,
        Attribute::Transmit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Enabled => "enabled",
            Attribute::Receive => "receive",
            Attribute::TlvSelect => "tlv_select",
            Attribute::Transmit => "transmit",
        }
    }

    /// Reads this attribute from a state
    pub fn value_of(&self, state: &InterfaceState) -> AttrValue {
        match self {
            Attribute::Enabled => AttrValue::Flag(state.enabled),
            Attribute::Receive => AttrValue::Flag(state.receive),
            Attribute::TlvSelect => AttrValue::Tlvs(state.tlv_select.clone()),
            Attribute::Transmit => AttrValue::Flag(state.transmit),
        }
    }

    /// Writes a value of this attribute into a state
    ///
    /// Values of the wrong shape are ignored.
    fn assign(&self, state: &mut InterfaceState, value: &AttrValue) {
        match (self, value) {
            (Attribute::Enabled, AttrValue::Flag(v)) => state.enabled = *v,
            (Attribute::Receive, AttrValue::Flag(v)) => state.receive = *v,
            (Attribute::Transmit, AttrValue::Flag(v)) => state.transmit = *v,
            (Attribute::TlvSelect, AttrValue::Tlvs(v)) => state.tlv_select = v.clone(),
            _ => {}
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a single attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Tlvs(BTreeSet<Tlv>),
}

/// One changed attribute of one interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub interface: String,
    pub attribute: Attribute,
    pub old: AttrValue,
    pub new: AttrValue,
}

/// Set of attribute changes, sorted by interface then attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diff {
    entries: Vec<DiffEntry>,
}

impl Diff {
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interfaces with at least one change, sorted
    pub fn interfaces(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.interface.as_str()).collect()
    }

    /// Entries grouped by interface, in interface order
    pub fn by_interface(&self) -> BTreeMap<&str, Vec<&DiffEntry>> {
        let mut groups: BTreeMap<&str, Vec<&DiffEntry>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(entry.interface.as_str()).or_default().push(entry);
        }
        groups
    }

    /// Projects the snapshot that results from applying this diff to `before`
    ///
    /// Interfaces missing from `before` start from `defaults`.
    pub fn apply(&self, before: &ConfigSnapshot, defaults: &InterfaceState) -> ConfigSnapshot {
        let mut after = before.clone();
        for entry in &self.entries {
            let mut state = after
                .get(&entry.interface)
                .cloned()
                .unwrap_or_else(|| defaults.clone());
            entry.attribute.assign(&mut state, &entry.new);
            after.insert(entry.interface.clone(), state);
        }
        after
    }
}

/// Computes the target state of one interface under `mode`
fn target_state(
    current: &InterfaceState,
    config: Option<&InterfaceConfig>,
    mode: Mode,
    defaults: &InterfaceState,
) -> InterfaceState {
    let Some(config) = config else {
        return defaults.clone();
    };

    match mode {
        Mode::Merged => {
            let mut tlv_select = current.tlv_select.clone();
            if let Some(tlvs) = &config.tlv_select {
                tlv_select.extend(tlvs.iter().copied());
            }
            InterfaceState {
                enabled: config.enabled.unwrap_or(current.enabled),
                receive: config.receive.unwrap_or(current.receive),
                tlv_select,
                transmit: config.transmit.unwrap_or(current.transmit),
            }
        }
        Mode::Replaced | Mode::Overridden => InterfaceState {
            enabled: config.enabled.unwrap_or(defaults.enabled),
            receive: config.receive.unwrap_or(defaults.receive),
            tlv_select: config
                .tlv_select
                .clone()
                .unwrap_or_else(|| defaults.tlv_select.clone()),
            transmit: config.transmit.unwrap_or(defaults.transmit),
        },
        // Attribute values in desired are ignored, so an interface that is
        // not at defaults always diffs, even against its own snapshot.
        Mode::Deleted => defaults.clone(),
    }
}

/// Interfaces the mode considers, sorted by name
fn affected_interfaces<'a>(
    before: &'a ConfigSnapshot,
    desired: &'a DesiredConfig,
    mode: Mode,
) -> BTreeSet<&'a str> {
    match mode {
        Mode::Merged | Mode::Replaced => desired.names().collect(),
        Mode::Overridden => desired.names().chain(before.names()).collect(),
        Mode::Deleted if desired.is_empty() => before.names().collect(),
        Mode::Deleted => desired.names().collect(),
    }
}

/// Computes the diff using the canonical default-state table
pub fn diff(before: &ConfigSnapshot, desired: &DesiredConfig, mode: Mode) -> Diff {
    diff_with_defaults(before, desired, mode, &InterfaceState::disabled())
}

/// Computes the diff between `before` and the target implied by `desired`
/// and `mode`, resetting to `defaults` where the mode calls for it
pub fn diff_with_defaults(
    before: &ConfigSnapshot,
    desired: &DesiredConfig,
    mode: Mode,
    defaults: &InterfaceState,
) -> Diff {
    let mut entries = Vec::new();

    for name in affected_interfaces(before, desired, mode) {
        let current = before.get(name).unwrap_or(defaults);
        let target = target_state(current, desired.get(name), mode, defaults);

        if *current == target {
            continue;
        }

        for attribute in Attribute::ALL {
            let old = attribute.value_of(current);
            let new = attribute.value_of(&target);
            if old != new {
                entries.push(DiffEntry {
                    interface: name.to_string(),
                    attribute,
                    old,
                    new,
                });
            }
        }
    }

    Diff { entries }
}
