//! Command builders for LLDP interface operations

use std::collections::BTreeSet;

use crate::differ::{AttrValue, Attribute, Diff, DiffEntry};
use crate::keywords;
use crate::types::{CommandList, Tlv};

/// Build interface context command
pub fn build_interface_cmd(interface: &str) -> String {
    format!("{} {}", keywords::INTERFACE, interface)
}

/// Build LLDP enable/disable command
pub fn build_lldp_cmd(enabled: bool) -> String {
    negate(keywords::LLDP.to_string(), !enabled)
}

/// Build LLDPDU receive command
pub fn build_receive_cmd(enabled: bool) -> String {
    negate(format!("{} {}", keywords::LLDP, keywords::RECEIVE), !enabled)
}

/// Build LLDPDU transmit command
pub fn build_transmit_cmd(enabled: bool) -> String {
    negate(format!("{} {}", keywords::LLDP, keywords::TRANSMIT), !enabled)
}

/// Build TLV selection command
///
/// `selected = false` withdraws the TLV from advertisement.
pub fn build_tlv_select_cmd(tlv: Tlv, selected: bool) -> String {
    negate(
        format!("{} {} {}", keywords::LLDP, keywords::TLV_SELECT, tlv),
        !selected,
    )
}

fn negate(cmd: String, no: bool) -> String {
    if no {
        format!("{} {}", keywords::NO, cmd)
    } else {
        cmd
    }
}

/// Splits one diff entry into its removal and add commands
fn entry_commands(entry: &DiffEntry, removals: &mut Vec<String>, adds: &mut Vec<String>) {
    match (&entry.old, &entry.new) {
        (AttrValue::Flag(_), AttrValue::Flag(new)) => {
            let cmd = match entry.attribute {
                Attribute::Enabled => build_lldp_cmd(*new),
                Attribute::Receive => build_receive_cmd(*new),
                Attribute::Transmit => build_transmit_cmd(*new),
                Attribute::TlvSelect => return,
            };
            if *new {
                adds.push(cmd);
            } else {
                removals.push(cmd);
            }
        }
        (AttrValue::Tlvs(old), AttrValue::Tlvs(new)) => {
            removals.extend(
                old.difference(new)
                    .map(|tlv| build_tlv_select_cmd(*tlv, false)),
            );
            adds.extend(
                new.difference(old)
                    .map(|tlv| build_tlv_select_cmd(*tlv, true)),
            );
        }
        _ => {}
    }
}

/// Translates a diff into the ordered device command list
///
/// Each interface with changes gets one `interface <name>` line followed by
/// its `no ...` commands and then its add commands. Interfaces follow diff
/// order; an empty diff yields an empty list.
pub fn generate(diff: &Diff) -> CommandList {
    let mut commands = Vec::new();

    for (interface, entries) in diff.by_interface() {
        let mut removals = Vec::new();
        let mut adds = Vec::new();
        for entry in entries {
            entry_commands(entry, &mut removals, &mut adds);
        }

        if removals.is_empty() && adds.is_empty() {
            continue;
        }

        commands.push(build_interface_cmd(interface));
        commands.extend(removals);
        commands.extend(adds);
    }

    CommandList::from(commands)
}

/// Interfaces named by `interface <name>` lines of a command list
pub fn interfaces_in(commands: &CommandList) -> BTreeSet<&str> {
    let prefix = format!("{} ", keywords::INTERFACE);
    commands
        .iter()
        .filter_map(|cmd| cmd.strip_prefix(prefix.as_str()))
        .collect()
}
