//! Test fixtures for LLDP interface reconciliation
//!
//! Every fixture is a plain value built on demand; tests receive their own
//! copy and never share mutable state.

use std::collections::BTreeSet;

use lldpifmgrd::{ConfigSnapshot, DesiredConfig, InterfaceConfig, InterfaceState, Mode, Tlv};

use crate::sim_device::SimulatedDevice;

/// One reconciliation to run and what it must produce
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Device state before the run
    pub before: ConfigSnapshot,
    /// Desired configuration handed to the manager
    pub desired: DesiredConfig,
    /// Reconciliation mode
    pub mode: Mode,
    /// Commands the run must generate, in any order
    pub expected_commands: Vec<String>,
    /// Interfaces whose state after the run is checked
    pub expected_after: ConfigSnapshot,
}

impl Scenario {
    /// Create a new scenario
    pub fn new(name: impl Into<String>, mode: Mode) -> Self {
        Self {
            name: name.into(),
            before: ConfigSnapshot::new(),
            desired: DesiredConfig::new(),
            mode,
            expected_commands: Vec::new(),
            expected_after: ConfigSnapshot::new(),
        }
    }

    pub fn with_before(mut self, name: impl Into<String>, state: InterfaceState) -> Self {
        self.before.insert(name, state);
        self
    }

    pub fn with_desired(mut self, name: impl Into<String>, config: InterfaceConfig) -> Self {
        self.desired = self.desired.with_interface(name, config);
        self
    }

    /// Name an interface without attributes (Deleted targets)
    pub fn with_target(mut self, name: impl Into<String>) -> Self {
        self.desired = self.desired.with_name(name);
        self
    }

    pub fn expect_command(mut self, command: impl Into<String>) -> Self {
        self.expected_commands.push(command.into());
        self
    }

    pub fn expect_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_commands
            .extend(commands.into_iter().map(Into::into));
        self
    }

    pub fn expect_after(mut self, name: impl Into<String>, state: InterfaceState) -> Self {
        self.expected_after.insert(name, state);
        self
    }

    /// Simulated device loaded with the `before` state
    pub fn device(&self) -> SimulatedDevice {
        SimulatedDevice::new(self.before.clone())
    }
}

fn tlvs<I: IntoIterator<Item = Tlv>>(items: I) -> BTreeSet<Tlv> {
    items.into_iter().collect()
}

/// Common interface states
pub mod state_fixtures {
    use super::*;

    /// LLDP fully off
    pub fn disabled() -> InterfaceState {
        InterfaceState::disabled()
    }

    /// LLDP on in both directions advertising the system name
    pub fn active() -> InterfaceState {
        InterfaceState::new(true, true, tlvs([Tlv::SystemName]), true)
    }

    /// LLDP on, receive only, advertising port and system descriptions
    pub fn receive_only() -> InterfaceState {
        InterfaceState::new(
            true,
            true,
            tlvs([Tlv::PortDescription, Tlv::SystemDescription]),
            false,
        )
    }
}

/// Common reconciliation scenarios
pub mod scenario_fixtures {
    use super::*;

    /// Deleting an interface already at defaults changes nothing
    pub fn deleted_already_default() -> Scenario {
        Scenario::new("deleted, already default", Mode::Deleted)
            .with_before("Ethernet1", state_fixtures::disabled())
            .expect_after("Ethernet1", state_fixtures::disabled())
    }

    /// Deleting an active interface disables LLDP on it
    pub fn deleted_active() -> Scenario {
        Scenario::new("deleted, active interface", Mode::Deleted)
            .with_before("Ethernet1", state_fixtures::active())
            .with_target("Ethernet1")
            .expect_commands([
                "interface Ethernet1",
                "no lldp",
                "no lldp receive",
                "no lldp tlv-select system-name",
                "no lldp transmit",
            ])
            .expect_after("Ethernet1", state_fixtures::disabled())
    }

    /// Merging adds TLVs and flips only the named flags
    pub fn merged_add_tlv() -> Scenario {
        let mut after = state_fixtures::receive_only();
        after.transmit = true;
        after.tlv_select.insert(Tlv::SystemName);

        Scenario::new("merged, add TLV", Mode::Merged)
            .with_before("Ethernet1", state_fixtures::receive_only())
            .with_desired(
                "Ethernet1",
                InterfaceConfig::new()
                    .with_transmit(true)
                    .with_tlv_select([Tlv::SystemName]),
            )
            .expect_commands([
                "interface Ethernet1",
                "lldp tlv-select system-name",
                "lldp transmit",
            ])
            .expect_after("Ethernet1", after)
    }

    /// Replacing an interface resets what the desired config leaves out
    pub fn replaced_resets() -> Scenario {
        Scenario::new("replaced, reset unspecified", Mode::Replaced)
            .with_before("Ethernet1", state_fixtures::active())
            .with_before("Ethernet2", state_fixtures::active())
            .with_desired(
                "Ethernet1",
                InterfaceConfig::new()
                    .with_enabled(true)
                    .with_receive(true),
            )
            .expect_commands([
                "interface Ethernet1",
                "no lldp tlv-select system-name",
                "no lldp transmit",
            ])
            .expect_after(
                "Ethernet1",
                InterfaceState::new(true, true, BTreeSet::new(), false),
            )
            .expect_after("Ethernet2", state_fixtures::active())
    }

    /// Overriding resets every interface the desired config omits
    pub fn overridden_resets_others() -> Scenario {
        Scenario::new("overridden, reset others", Mode::Overridden)
            .with_before("Ethernet1", state_fixtures::active())
            .with_before("Ethernet2", state_fixtures::receive_only())
            .with_desired("Ethernet1", (&state_fixtures::active()).into())
            .expect_commands([
                "interface Ethernet2",
                "no lldp",
                "no lldp receive",
                "no lldp tlv-select port-description",
                "no lldp tlv-select system-description",
            ])
            .expect_after("Ethernet1", state_fixtures::active())
            .expect_after("Ethernet2", state_fixtures::disabled())
    }

    /// Every scenario above
    pub fn all() -> Vec<Scenario> {
        vec![
            deleted_already_default(),
            deleted_active(),
            merged_add_tlv(),
            replaced_resets(),
            overridden_resets_others(),
        ]
    }
}
