//! Idempotence and determinism across reconciliation modes

use pretty_assertions::assert_eq;

use lldp_cfgmgr_test::{
    assert_same_commands, assert_states,
    fixtures::{scenario_fixtures, state_fixtures},
    SimulatedDevice,
};
use lldpifmgrd::{
    commands, diff, ConfigSnapshot, DesiredConfig, DeviceHandle, InterfaceConfig, LldpIfMgr, Mode,
    Tlv,
};

const MODES: [Mode; 4] = [Mode::Merged, Mode::Replaced, Mode::Overridden, Mode::Deleted];

fn manager(device: &SimulatedDevice) -> LldpIfMgr<SimulatedDevice, SimulatedDevice> {
    LldpIfMgr::new(DeviceHandle::new("sim"), device.clone(), device.clone())
}

fn mixed_snapshot() -> ConfigSnapshot {
    ConfigSnapshot::new()
        .with_interface("Ethernet1", state_fixtures::active())
        .with_interface("Ethernet2", state_fixtures::receive_only())
        .with_interface("Ethernet3", state_fixtures::disabled())
}

fn mixed_desired() -> DesiredConfig {
    DesiredConfig::new()
        .with_interface(
            "Ethernet1",
            InterfaceConfig::new()
                .with_transmit(false)
                .with_tlv_select([Tlv::ManagementAddress]),
        )
        .with_interface("Ethernet3", InterfaceConfig::new().with_enabled(true))
        .with_interface(
            "Ethernet4",
            InterfaceConfig::new()
                .with_enabled(true)
                .with_receive(true),
        )
}

/// Every fixture scenario produces its expected commands and state
#[tokio::test]
async fn test_fixture_scenarios() {
    for scenario in scenario_fixtures::all() {
        let device = scenario.device();
        let result = manager(&device)
            .reconcile(&scenario.desired, scenario.mode, true)
            .await
            .unwrap_or_else(|e| panic!("{}: {}", scenario.name, e));

        assert_same_commands(&scenario.expected_commands, result.commands.as_slice());
        assert_states(&scenario.expected_after, &device.snapshot())
            .unwrap_or_else(|e| panic!("{}: {}", scenario.name, e));
    }
}

/// A second identical run generates nothing, in every mode
#[tokio::test]
async fn test_second_run_is_empty_for_all_modes() {
    for mode in MODES {
        let device = SimulatedDevice::new(mixed_snapshot());
        let desired = mixed_desired();

        let first = manager(&device).reconcile(&desired, mode, true).await.unwrap();
        assert!(first.changed, "mode {} should change the device", mode);

        let second = manager(&device).reconcile(&desired, mode, true).await.unwrap();
        assert!(second.commands.is_empty(), "mode {}: {:?}", mode, second.commands);
        assert!(!second.changed);
        assert_eq!(second.before, first.after);
    }
}

/// The projected dry-run `after` matches what applying really does
#[tokio::test]
async fn test_dry_run_projection_matches_apply() {
    for mode in MODES {
        let projected = manager(&SimulatedDevice::new(mixed_snapshot()))
            .reconcile(&mixed_desired(), mode, false)
            .await
            .unwrap();

        let applied = manager(&SimulatedDevice::new(mixed_snapshot()))
            .reconcile(&mixed_desired(), mode, true)
            .await
            .unwrap();

        assert_eq!(projected.commands, applied.commands, "mode {}", mode);
        assert_eq!(projected.after, applied.after, "mode {}", mode);
    }
}

/// Same inputs give byte-identical command lists
#[test]
fn test_generation_is_deterministic() {
    let before = mixed_snapshot();
    let desired = mixed_desired();

    for mode in MODES {
        let first = commands::generate(&diff(&before, &desired, mode));
        for _ in 0..10 {
            assert_eq!(commands::generate(&diff(&before, &desired, mode)), first);
        }
    }
}

/// Desiring exactly the current state is a no-op outside Deleted
#[test]
fn test_current_state_as_desired_is_empty() {
    let before = mixed_snapshot();
    let desired = DesiredConfig::from(&before);

    for mode in [Mode::Merged, Mode::Replaced, Mode::Overridden] {
        assert!(diff(&before, &desired, mode).is_empty(), "mode {}", mode);
    }
}
