//! LldpIfMgr - LLDP interface reconciliation manager

use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

use lldp_cfgmgr_common::CfgMgrError;

use crate::commands;
use crate::device::{CommandExecutor, DeviceHandle, FactsCollector};
use crate::differ::{self, Diff};
use crate::facts::normalize_interface_name;
use crate::types::{CommandList, ConfigSnapshot, DesiredConfig, InterfaceState, Mode};

/// Reconciliation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStage {
    Idle,
    Collecting,
    Diffing,
    Generating,
    Applying,
    Done,
    Failed,
}

impl ReconcileStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileStage::Idle => "idle",
            ReconcileStage::Collecting => "collecting",
            ReconcileStage::Diffing => "diffing",
            ReconcileStage::Generating => "generating",
            ReconcileStage::Applying => "applying",
            ReconcileStage::Done => "done",
            ReconcileStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed reconciliation and the stage it failed in
#[derive(Debug, thiserror::Error)]
#[error("Reconciliation failed while {stage}: {source}")]
pub struct ReconcileError {
    pub stage: ReconcileStage,
    #[source]
    pub source: CfgMgrError,
}

impl ReconcileError {
    pub fn new(stage: ReconcileStage, source: CfgMgrError) -> Self {
        Self { stage, source }
    }

    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}

/// Outcome of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// Commands generated for the change, in send order
    pub commands: CommandList,

    /// Device state before the change
    pub before: ConfigSnapshot,

    /// Device state after the change (projected in dry-run)
    pub after: ConfigSnapshot,

    /// True iff `commands` is non-empty
    pub changed: bool,
}

/// LldpIfMgr reconciles a device's LLDP interface configuration
///
/// Reconciliation flow:
/// 1. Collect the current snapshot
/// 2. Diff it against the desired configuration under the mode
/// 3. Generate the ordered command list
/// 4. Send the commands, unless running as a dry-run
/// 5. Report before/after snapshots and the commands
pub struct LldpIfMgr<C, E> {
    collector: C,
    executor: E,
    device: DeviceHandle,

    /// State unspecified attributes reset to
    defaults: InterfaceState,

    stage: ReconcileStage,
}

impl<C, E> LldpIfMgr<C, E>
where
    C: FactsCollector,
    E: CommandExecutor,
{
    /// Creates a new LldpIfMgr instance
    pub fn new(device: DeviceHandle, collector: C, executor: E) -> Self {
        Self {
            collector,
            executor,
            device,
            defaults: InterfaceState::disabled(),
            stage: ReconcileStage::Idle,
        }
    }

    /// Sets the default-state table
    pub fn with_defaults(mut self, defaults: InterfaceState) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn device(&self) -> &DeviceHandle {
        &self.device
    }

    pub fn defaults(&self) -> &InterfaceState {
        &self.defaults
    }

    /// Stage the last reconciliation reached
    pub fn stage(&self) -> ReconcileStage {
        self.stage
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn fail(&mut self, source: CfgMgrError) -> ReconcileError {
        let stage = self.stage;
        self.stage = ReconcileStage::Failed;
        error!(device = %self.device, %stage, "Reconciliation failed: {}", source);
        ReconcileError::new(stage, source)
    }

    /// Computes the diff of the device's current state against `desired`
    ///
    /// Desired names are expanded with the same table collected facts go
    /// through, so `Eth1` and `Ethernet1` address one interface.
    pub fn plan(&self, before: &ConfigSnapshot, desired: &DesiredConfig, mode: Mode) -> Diff {
        let desired = desired.map_names(normalize_interface_name);
        differ::diff_with_defaults(before, &desired, mode, &self.defaults)
    }

    /// Runs one reconciliation
    ///
    /// With `apply = false` nothing is sent and `after` is the projected
    /// snapshot. With `apply = true` the commands are sent in order and
    /// `after` is collected again from the device.
    #[instrument(skip(self, desired), fields(device = %self.device, interfaces = desired.len()))]
    pub async fn reconcile(
        &mut self,
        desired: &DesiredConfig,
        mode: Mode,
        apply: bool,
    ) -> Result<ReconcileResult, ReconcileError> {
        self.stage = ReconcileStage::Collecting;
        let before = match self.collector.collect(&self.device).await {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e)),
        };
        debug!("Collected {} interfaces", before.len());

        self.stage = ReconcileStage::Diffing;
        let diff = self.plan(&before, desired, mode);
        debug!(
            "Diff has {} entries across {} interfaces",
            diff.len(),
            diff.interfaces().len()
        );

        self.stage = ReconcileStage::Generating;
        let commands = commands::generate(&diff);

        if commands.is_empty() {
            info!("No changes needed for mode {}", mode);
            self.stage = ReconcileStage::Done;
            return Ok(ReconcileResult {
                commands,
                after: before.clone(),
                before,
                changed: false,
            });
        }

        let after = if apply {
            self.stage = ReconcileStage::Applying;
            info!(
                "Applying {} commands to {} interfaces",
                commands.len(),
                commands::interfaces_in(&commands).len()
            );
            if let Err(e) = self.executor.execute(&self.device, &commands).await {
                if let CfgMgrError::PartialApply {
                    applied, total, ..
                } = &e
                {
                    warn!("Apply stopped after {} of {} commands", applied, total);
                }
                return Err(self.fail(e));
            }

            self.stage = ReconcileStage::Collecting;
            match self.collector.collect(&self.device).await {
                Ok(snapshot) => snapshot,
                Err(e) => return Err(self.fail(e)),
            }
        } else {
            info!("Dry run: {} commands not sent", commands.len());
            diff.apply(&before, &self.defaults)
        };

        self.stage = ReconcileStage::Done;
        Ok(ReconcileResult {
            commands,
            before,
            after,
            changed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts;
    use crate::types::{InterfaceConfig, Tlv};
    use async_trait::async_trait;
    use lldp_cfgmgr_common::CfgMgrResult;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// Mock device that captures commands instead of sending them
    #[derive(Clone, Default)]
    struct MockDevice {
        snapshot: Arc<Mutex<ConfigSnapshot>>,
        captured: Arc<Mutex<Vec<String>>>,
        collect_calls: Arc<Mutex<usize>>,
        fail_collect: bool,
        reject: Option<&'static str>,
    }

    impl MockDevice {
        fn with_snapshot(snapshot: ConfigSnapshot) -> Self {
            Self {
                snapshot: Arc::new(Mutex::new(snapshot)),
                ..Default::default()
            }
        }

        fn captured(&self) -> Vec<String> {
            self.captured.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FactsCollector for MockDevice {
        async fn collect(&mut self, device: &DeviceHandle) -> CfgMgrResult<ConfigSnapshot> {
            *self.collect_calls.lock().unwrap() += 1;
            if self.fail_collect {
                return Err(CfgMgrError::collection(device.name(), "unreachable"));
            }
            Ok(self.snapshot.lock().unwrap().clone())
        }
    }

    #[async_trait]
    impl CommandExecutor for MockDevice {
        async fn send(&mut self, _device: &DeviceHandle, command: &str) -> CfgMgrResult<()> {
            if self.reject == Some(command) {
                return Err(CfgMgrError::execution(command, "% Invalid input"));
            }
            self.captured.lock().unwrap().push(command.to_string());
            Ok(())
        }
    }

    fn manager(device: &MockDevice) -> LldpIfMgr<MockDevice, MockDevice> {
        LldpIfMgr::new(DeviceHandle::new("switch1"), device.clone(), device.clone())
    }

    fn active() -> InterfaceState {
        InterfaceState::new(true, true, [Tlv::SystemName].into_iter().collect(), true)
    }

    #[tokio::test]
    async fn test_reconcile_no_change() {
        let device = MockDevice::with_snapshot(
            ConfigSnapshot::new().with_interface("Ethernet1", active()),
        );
        let mut mgr = manager(&device);
        let desired = DesiredConfig::new()
            .with_interface("Ethernet1", InterfaceConfig::new().with_enabled(true));

        let result = mgr.reconcile(&desired, Mode::Merged, true).await.unwrap();

        assert!(!result.changed);
        assert!(result.commands.is_empty());
        assert_eq!(result.before, result.after);
        assert!(device.captured().is_empty());
        assert_eq!(mgr.stage(), ReconcileStage::Done);
    }

    #[tokio::test]
    async fn test_reconcile_dry_run_projects_after() {
        let device = MockDevice::with_snapshot(
            ConfigSnapshot::new().with_interface("Ethernet1", active()),
        );
        let mut mgr = manager(&device);
        let desired = DesiredConfig::new()
            .with_interface("Ethernet1", InterfaceConfig::new().with_receive(false));

        let result = mgr.reconcile(&desired, Mode::Merged, false).await.unwrap();

        assert!(result.changed);
        assert_eq!(
            result.commands.as_slice(),
            &["interface Ethernet1", "no lldp receive"]
        );
        assert!(!result.after.get("Ethernet1").unwrap().receive);
        assert!(device.captured().is_empty());
        assert_eq!(*device.collect_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_apply_recollects() {
        let device = MockDevice::with_snapshot(
            ConfigSnapshot::new().with_interface("Ethernet1", active()),
        );
        let mut mgr = manager(&device);

        let result = mgr
            .reconcile(&DesiredConfig::new(), Mode::Deleted, true)
            .await
            .unwrap();

        assert_eq!(device.captured(), result.commands.clone().into_vec());
        assert_eq!(*device.collect_calls.lock().unwrap(), 2);
        // The mock does not interpret commands, so the re-collected state is unchanged
        assert_eq!(result.after, result.before);
    }

    #[tokio::test]
    async fn test_reconcile_collect_failure() {
        let device = MockDevice {
            fail_collect: true,
            ..Default::default()
        };
        let mut mgr = manager(&device);

        let err = mgr
            .reconcile(&DesiredConfig::new(), Mode::Deleted, true)
            .await
            .unwrap_err();

        assert_eq!(err.stage, ReconcileStage::Collecting);
        assert!(err.is_retryable());
        assert_eq!(mgr.stage(), ReconcileStage::Failed);
    }

    #[tokio::test]
    async fn test_reconcile_partial_apply() {
        let device = MockDevice {
            reject: Some("no lldp receive"),
            ..MockDevice::with_snapshot(ConfigSnapshot::new().with_interface("Ethernet1", active()))
        };
        let mut mgr = manager(&device);

        let err = mgr
            .reconcile(&DesiredConfig::new(), Mode::Deleted, true)
            .await
            .unwrap_err();

        assert_eq!(err.stage, ReconcileStage::Applying);
        assert_eq!(device.captured(), vec!["interface Ethernet1", "no lldp"]);
        match err.source {
            CfgMgrError::PartialApply { applied, .. } => assert_eq!(applied, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_reconcile_normalizes_names() {
        let device = MockDevice::with_snapshot(
            ConfigSnapshot::new().with_interface("Ethernet1", active()),
        );
        let mut mgr = manager(&device);
        let desired =
            DesiredConfig::new().with_interface("Eth1", InterfaceConfig::new().with_transmit(false));

        let result = mgr.reconcile(&desired, Mode::Merged, false).await.unwrap();

        assert_eq!(
            result.commands.as_slice(),
            &["interface Ethernet1", "no lldp transmit"]
        );
    }

    /// Collector reporting the device's own CLI output
    struct CliOutput(&'static str);

    #[async_trait]
    impl FactsCollector for CliOutput {
        async fn collect(&mut self, _device: &DeviceHandle) -> CfgMgrResult<ConfigSnapshot> {
            facts::parse_lldp_interfaces(self.0)
        }
    }

    const ETH1_ACTIVE: &str = "\
Interface: Eth1
  LLDP: enabled
  Rx: enabled
  Tx: enabled
  TLVs: system-name
";

    #[tokio::test]
    async fn test_abbreviated_desired_name_matches_collected_facts() {
        let desired = DesiredConfig::new().with_interface(
            "Eth1",
            InterfaceConfig::from(&active()),
        );

        for mode in [Mode::Merged, Mode::Replaced, Mode::Overridden] {
            let device = MockDevice::default();
            let mut mgr = LldpIfMgr::new(
                DeviceHandle::new("switch1"),
                CliOutput(ETH1_ACTIVE),
                device.clone(),
            );

            let result = mgr.reconcile(&desired, mode, true).await.unwrap();

            assert!(!result.changed, "mode {} changed an up-to-date interface", mode);
            assert!(result.commands.is_empty());
            assert!(device.captured().is_empty());
        }

        let device = MockDevice::default();
        let mut mgr = LldpIfMgr::new(
            DeviceHandle::new("switch1"),
            CliOutput(ETH1_ACTIVE),
            device.clone(),
        );
        let result = mgr.reconcile(&desired, Mode::Deleted, false).await.unwrap();

        assert_eq!(
            result.commands.as_slice(),
            &[
                "interface Ethernet1",
                "no lldp",
                "no lldp receive",
                "no lldp tlv-select system-name",
                "no lldp transmit",
            ]
        );
        assert_eq!(result.after.get("Ethernet1"), Some(&InterfaceState::disabled()));
        assert!(result.after.get("Eth1").is_none());
    }

    #[test]
    fn test_result_serializes() {
        let result = ReconcileResult {
            commands: CommandList::new(),
            before: ConfigSnapshot::new(),
            after: ConfigSnapshot::new(),
            changed: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"commands": [], "before": {}, "after": {}, "changed": false})
        );
    }
}
