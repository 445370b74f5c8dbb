//! In-memory device that interprets the LLDP interface command set
//!
//! Clones share state, so one clone can serve as the collector and another
//! as the executor of the same manager while the test inspects a third.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use lldp_cfgmgr_common::{CfgMgrError, CfgMgrResult, FieldValues, FieldValuesExt};
use lldpifmgrd::{
    keywords, CommandExecutor, ConfigSnapshot, DeviceHandle, FactsCollector, InterfaceState, Tlv,
};

/// Raw facts override applied to collections
#[derive(Debug, Clone)]
struct Corruption {
    interface: String,
    field: String,
    value: String,
}

#[derive(Debug)]
struct SimState {
    interfaces: ConfigSnapshot,
    /// State of interfaces first configured by a command
    defaults: InterfaceState,
    context: Option<String>,
    sent: Vec<String>,
    attempts: usize,
    collections: usize,
    fail_at: Option<usize>,
    unreachable: bool,
    corruption: Option<Corruption>,
}

/// Effect of one configuration command
enum Change {
    Enabled(bool),
    Receive(bool),
    Transmit(bool),
    Tlv(Tlv, bool),
}

impl Change {
    fn parse(command: &str) -> Option<Self> {
        let words: Vec<&str> = command.split_whitespace().collect();
        let (negated, words) = match words.split_first() {
            Some((&first, rest)) if first == keywords::NO => (true, rest),
            _ => (false, words.as_slice()),
        };
        let on = !negated;

        match words {
            [lldp] if *lldp == keywords::LLDP => Some(Change::Enabled(on)),
            [lldp, attr] if *lldp == keywords::LLDP && *attr == keywords::RECEIVE => {
                Some(Change::Receive(on))
            }
            [lldp, attr] if *lldp == keywords::LLDP && *attr == keywords::TRANSMIT => {
                Some(Change::Transmit(on))
            }
            [lldp, attr, tlv] if *lldp == keywords::LLDP && *attr == keywords::TLV_SELECT => {
                tlv.parse::<Tlv>().ok().map(|tlv| Change::Tlv(tlv, on))
            }
            _ => None,
        }
    }

    fn apply(&self, state: &mut InterfaceState) {
        match self {
            Change::Enabled(on) => state.enabled = *on,
            Change::Receive(on) => state.receive = *on,
            Change::Transmit(on) => state.transmit = *on,
            Change::Tlv(tlv, true) => {
                state.tlv_select.insert(*tlv);
            }
            Change::Tlv(tlv, false) => {
                state.tlv_select.remove(tlv);
            }
        }
    }
}

impl SimState {
    fn interpret(&mut self, command: &str) -> CfgMgrResult<()> {
        let interface_prefix = format!("{} ", keywords::INTERFACE);
        if let Some(name) = command.strip_prefix(interface_prefix.as_str()) {
            self.context = Some(name.trim().to_string());
            return Ok(());
        }

        let change = Change::parse(command)
            .ok_or_else(|| CfgMgrError::execution(command, "% Invalid input detected"))?;
        let name = self
            .context
            .clone()
            .ok_or_else(|| CfgMgrError::execution(command, "% No interface selected"))?;

        let mut state = self
            .interfaces
            .get(&name)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone());
        change.apply(&mut state);
        self.interfaces.insert(name, state);
        Ok(())
    }

    fn raw_facts(&self) -> BTreeMap<String, FieldValues> {
        let mut raw: BTreeMap<String, FieldValues> = self
            .interfaces
            .iter()
            .map(|(name, state)| (name.clone(), state.to_field_values()))
            .collect();

        if let Some(c) = &self.corruption {
            if let Some(fvs) = raw.get_mut(&c.interface) {
                fvs.set_field(&c.field, c.value.as_str());
            }
        }
        raw
    }
}

/// Simulated LLDP device
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(ConfigSnapshot::new())
    }
}

impl SimulatedDevice {
    /// Creates a device holding `interfaces`
    pub fn new(interfaces: ConfigSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                interfaces,
                defaults: InterfaceState::disabled(),
                context: None,
                sent: Vec::new(),
                attempts: 0,
                collections: 0,
                fail_at: None,
                unreachable: false,
                corruption: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets the state of interfaces the device did not know about
    pub fn with_defaults(self, defaults: InterfaceState) -> Self {
        self.lock().defaults = defaults;
        self
    }

    /// Rejects the command at `index`, counting every command sent from now
    pub fn fail_at(&self, index: usize) {
        let mut state = self.lock();
        state.attempts = 0;
        state.fail_at = Some(index);
    }

    /// Makes every collection fail
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Reports `value` for `field` of `interface` in collected facts
    pub fn corrupt_field(&self, interface: &str, field: &str, value: &str) {
        self.lock().corruption = Some(Corruption {
            interface: interface.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    /// Current device state
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.lock().interfaces.clone()
    }

    /// Commands accepted so far
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Forgets accepted commands
    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }

    /// Number of collections served
    pub fn collections(&self) -> usize {
        self.lock().collections
    }
}

#[async_trait]
impl FactsCollector for SimulatedDevice {
    async fn collect(&mut self, device: &DeviceHandle) -> CfgMgrResult<ConfigSnapshot> {
        let mut state = self.lock();
        if state.unreachable {
            return Err(CfgMgrError::collection(device.name(), "connection timed out"));
        }
        state.collections += 1;

        let raw = state.raw_facts();
        ConfigSnapshot::from_raw_facts(&raw)
    }
}

#[async_trait]
impl CommandExecutor for SimulatedDevice {
    async fn send(&mut self, device: &DeviceHandle, command: &str) -> CfgMgrResult<()> {
        let mut state = self.lock();
        let attempt = state.attempts;
        state.attempts += 1;

        if state.fail_at == Some(attempt) {
            debug!(device = %device, command = %command, "Injected command failure");
            return Err(CfgMgrError::execution(command, "% Injected failure"));
        }

        state.interpret(command)?;
        state.sent.push(command.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lldpifmgrd::fields;

    fn handle() -> DeviceHandle {
        DeviceHandle::new("sim")
    }

    #[tokio::test]
    async fn test_interprets_commands() {
        let mut device = SimulatedDevice::default();

        for cmd in [
            "interface Ethernet1",
            "lldp",
            "lldp receive",
            "lldp tlv-select system-name",
            "lldp transmit",
            "no lldp receive",
        ] {
            device.send(&handle(), cmd).await.unwrap();
        }

        let state = device.snapshot();
        let eth1 = state.get("Ethernet1").unwrap();
        assert!(eth1.enabled);
        assert!(!eth1.receive);
        assert!(eth1.transmit);
        assert!(eth1.tlv_select.contains(&Tlv::SystemName));
        assert_eq!(device.sent().len(), 6);
    }

    #[tokio::test]
    async fn test_new_interface_starts_from_defaults() {
        let mut device = SimulatedDevice::default().with_defaults(InterfaceState::factory());

        device.send(&handle(), "interface Ethernet5").await.unwrap();
        device.send(&handle(), "no lldp transmit").await.unwrap();

        let mut expected = InterfaceState::factory();
        expected.transmit = false;
        assert_eq!(device.snapshot().get("Ethernet5"), Some(&expected));
    }

    #[tokio::test]
    async fn test_rejects_unknown_command() {
        let mut device = SimulatedDevice::default();
        device.send(&handle(), "interface Ethernet1").await.unwrap();

        let err = device.send(&handle(), "lldp frobnicate").await.unwrap_err();
        assert!(matches!(err, CfgMgrError::Execution { .. }));
        assert_eq!(device.sent(), vec!["interface Ethernet1"]);
    }

    #[tokio::test]
    async fn test_rejects_command_without_context() {
        let mut device = SimulatedDevice::default();
        assert!(device.send(&handle(), "lldp").await.is_err());
    }

    #[tokio::test]
    async fn test_fail_at() {
        let mut device = SimulatedDevice::default();
        device.fail_at(1);

        device.send(&handle(), "interface Ethernet1").await.unwrap();
        assert!(device.send(&handle(), "lldp").await.is_err());
        device.send(&handle(), "lldp").await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable() {
        let mut device = SimulatedDevice::default();
        device.set_unreachable(true);

        let err = device.collect(&handle()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(device.collections(), 0);
    }

    #[test]
    fn test_corrupt_field() {
        let mut device = SimulatedDevice::new(
            ConfigSnapshot::new().with_interface("Ethernet1", InterfaceState::disabled()),
        );
        device.corrupt_field("Ethernet1", fields::RECEIVE, "maybe");

        let err = tokio_test::block_on(device.collect(&handle())).unwrap_err();
        assert!(matches!(err, CfgMgrError::MalformedFacts { .. }));
    }
}
