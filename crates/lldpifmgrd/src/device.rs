//! Device collaborator traits used by the reconciler

use async_trait::async_trait;
use std::fmt;

use lldp_cfgmgr_common::{CfgMgrError, CfgMgrResult};

use crate::types::{CommandList, ConfigSnapshot};

/// Opaque handle naming the target device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceHandle {
    name: String,
}

impl DeviceHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reads the current LLDP interface configuration from a device
#[async_trait]
pub trait FactsCollector: Send {
    async fn collect(&mut self, device: &DeviceHandle) -> CfgMgrResult<ConfigSnapshot>;
}

/// Sends configuration commands to a device
#[async_trait]
pub trait CommandExecutor: Send {
    /// Sends a single command
    async fn send(&mut self, device: &DeviceHandle, command: &str) -> CfgMgrResult<()>;

    /// Sends every command in order, stopping at the first failure
    ///
    /// A failure is reported as [`CfgMgrError::PartialApply`] carrying the
    /// number of commands applied before it. Commands after the failing one
    /// are never sent.
    async fn execute(&mut self, device: &DeviceHandle, commands: &CommandList) -> CfgMgrResult<()> {
        let total = commands.len();
        for (index, command) in commands.iter().enumerate() {
            if let Err(e) = self.send(device, command).await {
                return Err(CfgMgrError::partial_apply(index, total, command.as_str(), e));
            }
        }
        Ok(())
    }
}
