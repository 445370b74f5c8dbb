//! Device adapter driving a local routing CLI through the shell

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use lldp_cfgmgr_common::shell::{self, shellquote, VTYSH_CMD};
use lldp_cfgmgr_common::{CfgMgrError, CfgMgrResult};

use crate::device::{CommandExecutor, DeviceHandle, FactsCollector};
use crate::facts::{self, LldpNeighbor};
use crate::keywords;
use crate::types::ConfigSnapshot;
use crate::{CONFIGURE_TERMINAL_CMD, SHOW_LLDP_INTERFACE_CMD, SHOW_LLDP_NEIGHBORS_CMD};

/// Prefix the CLI puts on rejected input
const CLI_ERROR_PREFIX: char = '%';

/// ShellDevice collects facts and sends commands via `<cli> -c ...`
///
/// The CLI is invoked once per command, so the interface context opened by
/// an `interface <name>` line is replayed on every following command.
#[derive(Debug, Clone)]
pub struct ShellDevice {
    cli_path: String,
    show_command: String,
    neighbors_command: String,
    interface_context: Option<String>,
}

impl Default for ShellDevice {
    fn default() -> Self {
        Self::new(VTYSH_CMD)
    }
}

impl ShellDevice {
    /// Creates a new ShellDevice driving `cli_path`
    pub fn new(cli_path: impl Into<String>) -> Self {
        Self {
            cli_path: cli_path.into(),
            show_command: SHOW_LLDP_INTERFACE_CMD.to_string(),
            neighbors_command: SHOW_LLDP_NEIGHBORS_CMD.to_string(),
            interface_context: None,
        }
    }

    pub fn with_show_command(mut self, command: impl Into<String>) -> Self {
        self.show_command = command.into();
        self
    }

    pub fn with_neighbors_command(mut self, command: impl Into<String>) -> Self {
        self.neighbors_command = command.into();
        self
    }

    pub fn cli_path(&self) -> &str {
        &self.cli_path
    }

    /// Interface opened by the last `interface <name>` command
    pub fn interface_context(&self) -> Option<&str> {
        self.interface_context.as_deref()
    }

    /// Builds a show invocation
    pub fn build_show_cmd(&self, show: &str) -> String {
        format!("{} -c {}", self.cli_path, shellquote(show))
    }

    /// Builds a configuration invocation for `command` in the current context
    pub fn build_config_cmd(&self, command: &str) -> String {
        let mut cmd = format!("{} -c {}", self.cli_path, shellquote(CONFIGURE_TERMINAL_CMD));
        if let Some(interface) = &self.interface_context {
            cmd.push_str(&format!(
                " -c {}",
                shellquote(&format!("{} {}", keywords::INTERFACE, interface))
            ));
        }
        cmd.push_str(&format!(" -c {}", shellquote(command)));
        cmd
    }

    async fn run_show(&self, device: &DeviceHandle, show: &str) -> CfgMgrResult<String> {
        let cmd = self.build_show_cmd(show);
        shell::exec_or_throw(&cmd)
            .await
            .map_err(|e| CfgMgrError::collection(device.name(), e.to_string()))
    }

    /// Collects LLDP neighbors per local interface
    #[instrument(skip(self, device), fields(device = %device))]
    pub async fn collect_neighbors(
        &self,
        device: &DeviceHandle,
    ) -> CfgMgrResult<BTreeMap<String, Vec<LldpNeighbor>>> {
        let output = self.run_show(device, &self.neighbors_command).await?;
        Ok(facts::parse_lldp_neighbors(&output))
    }
}

#[async_trait]
impl FactsCollector for ShellDevice {
    #[instrument(skip(self, device), fields(device = %device))]
    async fn collect(&mut self, device: &DeviceHandle) -> CfgMgrResult<ConfigSnapshot> {
        let output = self.run_show(device, &self.show_command).await?;
        let snapshot = facts::parse_lldp_interfaces(&output)?;
        debug!("Parsed {} interfaces", snapshot.len());
        Ok(snapshot)
    }
}

#[async_trait]
impl CommandExecutor for ShellDevice {
    async fn send(&mut self, device: &DeviceHandle, command: &str) -> CfgMgrResult<()> {
        let interface_prefix = format!("{} ", keywords::INTERFACE);
        let cmd = match command.strip_prefix(interface_prefix.as_str()) {
            Some(interface) => {
                self.interface_context = None;
                let cmd = self.build_config_cmd(command);
                self.interface_context = Some(interface.trim().to_string());
                cmd
            }
            None => self.build_config_cmd(command),
        };

        debug!(device = %device, command = %command, "Sending command");
        let output = shell::exec_or_throw(&cmd)
            .await
            .map_err(|e| CfgMgrError::execution(command, e.to_string()))?;

        if let Some(line) = output
            .lines()
            .find(|line| line.trim_start().starts_with(CLI_ERROR_PREFIX))
        {
            return Err(CfgMgrError::execution(command, line.trim()));
        }
        Ok(())
    }
}
