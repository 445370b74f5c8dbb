//! Configuration file support for lldpifmgrd
//!
//! Loads a YAML file describing the device, the reconciliation mode and the
//! desired interface configuration:
//!
//! ```yaml
//! device: switch1
//! state: merged
//! apply: true
//! config:
//!   Ethernet1:
//!     enabled: true
//!     tlv_select: [system_name, port_description]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use lldp_cfgmgr_common::shell::VTYSH_CMD;
use lldp_cfgmgr_common::{CfgMgrError, CfgMgrResult};

use crate::shell_device::ShellDevice;
use crate::types::{DesiredConfig, InterfaceState, Mode};
use crate::{SHOW_LLDP_INTERFACE_CMD, SHOW_LLDP_NEIGHBORS_CMD};

/// Named default-state table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultsProfile {
    /// LLDP off, no TLVs
    #[default]
    Disabled,
    /// LLDP on, every TLV
    Factory,
}

impl DefaultsProfile {
    pub fn state(&self) -> InterfaceState {
        match self {
            DefaultsProfile::Disabled => InterfaceState::disabled(),
            DefaultsProfile::Factory => InterfaceState::factory(),
        }
    }
}

/// lldpifmgrd configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LldpIfMgrConfig {
    /// Device name used in logs and errors
    #[serde(default = "default_device")]
    pub device: String,

    /// CLI binary used to reach the device
    #[serde(default = "default_cli_path")]
    pub cli_path: String,

    #[serde(default = "default_show_command")]
    pub show_command: String,

    #[serde(default = "default_neighbors_command")]
    pub neighbors_command: String,

    /// Reconciliation mode
    #[serde(default = "default_state")]
    pub state: Mode,

    /// Send commands (false = dry run)
    #[serde(default = "default_apply")]
    pub apply: bool,

    #[serde(default)]
    pub defaults: DefaultsProfile,

    /// Desired interface configuration
    #[serde(default)]
    pub config: DesiredConfig,
}

fn default_device() -> String {
    "localhost".to_string()
}

fn default_cli_path() -> String {
    VTYSH_CMD.to_string()
}

fn default_show_command() -> String {
    SHOW_LLDP_INTERFACE_CMD.to_string()
}

fn default_neighbors_command() -> String {
    SHOW_LLDP_NEIGHBORS_CMD.to_string()
}

fn default_state() -> Mode {
    Mode::Merged
}

fn default_apply() -> bool {
    true
}

impl Default for LldpIfMgrConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            cli_path: default_cli_path(),
            show_command: default_show_command(),
            neighbors_command: default_neighbors_command(),
            state: default_state(),
            apply: default_apply(),
            defaults: DefaultsProfile::default(),
            config: DesiredConfig::default(),
        }
    }
}

impl LldpIfMgrConfig {
    /// Parses a YAML document
    pub fn from_yaml_str(content: &str) -> CfgMgrResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| CfgMgrError::invalid_config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> CfgMgrResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CfgMgrError::invalid_config(
                "path",
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Rejects values serde accepts but the manager cannot use
    pub fn validate(&self) -> CfgMgrResult<()> {
        if self.device.trim().is_empty() {
            return Err(CfgMgrError::invalid_config("device", "must not be empty"));
        }
        if self.cli_path.trim().is_empty() {
            return Err(CfgMgrError::invalid_config("cli_path", "must not be empty"));
        }
        if let Some(name) = self.config.names().find(|name| name.trim().is_empty()) {
            return Err(CfgMgrError::invalid_config(
                "config",
                format!("invalid interface name '{}'", name),
            ));
        }
        Ok(())
    }

    /// Builds the shell device described by this configuration
    pub fn shell_device(&self) -> ShellDevice {
        ShellDevice::new(&self.cli_path)
            .with_show_command(&self.show_command)
            .with_neighbors_command(&self.neighbors_command)
    }
}
