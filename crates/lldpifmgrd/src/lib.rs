//! # lldpifmgrd - LLDP Interface Configuration Reconciler
//!
//! Brings the per-interface LLDP configuration of a network device to a
//! declared target state. Each reconciliation reads the device's current
//! state, diffs it against the desired configuration under a mode, turns the
//! diff into an ordered list of CLI commands and (optionally) sends them.
//!
//! ## Responsibilities
//! - LLDP enable/disable per interface
//! - LLDPDU receive and transmit control
//! - TLV advertisement selection
//!
//! ## Modes
//! - `merged`: desired attributes are laid over the current state
//! - `replaced`: desired interfaces are rewritten, unspecified attributes reset
//! - `overridden`: as replaced, and every other interface is reset
//! - `deleted`: named interfaces (or all of them) are reset to defaults
//!
//! ## Key Features
//! - Pure, deterministic diffing and command generation
//! - Dry-run support with a projected `after` snapshot
//! - Apply stops at the first rejected command and reports how far it got

pub mod commands;
pub mod config;
pub mod device;
pub mod differ;
pub mod facts;
mod lldpif_mgr;
pub mod shell_device;
mod tables;
mod types;

pub use config::{DefaultsProfile, LldpIfMgrConfig};
pub use device::{CommandExecutor, DeviceHandle, FactsCollector};
pub use differ::{diff, diff_with_defaults, AttrValue, Attribute, Diff, DiffEntry};
pub use lldpif_mgr::{LldpIfMgr, ReconcileError, ReconcileResult, ReconcileStage};
pub use shell_device::ShellDevice;
pub use tables::*;
pub use types::*;
