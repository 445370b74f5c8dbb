//! Common infrastructure for LLDP configuration manager crates.
//!
//! - [`shell`]: Shell command execution with proper quoting
//! - [`error`]: Error taxonomy shared by collectors, executors and managers
//! - [`fields`]: Raw field-value collections used for collected facts
//!
//! # Example
//!
//! ```ignore
//! use lldp_cfgmgr_common::{
//!     shell::{self, VTYSH_CMD, shellquote},
//!     CfgMgrResult,
//! };
//!
//! async fn show_lldp() -> CfgMgrResult<String> {
//!     let cmd = format!("{} -c {}", VTYSH_CMD, shellquote("show lldp interface detail"));
//!     shell::exec_or_throw(&cmd).await
//! }
//! ```

pub mod error;
pub mod fields;
pub mod shell;

// Re-export commonly used items at crate root
pub use error::{CfgMgrError, CfgMgrResult};
pub use fields::{FieldValue, FieldValues, FieldValuesExt};
