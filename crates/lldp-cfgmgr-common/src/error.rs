//! Error types for LLDP configuration manager operations.
//!
//! All errors implement `std::error::Error` via `thiserror`. The variants map
//! onto the failure points of a reconciliation: reading facts from the device,
//! validating them, and pushing commands back to it.

use std::io;
use thiserror::Error;

/// Result type alias for cfgmgr operations.
pub type CfgMgrResult<T> = Result<T, CfgMgrError>;

/// Errors that can occur during cfgmgr operations.
#[derive(Debug, Error)]
pub enum CfgMgrError {
    /// Collected facts could not be turned into a typed state.
    #[error("Malformed facts for interface '{interface}': {message}")]
    MalformedFacts {
        /// The interface whose facts were rejected.
        interface: String,
        /// What was wrong with them.
        message: String,
    },

    /// The device could not be reached or did not return facts.
    #[error("Failed to collect facts from device '{device}': {message}")]
    Collection {
        /// The device handle name.
        device: String,
        /// Error message.
        message: String,
    },

    /// A single command was rejected by the device.
    #[error("Device rejected command '{command}': {message}")]
    Execution {
        /// The rejected command.
        command: String,
        /// Error message.
        message: String,
    },

    /// Some commands of a sequence were applied before one failed.
    #[error("Applied {applied} of {total} commands before '{failed_command}' failed: {source}")]
    PartialApply {
        /// Number of commands applied successfully, in order.
        applied: usize,
        /// Length of the command sequence.
        total: usize,
        /// The command that failed.
        failed_command: String,
        /// The underlying failure.
        #[source]
        source: Box<CfgMgrError>,
    },

    /// Failed to execute a shell command (spawn error).
    #[error("Failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned non-zero exit code.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl CfgMgrError {
    /// Creates a malformed facts error.
    pub fn malformed_facts(interface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedFacts {
            interface: interface.into(),
            message: message.into(),
        }
    }

    /// Creates a collection error.
    pub fn collection(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collection {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Creates an execution error for a single rejected command.
    pub fn execution(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Wraps a failed command into a partial apply error.
    ///
    /// `applied` is the number of commands that succeeded before the failure,
    /// which is also the index of the failed command.
    pub fn partial_apply(
        applied: usize,
        total: usize,
        failed_command: impl Into<String>,
        source: CfgMgrError,
    ) -> Self {
        Self::PartialApply {
            applied,
            total,
            failed_command: failed_command.into(),
            source: Box::new(source),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the index of the last command applied before a partial apply
    /// failure, or `None` if nothing was applied or this is another error.
    pub fn last_applied_index(&self) -> Option<usize> {
        match self {
            CfgMgrError::PartialApply { applied, .. } => applied.checked_sub(1),
            _ => None,
        }
    }

    /// Returns true if this error indicates a transient condition
    /// where re-running the whole reconciliation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CfgMgrError::Collection { .. }
                | CfgMgrError::PartialApply { .. }
                | CfgMgrError::ShellCommandFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CfgMgrError::malformed_facts("Ethernet0", "missing field 'receive'");
        assert_eq!(
            err.to_string(),
            "Malformed facts for interface 'Ethernet0': missing field 'receive'"
        );
    }

    #[test]
    fn test_collection_error() {
        let err = CfgMgrError::collection("leaf1", "Connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to collect facts from device 'leaf1': Connection refused"
        );
    }

    #[test]
    fn test_shell_command_failed() {
        let err = CfgMgrError::ShellCommandFailed {
            command: "vtysh -c \"show lldp interface detail\"".to_string(),
            exit_code: 2,
            output: "% Unknown command".to_string(),
        };
        assert!(err.to_string().contains("show lldp interface"));
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_partial_apply() {
        let err = CfgMgrError::partial_apply(
            2,
            5,
            "lldp tlv-select system-name",
            CfgMgrError::execution("lldp tlv-select system-name", "% Invalid input"),
        );
        assert_eq!(err.last_applied_index(), Some(1));
        assert!(err.to_string().starts_with("Applied 2 of 5 commands"));
        assert!(std::error::Error::source(&err).is_some());

        let first = CfgMgrError::partial_apply(
            0,
            3,
            "interface Ethernet0",
            CfgMgrError::execution("interface Ethernet0", "% Invalid interface"),
        );
        assert_eq!(first.last_applied_index(), None);
    }

    #[test]
    fn test_is_retryable() {
        assert!(CfgMgrError::collection("leaf1", "timeout").is_retryable());
        assert!(!CfgMgrError::malformed_facts("Ethernet0", "bad").is_retryable());
        assert!(!CfgMgrError::execution("lldp", "rejected").is_retryable());
        assert!(!CfgMgrError::internal("bug").is_retryable());
    }
}
