//! Verification helpers for testing the LLDP interface reconciler
//!
//! Provides assertion helpers to verify generated commands and device state

use std::collections::BTreeSet;
use thiserror::Error;

use lldpifmgrd::{ConfigSnapshot, InterfaceState};

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Command sets differ: missing {missing:?}, unexpected {unexpected:?}")]
    CommandMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Expected command '{command}' not found in {actual:?}")]
    CommandNotFound { command: String, actual: Vec<String> },

    #[error("Command '{command}' should not have been sent")]
    UnexpectedCommand { command: String },

    #[error("Expected {expected} commands, found {actual}")]
    CommandCountMismatch { expected: usize, actual: usize },

    #[error("Interface '{interface}' not found in snapshot")]
    InterfaceNotFound { interface: String },

    #[error("State mismatch for '{interface}': expected {expected:?}, got {actual:?}")]
    StateMismatch {
        interface: String,
        expected: InterfaceState,
        actual: InterfaceState,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Commands present in exactly one of the two lists, as (missing, unexpected)
pub fn symmetric_difference<A, B>(expected: &[A], actual: &[B]) -> (Vec<String>, Vec<String>)
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let expected: BTreeSet<&str> = expected.iter().map(|s| s.as_ref()).collect();
    let actual: BTreeSet<&str> = actual.iter().map(|s| s.as_ref()).collect();

    let missing = expected.difference(&actual).map(|s| s.to_string()).collect();
    let unexpected = actual.difference(&expected).map(|s| s.to_string()).collect();
    (missing, unexpected)
}

/// Checks that both lists hold the same commands, ignoring order
pub fn same_commands<A, B>(expected: &[A], actual: &[B]) -> VerifyResult<()>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let (missing, unexpected) = symmetric_difference(expected, actual);
    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(VerificationError::CommandMismatch {
            missing,
            unexpected,
        })
    }
}

/// Panics unless both lists hold the same commands, ignoring order
#[track_caller]
pub fn assert_same_commands<A, B>(expected: &[A], actual: &[B])
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    if let Err(e) = same_commands(expected, actual) {
        panic!("{}", e);
    }
}

/// Command execution verifier
pub struct CommandVerifier {
    captured_commands: Vec<String>,
}

impl CommandVerifier {
    /// Create a new command verifier
    pub fn new(captured_commands: Vec<String>) -> Self {
        Self { captured_commands }
    }

    /// Verify that a specific command was sent
    pub fn assert_command_executed(&self, expected: &str) -> VerifyResult<()> {
        if self.captured_commands.iter().any(|cmd| cmd == expected) {
            Ok(())
        } else {
            Err(VerificationError::CommandNotFound {
                command: expected.to_string(),
                actual: self.captured_commands.clone(),
            })
        }
    }

    /// Verify that a command was NOT sent
    pub fn assert_command_not_executed(&self, expected: &str) -> VerifyResult<()> {
        if self.captured_commands.iter().any(|cmd| cmd == expected) {
            Err(VerificationError::UnexpectedCommand {
                command: expected.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Verify the number of commands sent
    pub fn assert_command_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.captured_commands.len();
        if actual != expected {
            Err(VerificationError::CommandCountMismatch { expected, actual })
        } else {
            Ok(())
        }
    }

    /// Verify every `no ...` command of an interface block precedes its adds
    pub fn assert_removals_first(&self) -> VerifyResult<()> {
        let mut seen_add = false;
        for cmd in &self.captured_commands {
            if cmd.starts_with("interface ") {
                seen_add = false;
            } else if cmd.starts_with("no ") {
                if seen_add {
                    return Err(VerificationError::UnexpectedCommand {
                        command: cmd.clone(),
                    });
                }
            } else {
                seen_add = true;
            }
        }
        Ok(())
    }

    /// Get all captured commands
    pub fn captured_commands(&self) -> &[String] {
        &self.captured_commands
    }
}

/// Verify that `snapshot` holds the expected state for every expected interface
pub fn assert_states(expected: &ConfigSnapshot, snapshot: &ConfigSnapshot) -> VerifyResult<()> {
    for (interface, want) in expected {
        let got = snapshot
            .get(interface)
            .ok_or_else(|| VerificationError::InterfaceNotFound {
                interface: interface.clone(),
            })?;
        if got != want {
            return Err(VerificationError::StateMismatch {
                interface: interface.clone(),
                expected: want.clone(),
                actual: got.clone(),
            });
        }
    }
    Ok(())
}
