//! Runs device CLI commands through `/bin/sh -c`.
//!
//! Arguments built from configuration or collected facts go through
//! [`shellquote`] before they reach the shell.

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{CfgMgrError, CfgMgrResult};

/// Default device CLI.
pub const VTYSH_CMD: &str = "/usr/bin/vtysh";

/// Characters `/bin/sh` still interprets inside double quotes.
static SHELL_META_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Double-quotes `s` for `/bin/sh`, backslash-escaping whatever the shell
/// would otherwise expand.
///
/// ```
/// use lldp_cfgmgr_common::shell::shellquote;
///
/// assert_eq!(shellquote("no lldp"), "\"no lldp\"");
/// assert_eq!(shellquote("a$b"), "\"a\\$b\"");
/// ```
pub fn shellquote(s: &str) -> String {
    format!("\"{}\"", SHELL_META_RE.replace_all(s, r"\$1"))
}

/// Exit status and trimmed output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// `-1` when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    fn from_output(output: &Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-empty streams joined by a newline, stdout first.
    pub fn combined_output(&self) -> String {
        [self.stdout.as_str(), self.stderr.as_str()]
            .into_iter()
            .filter(|stream| !stream.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs `cmd` and reports how it exited.
///
/// Only a failure to spawn is an error; a non-zero exit is returned as is.
pub async fn exec(cmd: &str) -> CfgMgrResult<ExecResult> {
    debug!(command = %cmd, "Running device command");

    let output = Command::new("/bin/sh")
        .args(["-c", cmd])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| CfgMgrError::ShellExec {
            command: cmd.to_string(),
            source,
        })?;

    let result = ExecResult::from_output(&output);
    if !result.success() {
        warn!(command = %cmd, exit_code = result.exit_code, "Device command exited non-zero");
    }
    Ok(result)
}

/// Runs `cmd` and returns its stdout, turning a non-zero exit into
/// [`CfgMgrError::ShellCommandFailed`].
pub async fn exec_or_throw(cmd: &str) -> CfgMgrResult<String> {
    let result = exec(cmd).await?;
    if !result.success() {
        return Err(CfgMgrError::ShellCommandFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        });
    }
    Ok(result.stdout)
}
