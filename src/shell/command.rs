//! External command execution.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{AuditError, Result};

/// Captured output of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether the process exited with status 0.
    pub success: bool,
}

/// Run `program` with `args`, capturing stdout and stderr.
///
/// A non-zero exit is reported through [`CommandOutput::success`], not as an
/// error. Only a failure to spawn the process is an error.
pub fn run(program: &str, args: &[String]) -> Result<CommandOutput> {
    debug!("running {}", display_command(program, args));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| AuditError::CommandFailed {
            command: display_command(program, args),
            source,
        })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
    })
}

/// Render a program and its arguments as a single line for messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
