// src/system/executor.rs

use std::collections::HashMap;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

/// Failures of running an external program.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The program name was blank.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The program could not be spawned.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// The program ran and failed.
    #[error("Command '{command}' exited with a non-zero error code: {stderr}")]
    NonZeroExitStatus {
        /// The command line, shell-quoted.
        command: String,
        /// Trimmed standard error.
        stderr: String,
    },
    /// Standard output was not UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// The command line, shell-quoted.
        command: String,
        /// The decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Renders a program and its arguments as a single, shell-quoted line for messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    let parts = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(parts).unwrap_or_else(|_| {
        // Arguments containing NUL bytes cannot be quoted; fall back to a plain join.
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    })
}

/// Executes a program and captures its standard output.
///
/// Stdin is closed. Stderr is captured and attached to the error when the program
/// exits unsuccessfully. This call blocks until the program finishes.
pub fn execute_and_capture_output(
    program: &str,
    args: &[String],
    env_vars: &HashMap<String, String>,
) -> Result<String, ExecutionError> {
    let program = program.trim();
    if program.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let command_line = display_command(program, args);
    log::debug!("Executing: {}", command_line);

    let command_output = StdCommand::new(program)
        .args(args)
        .envs(env_vars)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    if !command_output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command_line,
            stderr: String::from_utf8_lossy(&command_output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(command_output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line,
        source: e,
    })
}
