// Copyright (C) 2026 Checkmk GmbH - License: GNU General Public License v2
// This file is part of Checkmk (https://checkmk.com). It is subject to the terms and
// conditions defined in the file COPYING, which is part of this source code package.

//! Runs external tools (`ldd`, `zypper`) behind the `CommandRunner` trait.
//!
//! Tests substitute a fake runner, so the real tools are never spawned there.

use std::ffi::OsStr;
use std::io::Read;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

/// Default timeout for a single tool invocation (30 seconds).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for command invocations.
pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command not found: {command}")]
    NotFound { command: String },
    #[error("Failed to spawn command: {command}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to wait for command: {command}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read output of command: {command}")]
    ReadFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },
    #[error("Command terminated by signal {signal}: {command}")]
    Signal { command: String, signal: i32 },
}

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Capability to run a local program and capture its output.
///
/// Implementations must be shareable between resolver threads.
pub trait CommandRunner: Sync {
    /// Run `program` with `args` and wait for it to finish.
    ///
    /// A non-zero exit code is *not* an error at this level; callers decide what it means.
    ///
    /// # Errors
    /// Returns an error if the program cannot be started, is killed by a signal, or times out.
    fn run(&self, program: &str, args: &[&OsStr]) -> CommandResult<CommandOutput>;
}

/// Runs commands on the host, killing them once the timeout is exceeded.
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl SystemCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

type OutputReader = JoinHandle<std::io::Result<Vec<u8>>>;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&OsStr]) -> CommandResult<CommandOutput> {
        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    return Err(CommandError::NotFound {
                        command: program.to_string(),
                    });
                }
                return Err(CommandError::SpawnFailed {
                    command: program.to_string(),
                    source: e,
                });
            }
        };

        // Drain both pipes while waiting, otherwise a chatty child blocks on a full pipe.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = wait_with_timeout(&mut child, self.timeout, program);
        let stdout = join_reader(stdout, program)?;
        let stderr = join_reader(stderr, program)?;
        let status = status?;

        Ok(CommandOutput {
            code: status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<OutputReader> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buffer = Vec::new();
            pipe.read_to_end(&mut buffer).map(|_| buffer)
        })
    })
}

fn join_reader(reader: Option<OutputReader>, command: &str) -> CommandResult<Vec<u8>> {
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };
    reader
        .join()
        .unwrap_or_else(|_| Err(std::io::Error::other("Output reader thread panicked")))
        .map_err(|e| CommandError::ReadFailed {
            command: command.to_string(),
            source: e,
        })
}

/// Wait for a child process to complete with a timeout.
///
/// Uses `wait-timeout` to wait for the process without polling. If the timeout is reached,
/// the process is killed.
///
/// # Returns
/// - `Ok(ExitStatus)` if the process exited within the timeout
/// - `Err(CommandError::Timeout)` if the process timed out
/// - `Err(CommandError::Signal)` if the process was terminated by a signal
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    command: &str,
) -> CommandResult<ExitStatus> {
    if let Some(status) = child
        .wait_timeout(timeout)
        .map_err(|e| CommandError::WaitFailed {
            command: command.to_string(),
            source: e,
        })?
    {
        if status.code().is_some() {
            Ok(status)
        } else {
            Err(CommandError::Signal {
                command: command.to_string(),
                signal: status.signal().unwrap_or(-1),
            })
        }
    } else {
        let _ = child.kill();
        let _ = child.wait();
        Err(CommandError::Timeout {
            command: command.to_string(),
            timeout,
        })
    }
}
