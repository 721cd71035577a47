//! Direct-spawn executor implementation
//!
//! Runs commands as ordinary child processes with rlimits applied.
//! This is the default collaborator for environments where the real
//! sandbox is provided elsewhere; it enforces resource limits but
//! performs no filesystem or namespace isolation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use nix::sys::resource::{setrlimit, Resource};
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{CommandSpec, ExecLimits, ExecOutcome, ExecStatus, SandboxExecutor};

/// Executor that spawns processes directly, with rlimits.
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Wall-clock allowance for a CPU-time limit: CPU-bound programs get
    /// double the budget plus a second of slack before the kill.
    fn wall_time_secs(limits: &ExecLimits) -> u64 {
        (limits.cpu_time as u64) * 2 + 1
    }
}

#[async_trait]
impl SandboxExecutor for ProcessExecutor {
    async fn execute(
        &self,
        cmd: &CommandSpec,
        limits: &ExecLimits,
        stdin: Option<&str>,
    ) -> Result<ExecOutcome> {
        debug!("Spawning {:?} with limits {:?}", cmd.to_vec(), limits);

        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &cmd.work_dir {
            command.current_dir(dir);
        }

        for entry in &cmd.env {
            if let Some((key, value)) = entry.split_once('=') {
                command.env(key, value);
            }
        }

        let cpu_secs = limits.cpu_time as u64;
        let memory_bytes = limits.memory_limit;
        let nproc = limits.num_procs as u64;
        unsafe {
            command.pre_exec(move || {
                let apply = |resource, value| {
                    setrlimit(resource, value, value)
                        .map_err(|e| std::io::Error::from_raw_os_error(e as i32))
                };
                apply(Resource::RLIMIT_CPU, cpu_secs)?;
                apply(Resource::RLIMIT_AS, memory_bytes)?;
                apply(Resource::RLIMIT_NPROC, nproc)?;
                Ok(())
            });
        }

        // An absent or broken tool is reported like any failed command
        // (the shell's command-not-found code), so it flows through the
        // ordinary compile-failure path instead of a distinct category.
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return Ok(ExecOutcome {
                    exit_code: 127,
                    stdout: String::new(),
                    stderr: format!("{}: {}", cmd.program, e),
                    status: ExecStatus::Exited(127),
                });
            }
        };

        if let Some(input) = stdin {
            if let Some(mut handle) = child.stdin.take() {
                handle.write_all(input.as_bytes()).await?;
            }
        } else {
            drop(child.stdin.take());
        }

        let wall = std::time::Duration::from_secs(Self::wall_time_secs(limits));
        let output = match tokio::time::timeout(wall, child.wait_with_output()).await {
            Ok(result) => result.context("Failed to wait for child process")?,
            // The dropped child is killed via kill_on_drop.
            Err(_) => {
                return Ok(ExecOutcome {
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: String::new(),
                    status: ExecStatus::TimeLimitExceeded,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let (exit_code, status) = match output.status.code() {
            Some(code) => (code, ExecStatus::Exited(code)),
            None => {
                let signal = output.status.signal().unwrap_or(-1);
                // SIGXCPU / SIGKILL out of the CPU rlimit read as a time limit.
                let status = if signal == nix::libc::SIGXCPU {
                    ExecStatus::TimeLimitExceeded
                } else {
                    ExecStatus::Signaled(signal)
                };
                (-1, status)
            }
        };

        Ok(ExecOutcome {
            exit_code,
            stdout,
            stderr,
            status,
        })
    }
}
