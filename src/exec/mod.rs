//! Executor module - sandbox execution seam
//!
//! This module defines the interface between the adapter core and the
//! external process sandbox:
//! - `CommandSpec`: the token sequence handed verbatim to the executor
//! - `ExecLimits`: the resolved resource limits the executor enforces
//! - `SandboxExecutor`: the trait the real sandbox implements
//! - `ProcessExecutor`: direct-spawn default implementation
//!
//! The executor module does NOT:
//! - Decide how a language compiles or runs (that's the adapters' job)
//! - Interpret compile diagnostics
//! - Merge resource parameters

pub mod process;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::params::ResolvedParams;

/// Command specification for execution.
///
/// Token order and grouping are significant: the executor assembles the
/// final invocation positionally.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program path or name
    pub program: String,
    /// Arguments to the program
    pub args: Vec<String>,
    /// Environment variables (key=value)
    pub env: Vec<String>,
    /// Working directory
    pub work_dir: Option<std::path::PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            work_dir: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(|a| a.into()).collect();
        self
    }

    pub fn with_env(mut self, env: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.env = env.into_iter().map(|e| e.into()).collect();
        self
    }

    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Create from a command vector (first element is program, rest are args)
    pub fn from_vec(cmd: &[String]) -> Self {
        let mut iter = cmd.iter();
        let program = iter.next().cloned().unwrap_or_default();
        let args: Vec<String> = iter.cloned().collect();
        Self {
            program,
            args,
            env: Vec::new(),
            work_dir: None,
        }
    }

    /// Convert to a vector of strings (program + args)
    pub fn to_vec(&self) -> Vec<String> {
        let mut v = vec![self.program.clone()];
        v.extend(self.args.clone());
        v
    }
}

/// Resource limits handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecLimits {
    /// CPU time limit in seconds
    pub cpu_time: u32,
    /// Memory limit in bytes
    pub memory_limit: u64,
    /// Maximum number of OS processes/threads
    pub num_procs: u32,
}

impl ExecLimits {
    pub fn new(cpu_time: u32, memory_limit: u64, num_procs: u32) -> Self {
        Self {
            cpu_time,
            memory_limit,
            num_procs,
        }
    }

    /// Take the limits from a merged parameter set.
    pub fn from_params(params: &ResolvedParams) -> Self {
        Self {
            cpu_time: params.cpu_time,
            memory_limit: params.memory_limit,
            num_procs: params.num_procs,
        }
    }
}

/// Execution status (raw, no outcome interpretation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecStatus {
    /// Program exited normally with given exit code
    Exited(i32),
    /// Time limit exceeded
    TimeLimitExceeded,
    /// Memory limit exceeded
    MemoryLimitExceeded,
    /// Killed by signal
    Signaled(i32),
    /// System/internal error
    SystemError,
}

impl ExecStatus {
    /// Check if execution was successful (exited with code 0)
    pub fn is_success(&self) -> bool {
        matches!(self, ExecStatus::Exited(0))
    }
}

/// Outcome of one executor invocation.
#[derive(Debug)]
pub struct ExecOutcome {
    /// Exit code (-1 if not applicable)
    pub exit_code: i32,
    /// Stdout content
    pub stdout: String,
    /// Stderr content
    pub stderr: String,
    /// Execution status
    pub status: ExecStatus,
}

impl ExecOutcome {
    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Stdout and stderr concatenated, stderr last.
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// External process sandbox: spawns a command under the given limits and
/// returns its exit status and captured output.
///
/// Cancellation and limit enforcement live entirely behind this trait;
/// the adapter core only supplies the resolved values.
#[async_trait]
pub trait SandboxExecutor: Send + Sync {
    async fn execute(
        &self,
        cmd: &CommandSpec,
        limits: &ExecLimits,
        stdin: Option<&str>,
    ) -> Result<ExecOutcome>;
}

// Re-exports
pub use process::ProcessExecutor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_spec_round_trips_token_order() {
        let cmd = CommandSpec::new("/usr/bin/mvn")
            .with_args(["-Dmaven.repo.local=/work/m2", "test"]);
        assert_eq!(
            cmd.to_vec(),
            vec![
                "/usr/bin/mvn".to_string(),
                "-Dmaven.repo.local=/work/m2".to_string(),
                "test".to_string(),
            ]
        );

        let rebuilt = CommandSpec::from_vec(&cmd.to_vec());
        assert_eq!(rebuilt.program, "/usr/bin/mvn");
        assert_eq!(rebuilt.args, cmd.args);
    }

    #[test]
    fn limits_come_from_params() {
        let params = ResolvedParams {
            memory_limit: 20_000_000,
            cpu_time: 30,
            num_procs: 256,
            ..ResolvedParams::generic()
        };
        let limits = ExecLimits::from_params(&params);
        assert_eq!(limits, ExecLimits::new(30, 20_000_000, 256));
    }

    #[test]
    fn combined_output_orders_stderr_last() {
        let outcome = ExecOutcome {
            exit_code: 1,
            stdout: "out".into(),
            stderr: "err".into(),
            status: ExecStatus::Exited(1),
        };
        assert_eq!(outcome.combined_output(), "out\nerr");
    }
}
