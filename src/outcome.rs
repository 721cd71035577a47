//! Run outcome classification
//!
//! Maps raw executor statuses onto the service's numeric outcome codes
//! and packages the result object the outer surface returns.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::exec::{ExecOutcome, ExecStatus};

/// Outcome of processing one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    IllegalSystemCall,
    InternalError,
    Overload,
}

impl Outcome {
    /// Numeric code reported on the wire.
    pub fn code(&self) -> u8 {
        match self {
            Outcome::Ok => 15,
            Outcome::CompileError => 11,
            Outcome::RuntimeError => 12,
            Outcome::TimeLimitExceeded => 13,
            Outcome::MemoryLimitExceeded => 17,
            Outcome::IllegalSystemCall => 19,
            Outcome::InternalError => 20,
            Outcome::Overload => 21,
        }
    }

    /// Classify a raw executor status.
    pub fn from_status(status: &ExecStatus) -> Outcome {
        match status {
            ExecStatus::Exited(0) => Outcome::Ok,
            ExecStatus::Exited(_) => Outcome::RuntimeError,
            ExecStatus::TimeLimitExceeded => Outcome::TimeLimitExceeded,
            ExecStatus::MemoryLimitExceeded => Outcome::MemoryLimitExceeded,
            ExecStatus::Signaled(_) => Outcome::RuntimeError,
            ExecStatus::SystemError => Outcome::InternalError,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Ok => "ok",
            Outcome::CompileError => "compile_error",
            Outcome::RuntimeError => "runtime_error",
            Outcome::TimeLimitExceeded => "time_limit_exceeded",
            Outcome::MemoryLimitExceeded => "memory_limit_exceeded",
            Outcome::IllegalSystemCall => "illegal_system_call",
            Outcome::InternalError => "internal_error",
            Outcome::Overload => "overload",
        };
        write!(f, "{}", s)
    }
}

/// Result object for one submission: the outcome, compile diagnostics
/// (empty unless the compile step failed), and the captured streams.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub outcome: Outcome,
    pub cmpinfo: String,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    /// Result for a task whose compile step failed; no run happened.
    pub fn compile_error(cmpinfo: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::CompileError,
            cmpinfo: cmpinfo.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Result for a completed run; `stderr` should already be filtered.
    pub fn from_run(outcome_status: &ExecOutcome, filtered_stderr: String) -> Self {
        Self {
            outcome: Outcome::from_status(&outcome_status.status),
            cmpinfo: String::new(),
            stdout: outcome_status.stdout.clone(),
            stderr: filtered_stderr,
        }
    }
}
