//! Error types for the adapter core.
//!
//! Expected compile failures are not errors: they are returned as data
//! (diagnostic text) and the caller inspects the task's terminal state.
//! `TaskError` covers the unexpected conditions only.

use thiserror::Error;

/// Errors surfaced by task construction and lifecycle queries.
#[derive(Error, Debug)]
pub enum TaskError {
    /// No adapter is registered for the submitted language id.
    #[error("unsupported language: {0}")]
    UnknownLanguage(String),

    /// A run-step query was made before the task reached `Compiled`.
    #[error("task has no executable artifact (not compiled, or compile failed)")]
    NotCompiled,

    /// `compile()` was called on a task that already left the `Created` state.
    #[error("task has already been compiled; tasks are single-use")]
    AlreadyCompiled,

    /// Workspace or source-file I/O failed.
    #[error("workspace I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The external executor itself failed (not the program it ran).
    #[error("executor failed: {0}")]
    Executor(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
