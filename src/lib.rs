//! runbox - language adapter core for a multi-language code runner
//!
//! Given submitted source text, this crate decides how each supported
//! toolchain compiles it, how the resulting artifact is named and
//! launched, which resource-limit floors apply, and how runtime
//! diagnostics are cleaned up — behind one uniform `Task` interface.
//!
//! The crate does NOT:
//! - Spawn or sandbox processes itself (that's the `SandboxExecutor`
//!   collaborator; `ProcessExecutor` is a direct-spawn default)
//! - Queue or persist submissions
//! - Serve the outer CLI/API surface
//!
//! ```rust,ignore
//! use runbox::{ProcessExecutor, Submission, Task, TaskState};
//!
//! # async fn demo() -> runbox::Result<()> {
//! let task_spec = Submission {
//!     language_id: "sh".into(),
//!     source: "echo hello".into(),
//!     filename: None,
//!     stdin: String::new(),
//!     parameters: Default::default(),
//! };
//!
//! let executor = ProcessExecutor::new();
//! let mut task = Task::create(task_spec)?;
//! task.compile(&executor).await?;
//!
//! if task.state() == TaskState::Compiled {
//!     let result = task.run(&executor).await?;
//!     println!("{}: {}", result.outcome, result.stdout);
//! } else {
//!     eprintln!("{}", task.diagnostics());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod exec;
pub mod outcome;
pub mod params;
pub mod registry;
pub mod task;
pub mod workspace;

// Re-exports for the common entry points
pub use adapter::{CompileOutcome, LanguageAdapter, NameResolution, TaskContext, VersionProbe};
pub use error::{Result, TaskError};
pub use exec::{CommandSpec, ExecLimits, ExecOutcome, ExecStatus, ProcessExecutor, SandboxExecutor};
pub use outcome::{Outcome, RunResult};
pub use params::{LimitPolicy, ParamKey, ParamOverrides, ParamValue, ResolvedParams};
pub use registry::{get_adapter, supported_languages, version_command};
pub use task::{Submission, Task, TaskState};
