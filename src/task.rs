//! Task module - one-shot submission lifecycle
//!
//! A task is created from a submission, compiled exactly once, and then
//! queried for its run descriptor and diagnostics. Construction resolves
//! the filename, merges resource parameters against the adapter's
//! policy, and derives the entry-point name for class-oriented
//! languages. After `compile()` the task is in exactly one of two
//! terminal states: `Compiled` (artifact set, diagnostics empty) or
//! `CompileFailed` (diagnostics non-empty, no artifact).

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapter::{CompileOutcome, LanguageAdapter, TaskContext, VersionProbe};
use crate::error::{Result, TaskError};
use crate::exec::{CommandSpec, ExecLimits, SandboxExecutor};
use crate::outcome::RunResult;
use crate::params::{self, ParamKey, ParamValue, ResolvedParams};
use crate::registry;
use crate::workspace::Workspace;

/// Fallback diagnostic when a failed compile produced no output at all.
const NO_DIAGNOSTICS: &str = "Compilation failed with no diagnostic output";

/// A submission as received from the outer surface. Immutable once
/// accepted; field names match the wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub language_id: String,
    #[serde(rename = "sourcecode")]
    pub source: String,
    #[serde(rename = "sourcefilename", default)]
    pub filename: Option<String>,
    #[serde(rename = "input", default)]
    pub stdin: String,
    #[serde(rename = "parameters", default)]
    pub parameters: params::ParamOverrides,
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Constructed, not yet compiled.
    Created,
    /// Compile succeeded; the artifact reference is set.
    Compiled,
    /// Compile failed; diagnostics are set.
    CompileFailed,
}

/// One task per submission: construct, compile, query. Not re-entrant.
pub struct Task {
    adapter: Arc<dyn LanguageAdapter>,
    workspace: Workspace,
    ctx: TaskContext,
    stdin: String,
    state: TaskState,
    artifact: Option<String>,
    cmpinfo: String,
}

impl Task {
    /// Build a task for a submission: select the adapter, resolve the
    /// filename (recording a warning when the entry point could not be
    /// determined), merge parameters, and lay out the workspace.
    pub fn create(submission: Submission) -> Result<Task> {
        let adapter = registry::get_adapter(&submission.language_id)
            .ok_or_else(|| TaskError::UnknownLanguage(submission.language_id.clone()))?;

        let mut cmpinfo = String::new();
        let source_file = match submission.filename {
            Some(name) => name,
            None => {
                let resolution = adapter.default_file_name(&submission.source);
                if let Some(warning) = resolution.warning {
                    cmpinfo.push_str(&warning);
                }
                resolution.file_name
            }
        };

        let params = params::resolve(&submission.parameters, &adapter.limit_policy());

        let workspace = Workspace::create()?;
        workspace.write_source(&source_file, &submission.source)?;

        // Derived once; every later query reuses it.
        let entry_point = adapter.class_oriented().then(|| {
            source_file
                .split('.')
                .next()
                .unwrap_or(source_file.as_str())
                .to_string()
        });

        debug!(
            "Created {} task: file={}, entry_point={:?}",
            adapter.language(),
            source_file,
            entry_point
        );

        let ctx = TaskContext {
            work_dir: workspace.path().to_path_buf(),
            source_file,
            entry_point,
            params,
        };

        Ok(Task {
            adapter,
            workspace,
            ctx,
            stdin: submission.stdin,
            state: TaskState::Created,
            artifact: None,
            cmpinfo,
        })
    }

    /// Compile the submission. Single-use: a second call is an error.
    ///
    /// On return the task is in exactly one terminal state. A
    /// pre-compile warning (undeterminable entry point) forces
    /// `CompileFailed` even when the toolchain exits cleanly.
    pub async fn compile(&mut self, executor: &dyn SandboxExecutor) -> Result<()> {
        if self.state != TaskState::Created {
            return Err(TaskError::AlreadyCompiled);
        }

        let outcome = self.adapter.compile(&self.ctx, executor).await?;

        match outcome {
            CompileOutcome::Compiled { executable } if self.cmpinfo.is_empty() => {
                self.artifact = Some(executable);
                self.state = TaskState::Compiled;
            }
            CompileOutcome::Compiled { .. } => {
                self.state = TaskState::CompileFailed;
            }
            CompileOutcome::Failed { diagnostics } => {
                if !self.cmpinfo.is_empty() && !diagnostics.is_empty() {
                    self.cmpinfo.push('\n');
                }
                self.cmpinfo.push_str(&diagnostics);
                if self.cmpinfo.is_empty() {
                    self.cmpinfo.push_str(NO_DIAGNOSTICS);
                }
                self.state = TaskState::CompileFailed;
            }
        }

        info!(
            "Compile finished: language={}, state={:?}",
            self.adapter.language(),
            self.state
        );
        Ok(())
    }

    /// Run the compiled artifact through the executor with the merged
    /// limits and the submission's stdin; runtime stderr comes back
    /// through the adapter's filter.
    pub async fn run(&self, executor: &dyn SandboxExecutor) -> Result<RunResult> {
        self.require_compiled()?;

        let cmd = CommandSpec::from_vec(&self.adapter.run_command(&self.ctx))
            .with_work_dir(&self.ctx.work_dir);
        let limits = ExecLimits::from_params(&self.ctx.params);

        let outcome = executor
            .execute(&cmd, &limits, Some(&self.stdin))
            .await
            .map_err(TaskError::Executor)?;

        let filtered = self.adapter.filtered_stderr(&outcome.stderr);
        Ok(RunResult::from_run(&outcome, filtered))
    }

    /// Merged effective value for one parameter key.
    pub fn get_param(&self, key: ParamKey) -> ParamValue {
        self.ctx.params.get(key)
    }

    pub fn params(&self) -> &ResolvedParams {
        &self.ctx.params
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Compile diagnostics; empty unless the task is `CompileFailed`.
    pub fn diagnostics(&self) -> &str {
        &self.cmpinfo
    }

    /// The artifact reference, set only in the `Compiled` state.
    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    /// Ordered run-descriptor tokens for the external executor.
    pub fn run_command(&self) -> Result<Vec<String>> {
        self.require_compiled()?;
        Ok(self.adapter.run_command(&self.ctx))
    }

    /// Path of the interpreter/tool that executes the artifact.
    pub fn executable_path(&self) -> Result<String> {
        self.require_compiled()?;
        Ok(self.adapter.executable_path().to_string())
    }

    /// Target identifier for the run step.
    pub fn target_file(&self) -> Result<String> {
        self.require_compiled()?;
        Ok(self.adapter.target_file(&self.ctx))
    }

    /// Clean up runtime stderr per the adapter's policy.
    pub fn filtered_stderr(&self, raw: &str) -> String {
        self.adapter.filtered_stderr(raw)
    }

    /// Version probe for this task's toolchain.
    pub fn version_command(&self) -> VersionProbe {
        self.adapter.version_probe()
    }

    pub fn stdin(&self) -> &str {
        &self.stdin
    }

    pub fn work_dir(&self) -> &Path {
        self.workspace.path()
    }

    fn require_compiled(&self) -> Result<()> {
        if self.state != TaskState::Compiled {
            return Err(TaskError::NotCompiled);
        }
        Ok(())
    }
}
