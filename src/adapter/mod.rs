//! Adapter module - per-language compile/run policy
//!
//! One adapter per supported toolchain family. An adapter decides how a
//! submission compiles, how the resulting artifact is named and
//! launched, which resource-limit floors apply, and how runtime stderr
//! is cleaned up. Adapters are stateless; everything task-specific
//! arrives through `TaskContext`.
//!
//! Adapters do NOT:
//! - Spawn processes themselves (they go through `SandboxExecutor`)
//! - Merge resource parameters (that happens at task creation)
//! - Decide verdicts for the run step

pub mod maven;
pub mod php;
pub mod shell;

use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;

use crate::error::Result;
use crate::exec::SandboxExecutor;
use crate::params::{LimitPolicy, ResolvedParams};

/// Runtime traceback indentation rewrite: a tab directly after a newline
/// becomes this fixed-width space run.
const INDENT_SPACES: &str = "        ";

/// Task-specific inputs an adapter operates on.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// The task's private working directory.
    pub work_dir: PathBuf,
    /// Resolved source filename (relative to `work_dir`).
    pub source_file: String,
    /// Entry-point name, derived once at task construction for
    /// class-oriented languages.
    pub entry_point: Option<String>,
    /// Merged effective parameters.
    pub params: ResolvedParams,
}

/// Result of default-filename derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolution {
    pub file_name: String,
    /// Set when the entry point was undeterminable and a placeholder
    /// name was substituted. The warning joins the task diagnostics;
    /// compilation is still attempted.
    pub warning: Option<String>,
}

impl NameResolution {
    pub fn fixed(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            warning: None,
        }
    }

    pub fn fallback(file_name: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            warning: Some(warning.into()),
        }
    }
}

/// Terminal result of an adapter's compile step: either an artifact
/// reference ready for the run step, or diagnostic text. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Artifact ready to hand to the run step. For script and
    /// build-tool-managed languages this is the source file itself.
    Compiled { executable: String },
    /// The compile/lint/prepare step failed; diagnostics explain why.
    Failed { diagnostics: String },
}

/// Version probe: a command line plus a pattern with one capture group,
/// consumed by the external toolchain-version cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionProbe {
    pub command: String,
    pub pattern: String,
}

impl VersionProbe {
    pub fn new(command: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            pattern: pattern.into(),
        }
    }

    /// Apply the pattern to probe output, returning the first capture.
    pub fn extract(&self, output: &str) -> Option<String> {
        let re = Regex::new(&self.pattern).ok()?;
        re.captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Per-language compile/run/version contract.
#[async_trait]
pub trait LanguageAdapter: Send + Sync {
    /// Canonical language id (registry key).
    fn language(&self) -> &'static str;

    /// Resource defaults and floors for this toolchain.
    fn limit_policy(&self) -> LimitPolicy;

    /// Whether the entry point is a class name derived from the
    /// resolved filename.
    fn class_oriented(&self) -> bool {
        false
    }

    /// Derive a filename when the submission does not declare one.
    fn default_file_name(&self, source: &str) -> NameResolution;

    /// Compile (or syntax-check, or prepare) the source in the task
    /// workspace. External tool invocations go through `executor`;
    /// captured compile stderr lands in the workspace diagnostics file.
    async fn compile(
        &self,
        ctx: &TaskContext,
        executor: &dyn SandboxExecutor,
    ) -> Result<CompileOutcome>;

    /// Ordered token sequence for the run step, handed verbatim to the
    /// executor. Default shape: interpreter, interpreter args, target.
    fn run_command(&self, ctx: &TaskContext) -> Vec<String> {
        let mut cmd = vec![self.executable_path().to_string()];
        cmd.extend(ctx.params.interpreter_args.iter().cloned());
        cmd.push(self.target_file(ctx));
        cmd
    }

    /// Path of the interpreter/tool that executes the artifact.
    fn executable_path(&self) -> &'static str;

    /// Target identifier passed to the run step. Defaults to the
    /// resolved source file.
    fn target_file(&self, ctx: &TaskContext) -> String {
        ctx.source_file.clone()
    }

    /// Version probe for the external toolchain-version cache.
    fn version_probe(&self) -> VersionProbe;

    /// Clean up runtime (not compile-time) stderr: a tab at the start of
    /// an indented traceback line becomes a fixed-width space run. Tabs
    /// not directly preceded by a newline are left untouched.
    fn filtered_stderr(&self, raw: &str) -> String {
        raw.replace("\n\t", &format!("\n{}", INDENT_SPACES))
    }
}
