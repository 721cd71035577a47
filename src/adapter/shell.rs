//! Shell adapter - scripts run as-is
//!
//! No translation happens at compile time: the script's line endings are
//! normalized and the file is marked executable. Failure of either
//! filesystem step is the only compile-failure mode.

use async_trait::async_trait;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{CompileOutcome, LanguageAdapter, NameResolution, TaskContext, VersionProbe};
use crate::error::Result;
use crate::exec::SandboxExecutor;
use crate::params::{Floors, LimitPolicy, ResolvedParams};
use crate::workspace;

const SHELL_PATH: &str = "/bin/bash";
const DEFAULT_FILE: &str = "prog.sh";

// Floors carried over from the deployed service; the memory value
// predates this adapter (see DESIGN.md).
const MIN_NUM_PROCS: u32 = 256;
const MIN_MEMORY_LIMIT: u64 = 20_000_000;
const MIN_CPU_TIME: u32 = 10;

/// Rewrite CRLF line endings in place and set the executable bit.
async fn prepare_script(path: &Path) -> std::io::Result<()> {
    let text = fs::read_to_string(path).await?;
    let normalized = text.replace("\r\n", "\n");
    if normalized != text {
        fs::write(path, normalized).await?;
    }

    let mut perms = fs::metadata(path).await?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Adapter for shell-script submissions.
pub struct ShellAdapter;

#[async_trait]
impl LanguageAdapter for ShellAdapter {
    fn language(&self) -> &'static str {
        "sh"
    }

    fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            defaults: ResolvedParams {
                memory_limit: MIN_MEMORY_LIMIT,
                cpu_time: MIN_CPU_TIME,
                num_procs: MIN_NUM_PROCS,
                ..ResolvedParams::generic()
            },
            floors: Floors {
                memory_limit: Some(MIN_MEMORY_LIMIT),
                cpu_time: Some(MIN_CPU_TIME),
                num_procs: Some(MIN_NUM_PROCS),
            },
        }
    }

    fn default_file_name(&self, _source: &str) -> NameResolution {
        NameResolution::fixed(DEFAULT_FILE)
    }

    async fn compile(
        &self,
        ctx: &TaskContext,
        _executor: &dyn SandboxExecutor,
    ) -> Result<CompileOutcome> {
        let script = ctx.work_dir.join(&ctx.source_file);
        debug!("Preparing script {:?}", script);

        match prepare_script(&script).await {
            Ok(()) => {
                workspace::write_diagnostics(&ctx.work_dir, "").await?;
                Ok(CompileOutcome::Compiled {
                    executable: ctx.source_file.clone(),
                })
            }
            Err(e) => {
                let diagnostics = format!("Failed to prepare {}: {}", ctx.source_file, e);
                workspace::write_diagnostics(&ctx.work_dir, &diagnostics).await?;
                Ok(CompileOutcome::Failed { diagnostics })
            }
        }
    }

    fn run_command(&self, ctx: &TaskContext) -> Vec<String> {
        // The script carries its own shebang; it is executed directly.
        vec![ctx
            .work_dir
            .join(&ctx.source_file)
            .display()
            .to_string()]
    }

    fn executable_path(&self) -> &'static str {
        SHELL_PATH
    }

    fn version_probe(&self) -> VersionProbe {
        VersionProbe::new("bash -version", r#"GNU bash, version "?([0-9._]*)"#)
    }
}
