//! PHP adapters - script-checked, no-link execution
//!
//! The compile step is a syntax check only (`php -l`); no separate
//! artifact ever exists, so a clean check makes the source file itself
//! the artifact. Two generations are registered as distinct adapters:
//! the legacy one carries an explicit memory floor, the current one
//! drops floors and instead injects a restricted-execution flag through
//! the default interpreter arguments.

use async_trait::async_trait;
use tracing::debug;

use super::{CompileOutcome, LanguageAdapter, NameResolution, TaskContext, VersionProbe};
use crate::error::{Result, TaskError};
use crate::exec::{CommandSpec, ExecLimits, SandboxExecutor};
use crate::params::{Floors, LimitPolicy, ResolvedParams};
use crate::workspace;

const PHP_PATH: &str = "/usr/bin/php";
const DEFAULT_FILE: &str = "prog.php";

/// Memory floor carried over from the legacy deployment. Kept verbatim
/// as this adapter's own constant; see DESIGN.md for the provenance
/// flag.
const LEGACY_MIN_MEMORY_LIMIT: u64 = 20_000_000;

/// Interpreter flag the current generation injects by default: the
/// system php.ini is ignored so submissions run with a restricted,
/// predictable configuration.
const RESTRICTED_FLAG: &str = "--no-php-ini";

/// Syntax-check the source; a clean lint promotes the source file itself
/// to the artifact.
async fn lint_compile(
    ctx: &TaskContext,
    executor: &dyn SandboxExecutor,
) -> Result<CompileOutcome> {
    let cmd = CommandSpec::new(PHP_PATH)
        .with_args(["-l", ctx.source_file.as_str()])
        .with_work_dir(&ctx.work_dir);
    let limits = ExecLimits::from_params(&ctx.params);

    debug!("Linting {} with {:?}", ctx.source_file, cmd.to_vec());

    let outcome = executor
        .execute(&cmd, &limits, None)
        .await
        .map_err(TaskError::Executor)?;

    workspace::write_diagnostics(&ctx.work_dir, &outcome.stderr).await?;

    if outcome.is_success() {
        Ok(CompileOutcome::Compiled {
            executable: ctx.source_file.clone(),
        })
    } else {
        let file_diagnostics = workspace::read_diagnostics(&ctx.work_dir).await;
        let diagnostics = if outcome.stdout.is_empty() {
            file_diagnostics
        } else {
            format!("{}\n{}", outcome.stdout.trim_end(), file_diagnostics)
        };
        Ok(CompileOutcome::Failed { diagnostics })
    }
}

fn php_version_probe() -> VersionProbe {
    VersionProbe::new("php --version", r"PHP ([0-9._]*)")
}

/// Current-generation PHP adapter: generic limits, restricted
/// interpreter flags by default.
pub struct PhpAdapter;

#[async_trait]
impl LanguageAdapter for PhpAdapter {
    fn language(&self) -> &'static str {
        "php"
    }

    fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            defaults: ResolvedParams {
                interpreter_args: vec![RESTRICTED_FLAG.to_string()],
                ..ResolvedParams::generic()
            },
            floors: Floors::default(),
        }
    }

    fn default_file_name(&self, _source: &str) -> NameResolution {
        NameResolution::fixed(DEFAULT_FILE)
    }

    async fn compile(
        &self,
        ctx: &TaskContext,
        executor: &dyn SandboxExecutor,
    ) -> Result<CompileOutcome> {
        lint_compile(ctx, executor).await
    }

    fn executable_path(&self) -> &'static str {
        PHP_PATH
    }

    fn version_probe(&self) -> VersionProbe {
        php_version_probe()
    }
}

/// Legacy-generation PHP adapter: explicit memory floor, no injected
/// interpreter flags.
pub struct LegacyPhpAdapter;

#[async_trait]
impl LanguageAdapter for LegacyPhpAdapter {
    fn language(&self) -> &'static str {
        "php5"
    }

    fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            defaults: ResolvedParams {
                memory_limit: LEGACY_MIN_MEMORY_LIMIT,
                ..ResolvedParams::generic()
            },
            floors: Floors {
                memory_limit: Some(LEGACY_MIN_MEMORY_LIMIT),
                ..Floors::default()
            },
        }
    }

    fn default_file_name(&self, _source: &str) -> NameResolution {
        NameResolution::fixed(DEFAULT_FILE)
    }

    async fn compile(
        &self,
        ctx: &TaskContext,
        executor: &dyn SandboxExecutor,
    ) -> Result<CompileOutcome> {
        lint_compile(ctx, executor).await
    }

    fn executable_path(&self) -> &'static str {
        PHP_PATH
    }

    fn version_probe(&self) -> VersionProbe {
        php_version_probe()
    }
}
