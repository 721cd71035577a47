//! Maven adapter - build-tool-managed Java submissions
//!
//! Compilation runs the build tool against an isolated, per-task local
//! repository cache; the build tool owns the output layout, so the
//! artifact reference stays the source file itself and the run step
//! re-invokes the tool's test phase.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use super::{CompileOutcome, LanguageAdapter, NameResolution, TaskContext, VersionProbe};
use crate::error::{Result, TaskError};
use crate::exec::{CommandSpec, ExecLimits, SandboxExecutor};
use crate::params::{Floors, LimitPolicy, ResolvedParams};
use crate::workspace;

const MVN_PATH: &str = "/usr/bin/mvn";

/// Placeholder used when no main class can be determined. The build is
/// still attempted and will almost certainly fail; that failure is the
/// intended signal.
const PLACEHOLDER_FILE: &str = "prog.java";

// The JVM needs many OS threads, high startup memory, and long warmup.
const MIN_NUM_PROCS: u32 = 256;
const MIN_MEMORY_LIMIT: u64 = 20_000_000;
const MIN_CPU_TIME: u32 = 30;

/// Scan for a public class whose body reaches a public static void
/// main(String...) declaration. A text scan, not a parser: commented-out
/// or quoted declarations can fool it, which is why anything other than
/// exactly one match is treated as undeterminable.
fn main_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?ms)(?:^|\W)public\s+class\s+(\w+)[^{]*\{.*?public\s+static\s+void\s+main\s*\(\s*String",
        )
        .expect("main class pattern is valid")
    })
}

/// Return the main class name iff the source contains exactly one match.
fn find_main_class(source: &str) -> Option<String> {
    let mut matches = main_class_regex().captures_iter(source);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first[1].to_string())
}

/// Adapter for Java submissions driven through Maven.
pub struct MavenAdapter;

#[async_trait]
impl LanguageAdapter for MavenAdapter {
    fn language(&self) -> &'static str {
        "mvn"
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

    fn class_oriented(&self) -> bool {
        true
    }

    fn default_file_name(&self, source: &str) -> NameResolution {
        match find_main_class(source) {
            Some(class) => NameResolution::fixed(format!("{}.java", class)),
            None => NameResolution::fallback(
                PLACEHOLDER_FILE,
                format!(
                    "WARNING: can't determine main class, so source file has been named \
                     '{}', which probably won't compile.",
                    PLACEHOLDER_FILE
                ),
            ),
        }
    }

    async fn compile(
        &self,
        ctx: &TaskContext,
        executor: &dyn SandboxExecutor,
    ) -> Result<CompileOutcome> {
        let repo = ctx.work_dir.join("m2a");

        let mut args = vec![format!("-Dmaven.repo.local={}", repo.display())];
        args.extend(ctx.params.compile_args.iter().cloned());
        args.extend([
            "clean".to_string(),
            "make".to_string(),
            ctx.source_file.clone(),
        ]);

        let cmd = CommandSpec::new(MVN_PATH)
            .with_args(args)
            .with_work_dir(&ctx.work_dir);
        let limits = ExecLimits::from_params(&ctx.params);

        debug!("Building {} with {:?}", ctx.source_file, cmd.to_vec());

        let outcome = executor
            .execute(&cmd, &limits, None)
            .await
            .map_err(TaskError::Executor)?;

        // The build tool splits its log across both streams; the
        // diagnostics file gets the combined text.
        workspace::write_diagnostics(&ctx.work_dir, &outcome.combined_output()).await?;

        if outcome.is_success() {
            Ok(CompileOutcome::Compiled {
                executable: ctx.source_file.clone(),
            })
        } else {
            Ok(CompileOutcome::Failed {
                diagnostics: workspace::read_diagnostics(&ctx.work_dir).await,
            })
        }
    }

    fn run_command(&self, ctx: &TaskContext) -> Vec<String> {
        // The run-phase repository cache differs from the compile one
        // (m2 vs m2a), mirroring the deployed toolchain layout.
        vec![
            MVN_PATH.to_string(),
            format!("-Dmaven.repo.local={}", ctx.work_dir.join("m2").display()),
            "test".to_string(),
        ]
    }

    fn executable_path(&self) -> &'static str {
        MVN_PATH
    }

    fn target_file(&self, ctx: &TaskContext) -> String {
        ctx.entry_point
            .clone()
            .unwrap_or_else(|| ctx.source_file.clone())
    }

    fn version_probe(&self) -> VersionProbe {
        VersionProbe::new("/usr/bin/mvn -version", r#"Apache Maven "?([0-9._]*)"#)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamOverrides;
    use std::path::PathBuf;

    const VALID_MAIN: &str = r#"
public class Main {
    public static void main(String[] args) {
        System.out.println("hi");
    }
}
"#;

    fn ctx(work_dir: PathBuf, source_file: &str, entry_point: Option<&str>) -> TaskContext {
        TaskContext {
            work_dir,
            source_file: source_file.to_string(),
            entry_point: entry_point.map(str::to_string),
            params: crate::params::resolve(
                &ParamOverrides::default(),
                &MavenAdapter.limit_policy(),
            ),
        }
    }

    #[test]
    fn single_main_class_names_the_file() {
        let resolution = MavenAdapter.default_file_name(VALID_MAIN);
        assert_eq!(resolution.file_name, "Main.java");
        assert!(resolution.warning.is_none());
    }

    #[test]
    fn no_main_class_falls_back_with_warning() {
        let resolution = MavenAdapter.default_file_name("public class Foo {}");
        assert_eq!(resolution.file_name, "prog.java");
        assert!(resolution.warning.unwrap().contains("can't determine main class"));
    }

    #[test]
    fn multiple_main_classes_are_ambiguous() {
        let source = format!(
            "{}\npublic class Other {{ public static void main(String[] a) {{}} }}",
            VALID_MAIN
        );
        let resolution = MavenAdapter.default_file_name(&source);
        assert_eq!(resolution.file_name, "prog.java");
        assert!(resolution.warning.is_some());
    }

    #[test]
    fn scan_is_fooled_by_commented_declarations() {
        // Accepted limitation: the scan reads raw text, so a
        // commented-out entry class still counts as a candidate.
        let source = format!(
            "// public class Ghost {{ public static void main(String[] a) {{}} }}\n{}",
            VALID_MAIN
        );
        let resolution = MavenAdapter.default_file_name(&source);
        assert_eq!(resolution.file_name, "prog.java");
    }

    #[test]
    fn floors_meet_the_jvm_minimums() {
        let params = crate::params::resolve(
            &ParamOverrides {
                memory_limit: Some(1),
                cpu_time: Some(1),
                num_procs: Some(1),
                ..ParamOverrides::default()
            },
            &MavenAdapter.limit_policy(),
        );
        assert_eq!(params.memory_limit, 20_000_000);
        assert_eq!(params.cpu_time, 30);
        assert_eq!(params.num_procs, 256);
    }

    #[test]
    fn run_command_keeps_three_token_grouping() {
        let ctx = ctx(PathBuf::from("/work/t1"), "Main.java", Some("Main"));
        let cmd = MavenAdapter.run_command(&ctx);
        assert_eq!(
            cmd,
            vec![
                "/usr/bin/mvn".to_string(),
                "-Dmaven.repo.local=/work/t1/m2".to_string(),
                "test".to_string(),
            ]
        );
    }

    #[test]
    fn target_is_the_entry_point_name() {
        let ctx = ctx(PathBuf::from("/work/t1"), "Main.java", Some("Main"));
        assert_eq!(MavenAdapter.target_file(&ctx), "Main");
    }

    #[test]
    fn version_probe_matches_maven_banner() {
        let probe = MavenAdapter.version_probe();
        let banner = "Apache Maven 3.8.7 (b89d5959fcde851dcb1c8946a785a163f14f1e29)";
        assert_eq!(probe.extract(banner), Some("3.8.7".to_string()));
    }
}
