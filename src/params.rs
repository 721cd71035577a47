//! Resource parameter merging
//!
//! Combines caller-supplied limit overrides with per-language defaults
//! and floors. A floor is only applied when the caller actually supplied
//! a value for that key; defaults are pre-chosen to satisfy their floors
//! and are never re-checked at merge time.

use serde::Deserialize;

/// Recognized parameter keys for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKey {
    /// Memory limit in bytes.
    MemoryLimit,
    /// CPU time limit in seconds.
    CpuTime,
    /// Maximum number of OS processes/threads.
    NumProcs,
    /// Opaque pass-through arguments for the compiler/build tool.
    CompileArgs,
    /// Opaque pass-through arguments for the interpreter.
    InterpreterArgs,
}

/// A merged parameter value, as returned by `get`-style accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(u64),
    Args(Vec<String>),
}

/// Caller-supplied parameter overrides, all optional.
///
/// Field names match the wire format of the submission surface.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamOverrides {
    #[serde(rename = "memorylimit")]
    pub memory_limit: Option<u64>,
    #[serde(rename = "cputime")]
    pub cpu_time: Option<u32>,
    #[serde(rename = "numprocs")]
    pub num_procs: Option<u32>,
    #[serde(rename = "compileargs")]
    pub compile_args: Option<Vec<String>>,
    #[serde(rename = "interpreterargs")]
    pub interpreter_args: Option<Vec<String>>,
}

/// Fully-merged effective parameter set for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParams {
    /// Memory limit in bytes.
    pub memory_limit: u64,
    /// CPU time limit in seconds.
    pub cpu_time: u32,
    /// Maximum number of OS processes/threads.
    pub num_procs: u32,
    pub compile_args: Vec<String>,
    pub interpreter_args: Vec<String>,
}

impl ResolvedParams {
    /// Service-wide defaults, used wherever an adapter declares no override.
    pub fn generic() -> Self {
        Self {
            memory_limit: 400_000_000,
            cpu_time: 3,
            num_procs: 20,
            compile_args: Vec::new(),
            interpreter_args: Vec::new(),
        }
    }

    /// Look up a merged value by key.
    pub fn get(&self, key: ParamKey) -> ParamValue {
        match key {
            ParamKey::MemoryLimit => ParamValue::Int(self.memory_limit),
            ParamKey::CpuTime => ParamValue::Int(self.cpu_time as u64),
            ParamKey::NumProcs => ParamValue::Int(self.num_procs as u64),
            ParamKey::CompileArgs => ParamValue::Args(self.compile_args.clone()),
            ParamKey::InterpreterArgs => ParamValue::Args(self.interpreter_args.clone()),
        }
    }
}

impl Default for ResolvedParams {
    fn default() -> Self {
        Self::generic()
    }
}

/// Minimum enforced values for the numeric limit keys.
///
/// A floor is applied only against a caller-supplied value; it never
/// raises an adapter default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Floors {
    pub memory_limit: Option<u64>,
    pub cpu_time: Option<u32>,
    pub num_procs: Option<u32>,
}

/// One adapter's resource policy: its defaults plus its floors.
#[derive(Debug, Clone, Default)]
pub struct LimitPolicy {
    pub defaults: ResolvedParams,
    pub floors: Floors,
}

/// Merge a single value: absent user value -> default; user value below
/// the floor -> floor; otherwise the user value wins.
pub fn effective<T: Ord>(user: Option<T>, floor: Option<T>, default: T) -> T {
    match user {
        None => default,
        Some(value) => match floor {
            Some(min) if value < min => min,
            _ => value,
        },
    }
}

/// Resolve the full parameter set for one submission against an
/// adapter's policy.
pub fn resolve(overrides: &ParamOverrides, policy: &LimitPolicy) -> ResolvedParams {
    let defaults = &policy.defaults;
    let floors = &policy.floors;

    ResolvedParams {
        memory_limit: effective(
            overrides.memory_limit,
            floors.memory_limit,
            defaults.memory_limit,
        ),
        cpu_time: effective(overrides.cpu_time, floors.cpu_time, defaults.cpu_time),
        num_procs: effective(overrides.num_procs, floors.num_procs, defaults.num_procs),
        compile_args: overrides
            .compile_args
            .clone()
            .unwrap_or_else(|| defaults.compile_args.clone()),
        interpreter_args: overrides
            .interpreter_args
            .clone()
            .unwrap_or_else(|| defaults.interpreter_args.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jvm_like_policy() -> LimitPolicy {
        LimitPolicy {
            defaults: ResolvedParams {
                memory_limit: 20_000_000,
                cpu_time: 30,
                num_procs: 256,
                ..ResolvedParams::generic()
            },
            floors: Floors {
                memory_limit: Some(20_000_000),
                cpu_time: Some(30),
                num_procs: Some(256),
            },
        }
    }

    #[test]
    fn absent_user_value_takes_default() {
        assert_eq!(effective(None, Some(10u32), 3), 3);
        assert_eq!(effective(None, None, 3u32), 3);
    }

    #[test]
    fn user_value_below_floor_is_raised() {
        assert_eq!(effective(Some(1u32), Some(10), 3), 10);
    }

    #[test]
    fn user_value_at_or_above_floor_wins() {
        assert_eq!(effective(Some(10u32), Some(10), 3), 10);
        assert_eq!(effective(Some(99u32), Some(10), 3), 99);
    }

    #[test]
    fn floor_never_applies_without_user_value() {
        // A floor higher than the default must not raise the default.
        assert_eq!(effective(None, Some(100u32), 3), 3);
    }

    #[test]
    fn resolve_applies_floors_per_key() {
        let overrides = ParamOverrides {
            memory_limit: Some(1_000),
            cpu_time: Some(60),
            num_procs: None,
            compile_args: None,
            interpreter_args: None,
        };
        let params = resolve(&overrides, &jvm_like_policy());

        assert_eq!(params.memory_limit, 20_000_000); // raised to floor
        assert_eq!(params.cpu_time, 60); // above floor, kept
        assert_eq!(params.num_procs, 256); // absent, default
    }

    #[test]
    fn resolve_without_floors_passes_user_values_through() {
        let overrides = ParamOverrides {
            memory_limit: Some(1_000),
            cpu_time: Some(1),
            num_procs: Some(1),
            compile_args: None,
            interpreter_args: None,
        };
        let params = resolve(&overrides, &LimitPolicy::default());

        assert_eq!(params.memory_limit, 1_000);
        assert_eq!(params.cpu_time, 1);
        assert_eq!(params.num_procs, 1);
    }

    #[test]
    fn arg_overrides_replace_defaults() {
        let policy = LimitPolicy {
            defaults: ResolvedParams {
                interpreter_args: vec!["--no-php-ini".into()],
                ..ResolvedParams::generic()
            },
            floors: Floors::default(),
        };

        let merged = resolve(&ParamOverrides::default(), &policy);
        assert_eq!(merged.interpreter_args, vec!["--no-php-ini".to_string()]);

        let overridden = resolve(
            &ParamOverrides {
                interpreter_args: Some(vec!["-d".into(), "error_reporting=0".into()]),
                ..ParamOverrides::default()
            },
            &policy,
        );
        assert_eq!(
            overridden.interpreter_args,
            vec!["-d".to_string(), "error_reporting=0".to_string()]
        );
    }

    #[test]
    fn get_param_by_key() {
        let params = resolve(&ParamOverrides::default(), &jvm_like_policy());
        assert_eq!(params.get(ParamKey::MemoryLimit), ParamValue::Int(20_000_000));
        assert_eq!(params.get(ParamKey::CpuTime), ParamValue::Int(30));
        assert_eq!(params.get(ParamKey::NumProcs), ParamValue::Int(256));
        assert_eq!(params.get(ParamKey::CompileArgs), ParamValue::Args(vec![]));
    }

    #[test]
    fn overrides_deserialize_with_wire_names() {
        let overrides: ParamOverrides =
            serde_json::from_str(r#"{"memorylimit": 20000000, "cputime": 30}"#).unwrap();
        assert_eq!(overrides.memory_limit, Some(20_000_000));
        assert_eq!(overrides.cpu_time, Some(30));
        assert_eq!(overrides.num_procs, None);
    }
}
