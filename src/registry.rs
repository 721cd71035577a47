//! Adapter registry
//!
//! Maps language ids (and their aliases) to the adapter implementing
//! that toolchain's policy. Lookup is case-insensitive.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::adapter::maven::MavenAdapter;
use crate::adapter::php::{LegacyPhpAdapter, PhpAdapter};
use crate::adapter::shell::ShellAdapter;
use crate::adapter::{LanguageAdapter, VersionProbe};

/// Global adapter registry
static ADAPTERS: OnceLock<HashMap<String, Arc<dyn LanguageAdapter>>> = OnceLock::new();

fn builtin_adapters() -> HashMap<String, Arc<dyn LanguageAdapter>> {
    let mut adapters: HashMap<String, Arc<dyn LanguageAdapter>> = HashMap::new();

    let mut register = |adapter: Arc<dyn LanguageAdapter>, aliases: &[&str]| {
        adapters.insert(adapter.language().to_lowercase(), adapter.clone());
        for alias in aliases {
            adapters.insert(alias.to_lowercase(), adapter.clone());
        }
    };

    register(Arc::new(MavenAdapter), &["maven"]);
    register(Arc::new(PhpAdapter), &["php7"]);
    register(Arc::new(LegacyPhpAdapter), &[]);
    register(Arc::new(ShellAdapter), &["bash"]);

    adapters
}

fn registry() -> &'static HashMap<String, Arc<dyn LanguageAdapter>> {
    ADAPTERS.get_or_init(builtin_adapters)
}

/// Get the adapter for a language id or alias.
pub fn get_adapter(language: &str) -> Option<Arc<dyn LanguageAdapter>> {
    registry().get(&language.to_lowercase()).cloned()
}

/// All registered language ids and aliases.
pub fn supported_languages() -> Vec<String> {
    let mut languages: Vec<String> = registry().keys().cloned().collect();
    languages.sort();
    languages
}

/// Version probe for a language, for the external version cache.
pub fn version_command(language: &str) -> Option<VersionProbe> {
    get_adapter(language).map(|adapter| adapter.version_probe())
}
