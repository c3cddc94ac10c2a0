use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::ReentrantMutex;
use thiserror::Error;

mod logging;
mod schema;
mod validation;

pub use logging::{init_tracing, LoggingConfig};
pub use schema::json_schema;

/// Top-level `veil.toml` configuration.
///
/// ```toml
/// [logging]
/// level = "info"
///
/// [rename]
/// share_overloads = false
/// dictionary = "alphabet"
/// flatten_package = "z"
///
/// [[keep]]
/// class = "com/example/api/**"
/// members = true
///
/// [platform]
/// builtin = true
/// stubs = ["./jdk-stubs.json"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VeilConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// What gets renamed and how new names are drawn.
    #[serde(default)]
    pub rename: RenameConfig,

    /// Classes and members that keep their names.
    #[serde(default)]
    pub keep: Vec<KeepRuleConfig>,

    /// Where platform (JDK) class stubs come from.
    #[serde(default)]
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryKind {
    /// `a`, `b`, ..., `z`, `aa`, `ab`, ... over [`RenameConfig::alphabet`].
    #[default]
    Alphabet,
    /// Words from [`RenameConfig::words`], one per line, in file order.
    Words,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenameConfig {
    #[serde(default = "default_true")]
    pub classes: bool,
    #[serde(default = "default_true")]
    pub fields: bool,
    #[serde(default = "default_true")]
    pub methods: bool,

    /// Allow members with different descriptors to share a name.
    #[serde(default)]
    pub share_overloads: bool,

    #[serde(default)]
    pub dictionary: DictionaryKind,

    /// Symbols used by the `alphabet` dictionary. Defaults to `a-z`.
    #[serde(default)]
    pub alphabet: Option<String>,

    /// Word list used by the `words` dictionary.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub words: Option<PathBuf>,

    /// Move renamed top-level classes into this package (`""` for the default package).
    #[serde(default)]
    pub flatten_package: Option<String>,

    /// Keep `public static void main(String[])` methods.
    #[serde(default = "default_true")]
    pub keep_main: bool,

    /// Resolve member edges on a thread pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            classes: true,
            fields: true,
            methods: true,
            share_overloads: false,
            dictionary: DictionaryKind::default(),
            alphabet: None,
            words: None,
            flatten_package: None,
            keep_main: true,
            parallel: true,
        }
    }
}

/// One `[[keep]]` entry.
///
/// `class` is a glob over internal names where `*` stays inside one package
/// and `**` crosses packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeepRuleConfig {
    pub class: String,

    /// Glob over member names. Setting it keeps only matching members, not the class name.
    #[serde(default)]
    pub member: Option<String>,

    /// Keep every member of matching classes as well.
    #[serde(default)]
    pub members: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Use the built-in minimal `java.lang` stubs.
    #[serde(default = "default_true")]
    pub builtin: bool,

    /// Extra platform stub dumps (JSON arrays of class stubs), relative to the config file.
    #[serde(default)]
    #[schemars(with = "Vec<String>")]
    pub stubs: Vec<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            stubs: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{toml_path}`: {message}")]
    InvalidValue { toml_path: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        let message = err.message().trim().to_string();
        match err.span() {
            Some(span) => ConfigError::Toml(format!("{message} (at byte {})", span.start)),
            None => ConfigError::Toml(message),
        }
    }
}

impl VeilConfig {
    /// Load and validate a config file.
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::load_from_str(&text)?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        tracing::debug!(target: "veil.config", path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a config from TOML text.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: VeilConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(words) = &mut self.rename.words {
            if words.is_relative() {
                *words = base.join(&*words);
            }
        }
        for stub in &mut self.platform.stubs {
            if stub.is_relative() {
                *stub = base.join(&*stub);
            }
        }
    }
}

pub const VEIL_CONFIG_ENV_VAR: &str = "VEIL_CONFIG_PATH";

pub const CONFIG_FILE_NAME: &str = "veil.toml";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Tests that set [`VEIL_CONFIG_ENV_VAR`] wrap the mutation and the discovery
/// call in this so concurrent tests never observe each other's override.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Find the config file for `dir`.
///
/// `VEIL_CONFIG_PATH` (absolute or relative to `dir`) wins over `veil.toml` in `dir`.
pub fn discover_config_path(dir: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(VEIL_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            dir.join(candidate)
        };
        return Some(path);
    }

    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

/// Load the config for `dir`, or the defaults when there is none.
pub fn load_for_dir(dir: &Path) -> Result<(VeilConfig, Option<PathBuf>), ConfigError> {
    match discover_config_path(dir) {
        Some(path) => Ok((VeilConfig::load_from_path(&path)?, Some(path))),
        None => {
            tracing::debug!(target: "veil.config", dir = %dir.display(), "no config file, using defaults");
            Ok((VeilConfig::default(), None))
        }
    }
}
