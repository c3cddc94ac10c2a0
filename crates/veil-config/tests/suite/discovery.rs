use std::ffi::OsString;
use std::path::Path;

use tempfile::tempdir;
use veil_config::{
    discover_config_path, load_for_dir, with_config_env_lock, VeilConfig, VEIL_CONFIG_ENV_VAR,
};

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_veil_toml_in_the_directory() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(VEIL_CONFIG_ENV_VAR);
        let dir = tempdir().unwrap();
        assert_eq!(discover_config_path(dir.path()), None);

        let path = dir.path().join("veil.toml");
        std::fs::write(&path, "[rename]\nshare_overloads = true\n").unwrap();
        assert_eq!(discover_config_path(dir.path()), Some(path.clone()));

        let (config, found) = load_for_dir(dir.path()).unwrap();
        assert_eq!(found, Some(path));
        assert!(config.rename.share_overloads);
    });
}

#[test]
fn env_var_overrides_discovery() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("veil.toml"), "").unwrap();
        std::fs::write(
            dir.path().join("custom.toml"),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let _env = EnvVarGuard::set(VEIL_CONFIG_ENV_VAR, Path::new("custom.toml"));
        assert_eq!(
            discover_config_path(dir.path()),
            Some(dir.path().join("custom.toml"))
        );
        let (config, _) = load_for_dir(dir.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    });
}

#[test]
fn missing_config_yields_defaults() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(VEIL_CONFIG_ENV_VAR);
        let dir = tempdir().unwrap();
        let (config, found) = load_for_dir(dir.path()).unwrap();
        assert_eq!(found, None);
        assert_eq!(config, VeilConfig::default());
    });
}

#[test]
fn env_var_pointing_nowhere_is_an_error() {
    with_config_env_lock(|| {
        let dir = tempdir().unwrap();
        let _env = EnvVarGuard::set(VEIL_CONFIG_ENV_VAR, &dir.path().join("absent.toml"));
        let err = load_for_dir(dir.path()).unwrap_err();
        assert!(
            err.to_string().starts_with("failed to read config file"),
            "{err}"
        );
    });
}
