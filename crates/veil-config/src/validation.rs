use std::collections::HashSet;

use globset::GlobBuilder;

use crate::{ConfigError, DictionaryKind, VeilConfig};

impl VeilConfig {
    /// Check semantic invariants that the TOML shape cannot express.
    ///
    /// Stops at the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_rename(self)?;
        validate_keep(self)?;
        Ok(())
    }
}

fn invalid(toml_path: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        toml_path: toml_path.into(),
        message: message.into(),
    }
}

fn validate_rename(config: &VeilConfig) -> Result<(), ConfigError> {
    let rename = &config.rename;

    if rename.dictionary == DictionaryKind::Words && rename.words.is_none() {
        return Err(invalid(
            "rename.words",
            "required when `rename.dictionary = \"words\"`",
        ));
    }

    if let Some(alphabet) = &rename.alphabet {
        if alphabet.is_empty() {
            return Err(invalid("rename.alphabet", "must not be empty"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = alphabet.chars().find(|c| !seen.insert(*c)) {
            return Err(invalid(
                "rename.alphabet",
                format!("symbol {dup:?} appears more than once"),
            ));
        }
        if let Some(bad) = alphabet.chars().find(|c| is_reserved_in_names(*c)) {
            return Err(invalid(
                "rename.alphabet",
                format!("symbol {bad:?} cannot appear in a JVM name"),
            ));
        }
    }

    if let Some(package) = &rename.flatten_package {
        let malformed = package.starts_with('/')
            || package.ends_with('/')
            || package.contains("//")
            || package.chars().any(|c| c != '/' && is_reserved_in_names(c));
        if malformed {
            return Err(invalid(
                "rename.flatten_package",
                format!("{package:?} is not an internal package name (use `/` separators)"),
            ));
        }
    }

    Ok(())
}

fn validate_keep(config: &VeilConfig) -> Result<(), ConfigError> {
    for (idx, rule) in config.keep.iter().enumerate() {
        check_glob(&format!("keep[{idx}].class"), &rule.class)?;
        if let Some(member) = &rule.member {
            check_glob(&format!("keep[{idx}].member"), member)?;
        }
    }
    Ok(())
}

fn check_glob(toml_path: &str, pattern: &str) -> Result<(), ConfigError> {
    if pattern.contains('.') {
        return Err(invalid(
            toml_path,
            format!("{pattern:?} looks like a binary name; internal names use `/` between packages"),
        ));
    }
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|_| ())
        .map_err(|err| invalid(toml_path, err.to_string()))
}

fn is_reserved_in_names(c: char) -> bool {
    matches!(c, '.' | ';' | '[' | '/' | '<' | '>') || c.is_whitespace()
}
