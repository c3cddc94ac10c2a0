//! Platform class stubs.
//!
//! `JdkIndex::new()` provides a small built-in index covering the platform
//! types most programs inherit from, so hierarchies close without a system
//! JDK. Richer platforms are described by JSON dumps of [`ClassStub`]s and
//! merged with [`JdkIndex::load_json`].

#![forbid(unsafe_code)]

mod builtin;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use veil_classfile::ClassStub;
use veil_hierarchy::SymbolProvider;

#[derive(Debug, Error)]
pub enum JdkIndexError {
    #[error("failed to read platform stubs `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse platform stubs `{path}`: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid platform stub: {0}")]
    ClassFile(#[from] veil_classfile::Error),
}

#[derive(Debug, Clone, Default)]
pub struct JdkIndex {
    stubs: HashMap<String, Arc<ClassStub>>,
}

impl JdkIndex {
    /// Construct the built-in index (no disk IO, no system JDK required).
    pub fn new() -> Self {
        let mut this = Self::empty();
        for stub in builtin::stubs() {
            this.insert(stub);
        }
        this
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace a stub.
    pub fn insert(&mut self, stub: ClassStub) {
        self.stubs
            .insert(stub.internal_name.clone(), Arc::new(stub));
    }

    /// Merge the stubs of a JSON array file into this index. Stubs loaded later
    /// replace built-in ones with the same name.
    pub fn load_json(&mut self, path: impl AsRef<Path>) -> Result<usize, JdkIndexError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| JdkIndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stubs: Vec<ClassStub> =
            serde_json::from_str(&text).map_err(|source| JdkIndexError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let loaded = self.extend(stubs)?;
        tracing::debug!(
            target: "veil.jdk",
            path = %path.display(),
            loaded,
            "loaded platform stubs"
        );
        Ok(loaded)
    }

    /// Validate and insert `stubs`, returning how many were added.
    pub fn extend(&mut self, stubs: impl IntoIterator<Item = ClassStub>) -> Result<usize, JdkIndexError> {
        let mut loaded = 0;
        for stub in stubs {
            stub.validate()?;
            self.insert(stub);
            loaded += 1;
        }
        Ok(loaded)
    }

    pub fn lookup_type(&self, internal_name: &str) -> Option<&ClassStub> {
        self.stubs.get(internal_name).map(Arc::as_ref)
    }

    pub fn contains(&self, internal_name: &str) -> bool {
        self.stubs.contains_key(internal_name)
    }

    pub fn len(&self) -> usize {
        self.stubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stubs.is_empty()
    }

    /// Every internal name under `package` (internal form, `java/lang`), sorted.
    pub fn types_in_package(&self, package: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .stubs
            .values()
            .filter(|stub| stub.package_name() == package)
            .map(|stub| stub.internal_name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl SymbolProvider for JdkIndex {
    fn lookup(&self, internal_name: &str) -> Option<Arc<ClassStub>> {
        self.stubs.get(internal_name).cloned()
    }
}
