use std::collections::HashMap;
use std::sync::Arc;

use veil_classfile::ClassStub;

use crate::graph::Origin;

/// Source of class declarations.
///
/// Implementations return `None` for names they cannot resolve; an unknown
/// name is an expected outcome, never an error.
pub trait SymbolProvider {
    fn lookup(&self, internal_name: &str) -> Option<Arc<ClassStub>>;
}

impl<T: SymbolProvider + ?Sized> SymbolProvider for &T {
    fn lookup(&self, internal_name: &str) -> Option<Arc<ClassStub>> {
        (**self).lookup(internal_name)
    }
}

impl<T: SymbolProvider + ?Sized> SymbolProvider for Box<T> {
    fn lookup(&self, internal_name: &str) -> Option<Arc<ClassStub>> {
        (**self).lookup(internal_name)
    }
}

impl<T: SymbolProvider + ?Sized> SymbolProvider for Arc<T> {
    fn lookup(&self, internal_name: &str) -> Option<Arc<ClassStub>> {
        (**self).lookup(internal_name)
    }
}

/// In-memory provider keyed by internal name.
#[derive(Debug, Clone, Default)]
pub struct StubSet {
    stubs: HashMap<String, Arc<ClassStub>>,
}

impl StubSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stub, returning the one it replaced.
    pub fn insert(&mut self, stub: ClassStub) -> Option<Arc<ClassStub>> {
        self.stubs
            .insert(stub.internal_name.clone(), Arc::new(stub))
    }

    pub fn get(&self, internal_name: &str) -> Option<&ClassStub> {
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

    /// Internal names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stubs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Stubs in internal-name order.
    pub fn stubs(&self) -> Vec<&ClassStub> {
        self.names()
            .into_iter()
            .filter_map(|name| self.get(name))
            .collect()
    }
}

impl FromIterator<ClassStub> for StubSet {
    fn from_iter<I: IntoIterator<Item = ClassStub>>(iter: I) -> Self {
        let mut set = StubSet::new();
        for stub in iter {
            set.insert(stub);
        }
        set
    }
}

impl SymbolProvider for StubSet {
    fn lookup(&self, internal_name: &str) -> Option<Arc<ClassStub>> {
        self.stubs.get(internal_name).cloned()
    }
}

/// Providers queried in priority order: program, explicit libraries, then the
/// platform fallback.
pub struct ProviderChain {
    program: Box<dyn SymbolProvider>,
    libraries: Vec<Box<dyn SymbolProvider>>,
    platform: Option<Box<dyn SymbolProvider>>,
}

impl ProviderChain {
    pub fn new(program: impl SymbolProvider + 'static) -> Self {
        Self {
            program: Box::new(program),
            libraries: Vec::new(),
            platform: None,
        }
    }

    pub fn with_library(mut self, library: impl SymbolProvider + 'static) -> Self {
        self.libraries.push(Box::new(library));
        self
    }

    pub fn with_platform(mut self, platform: impl SymbolProvider + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    pub fn lookup(&self, internal_name: &str) -> Option<(Arc<ClassStub>, Origin)> {
        if let Some(stub) = self.program.lookup(internal_name) {
            return Some((stub, Origin::Program));
        }
        for library in &self.libraries {
            if let Some(stub) = library.lookup(internal_name) {
                return Some((stub, Origin::Library));
            }
        }
        self.platform
            .as_ref()
            .and_then(|platform| platform.lookup(internal_name))
            .map(|stub| (stub, Origin::Platform))
    }

    /// True when any provider knows `internal_name`.
    pub fn knows(&self, internal_name: &str) -> bool {
        self.lookup(internal_name).is_some()
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("libraries", &self.libraries.len())
            .field("platform", &self.platform.is_some())
            .finish_non_exhaustive()
    }
}
