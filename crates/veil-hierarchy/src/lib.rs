//! Class and member hierarchy analysis over an incomplete classpath.
//!
//! [`build_hierarchy`] resolves classes through a [`ProviderChain`], links
//! member override/hide edges, classifies every member's source declarations
//! and groups sources that must share a name. Problems in the input (missing
//! classes, cycles, members without a trusted source) are reported through
//! [`Diagnostics`] rather than failing the build.

#![forbid(unsafe_code)]

mod ancestry;
mod builder;
mod classify;
mod diagnostics;
mod dispatch;
mod family;
mod graph;
mod group;
mod ids;
mod lookup;
mod provider;

use thiserror::Error;

pub use crate::builder::HierarchyBuilder;
pub use crate::classify::{classify, classify_members, Classification};
pub use crate::diagnostics::{Diagnostic, Diagnostics, Severity, SkipReason};
pub use crate::dispatch::link_members;
pub use crate::family::{member_families, RenameFamily};
pub use crate::graph::{
    member_key, ClassSymbol, HierarchyMode, MemberKind, MemberSymbol, Origin, SymbolGraph,
};
pub use crate::group::group_members;
pub use crate::ids::{ClassId, MemberId};
pub use crate::provider::{ProviderChain, StubSet, SymbolProvider};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("unknown class {0}")]
    UnknownClass(String),
    #[error("class {0} could not be resolved by any provider")]
    MissingClass(String),
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub mode: HierarchyMode,
    /// Scan member edges on the rayon pool.
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            mode: HierarchyMode::Fast,
            parallel: true,
        }
    }
}

impl BuildOptions {
    pub fn new(mode: HierarchyMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Build a graph rooted at `roots` (typically every program class).
///
/// In [`HierarchyMode::Fields`] and [`HierarchyMode::Full`] the member phases
/// run too, so the returned graph is ready for [`member_families`].
pub fn build_hierarchy<'n>(
    providers: &ProviderChain,
    roots: impl IntoIterator<Item = &'n str>,
    options: BuildOptions,
    diagnostics: &mut Diagnostics,
) -> SymbolGraph {
    let mut builder = HierarchyBuilder::new(providers, options.mode, diagnostics);
    for root in roots {
        builder.resolve(root);
    }
    let mut graph = builder.finish();

    if options.mode.loads_fields() {
        link_members(&mut graph, options.parallel);
        classify_members(&mut graph, diagnostics);
        group_members(&mut graph);
    }

    tracing::info!(
        target: "veil.hierarchy",
        mode = ?options.mode,
        classes = graph.class_count(),
        members = graph.member_count(),
        "built hierarchy"
    );
    graph
}

impl SymbolGraph {
    /// Look up a class that must have been resolved by some provider.
    pub fn require(&self, name: &str) -> Result<ClassId, HierarchyError> {
        let id = self
            .class_id(name)
            .ok_or_else(|| HierarchyError::UnknownClass(name.to_string()))?;
        if self.class(id).is_missing() {
            return Err(HierarchyError::MissingClass(name.to_string()));
        }
        Ok(id)
    }
}
