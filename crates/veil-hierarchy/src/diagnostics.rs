use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Why a rename family kept its original names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A member's owner, or a class inheriting from one, depends on a missing class.
    DependsOnMissing,
}

/// A structured record produced while analysing or renaming a program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// `class` could not be resolved by any provider.
    MissingDependency {
        class: String,
        required_by: Vec<String>,
    },
    /// The declared superclass/interface chain of `class` loops back through `via`.
    CyclicHierarchy { class: String, via: String },
    /// Classification produced no trusted source; the member became its own source.
    ZeroSourceMember { member: String },
    /// A rename family was left untouched.
    SkippedFamily {
        reason: SkipReason,
        members: Vec<String>,
        tainted: Vec<String>,
    },
    /// Two dynamic call sites with the same apparent signature resolved to
    /// different new names; the first one wins.
    ConflictingCallSite {
        key: String,
        kept: String,
        rejected: String,
    },
    /// Package flattening was refused for `package` because some of its
    /// program classes keep their names and would lose package access to
    /// the moved ones.
    UnflattenedPackage {
        package: String,
        target: String,
        anchored_by: Vec<String>,
    },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::MissingDependency { .. } => Severity::Warning,
            Diagnostic::CyclicHierarchy { .. } => Severity::Error,
            Diagnostic::ZeroSourceMember { .. } => Severity::Error,
            Diagnostic::SkippedFamily { .. } => Severity::Info,
            Diagnostic::ConflictingCallSite { .. } => Severity::Error,
            Diagnostic::UnflattenedPackage { .. } => Severity::Warning,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::MissingDependency { .. } => "missing-dependency",
            Diagnostic::CyclicHierarchy { .. } => "cyclic-hierarchy",
            Diagnostic::ZeroSourceMember { .. } => "zero-source-member",
            Diagnostic::SkippedFamily { .. } => "skipped-family",
            Diagnostic::ConflictingCallSite { .. } => "conflicting-call-site",
            Diagnostic::UnflattenedPackage { .. } => "unflattened-package",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingDependency { class, required_by } => write!(
                f,
                "missing dependency {class}, required by {}",
                required_by.join(", ")
            ),
            Diagnostic::CyclicHierarchy { class, via } => {
                write!(f, "cyclic hierarchy: {class} inherits from itself via {via}")
            }
            Diagnostic::ZeroSourceMember { member } => {
                write!(f, "no source declaration found for {member}")
            }
            Diagnostic::SkippedFamily {
                members, tainted, ..
            } => write!(
                f,
                "skipped family [{}]: touches classes depending on missing types [{}]",
                members.join(", "),
                tainted.join(", ")
            ),
            Diagnostic::ConflictingCallSite {
                key,
                kept,
                rejected,
            } => write!(
                f,
                "dynamic call site {key} resolves to both {kept} and {rejected}; keeping {kept}"
            ),
            Diagnostic::UnflattenedPackage {
                package,
                target,
                anchored_by,
            } => write!(
                f,
                "package {package} not flattened into {target}: [{}] keep their names",
                anchored_by.join(", ")
            ),
        }
    }
}

/// Collector for every diagnostic raised during one run.
///
/// Missing dependencies are aggregated per missing class so rebuilding the
/// graph for a later stage does not duplicate them.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    missing: BTreeMap<String, BTreeSet<String>>,
    cycles: BTreeSet<(String, String)>,
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_dependency(&mut self, class: &str, required_by: &str) {
        self.missing
            .entry(class.to_string())
            .or_default()
            .insert(required_by.to_string());
    }

    pub fn cyclic_hierarchy(&mut self, class: &str, via: &str) {
        self.cycles.insert((class.to_string(), via.to_string()));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.records.contains(&diagnostic) {
            self.records.push(diagnostic);
        }
    }

    /// Classes that some provider failed to resolve, with their direct dependents.
    pub fn missing(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.missing
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.cycles.is_empty() && self.records.is_empty()
    }

    /// Every diagnostic, missing dependencies first, then cycles, then the rest
    /// in the order they were raised.
    pub fn to_vec(&self) -> Vec<Diagnostic> {
        let mut out = Vec::with_capacity(self.missing.len() + self.cycles.len() + self.records.len());
        out.extend(
            self.missing
                .iter()
                .map(|(class, required_by)| Diagnostic::MissingDependency {
                    class: class.clone(),
                    required_by: required_by.iter().cloned().collect(),
                }),
        );
        out.extend(self.cycles.iter().map(|(class, via)| Diagnostic::CyclicHierarchy {
            class: class.clone(),
            via: via.clone(),
        }));
        out.extend(self.records.iter().cloned());
        out
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.to_vec()
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }
}
