//! Collision-free name assignment.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use veil_classfile::{outer_class_of, package_of};
use veil_hierarchy::{
    ClassId, Diagnostic, Diagnostics, MemberKind, ProviderChain, RenameFamily, SkipReason,
    SymbolGraph,
};

use crate::error::{RemapError, Result};
use crate::keep::KeepRules;
use crate::mapping::NameMapping;
use crate::names::NameGenerator;
use crate::pipeline::RemapOptions;
use crate::registry::NameRegistry;

/// Why a family keeps its original name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinReason {
    /// Renaming of this member kind is switched off.
    Disabled,
    /// Declared or overridden from outside the program.
    Library,
    Native,
    Initializer,
    /// Compiler-generated `values()`/`valueOf(String)` of an enum.
    EnumAccessor,
    AnnotationElement,
    EntryPoint,
    KeepRule,
}

impl fmt::Display for PinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PinReason::Disabled => "renaming disabled",
            PinReason::Library => "library member",
            PinReason::Native => "native method",
            PinReason::Initializer => "initializer",
            PinReason::EnumAccessor => "enum accessor",
            PinReason::AnnotationElement => "annotation element",
            PinReason::EntryPoint => "entry point",
            PinReason::KeepRule => "keep rule",
        };
        f.write_str(s)
    }
}

/// Per-family outcome of the first planning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyDecision {
    Rename,
    Pinned(PinReason),
    /// Touches classes depending on missing types.
    Skipped { tainted: Vec<String> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub renamed: usize,
    pub pinned: usize,
    pub skipped: usize,
}

/// Assigns new names to classes and member families.
pub struct RenamePlanner<'a> {
    options: &'a RemapOptions,
    keep: &'a KeepRules,
}

impl<'a> RenamePlanner<'a> {
    pub fn new(options: &'a RemapOptions, keep: &'a KeepRules) -> Self {
        Self { options, keep }
    }

    /// Name every renamable program class. Each class is a singleton family;
    /// nested classes stay prefixed by their (possibly renamed) outer class.
    ///
    /// With `flatten_package` set, a package only moves when every program
    /// class in it is renamed; otherwise its classes are renamed in place and
    /// an [`Diagnostic::UnflattenedPackage`] is reported.
    pub fn plan_classes(
        &self,
        graph: &SymbolGraph,
        providers: &ProviderChain,
        generator: &mut dyn NameGenerator,
        diagnostics: &mut Diagnostics,
        mapping: &mut NameMapping,
    ) -> Result<usize> {
        if !self.options.rename_classes {
            return Ok(0);
        }

        let mut program: Vec<&str> = graph
            .class_ids()
            .map(|id| graph.class(id))
            .filter(|class| class.is_program())
            .map(|class| class.name())
            .collect();
        // Sorting puts every outer class before its nested classes.
        program.sort_unstable();

        let mut taken: HashSet<String> = graph
            .class_ids()
            .map(|id| graph.class(id).name().to_string())
            .collect();

        let anchored = self.anchored_packages(graph, &program);
        let mut held_back: BTreeSet<&str> = BTreeSet::new();

        let mut renamed = 0;
        for name in program {
            let Some(id) = graph.class_id(name) else {
                continue;
            };
            if graph.class(id).is_tainted() {
                tracing::debug!(
                    target: "veil.remap",
                    class = name,
                    "keeping class that depends on a missing type"
                );
                continue;
            }
            if self.keep.keeps_class(name) {
                tracing::trace!(target: "veil.remap", class = name, "class kept by rule");
                continue;
            }

            let package = package_of(name);
            if anchored.contains_key(package) {
                held_back.insert(package);
            }
            let prefix = self.class_prefix(graph, name, &anchored, mapping);
            generator.reset();
            let mut attempts = 0usize;
            let new_name = loop {
                let simple = generator
                    .next_name()
                    .ok_or_else(|| RemapError::DictionaryExhausted {
                        target: name.to_string(),
                        attempts,
                    })?;
                attempts += 1;
                let candidate = format!("{prefix}{simple}");
                if !taken.contains(&candidate) && !providers.knows(&candidate) {
                    break candidate;
                }
            };

            tracing::trace!(target: "veil.remap", class = name, new_name = %new_name, "renamed class");
            taken.insert(new_name.clone());
            mapping.insert(name, new_name);
            renamed += 1;
        }

        if let Some(target) = self.options.flatten_package.as_deref() {
            for package in held_back {
                let anchored_by = anchored.get(package).cloned().unwrap_or_default();
                tracing::warn!(
                    target: "veil.remap",
                    package,
                    flatten_package = target,
                    anchored_by = ?anchored_by,
                    "package not flattened; some of its classes keep their names"
                );
                diagnostics.push(Diagnostic::UnflattenedPackage {
                    package: package.to_string(),
                    target: target.to_string(),
                    anchored_by,
                });
            }
        }

        tracing::info!(target: "veil.remap", renamed, "planned class names");
        Ok(renamed)
    }

    /// Packages holding a program class that keeps its name, with those
    /// classes. Empty unless flattening is requested.
    fn anchored_packages<'g>(
        &self,
        graph: &SymbolGraph,
        program: &[&'g str],
    ) -> BTreeMap<&'g str, Vec<String>> {
        let mut anchored: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let Some(target) = self.options.flatten_package.as_deref() else {
            return anchored;
        };
        for &name in program {
            let package = package_of(name);
            if package == target {
                continue;
            }
            let stays = graph
                .class_by_name(name)
                .map_or(true, |class| class.is_tainted())
                || self.keep.keeps_class(name);
            if stays {
                anchored.entry(package).or_default().push(name.to_string());
            }
        }
        anchored
    }

    fn class_prefix(
        &self,
        graph: &SymbolGraph,
        name: &str,
        anchored: &BTreeMap<&str, Vec<String>>,
        mapping: &NameMapping,
    ) -> String {
        if let Some(outer) = outer_class_of(name) {
            if graph.class_by_name(outer).is_some_and(|class| class.is_program()) {
                let outer = mapping.class(outer).unwrap_or(outer);
                return format!("{outer}$");
            }
        }
        let original = package_of(name);
        let package = match self.options.flatten_package.as_deref() {
            Some(target) if !anchored.contains_key(original) => target,
            _ => original,
        };
        if package.is_empty() {
            String::new()
        } else {
            format!("{package}/")
        }
    }

    /// Decide whether `family` may be renamed at all.
    pub fn decide(&self, graph: &SymbolGraph, family: &RenameFamily) -> FamilyDecision {
        if let Some(reason) = self.pin_reason(graph, family) {
            return FamilyDecision::Pinned(reason);
        }
        let tainted: Vec<String> = family
            .touched_classes(graph)
            .into_iter()
            .map(|id| graph.class(id))
            .filter(|class| class.is_tainted())
            .map(|class| class.name().to_string())
            .collect();
        if tainted.is_empty() {
            FamilyDecision::Rename
        } else {
            FamilyDecision::Skipped { tainted }
        }
    }

    fn pin_reason(&self, graph: &SymbolGraph, family: &RenameFamily) -> Option<PinReason> {
        let enabled = match family.kind {
            MemberKind::Field => self.options.rename_fields,
            MemberKind::Method => self.options.rename_methods,
        };
        if !enabled {
            return Some(PinReason::Disabled);
        }

        family.members.iter().find_map(|&id| {
            let member = graph.member(id);
            let owner = graph.class(member.owner());
            let is_method = member.kind() == MemberKind::Method;
            if !owner.is_program() {
                Some(PinReason::Library)
            } else if member.is_native() {
                Some(PinReason::Native)
            } else if member.is_initializer() {
                Some(PinReason::Initializer)
            } else if is_method
                && owner.access().is_enum()
                && is_enum_accessor(owner.name(), member.name(), member.descriptor())
            {
                Some(PinReason::EnumAccessor)
            } else if is_method && owner.access().is_annotation() {
                Some(PinReason::AnnotationElement)
            } else if is_method
                && self.options.keep_main
                && member.name() == "main"
                && member.descriptor() == "([Ljava/lang/String;)V"
                && member.is_static()
                && member.access().is_public()
            {
                Some(PinReason::EntryPoint)
            } else if self.keep.keeps_member(owner.name(), member.name()) {
                Some(PinReason::KeepRule)
            } else {
                None
            }
        })
    }

    /// Assign one new name per renamable family.
    ///
    /// Names of families that stay (pinned or skipped) are reserved first in
    /// their owners and every descendant, so no generated name can
    /// accidentally override or hide them.
    pub fn plan(
        &self,
        graph: &SymbolGraph,
        families: &[RenameFamily],
        generator: &mut dyn NameGenerator,
        diagnostics: &mut Diagnostics,
        mapping: &mut NameMapping,
    ) -> Result<PlanSummary> {
        let mut registry = NameRegistry::new();
        let mut summary = PlanSummary::default();
        let mut renamable = Vec::new();

        for family in families {
            let touched = family.touched_classes(graph);
            match self.decide(graph, family) {
                FamilyDecision::Rename => {
                    renamable.push((family, touched));
                    continue;
                }
                FamilyDecision::Pinned(reason) => {
                    summary.pinned += 1;
                    tracing::trace!(
                        target: "veil.remap",
                        family = %graph.describe_member(family.sources[0]),
                        reason = %reason,
                        "family pinned"
                    );
                }
                FamilyDecision::Skipped { tainted } => {
                    summary.skipped += 1;
                    self.report_skipped(graph, family, tainted, diagnostics);
                }
            }
            reserve(&mut registry, family, &touched);
        }

        for (family, touched) in renamable {
            let name = self.draw_name(&registry, graph, family, &touched, generator)?;
            reserve_as(&mut registry, family, &touched, &name);
            for &member in &family.members {
                mapping.insert(graph.describe_member(member), name.clone());
            }
            tracing::trace!(
                target: "veil.remap",
                family = %graph.describe_member(family.sources[0]),
                members = family.members.len(),
                new_name = %name,
                "renamed family"
            );
            summary.renamed += 1;
        }

        tracing::info!(
            target: "veil.remap",
            renamed = summary.renamed,
            pinned = summary.pinned,
            skipped = summary.skipped,
            "planned member names"
        );
        Ok(summary)
    }

    fn draw_name(
        &self,
        registry: &NameRegistry,
        graph: &SymbolGraph,
        family: &RenameFamily,
        touched: &BTreeSet<ClassId>,
        generator: &mut dyn NameGenerator,
    ) -> Result<String> {
        let share = self.options.share_overloads;
        generator.reset();
        let mut attempts = 0usize;
        loop {
            let candidate = if share {
                generator.next_name_for(&family.descriptor)
            } else {
                generator.next_name()
            };
            let Some(candidate) = candidate else {
                return Err(RemapError::DictionaryExhausted {
                    target: graph.describe_member(family.sources[0]),
                    attempts,
                });
            };
            attempts += 1;
            let free = touched.iter().all(|&owner| {
                registry.is_free(owner, family.kind, &candidate, &family.descriptor, share)
            });
            if free {
                return Ok(candidate);
            }
        }
    }

    fn report_skipped(
        &self,
        graph: &SymbolGraph,
        family: &RenameFamily,
        tainted: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        let members: Vec<String> = family
            .members
            .iter()
            .map(|&member| graph.describe_member(member))
            .collect();
        tracing::warn!(
            target: "veil.remap",
            family = %members.join(", "),
            tainted = %tainted.join(", "),
            "skipping family that touches classes depending on missing types"
        );
        diagnostics.push(Diagnostic::SkippedFamily {
            reason: SkipReason::DependsOnMissing,
            members,
            tainted,
        });
    }
}

fn is_enum_accessor(owner: &str, name: &str, descriptor: &str) -> bool {
    match name {
        "values" => descriptor.strip_prefix("()[L").and_then(|d| d.strip_suffix(';')) == Some(owner),
        "valueOf" => {
            descriptor
                .strip_prefix("(Ljava/lang/String;)L")
                .and_then(|d| d.strip_suffix(';'))
                == Some(owner)
        }
        _ => false,
    }
}

fn reserve(registry: &mut NameRegistry, family: &RenameFamily, touched: &BTreeSet<ClassId>) {
    reserve_as(registry, family, touched, &family.name);
}

fn reserve_as(
    registry: &mut NameRegistry,
    family: &RenameFamily,
    touched: &BTreeSet<ClassId>,
    name: &str,
) {
    for &owner in touched {
        registry.reserve(owner, family.kind, name, &family.descriptor);
    }
}
