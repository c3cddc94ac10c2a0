//! Member-level override/hide edges.

use std::collections::BTreeMap;

use rayon::prelude::*;
use veil_classfile::{package_of, AccessFlags, Visibility};

use crate::graph::{ClassSymbol, MemberKind, MemberSymbol, SymbolGraph};
use crate::ids::{ClassId, MemberId};

/// Synthesize virtual members, then connect every member to the members it
/// overrides or hides in descendant classes.
///
/// Edge discovery only reads class-level data that is already closed, so the
/// per-class scan runs on the rayon pool when `parallel` is set; the edges are
/// committed afterwards by the calling thread.
pub fn link_members(graph: &mut SymbolGraph, parallel: bool) {
    if graph.mode().loads_methods() {
        synthesize_virtual_methods(graph);
    }

    let classes: Vec<ClassId> = graph.class_ids().collect();
    let shared: &SymbolGraph = graph;
    let edges: Vec<(MemberId, MemberId)> = if parallel {
        classes
            .par_iter()
            .flat_map_iter(|&class| class_edges(shared, class))
            .collect()
    } else {
        classes
            .iter()
            .flat_map(|&class| class_edges(shared, class))
            .collect()
    };

    tracing::debug!(
        target: "veil.hierarchy",
        edges = edges.len(),
        members = graph.member_count(),
        "linked member hierarchy"
    );

    for (parent, child) in edges {
        graph.add_member_edge(parent, child);
    }
}

/// Members that can take part in overriding at all.
pub(crate) fn participates(graph: &SymbolGraph, member: &MemberSymbol) -> bool {
    if member.is_private() || member.is_initializer() {
        return false;
    }
    // Static interface methods are not inherited by implementors.
    !(member.kind() == MemberKind::Method
        && member.is_static()
        && graph.class(member.owner()).is_interface())
}

/// Can `child_class` override/hide a member declared with `access` in `parent_class`?
fn visible_to(access: AccessFlags, parent_class: &ClassSymbol, child_class: &ClassSymbol) -> bool {
    match access.visibility() {
        Visibility::Public | Visibility::Protected => true,
        Visibility::Package => package_of(parent_class.name()) == package_of(child_class.name()),
        Visibility::Private => false,
    }
}

fn class_edges(graph: &SymbolGraph, class_id: ClassId) -> Vec<(MemberId, MemberId)> {
    let class = graph.class(class_id);
    if class.is_missing() {
        return Vec::new();
    }

    let mut edges = Vec::new();
    for parent_id in class.members() {
        let parent = graph.member(parent_id);
        if !participates(graph, parent) {
            continue;
        }
        for &child_class_id in class.children() {
            let child_class = graph.class(child_class_id);
            if !visible_to(parent.access(), class, child_class) {
                continue;
            }
            for &candidate_id in child_class.members_named(parent.name()) {
                let candidate = graph.member(candidate_id);
                if candidate.kind() == parent.kind()
                    && candidate.descriptor() == parent.descriptor()
                    && candidate.is_static() == parent.is_static()
                    && participates(graph, candidate)
                {
                    edges.push((parent_id, candidate_id));
                }
            }
        }
    }
    edges
}

/// Create a virtual member wherever a class inherits one method signature from
/// unrelated branches without declaring it.
///
/// The typical case is `class C extends Base implements I` where `Base.m()`
/// implements `I.m()` only through `C`: the virtual `C.m()` is the one member
/// that has both as parents.
fn synthesize_virtual_methods(graph: &mut SymbolGraph) {
    let mut pending: Vec<(ClassId, String, String)> = Vec::new();

    for class_id in graph.class_ids() {
        let class = graph.class(class_id);
        if class.is_missing() || class.direct_parents().nth(1).is_none() {
            continue;
        }

        let mut inherited: BTreeMap<(&str, &str), Vec<MemberId>> = BTreeMap::new();
        for &ancestor in class.parents() {
            for &method_id in graph.class(ancestor).methods() {
                let method = graph.member(method_id);
                if method.is_virtual() || method.is_static() || !participates(graph, method) {
                    continue;
                }
                if !visible_to(method.access(), graph.class(ancestor), class) {
                    continue;
                }
                if graph
                    .declared_member(class_id, MemberKind::Method, method.name(), method.descriptor())
                    .is_some()
                {
                    continue;
                }
                inherited
                    .entry((method.name(), method.descriptor()))
                    .or_default()
                    .push(method_id);
            }
        }

        for ((name, descriptor), declarations) in inherited {
            if declarations.len() > 1 && converges_here(graph, class_id, &declarations) {
                pending.push((class_id, name.to_string(), descriptor.to_string()));
            }
        }
    }

    for (class_id, name, descriptor) in pending {
        tracing::trace!(
            target: "veil.hierarchy",
            class = graph.class(class_id).name(),
            name = %name,
            descriptor = %descriptor,
            "synthesized virtual member"
        );
        graph.insert_virtual_method(
            class_id,
            &name,
            &descriptor,
            AccessFlags::new(AccessFlags::PUBLIC | AccessFlags::SYNTHETIC),
        );
    }
}

/// No single direct parent of `class` sees every declaration, so the branches
/// first meet in `class` itself.
fn converges_here(graph: &SymbolGraph, class: ClassId, declarations: &[MemberId]) -> bool {
    !graph.class(class).direct_parents().any(|parent| {
        declarations
            .iter()
            .all(|&decl| graph.is_subtype(parent, graph.member(decl).owner()))
    })
}
