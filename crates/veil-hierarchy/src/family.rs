use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{MemberKind, SymbolGraph};
use crate::ids::{ClassId, MemberId};

/// Members that must all receive one new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameFamily {
    pub kind: MemberKind,
    pub name: String,
    pub descriptor: String,
    /// The related source declarations.
    pub sources: Vec<MemberId>,
    /// Sources plus every member deriving from them, sorted by id.
    pub members: Vec<MemberId>,
}

impl RenameFamily {
    /// Classes declaring (or synthesizing) a member of this family.
    pub fn owners(&self, graph: &SymbolGraph) -> BTreeSet<ClassId> {
        self.members
            .iter()
            .map(|&member| graph.member(member).owner())
            .collect()
    }

    /// Owners plus all of their descendants: every namespace the new name
    /// becomes visible in.
    pub fn touched_classes(&self, graph: &SymbolGraph) -> BTreeSet<ClassId> {
        let mut touched = BTreeSet::new();
        for owner in self.owners(graph) {
            touched.insert(owner);
            touched.extend(graph.class(owner).children().iter().copied());
        }
        touched
    }
}

/// Partition the members of `kind` into rename families, in order of their
/// first source.
pub fn member_families(graph: &SymbolGraph, kind: MemberKind) -> Vec<RenameFamily> {
    let mut by_set: BTreeMap<usize, Vec<MemberId>> = BTreeMap::new();
    let mut loose = Vec::new();
    for id in graph.member_ids() {
        let member = graph.member(id);
        if member.kind() != kind {
            continue;
        }
        match member.related {
            Some(set) => by_set.entry(set).or_default().push(id),
            None => loose.push(id),
        }
    }

    let mut families: Vec<RenameFamily> = by_set
        .into_iter()
        .map(|(set, members)| family(graph, graph.related_sets[set].clone(), members))
        .collect();
    // Ungrouped members (the graph was never grouped) stand alone.
    families.extend(
        loose
            .into_iter()
            .map(|id| family(graph, vec![id], vec![id])),
    );
    families.sort_by_key(|family| family.sources[0]);
    families
}

fn family(graph: &SymbolGraph, sources: Vec<MemberId>, members: Vec<MemberId>) -> RenameFamily {
    let first = graph.member(sources[0]);
    RenameFamily {
        kind: first.kind(),
        name: first.name().to_string(),
        descriptor: first.descriptor().to_string(),
        sources,
        members,
    }
}
