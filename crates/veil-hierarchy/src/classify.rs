//! Source/virtual classification.
//!
//! A member's sources are the declarations its identity derives from: the
//! member itself when nothing above it is overridden, otherwise the child-most
//! trusted sources inherited through its parent edges.

use std::collections::BTreeSet;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::SymbolGraph;
use crate::ids::MemberId;

/// Compute the sources of `member` from the sources already recorded on its
/// parent members.
///
/// Parents must have been classified first; [`classify_members`] guarantees
/// that by walking owners from the roots down. Calling this on a source
/// returns the source itself.
pub fn classify(graph: &SymbolGraph, member: MemberId) -> Classification {
    let symbol = graph.member(member);
    if symbol.is_private() || symbol.parents().is_empty() {
        return Classification::Own;
    }
    if graph.class(symbol.owner()).is_tainted() {
        return Classification::Own;
    }

    let candidates: BTreeSet<MemberId> = symbol
        .parents()
        .iter()
        .flat_map(|&parent| graph.member(parent).sources().iter().copied())
        .filter(|&candidate| !graph.owner_of(candidate).is_tainted())
        .collect();

    let kept: BTreeSet<MemberId> = candidates
        .iter()
        .copied()
        .filter(|&candidate| !is_shadowed(graph, candidate, &candidates))
        .collect();

    if kept.is_empty() {
        Classification::ZeroSource
    } else {
        Classification::Sources(kept)
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The member is its own source.
    Own,
    /// The member derives its identity from these declarations.
    Sources(BTreeSet<MemberId>),
    /// Parent edges exist but none leads to a trusted source.
    ZeroSource,
}

/// `candidate` is dropped when another candidate is declared below it and
/// actually overrides it. Unrelated candidates are all kept.
fn is_shadowed(graph: &SymbolGraph, candidate: MemberId, candidates: &BTreeSet<MemberId>) -> bool {
    let owner = graph.member(candidate).owner();
    candidates.iter().any(|&other| {
        other != candidate
            && graph.is_subtype(graph.member(other).owner(), owner)
            && graph.member(candidate).children().contains(&other)
    })
}

/// Classify every member of the graph, recording the result in
/// [`crate::MemberSymbol::sources`].
pub fn classify_members(graph: &mut SymbolGraph, diagnostics: &mut Diagnostics) {
    // An ancestor's parent set is a strict subset of its descendant's, so this
    // order visits every overridden member before its overriders.
    let mut order: Vec<MemberId> = graph.member_ids().collect();
    order.sort_by_key(|&id| (graph.owner_of(id).parents().len(), id));

    let mut multi_source = 0usize;
    for id in order {
        let sources = match classify(graph, id) {
            Classification::Own => BTreeSet::from([id]),
            Classification::Sources(sources) => sources,
            Classification::ZeroSource => {
                let member = graph.describe_member(id);
                tracing::error!(
                    target: "veil.hierarchy",
                    member = %member,
                    "member has no trusted source declaration; treating it as its own source"
                );
                diagnostics.push(Diagnostic::ZeroSourceMember { member });
                BTreeSet::from([id])
            }
        };
        if sources.len() > 1 {
            multi_source += 1;
            tracing::trace!(
                target: "veil.hierarchy",
                member = %graph.describe_member(id),
                sources = sources.len(),
                "multi-source member"
            );
        }
        graph.member_mut(id).sources = sources;
    }

    tracing::debug!(
        target: "veil.hierarchy",
        members = graph.member_count(),
        multi_source,
        "classified members"
    );
}

impl SymbolGraph {
    /// `member` is the authoritative declaration of its override chain.
    pub fn is_source(&self, member: MemberId) -> bool {
        self.member(member).sources().contains(&member)
    }
}
