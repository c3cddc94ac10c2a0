//! Competitor detection and rename-equivalence grouping.

use std::collections::BTreeMap;

use crate::graph::SymbolGraph;
use crate::ids::MemberId;

/// Record competitors on every source member, then partition all sources into
/// rename-equivalence sets.
///
/// Two unrelated sources compete when some member below both has them as
/// sources. Equivalence is the full transitive closure over competitor edges,
/// so chains like `I1 ~ I2` (via `X`) and `I2 ~ I3` (via `Y`) end up in one set
/// even though `I1` and `I3` never meet in a single class.
pub fn group_members(graph: &mut SymbolGraph) {
    let mut competitors: Vec<(MemberId, MemberId)> = Vec::new();
    for source in graph.member_ids() {
        if !graph.is_source(source) {
            continue;
        }
        let source_owner = graph.member(source).owner();
        for &child in graph.member(source).children() {
            let child = graph.member(child);
            if !child.is_multi_source() {
                continue;
            }
            for &other in child.sources() {
                if other != source && !graph.are_related(graph.member(other).owner(), source_owner) {
                    competitors.push((source, other));
                }
            }
        }
    }

    let mut sets = DisjointSets::new(graph.member_count());
    for &(a, b) in &competitors {
        sets.union(a.index(), b.index());
    }
    // Every source of one member shares its name, whether or not the sources
    // were detected as competitors.
    for id in graph.member_ids() {
        let mut sources = graph.member(id).sources().iter();
        if let Some(first) = sources.next() {
            for other in sources {
                sets.union(first.index(), other.index());
            }
        }
    }

    for (a, b) in competitors {
        graph.member_mut(a).competitors.insert(b);
        graph.member_mut(b).competitors.insert(a);
    }

    let mut by_root: BTreeMap<usize, Vec<MemberId>> = BTreeMap::new();
    for id in graph.member_ids() {
        if graph.is_source(id) {
            by_root.entry(sets.find(id.index())).or_default().push(id);
        }
    }

    let mut set_of_root: BTreeMap<usize, usize> = BTreeMap::new();
    graph.related_sets.clear();
    for (root, members) in by_root {
        set_of_root.insert(root, graph.related_sets.len());
        graph.related_sets.push(members);
    }

    let mut shared = 0usize;
    for id in graph.member_ids().collect::<Vec<_>>() {
        let root = graph
            .member(id)
            .sources()
            .iter()
            .next()
            .map(|source| sets.find(source.index()));
        graph.member_mut(id).related = root.and_then(|root| set_of_root.get(&root).copied());
        if graph.is_source(id) && graph.related(id).len() > 1 {
            shared += 1;
        }
    }

    tracing::debug!(
        target: "veil.hierarchy",
        related_sets = graph.related_sets.len(),
        shared_sources = shared,
        "grouped members"
    );
}

/// Union-find over member indices with path halving and union by size.
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
    }
}
