use std::collections::BTreeSet;

use veil_classfile::ClassStub;

use crate::diagnostics::Diagnostics;
use crate::graph::{ClassSymbol, ClosureState, HierarchyMode, MemberKind, SymbolGraph};
use crate::ids::ClassId;
use crate::provider::ProviderChain;

/// Lazily resolves classes from a [`ProviderChain`] into a [`SymbolGraph`].
///
/// Every class is materialized the first time its name is requested, its
/// transitive parent set is closed exactly once, and it registers itself as a
/// child of each ancestor. Unresolvable names become `missing` classes and
/// taint their dependents instead of failing the build.
pub struct HierarchyBuilder<'a> {
    providers: &'a ProviderChain,
    diagnostics: &'a mut Diagnostics,
    graph: SymbolGraph,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(
        providers: &'a ProviderChain,
        mode: HierarchyMode,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            providers,
            diagnostics,
            graph: SymbolGraph::new(mode),
        }
    }

    /// Resolve `name` and its whole ancestry. Idempotent.
    pub fn resolve(&mut self, name: &str) -> ClassId {
        self.resolve_for(name, None)
    }

    pub fn finish(self) -> SymbolGraph {
        self.graph
    }

    fn resolve_for(&mut self, name: &str, requester: Option<ClassId>) -> ClassId {
        if let Some(id) = self.graph.class_id(name) {
            if self.graph.class(id).is_missing() {
                self.note_missing(id, requester);
            }
            return id;
        }

        let id = match self.providers.lookup(name) {
            Some((stub, origin)) => {
                let id = self.graph.insert_class(ClassSymbol::from_stub(&stub, origin));
                self.load_members(id, &stub);
                id
            }
            None => {
                let id = self.graph.insert_class(ClassSymbol::missing(name));
                match requester {
                    Some(_) => self.note_missing(id, requester),
                    None => tracing::debug!(
                        target: "veil.hierarchy",
                        class = name,
                        "direct lookup of unknown class"
                    ),
                }
                id
            }
        };

        self.close(id);
        id
    }

    fn note_missing(&mut self, missing: ClassId, requester: Option<ClassId>) {
        let Some(requester) = requester else {
            return;
        };
        let missing_name = self.graph.class(missing).name();
        let requester_name = self.graph.class(requester).name();
        if !self
            .diagnostics
            .missing()
            .get(missing_name)
            .is_some_and(|dependents| dependents.contains(requester_name))
        {
            tracing::warn!(
                target: "veil.hierarchy",
                missing = missing_name,
                required_by = requester_name,
                "missing dependency"
            );
        }
        self.diagnostics
            .missing_dependency(missing_name, requester_name);
    }

    fn load_members(&mut self, id: ClassId, stub: &ClassStub) {
        let mode = self.graph.mode();
        if mode.loads_fields() {
            for field in &stub.fields {
                self.graph.insert_member(
                    id,
                    MemberKind::Field,
                    &field.name,
                    &field.descriptor,
                    field.access_flags,
                );
            }
        }
        if mode.loads_methods() {
            for method in &stub.methods {
                self.graph.insert_member(
                    id,
                    MemberKind::Method,
                    &method.name,
                    &method.descriptor,
                    method.access_flags,
                );
            }
        }
    }

    fn close(&mut self, id: ClassId) {
        if self.graph.class(id).state != ClosureState::Unvisited {
            return;
        }
        self.graph.class_mut(id).state = ClosureState::InProgress;

        if self.graph.class(id).is_missing() {
            self.graph.class_mut(id).state = ClosureState::Closed;
            return;
        }

        let class = self.graph.class(id);
        let super_name = class.super_name.clone();
        let interface_names = class.interface_names.clone();

        let mut tainted = false;
        let mut super_class = None;
        let mut interfaces = Vec::with_capacity(interface_names.len());

        let declared = super_name
            .iter()
            .map(|name| (true, name))
            .chain(interface_names.iter().map(|name| (false, name)));
        for (is_super, parent_name) in declared {
            let parent = self.resolve_for(parent_name, Some(id));
            let parent_symbol = self.graph.class(parent);
            if parent_symbol.state == ClosureState::InProgress {
                // `parent` is still on the resolution stack: the declared chain loops.
                let class_name = self.graph.class(id).name().to_string();
                tracing::error!(
                    target: "veil.hierarchy",
                    class = %class_name,
                    via = parent_name.as_str(),
                    "cyclic class hierarchy"
                );
                self.diagnostics.cyclic_hierarchy(&class_name, parent_name);
                tainted = true;
                continue;
            }
            tainted |= parent_symbol.is_tainted();
            if is_super {
                super_class = Some(parent);
            } else {
                interfaces.push(parent);
            }
        }

        let mut parents = BTreeSet::new();
        for parent in super_class.iter().chain(interfaces.iter()).copied() {
            parents.insert(parent);
            parents.extend(self.graph.class(parent).parents.iter().copied());
        }

        for &ancestor in &parents {
            self.graph.class_mut(ancestor).children.insert(id);
        }

        let class = self.graph.class_mut(id);
        class.super_class = super_class;
        class.interfaces = interfaces;
        class.parents = parents;
        class.depends_on_missing = tainted;
        class.state = ClosureState::Closed;

        if tainted {
            tracing::debug!(
                target: "veil.hierarchy",
                class = %class.name,
                "class depends on a missing or cyclic type"
            );
        }
    }
}
