//! Symbolic reference resolution, following the JVM's lookup order.
//!
//! References in method bodies name the class they were compiled against, which
//! is often a subclass of the class that actually declares the member. The
//! rename applier needs the declaring member to find its mapping entry.

use crate::graph::{MemberKind, SymbolGraph};
use crate::ids::{ClassId, MemberId};

impl SymbolGraph {
    /// Resolve a method reference: the class itself, its superclass chain, then
    /// its superinterfaces.
    pub fn resolve_method(&self, owner: ClassId, name: &str, descriptor: &str) -> Option<MemberId> {
        let mut current = Some(owner);
        while let Some(class) = current {
            if let Some(found) = self.declared_member(class, MemberKind::Method, name, descriptor) {
                return Some(found);
            }
            current = self.class(class).super_class();
        }

        self.class(owner)
            .parents()
            .iter()
            .copied()
            .filter(|&parent| self.class(parent).is_interface())
            .find_map(|parent| {
                self.declared_member(parent, MemberKind::Method, name, descriptor)
                    .filter(|&m| !self.member(m).is_private() && !self.member(m).is_static())
            })
    }

    /// Resolve a field reference: the class itself, its direct superinterfaces
    /// (recursively), then its superclass.
    pub fn resolve_field(&self, owner: ClassId, name: &str, descriptor: &str) -> Option<MemberId> {
        if let Some(found) = self.declared_member(owner, MemberKind::Field, name, descriptor) {
            return Some(found);
        }
        let class = self.class(owner);
        for &interface in class.interfaces() {
            if let Some(found) = self.resolve_field(interface, name, descriptor) {
                return Some(found);
            }
        }
        class
            .super_class()
            .and_then(|super_class| self.resolve_field(super_class, name, descriptor))
    }

    pub fn resolve_member(
        &self,
        kind: MemberKind,
        owner: ClassId,
        name: &str,
        descriptor: &str,
    ) -> Option<MemberId> {
        match kind {
            MemberKind::Field => self.resolve_field(owner, name, descriptor),
            MemberKind::Method => self.resolve_method(owner, name, descriptor),
        }
    }
}
