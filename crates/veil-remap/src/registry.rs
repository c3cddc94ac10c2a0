use std::collections::{BTreeSet, HashMap};

use veil_hierarchy::{ClassId, MemberKind};

/// Names reserved per owner namespace.
///
/// Fields and methods of one class live in separate namespaces. A name is
/// reserved together with the descriptor it was reserved for, so
/// overload-sharing lookups can tell `a()V` from `a(I)V`.
#[derive(Debug, Default)]
pub struct NameRegistry {
    reserved: HashMap<(ClassId, MemberKind), HashMap<String, BTreeSet<String>>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, owner: ClassId, kind: MemberKind, name: &str, descriptor: &str) {
        self.reserved
            .entry((owner, kind))
            .or_default()
            .entry(name.to_string())
            .or_default()
            .insert(descriptor.to_string());
    }

    /// Can `name` be given to a member with `descriptor` in `owner`?
    ///
    /// Without overload sharing any reservation of `name` blocks it; with it,
    /// only a reservation for the identical descriptor does.
    pub fn is_free(
        &self,
        owner: ClassId,
        kind: MemberKind,
        name: &str,
        descriptor: &str,
        share_overloads: bool,
    ) -> bool {
        let Some(descriptors) = self
            .reserved
            .get(&(owner, kind))
            .and_then(|names| names.get(name))
        else {
            return true;
        };
        share_overloads && !descriptors.contains(descriptor)
    }

    pub fn is_reserved(&self, owner: ClassId, kind: MemberKind, name: &str, descriptor: &str) -> bool {
        self.reserved
            .get(&(owner, kind))
            .and_then(|names| names.get(name))
            .is_some_and(|descriptors| descriptors.contains(descriptor))
    }
}
