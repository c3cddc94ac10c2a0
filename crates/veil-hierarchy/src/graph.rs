use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;
use veil_classfile::{AccessFlags, ClassStub, CLASS_INIT, CONSTRUCTOR};

use crate::ids::{ClassId, MemberId};

/// Which provider a class was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Program,
    Library,
    Platform,
    /// No provider could resolve the name.
    Missing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
}

/// How much of the hierarchy a [`SymbolGraph`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HierarchyMode {
    /// Class-level edges only.
    #[default]
    Fast,
    /// Classes plus every field and field-level edges.
    Fields,
    /// Classes, fields, methods, member edges and virtual members.
    Full,
}

impl HierarchyMode {
    pub fn loads_fields(self) -> bool {
        matches!(self, HierarchyMode::Fields | HierarchyMode::Full)
    }

    pub fn loads_methods(self) -> bool {
        matches!(self, HierarchyMode::Full)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClosureState {
    Unvisited,
    InProgress,
    Closed,
}

#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub(crate) name: String,
    pub(crate) origin: Origin,
    pub(crate) access: AccessFlags,
    pub(crate) super_name: Option<String>,
    pub(crate) interface_names: Vec<String>,
    pub(crate) super_class: Option<ClassId>,
    pub(crate) interfaces: Vec<ClassId>,
    pub(crate) parents: BTreeSet<ClassId>,
    pub(crate) children: BTreeSet<ClassId>,
    pub(crate) depends_on_missing: bool,
    pub(crate) state: ClosureState,
    pub(crate) fields: Vec<MemberId>,
    pub(crate) methods: Vec<MemberId>,
    members_by_name: HashMap<String, Vec<MemberId>>,
}

impl ClassSymbol {
    pub(crate) fn from_stub(stub: &ClassStub, origin: Origin) -> Self {
        Self {
            name: stub.internal_name.clone(),
            origin,
            access: stub.access_flags,
            super_name: stub.super_class.clone(),
            interface_names: stub.interfaces.clone(),
            ..Self::missing(&stub.internal_name)
        }
    }

    pub(crate) fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            origin: Origin::Missing,
            access: AccessFlags::default(),
            super_name: None,
            interface_names: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            depends_on_missing: false,
            state: ClosureState::Unvisited,
            fields: Vec::new(),
            methods: Vec::new(),
            members_by_name: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn access(&self) -> AccessFlags {
        self.access
    }

    pub fn is_resolved(&self) -> bool {
        self.origin != Origin::Missing
    }

    pub fn is_missing(&self) -> bool {
        self.origin == Origin::Missing
    }

    pub fn is_program(&self) -> bool {
        self.origin == Origin::Program
    }

    /// Some transitive parent is missing (or the declared hierarchy is cyclic).
    pub fn depends_on_missing(&self) -> bool {
        self.depends_on_missing
    }

    /// Excluded from every renaming decision.
    pub fn is_tainted(&self) -> bool {
        self.is_missing() || self.depends_on_missing
    }

    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    pub fn super_class(&self) -> Option<ClassId> {
        self.super_class
    }

    pub fn interfaces(&self) -> &[ClassId] {
        &self.interfaces
    }

    /// Resolved superclass followed by resolved interfaces.
    pub fn direct_parents(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.super_class.iter().chain(self.interfaces.iter()).copied()
    }

    /// Transitive superclass + interface closure.
    pub fn parents(&self) -> &BTreeSet<ClassId> {
        &self.parents
    }

    /// Every class that extends or implements this one, directly or not.
    pub fn children(&self) -> &BTreeSet<ClassId> {
        &self.children
    }

    pub fn fields(&self) -> &[MemberId] {
        &self.fields
    }

    pub fn methods(&self) -> &[MemberId] {
        &self.methods
    }

    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.fields.iter().chain(self.methods.iter()).copied()
    }

    pub(crate) fn members_named(&self, name: &str) -> &[MemberId] {
        self.members_by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct MemberSymbol {
    pub(crate) owner: ClassId,
    pub(crate) kind: MemberKind,
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) access: AccessFlags,
    pub(crate) is_virtual: bool,
    pub(crate) parents: BTreeSet<MemberId>,
    pub(crate) children: BTreeSet<MemberId>,
    pub(crate) sources: BTreeSet<MemberId>,
    pub(crate) competitors: BTreeSet<MemberId>,
    pub(crate) related: Option<usize>,
}

impl MemberSymbol {
    fn new(owner: ClassId, kind: MemberKind, name: &str, descriptor: &str, access: AccessFlags) -> Self {
        Self {
            owner,
            kind,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access,
            is_virtual: false,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            sources: BTreeSet::new(),
            competitors: BTreeSet::new(),
            related: None,
        }
    }

    pub fn owner(&self) -> ClassId {
        self.owner
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn access(&self) -> AccessFlags {
        self.access
    }

    pub fn is_private(&self) -> bool {
        self.access.is_private()
    }

    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_native(&self) -> bool {
        self.access.is_native()
    }

    /// Synthesized stand-in for an inherited convergence point.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// `<init>` or `<clinit>`.
    pub fn is_initializer(&self) -> bool {
        self.kind == MemberKind::Method && (self.name == CONSTRUCTOR || self.name == CLASS_INIT)
    }

    pub fn parents(&self) -> &BTreeSet<MemberId> {
        &self.parents
    }

    pub fn children(&self) -> &BTreeSet<MemberId> {
        &self.children
    }

    pub fn sources(&self) -> &BTreeSet<MemberId> {
        &self.sources
    }

    pub fn competitors(&self) -> &BTreeSet<MemberId> {
        &self.competitors
    }

    pub fn is_multi_source(&self) -> bool {
        self.sources.len() > 1
    }
}

/// Arena holding every class and member resolved during one pipeline stage.
///
/// Symbols refer to each other through [`ClassId`]/[`MemberId`] handles so the
/// parent/child back-edges never need shared ownership.
#[derive(Debug, Clone, Default)]
pub struct SymbolGraph {
    mode: HierarchyMode,
    classes: Vec<ClassSymbol>,
    members: Vec<MemberSymbol>,
    by_name: HashMap<String, ClassId>,
    pub(crate) related_sets: Vec<Vec<MemberId>>,
}

impl SymbolGraph {
    pub fn new(mode: HierarchyMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> HierarchyMode {
        self.mode
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn class(&self, id: ClassId) -> &ClassSymbol {
        &self.classes[id.index()]
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut ClassSymbol {
        &mut self.classes[id.index()]
    }

    pub fn class_by_name(&self, name: &str) -> Option<&ClassSymbol> {
        self.class_id(name).map(|id| self.class(id))
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        &self.members[id.index()]
    }

    pub(crate) fn member_mut(&mut self, id: MemberId) -> &mut MemberSymbol {
        &mut self.members[id.index()]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(ClassId::new)
    }

    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        (0..self.members.len()).map(MemberId::new)
    }

    pub fn owner_of(&self, member: MemberId) -> &ClassSymbol {
        self.class(self.member(member).owner)
    }

    /// The member declared (or synthesized) directly in `class`.
    pub fn declared_member(
        &self,
        class: ClassId,
        kind: MemberKind,
        name: &str,
        descriptor: &str,
    ) -> Option<MemberId> {
        self.class(class)
            .members_named(name)
            .iter()
            .copied()
            .find(|&id| {
                let member = self.member(id);
                member.kind == kind && member.descriptor == descriptor
            })
    }

    /// The rename-equivalence class of `member`: every source that must share
    /// its new name, sorted by id.
    pub fn related(&self, member: MemberId) -> &[MemberId] {
        match self.member(member).related {
            Some(set) => &self.related_sets[set],
            None => &[],
        }
    }

    /// The member's mapping key, see [`member_key`].
    pub fn describe_member(&self, member: MemberId) -> String {
        let m = self.member(member);
        member_key(&self.class(m.owner).name, m.kind, &m.name, &m.descriptor)
    }

    pub(crate) fn insert_class(&mut self, class: ClassSymbol) -> ClassId {
        let id = ClassId::new(self.classes.len());
        self.by_name.insert(class.name.clone(), id);
        self.classes.push(class);
        id
    }

    pub(crate) fn insert_member(
        &mut self,
        owner: ClassId,
        kind: MemberKind,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
    ) -> MemberId {
        if let Some(existing) = self.declared_member(owner, kind, name, descriptor) {
            return existing;
        }
        let id = MemberId::new(self.members.len());
        self.members
            .push(MemberSymbol::new(owner, kind, name, descriptor, access));
        let class = self.class_mut(owner);
        match kind {
            MemberKind::Field => class.fields.push(id),
            MemberKind::Method => class.methods.push(id),
        }
        class
            .members_by_name
            .entry(name.to_string())
            .or_default()
            .push(id);
        id
    }

    pub(crate) fn insert_virtual_method(
        &mut self,
        owner: ClassId,
        name: &str,
        descriptor: &str,
        access: AccessFlags,
    ) -> MemberId {
        let id = self.insert_member(owner, MemberKind::Method, name, descriptor, access);
        self.member_mut(id).is_virtual = true;
        id
    }

    pub(crate) fn add_member_edge(&mut self, parent: MemberId, child: MemberId) {
        self.member_mut(parent).children.insert(child);
        self.member_mut(child).parents.insert(parent);
    }
}

/// `owner.name(descriptor)`: `app/A.foo()V` for a method (whose descriptor
/// already carries the parentheses), `app/A.count(I)` for a field. An empty
/// owner gives the `.name(descriptor)` form used for dynamic call sites.
pub fn member_key(owner: &str, kind: MemberKind, name: &str, descriptor: &str) -> String {
    match kind {
        MemberKind::Method => format!("{owner}.{name}{descriptor}"),
        MemberKind::Field => format!("{owner}.{name}({descriptor})"),
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Origin::Program => "program",
            Origin::Library => "library",
            Origin::Platform => "platform",
            Origin::Missing => "missing",
        };
        f.write_str(s)
    }
}
