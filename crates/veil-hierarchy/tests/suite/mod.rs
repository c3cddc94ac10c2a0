mod broken;

use veil_classfile::{AccessFlags, ClassStub, FieldStub, MethodStub, OBJECT};
use veil_hierarchy::{
    build_hierarchy, BuildOptions, Diagnostics, HierarchyMode, MemberId, MemberKind,
    ProviderChain, StubSet, SymbolGraph,
};

pub(crate) struct ClassBuilder {
    stub: ClassStub,
}

pub(crate) fn class(name: &str) -> ClassBuilder {
    ClassBuilder {
        stub: ClassStub {
            internal_name: name.to_string(),
            access_flags: AccessFlags::new(AccessFlags::PUBLIC),
            super_class: Some(OBJECT.to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        },
    }
}

pub(crate) fn interface(name: &str) -> ClassBuilder {
    let mut builder = class(name);
    builder.stub.access_flags =
        AccessFlags::new(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT);
    builder
}

impl ClassBuilder {
    pub(crate) fn extends(mut self, super_class: &str) -> Self {
        self.stub.super_class = Some(super_class.to_string());
        self
    }

    pub(crate) fn implements(mut self, interfaces: &[&str]) -> Self {
        self.stub
            .interfaces
            .extend(interfaces.iter().map(|name| name.to_string()));
        self
    }

    pub(crate) fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with(AccessFlags::PUBLIC, name, descriptor)
    }

    pub(crate) fn method_with(mut self, flags: u16, name: &str, descriptor: &str) -> Self {
        self.stub.methods.push(MethodStub {
            access_flags: AccessFlags::new(flags),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code: Vec::new(),
        });
        self
    }

    pub(crate) fn field(mut self, name: &str, descriptor: &str) -> Self {
        self.stub.fields.push(FieldStub {
            access_flags: AccessFlags::new(AccessFlags::PROTECTED),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub(crate) fn build(self) -> ClassStub {
        self.stub
    }
}

pub(crate) fn object() -> ClassStub {
    ClassStub {
        internal_name: OBJECT.to_string(),
        access_flags: AccessFlags::new(AccessFlags::PUBLIC),
        super_class: None,
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
    }
}

/// Build a graph over `program` with `java/lang/Object` as the only platform class.
pub(crate) fn analyze(program: Vec<ClassStub>, mode: HierarchyMode) -> (SymbolGraph, Diagnostics) {
    analyze_with(program, BuildOptions::new(mode))
}

pub(crate) fn analyze_with(
    program: Vec<ClassStub>,
    options: BuildOptions,
) -> (SymbolGraph, Diagnostics) {
    let roots: Vec<String> = program.iter().map(|stub| stub.internal_name.clone()).collect();
    let providers = ProviderChain::new(program.into_iter().collect::<StubSet>())
        .with_platform([object()].into_iter().collect::<StubSet>());
    let mut diagnostics = Diagnostics::new();
    let graph = build_hierarchy(
        &providers,
        roots.iter().map(String::as_str),
        options,
        &mut diagnostics,
    );
    (graph, diagnostics)
}

#[track_caller]
pub(crate) fn method(graph: &SymbolGraph, owner: &str, name: &str, descriptor: &str) -> MemberId {
    let owner = graph.class_id(owner).unwrap_or_else(|| panic!("class {owner}"));
    graph
        .declared_member(owner, MemberKind::Method, name, descriptor)
        .unwrap_or_else(|| panic!("method {name}{descriptor}"))
}

#[track_caller]
pub(crate) fn field(graph: &SymbolGraph, owner: &str, name: &str, descriptor: &str) -> MemberId {
    let owner = graph.class_id(owner).unwrap_or_else(|| panic!("class {owner}"));
    graph
        .declared_member(owner, MemberKind::Field, name, descriptor)
        .unwrap_or_else(|| panic!("field {name}"))
}

pub(crate) fn described(graph: &SymbolGraph, members: &[MemberId]) -> Vec<String> {
    members.iter().map(|&m| graph.describe_member(m)).collect()
}
