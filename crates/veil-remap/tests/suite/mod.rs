mod families;
mod pipeline;

use std::collections::HashSet;

use veil_classfile::{AccessFlags, ClassStub, FieldStub, Insn, MethodStub, OBJECT};
use veil_hierarchy::StubSet;
use veil_jdk::JdkIndex;
use veil_remap::{remap, AlphabetGenerator, RemapContext, RemapOptions, RemapOutput};

pub(crate) const PUBLIC: u16 = AccessFlags::PUBLIC;
pub(crate) const ABSTRACT: u16 = AccessFlags::PUBLIC | AccessFlags::ABSTRACT;

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
    class(name).flags(AccessFlags::PUBLIC | AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
}

impl ClassBuilder {
    pub(crate) fn flags(mut self, flags: u16) -> Self {
        self.stub.access_flags = AccessFlags::new(flags);
        self
    }

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
        self.method_with(PUBLIC, name, descriptor, Vec::new())
    }

    pub(crate) fn method_with(
        mut self,
        flags: u16,
        name: &str,
        descriptor: &str,
        code: Vec<Insn>,
    ) -> Self {
        self.stub.methods.push(MethodStub {
            access_flags: AccessFlags::new(flags),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code,
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

pub(crate) fn context(program: Vec<ClassStub>, options: RemapOptions) -> RemapContext {
    RemapContext::new(program.into_iter().collect::<StubSet>(), AlphabetGenerator::new())
        .with_platform(JdkIndex::new())
        .with_options(options)
}

#[track_caller]
pub(crate) fn run(program: Vec<ClassStub>, options: RemapOptions) -> RemapOutput {
    remap(context(program, options)).expect("remap")
}

pub(crate) fn members_only() -> RemapOptions {
    RemapOptions {
        rename_classes: false,
        ..RemapOptions::default()
    }
}

/// No class of the rewritten program declares two members with one
/// (name, descriptor), or, unless `share_overloads`, two members with one name.
#[track_caller]
pub(crate) fn assert_no_collisions(output: &RemapOutput, share_overloads: bool) {
    for stub in &output.program {
        let mut signatures = HashSet::new();
        let mut names = HashSet::new();
        for method in &stub.methods {
            assert!(
                signatures.insert((method.name.as_str(), method.descriptor.as_str())),
                "{} declares {}{} twice",
                stub.internal_name,
                method.name,
                method.descriptor
            );
            if !share_overloads && method.name != "<init>" {
                assert!(
                    names.insert(method.name.as_str()),
                    "{} reuses method name {}",
                    stub.internal_name,
                    method.name
                );
            }
        }
        let mut fields = HashSet::new();
        let mut field_names = HashSet::new();
        for field in &stub.fields {
            assert!(
                fields.insert((field.name.as_str(), field.descriptor.as_str())),
                "{} declares field {}:{} twice",
                stub.internal_name,
                field.name,
                field.descriptor
            );
            if !share_overloads {
                assert!(
                    field_names.insert(field.name.as_str()),
                    "{} reuses field name {}",
                    stub.internal_name,
                    field.name
                );
            }
        }
    }
}

pub(crate) fn find<'a>(output: &'a RemapOutput, internal_name: &str) -> &'a ClassStub {
    output
        .program
        .iter()
        .find(|stub| stub.internal_name == internal_name)
        .unwrap_or_else(|| panic!("no class {internal_name} in output"))
}
