//! Rewriting declarations and references with a finished [`NameMapping`].

use veil_classfile::{
    parse_method_descriptor, remap_descriptor, remap_type_name, BootstrapArg, ClassStub,
    FieldStub, Handle, Insn, MethodStub, LAMBDA_METAFACTORY, OBJECT,
};
use veil_hierarchy::{Diagnostic, Diagnostics, MemberKind, SymbolGraph};

use crate::error::{RemapError, Result};
use crate::mapping::{call_site_key, NameMapping};

/// Rewrite `program` according to `mapping`.
///
/// Member references are resolved to their declaring member the way the JVM
/// resolves them, so `invokevirtual Sub.m()V` picks up the new name of the
/// `Base.m()V` it actually calls. Lambda call sites get a companion entry in
/// `mapping` keyed by their apparent `.name(descriptor)`.
pub fn apply_mapping(
    graph: &SymbolGraph,
    program: &[ClassStub],
    mapping: &mut NameMapping,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ClassStub>> {
    let mut call_sites = Vec::new();
    let rewriter = Rewriter {
        graph,
        mapping: &*mapping,
        call_sites: &mut call_sites,
    };
    let rewritten = rewriter.rewrite_all(program)?;

    for site in call_sites {
        match mapping.get(&site.key) {
            None => {
                mapping.insert(site.key, site.new_name);
            }
            Some(existing) if existing == site.new_name => {}
            Some(existing) => {
                tracing::error!(
                    target: "veil.remap",
                    key = %site.key,
                    kept = existing,
                    rejected = %site.new_name,
                    class = %site.class,
                    "dynamic call sites with one apparent signature resolve to different names"
                );
                diagnostics.push(Diagnostic::ConflictingCallSite {
                    key: site.key,
                    kept: existing.to_string(),
                    rejected: site.new_name,
                });
            }
        }
    }

    tracing::info!(
        target: "veil.remap",
        classes = rewritten.len(),
        entries = mapping.len(),
        "applied mapping"
    );
    Ok(rewritten)
}

struct CallSite {
    key: String,
    new_name: String,
    class: String,
}

struct Rewriter<'a> {
    graph: &'a SymbolGraph,
    mapping: &'a NameMapping,
    call_sites: &'a mut Vec<CallSite>,
}

type ClassfileResult<T> = veil_classfile::Result<T>;

impl Rewriter<'_> {
    fn rewrite_all(mut self, program: &[ClassStub]) -> Result<Vec<ClassStub>> {
        program
            .iter()
            .map(|stub| {
                self.rewrite_class(stub)
                    .map_err(|source| RemapError::Malformed {
                        class: stub.internal_name.clone(),
                        source,
                    })
            })
            .collect()
    }

    fn rewrite_class(&mut self, stub: &ClassStub) -> ClassfileResult<ClassStub> {
        let owner = stub.internal_name.as_str();
        let fields = stub
            .fields
            .iter()
            .map(|field| {
                Ok(FieldStub {
                    access_flags: field.access_flags,
                    name: self
                        .declared_name(owner, MemberKind::Field, &field.name, &field.descriptor),
                    descriptor: self.descriptor(&field.descriptor)?,
                })
            })
            .collect::<ClassfileResult<Vec<_>>>()?;

        let mut methods = Vec::with_capacity(stub.methods.len());
        for method in &stub.methods {
            let code = method
                .code
                .iter()
                .map(|insn| self.rewrite_insn(owner, insn))
                .collect::<ClassfileResult<Vec<_>>>()?;
            methods.push(MethodStub {
                access_flags: method.access_flags,
                name: self.declared_name(owner, MemberKind::Method, &method.name, &method.descriptor),
                descriptor: self.descriptor(&method.descriptor)?,
                code,
            });
        }

        Ok(ClassStub {
            internal_name: self.type_name(owner)?,
            access_flags: stub.access_flags,
            super_class: stub
                .super_class
                .as_deref()
                .map(|name| self.type_name(name))
                .transpose()?,
            interfaces: stub
                .interfaces
                .iter()
                .map(|name| self.type_name(name))
                .collect::<ClassfileResult<_>>()?,
            fields,
            methods,
        })
    }

    fn rewrite_insn(&mut self, class: &str, insn: &Insn) -> ClassfileResult<Insn> {
        Ok(match insn {
            Insn::Type { kind, name } => Insn::Type {
                kind: *kind,
                name: self.type_name(name)?,
            },
            Insn::Field {
                kind,
                owner,
                name,
                descriptor,
            } => Insn::Field {
                kind: *kind,
                owner: self.type_name(owner)?,
                name: self.referenced_name(MemberKind::Field, owner, name, descriptor),
                descriptor: self.descriptor(descriptor)?,
            },
            Insn::Method {
                kind,
                owner,
                name,
                descriptor,
                interface,
            } => Insn::Method {
                kind: *kind,
                owner: self.type_name(owner)?,
                name: self.referenced_name(MemberKind::Method, owner, name, descriptor),
                descriptor: self.descriptor(descriptor)?,
                interface: *interface,
            },
            Insn::InvokeDynamic {
                name,
                descriptor,
                bootstrap,
                arguments,
            } => {
                let new_name = if is_lambda_bootstrap(bootstrap) {
                    self.lambda_name(name, descriptor, arguments)?
                } else {
                    None
                };
                if let Some(new_name) = &new_name {
                    self.call_sites.push(CallSite {
                        key: call_site_key(name, descriptor),
                        new_name: new_name.clone(),
                        class: class.to_string(),
                    });
                }
                Insn::InvokeDynamic {
                    name: new_name.unwrap_or_else(|| name.clone()),
                    descriptor: self.descriptor(descriptor)?,
                    bootstrap: self.handle(bootstrap)?,
                    arguments: arguments
                        .iter()
                        .map(|arg| self.bootstrap_arg(arg))
                        .collect::<ClassfileResult<_>>()?,
                }
            }
        })
    }

    /// New name of the functional interface method a lambda call site binds.
    ///
    /// The call site's descriptor returns the interface, its name is the
    /// interface method's name and the first bootstrap argument is the
    /// erased method type.
    fn lambda_name(
        &self,
        name: &str,
        descriptor: &str,
        arguments: &[BootstrapArg],
    ) -> ClassfileResult<Option<String>> {
        let parsed = parse_method_descriptor(descriptor)?;
        let Some(interface) = parsed.returned_class() else {
            return Ok(None);
        };
        let Some(BootstrapArg::MethodType(erased)) = arguments.first() else {
            return Ok(None);
        };
        Ok(self
            .resolved_name(MemberKind::Method, interface, name, erased)
            .map(str::to_string))
    }

    fn bootstrap_arg(&self, arg: &BootstrapArg) -> ClassfileResult<BootstrapArg> {
        Ok(match arg {
            BootstrapArg::Type(name) => BootstrapArg::Type(self.type_name(name)?),
            BootstrapArg::MethodType(descriptor) => {
                BootstrapArg::MethodType(self.descriptor(descriptor)?)
            }
            BootstrapArg::Handle(handle) => BootstrapArg::Handle(self.handle(handle)?),
            other => other.clone(),
        })
    }

    fn handle(&self, handle: &Handle) -> ClassfileResult<Handle> {
        let kind = if handle.kind.is_field() {
            MemberKind::Field
        } else {
            MemberKind::Method
        };
        Ok(Handle {
            kind: handle.kind,
            owner: self.type_name(&handle.owner)?,
            name: self.referenced_name(kind, &handle.owner, &handle.name, &handle.descriptor),
            descriptor: self.descriptor(&handle.descriptor)?,
            interface: handle.interface,
        })
    }

    fn declared_name(&self, owner: &str, kind: MemberKind, name: &str, descriptor: &str) -> String {
        self.mapping
            .member(owner, kind, name, descriptor)
            .unwrap_or(name)
            .to_string()
    }

    fn referenced_name(&self, kind: MemberKind, owner: &str, name: &str, descriptor: &str) -> String {
        self.resolved_name(kind, owner, name, descriptor)
            .unwrap_or(name)
            .to_string()
    }

    /// Mapping entry of the member a symbolic reference resolves to.
    fn resolved_name(&self, kind: MemberKind, owner: &str, name: &str, descriptor: &str) -> Option<&str> {
        // Array types inherit their members from the root object type.
        let owner = if owner.starts_with('[') { OBJECT } else { owner };
        let owner = self.graph.class_id(owner)?;
        let member = self.graph.resolve_member(kind, owner, name, descriptor)?;
        self.mapping.get(&self.graph.describe_member(member))
    }

    fn type_name(&self, name: &str) -> ClassfileResult<String> {
        remap_type_name(name, |class| self.mapping.class(class).map(str::to_string))
    }

    fn descriptor(&self, descriptor: &str) -> ClassfileResult<String> {
        remap_descriptor(descriptor, |class| {
            self.mapping.class(class).map(str::to_string)
        })
    }
}

fn is_lambda_bootstrap(bootstrap: &Handle) -> bool {
    bootstrap.owner == LAMBDA_METAFACTORY
        && matches!(bootstrap.name.as_str(), "metafactory" | "altMetafactory")
}
