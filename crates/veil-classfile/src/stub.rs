use serde::{Deserialize, Serialize};

use crate::access::AccessFlags;
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
use crate::error::{Error, Result};
use crate::names::{package_of, simple_name_of};

/// Declarations of one class plus the symbolic references made by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    /// Internal name, e.g. `com/example/Foo`.
    pub internal_name: String,
    #[serde(default)]
    pub access_flags: AccessFlags,
    /// Absent only for the root object type.
    #[serde(default)]
    pub super_class: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldStub>,
    #[serde(default)]
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    #[serde(default)]
    pub access_flags: AccessFlags,
    pub name: String,
    /// JVM descriptor, e.g. `I` or `Ljava/lang/String;`.
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStub {
    #[serde(default)]
    pub access_flags: AccessFlags,
    pub name: String,
    /// JVM method descriptor, e.g. `(Ljava/lang/String;)V`.
    pub descriptor: String,
    /// Symbolic references made by the method body, in instruction order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<Insn>,
}

/// An instruction that references a class, field or method symbolically.
///
/// Instructions that carry no symbolic reference are not modeled; the writer
/// keeps them untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Insn {
    Type {
        kind: TypeInsnKind,
        /// Internal name or array descriptor.
        name: String,
    },
    Field {
        kind: FieldInsnKind,
        owner: String,
        name: String,
        descriptor: String,
    },
    Method {
        kind: MethodInsnKind,
        owner: String,
        name: String,
        descriptor: String,
        #[serde(default)]
        interface: bool,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
        bootstrap: Handle,
        #[serde(default)]
        arguments: Vec<BootstrapArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeInsnKind {
    New,
    CheckCast,
    InstanceOf,
    ANewArray,
    Ldc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldInsnKind {
    GetField,
    PutField,
    GetStatic,
    PutStatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodInsnKind {
    Virtual,
    Special,
    Static,
    Interface,
}

/// A `CONSTANT_MethodHandle` operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub kind: HandleKind,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub interface: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl HandleKind {
    pub fn is_field(self) -> bool {
        matches!(
            self,
            HandleKind::GetField | HandleKind::GetStatic | HandleKind::PutField | HandleKind::PutStatic
        )
    }
}

/// Static arguments passed to a bootstrap method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BootstrapArg {
    Int(i32),
    Long(i64),
    String(String),
    /// A class constant (internal name or array descriptor).
    Type(String),
    /// A method type constant (method descriptor).
    MethodType(String),
    Handle(Handle),
}

impl ClassStub {
    pub fn is_interface(&self) -> bool {
        self.access_flags.is_interface()
    }

    pub fn package_name(&self) -> &str {
        package_of(&self.internal_name)
    }

    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.internal_name)
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodStub> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// Check that every declared descriptor parses and that the names are
    /// usable as internal names.
    ///
    /// The reader collaborator is trusted for everything else; this only
    /// guards against stubs that would make member identities ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.internal_name.is_empty() || self.internal_name.contains('.') {
            return Err(Error::InvalidInternalName(self.internal_name.clone()));
        }
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(self.malformed("field name"));
            }
            parse_field_descriptor(&field.descriptor)?;
        }
        for method in &self.methods {
            if method.name.is_empty() {
                return Err(self.malformed("method name"));
            }
            parse_method_descriptor(&method.descriptor)?;
        }
        Ok(())
    }

    fn malformed(&self, what: &'static str) -> Error {
        Error::MalformedStub {
            class: self.internal_name.clone(),
            what,
        }
    }
}
