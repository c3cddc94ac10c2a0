//! Class-file symbol stubs exchanged with the bytecode reader/writer.
//!
//! Veil never parses or emits raw class files itself. The reader collaborator
//! produces [`ClassStub`]s (declarations plus the member/type references found in
//! method bodies) and the writer consumes rewritten stubs, so this crate only
//! models what the rename engine needs to reason about.

#![forbid(unsafe_code)]

mod access;
mod descriptor;
mod error;
mod names;
mod stub;

pub use crate::access::{AccessFlags, Visibility};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, remap_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::names::{
    internal_to_binary, outer_class_of, package_of, remap_type_name, simple_name_of,
    CLASS_INIT, CONSTRUCTOR, LAMBDA_METAFACTORY, OBJECT,
};
pub use crate::stub::{
    BootstrapArg, ClassStub, FieldInsnKind, FieldStub, Handle, HandleKind, Insn, MethodInsnKind,
    MethodStub, TypeInsnKind,
};
