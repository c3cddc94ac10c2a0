use crate::descriptor::remap_descriptor;
use crate::error::Result;

/// Internal name of the root object type.
pub const OBJECT: &str = "java/lang/Object";
pub const CONSTRUCTOR: &str = "<init>";
pub const CLASS_INIT: &str = "<clinit>";
pub const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";

/// `com/example/Foo` -> `com/example`; the default package is `""`.
pub fn package_of(internal_name: &str) -> &str {
    internal_name
        .rsplit_once('/')
        .map(|(package, _)| package)
        .unwrap_or("")
}

/// `com/example/Foo` -> `Foo`.
pub fn simple_name_of(internal_name: &str) -> &str {
    internal_name
        .rsplit_once('/')
        .map(|(_, simple)| simple)
        .unwrap_or(internal_name)
}

pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Candidate enclosing class of a nested class (`a/Outer$Inner` -> `a/Outer`).
///
/// This is purely syntactic; callers must confirm the outer class exists.
pub fn outer_class_of(internal_name: &str) -> Option<&str> {
    let simple = simple_name_of(internal_name);
    let (outer_simple, inner) = simple.rsplit_once('$')?;
    if outer_simple.is_empty() || inner.is_empty() {
        return None;
    }
    let cut = internal_name.len() - simple.len() + outer_simple.len();
    Some(&internal_name[..cut])
}

/// Rename a type operand as it appears in `new`/`checkcast`/`anewarray` and
/// method owners: either a plain internal name or an array descriptor.
pub fn remap_type_name<F>(name: &str, mut rename: F) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    if name.starts_with('[') {
        remap_descriptor(name, rename)
    } else {
        Ok(rename(name).unwrap_or_else(|| name.to_string()))
    }
}
