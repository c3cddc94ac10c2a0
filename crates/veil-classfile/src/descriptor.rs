use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    fn code(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Internal name of the class this type refers to, looking through arrays.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Object(name) => Some(name),
            FieldType::Array(component) => component.class_name(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.code()),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// The class returned by this method, if it returns a (non-array) object.
    ///
    /// Dynamic call sites encode the functional interface they produce this way.
    pub fn returned_class(&self) -> Option<&str> {
        match &self.return_type {
            ReturnType::Type(FieldType::Object(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => write!(f, "{ty}"),
        }
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    if rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    let (return_type, rest) = if let Some(rest) = rest.strip_prefix('V') {
        (ReturnType::Void, rest)
    } else {
        let (ty, rest) = parse_field_type(rest)?;
        (ReturnType::Type(ty), rest)
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor { params, return_type })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return Err(Error::InvalidDescriptor(input.to_string()));
    }
    match bytes[0] as char {
        'B' => Ok((FieldType::Base(BaseType::Byte), &input[1..])),
        'C' => Ok((FieldType::Base(BaseType::Char), &input[1..])),
        'D' => Ok((FieldType::Base(BaseType::Double), &input[1..])),
        'F' => Ok((FieldType::Base(BaseType::Float), &input[1..])),
        'I' => Ok((FieldType::Base(BaseType::Int), &input[1..])),
        'J' => Ok((FieldType::Base(BaseType::Long), &input[1..])),
        'S' => Ok((FieldType::Base(BaseType::Short), &input[1..])),
        'Z' => Ok((FieldType::Base(BaseType::Boolean), &input[1..])),
        'L' => match input.find(';') {
            Some(end) if end > 1 => {
                let name = &input[1..end];
                Ok((FieldType::Object(name.to_string()), &input[end + 1..]))
            }
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}

/// Rewrite every class name embedded in a field or method descriptor.
///
/// `rename` is called with each internal name (`com/example/Foo`) and returns the
/// replacement, or `None` to keep the name. The descriptor does not need to be
/// parsed first; only `L...;` segments are touched.
pub fn remap_descriptor<F>(desc: &str, mut rename: F) -> Result<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(desc.len());
    let mut rest = desc;
    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        };
        let name = &after[..end];
        match rename(name) {
            Some(new_name) => out.push_str(&new_name),
            None => out.push_str(name),
        }
        out.push(';');
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
