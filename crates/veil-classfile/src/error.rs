use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid internal name: {0:?}")]
    InvalidInternalName(String),
    #[error("malformed {what} in class {class}")]
    MalformedStub { class: String, what: &'static str },
}
