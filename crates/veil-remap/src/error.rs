use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemapError {
    /// The name generator ran dry before a free name was found.
    #[error("dictionary exhausted while naming {target} after {attempts} candidates")]
    DictionaryExhausted { target: String, attempts: usize },

    #[error("invalid keep pattern {pattern:?}: {source}")]
    InvalidKeepPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("malformed program class {class}: {source}")]
    Malformed {
        class: String,
        #[source]
        source: veil_classfile::Error,
    },
}

pub type Result<T, E = RemapError> = std::result::Result<T, E>;
