use thiserror::Error;

/// Error types for the quill-serializer crate
#[derive(Error, Debug)]
pub enum SerializerError {
    #[error("Cannot parse {input:?} as {type_name}: {reason}")]
    Parse {
        type_name: String,
        input: String,
        reason: String,
    },

    #[error("No member of enum {enum_name} matches {input:?}")]
    UnknownEnumMember { enum_name: String, input: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Cannot format {type_name}: {reason}")]
    Format { type_name: String, reason: String },

    #[error("Invalid conversion options: {0}")]
    Config(#[from] serde_json::Error),
}

impl SerializerError {
    pub(crate) fn parse(
        type_name: &str,
        input: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        SerializerError::Parse {
            type_name: type_name.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn mismatch(expected: &str, found: &str) -> Self {
        SerializerError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Result type for quill-serializer operations
pub type Result<T> = std::result::Result<T, SerializerError>;
