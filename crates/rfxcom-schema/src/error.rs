/// Errors raised while loading schemas. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema source could not be read.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// The schema source parsed but describes an unusable layout.
    #[error("invalid schema {schema}: {reason}")]
    Invalid { schema: String, reason: String },

    /// A schema with the same name is already registered.
    #[error("schema {0} is already registered")]
    DuplicateName(String),
}

impl SchemaError {
    pub(crate) fn invalid(schema: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while packing or unpacking a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A field named by the schema has no value.
    #[error("missing value for field {0}")]
    MissingField(String),

    /// The symbol is not in the field's enum table.
    #[error("unknown value {value:?} for enum field {field}")]
    UnknownEnumValue { field: String, value: String },

    /// The subtype has no enum table for this subtype-indexed field.
    #[error("subtype {subtype:?} has no table for field {field}")]
    UnknownSubtype { field: String, subtype: String },

    /// The supplied value has the wrong shape for the field kind.
    #[error("field {field} expects a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// No symbol maps to the received byte.
    #[error("unknown code 0x{code:02x} for enum field {field}")]
    UnknownEnumCode { field: String, code: u8 },

    /// The payload is shorter than the schema layout.
    #[error("truncated payload ({actual} bytes, expected {expected})")]
    TruncatedPayload { expected: usize, actual: usize },

    /// The payload is longer than the schema layout.
    #[error("trailing bytes in payload ({actual} bytes, expected {expected})")]
    TrailingBytes { expected: usize, actual: usize },
}
