use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name to value mapping for one packet.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A decoded (or to-be-encoded) field value.
///
/// Serializes untagged: flags as JSON booleans, bytes as numbers and enum
/// symbols as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// One flag bit.
    Flag(bool),
    /// One raw byte.
    Byte(u8),
    /// Symbolic name of an enum code.
    Symbol(String),
}

impl FieldValue {
    /// The raw byte, if this is a byte value.
    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Self::Byte(value) => Some(*value),
            _ => None,
        }
    }

    /// The flag state. Bytes 0 and 1 are accepted as flags too.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            Self::Byte(0) => Some(false),
            Self::Byte(1) => Some(true),
            _ => None,
        }
    }

    /// The enum symbol, if this is a symbolic value.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "{value}"),
            Self::Byte(value) => write!(f, "{value}"),
            Self::Symbol(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        Self::Byte(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Symbol(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Symbol(value)
    }
}

/// A decoded packet: the schema it matched and its field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the schema used to decode the packet.
    pub schema: String,
    /// Packet type code from the frame header.
    pub type_code: u8,
    /// Decoded field values.
    pub fields: FieldMap,
}
