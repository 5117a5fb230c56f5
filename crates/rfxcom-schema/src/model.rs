use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use crate::error::{CodecError, Result, SchemaError};
use crate::fields;
use crate::value::FieldMap;

/// Field whose decoded symbol selects the table of subtype-indexed enums.
pub const SUBTYPE_FIELD: &str = "eSubtype";

/// Flags packed into one payload byte.
const FLAGS_PER_BYTE: usize = 8;

/// Largest payload that still fits behind the one-byte length prefix.
const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - 1;

/// How a field is represented on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One raw byte.
    Byte,
    /// One byte translated through the field's enum table.
    Enum,
    /// One byte translated through the table selected by `eSubtype`.
    SubtypeEnum,
    /// One bit, packed with neighbouring flags.
    Flag,
}

/// One entry of a schema's field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Bidirectional symbol/code table of one enum field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumTable {
    by_symbol: BTreeMap<String, u8>,
    by_code: BTreeMap<u8, String>,
}

impl EnumTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol. Symbols and codes must both be unique.
    pub fn insert(
        &mut self,
        symbol: impl Into<String>,
        code: u8,
    ) -> std::result::Result<(), String> {
        let symbol = symbol.into();
        if self.by_symbol.contains_key(&symbol) {
            return Err(format!("duplicate symbol {symbol:?}"));
        }
        if let Some(existing) = self.by_code.get(&code) {
            return Err(format!(
                "code 0x{code:02x} is used by both {existing:?} and {symbol:?}"
            ));
        }
        self.by_code.insert(code, symbol.clone());
        self.by_symbol.insert(symbol, code);
        Ok(())
    }

    /// Code of a symbol.
    pub fn code(&self, symbol: &str) -> Option<u8> {
        self.by_symbol.get(symbol).copied()
    }

    /// Symbol of a code.
    pub fn symbol(&self, code: u8) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    /// Entries ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.by_code
            .iter()
            .map(|(code, symbol)| (*code, symbol.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// One payload byte of a schema layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A byte, enum or subtype-enum field (index into `fields`).
    Field(usize),
    /// A run of up to eight consecutive flag fields; the first is bit 0.
    Flags(Range<usize>),
}

/// Definition of one packet type.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    type_code: u8,
    fields: Vec<FieldSpec>,
    enums: BTreeMap<String, EnumTable>,
    subtype_enums: BTreeMap<String, BTreeMap<String, EnumTable>>,
    layout: Vec<Slot>,
}

impl Schema {
    /// Build and validate a schema.
    ///
    /// Rejects duplicate field names, enum fields without a table of the
    /// right shape, tables for fields the list does not contain, and
    /// subtype-indexed fields that do not follow an `eSubtype` enum field.
    pub fn new(
        name: impl Into<String>,
        type_code: u8,
        fields: Vec<FieldSpec>,
        enums: BTreeMap<String, EnumTable>,
        subtype_enums: BTreeMap<String, BTreeMap<String, EnumTable>>,
    ) -> Result<Self> {
        let name = name.into();
        if fields.is_empty() {
            return Err(SchemaError::invalid(&name, "field list is empty"));
        }

        let mut seen = HashSet::new();
        let mut subtype_seen = false;
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                let reason = format!("duplicate field {}", field.name);
                return Err(SchemaError::invalid(&name, reason));
            }
            match field.kind {
                FieldKind::Enum if !enums.contains_key(&field.name) => {
                    return Err(SchemaError::invalid(
                        &name,
                        format!("enum field {} has no enum table", field.name),
                    ));
                }
                FieldKind::SubtypeEnum => {
                    if !subtype_enums.contains_key(&field.name) {
                        return Err(SchemaError::invalid(
                            &name,
                            format!("field {} has no subtype-indexed enum table", field.name),
                        ));
                    }
                    if !subtype_seen {
                        return Err(SchemaError::invalid(
                            &name,
                            format!("field {} must follow the {SUBTYPE_FIELD} field", field.name),
                        ));
                    }
                }
                _ => {}
            }
            if field.name == SUBTYPE_FIELD && field.kind == FieldKind::Enum {
                subtype_seen = true;
            }
        }

        for table_field in enums.keys().chain(subtype_enums.keys()) {
            if !seen.contains(table_field.as_str()) {
                return Err(SchemaError::invalid(
                    &name,
                    format!("enum table for unknown field {table_field}"),
                ));
            }
        }

        let layout = build_layout(&fields);
        if layout.len() > MAX_PAYLOAD_LEN {
            return Err(SchemaError::invalid(
                &name,
                format!(
                    "payload of {} bytes does not fit a frame (max {MAX_PAYLOAD_LEN})",
                    layout.len()
                ),
            ));
        }

        Ok(Self {
            name,
            type_code,
            fields,
            enums,
            subtype_enums,
            layout,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Packet type code carried in the second frame byte.
    pub fn type_code(&self) -> u8 {
        self.type_code
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Direct enum table of a field.
    pub fn enum_table(&self, field: &str) -> Option<&EnumTable> {
        self.enums.get(field)
    }

    /// Enum table of a subtype-indexed field for one subtype symbol.
    pub fn subtype_table(&self, field: &str, subtype: &str) -> Option<&EnumTable> {
        self.subtype_enums.get(field)?.get(subtype)
    }

    /// Subtype keys of subtype-indexed tables that the `eSubtype` table does
    /// not define, as `(field, subtype)` pairs.
    pub fn undeclared_subtypes(&self) -> Vec<(&str, &str)> {
        let declared = self.enums.get(SUBTYPE_FIELD);
        let mut undeclared = Vec::new();
        for (field, tables) in &self.subtype_enums {
            for subtype in tables.keys() {
                if !declared.is_some_and(|table| table.contains_symbol(subtype)) {
                    undeclared.push((field.as_str(), subtype.as_str()));
                }
            }
        }
        undeclared
    }

    /// Expected payload length in bytes (excluding length and type bytes).
    pub fn payload_len(&self) -> usize {
        self.layout.len()
    }

    /// Value of the length prefix of a frame carrying this schema.
    pub fn frame_len(&self) -> usize {
        self.layout.len() + 1
    }

    pub(crate) fn layout(&self) -> &[Slot] {
        &self.layout
    }

    /// Encode field values into payload bytes.
    pub fn pack(&self, values: &FieldMap) -> std::result::Result<Vec<u8>, CodecError> {
        fields::pack(self, values)
    }

    /// Decode payload bytes into field values.
    pub fn unpack(&self, payload: &[u8]) -> std::result::Result<FieldMap, CodecError> {
        fields::unpack(self, payload)
    }
}

/// Group fields into payload bytes. A flag run closes after eight flags or
/// at the next non-flag field.
fn build_layout(fields: &[FieldSpec]) -> Vec<Slot> {
    let mut layout = Vec::new();
    let mut run_start: Option<usize> = None;

    for (index, field) in fields.iter().enumerate() {
        if field.kind == FieldKind::Flag {
            match run_start {
                Some(start) if index - start < FLAGS_PER_BYTE => {}
                Some(start) => {
                    layout.push(Slot::Flags(start..index));
                    run_start = Some(index);
                }
                None => run_start = Some(index),
            }
            continue;
        }
        if let Some(start) = run_start.take() {
            layout.push(Slot::Flags(start..index));
        }
        layout.push(Slot::Field(index));
    }
    if let Some(start) = run_start {
        layout.push(Slot::Flags(start..fields.len()));
    }

    layout
}
