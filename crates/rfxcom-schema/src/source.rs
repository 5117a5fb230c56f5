use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Result, SchemaError};
use crate::model::{EnumTable, FieldKind, FieldSpec, Schema};

/// File name suffix of schema files loaded from a directory.
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Field list suffix marking an enum indexed by the packet subtype.
const SUBTYPE_INDEX_SUFFIX: &str = "[eSubtype]";

/// One schema definition and the name it is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSource {
    pub name: String,
    pub text: String,
}

impl SchemaSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Schema name for a `<Name>.schema.json` file name.
    pub fn name_from_file_name(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(SCHEMA_FILE_SUFFIX)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    value: u64,
    fields: Vec<String>,
    #[serde(default)]
    enums: BTreeMap<String, RawEnum>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEnum {
    Flat(BTreeMap<String, u64>),
    BySubtype(BTreeMap<String, BTreeMap<String, u64>>),
}

impl Schema {
    /// Parse one JSON schema definition.
    ///
    /// ```text
    /// {
    ///   "value": 0,
    ///   "fields": ["eSubtype", "cSeqnbr", "eCmnd", "fX10"],
    ///   "enums": {
    ///     "eSubtype": { "Interface Control": 0 },
    ///     "eCmnd": { "reset": 0, "get status": 2 }
    ///   }
    /// }
    /// ```
    ///
    /// Field kinds come from the leading character of the name: `e` enum,
    /// `f` flag, anything else a byte. An enum with a nested
    /// `subtype -> symbol -> code` table, or listed as `eName[eSubtype]`, is
    /// indexed by the packet subtype.
    pub fn from_source(source: &SchemaSource) -> Result<Self> {
        let name = source.name.as_str();
        let raw: RawSchema = serde_json::from_str(&source.text)
            .map_err(|err| SchemaError::invalid(name, format!("malformed JSON: {err}")))?;

        let type_code = u8::try_from(raw.value).map_err(|_| {
            SchemaError::invalid(name, format!("type value {} is not a byte", raw.value))
        })?;

        let fields = raw
            .fields
            .iter()
            .map(|field| classify(field, &raw.enums))
            .collect::<Vec<_>>();

        let mut enums = BTreeMap::new();
        let mut subtype_enums = BTreeMap::new();
        for field in &fields {
            let Some(raw_enum) = raw.enums.get(&field.name) else {
                continue;
            };
            match (field.kind, raw_enum) {
                (FieldKind::Enum, RawEnum::Flat(entries)) => {
                    enums.insert(field.name.clone(), build_table(name, &field.name, entries)?);
                }
                (FieldKind::SubtypeEnum, RawEnum::BySubtype(by_subtype)) => {
                    let mut tables = BTreeMap::new();
                    for (subtype, entries) in by_subtype {
                        tables.insert(subtype.clone(), build_table(name, &field.name, entries)?);
                    }
                    subtype_enums.insert(field.name.clone(), tables);
                }
                (FieldKind::SubtypeEnum, RawEnum::Flat(_)) => {
                    return Err(SchemaError::invalid(
                        name,
                        format!("field {} needs a subtype-indexed enum table", field.name),
                    ));
                }
                (kind, _) => {
                    let field = &field.name;
                    let reason = format!("field {field} of kind {kind:?} takes no enum table");
                    return Err(SchemaError::invalid(name, reason));
                }
            }
        }

        if let Some(orphan) = raw
            .enums
            .keys()
            .find(|table| !fields.iter().any(|field| &field.name == *table))
        {
            return Err(SchemaError::invalid(
                name,
                format!("enum table for unknown field {orphan}"),
            ));
        }

        Schema::new(name, type_code, fields, enums, subtype_enums)
    }
}

fn classify(raw_name: &str, enums: &BTreeMap<String, RawEnum>) -> FieldSpec {
    if let Some(base) = raw_name.strip_suffix(SUBTYPE_INDEX_SUFFIX) {
        return FieldSpec::new(base, FieldKind::SubtypeEnum);
    }
    let kind = if raw_name.starts_with('e') {
        match enums.get(raw_name) {
            Some(RawEnum::BySubtype(_)) => FieldKind::SubtypeEnum,
            _ => FieldKind::Enum,
        }
    } else if raw_name.starts_with('f') {
        FieldKind::Flag
    } else {
        FieldKind::Byte
    };
    FieldSpec::new(raw_name, kind)
}

fn build_table(schema: &str, field: &str, entries: &BTreeMap<String, u64>) -> Result<EnumTable> {
    let mut table = EnumTable::new();
    for (symbol, code) in entries {
        let code = u8::try_from(*code).map_err(|_| {
            SchemaError::invalid(
                schema,
                format!("enum {field}: code {code} for {symbol:?} is not a byte"),
            )
        })?;
        table
            .insert(symbol.as_str(), code)
            .map_err(|reason| SchemaError::invalid(schema, format!("enum {field}: {reason}")))?;
    }
    Ok(table)
}
