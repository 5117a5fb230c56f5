//! Field-level packing: schema field values to payload bytes and back.

use std::cmp::Ordering;

use crate::error::CodecError;
use crate::model::{FieldKind, FieldSpec, Schema, Slot, SUBTYPE_FIELD};
use crate::value::{FieldMap, FieldValue};

/// Encode `values` into the payload of `schema`.
///
/// Every schema field must have a value. Nothing is returned on error.
pub fn pack(schema: &Schema, values: &FieldMap) -> Result<Vec<u8>, CodecError> {
    let fields = schema.fields();
    let mut payload = Vec::with_capacity(schema.payload_len());

    for slot in schema.layout() {
        let byte = match slot {
            Slot::Field(index) => encode_field(schema, &fields[*index], values)?,
            Slot::Flags(range) => {
                let mut acc = 0u8;
                for (bit, spec) in fields[range.clone()].iter().enumerate() {
                    if flag_value(spec, lookup(values, &spec.name)?)? {
                        acc |= 1 << bit;
                    }
                }
                acc
            }
        };
        payload.push(byte);
    }

    for name in values.keys() {
        if schema.field(name).is_none() {
            tracing::debug!(
                schema = schema.name(),
                field = %name,
                "ignoring value for unknown field"
            );
        }
    }

    Ok(payload)
}

/// Decode the payload of `schema` into field values.
///
/// The payload must be exactly [`Schema::payload_len`] bytes long.
pub fn unpack(schema: &Schema, payload: &[u8]) -> Result<FieldMap, CodecError> {
    let expected = schema.payload_len();
    match payload.len().cmp(&expected) {
        Ordering::Less => {
            return Err(CodecError::TruncatedPayload {
                expected,
                actual: payload.len(),
            })
        }
        Ordering::Greater => {
            return Err(CodecError::TrailingBytes {
                expected,
                actual: payload.len(),
            })
        }
        Ordering::Equal => {}
    }

    let fields = schema.fields();
    let mut values = FieldMap::new();
    for (slot, &byte) in schema.layout().iter().zip(payload) {
        match slot {
            Slot::Field(index) => {
                let spec = &fields[*index];
                let value = decode_field(schema, spec, byte, &values)?;
                values.insert(spec.name.clone(), value);
            }
            Slot::Flags(range) => {
                for (bit, spec) in fields[range.clone()].iter().enumerate() {
                    values.insert(spec.name.clone(), FieldValue::Flag((byte >> bit) & 1 == 1));
                }
            }
        }
    }

    Ok(values)
}

fn lookup<'a>(values: &'a FieldMap, field: &str) -> Result<&'a FieldValue, CodecError> {
    values
        .get(field)
        .ok_or_else(|| CodecError::MissingField(field.to_string()))
}

fn mismatch(spec: &FieldSpec, expected: &'static str) -> CodecError {
    CodecError::TypeMismatch {
        field: spec.name.clone(),
        expected,
    }
}

fn flag_value(spec: &FieldSpec, value: &FieldValue) -> Result<bool, CodecError> {
    value.as_flag().ok_or_else(|| mismatch(spec, "flag"))
}

fn symbol_of<'a>(spec: &FieldSpec, value: &'a FieldValue) -> Result<&'a str, CodecError> {
    value.as_symbol().ok_or_else(|| mismatch(spec, "symbol"))
}

fn unknown_subtype(spec: &FieldSpec, subtype: &str) -> CodecError {
    CodecError::UnknownSubtype {
        field: spec.name.clone(),
        subtype: subtype.to_string(),
    }
}

fn subtype_of(values: &FieldMap) -> Result<&str, CodecError> {
    let value = lookup(values, SUBTYPE_FIELD)?;
    value.as_symbol().ok_or_else(|| CodecError::TypeMismatch {
        field: SUBTYPE_FIELD.to_string(),
        expected: "symbol",
    })
}

fn encode_field(schema: &Schema, spec: &FieldSpec, values: &FieldMap) -> Result<u8, CodecError> {
    let value = lookup(values, &spec.name)?;
    match spec.kind {
        FieldKind::Byte => value.as_byte().ok_or_else(|| mismatch(spec, "byte")),
        FieldKind::Flag => flag_value(spec, value).map(u8::from),
        FieldKind::Enum => {
            let symbol = symbol_of(spec, value)?;
            schema
                .enum_table(&spec.name)
                .and_then(|table| table.code(symbol))
                .ok_or_else(|| CodecError::UnknownEnumValue {
                    field: spec.name.clone(),
                    value: symbol.to_string(),
                })
        }
        FieldKind::SubtypeEnum => {
            let symbol = symbol_of(spec, value)?;
            let subtype = subtype_of(values)?;
            let table = schema
                .subtype_table(&spec.name, subtype)
                .ok_or_else(|| unknown_subtype(spec, subtype))?;
            table
                .code(symbol)
                .ok_or_else(|| CodecError::UnknownEnumValue {
                    field: spec.name.clone(),
                    value: symbol.to_string(),
                })
        }
    }
}

fn decode_field(
    schema: &Schema,
    spec: &FieldSpec,
    byte: u8,
    decoded: &FieldMap,
) -> Result<FieldValue, CodecError> {
    let table = match spec.kind {
        FieldKind::Byte => return Ok(FieldValue::Byte(byte)),
        FieldKind::Flag => return Ok(FieldValue::Flag(byte & 1 == 1)),
        FieldKind::Enum => schema.enum_table(&spec.name),
        FieldKind::SubtypeEnum => {
            let subtype = subtype_of(decoded)?;
            let table = schema
                .subtype_table(&spec.name, subtype)
                .ok_or_else(|| unknown_subtype(spec, subtype))?;
            Some(table)
        }
    };

    table
        .and_then(|table| table.symbol(byte))
        .map(|symbol| FieldValue::Symbol(symbol.to_string()))
        .ok_or_else(|| CodecError::UnknownEnumCode {
            field: spec.name.clone(),
            code: byte,
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::source::SchemaSource;
    use super::*;

    fn schema(name: &str, text: &str) -> Schema {
        Schema::from_source(&SchemaSource::new(name, text)).unwrap()
    }

    fn nine_flags() -> Schema {
        schema(
            "Flags",
            r#"{ "value": 1, "fields": ["f0","f1","f2","f3","f4","f5","f6","f7","f8"] }"#,
        )
    }

    fn interface_control() -> Schema {
        schema(
            "InterfaceControl",
            r#"{
                "value": 0,
                "fields": ["eSubtype", "cSeqnbr", "eCmnd", "cMsg1", "cMsg2"],
                "enums": {
                    "eSubtype": { "Interface Control": 0 },
                    "eCmnd": { "reset": 0, "get status": 2, "set mode": 3 }
                }
            }"#,
        )
    }

    fn lighting() -> Schema {
        schema(
            "Lighting",
            r#"{
                "value": 16,
                "fields": ["eSubtype", "cSeqnbr", "cHouse", "eCmnd", "fGroup", "fRepeat", "cRssi"],
                "enums": {
                    "eSubtype": { "X10": 0, "ARC": 1 },
                    "eCmnd": {
                        "X10": { "off": 0, "on": 1, "dim": 2 },
                        "ARC": { "off": 0, "on": 1, "chime": 7 }
                    }
                }
            }"#,
        )
    }

    fn map<const N: usize>(entries: [(&str, FieldValue); N]) -> FieldMap {
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn nine_flags_pack_into_two_bytes() {
        let schema = nine_flags();
        let values: FieldMap = (0..9)
            .map(|i| (format!("f{i}"), FieldValue::Flag(i % 2 == 0)))
            .collect();

        let payload = pack(&schema, &values).unwrap();
        assert_eq!(payload, vec![0x55, 0x01]);

        let decoded = unpack(&schema, &payload).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn flags_accept_zero_and_one_bytes() {
        let schema = nine_flags();
        let values: FieldMap = (0..9)
            .map(|i| (format!("f{i}"), FieldValue::Byte(u8::from(i == 8))))
            .collect();
        assert_eq!(pack(&schema, &values).unwrap(), vec![0x00, 0x01]);
    }

    #[test]
    fn enum_symbol_survives_roundtrip() {
        let schema = interface_control();
        let values = map([
            ("eSubtype", "Interface Control".into()),
            ("cSeqnbr", 4u8.into()),
            ("eCmnd", "reset".into()),
            ("cMsg1", 0u8.into()),
            ("cMsg2", 9u8.into()),
        ]);

        let payload = pack(&schema, &values).unwrap();
        assert_eq!(payload, vec![0x00, 0x04, 0x00, 0x00, 0x09]);

        let decoded = unpack(&schema, &payload).unwrap();
        assert_eq!(decoded["eCmnd"], FieldValue::Symbol("reset".to_string()));
        assert_eq!(decoded, values);
    }

    #[test]
    fn subtype_enum_uses_subtype_table() {
        let schema = lighting();
        let values = map([
            ("eSubtype", "ARC".into()),
            ("cSeqnbr", 1u8.into()),
            ("cHouse", 0x41u8.into()),
            ("eCmnd", "chime".into()),
            ("fGroup", true.into()),
            ("fRepeat", false.into()),
            ("cRssi", 0x70u8.into()),
        ]);

        let payload = pack(&schema, &values).unwrap();
        assert_eq!(payload, vec![0x01, 0x01, 0x41, 0x07, 0x01, 0x70]);
        assert_eq!(unpack(&schema, &payload).unwrap(), values);
    }

    #[test]
    fn subtype_enum_rejects_symbol_of_other_subtype() {
        let schema = lighting();
        let values = map([
            ("eSubtype", "X10".into()),
            ("cSeqnbr", 1u8.into()),
            ("cHouse", 0x41u8.into()),
            ("eCmnd", "chime".into()),
            ("fGroup", true.into()),
            ("fRepeat", false.into()),
            ("cRssi", 0u8.into()),
        ]);

        let err = pack(&schema, &values).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownEnumValue {
                field: "eCmnd".to_string(),
                value: "chime".to_string()
            }
        );
    }

    #[test]
    fn decode_unknown_subtype_code_fails() {
        let schema = lighting();
        let err = unpack(&schema, &[0x05, 0, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownEnumCode {
                field: "eSubtype".to_string(),
                code: 0x05
            }
        );

        let err = unpack(&schema, &[0x00, 0, 0, 0x07, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownEnumCode {
                field: "eCmnd".to_string(),
                code: 0x07
            }
        );
    }

    #[test]
    fn subtype_without_nested_table_fails() {
        let schema = schema(
            "Lighting",
            r#"{
                "value": 16,
                "fields": ["eSubtype", "eCmnd"],
                "enums": {
                    "eSubtype": { "X10": 0, "ARC": 1 },
                    "eCmnd": { "X10": { "off": 0, "on": 1 } }
                }
            }"#,
        );
        let expected = CodecError::UnknownSubtype {
            field: "eCmnd".to_string(),
            subtype: "ARC".to_string(),
        };

        assert_eq!(unpack(&schema, &[0x01, 0x00]).unwrap_err(), expected);

        let values = map([("eSubtype", "ARC".into()), ("eCmnd", "on".into())]);
        assert_eq!(pack(&schema, &values).unwrap_err(), expected);

        let values = map([("eSubtype", "X10".into()), ("eCmnd", "on".into())]);
        assert_eq!(pack(&schema, &values).unwrap(), vec![0x00, 0x01]);
    }

    #[test]
    fn missing_field_is_an_error() {
        let schema = interface_control();
        let values = map([
            ("eSubtype", "Interface Control".into()),
            ("eCmnd", "reset".into()),
            ("cMsg1", 0u8.into()),
            ("cMsg2", 0u8.into()),
        ]);
        assert_eq!(
            pack(&schema, &values).unwrap_err(),
            CodecError::MissingField("cSeqnbr".to_string())
        );
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        let schema = interface_control();
        let values = map([
            ("eSubtype", "Interface Control".into()),
            ("cSeqnbr", 0u8.into()),
            ("eCmnd", "reboot".into()),
            ("cMsg1", 0u8.into()),
            ("cMsg2", 0u8.into()),
        ]);
        assert!(matches!(
            pack(&schema, &values),
            Err(CodecError::UnknownEnumValue { .. })
        ));
    }

    #[test]
    fn wrong_value_shape_is_a_mismatch() {
        let schema = interface_control();
        let values = map([
            ("eSubtype", "Interface Control".into()),
            ("cSeqnbr", true.into()),
            ("eCmnd", "reset".into()),
            ("cMsg1", 0u8.into()),
            ("cMsg2", 0u8.into()),
        ]);
        assert_eq!(
            pack(&schema, &values).unwrap_err(),
            CodecError::TypeMismatch {
                field: "cSeqnbr".to_string(),
                expected: "byte"
            }
        );
    }

    #[test]
    fn payload_length_must_match_layout() {
        let schema = interface_control();
        assert_eq!(
            unpack(&schema, &[0, 0, 0, 0]).unwrap_err(),
            CodecError::TruncatedPayload {
                expected: 5,
                actual: 4
            }
        );
        assert_eq!(
            unpack(&schema, &[0, 0, 0, 0, 0, 0]).unwrap_err(),
            CodecError::TrailingBytes {
                expected: 5,
                actual: 6
            }
        );
    }

    #[test]
    fn extra_values_are_ignored() {
        let schema = interface_control();
        let values = map([
            ("eSubtype", "Interface Control".into()),
            ("cSeqnbr", 0u8.into()),
            ("eCmnd", "get status".into()),
            ("cMsg1", 0u8.into()),
            ("cMsg2", 0u8.into()),
            ("cUnused", 5u8.into()),
        ]);
        assert_eq!(pack(&schema, &values).unwrap(), vec![0, 0, 2, 0, 0]);
    }

    fn lighting_values() -> impl Strategy<Value = FieldMap> {
        let x10 = prop_oneof![Just("off"), Just("on"), Just("dim")];
        let arc = prop_oneof![Just("off"), Just("on"), Just("chime")];
        (
            prop_oneof![(Just("X10"), x10), (Just("ARC"), arc)],
            any::<u8>(),
            any::<u8>(),
            any::<bool>(),
            any::<bool>(),
            any::<u8>(),
        )
            .prop_map(|((subtype, cmnd), seq, house, group, repeat, rssi)| {
                map([
                    ("eSubtype", subtype.into()),
                    ("cSeqnbr", seq.into()),
                    ("cHouse", house.into()),
                    ("eCmnd", cmnd.into()),
                    ("fGroup", group.into()),
                    ("fRepeat", repeat.into()),
                    ("cRssi", rssi.into()),
                ])
            })
    }

    proptest! {
        #[test]
        fn lighting_roundtrip(values in lighting_values()) {
            let schema = lighting();
            let payload = pack(&schema, &values).unwrap();
            prop_assert_eq!(payload.len(), schema.payload_len());
            prop_assert_eq!(unpack(&schema, &payload).unwrap(), values);
        }

        #[test]
        fn flag_runs_roundtrip(bits in proptest::collection::vec(any::<bool>(), 1..40)) {
            let names: Vec<String> = (0..bits.len()).map(|i| format!("f{i}")).collect();
            let text = serde_json::json!({ "value": 2, "fields": names }).to_string();
            let schema = schema("Bits", &text);
            let values: FieldMap = names
                .iter()
                .cloned()
                .zip(bits.iter().map(|bit| FieldValue::Flag(*bit)))
                .collect();

            let payload = pack(&schema, &values).unwrap();
            prop_assert_eq!(payload.len(), bits.len().div_ceil(8));
            prop_assert_eq!(unpack(&schema, &payload).unwrap(), values);
        }
    }
}
