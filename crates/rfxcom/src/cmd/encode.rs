use std::path::Path;
use std::sync::Arc;

use rfxcom_protocol::{Generator, ProtocolError};
use rfxcom_schema::{FieldMap, FieldValue};

use crate::cmd::{load_registry, EncodeArgs};
use crate::exit::{protocol_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat, schemas: Option<&Path>) -> CliResult<i32> {
    let registry = Arc::new(load_registry(schemas)?);
    let values = resolve_values(&args)?;

    let schema = registry.get(&args.name).ok_or_else(|| {
        protocol_error(
            "encode failed",
            ProtocolError::UnknownSchema(args.name.clone()),
        )
    })?;

    let generator = Generator::new(Arc::clone(&registry));
    let wire = generator
        .encode(&args.name, &values)
        .map_err(|err| protocol_error("encode failed", err))?;

    print_encoded(schema, &wire, format)?;
    Ok(SUCCESS)
}

fn resolve_values(args: &EncodeArgs) -> CliResult<FieldMap> {
    let mut values = FieldMap::new();
    if let Some(json) = &args.json {
        values = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not a field object: {err}")))?;
    }

    for arg in &args.values {
        let (name, value) = parse_assignment(arg)?;
        values.insert(name.to_string(), value);
    }
    Ok(values)
}

fn parse_assignment(arg: &str) -> CliResult<(&str, FieldValue)> {
    let Some((name, raw)) = arg.split_once('=') else {
        return Err(CliError::new(USAGE, format!("expected FIELD=VALUE, got {arg:?}")));
    };
    if name.is_empty() {
        return Err(CliError::new(USAGE, format!("missing field name in {arg:?}")));
    }
    Ok((name, parse_value(raw)?))
}

/// `true`/`false` are flags, integers (decimal or `0x` hex) are bytes and
/// anything else is an enum symbol.
fn parse_value(raw: &str) -> CliResult<FieldValue> {
    match raw {
        "true" => return Ok(FieldValue::Flag(true)),
        "false" => return Ok(FieldValue::Flag(false)),
        _ => {}
    }

    let number = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16).ok(),
        None if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => raw.parse().ok(),
        None => None,
    };

    match number {
        Some(number) => u8::try_from(number)
            .map(FieldValue::Byte)
            .map_err(|_| CliError::new(USAGE, format!("value {raw} does not fit in a byte"))),
        None => Ok(FieldValue::Symbol(raw.to_string())),
    }
}
