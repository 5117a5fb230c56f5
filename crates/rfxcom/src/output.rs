use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use rfxcom_frame::FrameWriter;
use rfxcom_schema::{Message, Schema, SchemaRegistry};
use serde::Serialize;

use crate::exit::{frame_error, CliResult};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    #[serde(flatten)]
    message: &'a Message,
    frame: String,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    schema: &'a str,
    type_code: u8,
    frame: String,
}

#[derive(Serialize)]
struct SchemaOutput<'a> {
    name: &'a str,
    type_code: u8,
    payload_len: usize,
    fields: Vec<&'a str>,
}

/// Print one decoded message. `wire` is the complete frame it came from.
pub fn print_message(message: &Message, wire: &[u8], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                message,
                frame: hex::encode(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    format!("{} (0x{:02x})", message.schema, message.type_code),
                    "VALUE".to_string(),
                ]);
            for (name, value) in &message.fields {
                table.add_row(vec![name.clone(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let fields = message
                .fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "{} type=0x{:02x} {}",
                message.schema, message.type_code, fields
            );
        }
        OutputFormat::Raw => print_raw(wire)?,
    }
    Ok(())
}

/// Print one encoded frame.
pub fn print_encoded(schema: &Schema, wire: &[u8], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                schema: schema.name(),
                type_code: schema.type_code(),
                frame: hex::encode(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SCHEMA", "TYPE", "LENGTH", "FRAME"])
                .add_row(vec![
                    schema.name().to_string(),
                    format!("0x{:02x}", schema.type_code()),
                    wire.len().to_string(),
                    hex::encode(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", spaced_hex(wire)),
        OutputFormat::Raw => print_raw(wire)?,
    }
    Ok(())
}

pub fn print_schemas(registry: &SchemaRegistry, format: OutputFormat) {
    let mut schemas: Vec<&Schema> = registry.iter().collect();
    schemas.sort_by(|a, b| {
        a.type_code()
            .cmp(&b.type_code())
            .then_with(|| a.name().cmp(b.name()))
    });

    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            let out: Vec<SchemaOutput<'_>> = schemas
                .iter()
                .map(|schema| SchemaOutput {
                    name: schema.name(),
                    type_code: schema.type_code(),
                    payload_len: schema.payload_len(),
                    fields: schema.fields().iter().map(|f| f.name.as_str()).collect(),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "TYPE", "PAYLOAD", "FIELDS"]);
            for schema in &schemas {
                table.add_row(vec![
                    schema.name().to_string(),
                    format!("0x{:02x}", schema.type_code()),
                    schema.payload_len().to_string(),
                    schema.fields().len().to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for schema in &schemas {
                println!(
                    "{} type=0x{:02x} payload={} fields={}",
                    schema.name(),
                    schema.type_code(),
                    schema.payload_len(),
                    schema.fields().len()
                );
            }
        }
    }
}

/// Write complete frames to stdout unchanged.
pub fn print_raw(wire: &[u8]) -> CliResult<()> {
    let mut writer = FrameWriter::new(std::io::stdout().lock());
    writer
        .send_raw(wire)
        .and_then(|()| writer.flush())
        .map_err(|err| frame_error("stdout write failed", err))
}

fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
