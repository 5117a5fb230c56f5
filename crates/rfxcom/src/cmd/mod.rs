use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use rfxcom_schema::SchemaRegistry;

use crate::exit::{schema_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod schemas;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List loaded schemas.
    Schemas(SchemasArgs),
    /// Encode field values into a frame.
    Encode(EncodeArgs),
    /// Decode frames from hex or a capture file.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, schemas: Option<&Path>) -> CliResult<i32> {
    match command {
        Command::Schemas(args) => schemas::run(args, format, schemas),
        Command::Encode(args) => encode::run(args, format, schemas),
        Command::Decode(args) => decode::run(args, format, schemas),
        Command::Version(args) => version::run(args),
    }
}

/// Load the schema directory, or the bundled schemas when none is given.
pub fn load_registry(schemas: Option<&Path>) -> CliResult<SchemaRegistry> {
    let Some(dir) = schemas else {
        return rfxcom::builtin::registry()
            .map_err(|err| schema_error("loading bundled schemas", err));
    };
    SchemaRegistry::from_directory(dir)
        .map_err(|err| schema_error(&format!("loading {}", dir.display()), err))
}

#[derive(Args, Debug, Default)]
pub struct SchemasArgs {}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Schema name.
    pub name: String,
    /// Field values as FIELD=VALUE (true/false, integer, or enum symbol).
    #[arg(value_name = "FIELD=VALUE")]
    pub values: Vec<String>,
    /// Field values as a JSON object. FIELD=VALUE arguments take precedence.
    #[arg(long, value_name = "OBJECT")]
    pub json: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes in hex. Whitespace and ':' separators are ignored.
    #[arg(value_name = "HEX", conflicts_with = "file")]
    pub hex: Vec<String>,
    /// Read raw frames from a capture file, or '-' for stdin.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
