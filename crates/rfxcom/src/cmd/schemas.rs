use std::path::Path;

use crate::cmd::{load_registry, SchemasArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_schemas, OutputFormat};

pub fn run(_args: SchemasArgs, format: OutputFormat, schemas: Option<&Path>) -> CliResult<i32> {
    let registry = load_registry(schemas)?;
    print_schemas(&registry, format);
    Ok(SUCCESS)
}
