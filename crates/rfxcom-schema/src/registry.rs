use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::model::Schema;
use crate::source::SchemaSource;

/// Loaded schemas, looked up by name or by packet type code.
///
/// Built once, then only read; share it across sessions behind an `Arc`.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: Vec<Schema>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<u8, Vec<usize>>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: Vec::new(),
            by_name: HashMap::new(),
            by_type: HashMap::new(),
            config,
        }
    }

    /// Add a schema. Several schemas may share a type code; names are unique.
    pub fn register(&mut self, schema: Schema) -> Result<()> {
        if self.by_name.contains_key(schema.name()) {
            return Err(SchemaError::DuplicateName(schema.name().to_string()));
        }

        for (field, subtype) in schema.undeclared_subtypes() {
            if self.config.strict_subtypes {
                let reason = format!("field {field} maps undeclared subtype {subtype:?}");
                return Err(SchemaError::invalid(schema.name(), reason));
            }
            tracing::warn!(
                schema = schema.name(),
                field,
                subtype,
                "enum table keyed by undeclared subtype"
            );
        }

        tracing::debug!(
            schema = schema.name(),
            type_code = schema.type_code(),
            payload_len = schema.payload_len(),
            "schema registered"
        );

        let index = self.schemas.len();
        self.by_name.insert(schema.name().to_string(), index);
        self.by_type
            .entry(schema.type_code())
            .or_default()
            .push(index);
        self.schemas.push(schema);
        Ok(())
    }

    /// Parse and register one schema source.
    pub fn register_source(&mut self, source: &SchemaSource) -> Result<()> {
        let schema = Schema::from_source(source)?;
        self.register(schema)
    }

    /// Load every source, in order.
    pub fn from_sources<I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = SchemaSource>,
    {
        Self::from_sources_with_config(sources, RegistryConfig::default())
    }

    /// Load every source, in order, with explicit config.
    pub fn from_sources_with_config<I>(sources: I, config: RegistryConfig) -> Result<Self>
    where
        I: IntoIterator<Item = SchemaSource>,
    {
        let mut registry = Self::with_config(config);
        for source in sources {
            registry.register_source(&source)?;
        }
        Ok(registry)
    }

    /// Load from embedded `(name, json)` pairs.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        Self::from_sources(
            schemas
                .iter()
                .map(|(name, text)| SchemaSource::new(*name, *text)),
        )
    }

    /// Load `<Name>.schema.json` files from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load `<Name>.schema.json` files from a directory with explicit config.
    ///
    /// Files are loaded in file-name order, which fixes the best-match order
    /// of schemas sharing a type code.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);

        let entries = std::fs::read_dir(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
        let mut entries = entries
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut loaded = 0usize;
        for entry in entries {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(name) = SchemaSource::name_from_file_name(&file_name) else {
                continue;
            };
            let entry_path = entry.path();
            let link_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            if link_metadata.file_type().is_symlink() {
                let reason = format!("refusing to load schema symlink: {file_name}");
                return Err(SchemaError::LoadFailed(reason));
            }
            if !link_metadata.is_file() {
                continue;
            }

            loaded = loaded.saturating_add(1);
            let max_schemas = registry.config.max_schemas_from_directory;
            if loaded > max_schemas {
                let reason = format!("more than {max_schemas} schema files in {}", path.display());
                return Err(SchemaError::LoadFailed(reason));
            }

            let max_bytes = registry.config.max_schema_file_size;
            let text = read_schema_text(&entry_path, &link_metadata, max_bytes)?;
            registry.register_source(&SchemaSource::new(name, text))?;
        }

        Ok(registry)
    }

    /// Schema registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.by_name.get(name).map(|index| &self.schemas[*index])
    }

    /// True when a schema is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Schemas sharing `type_code`, in registration order.
    pub fn candidates(&self, type_code: u8) -> impl Iterator<Item = &Schema> {
        self.by_type
            .get(&type_code)
            .into_iter()
            .flatten()
            .map(|index| &self.schemas[*index])
    }

    /// The only schema for `type_code`; `None` when there are zero or several.
    pub fn resolve_exact(&self, type_code: u8) -> Option<&Schema> {
        match self.by_type.get(&type_code).map(Vec::as_slice) {
            Some([index]) => Some(&self.schemas[*index]),
            _ => None,
        }
    }

    /// The first schema for `type_code` whose payload length equals
    /// `payload.len()`.
    pub fn resolve_best(&self, type_code: u8, payload: &[u8]) -> Option<&Schema> {
        self.candidates(type_code)
            .find(|schema| schema.payload_len() == payload.len())
    }

    /// Resolve an incoming frame: the single candidate when the type code is
    /// unambiguous, otherwise the best match by payload length.
    pub fn resolve(&self, type_code: u8, payload: &[u8]) -> Option<&Schema> {
        self.resolve_exact(type_code)
            .or_else(|| self.resolve_best(type_code, payload))
    }

    /// Registered schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Type codes with at least one schema, sorted.
    pub fn type_codes(&self) -> Vec<u8> {
        let mut codes: Vec<u8> = self.by_type.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one schema file, refusing anything over `max_bytes` and any file
/// swapped out after it was listed.
fn read_schema_text(path: &Path, listed: &std::fs::Metadata, max_bytes: usize) -> Result<String> {
    let load_failed = |what: &str, err: std::io::Error| {
        SchemaError::LoadFailed(format!("{what} {}: {err}", path.display()))
    };
    let too_large = || SchemaError::LoadFailed(format!("schema too large: {}", path.display()));

    let file = std::fs::File::open(path).map_err(|err| load_failed("failed opening", err))?;
    let opened = file
        .metadata()
        .map_err(|err| load_failed("failed inspecting", err))?;
    if !is_same_inode(listed, &opened) {
        let reason = format!("schema replaced while loading: {}", path.display());
        return Err(SchemaError::LoadFailed(reason));
    }
    if opened.len() > max_bytes as u64 {
        return Err(too_large());
    }

    // The file may still grow between the size check and the read.
    let limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut text = String::new();
    file.take(limit)
        .read_to_string(&mut text)
        .map_err(|err| load_failed("failed reading", err))?;
    if text.len() > max_bytes {
        return Err(too_large());
    }
    Ok(text)
}

#[cfg(unix)]
fn is_same_inode(a: &std::fs::Metadata, b: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    (a.dev(), a.ino()) == (b.dev(), b.ino())
}

#[cfg(not(unix))]
fn is_same_inode(_: &std::fs::Metadata, _: &std::fs::Metadata) -> bool {
    true
}
