/// Controls schema loading behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of schemas loaded from a directory.
    pub max_schemas_from_directory: usize,
    /// Maximum bytes allowed per schema file loaded from a directory.
    pub max_schema_file_size: usize,
    /// When true, subtype-indexed enum tables keyed by a subtype the
    /// `eSubtype` table does not define fail to load instead of logging a
    /// warning.
    pub strict_subtypes: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_schemas_from_directory: 256,
            max_schema_file_size: 64 * 1024,
            strict_subtypes: false,
        }
    }
}
