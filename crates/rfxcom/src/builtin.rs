//! Device schemas compiled into the crate.

use rfxcom_schema::{SchemaRegistry, SchemaSource};

/// Bundled `(name, json)` schema sources, in registration order.
pub const SCHEMAS: &[(&str, &str)] = &[
    (
        "InterfaceControl",
        include_str!("../schemas/InterfaceControl.schema.json"),
    ),
    (
        "InterfaceMessage",
        include_str!("../schemas/InterfaceMessage.schema.json"),
    ),
    (
        "ReceiverStarted",
        include_str!("../schemas/ReceiverStarted.schema.json"),
    ),
    (
        "Temperature",
        include_str!("../schemas/Temperature.schema.json"),
    ),
];

/// Bundled schemas as loadable sources.
pub fn sources() -> impl Iterator<Item = SchemaSource> {
    SCHEMAS
        .iter()
        .map(|(name, text)| SchemaSource::new(*name, *text))
}

/// Registry over the bundled schemas.
pub fn registry() -> rfxcom_schema::Result<SchemaRegistry> {
    SchemaRegistry::from_embedded(SCHEMAS)
}
