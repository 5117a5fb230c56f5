use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use rfxcom_schema::{FieldMap, SchemaRegistry};

use crate::error::{ProtocolError, Result};

/// Builds outgoing frames from named field values.
#[derive(Debug, Clone)]
pub struct Generator {
    registry: Arc<SchemaRegistry>,
}

impl Generator {
    /// Create a generator over a shared schema registry.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Encode one complete frame for the schema registered as `name`.
    pub fn encode(&self, name: &str, values: &FieldMap) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode_into(name, values, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Append one complete frame to `dst`. Nothing is written on error.
    pub fn encode_into(&self, name: &str, values: &FieldMap, dst: &mut BytesMut) -> Result<()> {
        let schema = self
            .registry
            .get(name)
            .ok_or_else(|| ProtocolError::UnknownSchema(name.to_string()))?;
        let payload = schema.pack(values)?;
        rfxcom_frame::encode_frame(schema.type_code(), &payload, dst)?;
        tracing::trace!(
            schema = name,
            type_code = schema.type_code(),
            payload_len = payload.len(),
            "frame encoded"
        );
        Ok(())
    }

    /// Registry the generator looks schemas up in.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }
}
