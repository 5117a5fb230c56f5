use std::sync::Arc;

use bytes::Bytes;
use rfxcom_frame::{Frame, FrameConfig, FrameReassembler};
use rfxcom_schema::{FieldMap, Message, SchemaRegistry};

use crate::dispatch::{Dispatcher, FallbackHandler, Handler};
use crate::error::{ProtocolError, Result};
use crate::generator::Generator;

/// Protocol state for one byte stream.
///
/// Owns the reassembly buffer and the handler table; the schema registry is
/// shared. Feed it whatever the device delivered, in any fragmentation.
#[derive(Debug)]
pub struct Session {
    registry: Arc<SchemaRegistry>,
    reassembler: FrameReassembler,
    dispatcher: Dispatcher,
    generator: Generator,
}

impl Session {
    /// Create a session with the default frame limits.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, FrameConfig::default())
    }

    /// Create a session with explicit frame limits.
    pub fn with_config(registry: Arc<SchemaRegistry>, config: FrameConfig) -> Self {
        Self {
            generator: Generator::new(Arc::clone(&registry)),
            registry,
            reassembler: FrameReassembler::with_config(config),
            dispatcher: Dispatcher::new(),
        }
    }

    /// Append a chunk of received bytes and decode every frame it completes.
    ///
    /// Each entry is one frame, in arrival order. A failed entry affects
    /// only its own frame; incomplete trailing data stays buffered.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<Result<Message>> {
        self.reassembler
            .feed_all(chunk)
            .into_iter()
            .map(|frame| self.decode_frame(&frame?))
            .collect()
    }

    /// Append a chunk, then dispatch every message it completes.
    ///
    /// Frames that fail to decode are logged and dropped. Returns the number
    /// of messages dispatched.
    pub fn receive(&mut self, chunk: &[u8]) -> usize {
        let mut dispatched = 0;
        for result in self.feed_bytes(chunk) {
            match result {
                Ok(message) => {
                    self.dispatcher.dispatch(&message);
                    dispatched += 1;
                }
                Err(err) => tracing::warn!(error = %err, "dropping frame"),
            }
        }
        dispatched
    }

    /// Resolve a complete frame to a schema and decode its payload.
    pub fn decode_frame(&self, frame: &Frame) -> Result<Message> {
        let schema = self
            .registry
            .resolve(frame.type_code, &frame.payload)
            .ok_or(ProtocolError::AmbiguousType {
                type_code: frame.type_code,
                payload_len: frame.payload.len(),
            })?;
        let fields = schema.unpack(&frame.payload)?;
        tracing::debug!(
            schema = schema.name(),
            type_code = frame.type_code,
            "frame decoded"
        );
        Ok(Message {
            schema: schema.name().to_string(),
            type_code: frame.type_code,
            fields,
        })
    }

    /// Route messages decoded with `schema` to `handler`.
    pub fn register_handler(&mut self, schema: impl Into<String>, handler: impl Handler + 'static) {
        self.dispatcher.register_handler(schema, handler);
    }

    /// Replace the handler for messages no schema handler claims.
    pub fn set_default_handler(&mut self, handler: impl FallbackHandler + 'static) {
        self.dispatcher.set_default_handler(handler);
    }

    /// Handler table, for removing or inspecting handlers.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Encode an outgoing frame for the schema registered as `name`.
    pub fn encode(&self, name: &str, values: &FieldMap) -> Result<Bytes> {
        self.generator.encode(name, values)
    }

    /// Encoder sharing this session's registry.
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.reassembler.buffered()
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.reassembler.clear();
    }
}
