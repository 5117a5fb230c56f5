use std::collections::HashMap;
use std::fmt;

use rfxcom_schema::{FieldMap, Message};

/// Receives the decoded fields of one packet type.
pub trait Handler: Send {
    fn handle(&mut self, fields: &FieldMap);
}

impl<F> Handler for F
where
    F: FnMut(&FieldMap) + Send,
{
    fn handle(&mut self, fields: &FieldMap) {
        self(fields)
    }
}

/// Receives packets with no handler registered for their schema.
pub trait FallbackHandler: Send {
    fn handle(&mut self, schema: &str, fields: &FieldMap);
}

impl<F> FallbackHandler for F
where
    F: FnMut(&str, &FieldMap) + Send,
{
    fn handle(&mut self, schema: &str, fields: &FieldMap) {
        self(schema, fields)
    }
}

/// Which handler a message was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Handler,
    Fallback,
}

/// Routes decoded messages to handlers keyed by schema name.
pub struct Dispatcher {
    handlers: HashMap<String, Box<dyn Handler>>,
    fallback: Box<dyn FallbackHandler>,
}

impl Dispatcher {
    /// Create a dispatcher whose fallback logs unhandled messages.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Box::new(log_unhandled),
        }
    }

    /// Route messages decoded with `schema` to `handler`, replacing any
    /// previous handler for that name.
    pub fn register_handler(&mut self, schema: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(schema.into(), Box::new(handler));
    }

    /// Remove the handler for `schema`. Its messages go to the fallback.
    pub fn remove_handler(&mut self, schema: &str) -> bool {
        self.handlers.remove(schema).is_some()
    }

    /// Replace the fallback handler.
    pub fn set_default_handler(&mut self, handler: impl FallbackHandler + 'static) {
        self.fallback = Box::new(handler);
    }

    /// True when `schema` has its own handler.
    pub fn has_handler(&self, schema: &str) -> bool {
        self.handlers.contains_key(schema)
    }

    /// Hand `message` to its schema's handler, or to the fallback.
    pub fn dispatch(&mut self, message: &Message) -> Dispatched {
        match self.handlers.get_mut(&message.schema) {
            Some(handler) => {
                handler.handle(&message.fields);
                Dispatched::Handler
            }
            None => {
                self.fallback.handle(&message.schema, &message.fields);
                Dispatched::Fallback
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("handlers", &names)
            .finish_non_exhaustive()
    }
}

fn log_unhandled(schema: &str, fields: &FieldMap) {
    let fields = fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!(schema, %fields, "unhandled message");
}
