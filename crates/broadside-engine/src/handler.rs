//! Command handlers and the verb-keyed dispatch table.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use broadside_protocol::{Packet, ResponseCode};

use crate::{Connection, EngineError};

/// The future a handler returns. Boxed so handlers stay object-safe
/// behind the registry.
pub type HandlerFuture<'a> = BoxFuture<'a, Result<(), CommandFault>>;

/// A protocol fault raised by a command handler.
///
/// The receive loop translates it into an outgoing error Response with
/// this code and message; handler faults never crash the loop.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code} {message}")]
pub struct CommandFault {
    /// The response code sent back to the peer.
    pub code: ResponseCode,
    /// Human-readable detail sent in the response message.
    pub message: String,
}

impl CommandFault {
    /// A fault with an explicit code.
    pub fn new(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The command is not valid in the current connection state.
    pub fn sequence(message: impl Into<String>) -> Self {
        Self::new(ResponseCode::SequenceError, message)
    }

    /// The command's argument is malformed.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ResponseCode::SyntaxError, message)
    }

    /// The receiver failed internally.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ResponseCode::InternalError, message)
    }
}

/// A handler for one command verb.
///
/// The contract: given the command's argument and a handle to the
/// connection, send zero or more responses, optionally trigger a state
/// transition, or fail with a [`CommandFault`]. The receive loop awaits
/// the returned future before reading the next line, so a handler that
/// needs to wait for a Response to a command *it* sends must spawn that
/// work instead of blocking here.
pub trait CommandHandler: Send + Sync + 'static {
    /// Handles one received command.
    fn handle<'a>(
        &'a self,
        argument: Option<&'a str>,
        conn: &'a Arc<Connection>,
    ) -> HandlerFuture<'a>;
}

/// The dispatch table: verb → handler.
///
/// Installed once at connection construction and immutable afterwards.
/// Lookup is by exact case-insensitive verb match; no prefix or fuzzy
/// matching.
#[derive(Default)]
pub struct CommandRegistry {
    by_verb: HashMap<String, Arc<dyn CommandHandler>>,
    // Same handlers, keyed by concrete type for programmatic retrieval.
    by_type: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `verb`.
    ///
    /// # Errors
    /// Rejects ill-formed verbs and duplicates at registration time —
    /// a duplicate verb is a programming fault, not a dispatch-time
    /// condition.
    pub fn register<H: CommandHandler>(
        &mut self,
        verb: &str,
        handler: Arc<H>,
    ) -> Result<(), EngineError> {
        // Reuse the packet model's verb grammar.
        Packet::command(verb, None)?;
        let verb = verb.to_ascii_uppercase();
        if self.by_verb.contains_key(&verb) {
            return Err(EngineError::DuplicateVerb(verb));
        }
        self.by_type.insert(
            TypeId::of::<H>(),
            Arc::clone(&handler) as Arc<dyn Any + Send + Sync>,
        );
        self.by_verb.insert(verb, handler);
        Ok(())
    }

    /// Looks up the handler for a verb (case-insensitive).
    pub fn get(&self, verb: &str) -> Option<Arc<dyn CommandHandler>> {
        self.by_verb.get(&verb.to_ascii_uppercase()).cloned()
    }

    /// Retrieves a registered handler by its concrete type, for callers
    /// that need to reach a specific handler's state.
    pub fn get_typed<H: CommandHandler>(&self) -> Option<Arc<H>> {
        self.by_type
            .get(&TypeId::of::<H>())
            .cloned()
            .and_then(|any| any.downcast::<H>().ok())
    }

    /// The registered verbs, sorted.
    pub fn verbs(&self) -> Vec<String> {
        let mut verbs: Vec<String> = self.by_verb.keys().cloned().collect();
        verbs.sort();
        verbs
    }
}
