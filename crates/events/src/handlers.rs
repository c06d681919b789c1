//! Downstream handler port and the built-in pass-through handlers.
//!
//! A handler receives the payload produced by the dispatcher together with an
//! [`ExecutionContext`] and returns the value that re-enters the workflow bus.
//! Returning `Ok(None)` means "no result", which the host treats as a terminal
//! failure of the execution.
//!
//! The `pull_request` and `push` handlers currently pass the payload through
//! unchanged; [`EventHandler::process`] defaults to that identity behaviour so
//! new logic can be added per handler without touching the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument};

use crate::dispatch::{PULL_REQUEST_HANDLER, PUSH_HANDLER};
use crate::{ExecutionContext, HandlerError};

/// Capability interface implemented by every downstream handler.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// The stable key the dispatcher uses to select this handler.
    fn name(&self) -> &str;

    /// Processes one payload.
    ///
    /// The default implementation returns the payload unchanged, except that
    /// a JSON `null` payload yields no result.
    ///
    /// # Errors
    ///
    /// Implementations return [`HandlerError::Failed`] for their own failures.
    async fn process(
        &self,
        payload: Value,
        _context: &ExecutionContext,
    ) -> Result<Option<Value>, HandlerError> {
        Ok(pass_through(payload))
    }
}

// ---------------------------------------------------------------------------
// Built-in handlers
// ---------------------------------------------------------------------------

/// Handles `pull_request` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullRequestHandler;

#[async_trait]
impl EventHandler for PullRequestHandler {
    fn name(&self) -> &str {
        PULL_REQUEST_HANDLER
    }
}

/// Handles `push` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushHandler;

#[async_trait]
impl EventHandler for PushHandler {
    fn name(&self) -> &str {
        PUSH_HANDLER
    }

    async fn process(
        &self,
        payload: Value,
        context: &ExecutionContext,
    ) -> Result<Option<Value>, HandlerError> {
        info!(
            execution_id = %context.execution_id().unwrap_or_default(),
            "Processing GitHub push event"
        );
        Ok(pass_through(payload))
    }
}

/// Identity transform shared by the built-in handlers. `null` is "no result".
fn pass_through(payload: Value) -> Option<Value> {
    (!payload.is_null()).then_some(payload)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Handlers addressable by name.
///
/// Names are the same keys the dispatcher puts in
/// [`crate::RoutingOutcome::Forward`].
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the `pull_request` and `push` handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PullRequestHandler));
        registry.register(Arc::new(PushHandler));
        registry
    }

    /// Registers `handler` under its own name, replacing any previous
    /// handler with that name.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    /// Looks up a handler by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn EventHandler>> {
        self.handlers.get(name)
    }

    /// Names of all registered handlers, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the handler registered as `name`.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::UnknownHandler`] if nothing is registered as `name`.
    /// - [`HandlerError::EmptyResult`] if the handler produced no result.
    /// - Any error the handler itself returns.
    #[instrument(skip(self, payload, context), fields(handler = %name))]
    pub async fn invoke(
        &self,
        name: &str,
        payload: Value,
        context: &ExecutionContext,
    ) -> Result<Value, HandlerError> {
        let handler = self
            .get(name)
            .ok_or_else(|| HandlerError::UnknownHandler(name.to_string()))?;

        handler
            .process(payload, context)
            .await?
            .ok_or_else(|| HandlerError::EmptyResult(name.to_string()))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
