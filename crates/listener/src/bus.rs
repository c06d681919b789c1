//! In-process event bus and the consumer that drives dispatch.
//!
//! Accepted envelopes are published to an [`EventBus`]. The [`EventConsumer`]
//! receives them, asks the trigger's [`EventRouter`] for a routing decision
//! and, for forwarded events, invokes the named handler with the payload and a
//! fresh [`ExecutionContext`].
//!
//! [`InMemoryEventBus`] is a bounded tokio channel: publishers wait when the
//! consumer falls behind. Each envelope is processed on its own task, so a slow
//! handler never holds up unrelated deliveries. Nothing here retries; a failed
//! execution is logged with its execution id and abandoned.

use std::sync::Arc;

use async_trait::async_trait;
use events::{
    DispatchError, Envelope, EventRouter, ExecutionContext, HandlerError, HandlerName,
    HandlerRegistry, RoutingOutcome,
};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Errors returned when publishing to a bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The consuming side of the bus has shut down.
    #[error("event bus is closed; envelope '{0}' was not published")]
    Closed(String),
}

/// Destination for accepted envelopes.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes one envelope.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Closed`] if the bus can no longer accept envelopes.
    async fn publish(&self, envelope: Envelope) -> Result<(), BusError>;
}

/// Bounded in-memory bus backed by a tokio `mpsc` channel.
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    sender: mpsc::Sender<Envelope>,
}

/// Receiving half of an [`InMemoryEventBus`].
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::Receiver<Envelope>,
}

impl InMemoryEventBus {
    /// Creates a bus holding at most `capacity` unconsumed envelopes.
    ///
    /// A `capacity` of zero is treated as one.
    pub fn channel(capacity: usize) -> (Self, EventStream) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, EventStream { receiver })
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: Envelope) -> Result<(), BusError> {
        let identifier = envelope.identifier().to_string();
        self.sender
            .send(envelope)
            .await
            .map_err(|_| BusError::Closed(identifier))
    }
}

impl EventStream {
    /// Waits for the next envelope. Returns `None` once every publisher has
    /// been dropped and the buffer is drained.
    pub async fn next(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}

// ---------------------------------------------------------------------------
// Consuming
// ---------------------------------------------------------------------------

/// Errors produced while consuming one envelope.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The router rejected the envelope.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The selected handler was missing, failed, or produced no result.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Result of consuming one envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumeOutcome {
    /// The router dropped the envelope; no handler ran.
    Dropped,
    /// The handler ran and produced `output`.
    Completed {
        /// Handler the router selected.
        handler: HandlerName,
        /// The handler's result.
        output: Value,
    },
}

/// Routes envelopes and runs the selected handlers.
#[derive(Clone)]
pub struct EventConsumer {
    router: Arc<dyn EventRouter>,
    handlers: Arc<HandlerRegistry>,
}

impl EventConsumer {
    /// Creates a consumer that routes with `router` and runs `handlers`.
    pub fn new(router: Arc<dyn EventRouter>, handlers: Arc<HandlerRegistry>) -> Self {
        Self { router, handlers }
    }

    /// Processes a single envelope to completion.
    ///
    /// # Errors
    ///
    /// - [`ConsumeError::Dispatch`] if the router rejects the envelope.
    /// - [`ConsumeError::Handler`] if the handler is unknown, fails, or
    ///   returns an empty result.
    #[instrument(skip(self, envelope), fields(execution_id = %envelope.identifier()))]
    pub async fn consume(&self, envelope: Envelope) -> Result<ConsumeOutcome, ConsumeError> {
        let context = ExecutionContext::new(envelope.identifier().as_str());

        let (handler, payload) = match self.router.route(envelope)? {
            RoutingOutcome::Drop => {
                debug!("Envelope dropped by router");
                return Ok(ConsumeOutcome::Dropped);
            }
            RoutingOutcome::Forward { handler, payload } => (handler, payload),
        };

        let output = self
            .handlers
            .invoke(handler.as_str(), Value::Object(payload), &context)
            .await?;

        info!(handler = %handler, "Handler completed");
        Ok(ConsumeOutcome::Completed { handler, output })
    }

    /// Consumes `stream` until every publisher is dropped.
    ///
    /// Each envelope runs on its own task; failures are logged and do not
    /// stop the loop. Returns once all in-flight tasks have finished.
    pub async fn run(self, mut stream: EventStream) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                maybe_envelope = stream.next() => {
                    let Some(envelope) = maybe_envelope else { break };
                    let consumer = self.clone();
                    tasks.spawn(async move {
                        let execution_id = envelope.identifier().to_string();
                        if let Err(err) = consumer.consume(envelope).await {
                            error!(execution_id = %execution_id, error = %err, "Execution failed");
                        }
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(err) = joined {
                        error!(error = %err, "Consumer task panicked or was cancelled");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "Consumer task panicked or was cancelled");
            }
        }
        info!("Event stream closed; consumer stopped");
    }
}

impl std::fmt::Debug for EventConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumer")
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
