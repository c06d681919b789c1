//! Event-type dispatch.
//!
//! GitHub does not say in the payload which event produced it, so routing is
//! driven entirely by the `x-github-event` metadata entry. The decision table is
//! a closed match over the event types this trigger implements; anything else
//! falls through to [`GitHubEventType::Unsupported`] and is dropped with an
//! error-level log event naming the type and the delivery.
//!
//! | event type     | outcome                                |
//! |----------------|----------------------------------------|
//! | `ping`         | drop (subscription confirmation no-op) |
//! | `pull_request` | forward to handler `pull_request`      |
//! | `push`         | forward to handler `push`              |
//! | anything else  | drop + error diagnostic                |

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::envelope::{headers, EVENT_TYPE_KEY};
use crate::{DispatchError, Envelope, HandlerName};

/// Handler key for pull request events.
pub const PULL_REQUEST_HANDLER: &str = "pull_request";

/// Handler key for push events.
pub const PUSH_HANDLER: &str = "push";

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// GitHub event types known to the dispatcher.
///
/// Parsing is an exact, case-sensitive match on the header value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GitHubEventType {
    /// Sent once when a webhook subscription is created.
    Ping,
    /// A pull request was opened, edited, synchronised, closed, ...
    PullRequest,
    /// Commits were pushed to a branch or tag.
    Push,
    /// Any event type without an implemented handler.
    Unsupported(String),
}

impl GitHubEventType {
    /// Classifies an `x-github-event` header value.
    pub fn parse(value: &str) -> Self {
        match value {
            "ping" => Self::Ping,
            "pull_request" => Self::PullRequest,
            "push" => Self::Push,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The header value this type was parsed from.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ping => "ping",
            Self::PullRequest => "pull_request",
            Self::Push => "push",
            Self::Unsupported(other) => other,
        }
    }
}

impl std::fmt::Display for GitHubEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Routing outcome
// ---------------------------------------------------------------------------

/// What the host should do with an envelope after dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingOutcome {
    /// No handler is invoked.
    Drop,
    /// Invoke `handler` with `payload`.
    Forward {
        /// The handler to invoke.
        handler: HandlerName,
        /// The envelope data with the event type injected.
        payload: Map<String, Value>,
    },
}

impl RoutingOutcome {
    /// Converts the outcome into the `(handler, payload)` pair the host
    /// framework consumes. [`RoutingOutcome::Drop`] becomes `(None, {})`.
    pub fn into_parts(self) -> (Option<HandlerName>, Map<String, Value>) {
        match self {
            Self::Drop => (None, Map::new()),
            Self::Forward { handler, payload } => (Some(handler), payload),
        }
    }

    /// Returns `true` if no handler will be invoked.
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }
}

// ---------------------------------------------------------------------------
// Router port
// ---------------------------------------------------------------------------

/// Consumer of accepted envelopes registered with a trigger.
///
/// Implementations must be stateless across calls: the host may route any
/// number of independent envelopes concurrently.
pub trait EventRouter: Send + Sync {
    /// Decides which handler, if any, processes `envelope`.
    fn route(&self, envelope: Envelope) -> Result<RoutingOutcome, DispatchError>;
}

/// The GitHub decision table as an [`EventRouter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubDispatcher;

impl EventRouter for GitHubDispatcher {
    fn route(&self, envelope: Envelope) -> Result<RoutingOutcome, DispatchError> {
        dispatch(envelope)
    }
}

/// Classifies `envelope` by its GitHub event type.
///
/// For forwarded types the event type is written into the payload under
/// [`EVENT_TYPE_KEY`] so handlers can discover it. `ping` and unsupported
/// types always drop with an empty payload, whatever the data contains.
///
/// # Errors
///
/// - [`DispatchError::MissingEventType`] if the metadata has no
///   `x-github-event` entry.
/// - [`DispatchError::PayloadNotAnObject`] if a forwarded event's data is not
///   a JSON object.
pub fn dispatch(envelope: Envelope) -> Result<RoutingOutcome, DispatchError> {
    let (identifier, metadata, data) = envelope.into_parts();

    let raw_type = metadata
        .get(headers::EVENT)
        .ok_or_else(|| DispatchError::MissingEventType {
            identifier: identifier.to_string(),
            header: headers::EVENT,
        })?;
    let event_type = GitHubEventType::parse(raw_type);

    info!(
        delivery_id = %identifier,
        event_type = %event_type,
        "Processing GitHub webhook as '{event_type}' event"
    );

    let handler = match &event_type {
        // Subscription confirmation; never reaches a handler.
        GitHubEventType::Ping => return Ok(RoutingOutcome::Drop),
        GitHubEventType::PullRequest => PULL_REQUEST_HANDLER,
        GitHubEventType::Push => PUSH_HANDLER,
        GitHubEventType::Unsupported(other) => {
            error!(
                delivery_id = %identifier,
                event_type = %other,
                "Received unsupported GitHub event type '{other}' (id:{identifier})"
            );
            return Ok(RoutingOutcome::Drop);
        }
    };

    let Value::Object(mut payload) = data else {
        return Err(DispatchError::PayloadNotAnObject {
            identifier: identifier.to_string(),
        });
    };
    payload.insert(
        EVENT_TYPE_KEY.to_string(),
        Value::String(event_type.as_str().to_string()),
    );

    Ok(RoutingOutcome::Forward {
        handler: HandlerName::from_static(handler),
        payload,
    })
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
