//! Core domain of the GitHub webhook trigger.
//!
//! This crate holds the canonical [`Envelope`] every webhook delivery is
//! normalised into, the event-type dispatcher that decides which downstream
//! handler (if any) processes it, and the [`EventHandler`] port those handlers
//! implement. Infrastructure crates (HTTP ingress, the event bus) build on
//! these types; they never add routing rules of their own.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Every operation here is a pure function of its input, so the host may call
//! it concurrently for independent deliveries without synchronisation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`envelope`] | [`Envelope`], GitHub header names, the injected event-type key |
//! | [`dispatch`] | [`GitHubEventType`], [`RoutingOutcome`], [`EventRouter`], [`dispatch()`] |
//! | [`handlers`] | [`EventHandler`] port, pass-through handlers, [`HandlerRegistry`] |
//! | [`identifiers`] | Newtype identifiers (`DeliveryId`, `HandlerName`, ...) |
//! | [`types`] | [`ExecutionContext`], [`Timestamp`] |
//! | [`errors`] | Per-stage error types |

pub mod dispatch;
pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod identifiers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use dispatch::{
    dispatch, EventRouter, GitHubDispatcher, GitHubEventType, RoutingOutcome,
    PULL_REQUEST_HANDLER, PUSH_HANDLER,
};
pub use envelope::{headers, Envelope, Metadata, EVENT_TYPE_KEY};
pub use errors::{DispatchError, EnvelopeError, HandlerError};
pub use handlers::{EventHandler, HandlerRegistry, PullRequestHandler, PushHandler};
pub use identifiers::{ClientIdentifier, ClientVersion, DeliveryId, HandlerName};
pub use types::{ExecutionContext, Timestamp, EXECUTION_ID_KEY, STARTED_AT_KEY};
