//! Error types for the trigger domain.
//!
//! Each stage of the envelope lifecycle has its own error type:
//! [`EnvelopeError`] for construction, [`DispatchError`] for routing and
//! [`HandlerError`] for downstream processing. None of these conditions are
//! retried; they are terminal classifications for the delivery that caused them.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Envelope construction
// ---------------------------------------------------------------------------

/// An [`crate::Envelope`] could not be constructed from its parts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The delivery identifier was empty.
    #[error("Envelope identifier must not be empty")]
    EmptyIdentifier,

    /// No metadata (request headers) was supplied.
    #[error("Envelope metadata must not be empty")]
    EmptyMetadata,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The dispatcher could not classify an envelope.
///
/// Unsupported event types are **not** errors: they resolve to
/// [`crate::RoutingOutcome::Drop`] with an error-level log event instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The event-type header was absent from the envelope metadata.
    ///
    /// The ingress adapter copies every request header into the metadata, so
    /// this indicates the provider (or an upstream proxy) broke the contract.
    #[error("Envelope '{identifier}' has no '{header}' metadata entry")]
    MissingEventType {
        /// Identifier of the offending envelope.
        identifier: String,
        /// Metadata key that was expected.
        header: &'static str,
    },

    /// The payload of a forwarded event was not a JSON object, so the event
    /// type could not be injected into it.
    #[error("Envelope '{identifier}' payload is not a JSON object")]
    PayloadNotAnObject {
        /// Identifier of the offending envelope.
        identifier: String,
    },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// A downstream handler failed to produce a result.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No handler is registered under the requested name.
    #[error("No handler registered as '{0}'")]
    UnknownHandler(String),

    /// The handler completed but produced no result; the execution is failed.
    #[error("Handler '{0}' returned an empty result")]
    EmptyResult(String),

    /// The handler reported a failure of its own.
    #[error("Handler '{handler}' failed: {message}")]
    Failed {
        /// The handler that failed.
        handler: String,
        /// Human-readable description of the failure.
        message: String,
    },
}
