//! Canonical representation of one inbound webhook occurrence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DeliveryId, EnvelopeError};

/// Header names GitHub sends with every webhook delivery.
///
/// The host HTTP layer normalises header names to lowercase before they reach
/// the ingress adapter, so these are the only spellings looked up.
pub mod headers {
    /// Unique identifier of one delivery attempt.
    pub const DELIVERY: &str = "x-github-delivery";

    /// Name of the event that triggered the delivery (`push`, `ping`, ...).
    pub const EVENT: &str = "x-github-event";
}

/// Key under which the dispatcher injects the event type into the payload.
///
/// The payload alone does not say which GitHub event produced it, and
/// handlers never see the envelope metadata.
pub const EVENT_TYPE_KEY: &str = headers::EVENT;

/// Request header mapping: lowercase header name to value.
pub type Metadata = HashMap<String, String>;

/// A webhook delivery normalised for the event bus.
///
/// Created once per inbound request by the ingress adapter and consumed by the
/// dispatcher. `identifier` and `metadata` never change after construction;
/// `data` is only touched by the dispatcher when it injects
/// [`EVENT_TYPE_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    identifier: DeliveryId,
    metadata: Metadata,
    data: Value,
}

impl Envelope {
    /// Creates an envelope.
    ///
    /// `data` may be an empty object but is always present.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::EmptyIdentifier`] if `identifier` is empty.
    /// - [`EnvelopeError::EmptyMetadata`] if `metadata` has no entries.
    pub fn new(
        identifier: impl Into<String>,
        metadata: Metadata,
        data: Value,
    ) -> Result<Self, EnvelopeError> {
        let identifier = DeliveryId::new(identifier).ok_or(EnvelopeError::EmptyIdentifier)?;
        if metadata.is_empty() {
            return Err(EnvelopeError::EmptyMetadata);
        }
        Ok(Self {
            identifier,
            metadata,
            data,
        })
    }

    /// The delivery identifier, reused as the workflow execution identifier.
    pub fn identifier(&self) -> &DeliveryId {
        &self.identifier
    }

    /// The request headers the envelope was created from.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The decoded request body.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Looks up a single metadata entry.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Splits the envelope into its owned parts.
    pub fn into_parts(self) -> (DeliveryId, Metadata, Value) {
        (self.identifier, self.metadata, self.data)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
