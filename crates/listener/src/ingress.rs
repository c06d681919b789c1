//! Webhook ingress adapter.
//!
//! Converts a raw HTTP request into an [`Envelope`]. The conversion is a pure,
//! synchronous transformation: the body is decoded as JSON with as little
//! modification as possible and the full header map becomes the envelope
//! metadata.

use std::collections::HashMap;

use axum::http::HeaderMap;
use bytes::Bytes;
use events::{headers, Envelope, EnvelopeError};
use thiserror::Error;
use tracing::info;

/// Errors produced while converting a request into an envelope.
#[derive(Debug, Error)]
pub enum IngressError {
    /// A required header was not present on the request.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The body was not a valid JSON document.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The request parts did not form a valid envelope (e.g. an empty
    /// delivery identifier).
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),
}

/// Raw HTTP webhook request data.
///
/// Header names are lowercase; [`WebhookRequest::from_parts`] performs that
/// normalisation when building a request from an [`axum::http::HeaderMap`].
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    body: Bytes,
}

impl WebhookRequest {
    /// Creates a request from an already-normalised header map.
    pub fn new(headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// Creates a request from HTTP parts.
    ///
    /// Header values that are not valid visible ASCII are skipped. A header
    /// sent more than once is folded into one value, joined with `", "`.
    pub fn from_parts(header_map: &HeaderMap, body: Bytes) -> Self {
        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in header_map {
            let Ok(value) = value.to_str() else { continue };
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        Self { headers, body }
    }

    /// Looks up a header by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The `x-github-delivery` header, if present.
    pub fn delivery_id(&self) -> Option<&str> {
        self.header(headers::DELIVERY)
    }

    /// The `x-github-event` header, if present.
    pub fn event_type(&self) -> Option<&str> {
        self.header(headers::EVENT)
    }

    /// All headers.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// The raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.body
    }
}

/// Signature shared by every ingress adapter a trigger route can bind.
///
/// `Ok(None)` means the request was understood but produces no event.
pub type IngressFn = fn(&WebhookRequest) -> Result<Option<Envelope>, IngressError>;

/// Converts a GitHub webhook request into an [`Envelope`].
///
/// The delivery identifier becomes the envelope identifier (and later the
/// workflow execution id); every request header is kept as metadata so the
/// dispatcher can read `x-github-event`.
///
/// # Errors
///
/// - [`IngressError::MissingHeader`] if `x-github-delivery` is absent.
/// - [`IngressError::InvalidJson`] if the body is not valid JSON.
/// - [`IngressError::InvalidEnvelope`] if the delivery id is empty.
pub fn convert(request: &WebhookRequest) -> Result<Option<Envelope>, IngressError> {
    let identifier = request
        .delivery_id()
        .ok_or(IngressError::MissingHeader(headers::DELIVERY))?;

    let data: serde_json::Value = serde_json::from_slice(request.payload())?;

    info!(delivery_id = %identifier, "Received GitHub webhook request {identifier}");

    let envelope = Envelope::new(identifier, request.headers().clone(), data)?;
    Ok(Some(envelope))
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod tests;
