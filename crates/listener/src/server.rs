//! HTTP host for trigger routes.
//!
//! [`build_router`] mounts every route of a [`WebhookTrigger`] on an axum
//! router. A matching request is handed to the route's ingress adapter and the
//! resulting envelope is published to the event bus; dispatch happens later,
//! on the consumer side, so GitHub gets its response as soon as the delivery
//! is queued.
//!
//! # Endpoints
//!
//! - every trigger route (for GitHub: `POST /webhook/`)
//!   - `202 Accepted` with the delivery id: envelope published
//!   - `200 OK`: the adapter produced no envelope
//!   - `400 Bad Request`: missing header, invalid JSON, or invalid envelope
//!   - `503 Service Unavailable`: the event bus is closed
//! - `GET /health` - returns 200 if the server is running

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, on, MethodFilter};
use axum::Router;
use thiserror::Error;
use tracing::{debug, warn};

use crate::bus::{BusError, EventBus};
use crate::ingress::{IngressError, IngressFn, WebhookRequest};
use crate::trigger::{HttpMethod, WebhookTrigger};

/// Errors returned to the HTTP caller.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request could not be turned into an envelope (`400`).
    #[error(transparent)]
    Ingress(#[from] IngressError),

    /// The envelope could not be queued (`503`).
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Ingress(_) => StatusCode::BAD_REQUEST,
            ServerError::Bus(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

/// Builds the axum router for `trigger`, publishing accepted envelopes to `bus`.
pub fn build_router(trigger: &WebhookTrigger, bus: Arc<dyn EventBus>) -> Router {
    let mut router = Router::new().route("/health", get(health_handler));

    for route in trigger.routes() {
        let Some(filter) = method_filter(&route.methods) else {
            warn!(path = %route.path, "Route has no methods; not mounted");
            continue;
        };

        let ingress = route.ingress;
        let bus = Arc::clone(&bus);
        let handler = move |headers: HeaderMap, body: Bytes| {
            let bus = Arc::clone(&bus);
            async move { accept(ingress, bus.as_ref(), headers, body).await }
        };

        router = router.route(&route.path, on(filter, handler));
    }

    router
}

fn method_filter(methods: &[HttpMethod]) -> Option<MethodFilter> {
    methods
        .iter()
        .map(|method| match method {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Delete => MethodFilter::DELETE,
        })
        .reduce(MethodFilter::or)
}

async fn accept(
    ingress: IngressFn,
    bus: &dyn EventBus,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), ServerError> {
    let request = WebhookRequest::from_parts(&headers, body);

    let envelope = match ingress(&request) {
        Ok(Some(envelope)) => envelope,
        Ok(None) => {
            debug!("Ingress produced no event");
            return Ok((StatusCode::OK, String::new()));
        }
        Err(err) => {
            warn!(
                delivery_id = request.delivery_id().unwrap_or_default(),
                error = %err,
                "Rejected webhook request"
            );
            return Err(err.into());
        }
    };

    let delivery_id = envelope.identifier().to_string();
    bus.publish(envelope).await?;

    Ok((StatusCode::ACCEPTED, delivery_id))
}

/// Liveness probe.
pub async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
