//! Trigger registration.
//!
//! A [`WebhookTrigger`] is the declarative binding between one or more HTTP
//! routes (each with its own ingress adapter) and the [`EventRouter`] that
//! consumes the envelopes those routes produce. The host ([`crate::server`]
//! and [`crate::bus`]) reads it; the trigger itself performs no logic.

use std::fmt;
use std::sync::Arc;

use events::{ClientIdentifier, ClientVersion, EventRouter, GitHubDispatcher};

use crate::ingress::{convert, IngressFn};

/// Identifier this integration registers under.
pub const CLIENT_IDENTIFIER: &str = "github-trigger";

/// Version published with [`CLIENT_IDENTIFIER`].
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path GitHub deliveries are posted to.
pub const WEBHOOK_PATH: &str = "/webhook/";

/// HTTP methods a route can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

/// Stable `(identifier, version)` pair the host uses for routing and versioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Name the integration registers under.
    pub identifier: ClientIdentifier,
    /// Version of the integration.
    pub version: ClientVersion,
}

impl ClientIdentity {
    /// Creates an identity, returning `None` if either part is empty.
    pub fn new(identifier: &str, version: &str) -> Option<Self> {
        Some(Self {
            identifier: ClientIdentifier::new(identifier)?,
            version: ClientVersion::new(version)?,
        })
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.identifier, self.version)
    }
}

/// One ingress binding: the methods and path it answers, and the adapter
/// that turns a matching request into an envelope.
#[derive(Clone)]
pub struct Route {
    /// Methods the route answers. A route with none is never mounted.
    pub methods: Vec<HttpMethod>,
    /// URL path, e.g. [`WEBHOOK_PATH`].
    pub path: String,
    /// Adapter that turns a matching request into an envelope.
    pub ingress: IngressFn,
}

impl Route {
    /// Creates a route answering `methods` on `path`.
    pub fn new(
        methods: impl Into<Vec<HttpMethod>>,
        path: impl Into<String>,
        ingress: IngressFn,
    ) -> Self {
        Self {
            methods: methods.into(),
            path: path.into(),
            ingress,
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("methods", &self.methods)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Routes plus the consumer of the envelopes they produce.
#[derive(Clone)]
pub struct WebhookTrigger {
    identity: ClientIdentity,
    routes: Vec<Route>,
    consumer: Arc<dyn EventRouter>,
}

impl WebhookTrigger {
    /// Creates a trigger with no routes.
    pub fn new(identity: ClientIdentity, consumer: Arc<dyn EventRouter>) -> Self {
        Self {
            identity,
            routes: Vec::new(),
            consumer,
        }
    }

    /// Adds an ingress route. The consumer is unaffected.
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// The client identity the trigger registers with.
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Ingress routes, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The router registered as the event-bus consumer.
    pub fn consumer(&self) -> Arc<dyn EventRouter> {
        Arc::clone(&self.consumer)
    }
}

impl fmt::Debug for WebhookTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTrigger")
            .field("identity", &self.identity)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

/// The GitHub trigger: `POST /webhook/` through [`convert`], consumed by
/// [`GitHubDispatcher`].
pub fn github_trigger() -> WebhookTrigger {
    let identity = ClientIdentity {
        identifier: ClientIdentifier::from_static(CLIENT_IDENTIFIER),
        version: ClientVersion::from_static(CLIENT_VERSION),
    };
    WebhookTrigger::new(identity, Arc::new(GitHubDispatcher))
        .with_route(Route::new([HttpMethod::Post], WEBHOOK_PATH, convert))
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
