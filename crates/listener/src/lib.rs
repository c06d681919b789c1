//! GitHub trigger event source infrastructure.
//!
//! Turns inbound GitHub webhook deliveries into [`events::Envelope`]s and
//! feeds them to the dispatcher:
//!
//! - [`ingress`]: the webhook ingress adapter ([`ingress::convert`]) and the
//!   raw [`ingress::WebhookRequest`] it reads.
//! - [`trigger`]: declarative registration of routes, consumer, and client
//!   identity ([`trigger::github_trigger`]).
//! - [`bus`]: the [`bus::EventBus`] port, a bounded in-memory implementation,
//!   and the [`bus::EventConsumer`] that runs dispatch and handlers.
//! - [`server`]: the axum router that hosts a trigger's routes.
//!
//! ## Request flow
//!
//! ```text
//! POST /webhook/ ─▶ ingress::convert ─▶ Envelope ─▶ EventBus
//!                                                     │
//!                    handler ◀─ HandlerRegistry ◀─ EventConsumer ◀─ GitHubDispatcher
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details, request decoding, and task
//! scheduling live here. Routing rules live in the [`events`] crate.

pub mod bus;
pub mod ingress;
pub mod server;
pub mod trigger;

pub use bus::{
    BusError, ConsumeError, ConsumeOutcome, EventBus, EventConsumer, EventStream, InMemoryEventBus,
};
pub use ingress::{convert, IngressError, IngressFn, WebhookRequest};
pub use server::{build_router, ServerError};
pub use trigger::{
    github_trigger, ClientIdentity, HttpMethod, Route, WebhookTrigger, CLIENT_IDENTIFIER,
    CLIENT_VERSION, WEBHOOK_PATH,
};
