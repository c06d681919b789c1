use super::*;
use crate::bus::InMemoryEventBus;
use crate::trigger::{github_trigger, Route};
use axum::body::Body;
use axum::http::Request;
use events::Envelope;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

fn webhook_request(delivery_id: Option<&str>, event_type: &str, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook/")
        .header("content-type", "application/json")
        .header("X-GitHub-Event", event_type);
    if let Some(id) = delivery_id {
        builder = builder.header("X-GitHub-Delivery", id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ─── Health endpoint ───

#[tokio::test]
async fn health_returns_200() {
    let (bus, _stream) = InMemoryEventBus::channel(1);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

// ─── Webhook endpoint ───

#[tokio::test]
async fn valid_delivery_is_published_and_accepted() {
    let (bus, mut stream) = InMemoryEventBus::channel(4);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let response = app
        .oneshot(webhook_request(Some("abc-123"), "push", r#"{"ref":"refs/heads/main"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_text(response).await, "abc-123");

    let envelope = stream.next().await.unwrap();
    assert_eq!(envelope.identifier().as_str(), "abc-123");
    assert_eq!(envelope.metadata_value("x-github-event"), Some("push"));
    assert_eq!(envelope.data(), &json!({"ref": "refs/heads/main"}));
}

#[tokio::test]
async fn unsupported_event_types_are_still_accepted() {
    let (bus, mut stream) = InMemoryEventBus::channel(4);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let response = app
        .oneshot(webhook_request(Some("abc-456"), "issues", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(stream.next().await.is_some());
}

#[tokio::test]
async fn missing_delivery_id_returns_400() {
    let (bus, _stream) = InMemoryEventBus::channel(4);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let response = app
        .oneshot(webhook_request(None, "push", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("x-github-delivery"));
}

#[tokio::test]
async fn invalid_json_returns_400() {
    let (bus, _stream) = InMemoryEventBus::channel(4);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let response = app
        .oneshot(webhook_request(Some("abc-789"), "push", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn closed_bus_returns_503() {
    let (bus, stream) = InMemoryEventBus::channel(4);
    drop(stream);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let response = app
        .oneshot(webhook_request(Some("abc-000"), "push", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn get_on_webhook_route_is_not_allowed() {
    let (bus, _stream) = InMemoryEventBus::channel(4);
    let app = build_router(&github_trigger(), Arc::new(bus));

    let request = Request::builder().uri("/webhook/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ─── Additional routes ───

fn ignore_everything(_request: &WebhookRequest) -> Result<Option<Envelope>, IngressError> {
    Ok(None)
}

#[tokio::test]
async fn extra_routes_are_mounted_with_their_own_adapter() {
    let trigger = github_trigger().with_route(Route::new(
        [HttpMethod::Get, HttpMethod::Post],
        "/poll/",
        ignore_everything,
    ));
    let (bus, _stream) = InMemoryEventBus::channel(4);
    let app = build_router(&trigger, Arc::new(bus));

    let request = Request::builder().uri("/poll/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn method_filter_needs_at_least_one_method() {
    assert!(method_filter(&[]).is_none());
    assert!(method_filter(&[HttpMethod::Post]).is_some());
}
