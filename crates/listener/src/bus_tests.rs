use super::*;
use events::{EventHandler, GitHubDispatcher, Metadata};
use serde_json::json;
use tokio::sync::Mutex;

fn envelope(id: &str, event_type: &str, data: Value) -> Envelope {
    let metadata = Metadata::from([
        ("x-github-delivery".to_string(), id.to_string()),
        ("x-github-event".to_string(), event_type.to_string()),
    ]);
    Envelope::new(id, metadata, data).unwrap()
}

fn github_consumer(handlers: HandlerRegistry) -> EventConsumer {
    EventConsumer::new(Arc::new(GitHubDispatcher), Arc::new(handlers))
}

/// Records every `(execution_id, payload)` it processes.
#[derive(Default)]
struct RecordingHandler {
    seen: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    fn name(&self) -> &str {
        "push"
    }

    async fn process(
        &self,
        payload: Value,
        context: &ExecutionContext,
    ) -> Result<Option<Value>, HandlerError> {
        self.seen.lock().await.push((
            context.execution_id().unwrap_or_default(),
            payload.clone(),
        ));
        Ok(Some(payload))
    }
}

#[tokio::test]
async fn consume_forwards_push_to_handler() {
    let consumer = github_consumer(HandlerRegistry::with_defaults());

    let outcome = consumer
        .consume(envelope("d-1", "push", json!({"ref": "refs/heads/main"})))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ConsumeOutcome::Completed {
            handler: HandlerName::new("push").unwrap(),
            output: json!({"ref": "refs/heads/main", "x-github-event": "push"}),
        }
    );
}

#[tokio::test]
async fn consume_forwards_pull_request_to_handler() {
    let consumer = github_consumer(HandlerRegistry::with_defaults());

    let outcome = consumer
        .consume(envelope("d-2", "pull_request", json!({"number": 7})))
        .await
        .unwrap();

    let ConsumeOutcome::Completed { handler, output } = outcome else {
        panic!("expected a completed execution");
    };
    assert_eq!(handler.as_str(), "pull_request");
    assert_eq!(output["x-github-event"], json!("pull_request"));
    assert_eq!(output["number"], json!(7));
}

#[tokio::test]
async fn consume_drops_ping_and_unsupported() {
    let consumer = github_consumer(HandlerRegistry::with_defaults());

    let ping = consumer.consume(envelope("d-3", "ping", json!({}))).await.unwrap();
    let issues = consumer.consume(envelope("d-4", "issues", json!({}))).await.unwrap();

    assert_eq!(ping, ConsumeOutcome::Dropped);
    assert_eq!(issues, ConsumeOutcome::Dropped);
}

#[tokio::test]
async fn consume_reports_missing_handler() {
    let consumer = github_consumer(HandlerRegistry::new());

    let err = consumer
        .consume(envelope("d-5", "push", json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, ConsumeError::Handler(HandlerError::UnknownHandler(_))));
}

#[tokio::test]
async fn consume_reports_dispatch_errors() {
    let consumer = github_consumer(HandlerRegistry::with_defaults());
    let metadata = Metadata::from([("x-github-delivery".to_string(), "d-6".to_string())]);
    let env = Envelope::new("d-6", metadata, json!({})).unwrap();

    let err = consumer.consume(env).await.unwrap_err();

    assert!(matches!(
        err,
        ConsumeError::Dispatch(DispatchError::MissingEventType { .. })
    ));
}

#[tokio::test]
async fn publish_fails_once_stream_is_dropped() {
    let (bus, stream) = InMemoryEventBus::channel(4);
    drop(stream);

    let err = bus.publish(envelope("d-7", "push", json!({}))).await.unwrap_err();
    assert!(matches!(err, BusError::Closed(id) if id == "d-7"));
}

#[tokio::test]
async fn run_processes_everything_published_then_stops() {
    let recorder = Arc::new(RecordingHandler::default());
    let mut handlers = HandlerRegistry::new();
    handlers.register(recorder.clone());

    let (bus, stream) = InMemoryEventBus::channel(8);
    let consumer = github_consumer(handlers);
    let worker = tokio::spawn(consumer.run(stream));

    bus.publish(envelope("d-8", "push", json!({"n": 1}))).await.unwrap();
    bus.publish(envelope("d-9", "ping", json!({"n": 2}))).await.unwrap();
    bus.publish(envelope("d-10", "push", json!({"n": 3}))).await.unwrap();
    bus.publish(envelope("d-11", "issues", json!({"n": 4}))).await.unwrap();
    drop(bus);

    worker.await.unwrap();

    let mut seen = recorder.seen.lock().await.clone();
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        seen,
        vec![
            ("d-10".to_string(), json!({"n": 3, "x-github-event": "push"})),
            ("d-8".to_string(), json!({"n": 1, "x-github-event": "push"})),
        ]
    );
}

#[tokio::test]
async fn zero_capacity_is_clamped() {
    let (bus, mut stream) = InMemoryEventBus::channel(0);
    bus.publish(envelope("d-12", "push", json!({}))).await.unwrap();

    let received = stream.next().await.unwrap();
    assert_eq!(received.identifier().as_str(), "d-12");
}
