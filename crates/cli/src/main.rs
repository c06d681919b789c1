//! GitHub trigger entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: command-line arguments with environment
//!    fallbacks (see [`config`]).
//! 2. **Wire observability**: configure `tracing-subscriber` with a JSON (or
//!    pretty) layer and, when an endpoint is configured, an OpenTelemetry OTLP
//!    exporter.
//! 3. **Run a command**:
//!    - `serve`: host the trigger's routes over HTTP, publish accepted
//!      envelopes to the in-memory bus, and consume them with the dispatcher
//!      and the default handlers.
//!    - `process`: run a single handler on JSON arguments and print the JSON
//!      result; exits with status 1 when the handler produces no result.

mod config;
mod observability;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use events::{ExecutionContext, HandlerError, HandlerRegistry};
use listener::{build_router, github_trigger, EventConsumer, InMemoryEventBus};
use tracing::{error, info, warn};

use crate::config::{Cli, Command, ProcessArgs, ServeArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.log_format, cli.otlp_endpoint.as_deref()) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Serve(args) => serve(args).await.map(|()| ExitCode::SUCCESS),
        Command::Process(args) => process(args).await,
    };

    let code = result.unwrap_or_else(|err| {
        error!(error = format!("{err:#}"), "Command failed");
        ExitCode::FAILURE
    });

    telemetry.shutdown();
    code
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let trigger = github_trigger();
    let handlers = Arc::new(HandlerRegistry::with_defaults());

    let (bus, stream) = InMemoryEventBus::channel(args.bus_capacity);
    let consumer = EventConsumer::new(trigger.consumer(), handlers);
    let consumer_task = tokio::spawn(consumer.run(stream));

    let app = build_router(&trigger, Arc::new(bus));
    let tcp = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    info!(
        addr = %args.bind,
        client = %trigger.identity(),
        routes = ?trigger.routes(),
        "GitHub trigger listening"
    );

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // The router owned the last publisher; the consumer drains and exits.
    consumer_task.await.context("event consumer task failed")?;
    info!("GitHub trigger stopped");
    Ok(())
}

async fn process(args: ProcessArgs) -> anyhow::Result<ExitCode> {
    let message: serde_json::Value =
        serde_json::from_str(&args.message).context("`message` argument is not valid JSON")?;
    let context: ExecutionContext = serde_json::from_str(&args.context)
        .context("`context` argument is not a valid JSON object")?;

    let registry = HandlerRegistry::with_defaults();
    match registry.invoke(&args.handler, message, &context).await {
        Ok(output) => {
            println!("{}", serde_json::to_string(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(HandlerError::EmptyResult(handler)) => {
            warn!(handler = %handler, "Handler produced no result");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!(error = %err, "Failed to listen for shutdown signal"),
    }
}
