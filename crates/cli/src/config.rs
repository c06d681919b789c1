//! Command-line arguments.
//!
//! Every option can also be supplied through the environment variable named
//! next to it, which is how container deployments configure the service.

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Receives GitHub webhooks and routes them to workflow handlers.
#[derive(Debug, Parser)]
#[command(name = "github-trigger", version, about)]
pub struct Cli {
    /// Log output format.
    #[arg(
        long,
        env = "GITHUB_TRIGGER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Json,
        global = true
    )]
    pub log_format: LogFormat,

    /// OTLP collector endpoint. Span export is disabled when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT", global = true)]
    pub otlp_endpoint: Option<String>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Output format of the log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the webhook endpoint and consume accepted events.
    Serve(ServeArgs),
    /// Run one handler on a JSON message and print its JSON result.
    Process(ProcessArgs),
}

/// Arguments of `serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address the HTTP server binds to.
    #[arg(long, env = "GITHUB_TRIGGER_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Envelopes the in-memory bus buffers before publishers wait.
    #[arg(long, env = "GITHUB_TRIGGER_BUS_CAPACITY", default_value_t = 1024)]
    pub bus_capacity: usize,
}

/// Arguments of `process`.
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Handler to run (`pull_request` or `push`).
    pub handler: String,

    /// The payload, as a JSON document.
    pub message: String,

    /// The execution context, as a JSON object.
    pub context: String,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
