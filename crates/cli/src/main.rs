//! `utility-trace` CLI entry-point.
//!
//! Available sub-commands:
//! - `run`      — run a trace from a JSON request file and print the results.
//! - `body`     — print the endpoint and POST body without sending anything.
//! - `endpoint` — print the trace endpoint for a service URL.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adapter::{Network, TraceRequest, TraceResponse};
use channel::{ChannelConfig, HttpTransport};
use nodes::{ExecutableNode, ExecutionContext, TraceNode};

#[derive(Parser)]
#[command(
    name = "utility-trace",
    about = "Run ArcFM utility network traces (electric, gas, water)",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a trace request and print the normalised results.
    Run {
        /// electric, gas or water.
        #[arg(long)]
        network: Network,
        /// Path to the JSON trace request (`-` for stdin).
        #[arg(long)]
        request: PathBuf,
        /// Overrides `serviceUrl` from the request file.
        #[arg(long, env = "TRACE_SERVICE_URL")]
        service_url: Option<String>,
        /// Whole-request timeout in seconds.
        #[arg(long, env = "TRACE_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,
        /// Pretty-print the output.
        #[arg(long)]
        pretty: bool,
        /// Log a one-line summary per result set.
        #[arg(long)]
        summary: bool,
    },
    /// Print the endpoint and body a trace would send.
    Body {
        #[arg(long)]
        network: Network,
        #[arg(long)]
        request: PathBuf,
        #[arg(long, env = "TRACE_SERVICE_URL")]
        service_url: Option<String>,
    },
    /// Print the trace endpoint for a map service.
    Endpoint {
        #[arg(long)]
        network: Network,
        #[arg(long, env = "TRACE_SERVICE_URL")]
        service_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            network,
            request,
            service_url,
            timeout_secs,
            pretty,
            summary,
        } => {
            let input = load_request(&request, service_url.as_deref())?;

            let mut config = ChannelConfig::default();
            if let Some(secs) = timeout_secs {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            let transport = Arc::new(HttpTransport::new(&config)?);
            let node = TraceNode::new(network, transport);

            let ctx = ExecutionContext::detached();
            let cancellation = ctx.cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling trace");
                    cancellation.cancel();
                }
            });

            info!("Running {network} trace (execution {})", ctx.execution_id);
            let output = node.execute(input, &ctx).await?;
            if summary {
                log_summary(&output)?;
            }
            print_json(&output, pretty)?;
        }
        Command::Body {
            network,
            request,
            service_url,
        } => {
            let input = load_request(&request, service_url.as_deref())?;
            let request: TraceRequest =
                serde_json::from_value(input).context("invalid trace request")?;
            let preview = adapter::runner::preview(&request, network)?;
            print_json(&Value::Object(preview), true)?;
        }
        Command::Endpoint {
            network,
            service_url,
        } => {
            println!("{}", adapter::endpoint_url(Some(service_url.as_str()), network)?);
        }
    }

    Ok(())
}

/// Read a JSON request from `path` (or stdin for `-`), applying a
/// `serviceUrl` override when given.
fn load_request(path: &Path, service_url: Option<&str>) -> Result<Value> {
    let content = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("cannot read request from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read file {}", path.display()))?
    };

    let mut input: Value = serde_json::from_str(&content).context("invalid JSON")?;
    if let Some(url) = service_url {
        let object = input
            .as_object_mut()
            .context("trace request must be a JSON object")?;
        object.insert("serviceUrl".into(), Value::String(url.to_owned()));
    }
    Ok(input)
}

/// One log line per result set: name, id, feature labels, threshold flag.
fn log_summary(output: &Value) -> Result<()> {
    let response: TraceResponse =
        serde_json::from_value(output.clone()).context("unexpected trace output")?;

    for set in &response.results {
        let display_field = set.display_field_name();
        let labels: Vec<String> = set
            .features()
            .iter()
            .map(|feature| {
                display_field
                    .and_then(|field| feature.attribute(field))
                    .map(|value| match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .or_else(|| feature.name().map(str::to_owned))
                    .or_else(|| feature.id().map(|id| id.to_string()))
                    .unwrap_or_else(|| "?".into())
            })
            .collect();

        info!(
            layer = set.name().unwrap_or("<unnamed>"),
            id = ?set.id(),
            geometry = set.geometry_type().unwrap_or("none"),
            label_field = display_field.map(|field| set.alias_for(field)).unwrap_or("-"),
            exceeded_threshold = set.exceeded_threshold(),
            "{} features: {}",
            set.feature_count(),
            labels.join(", ")
        );
    }
    Ok(())
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
