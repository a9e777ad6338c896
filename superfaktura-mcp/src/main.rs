//! MCP Server entry point for SuperFaktura
//!
//! Serves the invoicing tools over stdio (default) or streamable HTTP.
//!
//! # Credentials
//!
//! Single-tenant deployments set `SUPERFAKTURA_EMAIL` / `SUPERFAKTURA_API_KEY`
//! (plus optional `SUPERFAKTURA_COUNTRY`, `SUPERFAKTURA_COMPANY_ID`,
//! `SUPERFAKTURA_API_URL`). Over HTTP, each request may instead carry the
//! matching `x-superfaktura-*` headers, so one server can serve many accounts.

mod convert;
mod schemas;
mod server;

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use server::SuperFakturaMcp;
use superfaktura_provider::{Country, EnvConfig, SuperFakturaClient};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Path the streamable HTTP transport is mounted on.
const MCP_PATH: &str = "/mcp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP.
    Http,
}

#[derive(Debug, Parser)]
#[command(name = "superfaktura-mcp", version, about = "MCP server for the SuperFaktura invoicing API")]
struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum, env = "SUPERFAKTURA_MCP_TRANSPORT", default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Listen address for the HTTP transport
    #[arg(long, env = "SUPERFAKTURA_MCP_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing to stderr (MCP uses stdout for protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Starting SuperFaktura MCP Server");

    let env = EnvConfig::from_env();
    if env.has_credentials() {
        let endpoint = match &env.api_url {
            Some(url) => url.clone(),
            None => env.country.as_deref().unwrap_or(Country::default().code()).to_string(),
        };
        tracing::info!("Using credentials from environment (endpoint: {endpoint})");
    } else {
        tracing::warn!(
            "SUPERFAKTURA_EMAIL / SUPERFAKTURA_API_KEY not set; \
             every tool call must supply x-superfaktura-* headers"
        );
    }

    let client = SuperFakturaClient::new().context("Failed to create HTTP client")?;
    let server = SuperFakturaMcp::new(env, client);

    match cli.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, cli.bind).await,
    }
}

async fn serve_stdio(server: SuperFakturaMcp) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server on stdio transport");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP server")?;

    service.waiting().await.context("MCP server error")?;
    Ok(())
}

/// Streamable HTTP service mounted at [`MCP_PATH`].
fn http_router(server: SuperFakturaMcp) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    axum::Router::new().nest_service(MCP_PATH, service)
}

async fn serve_http(server: SuperFakturaMcp, bind: SocketAddr) -> anyhow::Result<()> {
    let router = http_router(server);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Starting MCP server on http://{bind}{MCP_PATH}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutting down");
}
