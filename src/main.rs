//! loan-mcp server - main entry point.
//!
//! - `serve` (default): dashboard, catalog, tool testing and `/mcp` on one port
//! - `tools`: print the tool catalog as JSON and exit

use clap::{Args, Parser, Subcommand};
use loan_mcp::http::{AppState, HttpServer};
use loan_mcp::providers::{default_registry, PlanningRules};
use loan_mcp::records::InMemoryRecords;
use loan_mcp::{ComponentRegistry, Config, Error};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "loan-mcp-server", version, about = "Loan tool-invocation server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve(ServeArgs),
    /// Print the tool catalog as JSON.
    Tools,
}

#[derive(Debug, Args, Default)]
struct ServeArgs {
    /// JSON configuration file.
    #[arg(long, env = "LOAN_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host, overrides configuration.
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides configuration.
    #[arg(long)]
    port: Option<u16>,
}

fn build_registry() -> ComponentRegistry {
    default_registry(
        Arc::new(InMemoryRecords::seeded()),
        Arc::new(PlanningRules::default()),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Tools => {
            let catalog = build_registry().scan();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            Ok(())
        }
        Command::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    loan_mcp::observability::init_tracing(&config.observability);

    let addr: SocketAddr = config.server.listen_addr().parse().map_err(|e| {
        Error::validation(format!("bad listen address {}: {}", config.server.listen_addr(), e))
    })?;

    let registry = Arc::new(build_registry());
    let report = registry.scan_report();
    tracing::info!(
        components = registry.len(),
        tools = report.tools.len(),
        duplicates = report.duplicates,
        failed_components = report.failed_components,
        "Tool registry ready"
    );

    let state = AppState::new(registry, Arc::new(config))?;
    let server = HttpServer::new(state, addr);

    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            cancel.cancel();
        }
    });

    server.serve().await?;
    Ok(())
}
