//! OpsGate MCP gateway — entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use opsgate_client::{ApiClient, IntegrationsApi, ResourcesApi};
use opsgate_mcp::config::GatewayConfig;
use opsgate_mcp::protocol::ProtocolRouter;
use opsgate_mcp::session::SessionRegistry;
use opsgate_mcp::tools::{IntegrationsTool, ResourcesTool, ToolDispatcher};
use opsgate_mcp::transport::{self, GatewayState};
use opsgate_mcp::types::InitializeResult;

#[derive(Parser)]
#[command(
    name = "opsgate-mcp",
    about = "MCP gateway for infrastructure management — integrations and resources over JSON-RPC with HTTP and SSE",
    version
)]
struct Cli {
    /// Path to TOML config file (default: ./opsgate.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway over HTTP (default).
    Serve {
        /// Listen address (host:port). Overrides config and env.
        #[arg(long)]
        addr: Option<String>,

        /// Accept requests for unknown session ids.
        #[arg(long)]
        permissive: bool,
    },

    /// Print server identity, capabilities, and tool names as JSON.
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = GatewayConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve {
        addr: None,
        permissive: false,
    }) {
        Commands::Serve { addr, permissive } => {
            if permissive {
                config.server.permissive_sessions = true;
            }
            let addr = addr.unwrap_or_else(|| config.listen_addr());

            if !config.has_upstream_credentials() {
                tracing::warn!(
                    "no upstream credentials configured; tool calls will fail upstream"
                );
            }

            let api = ApiClient::new(&config.upstream);
            let mut dispatcher = ToolDispatcher::new();
            dispatcher.register(Arc::new(IntegrationsTool::new(IntegrationsApi::new(
                api.clone(),
            ))));
            dispatcher.register(Arc::new(ResourcesTool::new(ResourcesApi::new(api))));

            let registry = Arc::new(SessionRegistry::new(config.server.permissive_sessions));
            let router = Arc::new(ProtocolRouter::new(
                Arc::new(dispatcher),
                Duration::from_secs(config.server.call_deadline_secs),
            ));

            if config.server.permissive_sessions {
                tracing::info!("permissive session mode enabled");
            }

            let state = Arc::new(GatewayState::new(registry, router));
            transport::run(state, &addr).await?;
        }

        Commands::Info => {
            let capabilities = InitializeResult::for_version(None);
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": ["integrations", "resources"],
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
