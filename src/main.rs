//! Emeritus MCP bridge - main entry point.
//!
//! Subcommands:
//! - `stdio` (default): JSON-RPC tool server on stdin/stdout
//! - `serve`: msgpack request/response server on TCP

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};
use std::sync::Arc;

use emeritus_mcp::context::AppContext;
use emeritus_mcp::ipc::IpcServer;
use emeritus_mcp::types::{ObservabilityConfig, ServerConfig};
use emeritus_mcp::{Config, PartnerConfig};

#[derive(Debug, Parser)]
#[command(name = "emeritus-mcp", version, about)]
struct Cli {
    /// Partner API base URL.
    #[arg(long, env = "EMERITUS_API_HOST")]
    api_host: String,

    /// Partner application id.
    #[arg(long, env = "EMERITUS_USER_ID")]
    app_id: String,

    /// Partner signing secret.
    #[arg(long, env = "EMERITUS_API_SECRET", hide_env_values = true)]
    api_secret: String,

    /// API key required from request/response callers.
    #[arg(long, env = "MCP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Verbose logging. `DEBUG` is off when unset, empty, `0`, `false`,
    /// `no`, `n`, `f` or `off`.
    #[arg(long, env = "DEBUG", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    debug: bool,

    /// Bind address for `serve`.
    #[arg(long, env = "EMERITUS_LISTEN_ADDR", default_value = "127.0.0.1:50051")]
    listen_addr: String,

    /// Log format: `text` or `json`.
    #[arg(long, env = "EMERITUS_LOG_FORMAT", default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Serve the tool protocol on stdin/stdout.
    Stdio,
    /// Serve msgpack requests over TCP.
    Serve,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new(PartnerConfig::new(
            self.api_host.clone(),
            self.app_id.clone(),
            self.api_secret.clone(),
        ));
        config.server = ServerConfig {
            listen_addr: self.listen_addr.clone(),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
        };
        config.observability = ObservabilityConfig {
            debug: self.debug,
            json_logs: self.log_format.eq_ignore_ascii_case("json"),
        };
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = cli.config();

    emeritus_mcp::observability::init_tracing(&config.observability);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let ctx = Arc::new(AppContext::new(config)?);

    match cli.command.unwrap_or(Command::Stdio) {
        Command::Stdio => {
            emeritus_mcp::mcp::serve_stdio(&ctx).await?;
        }
        Command::Serve => {
            let addr = ctx.config().server.listen_addr.parse()?;
            let server = IpcServer::new(ctx.clone(), addr);
            let cancel = server.cancel_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, shutting down");
                    cancel.cancel();
                }
            });
            tracing::info!("Emeritus MCP request server starting on {}", addr);
            server.serve().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "emeritus-mcp",
        "--api-host",
        "http://partner.test",
        "--app-id",
        "app-1",
        "--api-secret",
        "secret-1",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::try_parse_from(REQUIRED.iter().chain(extra)).unwrap()
    }

    // One test owns every DEBUG mutation so parallel tests never see it.
    #[test]
    fn test_debug_accepts_numeric_and_word_forms() {
        std::env::remove_var("DEBUG");
        assert!(!parse(&[]).debug);
        assert!(parse(&["--debug"]).debug);

        for on in ["1", "true", "yes", "on"] {
            std::env::set_var("DEBUG", on);
            assert!(parse(&["stdio"]).debug, "DEBUG={}", on);
        }
        for off in ["0", "false", "no", "off", ""] {
            std::env::set_var("DEBUG", off);
            assert!(!parse(&["stdio"]).debug, "DEBUG={}", off);
        }
        std::env::remove_var("DEBUG");
    }

    #[test]
    fn test_config_from_flags() {
        let cli = parse(&["--log-format", "JSON", "--api-key", "", "serve"]);
        let config = cli.config();
        assert_eq!(config.partner.app_id, "app-1");
        assert!(config.observability.json_logs);
        assert!(config.server.api_key.is_none());
        assert!(matches!(cli.command, Some(Command::Serve)));
    }
}
