use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tether_application::session::CredentialBackend;
use tether_application::SessionFactory;
use tether_core::config::{ClientConfig, EchoPolicy};
use tether_infrastructure::{ConfigService, TetherPaths};

mod commands;
mod logging;
mod render;
mod repl;

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(about = "Tether - terminal chat client", long_about = None)]
struct Cli {
    /// Base URL of the auth API
    #[arg(long, value_name = "URL")]
    auth_url: Option<String>,

    /// Real-time transport endpoint (ws:// or wss://)
    #[arg(long, value_name = "URL")]
    transport_url: Option<String>,

    /// Directory holding config.toml, credentials.toml and logs
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Echo policy for sent messages: server_broadcast or local
    #[arg(long, value_name = "POLICY")]
    echo: Option<EchoPolicy>,

    /// Keep credentials in memory only
    #[arg(long)]
    ephemeral: bool,
}

impl Cli {
    /// Flags take precedence over environment and config file.
    fn apply_overrides(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.auth_url {
            config.auth_url = url.clone();
        }
        if let Some(url) = &self.transport_url {
            config.transport_url = url.clone();
        }
        if let Some(policy) = self.echo {
            config.echo_policy = policy;
        }
        config
    }

    fn credential_backend(&self) -> CredentialBackend {
        if self.ephemeral {
            CredentialBackend::Memory
        } else {
            CredentialBackend::File
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = TetherPaths::new(cli.config_dir.as_deref());

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _log_guard = logging::init(&paths).context("Failed to initialize logging")?;

    let config = ConfigService::new(paths.clone())
        .load()
        .context("Failed to load configuration")?;
    let config = cli.apply_overrides(config);
    tracing::info!("[Bootstrap] Starting tether {}", env!("CARGO_PKG_VERSION"));

    let factory = SessionFactory::new(config, paths);
    let (controller, views) = factory.create_controller(cli.credential_backend())?;

    repl::run(controller, views).await
}
