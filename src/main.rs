use anyhow::{Context, Result};
use clap::Parser;
use collector_proxy::demo::ProcessCollector;
use collector_proxy::host::{self, EncodingKind, HostConfig, Transport};
use collector_proxy::session::generate_token;
use collector_proxy::BUILD_SHA;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::filter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::{prelude::*, registry};

#[derive(Parser)]
#[command(name = "collector-proxy")]
#[command(about = "Hosts a sample metrics collector over the legacy or gRPC transport")]
#[command(version)]
struct Cli {
    /// YAML file with host settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wire protocol to serve
    #[arg(short, long, value_enum)]
    transport: Option<Transport>,

    /// Address to bind (port 0 picks a free port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Payload encoding of the legacy transport
    #[arg(short, long, value_enum)]
    encoding: Option<EncodingKind>,

    /// Terminate after this long without a ping
    #[arg(long)]
    ping_timeout_ms: Option<u64>,

    /// Require a freshly generated auth token (reported in the handshake)
    #[arg(long)]
    generate_token: bool,
}

impl Cli {
    /// Defaults, then the config file, then environment, then flags.
    fn host_config(&self) -> Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::from_yaml_file(path)?,
            None => HostConfig::default(),
        };
        config.session = config.session.apply_env_overrides();

        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(listen) = &self.listen {
            config.session.listen_address = listen.clone();
        }
        if let Some(timeout) = self.ping_timeout_ms {
            config.session.ping_timeout_ms = timeout;
        }
        if self.generate_token {
            config.session.token = Some(generate_token());
        }
        Ok(config)
    }
}

/// Logs go to stderr; stdout carries the handshake line only.
fn init_logging() {
    let env_filter = filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let fmt_layer = layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter);

    registry().with(fmt_layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.host_config().context("Failed to load configuration")?;

    info!(
        build = BUILD_SHA,
        transport = %config.transport,
        listen = %config.session.listen_address,
        "Starting collector proxy"
    );

    let reason = host::run(
        Arc::new(ProcessCollector::new()),
        config,
        host::print_handshake,
    )
    .await?;

    info!(%reason, "Collector proxy stopped");
    Ok(())
}
