//! Hosting entry point: bind a session, announce it, serve one transport until
//! the session terminates.

use crate::collector::Collector;
use crate::encoding::{Encoder, JsonEncoder, YamlEncoder};
use crate::grpc::serve_grpc;
use crate::legacy::serve_legacy;
use crate::session::{Session, SessionConfig, TerminationReason};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// tarpc with encoded byte payloads.
    Legacy,
    /// The `rpc.Collector` gRPC service.
    #[default]
    Grpc,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Legacy => write!(f, "legacy"),
            Transport::Grpc => write!(f, "grpc"),
        }
    }
}

/// Payload encoding of the legacy transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    #[default]
    Json,
    Yaml,
}

impl EncodingKind {
    pub fn encoder(self) -> Arc<dyn Encoder> {
        match self {
            EncodingKind::Json => Arc::new(JsonEncoder),
            EncodingKind::Yaml => Arc::new(YamlEncoder),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(flatten)]
    pub session: SessionConfig,
    #[serde(default)]
    pub transport: Transport,
    /// Ignored by the gRPC transport.
    #[serde(default)]
    pub encoding: EncodingKind,
}

impl HostConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// First line a host writes, telling its parent where to connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub session_id: Uuid,
    pub transport: Transport,
    pub listen_address: String,
    pub port: u16,
    #[serde(default)]
    pub token: Option<String>,
    /// Present for the legacy transport only.
    #[serde(default)]
    pub encoding: Option<EncodingKind>,
}

/// Writes the handshake as one JSON line on stdout.
pub fn print_handshake(handshake: &Handshake) -> Result<()> {
    let line = serde_json::to_string(handshake).context("Failed to serialize handshake")?;
    println!("{}", line);
    Ok(())
}

/// Hosts `collector` until the session is killed or loses its heartbeat.
///
/// `announce` receives the handshake once the listener is bound and before
/// any call is served. Bind failures and transport failures are returned as
/// errors; a normal shutdown returns the termination reason.
pub async fn run<F>(
    collector: Arc<dyn Collector>,
    config: HostConfig,
    announce: F,
) -> Result<TerminationReason>
where
    F: FnOnce(&Handshake) -> Result<()>,
{
    let session = Arc::new(Session::new(config.session.clone()));
    session
        .span()
        .record("transport", tracing::field::display(config.transport));

    let listener = session.bind().await?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read bound address")?;

    announce(&Handshake {
        session_id: session.id(),
        transport: config.transport,
        listen_address: local_addr.ip().to_string(),
        port: local_addr.port(),
        token: config.session.token.clone(),
        encoding: (config.transport == Transport::Legacy).then_some(config.encoding),
    })?;

    let watchdog = session.start_serving()?;
    let mut server = match config.transport {
        Transport::Legacy => {
            let serving = serve_legacy(
                listener,
                collector,
                Arc::clone(&session),
                config.encoding.encoder(),
            );
            tokio::spawn(async move {
                serving.await;
                Ok::<(), anyhow::Error>(())
            })
        }
        Transport::Grpc => tokio::spawn(serve_grpc(listener, collector, Arc::clone(&session))),
    };

    let reason = tokio::select! {
        reason = session.terminated() => reason,
        joined = &mut server => {
            session.kill("transport stopped");
            joined.context("Transport task panicked")??;
            bail!("Transport stopped before the session terminated");
        }
    };

    info!(parent: session.span(), %reason, "Session terminating");
    server.await.context("Transport task panicked")??;
    watchdog.await.context("Watchdog task panicked")?;
    session.mark_terminated()?;
    Ok(reason)
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod host_tests;
