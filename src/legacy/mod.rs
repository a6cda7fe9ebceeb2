//! Legacy transport: the [`LegacyCollector`] tarpc service over TCP.
//!
//! Requests and replies are opaque byte payloads produced by the injected
//! [`Encoder`]; tarpc frames them with bincode.

use crate::collector::{dispatch, Collector};
use crate::encoding::Encoder;
use crate::rpc::legacy_service::{
    CollectMetricsArgs, CollectMetricsReply, GetConfigPolicyReply, GetMetricTypesArgs,
    GetMetricTypesReply, KillArgs, LegacyCollector, LegacyCollectorClient,
};
use crate::rpc::{ProxyError, ProxyResult};
use crate::session::Session;
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tarpc::server::{self, Channel};
use tarpc::tokio_serde::formats::Bincode;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, info, warn, Instrument};

/// Time open connections get to flush replies (such as the `Kill` reply) after
/// the session starts terminating.
const CONNECTION_DRAIN: Duration = Duration::from_millis(200);

/// Per-connection server for [`LegacyCollector`].
#[derive(Clone)]
pub struct LegacyProxy {
    collector: Arc<dyn Collector>,
    session: Arc<Session>,
    encoder: Arc<dyn Encoder>,
    /// Whether this connection has been authenticated.
    authenticated: Arc<AtomicBool>,
}

impl LegacyProxy {
    pub fn new(
        collector: Arc<dyn Collector>,
        session: Arc<Session>,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        Self {
            collector,
            session,
            encoder,
            authenticated: Arc::new(AtomicBool::new(false)),
        }
    }

    fn check_authenticated(&self) -> ProxyResult<()> {
        if self.session.requires_auth() && !self.authenticated.load(Ordering::Acquire) {
            return Err(ProxyError::AuthenticationFailed);
        }
        Ok(())
    }
}

impl LegacyCollector for LegacyProxy {
    async fn authenticate(self, _: tarpc::context::Context, token: String) -> ProxyResult<()> {
        if self.session.authenticate(&token) {
            self.authenticated.store(true, Ordering::Release);
            debug!("Client authenticated successfully");
            return Ok(());
        }
        warn!("Client authentication failed");
        Err(ProxyError::AuthenticationFailed)
    }

    async fn ping(self, _: tarpc::context::Context, _args: Vec<u8>) -> ProxyResult<Vec<u8>> {
        self.check_authenticated()?;
        self.session.ping();
        Ok(Vec::new())
    }

    async fn kill(self, _: tarpc::context::Context, args: Vec<u8>) -> ProxyResult<Vec<u8>> {
        self.check_authenticated()?;
        let args: KillArgs = self.encoder.decode_or_default(&args)?;
        self.session.kill(args.reason);
        Ok(Vec::new())
    }

    async fn get_metric_types(
        self,
        _: tarpc::context::Context,
        args: Vec<u8>,
    ) -> ProxyResult<Vec<u8>> {
        self.check_authenticated()?;
        let args: GetMetricTypesArgs = self.encoder.decode_or_default(&args)?;
        let metric_types = dispatch::get_metric_types(self.collector.as_ref(), args.config).await?;
        Ok(self.encoder.encode(&GetMetricTypesReply { metric_types })?)
    }

    async fn collect_metrics(
        self,
        _: tarpc::context::Context,
        args: Vec<u8>,
    ) -> ProxyResult<Vec<u8>> {
        self.check_authenticated()?;
        let args: CollectMetricsArgs = self.encoder.decode_or_default(&args)?;
        let plugin_metrics =
            dispatch::collect_metrics(self.collector.as_ref(), args.metric_types).await?;
        Ok(self.encoder.encode(&CollectMetricsReply { plugin_metrics })?)
    }

    async fn get_config_policy(
        self,
        _: tarpc::context::Context,
        _args: Vec<u8>,
    ) -> ProxyResult<Vec<u8>> {
        self.check_authenticated()?;
        let policy = dispatch::get_config_policy(self.collector.as_ref()).await?;
        Ok(self.encoder.encode(&GetConfigPolicyReply { policy })?)
    }
}

/// Serves the legacy transport on `listener` until the session starts terminating.
///
/// The listener is dropped as soon as termination starts; open connections get
/// [`CONNECTION_DRAIN`] to flush their replies and are awaited before this returns.
pub async fn serve_legacy(
    listener: TcpListener,
    collector: Arc<dyn Collector>,
    session: Arc<Session>,
    encoder: Arc<dyn Encoder>,
) {
    let shutdown = session.shutdown_token();
    let span = session.span().clone();
    let mut connections = JoinSet::new();

    info!(parent: &span, encoding = encoder.name(), "Legacy transport serving");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(parent: &span, %peer, "Connection accepted");
                        let framed = Framed::new(stream, LengthDelimitedCodec::new());
                        let transport = tarpc::serde_transport::new(framed, Bincode::default());
                        let proxy = LegacyProxy::new(
                            Arc::clone(&collector),
                            Arc::clone(&session),
                            Arc::clone(&encoder),
                        );
                        let channel = server::BaseChannel::with_defaults(transport);
                        let span = span.clone();
                        let shutdown = shutdown.clone();

                        connections.spawn(async move {
                            let requests = channel.execute(proxy.serve()).for_each(|response| {
                                let span = span.clone();
                                async move {
                                    tokio::spawn(response.instrument(span));
                                }
                            });
                            tokio::select! {
                                _ = requests => {}
                                _ = async {
                                    shutdown.cancelled().await;
                                    tokio::time::sleep(CONNECTION_DRAIN).await;
                                } => {}
                            }
                        });
                    }
                    Err(e) => {
                        warn!(parent: &span, error = %e, "Accept error");
                    }
                }
            }
            Some(finished) = connections.join_next() => {
                if let Err(e) = finished {
                    warn!(parent: &span, error = %e, "Connection task failed");
                }
            }
            _ = shutdown.cancelled() => {
                break;
            }
        }
    }

    drop(listener);
    info!(parent: &span, open = connections.len(), "Legacy listener closed, draining connections");

    while let Some(finished) = connections.join_next().await {
        if let Err(e) = finished {
            warn!(parent: &span, error = %e, "Connection task failed");
        }
    }
    debug!(parent: &span, "Legacy connections drained");
}

/// Connects a client to a legacy transport listening on `addr`.
pub async fn connect(addr: SocketAddr) -> anyhow::Result<LegacyCollectorClient> {
    use tarpc::serde_transport::tcp;

    let transport = tcp::connect(addr, Bincode::default).await?;
    Ok(LegacyCollectorClient::new(tarpc::client::Config::default(), transport).spawn())
}

#[cfg(test)]
#[path = "tests/legacy_tests.rs"]
mod legacy_tests;
