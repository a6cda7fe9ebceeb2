use super::collector_server::{Collector as CollectorService, CollectorServer};
use super::convert::{metrics_from_wire, metrics_to_wire, ConversionError};
use super::messages as pb;
use crate::collector::{dispatch, Collector};
use crate::model::ConfigMap;
use crate::rpc::ProxyError;
use crate::session::Session;
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Result as TonicResult, Status};
use tracing::{info, warn, Instrument};

/// Metadata key carrying the session token.
pub const AUTHORIZATION_HEADER: &str = "authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

fn proxy_status(e: ProxyError) -> Status {
    match e {
        ProxyError::Collector { .. } => Status::unknown(e.to_string()),
        ProxyError::Encoding(_) => Status::invalid_argument(e.to_string()),
        ProxyError::AuthenticationFailed => Status::unauthenticated(e.to_string()),
    }
}

fn conversion_status(e: ConversionError) -> Status {
    Status::invalid_argument(e.to_string())
}

/// gRPC service implementation wrapping a collector.
pub struct GrpcProxy {
    collector: Arc<dyn Collector>,
    session: Arc<Session>,
}

impl GrpcProxy {
    pub fn new(collector: Arc<dyn Collector>, session: Arc<Session>) -> Self {
        Self { collector, session }
    }
}

#[tonic::async_trait]
impl CollectorService for GrpcProxy {
    async fn ping(&self, _request: Request<pb::Empty>) -> TonicResult<Response<pb::Empty>> {
        self.session.ping();
        Ok(Response::new(pb::Empty {}))
    }

    async fn kill(&self, request: Request<pb::KillRequest>) -> TonicResult<Response<pb::Empty>> {
        self.session.kill(request.into_inner().reason);
        Ok(Response::new(pb::Empty {}))
    }

    async fn get_config_policy(
        &self,
        _request: Request<pb::Empty>,
    ) -> TonicResult<Response<pb::GetConfigPolicyReply>> {
        let policy = dispatch::get_config_policy(self.collector.as_ref())
            .instrument(self.session.span().clone())
            .await
            .map_err(proxy_status)?;
        Ok(Response::new(pb::GetConfigPolicyReply::from(&policy)))
    }

    async fn collect_metrics(
        &self,
        request: Request<pb::MetricsArg>,
    ) -> TonicResult<Response<pb::MetricsReply>> {
        let metric_types =
            metrics_from_wire(request.into_inner().metrics).map_err(conversion_status)?;
        let metrics = dispatch::collect_metrics(self.collector.as_ref(), metric_types)
            .instrument(self.session.span().clone())
            .await
            .map_err(proxy_status)?;
        Ok(Response::new(pb::MetricsReply {
            metrics: metrics_to_wire(&metrics),
        }))
    }

    async fn get_metric_types(
        &self,
        request: Request<pb::GetMetricTypesArg>,
    ) -> TonicResult<Response<pb::MetricsReply>> {
        let config = request
            .into_inner()
            .config
            .map(ConfigMap::try_from)
            .transpose()
            .map_err(conversion_status)?
            .unwrap_or_default();
        let metric_types = dispatch::get_metric_types(self.collector.as_ref(), config)
            .instrument(self.session.span().clone())
            .await
            .map_err(proxy_status)?;
        Ok(Response::new(pb::MetricsReply {
            metrics: metrics_to_wire(&metric_types),
        }))
    }
}

/// Rejects requests without the session token when the session has one.
fn authorize(session: &Session, request: Request<()>) -> TonicResult<Request<()>> {
    if !session.requires_auth() {
        return Ok(request);
    }
    let token = request
        .metadata()
        .get(AUTHORIZATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    match token {
        Some(token) if session.authenticate(token) => Ok(request),
        _ => {
            warn!(parent: session.span(), "Rejected request without a valid token");
            Err(proxy_status(ProxyError::AuthenticationFailed))
        }
    }
}

/// Serves the gRPC transport on `listener` until the session starts terminating.
///
/// In-flight calls complete before this returns; the listener is released.
pub async fn serve_grpc(
    listener: TcpListener,
    collector: Arc<dyn Collector>,
    session: Arc<Session>,
) -> anyhow::Result<()> {
    let shutdown = session.shutdown_token();
    let auth_session = Arc::clone(&session);
    let service = CollectorServer::with_interceptor(
        GrpcProxy::new(collector, Arc::clone(&session)),
        move |request: Request<()>| authorize(&auth_session, request),
    );

    info!(parent: session.span(), "gRPC transport serving");

    tonic::transport::Server::builder()
        .add_service(service)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            shutdown.cancelled().await;
        })
        .await
        .context("gRPC server failed")?;

    info!(parent: session.span(), "gRPC listener closed");
    Ok(())
}
