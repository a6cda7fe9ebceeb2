//! The legacy byte-payload service.
//!
//! Every collector call takes and returns bytes produced by the session's
//! [`Encoder`](crate::encoding::Encoder); the structs below are what those
//! bytes hold.

use super::ProxyResult;
use crate::cpolicy::ConfigPolicy;
use crate::model::{ConfigMap, MetricType};
use serde::{Deserialize, Serialize};

/// Service exposed by a collector hosted on the legacy transport.
#[tarpc::service]
pub trait LegacyCollector {
    /// Authenticate this connection.
    /// Must be called first when the session has a token.
    async fn authenticate(token: String) -> ProxyResult<()>;

    /// Heartbeat. Resets the session watchdog.
    async fn ping(args: Vec<u8>) -> ProxyResult<Vec<u8>>;

    /// Terminates the session. Carries [`KillArgs`].
    async fn kill(args: Vec<u8>) -> ProxyResult<Vec<u8>>;

    /// Carries [`GetMetricTypesArgs`], returns [`GetMetricTypesReply`].
    async fn get_metric_types(args: Vec<u8>) -> ProxyResult<Vec<u8>>;

    /// Carries [`CollectMetricsArgs`], returns [`CollectMetricsReply`].
    async fn collect_metrics(args: Vec<u8>) -> ProxyResult<Vec<u8>>;

    /// Argument is ignored; returns [`GetConfigPolicyReply`].
    async fn get_config_policy(args: Vec<u8>) -> ProxyResult<Vec<u8>>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMetricTypesArgs {
    #[serde(default)]
    pub config: ConfigMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetMetricTypesReply {
    pub metric_types: Vec<MetricType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectMetricsArgs {
    #[serde(default)]
    pub metric_types: Vec<MetricType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectMetricsReply {
    pub plugin_metrics: Vec<MetricType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetConfigPolicyReply {
    pub policy: ConfigPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KillArgs {
    #[serde(default)]
    pub reason: String,
}
