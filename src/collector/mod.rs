//! The capability a hosted collector provides.

pub mod dispatch;

use crate::cpolicy::ConfigPolicy;
use crate::model::{ConfigMap, MetricType};
use async_trait::async_trait;

/// A metrics collector hosted by the proxy.
///
/// # Thread safety
///
/// One collector instance is shared by every connection of a session and the
/// proxy does not serialize calls: `collect_metrics` may run concurrently with
/// itself and with the other operations. Implementations guard their own
/// mutable state.
///
/// Errors are reported to the caller verbatim, prefixed with the operation
/// name, and are never retried.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Enumerates the metrics this collector can produce for `config`.
    async fn get_metric_types(&self, config: ConfigMap) -> anyhow::Result<Vec<MetricType>>;

    /// Collects current values. Dynamic namespace elements are resolved here.
    async fn collect_metrics(&self, metric_types: Vec<MetricType>)
        -> anyhow::Result<Vec<MetricType>>;

    /// The configuration this collector accepts.
    async fn get_config_policy(&self) -> anyhow::Result<ConfigPolicy>;
}
