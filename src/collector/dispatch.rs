//! Operation routines shared by both transports.
//!
//! Transports only decode, encode and translate; invoking the collector and
//! attaching the operation to its error happens here.

use super::Collector;
use crate::cpolicy::ConfigPolicy;
use crate::model::{ConfigMap, MetricType};
use crate::rpc::{Operation, ProxyError};
use tracing::{debug, warn};

fn collector_error(operation: Operation, e: anyhow::Error) -> ProxyError {
    let error = ProxyError::Collector {
        operation,
        message: format!("{:#}", e),
    };
    warn!(%error, "Collector call failed");
    error
}

pub async fn get_metric_types(
    collector: &dyn Collector,
    config: ConfigMap,
) -> Result<Vec<MetricType>, ProxyError> {
    let metric_types = collector
        .get_metric_types(config)
        .await
        .map_err(|e| collector_error(Operation::GetMetricTypes, e))?;
    debug!(count = metric_types.len(), "Advertised metric types");
    Ok(metric_types)
}

pub async fn collect_metrics(
    collector: &dyn Collector,
    metric_types: Vec<MetricType>,
) -> Result<Vec<MetricType>, ProxyError> {
    let requested = metric_types.len();
    let metrics = collector
        .collect_metrics(metric_types)
        .await
        .map_err(|e| collector_error(Operation::CollectMetrics, e))?;
    debug!(requested, collected = metrics.len(), "Collected metrics");
    Ok(metrics)
}

pub async fn get_config_policy(collector: &dyn Collector) -> Result<ConfigPolicy, ProxyError> {
    collector
        .get_config_policy()
        .await
        .map_err(|e| collector_error(Operation::GetConfigPolicy, e))
}
