//! A small collector reporting on the hosting process itself.
//!
//! Metrics:
//! - `/proxy/process/uptime_secs`: seconds since the collector was created.
//! - `/proxy/process/<operation>/calls`: calls served per collector operation,
//!   with `<operation>` a dynamic element.

use crate::collector::Collector;
use crate::cpolicy::{BoolRule, ConfigPolicy, IntegerRule, PolicyNode, StringRule};
use crate::model::{ConfigMap, ConfigValue, MetricType, Namespace};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub const POLICY_NAMESPACE: [&str; 2] = ["proxy", "process"];

const OPERATIONS: [&str; 3] = ["get_metric_types", "collect_metrics", "get_config_policy"];

pub struct ProcessCollector {
    started: Instant,
    calls: [AtomicU64; 3],
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            calls: Default::default(),
        }
    }

    fn count(&self, operation: usize) {
        if let Some(counter) = self.calls.get(operation) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn calls_for(&self, operation: &str) -> Option<u64> {
        OPERATIONS
            .iter()
            .position(|op| *op == operation)
            .and_then(|i| self.calls.get(i))
            .map(|counter| counter.load(Ordering::Relaxed))
    }

    fn uptime_namespace() -> Namespace {
        Namespace::new(["proxy", "process", "uptime_secs"])
    }

    fn calls_namespace() -> Namespace {
        Namespace::new(["proxy", "process"])
            .add_dynamic_element("operation", "collector operation name")
            .add_static_element("calls")
    }

    fn policy_node() -> Result<PolicyNode> {
        Ok(PolicyNode::new()
            .with(StringRule::new("label", false, Some("collector-proxy".to_string()))?)
            .with(BoolRule::new("include_calls", false, Some(true))?)
            .with(IntegerRule::bounded("precision", false, Some(0), Some(0), Some(3))?))
    }
}

#[async_trait]
impl Collector for ProcessCollector {
    async fn get_metric_types(&self, config: ConfigMap) -> Result<Vec<MetricType>> {
        self.count(0);

        let config = Self::policy_node()?
            .process(&config)
            .context("Invalid collector configuration")?;
        let label = match config.get("label") {
            Some(ConfigValue::String(label)) => label.clone(),
            _ => String::new(),
        };
        let include_calls = !matches!(config.get("include_calls"), Some(ConfigValue::Bool(false)));

        let mut metric_types = vec![MetricType::new(Self::uptime_namespace(), 1)
            .with_unit("s")
            .with_description("Seconds since the collector started")
            .with_tag("label", label.clone())
            .with_config(config.clone())];
        if include_calls {
            metric_types.push(
                MetricType::new(Self::calls_namespace(), 1)
                    .with_description("Calls served per collector operation")
                    .with_tag("label", label)
                    .with_config(config),
            );
        }
        Ok(metric_types)
    }

    async fn collect_metrics(&self, metric_types: Vec<MetricType>) -> Result<Vec<MetricType>> {
        self.count(1);

        let mut collected = Vec::new();
        for metric in metric_types {
            if metric.namespace.matches(&Self::uptime_namespace()) {
                let mut metric = metric;
                metric.record(self.started.elapsed().as_secs_f64());
                collected.push(metric);
            } else if metric.namespace.matches(&Self::calls_namespace()) {
                let requested = metric.namespace.get(2).map(|e| e.value.clone());
                for operation in OPERATIONS {
                    if requested.as_deref().is_some_and(|v| v != "*" && v != operation) {
                        continue;
                    }
                    let calls = self.calls_for(operation).unwrap_or_default();
                    let mut metric = metric.clone();
                    metric.namespace[2].resolve(operation);
                    metric.record(i64::try_from(calls).unwrap_or(i64::MAX));
                    collected.push(metric);
                }
            } else {
                bail!("Unknown metric {}", metric.namespace);
            }
        }
        Ok(collected)
    }

    async fn get_config_policy(&self) -> Result<ConfigPolicy> {
        self.count(2);

        let mut policy = ConfigPolicy::new();
        policy.add(POLICY_NAMESPACE, Self::policy_node()?)?;
        policy.freeze();
        Ok(policy)
    }
}

#[cfg(test)]
#[path = "tests/demo_tests.rs"]
mod demo_tests;
