//! Collectors used by the transport tests.

use crate::collector::Collector;
use crate::cpolicy::{BoolRule, ConfigPolicy, FloatRule, IntegerRule, PolicyNode, StringRule};
use crate::model::{ConfigMap, MetricType, Namespace};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Namespace key of the sample policy node.
pub const POLICY_KEY: [&str; 3] = ["one", "two", "potato"];

/// `/foo/*/bar` with a dynamic element named `test`.
pub fn dynamic_namespace() -> Namespace {
    Namespace::new(["foo"])
        .add_dynamic_element("test", "dynamic element")
        .add_static_element("bar")
}

/// The policy node every mock collector publishes.
pub fn sample_node() -> Result<PolicyNode> {
    let mut integer_rule = IntegerRule::new("integer_rule", true, Some(1234))?;
    integer_rule.set_maximum(9999)?;
    integer_rule.set_minimum(1000)?;

    let mut float_rule = FloatRule::new("float_rule", true, Some(0.1234))?;
    float_rule.set_maximum(0.9999)?;
    float_rule.set_minimum(0.001)?;

    Ok(PolicyNode::new()
        .with(StringRule::new("username", false, Some("root".to_string()))?)
        .with(StringRule::new("password", true, None)?)
        .with(BoolRule::new("bool_rule_default_true", false, Some(true))?)
        .with(BoolRule::new("bool_rule_default_false", false, Some(false))?)
        .with(integer_rule)
        .with(float_rule))
}

pub fn sample_policy() -> Result<ConfigPolicy> {
    let mut policy = ConfigPolicy::new();
    policy.add(POLICY_KEY, sample_node()?)?;
    policy.freeze();
    Ok(policy)
}

/// Well-behaved collector: advertises `/foo/*/bar` and `/foo/baz`, resolves the
/// dynamic element to `test` and attaches `"data"` on collection.
#[derive(Default)]
pub struct MockCollector {
    pub collect_calls: AtomicUsize,
}

#[async_trait]
impl Collector for MockCollector {
    async fn get_metric_types(&self, config: ConfigMap) -> Result<Vec<MetricType>> {
        Ok(vec![
            MetricType::new(dynamic_namespace(), 1).with_config(config.clone()),
            MetricType::new(Namespace::new(["foo", "baz"]), 1).with_config(config),
        ])
    }

    async fn collect_metrics(&self, mut metric_types: Vec<MetricType>) -> Result<Vec<MetricType>> {
        self.collect_calls.fetch_add(1, Ordering::SeqCst);
        for metric in &mut metric_types {
            if let Some(element) = metric.namespace.get_mut(1) {
                if element.is_dynamic() {
                    element.resolve("test");
                }
            }
            metric.record("data");
        }
        Ok(metric_types)
    }

    async fn get_config_policy(&self) -> Result<ConfigPolicy> {
        sample_policy()
    }
}

/// Collector whose every operation fails.
pub struct ErrorCollector;

#[async_trait]
impl Collector for ErrorCollector {
    async fn get_metric_types(&self, _config: ConfigMap) -> Result<Vec<MetricType>> {
        bail!("Error in get Metric Type")
    }

    async fn collect_metrics(&self, _metric_types: Vec<MetricType>) -> Result<Vec<MetricType>> {
        bail!("Error in collect Metric")
    }

    async fn get_config_policy(&self) -> Result<ConfigPolicy> {
        bail!("Error in get config policy")
    }
}
