//! Metric types exchanged between the proxy and a collector.

use super::{ConfigMap, Namespace};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload of a collected metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricData {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl From<&str> for MetricData {
    fn from(v: &str) -> Self {
        MetricData::String(v.to_string())
    }
}

impl From<String> for MetricData {
    fn from(v: String) -> Self {
        MetricData::String(v)
    }
}

impl From<i64> for MetricData {
    fn from(v: i64) -> Self {
        MetricData::Int(v)
    }
}

impl From<f64> for MetricData {
    fn from(v: f64) -> Self {
        MetricData::Float(v)
    }
}

impl From<bool> for MetricData {
    fn from(v: bool) -> Self {
        MetricData::Bool(v)
    }
}

impl From<Vec<u8>> for MetricData {
    fn from(v: Vec<u8>) -> Self {
        MetricData::Bytes(v)
    }
}

/// A metric as advertised by `GetMetricTypes` and returned by `CollectMetrics`.
///
/// Only the owning collector mutates a metric (resolving dynamic namespace
/// elements, refreshing timestamps, attaching data). The proxy passes it
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricType {
    pub namespace: Namespace,
    pub timestamp: DateTime<Utc>,
    pub last_advertised_time: DateTime<Utc>,
    /// Disambiguates schema revisions of the same namespace.
    pub version: i64,
    #[serde(default)]
    pub data: Option<MetricData>,
    #[serde(default)]
    pub config: ConfigMap,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl MetricType {
    /// Creates a metric without data, advertised now.
    pub fn new(namespace: Namespace, version: i64) -> Self {
        let now = Utc::now();
        Self {
            namespace,
            timestamp: now,
            last_advertised_time: now,
            version,
            data: None,
            config: ConfigMap::default(),
            tags: BTreeMap::new(),
            unit: String::new(),
            description: String::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<MetricData>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    /// Refreshes the collection timestamp and stores the collected value.
    pub fn record(&mut self, data: impl Into<MetricData>) {
        self.timestamp = Utc::now();
        self.data = Some(data.into());
    }
}
