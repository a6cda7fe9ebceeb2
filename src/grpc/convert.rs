//! Translation between the domain model and the protobuf messages.
//!
//! Model to wire never fails. Wire to model fails on malformed timestamps,
//! config keys present in more than one typed map, and policies whose rules
//! do not validate.

use super::messages::{self as pb, metric::Data};
use crate::cpolicy::policy::dotted_key;
use crate::cpolicy::{
    BoolRule, ConfigPolicy, FloatRule, IntegerRule, PolicyError, PolicyNode, Rule, StringRule,
};
use crate::model::{ConfigMap, ConfigValue, MetricData, MetricType, NamespaceElement};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

const NANOS_PER_SEC: u32 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Seconds/nanoseconds outside the representable range.
    InvalidTime { sec: i64, nsec: i64 },
    /// The same key appears in two typed config maps.
    DuplicateConfigKey { key: String },
    /// A transmitted rule failed validation.
    Policy(PolicyError),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::InvalidTime { sec, nsec } => {
                write!(f, "Invalid time (sec {}, nsec {})", sec, nsec)
            }
            ConversionError::DuplicateConfigKey { key } => {
                write!(f, "Config key '{}' has more than one type", key)
            }
            ConversionError::Policy(e) => write!(f, "Invalid policy: {}", e),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<PolicyError> for ConversionError {
    fn from(e: PolicyError) -> Self {
        ConversionError::Policy(e)
    }
}

pub fn time_to_wire(time: &DateTime<Utc>) -> pb::Time {
    pb::Time {
        sec: time.timestamp(),
        nsec: i64::from(time.timestamp_subsec_nanos()),
    }
}

/// An absent time stands for "now".
pub fn time_from_wire(time: Option<pb::Time>) -> Result<DateTime<Utc>, ConversionError> {
    let Some(time) = time else {
        return Ok(Utc::now());
    };
    u32::try_from(time.nsec)
        .ok()
        .filter(|nsec| *nsec < NANOS_PER_SEC)
        .and_then(|nsec| DateTime::from_timestamp(time.sec, nsec))
        .ok_or(ConversionError::InvalidTime {
            sec: time.sec,
            nsec: time.nsec,
        })
}

impl From<&NamespaceElement> for pb::NamespaceElement {
    fn from(element: &NamespaceElement) -> Self {
        Self {
            value: element.value.clone(),
            description: element.description.clone(),
            name: element.name.clone(),
        }
    }
}

impl From<pb::NamespaceElement> for NamespaceElement {
    fn from(element: pb::NamespaceElement) -> Self {
        Self {
            value: element.value,
            name: element.name,
            description: element.description,
        }
    }
}

impl From<&ConfigMap> for pb::ConfigMap {
    fn from(config: &ConfigMap) -> Self {
        let mut wire = pb::ConfigMap::default();
        for (key, value) in config.iter() {
            let key = key.clone();
            match value {
                ConfigValue::String(v) => {
                    wire.string_map.insert(key, v.clone());
                }
                ConfigValue::Integer(v) => {
                    wire.int_map.insert(key, *v);
                }
                ConfigValue::Float(v) => {
                    wire.float_map.insert(key, *v);
                }
                ConfigValue::Bool(v) => {
                    wire.bool_map.insert(key, *v);
                }
            }
        }
        wire
    }
}

impl TryFrom<pb::ConfigMap> for ConfigMap {
    type Error = ConversionError;

    fn try_from(wire: pb::ConfigMap) -> Result<Self, Self::Error> {
        let entries = wire
            .int_map
            .into_iter()
            .map(|(k, v)| (k, ConfigValue::Integer(v)))
            .chain(wire.string_map.into_iter().map(|(k, v)| (k, ConfigValue::String(v))))
            .chain(wire.float_map.into_iter().map(|(k, v)| (k, ConfigValue::Float(v))))
            .chain(wire.bool_map.into_iter().map(|(k, v)| (k, ConfigValue::Bool(v))));

        let mut config = ConfigMap::new();
        for (key, value) in entries {
            if config.contains_key(&key) {
                return Err(ConversionError::DuplicateConfigKey { key });
            }
            config.insert(key, value);
        }
        Ok(config)
    }
}

impl From<&MetricData> for Data {
    fn from(data: &MetricData) -> Self {
        match data {
            MetricData::String(v) => Data::StringData(v.clone()),
            MetricData::Int(v) => Data::Int64Data(*v),
            MetricData::Float(v) => Data::Float64Data(*v),
            MetricData::Bool(v) => Data::BoolData(*v),
            MetricData::Bytes(v) => Data::BytesData(v.clone()),
        }
    }
}

impl From<Data> for MetricData {
    fn from(data: Data) -> Self {
        match data {
            Data::StringData(v) => MetricData::String(v),
            Data::Int64Data(v) => MetricData::Int(v),
            Data::Float64Data(v) => MetricData::Float(v),
            Data::BoolData(v) => MetricData::Bool(v),
            Data::BytesData(v) => MetricData::Bytes(v),
        }
    }
}

impl From<&MetricType> for pb::Metric {
    fn from(metric: &MetricType) -> Self {
        Self {
            namespace: metric
                .namespace
                .elements()
                .iter()
                .map(pb::NamespaceElement::from)
                .collect(),
            version: metric.version,
            config: Some(pb::ConfigMap::from(&metric.config)),
            last_advertised_time: Some(time_to_wire(&metric.last_advertised_time)),
            tags: metric
                .tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timestamp: Some(time_to_wire(&metric.timestamp)),
            unit: metric.unit.clone(),
            description: metric.description.clone(),
            data: metric.data.as_ref().map(Data::from),
        }
    }
}

impl TryFrom<pb::Metric> for MetricType {
    type Error = ConversionError;

    fn try_from(wire: pb::Metric) -> Result<Self, Self::Error> {
        Ok(Self {
            namespace: wire.namespace.into_iter().map(NamespaceElement::from).collect(),
            timestamp: time_from_wire(wire.timestamp)?,
            last_advertised_time: time_from_wire(wire.last_advertised_time)?,
            version: wire.version,
            data: wire.data.map(MetricData::from),
            config: wire
                .config
                .map(ConfigMap::try_from)
                .transpose()?
                .unwrap_or_default(),
            tags: wire.tags.into_iter().collect(),
            unit: wire.unit,
            description: wire.description,
        })
    }
}

pub fn metrics_to_wire(metrics: &[MetricType]) -> Vec<pb::Metric> {
    metrics.iter().map(pb::Metric::from).collect()
}

pub fn metrics_from_wire(metrics: Vec<pb::Metric>) -> Result<Vec<MetricType>, ConversionError> {
    metrics.into_iter().map(MetricType::try_from).collect()
}

impl From<&ConfigPolicy> for pb::GetConfigPolicyReply {
    fn from(policy: &ConfigPolicy) -> Self {
        let mut reply = pb::GetConfigPolicyReply::default();
        for (namespace, node) in policy.iter() {
            let key = dotted_key(namespace);
            for rule in node.rules() {
                let rule_key = rule.key().to_string();
                match rule {
                    Rule::String(r) => {
                        reply.string_policy.entry(key.clone()).or_default().rules.insert(
                            rule_key,
                            pb::StringRule {
                                key: r.key().to_string(),
                                required: r.required(),
                                default_value: r.default().map(str::to_string),
                            },
                        );
                    }
                    Rule::Bool(r) => {
                        reply.bool_policy.entry(key.clone()).or_default().rules.insert(
                            rule_key,
                            pb::BoolRule {
                                key: r.key().to_string(),
                                required: r.required(),
                                default_value: r.default(),
                            },
                        );
                    }
                    Rule::Integer(r) => {
                        reply.integer_policy.entry(key.clone()).or_default().rules.insert(
                            rule_key,
                            pb::IntegerRule {
                                key: r.key().to_string(),
                                required: r.required(),
                                default_value: r.default(),
                                minimum: r.minimum(),
                                maximum: r.maximum(),
                            },
                        );
                    }
                    Rule::Float(r) => {
                        reply.float_policy.entry(key.clone()).or_default().rules.insert(
                            rule_key,
                            pb::FloatRule {
                                key: r.key().to_string(),
                                required: r.required(),
                                default_value: r.default(),
                                minimum: r.minimum(),
                                maximum: r.maximum(),
                            },
                        );
                    }
                }
            }
        }
        reply
    }
}

/// Rebuilds a policy from its per-kind wire form. The result is frozen.
impl TryFrom<pb::GetConfigPolicyReply> for ConfigPolicy {
    type Error = ConversionError;

    fn try_from(wire: pb::GetConfigPolicyReply) -> Result<Self, Self::Error> {
        let mut nodes: BTreeMap<String, PolicyNode> = BTreeMap::new();

        for (key, policy) in wire.string_policy {
            let node = nodes.entry(key).or_default();
            for r in policy.rules.into_values() {
                node.add(StringRule::new(r.key, r.required, r.default_value)?);
            }
        }
        for (key, policy) in wire.bool_policy {
            let node = nodes.entry(key).or_default();
            for r in policy.rules.into_values() {
                node.add(BoolRule::new(r.key, r.required, r.default_value)?);
            }
        }
        for (key, policy) in wire.integer_policy {
            let node = nodes.entry(key).or_default();
            for r in policy.rules.into_values() {
                node.add(IntegerRule::bounded(
                    r.key,
                    r.required,
                    r.default_value,
                    r.minimum,
                    r.maximum,
                )?);
            }
        }
        for (key, policy) in wire.float_policy {
            let node = nodes.entry(key).or_default();
            for r in policy.rules.into_values() {
                node.add(FloatRule::bounded(
                    r.key,
                    r.required,
                    r.default_value,
                    r.minimum,
                    r.maximum,
                )?);
            }
        }

        let mut policy = ConfigPolicy::new();
        for (key, node) in nodes {
            let namespace: Vec<String> = if key.is_empty() {
                Vec::new()
            } else {
                key.split('.').map(str::to_string).collect()
            };
            policy.add(namespace, node)?;
        }
        policy.freeze();
        Ok(policy)
    }
}
