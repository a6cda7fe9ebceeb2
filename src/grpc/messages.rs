//! Protobuf messages of the `rpc.Collector` service.

use std::collections::HashMap;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KillRequest {
    #[prost(string, tag = "1")]
    pub reason: String,
}

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Time {
    #[prost(int64, tag = "1")]
    pub sec: i64,
    #[prost(int64, tag = "2")]
    pub nsec: i64,
}

/// An empty `name` marks a static element.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamespaceElement {
    #[prost(string, tag = "1")]
    pub value: String,
    #[prost(string, tag = "2")]
    pub description: String,
    #[prost(string, tag = "3")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigMap {
    #[prost(map = "string, int64", tag = "1")]
    pub int_map: HashMap<String, i64>,
    #[prost(map = "string, string", tag = "2")]
    pub string_map: HashMap<String, String>,
    #[prost(map = "string, double", tag = "3")]
    pub float_map: HashMap<String, f64>,
    #[prost(map = "string, bool", tag = "4")]
    pub bool_map: HashMap<String, bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Metric {
    #[prost(message, repeated, tag = "1")]
    pub namespace: Vec<NamespaceElement>,
    #[prost(int64, tag = "2")]
    pub version: i64,
    #[prost(message, optional, tag = "3")]
    pub config: Option<ConfigMap>,
    #[prost(message, optional, tag = "4")]
    pub last_advertised_time: Option<Time>,
    #[prost(map = "string, string", tag = "5")]
    pub tags: HashMap<String, String>,
    #[prost(message, optional, tag = "6")]
    pub timestamp: Option<Time>,
    #[prost(string, tag = "7")]
    pub unit: String,
    #[prost(string, tag = "8")]
    pub description: String,
    #[prost(oneof = "metric::Data", tags = "9, 10, 11, 12, 13")]
    pub data: Option<metric::Data>,
}

pub mod metric {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(string, tag = "9")]
        StringData(String),
        #[prost(int64, tag = "10")]
        Int64Data(i64),
        #[prost(double, tag = "11")]
        Float64Data(f64),
        #[prost(bool, tag = "12")]
        BoolData(bool),
        #[prost(bytes = "vec", tag = "13")]
        BytesData(Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricsArg {
    #[prost(message, repeated, tag = "1")]
    pub metrics: Vec<Metric>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MetricsReply {
    #[prost(message, repeated, tag = "1")]
    pub metrics: Vec<Metric>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMetricTypesArg {
    #[prost(message, optional, tag = "1")]
    pub config: Option<ConfigMap>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringRule {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bool, tag = "2")]
    pub required: bool,
    #[prost(string, optional, tag = "3")]
    pub default_value: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoolRule {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bool, tag = "2")]
    pub required: bool,
    #[prost(bool, optional, tag = "3")]
    pub default_value: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IntegerRule {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bool, tag = "2")]
    pub required: bool,
    #[prost(int64, optional, tag = "3")]
    pub default_value: Option<i64>,
    #[prost(int64, optional, tag = "4")]
    pub minimum: Option<i64>,
    #[prost(int64, optional, tag = "5")]
    pub maximum: Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatRule {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(bool, tag = "2")]
    pub required: bool,
    #[prost(double, optional, tag = "3")]
    pub default_value: Option<f64>,
    #[prost(double, optional, tag = "4")]
    pub minimum: Option<f64>,
    #[prost(double, optional, tag = "5")]
    pub maximum: Option<f64>,
}

/// String rules of one namespace key, by rule key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringPolicy {
    #[prost(map = "string, message", tag = "1")]
    pub rules: HashMap<String, StringRule>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoolPolicy {
    #[prost(map = "string, message", tag = "1")]
    pub rules: HashMap<String, BoolRule>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IntegerPolicy {
    #[prost(map = "string, message", tag = "1")]
    pub rules: HashMap<String, IntegerRule>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FloatPolicy {
    #[prost(map = "string, message", tag = "1")]
    pub rules: HashMap<String, FloatRule>,
}

/// A config policy regrouped by rule kind. Map keys are dot-joined namespace keys.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetConfigPolicyReply {
    #[prost(map = "string, message", tag = "1")]
    pub bool_policy: HashMap<String, BoolPolicy>,
    #[prost(map = "string, message", tag = "2")]
    pub float_policy: HashMap<String, FloatPolicy>,
    #[prost(map = "string, message", tag = "3")]
    pub integer_policy: HashMap<String, IntegerPolicy>,
    #[prost(map = "string, message", tag = "4")]
    pub string_policy: HashMap<String, StringPolicy>,
}
