//! Value types shared by the policy engine, the session and both transports.

pub mod config_map;
pub mod metric;
pub mod namespace;

pub use config_map::{ConfigMap, ConfigValue};
pub use metric::{MetricData, MetricType};
pub use namespace::{Namespace, NamespaceElement, WILDCARD};

#[cfg(test)]
#[path = "tests/namespace_tests.rs"]
mod namespace_tests;

#[cfg(test)]
#[path = "tests/metric_tests.rs"]
mod metric_tests;
