use super::*;
use crate::cpolicy::RuleKind;
use crate::model::MetricData;

#[tokio::test]
async fn test_metric_types_default_config() {
    let collector = ProcessCollector::new();
    let metric_types = collector.get_metric_types(ConfigMap::new()).await.unwrap();

    assert_eq!(metric_types.len(), 2);
    assert_eq!(
        metric_types[0].namespace.to_string(),
        "/proxy/process/uptime_secs"
    );
    assert_eq!(
        metric_types[1].namespace.to_string(),
        "/proxy/process/*/calls"
    );
    assert_eq!(
        metric_types[0].tags.get("label").map(String::as_str),
        Some("collector-proxy")
    );
    assert_eq!(
        metric_types[0].config.get("precision"),
        Some(&ConfigValue::Integer(0))
    );
}

#[tokio::test]
async fn test_metric_types_respect_config() {
    let collector = ProcessCollector::new();
    let config = ConfigMap::new().with("include_calls", false);

    let metric_types = collector.get_metric_types(config).await.unwrap();
    assert_eq!(metric_types.len(), 1);
}

#[tokio::test]
async fn test_metric_types_reject_invalid_config() {
    let collector = ProcessCollector::new();
    let config = ConfigMap::new().with("precision", 7i64);

    let err = collector.get_metric_types(config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid collector configuration"));
}

#[tokio::test]
async fn test_collect_expands_dynamic_operation() {
    let collector = ProcessCollector::new();
    let metric_types = collector.get_metric_types(ConfigMap::new()).await.unwrap();

    let collected = collector.collect_metrics(metric_types).await.unwrap();

    assert_eq!(collected.len(), 4);
    assert!(matches!(collected[0].data, Some(MetricData::Float(_))));

    let calls: Vec<String> = collected[1..]
        .iter()
        .map(|m| m.namespace.to_string())
        .collect();
    assert_eq!(
        calls,
        vec![
            "/proxy/process/get_metric_types/calls",
            "/proxy/process/collect_metrics/calls",
            "/proxy/process/get_config_policy/calls",
        ]
    );
    assert_eq!(collected[1].data, Some(MetricData::Int(1)));
    assert_eq!(collected[2].data, Some(MetricData::Int(1)));
    assert_eq!(collected[1].namespace[2].name, "operation");
}

#[tokio::test]
async fn test_collect_resolved_operation_only() {
    let collector = ProcessCollector::new();
    let mut metric = MetricType::new(ProcessCollector::calls_namespace(), 1);
    metric.namespace[2].resolve("get_config_policy");

    let collected = collector.collect_metrics(vec![metric]).await.unwrap();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].data, Some(MetricData::Int(0)));
}

#[tokio::test]
async fn test_collect_unknown_metric_fails() {
    let collector = ProcessCollector::new();
    let metric = MetricType::new(Namespace::new(["nope"]), 1);

    let err = collector.collect_metrics(vec![metric]).await.unwrap_err();
    assert_eq!(err.to_string(), "Unknown metric /nope");
}

#[tokio::test]
async fn test_config_policy() {
    let collector = ProcessCollector::new();
    let policy = collector.get_config_policy().await.unwrap();

    assert!(policy.is_frozen());
    let node = policy.rules_for(&POLICY_NAMESPACE);
    assert_eq!(node.len(), 3);
    assert_eq!(node.get("precision").map(|r| r.kind()), Some(RuleKind::Integer));
}
