use super::convert::*;
use super::messages as pb;
use crate::cpolicy::ConfigPolicy;
use crate::model::{ConfigMap, ConfigValue, MetricData, MetricType};
use crate::test_support::{dynamic_namespace, sample_policy, POLICY_KEY};
use chrono::{TimeZone, Utc};

#[test]
fn test_metric_translates_losslessly() {
    let metric = MetricType::new(dynamic_namespace(), 3)
        .with_data(vec![1u8, 2, 3])
        .with_config(
            ConfigMap::new()
                .with("user", "root")
                .with("port", 8080i64)
                .with("ratio", 0.5)
                .with("debug", true),
        )
        .with_tag("dc", "east")
        .with_unit("bytes")
        .with_description("sample");

    let wire = pb::Metric::from(&metric);
    assert_eq!(wire.namespace.len(), 3);
    assert_eq!(wire.namespace[1].name, "test");
    assert_eq!(wire.namespace[0].name, "");

    let back = MetricType::try_from(wire).unwrap();
    assert_eq!(back, metric);
}

#[test]
fn test_each_data_kind_translates() {
    let kinds = [
        MetricData::from("s"),
        MetricData::from(-4i64),
        MetricData::from(2.5),
        MetricData::from(false),
        MetricData::from(vec![0u8]),
    ];
    for data in kinds {
        let wire = pb::metric::Data::from(&data);
        assert_eq!(MetricData::from(wire), data);
    }
}

#[test]
fn test_missing_times_default_to_now() {
    let before = Utc::now();
    let metric = MetricType::try_from(pb::Metric::default()).unwrap();
    assert!(metric.timestamp >= before);
    assert!(metric.last_advertised_time >= before);
    assert!(metric.data.is_none());
    assert!(metric.config.is_empty());
}

#[test]
fn test_time_round_trip_keeps_nanos() {
    let time = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
    let wire = time_to_wire(&time);
    assert_eq!(wire.nsec, 123_456_789);
    assert_eq!(time_from_wire(Some(wire)).unwrap(), time);
}

#[test]
fn test_invalid_time_rejected() {
    let err = time_from_wire(Some(pb::Time {
        sec: 1,
        nsec: 1_000_000_000,
    }))
    .unwrap_err();
    assert_eq!(
        err,
        ConversionError::InvalidTime {
            sec: 1,
            nsec: 1_000_000_000
        }
    );
}

#[test]
fn test_duplicate_config_key_rejected() {
    let wire = pb::ConfigMap {
        int_map: [("k".to_string(), 1)].into(),
        bool_map: [("k".to_string(), true)].into(),
        ..Default::default()
    };
    assert_eq!(
        ConfigMap::try_from(wire).unwrap_err(),
        ConversionError::DuplicateConfigKey {
            key: "k".to_string()
        }
    );
}

#[test]
fn test_config_map_splits_by_type() {
    let config = ConfigMap::new().with("a", 1i64).with("b", "x");
    let wire = pb::ConfigMap::from(&config);
    assert_eq!(wire.int_map.get("a"), Some(&1));
    assert_eq!(wire.string_map.get("b").map(String::as_str), Some("x"));

    let back = ConfigMap::try_from(wire).unwrap();
    assert_eq!(back.get("a"), Some(&ConfigValue::Integer(1)));
}

#[test]
fn test_policy_regrouped_by_kind_and_rebuilt() {
    let policy = sample_policy().unwrap();
    let wire = pb::GetConfigPolicyReply::from(&policy);

    assert_eq!(wire.string_policy.len(), 1);
    assert!(wire.string_policy.contains_key("one.two.potato"));
    assert_eq!(
        wire.string_policy["one.two.potato"].rules["username"].default_value,
        Some("root".to_string())
    );

    let rebuilt = ConfigPolicy::try_from(wire).unwrap();
    assert_eq!(rebuilt, policy);
    assert_eq!(rebuilt.rules_for(&POLICY_KEY).len(), 6);
}

#[test]
fn test_invalid_wire_rule_rejected() {
    let mut wire = pb::GetConfigPolicyReply::default();
    wire.integer_policy.insert(
        "a".to_string(),
        pb::IntegerPolicy {
            rules: [(
                "n".to_string(),
                pb::IntegerRule {
                    key: "n".to_string(),
                    required: false,
                    default_value: Some(5),
                    minimum: Some(10),
                    maximum: None,
                },
            )]
            .into(),
        },
    );

    assert!(matches!(
        ConfigPolicy::try_from(wire),
        Err(ConversionError::Policy(_))
    ));
}
