use super::policy::dotted_key;
use super::*;
use crate::model::{ConfigMap, ConfigValue};

fn sample_node() -> PolicyNode {
    PolicyNode::new()
        .with(StringRule::new("username", false, Some("root".to_string())).unwrap())
        .with(StringRule::new("password", true, None).unwrap())
        .with(IntegerRule::bounded("port", false, Some(8080), Some(1), Some(65535)).unwrap())
}

#[test]
fn test_freeze_then_add_fails() {
    let mut policy = ConfigPolicy::new();
    policy.add(["one", "two"], sample_node()).unwrap();
    policy.freeze();

    assert_eq!(
        policy.add(["three"], PolicyNode::new()).unwrap_err(),
        PolicyError::Frozen
    );
    assert_eq!(policy.len(), 1);
}

#[test]
fn test_freeze_is_idempotent() {
    let mut policy = ConfigPolicy::new();
    policy.add(["a"], sample_node()).unwrap();
    let before = policy.clone();

    policy.freeze();
    let once = policy.clone();
    policy.freeze();

    assert!(policy.is_frozen());
    assert_eq!(policy, once);
    assert_eq!(policy.rules_for(&["a"]), before.rules_for(&["a"]));
}

#[test]
fn test_add_overwrites_node() {
    let mut policy = ConfigPolicy::new();
    policy.add(["a"], sample_node()).unwrap();
    policy
        .add(["a"], PolicyNode::new().with(BoolRule::new("x", false, None).unwrap()))
        .unwrap();

    assert_eq!(policy.len(), 1);
    assert_eq!(policy.rules_for(&["a"]).len(), 1);
}

#[test]
fn test_rules_for_exact_match_or_empty() {
    let mut policy = ConfigPolicy::new();
    policy.add(["one", "two", "potato"], sample_node()).unwrap();

    assert_eq!(policy.rules_for(&["one", "two", "potato"]).len(), 3);
    assert!(policy.rules_for(&["one", "two"]).is_empty());
    assert!(policy.rules_for(&["one", "two", "potato", "chips"]).is_empty());
    assert!(policy.rules_for::<&str>(&[]).is_empty());
}

#[test]
fn test_node_rule_keys_are_unique() {
    let mut node = PolicyNode::new();
    node.add(StringRule::new("k", false, None).unwrap());
    node.add(IntegerRule::new("k", false, Some(1)).unwrap());

    assert_eq!(node.len(), 1);
    assert_eq!(node.get("k").map(Rule::kind), Some(RuleKind::Integer));
}

#[test]
fn test_process_applies_defaults_and_passes_unknown_keys() {
    let config = ConfigMap::new()
        .with("password", "secret")
        .with("extra", true);

    let processed = sample_node().process(&config).unwrap();

    assert_eq!(processed.get("username"), Some(&ConfigValue::from("root")));
    assert_eq!(processed.get("password"), Some(&ConfigValue::from("secret")));
    assert_eq!(processed.get("port"), Some(&ConfigValue::Integer(8080)));
    assert_eq!(processed.get("extra"), Some(&ConfigValue::Bool(true)));
}

#[test]
fn test_process_collects_all_errors() {
    let config = ConfigMap::new().with("port", 70000i64).with("username", 5i64);

    let errors = sample_node().process(&config).unwrap_err();

    assert_eq!(errors.len(), 3);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ProcessingError::MissingRequired { key } if key == "password")));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ProcessingError::AboveMaximum { .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ProcessingError::WrongType { .. })));
    assert!(errors.to_string().contains("required key missing (password)"));
}

#[test]
fn test_policy_serializes_through_json() {
    let mut policy = ConfigPolicy::new();
    policy.add(["one", "two", "potato"], sample_node()).unwrap();
    policy.freeze();

    let json = serde_json::to_string(&policy).unwrap();
    let parsed: ConfigPolicy = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, policy);
    assert!(parsed.is_frozen());
}

#[test]
fn test_iter_and_dotted_key() {
    let mut policy = ConfigPolicy::new();
    policy.add(["one", "two", "potato"], sample_node()).unwrap();

    let keys: Vec<String> = policy.iter().map(|(ns, _)| dotted_key(ns)).collect();
    assert_eq!(keys, vec!["one.two.potato"]);
}

#[test]
fn test_add_rejects_elements_that_break_dotted_key() {
    let mut policy = ConfigPolicy::new();

    assert_eq!(
        policy.add(["a.b", "c"], sample_node()).unwrap_err(),
        PolicyError::InvalidNamespaceElement {
            element: "a.b".to_string()
        }
    );
    assert!(matches!(
        policy.add(["a", ""], sample_node()),
        Err(PolicyError::InvalidNamespaceElement { .. })
    ));
    assert!(policy.is_empty());

    policy.add(Vec::<String>::new(), sample_node()).unwrap();
    assert_eq!(policy.len(), 1);
}

#[test]
fn test_deserialize_rejects_dotted_namespace() {
    let json = r#"{"nodes":[{"namespace":["a.b","c"],"node":{"rules":{}}}],"frozen":true}"#;
    let err = serde_json::from_str::<ConfigPolicy>(json).unwrap_err();
    assert!(err.to_string().contains("'a.b'"));
}
