use super::{ProcessingErrors, Rule};
use crate::model::ConfigMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The set of rules that applies at one namespace key. Rule keys are unique.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyNode {
    rules: BTreeMap<String, Rule>,
}

impl PolicyNode {
    pub const fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Adds a rule, replacing any rule with the same key.
    pub fn add(&mut self, rule: impl Into<Rule>) -> &mut Self {
        let rule = rule.into();
        self.rules.insert(rule.key().to_string(), rule);
        self
    }

    pub fn with(mut self, rule: impl Into<Rule>) -> Self {
        self.add(rule);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Negotiates a caller supplied configuration against this node.
    ///
    /// Settings without a rule pass through unchanged. Defaults fill in absent
    /// settings. All violations are collected before failing.
    pub fn process(&self, config: &ConfigMap) -> Result<ConfigMap, ProcessingErrors> {
        let mut processed: ConfigMap = config
            .iter()
            .filter(|(key, _)| !self.rules.contains_key(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let mut errors = Vec::new();

        for (key, rule) in &self.rules {
            match rule.process(config.get(key)) {
                Ok(Some(value)) => {
                    processed.insert(key.clone(), value);
                }
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(processed)
        } else {
            Err(ProcessingErrors(errors))
        }
    }
}
