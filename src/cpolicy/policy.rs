use super::{PolicyError, PolicyNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMPTY_NODE: PolicyNode = PolicyNode::new();

/// Namespace-scoped configuration policy of a collector.
///
/// Keys are compared by exact path; there is no wildcard expansion here.
/// Once [`freeze`](Self::freeze) is called every mutation fails with
/// [`PolicyError::Frozen`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PolicyRepr")]
pub struct ConfigPolicy {
    nodes: BTreeMap<Vec<String>, PolicyNode>,
    frozen: bool,
}

/// Serialized form; namespace keys are lists, which not every format accepts
/// as map keys.
#[derive(Serialize, Deserialize)]
struct PolicyRepr {
    nodes: Vec<PolicyEntry>,
    #[serde(default)]
    frozen: bool,
}

#[derive(Serialize, Deserialize)]
struct PolicyEntry {
    namespace: Vec<String>,
    node: PolicyNode,
}

impl TryFrom<PolicyRepr> for ConfigPolicy {
    type Error = PolicyError;

    fn try_from(repr: PolicyRepr) -> Result<Self, PolicyError> {
        let mut policy = ConfigPolicy::new();
        for entry in repr.nodes {
            policy.add(entry.namespace, entry.node)?;
        }
        policy.frozen = repr.frozen;
        Ok(policy)
    }
}

impl From<ConfigPolicy> for PolicyRepr {
    fn from(policy: ConfigPolicy) -> Self {
        Self {
            nodes: policy
                .nodes
                .into_iter()
                .map(|(namespace, node)| PolicyEntry { namespace, node })
                .collect(),
            frozen: policy.frozen,
        }
    }
}

impl ConfigPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the node at `namespace`.
    ///
    /// Elements must be non-empty and free of `.`, so the [`dotted_key`] form
    /// splits back into the same namespace.
    pub fn add<I, S>(&mut self, namespace: I, node: PolicyNode) -> Result<(), PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.frozen {
            return Err(PolicyError::Frozen);
        }
        let key: Vec<String> = namespace.into_iter().map(Into::into).collect();
        if let Some(element) = key.iter().find(|e| e.is_empty() || e.contains('.')) {
            return Err(PolicyError::InvalidNamespaceElement {
                element: element.clone(),
            });
        }
        self.nodes.insert(key, node);
        Ok(())
    }

    /// Makes the policy immutable. Calling it again has no effect.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The node at exactly `namespace`, or an empty node.
    pub fn rules_for<S: AsRef<str>>(&self, namespace: &[S]) -> &PolicyNode {
        let key: Vec<String> = namespace.iter().map(|s| s.as_ref().to_string()).collect();
        self.nodes.get(&key).unwrap_or(&EMPTY_NODE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], &PolicyNode)> {
        self.nodes.iter().map(|(k, v)| (k.as_slice(), v))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Dot-joined form of a namespace key, e.g. `one.two.potato`.
pub fn dotted_key(namespace: &[String]) -> String {
    namespace.join(".")
}
