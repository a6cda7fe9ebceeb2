//! Error types of the policy engine.

use super::RuleKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raised while building or mutating a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyError {
    /// The policy was frozen and can no longer change.
    Frozen,
    /// Rules need a non-empty key.
    EmptyKey,
    /// A rule default does not satisfy the rule's own bounds.
    DefaultOutOfBounds {
        key: String,
        default: String,
        bound: String,
    },
    /// The minimum is greater than the maximum.
    InvalidBounds {
        key: String,
        minimum: String,
        maximum: String,
    },
    /// Namespace keys travel dot-joined, so elements cannot be empty or hold a dot.
    InvalidNamespaceElement { element: String },
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Frozen => write!(f, "Config policy is frozen"),
            PolicyError::EmptyKey => write!(f, "Rule key cannot be empty"),
            PolicyError::DefaultOutOfBounds {
                key,
                default,
                bound,
            } => write!(
                f,
                "Default {} of rule '{}' violates bound {}",
                default, key, bound
            ),
            PolicyError::InvalidBounds {
                key,
                minimum,
                maximum,
            } => write!(
                f,
                "Rule '{}' has minimum {} greater than maximum {}",
                key, minimum, maximum
            ),
            PolicyError::InvalidNamespaceElement { element } => write!(
                f,
                "Policy namespace element '{}' must be non-empty and contain no '.'",
                element
            ),
        }
    }
}

impl std::error::Error for PolicyError {}

/// A single problem found while processing a configuration against a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingError {
    MissingRequired {
        key: String,
    },
    WrongType {
        key: String,
        expected: RuleKind,
        found: String,
    },
    BelowMinimum {
        key: String,
        value: String,
        minimum: String,
    },
    AboveMaximum {
        key: String,
        value: String,
        maximum: String,
    },
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingError::MissingRequired { key } => {
                write!(f, "required key missing ({})", key)
            }
            ProcessingError::WrongType {
                key,
                expected,
                found,
            } => write!(
                f,
                "type mismatch ({} wanted type '{}' but provided type '{}')",
                key, expected, found
            ),
            ProcessingError::BelowMinimum {
                key,
                value,
                minimum,
            } => write!(
                f,
                "value is under minimum ({} value {} < {})",
                key, value, minimum
            ),
            ProcessingError::AboveMaximum {
                key,
                value,
                maximum,
            } => write!(
                f,
                "value is over maximum ({} value {} > {})",
                key, value, maximum
            ),
        }
    }
}

/// Every problem found while processing one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingErrors(pub Vec<ProcessingError>);

impl ProcessingErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessingError> {
        self.0.iter()
    }
}

impl fmt::Display for ProcessingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ProcessingErrors {}
