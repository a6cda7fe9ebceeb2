//! Declarative configuration policies.
//!
//! A collector describes the configuration it accepts as a [`ConfigPolicy`]:
//! a map from namespace key to a [`PolicyNode`] of typed [`Rule`]s. Callers
//! negotiate their configuration against a node with [`PolicyNode::process`].
//!
//! Policies are built synchronously by the collector. Every validation failure
//! surfaces as a [`PolicyError`] at construction time and never reaches the
//! network boundary.

pub mod error;
pub mod node;
pub mod policy;
pub mod rule;

pub use error::{PolicyError, ProcessingError, ProcessingErrors};
pub use node::PolicyNode;
pub use policy::ConfigPolicy;
pub use rule::{BoolRule, FloatRule, IntegerRule, NumericRule, Rule, RuleKind, StringRule};

#[cfg(test)]
#[path = "tests/rule_tests.rs"]
mod rule_tests;

#[cfg(test)]
#[path = "tests/policy_tests.rs"]
mod policy_tests;
