//! Hierarchical metric namespaces.
//!
//! A namespace is an ordered path of elements. Static elements carry a fixed
//! value; dynamic elements carry a `name` and `description` and stay the
//! wildcard [`WILDCARD`] until the collector resolves them at collection time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Rendering of a dynamic element that has not been resolved yet.
pub const WILDCARD: &str = "*";

/// One segment of a [`Namespace`].
///
/// An element is dynamic exactly when `name` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NamespaceElement {
    pub value: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NamespaceElement {
    pub fn new_static(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn new_dynamic(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: WILDCARD.to_string(),
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !self.name.is_empty()
    }

    /// True for static elements and for dynamic elements holding a concrete value.
    pub fn is_resolved(&self) -> bool {
        !self.is_dynamic() || self.value != WILDCARD
    }

    /// Sets the concrete value of this element. The element name is kept.
    pub fn resolve(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// Ordered path identifying a metric, rendered as `/a/b/c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(Vec<NamespaceElement>);

impl Namespace {
    /// Builds a namespace of static elements.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(NamespaceElement::new_static).collect())
    }

    pub fn add_static_element(mut self, value: impl Into<String>) -> Self {
        self.0.push(NamespaceElement::new_static(value));
        self
    }

    pub fn add_dynamic_element(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.0.push(NamespaceElement::new_dynamic(name, description));
        self
    }

    pub fn elements(&self) -> &[NamespaceElement] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&NamespaceElement> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut NamespaceElement> {
        self.0.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element values in order, without separators.
    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(|e| e.value.clone()).collect()
    }

    /// True if any element is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.0.iter().any(NamespaceElement::is_dynamic)
    }

    /// Positions of the dynamic elements.
    pub fn dynamic_positions(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_dynamic())
            .map(|(i, _)| i)
            .collect()
    }

    /// Renders the namespace as `/a/b/c`; unresolved dynamic elements render `*`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Element-wise comparison where a dynamic element on either side matches
    /// any value at its position.
    pub fn matches(&self, other: &Namespace) -> bool {
        self.len() == other.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.is_dynamic() || b.is_dynamic() || a.value == b.value)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{}", element.value)?;
        }
        Ok(())
    }
}

impl Index<usize> for Namespace {
    type Output = NamespaceElement;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Namespace {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl From<Vec<NamespaceElement>> for Namespace {
    fn from(elements: Vec<NamespaceElement>) -> Self {
        Self(elements)
    }
}

impl FromIterator<NamespaceElement> for Namespace {
    fn from_iter<T: IntoIterator<Item = NamespaceElement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
