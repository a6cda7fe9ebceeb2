//! Typed configuration rules.

use super::{PolicyError, ProcessingError};
use crate::model::ConfigValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four rule kinds a policy node can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    String,
    Bool,
    Integer,
    Float,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::String => write!(f, "string"),
            RuleKind::Bool => write!(f, "bool"),
            RuleKind::Integer => write!(f, "integer"),
            RuleKind::Float => write!(f, "float"),
        }
    }
}

fn rule_key(key: impl Into<String>) -> Result<String, PolicyError> {
    let key = key.into();
    if key.is_empty() {
        return Err(PolicyError::EmptyKey);
    }
    Ok(key)
}

/// Rule accepting a string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringRule {
    key: String,
    required: bool,
    default: Option<String>,
}

impl StringRule {
    pub fn new(
        key: impl Into<String>,
        required: bool,
        default: Option<String>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            key: rule_key(key)?,
            required,
            default,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// Rule accepting a boolean value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolRule {
    key: String,
    required: bool,
    default: Option<bool>,
}

impl BoolRule {
    pub fn new(
        key: impl Into<String>,
        required: bool,
        default: Option<bool>,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            key: rule_key(key)?,
            required,
            default,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<bool> {
        self.default
    }
}

/// Rule accepting a number with optional inclusive bounds.
///
/// Invariant: `minimum <= maximum`, and a default lies within both bounds.
/// Deserialization goes through [`NumericRule::bounded`] and enforces it too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "NumericRuleRepr<T>",
    bound(deserialize = "T: Copy + PartialOrd + fmt::Display + Deserialize<'de>")
)]
pub struct NumericRule<T> {
    key: String,
    required: bool,
    default: Option<T>,
    minimum: Option<T>,
    maximum: Option<T>,
}

#[derive(Deserialize)]
struct NumericRuleRepr<T> {
    key: String,
    required: bool,
    default: Option<T>,
    minimum: Option<T>,
    maximum: Option<T>,
}

impl<T> TryFrom<NumericRuleRepr<T>> for NumericRule<T>
where
    T: Copy + PartialOrd + fmt::Display,
{
    type Error = PolicyError;

    fn try_from(repr: NumericRuleRepr<T>) -> Result<Self, PolicyError> {
        Self::bounded(
            repr.key,
            repr.required,
            repr.default,
            repr.minimum,
            repr.maximum,
        )
    }
}

pub type IntegerRule = NumericRule<i64>;
pub type FloatRule = NumericRule<f64>;

impl<T> NumericRule<T>
where
    T: Copy + PartialOrd + fmt::Display,
{
    pub fn new(
        key: impl Into<String>,
        required: bool,
        default: Option<T>,
    ) -> Result<Self, PolicyError> {
        Self::bounded(key, required, default, None, None)
    }

    /// Creates a rule with bounds set up front.
    pub fn bounded(
        key: impl Into<String>,
        required: bool,
        default: Option<T>,
        minimum: Option<T>,
        maximum: Option<T>,
    ) -> Result<Self, PolicyError> {
        let rule = Self {
            key: rule_key(key)?,
            required,
            default,
            minimum,
            maximum,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Sets the lower bound. The rule is left unchanged on error.
    pub fn set_minimum(&mut self, minimum: T) -> Result<(), PolicyError> {
        let previous = self.minimum.replace(minimum);
        self.validate().inspect_err(|_| self.minimum = previous)
    }

    /// Sets the upper bound. The rule is left unchanged on error.
    pub fn set_maximum(&mut self, maximum: T) -> Result<(), PolicyError> {
        let previous = self.maximum.replace(maximum);
        self.validate().inspect_err(|_| self.maximum = previous)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<T> {
        self.default
    }

    pub fn minimum(&self) -> Option<T> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<T> {
        self.maximum
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(PolicyError::InvalidBounds {
                    key: self.key.clone(),
                    minimum: min.to_string(),
                    maximum: max.to_string(),
                });
            }
        }
        if let Some(default) = self.default {
            self.check(default)
                .map_err(|_| PolicyError::DefaultOutOfBounds {
                    key: self.key.clone(),
                    default: default.to_string(),
                    bound: self.describe_bounds(),
                })?;
        }
        Ok(())
    }

    fn check(&self, value: T) -> Result<(), ProcessingError> {
        if let Some(min) = self.minimum {
            if value < min {
                return Err(ProcessingError::BelowMinimum {
                    key: self.key.clone(),
                    value: value.to_string(),
                    minimum: min.to_string(),
                });
            }
        }
        if let Some(max) = self.maximum {
            if value > max {
                return Err(ProcessingError::AboveMaximum {
                    key: self.key.clone(),
                    value: value.to_string(),
                    maximum: max.to_string(),
                });
            }
        }
        Ok(())
    }

    fn describe_bounds(&self) -> String {
        let min = self.minimum.map(|v| v.to_string()).unwrap_or_default();
        let max = self.maximum.map(|v| v.to_string()).unwrap_or_default();
        format!("[{}, {}]", min, max)
    }
}

/// A rule of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    String(StringRule),
    Bool(BoolRule),
    Integer(IntegerRule),
    Float(FloatRule),
}

impl Rule {
    pub fn key(&self) -> &str {
        match self {
            Rule::String(r) => r.key(),
            Rule::Bool(r) => r.key(),
            Rule::Integer(r) => r.key(),
            Rule::Float(r) => r.key(),
        }
    }

    pub fn required(&self) -> bool {
        match self {
            Rule::String(r) => r.required(),
            Rule::Bool(r) => r.required(),
            Rule::Integer(r) => r.required(),
            Rule::Float(r) => r.required(),
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::String(_) => RuleKind::String,
            Rule::Bool(_) => RuleKind::Bool,
            Rule::Integer(_) => RuleKind::Integer,
            Rule::Float(_) => RuleKind::Float,
        }
    }

    /// The default as a configuration value, if the rule has one.
    pub fn default_value(&self) -> Option<ConfigValue> {
        match self {
            Rule::String(r) => r.default().map(ConfigValue::from),
            Rule::Bool(r) => r.default().map(ConfigValue::Bool),
            Rule::Integer(r) => r.default().map(ConfigValue::Integer),
            Rule::Float(r) => r.default().map(ConfigValue::Float),
        }
    }

    /// Checks a caller supplied value against this rule.
    ///
    /// Returns the value to use: the supplied one, the default when nothing was
    /// supplied, or `None` for an absent optional setting. Integers are widened
    /// for float rules.
    pub fn process(&self, value: Option<&ConfigValue>) -> Result<Option<ConfigValue>, ProcessingError> {
        let Some(value) = value else {
            return match self.default_value() {
                Some(default) => Ok(Some(default)),
                None if self.required() => Err(ProcessingError::MissingRequired {
                    key: self.key().to_string(),
                }),
                None => Ok(None),
            };
        };

        match (self, value) {
            (Rule::String(_), ConfigValue::String(_)) | (Rule::Bool(_), ConfigValue::Bool(_)) => {
                Ok(Some(value.clone()))
            }
            (Rule::Integer(r), ConfigValue::Integer(v)) => {
                r.check(*v)?;
                Ok(Some(value.clone()))
            }
            (Rule::Float(r), ConfigValue::Float(v)) => {
                r.check(*v)?;
                Ok(Some(value.clone()))
            }
            (Rule::Float(r), ConfigValue::Integer(v)) => {
                let widened = *v as f64;
                r.check(widened)?;
                Ok(Some(ConfigValue::Float(widened)))
            }
            _ => Err(ProcessingError::WrongType {
                key: self.key().to_string(),
                expected: self.kind(),
                found: value.kind().to_string(),
            }),
        }
    }
}

impl From<StringRule> for Rule {
    fn from(rule: StringRule) -> Self {
        Rule::String(rule)
    }
}

impl From<BoolRule> for Rule {
    fn from(rule: BoolRule) -> Self {
        Rule::Bool(rule)
    }
}

impl From<IntegerRule> for Rule {
    fn from(rule: IntegerRule) -> Self {
        Rule::Integer(rule)
    }
}

impl From<FloatRule> for Rule {
    fn from(rule: FloatRule) -> Self {
        Rule::Float(rule)
    }
}
