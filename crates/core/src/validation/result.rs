//! Validation verdict types.

use indexmap::IndexMap;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::rules::RuleKind;
use crate::error::CoreError;

/// A single rule failure at a field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub path: String,
    pub kind: RuleKind,
    pub message: String,
}

/// All violations of one validation call, in evaluation order.
///
/// Serializes as a map of field path to its ordered messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<RuleViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[RuleViolation] {
        &self.violations
    }

    /// Number of violations (not distinct paths).
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Messages recorded for `path`, in rule order.
    pub fn messages(&self, path: &str) -> Vec<&str> {
        self.violations
            .iter()
            .filter(|v| v.path == path)
            .map(|v| v.message.as_str())
            .collect()
    }

    pub fn first(&self, path: &str) -> Option<&str> {
        self.violations
            .iter()
            .find(|v| v.path == path)
            .map(|v| v.message.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    /// Distinct failing paths, in the order they were first reported.
    pub fn paths(&self) -> Vec<&str> {
        self.by_path().into_keys().collect()
    }

    /// Field path to ordered messages.
    pub fn by_path(&self) -> IndexMap<&str, Vec<&str>> {
        let mut map: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for violation in &self.violations {
            map.entry(violation.path.as_str())
                .or_default()
                .push(violation.message.as_str());
        }
        map
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleViolation> {
        self.violations.iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a RuleViolation;
    type IntoIter = std::slice::Iter<'a, RuleViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.by_path().serialize(serializer)
    }
}

/// Outcome of validating one input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationErrors),
}

impl ValidationResult {
    /// `Valid` when no violations were recorded.
    pub fn from_violations(violations: Vec<RuleViolation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(ValidationErrors { violations })
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Valid => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    /// Convert an invalid verdict into [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(errors) => {
                let summary = errors
                    .iter()
                    .map(|v| format!("{}: {}", v.path, v.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(CoreError::Validation(summary))
            }
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Report {
            valid: self.is_valid(),
            errors: self.errors(),
        }
        .serialize(serializer)
    }
}
