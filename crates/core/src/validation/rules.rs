//! Rule, field and form schema types.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The kind of check that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    NumericMin,
    NumericMax,
    StringPattern,
    StringLength,
    ArrayMinLength,
    ArrayMaxLength,
    FileSize,
    FileFormat,
    UrlFormat,
    TimeFormat,
    TypeCheck,
    NestedSchema,
}

impl RuleKind {
    /// Stable string representation matching serde's `rename_all = "camelCase"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::NumericMin => "numericMin",
            Self::NumericMax => "numericMax",
            Self::StringPattern => "stringPattern",
            Self::StringLength => "stringLength",
            Self::ArrayMinLength => "arrayMinLength",
            Self::ArrayMaxLength => "arrayMaxLength",
            Self::FileSize => "fileSize",
            Self::FileFormat => "fileFormat",
            Self::UrlFormat => "urlFormat",
            Self::TimeFormat => "timeFormat",
            Self::TypeCheck => "typeCheck",
            Self::NestedSchema => "nestedSchema",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a single value check. Bounds are inclusive.
#[derive(Debug, Clone)]
pub enum Constraint {
    NumericMin(f64),
    NumericMax(f64),
    /// Compiled with `^(?:...)$` so it always matches the whole string.
    StringPattern(Regex),
    /// Minimum length in characters.
    StringLength(usize),
    ArrayMinLength(usize),
    ArrayMaxLength(usize),
    /// Maximum file size in bytes.
    FileSize(u64),
    /// Accepted MIME subtypes (the part after `/`).
    FileFormat(Vec<String>),
    /// Absolute `http`, `https` or `ftp` URL with a host.
    UrlFormat,
    TimeFormat,
    TypeCheck(ValueType),
}

/// JSON shape expected by a type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Strings, and numbers read as their decimal text.
    String,
    /// Numbers, and numeric strings.
    Number,
    Boolean,
    Array,
    Object,
}

/// A constraint paired with the message reported when it fails.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub constraint: Constraint,
    pub message: String,
}

impl ValidationRule {
    pub fn new(constraint: Constraint, message: impl Into<String>) -> Self {
        Self {
            constraint,
            message: message.into(),
        }
    }

    pub fn min(bound: f64, message: impl Into<String>) -> Self {
        Self::new(Constraint::NumericMin(bound), message)
    }

    pub fn max(bound: f64, message: impl Into<String>) -> Self {
        Self::new(Constraint::NumericMax(bound), message)
    }

    /// Build a full-match pattern rule.
    ///
    /// The pattern is wrapped as `^(?:pattern)$`, so callers pass the bare
    /// expression. Fails with [`CoreError::InvalidPattern`] if it does not
    /// compile.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, CoreError> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| CoreError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self::new(Constraint::StringPattern(regex), message))
    }

    pub fn min_length(chars: usize, message: impl Into<String>) -> Self {
        Self::new(Constraint::StringLength(chars), message)
    }

    pub fn min_items(count: usize, message: impl Into<String>) -> Self {
        Self::new(Constraint::ArrayMinLength(count), message)
    }

    pub fn max_items(count: usize, message: impl Into<String>) -> Self {
        Self::new(Constraint::ArrayMaxLength(count), message)
    }

    pub fn max_file_size(bytes: u64, message: impl Into<String>) -> Self {
        Self::new(Constraint::FileSize(bytes), message)
    }

    pub fn file_format(subtypes: &[&str], message: impl Into<String>) -> Self {
        let subtypes = subtypes.iter().map(|s| s.to_string()).collect();
        Self::new(Constraint::FileFormat(subtypes), message)
    }

    pub fn url(message: impl Into<String>) -> Self {
        Self::new(Constraint::UrlFormat, message)
    }

    pub fn time(message: impl Into<String>) -> Self {
        Self::new(Constraint::TimeFormat, message)
    }

    pub fn type_check(expected: ValueType, message: impl Into<String>) -> Self {
        Self::new(Constraint::TypeCheck(expected), message)
    }

    pub fn kind(&self) -> RuleKind {
        match self.constraint {
            Constraint::NumericMin(_) => RuleKind::NumericMin,
            Constraint::NumericMax(_) => RuleKind::NumericMax,
            Constraint::StringPattern(_) => RuleKind::StringPattern,
            Constraint::StringLength(_) => RuleKind::StringLength,
            Constraint::ArrayMinLength(_) => RuleKind::ArrayMinLength,
            Constraint::ArrayMaxLength(_) => RuleKind::ArrayMaxLength,
            Constraint::FileSize(_) => RuleKind::FileSize,
            Constraint::FileFormat(_) => RuleKind::FileFormat,
            Constraint::UrlFormat => RuleKind::UrlFormat,
            Constraint::TimeFormat => RuleKind::TimeFormat,
            Constraint::TypeCheck(_) => RuleKind::TypeCheck,
        }
    }
}

/// How a field treats an absent or `null` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// Absent, `null` and `""` fail with the given message.
    Required(String),
    /// Absent and `null` pass without evaluating further rules.
    Nullable,
    /// Absent passes; an explicit `null` is reported.
    Optional,
}

/// Ordered rules for one field, plus optional nested schemas.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub presence: Presence,
    pub rules: Vec<ValidationRule>,
    /// Schema applied to each element when the field is an array.
    pub items: Option<Box<FieldSchema>>,
    /// Schema applied when the field is an object.
    pub shape: Option<FormSchema>,
}

impl FieldSchema {
    pub fn with_presence(presence: Presence) -> Self {
        Self {
            presence,
            rules: Vec::new(),
            items: None,
            shape: None,
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::with_presence(Presence::Required(message.into()))
    }

    pub fn nullable() -> Self {
        Self::with_presence(Presence::Nullable)
    }

    pub fn optional() -> Self {
        Self::with_presence(Presence::Optional)
    }

    /// Append a rule. Rules run in the order they are added.
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn items(mut self, items: FieldSchema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn shape(mut self, shape: FormSchema) -> Self {
        self.shape = Some(shape);
        self
    }
}

/// Field name to [`FieldSchema`], kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: IndexMap<String, FieldSchema>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Re-declaring a name replaces its schema in place.
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Whether a field stops at its first failing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    FailFast,
    #[default]
    CollectAll,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::CollectAll => "collect_all",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "collect_all" => Ok(Self::CollectAll),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}
