//! Form validation engine.
//!
//! Provides rule and schema types, field paths, the verdict types and a
//! pure-logic evaluator. Nothing here performs I/O.

pub mod evaluator;
pub mod path;
pub mod result;
pub mod rules;

pub use evaluator::validate;
pub use path::FieldPath;
pub use result::{RuleViolation, ValidationErrors, ValidationResult};
pub use rules::{Constraint, FieldSchema, FormSchema, Mode, Presence, RuleKind, ValidationRule, ValueType};
