//! Validation core for the property listing creation form.
//!
//! A rule table ([`validation::rules::FormSchema`]) is interpreted by one
//! generic evaluator ([`validation::evaluator::validate`]). The concrete
//! create-property table lives in [`property`].

pub mod error;
pub mod property;
pub mod validation;
