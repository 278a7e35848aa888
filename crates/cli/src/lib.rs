//! Command-line front end for the create-property form validator.
//!
//! Reads one JSON submission, validates it and writes the verdict as JSON.

pub mod config;

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use listing_core::property::validate_property;
use listing_core::validation::{Mode, ValidationResult};
use serde_json::Value;

/// What the process should report through its exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
}

impl Outcome {
    /// `0` for valid input, `1` for invalid input. I/O and parse errors use `2`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Valid => 0,
            Self::Invalid => 1,
        }
    }
}

pub const ERROR_EXIT_CODE: u8 = 2;

/// Read the submission from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Input is not valid JSON")
}

/// Validate `input` and write the verdict to `out`.
pub fn run(input: &Value, mode: Mode, pretty: bool, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let result = validate_property(input, mode);

    match &result {
        ValidationResult::Valid => tracing::info!(%mode, "Submission is valid"),
        ValidationResult::Invalid(errors) => tracing::info!(
            %mode,
            violations = errors.len(),
            fields = errors.paths().len(),
            "Submission is invalid"
        ),
    }

    if pretty {
        serde_json::to_writer_pretty(&mut *out, &result)
    } else {
        serde_json::to_writer(&mut *out, &result)
    }
    .context("Failed to write verdict")?;
    writeln!(out).context("Failed to write verdict")?;

    Ok(if result.is_valid() {
        Outcome::Valid
    } else {
        Outcome::Invalid
    })
}
