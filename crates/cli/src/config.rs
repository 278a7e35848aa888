use anyhow::Context;
use listing_core::validation::Mode;

/// CLI configuration loaded from environment variables.
///
/// Command-line flags override these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Evaluation mode (default: `collect_all`).
    pub mode: Mode,
    /// Pretty-print the JSON verdict (default: `true`).
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            mode: Mode::CollectAll,
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default       |
    /// |---------------------------|---------------|
    /// | `LISTING_VALIDATION_MODE` | `collect_all` |
    /// | `LISTING_OUTPUT_PRETTY`   | `true`        |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let mode = match lookup("LISTING_VALIDATION_MODE") {
            Some(raw) => raw
                .parse::<Mode>()
                .context("LISTING_VALIDATION_MODE must be fail_fast or collect_all")?,
            None => defaults.mode,
        };

        let pretty = match lookup("LISTING_OUTPUT_PRETTY") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("LISTING_OUTPUT_PRETTY must be a boolean, got {raw:?}"))?,
            None => defaults.pretty,
        };

        Ok(Self { mode, pretty })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
