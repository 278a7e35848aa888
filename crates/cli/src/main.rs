use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use listing_core::validation::Mode;
use listing_validate::config::CliConfig;
use listing_validate::{read_input, run, Outcome, ERROR_EXIT_CODE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate a create-property submission against the listing form rules.
///
/// Prints `{"valid": true}` or the failing field paths with their messages.
#[derive(Parser, Debug)]
#[command(name = "listing-validate", version, about)]
struct Cli {
    /// JSON file with the submission; `-` or omitted reads stdin.
    input: Option<PathBuf>,

    /// `fail_fast` or `collect_all`. Overrides LISTING_VALIDATION_MODE.
    #[arg(long)]
    mode: Option<Mode>,

    /// Print the verdict on a single line.
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listing_validate=info,listing_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match execute(cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Validation run failed");
            ExitCode::from(ERROR_EXIT_CODE)
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<Outcome> {
    let config = CliConfig::from_env()?;
    let mode = cli.mode.unwrap_or(config.mode);
    let pretty = config.pretty && !cli.compact;

    let input = read_input(cli.input.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    run(&input, mode, pretty, &mut stdout)
}
