#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # solution-evaluator
//!
//! Run it from a directory holding `solution/`, `inputs/` and `golden/`:
//!
//! ```text
//! solution-evaluator [CONFIG-FILE]
//! ```
//!
//! Without an argument the first `*.config` file in the current directory is
//! used, if any. The report lands in `evaluation_report.txt`.

use std::{path::PathBuf, process::ExitCode};

use bpaf::*;
use dotenvy::dotenv;
use owo_colors::OwoColorize;
use solution_evaluator::{EvalError, HarnessConfig, WorkspacePaths, evaluate, report::summary_table};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Command-line options.
#[derive(Debug, Clone)]
struct Options {
    /// Config file to use instead of auto-discovery.
    config: Option<PathBuf>,
}

/// Parse the command line arguments
fn options() -> Options {
    let config = positional::<PathBuf>("CONFIG-FILE")
        .help("Config file with KEY=VALUE toolchain overrides (default: first *.config here)")
        .optional();

    construct!(Options { config })
        .to_options()
        .descr("Builds a submission, runs it against every test input and compares the outputs")
        .run()
}

/// Runs one evaluation in the current directory.
async fn run(options: Options) -> Result<(), EvalError> {
    let paths = WorkspacePaths::default().absolute()?;
    let config = HarnessConfig::load(options.config.as_deref(), paths.root_dir())?;

    let evaluation = evaluate(&paths, &config).await?;

    println!("Test report generated: {}", evaluation.report_path().display());
    println!("{}", summary_table(evaluation.reports()));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let options = options();

    match run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            ExitCode::FAILURE
        }
    }
}
