#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    cases::discover_cases,
    compare::OutputComparator,
    config::HarnessConfig,
    error::EvalError,
    executor::TestExecutor,
    language::adapter_for,
    locate::{EntryPointLocator, Submission},
    paths::WorkspacePaths,
    report::{LevelReport, write_report},
    runner::BuildRunner,
};

/// Shown when the solution tree has no recognized entry point.
pub const NO_ENTRY_POINT: &str = "No entry point (Main) file found in the 'solution' directory.\n\
                                  Please go over the README or ask us questions to understand \
                                  the expected structure.";

/// Outcome of a completed evaluation run.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The submission that was evaluated.
    submission:  Submission,
    /// Per-level results, sorted by level.
    reports:     Vec<LevelReport>,
    /// Absolute path of the written report.
    report_path: PathBuf,
}

impl Evaluation {
    /// The submission that was evaluated.
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Per-level results, sorted by level name.
    pub fn reports(&self) -> &[LevelReport] {
        &self.reports
    }

    /// Absolute path of `evaluation_report.txt`.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }
}

/// Locates, builds, runs, compares and reports, in that order.
///
/// Any error stops the run where it happens; the report is only written when
/// every test case ran.
pub async fn evaluate(paths: &WorkspacePaths, config: &HarnessConfig) -> Result<Evaluation, EvalError> {
    let submission = EntryPointLocator::new(config.priority().iter().copied())
        .locate(paths.solution_dir())
        .ok_or_else(|| EvalError::configuration(NO_ENTRY_POINT))?;
    tracing::info!(
        "Found {} entry point: {}",
        submission.variant(),
        submission.entry_path().display()
    );

    tokio::fs::create_dir_all(paths.outputs_dir())
        .await
        .with_context(|| format!("Could not create {}", paths.outputs_dir().display()))?;

    let adapter = adapter_for(submission.variant(), config.toolchain(), paths);
    let context = BuildRunner::new(adapter.as_ref(), paths.solution_dir(), paths.root_dir())
        .stderr_policy(config.stderr_policy())
        .deadline(config.run_timeout())
        .build(&submission)
        .await?;

    let cases = discover_cases(paths.inputs_dir(), paths.outputs_dir())?;
    tracing::info!("Running {} test cases", cases.len());
    TestExecutor::new(&context)
        .stderr_policy(config.stderr_policy())
        .deadline(config.run_timeout())
        .execute_all(&cases)
        .await?;

    let mut reports = OutputComparator::new(paths.outputs_dir(), paths.golden_dir())
        .compare()
        .await?;
    reports.sort_by(|a, b| a.level().cmp(b.level()));

    let report_path = write_report(&reports, paths.report_dir()).await?;
    tracing::info!("Report written to {}", report_path.display());

    Ok(Evaluation {
        submission,
        reports,
        report_path,
    })
}
