#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context;
use itertools::Itertools;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, object::Rows},
};

use crate::{constants::REPORT_FILE, error::EvalError};

/// Pass/fail tally for one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelReport {
    /// Name of the level's directory.
    level:            String,
    /// Cases whose output matched the golden file.
    passed_tests:     usize,
    /// Cases compared.
    total_tests:      usize,
    /// One line per compared case, in comparison order.
    diagnostic_lines: Vec<String>,
}

impl LevelReport {
    /// Starts an empty report for `level`.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Records a matching output.
    pub fn record_pass(&mut self, output_path: &Path) {
        self.passed_tests += 1;
        self.total_tests += 1;
        self.diagnostic_lines
            .push(format!("File {} matches the golden file.", output_path.display()));
    }

    /// Records a mismatching output.
    pub fn record_mismatch(&mut self, output_path: &Path) {
        self.total_tests += 1;
        self.diagnostic_lines
            .push(format!("Mismatch found in file: {}", output_path.display()));
    }

    /// Level name.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Cases that passed.
    pub fn passed_tests(&self) -> usize {
        self.passed_tests
    }

    /// Cases compared.
    pub fn total_tests(&self) -> usize {
        self.total_tests
    }

    /// Per-case diagnostics.
    pub fn diagnostic_lines(&self) -> &[String] {
        &self.diagnostic_lines
    }
}

/// Header line followed by one tab-indented line per case.
impl fmt::Display for LevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Level: {}, Passed tests: {}, Total tests: {}",
            self.level, self.passed_tests, self.total_tests
        )?;
        for line in &self.diagnostic_lines {
            write!(f, "\n\t{line}")?;
        }
        Ok(())
    }
}

/// Renders all levels sorted by name, separated by single newlines.
pub fn render_report(reports: &[LevelReport]) -> String {
    reports
        .iter()
        .sorted_by(|a, b| a.level.cmp(&b.level))
        .map(ToString::to_string)
        .join("\n")
}

/// Writes the rendered report to `evaluation_report.txt` in `report_dir`,
/// creating the directory if needed, and returns the file's absolute path.
pub async fn write_report(reports: &[LevelReport], report_dir: &Path) -> Result<PathBuf, EvalError> {
    tokio::fs::create_dir_all(report_dir)
        .await
        .with_context(|| format!("Could not create {}", report_dir.display()))?;
    let path = std::path::absolute(report_dir.join(REPORT_FILE))
        .with_context(|| format!("Could not resolve {}", report_dir.display()))?;
    tokio::fs::write(&path, render_report(reports))
        .await
        .with_context(|| format!("Could not write report to {}", path.display()))?;
    tracing::debug!("Wrote {} levels to {}", reports.len(), path.display());
    Ok(path)
}

/// One summary table row.
#[derive(Tabled)]
struct SummaryRow<'a> {
    /// Level name.
    #[tabled(rename = "Level")]
    level:  &'a str,
    /// Passed count.
    #[tabled(rename = "Passed")]
    passed: usize,
    /// Total count.
    #[tabled(rename = "Total")]
    total:  usize,
}

/// Operator-facing table of per-level results.
pub fn summary_table(reports: &[LevelReport]) -> String {
    let rows: Vec<SummaryRow<'_>> = reports
        .iter()
        .sorted_by(|a, b| a.level.cmp(&b.level))
        .map(|r| SummaryRow {
            level:  &r.level,
            passed: r.passed_tests,
            total:  r.total_tests,
        })
        .collect();

    Table::new(&rows)
        .with(Panel::header("Evaluation Summary"))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}
