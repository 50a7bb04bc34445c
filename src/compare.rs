#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::{EitherOrBoth, Itertools};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use walkdir::WalkDir;

use crate::{constants::OUTPUT_MATCH_SUFFIX, error::EvalError, report::LevelReport};

/// Compares the produced outputs tree against the golden tree.
#[derive(Debug, Clone)]
pub struct OutputComparator {
    /// Tree the executor wrote into.
    outputs_dir: PathBuf,
    /// Reference tree with the same layout.
    golden_dir:  PathBuf,
}

impl OutputComparator {
    /// Creates a comparator over the two trees.
    pub fn new(outputs_dir: impl Into<PathBuf>, golden_dir: impl Into<PathBuf>) -> Self {
        Self {
            outputs_dir: outputs_dir.into(),
            golden_dir:  golden_dir.into(),
        }
    }

    /// Produces one [`LevelReport`] per directory of the outputs tree holding
    /// at least one file, in sorted walk order.
    ///
    /// Every file ending in `output.txt` is compared byte for byte with the
    /// file at the same relative path under the golden tree. A missing golden
    /// file is an error, not a failed test.
    pub async fn compare(&self) -> Result<Vec<LevelReport>, EvalError> {
        let mut reports = Vec::new();

        let dirs = WalkDir::new(&self.outputs_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir());

        for dir in dirs {
            let files: Vec<PathBuf> = WalkDir::new(dir.path())
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect();
            if files.is_empty() {
                continue;
            }

            let level = dir.file_name().to_string_lossy().into_owned();
            let mut report = LevelReport::new(level);

            for output in files.iter().filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(OUTPUT_MATCH_SUFFIX))
            }) {
                if self.matches_golden(output).await? {
                    report.record_pass(output);
                } else {
                    report.record_mismatch(output);
                }
            }

            reports.push(report);
        }

        Ok(reports)
    }

    /// Golden counterpart of a produced file.
    fn golden_path(&self, output: &Path) -> Result<PathBuf, EvalError> {
        let relative = output.strip_prefix(&self.outputs_dir).with_context(|| {
            format!(
                "{} is not under {}",
                output.display(),
                self.outputs_dir.display()
            )
        })?;
        Ok(self.golden_dir.join(relative))
    }

    /// Exact byte comparison of one produced file with its golden file.
    async fn matches_golden(&self, output: &Path) -> Result<bool, EvalError> {
        let golden = self.golden_path(output)?;
        if !golden.is_file() {
            return Err(EvalError::lookup("golden file", golden));
        }

        let produced = tokio::fs::read(output)
            .await
            .with_context(|| format!("Could not read {}", output.display()))?;
        let expected = tokio::fs::read(&golden)
            .await
            .with_context(|| format!("Could not read {}", golden.display()))?;

        if produced == expected {
            return Ok(true);
        }

        tracing::info!("Mismatch: {}", output.display());
        log_difference(&expected, &produced);
        Ok(false)
    }
}

/// Logs where two mismatching outputs part ways. Only valid UTF-8 is diffed.
fn log_difference(expected: &[u8], produced: &[u8]) {
    let (Ok(expected), Ok(produced)) = (std::str::from_utf8(expected), std::str::from_utf8(produced))
    else {
        tracing::info!("Outputs differ and are not both valid UTF-8");
        return;
    };

    if let Some((number, line)) = first_difference(expected, produced) {
        match line {
            EitherOrBoth::Both(want, got) => {
                tracing::info!("Line {number}: expected `{want}`, got `{got}`")
            }
            EitherOrBoth::Left(want) => {
                tracing::info!("Line {number}: expected `{want}`, got end of output")
            }
            EitherOrBoth::Right(got) => {
                tracing::info!("Line {number}: expected end of output, got `{got}`")
            }
        }
    } else {
        tracing::info!("Outputs differ only in line endings or a trailing newline");
    }

    tracing::info!("Diff (expected -> produced):\n{}", render_diff(expected, produced));
}

/// Line diff of golden against produced text: removed lines red with `-`,
/// added lines green with `+`, context lines indented by one space.
pub fn render_diff(expected: &str, produced: &str) -> String {
    let mut rendered = String::new();
    for change in TextDiff::from_lines(expected, produced).iter_all_changes() {
        let value = change.to_string_lossy();
        match change.tag() {
            ChangeTag::Delete => rendered.push_str(&format!("{}", format!("-{value}").red())),
            ChangeTag::Insert => rendered.push_str(&format!("{}", format!("+{value}").green())),
            ChangeTag::Equal => rendered.push_str(&format!(" {value}")),
        }
        if change.missing_newline() {
            rendered.push('\n');
        }
    }
    rendered
}

/// First 1-based line where the two texts disagree, ignoring line endings.
pub fn first_difference<'a>(
    expected: &'a str,
    produced: &'a str,
) -> Option<(usize, EitherOrBoth<&'a str, &'a str>)> {
    expected
        .lines()
        .zip_longest(produced.lines())
        .enumerate()
        .find(|(_, pair)| match pair {
            EitherOrBoth::Both(a, b) => a != b,
            _ => true,
        })
        .map(|(index, pair)| (index + 1, pair))
}
