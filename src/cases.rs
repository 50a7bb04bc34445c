use std::path::{Path, PathBuf};

use itertools::Itertools;
use walkdir::WalkDir;

use crate::{
    constants::{INPUT_SUFFIX, OUTPUT_FILE_SUFFIX, PREFIX_SEPARATOR, QUERIES_SUFFIX},
    error::EvalError,
};

/// One input file together with its paired queries file and output slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Identifier shared by the input, queries, output and golden files.
    prefix:       String,
    /// The `.xml` input handed to the program as its last argument.
    input_path:   PathBuf,
    /// Text fed to the program's standard input.
    queries_path: PathBuf,
    /// Directory of the input relative to the inputs tree.
    level:        PathBuf,
    /// Where the program's standard output is written.
    output_path:  PathBuf,
}

impl TestCase {
    /// Identifier shared by the case's files.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The input artifact.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// The queries file.
    pub fn queries_path(&self) -> &Path {
        &self.queries_path
    }

    /// Relative directory the case lives in.
    pub fn level(&self) -> &Path {
        &self.level
    }

    /// Level for messages; `.` for inputs at the top of the tree.
    pub fn level_name(&self) -> String {
        if self.level.as_os_str().is_empty() {
            ".".to_string()
        } else {
            self.level.display().to_string()
        }
    }

    /// Output file for the case.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Test-case identifier of an input file name: everything before the first
/// underscore, or the whole name when there is none.
pub fn prefix_of(file_name: &str) -> &str {
    file_name
        .split_once(PREFIX_SEPARATOR)
        .map_or(file_name, |(prefix, _)| prefix)
}

/// Finds every test case under `inputs_dir`, mapping each onto `outputs_dir`.
///
/// Cases come back in sorted walk order. A missing queries file fails the
/// whole discovery, so nothing runs when any case is incomplete.
pub fn discover_cases(inputs_dir: &Path, outputs_dir: &Path) -> Result<Vec<TestCase>, EvalError> {
    if !inputs_dir.is_dir() {
        return Err(EvalError::lookup("inputs directory", inputs_dir));
    }

    let mut cases = Vec::new();
    for entry in WalkDir::new(inputs_dir).sort_by_file_name() {
        let entry = entry.map_err(|err| anyhow::anyhow!("Could not walk inputs: {err}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !file_name.ends_with(INPUT_SUFFIX) {
            continue;
        }

        let prefix = prefix_of(file_name).to_string();
        let input_path = entry.path().to_path_buf();
        let dir = input_path.parent().unwrap_or(inputs_dir);

        let queries_path = dir.join(format!("{prefix}{QUERIES_SUFFIX}"));
        if !queries_path.is_file() {
            return Err(EvalError::lookup("queries file", queries_path));
        }

        let level = dir.strip_prefix(inputs_dir).unwrap_or(Path::new("")).to_path_buf();
        let output_path = outputs_dir
            .join(&level)
            .join(format!("{prefix}{OUTPUT_FILE_SUFFIX}"));

        cases.push(TestCase {
            prefix,
            input_path,
            queries_path,
            level,
            output_path,
        });
    }

    for output in shared_output_paths(&cases) {
        tracing::warn!(
            "Several inputs share the output file {}; only the last one run is compared",
            output.display()
        );
    }

    Ok(cases)
}

/// Output paths claimed by more than one case, in discovery order.
pub fn shared_output_paths(cases: &[TestCase]) -> Vec<&Path> {
    cases
        .iter()
        .map(TestCase::output_path)
        .duplicates()
        .collect()
}
