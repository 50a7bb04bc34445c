#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use bon::builder;

use crate::constants::{CPP_INCLUDE_DIR, GOLDEN_DIR, INPUTS_DIR, OUTPUTS_DIR, SOLUTION_DIR};

#[derive(Debug, Clone)]
/// Directory layout of an evaluation workspace.
pub struct WorkspacePaths {
    /// Working directory every relative path hangs off.
    root_dir:        PathBuf,
    /// `solution/` holding the submission.
    solution_dir:    PathBuf,
    /// `inputs/` holding test inputs and queries.
    inputs_dir:      PathBuf,
    /// `outputs/` the harness writes into.
    outputs_dir:     PathBuf,
    /// `golden/` holding reference outputs.
    golden_dir:      PathBuf,
    /// Directory the report is written to.
    report_dir:      PathBuf,
    /// Include directory for C++ submissions.
    cpp_include_dir: PathBuf,
}

impl WorkspacePaths {
    /// Creates the standard layout rooted at `root_dir`.
    pub fn new(root_dir: PathBuf) -> Self {
        Self::build_with_defaults(root_dir, None, None, None, None, None, None)
    }

    /// Working directory for the run.
    pub fn root_dir(&self) -> &Path {
        self.root_dir.as_path()
    }

    /// Submission source tree.
    pub fn solution_dir(&self) -> &Path {
        self.solution_dir.as_path()
    }

    /// Test inputs tree.
    pub fn inputs_dir(&self) -> &Path {
        self.inputs_dir.as_path()
    }

    /// Produced outputs tree.
    pub fn outputs_dir(&self) -> &Path {
        self.outputs_dir.as_path()
    }

    /// Golden reference tree.
    pub fn golden_dir(&self) -> &Path {
        self.golden_dir.as_path()
    }

    /// Where `evaluation_report.txt` goes.
    pub fn report_dir(&self) -> &Path {
        self.report_dir.as_path()
    }

    /// Default include directory for C++ submissions.
    pub fn cpp_include_dir(&self) -> &Path {
        self.cpp_include_dir.as_path()
    }

    /// Same layout with every directory made absolute against the current
    /// directory, so paths stay valid whatever `cwd` a child is given.
    pub fn absolute(self) -> std::io::Result<Self> {
        Ok(Self {
            root_dir:        std::path::absolute(self.root_dir)?,
            solution_dir:    std::path::absolute(self.solution_dir)?,
            inputs_dir:      std::path::absolute(self.inputs_dir)?,
            outputs_dir:     std::path::absolute(self.outputs_dir)?,
            golden_dir:      std::path::absolute(self.golden_dir)?,
            report_dir:      std::path::absolute(self.report_dir)?,
            cpp_include_dir: std::path::absolute(self.cpp_include_dir)?,
        })
    }
}

impl Default for WorkspacePaths {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl WorkspacePaths {
    /// Centralized constructor that applies standard defaults when overrides
    /// are absent.
    fn build_with_defaults(
        root_dir: PathBuf,
        solution_dir: Option<PathBuf>,
        inputs_dir: Option<PathBuf>,
        outputs_dir: Option<PathBuf>,
        golden_dir: Option<PathBuf>,
        report_dir: Option<PathBuf>,
        cpp_include_dir: Option<PathBuf>,
    ) -> Self {
        let solution_dir = solution_dir.unwrap_or_else(|| root_dir.join(SOLUTION_DIR));
        let inputs_dir = inputs_dir.unwrap_or_else(|| root_dir.join(INPUTS_DIR));
        let outputs_dir = outputs_dir.unwrap_or_else(|| root_dir.join(OUTPUTS_DIR));
        let golden_dir = golden_dir.unwrap_or_else(|| root_dir.join(GOLDEN_DIR));
        let report_dir = report_dir.unwrap_or_else(|| root_dir.clone());
        let cpp_include_dir = cpp_include_dir.unwrap_or_else(|| root_dir.join(CPP_INCLUDE_DIR));

        Self {
            root_dir,
            solution_dir,
            inputs_dir,
            outputs_dir,
            golden_dir,
            report_dir,
            cpp_include_dir,
        }
    }
}

/// Builder-friendly constructor for `WorkspacePaths` with optional overrides.
#[builder(finish_fn = build)]
pub fn workspace_paths(
    #[builder(into)] root_dir: PathBuf,
    solution_dir: Option<PathBuf>,
    inputs_dir: Option<PathBuf>,
    outputs_dir: Option<PathBuf>,
    golden_dir: Option<PathBuf>,
    report_dir: Option<PathBuf>,
    cpp_include_dir: Option<PathBuf>,
) -> WorkspacePaths {
    WorkspacePaths::build_with_defaults(
        root_dir,
        solution_dir,
        inputs_dir,
        outputs_dir,
        golden_dir,
        report_dir,
        cpp_include_dir,
    )
}
