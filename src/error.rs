#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

/// Everything that can halt an evaluation run.
///
/// A failing test is not an error: content mismatches are recorded in the
/// report. These variants are infrastructure problems and unwind straight to
/// the caller.
#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    /// The workspace or config is not usable (no entry point, unknown
    /// extension, malformed config line).
    #[error("{0}")]
    Configuration(String),
    /// A file that must exist alongside another one is missing.
    #[error("Could not find {what}: {}", path.display())]
    Lookup {
        /// What was being looked up, e.g. "queries file".
        what: &'static str,
        /// Where it was expected.
        path: PathBuf,
    },
    /// The compiler wrote to its error stream (or failed, in lenient mode).
    #[error("Compilation failed: {stderr}")]
    Build {
        /// Text captured from the compiler's error stream.
        stderr: String,
    },
    /// A test case wrote to its error stream (or failed, in lenient mode).
    #[error("Execution failed for test `{prefix}` in `{level}`: {stderr}")]
    Execution {
        /// Prefix of the failing test case.
        prefix: String,
        /// Level the failing test case belongs to.
        level:  String,
        /// Text captured from the program's error stream.
        stderr: String,
    },
    /// Unknown error
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl EvalError {
    /// Shorthand for a configuration error with a formatted message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Shorthand for a lookup error.
    pub fn lookup(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::Lookup {
            what,
            path: path.into(),
        }
    }

    /// Returns true for errors the comparator or executor raise because a
    /// paired file is missing.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        Self::Unknown(err.into())
    }
}
