//! # solution-evaluator
//!
//! Evaluates programming-exercise submissions written in Python, C++, Java or
//! C#. The submission's entry point is located under `solution/`, built once,
//! run against every `inputs/<level>/*.xml` case with its queries on standard
//! input, and each output is compared byte for byte with `golden/`. Results
//! are written per level to `evaluation_report.txt`.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Test-case discovery from the inputs tree.
pub mod cases;
/// Program-plus-arguments command lines.
pub mod command;
/// Comparison of produced outputs with golden files.
pub mod compare;
/// `*.config` discovery, parsing and run policy.
pub mod config;
/// Fixed file and directory names.
pub mod constants;
/// The top-level evaluation flow.
pub mod evaluate;
/// The error taxonomy.
pub mod error;
/// Runs the built program once per test case.
pub mod executor;
/// Supported languages and their build/run recipes.
pub mod language;
/// Entry-point discovery.
pub mod locate;
/// Workspace directory layout.
pub mod paths;
/// Child-process spawning and output capture.
pub mod process;
/// Level reports and the report file.
pub mod report;
/// The build step and the shared execution context.
pub mod runner;

pub use config::HarnessConfig;
pub use error::EvalError;
pub use evaluate::{Evaluation, evaluate};
pub use paths::WorkspacePaths;
