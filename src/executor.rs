#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::{
    cases::TestCase,
    config::StderrPolicy,
    error::EvalError,
    process::{StdinSource, is_timeout, run_collect},
    runner::{ExecutionContext, failure_text},
};

/// Standard output captured for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// File the output was written to.
    output_path: PathBuf,
    /// Bytes the program printed.
    content:     Vec<u8>,
}

impl ExecutionOutput {
    /// File the output was written to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Bytes the program printed.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Runs the built program once per test case.
pub struct TestExecutor<'a> {
    /// Shared, read-only context from the build.
    context:       &'a ExecutionContext,
    /// Error-stream policy for test runs.
    stderr_policy: StderrPolicy,
    /// Wall-clock limit per test case.
    deadline:      Option<Duration>,
}

impl<'a> TestExecutor<'a> {
    /// Creates an executor over a built program.
    pub fn new(context: &'a ExecutionContext) -> Self {
        Self {
            context,
            stderr_policy: StderrPolicy::default(),
            deadline: None,
        }
    }

    /// Sets the error-stream policy.
    pub fn stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    /// Sets the per-case wall-clock limit.
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs one case: clears its stale output, feeds the queries on stdin
    /// with the input path as last argument, and writes stdout verbatim.
    pub async fn execute(&self, case: &TestCase) -> Result<ExecutionOutput, EvalError> {
        let output_path = case.output_path();
        match tokio::fs::remove_file(output_path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("Could not remove {}", output_path.display()))
                    .into());
            }
        }
        if let Some(dir) = output_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }

        let queries = tokio::fs::read(case.queries_path())
            .await
            .with_context(|| format!("Could not read {}", case.queries_path().display()))?;
        let command = self
            .context
            .run_command()
            .with_trailing(case.input_path());

        tracing::info!("Running test {} in {}", case.prefix(), case.level_name());
        tracing::debug!("{command}");

        let execution_error = |stderr: String| EvalError::Execution {
            prefix: case.prefix().to_string(),
            level: case.level_name(),
            stderr,
        };

        let collected = match run_collect(
            &command,
            StdinSource::Bytes(queries),
            self.context.working_dir(),
            self.context.env(),
            self.deadline,
        )
        .await
        {
            Ok(collected) => collected,
            Err(err) if is_timeout(&err) => return Err(execution_error(err.to_string())),
            Err(err) => return Err(err.into()),
        };

        if let Some(stderr) = failure_text(self.stderr_policy, &collected) {
            return Err(execution_error(stderr));
        }

        tokio::fs::write(output_path, &collected.stdout)
            .await
            .with_context(|| format!("Could not write {}", output_path.display()))?;

        Ok(ExecutionOutput {
            output_path: output_path.to_path_buf(),
            content:     collected.stdout,
        })
    }

    /// Runs every case in order, stopping at the first failure.
    pub async fn execute_all(&self, cases: &[TestCase]) -> Result<Vec<ExecutionOutput>, EvalError> {
        let mut outputs = Vec::with_capacity(cases.len());
        for case in cases {
            outputs.push(self.execute(case).await?);
        }
        Ok(outputs)
    }
}
