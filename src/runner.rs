#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::{
    command::CommandLine,
    config::StderrPolicy,
    error::EvalError,
    language::LanguageAdapter,
    locate::Submission,
    process::{Collected, Environment, StdinSource, is_timeout, run_collect},
};

/// Everything needed to run the built program, computed once per evaluation
/// and shared read-only by every test case.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Run command; each test case appends its input path.
    run:         CommandLine,
    /// Directory children are started in.
    working_dir: PathBuf,
    /// Environment snapshot handed to every child.
    env:         Environment,
}

impl ExecutionContext {
    /// Creates a context from its parts.
    pub fn new(run: CommandLine, working_dir: PathBuf, env: Environment) -> Self {
        Self {
            run,
            working_dir,
            env,
        }
    }

    /// The run command template.
    pub fn run_command(&self) -> &CommandLine {
        &self.run
    }

    /// Directory children are started in.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Environment handed to every child.
    pub fn env(&self) -> &Environment {
        &self.env
    }
}

/// Looks up the `PATH` key of an environment. Windows spells it `Path`.
fn path_key(env: &Environment) -> OsString {
    env.keys()
        .find(|key| key.eq_ignore_ascii_case("PATH"))
        .cloned()
        .unwrap_or_else(|| OsString::from("PATH"))
}

/// Returns `env` with `dir` in front of its search path.
pub fn prepend_search_path(mut env: Environment, dir: &Path) -> Result<Environment, EvalError> {
    let key = path_key(&env);
    let mut entries = vec![dir.to_path_buf()];
    if let Some(existing) = env.get(&key) {
        entries.extend(std::env::split_paths(existing));
    }

    let joined = std::env::join_paths(entries)
        .with_context(|| format!("Could not add {} to PATH", dir.display()))?;
    env.insert(key, joined);
    Ok(env)
}

/// Decides whether a finished child failed under `policy`, returning the text
/// to report when it did.
pub fn failure_text(policy: StderrPolicy, collected: &Collected) -> Option<String> {
    match policy {
        StderrPolicy::Strict => collected.wrote_stderr().then(|| collected.stderr_text()),
        StderrPolicy::Lenient => {
            if collected.status.success() {
                if collected.wrote_stderr() {
                    tracing::warn!("{}", collected.stderr_text().trim_end());
                }
                None
            } else if collected.wrote_stderr() {
                Some(collected.stderr_text())
            } else {
                Some(format!("process exited with {}", collected.status))
            }
        }
    }
}

/// Runs the optional compile step and produces the [`ExecutionContext`].
pub struct BuildRunner<'a> {
    /// Recipe for the submission's language.
    adapter:       &'a dyn LanguageAdapter,
    /// Where compiled artifacts go.
    solution_dir:  &'a Path,
    /// Directory the compiler and the program run in.
    working_dir:   &'a Path,
    /// Error-stream policy for the compiler.
    stderr_policy: StderrPolicy,
    /// Wall-clock limit for the compiler.
    deadline:      Option<Duration>,
}

impl<'a> BuildRunner<'a> {
    /// Creates a runner for `adapter`, building into `solution_dir` from
    /// `working_dir`.
    pub fn new(adapter: &'a dyn LanguageAdapter, solution_dir: &'a Path, working_dir: &'a Path) -> Self {
        Self {
            adapter,
            solution_dir,
            working_dir,
            stderr_policy: StderrPolicy::default(),
            deadline: None,
        }
    }

    /// Sets the error-stream policy.
    pub fn stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    /// Sets the compiler's wall-clock limit.
    pub fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Takes the environment snapshot, compiles when the language needs it and
    /// returns the context every test case runs with.
    ///
    /// The program is built exactly once; a failed build is fatal.
    pub async fn build(&self, submission: &Submission) -> Result<ExecutionContext, EvalError> {
        tracing::debug!("Preparing {} submission", self.adapter.variant());
        let mut env: Environment = std::env::vars_os().collect();
        if let Some(dir) = self.adapter.compiler_dir() {
            tracing::debug!("Prepending {} to PATH", dir.display());
            env = prepend_search_path(env, &dir)?;
        }

        if let Some(compile) = self.adapter.compile_command(submission, self.solution_dir) {
            tracing::info!("Compiling: {compile}");
            let collected = match run_collect(
                &compile,
                StdinSource::Null,
                self.working_dir,
                &env,
                self.deadline,
            )
            .await
            {
                Ok(collected) => collected,
                Err(err) if is_timeout(&err) => {
                    return Err(EvalError::Build {
                        stderr: err.to_string(),
                    });
                }
                Err(err) => return Err(err.into()),
            };

            if let Some(stderr) = failure_text(self.stderr_policy, &collected) {
                return Err(EvalError::Build { stderr });
            }
            for line in collected.stdout_text().lines().filter(|l| !l.trim().is_empty()) {
                tracing::info!("{line}");
            }
        }

        let run = self.adapter.run_command(submission, self.solution_dir)?;
        tracing::debug!("Run command: {run}");
        Ok(ExecutionContext::new(run, self.working_dir.to_path_buf(), env))
    }
}
