use std::path::{Path, PathBuf};

use crate::{
    command::CommandLine,
    config::Tool,
    error::EvalError,
    language::{LanguageAdapter, LanguageVariant},
    locate::Submission,
};

/// Class the JVM is asked to start.
const MAIN_CLASS: &str = "Main";

/// Compiles `Main.java` into the solution directory and runs `Main` from it.
#[derive(Debug, Clone)]
pub struct JavaAdapter {
    /// Compiler executable.
    javac: Tool,
    /// Runtime executable.
    java:  Tool,
}

impl JavaAdapter {
    /// Creates the adapter around a compiler and a runtime.
    pub fn new(javac: Tool, java: Tool) -> Self {
        Self { javac, java }
    }
}

impl LanguageAdapter for JavaAdapter {
    fn variant(&self) -> LanguageVariant {
        LanguageVariant::Java
    }

    fn compile_command(&self, submission: &Submission, solution_dir: &Path) -> Option<CommandLine> {
        Some(
            CommandLine::new(self.javac.program())
                .arg(submission.entry_path())
                .arg("-d")
                .arg(solution_dir),
        )
    }

    fn run_command(
        &self,
        _submission: &Submission,
        solution_dir: &Path,
    ) -> Result<CommandLine, EvalError> {
        Ok(CommandLine::new(self.java.program())
            .arg("-cp")
            .arg(solution_dir)
            .arg(MAIN_CLASS))
    }

    fn compiler_dir(&self) -> Option<PathBuf> {
        self.javac.parent_dir()
    }
}
