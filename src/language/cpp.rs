use std::path::{Path, PathBuf};

use crate::{
    command::CommandLine,
    config::Tool,
    error::EvalError,
    language::{LanguageAdapter, LanguageVariant},
    locate::Submission,
};

/// Name of the binary produced next to the sources.
fn binary_name() -> &'static str {
    if cfg!(windows) { "main.exe" } else { "main" }
}

/// Compiles `main.cpp` with g++ into `solution/main` and runs the binary.
#[derive(Debug, Clone)]
pub struct CppAdapter {
    /// Compiler executable.
    compiler:    Tool,
    /// Directory passed to the compiler with `-I`.
    include_dir: PathBuf,
}

impl CppAdapter {
    /// Creates the adapter around a compiler and an include directory.
    pub fn new(compiler: Tool, include_dir: PathBuf) -> Self {
        Self {
            compiler,
            include_dir,
        }
    }

    /// Path of the compiled binary for a given solution directory.
    pub fn binary_path(solution_dir: &Path) -> PathBuf {
        solution_dir.join(binary_name())
    }
}

impl LanguageAdapter for CppAdapter {
    fn variant(&self) -> LanguageVariant {
        LanguageVariant::Cpp
    }

    fn compile_command(&self, submission: &Submission, solution_dir: &Path) -> Option<CommandLine> {
        // The compiler names its output `main` on every platform; on Windows
        // g++ appends `.exe` itself.
        Some(
            CommandLine::new(self.compiler.program())
                .arg(submission.entry_path())
                .arg("-o")
                .arg(solution_dir.join("main"))
                .arg("-I")
                .arg(&self.include_dir),
        )
    }

    fn run_command(
        &self,
        _submission: &Submission,
        solution_dir: &Path,
    ) -> Result<CommandLine, EvalError> {
        Ok(CommandLine::new(Self::binary_path(solution_dir)))
    }

    fn compiler_dir(&self) -> Option<PathBuf> {
        self.compiler.parent_dir()
    }
}
