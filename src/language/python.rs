use std::path::Path;

use crate::{
    command::CommandLine,
    config::Tool,
    error::EvalError,
    language::{LanguageAdapter, LanguageVariant},
    locate::Submission,
};

/// Runs `main.py` with the configured interpreter.
#[derive(Debug, Clone)]
pub struct PythonAdapter {
    /// Interpreter executable.
    interpreter: Tool,
}

impl PythonAdapter {
    /// Creates the adapter around an interpreter.
    pub fn new(interpreter: Tool) -> Self {
        Self { interpreter }
    }
}

impl LanguageAdapter for PythonAdapter {
    fn variant(&self) -> LanguageVariant {
        LanguageVariant::Python
    }

    fn compile_command(&self, _submission: &Submission, _solution_dir: &Path) -> Option<CommandLine> {
        None
    }

    fn run_command(
        &self,
        submission: &Submission,
        _solution_dir: &Path,
    ) -> Result<CommandLine, EvalError> {
        Ok(CommandLine::new(self.interpreter.program()).arg(submission.entry_path()))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn runs_entry_with_interpreter_and_no_build() {
        let adapter = PythonAdapter::new(Tool::configured("/usr/bin/python3.12", "python"));
        let submission = Submission::from_entry_path("/work/solution/main.py").expect("submission");

        assert!(adapter.compile_command(&submission, Path::new("/work/solution")).is_none());

        let run = adapter
            .run_command(&submission, Path::new("/work/solution"))
            .expect("run command");
        assert_eq!(run.program(), "/usr/bin/python3.12");
        assert_eq!(run.arguments(), [OsString::from("/work/solution/main.py")]);
    }
}
