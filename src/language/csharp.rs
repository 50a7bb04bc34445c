use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    command::CommandLine,
    config::Tool,
    constants::CSPROJ_EXTENSION,
    error::EvalError,
    language::{LanguageAdapter, LanguageVariant},
    locate::Submission,
};

/// Runs `Program.cs` through `dotnet run`, which also builds it.
#[derive(Debug, Clone)]
pub struct CSharpAdapter {
    /// dotnet launcher.
    dotnet: Tool,
}

impl CSharpAdapter {
    /// Creates the adapter around the dotnet launcher.
    pub fn new(dotnet: Tool) -> Self {
        Self { dotnet }
    }
}

/// Finds the project descriptor sitting next to the entry file.
///
/// Candidates are sorted by name and the first one is used; more than one is
/// logged since `dotnet` would otherwise have built a different project.
pub fn find_csproj(entry_dir: &Path) -> Result<PathBuf, EvalError> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(entry_dir)
        .with_context(|| format!("Could not list {}", entry_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == CSPROJ_EXTENSION)
        })
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        tracing::warn!(
            "Found {} .csproj files in {}, using {}",
            candidates.len(),
            entry_dir.display(),
            candidates[0].display()
        );
    }

    candidates.into_iter().next().ok_or_else(|| {
        EvalError::lookup(
            "a .csproj file adjacent to Program.cs",
            entry_dir.join(format!("*.{CSPROJ_EXTENSION}")),
        )
    })
}

impl LanguageAdapter for CSharpAdapter {
    fn variant(&self) -> LanguageVariant {
        LanguageVariant::CSharp
    }

    fn compile_command(&self, _submission: &Submission, _solution_dir: &Path) -> Option<CommandLine> {
        None
    }

    fn run_command(
        &self,
        submission: &Submission,
        _solution_dir: &Path,
    ) -> Result<CommandLine, EvalError> {
        let project = find_csproj(submission.entry_dir())?;
        Ok(CommandLine::new(self.dotnet.program())
            .arg("run")
            .arg("--project")
            .arg(project))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn temp_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("se-csharp-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).expect("create temp root");
        root
    }

    #[test]
    fn runs_first_adjacent_project() {
        let root = temp_root();
        fs::write(root.join("Program.cs"), "").expect("entry");
        fs::write(root.join("Zeta.csproj"), "").expect("zeta");
        fs::write(root.join("Alpha.csproj"), "").expect("alpha");

        let submission = Submission::from_entry_path(root.join("Program.cs")).expect("submission");
        let run = CSharpAdapter::new(Tool::named("dotnet"))
            .run_command(&submission, &root)
            .expect("run command");

        assert_eq!(run.program(), "dotnet");
        assert_eq!(run.arguments()[0], "run");
        assert_eq!(run.arguments()[1], "--project");
        assert_eq!(run.arguments()[2], root.join("Alpha.csproj").into_os_string());

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_project_is_a_lookup_error() {
        let root = temp_root();
        fs::write(root.join("Program.cs"), "").expect("entry");

        let submission = Submission::from_entry_path(root.join("Program.cs")).expect("submission");
        let err = CSharpAdapter::new(Tool::named("dotnet"))
            .run_command(&submission, &root)
            .unwrap_err();
        assert!(err.is_lookup());

        let _ = fs::remove_dir_all(root);
    }
}
