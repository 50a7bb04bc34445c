#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// C++ adapter (compiled with g++).
pub mod cpp;
/// C# adapter (built and run through `dotnet run`).
pub mod csharp;
/// Java adapter (javac, then the JVM).
pub mod java;
/// Python adapter (interpreted, no build step).
pub mod python;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

pub use cpp::CppAdapter;
pub use csharp::CSharpAdapter;
pub use java::JavaAdapter;
pub use python::PythonAdapter;

use crate::{
    command::CommandLine, config::Toolchain, error::EvalError, locate::Submission,
    paths::WorkspacePaths,
};

/// The closed set of languages a submission may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanguageVariant {
    /// Python, run directly by the interpreter.
    Python,
    /// C++, compiled to a native binary.
    Cpp,
    /// Java, compiled to class files and run on the JVM.
    Java,
    /// C#, built and run through the dotnet CLI.
    CSharp,
}

impl LanguageVariant {
    /// Every variant, in the default entry-point priority order.
    pub const ALL: [LanguageVariant; 4] = [
        LanguageVariant::Python,
        LanguageVariant::Cpp,
        LanguageVariant::Java,
        LanguageVariant::CSharp,
    ];

    /// Short tag for the variant. Doubles as the entry file's extension.
    pub fn tag(self) -> &'static str {
        match self {
            LanguageVariant::Python => "py",
            LanguageVariant::Cpp => "cpp",
            LanguageVariant::Java => "java",
            LanguageVariant::CSharp => "cs",
        }
    }

    /// Canonical (case-sensitive) entry-point filename for the variant.
    pub fn entry_file(self) -> &'static str {
        match self {
            LanguageVariant::Python => "main.py",
            LanguageVariant::Cpp => "main.cpp",
            LanguageVariant::Java => "Main.java",
            LanguageVariant::CSharp => "Program.cs",
        }
    }

    /// Looks a variant up by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    /// Infers the variant from a source file's extension.
    pub fn from_path(path: &Path) -> Result<Self, EvalError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        Self::from_tag(extension).ok_or_else(|| {
            EvalError::configuration(format!("Unsupported file extension: {extension}"))
        })
    }
}

impl fmt::Display for LanguageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for LanguageVariant {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s.trim()).ok_or_else(|| {
            EvalError::configuration(format!(
                "Unknown language `{s}`; expected one of py, cpp, java, cs"
            ))
        })
    }
}

/// Per-language build and run recipe.
pub trait LanguageAdapter: Send + Sync {
    /// The variant this adapter handles.
    fn variant(&self) -> LanguageVariant;

    /// Compiler invocation, if the language has a separate build step.
    fn compile_command(&self, submission: &Submission, solution_dir: &Path) -> Option<CommandLine>;

    /// Command that runs the built program. The test input path is appended
    /// to it per test case.
    fn run_command(
        &self,
        submission: &Submission,
        solution_dir: &Path,
    ) -> Result<CommandLine, EvalError>;

    /// Directory to put in front of `PATH` so a relocated compiler finds its
    /// helper tools.
    fn compiler_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// Builds the adapter for `variant` from the configured toolchain.
pub fn adapter_for(
    variant: LanguageVariant,
    toolchain: &Toolchain,
    paths: &WorkspacePaths,
) -> Box<dyn LanguageAdapter> {
    match variant {
        LanguageVariant::Python => Box::new(PythonAdapter::new(toolchain.python())),
        LanguageVariant::Cpp => Box::new(CppAdapter::new(
            toolchain.gpp(),
            toolchain
                .cpp_include()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| paths.cpp_include_dir().to_path_buf()),
        )),
        LanguageVariant::Java => Box::new(JavaAdapter::new(toolchain.javac(), toolchain.java())),
        LanguageVariant::CSharp => Box::new(CSharpAdapter::new(toolchain.dotnet())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_from_str() {
        for variant in LanguageVariant::ALL {
            assert_eq!(variant.tag().parse::<LanguageVariant>().ok(), Some(variant));
        }
        assert!("rs".parse::<LanguageVariant>().is_err());
    }

    #[test]
    fn variant_is_inferred_from_extension() {
        assert_eq!(
            LanguageVariant::from_path(Path::new("solution/Program.cs")).ok(),
            Some(LanguageVariant::CSharp)
        );
        let err = LanguageVariant::from_path(Path::new("solution/main.rb")).unwrap_err();
        assert!(matches!(err, EvalError::Configuration(_)));
        assert_eq!(err.to_string(), "Unsupported file extension: rb");
    }

    #[test]
    fn each_variant_has_distinct_entry_file() {
        let mut names: Vec<_> = LanguageVariant::ALL.iter().map(|v| v.entry_file()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), LanguageVariant::ALL.len());
    }
}
