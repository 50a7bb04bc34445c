use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{error::EvalError, language::LanguageVariant};

/// A located submission: its entry file and the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Path to the entry-point file.
    entry_path: PathBuf,
    /// Language inferred from the entry file.
    variant:    LanguageVariant,
}

impl Submission {
    /// Wraps an entry file, inferring its language from the extension.
    ///
    /// Fails with a configuration error when the extension is unsupported or
    /// the file name is not the canonical entry name for its language.
    pub fn from_entry_path(entry_path: impl Into<PathBuf>) -> Result<Self, EvalError> {
        let entry_path = entry_path.into();
        let variant = LanguageVariant::from_path(&entry_path)?;

        let file_name = entry_path.file_name().and_then(|n| n.to_str());
        if file_name != Some(variant.entry_file()) {
            return Err(EvalError::configuration(format!(
                "{} is not a {} entry point; expected a file named {}",
                entry_path.display(),
                variant,
                variant.entry_file()
            )));
        }

        Ok(Self {
            entry_path,
            variant,
        })
    }

    /// Path to the entry-point file.
    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    /// Language of the submission.
    pub fn variant(&self) -> LanguageVariant {
        self.variant
    }

    /// Directory containing the entry-point file.
    pub fn entry_dir(&self) -> &Path {
        self.entry_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Finds a submission's entry point by canonical file name.
#[derive(Debug, Clone)]
pub struct EntryPointLocator {
    /// Languages to look for, most preferred first.
    priority: Vec<LanguageVariant>,
}

impl Default for EntryPointLocator {
    fn default() -> Self {
        Self::new(LanguageVariant::ALL)
    }
}

impl EntryPointLocator {
    /// Creates a locator trying languages in the given order.
    pub fn new(priority: impl IntoIterator<Item = LanguageVariant>) -> Self {
        Self {
            priority: priority.into_iter().collect(),
        }
    }

    /// Searches `root` recursively for an entry file.
    ///
    /// The highest-priority language with a match wins. Within a language, the
    /// first match in a walk sorted by file name wins. Unreadable entries are
    /// skipped; a missing root simply yields `None`.
    pub fn locate(&self, root: &Path) -> Option<Submission> {
        let files: Vec<PathBuf> = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();

        self.priority.iter().find_map(|variant| {
            files
                .iter()
                .find(|path| {
                    path.file_name().and_then(|n| n.to_str()) == Some(variant.entry_file())
                })
                .map(|path| Submission {
                    entry_path: path.clone(),
                    variant:    *variant,
                })
        })
    }
}
