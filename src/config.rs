#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeMap,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use bon::Builder;
use glob::glob;
use which::which;

use crate::{constants::CONFIG_EXTENSION, error::EvalError, language::LanguageVariant};

/// Config key for the Python interpreter.
pub const PYTHON_KEY: &str = "python";
/// Config key for the C++ compiler.
pub const GPP_KEY: &str = "g++";
/// Config key for the Java compiler.
pub const JAVAC_KEY: &str = "javac";
/// Config key for the Java runtime.
pub const JAVA_KEY: &str = "java";
/// Config key for the dotnet launcher.
pub const DOTNET_KEY: &str = "dotnet";
/// Config key overriding the C++ include directory.
pub const CPP_INCLUDE_KEY: &str = "cpp_include";
/// Config key for the entry-point language priority.
pub const PRIORITY_KEY: &str = "priority";
/// Config key for the error-stream policy.
pub const STDERR_KEY: &str = "stderr";
/// Config key for the per-process timeout, in seconds.
pub const TIMEOUT_KEY: &str = "timeout";

/// Environment variable consulted for the timeout when the config file does
/// not set one.
pub const TIMEOUT_ENV: &str = "SOLUTION_EVALUATOR_TIMEOUT_SECS";

/// Every key the harness understands.
const KNOWN_KEYS: [&str; 9] = [
    PYTHON_KEY,
    GPP_KEY,
    JAVAC_KEY,
    JAVA_KEY,
    DOTNET_KEY,
    CPP_INCLUDE_KEY,
    PRIORITY_KEY,
    STDERR_KEY,
    TIMEOUT_KEY,
];

/// One toolchain executable, either the default name looked up on `PATH` or
/// a path supplied by the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// What gets spawned.
    program:   OsString,
    /// Whether `program` differs from the default name.
    relocated: bool,
}

impl Tool {
    /// The default executable, resolved through `PATH` at spawn time.
    pub fn named(name: &str) -> Self {
        Self {
            program:   name.into(),
            relocated: false,
        }
    }

    /// A configured executable. Configuring the default name is the same as
    /// not configuring it.
    pub fn configured(value: &str, default_name: &str) -> Self {
        Self {
            program:   value.into(),
            relocated: value != default_name,
        }
    }

    /// The executable to spawn.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// True when the config points this tool somewhere other than the
    /// default name.
    pub fn is_relocated(&self) -> bool {
        self.relocated
    }

    /// Directory holding a relocated tool.
    pub fn parent_dir(&self) -> Option<PathBuf> {
        if !self.relocated {
            return None;
        }
        Path::new(&self.program)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

/// Picks `python` when it is on `PATH`, then `python3`, and falls back to
/// `python` so the spawn error names the expected tool.
fn default_python() -> Tool {
    for candidate in ["python", "python3"] {
        if which(candidate).is_ok() {
            return Tool::named(candidate);
        }
    }
    Tool::named("python")
}

/// Toolchain executables used to build and run submissions.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Python interpreter.
    python:      Tool,
    /// C++ compiler.
    gpp:         Tool,
    /// Java compiler.
    javac:       Tool,
    /// Java runtime.
    java:        Tool,
    /// dotnet launcher.
    dotnet:      Tool,
    /// Include directory override for the C++ compiler.
    cpp_include: Option<PathBuf>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            python:      default_python(),
            gpp:         Tool::named(GPP_KEY),
            javac:       Tool::named(JAVAC_KEY),
            java:        Tool::named(JAVA_KEY),
            dotnet:      Tool::named(DOTNET_KEY),
            cpp_include: None,
        }
    }
}

impl Toolchain {
    /// Applies the toolchain keys found in `entries` on top of the defaults.
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let mut toolchain = Self::default();
        let tool = |key: &str| entries.get(key).map(|value| Tool::configured(value, key));

        if let Some(python) = entries.get(PYTHON_KEY) {
            // The default interpreter may be `python3`, not the key's name.
            let default_name = toolchain.python.program.to_string_lossy().into_owned();
            toolchain.python = Tool::configured(python, &default_name);
        }
        if let Some(gpp) = tool(GPP_KEY) {
            toolchain.gpp = gpp;
        }
        if let Some(javac) = tool(JAVAC_KEY) {
            toolchain.javac = javac;
        }
        if let Some(java) = tool(JAVA_KEY) {
            toolchain.java = java;
        }
        if let Some(dotnet) = tool(DOTNET_KEY) {
            toolchain.dotnet = dotnet;
        }
        toolchain.cpp_include = entries.get(CPP_INCLUDE_KEY).map(PathBuf::from);
        toolchain
    }

    /// Python interpreter.
    pub fn python(&self) -> Tool {
        self.python.clone()
    }

    /// C++ compiler.
    pub fn gpp(&self) -> Tool {
        self.gpp.clone()
    }

    /// Java compiler.
    pub fn javac(&self) -> Tool {
        self.javac.clone()
    }

    /// Java runtime.
    pub fn java(&self) -> Tool {
        self.java.clone()
    }

    /// dotnet launcher.
    pub fn dotnet(&self) -> Tool {
        self.dotnet.clone()
    }

    /// Include directory override for the C++ compiler, if configured.
    pub fn cpp_include(&self) -> Option<&Path> {
        self.cpp_include.as_deref()
    }
}

/// How text on a child's error stream is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StderrPolicy {
    /// Any error-stream text is fatal, whatever the exit status.
    #[default]
    Strict,
    /// Error-stream text is only logged; a non-zero exit status is fatal.
    Lenient,
}

impl FromStr for StderrPolicy {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(EvalError::configuration(format!(
                "Unknown stderr policy `{other}`; expected `strict` or `lenient`"
            ))),
        }
    }
}

/// Settings for one evaluation run.
#[derive(Debug, Clone, Builder)]
pub struct HarnessConfig {
    /// Toolchain executables.
    #[builder(default)]
    toolchain:     Toolchain,
    /// Order in which entry-point names are searched for.
    #[builder(default = LanguageVariant::ALL.to_vec())]
    priority:      Vec<LanguageVariant>,
    /// Error-stream policy for builds and test runs.
    #[builder(default)]
    stderr_policy: StderrPolicy,
    /// Wall-clock limit per spawned process; `None` waits forever.
    run_timeout:   Option<Duration>,
    /// File the settings were read from, if any.
    source:        Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HarnessConfig {
    /// Loads settings from `explicit` when given, otherwise from the first
    /// `*.config` file in `working_dir`, otherwise defaults.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Self, EvalError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(working_dir)?,
        };

        match path {
            Some(path) => {
                tracing::info!("Using config file {}", path.display());
                Self::from_file(&path)
            }
            None => {
                tracing::debug!("No config file found, using default toolchain");
                Self::from_entries(BTreeMap::new(), None)
            }
        }
    }

    /// Returns the lexicographically first `*.config` file directly inside
    /// `working_dir`.
    pub fn discover(working_dir: &Path) -> Result<Option<PathBuf>, EvalError> {
        let pattern = working_dir.join(format!("*.{CONFIG_EXTENSION}"));
        let pattern = pattern
            .to_str()
            .context("Could not convert working directory to string")?;

        let mut found: Vec<PathBuf> = glob(pattern)
            .context("Could not create glob")?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .collect();
        found.sort();

        Ok(found.into_iter().next())
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, EvalError> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let entries = parse_entries(&text, path)?;
        Self::from_entries(entries, Some(path.to_path_buf()))
    }

    /// Builds settings from already-parsed `KEY=VALUE` pairs.
    pub fn from_entries(
        entries: BTreeMap<String, String>,
        source: Option<PathBuf>,
    ) -> Result<Self, EvalError> {
        for key in entries.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!("Ignoring unknown config key `{key}`");
            }
        }

        let priority = match entries.get(PRIORITY_KEY) {
            Some(list) => parse_priority(list)?,
            None => LanguageVariant::ALL.to_vec(),
        };
        let stderr_policy = match entries.get(STDERR_KEY) {
            Some(policy) => policy.parse()?,
            None => StderrPolicy::default(),
        };
        let run_timeout = match entries.get(TIMEOUT_KEY) {
            Some(secs) => Some(parse_timeout(secs)?),
            None => read_timeout_secs(TIMEOUT_ENV),
        };

        Ok(Self {
            toolchain: Toolchain::from_entries(&entries),
            priority,
            stderr_policy,
            run_timeout,
            source,
        })
    }

    /// Toolchain executables.
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Entry-point search order.
    pub fn priority(&self) -> &[LanguageVariant] {
        &self.priority
    }

    /// Error-stream policy.
    pub fn stderr_policy(&self) -> StderrPolicy {
        self.stderr_policy
    }

    /// Per-process timeout, if any.
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }

    /// Config file these settings came from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped; the
/// value is everything after the first `=`.
pub fn parse_entries(text: &str, origin: &Path) -> Result<BTreeMap<String, String>, EvalError> {
    let mut entries = BTreeMap::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| {
            EvalError::configuration(format!(
                "{}:{}: expected KEY=VALUE, found `{line}`",
                origin.display(),
                index + 1
            ))
        })?;
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(entries)
}

/// Parses a comma-separated list of language tags.
fn parse_priority(list: &str) -> Result<Vec<LanguageVariant>, EvalError> {
    let mut priority = Vec::new();
    for tag in list.split(',').filter(|tag| !tag.trim().is_empty()) {
        let variant: LanguageVariant = tag.parse()?;
        if !priority.contains(&variant) {
            priority.push(variant);
        }
    }

    if priority.is_empty() {
        return Err(EvalError::configuration("`priority` must name at least one language"));
    }
    Ok(priority)
}

/// Parses a timeout given in whole seconds.
fn parse_timeout(secs: &str) -> Result<Duration, EvalError> {
    match secs.trim().parse::<u64>() {
        Ok(0) => Err(EvalError::configuration("`timeout` must be at least one second")),
        Ok(n) => Ok(Duration::from_secs(n)),
        Err(_) => Err(EvalError::configuration(format!(
            "`timeout` must be whole seconds, got `{secs}`"
        ))),
    }
}

/// Parses an environment variable into a `Duration`, or `None` when it is
/// missing, not a number, or zero.
fn read_timeout_secs(env: &str) -> Option<Duration> {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<HarnessConfig, EvalError> {
        let entries = parse_entries(text, Path::new("test.config"))?;
        HarnessConfig::from_entries(entries, None)
    }

    #[test]
    fn toolchain_defaults_are_plain_names() {
        let config = parse("").expect("empty config");
        let tools = config.toolchain();

        assert_eq!(tools.gpp().program(), "g++");
        assert!(!tools.gpp().is_relocated());
        assert_eq!(tools.javac().program(), "javac");
        assert_eq!(tools.dotnet().program(), "dotnet");
        assert_eq!(config.priority(), LanguageVariant::ALL);
        assert_eq!(config.stderr_policy(), StderrPolicy::Strict);
    }

    #[test]
    fn overrides_and_comments() {
        let config = parse("# toolchain\n\ng++=/opt/gcc/bin/g++\njava = /usr/lib/jvm/bin/java\n")
            .expect("config");
        let gpp = config.toolchain().gpp();

        assert!(gpp.is_relocated());
        assert_eq!(gpp.parent_dir(), Some(PathBuf::from("/opt/gcc/bin")));
        assert_eq!(config.toolchain().java().program(), "/usr/lib/jvm/bin/java");
    }

    #[test]
    fn default_name_is_not_relocated() {
        let config = parse("g++=g++").expect("config");
        assert!(!config.toolchain().gpp().is_relocated());
        assert_eq!(config.toolchain().gpp().parent_dir(), None);
    }

    #[test]
    fn value_keeps_everything_after_first_equals() {
        let entries = parse_entries("cpp_include=/a=b/include", Path::new("x.config"))
            .expect("entries");
        assert_eq!(entries.get("cpp_include").map(String::as_str), Some("/a=b/include"));
    }

    #[test]
    fn line_without_equals_is_a_configuration_error() {
        let err = parse("python=/usr/bin/python3\nnonsense\n").unwrap_err();
        match err {
            EvalError::Configuration(msg) => assert!(msg.contains("test.config:2"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn priority_and_policy_keys() {
        let config = parse("priority=java, cpp\nstderr=lenient\ntimeout=5").expect("config");
        assert_eq!(config.priority(), [LanguageVariant::Java, LanguageVariant::Cpp]);
        assert_eq!(config.stderr_policy(), StderrPolicy::Lenient);
        assert_eq!(config.run_timeout(), Some(Duration::from_secs(5)));

        assert!(parse("priority=py,rust").is_err());
        assert!(parse("priority=").is_err());
        assert!(parse("stderr=sometimes").is_err());
        assert!(parse("timeout=soon").is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        match parse("timeout=0").unwrap_err() {
            EvalError::Configuration(msg) => assert!(msg.contains("at least one second"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(parse_timeout(" 1 ").ok(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn explicit_path_wins_over_discovery() {
        let dir = std::env::temp_dir().join(format!("se-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("dir");
        std::fs::write(dir.join("a.config"), "javac=/a/javac\n").expect("a");
        std::fs::write(dir.join("b.config"), "javac=/b/javac\n").expect("b");
        std::fs::write(dir.join("explicit.txt"), "javac=/x/javac\n").expect("x");

        let discovered = HarnessConfig::load(None, &dir).expect("discovered");
        assert_eq!(discovered.toolchain().javac().program(), "/a/javac");
        assert_eq!(discovered.source(), Some(dir.join("a.config").as_path()));

        let explicit = HarnessConfig::load(Some(&dir.join("explicit.txt")), &dir).expect("explicit");
        assert_eq!(explicit.toolchain().javac().program(), "/x/javac");

        let _ = std::fs::remove_dir_all(dir);
    }
}
