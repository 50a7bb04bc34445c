#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Directory holding the submission's source tree.
pub const SOLUTION_DIR: &str = "solution";

/// Directory holding per-level test inputs and their queries files.
pub const INPUTS_DIR: &str = "inputs";

/// Directory the harness writes produced outputs into.
pub const OUTPUTS_DIR: &str = "outputs";

/// Directory holding the pre-computed reference outputs.
pub const GOLDEN_DIR: &str = "golden";

/// Include directory handed to the C++ compiler, relative to the working
/// directory.
pub const CPP_INCLUDE_DIR: &str = "lib/cpp/pugixml-1.14/src/";

/// Name of the generated report.
pub const REPORT_FILE: &str = "evaluation_report.txt";

/// Extension of files that may override toolchain paths.
pub const CONFIG_EXTENSION: &str = "config";

/// Suffix marking a file under `inputs/` as a test input.
pub const INPUT_SUFFIX: &str = ".xml";

/// Suffix of the queries file paired with each input, after the prefix.
pub const QUERIES_SUFFIX: &str = "_queries.txt";

/// Suffix appended to a test prefix when naming its output file.
pub const OUTPUT_FILE_SUFFIX: &str = "_output.txt";

/// Suffix the comparator uses to recognise produced output files.
pub const OUTPUT_MATCH_SUFFIX: &str = "output.txt";

/// Extension of the C# project descriptor expected next to `Program.cs`.
pub const CSPROJ_EXTENSION: &str = "csproj";

/// Separator between a test prefix and the rest of an input file name.
pub const PREFIX_SEPARATOR: char = '_';
