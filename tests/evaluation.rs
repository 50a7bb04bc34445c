//! End-to-end evaluation runs on throwaway workspaces. Toolchains are swapped
//! for `/bin/sh` through the config so no compilers are needed.
#![cfg(unix)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use solution_evaluator::{
    EvalError, HarnessConfig, WorkspacePaths,
    config::parse_entries,
    constants::REPORT_FILE,
    evaluate::{self, evaluate},
    language::LanguageVariant,
    paths::workspace_paths,
};
use uuid::Uuid;

struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("se-eval-{}", Uuid::new_v4()));
        fs::create_dir_all(&root).expect("create temp root");
        Self { root }
    }

    fn write(&self, relative: &str, text: &str) -> &Self {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, text).expect("write");
        self
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn paths(&self) -> WorkspacePaths {
        WorkspacePaths::new(self.root.clone())
    }

    fn config(&self, text: &str) -> HarnessConfig {
        let entries = parse_entries(text, Path::new("test.config")).expect("config entries");
        HarnessConfig::from_entries(entries, None).expect("config")
    }

    fn report(&self) -> String {
        fs::read_to_string(self.path(REPORT_FILE)).expect("report")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// "Python" submission that answers 42 to the queries `1 2`.
const ANSWER_SCRIPT: &str = "read a b\nif [ \"$a $b\" = \"1 2\" ]; then echo 42; else echo 0; fi\n";

fn scenario_a() -> Workspace {
    let ws = Workspace::new();
    ws.write("solution/main.py", ANSWER_SCRIPT)
        .write("inputs/level1/t1_input.xml", "<doc/>")
        .write("inputs/level1/t1_queries.txt", "1 2\n")
        .write("golden/level1/t1_output.txt", "42\n");
    ws
}

#[tokio::test]
async fn matching_output_passes() {
    let ws = scenario_a();
    let evaluation = evaluate(&ws.paths(), &ws.config("python=/bin/sh"))
        .await
        .expect("evaluation");

    assert_eq!(evaluation.submission().variant(), LanguageVariant::Python);
    assert_eq!(evaluation.report_path(), ws.path(REPORT_FILE));
    assert_eq!(
        ws.report(),
        format!(
            "Level: level1, Passed tests: 1, Total tests: 1\n\tFile {} matches the golden file.",
            ws.path("outputs/level1/t1_output.txt").display()
        )
    );
}

#[tokio::test]
async fn differing_byte_is_a_mismatch() {
    let ws = scenario_a();
    ws.write("golden/level1/t1_output.txt", "43\n");

    evaluate(&ws.paths(), &ws.config("python=/bin/sh"))
        .await
        .expect("evaluation");

    assert_eq!(
        ws.report(),
        format!(
            "Level: level1, Passed tests: 0, Total tests: 1\n\tMismatch found in file: {}",
            ws.path("outputs/level1/t1_output.txt").display()
        )
    );
}

#[tokio::test]
async fn missing_queries_file_halts_before_running() {
    let ws = scenario_a();
    ws.write("inputs/level1/t2_input.xml", "<doc/>");

    let err = evaluate(&ws.paths(), &ws.config("python=/bin/sh"))
        .await
        .unwrap_err();

    match err {
        EvalError::Lookup { what, path } => {
            assert_eq!(what, "queries file");
            assert_eq!(path, ws.path("inputs/level1/t2_queries.txt"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!ws.path("outputs/level1/t2_output.txt").exists());
    assert!(!ws.path(REPORT_FILE).exists());
}

#[tokio::test]
async fn compiler_stderr_aborts_with_empty_outputs() {
    let ws = Workspace::new();
    ws.write("solution/main.cpp", "echo 'main.cpp:1: error: expected ;' >&2\n")
        .write("inputs/level1/t1_input.xml", "<doc/>")
        .write("inputs/level1/t1_queries.txt", "1 2\n")
        .write("golden/level1/t1_output.txt", "42\n");

    let err = evaluate(&ws.paths(), &ws.config("g++=/bin/sh"))
        .await
        .unwrap_err();

    assert!(matches!(err, EvalError::Build { .. }), "{err:?}");
    let produced: Vec<_> = fs::read_dir(ws.path("outputs"))
        .expect("outputs exists")
        .collect();
    assert!(produced.is_empty());
    assert!(!ws.path(REPORT_FILE).exists());
}

#[tokio::test]
async fn compiled_submission_is_built_once_and_run_per_case() {
    let ws = Workspace::new();
    // Stands in for g++: writes the "binary" to the path after `-o`.
    ws.write(
        "solution/main.cpp",
        "echo build >> \"$(dirname \"$2\")/builds.log\"\n\
         printf '#!/bin/sh\\nread a b\\necho $((a + b))\\n' > \"$2\"\n\
         chmod +x \"$2\"\n",
    )
    .write("inputs/easy/e1_input.xml", "<doc/>")
    .write("inputs/easy/e1_queries.txt", "1 2\n")
    .write("inputs/easy/e2_input.xml", "<doc/>")
    .write("inputs/easy/e2_queries.txt", "20 22\n")
    .write("golden/easy/e1_output.txt", "3\n")
    .write("golden/easy/e2_output.txt", "42\n");

    let evaluation = evaluate(&ws.paths(), &ws.config("g++=/bin/sh"))
        .await
        .expect("evaluation");

    let builds = fs::read_to_string(ws.path("solution/builds.log")).expect("build log");
    assert_eq!(builds.lines().count(), 1);
    let report = &evaluation.reports()[0];
    assert_eq!(report.level(), "easy");
    assert_eq!((report.passed_tests(), report.total_tests()), (2, 2));
}

#[tokio::test]
async fn levels_are_reported_in_name_order() {
    let ws = Workspace::new();
    ws.write("solution/main.py", "read line\necho \"$line\"\n");
    for level in ["level3", "level1", "level2"] {
        ws.write(&format!("inputs/{level}/q_input.xml"), "")
            .write(&format!("inputs/{level}/q_queries.txt"), &format!("{level}\n"))
            .write(&format!("golden/{level}/q_output.txt"), &format!("{level}\n"));
    }

    evaluate(&ws.paths(), &ws.config("python=/bin/sh"))
        .await
        .expect("evaluation");

    let headers: Vec<String> = ws
        .report()
        .lines()
        .filter(|line| line.starts_with("Level: "))
        .map(String::from)
        .collect();
    assert_eq!(
        headers,
        [
            "Level: level1, Passed tests: 1, Total tests: 1",
            "Level: level2, Passed tests: 1, Total tests: 1",
            "Level: level3, Passed tests: 1, Total tests: 1",
        ]
    );
}

#[tokio::test]
async fn rerunning_gives_identical_results() {
    let ws = scenario_a();
    let config = ws.config("python=/bin/sh");

    let first = evaluate(&ws.paths(), &config).await.expect("first run");
    let first_report = ws.report();
    let first_output = fs::read(ws.path("outputs/level1/t1_output.txt")).expect("output");

    let second = evaluate(&ws.paths(), &config).await.expect("second run");
    assert_eq!(first.reports(), second.reports());
    assert_eq!(first_report, ws.report());
    assert_eq!(
        first_output,
        fs::read(ws.path("outputs/level1/t1_output.txt")).expect("output")
    );
}

#[tokio::test]
async fn runtime_stderr_fails_the_whole_run() {
    let ws = scenario_a();
    ws.write("solution/main.py", "echo 42\necho 'Traceback' >&2\n");

    let err = evaluate(&ws.paths(), &ws.config("python=/bin/sh"))
        .await
        .unwrap_err();

    assert!(matches!(err, EvalError::Execution { .. }), "{err:?}");
    assert!(!ws.path(REPORT_FILE).exists());

    let lenient = evaluate(&ws.paths(), &ws.config("python=/bin/sh\nstderr=lenient"))
        .await
        .expect("lenient run");
    assert_eq!(lenient.reports()[0].passed_tests(), 1);
}

#[tokio::test]
async fn empty_solution_is_a_configuration_error() {
    let ws = Workspace::new();
    ws.write("solution/README.md", "nothing here")
        .write("inputs/level1/t1_input.xml", "")
        .write("inputs/level1/t1_queries.txt", "");

    let err = evaluate(&ws.paths(), &ws.config(""))
        .await
        .unwrap_err();

    match err {
        EvalError::Configuration(message) => assert_eq!(message, evaluate::NO_ENTRY_POINT),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!ws.path("outputs").exists());
}

#[tokio::test]
async fn report_dir_override_is_created() {
    let ws = scenario_a();
    let paths = workspace_paths()
        .root_dir(ws.root.clone())
        .report_dir(ws.path("reports/run1"))
        .build();

    let evaluation = evaluate(&paths, &ws.config("python=/bin/sh"))
        .await
        .expect("evaluation");

    assert_eq!(evaluation.report_path(), ws.path("reports/run1").join(REPORT_FILE));
    let report = fs::read_to_string(evaluation.report_path()).expect("report");
    assert!(report.starts_with("Level: level1, Passed tests: 1, Total tests: 1"));
}

#[tokio::test]
async fn slow_test_case_times_out_as_execution_error() {
    let ws = scenario_a();
    ws.write("solution/main.py", "sleep 5\necho 42\n");

    let err = evaluate(&ws.paths(), &ws.config("python=/bin/sh\ntimeout=1"))
        .await
        .unwrap_err();

    match err {
        EvalError::Execution {
            prefix,
            level,
            stderr,
        } => {
            assert_eq!(prefix, "t1");
            assert_eq!(level, "level1");
            assert!(stderr.contains("timed out after 1s"), "{stderr}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!ws.path("outputs/level1/t1_output.txt").exists());
    assert!(!ws.path(REPORT_FILE).exists());
}

#[tokio::test]
async fn slow_compiler_times_out_as_build_error() {
    let ws = Workspace::new();
    ws.write("solution/main.cpp", "sleep 5\n")
        .write("inputs/level1/t1_input.xml", "<doc/>")
        .write("inputs/level1/t1_queries.txt", "1 2\n");

    let err = evaluate(&ws.paths(), &ws.config("g++=/bin/sh\ntimeout=1"))
        .await
        .unwrap_err();

    match err {
        EvalError::Build { stderr } => assert!(stderr.contains("timed out after 1s"), "{stderr}"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!ws.path(REPORT_FILE).exists());
}
