//! End-to-end contextualization scenarios
//!
//! Each test lays out generated files (and optionally `.map` sidecars) in a
//! temp directory, drives the full pipeline from a rendered stack string,
//! and checks the written artifact.

use std::fs;
use std::path::Path;
use tracelight::frame::{AugmentedStackTrace, RawFrame};
use tracelight::{CaughtError, CodeContext, ContextualizeOptions, Contextualizer, ErrorReport, InitOptions};

const BOOM_JS: &str = "function boom() {\n  throw new Error('boom');\n}\n";
const BOOM_TS: &str = "function boom(): never {\n  throw new Error('boom');\n}\n";

// Identity line mapping for three lines, column 0, a.js -> a.ts.
const BOOM_MAP: &str = r#"{"version": 3, "file": "a.js", "sources": ["a.ts"], "names": [], "mappings": "AAAA;AACA;AACA"}"#;

fn contextualizer() -> Contextualizer {
    Contextualizer::initialize(InitOptions {
        enable_server: false,
        ..InitOptions::default()
    })
}

fn read_artifact(path: &Path) -> Vec<CodeContext> {
    let raw = fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

async fn run(caught: &CaughtError, output: &Path) {
    contextualizer()
        .contextualize_error(caught, &ContextualizeOptions {
            output_file: output.to_string_lossy().into_owned(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn single_top_level_function_without_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let generated = dir.path().join("a.js");
    fs::write(&generated, BOOM_JS).unwrap();

    let ctx = contextualizer();
    let caught = ctx.capture(ErrorReport {
        name: Some("Error".into()),
        message: Some("boom".into()),
        stack: Some(format!("Error: boom\n    at boom ({}:2:9)", generated.display())),
        ..ErrorReport::default()
    });

    let output = dir.path().join("error-context.json");
    run(&caught, &output).await;

    let records = read_artifact(&output);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.stack_index, 0);
    assert_eq!(record.generated_file_name, generated.to_string_lossy());
    assert_eq!(record.generated_line_number, 2);
    assert_eq!(record.generated_caller_line, "throw new Error('boom');");
    assert_eq!(
        record.generated_closure.as_deref(),
        Some("function boom() {\n  throw new Error('boom');\n}")
    );
    assert_eq!(record.error_message.as_deref(), Some("boom"));
    assert_eq!(record.error_message_stack.as_deref(), Some("Error: boom"));
    assert_eq!(record.generated_error_line_number, Some(2));
    assert!(record.generated_error_closure.is_some());

    // No sidecar: the whole original-source group is absent.
    assert!(record.original_file_name.is_none());
    assert!(record.original_file.is_none());
    assert!(record.original_line_number.is_none());
    assert!(record.original_caller_line.is_none());
    assert!(record.original_closure.is_none());
    assert!(record.original_section.is_none());
}

#[tokio::test]
async fn sidecar_resolves_the_original_source_group() {
    let dir = tempfile::tempdir().unwrap();
    let generated = dir.path().join("a.js");
    fs::write(&generated, BOOM_JS).unwrap();
    fs::write(dir.path().join("a.js.map"), BOOM_MAP).unwrap();
    fs::write(dir.path().join("a.ts"), BOOM_TS).unwrap();

    let ctx = contextualizer();
    let caught = ctx.capture(ErrorReport {
        name: Some("Error".into()),
        message: Some("boom".into()),
        stack: Some(format!("Error: boom\n    at boom ({}:2:9)", generated.display())),
        ..ErrorReport::default()
    });

    let output = dir.path().join("ctx.json");
    run(&caught, &output).await;

    let records = read_artifact(&output);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.original_file_name.as_deref(), Some("a.ts"));
    assert_eq!(record.original_line_number, Some(2));
    assert_eq!(record.original_file.as_deref(), Some(BOOM_TS));
    assert_eq!(record.original_caller_line.as_deref(), Some("throw new Error('boom');"));
    let original_closure = record.original_closure.as_deref().unwrap();
    assert!(original_closure.contains("function boom(): never {"));
    assert!(record.original_error_line_number.is_some());
    assert!(record.original_error_closure.is_some());
}

#[tokio::test]
async fn dependency_internals_and_runtime_frames_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app.js");
    fs::write(&app, "function handler() {\n  boom();\n}\n").unwrap();
    let dep_dir = dir.path().join("node_modules/express/lib");
    fs::create_dir_all(&dep_dir).unwrap();
    let dep = dep_dir.join("router.js");
    fs::write(&dep, "function dispatch() {\n  next();\n}\n").unwrap();
    let dep_internal = dep_dir.join("layer.js");
    fs::write(&dep_internal, "function next() {\n  call();\n}\n").unwrap();

    let stack = format!(
        "Error: x\n    at handler ({}:2:3)\n    at dispatch ({}:2:3)\n    at next ({}:2:3)\n    at processTicksAndRejections (node:internal/process/task_queues:95:5)",
        app.display(),
        dep.display(),
        dep_internal.display()
    );

    let ctx = contextualizer();
    let caught = ctx.capture(ErrorReport {
        message: Some("x".into()),
        stack: Some(stack),
        ..ErrorReport::default()
    });

    let output = dir.path().join("ctx.json");
    run(&caught, &output).await;

    let records = read_artifact(&output);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].stack_index, 0);
    assert_eq!(records[0].generated_file_name, app.to_string_lossy());
    assert_eq!(records[1].stack_index, 1);
    assert_eq!(records[1].generated_file_name, dep.to_string_lossy());
    // Only the origin frame carries error-site fields.
    assert!(records[0].error_message.is_some());
    assert!(records[1].error_message.is_none());
    assert!(records[1].generated_error_line_number.is_none());
}

#[tokio::test]
async fn incomplete_frames_are_omitted_not_padded() {
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app.js");
    fs::write(&app, "function handler() {\n  boom();\n}\n").unwrap();

    let complete = RawFrame {
        file_name: Some(app.to_string_lossy().into_owned()),
        line_number: Some(2),
        column_number: Some(2),
        ..RawFrame::default()
    };
    let incomplete = RawFrame {
        file_name: Some(app.to_string_lossy().into_owned()),
        line_number: Some(1),
        column_number: None,
        ..RawFrame::default()
    };
    let trace = AugmentedStackTrace::from_frames(None, vec![complete, incomplete]);
    let caught = CaughtError {
        report: ErrorReport {
            message: Some("x".into()),
            ..ErrorReport::default()
        },
        trace: Some(trace),
    };

    let output = dir.path().join("ctx.json");
    run(&caught, &output).await;

    let records = read_artifact(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stack_index, 0);
}

#[tokio::test]
async fn without_any_usable_trace_nothing_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("ctx.json");

    let uninitialized = Contextualizer::uninitialized();
    let caught = CaughtError {
        report: ErrorReport {
            message: Some("x".into()),
            stack: Some("Error: x\n    at f (/srv/a.js:1:1)".into()),
            ..ErrorReport::default()
        },
        trace: None,
    };

    uninitialized
        .contextualize_error(&caught, &ContextualizeOptions {
            output_file: output.to_string_lossy().into_owned(),
        })
        .await
        .unwrap();

    assert!(!output.exists());
}

#[tokio::test]
async fn unreadable_generated_file_skips_the_frame_only() {
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app.js");
    fs::write(&app, "function handler() {\n  boom();\n}\n").unwrap();
    let missing = dir.path().join("gone.js");

    let stack = format!(
        "Error: x\n    at gone ({}:1:1)\n    at handler ({}:2:3)",
        missing.display(),
        app.display()
    );
    let ctx = contextualizer();
    let caught = ctx.capture(ErrorReport {
        message: Some("x".into()),
        stack: Some(stack),
        ..ErrorReport::default()
    });

    let output = dir.path().join("ctx.json");
    run(&caught, &output).await;

    let records = read_artifact(&output);
    assert_eq!(records.len(), 1);
    // The surviving frame keeps its original stack position.
    assert_eq!(records[0].stack_index, 1);
    assert_eq!(records[0].generated_file_name, app.to_string_lossy());
}
