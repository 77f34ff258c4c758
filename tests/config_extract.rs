mod common;

use std::io::Write;

use common::{set, toml_doc};
use pipedag::config::{extract_steps, load_and_validate, load_from_path};
use pipedag::errors::PipelineError;
use pipedag::types::{StepKind, StepState};
use tempfile::NamedTempFile;

const PIPELINE: &str = r#"
[application]
name = "extract-test"

[steps.read]

[steps.events]
dependencies = ["read"]
input.translator = { type = "kafka" }

[steps.repeat]
type = "loop"
dependencies = ["read"]

[steps.write]
type = "data"
dependencies = ["events", "read"]
output = { path = "out" }
"#;

fn expect_config_error(source: &str, needle: &str) {
    match extract_steps(&toml_doc(source), true, false) {
        Err(PipelineError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_extract_step_kinds() {
    common::init_tracing();
    let steps = extract_steps(&toml_doc(PIPELINE), true, false).unwrap();

    assert_eq!(steps.len(), 4);
    assert_eq!(steps.get("read").unwrap().kind(), StepKind::Batch);
    assert_eq!(steps.get("events").unwrap().kind(), StepKind::Streaming);
    assert_eq!(steps.get("repeat").unwrap().kind(), StepKind::Loop);
    assert_eq!(steps.get("write").unwrap().kind(), StepKind::Batch);
}

#[test]
fn test_extract_keeps_config_and_dependencies() {
    let steps = extract_steps(&toml_doc(PIPELINE), true, false).unwrap();
    let write = steps.get("write").unwrap();

    assert_eq!(*write.dependency_names(), set(&["events", "read"]));
    assert_eq!(write.state(), StepState::Waiting);
    assert!(write.config().contains_key("output"));
    assert!(steps.get("read").unwrap().dependency_names().is_empty());
}

#[test]
fn test_unknown_step_type_is_config_error() {
    expect_config_error(
        r#"
[steps.odd]
type = "teleport"
"#,
        "odd",
    );
}

#[test]
fn test_malformed_dependencies_are_config_errors() {
    expect_config_error(
        r#"
[steps.a]
dependencies = "b"
"#,
        "a",
    );
    expect_config_error(
        r#"
[steps.a]
input = 3
"#,
        "a",
    );
    expect_config_error(
        r#"
[steps.a]
loader = { path = "sub.toml" }
"#,
        "a",
    );
}

#[test]
fn test_non_table_step_is_config_error() {
    assert!(matches!(
        extract_steps(&toml_doc("steps.x = 5"), true, false),
        Err(PipelineError::ConfigError(_))
    ));
}

#[test]
fn test_unknown_dependency() {
    let source = r#"
[steps.a]
dependencies = ["ghost"]
"#;
    expect_config_error(source, "ghost");

    // Loaded sub-pipelines may point at steps of the enclosing pipeline.
    let loaded = extract_steps(&toml_doc(source), true, true).unwrap();
    assert_eq!(*loaded.get("a").unwrap().dependency_names(), set(&["ghost"]));

    // Without validation nothing is checked.
    assert!(extract_steps(&toml_doc(source), false, false).is_ok());
}

#[test]
fn test_self_dependency_is_config_error() {
    expect_config_error(
        r#"
[steps.a]
dependencies = ["a"]
"#,
        "itself",
    );
}

#[test]
fn test_cycle_is_detected() {
    let result = extract_steps(
        &toml_doc(
            r#"
[steps.a]
dependencies = ["c"]
[steps.b]
dependencies = ["a"]
[steps.c]
dependencies = ["b"]
"#,
        ),
        true,
        false,
    );
    assert!(matches!(result, Err(PipelineError::DagCycle(_))));
}

#[test]
fn test_empty_document_has_no_steps() {
    let steps = extract_steps(&toml_doc(""), true, false).unwrap();
    assert!(steps.is_empty());
}

#[test]
fn test_load_and_validate_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PIPELINE.as_bytes()).unwrap();

    let pipeline = load_and_validate(file.path()).unwrap();

    assert_eq!(pipeline.steps.len(), 4);
    assert!(pipeline.document.contains_key("application"));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_from_path(dir.path().join("missing.toml"));
    assert!(matches!(result, Err(PipelineError::IoError(_))));
}

#[test]
fn test_load_invalid_toml_is_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[steps.a\ndependencies = ").unwrap();

    let result = load_and_validate(file.path());
    assert!(matches!(result, Err(PipelineError::TomlError(_))));
}

#[test]
fn test_document_loader_table_fills_step_loaders() {
    let steps = extract_steps(
        &toml_doc(
            r#"
[loader]
type = "file"
path = "default.toml"

[steps.plain]

[steps.defaulted]
loader = { path = "sub.toml" }

[steps.explicit]
loader = { type = "testing" }
"#,
        ),
        true,
        false,
    )
    .unwrap();

    assert!(steps.get("plain").unwrap().loader_config().is_none());

    let defaulted = steps.get("defaulted").unwrap().loader_config().unwrap();
    assert_eq!(defaulted["type"].as_str(), Some("file"));
    assert_eq!(defaulted["path"].as_str(), Some("sub.toml"));

    let explicit = steps.get("explicit").unwrap().loader_config().unwrap();
    assert_eq!(explicit["type"].as_str(), Some("testing"));
    assert_eq!(explicit["path"].as_str(), Some("default.toml"));
}
