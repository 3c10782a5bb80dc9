//! Command-line smoke tests

mod fixtures;

use fixtures::Project;
use manifest_concat::JobSet;
use serde_json::json;
use std::process::Command;

fn manifest_concat(project: &Project) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_manifest-concat"));
    cmd.current_dir(project.root()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_resolve_json_output() {
    let project = Project::new();
    project
        .scripts(&["src/foo.js", "src/lib/b.js"])
        .manifest("src/a.json", json!({"contents": ["foo.js", {"require_directory": "lib"}]}));

    let output = manifest_concat(&project)
        .args(["resolve", "--src", "src", "--dest", "build", "--json"])
        .output()
        .expect("run binary");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let jobs = JobSet::from_json(&stdout).unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs.jobs[0].destination.ends_with("build/a.js"));
    assert_eq!(jobs.jobs[0].sources.len(), 2);
}

#[test]
fn test_resolve_writes_job_set() {
    let project = Project::new();
    project
        .scripts(&["assets/x.js"])
        .manifest("assets/site.json", json!({"contents": ["x.js"]}))
        .file("manifest-concat.toml", "src = \"assets\"\ndest = \"public\"\nsource_map = true\n");

    let status = manifest_concat(&project)
        .args(["resolve", "--out", "jobs.json"])
        .status()
        .expect("run binary");
    assert!(status.success());

    let jobs = JobSet::from_file(&project.path("jobs.json")).unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs.jobs[0].options.source_map);
}

#[test]
fn test_resolve_without_sources_fails() {
    let project = Project::new();
    let output = manifest_concat(&project)
        .args(["resolve", "--dest", "build"])
        .output()
        .expect("run binary");
    assert!(!output.status.success());
}

#[test]
fn test_explain_invalid_manifest_fails() {
    let project = Project::new();
    project.manifest("src/empty.json", json!({"contents": ["missing.js"]}));

    let output = manifest_concat(&project)
        .args(["explain", "src/empty.json", "--dest", "build"])
        .output()
        .expect("run binary");
    assert!(!output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], json!(false));
    assert_eq!(value["directives"], json!(["require missing.js"]));
}
