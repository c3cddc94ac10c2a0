mod hierarchy;

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::{json, Value};

pub(crate) fn veil(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("veil"));
    cmd.current_dir(dir.path())
        .env_remove("VEIL_CONFIG_PATH")
        .env_remove("RUST_LOG");
    cmd
}

pub(crate) fn class(name: &str, super_class: &str, methods: &[&str]) -> Value {
    json!({
        "internal_name": name,
        "access_flags": 1,
        "super_class": super_class,
        "methods": methods
            .iter()
            .map(|m| {
                let (name, descriptor) = m.split_at(m.find('(').unwrap());
                json!({ "access_flags": 1, "name": name, "descriptor": descriptor })
            })
            .collect::<Vec<_>>(),
    })
}

pub(crate) fn write_program(dir: &TempDir, file: &str, classes: &[Value]) {
    dir.child(file)
        .write_str(&serde_json::to_string_pretty(classes).unwrap())
        .unwrap();
}

#[test]
fn help_mentions_every_command() {
    let dir = TempDir::new().unwrap();
    veil(&dir).arg("--help").assert().success().stdout(
        predicate::str::contains("remap")
            .and(predicate::str::contains("hierarchy"))
            .and(predicate::str::contains("schema")),
    );
}

#[test]
fn schema_prints_the_config_schema() {
    let dir = TempDir::new().unwrap();
    let output = veil(&dir).arg("schema").output().unwrap();
    assert!(output.status.success());

    let schema: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(schema["properties"]["rename"].is_object());
    assert!(schema["properties"]["keep"].is_object());
}

#[test]
fn broken_config_exits_with_status_2() {
    let dir = TempDir::new().unwrap();
    dir.child("veil.toml")
        .write_str("[rename]\nclases = false\n")
        .unwrap();
    write_program(&dir, "program.json", &[]);

    veil(&dir)
        .args(["remap", "--program", "program.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("error:").and(predicate::str::contains("clases")));
}
