use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::{json, Value};

use super::{class, veil, write_program};

fn shapes(dir: &TempDir) {
    let mut shape = class("app/Shape", "java/lang/Object", &[]);
    shape["access_flags"] = json!(0x0601);
    let mut circle = class("app/Circle", "app/Base", &[]);
    circle["interfaces"] = json!(["app/Shape"]);
    write_program(
        dir,
        "program.json",
        &[
            shape,
            class("app/Base", "java/lang/Object", &[]),
            circle,
            class("app/Square", "app/Base", &[]),
        ],
    );
}

#[test]
fn reports_ancestors_descendants_and_common_ancestor() {
    let dir = TempDir::new().unwrap();
    shapes(&dir);

    let output = veil(&dir)
        .args([
            "hierarchy",
            "--program",
            "program.json",
            "app/Circle",
            "--common-with",
            "app/Square",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["origin"], "program");
    assert_eq!(report["interface"], false);
    assert_eq!(
        report["ancestors"],
        json!(["app/Base", "app/Shape", "java/lang/Object"])
    );
    assert_eq!(report["descendants"], json!([]));
    assert_eq!(report["common_ancestor"]["ancestor"], "app/Base");
}

#[test]
fn unrelated_interfaces_have_no_common_ancestor() {
    let dir = TempDir::new().unwrap();
    shapes(&dir);

    veil(&dir)
        .args([
            "hierarchy",
            "--program",
            "program.json",
            "app/Shape",
            "--common-with",
            "java/lang/Runnable",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("interface app/Shape (Program)")
                .and(predicate::str::contains("descendants: app/Circle"))
                .and(predicate::str::contains(
                    "common ancestor with java/lang/Runnable: (none)",
                )),
        );
}

#[test]
fn unresolvable_classes_exit_with_status_2() {
    let dir = TempDir::new().unwrap();
    shapes(&dir);

    veil(&dir)
        .args(["hierarchy", "--program", "program.json", "app/Nowhere"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "class app/Nowhere could not be resolved by any provider",
        ));
}
