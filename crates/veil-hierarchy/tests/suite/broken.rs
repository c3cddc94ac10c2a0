use veil_hierarchy::{Diagnostic, HierarchyMode, Origin, Severity};

use super::{analyze, class, method};

#[test]
fn missing_superclass_taints_its_subtree() {
    let (graph, diagnostics) = analyze(
        vec![
            class("app/Z").extends("lib/Missing").method("m", "()V").build(),
            class("app/Y").extends("app/Z").method("m", "()V").build(),
            class("app/Fine").method("m", "()V").build(),
        ],
        HierarchyMode::Full,
    );

    let missing = graph.class_by_name("lib/Missing").unwrap();
    assert_eq!(missing.origin(), Origin::Missing);
    assert!(missing.parents().is_empty());
    assert!(graph.class_by_name("app/Z").unwrap().depends_on_missing());
    assert!(graph.class_by_name("app/Y").unwrap().depends_on_missing());
    assert!(!graph.class_by_name("app/Fine").unwrap().is_tainted());

    // Members of tainted classes are never trusted as sources of anything else.
    let y = method(&graph, "app/Y", "m", "()V");
    assert!(graph.is_source(y));

    assert_eq!(
        diagnostics.to_vec(),
        vec![Diagnostic::MissingDependency {
            class: "lib/Missing".into(),
            required_by: vec!["app/Z".into()],
        }]
    );
    assert_eq!(diagnostics.count(Severity::Warning), 1);
}

#[test]
fn missing_interface_is_reported_once_per_dependent() {
    let (_, diagnostics) = analyze(
        vec![
            class("app/A").implements(&["lib/Gone"]).build(),
            class("app/B").implements(&["lib/Gone"]).build(),
        ],
        HierarchyMode::Fast,
    );

    let required_by: Vec<&str> = diagnostics.missing()["lib/Gone"]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(required_by, vec!["app/A", "app/B"]);
}

#[test]
fn cyclic_hierarchy_is_reported_and_tainted() {
    let (graph, diagnostics) = analyze(
        vec![
            class("app/A").extends("app/B").method("m", "()V").build(),
            class("app/B").extends("app/A").method("m", "()V").build(),
        ],
        HierarchyMode::Full,
    );

    assert!(graph.class_by_name("app/A").unwrap().is_tainted());
    assert!(graph.class_by_name("app/B").unwrap().is_tainted());
    assert!(diagnostics
        .to_vec()
        .iter()
        .any(|d| matches!(d, Diagnostic::CyclicHierarchy { .. })));
    assert!(diagnostics.has_errors());
}
