use pretty_assertions::assert_eq;
use veil_hierarchy::Diagnostic;
use veil_remap::{
    remap, DictionaryGenerator, KeepRuleSpec, KeepRules, RemapContext, RemapError, RemapOptions,
};

use super::{
    assert_no_collisions, class, context, interface, members_only, run, ABSTRACT, PUBLIC,
};

#[test]
fn override_chain_is_one_family_with_one_name() {
    let output = run(
        vec![
            class("app/A").method("foo", "()V").build(),
            class("app/B").extends("app/A").method("foo", "()V").build(),
        ],
        RemapOptions::default(),
    );

    let entries: Vec<(&str, &str)> = output.mapping.iter().collect();
    assert_eq!(
        entries,
        vec![
            ("app/A", "app/a"),
            ("app/A.foo()V", "a"),
            ("app/B", "app/b"),
            ("app/B.foo()V", "a"),
        ]
    );
    assert!(output.diagnostics.is_empty());
    assert_no_collisions(&output, false);
}

#[test]
fn interfaces_converging_in_one_class_share_a_name() {
    let output = run(
        vec![
            interface("app/I1").method_with(ABSTRACT, "m", "()V", vec![]).build(),
            interface("app/I2").method_with(ABSTRACT, "m", "()V", vec![]).build(),
            class("app/C")
                .implements(&["app/I1", "app/I2"])
                .method("m", "()V")
                .build(),
        ],
        members_only(),
    );

    let i1 = output.mapping.get("app/I1.m()V").unwrap();
    assert_eq!(output.mapping.get("app/I2.m()V"), Some(i1));
    assert_eq!(output.mapping.get("app/C.m()V"), Some(i1));
}

#[test]
fn chained_three_interface_convergence_shares_a_name() {
    let output = run(
        vec![
            interface("app/I1").method_with(ABSTRACT, "m", "()V", vec![]).build(),
            interface("app/I2").method_with(ABSTRACT, "m", "()V", vec![]).build(),
            interface("app/I3").method_with(ABSTRACT, "m", "()V", vec![]).build(),
            class("app/X")
                .implements(&["app/I1", "app/I2"])
                .method("m", "()V")
                .build(),
            class("app/Y")
                .implements(&["app/I2", "app/I3"])
                .method("m", "()V")
                .build(),
        ],
        members_only(),
    );

    let names: Vec<&str> = ["app/I1", "app/I2", "app/I3", "app/X", "app/Y"]
        .iter()
        .map(|owner| output.mapping.get(&format!("{owner}.m()V")).unwrap())
        .collect();
    assert!(names.iter().all(|name| *name == names[0]), "{names:?}");
}

#[test]
fn inherited_implementation_keeps_both_contracts() {
    // Base.m only implements I.m through C, so all three must agree.
    let output = run(
        vec![
            class("app/Base").method("m", "()V").build(),
            interface("app/I").method_with(ABSTRACT, "m", "()V", vec![]).build(),
            class("app/C").extends("app/Base").implements(&["app/I"]).build(),
        ],
        members_only(),
    );

    let base = output.mapping.get("app/Base.m()V").unwrap();
    assert_eq!(output.mapping.get("app/I.m()V"), Some(base));
    assert_eq!(output.mapping.get("app/C.m()V"), Some(base));
}

#[test]
fn classes_depending_on_missing_types_are_left_alone() {
    let output = run(
        vec![
            class("app/Z")
                .extends("lib/Missing")
                .method("m", "()V")
                .field("f", "I")
                .build(),
            class("app/Y").method("m", "()V").build(),
        ],
        RemapOptions::default(),
    );

    assert!(
        output
            .mapping
            .iter()
            .all(|(key, value)| !key.starts_with("app/Z") && !value.starts_with("app/Z")),
        "{}",
        output.mapping.to_text()
    );
    assert!(output.mapping.contains_key("app/Y"));
    assert!(output.mapping.contains_key("app/Y.m()V"));

    let diagnostics = output.diagnostics.to_vec();
    assert_eq!(
        diagnostics[0],
        Diagnostic::MissingDependency {
            class: "lib/Missing".into(),
            required_by: vec!["app/Z".into()],
        }
    );
    let skipped: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::SkippedFamily { .. }))
        .collect();
    assert_eq!(skipped.len(), 2);
}

#[test]
fn family_reaching_into_a_tainted_subclass_is_skipped() {
    let output = run(
        vec![
            class("app/Base").method("run", "()V").build(),
            class("app/Broken")
                .extends("app/Base")
                .implements(&["lib/Gone"])
                .method("run", "()V")
                .build(),
        ],
        RemapOptions::default(),
    );

    assert!(!output.mapping.contains_key("app/Base.run()V"));
    assert!(output.mapping.contains_key("app/Base"));
    assert!(!output.mapping.contains_key("app/Broken"));
    assert!(output.diagnostics.to_vec().iter().any(|d| matches!(
        d,
        Diagnostic::SkippedFamily { tainted, .. } if tainted == &vec!["app/Broken".to_string()]
    )));
}

#[test]
fn kept_names_block_the_whole_name_by_default() {
    let program = || {
        vec![class("app/K")
            .method("a", "()V")
            .method("b", "(I)V")
            .method("c", "()V")
            .build()]
    };
    let keep = KeepRules::new(&[KeepRuleSpec {
        class: "app/K".into(),
        member: Some("a".into()),
        members: false,
    }])
    .unwrap();

    let output = remap(context(program(), members_only()).with_keep_rules(keep.clone())).unwrap();
    assert!(!output.mapping.contains_key("app/K.a()V"));
    assert_eq!(output.mapping.get("app/K.b(I)V"), Some("b"));
    assert_eq!(output.mapping.get("app/K.c()V"), Some("c"));
    assert_no_collisions(&output, false);

    let sharing = RemapOptions {
        share_overloads: true,
        ..members_only()
    };
    let output = remap(context(program(), sharing).with_keep_rules(keep)).unwrap();
    assert_eq!(output.mapping.get("app/K.b(I)V"), Some("a"));
    assert_eq!(output.mapping.get("app/K.c()V"), Some("b"));
    assert_no_collisions(&output, true);
}

#[test]
fn generated_names_do_not_override_inherited_members() {
    // Sub.x must not become `a`, or it would override Base.a.
    let output = run(
        vec![
            class("app/Base").method("a", "()V").build(),
            class("app/Sub").extends("app/Base").method("x", "()V").build(),
        ],
        members_only(),
    );

    let base = output.mapping.get("app/Base.a()V").unwrap();
    let sub = output.mapping.get("app/Sub.x()V").unwrap();
    assert_ne!(base, sub);
}

#[test]
fn fields_and_methods_have_separate_namespaces() {
    let output = run(
        vec![class("app/A").field("count", "I").method("size", "()I").build()],
        members_only(),
    );
    assert_eq!(output.mapping.get("app/A.count(I)"), Some("a"));
    assert_eq!(output.mapping.get("app/A.size()I"), Some("a"));
}

#[test]
fn exhausted_dictionary_aborts_the_run() {
    let program = vec![class("app/A")
        .method("one", "()V")
        .method_with(PUBLIC, "two", "()V", vec![])
        .build()];
    let context = RemapContext::new(
        program.into_iter().collect(),
        DictionaryGenerator::new(["x"]),
    )
    .with_platform(veil_jdk::JdkIndex::new())
    .with_options(members_only());

    let err = remap(context).unwrap_err();
    assert!(matches!(err, RemapError::DictionaryExhausted { attempts: 1, .. }), "{err}");
    assert!(err.to_string().starts_with("dictionary exhausted"));
}
