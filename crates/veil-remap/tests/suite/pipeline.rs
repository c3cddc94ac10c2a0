use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use veil_classfile::{ClassStub, Insn, MethodInsnKind};
use veil_hierarchy::{Diagnostic, SymbolGraph};
use veil_remap::{remap, NameMapping, PipelineObserver, RemapError, RemapOptions};

use super::{assert_no_collisions, class, context, find, interface, run, ABSTRACT, PUBLIC};

#[test]
fn nested_classes_follow_their_outer_class() {
    let output = run(
        vec![
            class("app/Outer").build(),
            class("app/Outer$Inner").method("owner", "()Lapp/Outer;").build(),
            class("app/Second").build(),
        ],
        RemapOptions::default(),
    );

    assert_eq!(output.mapping.class("app/Outer"), Some("app/a"));
    assert_eq!(output.mapping.class("app/Outer$Inner"), Some("app/a$a"));
    assert_eq!(output.mapping.class("app/Second"), Some("app/b"));

    let inner = find(&output, "app/a$a");
    assert_eq!(inner.methods[0].descriptor, "()Lapp/a;");
}

#[test]
fn flattening_moves_top_level_classes_into_one_package() {
    let output = run(
        vec![
            class("app/Outer").build(),
            class("app/Outer$Inner").build(),
            class("other/Thing").build(),
        ],
        RemapOptions {
            flatten_package: Some("z".into()),
            ..RemapOptions::default()
        },
    );

    let classes: Vec<(&str, &str)> = output.mapping.classes().collect();
    assert_eq!(
        classes,
        vec![
            ("app/Outer", "z/a"),
            ("app/Outer$Inner", "z/a$a"),
            ("other/Thing", "z/b"),
        ]
    );
}

#[test]
fn flattening_leaves_packages_with_unrenamed_classes_in_place() {
    let call_helper = Insn::Method {
        kind: MethodInsnKind::Virtual,
        owner: "p/Z".into(),
        name: "helper".into(),
        descriptor: "()V".into(),
        interface: false,
    };
    let output = run(
        vec![
            class("other/Thing").build(),
            class("p/User")
                .method_with(PUBLIC, "go", "()V", vec![call_helper])
                .build(),
            class("p/Z")
                .extends("lib/Missing")
                .method_with(0, "helper", "()V", vec![])
                .build(),
        ],
        RemapOptions {
            flatten_package: Some("x".into()),
            ..RemapOptions::default()
        },
    );

    let classes: Vec<(&str, &str)> = output.mapping.classes().collect();
    assert_eq!(classes, vec![("other/Thing", "x/a"), ("p/User", "p/a")]);
    assert!(output.diagnostics.to_vec().contains(&Diagnostic::UnflattenedPackage {
        package: "p".into(),
        target: "x".into(),
        anchored_by: vec!["p/Z".into()],
    }));

    // The package-private call still happens inside `p`.
    let user = find(&output, "p/a");
    assert!(matches!(
        &user.methods[0].code[0],
        Insn::Method { owner, name, .. } if owner == "p/Z" && name == "helper"
    ));
}

#[test]
fn generated_class_names_skip_existing_names() {
    let output = run(
        vec![class("app/Foo").build(), class("app/a").build()],
        RemapOptions::default(),
    );
    assert_eq!(output.mapping.class("app/Foo"), Some("app/b"));
    assert_eq!(output.mapping.class("app/a"), Some("app/c"));
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl PipelineObserver for Recorder {
    fn after_class_build(&mut self, graph: &SymbolGraph) {
        self.events
            .borrow_mut()
            .push(format!("after_class_build({})", graph.class_count()));
    }

    fn after_plan(&mut self, mapping: &NameMapping) {
        self.events
            .borrow_mut()
            .push(format!("after_plan({})", mapping.len()));
    }

    fn before_apply(&mut self, _mapping: &NameMapping, program: &[ClassStub]) {
        self.events
            .borrow_mut()
            .push(format!("before_apply({})", program.len()));
    }
}

#[test]
fn observers_see_every_stage_in_order() {
    let recorder = Recorder::default();
    let program = vec![class("app/A").method("run", "()V").build()];

    remap(context(program, RemapOptions::default()).with_observer(recorder.clone())).unwrap();

    let events = recorder.events.borrow();
    let stages: Vec<&str> = events
        .iter()
        .map(|event| event.split('(').next().unwrap())
        .collect();
    assert_eq!(
        stages,
        vec!["after_class_build", "after_class_build", "after_plan", "before_apply"]
    );
    assert_eq!(events[2], "after_plan(2)");
    assert_eq!(events[3], "before_apply(1)");
}

#[test]
fn malformed_classes_abort_before_analysis() {
    let recorder = Recorder::default();
    let program = vec![class("app/Bad").method("m", "(Q)V").build()];

    let err = remap(context(program, RemapOptions::default()).with_observer(recorder.clone()))
        .unwrap_err();

    assert!(matches!(&err, RemapError::Malformed { class, .. } if class == "app/Bad"));
    assert!(recorder.events.borrow().is_empty());
}

fn busy_program() -> Vec<ClassStub> {
    vec![
        interface("app/Shape")
            .method_with(ABSTRACT, "area", "()D", vec![])
            .method_with(ABSTRACT, "scale", "(D)Lapp/Shape;", vec![])
            .build(),
        interface("app/Named")
            .method_with(ABSTRACT, "name", "()Ljava/lang/String;", vec![])
            .build(),
        class("app/Base")
            .field("id", "I")
            .field("label", "Ljava/lang/String;")
            .method("name", "()Ljava/lang/String;")
            .method("id", "()I")
            .method("id", "(I)V")
            .build(),
        class("app/Circle")
            .extends("app/Base")
            .implements(&["app/Shape", "app/Named"])
            .field("radius", "D")
            .method("area", "()D")
            .method("scale", "(D)Lapp/Shape;")
            .method("radius", "()D")
            .method("toString", "()Ljava/lang/String;")
            .build(),
        class("app/Square")
            .extends("app/Base")
            .implements(&["app/Shape"])
            .field("side", "D")
            .method("area", "()D")
            .method("scale", "(D)Lapp/Shape;")
            .method("scale", "(I)Lapp/Shape;")
            .build(),
        class("app/Square$Builder")
            .method("side", "(D)Lapp/Square$Builder;")
            .method("build", "()Lapp/Square;")
            .build(),
    ]
}

#[test]
fn rewritten_program_has_no_member_collisions() {
    for share_overloads in [false, true] {
        let output = run(
            busy_program(),
            RemapOptions {
                share_overloads,
                ..RemapOptions::default()
            },
        );
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert_no_collisions(&output, share_overloads);

        // Circle inherits Base.name() as its implementation of Named.name().
        let named = output
            .mapping
            .get("app/Named.name()Ljava/lang/String;")
            .unwrap();
        assert_eq!(
            output.mapping.get("app/Base.name()Ljava/lang/String;"),
            Some(named)
        );

        let area = output.mapping.get("app/Shape.area()D").unwrap();
        assert_eq!(output.mapping.get("app/Circle.area()D"), Some(area));
        assert_eq!(output.mapping.get("app/Square.area()D"), Some(area));

        // Differently typed fields may share a name only in sharing mode.
        let id = output.mapping.get("app/Base.id(I)").unwrap();
        let label = output.mapping.get("app/Base.label(Ljava/lang/String;)").unwrap();
        assert_eq!(id == label, share_overloads, "id -> {id}, label -> {label}");
    }
}

#[test]
fn sequential_and_parallel_runs_agree() {
    let parallel = run(busy_program(), RemapOptions::default());
    let sequential = run(
        busy_program(),
        RemapOptions {
            parallel: false,
            ..RemapOptions::default()
        },
    );
    assert_eq!(parallel.mapping, sequential.mapping);
    assert_eq!(parallel.program, sequential.program);
}
