use wsj::{FailureKind, Interpreter};

#[test]
fn call_result_binds_positionally() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "fn getCoordinates() { return 10, 20; }\n\
             let x, y = getCoordinates();\n\
             say(x); say(y);",
        )
        .expect("run");
    assert_eq!(output, "10\n20\n");
}

#[test]
fn arity_mismatch_carries_both_counts_and_callee() {
    let mut interp = Interpreter::new();
    interp
        .run("fn getCoordinates() { return 10, 20; }")
        .expect("define");
    let err = interp.run("let x, y, z = getCoordinates();").unwrap_err();
    assert_eq!(
        err.kind,
        Some(FailureKind::ArityMismatch {
            want: 3,
            got: 2,
            callee: Some("getCoordinates".to_string()),
        })
    );
    assert!(err.message.contains("getCoordinates"));
    assert!(err.message.contains("2 values"));
    assert!(err.message.contains("3 names"));
    assert!(err.message.starts_with("line "));
    assert!(!err.message.contains('\n'));
    // No identifier was bound.
    let err = interp.run("say(z);").unwrap_err();
    assert!(err.message.contains("undefined variable 'z'"));
}

#[test]
fn non_call_expression_fails_from_observed_length() {
    let mut interp = Interpreter::new();
    let err = interp.run("let x, y = 5;").unwrap_err();
    assert_eq!(
        err.kind,
        Some(FailureKind::ArityMismatch {
            want: 2,
            got: 1,
            callee: None,
        })
    );
}

#[test]
fn load_builtin_end_to_end() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "let map, err = load(\"region1.wxx\");\n\
             say(err);\n\
             say(map);\n\
             let w, h = size(map);\n\
             say(w * h);",
        )
        .expect("run");
    assert_eq!(output, "nil\nMap(region1.wxx 30x20)\n600\n");
}

#[test]
fn load_reports_unsupported_format_as_second_value() {
    let mut interp = Interpreter::new();
    let output = interp
        .run("let doc, err = load(\"region1.png\"); say(doc); say(err);")
        .expect("run");
    assert_eq!(output, "nil\nunsupported map format: region1.png\n");
}

#[test]
fn map_document_round_trip_through_builtins() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "let map, err = load(\"a.wxx\");\n\
             say(terrainAt(map, 0, 0));\n\
             say(save(map, \"b.wxx\"));",
        )
        .expect("run");
    assert_eq!(output, "Grass\ntrue\n");
}

#[test]
fn static_registry_check_rejects_wrong_count_against_builtin() {
    let mut interp = Interpreter::new();
    let err = interp.run("let a, b, c = load(\"region1.wxx\");").unwrap_err();
    assert_eq!(
        err.kind,
        Some(FailureKind::ArityMismatch {
            want: 3,
            got: 2,
            callee: Some("load".to_string()),
        })
    );
}
