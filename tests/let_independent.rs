use wsj::{FailureKind, Interpreter};

#[test]
fn binds_each_name_to_its_expression() {
    let mut interp = Interpreter::new();
    let output = interp
        .run("let a = 1, b = 2; say(a); say(b);")
        .expect("run");
    assert_eq!(output, "1\n2\n");
}

#[test]
fn right_hand_sides_evaluate_left_to_right() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "fn probe(n) { say(n); return n; }\n\
             let a = probe(1), b = probe(2), c = probe(3);\n\
             say(a + b + c);",
        )
        .expect("run");
    assert_eq!(output, "1\n2\n3\n6\n");
}

#[test]
fn later_expressions_do_not_see_names_from_same_statement() {
    let mut interp = Interpreter::new();
    let err = interp.run("let a = 1, b = a + 1;").unwrap_err();
    assert!(err.message.contains("undefined variable 'a'"));
}

#[test]
fn duplicate_identifier_in_one_statement() {
    let mut interp = Interpreter::new();
    let err = interp.run("let x = 1, x = 2;").unwrap_err();
    assert_eq!(err.kind, Some(FailureKind::DuplicateIdentifier("x".to_string())));
    assert!(err.message.contains("'x'"));
    assert!(!err.is_syntax());
}

#[test]
fn redeclaration_in_same_scope_fails() {
    let mut interp = Interpreter::new();
    interp.run("let x = 1;").expect("first declaration");
    let err = interp.run("let x = 2;").unwrap_err();
    assert_eq!(
        err.kind,
        Some(FailureKind::RedeclarationInScope("x".to_string()))
    );
    // The original binding survives.
    let output = interp.run("say(x);").expect("run");
    assert_eq!(output, "1\n");
}

#[test]
fn nested_scope_shadows_and_outer_binding_survives() {
    let mut interp = Interpreter::new();
    let output = interp
        .run("let x = 1; { let x = 2; say(x); } say(x);")
        .expect("run");
    assert_eq!(output, "2\n1\n");
}

#[test]
fn failed_statement_binds_nothing() {
    let mut interp = Interpreter::new();
    let err = interp.run("let a = 1, b = nope();").unwrap_err();
    assert!(err.message.contains("unknown function 'nope'"));
    let err = interp.run("say(a);").unwrap_err();
    assert!(err.message.contains("undefined variable 'a'"));
}
