use wsj::Interpreter;

#[test]
fn while_loop_assigns_outer_bindings() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "let i = 0; let total = 0;\n\
             while i < 5 { i = i + 1; total = total + i; }\n\
             say(total);",
        )
        .expect("run");
    assert_eq!(output, "15\n");
}

#[test]
fn for_loop_iterates_arrays_in_a_fresh_frame() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "let total = 0;\n\
             for n in [1, 2, 3] { total = total + n; }\n\
             say(total);",
        )
        .expect("run");
    assert_eq!(output, "6\n");
    // The loop variable does not leak.
    let err = interp.run("say(n);").unwrap_err();
    assert!(err.message.contains("undefined variable 'n'"));
}

#[test]
fn function_body_sees_globals_but_not_caller_locals() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "let g = 10;\n\
             fn f() { return g + 1; }\n\
             { let local = 5; say(f()); }",
        )
        .expect("run");
    assert_eq!(output, "11\n");

    let err = interp
        .run("fn h() { return hidden; }\n{ let hidden = 1; say(h()); }")
        .unwrap_err();
    assert!(err.message.contains("undefined variable 'hidden'"));
}

#[test]
fn recursion_works() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "fn fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); }\n\
             say(fib(10));",
        )
        .expect("run");
    assert_eq!(output, "55\n");
}

#[test]
fn inconsistent_return_counts_fail_at_definition() {
    let mut interp = Interpreter::new();
    let err = interp
        .run("fn bad(x) { if x { return 1; } return 2, 3; }")
        .unwrap_err();
    assert!(err.message.contains("fixed number of values"));
    assert!(err.message.contains("bad"));
}

#[test]
fn redefining_a_builtin_fails() {
    let mut interp = Interpreter::new();
    let err = interp.run("fn load(p) { return 1; }").unwrap_err();
    assert!(err.message.contains("cannot redefine built-in function 'load'"));
    assert_eq!(err.line, Some(1));
    // Matching the built-in's return arity does not make it legal either.
    let err = interp.run("fn say(x) { return x; }").unwrap_err();
    assert!(err.message.contains("cannot redefine built-in function 'say'"));
    // The built-in still answers calls.
    let output = interp.run("say(7);").expect("run");
    assert_eq!(output, "7\n");
}

#[test]
fn same_arity_redefinition_is_accepted() {
    let mut interp = Interpreter::new();
    let output = interp
        .run(
            "fn f() { return 1; }\n\
             fn f() { return 2; }\n\
             say(f());",
        )
        .expect("run");
    assert_eq!(output, "2\n");
}

#[test]
fn wrong_argument_count_is_reported() {
    let mut interp = Interpreter::new();
    let err = interp
        .run("fn one(a) { return a; } one(1, 2);")
        .unwrap_err();
    assert!(err.message.contains("one expects 1 argument(s), got 2"));
}

#[test]
fn body_without_return_yields_one_nil() {
    let mut interp = Interpreter::new();
    let output = interp
        .run("fn quiet() { let x = 1; } say(quiet());")
        .expect("run");
    assert_eq!(output, "nil\n");
}
