use lantern_lang::{evaluate_program, EvalOptions, Environment, Lexer, Parser};

fn inspect(source: &str) -> String {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "unexpected parse errors for {source:?}: {:?}",
        parser.errors()
    );
    let env = Environment::new_global();
    evaluate_program(&program, &env, EvalOptions::default()).inspect()
}

#[test]
fn let_bindings_chain_through_identifiers() {
    assert_eq!(inspect("let x = 5; let y = x + 10; y;"), "15");
}

#[test]
fn calling_a_two_argument_function() {
    assert_eq!(inspect("let add = fn(a, b) { a + b }; add(2, 3);"), "5");
}

#[test]
fn a_function_returning_a_function_curries() {
    assert_eq!(
        inspect("let f = fn(x) { fn(y) { x + y } }; f(3)(4);"),
        "7"
    );
}

#[test]
fn if_expression_takes_the_truthy_branch() {
    assert_eq!(inspect("if (1 < 2) { 10 } else { 20 };"), "10");
}

#[test]
fn recursive_factorial_of_five() {
    let src = "let fact = fn(n) { if (n < 2) { 1 } else { n * fact(n - 1) } }; fact(5);";
    assert_eq!(inspect(src), "120");
}

#[test]
fn boolean_comparison_by_value() {
    assert_eq!(inspect("true == false;"), "false");
}

#[test]
fn unbound_identifier_is_an_inspectable_error() {
    assert_eq!(inspect("foo;"), "ERROR: identifier not found: foo");
}

#[test]
fn mixed_type_arithmetic_is_a_type_mismatch_error() {
    assert_eq!(inspect("5 + true;"), "ERROR: type mismatch: INTEGER + BOOLEAN");
}
