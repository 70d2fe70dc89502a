use jcheck::config::keys;
use jcheck::{CompileSession, Config, Severity};

fn check(src: &str, config: Config) -> Vec<(Severity, String)> {
    let mut session = CompileSession::new(config);
    session.add_source("X.java", src);
    let result = session.compile().expect("expected a completed session");
    result.diagnostics().map(|d| (d.severity, d.message.clone())).collect()
}
fn messages(src: &str) -> Vec<String> { check(src, Config::default()).into_iter().map(|(_, m)| m).collect() }
fn ok(src: &str) { let m = messages(src); assert!(m.is_empty(), "{m:?}"); }

// Statements after a return are reported once
#[test]
fn statement_after_return() {
    assert_eq!(messages(r#"class X { void foo() { return; int x = 1; x++; } }"#), vec!["Unreachable code"]);
}

// `while (false)` never enters its body
#[test]
fn while_false_body() {
    assert_eq!(messages(r#"class X { void foo() { while (false) { foo(); } } }"#), vec!["Unreachable code"]);
}

// `for (;false;)` never enters its body
#[test]
fn for_false_body() {
    assert_eq!(messages(r#"class X { void foo() { for (;false;) { foo(); } } }"#), vec!["Unreachable code"]);
}

// An endless loop without breaks does not complete
#[test]
fn statement_after_endless_loop() {
    assert_eq!(messages(r#"class X { void foo() { for (;;) { } foo(); } }"#), vec!["Unreachable code"]);
}

// A break makes the statement after the loop reachable
#[test]
fn endless_loop_with_break() {
    ok(r#"class X { void foo(boolean b) { while (true) { if (b) break; } foo(b); } }"#);
}

// Labeled breaks leave the labeled statement
#[test]
fn labeled_break_leaves_outer_loop() {
    ok(r#"class X { void foo(int n) { outer: for (;;) { for (;;) { if (n > 0) break outer; } } foo(n); } }"#);
}

// A constant false condition excludes the then branch
#[test]
fn if_false_is_dead_code() {
    let found = check(r#"class X { int foo() { if (false) { return 1; } return 0; } }"#, Config::default());
    assert_eq!(found, vec![(Severity::Warning, "Dead code".to_string())]);
}

// Dead code severity follows the configuration
#[test]
fn dead_code_can_be_ignored() {
    let config = Config::default().with_severity(keys::DEAD_CODE, Severity::Ignore);
    assert!(check(r#"class X { int foo() { if (false) { return 1; } return 0; } }"#, config).is_empty());
}

// The right operand of `true || x` is dead
#[test]
fn right_operand_of_true_or() {
    let found = messages(r#"class X { boolean foo(boolean b) { return true || b; } }"#);
    assert_eq!(found, vec!["Dead code"]);
}

// A condition that is just a constant name is not reported by default
#[test]
fn trivial_if_on_constant_name() {
    let src = r#"class X { static final boolean DEBUG = false; void foo() { if (DEBUG) { foo(); } } }"#;
    assert!(check(src, Config::default()).is_empty());
    let found = check(src, Config::default().with_dead_code_in_trivial_if(true));
    assert_eq!(found, vec![(Severity::Warning, "Dead code".to_string())]);
}

// A negated literal is not a trivial condition
#[test]
fn negated_literal_is_reported() {
    let found = messages(r#"class X { void foo() { if (!true) { foo(); } } }"#);
    assert_eq!(found, vec!["Dead code"]);
}

// Finally blocks that complete let the try block's return through
#[test]
fn return_through_finally() {
    assert_eq!(
        messages(r#"class X { int foo() { try { return 1; } finally { foo(); } foo(); } }"#),
        vec!["Unreachable code"]
    );
}

// A switch case falls through to the next one
#[test]
fn switch_fallthrough_is_reachable() {
    ok(r#"class X { int foo(int k) { int v = 0; switch (k) { case 1: v = 1; case 2: v = v + 1; break; default: v = 3; } return v; } }"#);
}
