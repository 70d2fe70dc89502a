use jcheck::{CompileSession, Config, Diagnostic};

fn diagnostics(src: &str) -> Vec<Diagnostic> {
    let mut session = CompileSession::new(Config::default());
    session.add_source("X.java", src);
    session.compile().expect("expected a completed session").diagnostics().cloned().collect()
}
fn messages(src: &str) -> Vec<String> { diagnostics(src).into_iter().map(|d| d.message).collect() }
fn ok(src: &str) { let m = messages(src); assert!(m.is_empty(), "{m:?}"); }
fn err_contains(src: &str, needle: &str) { let m = messages(src); assert!(m.iter().any(|m| m.contains(needle)), "{m:?}"); }

// Second write to a blank final local is reported once, at the second write
#[test]
fn blank_final_local_assigned_twice() {
    let src = "class X {\n  int foo() {\n    final int v;\n    v = 1;\n    v = 2;\n    return v;\n  }\n}\n";
    let found = diagnostics(src);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].message, "The final local variable v may already have been assigned");
    assert_eq!(found[0].line, 5);
}

// One assignment per branch is fine
#[test]
fn blank_final_local_assigned_once_per_branch() {
    ok(r#"class X { int foo(boolean b) { final int v; if (b) v = 1; else v = 2; return v; } }"#);
}

// Reading a local assigned on one branch only
#[test]
fn local_read_before_definite_assignment() {
    err_contains(
        r#"class X { int foo(boolean b) { int v; if (b) v = 1; return v; } }"#,
        "The local variable v may not have been initialized",
    );
}

// Initialized final locals reject any later write
#[test]
fn compound_assignment_to_final_local() {
    err_contains(
        r#"class X { int foo() { final int v = 1; v += 2; return v; } }"#,
        "The final local variable v cannot be assigned. It must be blank and not using a compound assignment",
    );
}

// A loop body that reaches the back edge assigns more than once
#[test]
fn blank_final_assigned_in_loop() {
    err_contains(
        r#"class X { void foo(int n) { final int v; while (n > 0) { v = n; n--; } } }"#,
        "The final local variable v may already have been assigned",
    );
}

// `while (true)` exits only through its breaks
#[test]
fn assignment_before_break_is_definite() {
    ok(r#"class X { int foo() { int v; while (true) { v = 1; break; } return v; } }"#);
}

// Every case assigns and there is a default
#[test]
fn switch_with_default_assigns_definitely() {
    ok(r#"class X { int foo(int k) { int v; switch (k) { case 1: v = 1; break; default: v = 2; } return v; } }"#);
}

// Without a default the selector may skip every case
#[test]
fn switch_without_default_leaves_local_unassigned() {
    err_contains(
        r#"class X { int foo(int k) { int v; switch (k) { case 1: v = 1; break; case 2: v = 2; break; } return v; } }"#,
        "The local variable v may not have been initialized",
    );
}

// A handler may run after the try block assigned
#[test]
fn catch_block_reassigns_final_local() {
    err_contains(
        r#"class X { int foo() { final int v; try { v = 1; } catch (RuntimeException e) { v = 2; } return v; } }"#,
        "The final local variable v may already have been assigned",
    );
}

// Assignments in the try block survive an empty finally
#[test]
fn try_finally_keeps_assignments() {
    ok(r#"class X { int foo() { final int v; try { v = 1; } finally { } return v; } }"#);
}

// The inner assignment runs first, so only the outer one is reported
#[test]
fn nested_constructor_argument_assigns_first() {
    let src = "class X {\n  final int x;\n  { x = new X(x = 2).returnA(); }\n  X(int a) { }\n  int returnA() { return x; }\n}\n";
    let found = diagnostics(src);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].message, "The final field x may already have been assigned");
    let outer = src.find("x = new").expect("outer assignment");
    assert_eq!(found[0].start, outer);
}

// Instance initializers count once in every non-delegating constructor
#[test]
fn instance_initializer_counts_in_effective_constructor() {
    ok(r#"package p; class T { final int x; { x = 1; } T() { this(0); } T(int a) { } }"#);
}

// A delegating constructor starts with the blank finals assigned
#[test]
fn assignment_after_delegation() {
    err_contains(
        r#"package p; class T { final int x; T() { this(0); x = 2; } T(int a) { x = 1; } }"#,
        "The final field x may already have been assigned",
    );
}

// A constructor leaving a blank final unassigned
#[test]
fn constructor_misses_blank_final() {
    err_contains(r#"package p; class T { final int x; T() { } }"#, "The blank final field x may not have been initialized");
}

// Without constructors the field declaration itself is reported
#[test]
fn class_without_constructor_misses_blank_final() {
    let found = diagnostics("package p;\nclass T {\n  final int x;\n}\n");
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].message, "The blank final field x may not have been initialized");
    assert_eq!(found[0].line, 3);
}

// Static blank finals must be assigned by the static initializers
#[test]
fn static_blank_final_needs_static_initializer() {
    ok(r#"class T { static final int X; static { X = 1; } }"#);
    err_contains(r#"class T { static final int X; }"#, "The blank final field X may not have been initialized");
}

// Reading a blank final in a constructor before assigning it
#[test]
fn blank_final_read_before_assignment() {
    err_contains(
        r#"class T { final int x; T() { int y = x; x = y; } }"#,
        "The blank final field x may not have been initialized",
    );
}

// Methods cannot assign final fields
#[test]
fn final_field_assigned_in_method() {
    err_contains(r#"class T { final int x = 1; void foo() { x = 2; } }"#, "The final field T.x cannot be assigned");
}

// A write inside `true || ...` is dead, the else branch is flagged instead
#[test]
fn short_circuit_true_or_skips_right_operand() {
    let src = "class X {\n  int f() { return 1; }\n  void foo() {\n    final X abc;\n    if (true || (abc = new X()).f() == 1) {\n    } else {\n      abc = new X();\n    }\n  }\n}\n";
    let found = diagnostics(src);
    let reassigned: Vec<&Diagnostic> = found
        .iter()
        .filter(|d| d.message == "The final local variable abc may already have been assigned")
        .collect();
    assert_eq!(reassigned.len(), 1, "{found:?}");
    assert_eq!(reassigned[0].line, 7);
}

// Same for `false && ...`
#[test]
fn short_circuit_false_and_skips_right_operand() {
    let src = "class X {\n  void foo() {\n    final boolean v;\n    if (false && (v = true)) {\n    } else {\n      v = false;\n    }\n    if (v) { foo(); }\n  }\n}\n";
    let found = diagnostics(src);
    let lines: Vec<usize> = found
        .iter()
        .filter(|d| d.message == "The final local variable v may already have been assigned")
        .map(|d| d.line)
        .collect();
    assert_eq!(lines, vec![6], "{found:?}");
}

// The true outcome of `b ? false : (true && (v = true))` comes from the else operand
#[test]
fn conditional_true_outcome_follows_surviving_branch() {
    ok(r#"class X {
  boolean foo(boolean b) {
    boolean v;
    if (b ? false : (true && (v = true)))
      return v;
    return false;
  }
}"#);
}

// Only the declarator that is never read is reported
#[test]
fn unused_declarator_reported_on_its_own() {
    let src = "class X {\n  void foo() {\n    X x1 = this, x2 = this;\n    x1.foo();\n  }\n}\n";
    let found = diagnostics(src);
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].message, "The value of the local variable x2 is not used");
    assert_eq!(found[0].start, src.find("x2").expect("declarator"));
}

// Writes alone do not count as reads
#[test]
fn written_but_never_read_local() {
    err_contains(r#"class X { void foo() { int unused = 1; unused = 2; } }"#, "The value of the local variable unused is not used");
}

// Reads captured by a lambda body count
#[test]
fn lambda_reads_outer_local() {
    ok(r#"class X { void foo() { int n = 1; Runnable r = () -> System.out.println(n); r.run(); } }"#);
}
