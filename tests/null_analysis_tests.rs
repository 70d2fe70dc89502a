use jcheck::config::keys;
use jcheck::{CompileSession, Config, Diagnostic, Severity};

fn diagnostics_with(src: &str, config: Config) -> Vec<Diagnostic> {
    let mut session = CompileSession::new(config);
    session.add_source("X.java", src);
    session.compile().expect("expected a completed session").diagnostics().cloned().collect()
}
fn messages_with(src: &str, config: Config) -> Vec<String> { diagnostics_with(src, config).into_iter().map(|d| d.message).collect() }
fn annotated(src: &str) -> Vec<String> { messages_with(src, Config::default().with_null_analysis(true)) }
fn ok(src: &str) { let m = messages_with(src, Config::default()); assert!(m.is_empty(), "{m:?}"); }
fn err_contains(src: &str, needle: &str) { let m = messages_with(src, Config::default()); assert!(m.iter().any(|m| m.contains(needle)), "{m:?}"); }
fn annotated_contains(src: &str, needle: &str) { let m = annotated(src); assert!(m.iter().any(|m| m.contains(needle)), "{m:?}"); }

// ----- null references on locals -----

// Dereferencing a local that holds null
#[test]
fn null_local_dereference() {
    err_contains(
        r#"class X { void foo() { Object o = null; o.toString(); } }"#,
        "Null pointer access: The variable o can only be null at this location",
    );
}

// Null on one incoming path only
#[test]
fn potentially_null_local_dereference() {
    let found = diagnostics_with(
        r#"class X { void foo(boolean b) { Object o = null; if (b) { o = new Object(); } o.toString(); } }"#,
        Config::default(),
    );
    assert_eq!(found.len(), 1, "{found:?}");
    assert_eq!(found[0].message, "Potential null pointer access: The variable o may be null at this location");
    assert_eq!(found[0].severity, Severity::Warning);
}

// Severities of null findings are configurable
#[test]
fn potential_null_reference_promoted_to_error() {
    let config = Config::from_options([(keys::POTENTIAL_NULL_REFERENCE, "error")]).expect("valid options");
    let found = diagnostics_with(
        r#"class X { void foo(boolean b) { Object o = null; if (b) { o = new Object(); } o.toString(); } }"#,
        config,
    );
    assert!(found.iter().all(|d| d.severity == Severity::Error), "{found:?}");
    assert_eq!(found.len(), 1);
}

// A null comparison refines both branches
#[test]
fn comparison_refines_the_local() {
    ok(r#"class X { void foo(Object o) { if (o == null) { return; } o.toString(); } }"#);
}

// Checking a freshly allocated object
#[test]
fn redundant_check_on_non_null_local() {
    err_contains(
        r#"class X { void foo() { Object o = new Object(); if (o != null) { o.toString(); } } }"#,
        "Redundant null check: The variable o cannot be null at this location",
    );
}

// Checking a local known to be null
#[test]
fn redundant_check_on_null_local() {
    err_contains(
        r#"class X { void foo() { Object o = null; if (o == null) { foo(); } } }"#,
        "Redundant null check: The variable o can only be null at this location",
    );
}

// A dereference proves the local non-null afterwards
#[test]
fn comparison_after_dereference() {
    err_contains(
        r#"class X { void foo(Object o) { o.toString(); if (o == null) { foo(o); } } }"#,
        "Null comparison always yields false: The variable o cannot be null at this location",
    );
}

// Null findings are suppressed in dead code
#[test]
fn no_null_reports_in_dead_code() {
    let found = messages_with(r#"class X { void foo() { Object o = null; if (false) { o.toString(); } } }"#, Config::default());
    assert_eq!(found, vec!["Dead code"]);
}

// ----- annotation contracts -----

// Returning null from a @NonNull method
#[test]
fn null_returned_from_nonnull_method() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class X { @NonNull Object foo() { return null; } }"#,
        "Null type mismatch: required '@NonNull Object' but the provided value is null",
    );
}

// Contracts are not checked while null analysis is off
#[test]
fn contracts_need_null_analysis() {
    ok(r#"import org.eclipse.jdt.annotation.*;
class X { @NonNull Object foo() { return null; } }"#);
}

// A @Nullable parameter flowing into a @NonNull return
#[test]
fn nullable_parameter_returned_as_nonnull() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class X { @NonNull Object foo(@Nullable Object o) { return o; } }"#,
        "Null type mismatch: required '@NonNull Object' but the provided value is specified as @Nullable",
    );
}

// A local that may hold null after a join
#[test]
fn inferred_nullable_argument() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class X {
  void take(@NonNull Object o) { }
  void foo(boolean b) { Object o = b ? null : new Object(); take(o); }
}"#,
        "Null type mismatch: required '@NonNull Object' but the provided value is inferred as @Nullable",
    );
}

// Unannotated results need an unchecked conversion
#[test]
fn unannotated_result_needs_unchecked_conversion() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class X { @NonNull Object foo() { return bar(); } Object bar() { return new Object(); } }"#,
        "Null type safety: The expression of type 'Object' needs unchecked conversion to conform to '@NonNull Object'",
    );
}

// Dereferencing a @Nullable method result
#[test]
fn nullable_method_result_dereference() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class X { @Nullable Object find() { return null; } void foo() { find().toString(); } }"#,
        "Potential null pointer access: The method find() may return null",
    );
}

// Comparing a @NonNull parameter with null
#[test]
fn check_on_specified_nonnull() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class X { void foo(@NonNull Object o) { if (o != null) { o.toString(); } } }"#,
        "Redundant null check: The variable o is specified as @NonNull",
    );
}

// An override cannot tighten a @Nullable parameter
#[test]
fn override_tightens_nullable_parameter() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class A { void foo(@Nullable Object o) { } }
class B extends A { void foo(@NonNull Object o) { } }"#,
        "Illegal redefinition of parameter o, inherited method from A declares this parameter as @Nullable",
    );
}

// An override cannot constrain an unconstrained parameter
#[test]
fn override_constrains_unannotated_parameter() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class A { void foo(Object o) { } }
class B extends A { void foo(@NonNull Object o) { } }"#,
        "Illegal redefinition of parameter o, inherited method from A does not constrain this parameter",
    );
}

// An override cannot loosen a @NonNull return
#[test]
fn override_loosens_nonnull_return() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
class A { @NonNull Object foo() { return new Object(); } }
class B extends A { @Nullable Object foo() { return null; } }"#,
        "The return type is incompatible with '@NonNull Object' returned from A.foo() (mismatching null constraints)",
    );
}

// Unannotated overriding parameters inherit the contract silently
#[test]
fn override_inherits_parameter_contract() {
    let found = annotated(
        r#"import org.eclipse.jdt.annotation.*;
class A { void foo(@NonNull Object o) { } }
class B extends A { void foo(Object o) { if (o == null) { } } }"#,
    );
    assert!(found.iter().all(|m| !m.starts_with("Illegal redefinition")), "{found:?}");
    assert!(found.iter().any(|m| m == "Null comparison always yields false: The variable o is specified as @NonNull"), "{found:?}");
}

// A lambda parameter cannot tighten a @Nullable functional parameter
#[test]
fn lambda_tightens_nullable_parameter() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
interface I { void foo(@Nullable Object o); }
class X { void bar() { I i = (@NonNull Object o) -> { }; i.foo(null); } }"#,
        "Illegal redefinition of parameter o, inherited method from I declares this parameter as @Nullable",
    );
}

// Omitted lambda annotations inherit the functional contract
#[test]
fn lambda_parameter_inherits_contract() {
    let found = annotated(
        r#"import org.eclipse.jdt.annotation.*;
interface I { void foo(@NonNull Object o); }
class X { void bar() { I i = (o) -> { if (o == null) { } }; i.foo(new Object()); } }"#,
    );
    assert!(found.iter().all(|m| !m.starts_with("Illegal redefinition")), "{found:?}");
    assert!(found.iter().any(|m| m == "Null comparison always yields false: The variable o is specified as @NonNull"), "{found:?}");
}

// Lambda results are checked against the functional return contract
#[test]
fn lambda_returns_null_for_nonnull_result() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
interface Maker { @NonNull Object make(); }
class X { void bar() { Maker m = () -> null; m.make(); } }"#,
        "Null type mismatch: required '@NonNull Object' but the provided value is null",
    );
}

// A method reference requiring more than the descriptor provides
#[test]
fn method_reference_parameter_mismatch() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
interface Sink { void accept(@Nullable String s); }
class X {
  static void take(@NonNull String s) { }
  void bar() { Sink sink = X::take; sink.accept(null); }
}"#,
        "Null type mismatch at parameter 1: required '@NonNull String' but provided '@Nullable String' via method descriptor Sink.accept(String)",
    );
}

// An unannotated descriptor parameter needs an unchecked conversion
#[test]
fn method_reference_parameter_unchecked() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
interface Sink { void accept(String s); }
class X {
  static void take(@NonNull String s) { }
  void bar() { Sink sink = X::take; sink.accept("a"); }
}"#,
        "Null type safety: parameter 1 provided via method descriptor Sink.accept(String) needs unchecked conversion to conform to '@NonNull String'",
    );
}

// A method reference returning @Nullable where @NonNull is promised
#[test]
fn method_reference_return_mismatch() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
interface Source { @NonNull String get(); }
class X {
  @Nullable static String read() { return null; }
  void bar() { Source s = X::read; s.get(); }
}"#,
        "Null type mismatch at method return type: Method descriptor Source.get() promises '@NonNull String' but referenced method provides '@Nullable String'",
    );
}

// Nullness annotations do not apply to primitives
#[test]
fn annotation_on_primitive_parameter() {
    let src = "import org.eclipse.jdt.annotation.*;\nclass X { void foo(@Nullable int i) { } }\n";
    let found = diagnostics_with(src, Config::default().with_null_analysis(true));
    let target = found
        .iter()
        .find(|d| d.message == "The nullness annotation @Nullable is not applicable for the primitive type int")
        .unwrap_or_else(|| panic!("{found:?}"));
    assert_eq!(target.start, src.find("@Nullable").expect("annotation"));
    assert_eq!(target.end, src.find("int i").expect("type") + 2);
}

// `@NonNullByDefault` makes unannotated parameters and returns non-null
#[test]
fn nonnull_by_default_on_type() {
    annotated_contains(
        r#"import org.eclipse.jdt.annotation.*;
@NonNullByDefault
class X { Object foo() { return null; } }"#,
        "Null type mismatch: required '@NonNull Object' but the provided value is null",
    );
}

// Annotation names can be configured
#[test]
fn custom_annotation_names() {
    let config = Config::from_properties(
        "nullAnalysis=enabled\nannotation.nonnull=p.NN\nannotation.nullable=p.Nul\nannotation.nonnullbydefault=p.NNBD\n",
    )
    .expect("valid properties");
    let mut session = CompileSession::new(config);
    session.add_source("p/NN.java", "package p;\npublic @interface NN {}\n");
    session.add_source("p/X.java", "package p;\nclass X { @NN Object foo() { return null; } }\n");
    let result = session.compile().expect("expected a completed session");
    let found: Vec<&str> = result.diagnostics().map(|d| d.message.as_str()).collect();
    assert_eq!(found, vec!["Null type mismatch: required '@NN Object' but the provided value is null"]);
}
