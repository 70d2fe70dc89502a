use jcheck::{CompileSession, Config};

fn messages(src: &str) -> Vec<String> {
    let mut session = CompileSession::new(Config::default());
    session.add_source("X.java", src);
    session.compile().expect("expected a completed session").diagnostics().map(|d| d.message.clone()).collect()
}
fn ok(src: &str) { let m = messages(src); assert!(m.is_empty(), "{m:?}"); }

// A method annotation written on a field or a constructor
#[test]
fn method_annotation_on_field_and_constructor() {
    let src = r#"import java.lang.annotation.ElementType;
import java.lang.annotation.Target;
@Target(ElementType.METHOD)
@interface OnMethod {}
class X {
  @OnMethod int f;
  @OnMethod X() {}
  @OnMethod void m() {}
}
"#;
    assert_eq!(
        messages(src),
        vec![
            "The annotation @OnMethod is disallowed for this location",
            "The annotation @OnMethod is disallowed for this location",
        ]
    );
}

// Built-in annotations carry their targets too
#[test]
fn override_on_a_class() {
    let found = messages("@Override class X { @Override public String toString() { return \"\"; } }");
    assert_eq!(found, vec!["The annotation @Override is disallowed for this location"]);
}

// Declaration targets admit neither type parameters nor type uses
#[test]
fn declaration_annotation_on_type_parameter_and_type_use() {
    let src = r#"import java.lang.annotation.Target;
import static java.lang.annotation.ElementType.*;
@Target({PACKAGE, TYPE, METHOD, FIELD, CONSTRUCTOR, PARAMETER, LOCAL_VARIABLE})
@interface Marker {}
public class X<@Marker T> extends @Marker Object {
  @Marker int m(@Marker int p) { @Marker int local = p; return local; }
}
"#;
    assert_eq!(
        messages(src),
        vec![
            "The annotation @Marker is disallowed for this location",
            "The annotation @Marker is disallowed for this location",
        ]
    );
}

// A type annotation alone cannot annotate a void method
#[test]
fn type_use_annotation_on_void_method() {
    let src = r#"import java.lang.annotation.ElementType;
import java.lang.annotation.Target;
@Target(ElementType.TYPE_USE) @interface Marker {}
@Target({ElementType.TYPE_USE, ElementType.METHOD}) @interface Marker3 {}
class X<@Marker T> {
  @Marker void foo() {}
  @Marker3 void bar() {}
  @Marker String baz() { @Marker String s = ""; return s; }
  java.util.List<@Marker String> list;
}
"#;
    assert_eq!(messages(src), vec!["Type annotation is illegal for a method that returns void"]);
}

// Annotation types without @Target are not restricted
#[test]
fn untargeted_annotation_applies_anywhere() {
    ok("@interface Free {}\n@Free class X<@Free T> {\n  @Free int f;\n  @Free X(@Free int p) { f = p; }\n}\n");
}

// An empty target list admits no location at all
#[test]
fn empty_target_list() {
    let src = "import java.lang.annotation.Target;\n@Target({})\n@interface Nowhere {}\n@Nowhere class X {}\n";
    assert_eq!(messages(src), vec!["The annotation @Nowhere is disallowed for this location"]);
}
