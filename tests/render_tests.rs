use jcheck::config::keys;
use jcheck::{check_source, CompileSession, Config, Severity};
use pretty_assertions::assert_eq;

fn render(files: &[(&str, &str)], config: Config) -> String {
    let mut session = CompileSession::new(config);
    for (path, text) in files {
        session.add_source(*path, *text);
    }
    session.compile().expect("expected a completed session").render()
}

// The listing quotes the trimmed line and underlines the reported range
#[test]
fn nested_constructor_listing() {
    let src = "class X {\n  final int x;\n  { x = new X(x = 2).returnA(); }\n  X(int a) { }\n  int returnA() { return x; }\n}\n";
    assert_eq!(
        check_source("X.java", src, &Config::default()).expect("completed"),
        "----------\n\
         1. ERROR in X.java (at line 3)\n\
         \t{ x = new X(x = 2).returnA(); }\n\
         \t  ^\n\
         The final field x may already have been assigned\n\
         ----------\n"
    );
}

// Numbering continues across units in the order they were added
#[test]
fn numbering_spans_units() {
    let a = "package p;\nclass A {\n  Foo f;\n}\n";
    let b = "package p;\nclass B { Bar b; }\n";
    assert_eq!(
        render(&[("p/A.java", a), ("p/B.java", b)], Config::default()),
        "----------\n\
         1. ERROR in p/A.java (at line 3)\n\
         \tFoo f;\n\
         \t^^^\n\
         Foo cannot be resolved to a type\n\
         ----------\n\
         2. ERROR in p/B.java (at line 2)\n\
         \tclass B { Bar b; }\n\
         \t          ^^^\n\
         Bar cannot be resolved to a type\n\
         ----------\n"
    );
}

// Warnings carry their own label
#[test]
fn warnings_are_labelled() {
    let src = "import java.util.List;\nclass X { }\n";
    assert_eq!(
        check_source("X.java", src, &Config::default()).expect("completed"),
        "----------\n\
         1. WARNING in X.java (at line 1)\n\
         \timport java.util.List;\n\
         \t       ^^^^^^^^^^^^^^\n\
         The import java.util.List is never used\n\
         ----------\n"
    );
}

// Clean sources produce no listing at all
#[test]
fn clean_source_renders_nothing() {
    let src = "class X { int size() { return 0; } }";
    assert_eq!(check_source("X.java", src, &Config::default()).expect("completed"), "");
}

// An ignored category disappears from the listing and the counts
#[test]
fn ignored_category_is_not_listed() {
    let src = "import java.util.List;\nclass X { }\n";
    let config = Config::from_properties("# quiet imports\nunusedImport=ignore\n").expect("valid properties");
    assert_eq!(config.severity(keys::UNUSED_IMPORT), Severity::Ignore);
    assert_eq!(check_source("X.java", src, &config).expect("completed"), "");
}

// Severity changes show up in the label and the counts
#[test]
fn promoted_warning_counts_as_error() {
    let src = "class X { void foo() { int unused = 1; } }";
    let mut session = CompileSession::new(Config::default().with_severity(keys::UNUSED_LOCAL, Severity::Error));
    session.add_source("X.java", src);
    let result = session.compile().expect("expected a completed session");
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.warning_count(), 0);
    assert!(result.has_errors());
    assert!(result.render().contains("1. ERROR in X.java (at line 1)"));
}

// Options files reject unknown keys
#[test]
fn unknown_option_is_a_configuration_error() {
    let error = Config::from_properties("noSuchOption=error\n").expect_err("unknown key");
    assert!(error.is_configuration_error());
}
