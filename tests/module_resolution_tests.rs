use jcheck::{CompileSession, Config, Error, Severity};

fn compile(files: &[(&str, &str)]) -> jcheck::Result<Vec<(Severity, String)>> {
    let mut session = CompileSession::new(Config::default());
    for (path, text) in files {
        session.add_source(*path, *text);
    }
    let result = session.compile()?;
    Ok(result.diagnostics().map(|d| (d.severity, d.message.clone())).collect())
}
fn messages(files: &[(&str, &str)]) -> Vec<String> {
    compile(files).expect("expected a completed session").into_iter().map(|(_, m)| m).collect()
}
fn ok(files: &[(&str, &str)]) { let m = messages(files); assert!(m.is_empty(), "{m:?}"); }
fn err_contains(files: &[(&str, &str)], needle: &str) { let m = messages(files); assert!(m.iter().any(|m| m.contains(needle)), "{m:?}"); }

const ONE: [(&str, &str); 2] = [
    ("one/module-info.java", "module mod.one { exports pa; }"),
    ("one/pa/Util.java", "package pa; public class Util {}"),
];
const TWO: [(&str, &str); 2] = [
    ("two/module-info.java", "module mod.two { exports pb; }"),
    ("two/pb/Util.java", "package pb; public class Util {}"),
];
const APP: (&str, &str) = ("app/module-info.java", "module app { requires mod.one; requires mod.two; }");

fn with_app(main: &'static str) -> Vec<(&'static str, &'static str)> {
    let mut files: Vec<(&str, &str)> = ONE.iter().chain(TWO.iter()).copied().collect();
    files.push(APP);
    files.push(("app/q/Main.java", main));
    files
}

// Two module imports exporting the same simple name
#[test]
fn module_imports_with_same_simple_name_are_ambiguous() {
    let files = with_app("package q;\nimport module mod.one;\nimport module mod.two;\npublic class Main { Util u; }\n");
    err_contains(&files, "The type Util is ambiguous");
}

// A single-type import beats every module import
#[test]
fn single_type_import_disambiguates() {
    let files = with_app("package q;\nimport module mod.one;\nimport module mod.two;\nimport pa.Util;\npublic class Main { Util u; }\n");
    let found = messages(&files);
    assert!(found.iter().all(|m| !m.contains("ambiguous")), "{found:?}");
}

// A type declared in the unit shadows module imports
#[test]
fn declared_type_shadows_module_import() {
    let files = with_app("package q;\nimport module mod.one;\npublic class Main { Util u; }\nclass Util {}\n");
    ok(&files);
}

// Importing the same module twice is only a warning
#[test]
fn repeated_module_import_is_a_warning() {
    let files = with_app("package q;\nimport module mod.one;\nimport module mod.one;\npublic class Main { Util u; }\n");
    let found = compile(&files).expect("expected a completed session");
    assert_eq!(found, vec![(Severity::Warning, "The import module mod.one is never used".to_string())]);
}

// Module imports of unknown modules
#[test]
fn unknown_module_import() {
    let files = with_app("package q;\nimport module mod.three;\npublic class Main { }\n");
    err_contains(&files, "mod.three cannot be resolved to a module");
}

// A module sees its own packages through a self import unless an export excludes it
#[test]
fn self_import_respects_qualified_exports() {
    let files = [
        ("m/module-info.java", "module m { exports p.open; exports p.mine to m; exports p.theirs to other; }"),
        ("m/p/open/A.java", "package p.open; public class A {}"),
        ("m/p/mine/B.java", "package p.mine; public class B {}"),
        ("m/p/theirs/C.java", "package p.theirs; public class C {}"),
        ("m/q/Use.java", "package q;\nimport module m;\npublic class Use { A a; B b; C c; }\n"),
    ];
    let found = messages(&files);
    assert_eq!(found, vec!["C cannot be resolved to a type"]);
}

// Packages a module does not export are not accessible
#[test]
fn unexported_package_is_not_accessible() {
    let files = [
        ("lib/module-info.java", "module lib { }"),
        ("lib/hidden/Secret.java", "package hidden; public class Secret {}"),
        ("app/module-info.java", "module app { requires lib; }"),
        ("app/q/Main.java", "package q;\nimport hidden.Secret;\npublic class Main { }\n"),
    ];
    err_contains(&files, "is not accessible");
}

// Qualified exports only reach the named modules
#[test]
fn qualified_export_to_other_module() {
    let files = [
        ("lib/module-info.java", "module lib { exports api to friend; }"),
        ("lib/api/Service.java", "package api; public class Service {}"),
        ("friend/module-info.java", "module friend { requires lib; }"),
        ("friend/f/Ok.java", "package f;\nimport api.Service;\npublic class Ok { Service s; }\n"),
        ("app/module-info.java", "module app { requires lib; }"),
        ("app/q/Main.java", "package q;\nimport api.Service;\npublic class Main { }\n"),
    ];
    let found = messages(&files);
    assert_eq!(found.len(), 1, "{found:?}");
    assert!(found[0].contains("is not accessible"), "{found:?}");
}

// Types of modules that are not required stay invisible
#[test]
fn module_without_requires_cannot_see_others() {
    let files = [
        ("lib/module-info.java", "module lib { exports api; }"),
        ("lib/api/Service.java", "package api; public class Service {}"),
        ("app/module-info.java", "module app { }"),
        ("app/q/Main.java", "package q;\npublic class Main { api.Service s; }\n"),
    ];
    err_contains(&files, "cannot be resolved");
}

// `requires transitive` re-exports readability
#[test]
fn transitive_requires_are_readable() {
    let files = [
        ("base/module-info.java", "module base { exports b; }"),
        ("base/b/Core.java", "package b; public class Core {}"),
        ("mid/module-info.java", "module mid { requires transitive base; }"),
        ("app/module-info.java", "module app { requires mid; }"),
        ("app/q/Main.java", "package q;\nimport b.Core;\npublic class Main { Core c; }\n"),
    ];
    ok(&files);
}

// A package exported by two readable modules
#[test]
fn split_package_is_reported() {
    let files = [
        ("one/module-info.java", "module mod.one { exports pm; }"),
        ("one/pm/A.java", "package pm; public class A {}"),
        ("two/module-info.java", "module mod.two { exports pm; }"),
        ("two/pm/B.java", "package pm; public class B {}"),
        ("app/module-info.java", "module app { requires mod.one; requires mod.two; }"),
        ("app/q/Main.java", "package q;\nimport pm.*;\npublic class Main { }\n"),
    ];
    err_contains(&files, "The package pm is accessible from more than one module: mod.one, mod.two");
}

// `requires` of a module that does not exist
#[test]
fn unresolved_requires() {
    let files = [("app/module-info.java", "module app { requires nowhere; }")];
    err_contains(&files, "nowhere cannot be resolved to a module");
}

// Cyclic requires abort the session
#[test]
fn requires_cycle_is_fatal() {
    let files = [
        ("a/module-info.java", "module a { requires b; }"),
        ("b/module-info.java", "module b { requires a; }"),
    ];
    match compile(&files) {
        Err(Error::ModuleCycle(names)) => assert!(names.contains(&"a".to_string()) && names.contains(&"b".to_string())),
        other => panic!("expected a module cycle, got {:?}", other),
    }
}

// Two declarations of one module abort the session
#[test]
fn duplicate_module_is_fatal() {
    let files = [("a/module-info.java", "module same { }"), ("b/module-info.java", "module same { }")];
    let error = compile(&files).expect_err("expected a fatal error");
    assert!(matches!(error, Error::DuplicateModule(ref name) if name == "same"), "{error}");
    assert!(error.is_configuration_error());
}

// Code outside any module reads every module
#[test]
fn unnamed_module_reads_exported_packages() {
    let files = [
        ("lib/module-info.java", "module lib { exports api; }"),
        ("lib/api/Service.java", "package api; public class Service {}"),
        ("q/Main.java", "package q;\nimport api.Service;\npublic class Main { Service s; }\n"),
    ];
    ok(&files);
}

// Importing a module that is not required makes none of its types visible
#[test]
fn module_import_of_unread_module() {
    let files = [
        ("ma/module-info.java", "module ma { exports pa; }"),
        ("ma/pa/T.java", "package pa; public class T {}"),
        ("mb/module-info.java", "module mb { exports pb; }"),
        ("mb/pb/U.java", "package pb; public class U {}"),
        ("mc/module-info.java", "module mc { requires ma; }"),
        ("mc/pc/C.java", "package pc;\nimport module mb;\npublic class C { U u; }\n"),
    ];
    let found = messages(&files);
    assert_eq!(found, vec!["The module mb is not read by mc", "U cannot be resolved to a type"]);
}

// A module import of a required module is not reported
#[test]
fn module_import_of_required_module() {
    let files = [
        ("mb/module-info.java", "module mb { exports pb; }"),
        ("mb/pb/U.java", "package pb; public class U {}"),
        ("mc/module-info.java", "module mc { requires mb; }"),
        ("mc/pc/C.java", "package pc;\nimport module mb;\npublic class C { U u; }\n"),
    ];
    ok(&files);
}
