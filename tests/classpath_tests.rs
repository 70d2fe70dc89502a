use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use jcheck::lookup::{BindingEvent, BindingKind, InMemoryProvider};
use jcheck::{CompileSession, Config, Error};
use tempfile::TempDir;

fn stub_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, text) in files {
        let target = dir.path().join(path);
        fs::create_dir_all(target.parent().expect("parent")).expect("create dirs");
        fs::write(target, text).expect("write stub");
    }
    dir
}
fn messages(session: CompileSession) -> Vec<String> {
    session.compile().expect("expected a completed session").diagnostics().map(|d| d.message.clone()).collect()
}

const MAIN: &str = "package q;\nimport p.Lib;\npublic class Main { Lib lib; }\n";

// Stub sources on the classpath resolve imports
#[test]
fn directory_entry_resolves_imports() {
    let dir = stub_dir(&[("p/Lib.java", "package p; public class Lib {}")]);
    let mut session = CompileSession::new(Config::default());
    session.add_classpath_dir(dir.path()).expect("readable entry");
    session.add_source("q/Main.java", MAIN);
    let found = messages(session);
    assert!(found.is_empty(), "{found:?}");
}

// Without the entry the import stays unresolved
#[test]
fn missing_entry_leaves_import_unresolved() {
    let mut session = CompileSession::new(Config::default());
    session.add_source("q/Main.java", MAIN);
    let found = messages(session);
    assert!(found.contains(&"The import p.Lib cannot be resolved".to_string()), "{found:?}");
}

// A classpath entry that is not a directory is fatal
#[test]
fn unreadable_entry_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let mut session = CompileSession::new(Config::default());
    let error = session.add_classpath_dir(dir.path().join("absent")).err().expect("expected an unreadable entry");
    assert!(matches!(error, Error::UnreadableClasspath { .. }), "{error}");
    assert!(error.is_configuration_error());
}

// Sources shadow classpath stubs of the same name
#[test]
fn sources_win_over_classpath() {
    let dir = stub_dir(&[("p/Lib.java", "package p; public class Lib { }")]);
    let mut session = CompileSession::new(Config::default());
    session.add_classpath_dir(dir.path()).expect("readable entry");
    session.add_source("p/Lib.java", "package p; public class Lib { public static int size() { return 0; } }");
    session.add_source("q/Main.java", MAIN);
    let result = session.compile().expect("expected a completed session");
    let lib = result
        .environment()
        .types()
        .find(|t| t.qualified_name == "p.Lib")
        .expect("p.Lib bound");
    assert!(lib.methods.iter().any(|m| m.name == "size"));
}

// The listener hears about every external type once, with its file
#[test]
fn listener_reports_external_types_once() {
    let dir = stub_dir(&[("p/Lib.java", "package p; public class Lib {}")]);
    let events: Rc<RefCell<Vec<(BindingKind, String, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let mut session = CompileSession::new(Config::default());
    session.add_classpath_dir(dir.path()).expect("readable entry");
    session.set_binding_listener(move |event: &BindingEvent<'_>| {
        sink.borrow_mut().push((event.kind, event.name.to_string(), event.origin.to_string()));
    });
    session.add_source("q/Main.java", "package q;\nimport p.Lib;\npublic class Main { Lib a; Lib b; p.Lib c; }\n");
    let found = messages(session);
    assert!(found.is_empty(), "{found:?}");

    let events = events.borrow();
    let lib: Vec<&(BindingKind, String, String)> =
        events.iter().filter(|(kind, name, _)| *kind == BindingKind::Type && name == "p.Lib").collect();
    assert_eq!(lib.len(), 1, "{events:?}");
    assert!(lib[0].2.starts_with("file://"), "{}", lib[0].2);
    assert!(lib[0].2.ends_with("Lib.java"), "{}", lib[0].2);
    assert!(events.iter().any(|(kind, _, origin)| *kind == BindingKind::CompilationUnit && origin == &lib[0].2));
}

// Modules answered from a provider are reported as well
#[test]
fn listener_reports_provider_modules() {
    let provider = InMemoryProvider::new("lib")
        .with_module("module lib { exports l; }")
        .with_file("l/L.java", "package l; public class L {}");
    let events: Rc<RefCell<Vec<(BindingKind, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let mut session = CompileSession::new(Config::default());
    session.add_classpath(provider);
    session.set_binding_listener(move |event: &BindingEvent<'_>| {
        sink.borrow_mut().push((event.kind, event.name.to_string()));
    });
    session.add_source("app/module-info.java", "module app { requires lib; }");
    session.add_source("app/q/Main.java", "package q;\nimport l.L;\npublic class Main { L l; }\n");
    let found = messages(session);
    assert!(found.is_empty(), "{found:?}");

    let events = events.borrow();
    assert!(events.contains(&(BindingKind::Module, "lib".to_string())), "{events:?}");
    assert!(events.contains(&(BindingKind::Type, "l.L".to_string())), "{events:?}");
}

// A needed stub that does not parse is fatal
#[test]
fn unparsable_stub_is_fatal() {
    let dir = stub_dir(&[("p/Lib.java", "package p; public class Lib {")]);
    let mut session = CompileSession::new(Config::default());
    session.add_classpath_dir(dir.path()).expect("readable entry");
    session.add_source("q/Main.java", MAIN);
    let error = session.compile().err().expect("expected an unparsable stub");
    assert!(matches!(error, Error::UnreadableClasspath { ref path, .. } if path.ends_with("p/Lib.java")), "{error}");
    assert!(error.is_configuration_error());
}

// Stubs that are never looked up are never parsed
#[test]
fn unused_unparsable_stub_is_ignored() {
    let dir = stub_dir(&[("p/Lib.java", "package p; public class Lib {}"), ("p/Broken.java", "package p; class Broken {")]);
    let mut session = CompileSession::new(Config::default());
    session.add_classpath_dir(dir.path()).expect("readable entry");
    session.add_source("q/Main.java", MAIN);
    let found = messages(session);
    assert!(found.is_empty(), "{found:?}");
}
