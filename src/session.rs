//! One batch compilation: sources and classpath entries in, per-unit
//! diagnostics out.
//!
//! Units are parsed, registered, bound and flow-analysed sequentially in the
//! order they were added. Configuration problems (unreadable classpath, module
//! cycles, duplicate modules) and syntax errors abort the session; everything
//! else is a [`Diagnostic`].

use std::path::Path;

use crate::ast::CompilationUnit;
use crate::config::{Config, Severity};
use crate::diagnostics::{render_problems, Diagnostic, ProblemReporter, UnitProblems};
use crate::error::{Error, Result};
use crate::flow;
use crate::lookup::{bind_unit, builtin, BindingListener, CompilationUnitScope, DirectoryProvider, LookupEnvironment, TypeProvider};
use crate::modules::ModuleId;
use crate::parser::parse_java;

struct SourceFile {
    path: String,
    text: String,
}

/// Diagnostics of one compiled unit, position ordered.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub path: String,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitReport {
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

pub struct CompileResult {
    pub units: Vec<UnitReport>,
    environment: LookupEnvironment,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.units
            .iter()
            .flat_map(|u| &u.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.units.iter().flat_map(|u| &u.diagnostics)
    }

    /// The problem listing of all units with one global numbering; empty
    /// when nothing was reported.
    pub fn render(&self) -> String {
        render_problems(self.units.iter().map(|u| UnitProblems {
            file: &u.path,
            source: &u.source,
            problems: &u.diagnostics,
        }))
    }

    /// The environment the session resolved against, for binding queries.
    pub fn environment(&self) -> &LookupEnvironment {
        &self.environment
    }
}

pub struct CompileSession {
    config: Config,
    sources: Vec<SourceFile>,
    classpath: Vec<Box<dyn TypeProvider>>,
    listener: Option<Box<dyn BindingListener>>,
}

impl CompileSession {
    pub fn new(config: Config) -> Self {
        Self { config, sources: Vec::new(), classpath: Vec::new(), listener: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Add a source file. `path` is `/`-separated and relative to the
    /// source root, e.g. `p/X.java` or `m1/module-info.java`.
    pub fn add_source(&mut self, path: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.sources.push(SourceFile { path: path.into(), text: text.into() });
        self
    }

    /// Add a classpath entry. Entries are searched in the order added,
    /// after the sources and the built-in JDK module.
    pub fn add_classpath(&mut self, provider: impl TypeProvider + 'static) -> &mut Self {
        self.classpath.push(Box::new(provider));
        self
    }

    /// Add a directory of stub sources as a classpath entry.
    pub fn add_classpath_dir(&mut self, root: impl AsRef<Path>) -> Result<&mut Self> {
        let provider = DirectoryProvider::new(root)?;
        Ok(self.add_classpath(provider))
    }

    pub fn set_binding_listener(&mut self, listener: impl BindingListener + 'static) -> &mut Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn compile(self) -> Result<CompileResult> {
        let CompileSession { config, sources, classpath, listener } = self;
        log::debug!("compiling {} units against {} classpath entries", sources.len(), classpath.len());

        let mut units = Vec::with_capacity(sources.len());
        for file in &sources {
            let unit = match parse_java(&file.text) {
                Ok(unit) => unit,
                Err(Error::Parse(error)) => return Err(Error::Syntax { file: file.path.clone(), error }),
                Err(other) => return Err(other),
            };
            units.push(unit);
        }

        let mut env = LookupEnvironment::new(config.clone());
        if let Some(listener) = listener {
            env.set_listener(listener);
        }
        env.add_provider(Box::new(builtin::jdk()));
        for provider in classpath {
            env.add_provider(provider);
        }
        register_sources(&mut env, &sources, &units)?;
        env.build_modules()?;

        let mut reports = Vec::with_capacity(units.len());
        for (index, (file, unit)) in sources.into_iter().zip(&units).enumerate() {
            let mut scope = CompilationUnitScope::new(&env, index);
            let mut reporter = ProblemReporter::new(&config);
            bind_unit(&mut env, &mut scope, unit, &mut reporter);
            if unit.module_decl.is_none() {
                flow::analyze_unit(&mut env, &mut scope, unit, &mut reporter);
            }
            if let Some(error) = env.unparsable_unit() {
                return Err(error);
            }
            let diagnostics = reporter.finish();
            log::debug!("{}: {} problems", file.path, diagnostics.len());
            reports.push(UnitReport { path: file.path, source: file.text, diagnostics });
        }

        Ok(CompileResult { units: reports, environment: env })
    }
}

/// Declare source modules, then register every unit with the module whose
/// root holds it. Unit indices follow the order sources were added.
fn register_sources(env: &mut LookupEnvironment, sources: &[SourceFile], units: &[CompilationUnit]) -> Result<()> {
    let mut roots: Vec<(String, ModuleId)> = Vec::new();
    for (index, (file, unit)) in sources.iter().zip(units).enumerate() {
        if let Some(decl) = &unit.module_decl {
            let root = parent_dir(&file.path).to_string();
            let id = env.add_source_module(decl, &root, index)?;
            log::debug!("source module {} rooted at '{}'", decl.name, root);
            roots.push((root, id));
        }
    }
    for (index, (file, unit)) in sources.iter().zip(units).enumerate() {
        let module = module_for(&roots, &file.path);
        let registered = env.add_source_unit(&file.path, unit, module);
        if registered != index {
            return Err(Error::Internal(format!("unit {} registered as {}", file.path, registered)));
        }
    }
    Ok(())
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// The module with the longest source root containing `path`.
fn module_for(roots: &[(String, ModuleId)], path: &str) -> Option<ModuleId> {
    roots
        .iter()
        .filter(|(root, _)| root.is_empty() || path.starts_with(&format!("{}/", root)))
        .max_by_key(|(root, _)| root.len())
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_belong_to_the_innermost_module_root() {
        let roots = vec![(String::new(), ModuleId(0)), ("m1".to_string(), ModuleId(1))];
        assert_eq!(module_for(&roots, "m1/p/X.java"), Some(ModuleId(1)));
        assert_eq!(module_for(&roots, "m10/p/X.java"), Some(ModuleId(0)));
        assert_eq!(module_for(&[], "p/X.java"), None);
        assert_eq!(parent_dir("m1/module-info.java"), "m1");
        assert_eq!(parent_dir("module-info.java"), "");
    }

    #[test]
    fn syntax_errors_name_the_file() {
        let mut session = CompileSession::new(Config::default());
        session.add_source("p/Broken.java", "package p; class {");
        match session.compile() {
            Err(Error::Syntax { file, .. }) => assert_eq!(file, "p/Broken.java"),
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("expected a syntax error"),
        }
    }

    #[test]
    fn clean_sources_report_nothing() {
        let mut session = CompileSession::new(Config::default());
        session.add_source("p/A.java", "package p;\npublic class A {\n  int size() { return 0; }\n}\n");
        let result = session.compile().expect("compiles");
        assert!(!result.has_errors());
        assert_eq!(result.render(), "");
    }
}
