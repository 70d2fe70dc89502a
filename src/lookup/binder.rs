//! Resolution pass over one compilation unit: imports, module directives,
//! hierarchy cycles, annotation targets and every written type reference. Problems go to the unit's reporter;
//! flow analysis later reuses the same scope and its cache.

use crate::ast::{
    Annotation, Block, CatchClause, ClassMember, CompilationUnit, Expr, ImportKind, LambdaBody, Location, MethodDecl,
    ModuleDirective, Parameter, Span, Stmt, TryResource, TypeDecl, TypeKind, TypeParam, TypeRef, VarDeclStmt, Wildcard,
};
use crate::consts::PRIMITIVE_TYPES;
use crate::diagnostics::{messages, Category, ProblemReporter};

use super::binding::{ElementType, LookupResult, TypeId};
use super::environment::LookupEnvironment;
use super::scope::CompilationUnitScope;

/// Resolve everything written in `unit` and report what does not resolve.
pub fn bind_unit(
    env: &mut LookupEnvironment,
    scope: &mut CompilationUnitScope,
    unit: &CompilationUnit,
    reporter: &mut ProblemReporter<'_>,
) {
    let mut binder = Binder { env, scope, reporter, enclosing: None, type_vars: Vec::new(), local_types: Vec::new() };
    if let Some(module) = &unit.module_decl {
        binder.bind_annotations(&module.annotations, Site::Module);
        binder.check_requires(&module.directives);
        return;
    }
    if let Some(package) = &unit.package_decl {
        binder.bind_annotations(&package.annotations, Site::Package);
    }
    let valid = binder.check_imports(unit);
    let top_level = binder.env.unit(binder.scope.unit()).types.clone();
    for (decl, id) in unit.type_decls.iter().zip(top_level) {
        binder.bind_type_decl(decl, Some(id));
    }
    binder.report_unused_imports(unit, &valid);
}

struct Binder<'a, 'r> {
    env: &'a mut LookupEnvironment,
    scope: &'a mut CompilationUnitScope,
    reporter: &'a mut ProblemReporter<'r>,
    enclosing: Option<TypeId>,
    type_vars: Vec<String>,
    /// Local and anonymous-body class names in scope; they have no binding.
    local_types: Vec<String>,
}

/// The kind of declaration or type an annotation is written on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Site {
    Module,
    Package,
    Type { annotation: bool },
    Field,
    Method { void: bool },
    Constructor,
    Parameter,
    LocalVariable,
    TypeParameter,
    TypeUse,
}

impl Site {
    fn admits(self, target: ElementType) -> bool {
        match (self, target) {
            (Site::Module | Site::Package | Site::Method { void: true }, ElementType::TypeUse) => false,
            (_, ElementType::TypeUse) => true,
            (Site::Type { annotation }, ElementType::AnnotationType) => annotation,
            (Site::Type { .. }, ElementType::Type) => true,
            (Site::Module, ElementType::Module)
            | (Site::Package, ElementType::Package)
            | (Site::Field, ElementType::Field)
            | (Site::Method { .. }, ElementType::Method)
            | (Site::Constructor, ElementType::Constructor)
            | (Site::Parameter, ElementType::Parameter)
            | (Site::LocalVariable, ElementType::LocalVariable)
            | (Site::TypeParameter, ElementType::TypeParameter) => true,
            _ => false,
        }
    }
}

/// The first `text.len()` characters written at `start`.
fn span_of(start: Location, text: &str) -> Span {
    Span::new(start, start.after(text))
}

impl<'a, 'r> Binder<'a, 'r> {
    fn check_requires(&mut self, directives: &[ModuleDirective]) {
        for directive in directives {
            if let ModuleDirective::Requires { module, .. } = directive {
                if self.env.modules().lookup(&module.name).is_none() {
                    self.reporter.report(
                        Category::UnresolvedModule,
                        messages::UNRESOLVED_MODULE,
                        vec![module.name.clone()],
                        module.span,
                    );
                }
            }
        }
    }

    /// Returns, per import, whether it resolved and may be reported as unused.
    fn check_imports(&mut self, unit: &CompilationUnit) -> Vec<bool> {
        let module = self.scope.module();
        let mut imported_modules: Vec<String> = Vec::new();
        let mut valid = Vec::with_capacity(unit.imports.len());
        for import in &unit.imports {
            let span = import.name_span;
            let ok = match import.kind {
                ImportKind::Single => {
                    let qualifier = import.qualifier();
                    if self.report_split_package(qualifier, span_of(span.start, qualifier)) {
                        false
                    } else {
                        match self.env.resolve_qualified(&import.name, module) {
                            LookupResult::Found(_) => true,
                            LookupResult::NotAccessible(qualified) => {
                                self.reporter.report(Category::NotAccessible, messages::TYPE_NOT_ACCESSIBLE, vec![qualified], span);
                                false
                            }
                            LookupResult::Ambiguous(_) => {
                                self.reporter.report(
                                    Category::AmbiguousType,
                                    messages::AMBIGUOUS_TYPE,
                                    vec![import.name.clone()],
                                    span,
                                );
                                false
                            }
                            _ => {
                                self.report_import_not_found(&import.name, span);
                                false
                            }
                        }
                    }
                }
                ImportKind::OnDemand => {
                    let owners = self.env.package_owners(&import.name, module);
                    if self.report_split_package(&import.name, span) {
                        false
                    } else if !owners.visible.is_empty() {
                        true
                    } else if !owners.hidden.is_empty() {
                        self.reporter.report(
                            Category::NotAccessible,
                            messages::PACKAGE_NOT_ACCESSIBLE,
                            vec![import.name.clone()],
                            span,
                        );
                        false
                    } else if self.env.resolve_qualified(&import.name, module).found().is_some() {
                        true
                    } else {
                        self.report_import_not_found(&import.name, span);
                        false
                    }
                }
                ImportKind::StaticSingle | ImportKind::StaticOnDemand => {
                    let owner = if import.kind == ImportKind::StaticSingle { import.qualifier() } else { &import.name };
                    if self.env.resolve_qualified(owner, module).found().is_none() {
                        self.report_import_not_found(&import.name, span);
                    }
                    false
                }
                ImportKind::Module => {
                    let imported = self.env.modules().lookup(&import.name);
                    let unread_by = match (module, imported) {
                        (Some(reader), Some(target)) if !self.env.modules().reads(Some(reader), target) => Some(reader),
                        _ => None,
                    };
                    if imported.is_none() {
                        self.reporter.report(
                            Category::UnresolvedModule,
                            messages::UNRESOLVED_MODULE,
                            vec![import.name.clone()],
                            span,
                        );
                    } else if let Some(reader) = unread_by {
                        let reader = self.env.modules().name(reader).to_string();
                        self.reporter.report(
                            Category::NotAccessible,
                            messages::MODULE_NOT_READ,
                            vec![import.name.clone(), reader],
                            span,
                        );
                    } else if imported_modules.contains(&import.name) {
                        self.reporter.report(
                            Category::UnusedImport,
                            messages::UNUSED_MODULE_IMPORT,
                            vec![import.name.clone()],
                            span,
                        );
                    } else {
                        imported_modules.push(import.name.clone());
                    }
                    false
                }
            };
            valid.push(ok);
        }
        valid
    }

    fn report_import_not_found(&mut self, name: &str, span: Span) {
        self.reporter.report(Category::UnresolvedImport, messages::IMPORT_NOT_FOUND, vec![name.to_string()], span);
    }

    /// Report `package` when two or more named modules make it visible.
    fn report_split_package(&mut self, package: &str, span: Span) -> bool {
        if package.is_empty() {
            return false;
        }
        let owners = self.env.package_owners(package, self.scope.module());
        let names: Vec<String> = owners
            .visible
            .iter()
            .flatten()
            .map(|id| self.env.modules().name(*id).to_string())
            .collect();
        if names.len() < 2 {
            return false;
        }
        log::debug!("package {} is split across {}", package, names.join(", "));
        self.reporter.report(
            Category::SplitPackage,
            messages::SPLIT_PACKAGE,
            vec![package.to_string(), names.join(", ")],
            span,
        );
        true
    }

    fn report_unused_imports(&mut self, unit: &CompilationUnit, valid: &[bool]) {
        for (index, import) in unit.imports.iter().enumerate() {
            if !valid.get(index).copied().unwrap_or(false) || self.scope.is_import_used(index) {
                continue;
            }
            self.reporter.report(Category::UnusedImport, messages::UNUSED_IMPORT, vec![import.name.clone()], import.name_span);
        }
    }

    fn bind_type_decl(&mut self, decl: &TypeDecl, id: Option<TypeId>) {
        let saved_enclosing = self.enclosing;
        let saved_vars = self.type_vars.len();
        if id.is_some() {
            self.enclosing = id;
        }
        self.type_vars.extend(decl.type_params.iter().map(|p| p.name.clone()));

        self.bind_annotations(&decl.modifiers.annotations, Site::Type { annotation: decl.kind == TypeKind::Annotation });
        self.bind_type_params(&decl.type_params);
        for written in decl.extends.iter().chain(&decl.implements) {
            self.bind_type_ref(written);
        }
        if let Some(id) = id {
            self.report_hierarchy_cycles(decl, id);
        }
        for constant in &decl.enum_constants {
            for argument in &constant.arguments {
                self.bind_expr(argument);
            }
            if let Some(body) = &constant.body {
                self.bind_members(body, None);
            }
        }
        let member_ids = id.map(|id| self.env.type_binding(id).member_types.clone());
        self.bind_members(&decl.members, member_ids);

        self.type_vars.truncate(saved_vars);
        self.enclosing = saved_enclosing;
    }

    fn report_hierarchy_cycles(&mut self, decl: &TypeDecl, id: TypeId) {
        self.env.complete(id);
        let cycles = self.env.type_binding(id).hierarchy_cycles().to_vec();
        let written: Vec<&TypeRef> = decl.extends.iter().chain(&decl.implements).collect();
        for cycle in cycles {
            let Some(reference) = written.get(cycle.written) else { continue };
            let name = self.env.display_name(id);
            let (template, arguments) = if cycle.self_reference {
                (messages::HIERARCHY_SELF_CYCLE, vec![name])
            } else {
                (messages::HIERARCHY_CYCLE, vec![name, self.env.display_name(cycle.supertype)])
            };
            let span = span_of(reference.span.start, &reference.name);
            self.reporter.report(Category::HierarchyCycle, template, arguments, span);
        }
    }

    /// `member_ids` are the bindings of the member types, in declaration order.
    fn bind_members(&mut self, members: &[ClassMember], member_ids: Option<Vec<TypeId>>) {
        let mut member_ids = member_ids.unwrap_or_default().into_iter();
        for member in members {
            match member {
                ClassMember::Field(field) => {
                    self.bind_annotations(&field.modifiers.annotations, Site::Field);
                    self.bind_type_ref(&field.type_ref);
                    for declarator in &field.declarators {
                        if let Some(init) = &declarator.initializer {
                            self.bind_expr(init);
                        }
                    }
                }
                ClassMember::Method(method) => self.bind_method(method),
                ClassMember::Initializer(init) => self.bind_block(&init.body),
                ClassMember::Type(decl) => {
                    let id = member_ids.next();
                    if id.is_none() {
                        self.local_types.push(decl.name.clone());
                    }
                    self.bind_type_decl(decl, id);
                }
            }
        }
    }

    fn bind_method(&mut self, method: &MethodDecl) {
        let saved_vars = self.type_vars.len();
        self.type_vars.extend(method.type_params.iter().map(|p| p.name.clone()));
        let site = match &method.return_type {
            None => Site::Constructor,
            Some(ret) => Site::Method { void: ret.is_void() },
        };
        self.bind_annotations(&method.modifiers.annotations, site);
        self.bind_type_params(&method.type_params);
        if let Some(ret) = &method.return_type {
            self.bind_type_ref(ret);
        }
        for param in &method.parameters {
            self.bind_parameter(param, Site::Parameter);
        }
        for thrown in &method.throws {
            self.bind_type_ref(thrown);
        }
        if let Some(body) = &method.body {
            self.bind_block(body);
        }
        self.type_vars.truncate(saved_vars);
    }

    fn bind_type_params(&mut self, params: &[TypeParam]) {
        for param in params {
            self.bind_annotations(&param.annotations, Site::TypeParameter);
            for bound in &param.bounds {
                self.bind_type_ref(bound);
            }
        }
    }

    fn bind_parameter(&mut self, param: &Parameter, site: Site) {
        self.bind_annotations(&param.modifiers.annotations, site);
        self.bind_type_ref(&param.type_ref);
    }

    fn bind_annotations(&mut self, annotations: &[Annotation], site: Site) {
        for annotation in annotations {
            let at = annotation.span.start;
            let start = Location::new(at.line, at.column + 1, at.offset + 1);
            if let Some(id) = self.resolve_and_report(&annotation.name, span_of(start, &annotation.name)) {
                self.check_target(annotation, id, site);
            }
            if let Some(arguments) = &annotation.arguments {
                self.mark_argument_types(arguments);
            }
        }
    }

    /// Report `annotation` when its type's `@Target` excludes `site`.
    fn check_target(&mut self, annotation: &Annotation, id: TypeId, site: Site) {
        let Some(targets) = &self.env.type_binding(id).annotation_targets else { return };
        if targets.iter().any(|t| site.admits(*t)) {
            return;
        }
        let (template, arguments) = if site == (Site::Method { void: true }) && targets.contains(&ElementType::TypeUse) {
            (messages::TYPE_ANNOTATION_ON_VOID, Vec::new())
        } else {
            (messages::ANNOTATION_DISALLOWED_HERE, vec![annotation.simple_name().to_string()])
        };
        self.reporter.report(Category::AnnotationTarget, template, arguments, annotation.span);
    }

    /// Resolve the type qualifiers of constants named in annotation values,
    /// such as `ElementType` in `ElementType.METHOD`, so their imports count
    /// as used.
    fn mark_argument_types(&mut self, arguments: &str) {
        let words: Vec<&str> = arguments.split_whitespace().collect();
        for pair in words.windows(2) {
            let qualifier = pair[0];
            let is_type_name = qualifier.starts_with(|c: char| c.is_ascii_uppercase())
                && qualifier.chars().all(|c| c.is_alphanumeric() || c == '_');
            if pair[1] == "." && is_type_name && !self.local_types.iter().any(|t| t == qualifier) {
                self.scope.resolve_name(self.env, qualifier, self.enclosing, &self.type_vars);
            }
        }
    }

    fn bind_type_ref(&mut self, type_ref: &TypeRef) {
        self.bind_annotations(&type_ref.annotations, Site::TypeUse);
        for arg in &type_ref.type_args {
            self.bind_type_ref(arg);
        }
        match &type_ref.wildcard {
            Some(Wildcard::Extends(bound)) | Some(Wildcard::Super(bound)) => self.bind_type_ref(bound),
            Some(Wildcard::Unbounded) => {}
            None if PRIMITIVE_TYPES.contains(type_ref.name.as_str()) || type_ref.is_var() => {}
            None => {
                self.resolve_and_report(&type_ref.name, span_of(type_ref.span.start, &type_ref.name));
            }
        }
    }

    /// The binding `name` resolves to; anything else is reported.
    fn resolve_and_report(&mut self, name: &str, span: Span) -> Option<TypeId> {
        let first = name.split('.').next().unwrap_or(name);
        if self.local_types.iter().any(|t| t == first) {
            return None;
        }
        let result = self.scope.resolve_name(self.env, name, self.enclosing, &self.type_vars);
        match result {
            LookupResult::Found(id) => return Some(id),
            LookupResult::TypeVariable(_) => {}
            LookupResult::NotFound => {
                self.reporter.report(Category::UnresolvedType, messages::UNRESOLVED_TYPE, vec![name.to_string()], span)
            }
            LookupResult::Ambiguous(_) => {
                self.reporter.report(Category::AmbiguousType, messages::AMBIGUOUS_TYPE, vec![name.to_string()], span)
            }
            LookupResult::NotAccessible(qualified) => {
                self.reporter.report(Category::NotAccessible, messages::TYPE_NOT_ACCESSIBLE, vec![qualified], span)
            }
        }
        None
    }

    fn bind_block(&mut self, block: &Block) {
        let saved = self.local_types.len();
        for stmt in &block.statements {
            self.bind_stmt(stmt);
        }
        self.local_types.truncate(saved);
    }

    fn bind_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.bind_block(block),
            Stmt::VarDecl(decl) => self.bind_var_decl(decl),
            Stmt::LocalType(decl) => {
                self.local_types.push(decl.name.clone());
                self.bind_type_decl(decl, None);
            }
            Stmt::Expr(s) => self.bind_expr(&s.expr),
            Stmt::If(s) => {
                self.bind_expr(&s.condition);
                self.bind_stmt(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.bind_stmt(else_branch);
                }
            }
            Stmt::While(s) => {
                self.bind_expr(&s.condition);
                self.bind_stmt(&s.body);
            }
            Stmt::DoWhile(s) => {
                self.bind_stmt(&s.body);
                self.bind_expr(&s.condition);
            }
            Stmt::For(s) => {
                let saved = self.local_types.len();
                for init in &s.init {
                    self.bind_stmt(init);
                }
                if let Some(condition) = &s.condition {
                    self.bind_expr(condition);
                }
                for update in &s.update {
                    self.bind_expr(update);
                }
                self.bind_stmt(&s.body);
                self.local_types.truncate(saved);
            }
            Stmt::ForEach(s) => {
                self.bind_parameter(&s.variable, Site::LocalVariable);
                self.bind_expr(&s.iterable);
                self.bind_stmt(&s.body);
            }
            Stmt::Switch(s) => {
                self.bind_expr(&s.selector);
                let saved = self.local_types.len();
                for case in &s.cases {
                    for label in &case.labels {
                        self.bind_expr(label);
                    }
                    for stmt in &case.statements {
                        self.bind_stmt(stmt);
                    }
                }
                self.local_types.truncate(saved);
            }
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.bind_expr(value);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
            Stmt::Throw(s) => self.bind_expr(&s.expr),
            Stmt::Try(s) => {
                for resource in &s.resources {
                    match resource {
                        TryResource::Declaration(decl) => self.bind_var_decl(decl),
                        TryResource::Expression(expr) => self.bind_expr(expr),
                    }
                }
                self.bind_block(&s.try_block);
                for clause in &s.catch_clauses {
                    self.bind_catch(clause);
                }
                if let Some(finally) = &s.finally_block {
                    self.bind_block(finally);
                }
            }
            Stmt::Labeled(s) => self.bind_stmt(&s.statement),
            Stmt::Synchronized(s) => {
                self.bind_expr(&s.lock);
                self.bind_block(&s.body);
            }
            Stmt::Assert(s) => {
                self.bind_expr(&s.condition);
                if let Some(message) = &s.message {
                    self.bind_expr(message);
                }
            }
            Stmt::ExplicitCtorCall(call) => {
                for argument in &call.arguments {
                    self.bind_expr(argument);
                }
            }
        }
    }

    fn bind_var_decl(&mut self, decl: &VarDeclStmt) {
        self.bind_annotations(&decl.modifiers.annotations, Site::LocalVariable);
        self.bind_type_ref(&decl.type_ref);
        for declarator in &decl.declarators {
            if let Some(init) = &declarator.initializer {
                self.bind_expr(init);
            }
        }
    }

    fn bind_catch(&mut self, clause: &CatchClause) {
        self.bind_annotations(&clause.parameter.modifiers.annotations, Site::Parameter);
        for alternative in &clause.alternatives {
            self.bind_type_ref(alternative);
        }
        if clause.alternatives.is_empty() {
            self.bind_type_ref(&clause.parameter.type_ref);
        }
        self.bind_block(&clause.block);
    }

    fn bind_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) | Expr::This(_) | Expr::Super(_) => {}
            Expr::Identifier(id) => self.scope.note_simple_name(&id.name),
            Expr::FieldAccess(access) => self.bind_expr(&access.target),
            Expr::MethodCall(call) => {
                if let Some(target) = &call.target {
                    self.bind_expr(target);
                }
                for argument in &call.arguments {
                    self.bind_expr(argument);
                }
            }
            Expr::New(new) => {
                self.bind_type_ref(&new.type_ref);
                for argument in &new.arguments {
                    self.bind_expr(argument);
                }
                if let Some(body) = &new.body {
                    let saved = self.local_types.len();
                    self.bind_members(body, None);
                    self.local_types.truncate(saved);
                }
            }
            Expr::NewArray(new) => {
                self.bind_type_ref(&new.type_ref);
                for dim in &new.dimensions {
                    self.bind_expr(dim);
                }
                if let Some(init) = &new.initializer {
                    for element in &init.elements {
                        self.bind_expr(element);
                    }
                }
            }
            Expr::ArrayInit(init) => {
                for element in &init.elements {
                    self.bind_expr(element);
                }
            }
            Expr::ArrayAccess(access) => {
                self.bind_expr(&access.array);
                self.bind_expr(&access.index);
            }
            Expr::Unary(unary) => self.bind_expr(&unary.operand),
            Expr::Binary(binary) => {
                self.bind_expr(&binary.left);
                self.bind_expr(&binary.right);
            }
            Expr::Assignment(assign) => {
                self.bind_expr(&assign.target);
                self.bind_expr(&assign.value);
            }
            Expr::Conditional(cond) => {
                self.bind_expr(&cond.condition);
                self.bind_expr(&cond.then_expr);
                self.bind_expr(&cond.else_expr);
            }
            Expr::Cast(cast) => {
                self.bind_type_ref(&cast.target_type);
                self.bind_expr(&cast.expr);
            }
            Expr::InstanceOf(test) => {
                self.bind_expr(&test.expr);
                self.bind_type_ref(&test.target_type);
            }
            Expr::Lambda(lambda) => {
                for param in &lambda.params {
                    self.bind_annotations(&param.modifiers.annotations, Site::Parameter);
                    if let Some(ty) = &param.type_ref {
                        self.bind_type_ref(ty);
                    }
                }
                match &lambda.body {
                    LambdaBody::Expr(body) => self.bind_expr(body),
                    LambdaBody::Block(block) => self.bind_block(block),
                }
            }
            Expr::MethodRef(reference) => self.bind_expr(&reference.target),
            Expr::Parens(inner) => self.bind_expr(&inner.expr),
            Expr::ClassLiteral(literal) => self.bind_type_ref(&literal.type_ref),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lookup::builtin;
    use crate::parser::parse_java;

    fn messages_for(source: &str) -> Vec<String> {
        let config = Config::default();
        let mut env = LookupEnvironment::new(config.clone());
        env.add_provider(Box::new(builtin::jdk()));
        let unit = parse_java(source).expect("parses");
        let index = env.add_source_unit("X.java", &unit, None);
        env.build_modules().expect("module graph");
        let mut scope = CompilationUnitScope::new(&env, index);
        let mut reporter = ProblemReporter::new(&config);
        bind_unit(&mut env, &mut scope, &unit, &mut reporter);
        reporter.finish().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn unresolved_and_unused_imports() {
        let found = messages_for("import java.util.List;\nimport p.Missing;\nclass X { Foo f; }");
        assert_eq!(
            found,
            vec![
                "The import java.util.List is never used".to_string(),
                "The import p.Missing cannot be resolved".to_string(),
                "Foo cannot be resolved to a type".to_string(),
            ]
        );
    }

    #[test]
    fn used_imports_and_local_types_are_quiet() {
        let found = messages_for(
            "import java.util.List;\nimport java.util.Objects;\nclass X<T> {\n  List<T> items;\n  boolean m(Object o) {\n    class Local {}\n    Local l = new Local();\n    return Objects.equals(o, l);\n  }\n}",
        );
        assert!(found.is_empty(), "unexpected: {:?}", found);
    }

    #[test]
    fn cyclic_hierarchies() {
        let found = messages_for(
            "class A extends B {}\nclass B extends A {}\ninterface I extends J {}\ninterface J extends I {}\nclass S extends S {}\nclass O extends O.In { static class In {} }\nclass C extends A {}",
        );
        assert_eq!(
            found,
            vec![
                "Cycle detected: a cycle exists in the type hierarchy between A and B".to_string(),
                "Cycle detected: a cycle exists in the type hierarchy between B and A".to_string(),
                "Cycle detected: a cycle exists in the type hierarchy between I and J".to_string(),
                "Cycle detected: a cycle exists in the type hierarchy between J and I".to_string(),
                "Cycle detected: the type S cannot extend/implement itself or one of its own member types".to_string(),
                "Cycle detected: the type O cannot extend/implement itself or one of its own member types".to_string(),
            ]
        );
    }
}
