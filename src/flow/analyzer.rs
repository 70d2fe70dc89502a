//! The flow pass over the bodies of one compilation unit.
//!
//! Each statement and expression kind is handled by one exhaustive match.
//! Statement sequences raise at most one reachability complaint per block:
//! `Dead code` for the first statement a constant condition excludes and
//! `Unreachable code` for the first statement after a completed jump.
//! Unreachable statements are not analysed further; dead ones are.

use std::collections::HashMap;

use crate::ast::{
    AssignmentExpr, AssignmentOp, BinaryOp, Block, ClassMember, CompilationUnit, DoWhileStmt, EnumConstant, Expr,
    FieldAccessExpr, FieldDecl, ForEachStmt, ForStmt, HasSpan, IdentifierExpr, LambdaBody, LambdaExpr, Literal,
    LiteralExpr, MethodCallExpr, MethodDecl, Parameter, Span, Stmt, SwitchStmt, TryResource, TryStmt, TypeDecl,
    TypeParam, TypeRef, UnaryExpr, UnaryOp, VarDeclStmt, VariableDeclarator, WhileStmt,
};
use crate::config::Config;
use crate::consts::JAVA_LANG;
use crate::diagnostics::{messages, Category, ProblemReporter};
use crate::lookup::{
    CompilationUnitScope, FieldBinding, LookupEnvironment, LookupResult, MethodBinding, Nullness, TypeId,
};

use super::constant;
use super::context::{FlowContext, Frame, FrameKind, JumpKind};
use super::info::{Branches, FlowInfo, NullStatus, Reach, VarId};
use super::nullness::{status_for, FunctionalTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VarKind {
    Local,
    Parameter,
    Field { is_static: bool },
}

#[derive(Debug, Clone)]
pub(super) struct Variable {
    pub name: String,
    pub kind: VarKind,
    pub is_final: bool,
    /// Final and declared without an initializer.
    pub blank: bool,
    pub name_span: Span,
    pub type_ref: Option<TypeRef>,
    /// Declared or inherited nullness; `Unknown` when null analysis is off.
    pub declared: Nullness,
    /// Value of a constant `final boolean`.
    pub constant: Option<bool>,
    pub read: bool,
    pub check_unused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BodyKind {
    Constructor,
    InstanceInitializer,
    StaticInitializer,
    Method,
    Lambda,
}

/// What a `return` in the current body must satisfy.
#[derive(Debug, Clone)]
pub(super) struct ReturnContract {
    pub type_ref: TypeRef,
    pub nullness: Nullness,
    /// Type whose unit the return type is written in, when not this one.
    pub owner: Option<TypeId>,
}

struct ClassFrame {
    name: String,
    binding: Option<TypeId>,
    /// One variable per field declarator, in declaration order.
    fields: Vec<VarId>,
    /// Lexical scopes below this index belong to enclosing bodies.
    scope_floor: usize,
}

/// A class body, named or anonymous.
struct ClassShape<'t> {
    name: &'t str,
    members: &'t [ClassMember],
    enum_constants: &'t [EnumConstant],
    type_params: &'t [TypeParam],
    is_interface: bool,
}

pub struct FlowAnalyzer<'a, 'r> {
    pub(super) env: &'a mut LookupEnvironment,
    pub(super) scope: &'a mut CompilationUnitScope,
    pub(super) reporter: &'a mut ProblemReporter<'r>,
    pub(super) config: Config,
    pub(super) vars: Vec<Variable>,
    context: FlowContext,
    scopes: Vec<Vec<VarId>>,
    classes: Vec<ClassFrame>,
    bodies: Vec<BodyKind>,
    returns: Vec<Option<ReturnContract>>,
    type_vars: Vec<String>,
    pending_labels: Vec<String>,
    unit_scopes: HashMap<usize, CompilationUnitScope>,
}

impl<'a, 'r> FlowAnalyzer<'a, 'r> {
    pub fn new(
        env: &'a mut LookupEnvironment,
        scope: &'a mut CompilationUnitScope,
        reporter: &'a mut ProblemReporter<'r>,
    ) -> Self {
        let config = env.config().clone();
        Self {
            env,
            scope,
            reporter,
            config,
            vars: Vec::new(),
            context: FlowContext::new(),
            scopes: Vec::new(),
            classes: Vec::new(),
            bodies: Vec::new(),
            returns: Vec::new(),
            type_vars: Vec::new(),
            pending_labels: Vec::new(),
            unit_scopes: HashMap::new(),
        }
    }

    pub fn analyze_unit(&mut self, unit: &CompilationUnit) {
        let ids = self.env.unit(self.scope.unit()).types.clone();
        for (index, decl) in unit.type_decls.iter().enumerate() {
            self.analyze_type(decl, ids.get(index).copied(), &FlowInfo::reachable());
        }
        log::debug!("flow: {} variables tracked in unit {}", self.vars.len(), self.scope.unit());
    }

    pub(super) fn report(&mut self, category: Category, template: &'static str, arguments: Vec<String>, span: Span) {
        self.reporter.report(category, template, arguments, span);
    }

    // ----- classes -----

    fn analyze_type(&mut self, decl: &TypeDecl, binding: Option<TypeId>, outer: &FlowInfo) {
        log::trace!("flow: type {}", decl.name);
        if let Some(id) = binding {
            self.env.complete(id);
        }
        let member_ids = binding.map(|id| self.env.type_binding(id).member_types.clone()).unwrap_or_default();
        let shape = ClassShape {
            name: &decl.name,
            members: &decl.members,
            enum_constants: &decl.enum_constants,
            type_params: &decl.type_params,
            is_interface: decl.is_interface(),
        };
        self.analyze_class(&shape, binding, member_ids, outer);
    }

    fn analyze_anonymous(&mut self, name: &str, members: &[ClassMember], outer: &FlowInfo) {
        let shape = ClassShape { name, members, enum_constants: &[], type_params: &[], is_interface: false };
        self.analyze_class(&shape, None, Vec::new(), outer);
    }

    fn analyze_class(&mut self, shape: &ClassShape<'_>, binding: Option<TypeId>, member_ids: Vec<TypeId>, outer: &FlowInfo) {
        let saved_type_vars = self.type_vars.len();
        self.type_vars.extend(shape.type_params.iter().map(|p| p.name.clone()));
        self.check_member_contracts(shape.members, binding);

        let fields = self.declare_fields(shape);
        let scope_floor = self.scopes.len();
        self.classes.push(ClassFrame { name: shape.name.to_string(), binding, fields, scope_floor });

        self.analyze_static_members(shape, outer);
        let after_init = self.analyze_instance_initializers(shape, outer);

        let bound: Vec<MethodBinding> = binding.map(|id| self.env.type_binding(id).methods.clone()).unwrap_or_default();
        let mut has_constructor = false;
        let methods = shape.members.iter().filter_map(|m| match m {
            ClassMember::Method(method) => Some(method),
            _ => None,
        });
        for (index, method) in methods.enumerate() {
            if method.is_constructor() {
                has_constructor = true;
                self.analyze_constructor(method, bound.get(index), &after_init);
            } else {
                let start = self.method_entry(outer);
                self.analyze_method(method, bound.get(index), BodyKind::Method, start);
            }
        }
        if !has_constructor && !shape.is_interface && after_init.is_reachable() {
            for var in self.blank_finals(false) {
                if !after_init.has_assignment(var) {
                    let name = self.vars[var].name.clone();
                    let span = self.vars[var].name_span;
                    self.report(Category::UninitializedBlankFinal, messages::BLANK_FINAL_NOT_INITIALIZED, vec![name], span);
                }
            }
        }

        let mut member_ids = member_ids.into_iter();
        for member in shape.members {
            if let ClassMember::Type(decl) = member {
                let id = member_ids.next();
                self.analyze_type(decl, id, outer);
            }
        }
        for constant in shape.enum_constants {
            if let Some(body) = &constant.body {
                self.analyze_anonymous(&constant.name, body, outer);
            }
        }

        self.classes.pop();
        self.type_vars.truncate(saved_type_vars);
    }

    fn declare_fields(&mut self, shape: &ClassShape<'_>) -> Vec<VarId> {
        let mut fields = Vec::new();
        for member in shape.members {
            let ClassMember::Field(field) = member else { continue };
            let is_static = shape.is_interface || field.modifiers.is_static();
            let is_final = shape.is_interface || field.modifiers.is_final();
            for declarator in &field.declarators {
                let mut type_ref = field.type_ref.clone();
                type_ref.dims += declarator.extra_dims;
                let constant = match (&declarator.initializer, is_final) {
                    (Some(init), true) => constant::boolean_value(init, &mut |_| None),
                    _ => None,
                };
                let declared = self.explicit_nullness(&field.modifiers.annotations, &type_ref);
                self.vars.push(Variable {
                    name: declarator.name.clone(),
                    kind: VarKind::Field { is_static },
                    is_final,
                    blank: is_final && declarator.initializer.is_none(),
                    name_span: declarator.name_span,
                    type_ref: Some(type_ref),
                    declared,
                    constant,
                    read: false,
                    check_unused: false,
                });
                fields.push(self.vars.len() - 1);
            }
        }
        fields
    }

    /// Field declarators of the class body paired with their variables.
    fn field_declarators<'t>(&self, shape: &ClassShape<'t>) -> Vec<(VarId, &'t FieldDecl, &'t VariableDeclarator)> {
        let vars = self.classes.last().map(|c| c.fields.clone()).unwrap_or_default();
        let declarators = shape.members.iter().filter_map(|m| match m {
            ClassMember::Field(field) => Some(field),
            _ => None,
        });
        declarators
            .flat_map(|field| field.declarators.iter().map(move |d| (field, d)))
            .zip(vars)
            .map(|((field, declarator), var)| (var, field, declarator))
            .collect()
    }

    fn blank_finals(&self, statics: bool) -> Vec<VarId> {
        let Some(class) = self.classes.last() else { return Vec::new() };
        class
            .fields
            .iter()
            .copied()
            .filter(|v| self.vars[*v].blank && self.vars[*v].kind == VarKind::Field { is_static: statics })
            .collect()
    }

    fn analyze_static_members(&mut self, shape: &ClassShape<'_>, outer: &FlowInfo) {
        let mut info = outer.clone();
        self.enter_body(BodyKind::StaticInitializer, None);
        for constant in shape.enum_constants {
            for argument in &constant.arguments {
                info = self.analyze_expr(argument, info);
            }
        }
        let declarators = self.field_declarators(shape);
        let mut declarators = declarators.into_iter();
        for member in shape.members {
            match member {
                ClassMember::Field(field) => {
                    for _ in &field.declarators {
                        let Some((var, _, declarator)) = declarators.next() else { break };
                        if self.vars[var].kind != (VarKind::Field { is_static: true }) {
                            continue;
                        }
                        if let Some(init) = &declarator.initializer {
                            info = self.analyze_field_initializer(var, init, info);
                        }
                    }
                }
                ClassMember::Initializer(block) if block.is_static => info = self.analyze_block(&block.body, info),
                _ => {}
            }
        }
        self.exit_body();
        if info.is_reachable() {
            for var in self.blank_finals(true) {
                if !info.has_assignment(var) {
                    let name = self.vars[var].name.clone();
                    let span = self.vars[var].name_span;
                    self.report(Category::UninitializedBlankFinal, messages::BLANK_FINAL_NOT_INITIALIZED, vec![name], span);
                }
            }
        }
    }

    /// Field initializers and instance initializer blocks, in order. The
    /// result is the state at the start of a non-delegating constructor.
    fn analyze_instance_initializers(&mut self, shape: &ClassShape<'_>, outer: &FlowInfo) -> FlowInfo {
        let mut info = outer.clone();
        let declarators = self.field_declarators(shape);
        for (var, _, _) in &declarators {
            if self.vars[*var].kind == (VarKind::Field { is_static: true }) {
                info.mark_assigned(*var);
            }
        }
        self.enter_body(BodyKind::InstanceInitializer, None);
        let mut declarators = declarators.into_iter();
        for member in shape.members {
            match member {
                ClassMember::Field(field) => {
                    for _ in &field.declarators {
                        let Some((var, _, declarator)) = declarators.next() else { break };
                        if self.vars[var].kind != (VarKind::Field { is_static: false }) {
                            continue;
                        }
                        if let Some(init) = &declarator.initializer {
                            info = self.analyze_field_initializer(var, init, info);
                        }
                    }
                }
                ClassMember::Initializer(block) if !block.is_static => info = self.analyze_block(&block.body, info),
                _ => {}
            }
        }
        self.exit_body();
        info
    }

    fn analyze_field_initializer(&mut self, var: VarId, init: &Expr, info: FlowInfo) -> FlowInfo {
        let type_ref = self.vars[var].type_ref.clone();
        let mut info = self.analyze_expr_expecting(init, info, type_ref.as_ref().map(|t| (t, None)));
        if self.vars[var].declared == Nullness::NonNull {
            if let Some(type_ref) = &type_ref {
                self.check_nonnull_slot(type_ref, init, &info);
            }
        }
        info.mark_assigned(var);
        info
    }

    /// Entry state of a method: every field of the class is assigned.
    fn method_entry(&self, outer: &FlowInfo) -> FlowInfo {
        let mut info = outer.clone();
        if let Some(class) = self.classes.last() {
            for var in &class.fields {
                info.mark_assigned(*var);
            }
        }
        info
    }

    fn analyze_constructor(&mut self, method: &MethodDecl, bound: Option<&MethodBinding>, after_init: &FlowInfo) {
        let mut start = after_init.clone();
        if method.delegates_to_this() {
            for var in self.blank_finals(false) {
                start.mark_assigned(var);
            }
        }
        let exit = self.analyze_method(method, bound, BodyKind::Constructor, start);
        if !exit.is_reachable() {
            return;
        }
        for var in self.blank_finals(false) {
            if !exit.has_assignment(var) {
                let name = self.vars[var].name.clone();
                self.report(Category::UninitializedBlankFinal, messages::BLANK_FINAL_NOT_INITIALIZED, vec![name], method.name_span);
            }
        }
    }

    /// Analyse a method or constructor body; returns the state at its exit,
    /// normal completion joined with every `return`.
    fn analyze_method(&mut self, method: &MethodDecl, bound: Option<&MethodBinding>, kind: BodyKind, start: FlowInfo) -> FlowInfo {
        let Some(body) = &method.body else { return start };
        let saved_type_vars = self.type_vars.len();
        self.type_vars.extend(method.type_params.iter().map(|p| p.name.clone()));

        let (param_nulls, return_null) = self.effective_contract(method, bound);
        let contract = method
            .return_type
            .as_ref()
            .filter(|t| !t.is_void())
            .map(|t| ReturnContract { type_ref: t.clone(), nullness: return_null, owner: None });
        self.enter_body(kind, contract);
        self.scopes.push(Vec::new());
        let mut info = start;
        for (index, param) in method.parameters.iter().enumerate() {
            let declared = param_nulls.get(index).copied().unwrap_or(Nullness::Unknown);
            self.declare_parameter(param, declared, &mut info);
        }
        let out = self.analyze_statements(&body.statements, info);
        self.pop_scope();
        let frame = self.exit_body();
        self.type_vars.truncate(saved_type_vars);
        join_optional(out, frame.returns)
    }

    fn enter_body(&mut self, kind: BodyKind, contract: Option<ReturnContract>) {
        self.bodies.push(kind);
        self.returns.push(contract);
        self.context.push(FrameKind::Body);
    }

    fn exit_body(&mut self) -> Frame {
        self.bodies.pop();
        self.returns.pop();
        self.context.pop()
    }

    // ----- variables -----

    fn declare(&mut self, variable: Variable) -> VarId {
        self.vars.push(variable);
        let id = self.vars.len() - 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(id);
        }
        id
    }

    fn declare_parameter(&mut self, param: &Parameter, declared: Nullness, info: &mut FlowInfo) -> VarId {
        let mut type_ref = param.type_ref.clone();
        if param.varargs {
            type_ref.dims += 1;
        }
        let var = self.declare(Variable {
            name: param.name.clone(),
            kind: VarKind::Parameter,
            is_final: param.modifiers.is_final(),
            blank: false,
            name_span: param.name_span,
            type_ref: Some(type_ref),
            declared,
            constant: None,
            read: false,
            check_unused: false,
        });
        info.mark_assigned(var);
        info.set_null_status(var, status_for(declared));
        var
    }

    /// Close the innermost lexical scope, reporting locals never read.
    fn pop_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else { return };
        for var in scope {
            let variable = &self.vars[var];
            if variable.check_unused && !variable.read {
                let name = variable.name.clone();
                let span = variable.name_span;
                self.report(Category::UnusedLocal, messages::UNUSED_LOCAL, vec![name], span);
            }
        }
    }

    fn find_in_scopes(&self, scopes: &[Vec<VarId>], name: &str) -> Option<VarId> {
        scopes
            .iter()
            .rev()
            .find_map(|scope| scope.iter().rev().copied().find(|v| self.vars[*v].name == name))
    }

    /// A local of the current class body, then a field of the class, then a
    /// local captured from an enclosing body.
    pub(super) fn resolve_var(&self, name: &str) -> Option<VarId> {
        let floor = self.classes.last().map(|c| c.scope_floor).unwrap_or(0).min(self.scopes.len());
        if let Some(var) = self.find_in_scopes(&self.scopes[floor..], name) {
            return Some(var);
        }
        if let Some(class) = self.classes.last() {
            if let Some(var) = class.fields.iter().copied().find(|v| self.vars[*v].name == name) {
                return Some(var);
            }
        }
        self.find_in_scopes(&self.scopes[..floor], name)
    }

    /// The local variable or parameter `expr` names.
    pub(super) fn local_of(&self, expr: &Expr) -> Option<VarId> {
        match expr.unparenthesized() {
            Expr::Identifier(id) => self
                .resolve_var(&id.name)
                .filter(|v| !matches!(self.vars[*v].kind, VarKind::Field { .. })),
            _ => None,
        }
    }

    /// `this.x` for a field of the current class.
    pub(super) fn this_field(&self, access: &FieldAccessExpr) -> Option<VarId> {
        if !matches!(access.target.unparenthesized(), Expr::This(this) if this.qualifier.is_none()) {
            return None;
        }
        let class = self.classes.last()?;
        class.fields.iter().copied().find(|v| self.vars[*v].name == access.name)
    }

    fn assignable_var(&self, target: &Expr) -> Option<VarId> {
        match target {
            Expr::Identifier(id) => self.resolve_var(&id.name),
            Expr::FieldAccess(access) => self.this_field(access),
            _ => None,
        }
    }

    /// Whether blank finals of the given kind may still be initialized here.
    fn in_initialization(&self, is_static: bool) -> bool {
        match self.bodies.last() {
            Some(BodyKind::StaticInitializer) => is_static,
            Some(BodyKind::Constructor | BodyKind::InstanceInitializer) => !is_static,
            _ => false,
        }
    }

    fn read_var(&mut self, var: VarId, span: Span, info: &FlowInfo, mark_read: bool) {
        match self.vars[var].kind {
            VarKind::Local | VarKind::Parameter => {
                if mark_read {
                    self.vars[var].read = true;
                }
                if !info.is_assigned(var) {
                    let name = self.vars[var].name.clone();
                    self.report(Category::UninitializedVariable, messages::LOCAL_NOT_INITIALIZED, vec![name], span);
                }
            }
            VarKind::Field { is_static } => {
                if self.vars[var].blank && self.in_initialization(is_static) && !info.is_assigned(var) {
                    let name = self.vars[var].name.clone();
                    self.report(Category::UninitializedBlankFinal, messages::BLANK_FINAL_NOT_INITIALIZED, vec![name], span);
                }
            }
        }
    }

    fn read_identifier(&mut self, id: &IdentifierExpr, info: &FlowInfo) {
        if let Some(var) = self.resolve_var(&id.name) {
            self.read_var(var, id.span, info, true);
        }
    }

    /// Record a write, checking final variables first.
    fn write_var(&mut self, var: VarId, span: Span, compound: bool, info: &mut FlowInfo) {
        let Variable { is_final, blank, kind, .. } = self.vars[var];
        if is_final {
            let name = self.vars[var].name.clone();
            match kind {
                VarKind::Local | VarKind::Parameter => {
                    if compound || !blank {
                        self.report(Category::FinalAssignment, messages::FINAL_LOCAL_CANNOT_BE_ASSIGNED, vec![name], span);
                    } else if info.is_potentially_assigned(var) {
                        self.report(Category::FinalAssignment, messages::FINAL_LOCAL_ALREADY_ASSIGNED, vec![name], span);
                    }
                }
                VarKind::Field { is_static } => {
                    if compound || !blank || !self.in_initialization(is_static) {
                        let class = self.classes.last().map(|c| c.name.clone()).unwrap_or_default();
                        let qualified = format!("{}.{}", class, name);
                        self.report(Category::FinalAssignment, messages::FINAL_FIELD_CANNOT_BE_ASSIGNED, vec![qualified], span);
                    } else if info.is_potentially_assigned(var) {
                        self.report(Category::FinalAssignment, messages::FINAL_FIELD_ALREADY_ASSIGNED, vec![name], span);
                    }
                }
            }
        }
        info.mark_assigned(var);
        self.context.note_assignment(var);
    }

    // ----- statements -----

    fn analyze_block(&mut self, block: &Block, info: FlowInfo) -> FlowInfo {
        self.scopes.push(Vec::new());
        let out = self.analyze_statements(&block.statements, info);
        self.pop_scope();
        out
    }

    fn analyze_statements(&mut self, statements: &[Stmt], mut info: FlowInfo) -> FlowInfo {
        // 0: nothing reported yet, 1: dead code reported, 2: unreachable code reported
        let mut complained = if info.is_reachable() { 0 } else { 1 };
        for stmt in statements {
            match info.reach() {
                Reach::Unreachable => {
                    if complained < 2 {
                        self.report(Category::UnreachableCode, messages::UNREACHABLE_CODE, vec![], stmt.span());
                        complained = 2;
                    }
                    continue;
                }
                Reach::Dead if complained < 1 => {
                    self.report(Category::DeadCode, messages::DEAD_CODE, vec![], stmt.span());
                    complained = 1;
                }
                _ => {}
            }
            info = self.analyze_stmt(stmt, info);
        }
        info
    }

    /// A branch a condition selects; reported when the condition excludes it.
    fn analyze_branch(&mut self, stmt: &Stmt, info: FlowInfo, report_dead: bool) -> FlowInfo {
        if report_dead && info.reach() == Reach::Dead {
            self.report(Category::DeadCode, messages::DEAD_CODE, vec![], stmt.span());
        }
        self.analyze_stmt(stmt, info)
    }

    fn note_dead_operand(&mut self, operand: &Expr, info: &FlowInfo, live: bool) {
        if live && info.reach() == Reach::Dead {
            self.report(Category::DeadCode, messages::DEAD_CODE, vec![], operand.span());
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt, info: FlowInfo) -> FlowInfo {
        match stmt {
            Stmt::Block(block) => self.analyze_block(block, info),
            Stmt::VarDecl(decl) => self.analyze_var_decl(decl, info, true),
            Stmt::LocalType(decl) => {
                self.analyze_type(decl, None, &info);
                info
            }
            Stmt::Expr(stmt) => self.analyze_effect(&stmt.expr, info),
            Stmt::If(stmt) => {
                let trivial = constant::is_trivial_condition(&stmt.condition) && !self.config.report_dead_code_in_trivial_if;
                let report_dead = info.is_reachable() && !trivial;
                let branches = self.analyze_condition(&stmt.condition, info);
                let then_out = self.analyze_branch(&stmt.then_branch, branches.when_true, report_dead);
                let else_out = match &stmt.else_branch {
                    Some(branch) => self.analyze_branch(branch, branches.when_false, report_dead),
                    None => branches.when_false,
                };
                then_out.join(&else_out)
            }
            Stmt::While(stmt) => self.analyze_while(stmt, info),
            Stmt::DoWhile(stmt) => self.analyze_do_while(stmt, info),
            Stmt::For(stmt) => self.analyze_for(stmt, info),
            Stmt::ForEach(stmt) => self.analyze_for_each(stmt, info),
            Stmt::Switch(stmt) => self.analyze_switch(stmt, info),
            Stmt::Return(stmt) => {
                let mut info = info;
                if let Some(value) = &stmt.value {
                    let contract = self.returns.last().cloned().flatten();
                    info = self.analyze_expr_expecting(value, info, contract.as_ref().map(|c| (&c.type_ref, c.owner)));
                    if let Some(contract) = contract.filter(|c| c.nullness == Nullness::NonNull) {
                        self.check_nonnull_slot(&contract.type_ref, value, &info);
                    }
                }
                self.context.jump(JumpKind::Return, None, &info);
                FlowInfo::unreachable()
            }
            Stmt::Break(jump) => {
                self.context.jump(JumpKind::Break, jump.label.as_deref(), &info);
                FlowInfo::unreachable()
            }
            Stmt::Continue(jump) => {
                self.context.jump(JumpKind::Continue, jump.label.as_deref(), &info);
                FlowInfo::unreachable()
            }
            Stmt::Throw(stmt) => {
                let mut info = self.analyze_expr(&stmt.expr, info);
                self.check_dereference(&stmt.expr, &mut info);
                FlowInfo::unreachable()
            }
            Stmt::Try(stmt) => self.analyze_try(stmt, info),
            Stmt::Labeled(stmt) => {
                if is_loop(innermost(&stmt.statement)) {
                    self.pending_labels.push(stmt.label.clone());
                }
                self.context.push(FrameKind::Labeled { label: stmt.label.clone() });
                let out = self.analyze_stmt(&stmt.statement, info);
                let frame = self.context.pop();
                join_optional(out, frame.breaks)
            }
            Stmt::Synchronized(stmt) => {
                let mut info = self.analyze_expr(&stmt.lock, info);
                self.check_dereference(&stmt.lock, &mut info);
                self.analyze_block(&stmt.body, info)
            }
            Stmt::Assert(stmt) => {
                let branches = self.analyze_condition(&stmt.condition, info.clone());
                let mut failed = branches.when_false;
                if let Some(message) = &stmt.message {
                    failed = self.analyze_expr(message, failed);
                }
                let mut out = info;
                out.add_potential(branches.when_true.potential());
                out.add_potential(failed.potential());
                out
            }
            Stmt::ExplicitCtorCall(call) => {
                let mut info = info;
                for argument in &call.arguments {
                    info = self.analyze_expr(argument, info);
                }
                info
            }
            Stmt::Empty(_) => info,
        }
    }

    fn analyze_var_decl(&mut self, decl: &VarDeclStmt, mut info: FlowInfo, check_unused: bool) -> FlowInfo {
        if self.config.null_analysis {
            self.check_primitive_annotation(&decl.modifiers.annotations, &decl.type_ref);
        }
        let declared = self.explicit_nullness(&decl.modifiers.annotations, &decl.type_ref);
        let is_final = decl.modifiers.is_final();
        for declarator in &decl.declarators {
            let mut type_ref = decl.type_ref.clone();
            type_ref.dims += declarator.extra_dims;
            let constant = match &declarator.initializer {
                Some(init) if is_final && type_ref.name == "boolean" && type_ref.dims == 0 => self.constant_value(init),
                _ => None,
            };
            let var = self.declare(Variable {
                name: declarator.name.clone(),
                kind: VarKind::Local,
                is_final,
                blank: is_final && declarator.initializer.is_none(),
                name_span: declarator.name_span,
                type_ref: Some(type_ref.clone()),
                declared,
                constant,
                read: false,
                check_unused,
            });
            if let Some(init) = &declarator.initializer {
                info = self.analyze_expr_expecting(init, info, Some((&type_ref, None)));
                if declared == Nullness::NonNull {
                    self.check_nonnull_slot(&type_ref, init, &info);
                }
                let status = self.null_status_of(init, &info);
                info.mark_assigned(var);
                self.context.note_assignment(var);
                info.set_null_status(var, status);
            }
        }
        info
    }

    /// Silent pass over a loop computing the state at its back edge.
    fn speculate(&mut self, pass: impl FnOnce(&mut Self) -> FlowInfo) -> FlowInfo {
        self.reporter.mute();
        self.context.push(FrameKind::Speculative);
        let back = pass(self);
        self.context.pop();
        self.reporter.unmute();
        back
    }

    fn analyze_while(&mut self, stmt: &WhileStmt, info: FlowInfo) -> FlowInfo {
        let labels = std::mem::take(&mut self.pending_labels);
        let constant = self.constant_value(&stmt.condition);
        let mut entry = info;
        if entry.is_reachable() {
            let back = self.speculate(|this| {
                this.context.push(FrameKind::Loop { labels: labels.clone() });
                let branches = this.analyze_condition(&stmt.condition, entry.clone());
                let body_out = this.analyze_stmt(&stmt.body, branches.when_true);
                let frame = this.context.pop();
                join_optional(body_out, frame.continues)
            });
            entry.merge_back_edge(&back);
        }

        let live = entry.is_reachable();
        self.context.push(FrameKind::Loop { labels });
        let branches = self.analyze_condition(&stmt.condition, entry);
        let body_out = if constant == Some(false) {
            self.report(Category::UnreachableCode, messages::UNREACHABLE_CODE, vec![], stmt.body.span());
            FlowInfo::unreachable()
        } else {
            self.analyze_branch(&stmt.body, branches.when_true, live)
        };
        let frame = self.context.pop();
        let mut exit = if constant == Some(true) { FlowInfo::unreachable() } else { branches.when_false };
        exit.add_potential(body_out.potential());
        join_optional(exit, frame.breaks)
    }

    fn analyze_do_while(&mut self, stmt: &DoWhileStmt, info: FlowInfo) -> FlowInfo {
        let labels = std::mem::take(&mut self.pending_labels);
        let constant = self.constant_value(&stmt.condition);
        let mut entry = info;
        if entry.is_reachable() {
            let back = self.speculate(|this| {
                this.context.push(FrameKind::Loop { labels: labels.clone() });
                let body_out = this.analyze_stmt(&stmt.body, entry.clone());
                let frame = this.context.pop();
                let condition_in = join_optional(body_out, frame.continues);
                this.analyze_condition(&stmt.condition, condition_in).when_true
            });
            entry.merge_back_edge(&back);
        }

        self.context.push(FrameKind::Loop { labels });
        let body_out = self.analyze_stmt(&stmt.body, entry);
        let frame = self.context.pop();
        let condition_in = join_optional(body_out, frame.continues);
        let exit = if condition_in.is_unreachable() {
            condition_in
        } else {
            let branches = self.analyze_condition(&stmt.condition, condition_in);
            if constant == Some(true) {
                let mut exit = FlowInfo::unreachable();
                exit.add_potential(branches.when_false.potential());
                exit
            } else {
                branches.when_false
            }
        };
        join_optional(exit, frame.breaks)
    }

    fn for_condition(&mut self, condition: Option<&Expr>, info: FlowInfo) -> Branches {
        match condition {
            Some(condition) => self.analyze_condition(condition, info),
            None => Branches { when_false: info.dead(), when_true: info },
        }
    }

    fn analyze_updates(&mut self, updates: &[Expr], mut info: FlowInfo) -> FlowInfo {
        for update in updates {
            info = self.analyze_effect(update, info);
        }
        info
    }

    fn analyze_for(&mut self, stmt: &ForStmt, info: FlowInfo) -> FlowInfo {
        let labels = std::mem::take(&mut self.pending_labels);
        self.scopes.push(Vec::new());
        let mut entry = info;
        for init in &stmt.init {
            entry = self.analyze_stmt(init, entry);
        }
        let constant = match &stmt.condition {
            Some(condition) => self.constant_value(condition),
            None => Some(true),
        };
        if entry.is_reachable() {
            let back = self.speculate(|this| {
                this.context.push(FrameKind::Loop { labels: labels.clone() });
                let branches = this.for_condition(stmt.condition.as_ref(), entry.clone());
                let body_out = this.analyze_stmt(&stmt.body, branches.when_true);
                let frame = this.context.pop();
                let update_in = join_optional(body_out, frame.continues);
                this.analyze_updates(&stmt.update, update_in)
            });
            entry.merge_back_edge(&back);
        }

        let live = entry.is_reachable();
        self.context.push(FrameKind::Loop { labels });
        let branches = self.for_condition(stmt.condition.as_ref(), entry);
        let body_out = if constant == Some(false) {
            self.report(Category::UnreachableCode, messages::UNREACHABLE_CODE, vec![], stmt.body.span());
            FlowInfo::unreachable()
        } else {
            self.analyze_branch(&stmt.body, branches.when_true, live)
        };
        let frame = self.context.pop();
        let update_in = join_optional(body_out, frame.continues);
        let update_out = if update_in.is_unreachable() { update_in } else { self.analyze_updates(&stmt.update, update_in) };
        let mut exit = if constant == Some(true) { FlowInfo::unreachable() } else { branches.when_false };
        exit.add_potential(update_out.potential());
        let exit = join_optional(exit, frame.breaks);
        self.pop_scope();
        exit
    }

    fn analyze_for_each(&mut self, stmt: &ForEachStmt, info: FlowInfo) -> FlowInfo {
        let labels = std::mem::take(&mut self.pending_labels);
        let mut info = self.analyze_expr(&stmt.iterable, info);
        self.check_dereference(&stmt.iterable, &mut info);
        self.scopes.push(Vec::new());
        let declared = self.explicit_nullness(&stmt.variable.modifiers.annotations, &stmt.variable.type_ref);
        let mut entry = info;
        self.declare_parameter(&stmt.variable, declared, &mut entry);
        if entry.is_reachable() {
            let back = self.speculate(|this| {
                this.context.push(FrameKind::Loop { labels: labels.clone() });
                let body_out = this.analyze_stmt(&stmt.body, entry.clone());
                let frame = this.context.pop();
                join_optional(body_out, frame.continues)
            });
            entry.merge_back_edge(&back);
        }

        self.context.push(FrameKind::Loop { labels });
        let body_out = self.analyze_stmt(&stmt.body, entry.clone());
        let frame = self.context.pop();
        let back = join_optional(body_out, frame.continues);
        let exit = join_optional(entry.join(&back), frame.breaks);
        self.pop_scope();
        exit
    }

    fn analyze_switch(&mut self, stmt: &SwitchStmt, info: FlowInfo) -> FlowInfo {
        let selected = self.analyze_expr(&stmt.selector, info);
        self.context.push(FrameKind::Switch);
        self.scopes.push(Vec::new());
        let mut fallthrough = FlowInfo::unreachable();
        for case in &stmt.cases {
            let entry = selected.join(&fallthrough);
            fallthrough = self.analyze_statements(&case.statements, entry);
        }
        self.pop_scope();
        let frame = self.context.pop();
        let mut exit = fallthrough;
        if !stmt.cases.iter().any(|c| c.is_default) {
            exit = exit.join(&selected);
        }
        join_optional(exit, frame.breaks)
    }

    fn analyze_try(&mut self, stmt: &TryStmt, info: FlowInfo) -> FlowInfo {
        let has_finally = stmt.finally_block.is_some();
        let try_entry = info.clone();

        self.context.push(FrameKind::Try { has_finally });
        self.scopes.push(Vec::new());
        let mut info = info;
        for resource in &stmt.resources {
            info = match resource {
                TryResource::Declaration(decl) => self.analyze_var_decl(decl, info, false),
                TryResource::Expression(expr) => self.analyze_expr(expr, info),
            };
        }
        let try_out = self.analyze_block(&stmt.try_block, info);
        self.pop_scope();
        let try_frame = self.context.pop();

        // A handler may be entered after any assignment inside the try block.
        let mut handler_entry = try_entry.clone();
        handler_entry.add_potential(&try_frame.assigned_inside);
        handler_entry.join_nulls_from(&try_out);

        self.context.push(FrameKind::Try { has_finally });
        let mut normal = try_out;
        for clause in &stmt.catch_clauses {
            self.scopes.push(Vec::new());
            let mut entry = handler_entry.clone();
            let var = self.declare_parameter(&clause.parameter, Nullness::Unknown, &mut entry);
            entry.set_null_status(var, NullStatus::NonNull);
            let out = self.analyze_block(&clause.block, entry);
            self.pop_scope();
            normal = normal.join(&out);
        }
        let catch_frame = self.context.pop();

        let Some(finally) = &stmt.finally_block else { return normal };
        let mut finally_entry = try_entry.join(&normal);
        finally_entry.add_potential(&try_frame.assigned_inside);
        finally_entry.add_potential(&catch_frame.assigned_inside);
        let finally_out = self.analyze_block(finally, finally_entry);
        if finally_out.is_unreachable() {
            return FlowInfo::unreachable();
        }
        for exit in try_frame.pending.into_iter().chain(catch_frame.pending) {
            let mut info = exit.info;
            info.add_assignments_from(&finally_out);
            self.context.jump(exit.jump_kind, exit.target_label.as_deref(), &info);
        }
        normal.add_assignments_from(&finally_out);
        normal
    }

    // ----- expressions -----

    /// An expression evaluated for its side effects only.
    fn analyze_effect(&mut self, expr: &Expr, info: FlowInfo) -> FlowInfo {
        match expr.unparenthesized() {
            Expr::Assignment(assign) => self.analyze_assignment(assign, info, true),
            Expr::Unary(unary) if unary.op.is_increment() => self.analyze_increment(unary, info, true),
            _ => self.analyze_expr(expr, info),
        }
    }

    /// Like [`FlowAnalyzer::analyze_expr`], with the type the value flows
    /// into, which gives lambdas and method references their target.
    pub(super) fn analyze_expr_expecting(
        &mut self,
        expr: &Expr,
        info: FlowInfo,
        expected: Option<(&TypeRef, Option<TypeId>)>,
    ) -> FlowInfo {
        match expr.unparenthesized() {
            Expr::Lambda(lambda) => {
                let target = expected.and_then(|(type_ref, owner)| self.functional_target(type_ref, owner));
                self.analyze_lambda(lambda, info, target)
            }
            Expr::MethodRef(reference) => {
                let target = expected.and_then(|(type_ref, owner)| self.functional_target(type_ref, owner));
                self.analyze_method_ref(reference, info, target)
            }
            _ => self.analyze_expr(expr, info),
        }
    }

    pub(super) fn analyze_expr(&mut self, expr: &Expr, info: FlowInfo) -> FlowInfo {
        match expr {
            Expr::Literal(_) | Expr::This(_) | Expr::Super(_) | Expr::ClassLiteral(_) => info,
            Expr::Identifier(id) => {
                self.read_identifier(id, &info);
                info
            }
            Expr::FieldAccess(access) => {
                if let Some(var) = self.this_field(access) {
                    self.read_var(var, access.span, &info, true);
                    return info;
                }
                let mut info = self.analyze_expr(&access.target, info);
                self.check_dereference(&access.target, &mut info);
                info
            }
            Expr::MethodCall(call) => {
                let mut info = info;
                if let Some(target) = &call.target {
                    info = self.analyze_expr(target, info);
                    self.check_dereference(target, &mut info);
                }
                let method = self.resolve_call(call);
                self.analyze_arguments(&call.arguments, method.as_ref(), info)
            }
            Expr::New(new) => {
                let constructor = self.resolve_constructor(&new.type_ref, new.arguments.len());
                let info = self.analyze_arguments(&new.arguments, constructor.as_ref(), info);
                if let Some(body) = &new.body {
                    self.analyze_anonymous(new.type_ref.simple_name(), body, &info);
                }
                info
            }
            Expr::NewArray(array) => {
                let mut info = info;
                for dimension in &array.dimensions {
                    info = self.analyze_expr(dimension, info);
                }
                if let Some(init) = &array.initializer {
                    for element in &init.elements {
                        info = self.analyze_expr(element, info);
                    }
                }
                info
            }
            Expr::ArrayInit(init) => {
                let mut info = info;
                for element in &init.elements {
                    info = self.analyze_expr(element, info);
                }
                info
            }
            Expr::ArrayAccess(access) => {
                let mut info = self.analyze_expr(&access.array, info);
                self.check_dereference(&access.array, &mut info);
                self.analyze_expr(&access.index, info)
            }
            Expr::Unary(unary) if unary.op.is_increment() => self.analyze_increment(unary, info, false),
            Expr::Unary(unary) if unary.op == UnaryOp::Not => self.analyze_condition(expr, info).merged(),
            Expr::Unary(unary) => self.analyze_expr(&unary.operand, info),
            Expr::Binary(binary) if matches!(binary.op, BinaryOp::And | BinaryOp::Or | BinaryOp::Eq | BinaryOp::Ne) => {
                self.analyze_condition(expr, info).merged()
            }
            Expr::Binary(binary) => {
                let info = self.analyze_expr(&binary.left, info);
                self.analyze_expr(&binary.right, info)
            }
            Expr::Assignment(assign) => self.analyze_assignment(assign, info, false),
            Expr::Conditional(cond) => {
                let live = info.is_reachable();
                let test = self.analyze_condition(&cond.condition, info);
                self.note_dead_operand(&cond.then_expr, &test.when_true, live);
                self.note_dead_operand(&cond.else_expr, &test.when_false, live);
                let then_out = self.analyze_expr(&cond.then_expr, test.when_true);
                let else_out = self.analyze_expr(&cond.else_expr, test.when_false);
                then_out.join(&else_out)
            }
            Expr::Cast(cast) => self.analyze_expr(&cast.expr, info),
            Expr::InstanceOf(_) => self.analyze_condition(expr, info).merged(),
            Expr::Lambda(lambda) => self.analyze_lambda(lambda, info, None),
            Expr::MethodRef(reference) => self.analyze_method_ref(reference, info, None),
            Expr::Parens(inner) => self.analyze_expr(&inner.expr, info),
        }
    }

    /// Evaluate a boolean expression into its true and false outcomes.
    pub(super) fn analyze_condition(&mut self, expr: &Expr, info: FlowInfo) -> Branches {
        match expr {
            Expr::Parens(inner) => self.analyze_condition(&inner.expr, info),
            Expr::Literal(LiteralExpr { value: Literal::Boolean(value), .. }) => constant_branches(*value, info),
            Expr::Unary(unary) if unary.op == UnaryOp::Not => self.analyze_condition(&unary.operand, info).swapped(),
            Expr::Binary(binary) if matches!(binary.op, BinaryOp::And | BinaryOp::Or) => {
                let live = info.is_reachable();
                let is_and = binary.op == BinaryOp::And;
                let left = self.analyze_condition(&binary.left, info);
                let (right_in, short_circuit) = if is_and {
                    (left.when_true, left.when_false)
                } else {
                    (left.when_false, left.when_true)
                };
                self.note_dead_operand(&binary.right, &right_in, live);
                let right = self.analyze_condition(&binary.right, right_in);
                if is_and {
                    Branches { when_true: right.when_true, when_false: short_circuit.join(&right.when_false) }
                } else {
                    Branches { when_true: short_circuit.join(&right.when_true), when_false: right.when_false }
                }
            }
            Expr::Binary(binary) if matches!(binary.op, BinaryOp::Eq | BinaryOp::Ne) => self.analyze_comparison(binary, info),
            Expr::InstanceOf(test) => {
                let info = self.analyze_expr(&test.expr, info);
                let mut branches = Branches::both(info);
                if let Some(var) = self.local_of(&test.expr) {
                    branches.when_true.set_null_status(var, NullStatus::NonNull);
                }
                branches
            }
            Expr::Conditional(cond) => {
                let live = info.is_reachable();
                let test = self.analyze_condition(&cond.condition, info);
                self.note_dead_operand(&cond.then_expr, &test.when_true, live);
                self.note_dead_operand(&cond.else_expr, &test.when_false, live);
                let then_out = self.analyze_condition(&cond.then_expr, test.when_true);
                let else_out = self.analyze_condition(&cond.else_expr, test.when_false);
                Branches {
                    when_true: then_out.when_true.join(&else_out.when_true),
                    when_false: then_out.when_false.join(&else_out.when_false),
                }
            }
            Expr::Identifier(_) | Expr::FieldAccess(_) => {
                let constant = self.constant_of(expr);
                let info = self.analyze_expr(expr, info);
                match constant {
                    Some(value) => constant_branches(value, info),
                    None => Branches::both(info),
                }
            }
            _ => Branches::both(self.analyze_expr(expr, info)),
        }
    }

    fn analyze_arguments(&mut self, arguments: &[Expr], method: Option<&MethodBinding>, mut info: FlowInfo) -> FlowInfo {
        for (index, argument) in arguments.iter().enumerate() {
            let param = method.and_then(|m| m.params.get(index)).filter(|p| !p.varargs);
            let owner = method.map(|m| m.declaring);
            info = self.analyze_expr_expecting(argument, info, param.map(|p| (&p.type_ref, owner)));
            if let Some(param) = param.filter(|p| p.null.nullness == Nullness::NonNull) {
                self.check_nonnull_slot(&param.type_ref, argument, &info);
            }
        }
        info
    }

    fn analyze_assignment(&mut self, assign: &AssignmentExpr, info: FlowInfo, as_statement: bool) -> FlowInfo {
        let compound = assign.op != AssignmentOp::Assign;
        let target = assign.target.unparenthesized();
        let tracked = self.assignable_var(target);
        let mut info = info;
        match tracked {
            Some(var) if compound => self.read_var(var, target.span(), &info, !as_statement),
            Some(_) => {}
            None => info = self.analyze_target_parts(target, info),
        }
        let declared_type = tracked.and_then(|var| self.vars[var].type_ref.clone());
        info = self.analyze_expr_expecting(&assign.value, info, declared_type.as_ref().map(|t| (t, None)));
        match tracked {
            Some(var) => {
                if !compound && self.vars[var].declared == Nullness::NonNull {
                    if let Some(type_ref) = &declared_type {
                        self.check_nonnull_slot(type_ref, &assign.value, &info);
                    }
                }
                self.write_var(var, target.span(), compound, &mut info);
                if !compound {
                    let status = self.null_status_of(&assign.value, &info);
                    info.set_null_status(var, status);
                }
            }
            None if !compound => self.check_field_store(target, &assign.value, &info),
            None => {}
        }
        info
    }

    /// Sub-expressions of an assignment target that is not a tracked variable.
    fn analyze_target_parts(&mut self, target: &Expr, info: FlowInfo) -> FlowInfo {
        match target {
            Expr::FieldAccess(access) => {
                let mut info = self.analyze_expr(&access.target, info);
                self.check_dereference(&access.target, &mut info);
                info
            }
            Expr::ArrayAccess(access) => {
                let mut info = self.analyze_expr(&access.array, info);
                self.check_dereference(&access.array, &mut info);
                self.analyze_expr(&access.index, info)
            }
            Expr::Identifier(_) => info,
            other => self.analyze_expr(other, info),
        }
    }

    fn analyze_increment(&mut self, unary: &UnaryExpr, info: FlowInfo, as_statement: bool) -> FlowInfo {
        let operand = unary.operand.unparenthesized();
        match self.assignable_var(operand) {
            Some(var) => {
                let mut info = info;
                self.read_var(var, operand.span(), &info, !as_statement);
                self.write_var(var, operand.span(), true, &mut info);
                info
            }
            None => self.analyze_expr(&unary.operand, info),
        }
    }

    fn analyze_lambda(&mut self, lambda: &LambdaExpr, info: FlowInfo, target: Option<FunctionalTarget>) -> FlowInfo {
        let null_analysis = self.config.null_analysis;
        let contract = target.as_ref().and_then(|t| {
            let sam = &t.method.method;
            let type_ref = sam.return_type.clone().filter(|r| !r.is_void())?;
            let nullness = if null_analysis { sam.return_null.nullness } else { Nullness::Unknown };
            Some(ReturnContract { type_ref, nullness, owner: Some(sam.declaring) })
        });
        self.enter_body(BodyKind::Lambda, contract.clone());
        self.scopes.push(Vec::new());
        let mut body_info = info.clone();
        for (index, param) in lambda.params.iter().enumerate() {
            let declared = self.lambda_parameter_nullness(param, target.as_ref(), index);
            let var = self.declare(Variable {
                name: param.name.clone(),
                kind: VarKind::Parameter,
                is_final: param.modifiers.is_final(),
                blank: false,
                name_span: param.name_span,
                type_ref: param.type_ref.clone(),
                declared,
                constant: None,
                read: false,
                check_unused: false,
            });
            body_info.mark_assigned(var);
            body_info.set_null_status(var, status_for(declared));
        }
        match &lambda.body {
            LambdaBody::Expr(body) => {
                let expected = contract.as_ref().map(|c| (&c.type_ref, c.owner));
                let out = self.analyze_expr_expecting(body, body_info, expected);
                if let Some(contract) = contract.as_ref().filter(|c| c.nullness == Nullness::NonNull) {
                    self.check_nonnull_slot(&contract.type_ref, body, &out);
                }
            }
            LambdaBody::Block(block) => {
                self.analyze_block(block, body_info);
            }
        }
        self.pop_scope();
        self.exit_body();
        info
    }

    // ----- names and types -----

    /// Value of a name referring to a constant variable.
    pub(super) fn constant_of(&mut self, expr: &Expr) -> Option<bool> {
        match expr.unparenthesized() {
            Expr::Identifier(id) => match self.resolve_var(&id.name) {
                Some(var) => self.vars[var].constant,
                None => self.field_binding(&id.name).and_then(|f| f.constant),
            },
            Expr::FieldAccess(access) => {
                let owner = self.receiver_type(&access.target)?;
                self.env.find_field(owner, &access.name)?.constant
            }
            _ => None,
        }
    }

    pub(super) fn constant_value(&mut self, expr: &Expr) -> Option<bool> {
        constant::boolean_value(expr, &mut |name| self.constant_of(name))
    }

    pub(super) fn current_binding(&self) -> Option<TypeId> {
        self.classes.iter().rev().find_map(|c| c.binding)
    }

    /// A field visible by simple name from the current class or its
    /// enclosing classes.
    pub(super) fn field_binding(&mut self, name: &str) -> Option<FieldBinding> {
        let mut current = self.current_binding();
        while let Some(id) = current {
            if let Some(field) = self.env.find_field(id, name) {
                return Some(field);
            }
            current = self.env.type_binding(id).enclosing;
        }
        None
    }

    /// Resolve a written type. `owner` is the type whose unit the
    /// reference is written in; `None` means the body being analysed.
    pub(super) fn resolve_type(&mut self, type_ref: &TypeRef, owner: Option<TypeId>) -> Option<TypeId> {
        if type_ref.dims > 0 || type_ref.is_primitive() || type_ref.is_void() || type_ref.is_var() || type_ref.is_wildcard() {
            return None;
        }
        let current_unit = self.scope.unit();
        let result = match owner {
            Some(owner) if self.env.type_binding(owner).unit != current_unit => {
                let unit = self.env.type_binding(owner).unit;
                let type_vars = self.env.type_variables_in_scope(owner);
                if !self.unit_scopes.contains_key(&unit) {
                    let scope = CompilationUnitScope::new(self.env, unit);
                    self.unit_scopes.insert(unit, scope);
                }
                let scope = self.unit_scopes.get_mut(&unit)?;
                scope.resolve_type_ref(self.env, type_ref, Some(owner), &type_vars)
            }
            Some(owner) => {
                let type_vars = self.env.type_variables_in_scope(owner);
                self.scope.resolve_type_ref(self.env, type_ref, Some(owner), &type_vars)
            }
            None => {
                let enclosing = self.current_binding();
                let type_vars = self.type_vars.clone();
                self.scope.resolve_type_ref(self.env, type_ref, enclosing, &type_vars)
            }
        };
        result.found()
    }

    /// Static type of a receiver expression, as far as it matters for
    /// finding members.
    pub(super) fn receiver_type(&mut self, expr: &Expr) -> Option<TypeId> {
        match expr.unparenthesized() {
            Expr::Identifier(id) => {
                if let Some(var) = self.resolve_var(&id.name) {
                    let type_ref = self.vars[var].type_ref.clone()?;
                    return self.resolve_type(&type_ref, None);
                }
                if let Some(field) = self.field_binding(&id.name) {
                    return self.resolve_type(&field.type_ref, Some(field.declaring));
                }
                self.resolve_type(&TypeRef::simple(&id.name, id.span), None)
            }
            Expr::FieldAccess(access) => {
                if let Some(var) = self.this_field(access) {
                    let type_ref = self.vars[var].type_ref.clone()?;
                    return self.resolve_type(&type_ref, None);
                }
                if let Some(owner) = self.receiver_type(&access.target) {
                    if let Some(field) = self.env.find_field(owner, &access.name) {
                        return self.resolve_type(&field.type_ref, Some(field.declaring));
                    }
                    return self.env.member_type(owner, &access.name);
                }
                let name = expr.as_qualified_name()?;
                match self.env.resolve_qualified(&name, self.scope.module()) {
                    LookupResult::Found(id) => Some(id),
                    _ => None,
                }
            }
            Expr::MethodCall(call) => {
                let method = self.resolve_call(call)?;
                let return_type = method.return_type.clone()?;
                if self.env.is_type_variable(&return_type, &method) {
                    return None;
                }
                self.resolve_type(&return_type, Some(method.declaring))
            }
            Expr::New(new) => self.resolve_type(&new.type_ref, None),
            Expr::Cast(cast) => self.resolve_type(&cast.target_type, None),
            Expr::This(_) => self.current_binding(),
            Expr::Super(_) => {
                let id = self.current_binding()?;
                self.env.complete(id);
                let supertypes: Vec<TypeId> = self.env.type_binding(id).supertypes().iter().map(|s| s.id).collect();
                supertypes.into_iter().find(|s| !self.env.type_binding(*s).is_interface())
            }
            Expr::Literal(LiteralExpr { value: Literal::String(_), .. }) => {
                self.env.find_top_level(JAVA_LANG, "String", self.scope.module()).found()
            }
            _ => None,
        }
    }

    pub(super) fn resolve_call(&mut self, call: &MethodCallExpr) -> Option<MethodBinding> {
        let arity = call.arguments.len();
        match call.target.as_deref().map(Expr::unparenthesized) {
            None | Some(Expr::This(_)) => {
                let mut current = self.current_binding();
                while let Some(id) = current {
                    if let Some(method) = self.env.find_method(id, &call.name, arity) {
                        return Some(method);
                    }
                    current = self.env.type_binding(id).enclosing;
                }
                None
            }
            Some(target) => {
                let owner = self.receiver_type(target)?;
                self.env.find_method(owner, &call.name, arity)
            }
        }
    }

    fn resolve_constructor(&mut self, type_ref: &TypeRef, arity: usize) -> Option<MethodBinding> {
        let id = self.resolve_type(type_ref, None)?;
        self.env.complete(id);
        self.env
            .type_binding(id)
            .methods
            .iter()
            .find(|m| m.is_constructor() && m.accepts_arity(arity))
            .cloned()
    }
}

fn constant_branches(value: bool, info: FlowInfo) -> Branches {
    let excluded = info.dead();
    if value {
        Branches { when_true: info, when_false: excluded }
    } else {
        Branches { when_true: excluded, when_false: info }
    }
}

fn join_optional(info: FlowInfo, other: Option<FlowInfo>) -> FlowInfo {
    match other {
        Some(other) => info.join(&other),
        None => info,
    }
}

fn innermost(stmt: &Stmt) -> &Stmt {
    match stmt {
        Stmt::Labeled(labeled) => innermost(&labeled.statement),
        other => other,
    }
}

fn is_loop(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::While(_) | Stmt::DoWhile(_) | Stmt::For(_) | Stmt::ForEach(_))
}
