//! Null contracts and null references.
//!
//! Flow-derived [`NullStatus`] drives the dereference and redundant-check
//! findings. Declared [`Nullness`] (explicit, defaulted or inherited)
//! drives the contract findings on `@NonNull` slots, overrides, lambdas and
//! method references; those only run with null analysis enabled.

use crate::ast::{Annotation, BinaryExpr, BinaryOp, ClassMember, Expr, HasSpan, LambdaParam, Literal, MethodDecl, MethodRefExpr, TypeRef};
use crate::diagnostics::{messages, Category};
use crate::lookup::{FieldBinding, FunctionalMethod, MethodBinding, Nullness, TypeId};

use super::analyzer::FlowAnalyzer;
use super::info::{Branches, FlowInfo, NullStatus, VarId};

/// Functional interface type a lambda or method reference is converted to.
#[derive(Debug, Clone)]
pub(super) struct FunctionalTarget {
    pub type_ref: TypeRef,
    pub method: FunctionalMethod,
}

/// Nullness of a value flowing into a `@NonNull` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Provided {
    Null,
    Nullable,
    InferredNullable,
    NonNull,
    /// Unannotated reference type, shown as written.
    Unchecked(String),
    Unknown,
}

/// Flow status a variable starts with given its declared nullness.
pub(super) fn status_for(nullness: Nullness) -> NullStatus {
    match nullness {
        Nullness::NonNull => NullStatus::NonNull,
        Nullness::Nullable => NullStatus::PotentiallyNull,
        Nullness::Unknown => NullStatus::Unknown,
    }
}

enum Receiver {
    Type(TypeId),
    Value(Option<TypeId>),
}

impl FlowAnalyzer<'_, '_> {
    fn nonnull_display(&self, type_ref: &TypeRef) -> String {
        format!("@{} {}", self.config.nonnull_simple_name(), type_ref.display())
    }

    fn nullable_display(&self, type_ref: &TypeRef) -> String {
        format!("@{} {}", self.config.nullable_simple_name(), type_ref.display())
    }

    /// Explicit annotation nullness of a declaration; `Unknown` for
    /// primitives and when null analysis is off.
    pub(super) fn explicit_nullness(&self, annotations: &[Annotation], type_ref: &TypeRef) -> Nullness {
        if !self.config.null_analysis || type_ref.is_primitive() || type_ref.is_void() {
            return Nullness::Unknown;
        }
        Nullness::from_annotations(annotations.iter().chain(&type_ref.annotations), &self.config)
            .map(|(nullness, _)| nullness)
            .unwrap_or(Nullness::Unknown)
    }

    pub(super) fn provided(&mut self, expr: &Expr, info: &FlowInfo) -> Provided {
        match expr.unparenthesized() {
            Expr::Literal(literal) => match literal.value {
                Literal::Null => Provided::Null,
                _ => Provided::NonNull,
            },
            Expr::New(_)
            | Expr::NewArray(_)
            | Expr::ArrayInit(_)
            | Expr::Lambda(_)
            | Expr::MethodRef(_)
            | Expr::This(_)
            | Expr::ClassLiteral(_)
            | Expr::Binary(_)
            | Expr::Unary(_)
            | Expr::InstanceOf(_) => Provided::NonNull,
            Expr::Identifier(id) => match self.local_of(expr) {
                Some(var) => self.provided_by_var(var, info),
                None => match self.field_binding(&id.name) {
                    Some(field) => self.provided_by_field(&field),
                    None => Provided::Unknown,
                },
            },
            Expr::FieldAccess(access) => {
                let field = match self.this_field(access) {
                    Some(_) => self.field_binding(&access.name),
                    None => self
                        .receiver_type(&access.target)
                        .and_then(|owner| self.env.find_field(owner, &access.name)),
                };
                match field {
                    Some(field) => self.provided_by_field(&field),
                    None => Provided::Unknown,
                }
            }
            Expr::MethodCall(call) => match self.resolve_call(call) {
                Some(method) => self.provided_by_method(&method),
                None => Provided::Unknown,
            },
            Expr::Assignment(assign) => self.provided(&assign.value, info),
            Expr::Cast(cast) => self.provided(&cast.expr, info),
            Expr::Conditional(cond) => {
                let then_status = self.null_status_of(&cond.then_expr, info);
                let else_status = self.null_status_of(&cond.else_expr, info);
                match then_status.join(else_status) {
                    NullStatus::Null => Provided::Null,
                    NullStatus::NonNull => Provided::NonNull,
                    NullStatus::PotentiallyNull => Provided::InferredNullable,
                    NullStatus::Unknown => Provided::Unknown,
                }
            }
            _ => Provided::Unknown,
        }
    }

    fn provided_by_var(&self, var: VarId, info: &FlowInfo) -> Provided {
        match info.null_status(var) {
            NullStatus::Null => Provided::Null,
            NullStatus::NonNull => Provided::NonNull,
            NullStatus::PotentiallyNull if self.vars[var].declared == Nullness::Nullable => Provided::Nullable,
            NullStatus::PotentiallyNull => Provided::InferredNullable,
            NullStatus::Unknown => Provided::Unknown,
        }
    }

    fn unchecked(&self, type_ref: &TypeRef, is_type_variable: bool) -> Provided {
        if type_ref.is_primitive() || type_ref.is_void() || is_type_variable {
            Provided::Unknown
        } else {
            Provided::Unchecked(type_ref.display())
        }
    }

    fn provided_by_field(&self, field: &FieldBinding) -> Provided {
        if !self.config.null_analysis {
            return Provided::Unknown;
        }
        match field.null.nullness {
            Nullness::NonNull => Provided::NonNull,
            Nullness::Nullable => Provided::Nullable,
            Nullness::Unknown => {
                let is_type_variable = self.env.type_variables_in_scope(field.declaring).contains(&field.type_ref.name);
                self.unchecked(&field.type_ref, is_type_variable)
            }
        }
    }

    fn provided_by_method(&self, method: &MethodBinding) -> Provided {
        if !self.config.null_analysis {
            return Provided::Unknown;
        }
        match method.return_null.nullness {
            Nullness::NonNull => Provided::NonNull,
            Nullness::Nullable => Provided::Nullable,
            Nullness::Unknown => match &method.return_type {
                Some(return_type) => self.unchecked(return_type, self.env.is_type_variable(return_type, method)),
                None => Provided::Unknown,
            },
        }
    }

    /// Flow status a variable takes when assigned `expr`.
    pub(super) fn null_status_of(&mut self, expr: &Expr, info: &FlowInfo) -> NullStatus {
        match self.provided(expr, info) {
            Provided::Null => NullStatus::Null,
            Provided::NonNull => NullStatus::NonNull,
            Provided::Nullable | Provided::InferredNullable => NullStatus::PotentiallyNull,
            Provided::Unchecked(_) | Provided::Unknown => NullStatus::Unknown,
        }
    }

    /// Check a value flowing into a slot of type `required` declared `@NonNull`.
    pub(super) fn check_nonnull_slot(&mut self, required: &TypeRef, expr: &Expr, info: &FlowInfo) {
        if !self.config.null_analysis || !info.is_reachable() || required.is_primitive() {
            return;
        }
        let slot = self.nonnull_display(required);
        let span = expr.span();
        match self.provided(expr, info) {
            Provided::Null => {
                self.report(Category::NullSpecViolation, messages::REQUIRED_NONNULL_BUT_NULL, vec![slot], span);
            }
            Provided::Nullable => {
                let nullable = self.config.nullable_simple_name().to_string();
                self.report(Category::NullSpecViolation, messages::REQUIRED_NONNULL_BUT_NULLABLE, vec![slot, nullable], span);
            }
            Provided::InferredNullable => {
                let nullable = self.config.nullable_simple_name().to_string();
                self.report(
                    Category::NullSpecViolation,
                    messages::REQUIRED_NONNULL_BUT_INFERRED_NULLABLE,
                    vec![slot, nullable],
                    span,
                );
            }
            Provided::Unchecked(type_name) => {
                self.report(
                    Category::NullUncheckedConversion,
                    messages::UNCHECKED_CONVERSION_TO_NONNULL,
                    vec![type_name, slot],
                    span,
                );
            }
            Provided::NonNull | Provided::Unknown => {}
        }
    }

    /// A plain assignment to a field that is not tracked by the flow pass.
    pub(super) fn check_field_store(&mut self, target: &Expr, value: &Expr, info: &FlowInfo) {
        if !self.config.null_analysis {
            return;
        }
        let field = match target {
            Expr::Identifier(id) => self.field_binding(&id.name),
            Expr::FieldAccess(access) => self
                .receiver_type(&access.target)
                .and_then(|owner| self.env.find_field(owner, &access.name)),
            _ => None,
        };
        if let Some(field) = field.filter(|f| f.null.nullness == Nullness::NonNull) {
            self.check_nonnull_slot(&field.type_ref, value, info);
        }
    }

    /// `target` is about to be dereferenced.
    pub(super) fn check_dereference(&mut self, target: &Expr, info: &mut FlowInfo) {
        if let Some(var) = self.local_of(target) {
            if info.is_reachable() {
                let name = self.vars[var].name.clone();
                match info.null_status(var) {
                    NullStatus::Null => {
                        self.report(Category::NullReference, messages::NULL_LOCAL_REFERENCE, vec![name], target.span());
                    }
                    NullStatus::PotentiallyNull => {
                        self.report(
                            Category::PotentialNullReference,
                            messages::POTENTIAL_NULL_LOCAL_REFERENCE,
                            vec![name],
                            target.span(),
                        );
                    }
                    _ => {}
                }
            }
            info.set_null_status(var, NullStatus::NonNull);
            return;
        }
        if !self.config.null_analysis || !info.is_reachable() {
            return;
        }
        if let Expr::MethodCall(call) = target.unparenthesized() {
            if let Some(method) = self.resolve_call(call).filter(|m| m.return_null.nullness == Nullness::Nullable) {
                self.report(
                    Category::PotentialNullReference,
                    messages::POTENTIAL_NULL_METHOD_RESULT,
                    vec![method.readable_name()],
                    call.span,
                );
            }
        }
    }

    /// `x == null` and `x != null` refine the status of local `x` on each
    /// branch; a comparison with a known outcome is reported.
    pub(super) fn analyze_comparison(&mut self, binary: &BinaryExpr, info: FlowInfo) -> Branches {
        let info = self.analyze_expr(&binary.left, info);
        let info = self.analyze_expr(&binary.right, info);
        let operand = if binary.right.is_null_literal() {
            &binary.left
        } else if binary.left.is_null_literal() {
            &binary.right
        } else {
            return Branches::both(info);
        };
        let Some(var) = self.local_of(operand) else {
            return Branches::both(info);
        };
        let equals = binary.op == BinaryOp::Eq;
        let mut on_null = info.clone();
        let mut on_nonnull = info;
        if on_nonnull.is_reachable() {
            let name = self.vars[var].name.clone();
            let span = operand.span();
            match on_nonnull.null_status(var) {
                NullStatus::NonNull => {
                    if self.config.null_analysis && self.vars[var].declared == Nullness::NonNull {
                        let template = if equals {
                            messages::NULL_COMPARISON_ON_SPECIFIED_NONNULL
                        } else {
                            messages::REDUNDANT_CHECK_ON_SPECIFIED_NONNULL
                        };
                        let nonnull = self.config.nonnull_simple_name().to_string();
                        self.report(Category::RedundantNullCheck, template, vec![name, nonnull], span);
                    } else {
                        let template =
                            if equals { messages::NULL_COMPARISON_ON_NONNULL } else { messages::REDUNDANT_CHECK_ON_NONNULL };
                        self.report(Category::RedundantNullCheck, template, vec![name], span);
                    }
                    on_null = on_null.dead();
                }
                NullStatus::Null => {
                    let template = if equals { messages::REDUNDANT_CHECK_ON_NULL } else { messages::NULL_COMPARISON_ON_NULL };
                    self.report(Category::RedundantNullCheck, template, vec![name], span);
                    on_nonnull = on_nonnull.dead();
                }
                _ => {}
            }
        }
        on_null.set_null_status(var, NullStatus::Null);
        on_nonnull.set_null_status(var, NullStatus::NonNull);
        if equals {
            Branches { when_true: on_null, when_false: on_nonnull }
        } else {
            Branches { when_true: on_nonnull, when_false: on_null }
        }
    }

    // ----- declarations -----

    /// Annotation targets and override compatibility of the members of one
    /// class body.
    pub(super) fn check_member_contracts(&mut self, members: &[ClassMember], binding: Option<TypeId>) {
        if !self.config.null_analysis {
            return;
        }
        let bound: Vec<MethodBinding> = binding.map(|id| self.env.type_binding(id).methods.clone()).unwrap_or_default();
        let mut index = 0;
        for member in members {
            match member {
                ClassMember::Field(field) => self.check_primitive_annotation(&field.modifiers.annotations, &field.type_ref),
                ClassMember::Method(method) => {
                    if let Some(return_type) = &method.return_type {
                        self.check_primitive_annotation(&method.modifiers.annotations, return_type);
                    }
                    for param in &method.parameters {
                        self.check_primitive_annotation(&param.modifiers.annotations, &param.type_ref);
                    }
                    if let Some(bound) = bound.get(index) {
                        self.check_overrides(method, bound);
                    }
                    index += 1;
                }
                _ => {}
            }
        }
    }

    pub(super) fn check_primitive_annotation(&mut self, annotations: &[Annotation], type_ref: &TypeRef) {
        if !self.config.null_analysis || !(type_ref.is_primitive() || type_ref.is_void()) || type_ref.dims > 0 {
            return;
        }
        let config = &self.config;
        let found = annotations
            .iter()
            .chain(&type_ref.annotations)
            .find(|a| config.is_nonnull_annotation(&a.name) || config.is_nullable_annotation(&a.name));
        if let Some(annotation) = found {
            let name = annotation.simple_name().to_string();
            let span = annotation.span.merge(type_ref.span);
            self.report(Category::NullAnnotationTarget, messages::ANNOTATION_ON_PRIMITIVE, vec![name, type_ref.display()], span);
        }
    }

    fn check_overrides(&mut self, method: &MethodDecl, bound: &MethodBinding) {
        let inherited = self.env.overridden_methods(bound.declaring, bound);
        if inherited.is_empty() {
            return;
        }
        for (index, (param, mine)) in method.parameters.iter().zip(&bound.params).enumerate() {
            if mine.null.nullness != Nullness::NonNull {
                continue;
            }
            let clash = inherited.iter().find_map(|m| {
                let theirs = m.params.get(index)?;
                match theirs.null.nullness {
                    Nullness::NonNull => None,
                    other => Some((other, m.declaring)),
                }
            });
            let Some((theirs, declaring)) = clash else { continue };
            let owner = self.env.display_name(declaring);
            let span = match mine.null.annotation_span {
                Some(annotation) => annotation.merge(param.type_ref.span),
                None => param.type_ref.span,
            };
            if theirs == Nullness::Nullable {
                let nullable = self.config.nullable_simple_name().to_string();
                self.report(
                    Category::NullSpecViolation,
                    messages::ILLEGAL_PARAMETER_REDEFINITION_NULLABLE,
                    vec![param.name.clone(), owner, nullable],
                    span,
                );
            } else {
                self.report(
                    Category::NullSpecViolation,
                    messages::ILLEGAL_PARAMETER_REDEFINITION_UNCONSTRAINED,
                    vec![param.name.clone(), owner],
                    span,
                );
            }
        }

        if bound.return_null.nullness != Nullness::Nullable {
            return;
        }
        let Some(return_type) = &method.return_type else { return };
        let Some(theirs) = inherited.iter().find(|m| m.return_null.nullness == Nullness::NonNull) else { return };
        let Some(their_return) = &theirs.return_type else { return };
        let required = self.nonnull_display(their_return);
        let source = format!("{}.{}", self.env.display_name(theirs.declaring), theirs.readable_name());
        let span = match bound.return_null.annotation_span {
            Some(annotation) => annotation.merge(return_type.span),
            None => return_type.span,
        };
        self.report(Category::NullSpecViolation, messages::INCOMPATIBLE_RETURN_NULLNESS, vec![required, source], span);
    }

    /// Parameter and return nullness a body is analysed with: explicit or
    /// defaulted on the method itself, otherwise inherited from an
    /// overridden method.
    pub(super) fn effective_contract(&mut self, method: &MethodDecl, bound: Option<&MethodBinding>) -> (Vec<Nullness>, Nullness) {
        if !self.config.null_analysis {
            return (Vec::new(), Nullness::Unknown);
        }
        let Some(bound) = bound else {
            let params = method
                .parameters
                .iter()
                .map(|p| self.explicit_nullness(&p.modifiers.annotations, &p.type_ref))
                .collect();
            let returns = method
                .return_type
                .as_ref()
                .map(|t| self.explicit_nullness(&method.modifiers.annotations, t))
                .unwrap_or(Nullness::Unknown);
            return (params, returns);
        };
        let inherited = self.env.overridden_methods(bound.declaring, bound);
        let params = bound
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                if param.null.nullness.is_known() {
                    return param.null.nullness;
                }
                inherited
                    .iter()
                    .filter_map(|m| m.params.get(index))
                    .map(|p| p.null.nullness)
                    .find(|n| n.is_known())
                    .unwrap_or(Nullness::Unknown)
            })
            .collect();
        let returns = if bound.return_null.nullness.is_known() {
            bound.return_null.nullness
        } else {
            inherited
                .iter()
                .map(|m| m.return_null.nullness)
                .find(|n| n.is_known())
                .unwrap_or(Nullness::Unknown)
        };
        (params, returns)
    }

    // ----- functional expressions -----

    pub(super) fn functional_target(&mut self, type_ref: &TypeRef, owner: Option<TypeId>) -> Option<FunctionalTarget> {
        let id = self.resolve_type(type_ref, owner)?;
        let method = self.env.functional_method(id, &type_ref.type_args)?;
        Some(FunctionalTarget { type_ref: type_ref.clone(), method })
    }

    /// Nullness of a lambda parameter. An explicit `@NonNull` must not
    /// tighten the functional method's parameter; an omitted annotation
    /// inherits it.
    pub(super) fn lambda_parameter_nullness(&mut self, param: &LambdaParam, target: Option<&FunctionalTarget>, index: usize) -> Nullness {
        if !self.config.null_analysis {
            return Nullness::Unknown;
        }
        let explicit = match &param.type_ref {
            Some(type_ref) => {
                self.check_primitive_annotation(&param.modifiers.annotations, type_ref);
                if type_ref.is_primitive() {
                    return Nullness::Unknown;
                }
                Nullness::from_annotations(param.modifiers.annotations.iter().chain(&type_ref.annotations), &self.config)
            }
            None => Nullness::from_annotations(&param.modifiers.annotations, &self.config),
        };
        let inherited = target
            .and_then(|t| t.method.method.params.get(index))
            .map(|p| p.null.nullness)
            .unwrap_or(Nullness::Unknown);
        match explicit {
            Some((Nullness::NonNull, annotation_span)) => {
                if let Some(target) = target.filter(|_| inherited != Nullness::NonNull) {
                    let owner = self.env.display_name(target.method.method.declaring);
                    let end = param.type_ref.as_ref().map(|t| t.span).unwrap_or(param.name_span);
                    let span = annotation_span.merge(end);
                    if inherited == Nullness::Nullable {
                        let nullable = self.config.nullable_simple_name().to_string();
                        self.report(
                            Category::NullSpecViolation,
                            messages::ILLEGAL_PARAMETER_REDEFINITION_NULLABLE,
                            vec![param.name.clone(), owner, nullable],
                            span,
                        );
                    } else {
                        self.report(
                            Category::NullSpecViolation,
                            messages::ILLEGAL_PARAMETER_REDEFINITION_UNCONSTRAINED,
                            vec![param.name.clone(), owner],
                            span,
                        );
                    }
                }
                Nullness::NonNull
            }
            Some((nullness, _)) => nullness,
            None => inherited,
        }
    }

    fn method_ref_receiver(&mut self, target: &Expr) -> Receiver {
        let target = target.unparenthesized();
        let names_value = match target {
            Expr::Identifier(id) => self.resolve_var(&id.name).is_some() || self.field_binding(&id.name).is_some(),
            Expr::FieldAccess(_) => target.as_qualified_name().is_none() || self.receiver_is_value(target),
            _ => true,
        };
        if !names_value {
            if let Some(name) = target.as_qualified_name() {
                if let Some(id) = self.resolve_type(&TypeRef::simple(&name, target.span()), None) {
                    return Receiver::Type(id);
                }
            }
        }
        Receiver::Value(self.receiver_type(target))
    }

    /// Whether the leading name of a dotted chain is a variable.
    fn receiver_is_value(&mut self, expr: &Expr) -> bool {
        match expr {
            Expr::FieldAccess(access) => self.receiver_is_value(&access.target),
            Expr::Identifier(id) => self.resolve_var(&id.name).is_some() || self.field_binding(&id.name).is_some(),
            _ => true,
        }
    }

    /// Check a method reference against the functional method it implements.
    pub(super) fn analyze_method_ref(&mut self, reference: &MethodRefExpr, info: FlowInfo, target: Option<FunctionalTarget>) -> FlowInfo {
        let receiver = self.method_ref_receiver(&reference.target);
        let info = match receiver {
            Receiver::Type(_) => info,
            Receiver::Value(_) => self.analyze_expr(&reference.target, info),
        };
        if !self.config.null_analysis || !info.is_reachable() || reference.name == "new" {
            return info;
        }
        let Some(target) = target else { return info };
        let sam = &target.method.method;
        let arity = sam.params.len();
        let referenced = match receiver {
            Receiver::Type(id) => {
                let unbound = self.env.find_method(id, &reference.name, arity).filter(|m| m.is_static).map(|m| (m, 0));
                match unbound {
                    Some(found) => Some(found),
                    None => arity
                        .checked_sub(1)
                        .and_then(|n| self.env.find_method(id, &reference.name, n))
                        .filter(|m| !m.is_static)
                        .map(|m| (m, 1)),
                }
            }
            Receiver::Value(Some(id)) => self.env.find_method(id, &reference.name, arity).map(|m| (m, 0)),
            Receiver::Value(None) => None,
        };
        let Some((referenced, shift)) = referenced else { return info };

        let descriptor = target.method.descriptor(&target.type_ref);
        for (index, param) in referenced.params.iter().enumerate() {
            if param.null.nullness != Nullness::NonNull {
                continue;
            }
            let Some(provided) = sam.params.get(index + shift) else { continue };
            let required = self.nonnull_display(&param.type_ref);
            match provided.null.nullness {
                Nullness::Nullable => {
                    let provided = self.nullable_display(&provided.type_ref);
                    self.report(
                        Category::NullSpecViolation,
                        messages::REFERENCE_PARAMETER_MISMATCH,
                        vec![(index + 1).to_string(), required, provided, descriptor.clone()],
                        reference.span,
                    );
                }
                Nullness::Unknown => {
                    self.report(
                        Category::NullUncheckedConversion,
                        messages::REFERENCE_PARAMETER_UNCHECKED,
                        vec![(index + 1).to_string(), descriptor.clone(), required],
                        reference.span,
                    );
                }
                Nullness::NonNull => {}
            }
        }
        if sam.return_null.nullness == Nullness::NonNull && referenced.return_null.nullness == Nullness::Nullable {
            if let (Some(promised), Some(provides)) = (&sam.return_type, &referenced.return_type) {
                let promised = self.nonnull_display(promised);
                let provides = self.nullable_display(provides);
                self.report(
                    Category::NullSpecViolation,
                    messages::REFERENCE_RETURN_MISMATCH,
                    vec![descriptor, promised, provides],
                    reference.span,
                );
            }
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_nullness_sets_the_starting_status() {
        assert_eq!(status_for(Nullness::NonNull), NullStatus::NonNull);
        assert_eq!(status_for(Nullness::Nullable), NullStatus::PotentiallyNull);
        assert_eq!(status_for(Nullness::Unknown), NullStatus::Unknown);
    }
}
