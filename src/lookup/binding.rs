//! Resolved types and members.
//!
//! Bindings live in the arena of [`super::LookupEnvironment`] and refer to
//! each other by [`TypeId`], so self-referential and mutually recursive
//! hierarchies need no shared ownership.

use crate::ast::{Annotation, TypeKind, TypeRef};
use crate::config::Config;
use crate::modules::ModuleId;
use crate::parser::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

/// Declared nullness of a parameter, return, field or type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullness {
    Unknown,
    NonNull,
    Nullable,
}

impl Nullness {
    /// Explicit nullness annotations among `annotations`.
    pub fn from_annotations<'a>(annotations: impl IntoIterator<Item = &'a Annotation>, config: &Config) -> Option<(Nullness, Span)> {
        for annotation in annotations {
            if config.is_nonnull_annotation(&annotation.name) {
                return Some((Nullness::NonNull, annotation.span));
            }
            if config.is_nullable_annotation(&annotation.name) {
                return Some((Nullness::Nullable, annotation.span));
            }
        }
        None
    }

    pub fn is_known(self) -> bool {
        self != Nullness::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Declared in the compiled source unit with this index.
    Source { unit: usize },
    /// Loaded from a type provider.
    External { uri: String },
}

/// Nullness of one declaration site together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct NullSpec {
    pub nullness: Nullness,
    /// Written as an annotation rather than implied by a default.
    pub explicit: bool,
    /// The annotation, when written.
    pub annotation_span: Option<Span>,
}

impl NullSpec {
    pub fn unknown() -> Self {
        Self { nullness: Nullness::Unknown, explicit: false, annotation_span: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    pub name: String,
    pub type_ref: TypeRef,
    pub null: NullSpec,
    pub varargs: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    pub name: String,
    pub declaring: TypeId,
    pub type_params: Vec<String>,
    pub params: Vec<ParamBinding>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub return_null: NullSpec,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_default: bool,
}

impl MethodBinding {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        match self.params.last() {
            Some(last) if last.varargs => count + 1 >= self.params.len(),
            _ => count == self.params.len(),
        }
    }

    /// `m(String, int)` with simple parameter type names.
    pub fn readable_name(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| param_display(p)).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

fn param_display(param: &ParamBinding) -> String {
    if param.varargs {
        format!("{}...", param.type_ref.display())
    } else {
        param.type_ref.display()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub name: String,
    pub declaring: TypeId,
    pub type_ref: TypeRef,
    pub null: NullSpec,
    pub is_static: bool,
    pub is_final: bool,
    pub has_initializer: bool,
    /// Value of a `final boolean` field initialized with a constant.
    pub constant: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Pending,
    InProgress,
    Done,
}

/// Kinds of program elements an annotation type may be applied to, as
/// listed by `@Target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Type,
    Field,
    Method,
    Parameter,
    Constructor,
    LocalVariable,
    AnnotationType,
    Package,
    TypeParameter,
    TypeUse,
    Module,
    RecordComponent,
}

impl ElementType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "TYPE" => ElementType::Type,
            "FIELD" => ElementType::Field,
            "METHOD" => ElementType::Method,
            "PARAMETER" => ElementType::Parameter,
            "CONSTRUCTOR" => ElementType::Constructor,
            "LOCAL_VARIABLE" => ElementType::LocalVariable,
            "ANNOTATION_TYPE" => ElementType::AnnotationType,
            "PACKAGE" => ElementType::Package,
            "TYPE_PARAMETER" => ElementType::TypeParameter,
            "TYPE_USE" => ElementType::TypeUse,
            "MODULE" => ElementType::Module,
            "RECORD_COMPONENT" => ElementType::RecordComponent,
            _ => return None,
        })
    }

    /// Element kinds named in the raw arguments of a `@Target` annotation,
    /// whether written as `METHOD`, `ElementType.METHOD` or a braced list.
    pub fn parse_targets(arguments: &str) -> Vec<ElementType> {
        let mut targets = Vec::new();
        for word in arguments.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
            if let Some(target) = ElementType::from_name(word) {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
        targets
    }
}

/// A written supertype that was dropped because it leads back to its subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyCycle {
    /// Position among the written `extends` and `implements` references.
    pub written: usize,
    pub supertype: TypeId,
    /// The type extends itself or one of its own member types.
    pub self_reference: bool,
}

/// A supertype together with the type arguments written for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperRef {
    pub id: TypeId,
    pub type_args: Vec<TypeRef>,
}

#[derive(Debug, Clone)]
pub struct TypeBinding {
    pub id: TypeId,
    pub qualified_name: String,
    pub simple_name: String,
    pub package: String,
    pub kind: TypeKind,
    pub module: Option<ModuleId>,
    pub origin: TypeOrigin,
    /// Index into the environment's unit records.
    pub unit: usize,
    pub type_params: Vec<String>,
    pub enclosing: Option<TypeId>,
    pub member_types: Vec<TypeId>,
    pub methods: Vec<MethodBinding>,
    pub fields: Vec<FieldBinding>,
    /// `@NonNullByDefault` on this type: `Some(true)`, cancelled with `(false)`.
    pub nonnull_by_default: Option<bool>,
    /// For annotation types declaring `@Target`, the element kinds it lists.
    pub annotation_targets: Option<Vec<ElementType>>,
    pub(crate) declared_supertypes: Vec<TypeRef>,
    pub(crate) supertypes: Vec<SuperRef>,
    pub(crate) cycles: Vec<HierarchyCycle>,
    pub(crate) completion: Completion,
}

impl TypeBinding {
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Annotation)
    }

    /// Resolved superclass and superinterfaces; empty until completed.
    pub fn supertypes(&self) -> &[SuperRef] {
        &self.supertypes
    }

    /// Written supertypes dropped when completing; empty until completed.
    pub fn hierarchy_cycles(&self) -> &[HierarchyCycle] {
        &self.cycles
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodBinding> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Abstract methods declared here, ignoring `Object` members.
    pub fn abstract_methods(&self) -> impl Iterator<Item = &MethodBinding> {
        self.methods
            .iter()
            .filter(|m| m.is_abstract && !matches!(m.name.as_str(), "equals" | "hashCode" | "toString"))
    }
}

/// Outcome of a type lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(TypeId),
    /// A type variable in scope.
    TypeVariable(String),
    NotFound,
    /// Exists but is not visible to the requester; carries the qualified name.
    NotAccessible(String),
    Ambiguous(Vec<TypeId>),
}

impl LookupResult {
    pub fn found(&self) -> Option<TypeId> {
        match self {
            LookupResult::Found(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(name: &str) -> Annotation {
        Annotation { name: name.to_string(), arguments: None, span: Span::default() }
    }

    #[test]
    fn nullness_from_simple_or_qualified_names() {
        let config = Config::default();
        let nn = [annotation("NonNull")];
        let qualified = [annotation("org.eclipse.jdt.annotation.Nullable")];
        let other = [annotation("Deprecated")];
        assert_eq!(Nullness::from_annotations(&nn, &config).map(|n| n.0), Some(Nullness::NonNull));
        assert_eq!(Nullness::from_annotations(&qualified, &config).map(|n| n.0), Some(Nullness::Nullable));
        assert_eq!(Nullness::from_annotations(&other, &config), None);
    }

    #[test]
    fn targets_from_annotation_arguments() {
        assert_eq!(ElementType::parse_targets("ElementType . METHOD"), vec![ElementType::Method]);
        assert_eq!(
            ElementType::parse_targets("value = { TYPE_USE , java . lang . annotation . ElementType . FIELD , TYPE_USE }"),
            vec![ElementType::TypeUse, ElementType::Field]
        );
        assert!(ElementType::parse_targets("{ }").is_empty());
    }

    #[test]
    fn varargs_arity() {
        let param = |varargs| ParamBinding {
            name: "a".into(),
            type_ref: TypeRef::simple("String", Span::default()),
            null: NullSpec::unknown(),
            varargs,
        };
        let method = MethodBinding {
            name: "m".into(),
            declaring: TypeId(0),
            type_params: vec![],
            params: vec![param(false), param(true)],
            return_type: Some(TypeRef::simple("void", Span::default())),
            return_null: NullSpec::unknown(),
            is_static: false,
            is_abstract: false,
            is_default: false,
        };
        assert!(method.accepts_arity(1));
        assert!(method.accepts_arity(3));
        assert!(!method.accepts_arity(0));
        assert_eq!(method.readable_name(), "m(String, String...)");
    }
}
