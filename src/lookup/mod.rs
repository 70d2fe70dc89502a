//! Binding environment: type providers, the binding arena, per-unit scopes
//! and the resolution pass that reports what cannot be resolved.

mod binder;
mod binding;
pub mod builtin;
mod environment;
mod listener;
mod provider;
mod scope;

pub use binder::bind_unit;
pub use binding::{
    ElementType, FieldBinding, HierarchyCycle, LookupResult, MethodBinding, NullSpec, Nullness, ParamBinding, SuperRef,
    TypeBinding, TypeId, TypeOrigin,
};
pub use environment::{FunctionalMethod, LookupEnvironment, PackageOwners, UnitRecord};
pub use listener::{BindingEvent, BindingKind, BindingListener};
pub use provider::{parse_classpath_entries, DirectoryProvider, InMemoryProvider, TypeProvider, TypeSource};
pub use scope::CompilationUnitScope;
