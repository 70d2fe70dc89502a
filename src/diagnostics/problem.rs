use std::fmt;

use crate::config::{keys, Severity};

/// What a diagnostic is about. Configurable categories map to a
/// [`crate::config::Config`] key, the rest are always errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    UnresolvedType,
    AmbiguousType,
    NotAccessible,
    UnresolvedImport,
    UnresolvedModule,
    SplitPackage,
    HierarchyCycle,
    AnnotationTarget,
    UnusedImport,
    FinalAssignment,
    UninitializedVariable,
    UninitializedBlankFinal,
    UnreachableCode,
    DeadCode,
    UnusedLocal,
    NullReference,
    PotentialNullReference,
    RedundantNullCheck,
    NullSpecViolation,
    NullUncheckedConversion,
    NullAnnotationTarget,
}

impl Category {
    /// Configuration key, `None` for hard language errors.
    pub fn key(self) -> Option<&'static str> {
        match self {
            Category::UnusedImport => Some(keys::UNUSED_IMPORT),
            Category::DeadCode => Some(keys::DEAD_CODE),
            Category::UnusedLocal => Some(keys::UNUSED_LOCAL),
            Category::NullReference => Some(keys::NULL_REFERENCE),
            Category::PotentialNullReference => Some(keys::POTENTIAL_NULL_REFERENCE),
            Category::RedundantNullCheck => Some(keys::REDUNDANT_NULL_CHECK),
            Category::NullSpecViolation => Some(keys::NULL_SPEC_VIOLATION),
            Category::NullUncheckedConversion => Some(keys::NULL_UNCHECKED_CONVERSION),
            _ => None,
        }
    }
}

/// One finding. Immutable once reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub template: &'static str,
    pub arguments: Vec<String>,
    pub message: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset of the last character, inclusive.
    pub end: usize,
    pub line: usize,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}): {}", self.severity, self.line, self.message)
    }
}
