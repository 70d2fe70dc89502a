use std::collections::HashSet;

use once_cell::sync::Lazy;

// Parser: upper bound on total parser steps across a file
pub const PARSER_MAX_GAS: usize = 5_000_000;

// Lookup: depth cap for supertype walks over external (possibly cyclic) stubs
pub const LOOKUP_MAX_HIERARCHY_DEPTH: usize = 64;

pub const JAVA_LANG: &str = "java.lang";
pub const JAVA_BASE: &str = "java.base";
pub const OBJECT: &str = "java.lang.Object";

pub static PRIMITIVE_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["boolean", "byte", "short", "int", "long", "char", "float", "double", "void"]
        .into_iter()
        .collect()
});

// Default nullness annotation names; overridable through `Config`
pub const DEFAULT_NONNULL_ANNOTATION: &str = "org.eclipse.jdt.annotation.NonNull";
pub const DEFAULT_NULLABLE_ANNOTATION: &str = "org.eclipse.jdt.annotation.Nullable";
pub const DEFAULT_NONNULL_BY_DEFAULT_ANNOTATION: &str = "org.eclipse.jdt.annotation.NonNullByDefault";

pub const MODULE_INFO_FILE: &str = "module-info.java";
pub const PACKAGE_INFO_FILE: &str = "package-info.java";
