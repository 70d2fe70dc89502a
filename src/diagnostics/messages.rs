//! Message catalog. Placeholders are `{0}`, `{1}`, ... in argument order.

// Resolution
pub const UNRESOLVED_TYPE: &str = "{0} cannot be resolved to a type";
pub const AMBIGUOUS_TYPE: &str = "The type {0} is ambiguous";
pub const TYPE_NOT_ACCESSIBLE: &str = "The type {0} is not accessible";
pub const PACKAGE_NOT_ACCESSIBLE: &str = "The package {0} is not accessible";
pub const IMPORT_NOT_FOUND: &str = "The import {0} cannot be resolved";
pub const UNUSED_IMPORT: &str = "The import {0} is never used";
pub const UNUSED_MODULE_IMPORT: &str = "The import module {0} is never used";
pub const UNRESOLVED_MODULE: &str = "{0} cannot be resolved to a module";
pub const MODULE_NOT_READ: &str = "The module {0} is not read by {1}";
pub const SPLIT_PACKAGE: &str = "The package {0} is accessible from more than one module: {1}";
pub const HIERARCHY_SELF_CYCLE: &str =
    "Cycle detected: the type {0} cannot extend/implement itself or one of its own member types";
pub const HIERARCHY_CYCLE: &str = "Cycle detected: a cycle exists in the type hierarchy between {0} and {1}";

// Annotations
pub const ANNOTATION_DISALLOWED_HERE: &str = "The annotation @{0} is disallowed for this location";
pub const TYPE_ANNOTATION_ON_VOID: &str = "Type annotation is illegal for a method that returns void";

// Definite assignment
pub const FINAL_LOCAL_ALREADY_ASSIGNED: &str = "The final local variable {0} may already have been assigned";
pub const FINAL_LOCAL_CANNOT_BE_ASSIGNED: &str =
    "The final local variable {0} cannot be assigned. It must be blank and not using a compound assignment";
pub const FINAL_FIELD_ALREADY_ASSIGNED: &str = "The final field {0} may already have been assigned";
pub const FINAL_FIELD_CANNOT_BE_ASSIGNED: &str = "The final field {0} cannot be assigned";
pub const BLANK_FINAL_NOT_INITIALIZED: &str = "The blank final field {0} may not have been initialized";
pub const LOCAL_NOT_INITIALIZED: &str = "The local variable {0} may not have been initialized";

// Reachability
pub const UNREACHABLE_CODE: &str = "Unreachable code";
pub const DEAD_CODE: &str = "Dead code";

pub const UNUSED_LOCAL: &str = "The value of the local variable {0} is not used";

// Null references
pub const NULL_LOCAL_REFERENCE: &str = "Null pointer access: The variable {0} can only be null at this location";
pub const POTENTIAL_NULL_LOCAL_REFERENCE: &str =
    "Potential null pointer access: The variable {0} may be null at this location";
pub const POTENTIAL_NULL_METHOD_RESULT: &str = "Potential null pointer access: The method {0} may return null";
pub const REDUNDANT_CHECK_ON_NONNULL: &str = "Redundant null check: The variable {0} cannot be null at this location";
pub const NULL_COMPARISON_ON_NONNULL: &str =
    "Null comparison always yields false: The variable {0} cannot be null at this location";
pub const REDUNDANT_CHECK_ON_NULL: &str = "Redundant null check: The variable {0} can only be null at this location";
pub const NULL_COMPARISON_ON_NULL: &str =
    "Null comparison always yields false: The variable {0} can only be null at this location";
pub const REDUNDANT_CHECK_ON_SPECIFIED_NONNULL: &str = "Redundant null check: The variable {0} is specified as @{1}";
pub const NULL_COMPARISON_ON_SPECIFIED_NONNULL: &str =
    "Null comparison always yields false: The variable {0} is specified as @{1}";

// Null contracts
pub const REQUIRED_NONNULL_BUT_NULL: &str = "Null type mismatch: required '{0}' but the provided value is null";
pub const REQUIRED_NONNULL_BUT_NULLABLE: &str =
    "Null type mismatch: required '{0}' but the provided value is specified as @{1}";
pub const REQUIRED_NONNULL_BUT_INFERRED_NULLABLE: &str =
    "Null type mismatch: required '{0}' but the provided value is inferred as @{1}";
pub const UNCHECKED_CONVERSION_TO_NONNULL: &str =
    "Null type safety: The expression of type '{0}' needs unchecked conversion to conform to '{1}'";
pub const ILLEGAL_PARAMETER_REDEFINITION_NULLABLE: &str =
    "Illegal redefinition of parameter {0}, inherited method from {1} declares this parameter as @{2}";
pub const ILLEGAL_PARAMETER_REDEFINITION_UNCONSTRAINED: &str =
    "Illegal redefinition of parameter {0}, inherited method from {1} does not constrain this parameter";
pub const INCOMPATIBLE_RETURN_NULLNESS: &str =
    "The return type is incompatible with '{0}' returned from {1} (mismatching null constraints)";
pub const REFERENCE_PARAMETER_MISMATCH: &str =
    "Null type mismatch at parameter {0}: required '{1}' but provided '{2}' via method descriptor {3}";
pub const REFERENCE_PARAMETER_UNCHECKED: &str =
    "Null type safety: parameter {0} provided via method descriptor {1} needs unchecked conversion to conform to '{2}'";
pub const REFERENCE_RETURN_MISMATCH: &str =
    "Null type mismatch at method return type: Method descriptor {0} promises '{1}' but referenced method provides '{2}'";
pub const ANNOTATION_ON_PRIMITIVE: &str = "The nullness annotation @{0} is not applicable for the primitive type {1}";

/// Substitute `{N}` placeholders; unknown indices are left as written.
pub fn format(template: &str, arguments: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let substituted = tail.find('}').and_then(|close| {
            let index: usize = tail[..close].parse().ok()?;
            let argument = arguments.get(index)?;
            Some((argument, close))
        });
        match substituted {
            Some((argument, close)) => {
                out.push_str(argument);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_in_any_order() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(format("{1} then {0}", &args), "b then a");
    }

    #[test]
    fn leaves_unknown_placeholders() {
        assert_eq!(format("{3} {x}", &[]), "{3} {x}");
    }

    #[test]
    fn renders_catalog_entries() {
        let message = format(SPLIT_PACKAGE, &["pm".into(), "mod.one, mod.two".into()]);
        assert_eq!(message, "The package pm is accessible from more than one module: mod.one, mod.two");
    }
}
