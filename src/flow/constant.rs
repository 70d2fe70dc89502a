//! Boolean constant folding for conditions.

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};

/// Value of a boolean constant expression. `names` answers for simple and
/// qualified names that refer to constant variables.
pub fn boolean_value(expr: &Expr, names: &mut dyn FnMut(&Expr) -> Option<bool>) -> Option<bool> {
    match expr.unparenthesized() {
        Expr::Literal(literal) => match literal.value {
            Literal::Boolean(value) => Some(value),
            _ => None,
        },
        Expr::Unary(unary) if unary.op == UnaryOp::Not => boolean_value(&unary.operand, names).map(|v| !v),
        Expr::Binary(binary) => {
            let left = boolean_value(&binary.left, names)?;
            let right = boolean_value(&binary.right, names)?;
            match binary.op {
                BinaryOp::And | BinaryOp::BitAnd => Some(left && right),
                BinaryOp::Or | BinaryOp::BitOr => Some(left || right),
                BinaryOp::BitXor | BinaryOp::Ne => Some(left != right),
                BinaryOp::Eq => Some(left == right),
                _ => None,
            }
        }
        name @ (Expr::Identifier(_) | Expr::FieldAccess(_)) => names(name),
        _ => None,
    }
}

/// A condition that is only a name, possibly negated: `DEBUG`, `!X.TRACE`.
pub fn is_trivial_condition(expr: &Expr) -> bool {
    let expr = match expr.unparenthesized() {
        Expr::Unary(unary) if unary.op == UnaryOp::Not => unary.operand.unparenthesized(),
        other => other,
    };
    matches!(expr, Expr::Identifier(_) | Expr::FieldAccess(_)) && expr.as_qualified_name().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_java;
    use crate::ast::{ClassMember, Stmt};

    fn condition(source: &str) -> Expr {
        let text = format!("class T {{ void m() {{ if ({}) {{}} }} }}", source);
        let unit = parse_java(&text).expect("parses");
        let method = unit.type_decls[0]
            .members
            .iter()
            .find_map(|m| match m {
                ClassMember::Method(method) => Some(method.clone()),
                _ => None,
            })
            .expect("method");
        match &method.body.expect("body").statements[0] {
            Stmt::If(stmt) => stmt.condition.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn debug_is_false(expr: &Expr) -> Option<bool> {
        match expr.as_qualified_name().as_deref() {
            Some("DEBUG") => Some(false),
            _ => None,
        }
    }

    #[test]
    fn folds_literals_and_constant_names() {
        assert_eq!(boolean_value(&condition("!true"), &mut debug_is_false), Some(false));
        assert_eq!(boolean_value(&condition("DEBUG || true"), &mut debug_is_false), Some(true));
        assert_eq!(boolean_value(&condition("(DEBUG == false)"), &mut debug_is_false), Some(true));
        assert_eq!(boolean_value(&condition("b || true"), &mut debug_is_false), None);
    }

    #[test]
    fn trivial_conditions_are_plain_names() {
        assert!(is_trivial_condition(&condition("DEBUG")));
        assert!(is_trivial_condition(&condition("!X.DEBUG")));
        assert!(!is_trivial_condition(&condition("false")));
        assert!(!is_trivial_condition(&condition("b && false")));
    }
}
