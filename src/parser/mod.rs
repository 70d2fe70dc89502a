//! Lexing and parsing of Java source files into the [`crate::ast`] tree.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use error::ParseError;
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::{HasSpan, Location, Span};

use crate::ast::CompilationUnit;
use crate::error::Result;

/// Parse one Java source file.
pub fn parse_java(source: &str) -> Result<CompilationUnit> {
    Ok(parser::parse(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_class() {
        let source = r#"
package com.example;

public class HelloWorld {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}
"#;
        let unit = parse_java(source).expect("Failed to parse");
        assert_eq!(unit.package_name(), "com.example");
        assert_eq!(unit.type_decls.len(), 1);
    }

    #[test]
    fn parses_imports_and_diamond() {
        let source = r#"
package com.example;

import java.util.List;
import java.util.ArrayList;

public class TestClass {
    private List<String> items = new ArrayList<>();
}
"#;
        let unit = parse_java(source).expect("Failed to parse");
        assert_eq!(unit.imports.len(), 2);
    }

    #[test]
    fn syntax_error_surfaces_as_crate_error() {
        let err = parse_java("class {").unwrap_err();
        assert!(matches!(err, crate::error::Error::Parse(_)));
    }
}
