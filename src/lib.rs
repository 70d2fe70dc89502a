//! jcheck: semantic checks for Java sources
//!
//! Resolves names across sources, classpath entries and modules, runs flow
//! analysis over every body and reports problems in the classic batch
//! compiler listing format.
//!
//! ## Architecture
//!
//! - **parser**: Lexical analysis and parsing of Java source into the AST
//! - **ast**: Syntax tree of the supported Java subset
//! - **modules**: Module descriptors and the readability graph
//! - **lookup**: Binding environment, type providers and per-unit scopes
//! - **flow**: Reachability, definite assignment and null analysis
//! - **diagnostics**: Message catalog, problem reporter and rendering
//! - **session**: One batch compilation tying the phases together
//! - **bin**: Command-line interface
//!
//! ## Compilation Flow
//!
//! ```text
//! Sources → Parser → AST → Register units / build module graph
//!                              ↓
//!                  per unit: Bind (resolve names) → Flow → Diagnostics
//! ```

pub mod ast;
pub mod config;
pub mod consts;
pub mod diagnostics;
pub mod error;
pub mod flow;
pub mod lookup;
pub mod modules;
pub mod parser;
pub mod session;

pub use config::{Config, Severity};
pub use diagnostics::{Category, Diagnostic};
pub use error::{Error, Result};
pub use session::{CompileResult, CompileSession, UnitReport};

/// Check a single source file against the built-in JDK and return the
/// rendered problem listing.
pub fn check_source(path: &str, source: &str, config: &Config) -> Result<String> {
    let mut session = CompileSession::new(config.clone());
    session.add_source(path, source);
    Ok(session.compile()?.render())
}
