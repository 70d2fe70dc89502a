//! Flow analysis over method, constructor, initializer and lambda bodies.
//!
//! One pass per compilation unit tracks reachability, definite assignment
//! of locals and blank final fields, unused locals and the null status of
//! locals. It also enforces annotation-based null contracts when null
//! analysis is enabled.

mod analyzer;
mod constant;
mod context;
mod info;
mod nullness;

pub use analyzer::FlowAnalyzer;
pub use info::{FlowInfo, NullStatus, Reach};

use crate::ast::CompilationUnit;
use crate::diagnostics::ProblemReporter;
use crate::lookup::{CompilationUnitScope, LookupEnvironment};

/// Run the flow pass over every body of `unit`.
pub fn analyze_unit(
    env: &mut LookupEnvironment,
    scope: &mut CompilationUnitScope,
    unit: &CompilationUnit,
    reporter: &mut ProblemReporter<'_>,
) {
    FlowAnalyzer::new(env, scope, reporter).analyze_unit(unit);
}
