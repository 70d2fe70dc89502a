//! Diagnostic model, message catalog, collection and rendering.

pub mod messages;
mod problem;
mod render;
mod reporter;

pub use problem::{Category, Diagnostic};
pub use render::{render_problems, UnitProblems};
pub use reporter::ProblemReporter;
