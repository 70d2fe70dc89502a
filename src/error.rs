use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;

/// Fatal errors. Everything that is not fatal is reported as a
/// [`crate::diagnostics::Diagnostic`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("syntax error in {file}: {error}")]
    Syntax { file: String, error: ParseError },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cycle detected in module graph: {}", .0.join(" -> "))]
    ModuleCycle(Vec<String>),

    #[error("module {0} is declared more than once")]
    DuplicateModule(String),

    #[error("cannot read classpath entry {}: {reason}", .path.display())]
    UnreadableClasspath { path: PathBuf, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// True for errors caused by the session setup rather than by a source file.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ModuleCycle(_)
                | Error::DuplicateModule(_)
                | Error::UnreadableClasspath { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
