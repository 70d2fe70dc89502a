//! Checker configuration: per-category severities and analysis switches.
//!
//! Options use the short keys of the properties file format, e.g.
//!
//! ```text
//! unusedLocal=ignore
//! nullAnalysis=enabled
//! annotation.nonnull=com.example.NonNull
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::consts::{
    DEFAULT_NONNULL_ANNOTATION, DEFAULT_NONNULL_BY_DEFAULT_ANNOTATION, DEFAULT_NULLABLE_ANNOTATION,
};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ignore,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Label used in rendered problem headers.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Ignore => "IGNORE",
        }
    }

    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_ascii_lowercase())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "ignore" => Ok(Severity::Ignore),
            other => Err(Error::config(format!("unknown severity '{}'", other))),
        }
    }
}

/// Keys of the configurable diagnostic categories.
pub mod keys {
    pub const UNUSED_LOCAL: &str = "unusedLocal";
    pub const UNUSED_IMPORT: &str = "unusedImport";
    pub const DEAD_CODE: &str = "deadCode";
    pub const NULL_REFERENCE: &str = "nullReference";
    pub const POTENTIAL_NULL_REFERENCE: &str = "potentialNullReference";
    pub const REDUNDANT_NULL_CHECK: &str = "redundantNullCheck";
    pub const NULL_SPEC_VIOLATION: &str = "nullSpecViolation";
    pub const NULL_UNCHECKED_CONVERSION: &str = "nullUncheckedConversion";

    pub const NULL_ANALYSIS: &str = "nullAnalysis";
    pub const DEAD_CODE_IN_TRIVIAL_IF: &str = "deadCodeInTrivialIf";
    pub const NONNULL_ANNOTATION: &str = "annotation.nonnull";
    pub const NULLABLE_ANNOTATION: &str = "annotation.nullable";
    pub const NONNULL_BY_DEFAULT_ANNOTATION: &str = "annotation.nonnullbydefault";

    pub const SEVERITY_KEYS: [&str; 8] = [
        UNUSED_LOCAL,
        UNUSED_IMPORT,
        DEAD_CODE,
        NULL_REFERENCE,
        POTENTIAL_NULL_REFERENCE,
        REDUNDANT_NULL_CHECK,
        NULL_SPEC_VIOLATION,
        NULL_UNCHECKED_CONVERSION,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    severities: HashMap<String, Severity>,
    /// Annotation-based null contract checking.
    pub null_analysis: bool,
    /// Report dead code guarded by a constant reference such as `if (DEBUG)`.
    pub report_dead_code_in_trivial_if: bool,
    pub nonnull_annotation: String,
    pub nullable_annotation: String,
    pub nonnull_by_default_annotation: String,
}

impl Default for Config {
    fn default() -> Self {
        let severities = [
            (keys::UNUSED_LOCAL, Severity::Warning),
            (keys::UNUSED_IMPORT, Severity::Warning),
            (keys::DEAD_CODE, Severity::Warning),
            (keys::NULL_REFERENCE, Severity::Error),
            (keys::POTENTIAL_NULL_REFERENCE, Severity::Warning),
            (keys::REDUNDANT_NULL_CHECK, Severity::Warning),
            (keys::NULL_SPEC_VIOLATION, Severity::Error),
            (keys::NULL_UNCHECKED_CONVERSION, Severity::Warning),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            severities,
            null_analysis: false,
            report_dead_code_in_trivial_if: false,
            nonnull_annotation: DEFAULT_NONNULL_ANNOTATION.to_string(),
            nullable_annotation: DEFAULT_NULLABLE_ANNOTATION.to_string(),
            nonnull_by_default_annotation: DEFAULT_NONNULL_BY_DEFAULT_ANNOTATION.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Severity for a configurable category key; unknown keys are errors.
    pub fn severity(&self, key: &str) -> Severity {
        self.severities.get(key).copied().unwrap_or(Severity::Error)
    }

    pub fn with_severity(mut self, key: &str, severity: Severity) -> Self {
        self.severities.insert(key.to_string(), severity);
        self
    }

    pub fn with_null_analysis(mut self, enabled: bool) -> Self {
        self.null_analysis = enabled;
        self
    }

    pub fn with_dead_code_in_trivial_if(mut self, enabled: bool) -> Self {
        self.report_dead_code_in_trivial_if = enabled;
        self
    }

    pub fn with_annotation_names(mut self, nonnull: &str, nullable: &str, nonnull_by_default: &str) -> Self {
        self.nonnull_annotation = nonnull.to_string();
        self.nullable_annotation = nullable.to_string();
        self.nonnull_by_default_annotation = nonnull_by_default.to_string();
        self
    }

    /// Apply one `key=value` option.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.trim();
        let value = value.trim();
        match key {
            keys::NULL_ANALYSIS => self.null_analysis = parse_switch(key, value)?,
            keys::DEAD_CODE_IN_TRIVIAL_IF => self.report_dead_code_in_trivial_if = parse_switch(key, value)?,
            keys::NONNULL_ANNOTATION => self.nonnull_annotation = value.to_string(),
            keys::NULLABLE_ANNOTATION => self.nullable_annotation = value.to_string(),
            keys::NONNULL_BY_DEFAULT_ANNOTATION => self.nonnull_by_default_annotation = value.to_string(),
            _ if keys::SEVERITY_KEYS.contains(&key) => {
                self.severities.insert(key.to_string(), value.parse()?);
            }
            _ => return Err(Error::config(format!("unknown option '{}'", key))),
        }
        Ok(())
    }

    pub fn from_options<I, K, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in options {
            config.set_option(key.as_ref(), value.as_ref())?;
        }
        Ok(config)
    }

    /// Parse `key=value` lines; blank lines and `#` comments are skipped.
    pub fn from_properties(text: &str) -> Result<Self> {
        let mut config = Self::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::config(format!("line {}: expected key=value", index + 1)));
            };
            config.set_option(key, value)?;
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading options from {}", path.as_ref().display());
        Self::from_properties(&text)
    }

    /// Annotation names match by qualified or simple name.
    pub fn is_nonnull_annotation(&self, name: &str) -> bool {
        annotation_matches(&self.nonnull_annotation, name)
    }

    pub fn is_nullable_annotation(&self, name: &str) -> bool {
        annotation_matches(&self.nullable_annotation, name)
    }

    pub fn is_nonnull_by_default_annotation(&self, name: &str) -> bool {
        annotation_matches(&self.nonnull_by_default_annotation, name)
    }

    pub fn nonnull_simple_name(&self) -> &str {
        simple_name(&self.nonnull_annotation)
    }

    pub fn nullable_simple_name(&self) -> &str {
        simple_name(&self.nullable_annotation)
    }
}

fn parse_switch(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "enabled" | "true" | "on" => Ok(true),
        "disabled" | "false" | "off" => Ok(false),
        _ => Err(Error::config(format!("option '{}' expects enabled or disabled, got '{}'", key, value))),
    }
}

fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

fn annotation_matches(configured: &str, written: &str) -> bool {
    written == configured || written == simple_name(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_category_table() {
        let config = Config::default();
        assert_eq!(config.severity(keys::UNUSED_LOCAL), Severity::Warning);
        assert_eq!(config.severity(keys::NULL_SPEC_VIOLATION), Severity::Error);
        assert!(!config.null_analysis);
    }

    #[test]
    fn properties_override_defaults() {
        let config = Config::from_properties(
            "# comment\nunusedLocal=ignore\nnullAnalysis=enabled\nannotation.nonnull=a.b.NN\n",
        )
        .expect("valid properties");
        assert_eq!(config.severity(keys::UNUSED_LOCAL), Severity::Ignore);
        assert!(config.null_analysis);
        assert!(config.is_nonnull_annotation("NN"));
        assert!(config.is_nonnull_annotation("a.b.NN"));
        assert!(!config.is_nonnull_annotation("NonNull"));
    }

    #[test]
    fn annotation_names_match_simple_or_qualified() {
        let config = Config::default().with_annotation_names("x.NotNull", "x.MaybeNull", "x.NotNullByDefault");
        assert!(config.is_nullable_annotation("MaybeNull"));
        assert!(config.is_nonnull_by_default_annotation("x.NotNullByDefault"));
        assert!(!config.is_nullable_annotation("Nullable"));
        assert_eq!(config.nonnull_simple_name(), "NotNull");
    }

    #[test]
    fn unknown_keys_and_values_are_rejected() {
        assert!(Config::from_options([("noSuchOption", "error")]).is_err());
        assert!(Config::from_options([(keys::DEAD_CODE, "loud")]).is_err());
        assert!(Config::from_properties("deadCode").is_err());
    }
}
