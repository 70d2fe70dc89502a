use std::collections::HashSet;

use crate::config::{Config, Severity};
use crate::parser::span::Span;

use super::messages;
use super::problem::{Category, Diagnostic};

/// Collects the diagnostics of one compilation unit.
pub struct ProblemReporter<'a> {
    config: &'a Config,
    problems: Vec<Diagnostic>,
    seen: HashSet<(usize, usize, String)>,
    muted: usize,
}

impl<'a> ProblemReporter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            problems: Vec::new(),
            seen: HashSet::new(),
            muted: 0,
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn severity_of(&self, category: Category) -> Severity {
        match category.key() {
            Some(key) => self.config.severity(key),
            None => Severity::Error,
        }
    }

    pub fn report(&mut self, category: Category, template: &'static str, arguments: Vec<String>, span: Span) {
        self.report_range(category, template, arguments, span.start.offset, span.last_offset(), span.start.line);
    }

    /// Report over an explicit inclusive range.
    pub fn report_range(
        &mut self,
        category: Category,
        template: &'static str,
        arguments: Vec<String>,
        start: usize,
        end: usize,
        line: usize,
    ) {
        if self.muted > 0 {
            return;
        }
        let severity = self.severity_of(category);
        if severity == Severity::Ignore {
            return;
        }
        let message = messages::format(template, &arguments);
        if !self.seen.insert((start, end, message.clone())) {
            return;
        }
        log::trace!("{} at {}..={}: {}", severity, start, end, message);
        self.problems.push(Diagnostic {
            severity,
            category,
            template,
            arguments,
            message,
            start,
            end,
            line,
        });
    }

    /// Suppress reports until the matching [`ProblemReporter::unmute`].
    pub fn mute(&mut self) {
        self.muted += 1;
    }

    pub fn unmute(&mut self) {
        self.muted = self.muted.saturating_sub(1);
    }

    pub fn problems(&self) -> &[Diagnostic] {
        &self.problems
    }

    /// Position-ordered diagnostics; equal positions keep discovery order.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut problems = self.problems;
        problems.sort_by_key(|p| (p.line, p.start));
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;
    use crate::parser::span::Location;

    fn span(start: usize, end: usize, line: usize) -> Span {
        Span::new(Location::new(line, start + 1, start), Location::new(line, end + 1, end))
    }

    #[test]
    fn duplicates_are_dropped() {
        let config = Config::default();
        let mut reporter = ProblemReporter::new(&config);
        for _ in 0..2 {
            reporter.report(Category::DeadCode, messages::DEAD_CODE, vec![], span(4, 8, 1));
        }
        assert_eq!(reporter.finish().len(), 1);
    }

    #[test]
    fn ordered_by_position_then_discovery() {
        let config = Config::default();
        let mut reporter = ProblemReporter::new(&config);
        reporter.report(Category::UnreachableCode, messages::UNREACHABLE_CODE, vec![], span(30, 32, 3));
        reporter.report(Category::DeadCode, messages::DEAD_CODE, vec![], span(10, 12, 2));
        reporter.report(Category::UnusedLocal, messages::UNUSED_LOCAL, vec!["x".into()], span(10, 12, 2));
        let problems = reporter.finish();
        let messages: Vec<_> = problems.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Dead code", "The value of the local variable x is not used", "Unreachable code"]
        );
    }

    #[test]
    fn ignored_and_muted_reports_vanish() {
        let config = Config::default().with_severity(keys::DEAD_CODE, Severity::Ignore);
        let mut reporter = ProblemReporter::new(&config);
        reporter.report(Category::DeadCode, messages::DEAD_CODE, vec![], span(0, 1, 1));
        reporter.mute();
        reporter.report(Category::UnreachableCode, messages::UNREACHABLE_CODE, vec![], span(0, 1, 1));
        reporter.unmute();
        assert!(reporter.problems().is_empty());
        reporter.report(Category::UnreachableCode, messages::UNREACHABLE_CODE, vec![], span(0, 1, 1));
        assert_eq!(reporter.problems().len(), 1);
    }
}
