//! Textual problem listing with caret-underlined source excerpts.
//!
//! ```text
//! ----------
//! 1. ERROR in X.java (at line 4)
//! 	x = 2;
//! 	^
//! The final field x may already have been assigned
//! ----------
//! ```

use std::fmt::Write;

use super::problem::Diagnostic;

const SEPARATOR: &str = "----------\n";

/// The problems of one file, in reporting order.
pub struct UnitProblems<'a> {
    pub file: &'a str,
    pub source: &'a str,
    pub problems: &'a [Diagnostic],
}

/// Render several units with one global problem numbering.
/// Returns an empty string when there is nothing to report.
pub fn render_problems<'a>(units: impl IntoIterator<Item = UnitProblems<'a>>) -> String {
    let mut out = String::new();
    let mut number = 0;
    for unit in units {
        for problem in unit.problems {
            if number == 0 {
                out.push_str(SEPARATOR);
            }
            number += 1;
            render_problem(&mut out, number, unit.file, unit.source, problem);
            out.push_str(SEPARATOR);
        }
    }
    out
}

fn render_problem(out: &mut String, number: usize, file: &str, source: &str, problem: &Diagnostic) {
    let _ = writeln!(
        out,
        "{}. {} in {} (at line {})",
        number,
        problem.severity.label(),
        file,
        problem.line
    );
    out.push('\t');
    out.push_str(&excerpt(source, problem.start, problem.end));
    out.push('\n');
    out.push_str(&problem.message);
    out.push('\n');
}

/// Source lines covering `start..=end`, left-trimmed, then the underline.
fn excerpt(source: &str, start: usize, end: usize) -> String {
    let bytes = source.as_bytes();
    if bytes.is_empty() || start > end {
        return String::new();
    }
    let last = bytes.len() - 1;
    let start = start.min(last);
    let end = end.min(last);

    let mut begin = start;
    while begin > 0 && !is_line_break(bytes[begin - 1]) {
        begin -= 1;
    }
    let mut stop = end;
    while stop + 1 < bytes.len() && !is_line_break(bytes[stop + 1]) {
        stop += 1;
    }
    while begin < start && matches!(bytes[begin], b' ' | b'\t') {
        begin += 1;
    }

    let mut text = String::new();
    text.push_str(&String::from_utf8_lossy(&bytes[begin..=stop]));
    text.push_str("\n\t");
    for &byte in &bytes[begin..start] {
        if is_continuation(byte) {
            continue;
        }
        text.push(if byte == b'\t' { '\t' } else { ' ' });
    }
    for &byte in &bytes[start..=end] {
        if !is_continuation(byte) {
            text.push('^');
        }
    }
    text
}

fn is_line_break(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Severity;
    use crate::diagnostics::Category;

    fn problem(severity: Severity, start: usize, end: usize, line: usize, message: &str) -> Diagnostic {
        Diagnostic {
            severity,
            category: Category::DeadCode,
            template: "",
            arguments: Vec::new(),
            message: message.to_string(),
            start,
            end,
            line,
        }
    }

    #[test]
    fn underlines_inside_indented_line() {
        let source = "class X {\n\t  int x = y;\n}\n";
        let start = source.find('y').unwrap_or(0);
        let problems = [problem(Severity::Error, start, start, 2, "y cannot be resolved")];
        let rendered = render_problems([UnitProblems { file: "X.java", source, problems: &problems }]);
        assert_eq!(
            rendered,
            "----------\n1. ERROR in X.java (at line 2)\n\tint x = y;\n\t        ^\ny cannot be resolved\n----------\n"
        );
    }

    #[test]
    fn numbering_spans_units_and_keeps_tabs() {
        let a = "\tif (a)\t{}\n";
        let b = "x;";
        let brace = a.find('{').unwrap_or(0);
        let first = [problem(Severity::Warning, brace, brace + 1, 1, "Dead code")];
        let second = [problem(Severity::Info, 0, 0, 1, "note")];
        let rendered = render_problems([
            UnitProblems { file: "A.java", source: a, problems: &first },
            UnitProblems { file: "B.java", source: b, problems: &second },
        ]);
        assert_eq!(
            rendered,
            "----------\n1. WARNING in A.java (at line 1)\n\tif (a)\t{}\n\t      \t^^\nDead code\n----------\n\
             2. INFO in B.java (at line 1)\n\tx;\n\t^\nnote\n----------\n"
        );
    }

    #[test]
    fn nothing_to_report_renders_empty() {
        assert_eq!(render_problems(Vec::new()), "");
    }
}
