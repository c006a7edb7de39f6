use std::fmt::Write;

use crate::{fmt, rt::Evaluator};

/// One session: zero-or-more variable-assignment lines followed by one
/// expression line. Every session is evaluated against its own fresh
/// environment, so variables never leak between sessions.
#[derive(Debug, Clone, Default)]
pub struct Session<'src> {
    pub number: usize,
    pub variables: Vec<&'src str>,
    pub expressions: Vec<&'src str>,
}

/// Splits an input into sessions delimited by `----` header lines.
///
/// Inside a session, lines containing `=` before the expression has been seen
/// are variable definitions; the first non-definition line is the session's
/// single expression and closes it. Lines between a closed session and the
/// next header are ignored. A file without any header falls back to grouping
/// contiguous definition lines with the expression line that follows them.
pub fn parse_sessions(source: &str) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut outside_lines = Vec::new();
    let mut current = Session::default();
    let mut session_count = 0;
    let mut in_session = false;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "----" {
            // A header while a session is still awaiting its expression
            // closes that session without one
            if in_session {
                sessions.push(current);
            }

            session_count += 1;
            current = Session {
                number: session_count,
                ..Session::default()
            };
            in_session = true;
            continue;
        }

        if !in_session {
            outside_lines.push(line);
            continue;
        }

        if line.contains('=') {
            current.variables.push(line);
        } else {
            // The single expression completes the session
            current.expressions.push(line);
            sessions.push(current);
            current = Session::default();
            in_session = false;
        }
    }

    if in_session {
        sessions.push(current);
    }

    if sessions.is_empty() && !outside_lines.is_empty() {
        group_headerless_lines(&outside_lines, &mut sessions);
    }

    sessions
}

/// Applies the session grammar to a file without `----` headers: contiguous
/// variable-definition lines belong to the expression line that follows them.
/// Definitions at end-of-input form a final expressionless session.
fn group_headerless_lines<'src>(lines: &[&'src str], sessions: &mut Vec<Session<'src>>) {
    let mut iter = lines.iter().copied().peekable();

    while iter.peek().is_some() {
        let mut session = Session {
            number: sessions.len() + 1,
            ..Session::default()
        };

        while let Some(line) = iter.next_if(|line| line.contains('=')) {
            session.variables.push(line);
        }

        if let Some(expression) = iter.next() {
            session.expressions.push(expression);
        }

        sessions.push(session);
    }
}

/// Renders the overall analysis header: totals followed by per-session
/// variable and expression counts.
pub fn summary(sessions: &[Session]) -> String {
    let total_variables: usize = sessions.iter().map(|s| s.variables.len()).sum();
    let total_expressions: usize = sessions.iter().map(|s| s.expressions.len()).sum();

    let mut output = String::new();
    writeln!(output, "=== SESSION ANALYSIS ===").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Total Sessions: {}", sessions.len()).unwrap();
    writeln!(output, "Total Variables: {}", total_variables).unwrap();
    writeln!(output, "Total Expressions: {}", total_expressions).unwrap();
    writeln!(output).unwrap();

    for session in sessions {
        writeln!(output, "--- Session {} ---", session.number).unwrap();
        writeln!(output, "Variables: {}", session.variables.len()).unwrap();
        writeln!(output, "Expressions: {}", session.expressions.len()).unwrap();
        writeln!(output).unwrap();
    }

    output
}

/// The outcome of evaluating one session against a fresh environment.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub number: usize,
    /// Whether every line of the session evaluated without error.
    pub ok: bool,
    /// The printable session block: header, variable definitions, then the
    /// formatted expression results.
    pub block: String,
    /// The OK line or the first error description.
    pub report: String,
}

/// Evaluates a session's variable definitions and expressions in order
/// against a fresh evaluator. The first failing variable definition stops the
/// remaining definitions, but the expressions still render into the block
/// against whatever the definitions managed to populate; a failing expression
/// is recorded in the block and evaluation of the remaining ones continues.
pub fn evaluate_session(session: &Session) -> SessionReport {
    // Fresh evaluator per session so variables don't leak between sessions
    let mut evaluator = Evaluator::new();
    let mut ok = true;
    let mut report = String::new();

    for line in &session.variables {
        if let Err(error) = evaluator.evaluate(line) {
            ok = false;
            report = format!(
                "Variable error in session {}: '{}' -> {}",
                session.number, line, error
            );
            break;
        }
    }

    let mut block = String::from("----\n");
    for line in &session.variables {
        block.push_str(line);
        block.push('\n');
    }

    // The expressions always render into the block, evaluated against the
    // environment as far as the definitions populated it
    for expression in &session.expressions {
        match evaluator.evaluate(expression) {
            Ok(value) => {
                block.push_str(&fmt::format_result(expression, value));
                block.push('\n');
            }
            Err(error) => {
                writeln!(block, "{} => Error: {}", expression, error).unwrap();
                if ok {
                    ok = false;
                    report = format!(
                        "Expression error in session {}: '{}' -> {}",
                        session.number, expression, error
                    );
                }
            }
        }
    }

    if ok {
        report = format!("Session {} : OK", session.number);
    }

    SessionReport {
        number: session.number,
        ok,
        block,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_delimit_sessions() {
        let source = "----\nx = 2\ny = 3\nx + y\n----\n1 + 1\n";
        let sessions = parse_sessions(source);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].number, 1);
        assert_eq!(sessions[0].variables, vec!["x = 2", "y = 3"]);
        assert_eq!(sessions[0].expressions, vec!["x + y"]);
        assert_eq!(sessions[1].variables.len(), 0);
        assert_eq!(sessions[1].expressions, vec!["1 + 1"]);
    }

    #[test]
    fn a_header_closes_an_expressionless_session() {
        let source = "----\nx = 2\n----\n1 + 1\n";
        let sessions = parse_sessions(source);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].variables, vec!["x = 2"]);
        assert!(sessions[0].expressions.is_empty());
    }

    #[test]
    fn headerless_files_group_definitions_with_the_following_expression() {
        let source = "x = 2\nx * 3\ny = 1\nz = 2\ny + z\n";
        let sessions = parse_sessions(source);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].variables, vec!["x = 2"]);
        assert_eq!(sessions[0].expressions, vec!["x * 3"]);
        assert_eq!(sessions[1].variables, vec!["y = 1", "z = 2"]);
        assert_eq!(sessions[1].expressions, vec!["y + z"]);
    }

    #[test]
    fn trailing_definitions_form_an_expressionless_session() {
        let sessions = parse_sessions("x = 2\n");

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].variables, vec!["x = 2"]);
        assert!(sessions[0].expressions.is_empty());
    }

    #[test]
    fn sessions_evaluate_against_fresh_environments() {
        let source = "----\nx = 2\nx + 1\n----\nx + 1\n";
        let sessions = parse_sessions(source);

        let first = evaluate_session(&sessions[0]);
        assert!(first.ok);
        assert_eq!(first.block, "----\nx = 2\nx + 1 = 3\n");
        assert_eq!(first.report, "Session 1 : OK");

        // `x` must not leak into the second session
        let second = evaluate_session(&sessions[1]);
        assert!(!second.ok);
        assert!(second.report.starts_with("Expression error in session 2"));
    }

    #[test]
    fn a_failing_variable_definition_marks_the_session_as_failed() {
        let source = "----\nx = nope\n1 + 1\n";
        let sessions = parse_sessions(source);

        let report = evaluate_session(&sessions[0]);
        assert!(!report.ok);
        assert!(report.report.starts_with("Variable error in session 1"));
    }

    #[test]
    fn the_block_still_renders_expressions_after_a_variable_error() {
        let source = "----\nx = nope\n1 + 1\n";
        let sessions = parse_sessions(source);

        let report = evaluate_session(&sessions[0]);
        assert_eq!(report.block, "----\nx = nope\n1 + 1 = 2\n");
        // The variable failure stays the reported error
        assert!(report.report.starts_with("Variable error in session 1"));
    }

    #[test]
    fn expressions_after_a_variable_error_see_the_partial_environment() {
        let source = "----\na = 1\nb = nope\na + 1\n";
        let sessions = parse_sessions(source);

        let report = evaluate_session(&sessions[0]);
        assert!(!report.ok);
        // `a` was defined before the failure, so the expression evaluates
        assert_eq!(report.block, "----\na = 1\nb = nope\na + 1 = 2\n");
    }

    #[test]
    fn summary_counts_sessions_variables_and_expressions() {
        let source = "----\nx = 2\ny = 3\nx + y\n----\n1 + 1\n";
        let rendered = summary(&parse_sessions(source));

        assert!(rendered.contains("Total Sessions: 2"));
        assert!(rendered.contains("Total Variables: 2"));
        assert!(rendered.contains("Total Expressions: 2"));
        assert!(rendered.contains("--- Session 1 ---"));
    }
}
