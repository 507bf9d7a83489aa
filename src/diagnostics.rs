//! Human readable rendering of errors against the source they came from.

use crate::{
    errors::errors::{Error, ErrorTip},
    get_line_at_position,
};

/// Renders `error` with the offending line and a caret under its span:
///
/// ```text
/// Error: IncompatibleOperator (Operator `+` does not accept (num, string))
///   |
/// 1 | 1 + "a"
///   | ^^^^^^^
/// ```
pub fn render(error: &Error, source: &str) -> String {
    let span = error.get_position();
    let (line, line_text, line_pos) = get_line_at_position(source, span.start.0);

    let header = match error.get_tip() {
        ErrorTip::None => format!("Error: {} ({})", error.get_error_name(), error.get_message()),
        tip => format!("Error: {} ({})", error.get_error_name(), tip),
    };

    let number = line.to_string();
    let gutter = " ".repeat(number.len());

    let text = line_text.trim_start_matches(' ');
    let removed = line_text.len() - text.len();
    let column = line_pos.saturating_sub(removed);

    let before = text.get(..column).unwrap_or(text);
    let covered = text.get(column..).unwrap_or("");
    let offset = before.chars().count();
    let width = covered
        .char_indices()
        .take_while(|(index, _)| *index < span.len())
        .count()
        .max(1);

    [
        header,
        format!("{} |", gutter),
        format!("{} | {}", number, text.trim_end()),
        format!("{} | {}{}", gutter, " ".repeat(offset), "^".repeat(width)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::render;
    use crate::{
        errors::errors::{Error, ErrorImpl},
        evaluator::Evaluator,
        Span,
    };

    fn render_source(source: &str) -> String {
        let evaluator = Evaluator::default();
        let error = evaluator
            .evaluate(source, &mut evaluator.namespace())
            .unwrap_err();
        render(&error, source)
    }

    #[test]
    fn test_render_operator_error() {
        assert_eq!(
            render_source("1 + \"a\""),
            [
                "Error: IncompatibleOperator (Operator `+` does not accept (num, string))",
                "  |",
                "1 | 1 + \"a\"",
                "  | ^^^^^^^",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_points_at_span() {
        assert_eq!(
            render_source("len(1) + foo"),
            [
                "Error: IncompatibleCall (No declaration of `len` accepts arguments (num))",
                "  |",
                "1 | len(1) + foo",
                "  | ^^^",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_without_tip_uses_message() {
        assert_eq!(
            render_source("10 / (5 - 5)"),
            [
                "Error: DivisionByZero (division by zero)",
                "  |",
                "1 | 10 / (5 - 5)",
                "  | ^^^^^^^^^^^",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_later_line_with_indentation() {
        let source = "1 + 2\n    foo";
        let error = Error::new(
            ErrorImpl::UnknownIdentifier {
                name: "foo".to_string(),
                suggestions: vec![],
            },
            Span::new(10, 13),
        );

        assert_eq!(
            render(&error, source),
            [
                "Error: UnknownIdentifier (unknown identifier 'foo'. At position: 10-13)",
                "  |",
                "2 | foo",
                "  | ^^^",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_empty_span_at_end_of_input() {
        let error = Error::new(
            ErrorImpl::UnexpectedToken {
                token: "EOF".to_string(),
                expected: "an expression".to_string(),
            },
            Span::new(3, 3),
        );

        assert_eq!(
            render(&error, "1 +"),
            [
                "Error: UnexpectedToken (Unexpected token: `EOF`, expected an expression)",
                "  |",
                "1 | 1 +",
                "  |    ^",
            ]
            .join("\n")
        );
    }
}
