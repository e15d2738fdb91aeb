use std::fmt;
use std::ops::Range;

use strum_macros::IntoStaticStr;

use crate::atom::Script;
use crate::environments::Env;

/// Represents an error that occurred while parsing.
///
/// The first field is the byte range of the offending input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub Range<usize>, pub ParseErrorKind);

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// A command which is not in the command table.
    UnknownCommand(Box<str>),
    /// A command or script marker which is missing one of its arguments.
    /// The payload is the command as written, e.g. `\frac` or `^`.
    MissingArgument(Box<str>),
    DuplicateScript(Script),
    ScriptNotAllowed(Script),
    UnbalancedBraces,
    /// The optional argument of `\sqrt` was not closed with `]`.
    UnbalancedBrackets,
    UnexpectedCharacter(char),
    NestingTooDeep,
    EmptyInput,
    /// `\limits` or `\nolimits` without a preceding large operator.
    InvalidLimits,
    MissingDelimiter(DelimiterModifier),
    InvalidDelimiter(Box<str>),
    MissingRight,
    MissingLeft,
    UnknownEnvironment(Box<str>),
    MismatchedEnvironment {
        expected: Env,
        got: Env,
    },
    MissingEnd(Env),
    MissingBegin(Env),
    MisplacedSeparator(Separator),
}

#[derive(Debug, Clone, Copy, PartialEq, IntoStaticStr)]
pub enum DelimiterModifier {
    #[strum(serialize = r"\left")]
    Left,
    #[strum(serialize = r"\right")]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, IntoStaticStr)]
pub enum Separator {
    #[strum(serialize = "&")]
    Column,
    #[strum(serialize = r"\\")]
    Row,
}

impl ParseErrorKind {
    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            ParseErrorKind::UnknownCommand(cmd) => "Unknown command \"\\".to_string() + cmd + "\".",
            ParseErrorKind::MissingArgument(cmd) => {
                "Missing argument for \"".to_string() + cmd + "\"."
            }
            ParseErrorKind::DuplicateScript(script) => {
                "Duplicate \"".to_string() + <&str>::from(script) + "\" on the same atom."
            }
            ParseErrorKind::ScriptNotAllowed(script) => {
                "\"".to_string() + <&str>::from(script) + "\" cannot be applied to a space or style command."
            }
            ParseErrorKind::UnbalancedBraces => "Unbalanced braces.".to_string(),
            ParseErrorKind::UnbalancedBrackets => {
                "Expected \"]\" to close the optional argument, but not found.".to_string()
            }
            ParseErrorKind::UnexpectedCharacter(ch) => {
                let mut text = "Unexpected character '".to_string();
                text.push(*ch);
                text += "'.";
                text
            }
            ParseErrorKind::NestingTooDeep => {
                "Nesting too deep. Please simplify your equation.".to_string()
            }
            ParseErrorKind::EmptyInput => "Empty input.".to_string(),
            ParseErrorKind::InvalidLimits => {
                r"\limits and \nolimits may only follow a large operator.".to_string()
            }
            ParseErrorKind::MissingDelimiter(location) => {
                "There must be a delimiter after \"".to_string()
                    + <&str>::from(*location)
                    + "\", but not found."
            }
            ParseErrorKind::InvalidDelimiter(got) => {
                "Invalid delimiter \"".to_string() + got + "\"."
            }
            ParseErrorKind::MissingRight => r"Missing \right.".to_string(),
            ParseErrorKind::MissingLeft => r"Missing \left.".to_string(),
            ParseErrorKind::UnknownEnvironment(environment) => {
                "Unknown environment \"".to_string() + environment + "\"."
            }
            ParseErrorKind::MismatchedEnvironment { expected, got } => {
                "Expected \"\\end{".to_string()
                    + expected.as_str()
                    + "}\", but got \"\\end{"
                    + got.as_str()
                    + "}\"."
            }
            ParseErrorKind::MissingEnd(env) => {
                "Expected \"\\end{".to_string() + env.as_str() + "}\", but not found."
            }
            ParseErrorKind::MissingBegin(env) => {
                "Got \"\\end{".to_string() + env.as_str() + "}\" without a matching \\begin."
            }
            ParseErrorKind::MisplacedSeparator(separator) => {
                "\"".to_string() + <&str>::from(separator) + "\" may only appear in a table environment."
            }
        }
    }
}

impl ParseError {
    #[inline]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.1
    }

    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.0.clone()
    }

    pub fn error_message(&self) -> String {
        self.1.string()
    }
}

#[cfg(feature = "ariadne")]
impl ParseError {
    /// Convert this error into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let label_msg = match &self.1 {
            ParseErrorKind::UnknownCommand(_) => "unknown command".into(),
            ParseErrorKind::MissingArgument(_) => "expected an argument here".into(),
            ParseErrorKind::DuplicateScript(_) => "duplicate".into(),
            ParseErrorKind::ScriptNotAllowed(_) => "not allowed here".into(),
            ParseErrorKind::UnbalancedBraces => "unbalanced".into(),
            ParseErrorKind::UnbalancedBrackets => "expected \"]\" to close this".into(),
            ParseErrorKind::UnexpectedCharacter(_) => "unexpected character".into(),
            ParseErrorKind::NestingTooDeep => "limit exceeded".into(),
            ParseErrorKind::EmptyInput => "empty".into(),
            ParseErrorKind::InvalidLimits => "no large operator before this".into(),
            ParseErrorKind::MissingDelimiter(modifier) => {
                format!("expected a delimiter after \"{}\"", <&str>::from(*modifier))
            }
            ParseErrorKind::InvalidDelimiter(_) => "invalid delimiter".into(),
            ParseErrorKind::MissingRight => r"expected \right to close this".into(),
            ParseErrorKind::MissingLeft => r"no \left for this".into(),
            ParseErrorKind::UnknownEnvironment(_) => "unknown environment".into(),
            ParseErrorKind::MismatchedEnvironment { expected, .. } => {
                format!("expected \"\\end{{{}}}\" here", expected.as_str())
            }
            ParseErrorKind::MissingEnd(env) => {
                format!("expected \"\\end{{{}}}\" to close this", env.as_str())
            }
            ParseErrorKind::MissingBegin(_) => r"no \begin for this".into(),
            ParseErrorKind::MisplacedSeparator(_) => "outside of a table".into(),
        };

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Error, (source_name, self.0.start..self.0.start))
            .with_config(config)
            .with_message(self.1.string())
            .with_label(Label::new((source_name, self.0.clone())).with_message(label_msg))
            .finish()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.start, self.1.string())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn display() {
        let err = ParseError(3..7, ParseErrorKind::UnknownCommand("foo".into()));
        assert_snapshot!(err.to_string(), @r#"3: Unknown command "\foo"."#);

        let err = ParseError(
            0..5,
            ParseErrorKind::MismatchedEnvironment {
                expected: Env::PMatrix,
                got: Env::BMatrix,
            },
        );
        assert_snapshot!(err.error_message(), @r#"Expected "\end{pmatrix}", but got "\end{bmatrix}"."#);

        let err = ParseError(1..2, ParseErrorKind::DuplicateScript(Script::Superscript));
        assert_snapshot!(err.to_string(), @r#"1: Duplicate "^" on the same atom."#);
    }

    #[cfg(feature = "ariadne")]
    #[test]
    fn report_renders() {
        let source = r"x + \foo";
        let err = ParseError(4..8, ParseErrorKind::UnknownCommand("foo".into()));
        let report = err.to_report("<input>", false);
        let mut buf = Vec::new();
        report
            .write(("<input>", ariadne::Source::from(source)), &mut buf)
            .expect("failed to write report");
        let output = String::from_utf8(buf).expect("report should be valid UTF-8");
        assert!(output.contains(r#"Unknown command "\foo"."#));
        assert!(output.contains("unknown command"));
    }
}
