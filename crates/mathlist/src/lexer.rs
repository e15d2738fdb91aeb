use std::mem;
use std::str::CharIndices;

use crate::environments::Env;
use crate::error::{ParseError, ParseErrorKind};
use crate::token::{Span, TokSpan, Token};

/// Lexer
pub(crate) struct Lexer<'source> {
    input: CharIndices<'source>,
    peek: (usize, Option<char>),
    input_string: &'source str,
    input_length: usize,
}

impl<'source> Lexer<'source> {
    /// Receive the input source code and generate a LEXER instance.
    pub(crate) fn new(input: &'source str) -> Self {
        let mut lexer = Lexer {
            input: input.char_indices(),
            peek: (0, None),
            input_string: input,
            input_length: input.len(),
        };
        lexer.read_char(); // Initialize `peek`.
        lexer
    }

    #[inline]
    pub(crate) fn input_length(&self) -> usize {
        self.input_length
    }

    /// One character progresses.
    fn read_char(&mut self) -> (usize, Option<char>) {
        mem::replace(
            &mut self.peek,
            self.input
                .next()
                .map(|(idx, ch)| (idx, Some(ch)))
                .unwrap_or((self.input_length, None)),
        )
    }

    /// Skip whitespace characters.
    ///
    /// Returns the span of the skipped whitespace, or `None` if there was nothing to skip.
    fn skip_whitespace(&mut self) -> Option<Span> {
        let start = self.peek.0;
        while self.peek.1.is_some_and(|ch| ch.is_ascii_whitespace()) {
            self.read_char();
        }
        (start != self.peek.0).then(|| Span::new(start, self.peek.0))
    }

    /// Read one command name.
    ///
    /// A command name is either a run of ASCII letters or a single other character.
    /// Returns `None` if the input ended right after the backslash.
    #[inline]
    fn read_command(&mut self) -> Option<(&'source str, usize)> {
        let start = self.peek.0;

        // Read in all ASCII alphabetic characters.
        while self.peek.1.is_some_and(|ch| ch.is_ascii_alphabetic()) {
            self.read_char();
        }

        if start == self.peek.0 {
            // Always read at least one character.
            self.read_char().1?;
        }

        // To get the end of the command, we take the index of the next character.
        let end = self.peek.0;
        Some((&self.input_string[start..end], end))
    }

    /// Read an environment name of the form `{name}`.
    ///
    /// On success, returns the name and the index of the character after the `}`.
    fn read_env_name(&mut self, command: &str) -> Result<(&'source str, usize), ParseError> {
        let (loc, first) = self.read_char();
        match first {
            Some('{') => {}
            Some(ch) => {
                return Err(ParseError(
                    loc..(loc + ch.len_utf8()),
                    ParseErrorKind::MissingArgument(command.into()),
                ));
            }
            None => {
                return Err(ParseError(
                    loc..loc,
                    ParseErrorKind::MissingArgument(command.into()),
                ));
            }
        }
        let start = self.peek.0;
        while self.peek.1.is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '*') {
            self.read_char();
        }

        let (loc, closing) = self.read_char();
        match closing {
            Some('}') => Ok((&self.input_string[start..loc], loc + 1)),
            Some(ch) => {
                // Consume the rest of the group so that lexing can resume after it.
                while self.peek.1.is_some_and(|ch| ch != '}') {
                    self.read_char();
                }
                self.read_char();
                Err(ParseError(
                    loc..(loc + ch.len_utf8()),
                    ParseErrorKind::UnexpectedCharacter(ch),
                ))
            }
            None => Err(ParseError(loc..loc, ParseErrorKind::UnbalancedBraces)),
        }
    }

    /// Skip a comment up to and including the end of the line. The `%` has been consumed.
    fn skip_comment(&mut self) {
        while self.peek.1.is_some_and(|ch| ch != '\n') {
            self.read_char();
        }
        self.read_char(); // Consume the newline character.
    }

    pub(crate) fn next_token(&mut self) -> Result<TokSpan<'source>, Box<ParseError>> {
        let (loc, ch) = loop {
            if let Some(span) = self.skip_whitespace() {
                return Ok(TokSpan::new(Token::Whitespace, span));
            }
            match self.read_char() {
                (_, Some('%')) => self.skip_comment(),
                next => break next,
            }
        };
        let Some(ch) = ch else {
            return Ok(TokSpan::new(Token::Eoi, Span::zero_width(loc)));
        };
        let span = Span::new(loc, loc + ch.len_utf8());
        let tok = match ch {
            '&' => Token::NewColumn,
            '[' => Token::SquareBracketOpen,
            ']' => Token::SquareBracketClose,
            '{' => Token::GroupBegin,
            '}' => Token::GroupEnd,
            '^' => Token::Circumflex,
            '_' => Token::Underscore,
            '#' | '$' | '~' => {
                return Err(Box::new(ParseError(
                    span.into(),
                    ParseErrorKind::UnexpectedCharacter(ch),
                )));
            }
            c if c.is_control() => {
                return Err(Box::new(ParseError(
                    span.into(),
                    ParseErrorKind::UnexpectedCharacter(c),
                )));
            }
            '\\' => {
                let Some((name, end)) = self.read_command() else {
                    return Err(Box::new(ParseError(
                        span.into(),
                        ParseErrorKind::UnexpectedCharacter('\\'),
                    )));
                };
                let span = Span::new(loc, end);
                // Whitespace after a command is insignificant.
                self.skip_whitespace();
                return self.command_token(name, span);
            }
            c => Token::Char(c),
        };
        Ok(TokSpan::new(tok, span))
    }

    fn command_token(
        &mut self,
        name: &'source str,
        span: Span,
    ) -> Result<TokSpan<'source>, Box<ParseError>> {
        let is_begin = match name {
            "begin" => true,
            "end" => false,
            _ => return Ok(TokSpan::new(Token::Command(name), span)),
        };
        let group_loc = self.peek.0;
        let (env_name, end) = self
            .read_env_name(if is_begin { r"\begin" } else { r"\end" })
            .map_err(Box::new)?;
        let Some(env) = Env::from_str(env_name) else {
            return Err(Box::new(ParseError(
                group_loc..end,
                ParseErrorKind::UnknownEnvironment(env_name.into()),
            )));
        };
        let span = Span::new(span.start(), end);
        Ok(TokSpan::new(
            if is_begin {
                Token::Begin(env)
            } else {
                Token::End(env)
            },
            span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use insta::assert_snapshot;

    use super::*;

    fn lex(input: &str) -> String {
        let mut lexer = Lexer::new(input);
        let mut tokens = String::new();
        loop {
            match lexer.next_token() {
                Ok(tokloc) => {
                    if matches!(tokloc.token(), Token::Eoi) {
                        break;
                    }
                    let (tok, span) = tokloc.into_parts();
                    writeln!(tokens, "{}:{}: {:?}", span.start(), span.end(), tok).unwrap();
                }
                Err(err) => {
                    writeln!(tokens, "Error at {}..{}: {:?}", err.0.start, err.0.end, err.1)
                        .unwrap();
                }
            }
        }
        tokens
    }

    #[test]
    fn simple_expression() {
        assert_snapshot!(lex("x+2"), @r"
        0:1: Char('x')
        1:2: Char('+')
        2:3: Char('2')
        ");
    }

    #[test]
    fn commands() {
        assert_snapshot!(lex(r"\alpha\beta \, x"), @r#"
        0:6: Command("alpha")
        6:11: Command("beta")
        12:14: Command(",")
        15:16: Char('x')
        "#);
    }

    #[test]
    fn scripts_and_groups() {
        assert_snapshot!(lex(r"x^{2}_i"), @r"
        0:1: Char('x')
        1:2: Circumflex
        2:3: GroupBegin
        3:4: Char('2')
        4:5: GroupEnd
        5:6: Underscore
        6:7: Char('i')
        ");
    }

    #[test]
    fn comment() {
        assert_snapshot!(lex("ab%hello\ncd"), @r"
        0:1: Char('a')
        1:2: Char('b')
        9:10: Char('c')
        10:11: Char('d')
        ");
    }

    #[test]
    fn many_comment_lines() {
        let input = "%\n".repeat(300_000) + "x";
        let mut lexer = Lexer::new(&input);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.token(), &Token::Char('x'));
        assert_eq!(tok.span().start(), input.len() - 1);
        assert_snapshot!(lex("%a\n%b\n  %c\nx"), @r"
        6:8: Whitespace
        11:12: Char('x')
        ");
    }

    #[test]
    fn environments() {
        assert_snapshot!(lex(r"\begin{pmatrix}a&b\\c\end {pmatrix}"), @r#"
        0:15: Begin(PMatrix)
        15:16: Char('a')
        16:17: NewColumn
        17:18: Char('b')
        18:20: Command("\\")
        20:21: Char('c')
        21:35: End(PMatrix)
        "#);
    }

    #[test]
    fn errors() {
        assert_snapshot!(lex(r"a#b\begin{foo}c"), @r#"
        0:1: Char('a')
        Error at 1..2: UnexpectedCharacter('#')
        2:3: Char('b')
        Error at 9..14: UnknownEnvironment("foo")
        14:15: Char('c')
        "#);
        assert_snapshot!(lex("x\\"), @r"
        0:1: Char('x')
        Error at 1..2: UnexpectedCharacter('\\')
        ");
        assert_snapshot!(lex(r"\begin x"), @r#"
        Error at 7..8: MissingArgument("\\begin")
        "#);
    }
}
