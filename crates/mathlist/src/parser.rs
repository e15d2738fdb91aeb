use std::mem;
use std::ops::Range;

use crate::ParserConfig;
use crate::atom::{Atom, AtomKind, Boundaries, MathList, Script};
use crate::commands::{self, AtomTemplate, Command};
use crate::environments::Env;
use crate::error::{DelimiterModifier, ParseError, ParseErrorKind, Separator};
use crate::lexer::Lexer;
use crate::token::{Span, TokSpan, Token};
use crate::token_queue::TokenQueue;

pub(crate) type ParseResult<T> = Result<T, Box<ParseError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorMode {
    /// The first error aborts the parse.
    FirstError,
    /// Errors are recorded and parsing continues after them.
    Collect,
}

/// A group which has been opened and whose closing token ends the current sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    /// `{ ... }`
    Brace,
    /// `[ ... ]` of an optional argument.
    Bracket,
    /// `\left ... \right`
    Right,
    /// A cell of a table, ended by `&`, `\\` or `\end`.
    Cell,
}

pub(crate) struct Parser<'source> {
    tokens: TokenQueue<'source>,
    input: &'source str,
    config: ParserConfig,
    mode: ErrorMode,
    errors: Vec<ParseError>,
    groups: Vec<Closer>,
    depth: usize,
    /// End of the last consumed token.
    last_end: usize,
}

impl<'source> Parser<'source> {
    pub(crate) fn new(input: &'source str, config: ParserConfig) -> Self {
        Parser {
            tokens: TokenQueue::new(Lexer::new(input)),
            input,
            config,
            mode: ErrorMode::FirstError,
            errors: Vec::new(),
            groups: Vec::new(),
            depth: 0,
            last_end: 0,
        }
    }

    /// Parse the whole input, stopping at the first error.
    pub(crate) fn parse_first_error(mut self) -> ParseResult<MathList> {
        self.mode = ErrorMode::FirstError;
        self.parse_root()
    }

    /// Parse the whole input, collecting every error.
    ///
    /// The errors are sorted by their start offset.
    pub(crate) fn parse_all(mut self) -> Result<MathList, Vec<ParseError>> {
        self.mode = ErrorMode::Collect;
        match self.parse_root() {
            Ok(list) if self.errors.is_empty() => return Ok(list),
            Ok(_) => {}
            Err(err) => self.errors.push(*err),
        }
        self.errors.sort_by_key(|err| err.0.start);
        Err(self.errors)
    }

    fn parse_root(&mut self) -> ParseResult<MathList> {
        log::trace!("parsing {:?}", self.input);
        let list = self.parse_sequence()?;
        if list.is_empty() && !self.config.allow_empty_input {
            self.report(ParseError(0..self.input.len(), ParseErrorKind::EmptyInput))?;
        }
        Ok(list)
    }

    /// The single point through which all errors pass.
    ///
    /// Returns `Err` if parsing has to stop, and `Ok` if the caller should recover.
    fn report(&mut self, err: ParseError) -> ParseResult<()> {
        match self.mode {
            ErrorMode::FirstError => Err(Box::new(err)),
            ErrorMode::Collect => {
                log::debug!("recovering after error at {}: {}", err.0.start, err.error_message());
                self.errors.push(err);
                Ok(())
            }
        }
    }

    /// Peek at the next token. Lexer errors are reported and skipped.
    fn peek(&mut self) -> ParseResult<TokSpan<'source>> {
        while let Err(err) = self.tokens.ensure_peek() {
            self.report(*err)?;
        }
        Ok(self.tokens.peek())
    }

    fn next(&mut self) -> ParseResult<TokSpan<'source>> {
        self.peek()?;
        let tok = self.tokens.next();
        self.last_end = tok.span().end();
        Ok(tok)
    }

    /// Run `parse` one nesting level deeper.
    ///
    /// Exceeding the configured depth always aborts the parse, regardless of the error mode.
    fn nested<T>(
        &mut self,
        at: Span,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= self.config.max_nesting_depth {
            return Err(Box::new(ParseError(
                at.into(),
                ParseErrorKind::NestingTooDeep,
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse `parse` with `closer` pushed onto the group stack.
    fn in_group<T>(
        &mut self,
        closer: Closer,
        at: Span,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.groups.push(closer);
        let result = self.nested(at, parse);
        self.groups.pop();
        result
    }

    /// Returns whether `token` ends the sequence which is currently being parsed.
    fn closes_group(&self, token: &Token) -> bool {
        match token {
            Token::Eoi => true,
            Token::GroupEnd => self.groups.contains(&Closer::Brace),
            Token::SquareBracketClose => self.groups.last() == Some(&Closer::Bracket),
            Token::Command("right") => self.groups.contains(&Closer::Right),
            Token::End(_) => self.groups.contains(&Closer::Cell),
            Token::NewColumn | Token::Command("\\") => self.groups.last() == Some(&Closer::Cell),
            _ => false,
        }
    }

    #[inline]
    fn source(&self, span: Span) -> &'source str {
        self.input.get(Range::from(span)).unwrap_or_default()
    }

    fn parse_sequence(&mut self) -> ParseResult<MathList> {
        let mut list = MathList::new();
        loop {
            let tok = self.peek()?;
            if self.closes_group(tok.token()) {
                break;
            }
            self.next()?;
            self.parse_token(tok, &mut list)?;
        }
        Ok(list)
    }

    /// Turn one already consumed token into atoms, appending them to `list`.
    fn parse_token(&mut self, tok: TokSpan<'source>, list: &mut MathList) -> ParseResult<()> {
        let (token, span) = tok.into_parts();
        match token {
            Token::Char(ch) => match commands::char_atom(ch) {
                Some(atom) => list.push(atom.with_span(span)),
                None => {
                    self.report(ParseError(
                        span.into(),
                        ParseErrorKind::UnexpectedCharacter(ch),
                    ))?;
                    list.push(Atom::new(AtomKind::Error, ch).with_span(span));
                }
            },
            Token::SquareBracketOpen => list.push(Atom::new(AtomKind::Open, "[").with_span(span)),
            Token::SquareBracketClose => {
                list.push(Atom::new(AtomKind::Close, "]").with_span(span));
            }
            Token::GroupBegin => {
                let content = self.parse_group(span)?;
                let mut atom = Atom::new(AtomKind::Inner, "");
                atom.arguments.push(content);
                list.push(atom.with_span(Span::new(span.start(), self.last_end)));
            }
            Token::GroupEnd => {
                self.report(ParseError(span.into(), ParseErrorKind::UnbalancedBraces))?;
            }
            Token::Circumflex => self.parse_script(list, Script::Superscript, span)?,
            Token::Underscore => self.parse_script(list, Script::Subscript, span)?,
            Token::Command(name) => self.parse_command(name, span, list)?,
            Token::Begin(env) => {
                let table = self.parse_table(env, span)?;
                list.push(table);
            }
            Token::End(env) => {
                self.report(ParseError(span.into(), ParseErrorKind::MissingBegin(env)))?;
            }
            Token::NewColumn => {
                self.report(ParseError(
                    span.into(),
                    ParseErrorKind::MisplacedSeparator(Separator::Column),
                ))?;
            }
            Token::Eoi | Token::Whitespace => {}
        }
        Ok(())
    }

    /// Parse the content of a brace group. The `{` has already been consumed.
    fn parse_group(&mut self, open: Span) -> ParseResult<MathList> {
        let content = self.in_group(Closer::Brace, open, Self::parse_sequence)?;
        if matches!(self.peek()?.token(), Token::GroupEnd) {
            self.next()?;
        } else {
            self.report(ParseError(open.into(), ParseErrorKind::UnbalancedBraces))?;
        }
        Ok(content)
    }

    fn parse_command(
        &mut self,
        name: &'source str,
        span: Span,
        list: &mut MathList,
    ) -> ParseResult<()> {
        let Some(command) = commands::lookup(name) else {
            self.report(ParseError(
                span.into(),
                ParseErrorKind::UnknownCommand(name.into()),
            ))?;
            list.push(Atom::new(AtomKind::Error, name).with_span(span));
            return Ok(());
        };
        match command {
            Command::Atom(template) => {
                let atom = self.parse_structure(template, name, span)?;
                list.push(atom);
            }
            Command::Limits(limits) => {
                let target = list
                    .last_mut()
                    .filter(|atom| atom.superscript.is_none() && atom.subscript.is_none());
                if let Some(Atom {
                    kind: AtomKind::LargeOperator { limits: flag },
                    span: target_span,
                    ..
                }) = target
                {
                    *flag = limits;
                    *target_span = target_span.to(span);
                } else {
                    self.report(ParseError(span.into(), ParseErrorKind::InvalidLimits))?;
                }
            }
            Command::Left => {
                let atom = self.parse_left_right(span)?;
                list.push(atom);
            }
            Command::Right => {
                self.report(ParseError(span.into(), ParseErrorKind::MissingLeft))?;
                // Skip the delimiter which belongs to the stray `\right`.
                let tok = self.peek()?;
                if commands::delimiter_glyph(tok.token()).is_some() {
                    self.next()?;
                }
            }
            Command::NewRow => {
                self.report(ParseError(
                    span.into(),
                    ParseErrorKind::MisplacedSeparator(Separator::Row),
                ))?;
            }
        }
        Ok(())
    }

    /// Instantiate `template` and parse its arguments.
    fn parse_structure(
        &mut self,
        template: AtomTemplate,
        name: &str,
        span: Span,
    ) -> ParseResult<Atom> {
        let mut atom = template.instantiate();
        if template.arguments == 0 && !template.optional_argument {
            return Ok(atom.with_span(span));
        }
        let command = format!("\\{name}");
        let mut optional = None;
        if template.optional_argument {
            let tok = self.peek()?;
            if matches!(tok.token(), Token::SquareBracketOpen) {
                self.next()?;
                optional = Some(self.parse_optional_argument(tok.span())?);
            }
        }
        for _ in 0..template.arguments {
            let argument = self.parse_argument(&command)?;
            atom.arguments.push(argument);
        }
        if let Some(optional) = optional {
            atom.arguments.push(optional);
        }
        Ok(atom.with_span(Span::new(span.start(), self.last_end)))
    }

    /// Parse an optional argument. The `[` has already been consumed.
    fn parse_optional_argument(&mut self, open: Span) -> ParseResult<MathList> {
        let content = self.in_group(Closer::Bracket, open, Self::parse_sequence)?;
        if matches!(self.peek()?.token(), Token::SquareBracketClose) {
            self.next()?;
        } else {
            self.report(ParseError(open.into(), ParseErrorKind::UnbalancedBrackets))?;
        }
        Ok(content)
    }

    /// Returns whether `token` can begin a required argument.
    fn starts_argument(&self, token: &Token) -> bool {
        !self.closes_group(token)
            && !matches!(
                token,
                Token::GroupEnd
                    | Token::Circumflex
                    | Token::Underscore
                    | Token::NewColumn
                    | Token::End(_)
                    | Token::Command("right" | "limits" | "nolimits" | "\\")
            )
    }

    /// Parse a required argument: either a brace group or a single token.
    ///
    /// `command` is the command as written, and is used in the error for a missing argument.
    fn parse_argument(&mut self, command: &str) -> ParseResult<MathList> {
        let tok = self.peek()?;
        if matches!(tok.token(), Token::GroupBegin) {
            self.next()?;
            return self.parse_group(tok.span());
        }
        if !self.starts_argument(tok.token()) {
            return self.missing_argument(command, tok.span());
        }
        self.next()?;
        self.nested(tok.span(), |parser| {
            let mut list = MathList::new();
            parser.parse_token(tok, &mut list)?;
            Ok(list)
        })
    }

    fn missing_argument(&mut self, command: &str, at: Span) -> ParseResult<MathList> {
        if self.config.placeholders_for_missing_arguments {
            let placeholder = Atom::new(AtomKind::Placeholder, "□")
                .with_span(Span::zero_width(at.start()));
            return Ok(MathList::from(vec![placeholder]));
        }
        self.report(ParseError(
            at.into(),
            ParseErrorKind::MissingArgument(command.into()),
        ))?;
        Ok(MathList::new())
    }

    /// Parse the argument of a script marker and attach it to the last atom of `list`.
    /// The marker has already been consumed.
    fn parse_script(&mut self, list: &mut MathList, script: Script, marker: Span) -> ParseResult<()> {
        let tok = self.peek()?;
        let following = match tok.token() {
            Token::Circumflex => Some(Script::Superscript),
            Token::Underscore => Some(Script::Subscript),
            _ => None,
        };
        if let Some(following) = following {
            // The following marker is left for the caller.
            let kind = if following == script {
                ParseErrorKind::DuplicateScript(script)
            } else {
                ParseErrorKind::MissingArgument(<&str>::from(script).into())
            };
            return self.report(ParseError(tok.span().into(), kind));
        }

        if list.is_empty() {
            list.push(Atom::new(AtomKind::Ordinary, "").with_span(Span::zero_width(marker.start())));
        }
        let problem = match list.last_mut() {
            Some(atom) if !atom.kind.accepts_scripts() => {
                Some(ParseErrorKind::ScriptNotAllowed(script))
            }
            Some(atom) if atom.script(script).is_some() => {
                Some(ParseErrorKind::DuplicateScript(script))
            }
            _ => None,
        };
        let attach = problem.is_none();
        if let Some(kind) = problem {
            self.report(ParseError(marker.into(), kind))?;
        }

        let argument = self.parse_argument(<&str>::from(script))?;
        if attach && let Some(atom) = list.last_mut() {
            *atom.script_mut(script) = Some(argument);
            atom.span = atom.span.to(Span::new(marker.start(), self.last_end));
        }
        Ok(())
    }

    /// Parse a delimiter following `\left` or `\right`, returning its glyph.
    fn parse_delimiter(&mut self, modifier: DelimiterModifier, at: Span) -> ParseResult<String> {
        let tok = self.peek()?;
        if matches!(tok.token(), Token::Eoi | Token::GroupEnd) {
            self.report(ParseError(
                at.into(),
                ParseErrorKind::MissingDelimiter(modifier),
            ))?;
            return Ok(String::new());
        }
        self.next()?;
        match commands::delimiter_glyph(tok.token()) {
            Some(glyph) => Ok(glyph.to_string()),
            None => {
                let text = self.source(tok.span()).trim_end();
                self.report(ParseError(
                    tok.span().into(),
                    ParseErrorKind::InvalidDelimiter(text.into()),
                ))?;
                Ok(String::new())
            }
        }
    }

    /// Parse `\left<d> ... \right<d>`. The `\left` has already been consumed.
    fn parse_left_right(&mut self, left_span: Span) -> ParseResult<Atom> {
        let left = self.parse_delimiter(DelimiterModifier::Left, left_span)?;
        let content = self.in_group(Closer::Right, left_span, Self::parse_sequence)?;
        let tok = self.peek()?;
        let right = if matches!(tok.token(), Token::Command("right")) {
            self.next()?;
            self.parse_delimiter(DelimiterModifier::Right, tok.span())?
        } else {
            self.report(ParseError(left_span.into(), ParseErrorKind::MissingRight))?;
            String::new()
        };
        let mut atom = Atom::new(AtomKind::Inner, "");
        atom.arguments.push(content);
        atom.boundaries = Some(Boundaries { left, right });
        Ok(atom.with_span(Span::new(left_span.start(), self.last_end)))
    }

    /// Parse the body of an environment. The `\begin{...}` has already been consumed.
    fn parse_table(&mut self, env: Env, begin_span: Span) -> ParseResult<Atom> {
        let mut rows: Vec<Vec<MathList>> = Vec::new();
        let mut row: Vec<MathList> = Vec::new();
        loop {
            let cell = self.in_group(Closer::Cell, begin_span, Self::parse_sequence)?;
            row.push(cell);
            let tok = self.peek()?;
            match tok.token() {
                Token::NewColumn => {
                    self.next()?;
                    if !env.allows_columns() {
                        self.report(ParseError(
                            tok.span().into(),
                            ParseErrorKind::MisplacedSeparator(Separator::Column),
                        ))?;
                    }
                }
                Token::Command("\\") => {
                    self.next()?;
                    rows.push(mem::take(&mut row));
                }
                Token::End(end_env) => {
                    let end_env = *end_env;
                    self.next()?;
                    if end_env != env {
                        self.report(ParseError(
                            tok.span().into(),
                            ParseErrorKind::MismatchedEnvironment {
                                expected: env,
                                got: end_env,
                            },
                        ))?;
                    }
                    break;
                }
                _ => {
                    // End of input, or the closer of an enclosing group.
                    self.report(ParseError(begin_span.into(), ParseErrorKind::MissingEnd(env)))?;
                    break;
                }
            }
        }
        // A trailing `\\` does not start a new row.
        if !matches!(row.as_slice(), [cell] if cell.is_empty()) {
            rows.push(row);
        }
        let mut atom = Atom::new(AtomKind::Table, env.as_str());
        atom.rows = rows;
        Ok(atom.with_span(Span::new(begin_span.start(), self.last_end)))
    }
}
