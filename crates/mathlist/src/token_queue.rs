use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Span, TokSpan, Token};

/// A token queue that allows peeking at the next non-whitespace token.
///
/// Lexer errors are handed to the caller of [`TokenQueue::ensure_peek`]. The lexer has already
/// consumed the offending input at that point, so calling `ensure_peek` again makes progress.
pub(crate) struct TokenQueue<'source> {
    lexer: Lexer<'source>,
    peeked: Option<TokSpan<'source>>,
}

impl<'source> TokenQueue<'source> {
    pub(crate) fn new(lexer: Lexer<'source>) -> Self {
        TokenQueue {
            lexer,
            peeked: None,
        }
    }

    /// Load the next non-whitespace token into the peek slot, if it is empty.
    pub(crate) fn ensure_peek(&mut self) -> Result<(), Box<ParseError>> {
        while self.peeked.is_none() {
            let tok = self.lexer.next_token()?;
            if !matches!(tok.token(), Token::Whitespace) {
                self.peeked = Some(tok);
            }
        }
        Ok(())
    }

    #[inline]
    fn eoi(&self) -> TokSpan<'source> {
        TokSpan::new(Token::Eoi, Span::zero_width(self.lexer.input_length()))
    }

    /// Peek at the next non-whitespace token without consuming it.
    ///
    /// Must be preceded by a successful call to [`TokenQueue::ensure_peek`].
    #[inline]
    pub(crate) fn peek(&self) -> TokSpan<'source> {
        debug_assert!(self.peeked.is_some(), "peek called without ensure");
        self.peeked.unwrap_or_else(|| self.eoi())
    }

    /// Consume the token returned by the last `peek`.
    #[inline]
    pub(crate) fn next(&mut self) -> TokSpan<'source> {
        debug_assert!(self.peeked.is_some(), "next called without ensure");
        self.peeked.take().unwrap_or_else(|| self.eoi())
    }
}
