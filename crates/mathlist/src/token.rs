use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::environments::Env;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'source> {
    /// End of input.
    Eoi,
    /// A literal character, e.g. `x`, `+` or `(`.
    Char(char),
    /// A command name without the leading backslash, e.g. `alpha` for `\alpha`
    /// or `,` for `\,`.
    Command(&'source str),
    /// The beginning of an environment, e.g. `\begin{matrix}`.
    Begin(Env),
    /// The end of an environment, e.g. `\end{matrix}`.
    End(Env),
    /// A new column in a table, i.e. `&`.
    NewColumn,
    /// The character `[`. It has its own token because it opens the optional argument of
    /// `\sqrt`.
    SquareBracketOpen,
    /// The character `]`.
    SquareBracketClose,
    /// The character `{`.
    GroupBegin,
    /// The character `}`.
    GroupEnd,
    /// The character `^` for superscripts.
    Circumflex,
    /// The character `_` for subscripts.
    Underscore,
    /// One or more whitespace characters.
    Whitespace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    #[inline]
    pub const fn zero_width(at: usize) -> Self {
        Span { start: at, end: at }
    }

    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns the smallest span covering both `self` and `other`.
    #[inline]
    pub const fn to(self, other: Span) -> Self {
        Span {
            start: if self.start < other.start {
                self.start
            } else {
                other.start
            },
            end: if self.end > other.end {
                self.end
            } else {
                other.end
            },
        }
    }
}

impl From<Span> for Range<usize> {
    #[inline]
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// A token together with its span in the input string.
#[derive(Debug, Clone, Copy)]
pub struct TokSpan<'source>(Token<'source>, Span);

impl<'source> TokSpan<'source> {
    #[inline]
    pub const fn new(token: Token<'source>, span: Span) -> Self {
        TokSpan(token, span)
    }

    #[inline]
    pub fn token(&self) -> &Token<'source> {
        &self.0
    }

    #[inline]
    pub fn into_parts(self) -> (Token<'source>, Span) {
        (self.0, self.1)
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.1
    }
}
