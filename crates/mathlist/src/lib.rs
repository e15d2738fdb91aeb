//! Parse LaTeX math into a tree of atoms, and write such a tree back as LaTeX.
//!
//! The tree is a [`MathList`], an ordered row of [`Atom`]s. Atoms carry a kind, a nucleus and,
//! depending on the kind, arguments, scripts, delimiters or table rows. The tree is meant to be
//! consumed by a typesetting engine; this crate does not do any layout itself.
//!
//! # Usage
//!
//! ```rust
//! use mathlist::{AtomKind, build_from_str, math_list_to_string};
//!
//! let list = build_from_str(r"x^2 + \frac{a}{b}").unwrap();
//! assert_eq!(list.len(), 3);
//! assert_eq!(list.atoms()[1].kind, AtomKind::BinaryOperator);
//! assert_eq!(math_list_to_string(&list), r"x^{2}+\frac{a}{b}");
//! ```
//!
//! [`build_from_str`] returns the first error in source order. To get all errors, use
//! [`MathListBuilder`]:
//!
//! ```rust
//! use mathlist::MathListBuilder;
//!
//! let errors = MathListBuilder::new(r"\foo + x^2^3").build().unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```
//!
//! # Features
//!
//! - `serde`: The tree and [`ParserConfig`] implement serde's `Serialize` and `Deserialize`.
//! - `ariadne`: Adds [`ParseError::to_report`] for pretty error reports.
//!
mod atom;
mod commands;
mod environments;
mod error;
mod lexer;
mod parser;
mod serializer;
mod token;
mod token_queue;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::atom::{Atom, AtomKind, Boundaries, MathList, Script};
pub use self::commands::{AtomTemplate, Command, lookup, supported_commands};
pub use self::environments::Env;
pub use self::error::{DelimiterModifier, ParseError, ParseErrorKind, Separator};
pub use self::serializer::math_list_to_string;
pub use self::token::Span;
use self::parser::Parser;

/// Configuration of the parser.
///
/// # Example usage
///
/// ```rust
/// use mathlist::ParserConfig;
///
/// let config = ParserConfig {
///     max_nesting_depth: 32,
///     ..Default::default()
/// };
/// assert!(config.allow_empty_input);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ParserConfig {
    /// The maximum nesting depth of groups, arguments and scripts. Deeper input fails with
    /// [`ParseErrorKind::NestingTooDeep`].
    pub max_nesting_depth: usize,
    /// If `false`, input without any atoms fails with [`ParseErrorKind::EmptyInput`].
    pub allow_empty_input: bool,
    /// If `true`, missing arguments are filled with placeholder atoms instead of failing with
    /// [`ParseErrorKind::MissingArgument`]. Useful for input which is still being edited.
    pub placeholders_for_missing_arguments: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_nesting_depth: 128,
            allow_empty_input: true,
            placeholders_for_missing_arguments: false,
        }
    }
}

/// Builds a [`MathList`] from one input string, collecting all errors.
///
/// A builder is used for exactly one input: [`MathListBuilder::build`] consumes it.
#[derive(Debug, Clone)]
pub struct MathListBuilder<'source> {
    input: &'source str,
    config: ParserConfig,
}

impl<'source> MathListBuilder<'source> {
    /// Create a builder with the default configuration.
    #[inline]
    pub fn new(input: &'source str) -> Self {
        Self::with_config(input, &ParserConfig::default())
    }

    pub fn with_config(input: &'source str, config: &ParserConfig) -> Self {
        MathListBuilder {
            input,
            config: config.clone(),
        }
    }

    /// Parse the input.
    ///
    /// On failure, returns every error that was found, sorted by source offset. The list is
    /// never empty.
    pub fn build(self) -> Result<MathList, Vec<ParseError>> {
        Parser::new(self.input, self.config).parse_all()
    }
}

/// Parse `input` with the default configuration, returning the first error.
#[inline]
pub fn build_from_str(input: &str) -> Result<MathList, Box<ParseError>> {
    build_from_str_with_config(input, &ParserConfig::default())
}

/// Parse `input`, returning the first error in source order.
///
/// This is the error at the lowest offset, which is also the first error returned by
/// [`MathListBuilder::build`]. It is not necessarily the first one the parser runs into: an
/// unclosed `{` is only noticed at the end of the input.
pub fn build_from_str_with_config(
    input: &str,
    config: &ParserConfig,
) -> Result<MathList, Box<ParseError>> {
    let first = match Parser::new(input, config.clone()).parse_first_error() {
        Ok(list) => return Ok(list),
        Err(err) => err,
    };
    // Only failing input is parsed a second time, collecting everything to find the lowest offset.
    match Parser::new(input, config.clone()).parse_all() {
        Err(errors) => Err(errors.into_iter().next().map_or(first, Box::new)),
        Ok(_) => Err(first),
    }
}
