use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use crate::error::ParseError;
use crate::token::Span;

/// The kind of an [`Atom`].
///
/// Kinds that carry data (`LargeOperator`, `Fraction`) store properties which are fixed by the
/// command that created the atom, or, for `limits`, by a following `\limits`/`\nolimits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AtomKind {
    /// Letters, digits and most symbols, e.g. `x`, `7`, `\alpha`, `\infty`.
    Ordinary,
    /// Big operators such as `\sum` or `\int`, and named operators such as `\sin`.
    /// If `limits` is `true`, scripts are placed above and below the operator.
    LargeOperator { limits: bool },
    /// E.g. `+`, `\times`.
    BinaryOperator,
    /// E.g. `=`, `\leq`, `\rightarrow`.
    Relation,
    /// Opening fences, e.g. `(`, `\langle`.
    Open,
    /// Closing fences, e.g. `)`, `!`.
    Close,
    /// E.g. `,` and `;`.
    Punctuation,
    /// `\frac` (with a fraction rule) and `\binom` (without).
    Fraction { rule: bool },
    /// `\sqrt`, with an optional index.
    Radical,
    /// Accents such as `\hat` or `\vec`.
    Accent,
    /// `\underline`
    Underline,
    /// `\overline`
    Overline,
    /// Fixed-width spacing, e.g. `\,` or `\quad`.
    Space,
    /// Style switches, e.g. `\displaystyle`.
    Style,
    /// A braced group, or a `\left ... \right` pair.
    Inner,
    /// A table-like environment, e.g. `\begin{pmatrix} ... \end{pmatrix}`.
    Table,
    /// A slot which still has to be filled in, written `\square`.
    Placeholder,
    /// Marks the location of an error while errors are being collected.
    /// Never part of a successfully parsed list.
    Error,
}

impl AtomKind {
    /// Returns whether atoms of this kind may carry a superscript or subscript.
    #[inline]
    pub const fn accepts_scripts(self) -> bool {
        !matches!(self, AtomKind::Space | AtomKind::Style)
    }

    /// Returns the minimum and maximum number of arguments for atoms of this kind.
    pub const fn argument_range(self) -> (usize, usize) {
        match self {
            AtomKind::Fraction { .. } => (2, 2),
            AtomKind::Radical => (1, 2),
            AtomKind::Accent | AtomKind::Underline | AtomKind::Overline | AtomKind::Inner => (1, 1),
            AtomKind::Ordinary
            | AtomKind::LargeOperator { .. }
            | AtomKind::BinaryOperator
            | AtomKind::Relation
            | AtomKind::Open
            | AtomKind::Close
            | AtomKind::Punctuation
            | AtomKind::Space
            | AtomKind::Style
            | AtomKind::Table
            | AtomKind::Placeholder
            | AtomKind::Error => (0, 0),
        }
    }

    /// The kind used as a key in the reverse command map.
    ///
    /// Large operators are looked up independently of their `limits` flag, because the flag
    /// may have been changed by `\limits` or `\nolimits`.
    #[inline]
    pub(crate) const fn lookup_key(self) -> AtomKind {
        match self {
            AtomKind::LargeOperator { .. } => AtomKind::LargeOperator { limits: false },
            other => other,
        }
    }
}

/// Superscript or subscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Script {
    #[strum(serialize = "^")]
    Superscript,
    #[strum(serialize = "_")]
    Subscript,
}

/// The delimiters of a `\left ... \right` group.
///
/// An empty string stands for the invisible delimiter `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Boundaries {
    pub left: String,
    pub right: String,
}

/// A node of the expression tree.
///
/// Which of the optional fields are used depends on [`AtomKind`]: `arguments` holds the
/// operands of structural kinds (see [`AtomKind::argument_range`]), `boundaries` is only set
/// on `Inner` atoms created by `\left ... \right`, and `rows` is only used by `Table` atoms.
///
/// Two atoms compare equal if they are structurally equal; the source span is ignored.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Atom {
    pub kind: AtomKind,
    pub nucleus: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub arguments: Vec<MathList>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub superscript: Option<MathList>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub subscript: Option<MathList>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub boundaries: Option<Boundaries>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub rows: Vec<Vec<MathList>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

impl Atom {
    /// Create an atom without arguments, scripts or span.
    pub fn new(kind: AtomKind, nucleus: impl Into<String>) -> Self {
        Atom {
            kind,
            nucleus: nucleus.into(),
            arguments: Vec::new(),
            superscript: None,
            subscript: None,
            boundaries: None,
            rows: Vec::new(),
            span: Span::default(),
        }
    }

    #[inline]
    pub(crate) fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the script of the given type, if present.
    #[inline]
    pub fn script(&self, script: Script) -> Option<&MathList> {
        match script {
            Script::Superscript => self.superscript.as_ref(),
            Script::Subscript => self.subscript.as_ref(),
        }
    }

    #[inline]
    pub(crate) fn script_mut(&mut self, script: Script) -> &mut Option<MathList> {
        match script {
            Script::Superscript => &mut self.superscript,
            Script::Subscript => &mut self.subscript,
        }
    }

    /// Checks the structural invariants of this atom and everything below it:
    /// the number of arguments fits the kind, scripts only appear on kinds which accept them,
    /// and no `Error` atom is present.
    pub fn is_complete(&self) -> bool {
        let (min, max) = self.kind.argument_range();
        if self.arguments.len() < min || self.arguments.len() > max {
            return false;
        }
        if matches!(self.kind, AtomKind::Error) {
            return false;
        }
        let has_script = self.superscript.is_some() || self.subscript.is_some();
        if has_script && !self.kind.accepts_scripts() {
            return false;
        }
        self.arguments.iter().all(MathList::is_complete)
            && self.superscript.as_ref().is_none_or(MathList::is_complete)
            && self.subscript.as_ref().is_none_or(MathList::is_complete)
            && self.rows.iter().flatten().all(MathList::is_complete)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.nucleus == other.nucleus
            && self.arguments == other.arguments
            && self.superscript == other.superscript
            && self.subscript == other.subscript
            && self.boundaries == other.boundaries
            && self.rows == other.rows
    }
}

impl Eq for Atom {}

/// An ordered row of atoms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MathList {
    atoms: Vec<Atom>,
}

impl MathList {
    #[inline]
    pub const fn new() -> Self {
        MathList { atoms: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    #[inline]
    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    #[inline]
    pub fn into_atoms(self) -> Vec<Atom> {
        self.atoms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }

    #[inline]
    pub(crate) fn last_mut(&mut self) -> Option<&mut Atom> {
        self.atoms.last_mut()
    }

    /// Returns `true` if every atom in the list satisfies [`Atom::is_complete`].
    pub fn is_complete(&self) -> bool {
        self.atoms.iter().all(Atom::is_complete)
    }
}

impl From<Vec<Atom>> for MathList {
    #[inline]
    fn from(atoms: Vec<Atom>) -> Self {
        MathList { atoms }
    }
}

impl FromIterator<Atom> for MathList {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        MathList {
            atoms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MathList {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

impl IntoIterator for MathList {
    type Item = Atom;
    type IntoIter = std::vec::IntoIter<Atom>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.atoms.into_iter()
    }
}

/// Writes the canonical LaTeX form of the list.
impl fmt::Display for MathList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::serializer::math_list_to_string(self))
    }
}

/// Parses with the default configuration and reports the first error.
impl FromStr for MathList {
    type Err = Box<ParseError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::build_from_str(s)
    }
}
