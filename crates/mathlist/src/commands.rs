//! The command table.
//!
//! All tables are static (`phf`) or derived from the static tables once on first use, and are
//! never mutated afterwards.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::atom::{Atom, AtomKind};
use crate::token::Token;

/// The template from which an atom is instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomTemplate {
    pub kind: AtomKind,
    pub nucleus: &'static str,
    /// The number of required arguments.
    pub arguments: u8,
    /// Whether the command accepts an optional argument in square brackets before its
    /// required arguments (only `\sqrt`).
    pub optional_argument: bool,
}

impl AtomTemplate {
    #[inline]
    pub const fn symbol(kind: AtomKind, nucleus: &'static str) -> Self {
        AtomTemplate {
            kind,
            nucleus,
            arguments: 0,
            optional_argument: false,
        }
    }

    /// Create an atom from this template, without arguments.
    #[inline]
    pub fn instantiate(&self) -> Atom {
        Atom::new(self.kind, self.nucleus)
    }
}

/// An entry of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// A command which produces an atom.
    Atom(AtomTemplate),
    /// `\limits` (`true`) and `\nolimits` (`false`).
    Limits(bool),
    /// `\left`
    Left,
    /// `\right`
    Right,
    /// `\\`, the row separator in tables.
    NewRow,
}

const fn ord(nucleus: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::Ordinary, nucleus))
}

const fn bin(nucleus: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::BinaryOperator, nucleus))
}

const fn rel(nucleus: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::Relation, nucleus))
}

const fn open(nucleus: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::Open, nucleus))
}

const fn close(nucleus: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::Close, nucleus))
}

const fn op(nucleus: &'static str, limits: bool) -> Command {
    Command::Atom(AtomTemplate::symbol(
        AtomKind::LargeOperator { limits },
        nucleus,
    ))
}

const fn space(width_mu: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::Space, width_mu))
}

const fn style(name: &'static str) -> Command {
    Command::Atom(AtomTemplate::symbol(AtomKind::Style, name))
}

const fn structure(kind: AtomKind, nucleus: &'static str, arguments: u8) -> Command {
    Command::Atom(AtomTemplate {
        kind,
        nucleus,
        arguments,
        optional_argument: false,
    })
}

const fn accent(combining: &'static str) -> Command {
    structure(AtomKind::Accent, combining, 1)
}

/// Canonical command names. No two entries of kind `Command::Atom` may share the same kind and
/// nucleus, so that the reverse lookup is unambiguous. Alternative spellings go into `ALIASES`.
static COMMANDS: phf::Map<&'static str, Command> = phf::phf_map! {
    // Lower-case Greek letters.
    "alpha" => ord("α"),
    "beta" => ord("β"),
    "gamma" => ord("γ"),
    "delta" => ord("δ"),
    "epsilon" => ord("ϵ"),
    "varepsilon" => ord("ε"),
    "zeta" => ord("ζ"),
    "eta" => ord("η"),
    "theta" => ord("θ"),
    "vartheta" => ord("ϑ"),
    "iota" => ord("ι"),
    "kappa" => ord("κ"),
    "lambda" => ord("λ"),
    "mu" => ord("μ"),
    "nu" => ord("ν"),
    "xi" => ord("ξ"),
    "omicron" => ord("ο"),
    "pi" => ord("π"),
    "varpi" => ord("ϖ"),
    "rho" => ord("ρ"),
    "varrho" => ord("ϱ"),
    "sigma" => ord("σ"),
    "varsigma" => ord("ς"),
    "tau" => ord("τ"),
    "upsilon" => ord("υ"),
    "phi" => ord("ϕ"),
    "varphi" => ord("φ"),
    "chi" => ord("χ"),
    "psi" => ord("ψ"),
    "omega" => ord("ω"),
    // Upper-case Greek letters.
    "Gamma" => ord("Γ"),
    "Delta" => ord("Δ"),
    "Theta" => ord("Θ"),
    "Lambda" => ord("Λ"),
    "Xi" => ord("Ξ"),
    "Pi" => ord("Π"),
    "Sigma" => ord("Σ"),
    "Upsilon" => ord("Υ"),
    "Phi" => ord("Φ"),
    "Psi" => ord("Ψ"),
    "Omega" => ord("Ω"),
    // Miscellaneous symbols.
    "infty" => ord("∞"),
    "partial" => ord("∂"),
    "nabla" => ord("∇"),
    "forall" => ord("∀"),
    "exists" => ord("∃"),
    "nexists" => ord("∄"),
    "emptyset" => ord("∅"),
    "hbar" => ord("ℏ"),
    "ell" => ord("ℓ"),
    "Re" => ord("ℜ"),
    "Im" => ord("ℑ"),
    "wp" => ord("℘"),
    "aleph" => ord("ℵ"),
    "angle" => ord("∠"),
    "prime" => ord("′"),
    "degree" => ord("°"),
    "ldots" => ord("…"),
    "cdots" => ord("⋯"),
    "vdots" => ord("⋮"),
    "ddots" => ord("⋱"),
    "neg" => ord("¬"),
    "top" => ord("⊤"),
    "bot" => ord("⊥"),
    "triangle" => ord("△"),
    "clubsuit" => ord("♣"),
    "diamondsuit" => ord("♢"),
    "heartsuit" => ord("♡"),
    "spadesuit" => ord("♠"),
    "backslash" => ord("\\"),
    "vert" => ord("|"),
    "|" => ord("‖"),
    "%" => ord("%"),
    "$" => ord("$"),
    "#" => ord("#"),
    "&" => ord("&"),
    "_" => ord("_"),
    // Binary operators.
    "times" => bin("×"),
    "div" => bin("÷"),
    "pm" => bin("±"),
    "mp" => bin("∓"),
    "cdot" => bin("⋅"),
    "ast" => bin("∗"),
    "star" => bin("⋆"),
    "circ" => bin("∘"),
    "bullet" => bin("∙"),
    "cap" => bin("∩"),
    "cup" => bin("∪"),
    "wedge" => bin("∧"),
    "vee" => bin("∨"),
    "setminus" => bin("∖"),
    "oplus" => bin("⊕"),
    "ominus" => bin("⊖"),
    "otimes" => bin("⊗"),
    "oslash" => bin("⊘"),
    "odot" => bin("⊙"),
    "dagger" => bin("†"),
    "ddagger" => bin("‡"),
    "amalg" => bin("⨿"),
    "wr" => bin("≀"),
    "diamond" => bin("⋄"),
    // Relations.
    "leq" => rel("≤"),
    "geq" => rel("≥"),
    "neq" => rel("≠"),
    "approx" => rel("≈"),
    "equiv" => rel("≡"),
    "sim" => rel("∼"),
    "simeq" => rel("≃"),
    "cong" => rel("≅"),
    "propto" => rel("∝"),
    "in" => rel("∈"),
    "notin" => rel("∉"),
    "ni" => rel("∋"),
    "subset" => rel("⊂"),
    "supset" => rel("⊃"),
    "subseteq" => rel("⊆"),
    "supseteq" => rel("⊇"),
    "ll" => rel("≪"),
    "gg" => rel("≫"),
    "parallel" => rel("∥"),
    "perp" => rel("⟂"),
    "mid" => rel("∣"),
    "prec" => rel("≺"),
    "succ" => rel("≻"),
    "preceq" => rel("⪯"),
    "succeq" => rel("⪰"),
    "doteq" => rel("≐"),
    "models" => rel("⊨"),
    "vdash" => rel("⊢"),
    "dashv" => rel("⊣"),
    "asymp" => rel("≍"),
    "bowtie" => rel("⋈"),
    // Arrows.
    "rightarrow" => rel("→"),
    "leftarrow" => rel("←"),
    "Rightarrow" => rel("⇒"),
    "Leftarrow" => rel("⇐"),
    "leftrightarrow" => rel("↔"),
    "Leftrightarrow" => rel("⇔"),
    "longrightarrow" => rel("⟶"),
    "longleftarrow" => rel("⟵"),
    "Longrightarrow" => rel("⟹"),
    "Longleftarrow" => rel("⟸"),
    "mapsto" => rel("↦"),
    "uparrow" => rel("↑"),
    "downarrow" => rel("↓"),
    // Large operators.
    "sum" => op("∑", true),
    "prod" => op("∏", true),
    "coprod" => op("∐", true),
    "bigcup" => op("⋃", true),
    "bigcap" => op("⋂", true),
    "bigvee" => op("⋁", true),
    "bigwedge" => op("⋀", true),
    "bigoplus" => op("⨁", true),
    "bigotimes" => op("⨂", true),
    "bigodot" => op("⨀", true),
    "biguplus" => op("⨄", true),
    "int" => op("∫", false),
    "iint" => op("∬", false),
    "iiint" => op("∭", false),
    "oint" => op("∮", false),
    // Named operators.
    "lim" => op("lim", true),
    "limsup" => op("lim sup", true),
    "liminf" => op("lim inf", true),
    "max" => op("max", true),
    "min" => op("min", true),
    "sup" => op("sup", true),
    "inf" => op("inf", true),
    "det" => op("det", true),
    "gcd" => op("gcd", true),
    "Pr" => op("Pr", true),
    "sin" => op("sin", false),
    "cos" => op("cos", false),
    "tan" => op("tan", false),
    "cot" => op("cot", false),
    "sec" => op("sec", false),
    "csc" => op("csc", false),
    "arcsin" => op("arcsin", false),
    "arccos" => op("arccos", false),
    "arctan" => op("arctan", false),
    "sinh" => op("sinh", false),
    "cosh" => op("cosh", false),
    "tanh" => op("tanh", false),
    "coth" => op("coth", false),
    "log" => op("log", false),
    "ln" => op("ln", false),
    "lg" => op("lg", false),
    "exp" => op("exp", false),
    "arg" => op("arg", false),
    "deg" => op("deg", false),
    "dim" => op("dim", false),
    "hom" => op("hom", false),
    "ker" => op("ker", false),
    // Fences.
    "{" => open("{"),
    "}" => close("}"),
    "lbrack" => open("["),
    "rbrack" => close("]"),
    "langle" => open("⟨"),
    "rangle" => close("⟩"),
    "lceil" => open("⌈"),
    "rceil" => close("⌉"),
    "lfloor" => open("⌊"),
    "rfloor" => close("⌋"),
    // Structures.
    "frac" => structure(AtomKind::Fraction { rule: true }, "", 2),
    "binom" => structure(AtomKind::Fraction { rule: false }, "()", 2),
    "sqrt" => Command::Atom(AtomTemplate {
        kind: AtomKind::Radical,
        nucleus: "√",
        arguments: 1,
        optional_argument: true,
    }),
    "overline" => structure(AtomKind::Overline, "", 1),
    "underline" => structure(AtomKind::Underline, "", 1),
    // Accents.
    "grave" => accent("\u{0300}"),
    "acute" => accent("\u{0301}"),
    "hat" => accent("\u{0302}"),
    "tilde" => accent("\u{0303}"),
    "bar" => accent("\u{0304}"),
    "breve" => accent("\u{0306}"),
    "dot" => accent("\u{0307}"),
    "ddot" => accent("\u{0308}"),
    "mathring" => accent("\u{030A}"),
    "check" => accent("\u{030C}"),
    "vec" => accent("\u{20D7}"),
    // Spacing, widths in mu.
    "," => space("3"),
    ":" => space("4"),
    ";" => space("5"),
    "!" => space("-3"),
    " " => space("6"),
    "quad" => space("18"),
    "qquad" => space("36"),
    // Styles.
    "displaystyle" => style("display"),
    "textstyle" => style("text"),
    "scriptstyle" => style("script"),
    "scriptscriptstyle" => style("scriptscript"),
    "square" => Command::Atom(AtomTemplate::symbol(AtomKind::Placeholder, "□")),
    // Directives.
    "limits" => Command::Limits(true),
    "nolimits" => Command::Limits(false),
    "left" => Command::Left,
    "right" => Command::Right,
    "\\" => Command::NewRow,
};

/// Alternative names, mapped to their canonical name in `COMMANDS`.
static ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "le" => "leq",
    "ge" => "geq",
    "ne" => "neq",
    "to" => "rightarrow",
    "gets" => "leftarrow",
    "owns" => "ni",
    "land" => "wedge",
    "lor" => "vee",
    "lnot" => "neg",
    "dots" => "ldots",
    "lbrace" => "{",
    "rbrace" => "}",
    "Vert" => "|",
    "thinspace" => ",",
    "medspace" => ":",
    ">" => ":",
    "thickspace" => ";",
    "negthinspace" => "!",
};

/// Delimiters accepted after `\left` and `\right` when written as a command, mapped to the
/// delimiter glyph.
static DELIMITER_COMMANDS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "{" => "{",
    "}" => "}",
    "lbrace" => "{",
    "rbrace" => "}",
    "lbrack" => "[",
    "rbrack" => "]",
    "langle" => "⟨",
    "rangle" => "⟩",
    "lfloor" => "⌊",
    "rfloor" => "⌋",
    "lceil" => "⌈",
    "rceil" => "⌉",
    "|" => "‖",
    "Vert" => "‖",
    "vert" => "|",
    "uparrow" => "↑",
    "downarrow" => "↓",
    "backslash" => "\\",
};

/// Look up a command by name. Aliases resolve to the entry of their canonical name.
pub fn lookup(name: &str) -> Option<Command> {
    COMMANDS
        .get(name)
        .or_else(|| ALIASES.get(name).and_then(|canonical| COMMANDS.get(*canonical)))
        .copied()
}

static SUPPORTED_COMMANDS: LazyLock<FxHashMap<&'static str, Command>> = LazyLock::new(|| {
    let mut map = FxHashMap::with_capacity_and_hasher(
        COMMANDS.len() + ALIASES.len(),
        Default::default(),
    );
    for (name, command) in COMMANDS.entries() {
        map.insert(*name, *command);
    }
    for (alias, canonical) in ALIASES.entries() {
        if let Some(command) = COMMANDS.get(*canonical) {
            map.insert(*alias, *command);
        }
    }
    map
});

/// All supported command names (without the backslash), including aliases.
pub fn supported_commands() -> &'static FxHashMap<&'static str, Command> {
    &SUPPORTED_COMMANDS
}

static REVERSE_COMMANDS: LazyLock<FxHashMap<(AtomKind, &'static str), &'static str>> =
    LazyLock::new(|| {
        let mut map = FxHashMap::default();
        for (name, command) in COMMANDS.entries() {
            if let Command::Atom(template) = command {
                map.insert((template.kind.lookup_key(), template.nucleus), *name);
            }
        }
        map
    });

/// The canonical command name which produces an atom of the given kind and nucleus.
pub(crate) fn command_name(kind: AtomKind, nucleus: &str) -> Option<&'static str> {
    REVERSE_COMMANDS.get(&(kind.lookup_key(), nucleus)).copied()
}

/// Returns the kind of atom a literal character produces, or `None` if the character cannot
/// appear literally.
pub(crate) fn char_kind(ch: char) -> Option<AtomKind> {
    match ch {
        'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '/' | '|' | '@' | '"' | '`' | '\'' => {
            Some(AtomKind::Ordinary)
        }
        '+' | '-' | '*' => Some(AtomKind::BinaryOperator),
        '=' | '<' | '>' | ':' => Some(AtomKind::Relation),
        '(' | '[' => Some(AtomKind::Open),
        ')' | ']' | '!' | '?' => Some(AtomKind::Close),
        ',' | ';' => Some(AtomKind::Punctuation),
        c if !c.is_ascii() && !c.is_control() && !c.is_whitespace() => Some(AtomKind::Ordinary),
        _ => None,
    }
}

/// Create the atom for a literal character.
pub(crate) fn char_atom(ch: char) -> Option<Atom> {
    let kind = char_kind(ch)?;
    Some(match ch {
        '-' => Atom::new(kind, "−"),
        '*' => Atom::new(kind, "∗"),
        '\'' => Atom::new(kind, "′"),
        c => Atom::new(kind, c),
    })
}

/// The ASCII character which produces an atom of the given kind and nucleus, if any.
pub(crate) fn char_for_atom(kind: AtomKind, nucleus: &str) -> Option<char> {
    match (kind, nucleus) {
        (AtomKind::BinaryOperator, "−") => Some('-'),
        (AtomKind::BinaryOperator, "∗") => Some('*'),
        (AtomKind::Ordinary, "′") => Some('\''),
        _ => {
            let mut chars = nucleus.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return None;
            };
            if ch.is_ascii() && !matches!(ch, '-' | '*' | '\'') && char_kind(ch) == Some(kind) {
                Some(ch)
            } else {
                None
            }
        }
    }
}

/// The delimiter glyph for a token following `\left` or `\right`.
///
/// The invisible delimiter `.` is the empty string.
pub(crate) fn delimiter_glyph(token: &Token) -> Option<&'static str> {
    match token {
        Token::Char('(') => Some("("),
        Token::Char(')') => Some(")"),
        Token::SquareBracketOpen => Some("["),
        Token::SquareBracketClose => Some("]"),
        Token::Char('|') => Some("|"),
        Token::Char('/') => Some("/"),
        Token::Char('.') => Some(""),
        Token::Command(name) => DELIMITER_COMMANDS.get(*name).copied(),
        _ => None,
    }
}

/// The canonical source text of a delimiter glyph.
pub(crate) fn delimiter_source(glyph: &str) -> Option<&'static str> {
    match glyph {
        "" => Some("."),
        "(" => Some("("),
        ")" => Some(")"),
        "[" => Some("["),
        "]" => Some("]"),
        "|" => Some("|"),
        "/" => Some("/"),
        "{" => Some(r"\{"),
        "}" => Some(r"\}"),
        "⟨" => Some(r"\langle"),
        "⟩" => Some(r"\rangle"),
        "⌊" => Some(r"\lfloor"),
        "⌋" => Some(r"\rfloor"),
        "⌈" => Some(r"\lceil"),
        "⌉" => Some(r"\rceil"),
        "‖" => Some(r"\|"),
        "↑" => Some(r"\uparrow"),
        "↓" => Some(r"\downarrow"),
        "\\" => Some(r"\backslash"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_lookup_is_unambiguous() {
        let atom_commands = COMMANDS
            .values()
            .filter(|command| matches!(command, Command::Atom(_)))
            .count();
        assert_eq!(REVERSE_COMMANDS.len(), atom_commands);
    }

    #[test]
    fn aliases_point_to_canonical_names() {
        for (alias, canonical) in ALIASES.entries() {
            assert!(
                COMMANDS.contains_key(*canonical),
                "alias {alias} points to unknown {canonical}"
            );
            assert!(
                !COMMANDS.contains_key(*alias),
                "alias {alias} shadows a canonical name"
            );
            assert_eq!(lookup(alias), lookup(canonical));
        }
    }

    #[test]
    fn supported_commands_contains_everything() {
        let commands = supported_commands();
        assert_eq!(commands.len(), COMMANDS.len() + ALIASES.len());
        assert!(matches!(commands.get("frac"), Some(Command::Atom(t)) if t.arguments == 2));
        assert_eq!(commands.get("le"), commands.get("leq"));
        assert!(commands.get("foo").is_none());
    }

    #[test]
    fn command_name_ignores_limits() {
        assert_eq!(
            command_name(AtomKind::LargeOperator { limits: false }, "∑"),
            Some("sum")
        );
        assert_eq!(
            command_name(AtomKind::LargeOperator { limits: true }, "∫"),
            Some("int")
        );
        assert_eq!(command_name(AtomKind::Relation, "≤"), Some("leq"));
        assert_eq!(command_name(AtomKind::Ordinary, "≤"), None);
    }

    #[test]
    fn literal_characters() {
        let minus = char_atom('-').unwrap();
        assert_eq!(minus.kind, AtomKind::BinaryOperator);
        assert_eq!(minus.nucleus, "−");
        assert_eq!(char_for_atom(minus.kind, &minus.nucleus), Some('-'));

        assert_eq!(char_for_atom(AtomKind::Ordinary, "x"), Some('x'));
        assert_eq!(char_for_atom(AtomKind::Relation, "x"), None);
        assert_eq!(char_for_atom(AtomKind::BinaryOperator, "-"), None);
        assert_eq!(char_for_atom(AtomKind::Ordinary, "α"), None);

        assert!(char_atom('#').is_none());
        assert!(char_atom('{').is_none());
        assert_eq!(char_atom('é').map(|atom| atom.kind), Some(AtomKind::Ordinary));
    }

    #[test]
    fn delimiters_round_trip() {
        for (name, glyph) in DELIMITER_COMMANDS.entries() {
            assert!(delimiter_source(glyph).is_some(), "no source for \\{name}");
        }
        for ch in ['(', ')', '|', '/', '.'] {
            let glyph = delimiter_glyph(&Token::Char(ch)).unwrap();
            assert!(delimiter_source(glyph).is_some());
        }
        assert_eq!(delimiter_glyph(&Token::Char('x')), None);
    }
}
