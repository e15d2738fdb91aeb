//! Conversion of a [`MathList`] back into LaTeX source.
//!
//! The output is canonical: every argument and script is braced, and each symbol is written
//! as its literal character if one exists, otherwise as the canonical command name.

use std::mem;

use crate::atom::{Atom, AtomKind, MathList};
use crate::commands::{self, AtomTemplate, Command};
use crate::environments::Env;

/// Convert a math list to its canonical LaTeX representation.
pub fn math_list_to_string(list: &MathList) -> String {
    let mut writer = Writer::default();
    writer.write_list(list);
    writer.out
}

#[derive(Default)]
struct Writer {
    out: String,
    /// Whether the last thing written was a command name consisting of letters.
    after_word_command: bool,
    /// Whether we are inside the optional argument of `\sqrt`, where `]` needs escaping.
    in_index: bool,
}

impl Writer {
    fn command(&mut self, name: &str) {
        self.out.push('\\');
        self.out.push_str(name);
        self.after_word_command =
            !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic());
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.after_word_command && text.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.after_word_command = false;
    }

    fn char(&mut self, ch: char) {
        self.text(ch.encode_utf8(&mut [0; 4]));
    }

    fn write_list(&mut self, list: &MathList) {
        for atom in list {
            self.write_atom(atom);
        }
    }

    fn braced(&mut self, list: &MathList) {
        self.text("{");
        self.write_list(list);
        self.text("}");
    }

    /// Write the nucleus of an atom.
    fn symbol(&mut self, atom: &Atom) {
        if let Some(ch) = commands::char_for_atom(atom.kind, &atom.nucleus) {
            if ch == ']' && self.in_index {
                self.command("rbrack");
            } else {
                self.char(ch);
            }
        } else if let Some(name) = commands::command_name(atom.kind, &atom.nucleus) {
            self.command(name);
        } else {
            self.text(&atom.nucleus);
        }
    }

    fn delimiter(&mut self, glyph: &str) {
        match commands::delimiter_source(glyph) {
            Some(source) => match source.strip_prefix('\\') {
                Some(name) => self.command(name),
                None => self.text(source),
            },
            None => {
                debug_assert!(false, "invalid delimiter {glyph:?}");
                self.text(".");
            }
        }
    }

    fn write_atom(&mut self, atom: &Atom) {
        let (min, max) = atom.kind.argument_range();
        debug_assert!(
            (min..=max).contains(&atom.arguments.len()),
            "{:?} atom with {} arguments",
            atom.kind,
            atom.arguments.len()
        );

        match atom.kind {
            AtomKind::Fraction { .. }
            | AtomKind::Accent
            | AtomKind::Underline
            | AtomKind::Overline => {
                self.symbol(atom);
                for argument in &atom.arguments {
                    self.braced(argument);
                }
            }
            AtomKind::Radical => {
                self.symbol(atom);
                if let Some(index) = atom.arguments.get(1) {
                    let outer = mem::replace(&mut self.in_index, true);
                    self.text("[");
                    self.write_list(index);
                    self.text("]");
                    self.in_index = outer;
                }
                if let Some(radicand) = atom.arguments.first() {
                    self.braced(radicand);
                }
            }
            AtomKind::LargeOperator { limits } => {
                self.symbol(atom);
                let default = commands::command_name(atom.kind, &atom.nucleus)
                    .and_then(commands::lookup)
                    .and_then(|command| match command {
                        Command::Atom(AtomTemplate {
                            kind: AtomKind::LargeOperator { limits: default },
                            ..
                        }) => Some(default),
                        _ => None,
                    });
                if default.is_some_and(|default| default != limits) {
                    self.command(if limits { "limits" } else { "nolimits" });
                }
            }
            AtomKind::Inner => {
                let content = atom.arguments.first();
                match &atom.boundaries {
                    Some(boundaries) => {
                        self.command("left");
                        self.delimiter(&boundaries.left);
                        if let Some(content) = content {
                            self.write_list(content);
                        }
                        self.command("right");
                        self.delimiter(&boundaries.right);
                    }
                    None => {
                        self.text("{");
                        if let Some(content) = content {
                            self.write_list(content);
                        }
                        self.text("}");
                    }
                }
            }
            AtomKind::Table => {
                debug_assert!(Env::from_str(&atom.nucleus).is_some());
                self.command("begin");
                self.text("{");
                self.text(&atom.nucleus);
                self.text("}");
                for (i, row) in atom.rows.iter().enumerate() {
                    if i > 0 {
                        self.command("\\");
                    }
                    for (j, cell) in row.iter().enumerate() {
                        if j > 0 {
                            self.text("&");
                        }
                        self.write_list(cell);
                    }
                }
                // The parser drops a trailing row with one empty cell, so such a row needs its
                // own `\\` to survive.
                if let Some([cell]) = atom.rows.last().map(Vec::as_slice)
                    && cell.is_empty()
                {
                    self.command("\\");
                }
                self.command("end");
                self.text("{");
                self.text(&atom.nucleus);
                self.text("}");
            }
            AtomKind::Ordinary
            | AtomKind::BinaryOperator
            | AtomKind::Relation
            | AtomKind::Open
            | AtomKind::Close
            | AtomKind::Punctuation
            | AtomKind::Space
            | AtomKind::Style
            | AtomKind::Placeholder
            | AtomKind::Error => self.symbol(atom),
        }

        if let Some(superscript) = &atom.superscript {
            self.text("^");
            self.braced(superscript);
        }
        if let Some(subscript) = &atom.subscript {
            self.text("_");
            self.braced(subscript);
        }
    }
}
