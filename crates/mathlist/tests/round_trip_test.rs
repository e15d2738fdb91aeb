use mathlist::{AtomKind, MathList, MathListBuilder, build_from_str, math_list_to_string};
use proptest::prelude::*;

/// Self-contained pieces of valid input.
const FRAGMENTS: &[&str] = &[
    "a",
    "x",
    "7",
    "+",
    "-",
    "=",
    "(",
    ")",
    "[",
    "]",
    ",",
    "'",
    "é",
    "α",
    r"\alpha",
    r"\infty",
    r"\leq",
    r"\to",
    r"\{",
    r"\}",
    r"\|",
    r"\,",
    r"\quad",
    r"\ ",
    r"\square",
    r"\displaystyle",
    "x^2",
    "x_i^{n+1}",
    r"\frac{a}{b}",
    r"\frac12",
    r"\sqrt{x}",
    r"\sqrt[3]{x}",
    r"\sqrt[\rbrack]{y}",
    r"\hat{a}",
    r"\overline{xy}",
    r"\binom nk",
    r"\sum\limits_{i=0}^n",
    r"\int\limits_0^1",
    r"\lim\nolimits",
    r"\sin x",
    "{a+b}",
    "{}",
    r"\left( x \right)",
    r"\left. y \right\|",
    r"\left\langle \frac ab \right\rangle",
    r"\begin{pmatrix} a & b \\ c & d \end{pmatrix}",
    r"\begin{cases} x & y \\ z \end{cases}",
    r"\begin{gathered} a \\ b \end{gathered}",
    r"\begin{matrix} a \\ \\ \end{matrix}",
    r"\begin{matrix} \\ \end{matrix}",
    r"\begin{matrix} \\ \\ a & \end{matrix}",
    r"\begin{Bmatrix}\end{Bmatrix}",
];

/// Tokens which open, close or split structures, so that random mixes of them with
/// [`FRAGMENTS`] produce nested and partly invalid input.
const SEPARATORS: &[&str] = &[
    "{",
    "}",
    "^",
    "_",
    "&",
    r"\\",
    r"\begin{matrix}",
    r"\end{matrix}",
    r"\begin{cases}",
    r"\end{cases}",
    r"\left(",
    r"\left.",
    r"\right)",
    r"\right\|",
    r"\sqrt[",
    "]",
    r"\frac",
    r"\hat",
    r"\limits",
];

fn assert_round_trip(input: &str) {
    let tree = build_from_str(input).unwrap_or_else(|err| panic!("{input:?}: {err}"));
    let serialized = math_list_to_string(&tree);
    let reparsed = build_from_str(&serialized)
        .unwrap_or_else(|err| panic!("{serialized:?} (from {input:?}): {err}"));
    assert_eq!(reparsed, tree, "{input:?} was serialized as {serialized:?}");
    assert_eq!(math_list_to_string(&reparsed), serialized);
}

#[test]
fn concrete_scenarios() {
    let list = build_from_str("a+b").unwrap();
    let kinds: Vec<AtomKind> = list.iter().map(|atom| atom.kind).collect();
    assert_eq!(
        kinds,
        [AtomKind::Ordinary, AtomKind::BinaryOperator, AtomKind::Ordinary]
    );
    assert_eq!(math_list_to_string(&list), "a+b");

    let list = build_from_str(r"\frac12").unwrap();
    assert_eq!(list.len(), 1);
    let frac = &list.atoms()[0];
    assert_eq!(frac.arguments.len(), 2);
    assert!(frac.arguments.iter().all(|argument| argument.len() == 1));
}

#[test]
fn superscript_serializes_back() {
    let list = build_from_str("x^2").unwrap();
    assert_eq!(list.len(), 1);
    let superscript = list.atoms()[0].superscript.as_ref().unwrap();
    assert_eq!(math_list_to_string(superscript), "2");
}

#[test]
fn every_fragment_round_trips() {
    for fragment in FRAGMENTS {
        assert_round_trip(fragment);
    }
}

#[test]
fn every_command_round_trips() {
    for (name, command) in mathlist::supported_commands() {
        let mathlist::Command::Atom(template) = command else {
            continue;
        };
        let mut input = format!("\\{name}");
        for _ in 0..template.arguments {
            input.push_str("{x}");
        }
        assert_round_trip(&input);
    }
}

#[test]
fn parsed_trees_are_complete() {
    for fragment in FRAGMENTS {
        let list: MathList = fragment.parse().unwrap();
        assert!(list.is_complete(), "{fragment:?}");
    }
}

proptest! {
    #[test]
    fn fragments_round_trip(fragments in prop::collection::vec(prop::sample::select(FRAGMENTS), 0..12)) {
        let input = fragments.join(" ");
        let tree = build_from_str(&input).unwrap();
        let serialized = math_list_to_string(&tree);
        let reparsed = build_from_str(&serialized).unwrap();
        prop_assert_eq!(reparsed, tree);
    }

    #[test]
    fn arbitrary_input_round_trips_or_fails(input in r"[ab1+=()\[\]{}^_&\\ ',.|%é]{0,30}") {
        if let Ok(tree) = build_from_str(&input) {
            let serialized = math_list_to_string(&tree);
            let reparsed = build_from_str(&serialized);
            prop_assert_eq!(reparsed.as_ref(), Ok(&tree), "serialized as {:?}", serialized);
        }
    }

    #[test]
    fn mixed_structures_round_trip_or_fail(
        pieces in prop::collection::vec(
            prop_oneof![prop::sample::select(FRAGMENTS), prop::sample::select(SEPARATORS)],
            0..16,
        )
    ) {
        let input = pieces.join(" ");
        if let Ok(tree) = build_from_str(&input) {
            let serialized = math_list_to_string(&tree);
            let reparsed = build_from_str(&serialized);
            prop_assert_eq!(reparsed.as_ref(), Ok(&tree), "serialized as {:?}", serialized);
        }
    }

    #[test]
    fn parsing_is_deterministic(input in r"[ax2+{}^_\\\[\] ]{0,30}") {
        let first = MathListBuilder::new(&input).build();
        let second = MathListBuilder::new(&input).build();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn error_modes_agree(input in r"[ax2+{}^_&\\ %\n]{0,30}") {
        let all = MathListBuilder::new(&input).build();
        let first = build_from_str(&input);
        match (all, first) {
            (Ok(all), Ok(first)) => prop_assert_eq!(all, first),
            (Err(all), Err(first)) => prop_assert_eq!(&all[0], first.as_ref()),
            (all, first) => prop_assert!(false, "{:?} vs {:?}", all, first),
        }
    }
}
