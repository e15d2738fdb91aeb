use mathlist::{
    MathListBuilder, ParseError, ParseErrorKind, ParserConfig, Script, build_from_str,
    build_from_str_with_config,
};

fn all_errors(input: &str) -> Vec<ParseError> {
    match MathListBuilder::new(input).build() {
        Ok(list) => panic!("problem `{input}` did not return an error, got {list:?}"),
        Err(errors) => errors,
    }
}

fn first_error(input: &str) -> ParseError {
    match build_from_str(input) {
        Ok(list) => panic!("problem `{input}` did not return an error, got {list:?}"),
        Err(err) => *err,
    }
}

#[test]
fn unknown_command_is_isolated() {
    assert_eq!(
        all_errors(r"a + \foo + \frac{b}{c}"),
        [ParseError(4..8, ParseErrorKind::UnknownCommand("foo".into()))]
    );
    assert_eq!(
        all_errors(r"x^\foo"),
        [ParseError(2..6, ParseErrorKind::UnknownCommand("foo".into()))]
    );
}

#[test]
fn unbalanced_braces() {
    let valid = [
        "a+b",
        r"\frac12",
        "x^2",
        r"\left( x \right)",
        r"\begin{matrix} a \end{matrix}",
    ];
    for expr in valid {
        for problem in [format!("{expr}{{"), format!("{{{expr}"), format!("{expr}}}")] {
            let errors = all_errors(&problem);
            assert!(
                errors
                    .iter()
                    .all(|err| err.1 == ParseErrorKind::UnbalancedBraces),
                "{problem}: {errors:?}"
            );
            assert_eq!(first_error(&problem).1, ParseErrorKind::UnbalancedBraces);
        }
    }
}

#[test]
fn duplicate_scripts() {
    let err = first_error("x^2^3");
    assert_eq!(
        err,
        ParseError(3..4, ParseErrorKind::DuplicateScript(Script::Superscript))
    );
    let err = first_error("x_2_3 y");
    assert_eq!(
        err,
        ParseError(3..4, ParseErrorKind::DuplicateScript(Script::Subscript))
    );
    let err = first_error(r"\int__3 x dx");
    assert_eq!(
        err,
        ParseError(5..6, ParseErrorKind::DuplicateScript(Script::Subscript))
    );
}

#[test]
fn missing_arguments() {
    assert_eq!(
        first_error(r"\frac{a}"),
        ParseError(8..8, ParseErrorKind::MissingArgument(r"\frac".into()))
    );
    assert_eq!(
        first_error(r"{\sqrt}"),
        ParseError(6..7, ParseErrorKind::MissingArgument(r"\sqrt".into()))
    );
    assert_eq!(
        first_error("x^"),
        ParseError(2..2, ParseErrorKind::MissingArgument("^".into()))
    );
    assert_eq!(
        first_error(r"\hat^2"),
        ParseError(4..5, ParseErrorKind::MissingArgument(r"\hat".into()))
    );
}

#[test]
fn missing_arguments_as_placeholders() {
    let config = ParserConfig {
        placeholders_for_missing_arguments: true,
        ..Default::default()
    };
    let list = build_from_str_with_config(r"{x^} \frac{a}", &config).unwrap();
    assert!(list.is_complete());
    assert_eq!(list.to_string(), r"{x^{\square}}\frac{a}{\square}");
}

#[test]
fn nesting_too_deep() {
    let problem = format!("{}x{}", "{".repeat(200), "}".repeat(200));
    assert_eq!(
        all_errors(&problem),
        [ParseError(128..129, ParseErrorKind::NestingTooDeep)]
    );

    let config = ParserConfig {
        max_nesting_depth: 4,
        ..Default::default()
    };
    let problem = "x^{x^{x^{x^{x^{x}}}}}";
    let err = build_from_str_with_config(problem, &config).unwrap_err();
    assert_eq!(err.1, ParseErrorKind::NestingTooDeep);
    assert!(build_from_str_with_config("x^{x^{x}}", &config).is_ok());
}

#[test]
fn lexical_errors() {
    assert_eq!(
        all_errors("x # y $ z"),
        [
            ParseError(2..3, ParseErrorKind::UnexpectedCharacter('#')),
            ParseError(6..7, ParseErrorKind::UnexpectedCharacter('$')),
        ]
    );
    assert_eq!(
        first_error("x\\"),
        ParseError(1..2, ParseErrorKind::UnexpectedCharacter('\\'))
    );
    assert_eq!(
        first_error(r"\begin{xmatrix} 1 \end{xmatrix}"),
        ParseError(
            6..15,
            ParseErrorKind::UnknownEnvironment("xmatrix".into())
        )
    );
}

#[test]
fn empty_input() {
    assert!(build_from_str("").unwrap().is_empty());
    assert!(build_from_str("  % just a comment").unwrap().is_empty());
    let config = ParserConfig {
        allow_empty_input: false,
        ..Default::default()
    };
    let err = build_from_str_with_config(" ", &config).unwrap_err();
    assert_eq!(err.1, ParseErrorKind::EmptyInput);
}

#[test]
fn errors_are_sorted() {
    let errors = all_errors(r"\left( \foo x^2^3 \begin{matrix} a");
    let starts: Vec<usize> = errors.iter().map(|err| err.0.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert_eq!(errors.len(), 4);
    assert_eq!(errors[0].1, ParseErrorKind::MissingRight);
}

#[test]
fn reports() {
    let problems = [
        r"\end{matrix}",
        "}",
        r"\asdf",
        r"\sqrt[3",
        r"\begin{matrix} 1 \end{bmatrix}",
        r"\left x 1 \right)",
        "x & y",
        r"x \limits",
    ];
    for problem in problems {
        let error = first_error(problem);
        let report = error.to_report("<input>", false);
        let mut buf = Vec::new();
        report
            .write(("<input>", ariadne::Source::from(problem)), &mut buf)
            .expect("failed to write report");
        let output = String::from_utf8(buf).expect("report should be valid UTF-8");
        assert!(
            output.contains(&error.error_message()),
            "{problem}: {output}"
        );
        assert!(output.contains("<input>"), "{problem}: {output}");
    }
}
