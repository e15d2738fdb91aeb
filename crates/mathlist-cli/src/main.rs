use std::{
    io::{self, Read, Write},
    path::PathBuf,
};

use clap::Parser;

use mathlist::{MathList, MathListBuilder, ParseError, build_from_str_with_config};

mod config_file;

use config_file::{Config, load_config_file};

/// Parses LaTeX math into a math list
#[derive(Parser, Debug)]
#[command(version, about = "Parses LaTeX math into a math list", long_about = None)]
struct Args {
    /// Specifies a single LaTeX formula; otherwise the formula is read from stdin
    #[arg(short, long, value_name = "LATEX")]
    formula: Option<String>,

    /// Reads parser settings from a TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reports every error instead of stopping at the first one
    #[arg(short, long)]
    all_errors: bool,

    /// Prints the parsed tree instead of the canonical LaTeX
    #[arg(short, long)]
    tree: bool,

    /// Prints all supported command names and exits
    #[arg(long, conflicts_with_all = ["formula", "tree"])]
    list_commands: bool,

    /// Disables colors in error reports
    #[arg(long)]
    no_color: bool,

    /// Increases the log level; can be given more than once
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if args.list_commands {
        list_commands();
        return;
    }

    let config = match &args.config {
        Some(path) => load_config_file(path).unwrap_or_else(|e| exit_config_error(e)),
        None => Config::default(),
    };
    let input = match args.formula {
        Some(ref formula) => formula.clone(),
        None => read_stdin(),
    };
    let source_name = if args.formula.is_some() {
        "<formula>"
    } else {
        "<stdin>"
    };

    let result = if args.all_errors || config.all_errors {
        MathListBuilder::with_config(&input, &config.parser).build()
    } else {
        build_from_str_with_config(&input, &config.parser).map_err(|e| vec![*e])
    };
    match result {
        Ok(list) => print_list(&list, args.tree),
        Err(errors) => exit_parse_errors(&errors, source_name, &input, !args.no_color),
    }
}

fn read_stdin() -> String {
    let mut buffer = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buffer) {
        exit_io_error(e);
    }
    buffer
}

fn print_list(list: &MathList, tree: bool) {
    let mut stdout = io::stdout().lock();
    let result = if tree {
        writeln!(stdout, "{list:#?}")
    } else {
        writeln!(stdout, "{list}")
    };
    if let Err(e) = result {
        exit_io_error(e);
    }
}

fn list_commands() {
    let mut names: Vec<&str> = mathlist::supported_commands().keys().copied().collect();
    names.sort_unstable();
    let mut stdout = io::stdout().lock();
    for name in names {
        if let Err(e) = writeln!(stdout, "\\{name}") {
            exit_io_error(e);
        }
    }
}

fn exit_parse_errors(errors: &[ParseError], source_name: &str, input: &str, color: bool) -> ! {
    for error in errors {
        let report = error.to_report(source_name, color);
        if report
            .eprint((source_name, ariadne::Source::from(input)))
            .is_err()
        {
            eprintln!("Parse error: {error}");
        }
    }
    std::process::exit(2);
}

fn exit_config_error(e: config_file::ConfigError) -> ! {
    eprintln!("Config error: {e}");
    std::process::exit(1);
}

fn exit_io_error(e: io::Error) -> ! {
    eprintln!("IO Error: {e}");
    std::process::exit(1);
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from(["mathlist", "-f", r"x^2", "--tree", "-vv"]).unwrap();
        assert_eq!(args.formula.as_deref(), Some("x^2"));
        assert!(args.tree);
        assert_eq!(args.verbose, 2);
        assert!(Args::try_parse_from(["mathlist", "--list-commands", "-f", "x"]).is_err());
    }
}
