//! Command-line front end for the generator. Grounded in pegen.py's
//! `argparse`-based `main()`: a positional grammar file (`-` for stdin), an
//! output path, and repeatable `-v`/`-q` verbosity flags — translated into
//! `clap`'s derive API, the CLI idiom the wider example pack reaches for
//! (see `other_examples/manifests/yingkitw-minipg/Cargo.toml`) since the
//! teacher crate itself ships no binary.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use lang_peg::driver;

/// Compile a PEG grammar into the source of a recursive-descent parser.
#[derive(Debug, Parser)]
#[command(name = "lang-peg", version, about)]
struct Cli {
    /// Grammar file to compile, or `-` to read from stdin.
    grammar: PathBuf,

    /// Where to write the generated parser source. Defaults to
    /// `DEFAULT_OUTPUT_PATH` (`parse.rs`), or stdout when the grammar itself
    /// came from stdin.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase verbosity (repeatable): once for info, twice for debug,
    /// three times for trace-level memoization logging.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress the grammar echo normally printed after a successful parse.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let is_stdin = cli.grammar.as_os_str() == "-";
    let (filename, grammar_text) = match read_grammar(&cli.grammar, is_stdin) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("lang-peg: {err}");
            return ExitCode::FAILURE;
        }
    };

    let output = match driver::compile(&filename, &grammar_text) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if !cli.quiet {
        log::info!("compiled {} rule(s) from {filename}", output.rule_count);
        eprintln!("{}", output.grammar_echo);
    }

    match write_output(&cli.output, is_stdin, &output.generated_source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lang-peg: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn read_grammar(path: &PathBuf, is_stdin: bool) -> io::Result<(String, String)> {
    if is_stdin {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(("<stdin>".to_string(), text))
    } else {
        let text = fs::read_to_string(path)?;
        Ok((path.display().to_string(), text))
    }
}

/// spec.md §6's driver surface: `-o PATH` defaults to a fixed filename, not
/// one derived from the grammar's own name — the same convention
/// `examples/original_source/pegen.py`'s `-o`/`--output` uses (`default='parse.py'`).
const DEFAULT_OUTPUT_PATH: &str = "parse.rs";

fn write_output(explicit: &Option<PathBuf>, is_stdin: bool, source: &str) -> io::Result<()> {
    match explicit {
        Some(path) => fs::write(path, source),
        None if is_stdin => io::stdout().write_all(source.as_bytes()),
        None => fs::write(DEFAULT_OUTPUT_PATH, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// spec.md §6: `-o`'s default is a fixed filename, not one derived from
    /// the grammar path (pegen.py: `default='parse.py'`).
    #[test]
    fn default_output_path_is_fixed_not_derived_from_the_grammar_path() {
        assert_eq!(DEFAULT_OUTPUT_PATH, "parse.rs");
    }
}
