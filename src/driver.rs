//! The driver (component F): glues the meta-grammar front end to the code
//! generator and exposes the one entry point `main.rs` calls. Grounded in
//! pegen.py's `build_parser_and_generator` / `main`, minus argument parsing
//! (that's `main.rs`'s job, via `clap`) and minus pegen's Python/C dual
//! backend — spec.md scopes this generator to one target.

use log::info;

use crate::codegen::Generator;
use crate::error::PegError;
use crate::grammar::{parse_grammar, CurlyFilter, Lexer};
use crate::position::Source;
use crate::runtime::CacheStats;

/// Everything a successful compile produced: the generated source text plus
/// a snapshot of how much memoization state the meta-grammar parse used —
/// the Rust analogue of pegen.py's `-v` cache-size printout (spec.md §6).
pub struct CompileOutput {
    pub generated_source: String,
    pub rule_count: usize,
    /// The parsed grammar rendered back through `Rule`'s `Display` impl, one
    /// rule per line — the Rust analogue of pegen.py's `-v` grammar echo.
    pub grammar_echo: String,
    pub cache_stats: CacheStats,
}

/// Compiles one `.peg`-style grammar source into generated parser source
/// text. `filename` is used only for diagnostics (spec.md §6/§7).
pub fn compile(filename: &str, grammar_text: &str) -> Result<CompileOutput, PegError> {
    let source = Source::new(grammar_text);
    let lexer = Lexer::new(grammar_text);
    let producer = CurlyFilter::new(lexer);

    info!("parsing grammar {filename}");
    let (rules, cache_stats) = parse_grammar(producer, filename, &source)?;
    info!("parsed {} rule(s) from {filename}", rules.len());
    log_cache_stats(cache_stats);

    let rule_count = rules.len();
    let grammar_echo = rules
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let generated_source = Generator::new(rules).generate();
    Ok(CompileOutput {
        generated_source,
        rule_count,
        grammar_echo,
        cache_stats,
    })
}

/// The Rust analogue of pegen.py's `-v` cache-size printout.
fn log_cache_stats(stats: CacheStats) {
    log::debug!(
        "cache stats: {} tokens buffered, {} rule entries, {} terminal entries",
        stats.tokens_buffered,
        stats.rule_cache_entries,
        stats.terminal_cache_entries
    );
}
