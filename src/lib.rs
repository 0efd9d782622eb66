//! `lang-peg` is a library to compile a small Parsing Expression Grammar
//! (PEG) meta-language into the source of a recursive-descent, packrat
//! memoized parser.
//!
//! # Overview
//!
//! A grammar is written as a sequence of rules, each an ordered choice of
//! alternatives over named or bare terminals, rule references, groups, and
//! quantifiers — see [`grammar`] for the concrete syntax. [`driver::compile`]
//! runs the whole pipeline: tokenize the grammar text ([`grammar::lexer`]),
//! fold `{ ... }` semantic actions into single tokens
//! ([`grammar::curly_filter`]), parse it into an [`ast::Rule`] list
//! ([`grammar::parser`]), and hand that to [`codegen`] to produce the
//! generated parser's source text.
//!
//! The generator is its own first user: [`grammar::parser`]'s hand-written
//! `GrammarParser` is built on the exact same [`runtime::Parser`] that
//! [`codegen`]-emitted source calls into — memoization, mark/reset
//! backtracking, and Warth-style seed-and-grow left recursion
//! ([`runtime::Parser::memoize_left_rec`]) all live in one place and are
//! exercised by both.
//!
//! # Example
//!
//! ```
//! use lang_peg::driver;
//!
//! let grammar = "start: NAME ENDMARKER\n";
//! let out = driver::compile("example.peg", grammar).unwrap();
//! assert!(out.generated_source.contains("fn start"));
//! ```

pub mod ast;
pub mod cache;
pub mod codegen;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod position;
pub mod runtime;
pub mod token;

pub use driver::{compile, CompileOutput};
pub use error::PegError;
