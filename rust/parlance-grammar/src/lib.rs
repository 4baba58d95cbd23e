//! # parlance-grammar
//!
//! The pattern language behind parlance intents: a tokenizer for user
//! utterances, a compiler from pattern text to an immutable grammar tree, and
//! a backtracking matcher that tolerates noise around a valid command.
//!
//! ## Syntax
//!
//! | Pattern      | Meaning                                   |
//! |--------------|-------------------------------------------|
//! | `word`       | a literal word, compared case-insensitively |
//! | `(a\|b c)`   | alternation, tried in declaration order   |
//! | `[x]`        | optional, present tried before absent     |
//! | `+`          | exactly one token                         |
//! | `*`          | zero or more tokens, greedy               |
//! | `#`          | one number token                          |
//! | `{id}`       | a named entity grammar                    |
//!
//! ## Example
//!
//! ```
//! use parlance_grammar::{compile, Matcher, NoEntities, Tokenizer};
//!
//! let grammar = compile("play # [#] [#]", &NoEntities).unwrap();
//! let tokens = Tokenizer::default().tokenize("testgrammar play ten two");
//!
//! let found = Matcher::default().find(&[&grammar], &tokens).unwrap();
//! assert_eq!(found.window, 1..4);
//! assert_eq!(found.numbers(&tokens), vec![10, 2]);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod matcher;
pub mod number;
pub mod parser;
pub mod stem;
pub mod token;

pub use ast::GrammarNode;
pub use error::CompileError;
pub use matcher::{Capture, CaptureKind, DEFAULT_MIN_WINDOW, GrammarMatch, Matcher};
pub use parser::{EntityResolver, NoEntities, compile};
pub use stem::Language;
pub use token::{Token, Tokenizer};
