#![cfg(not(target_arch = "wasm32"))]
#![warn(missing_docs)]

//! # Parlance Console
//!
//! A line-oriented front end for the parlance dialog engine. Each line read
//! from standard input is one utterance; each reply is printed on its own
//! line. The console ships a small set of demo intents (alarm, timer, device
//! switching, greeting) described in `intents.json`, bound to handlers by
//! intent name.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin parlance
//! cargo run --bin parlance -- --language english --config parlance.json
//! cargo run --bin parlance -- --list
//! ```
//!
//! ## Commands
//!
//! - `:grammars` - List every grammar the engine understands
//! - `:quit` or `:exit` - Leave the console
//!
//! Set `RUST_LOG=parlance_dialog=debug` to follow intent selection and slot
//! filling on stderr.

mod cli;
pub use cli::*;

mod intents;
pub use intents::*;

mod repl;
pub use repl::*;
