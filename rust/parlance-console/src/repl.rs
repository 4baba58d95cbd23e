use std::io::{BufRead, Write};

use anyhow::Result;
use parlance_dialog::{DialogEngine, DialogSession};

/// Console command listing the grammars the engine understands.
pub const GRAMMARS_COMMAND: &str = ":grammars";

/// Console commands ending the conversation.
pub const EXIT_COMMANDS: &[&str] = &[":quit", ":exit"];

/// Write every possible grammar, one per line.
pub fn write_grammars(engine: &DialogEngine, mut output: impl Write) -> Result<()> {
    for grammar in engine.possible_grammars() {
        writeln!(output, "{grammar}")?;
    }
    Ok(())
}

/// Run a conversation: one utterance per input line, one reply per output
/// line, until the input ends or an exit command is read.
pub fn run(engine: &DialogEngine, input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut session = DialogSession::new();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }
        if line == GRAMMARS_COMMAND {
            write_grammars(engine, &mut output)?;
            continue;
        }

        let response = engine.respond(&mut session, line);
        tracing::debug!(outcome = ?response.outcome, state = %session.state(), "turn finished");
        writeln!(output, "{response}")?;
        output.flush()?;
    }

    Ok(())
}
