use std::path::PathBuf;

use clap::Parser;
use parlance_dialog::grammar::Language;

/// Command line of the `parlance` console.
#[derive(Debug, Parser)]
#[command(name = "parlance")]
#[command(bin_name = "parlance")]
#[command(about = "Talk to parlance intents from the terminal", long_about = None)]
pub struct ConsoleCli {
    /// Engine configuration (JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stemming language, overriding the configuration.
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Intent manifest (JSON list of intents). Defaults to the built-in demo intents.
    #[arg(short, long)]
    pub intents: Option<PathBuf>,

    /// Print the grammars the engine understands and exit.
    #[arg(long)]
    pub list: bool,
}
