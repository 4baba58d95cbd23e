use anyhow::{Context, Result};
use clap::Parser;
use parlance_console::{ConsoleCli, DEFAULT_MANIFEST, demo_handlers, load_registry, run, write_grammars};
use parlance_dialog::{DialogEngine, EngineConfig};
use tracing_subscriber::EnvFilter;

pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = ConsoleCli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(language) = cli.language {
        config.language = language;
    }

    let manifest = match &cli.intents {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read intents from {}", path.display()))?,
        None => DEFAULT_MANIFEST.to_string(),
    };
    let loaded = load_registry(&manifest, &demo_handlers())?;
    tracing::info!(
        intents = loaded.registry.len(),
        skipped = loaded.skipped.len(),
        language = %config.language,
        "loaded intents"
    );

    let engine = DialogEngine::new(loaded.registry, config)?;

    if cli.list {
        return write_grammars(&engine, std::io::stdout().lock());
    }

    run(&engine, std::io::stdin().lock(), std::io::stdout().lock())
}
