use std::path::PathBuf;

use anyhow::{Context, Result};
use keyer_core::{Keyer, SystemClock};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use iambic_keyer::{AppHal, ConsoleOperator, Settings, StdDelay};

fn main() {
    // Decoded text goes to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    info!("🔧 Iambic keyer v{} starting", env!("CARGO_PKG_VERSION"));

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref())?;
    let config = settings.keyer_config()?;
    info!(
        "⚙️ {} WPM, dit {} ms, letter gap {} ms",
        config.wpm(),
        config.dit_length().as_millis(),
        config.letter_gap().as_millis()
    );

    let hal = AppHal::open(&settings)?;
    let mut keyer = Keyer::new(config, hal, SystemClock, StdDelay, ConsoleOperator::stdout())
        .context("Failed to initialize keyer hardware")?;

    info!("✨ Keyer ready");
    match keyer.run() {
        Ok(never) => match never {},
        Err(e) => Err(e).context("Keyer stopped"),
    }
}
