//! Sandforge Headless Runner
//!
//! Loads an engine config, loads its rule directory, runs frames and logs a color census.
//! Nothing is rendered.
//!
//! Usage: `sandforge [config.json] [frames]`

use anyhow::{Context, Result};
use sandforge_core::{setup_logging, Engine, EngineConfig};
use std::env;
use std::time::Instant;
use tracing::info;

const DEFAULT_FRAMES: u64 = 60;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);

    let config = match args.next() {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => EngineConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n
            .parse::<u64>()
            .with_context(|| format!("frame count '{}' is not a number", n))?,
        None => DEFAULT_FRAMES,
    };

    setup_logging(Some(config.log_level.clone()));

    let rules_dir = config.rules_dir.clone();
    let mut engine = Engine::from_config(config)
        .with_context(|| format!("building engine from {}", rules_dir.display()))?;

    let start = Instant::now();
    let mut applications = 0;
    for _ in 0..frames {
        applications += engine.tick().applications;
    }
    info!(
        "🏁 [Runner] {} frames, {} rule applications in {:?}",
        frames,
        applications,
        start.elapsed()
    );

    for (color, count) in engine.census().into_iter().take(8) {
        info!("[Runner] {} x{}", color, count);
    }
    Ok(())
}
