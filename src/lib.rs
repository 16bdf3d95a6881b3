//! Sandforge Core v0.3.0 - Falling-Sand Rule Engine
//!
//! Cellular-automaton runtime driven by hand-written rule files. A rule pairs a 5x5
//! match template with a 5x5 replace template and a firing probability; the engine
//! scans an 80x80 pixel board with an anti-bias raster and applies the first matching
//! rule at each anchor. A per-frame region index of present colors rejects most
//! anchors before any cell is compared.
//!
//! Typical use:
//!
//! ```no_run
//! use sandforge_core::{Engine, EngineConfig};
//!
//! sandforge_core::setup_logging(None);
//! let mut engine = Engine::from_config(EngineConfig::default())?;
//! let stats = engine.tick();
//! # Ok::<(), sandforge_core::core::EngineError>(())
//! ```

pub mod core;
pub mod dsl;
pub mod model;
pub mod sim;

// Re-export key types
pub use crate::core::config::EngineConfig;
pub use crate::core::error::{ConfigError, EngineError, LoadError, ParseError};
pub use dsl::loader::{FileReport, RuleBook, RuleLoader};
pub use model::{Color, IdentityRegistry, KeyBindRegistry, Rule, RuleSet, BACKGROUND};
pub use sim::board::{Board, HEIGHT, WIDTH};
pub use sim::engine::{Engine, FrameStats};

/// Initialize tracing for the library.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
