//! Configuration and error types shared by the rule loader and the simulation.

pub mod config;
pub mod error;

pub use config::EngineConfig;
pub use error::{Block, ConfigError, EngineError, LoadError, Location, ParseError};
