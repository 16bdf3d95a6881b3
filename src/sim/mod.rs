//! Simulation: board, region index, evaluator, scheduler and the engine that ties them.

pub mod board;
pub mod engine;
pub mod evaluator;
pub mod region;
pub mod scheduler;

pub use board::{Board, HEIGHT, WIDTH};
pub use engine::{Engine, FrameStats};
pub use evaluator::Evaluator;
pub use region::{Region, RegionIndex};
pub use scheduler::Scheduler;
