//! Simulation Engine
//!
//! Owns the board, the loaded rules and identities, the region index and the single
//! random stream. One `tick` is one displayed frame: the configured number of scheduler
//! passes, then one region rebuild.

use super::board::Board;
use super::evaluator::Evaluator;
use super::region::RegionIndex;
use super::scheduler::Scheduler;
use crate::core::config::EngineConfig;
use crate::core::error::{ConfigError, EngineError};
use crate::dsl::loader::{RuleBook, RuleLoader};
use crate::model::{Color, IdentityRegistry, KeyBindRegistry, RuleSet};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::{debug, info};

/// What one frame did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    /// 1-based frame counter.
    pub frame: u64,
    /// Rule applications across every pass of the frame.
    pub applications: usize,
}

pub struct Engine {
    config: EngineConfig,
    board: Board,
    identities: IdentityRegistry,
    binds: KeyBindRegistry,
    rules: RuleSet,
    regions: RegionIndex,
    scheduler: Scheduler,
    rng: SmallRng,
    frame: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, book: RuleBook) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let board = Board::new();
        let regions = RegionIndex::from_board(&board);
        let scheduler = Scheduler::new(config.iterations, config.stepping);

        info!(
            "⚙️ [Engine] Initialized ({} rules, {} identities, {} key binds, iterations={}, stepping={}, seed={:?})",
            book.rules.len(),
            book.identities.len(),
            book.binds.len(),
            config.iterations,
            config.stepping,
            config.seed
        );

        Ok(Engine {
            board,
            identities: book.identities,
            binds: book.binds,
            rules: RuleSet::new(book.rules),
            regions,
            scheduler,
            rng,
            frame: 0,
            config,
        })
    }

    /// Load every rule file under `config.rules_dir` and build an engine around them.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut loader = RuleLoader::new();
        loader.load_dir(&config.rules_dir)?;
        Ok(Self::new(config, loader.finish())?)
    }

    /// Run one frame.
    pub fn tick(&mut self) -> FrameStats {
        let eval = Evaluator::new(&self.identities, &self.regions);
        let applications =
            self.scheduler
                .run_frame(&mut self.board, &mut self.rules, &eval, &mut self.rng);
        self.regions.recompute(&self.board);
        self.frame += 1;

        debug!(
            "[Engine] frame {} applied {} rules",
            self.frame, applications
        );
        FrameStats {
            frame: self.frame,
            applications,
        }
    }

    /// Rebuild the region index now instead of waiting for the end of the frame.
    /// Paint between frames does not need this; the next `tick` rebuilds anyway.
    pub fn refresh_regions(&mut self) {
        self.regions.recompute(&self.board);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Color {
        self.board.get(x, y)
    }

    /// Out-of-range writes are ignored.
    pub fn set_pixel(&mut self, color: Color, x: i32, y: i32) -> bool {
        self.board.set(x, y, color)
    }

    /// Fill a `w x h` rectangle anchored at its top-left corner, clipped to the board.
    /// Returns how many pixels were written.
    pub fn paint_rect(&mut self, color: Color, x: i32, y: i32, w: u32, h: u32) -> usize {
        let mut written = 0;
        for py in y..y.saturating_add(h as i32) {
            for px in x..x.saturating_add(w as i32) {
                if self.board.set(px, py, color) {
                    written += 1;
                }
            }
        }
        written
    }

    pub fn key_binding(&self, key: char) -> Option<Color> {
        self.binds.lookup(key)
    }

    /// Pixel count per color, most common first.
    pub fn census(&self) -> Vec<(Color, usize)> {
        let mut counts: HashMap<Color, usize> = HashMap::new();
        for &c in self.board.pixels() {
            *counts.entry(c).or_default() += 1;
        }
        let mut out: Vec<(Color, usize)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.to_u32().cmp(&b.0.to_u32())));
        out
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.identities, &self.regions)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
