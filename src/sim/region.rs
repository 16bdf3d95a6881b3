//! Region Index
//!
//! Distinct colors present in each quadrant (2x2 split) and each quad-quadrant
//! (4x4 split) of the board. Rebuilt from scratch in one O(W*H) pass per frame,
//! never patched incrementally, so between rebuilds it may lag the board.

use super::board::{Board, HEIGHT, WIDTH};
use crate::model::{Color, IdentityRegistry, MatchTerm};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Partition counts per axis.
pub const QUADRANTS: usize = 2;
pub const QUAD_QUADRANTS: usize = 4;

/// Colors present in one rectangular partition.
#[derive(Clone, Debug, Default)]
pub struct Region {
    colors: HashSet<Color>,
}

impl Region {
    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether anything in this region could satisfy `term`.
    pub fn has(&self, term: MatchTerm, identities: &IdentityRegistry) -> bool {
        match term {
            MatchTerm::Wildcard => true,
            MatchTerm::Exact(color) => self.colors.contains(&color),
            MatchTerm::Member(id) => identities
                .members(id)
                .iter()
                .any(|c| self.colors.contains(c)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RegionIndex {
    quadrants: Vec<Region>,      // [QUADRANTS^2], row-major
    quad_quadrants: Vec<Region>, // [QUAD_QUADRANTS^2], row-major
}

impl Default for RegionIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionIndex {
    /// Empty index; nothing passes the pre-filter until the first `recompute`.
    pub fn new() -> Self {
        RegionIndex {
            quadrants: vec![Region::default(); QUADRANTS * QUADRANTS],
            quad_quadrants: vec![Region::default(); QUAD_QUADRANTS * QUAD_QUADRANTS],
        }
    }

    pub fn from_board(board: &Board) -> Self {
        let mut index = Self::new();
        index.recompute(board);
        index
    }

    /// Rebuild every region set from the current board.
    pub fn recompute(&mut self, board: &Board) {
        for region in self.quadrants.iter_mut().chain(self.quad_quadrants.iter_mut()) {
            region.colors.clear();
        }
        for (x, y, color) in board.cells() {
            let q = slot(x, y, QUADRANTS);
            self.quadrants[q].colors.insert(color);
            let qq = slot(x, y, QUAD_QUADRANTS);
            self.quad_quadrants[qq].colors.insert(color);
        }
    }

    pub fn quadrant(&self, qx: usize, qy: usize) -> &Region {
        &self.quadrants[qy * QUADRANTS + qx]
    }

    pub fn quad_quadrant(&self, qx: usize, qy: usize) -> &Region {
        &self.quad_quadrants[qy * QUAD_QUADRANTS + qx]
    }

    /// True when some `split x split` region overlapping the clipped cell rectangle
    /// could satisfy `term`.
    pub fn any_overlapping(
        &self,
        split: usize,
        xs: &RangeInclusive<usize>,
        ys: &RangeInclusive<usize>,
        term: MatchTerm,
        identities: &IdentityRegistry,
    ) -> bool {
        let regions = if split == QUADRANTS {
            &self.quadrants
        } else {
            &self.quad_quadrants
        };
        let (rx0, rx1) = (*xs.start() * split / WIDTH, *xs.end() * split / WIDTH);
        let (ry0, ry1) = (*ys.start() * split / HEIGHT, *ys.end() * split / HEIGHT);
        (ry0..=ry1).any(|ry| {
            (rx0..=rx1).any(|rx| regions[ry * split + rx].has(term, identities))
        })
    }
}

#[inline(always)]
fn slot(x: usize, y: usize, split: usize) -> usize {
    (y * split / HEIGHT) * split + x * split / WIDTH
}
