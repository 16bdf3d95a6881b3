//! Match / Enforce Evaluator
//!
//! Decides whether a rule applies at an anchor and applies it. The anchor is the
//! top-left cell of the 5x5 footprint; term `(col, row)` lands on `(x + col, y + row)`.

use super::board::{Board, HEIGHT, WIDTH};
use super::region::{RegionIndex, QUADRANTS, QUAD_QUADRANTS};
use crate::model::{Color, IdentityRegistry, MatchTerm, ReplaceTerm, Rule, RULE_SIZE};
use rand::Rng;

const REACH: i32 = RULE_SIZE as i32 - 1;

pub struct Evaluator<'a> {
    identities: &'a IdentityRegistry,
    regions: &'a RegionIndex,
}

impl<'a> Evaluator<'a> {
    pub fn new(identities: &'a IdentityRegistry, regions: &'a RegionIndex) -> Self {
        Evaluator {
            identities,
            regions,
        }
    }

    /// Cheap pre-filter against the region index.
    ///
    /// `false` proves the rule cannot match anywhere in the footprint (as of the last
    /// region rebuild). `true` only means a match is not ruled out.
    pub fn potential(&self, rule: &Rule, x: i32, y: i32) -> bool {
        let (x0, x1) = (x.max(0), (x + REACH).min(WIDTH as i32 - 1));
        let (y0, y1) = (y.max(0), (y + REACH).min(HEIGHT as i32 - 1));
        if x0 > x1 || y0 > y1 {
            // Nothing on the board to inspect; only an all-wildcard rule can still fit.
            return rule.search_for().is_empty();
        }
        let xs = x0 as usize..=x1 as usize;
        let ys = y0 as usize..=y1 as usize;

        // Quadrants reject first; quad-quadrants are contained in them and narrow further.
        rule.search_for().iter().all(|&term| {
            self.regions
                .any_overlapping(QUADRANTS, &xs, &ys, term, self.identities)
                && self
                    .regions
                    .any_overlapping(QUAD_QUADRANTS, &xs, &ys, term, self.identities)
        })
    }

    /// The literal 25-cell comparison, ignoring probability and the region index.
    pub fn fits(&self, board: &Board, rule: &Rule, x: i32, y: i32) -> bool {
        for row in 0..RULE_SIZE {
            for col in 0..RULE_SIZE {
                let term = rule.match_term(col, row);
                if term.is_wildcard() {
                    continue;
                }
                let (px, py) = (x + col as i32, y + row as i32);
                if !Board::in_bounds(px, py) {
                    return false;
                }
                let pixel = board.get(px, py);
                let ok = match term {
                    MatchTerm::Exact(color) => pixel == color,
                    MatchTerm::Member(id) => self.identities.is_member(id, pixel),
                    MatchTerm::Wildcard => true,
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    /// Probability roll, then the pre-filter, then the literal comparison.
    pub fn matches<R: Rng + ?Sized>(
        &self,
        board: &Board,
        rule: &Rule,
        x: i32,
        y: i32,
        rng: &mut R,
    ) -> bool {
        let roll: f32 = rng.gen();
        if roll >= rule.probability() {
            return false;
        }
        self.potential(rule, x, y) && self.fits(board, rule, x, y)
    }

    /// Apply the replace grid. Every source pixel is read before any cell is written.
    pub fn enforce<R: Rng + ?Sized>(
        &self,
        board: &mut Board,
        rule: &Rule,
        x: i32,
        y: i32,
        rng: &mut R,
    ) {
        let mut staged: [[Option<Color>; RULE_SIZE]; RULE_SIZE] = [[None; RULE_SIZE]; RULE_SIZE];

        for (row, staged_row) in staged.iter_mut().enumerate() {
            let py = y + row as i32;
            if !(0..HEIGHT as i32).contains(&py) {
                continue;
            }
            for (col, slot) in staged_row.iter_mut().enumerate() {
                let px = x + col as i32;
                if !(0..WIDTH as i32).contains(&px) {
                    continue;
                }
                *slot = match rule.replace_term(col, row) {
                    ReplaceTerm::Keep => None,
                    ReplaceTerm::Set(color) => Some(color),
                    ReplaceTerm::Copy { dx, dy } => {
                        Some(board.get(px + dx as i32, py + dy as i32))
                    }
                    ReplaceTerm::CopyEdited { dx, dy, dr, dg, db } => Some(
                        board
                            .get(px + dx as i32, py + dy as i32)
                            .offset_channels(dr, dg, db),
                    ),
                    ReplaceTerm::RandomMember(id) => {
                        let members = self.identities.members(id);
                        if members.is_empty() {
                            None
                        } else {
                            Some(members[rng.gen_range(0..members.len())])
                        }
                    }
                };
            }
        }

        for (row, staged_row) in staged.iter().enumerate() {
            for (col, slot) in staged_row.iter().enumerate() {
                if let Some(color) = *slot {
                    board.set(x + col as i32, y + row as i32, color);
                }
            }
        }
    }
}
