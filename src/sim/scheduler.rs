//! Scan Scheduler
//!
//! One iteration visits a strided subset of anchors, bottom row first, alternating
//! column direction between iterations. With stride `s` the phase cycles through all
//! `s * s` offsets, so over one cycle every anchor is visited exactly once.
//!
//! At each anchor the first rule (in the rule set's current permutation) that matches
//! is enforced. Writes are visible to later anchors within the same pass.

use super::board::{Board, HEIGHT, WIDTH};
use super::evaluator::Evaluator;
use crate::model::{RuleSet, RULE_SIZE};
use rand::Rng;
use tracing::trace;

/// Lowest anchor coordinate whose footprint still touches the board.
const MIN_ANCHOR: i32 = 1 - RULE_SIZE as i32;

#[derive(Clone, Debug)]
pub struct Scheduler {
    iterations: usize,
    stepping: usize,
    step: u64,
}

impl Scheduler {
    pub fn new(iterations: usize, stepping: usize) -> Self {
        Scheduler {
            iterations: iterations.max(1),
            stepping: stepping.max(1),
            step: 0,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Iterations needed for every anchor to be visited once.
    pub fn cycle_len(&self) -> usize {
        self.stepping * self.stepping
    }

    /// Passes run so far.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Anchors the next iteration will visit, in visiting order.
    pub fn scan_order(&self) -> Vec<(i32, i32)> {
        let s = self.stepping as i32;
        let k = (self.step % self.cycle_len() as u64) as i32;
        let (phase_x, phase_y) = (k % s, k / s);

        let mut columns: Vec<i32> = (MIN_ANCHOR..WIDTH as i32)
            .filter(|x| (x - MIN_ANCHOR) % s == phase_x)
            .collect();
        if self.step % 2 == 1 {
            columns.reverse();
        }

        (MIN_ANCHOR..HEIGHT as i32)
            .rev()
            .filter(|y| (y - MIN_ANCHOR) % s == phase_y)
            .flat_map(|y| columns.iter().map(move |&x| (x, y)))
            .collect()
    }

    /// One pass over the board, then two permutation slots swap. Returns rules applied.
    pub fn run_iteration<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        rules: &mut RuleSet,
        eval: &Evaluator<'_>,
        rng: &mut R,
    ) -> usize {
        let mut applied = 0;
        if !rules.is_empty() {
            for (x, y) in self.scan_order() {
                for rule in rules.in_order() {
                    if eval.matches(board, rule, x, y, rng) {
                        eval.enforce(board, rule, x, y, rng);
                        applied += 1;
                        break;
                    }
                }
            }
            rules.swap_random(rng);
        }
        trace!("[Scheduler] step {} applied {} rules", self.step, applied);
        self.step += 1;
        applied
    }

    /// All iterations of one frame. Region upkeep is the caller's job.
    pub fn run_frame<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        rules: &mut RuleSet,
        eval: &Evaluator<'_>,
        rng: &mut R,
    ) -> usize {
        (0..self.iterations)
            .map(|_| self.run_iteration(board, rules, eval, rng))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Color, IdentityRegistry, MatchTerm, ReplaceTerm, Rule, RuleSource, BACKGROUND,
    };
    use crate::sim::region::RegionIndex;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn every_anchor_once_per_cycle() {
        for stepping in 1..=3 {
            let mut sched = Scheduler::new(1, stepping);
            let mut seen: HashMap<(i32, i32), usize> = HashMap::new();
            for _ in 0..sched.cycle_len() {
                for anchor in sched.scan_order() {
                    *seen.entry(anchor).or_default() += 1;
                }
                sched.step += 1;
            }
            let expected = (WIDTH + RULE_SIZE - 1) * (HEIGHT + RULE_SIZE - 1);
            assert_eq!(seen.len(), expected, "stepping {}", stepping);
            assert!(seen.values().all(|&n| n == 1));
            assert!(seen.contains_key(&(-4, -4)) && seen.contains_key(&(79, 79)));
        }
    }

    #[test]
    fn scans_bottom_up_and_alternates_direction() {
        let mut sched = Scheduler::new(4, 2);
        let first = sched.scan_order();
        assert_eq!(first[0], (-4, 78));
        assert!(first.windows(2).all(|w| w[0].1 >= w[1].1));
        sched.step = 1;
        let second = sched.scan_order();
        assert_eq!(second[0], (79, 78));
        assert!(second[0].0 > second[1].0);
    }

    #[test]
    fn first_matching_rule_wins() {
        let black = Color::pack(0, 0, 0);
        let white = Color::pack(255, 255, 255);
        let paint = |color: Color| {
            let mut m = [[MatchTerm::Wildcard; RULE_SIZE]; RULE_SIZE];
            let mut r = [[ReplaceTerm::Keep; RULE_SIZE]; RULE_SIZE];
            m[2][2] = MatchTerm::Exact(BACKGROUND);
            r[2][2] = ReplaceTerm::Set(color);
            Rule::new(m, r, 1.0, RuleSource::default())
        };
        let mut rules = RuleSet::new(vec![paint(black), paint(white)]);
        let mut board = Board::new();
        let ids = IdentityRegistry::new();
        let regions = RegionIndex::from_board(&board);
        let eval = Evaluator::new(&ids, &regions);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut sched = Scheduler::new(4, 2);

        // Anchors whose center falls off the board never match.
        let applied = sched.run_iteration(&mut board, &mut rules, &eval, &mut rng);
        assert_eq!(applied, 40 * 40);
        assert_eq!(sched.step(), 1);
        assert_eq!(board.cells().filter(|&(_, _, c)| c == black).count(), applied);
        assert!(board.pixels().iter().all(|&c| c != white));

        let mut order = rules.order().to_vec();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn one_pass_rewrites_only_the_matching_cell() {
        let black = Color::pack(0, 0, 0);
        let mut m = [[MatchTerm::Wildcard; RULE_SIZE]; RULE_SIZE];
        let mut r = [[ReplaceTerm::Keep; RULE_SIZE]; RULE_SIZE];
        m[2][2] = MatchTerm::Exact(BACKGROUND);
        r[2][2] = ReplaceTerm::Set(black);
        let mut rules = RuleSet::new(vec![Rule::new(m, r, 1.0, RuleSource::default())]);

        // Only (32, 42) is background; its anchor (30, 40) is on the first pass's phase.
        let white = Color::pack(255, 255, 255);
        let mut board = Board::new();
        board.fill(white);
        board.set(32, 42, BACKGROUND);
        let before = board.clone();

        let ids = IdentityRegistry::new();
        let regions = RegionIndex::from_board(&board);
        let eval = Evaluator::new(&ids, &regions);
        let mut sched = Scheduler::new(1, 2);
        assert!(sched.scan_order().contains(&(30, 40)));
        let mut rng = SmallRng::seed_from_u64(13);
        let applied = sched.run_iteration(&mut board, &mut rules, &eval, &mut rng);

        assert_eq!(applied, 1);
        assert_eq!(board.get(32, 42), black);
        let changed = board
            .pixels()
            .iter()
            .zip(before.pixels())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn full_frame_covers_the_board() {
        let black = Color::pack(0, 0, 0);
        let mut m = [[MatchTerm::Wildcard; RULE_SIZE]; RULE_SIZE];
        let mut r = [[ReplaceTerm::Keep; RULE_SIZE]; RULE_SIZE];
        m[2][2] = MatchTerm::Exact(BACKGROUND);
        r[2][2] = ReplaceTerm::Set(black);
        let mut rules = RuleSet::new(vec![Rule::new(m, r, 1.0, RuleSource::default())]);

        let mut board = Board::new();
        let ids = IdentityRegistry::new();
        let regions = RegionIndex::from_board(&board);
        let eval = Evaluator::new(&ids, &regions);
        let mut sched = Scheduler::new(4, 2);
        let mut rng = SmallRng::seed_from_u64(12);
        let applied = sched.run_frame(&mut board, &mut rules, &eval, &mut rng);
        assert_eq!(applied, WIDTH * HEIGHT);
        assert!(board.pixels().iter().all(|&c| c == black));
    }
}
