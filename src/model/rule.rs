//! Rule Data Model
//!
//! A rule is a 5x5 match template, a 5x5 replace template and a firing probability.
//! Grids are indexed `[row][col]`; the footprint is anchored at its top-left cell.

use super::color::Color;
use super::identity::IdentityRef;
use rand::Rng;
use std::fmt;

/// Edge length of a rule footprint.
pub const RULE_SIZE: usize = 5;

pub type Grid<T> = [[T; RULE_SIZE]; RULE_SIZE];

/// One cell of a match template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchTerm {
    /// Matches anything, including cells past the board edge.
    Wildcard,
    Exact(Color),
    Member(IdentityRef),
}

impl MatchTerm {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, MatchTerm::Wildcard)
    }
}

/// One cell of a replace template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplaceTerm {
    Keep,
    Set(Color),
    /// Copy the pixel `(dx, dy)` away from this cell.
    Copy { dx: i8, dy: i8 },
    /// Copy as above, then shift each channel by a signed delta.
    CopyEdited { dx: i8, dy: i8, dr: i8, dg: i8, db: i8 },
    /// Any current member of the identity, picked at enforcement time.
    RandomMember(IdentityRef),
}

impl ReplaceTerm {
    /// Same term with its offset reflected on the requested axes.
    pub fn reflected(self, flip_x: bool, flip_y: bool) -> Self {
        let fx = |d: i8| if flip_x { d.wrapping_neg() } else { d };
        let fy = |d: i8| if flip_y { d.wrapping_neg() } else { d };
        match self {
            ReplaceTerm::Copy { dx, dy } => ReplaceTerm::Copy { dx: fx(dx), dy: fy(dy) },
            ReplaceTerm::CopyEdited { dx, dy, dr, dg, db } => ReplaceTerm::CopyEdited {
                dx: fx(dx),
                dy: fy(dy),
                dr,
                dg,
                db,
            },
            other => other,
        }
    }
}

/// Which reflection produced a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mirror {
    #[default]
    None,
    X,
    Y,
    XY,
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Mirror::None => "base",
            Mirror::X => "x-mirror",
            Mirror::Y => "y-mirror",
            Mirror::XY => "xy-mirror",
        };
        f.write_str(tag)
    }
}

/// Where a rule came from, for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RuleSource {
    pub file: String,
    /// Line of the `rule:` directive.
    pub line: usize,
    pub mirror: Mirror,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.mirror)
    }
}

/// A parsed rule. Immutable once built.
#[derive(Clone, Debug)]
pub struct Rule {
    match_grid: Grid<MatchTerm>,
    replace_grid: Grid<ReplaceTerm>,
    probability: f32,
    search_for: Vec<MatchTerm>,
    source: RuleSource,
}

impl Rule {
    /// `probability` is clamped into `[0, 1]`.
    pub fn new(
        match_grid: Grid<MatchTerm>,
        replace_grid: Grid<ReplaceTerm>,
        probability: f32,
        source: RuleSource,
    ) -> Self {
        let mut search_for: Vec<MatchTerm> = Vec::new();
        for term in match_grid.iter().flatten() {
            if !term.is_wildcard() && !search_for.contains(term) {
                search_for.push(*term);
            }
        }
        Rule {
            match_grid,
            replace_grid,
            probability: probability.clamp(0.0, 1.0),
            search_for,
            source,
        }
    }

    #[inline]
    pub fn match_term(&self, col: usize, row: usize) -> MatchTerm {
        self.match_grid[row][col]
    }

    #[inline]
    pub fn replace_term(&self, col: usize, row: usize) -> ReplaceTerm {
        self.replace_grid[row][col]
    }

    pub fn match_grid(&self) -> &Grid<MatchTerm> {
        &self.match_grid
    }

    pub fn replace_grid(&self) -> &Grid<ReplaceTerm> {
        &self.replace_grid
    }

    pub fn probability(&self) -> f32 {
        self.probability
    }

    /// Distinct non-wildcard match terms, in first-seen row-major order.
    pub fn search_for(&self) -> &[MatchTerm] {
        &self.search_for
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// True when every replace cell is `Keep`.
    pub fn is_inert(&self) -> bool {
        self.replace_grid
            .iter()
            .flatten()
            .all(|t| matches!(t, ReplaceTerm::Keep))
    }
}

/// Ordered rules plus the application-order permutation the scheduler walks.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    order: Vec<usize>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        let order = (0..rules.len()).collect();
        RuleSet { rules, order }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Rules in current application order.
    pub fn in_order(&self) -> impl Iterator<Item = &Rule> {
        self.order.iter().map(move |&i| &self.rules[i])
    }

    /// Swap two random slots of the permutation (may pick the same slot twice).
    pub fn swap_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.order.is_empty() {
            return;
        }
        let a = rng.gen_range(0..self.order.len());
        let b = rng.gen_range(0..self.order.len());
        self.order.swap(a, b);
    }
}
