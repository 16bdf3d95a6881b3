//! Mirrored-rule synthesis.
//!
//! A reflected rule swaps column `i` with `4 - i` (x) and/or row `j` with `4 - j` (y), and
//! negates the matching component of every pixel-reference offset in its replace grid.

use crate::model::{Grid, MatchTerm, Mirror, ReplaceTerm, Rule, RuleSource, RULE_SIZE};

const LAST: usize = RULE_SIZE - 1;

/// Build the reflection of `rule` on the axes named by `mirror`.
pub fn reflect(rule: &Rule, mirror: Mirror) -> Rule {
    let (flip_x, flip_y) = match mirror {
        Mirror::None => return rule.clone(),
        Mirror::X => (true, false),
        Mirror::Y => (false, true),
        Mirror::XY => (true, true),
    };

    let mut match_grid: Grid<MatchTerm> = [[MatchTerm::Wildcard; RULE_SIZE]; RULE_SIZE];
    let mut replace_grid: Grid<ReplaceTerm> = [[ReplaceTerm::Keep; RULE_SIZE]; RULE_SIZE];

    for row in 0..RULE_SIZE {
        let src_row = if flip_y { LAST - row } else { row };
        for col in 0..RULE_SIZE {
            let src_col = if flip_x { LAST - col } else { col };
            match_grid[row][col] = rule.match_term(src_col, src_row);
            replace_grid[row][col] = rule.replace_term(src_col, src_row).reflected(flip_x, flip_y);
        }
    }

    let source = RuleSource {
        mirror,
        ..rule.source().clone()
    };
    Rule::new(match_grid, replace_grid, rule.probability(), source)
}

/// The base rule followed by the mirrors its directive asked for: x, then y, then xy
/// when both markers are present.
pub fn synthesize(base: Rule, flip_x: bool, flip_y: bool) -> Vec<Rule> {
    let mut out = Vec::with_capacity(4);
    if flip_x {
        out.push(reflect(&base, Mirror::X));
    }
    if flip_y {
        out.push(reflect(&base, Mirror::Y));
    }
    if flip_x && flip_y {
        out.push(reflect(&base, Mirror::XY));
    }
    out.insert(0, base);
    out
}
