//! Color, identity and rule data model
//!
//! Everything here is built once while rule files load and read-only afterwards,
//! except identity membership which only ever grows during loading.

pub mod color;
pub mod identity;
pub mod keybind;
pub mod rule;

pub use color::{Color, BACKGROUND};
pub use identity::{Identity, IdentityRef, IdentityRegistry};
pub use keybind::KeyBindRegistry;
pub use rule::{Grid, MatchTerm, Mirror, ReplaceTerm, Rule, RuleSet, RuleSource, RULE_SIZE};
