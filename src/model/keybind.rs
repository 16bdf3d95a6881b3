use super::color::Color;
use std::collections::HashMap;

/// Single character -> paint color, filled from element declarations.
/// Keys are stored uppercased so lookups are case-insensitive.
#[derive(Clone, Debug, Default)]
pub struct KeyBindRegistry {
    binds: HashMap<char, Color>,
}

impl KeyBindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A later declaration for the same key replaces the earlier one.
    pub fn bind(&mut self, key: char, color: Color) -> Option<Color> {
        self.binds.insert(key.to_ascii_uppercase(), color)
    }

    pub fn lookup(&self, key: char) -> Option<Color> {
        self.binds.get(&key.to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}
