//! Identity Registry
//!
//! Identities are named color sets ("solid", "liquid", ...). Names are interned to stable
//! indices while rules load; the evaluator only ever resolves by index.

use super::color::Color;
use std::collections::HashMap;

/// Stable handle to an interned identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityRef(u32);

impl IdentityRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named, ordered set of member colors.
#[derive(Clone, Debug)]
pub struct Identity {
    pub name: String,
    members: Vec<Color>,
}

impl Identity {
    pub fn members(&self) -> &[Color] {
        &self.members
    }
}

#[derive(Clone, Debug, Default)]
pub struct IdentityRegistry {
    identities: Vec<Identity>,
    by_name: HashMap<String, IdentityRef>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent by name. A first reference allocates the identity with zero members.
    pub fn get_or_create(&mut self, name: &str) -> IdentityRef {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = IdentityRef(self.identities.len() as u32);
        self.identities.push(Identity {
            name: name.to_string(),
            members: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// `None` means the name was never referenced, which is distinct from an empty identity.
    pub fn lookup(&self, name: &str) -> Option<IdentityRef> {
        self.by_name.get(name).copied()
    }

    /// Returns `false` when the color was already a member.
    pub fn add_member(&mut self, id: IdentityRef, color: Color) -> bool {
        let Some(identity) = self.identities.get_mut(id.index()) else {
            return false;
        };
        if identity.members.contains(&color) {
            return false;
        }
        identity.members.push(color);
        true
    }

    #[inline]
    pub fn is_member(&self, id: IdentityRef, color: Color) -> bool {
        self.members(id).contains(&color)
    }

    pub fn members(&self, id: IdentityRef) -> &[Color] {
        self.identities
            .get(id.index())
            .map(|identity| identity.members())
            .unwrap_or(&[])
    }

    pub fn get(&self, id: IdentityRef) -> Option<&Identity> {
        self.identities.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdentityRef, &Identity)> {
        self.identities
            .iter()
            .enumerate()
            .map(|(i, identity)| (IdentityRef(i as u32), identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_idempotent() {
        let mut reg = IdentityRegistry::new();
        let a = reg.get_or_create("solid");
        let b = reg.get_or_create("solid");
        let c = reg.get_or_create("liquid");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(c).map(|i| i.name.as_str()), Some("liquid"));
    }

    #[test]
    fn lookup_distinguishes_missing_from_empty() {
        let mut reg = IdentityRegistry::new();
        assert_eq!(reg.lookup("solid"), None);
        let solid = reg.get_or_create("solid");
        assert_eq!(reg.lookup("solid"), Some(solid));
        assert!(reg.members(solid).is_empty());
    }

    #[test]
    fn members_are_deduplicated_in_order() {
        let mut reg = IdentityRegistry::new();
        let solid = reg.get_or_create("solid");
        let red = Color::pack(255, 0, 0);
        let grey = Color::pack(90, 90, 90);
        assert!(reg.add_member(solid, red));
        assert!(reg.add_member(solid, grey));
        assert!(!reg.add_member(solid, red));
        assert_eq!(reg.members(solid), &[red, grey]);
        assert!(reg.is_member(solid, grey));
        assert!(!reg.is_member(solid, Color::pack(0, 0, 255)));
    }
}
