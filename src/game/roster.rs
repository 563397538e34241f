//! Name-keyed player registry that iterates in join order.

use std::collections::HashMap;

use crate::game::{Address, Player};

/// Players keyed by name, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Names in insertion order.
    order: Vec<String>,
    /// Players by name.
    players: HashMap<String, Player>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered players, spectator included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no one is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(name)
    }

    /// Look up a player by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    /// Look up a player by name for mutation.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.get_mut(name)
    }

    /// Find the player routed at `address` by linear scan.
    #[must_use]
    pub fn find_by_address(&self, address: &Address) -> Option<&Player> {
        self.iter().find(|p| p.address().as_str() == address.as_str())
    }

    /// Find the player drawn with identifier `id`.
    #[must_use]
    pub fn find_by_id(&self, id: char) -> Option<&Player> {
        self.iter().find(|p| p.id() == Some(id))
    }

    /// Find the player standing on `pos`.
    #[must_use]
    pub fn find_at(&self, pos: usize) -> Option<&Player> {
        self.iter().find(|p| p.pos() == Some(pos))
    }

    /// Iterate over players in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|name| self.players.get(name))
    }

    /// Mutable access to every player, in no particular order.
    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.values_mut()
    }

    /// Insert a player. Returns `false`, leaving the roster unchanged, if
    /// the name is taken.
    pub(crate) fn insert(&mut self, player: Player) -> bool {
        if self.contains(player.name()) {
            return false;
        }
        self.order.push(player.name().to_owned());
        self.players.insert(player.name().to_owned(), player);
        true
    }

    /// Remove and return a player.
    pub(crate) fn remove(&mut self, name: &str) -> Option<Player> {
        let player = self.players.remove(name)?;
        self.order.retain(|n| n != name);
        Some(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut roster = Roster::new();
        for name in ["zed", "amy", "mia"] {
            assert!(roster.insert(Player::new(name, name)));
        }
        let names: Vec<&str> = roster.iter().map(Player::name).collect();
        assert_eq!(names, vec!["zed", "amy", "mia"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut roster = Roster::new();
        assert!(roster.insert(Player::new("amy", "a")));
        assert!(!roster.insert(Player::new("amy", "b")));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("amy").unwrap().address().as_str(), "a");
    }

    #[test]
    fn test_find_by_address() {
        let mut roster = Roster::new();
        assert!(roster.insert(Player::new("amy", "1.2.3.4:5")));
        assert!(roster.insert(Player::new("bo", "1.2.3.4:6")));

        let found = roster.find_by_address(&Address::new("1.2.3.4:6")).unwrap();
        assert_eq!(found.name(), "bo");
        assert!(roster.find_by_address(&Address::new("9.9.9.9:1")).is_none());
    }

    #[test]
    fn test_find_by_id() {
        let mut roster = Roster::new();
        let mut amy = Player::new("amy", "a");
        amy.set_id('A');
        assert!(roster.insert(amy));
        assert!(roster.insert(Player::spectator("s")));

        assert_eq!(roster.find_by_id('A').unwrap().name(), "amy");
        assert!(roster.find_by_id('B').is_none());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut roster = Roster::new();
        for name in ["a", "b", "c"] {
            assert!(roster.insert(Player::new(name, name)));
        }
        assert!(roster.remove("b").is_some());
        assert!(roster.remove("b").is_none());
        let names: Vec<&str> = roster.iter().map(Player::name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
