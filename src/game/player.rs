//! Player state management.

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::game::Visibility;

/// Reserved name of the spectator, who never gets an identifier.
pub const SPECTATOR_NAME: &str = "spectator";

/// Opaque routing address supplied by the network layer.
///
/// Only ever compared by its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Wrap a stringified address.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// The address in string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Self(addr.to_owned())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State for a single player.
#[derive(Debug, Clone)]
pub struct Player {
    /// Name, unique within a game.
    name: String,
    /// One-letter identifier, assigned when the player joins.
    id: Option<char>,
    /// Current position, once placed on the map.
    pos: Option<usize>,
    /// Gold collected so far.
    gold: u32,
    /// Visibility from the current position.
    vision: Vec<Visibility>,
    /// Every position this player has ever seen (for rendering memory).
    discovered: HashSet<usize>,
    /// Where messages for this player are routed.
    address: Address,
}

impl Player {
    /// Create a player that has not joined a game yet.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<Address>) -> Self {
        Self {
            name: name.into(),
            id: None,
            pos: None,
            gold: 0,
            vision: Vec::new(),
            discovered: HashSet::new(),
            address: address.into(),
        }
    }

    /// Create the spectator.
    #[must_use]
    pub fn spectator(address: impl Into<Address>) -> Self {
        Self::new(SPECTATOR_NAME, address)
    }

    /// Player name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the spectator.
    #[must_use]
    pub fn is_spectator(&self) -> bool {
        self.name == SPECTATOR_NAME
    }

    /// One-letter identifier (`None` for the spectator or before joining).
    #[must_use]
    pub const fn id(&self) -> Option<char> {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn pos(&self) -> Option<usize> {
        self.pos
    }

    /// Gold collected so far.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Visibility from the current position.
    #[must_use]
    pub fn vision(&self) -> &[Visibility] {
        &self.vision
    }

    /// Routing address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Whether this player has ever seen `pos`.
    #[must_use]
    pub fn has_discovered(&self, pos: usize) -> bool {
        self.discovered.contains(&pos)
    }

    /// One line of the end-of-game summary.
    #[must_use]
    pub fn summarize(&self) -> String {
        format!("{} {:>10} {}\n", self.id.unwrap_or('?'), self.gold, self.name)
    }

    pub(crate) fn set_id(&mut self, id: char) {
        self.id = Some(id);
    }

    pub(crate) fn set_pos(&mut self, pos: Option<usize>) {
        self.pos = pos;
    }

    /// Add gold and return the new total.
    pub(crate) fn add_gold(&mut self, amount: u32) -> u32 {
        self.gold += amount;
        self.gold
    }

    /// Replace the vision and remember everything now visible.
    pub(crate) fn update_vision(&mut self, vision: Vec<Visibility>) {
        self.discovered.extend(
            vision
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v == Visibility::Visible)
                .map(|(pos, _)| pos),
        );
        self.vision = vision;
    }

    /// Forget everything seen, e.g. after the map is replaced.
    pub(crate) fn reset_vision(&mut self) {
        self.vision.clear();
        self.discovered.clear();
    }
}
