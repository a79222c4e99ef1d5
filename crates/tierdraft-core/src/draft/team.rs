// A captain's team and its position slots.

use serde::{Deserialize, Serialize};

use crate::catalog::{Captain, Player, Position};

/// A single position slot on a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSlot {
    /// Position id this slot accepts.
    pub position: String,
    /// The player occupying this slot, if any.
    pub player: Option<Player>,
}

/// A captain plus one slot per draftable position.
///
/// Slots are filled at most once; nothing but a full draft reset clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub captain: Captain,
    pub slots: Vec<TeamSlot>,
}

impl Team {
    /// An empty team with slots in the given position display order.
    pub fn new(captain: Captain, positions: &[Position]) -> Self {
        let slots = positions
            .iter()
            .map(|p| TeamSlot {
                position: p.id.clone(),
                player: None,
            })
            .collect();
        Team { captain, slots }
    }

    pub fn slot(&self, position: &str) -> Option<&TeamSlot> {
        self.slots.iter().find(|s| s.position == position)
    }

    /// The player in a position slot, if filled.
    pub fn occupant(&self, position: &str) -> Option<&Player> {
        self.slot(position).and_then(|s| s.player.as_ref())
    }

    pub fn has_empty_slot(&self, position: &str) -> bool {
        self.slots
            .iter()
            .any(|s| s.position == position && s.player.is_none())
    }

    /// Position ids still open, in display order.
    pub fn open_positions(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| s.player.is_none())
            .map(|s| s.position.as_str())
            .collect()
    }

    /// Players on this team, in slot order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().filter_map(|s| s.player.as_ref())
    }

    pub fn filled_count(&self) -> usize {
        self.players().count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.player.is_some())
    }

    /// Place a player in the empty slot for its position.
    ///
    /// Returns `false` without touching the team if there is no such slot or
    /// it is already occupied.
    pub(crate) fn fill(&mut self, player: Player) -> bool {
        match self
            .slots
            .iter_mut()
            .find(|s| s.position == player.position && s.player.is_none())
        {
            Some(slot) => {
                slot.player = Some(player);
                true
            }
            None => false,
        }
    }
}
