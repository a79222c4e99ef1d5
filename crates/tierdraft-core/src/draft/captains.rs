// Pre-draft captain ordering and human-controlled captain selection.

use serde::{Deserialize, Serialize};

use crate::catalog::Captain;
use crate::error::DraftError;

/// The draft order of captains, editable during setup.
///
/// Always a permutation of the catalog's captains. Index 0 picks first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptainOrder {
    order: Vec<Captain>,
    /// Captain id of the human-controlled team, if one is selected.
    human: Option<String>,
}

impl CaptainOrder {
    pub fn new(captains: &[Captain]) -> Self {
        CaptainOrder {
            order: captains.to_vec(),
            human: None,
        }
    }

    pub fn captains(&self) -> &[Captain] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Swap with the previous captain. No-op at the top or out of range.
    pub fn move_up(&mut self, index: usize) {
        if index == 0 || index >= self.order.len() {
            return;
        }
        self.order.swap(index - 1, index);
    }

    /// Swap with the next captain. No-op at the bottom or out of range.
    pub fn move_down(&mut self, index: usize) {
        if index + 1 >= self.order.len() {
            return;
        }
        self.order.swap(index, index + 1);
    }

    /// Move the captain at `from` to `to`, shifting the others.
    pub fn reposition(&mut self, from: usize, to: usize) {
        if from == to || from >= self.order.len() || to >= self.order.len() {
            return;
        }
        let captain = self.order.remove(from);
        self.order.insert(to, captain);
    }

    /// Mark a captain as human-controlled.
    pub fn select_human(&mut self, captain_id: &str) -> Result<(), DraftError> {
        if !self.order.iter().any(|c| c.id == captain_id) {
            return Err(DraftError::UnknownCaptain {
                captain_id: captain_id.to_string(),
            });
        }
        self.human = Some(captain_id.to_string());
        Ok(())
    }

    pub fn clear_human(&mut self) {
        self.human = None;
    }

    pub fn human_captain(&self) -> Option<&str> {
        self.human.as_deref()
    }

    /// Current index of the human-controlled captain in the order.
    pub fn human_index(&self) -> Option<usize> {
        let id = self.human.as_deref()?;
        self.order.iter().position(|c| c.id == id)
    }
}
