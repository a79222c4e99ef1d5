// User-supplied display name overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Player;

/// Player id -> display name. Consulted for display only; ids stay canonical
/// for matching and drafting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameOverrides(HashMap<String, String>);

impl NameOverrides {
    /// Set an override. Input is trimmed; blank input is ignored.
    ///
    /// Returns `true` if an override was stored.
    pub fn set(&mut self, player_id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.0.insert(player_id.to_string(), name.to_string());
        true
    }

    pub fn clear(&mut self, player_id: &str) -> bool {
        self.0.remove(player_id).is_some()
    }

    pub fn get(&self, player_id: &str) -> Option<&str> {
        self.0.get(player_id).map(String::as_str)
    }

    /// The override if present, otherwise the reference name.
    pub fn display_name<'a>(&'a self, player: &'a Player) -> &'a str {
        self.get(&player.id).unwrap_or(player.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
