// Roster catalog: players, draftable positions, and team captains.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::names::NameOverrides;

/// A draftable player. Reference data, never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Team-of-origin label.
    pub team: String,
    /// Position id (e.g. "TOP", "MID").
    pub position: String,
}

/// A roster slot kind. Display order only; carries no drafting semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub name: String,
}

/// A team anchor. Captains never occupy a position slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Captain {
    pub id: String,
    pub name: String,
}

/// On-disk shape of the catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    players: Vec<Player>,
    positions: Vec<Position>,
    captains: Vec<Captain>,
}

/// Read-only reference data for a draft.
#[derive(Debug, Clone)]
pub struct Catalog {
    players: Vec<Player>,
    positions: Vec<Position>,
    captains: Vec<Captain>,
    player_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and empty position/captain sets.
    pub fn new(
        players: Vec<Player>,
        positions: Vec<Position>,
        captains: Vec<Captain>,
    ) -> Result<Self, CatalogError> {
        if positions.is_empty() {
            return Err(CatalogError::Empty { kind: "positions" });
        }
        if captains.is_empty() {
            return Err(CatalogError::Empty { kind: "captains" });
        }

        let mut player_index = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            if player_index.insert(player.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "player",
                    id: player.id.clone(),
                });
            }
        }
        check_unique("position", positions.iter().map(|p| p.id.as_str()))?;
        check_unique("captain", captains.iter().map(|c| c.id.as_str()))?;

        Ok(Catalog {
            players,
            positions,
            captains,
            player_index,
        })
    }

    /// Parse a catalog from its JSON text. `path` is only used for errors.
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(text).map_err(|e| CatalogError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::new(file.players, file.positions, file.captains)
    }

    /// Load the catalog JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|_| CatalogError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        Self::from_json_str(&text, path)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn captains(&self) -> &[Captain] {
        &self.captains
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.player_index.get(id).map(|&idx| &self.players[idx])
    }

    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    /// Display label for a position id, falling back to the id itself.
    pub fn position_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.position(id).map(|p| p.name.as_str()).unwrap_or(id)
    }

    /// Players matching a position filter (`None` = all positions) whose
    /// display name contains `search`, case-insensitively.
    pub fn filter_players<'a>(
        &'a self,
        position: Option<&str>,
        search: &str,
        names: &'a NameOverrides,
    ) -> Vec<&'a Player> {
        let needle = search.to_lowercase();
        self.players
            .iter()
            .filter(|p| position.map_or(true, |pos| p.position == pos))
            .filter(|p| names.display_name(p).to_lowercase().contains(&needle))
            .collect()
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Small catalog used across the crate's unit tests: five captains, four
/// positions, and five players per position.
#[cfg(test)]
pub(crate) fn test_catalog() -> Catalog {
    let positions: Vec<Position> = ["TOP", "MID", "ADC", "SUP"]
        .iter()
        .map(|id| Position {
            id: id.to_string(),
            name: id.to_string(),
        })
        .collect();

    let mut players = Vec::new();
    for pos in &positions {
        for n in 1..=5 {
            players.push(Player {
                id: format!("{}{}", pos.id.to_lowercase(), n),
                name: format!("{} Player {}", pos.name, n),
                team: format!("Club {}", n),
                position: pos.id.clone(),
            });
        }
    }

    let captains = (1..=5)
        .map(|i| Captain {
            id: format!("cap{i}"),
            name: format!("Captain {i}"),
        })
        .collect();

    Catalog::new(players, positions, captains).expect("test catalog is valid")
}
