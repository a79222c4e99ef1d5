// Tier ranking: an ordered list of tiers partitioning every player, plus an
// unranked bucket.
//
// Invariant: every catalog player id appears in exactly one member list
// (some tier, or unranked). Every mutation below preserves it; `normalize`
// repairs lists loaded from storage that were saved against an older catalog.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::TierError;

/// Color given to tiers created by `add_tier`.
pub const NEW_TIER_COLOR: &str = "#888888";

/// The starting S..D tiers: (id, name, color).
pub const DEFAULT_TIERS: [(&str, &str, &str); 5] = [
    ("tier-s", "S", "#ff7f7f"),
    ("tier-a", "A", "#ffbf7f"),
    ("tier-b", "B", "#ffdf7f"),
    ("tier-c", "C", "#7fff7f"),
    ("tier-d", "D", "#7fbfff"),
];

/// A priority bucket. Rank is the tier's index in `TierList::tiers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Persisted shape: `{tiers, tierPlayers, unrankedPlayers}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierList {
    /// Tiers in priority order, index 0 = best.
    pub tiers: Vec<Tier>,
    /// Tier id -> member player ids. Order within a tier carries no priority.
    #[serde(default)]
    pub tier_players: HashMap<String, Vec<String>>,
    #[serde(default, rename = "unrankedPlayers")]
    pub unranked: Vec<String>,
}

impl TierList {
    /// No tiers; every player unranked.
    pub fn all_unranked(catalog: &Catalog) -> Self {
        TierList {
            tiers: Vec::new(),
            tier_players: HashMap::new(),
            unranked: catalog.players().iter().map(|p| p.id.clone()).collect(),
        }
    }

    /// The default S/A/B/C/D tiers, all empty, every player unranked.
    pub fn with_default_tiers(catalog: &Catalog) -> Self {
        let tiers: Vec<Tier> = DEFAULT_TIERS
            .iter()
            .map(|(id, name, color)| Tier {
                id: id.to_string(),
                name: name.to_string(),
                color: color.to_string(),
            })
            .collect();
        let tier_players = tiers.iter().map(|t| (t.id.clone(), Vec::new())).collect();

        TierList {
            tiers,
            tier_players,
            unranked: catalog.players().iter().map(|p| p.id.clone()).collect(),
        }
    }

    /// Back to the default tiers with everyone unranked.
    pub fn reset(&mut self, catalog: &Catalog) {
        *self = Self::with_default_tiers(catalog);
    }

    pub fn tier(&self, tier_id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == tier_id)
    }

    /// Members of a tier. Unknown tiers and tiers without a list are empty.
    pub fn members(&self, tier_id: &str) -> &[String] {
        self.tier_players
            .get(tier_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Tiers in priority order with their members.
    pub fn ranked_groups(&self) -> impl Iterator<Item = (&Tier, &[String])> {
        self.tiers.iter().map(move |t| (t, self.members(&t.id)))
    }

    /// Whether at least one player sits in a tier.
    pub fn has_ranked_players(&self) -> bool {
        self.ranked_groups().any(|(_, members)| !members.is_empty())
    }

    /// The tier holding `player_id`, or `None` when unranked or unknown.
    pub fn tier_of(&self, player_id: &str) -> Option<&Tier> {
        self.ranked_groups()
            .find(|(_, members)| members.iter().any(|id| id == player_id))
            .map(|(tier, _)| tier)
    }

    /// Append a new empty tier named `Tier N`. Returns its id.
    pub fn add_tier(&mut self) -> String {
        let id = self.fresh_tier_id();
        let tier = Tier {
            id: id.clone(),
            name: format!("Tier {}", self.tiers.len() + 1),
            color: NEW_TIER_COLOR.to_string(),
        };
        debug!("Adding tier {} ({})", tier.name, tier.id);
        self.tiers.push(tier);
        self.tier_players.insert(id.clone(), Vec::new());
        id
    }

    /// Remove a tier; its members go back to unranked.
    pub fn remove_tier(&mut self, tier_id: &str) -> Result<(), TierError> {
        let idx = self.tier_index(tier_id)?;
        self.tiers.remove(idx);
        let members = self.tier_players.remove(tier_id).unwrap_or_default();
        debug!("Removed tier {}; {} players unranked", tier_id, members.len());
        self.unranked.extend(members);
        Ok(())
    }

    /// Rename a tier. A blank name keeps the current one.
    pub fn rename_tier(&mut self, tier_id: &str, name: &str) -> Result<(), TierError> {
        let idx = self.tier_index(tier_id)?;
        let name = name.trim();
        if !name.is_empty() {
            self.tiers[idx].name = name.to_string();
        }
        Ok(())
    }

    pub fn set_tier_color(&mut self, tier_id: &str, color: &str) -> Result<(), TierError> {
        let idx = self.tier_index(tier_id)?;
        self.tiers[idx].color = color.to_string();
        Ok(())
    }

    /// Move a player into a tier, out of wherever it was.
    pub fn assign_to_tier(
        &mut self,
        catalog: &Catalog,
        player_id: &str,
        tier_id: &str,
    ) -> Result<(), TierError> {
        self.tier_index(tier_id)?;
        check_player(catalog, player_id)?;

        self.detach(player_id);
        self.tier_players
            .entry(tier_id.to_string())
            .or_default()
            .push(player_id.to_string());
        Ok(())
    }

    /// Move a player out of every tier into unranked.
    pub fn move_to_unranked(&mut self, catalog: &Catalog, player_id: &str) -> Result<(), TierError> {
        check_player(catalog, player_id)?;
        for members in self.tier_players.values_mut() {
            members.retain(|id| id != player_id);
        }
        if !self.unranked.iter().any(|id| id == player_id) {
            self.unranked.push(player_id.to_string());
        }
        Ok(())
    }

    /// Repair the partition against `catalog`.
    ///
    /// Drops repeated tier ids (the first tier keeps the id), unknown player
    /// ids and duplicates (first occurrence in priority order wins), moves
    /// members of lists without a tier to unranked, and appends catalog
    /// players found nowhere to unranked. Returns whether anything changed.
    pub fn normalize(&mut self, catalog: &Catalog) -> bool {
        let before = self.clone();

        let mut tier_ids: HashSet<String> = HashSet::new();
        self.tiers.retain(|tier| tier_ids.insert(tier.id.clone()));

        let mut seen: HashSet<String> = HashSet::new();
        let keep = |id: &str, seen: &mut HashSet<String>| {
            catalog.player(id).is_some() && seen.insert(id.to_string())
        };

        let mut tier_players = HashMap::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let members: Vec<String> = self
                .tier_players
                .get(&tier.id)
                .map(|ids| ids.iter().filter(|id| keep(id.as_str(), &mut seen)).cloned().collect())
                .unwrap_or_default();
            tier_players.insert(tier.id.clone(), members);
        }

        let mut unranked: Vec<String> = self
            .unranked
            .iter()
            .filter(|id| keep(id.as_str(), &mut seen))
            .cloned()
            .collect();

        let mut orphan_keys: Vec<&String> = self
            .tier_players
            .keys()
            .filter(|k| !tier_players.contains_key(*k))
            .collect();
        orphan_keys.sort();
        for key in orphan_keys {
            for id in &self.tier_players[key] {
                if keep(id.as_str(), &mut seen) {
                    unranked.push(id.clone());
                }
            }
        }

        for player in catalog.players() {
            if keep(player.id.as_str(), &mut seen) {
                unranked.push(player.id.clone());
            }
        }

        self.tier_players = tier_players;
        self.unranked = unranked;

        let changed = *self != before;
        if changed {
            warn!("Tier list did not match the roster catalog and was repaired");
        }
        changed
    }

    /// Check that every catalog player appears in exactly one list and that
    /// no list references an unknown player or tier.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), TierError> {
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for (key, members) in &self.tier_players {
            if self.tier(key).is_none() && !members.is_empty() {
                return Err(broken(format!("members listed under unknown tier {key}")));
            }
            for id in members {
                *counts.entry(id.as_str()).or_default() += 1;
            }
        }
        for id in &self.unranked {
            *counts.entry(id.as_str()).or_default() += 1;
        }

        for (id, &count) in &counts {
            if catalog.player(id).is_none() {
                return Err(broken(format!("unknown player {id}")));
            }
            if count > 1 {
                return Err(broken(format!("player {id} listed {count} times")));
            }
        }
        if let Some(missing) = catalog
            .players()
            .iter()
            .find(|p| !counts.contains_key(p.id.as_str()))
        {
            return Err(broken(format!("player {} is missing", missing.id)));
        }
        Ok(())
    }

    fn tier_index(&self, tier_id: &str) -> Result<usize, TierError> {
        self.tiers
            .iter()
            .position(|t| t.id == tier_id)
            .ok_or_else(|| TierError::UnknownTier {
                tier_id: tier_id.to_string(),
            })
    }

    fn detach(&mut self, player_id: &str) {
        for members in self.tier_players.values_mut() {
            members.retain(|id| id != player_id);
        }
        self.unranked.retain(|id| id != player_id);
    }

    fn fresh_tier_id(&self) -> String {
        let base = chrono::Utc::now().timestamp_millis();
        let mut id = format!("tier-{base}");
        let mut suffix = 1;
        while self.tier(&id).is_some() || self.tier_players.contains_key(&id) {
            id = format!("tier-{base}-{suffix}");
            suffix += 1;
        }
        id
    }
}

fn check_player(catalog: &Catalog, player_id: &str) -> Result<(), TierError> {
    match catalog.player(player_id) {
        Some(_) => Ok(()),
        None => Err(TierError::UnknownPlayer {
            player_id: player_id.to_string(),
        }),
    }
}

fn broken(message: String) -> TierError {
    TierError::BrokenPartition { message }
}
