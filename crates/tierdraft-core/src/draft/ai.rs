// AI pick selection driven by the user's tier ranking.
//
// Tiers are walked best-first. The first tier with any eligible player wins,
// and the pick is drawn uniformly at random among that tier's eligible
// players: order inside a tier means nothing, so list position must not bias
// the choice. Unranked players are the last resort.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, error};

use super::state::DraftSession;
use super::team::Team;
use crate::catalog::{Catalog, Player};
use crate::error::DraftError;
use crate::tiers::TierList;

/// Pick a player for `team`, or `None` if no tier and no unranked player is
/// eligible.
///
/// A player id is eligible when it resolves in `catalog`, is not in
/// `drafted`, and its position is still open on `team`.
pub fn select_pick<'a, R: Rng + ?Sized>(
    team: &Team,
    drafted: &[&Player],
    tier_list: &TierList,
    catalog: &'a Catalog,
    rng: &mut R,
) -> Option<&'a Player> {
    if team.open_positions().is_empty() {
        return None;
    }
    let drafted_ids: HashSet<&str> = drafted.iter().map(|p| p.id.as_str()).collect();

    let eligible = |ids: &[String]| -> Vec<&'a Player> {
        ids.iter()
            .filter_map(|id| catalog.player(id))
            .filter(|p| !drafted_ids.contains(p.id.as_str()))
            .filter(|p| team.has_empty_slot(&p.position))
            .collect()
    };

    for (tier, members) in tier_list.ranked_groups() {
        let candidates = eligible(members);
        if let Some(&player) = candidates.choose(rng) {
            debug!(
                "AI pick for {}: {} from tier {} ({} candidates)",
                team.captain.name,
                player.id,
                tier.name,
                candidates.len()
            );
            return Some(player);
        }
    }

    let candidates = eligible(&tier_list.unranked);
    let player = candidates.choose(rng).copied();
    if let Some(p) = player {
        debug!(
            "AI pick for {}: {} from unranked ({} candidates)",
            team.captain.name,
            p.id,
            candidates.len()
        );
    }
    player
}

/// Choose the AI's pick for the team on the clock.
///
/// Returns `Ok(None)` when it is not an AI team's turn. An AI turn with no
/// eligible player anywhere is an integrity fault and comes back as
/// `DraftError::NoEligibleCandidate`.
pub fn next_ai_pick<R: Rng + ?Sized>(
    session: &DraftSession,
    tier_list: &TierList,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Option<Player>, DraftError> {
    if !session.is_ai_turn() {
        return Ok(None);
    }
    let Some(team_idx) = session.current_team_index() else {
        return Ok(None);
    };
    let Some(team) = session.team(team_idx) else {
        return Ok(None);
    };

    let drafted = session.all_drafted_players();
    match select_pick(team, &drafted, tier_list, catalog, rng) {
        Some(player) => Ok(Some(player.clone())),
        None => {
            error!(
                "No eligible candidate for team {} ({}); open positions {:?}",
                team_idx,
                team.captain.name,
                team.open_positions()
            );
            Err(DraftError::NoEligibleCandidate { team_idx })
        }
    }
}
