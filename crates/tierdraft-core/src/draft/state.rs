// Draft session state machine: Setup -> Drafting -> Complete.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pick::{DraftPick, PickOrigin, PickOutcome};
use super::schedule::{build_schedule, DraftPattern, PickSlot};
use super::team::Team;
use crate::catalog::{Captain, Player, Position};
use crate::error::DraftError;

/// Overall phase of a draft session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DraftPhase {
    /// No schedule, no rosters.
    #[default]
    Setup,
    /// Schedule fixed, cursor inside it.
    Drafting,
    /// Cursor at the end of the schedule. Terminal until reset.
    Complete,
}

impl fmt::Display for DraftPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftPhase::Setup => "setup",
            DraftPhase::Drafting => "drafting",
            DraftPhase::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// The complete state of one draft.
///
/// Mutated only through `initialize`, `submit_pick` and `reset`; every
/// rejected call leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftSession {
    phase: DraftPhase,
    teams: Vec<Team>,
    schedule: Vec<PickSlot>,
    /// 0-based index into `schedule` of the pick on the clock.
    cursor: usize,
    /// Team index controlled by the human. `None` means every pick is
    /// externally submitted (pure simulation).
    human_team: Option<usize>,
    pattern: Option<DraftPattern>,
    picks: Vec<DraftPick>,
}

impl DraftSession {
    /// A session in the Setup phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a draft: one empty team per captain (in the given order), a
    /// fixed schedule, and the cursor on the first pick.
    ///
    /// `rounds` must fit the position slots: each team fills one slot per
    /// round, so more rounds than positions could never complete.
    pub fn initialize(
        &mut self,
        captains: &[Captain],
        positions: &[Position],
        rounds: usize,
        pattern: DraftPattern,
        human_team: Option<usize>,
    ) -> Result<(), DraftError> {
        if self.phase != DraftPhase::Setup {
            return Err(DraftError::InvalidConfiguration {
                message: format!("cannot start a draft while {}; reset first", self.phase),
            });
        }
        if rounds > positions.len() {
            return Err(DraftError::InvalidConfiguration {
                message: format!(
                    "{rounds} rounds exceed the {} position slots per team",
                    positions.len()
                ),
            });
        }
        if let Some(idx) = human_team {
            if idx >= captains.len() {
                return Err(DraftError::InvalidConfiguration {
                    message: format!("human team {idx} out of range for {} teams", captains.len()),
                });
            }
        }

        let schedule = build_schedule(captains.len(), rounds, pattern)?;

        self.teams = captains
            .iter()
            .map(|c| Team::new(c.clone(), positions))
            .collect();
        self.schedule = schedule;
        self.cursor = 0;
        self.human_team = human_team;
        self.pattern = Some(pattern);
        self.picks.clear();
        self.phase = DraftPhase::Drafting;

        info!(
            "Draft started: {} teams, {} rounds, {} pattern, {} picks, human team {:?}",
            self.teams.len(),
            rounds,
            pattern,
            self.schedule.len(),
            human_team
        );
        Ok(())
    }

    /// Discard rosters, schedule, cursor and human control; back to Setup.
    pub fn reset(&mut self) {
        if self.phase != DraftPhase::Setup {
            info!("Draft reset after {} picks", self.picks.len());
        }
        *self = Self::new();
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, team_idx: usize) -> Option<&Team> {
        self.teams.get(team_idx)
    }

    pub fn schedule(&self) -> &[PickSlot] {
        &self.schedule
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn human_team(&self) -> Option<usize> {
        self.human_team
    }

    pub fn pattern(&self) -> Option<DraftPattern> {
        self.pattern
    }

    /// The schedule entry on the clock, or `None` unless drafting.
    pub fn current_slot(&self) -> Option<PickSlot> {
        if self.phase != DraftPhase::Drafting {
            return None;
        }
        self.schedule.get(self.cursor).copied()
    }

    /// Team index on the clock, or `None` unless drafting.
    pub fn current_team_index(&self) -> Option<usize> {
        self.current_slot().map(|slot| slot.team_idx)
    }

    pub fn current_round(&self) -> Option<usize> {
        self.current_slot().map(|slot| slot.round)
    }

    /// 1-based number of the pick on the clock.
    pub fn pick_number(&self) -> Option<usize> {
        self.current_slot().map(|_| self.cursor + 1)
    }

    pub fn total_picks(&self) -> usize {
        self.schedule.len()
    }

    /// Whether a team is driven by the AI policy. Only true in AI-assisted
    /// mode, for every team but the human's.
    pub fn is_ai_team(&self, team_idx: usize) -> bool {
        matches!(self.human_team, Some(human) if human != team_idx)
    }

    /// Whether the team on the clock is AI-controlled.
    pub fn is_ai_turn(&self) -> bool {
        self.current_team_index()
            .is_some_and(|idx| self.is_ai_team(idx))
    }

    /// Whether the team on the clock accepts externally submitted picks.
    pub fn is_human_turn(&self) -> bool {
        self.current_team_index().is_some() && !self.is_ai_turn()
    }

    /// Position ids still open on a team. Empty unless drafting.
    pub fn available_positions(&self, team_idx: usize) -> Vec<&str> {
        if self.phase != DraftPhase::Drafting {
            return Vec::new();
        }
        self.teams
            .get(team_idx)
            .map(|t| t.open_positions())
            .unwrap_or_default()
    }

    /// Every player on any roster, team by team.
    pub fn all_drafted_players(&self) -> Vec<&Player> {
        self.teams.iter().flat_map(|t| t.players()).collect()
    }

    pub fn drafted_ids(&self) -> HashSet<&str> {
        self.teams
            .iter()
            .flat_map(|t| t.players())
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn is_drafted(&self, player_id: &str) -> bool {
        self.teams
            .iter()
            .flat_map(|t| t.players())
            .any(|p| p.id == player_id)
    }

    /// Apply a pick for the team on the clock.
    ///
    /// Outside the Drafting phase this is a silent no-op
    /// (`PickOutcome::Ignored`). Otherwise the pick is validated in full
    /// before anything changes:
    /// - external picks only for a non-AI team, AI picks only for an AI team
    /// - the player must not already be on any roster
    /// - the team must have a slot for the player's position, and it must be
    ///   empty
    pub fn submit_pick(
        &mut self,
        player: &Player,
        origin: PickOrigin,
    ) -> Result<PickOutcome, DraftError> {
        let Some(slot) = self.current_slot() else {
            debug!("Ignoring pick of {} while {}", player.id, self.phase);
            return Ok(PickOutcome::Ignored);
        };
        let team_idx = slot.team_idx;

        let ai_team = self.is_ai_team(team_idx);
        let allowed = match origin {
            PickOrigin::External => !ai_team,
            PickOrigin::Ai => ai_team,
        };
        if !allowed {
            if origin == PickOrigin::Ai {
                warn!("AI pick submitted for non-AI team {}", team_idx);
            }
            return Err(DraftError::NotYourTurn { team_idx });
        }

        if self.is_drafted(&player.id) {
            return Err(DraftError::AlreadyDrafted {
                player_id: player.id.clone(),
            });
        }

        let team = &self.teams[team_idx];
        match team.slot(&player.position) {
            None => {
                return Err(DraftError::UnknownPosition {
                    position: player.position.clone(),
                })
            }
            Some(existing) if existing.player.is_some() => {
                if origin == PickOrigin::Ai {
                    warn!(
                        "AI pick {} hit occupied {} slot on team {}",
                        player.id, player.position, team_idx
                    );
                }
                return Err(DraftError::PositionOccupied {
                    position: player.position.clone(),
                });
            }
            Some(_) => {}
        }

        self.teams[team_idx].fill(player.clone());

        let pick = DraftPick {
            pick_number: self.cursor + 1,
            round: slot.round,
            team_idx,
            player_id: player.id.clone(),
            position: player.position.clone(),
            origin,
        };
        info!(
            "Pick #{} (round {}): {} -> {} [{}]",
            pick.pick_number,
            pick.round + 1,
            player.name,
            self.teams[team_idx].captain.name,
            player.position
        );
        self.picks.push(pick.clone());

        self.cursor += 1;
        if self.cursor >= self.schedule.len() {
            self.phase = DraftPhase::Complete;
            info!("Draft complete after {} picks", self.picks.len());
        }

        Ok(PickOutcome::Accepted(pick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{test_catalog, Catalog};

    fn start(catalog: &Catalog, pattern: DraftPattern, human: Option<usize>) -> DraftSession {
        let mut session = DraftSession::new();
        session
            .initialize(
                catalog.captains(),
                catalog.positions(),
                catalog.positions().len(),
                pattern,
                human,
            )
            .unwrap();
        session
    }

    fn player<'a>(catalog: &'a Catalog, id: &str) -> &'a Player {
        catalog.player(id).unwrap()
    }

    /// First undrafted player with an open slot on the team on the clock.
    fn any_legal_pick<'a>(catalog: &'a Catalog, session: &DraftSession) -> &'a Player {
        let team_idx = session.current_team_index().unwrap();
        let open = session.available_positions(team_idx);
        catalog
            .players()
            .iter()
            .find(|p| !session.is_drafted(&p.id) && open.contains(&p.position.as_str()))
            .unwrap()
    }

    #[test]
    fn new_session_is_setup() {
        let session = DraftSession::new();
        assert_eq!(session.phase(), DraftPhase::Setup);
        assert_eq!(session.current_team_index(), None);
        assert!(session.teams().is_empty());
        assert_eq!(session.total_picks(), 0);
        assert!(session.available_positions(0).is_empty());
    }

    #[test]
    fn initialize_builds_empty_teams_and_schedule() {
        let catalog = test_catalog();
        let session = start(&catalog, DraftPattern::Snake, Some(2));

        assert_eq!(session.phase(), DraftPhase::Drafting);
        assert_eq!(session.teams().len(), 5);
        assert!(session.teams().iter().all(|t| t.filled_count() == 0));
        assert_eq!(session.team(3).unwrap().captain.id, "cap4");
        assert_eq!(session.total_picks(), 20);
        assert_eq!(session.current_team_index(), Some(0));
        assert_eq!(session.pick_number(), Some(1));
        assert_eq!(session.current_round(), Some(0));
        assert_eq!(session.human_team(), Some(2));
        assert_eq!(session.pattern(), Some(DraftPattern::Snake));
    }

    #[test]
    fn initialize_rejects_bad_configuration() {
        let catalog = test_catalog();
        let mut session = DraftSession::new();

        let err = session
            .initialize(catalog.captains(), catalog.positions(), 5, DraftPattern::Snake, None)
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidConfiguration { .. }));

        let err = session
            .initialize(catalog.captains(), catalog.positions(), 0, DraftPattern::Snake, None)
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidConfiguration { .. }));

        let err = session
            .initialize(&[], catalog.positions(), 4, DraftPattern::Snake, None)
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidConfiguration { .. }));

        let err = session
            .initialize(catalog.captains(), catalog.positions(), 4, DraftPattern::Snake, Some(5))
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidConfiguration { .. }));

        assert_eq!(session.phase(), DraftPhase::Setup);
    }

    #[test]
    fn initialize_twice_requires_reset() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);
        let err = session
            .initialize(catalog.captains(), catalog.positions(), 4, DraftPattern::Linear, None)
            .unwrap_err();
        assert!(matches!(err, DraftError::InvalidConfiguration { .. }));
        assert_eq!(session.pattern(), Some(DraftPattern::Snake));
    }

    #[test]
    fn accepted_pick_fills_slot_and_advances() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);

        let outcome = session
            .submit_pick(player(&catalog, "mid1"), PickOrigin::External)
            .unwrap();
        match outcome {
            PickOutcome::Accepted(pick) => {
                assert_eq!(pick.pick_number, 1);
                assert_eq!(pick.team_idx, 0);
                assert_eq!(pick.round, 0);
                assert_eq!(pick.player_id, "mid1");
            }
            PickOutcome::Ignored => panic!("pick should be accepted"),
        }

        assert_eq!(session.team(0).unwrap().occupant("MID").unwrap().id, "mid1");
        assert_eq!(session.available_positions(0), vec!["TOP", "ADC", "SUP"]);
        assert_eq!(session.current_team_index(), Some(1));
        assert_eq!(session.pick_number(), Some(2));
        assert!(session.is_drafted("mid1"));
        assert_eq!(session.picks().len(), 1);
    }

    #[test]
    fn occupied_position_rejected_without_change() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);

        // Team 0 takes MID in round 1; snake brings team 0 back at pick 10.
        session
            .submit_pick(player(&catalog, "mid1"), PickOrigin::External)
            .unwrap();
        // Fillers come from the back of the catalog so MID players stay free.
        for _ in 0..8 {
            let team_idx = session.current_team_index().unwrap();
            let open = session.available_positions(team_idx);
            let p = catalog
                .players()
                .iter()
                .rev()
                .find(|p| !session.is_drafted(&p.id) && open.contains(&p.position.as_str()))
                .unwrap()
                .clone();
            session.submit_pick(&p, PickOrigin::External).unwrap();
        }
        assert_eq!(session.current_team_index(), Some(0));
        let picks_before = session.picks().len();

        let mid = catalog
            .players()
            .iter()
            .find(|p| p.position == "MID" && !session.is_drafted(&p.id))
            .unwrap();
        let err = session.submit_pick(mid, PickOrigin::External).unwrap_err();
        assert_eq!(
            err,
            DraftError::PositionOccupied {
                position: "MID".into()
            }
        );
        assert_eq!(session.team(0).unwrap().occupant("MID").unwrap().id, "mid1");
        assert_eq!(session.picks().len(), picks_before);
        assert_eq!(session.current_team_index(), Some(0));
    }

    #[test]
    fn drafted_player_cannot_be_picked_again() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);
        session
            .submit_pick(player(&catalog, "top1"), PickOrigin::External)
            .unwrap();

        let err = session
            .submit_pick(player(&catalog, "top1"), PickOrigin::External)
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::AlreadyDrafted {
                player_id: "top1".into()
            }
        );
        assert_eq!(session.current_team_index(), Some(1));
        assert_eq!(session.team(1).unwrap().filled_count(), 0);
    }

    #[test]
    fn position_outside_slot_set_rejected() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);
        let jungler = Player {
            id: "jgl1".into(),
            name: "Oner".into(),
            team: "T1".into(),
            position: "JGL".into(),
        };
        let err = session.submit_pick(&jungler, PickOrigin::External).unwrap_err();
        assert_eq!(
            err,
            DraftError::UnknownPosition {
                position: "JGL".into()
            }
        );
        assert_eq!(session.pick_number(), Some(1));
    }

    #[test]
    fn external_pick_gated_to_human_team() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, Some(1));

        assert!(session.is_ai_turn());
        let err = session
            .submit_pick(player(&catalog, "top1"), PickOrigin::External)
            .unwrap_err();
        assert_eq!(err, DraftError::NotYourTurn { team_idx: 0 });
        assert!(!session.is_drafted("top1"));

        session
            .submit_pick(player(&catalog, "top1"), PickOrigin::Ai)
            .unwrap();
        assert!(session.is_human_turn());
        session
            .submit_pick(player(&catalog, "top2"), PickOrigin::External)
            .unwrap();
    }

    #[test]
    fn ai_pick_rejected_on_human_turn() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, Some(0));
        let err = session
            .submit_pick(player(&catalog, "top1"), PickOrigin::Ai)
            .unwrap_err();
        assert_eq!(err, DraftError::NotYourTurn { team_idx: 0 });
    }

    #[test]
    fn simulation_mode_accepts_external_for_every_team() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Linear, None);
        for _ in 0..5 {
            assert!(session.is_human_turn());
            assert!(!session.is_ai_turn());
            let p = any_legal_pick(&catalog, &session).clone();
            session.submit_pick(&p, PickOrigin::External).unwrap();
        }
        // AI never drives a team in simulation mode.
        let p = any_legal_pick(&catalog, &session).clone();
        assert!(session.submit_pick(&p, PickOrigin::Ai).is_err());
    }

    #[test]
    fn completes_after_all_picks() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);

        for n in 0..20 {
            assert_eq!(session.phase(), DraftPhase::Drafting, "pick {n}");
            let p = any_legal_pick(&catalog, &session).clone();
            assert!(session
                .submit_pick(&p, PickOrigin::External)
                .unwrap()
                .is_accepted());
        }

        assert_eq!(session.phase(), DraftPhase::Complete);
        assert_eq!(session.current_team_index(), None);
        assert_eq!(session.pick_number(), None);
        assert!(session.teams().iter().all(Team::is_full));
        assert_eq!(session.all_drafted_players().len(), 20);
        assert_eq!(session.drafted_ids().len(), 20);
        assert!(session.available_positions(0).is_empty());

        let pick_numbers: Vec<usize> = session.picks().iter().map(|p| p.pick_number).collect();
        assert_eq!(pick_numbers, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn submit_outside_drafting_is_ignored() {
        let catalog = test_catalog();
        let mut session = DraftSession::new();
        assert_eq!(
            session
                .submit_pick(player(&catalog, "top1"), PickOrigin::External)
                .unwrap(),
            PickOutcome::Ignored
        );

        let mut session = start(&catalog, DraftPattern::Snake, None);
        for _ in 0..20 {
            let p = any_legal_pick(&catalog, &session).clone();
            session.submit_pick(&p, PickOrigin::External).unwrap();
        }
        let undrafted = Player {
            id: "late".into(),
            name: "Latecomer".into(),
            team: "T9".into(),
            position: "TOP".into(),
        };
        assert_eq!(
            session.submit_pick(&undrafted, PickOrigin::External).unwrap(),
            PickOutcome::Ignored
        );
        assert_eq!(session.picks().len(), 20);
    }

    #[test]
    fn snake_schedule_drives_turns() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, None);
        let mut order = Vec::new();
        while let Some(idx) = session.current_team_index() {
            order.push(idx);
            let p = any_legal_pick(&catalog, &session).clone();
            session.submit_pick(&p, PickOrigin::External).unwrap();
        }
        assert_eq!(&order[..11], &[0, 1, 2, 3, 4, 4, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn reset_returns_to_setup_and_is_idempotent() {
        let catalog = test_catalog();
        let mut session = start(&catalog, DraftPattern::Snake, Some(3));
        session
            .submit_pick(player(&catalog, "sup1"), PickOrigin::Ai)
            .unwrap();

        session.reset();
        let once = serde_json::to_value(&session).unwrap();
        session.reset();
        let twice = serde_json::to_value(&session).unwrap();

        assert_eq!(once, twice);
        assert_eq!(session.phase(), DraftPhase::Setup);
        assert!(session.teams().is_empty());
        assert!(session.picks().is_empty());
        assert_eq!(session.human_team(), None);
        assert_eq!(session.current_team_index(), None);
        assert!(!session.is_drafted("sup1"));
    }

    #[test]
    fn fewer_rounds_than_positions() {
        let catalog = test_catalog();
        let mut session = DraftSession::new();
        session
            .initialize(catalog.captains(), catalog.positions(), 2, DraftPattern::Linear, None)
            .unwrap();
        for _ in 0..10 {
            let p = any_legal_pick(&catalog, &session).clone();
            session.submit_pick(&p, PickOrigin::External).unwrap();
        }
        assert_eq!(session.phase(), DraftPhase::Complete);
        assert!(session.teams().iter().all(|t| t.filled_count() == 2));
    }
}
