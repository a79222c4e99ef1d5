// Application state and orchestration logic.
//
// The central event loop owns every piece of draft state and is its only
// writer. It handles commands from the front end and the delayed AI picks it
// schedules for itself, and pushes updates back to the front end.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tierdraft_core::draft::ai::next_ai_pick;
use tierdraft_core::store::{save_name_overrides, save_tier_list};
use tierdraft_core::{
    CaptainOrder, Catalog, DraftError, DraftPattern, DraftPhase, DraftPick, DraftSession,
    NameOverrides, PickOrigin, PickOutcome, StateStore, TierError, TierList,
};

use crate::config::{Config, DraftMode};
use crate::protocol::{
    CaptainEntry, DraftSnapshot, PickInfo, PlayerRow, SlotSnapshot, TeamSnapshot, UiUpdate,
    UserCommand,
};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Fired by a scheduled AI task when its delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiTick {
    pub generation: u64,
}

/// Shared handle to the key/value store.
pub type SharedStore = Arc<dyn StateStore + Send + Sync>;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub tier_list: TierList,
    pub names: NameOverrides,
    pub store: SharedStore,
    /// Captain order and human selection, edited during setup.
    pub order: CaptainOrder,
    pub mode: DraftMode,
    pub pattern: DraftPattern,
    pub session: DraftSession,
    pub rng: ChaCha8Rng,
    pub pending_ai: Option<JoinHandle<()>>,
    /// Identifies the most recently scheduled AI pick. Bumped on every
    /// schedule and cancel; ticks carrying any other value are discarded.
    pub ai_generation: u64,
    /// Scheduled AI tasks report back through a clone of this sender.
    pub ai_tx: mpsc::Sender<AiTick>,
    /// Set when the AI could not find a candidate. No AI picks are scheduled
    /// until the next reset.
    pub halted: bool,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Catalog,
        tier_list: TierList,
        names: NameOverrides,
        store: SharedStore,
        ai_tx: mpsc::Sender<AiTick>,
    ) -> Self {
        let rng = match config.draft.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let order = CaptainOrder::new(catalog.captains());

        AppState {
            mode: config.draft.mode,
            pattern: config.draft.pattern,
            config,
            catalog,
            tier_list,
            names,
            store,
            order,
            session: DraftSession::new(),
            rng,
            pending_ai: None,
            ai_generation: 0,
            ai_tx,
            halted: false,
        }
    }

    fn in_setup(&self) -> bool {
        self.session.phase() == DraftPhase::Setup
    }

    fn require_setup(&self) -> Result<(), DraftError> {
        if self.in_setup() {
            Ok(())
        } else {
            Err(DraftError::OrderLocked)
        }
    }

    // -- setup --------------------------------------------------------------

    pub fn move_captain_up(&mut self, index: usize) -> Result<(), DraftError> {
        self.require_setup()?;
        self.order.move_up(index);
        Ok(())
    }

    pub fn move_captain_down(&mut self, index: usize) -> Result<(), DraftError> {
        self.require_setup()?;
        self.order.move_down(index);
        Ok(())
    }

    pub fn reposition_captain(&mut self, from: usize, to: usize) -> Result<(), DraftError> {
        self.require_setup()?;
        self.order.reposition(from, to);
        Ok(())
    }

    pub fn select_captain(&mut self, captain_id: &str) -> Result<(), DraftError> {
        self.require_setup()?;
        self.order.select_human(captain_id)
    }

    pub fn clear_captain(&mut self) -> Result<(), DraftError> {
        self.require_setup()?;
        self.order.clear_human();
        Ok(())
    }

    pub fn set_pattern(&mut self, pattern: DraftPattern) -> Result<(), DraftError> {
        self.require_setup()?;
        self.pattern = pattern;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: DraftMode) -> Result<(), DraftError> {
        self.require_setup()?;
        self.mode = mode;
        Ok(())
    }

    /// Freeze the captain order and start the draft.
    ///
    /// Mock drafts need a human captain; simulations have none.
    pub fn start_draft(&mut self) -> Result<(), DraftError> {
        let human_team = match self.mode {
            DraftMode::Simulation => None,
            DraftMode::Mock => {
                Some(
                    self.order
                        .human_index()
                        .ok_or_else(|| DraftError::UnknownCaptain {
                            captain_id: "none selected".into(),
                        })?,
                )
            }
        };
        let rounds = self
            .config
            .draft
            .rounds
            .unwrap_or(self.catalog.positions().len());

        self.session.initialize(
            self.order.captains(),
            self.catalog.positions(),
            rounds,
            self.pattern,
            human_team,
        )?;
        self.halted = false;

        if self.mode == DraftMode::Mock && !self.tier_list.has_ranked_players() {
            warn!("Mock draft started with no ranked players; AI picks will be random");
        }
        Ok(())
    }

    // -- drafting -----------------------------------------------------------

    /// Submit a pick by player id on behalf of the human (or anyone, in a
    /// simulation).
    pub fn submit_external_pick(&mut self, player_id: &str) -> Result<PickOutcome, DraftError> {
        let player = self
            .catalog
            .player(player_id)
            .ok_or_else(|| DraftError::UnknownPlayer {
                player_id: player_id.to_string(),
            })?
            .clone();
        self.session.submit_pick(&player, PickOrigin::External)
    }

    /// Act on an AI timer event.
    ///
    /// Returns `Ok(None)` for stale or out-of-turn ticks. An AI turn with no
    /// eligible candidate halts the draft.
    pub fn handle_ai_tick(&mut self, tick: AiTick) -> Result<Option<PickOutcome>, DraftError> {
        if tick.generation != self.ai_generation {
            debug!(
                "Discarding stale AI tick (gen {}, current {})",
                tick.generation, self.ai_generation
            );
            return Ok(None);
        }
        self.pending_ai = None;

        if self.halted || !self.session.is_ai_turn() {
            debug!("AI tick arrived outside an AI turn, ignoring");
            return Ok(None);
        }

        let choice = match next_ai_pick(&self.session, &self.tier_list, &self.catalog, &mut self.rng)
        {
            Ok(choice) => choice,
            Err(e) => {
                self.halted = true;
                return Err(e);
            }
        };
        match choice {
            Some(player) => self.session.submit_pick(&player, PickOrigin::Ai).map(Some),
            None => Ok(None),
        }
    }

    /// Schedule the AI's pick if an AI team is on the clock, replacing any
    /// pick already scheduled.
    pub fn schedule_ai_pick(&mut self) {
        self.cancel_ai_pick();
        if self.halted || !self.session.is_ai_turn() {
            return;
        }

        let generation = self.ai_generation;
        let delay = Duration::from_millis(self.config.draft.ai_pick_delay_ms);
        let tx = self.ai_tx.clone();
        self.pending_ai = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AiTick { generation }).await;
        }));
        debug!("Scheduled AI pick (gen {}) in {:?}", generation, delay);
    }

    /// Abort the scheduled AI pick, if any, and invalidate its tick.
    pub fn cancel_ai_pick(&mut self) {
        if let Some(handle) = self.pending_ai.take() {
            handle.abort();
            debug!("Cancelled pending AI pick (gen {})", self.ai_generation);
        }
        self.ai_generation += 1;
    }

    /// Back to setup. Rosters and the human captain selection go; captain
    /// order and tier list stay.
    pub fn reset(&mut self) {
        self.cancel_ai_pick();
        self.session.reset();
        self.order.clear_human();
        self.halted = false;
    }

    // -- tier list and names ------------------------------------------------

    /// Apply a tier list edit. The ranking is locked while a draft runs.
    pub fn edit_tiers<F>(&mut self, edit: F) -> Result<(), String>
    where
        F: FnOnce(&mut TierList, &Catalog) -> Result<(), TierError>,
    {
        if !self.in_setup() {
            return Err("the tier list is locked while a draft is in progress".into());
        }
        edit(&mut self.tier_list, &self.catalog).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Persist the tier list. Failures are logged and reported, not fatal.
    pub fn save_tiers(&self) -> Option<String> {
        save_tier_list(self.store.as_ref(), &self.tier_list)
            .map_err(|e| {
                error!("Failed to save tier list: {e:#}");
                format!("tier list not saved: {e}")
            })
            .err()
    }

    pub fn save_names(&self) -> Option<String> {
        save_name_overrides(self.store.as_ref(), &self.names)
            .map_err(|e| {
                error!("Failed to save custom names: {e:#}");
                format!("custom names not saved: {e}")
            })
            .err()
    }

    // -- read model ---------------------------------------------------------

    pub fn build_snapshot(&self) -> DraftSnapshot {
        let human = self.order.human_captain();
        let captains = self
            .order
            .captains()
            .iter()
            .map(|c| CaptainEntry {
                id: c.id.clone(),
                name: c.name.clone(),
                human: human == Some(c.id.as_str()),
            })
            .collect();

        let teams = self
            .session
            .teams()
            .iter()
            .map(|team| TeamSnapshot {
                captain_name: team.captain.name.clone(),
                slots: team
                    .slots
                    .iter()
                    .map(|slot| SlotSnapshot {
                        position: slot.position.clone(),
                        player_id: slot.player.as_ref().map(|p| p.id.clone()),
                        player_name: slot
                            .player
                            .as_ref()
                            .map(|p| self.names.display_name(p).to_string()),
                    })
                    .collect(),
            })
            .collect();

        let on_the_clock = self.session.current_team_index();
        let available_positions = on_the_clock
            .map(|idx| {
                self.session
                    .available_positions(idx)
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        DraftSnapshot {
            phase: self.session.phase(),
            mode: self.mode,
            pattern: self.session.pattern().unwrap_or(self.pattern),
            captains,
            teams,
            on_the_clock,
            round: self.session.current_round(),
            pick_number: self.session.pick_number(),
            total_picks: self.session.total_picks(),
            human_turn: self.session.is_human_turn(),
            available_positions,
            halted: self.halted,
        }
    }

    /// Catalog players matching a position filter and name search.
    pub fn player_rows(&self, position: Option<&str>, search: &str) -> Vec<PlayerRow> {
        self.catalog
            .filter_players(position, search, &self.names)
            .into_iter()
            .map(|p| PlayerRow {
                id: p.id.clone(),
                name: self.names.display_name(p).to_string(),
                team: p.team.clone(),
                position: p.position.clone(),
                tier: self.tier_list.tier_of(&p.id).map(|t| t.name.clone()),
                drafted: self.session.is_drafted(&p.id),
            })
            .collect()
    }

    fn pick_info(&self, pick: &DraftPick) -> PickInfo {
        let player_name = self
            .catalog
            .player(&pick.player_id)
            .map(|p| self.names.display_name(p).to_string())
            .unwrap_or_else(|| pick.player_id.clone());
        let captain_name = self
            .session
            .team(pick.team_idx)
            .map(|t| t.captain.name.clone())
            .unwrap_or_default();
        PickInfo {
            pick: pick.clone(),
            player_name,
            captain_name,
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the front end
/// 2. AI timer ticks from tasks spawned by `schedule_ai_pick`
///
/// Pushes UI updates through `ui_tx`.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut ai_rx: mpsc::Receiver<AiTick>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // `state` holds a sender, so this channel never closes while we run.
            Some(tick) = ai_rx.recv() => {
                handle_ai_tick(&mut state, tick, &ui_tx).await;
            }
        }
    }

    state.cancel_ai_pick();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;
}

async fn reject(ui_tx: &mpsc::Sender<UiUpdate>, message: String) {
    let _ = ui_tx.send(UiUpdate::Rejected(message)).await;
}

/// Report an applied pick, then either announce completion or line up the
/// next AI pick.
async fn after_pick(state: &mut AppState, outcome: PickOutcome, ui_tx: &mpsc::Sender<UiUpdate>) {
    let PickOutcome::Accepted(pick) = outcome else {
        return;
    };
    let info = state.pick_info(&pick);
    let _ = ui_tx.send(UiUpdate::PickMade(Box::new(info))).await;

    if state.session.phase() == DraftPhase::Complete {
        let _ = ui_tx.send(UiUpdate::DraftComplete).await;
    } else {
        state.schedule_ai_pick();
    }
    send_snapshot(state, ui_tx).await;
}

async fn handle_ai_tick(state: &mut AppState, tick: AiTick, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.handle_ai_tick(tick) {
        Ok(Some(outcome)) => after_pick(state, outcome, ui_tx).await,
        Ok(None) => {}
        Err(e @ DraftError::NoEligibleCandidate { .. }) => {
            error!("Draft halted: {e}");
            state.cancel_ai_pick();
            let _ = ui_tx
                .send(UiUpdate::Fatal(format!("{e}; reset to continue")))
                .await;
            send_snapshot(state, ui_tx).await;
        }
        Err(e) => {
            // The policy only offers open positions and undrafted players.
            error!("AI pick rejected: {e}");
            state.halted = true;
            let _ = ui_tx.send(UiUpdate::Fatal(format!("AI pick rejected: {e}"))).await;
        }
    }
}

/// Handle a user command from the front end.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    // Setup edits that only need a fresh snapshot on success.
    let setup_result = match &cmd {
        UserCommand::MoveCaptainUp(idx) => Some(state.move_captain_up(*idx)),
        UserCommand::MoveCaptainDown(idx) => Some(state.move_captain_down(*idx)),
        UserCommand::RepositionCaptain { from, to } => {
            Some(state.reposition_captain(*from, *to))
        }
        UserCommand::SelectCaptain(id) => Some(state.select_captain(id)),
        UserCommand::ClearCaptain => Some(state.clear_captain()),
        UserCommand::SetPattern(pattern) => Some(state.set_pattern(*pattern)),
        UserCommand::SetMode(mode) => Some(state.set_mode(*mode)),
        _ => None,
    };
    if let Some(result) = setup_result {
        match result {
            Ok(()) => send_snapshot(state, ui_tx).await,
            Err(e) => reject(ui_tx, e.to_string()).await,
        }
        return;
    }

    match cmd {
        UserCommand::Start => match state.start_draft() {
            Ok(()) => {
                send_snapshot(state, ui_tx).await;
                state.schedule_ai_pick();
            }
            Err(e) => {
                warn!("Draft start rejected: {e}");
                reject(ui_tx, e.to_string()).await;
            }
        },
        UserCommand::Pick { player_id } => match state.submit_external_pick(&player_id) {
            Ok(PickOutcome::Ignored) => {
                reject(ui_tx, format!("no draft in progress ({})", state.session.phase())).await;
            }
            Ok(outcome) => after_pick(state, outcome, ui_tx).await,
            Err(e) => {
                debug!("Pick of {} rejected: {}", player_id, e);
                reject(ui_tx, e.to_string()).await;
            }
        },
        UserCommand::Reset => {
            state.reset();
            send_snapshot(state, ui_tx).await;
        }

        UserCommand::AddTier => {
            let mut added = None;
            let result = state.edit_tiers(|tiers, _| {
                added = Some(tiers.add_tier());
                Ok(())
            });
            if let Some(id) = added {
                info!("Added tier {id}");
            }
            finish_tier_edit(state, result, ui_tx).await;
        }
        UserCommand::RemoveTier { tier_id } => {
            let result = state.edit_tiers(|tiers, _| tiers.remove_tier(&tier_id));
            finish_tier_edit(state, result, ui_tx).await;
        }
        UserCommand::RenameTier { tier_id, name } => {
            let result = state.edit_tiers(|tiers, _| tiers.rename_tier(&tier_id, &name));
            finish_tier_edit(state, result, ui_tx).await;
        }
        UserCommand::SetTierColor { tier_id, color } => {
            let result = state.edit_tiers(|tiers, _| tiers.set_tier_color(&tier_id, &color));
            finish_tier_edit(state, result, ui_tx).await;
        }
        UserCommand::AssignTier { player_id, tier_id } => {
            let result = state.edit_tiers(|tiers, catalog| {
                tiers.assign_to_tier(catalog, &player_id, &tier_id)
            });
            finish_tier_edit(state, result, ui_tx).await;
        }
        UserCommand::Unrank { player_id } => {
            let result =
                state.edit_tiers(|tiers, catalog| tiers.move_to_unranked(catalog, &player_id));
            finish_tier_edit(state, result, ui_tx).await;
        }
        UserCommand::ResetTiers => {
            let result = state.edit_tiers(|tiers, catalog| {
                tiers.reset(catalog);
                Ok(())
            });
            finish_tier_edit(state, result, ui_tx).await;
        }

        UserCommand::RenamePlayer { player_id, name } => {
            if state.catalog.player(&player_id).is_none() {
                reject(ui_tx, DraftError::UnknownPlayer { player_id }.to_string()).await;
                return;
            }
            if !state.names.set(&player_id, &name) {
                reject(ui_tx, "display name cannot be blank".into()).await;
                return;
            }
            finish_name_edit(state, ui_tx).await;
        }
        UserCommand::ClearPlayerName { player_id } => {
            if state.names.clear(&player_id) {
                finish_name_edit(state, ui_tx).await;
            }
        }

        UserCommand::ListPlayers { position, search } => {
            let rows = state.player_rows(position.as_deref(), &search);
            let _ = ui_tx.send(UiUpdate::PlayerList(rows)).await;
        }
        UserCommand::ShowTiers => {
            let _ = ui_tx
                .send(UiUpdate::Tiers(Box::new(state.tier_list.clone())))
                .await;
        }
        UserCommand::Status => send_snapshot(state, ui_tx).await,

        // Setup edits are handled above; Quit in the main loop.
        _ => {}
    }
}

async fn finish_tier_edit(
    state: &AppState,
    result: Result<(), String>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if let Err(message) = result {
        reject(ui_tx, message).await;
        return;
    }
    if let Some(warning) = state.save_tiers() {
        let _ = ui_tx.send(UiUpdate::Warning(warning)).await;
    }
    let _ = ui_tx
        .send(UiUpdate::Tiers(Box::new(state.tier_list.clone())))
        .await;
}

async fn finish_name_edit(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Some(warning) = state.save_names() {
        let _ = ui_tx.send(UiUpdate::Warning(warning)).await;
    }
    send_snapshot(state, ui_tx).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
