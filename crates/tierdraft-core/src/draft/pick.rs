// Individual pick representation.

use serde::{Deserialize, Serialize};

/// Who submitted a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickOrigin {
    /// Submitted from outside the engine (the human, or any team in a pure
    /// simulation).
    External,
    /// Produced by the AI selection policy.
    Ai,
}

/// A completed pick, as recorded in the session's pick log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    /// 1-based overall pick number.
    pub pick_number: usize,
    /// 0-based round.
    pub round: usize,
    pub team_idx: usize,
    pub player_id: String,
    pub position: String,
    pub origin: PickOrigin,
}

/// Result of a pick submission that did not fail validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The pick was applied and the cursor advanced.
    Accepted(DraftPick),
    /// The session was not drafting; nothing changed.
    Ignored,
}

impl PickOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PickOutcome::Accepted(_))
    }
}
