// Error types shared by the draft engine.

use std::path::PathBuf;

use thiserror::Error;

/// Rejections and integrity faults raised by the draft session and sequencer.
///
/// `NotYourTurn`, `PositionOccupied`, `AlreadyDrafted` and `UnknownPosition`
/// reject a single submission and leave the session untouched.
/// `NoEligibleCandidate` and `InvalidConfiguration` mean something upstream is
/// broken and should be surfaced as hard failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("it is not your turn (team {team_idx} is on the clock)")]
    NotYourTurn { team_idx: usize },

    #[error("position {position} is already filled")]
    PositionOccupied { position: String },

    #[error("player {player_id} has already been drafted")]
    AlreadyDrafted { player_id: String },

    #[error("position {position} is not a draftable slot")]
    UnknownPosition { position: String },

    #[error("unknown player: {player_id}")]
    UnknownPlayer { player_id: String },

    #[error("unknown captain: {captain_id}")]
    UnknownCaptain { captain_id: String },

    #[error("no eligible candidate for team {team_idx}")]
    NoEligibleCandidate { team_idx: usize },

    #[error("invalid draft configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("draft order is locked once the draft has started")]
    OrderLocked,
}

/// Failures from tier list edits and partition checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    #[error("unknown tier: {tier_id}")]
    UnknownTier { tier_id: String },

    #[error("unknown player: {player_id}")]
    UnknownPlayer { player_id: String },

    #[error("tier partition is broken: {message}")]
    BrokenPartition { message: String },
}

/// Failures while loading or validating the roster catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse catalog {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("catalog has no {kind}")]
    Empty { kind: &'static str },
}
