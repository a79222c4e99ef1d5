// Messages between the front end and the application loop.

use thiserror::Error;
use tierdraft_core::{DraftPattern, DraftPhase, DraftPick, TierList};

use crate::config::DraftMode;

// ---------------------------------------------------------------------------
// Front end -> app
// ---------------------------------------------------------------------------

/// Commands sent from the front end to the application loop.
///
/// Captain indices are 0-based here; the text parser accepts 1-based numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    // Setup
    MoveCaptainUp(usize),
    MoveCaptainDown(usize),
    RepositionCaptain { from: usize, to: usize },
    SelectCaptain(String),
    ClearCaptain,
    SetPattern(DraftPattern),
    SetMode(DraftMode),
    Start,

    // Drafting
    Pick { player_id: String },
    Reset,

    // Tier list editing (setup only)
    AddTier,
    RemoveTier { tier_id: String },
    RenameTier { tier_id: String, name: String },
    SetTierColor { tier_id: String, color: String },
    AssignTier { player_id: String, tier_id: String },
    Unrank { player_id: String },
    ResetTiers,

    // Display names
    RenamePlayer { player_id: String, name: String },
    ClearPlayerName { player_id: String },

    // Queries
    ListPlayers { position: Option<String>, search: String },
    ShowTiers,
    Status,

    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one line of front-end input.
pub fn parse_command(line: &str) -> Result<UserCommand, ParseCommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ParseCommandError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("up", [n]) => UserCommand::MoveCaptainUp(captain_number(n, "up <captain #>")?),
        ("up", _) => return Err(ParseCommandError::Usage("up <captain #>")),
        ("down", [n]) => UserCommand::MoveCaptainDown(captain_number(n, "down <captain #>")?),
        ("down", _) => return Err(ParseCommandError::Usage("down <captain #>")),
        ("move", [from, to]) => UserCommand::RepositionCaptain {
            from: captain_number(from, "move <from #> <to #>")?,
            to: captain_number(to, "move <from #> <to #>")?,
        },
        ("move", _) => return Err(ParseCommandError::Usage("move <from #> <to #>")),
        ("captain", ["none"]) => UserCommand::ClearCaptain,
        ("captain", [id]) => UserCommand::SelectCaptain(id.to_string()),
        ("captain", _) => return Err(ParseCommandError::Usage("captain <captain id>|none")),
        ("pattern", [p]) => UserCommand::SetPattern(
            DraftPattern::from_str_pattern(p)
                .ok_or(ParseCommandError::Usage("pattern snake|linear"))?,
        ),
        ("pattern", _) => return Err(ParseCommandError::Usage("pattern snake|linear")),
        ("mode", [m]) => UserCommand::SetMode(match m.to_lowercase().as_str() {
            "mock" => DraftMode::Mock,
            "simulation" | "sim" => DraftMode::Simulation,
            _ => return Err(ParseCommandError::Usage("mode mock|simulation")),
        }),
        ("mode", _) => return Err(ParseCommandError::Usage("mode mock|simulation")),
        ("start", []) => UserCommand::Start,
        ("pick", [id]) => UserCommand::Pick {
            player_id: id.to_string(),
        },
        ("pick", _) => return Err(ParseCommandError::Usage("pick <player id>")),
        ("reset", []) => UserCommand::Reset,

        ("tier", ["add"]) => UserCommand::AddTier,
        ("tier", ["remove", id]) => UserCommand::RemoveTier {
            tier_id: id.to_string(),
        },
        ("tier", ["rename", id, name @ ..]) => UserCommand::RenameTier {
            tier_id: id.to_string(),
            name: name.join(" "),
        },
        ("tier", ["color", id, color]) => UserCommand::SetTierColor {
            tier_id: id.to_string(),
            color: color.to_string(),
        },
        ("tier", _) => {
            return Err(ParseCommandError::Usage(
                "tier add | tier remove <id> | tier rename <id> <name> | tier color <id> <#rrggbb>",
            ))
        }
        ("tiers", []) => UserCommand::ShowTiers,
        ("tiers", ["reset"]) => UserCommand::ResetTiers,
        ("rank", [player, tier]) => UserCommand::AssignTier {
            player_id: player.to_string(),
            tier_id: tier.to_string(),
        },
        ("rank", _) => return Err(ParseCommandError::Usage("rank <player id> <tier id>")),
        ("unrank", [player]) => UserCommand::Unrank {
            player_id: player.to_string(),
        },
        ("unrank", _) => return Err(ParseCommandError::Usage("unrank <player id>")),

        ("name", [player, name @ ..]) if !name.is_empty() => UserCommand::RenamePlayer {
            player_id: player.to_string(),
            name: name.join(" "),
        },
        ("name", _) => return Err(ParseCommandError::Usage("name <player id> <display name>")),
        ("unname", [player]) => UserCommand::ClearPlayerName {
            player_id: player.to_string(),
        },
        ("unname", _) => return Err(ParseCommandError::Usage("unname <player id>")),

        ("players", []) => UserCommand::ListPlayers {
            position: None,
            search: String::new(),
        },
        ("players", [position, search @ ..]) => UserCommand::ListPlayers {
            position: (!position.eq_ignore_ascii_case("all")).then(|| position.to_uppercase()),
            search: search.join(" "),
        },
        ("status", []) => UserCommand::Status,
        ("quit" | "exit", []) => UserCommand::Quit,
        _ => return Err(ParseCommandError::Unknown(line.trim().to_string())),
    };
    Ok(cmd)
}

fn captain_number(arg: &str, usage: &'static str) -> Result<usize, ParseCommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(ParseCommandError::Usage(usage)),
    }
}

// ---------------------------------------------------------------------------
// App -> front end
// ---------------------------------------------------------------------------

/// Updates pushed from the application loop to the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Full state after any change.
    Snapshot(Box<DraftSnapshot>),
    /// A pick was applied.
    PickMade(Box<PickInfo>),
    /// The draft reached its last pick.
    DraftComplete,
    /// A command was refused; nothing changed.
    Rejected(String),
    /// Non-fatal problem worth showing (e.g. a failed save).
    Warning(String),
    PlayerList(Vec<PlayerRow>),
    Tiers(Box<TierList>),
    /// The draft cannot continue until it is reset.
    Fatal(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickInfo {
    pub pick: DraftPick,
    pub player_name: String,
    pub captain_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptainEntry {
    pub id: String,
    pub name: String,
    pub human: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub position: String,
    pub player_id: Option<String>,
    /// Display name (custom name if set).
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSnapshot {
    pub captain_name: String,
    pub slots: Vec<SlotSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftSnapshot {
    pub phase: DraftPhase,
    pub mode: DraftMode,
    pub pattern: DraftPattern,
    /// Setup order; fixed once drafting.
    pub captains: Vec<CaptainEntry>,
    /// Empty during setup.
    pub teams: Vec<TeamSnapshot>,
    pub on_the_clock: Option<usize>,
    /// 0-based.
    pub round: Option<usize>,
    /// 1-based.
    pub pick_number: Option<usize>,
    pub total_picks: usize,
    pub human_turn: bool,
    /// Open positions of the team on the clock.
    pub available_positions: Vec<String>,
    pub halted: bool,
}

impl DraftSnapshot {
    /// Player ids on any roster.
    pub fn drafted_ids(&self) -> Vec<&str> {
        self.teams
            .iter()
            .flat_map(|t| t.slots.iter())
            .filter_map(|s| s.player_id.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub tier: Option<String>,
    pub drafted: bool,
}
