// Pick order computation for snake and linear drafts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DraftError;

/// Direction pattern of the pick order across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftPattern {
    /// Direction reverses every round: 1→5, 5→1, 1→5, ...
    #[default]
    Snake,
    /// Same direction every round: 1→5, 1→5, ...
    Linear,
}

impl DraftPattern {
    pub fn from_str_pattern(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(DraftPattern::Snake),
            "linear" => Some(DraftPattern::Linear),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            DraftPattern::Snake => "snake",
            DraftPattern::Linear => "linear",
        }
    }
}

impl fmt::Display for DraftPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// One entry of the pick schedule: which team picks, in which round (both 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PickSlot {
    pub team_idx: usize,
    pub round: usize,
}

/// Build the full pick order for `team_count` teams over `round_count` rounds.
///
/// Snake rounds alternate ascending/descending team order, so the team that
/// picks last in round r picks first in round r+1. Linear rounds are always
/// ascending. The result has exactly `team_count * round_count` entries.
pub fn build_schedule(
    team_count: usize,
    round_count: usize,
    pattern: DraftPattern,
) -> Result<Vec<PickSlot>, DraftError> {
    if team_count == 0 {
        return Err(DraftError::InvalidConfiguration {
            message: "team count must be at least 1".into(),
        });
    }
    if round_count == 0 {
        return Err(DraftError::InvalidConfiguration {
            message: "round count must be at least 1".into(),
        });
    }

    let mut schedule = Vec::with_capacity(team_count * round_count);
    for round in 0..round_count {
        let reversed = pattern == DraftPattern::Snake && round % 2 == 1;
        if reversed {
            schedule.extend((0..team_count).rev().map(|team_idx| PickSlot { team_idx, round }));
        } else {
            schedule.extend((0..team_count).map(|team_idx| PickSlot { team_idx, round }));
        }
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn teams_of(schedule: &[PickSlot]) -> Vec<usize> {
        schedule.iter().map(|p| p.team_idx).collect()
    }

    #[test]
    fn snake_five_teams_four_rounds() {
        let schedule = build_schedule(5, 4, DraftPattern::Snake).unwrap();
        assert_eq!(schedule.len(), 20);
        assert_eq!(
            teams_of(&schedule),
            vec![0, 1, 2, 3, 4, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 4, 3, 2, 1, 0]
        );
        assert_eq!(schedule[5], PickSlot { team_idx: 4, round: 1 });
        assert_eq!(schedule[10], PickSlot { team_idx: 0, round: 2 });
    }

    #[test]
    fn linear_repeats_ascending() {
        let schedule = build_schedule(3, 3, DraftPattern::Linear).unwrap();
        assert_eq!(teams_of(&schedule), vec![0, 1, 2, 0, 1, 2, 0, 1, 2]);
        assert_eq!(schedule[8].round, 2);
    }

    #[test]
    fn every_team_round_pair_exactly_once() {
        for pattern in [DraftPattern::Snake, DraftPattern::Linear] {
            for teams in 1..=7 {
                for rounds in 1..=6 {
                    let schedule = build_schedule(teams, rounds, pattern).unwrap();
                    assert_eq!(schedule.len(), teams * rounds);
                    let unique: HashSet<PickSlot> = schedule.iter().copied().collect();
                    assert_eq!(unique.len(), teams * rounds, "{pattern} {teams}x{rounds}");
                }
            }
        }
    }

    #[test]
    fn snake_last_of_round_picks_first_next_round() {
        for teams in 1..=8 {
            let rounds = 5;
            let schedule = build_schedule(teams, rounds, DraftPattern::Snake).unwrap();
            for r in 0..rounds - 1 {
                let last = schedule[(r + 1) * teams - 1];
                let first_next = schedule[(r + 1) * teams];
                assert_eq!(last.team_idx, first_next.team_idx);
            }
        }
    }

    #[test]
    fn single_team_draft() {
        let schedule = build_schedule(1, 4, DraftPattern::Snake).unwrap();
        assert_eq!(teams_of(&schedule), vec![0, 0, 0, 0]);
    }

    #[test]
    fn rejects_non_positive_counts() {
        assert!(matches!(
            build_schedule(0, 4, DraftPattern::Snake),
            Err(DraftError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            build_schedule(5, 0, DraftPattern::Linear),
            Err(DraftError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn pattern_parsing() {
        assert_eq!(DraftPattern::from_str_pattern("Snake"), Some(DraftPattern::Snake));
        assert_eq!(DraftPattern::from_str_pattern("linear"), Some(DraftPattern::Linear));
        assert_eq!(DraftPattern::from_str_pattern("auction"), None);
        assert_eq!(DraftPattern::Linear.to_string(), "linear");
    }
}
