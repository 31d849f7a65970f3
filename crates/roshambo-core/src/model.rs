//! Domain model
//!
//! A `Player` is created once on connect and never mutated. Round and
//! game results are derived values: round results are recomputed every
//! round, game results accumulate across rounds. `Status` is a rank
//! label derived from sorted scores, never authoritative state.

use crate::PlayerId;

/// A player's choice for one round.
///
/// `Unknown` stands for "no answer received by the deadline" and is
/// never submitted by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Choice {
    #[default]
    Unknown,
    Rock,
    Paper,
    Scissors,
}

/// Rank label derived from a sorted score list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Unknown,
    Winner,
    Looser,
    Draw,
}

/// A connected participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Player {
            id,
            name: name.into(),
        }
    }
}

/// One player's outcome for a single round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub player: Player,
    pub choice: Choice,
    pub score: i32,
    pub status: Status,
}

/// One player's cumulative outcome across all resolved rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub player: Player,
    pub rounds: u32,
    pub score: i32,
    pub status: Status,
}

impl GameResult {
    pub fn new(player: Player) -> Self {
        GameResult {
            player,
            rounds: 0,
            score: 0,
            status: Status::Unknown,
        }
    }
}

/// The payload broadcast to score subscribers after each round:
/// the round's results plus the ranked cumulative standings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scoreboard {
    pub round_results: Vec<RoundResult>,
    pub game_results: Vec<GameResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_choice_is_unknown() {
        assert_eq!(Choice::default(), Choice::Unknown);
        assert_eq!(Status::default(), Status::Unknown);
    }
}
