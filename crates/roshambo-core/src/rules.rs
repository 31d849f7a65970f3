//! Game rules - pairwise scoring and rank assignment
//!
//! Scoring is pairwise: each player's round score is the sum of the
//! outcomes against every other player in the round. Rank statuses are
//! then derived from the ascending score list. The tie-break rules have
//! sharp edges around zero scores and Unknown choices; see the tests
//! before changing anything here.

use std::collections::HashMap;

use crate::{Choice, GameResult, Player, PlayerId, RoundResult, Status};

/// Compare one player's choice against another's.
///
/// Fixed adjacency: Rock beats Scissors, Scissors beats Paper, Paper
/// beats Rock. Any pairing that involves a missed deadline (Unknown)
/// has no outcome.
pub fn outcome(player: Choice, other: Choice) -> Status {
    use Choice::*;

    if player == Unknown || other == Unknown {
        return Status::Unknown;
    }
    if strong_to(player) == other {
        return Status::Winner;
    }
    if weak_to(player) == other {
        return Status::Looser;
    }
    Status::Draw
}

#[inline]
fn strong_to(choice: Choice) -> Choice {
    match choice {
        Choice::Rock => Choice::Scissors,
        Choice::Scissors => Choice::Paper,
        Choice::Paper => Choice::Rock,
        Choice::Unknown => Choice::Unknown,
    }
}

#[inline]
fn weak_to(choice: Choice) -> Choice {
    match choice {
        Choice::Rock => Choice::Paper,
        Choice::Scissors => Choice::Rock,
        Choice::Paper => Choice::Scissors,
        Choice::Unknown => Choice::Unknown,
    }
}

/// Points awarded for a single pairwise outcome.
#[inline]
pub fn status_score(status: Status) -> i32 {
    match status {
        Status::Winner => 2,
        Status::Draw => 1,
        Status::Looser | Status::Unknown => 0,
    }
}

/// Score one round.
///
/// Players absent from `choices` are scored with `Choice::Unknown`.
/// The returned list is sorted ascending by score (ties broken by
/// player id so output order is deterministic) and has statuses
/// assigned.
pub fn score_round(
    players: &HashMap<PlayerId, Player>,
    choices: &HashMap<PlayerId, Choice>,
) -> Vec<RoundResult> {
    let mut results: Vec<RoundResult> = players
        .values()
        .map(|player| {
            let choice = choices.get(&player.id).copied().unwrap_or_default();
            let score = players
                .values()
                .filter(|other| other.id != player.id)
                .map(|other| {
                    let other_choice = choices.get(&other.id).copied().unwrap_or_default();
                    status_score(outcome(choice, other_choice))
                })
                .sum();
            RoundResult {
                player: player.clone(),
                choice,
                score,
                status: Status::Unknown,
            }
        })
        .collect();

    results.sort_by_key(|r| (r.score, r.player.id));
    assign_round_statuses(&mut results);
    results
}

/// Assign rank statuses to a round's results, sorted ascending by score.
///
/// Two players: higher score wins, equal nonzero scores draw, equal
/// zero scores stay Unknown. More players: a strict top scorer is the
/// Winner and everyone below with a real choice is a Looser; a tie for
/// the top makes every top scorer a Draw. Players whose choice was
/// Unknown keep Unknown status throughout, as does the degenerate
/// single-player round.
pub fn assign_round_statuses(results: &mut [RoundResult]) {
    if results.len() == 2 {
        if results[1].score > results[0].score {
            results[1].status = Status::Winner;
            results[0].status = Status::Looser;
        }
        if results[1].score == results[0].score && results[1].score > 0 {
            results[1].status = Status::Draw;
            results[0].status = Status::Draw;
        }
        return;
    }

    if results.len() < 2 {
        return;
    }

    let last = results.len() - 1;
    let has_winner = results[last].score > results[last - 1].score;
    if has_winner {
        results[last].status = Status::Winner;
        for result in &mut results[..last] {
            if result.choice != Choice::Unknown {
                result.status = Status::Looser;
            }
        }
        return;
    }

    let draw_score = results[last].score;
    for result in results.iter_mut() {
        if result.score == 0 || result.score < draw_score {
            if result.choice != Choice::Unknown {
                result.status = Status::Looser;
            }
        } else if result.score == draw_score {
            result.status = Status::Draw;
        }
    }
}

/// Assign rank statuses to the cumulative standings, sorted ascending
/// by score.
///
/// Same ranking as rounds but without the Unknown-choice carve out:
/// cumulative scores always rank every player.
pub fn assign_game_statuses(results: &mut [GameResult]) {
    if results.len() == 2 {
        if results[1].score > results[0].score {
            results[1].status = Status::Winner;
            results[0].status = Status::Looser;
        }
        if results[1].score == results[0].score && results[1].score > 0 {
            results[1].status = Status::Draw;
            results[0].status = Status::Draw;
        }
        return;
    }

    if results.len() < 2 {
        return;
    }

    let last = results.len() - 1;
    let has_winner = results[last].score > results[last - 1].score;
    if has_winner {
        results[last].status = Status::Winner;
        for result in &mut results[..last] {
            result.status = Status::Looser;
        }
        return;
    }

    let draw_score = results[last].score;
    for result in results.iter_mut() {
        if result.score < draw_score {
            result.status = Status::Looser;
        } else {
            result.status = Status::Draw;
        }
    }
}
