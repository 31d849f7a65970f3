//! Round engine
//!
//! One independent task running rounds back to back against a fixed
//! roster snapshot. Each round collects choices until every expected
//! player has submitted or the deadline elapses, scores the round, and
//! reports the results into the coordinator's mailbox. Shutdown forces
//! an immediate resolution with whatever was collected, then ends the
//! loop.

use std::collections::HashMap;
use std::time::Duration;

use roshambo_core::{score_round, Choice, Player, PlayerId};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::command::Command;
use crate::shutdown::ShutdownSignal;

/// Coordinator-side handle to the running round engine.
pub(crate) struct RoundHandle {
    choices: mpsc::Sender<(PlayerId, Choice)>,
}

impl RoundHandle {
    /// Forward a submission. Never blocks; if the engine's intake is
    /// full the submission is dropped, same as any other late or
    /// invalid one.
    pub(crate) fn submit(&self, player: PlayerId, choice: Choice) {
        if self.choices.try_send((player, choice)).is_err() {
            tracing::debug!(%player, "choice dropped: round intake unavailable");
        }
    }
}

/// Spawn the round engine for a roster snapshot.
///
/// Runs until shutdown fires or the coordinator goes away.
pub(crate) fn spawn(
    timeout: Duration,
    players: HashMap<PlayerId, Player>,
    results: mpsc::Sender<Command>,
    shutdown: ShutdownSignal,
) -> RoundHandle {
    let (tx, rx) = mpsc::channel(players.len().max(1));
    let engine = Engine {
        timeout,
        players,
        rx,
        choices: HashMap::new(),
        results,
        shutdown,
    };
    tokio::spawn(engine.run());
    RoundHandle { choices: tx }
}

struct Engine {
    timeout: Duration,
    players: HashMap<PlayerId, Player>,
    rx: mpsc::Receiver<(PlayerId, Choice)>,
    choices: HashMap<PlayerId, Choice>,
    results: mpsc::Sender<Command>,
    shutdown: ShutdownSignal,
}

enum Resolution {
    Complete,
    Cancelled,
}

impl Engine {
    async fn run(mut self) {
        loop {
            let resolution = self.collect().await;
            let results = score_round(&self.players, &self.choices);
            self.choices.clear();

            if self.results.send(Command::RoundResolved(results)).await.is_err() {
                tracing::debug!("coordinator gone, round engine stopping");
                return;
            }

            if matches!(resolution, Resolution::Cancelled) {
                tracing::debug!("round engine stopping on shutdown");
                return;
            }
        }
    }

    /// Collecting phase: runs until all expected players have submitted
    /// or the deadline elapses. Submissions from unknown ids are
    /// ignored; a repeat submission overwrites the previous one.
    async fn collect(&mut self) -> Resolution {
        enum Wake {
            Submission(Option<(PlayerId, Choice)>),
            Deadline,
            Shutdown,
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            let wake = tokio::select! {
                submission = self.rx.recv() => Wake::Submission(submission),
                _ = tokio::time::sleep_until(deadline) => Wake::Deadline,
                _ = self.shutdown.cancelled() => Wake::Shutdown,
            };

            match wake {
                Wake::Submission(Some((player, choice))) => {
                    if !self.players.contains_key(&player) {
                        tracing::debug!(%player, "ignoring choice from unknown player");
                        continue;
                    }
                    self.choices.insert(player, choice);
                    if self.choices.len() == self.players.len() {
                        return Resolution::Complete;
                    }
                }
                Wake::Submission(None) => return Resolution::Cancelled,
                Wake::Deadline => return Resolution::Complete,
                Wake::Shutdown => return Resolution::Cancelled,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::Shutdown;
    use roshambo_core::{Status, PlayerIdGen};

    fn roster(n: usize) -> (Vec<Player>, HashMap<PlayerId, Player>) {
        let mut gen = PlayerIdGen::new();
        let players: Vec<Player> = (0..n)
            .map(|i| Player::new(gen.next_id(), format!("p{i}")))
            .collect();
        let map = players.iter().map(|p| (p.id, p.clone())).collect();
        (players, map)
    }

    async fn next_resolved(rx: &mut mpsc::Receiver<Command>) -> Vec<roshambo_core::RoundResult> {
        match rx.recv().await {
            Some(Command::RoundResolved(results)) => results,
            _ => panic!("expected round results"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_resolves_when_all_submit() {
        let (players, map) = roster(2);
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let handle = spawn(Duration::from_secs(30), map, tx, shutdown.signal());

        handle.submit(players[0].id, Choice::Rock);
        handle.submit(players[1].id, Choice::Scissors);

        let results = next_resolved(&mut rx).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, 0);
        assert_eq!(results[0].status, Status::Looser);
        assert_eq!(results[1].score, 2);
        assert_eq!(results[1].status, Status::Winner);
        assert_eq!(results[1].player.id, players[0].id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_resolves_on_timeout_with_no_submissions() {
        let (_, map) = roster(3);
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let _handle = spawn(Duration::from_secs(30), map, tx, shutdown.signal());

        let results = next_resolved(&mut rx).await;
        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.choice, Choice::Unknown);
            assert_eq!(result.score, 0);
            assert_eq!(result.status, Status::Unknown);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_player_is_ignored() {
        let (players, map) = roster(2);
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let handle = spawn(Duration::from_secs(30), map, tx, shutdown.signal());

        handle.submit(PlayerId::new(0xBAD), Choice::Rock);
        handle.submit(players[0].id, Choice::Paper);

        // Only the deadline can finish this round; the stray id must
        // not count toward completion.
        let results = next_resolved(&mut rx).await;
        let stray = results.iter().find(|r| r.player.id == PlayerId::new(0xBAD));
        assert!(stray.is_none());
        let missing = results.iter().find(|r| r.player.id == players[1].id).unwrap();
        assert_eq!(missing.choice, Choice::Unknown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmission_overwrites() {
        let (players, map) = roster(2);
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let handle = spawn(Duration::from_secs(30), map, tx, shutdown.signal());

        handle.submit(players[0].id, Choice::Rock);
        handle.submit(players[0].id, Choice::Paper);
        handle.submit(players[1].id, Choice::Paper);

        let results = next_resolved(&mut rx).await;
        let first = results.iter().find(|r| r.player.id == players[0].id).unwrap();
        assert_eq!(first.choice, Choice::Paper);
        assert_eq!(first.status, Status::Draw);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_restart_with_same_roster() {
        let (players, map) = roster(2);
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let handle = spawn(Duration::from_secs(30), map, tx, shutdown.signal());

        handle.submit(players[0].id, Choice::Rock);
        handle.submit(players[1].id, Choice::Scissors);
        let first = next_resolved(&mut rx).await;
        assert_eq!(first.len(), 2);

        // Fresh collecting phase: previous choices must not leak.
        handle.submit(players[0].id, Choice::Paper);
        handle.submit(players[1].id, Choice::Paper);
        let second = next_resolved(&mut rx).await;
        assert_eq!(second.len(), 2);
        for result in &second {
            assert_eq!(result.choice, Choice::Paper);
            assert_eq!(result.status, Status::Draw);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_resolves_with_partial_data() {
        let (players, map) = roster(2);
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = Shutdown::new();
        let handle = spawn(Duration::from_secs(3600), map, tx, shutdown.signal());

        handle.submit(players[0].id, Choice::Rock);
        tokio::task::yield_now().await;
        shutdown.trigger();

        let results = next_resolved(&mut rx).await;
        assert_eq!(results.len(), 2);
        let missing = results.iter().find(|r| r.player.id == players[1].id).unwrap();
        assert_eq!(missing.choice, Choice::Unknown);

        // The engine exits after the forced resolution.
        assert!(rx.recv().await.is_none());
    }
}
