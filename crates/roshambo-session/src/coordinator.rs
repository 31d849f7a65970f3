//! Session coordinator
//!
//! A single actor loop owns the roster, the cumulative standings, the
//! subscriber registries, and the reference to the running round
//! engine. All concurrent callers talk to it exclusively through the
//! mailbox; there is no shared mutable memory and no locking. The round
//! engine reports resolved rounds into the same mailbox, which keeps
//! every mutation of game state single-threaded.

use std::collections::{HashMap, HashSet};

use roshambo_core::{
    assign_game_statuses, Choice, GameError, GameResult, Player, PlayerId, PlayerIdGen, RoundResult,
    Scoreboard,
};
use tokio::sync::{mpsc, oneshot};

use crate::command::Command;
use crate::config::SessionConfig;
use crate::fanout::{RosterStream, ScoreStream, SubscriberId, SubscriberIdGen, Subscription};
use crate::round::{self, RoundHandle};
use crate::shutdown::{Shutdown, ShutdownSignal};

/// Session lifecycle. The transition is one-way: once enough players
/// have connected the session is Started for the rest of its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Started,
}

/// Caller-side handle to a running session coordinator.
///
/// Cheap to clone; every clone talks to the same coordinator.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    signal: ShutdownSignal,
}

impl SessionHandle {
    /// Spawn a session coordinator task.
    ///
    /// Returns the handle plus the shutdown trigger for the whole
    /// session (coordinator, round engine, and fan-out tasks all
    /// observe it). Dropping the trigger also shuts the session down.
    pub fn spawn(config: SessionConfig) -> (SessionHandle, Shutdown) {
        let shutdown = Shutdown::new();
        let (commands, rx) = mpsc::channel(config.mailbox_depth.max(1));

        let coordinator = Coordinator {
            config,
            commands: commands.clone(),
            rx,
            shutdown: shutdown.signal(),
            phase: Phase::NotStarted,
            players: HashMap::new(),
            names: HashSet::new(),
            game_results: HashMap::new(),
            roster_subs: HashMap::new(),
            score_subs: HashMap::new(),
            round: None,
            ids: PlayerIdGen::new(),
            sub_ids: SubscriberIdGen::default(),
        };
        tokio::spawn(coordinator.run());

        let handle = SessionHandle {
            commands,
            signal: shutdown.signal(),
        };
        (handle, shutdown)
    }

    /// Connect a player to the session.
    ///
    /// Fails with `EmptyName`, `AlreadyConnected`, or `AlreadyStarted`;
    /// on success the returned `Player` carries its assigned id. The
    /// second player's connect starts the game.
    pub async fn connect(&self, name: impl Into<String>) -> Result<Player, GameError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Connect {
            name: name.into(),
            reply,
        })
        .await?;
        response.await.map_err(|_| GameError::SessionClosed)?
    }

    /// Open a live roster feed: the current roster first (order
    /// undefined), then every later connect.
    pub async fn subscribe_roster(&self) -> Result<RosterStream, GameError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::SubscribeRoster { reply }).await?;
        response.await.map_err(|_| GameError::SessionClosed)
    }

    /// Open a live score feed: one `Scoreboard` per resolved round.
    pub async fn subscribe_score(&self) -> Result<ScoreStream, GameError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::SubscribeScore { reply }).await?;
        response.await.map_err(|_| GameError::SessionClosed)
    }

    /// Submit a choice for the current round. Fire-and-forget: before
    /// the game starts it is dropped, and unknown player ids are
    /// ignored inside the round.
    pub async fn submit_choice(&self, player: PlayerId, choice: Choice) -> Result<(), GameError> {
        self.send(Command::SubmitChoice { player, choice }).await
    }

    /// Shutdown observer for tasks built on top of this session.
    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    async fn send(&self, cmd: Command) -> Result<(), GameError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| GameError::SessionClosed)
    }
}

struct Coordinator {
    config: SessionConfig,
    /// Sender into our own mailbox, handed to the round engine and to
    /// subscriptions for their unsubscribe path.
    commands: mpsc::Sender<Command>,
    rx: mpsc::Receiver<Command>,
    shutdown: ShutdownSignal,
    phase: Phase,
    players: HashMap<PlayerId, Player>,
    names: HashSet<String>,
    game_results: HashMap<PlayerId, GameResult>,
    roster_subs: HashMap<SubscriberId, mpsc::Sender<Player>>,
    score_subs: HashMap<SubscriberId, mpsc::Sender<Scoreboard>>,
    round: Option<RoundHandle>,
    ids: PlayerIdGen,
    sub_ids: SubscriberIdGen,
}

impl Coordinator {
    async fn run(mut self) {
        tracing::debug!("session coordinator started");
        loop {
            let cmd = tokio::select! {
                cmd = self.rx.recv() => cmd,
                _ = self.shutdown.cancelled() => None,
            };
            let Some(cmd) = cmd else { break };
            self.dispatch(cmd);
        }
        // Dropping the subscriber registries ends every feed; blocked
        // callers see SessionClosed once the mailbox closes.
        tracing::debug!("session coordinator stopped");
    }

    fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { name, reply } => self.handle_connect(name, reply),
            Command::SubscribeRoster { reply } => self.handle_subscribe_roster(reply),
            Command::UnsubscribeRoster(id) => {
                self.roster_subs.remove(&id);
            }
            Command::SubmitChoice { player, choice } => self.handle_submit(player, choice),
            Command::SubscribeScore { reply } => self.handle_subscribe_score(reply),
            Command::UnsubscribeScore(id) => {
                self.score_subs.remove(&id);
            }
            Command::RoundResolved(results) => self.handle_round_resolved(results),
        }
    }

    fn handle_connect(&mut self, name: String, reply: oneshot::Sender<Result<Player, GameError>>) {
        if name.is_empty() {
            let _ = reply.send(Err(GameError::EmptyName));
            return;
        }
        if self.names.contains(&name) {
            let _ = reply.send(Err(GameError::AlreadyConnected(name)));
            return;
        }
        if self.phase == Phase::Started {
            let _ = reply.send(Err(GameError::AlreadyStarted));
            return;
        }

        let player = Player::new(self.ids.next_id(), name);
        self.players.insert(player.id, player.clone());
        self.names.insert(player.name.clone());
        self.game_results
            .insert(player.id, GameResult::new(player.clone()));
        tracing::debug!(id = %player.id, name = %player.name, "player connected");
        let _ = reply.send(Ok(player.clone()));

        self.notify_roster(player);

        if self.players.len() > 1 && self.phase == Phase::NotStarted {
            self.start();
        }
    }

    /// One-way NotStarted -> Started transition: snapshot the roster
    /// into a fresh round engine.
    fn start(&mut self) {
        self.phase = Phase::Started;
        tracing::info!(players = self.players.len(), "session started");
        self.round = Some(round::spawn(
            self.config.round_timeout,
            self.players.clone(),
            self.commands.clone(),
            self.shutdown.clone(),
        ));
    }

    fn handle_subscribe_roster(&mut self, reply: oneshot::Sender<RosterStream>) {
        // The buffer is sized to hold the snapshot plus headroom, so
        // the replay below cannot fail and the subscriber sees the full
        // roster before any live notification.
        let capacity = self.players.len() + self.config.subscriber_buffer.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        for player in self.players.values() {
            let _ = tx.try_send(player.clone());
        }

        let id = self.sub_ids.next_id();
        let stream = Subscription::new(id, rx, self.commands.clone(), Command::UnsubscribeRoster);
        if reply.send(stream).is_ok() {
            self.roster_subs.insert(id, tx);
        }
    }

    fn handle_subscribe_score(&mut self, reply: oneshot::Sender<ScoreStream>) {
        let (tx, rx) = mpsc::channel(self.config.subscriber_buffer.max(1));
        let id = self.sub_ids.next_id();
        let stream = Subscription::new(id, rx, self.commands.clone(), Command::UnsubscribeScore);
        if reply.send(stream).is_ok() {
            self.score_subs.insert(id, tx);
        }
    }

    fn handle_submit(&mut self, player: PlayerId, choice: Choice) {
        match &self.round {
            Some(round) => round.submit(player, choice),
            None => tracing::debug!(%player, "choice dropped: session not started"),
        }
    }

    fn handle_round_resolved(&mut self, results: Vec<RoundResult>) {
        for result in &results {
            if let Some(game_result) = self.game_results.get_mut(&result.player.id) {
                game_result.rounds += 1;
                game_result.score += result.score;
            }
        }

        let mut standings: Vec<GameResult> = self.game_results.values().cloned().collect();
        standings.sort_by_key(|g| (g.score, g.player.id));
        assign_game_statuses(&mut standings);

        let board = Scoreboard {
            round_results: results,
            game_results: standings,
        };

        let mut dropped = Vec::new();
        for (id, sub) in &self.score_subs {
            if let Err(e) = sub.try_send(board.clone()) {
                tracing::warn!(subscriber = %id, "dropping score subscriber: {e}");
                dropped.push(*id);
            }
        }
        for id in dropped {
            self.score_subs.remove(&id);
        }
    }

    /// Send-and-forget connect notification; a subscriber that cannot
    /// keep up is removed rather than allowed to stall the loop.
    fn notify_roster(&mut self, player: Player) {
        let mut dropped = Vec::new();
        for (id, sub) in &self.roster_subs {
            if let Err(e) = sub.try_send(player.clone()) {
                tracing::warn!(subscriber = %id, "dropping roster subscriber: {e}");
                dropped.push(*id);
            }
        }
        for id in dropped {
            self.roster_subs.remove(&id);
        }
    }
}
