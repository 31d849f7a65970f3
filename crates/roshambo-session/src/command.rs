//! Coordinator mailbox messages
//!
//! Every mutation of session state is modeled as one of these variants
//! and consumed by the coordinator's single dispatch loop. Request
//! variants carry a oneshot reply slot.

use roshambo_core::{Choice, GameError, Player, PlayerId, RoundResult};
use tokio::sync::oneshot;

use crate::fanout::{RosterStream, ScoreStream, SubscriberId};

pub(crate) enum Command {
    Connect {
        name: String,
        reply: oneshot::Sender<Result<Player, GameError>>,
    },
    SubscribeRoster {
        reply: oneshot::Sender<RosterStream>,
    },
    UnsubscribeRoster(SubscriberId),
    SubmitChoice {
        player: PlayerId,
        choice: Choice,
    },
    SubscribeScore {
        reply: oneshot::Sender<ScoreStream>,
    },
    UnsubscribeScore(SubscriberId),
    RoundResolved(Vec<RoundResult>),
}
