//! Broadcast fan-out
//!
//! Each subscriber owns a bounded intake buffer the coordinator fills
//! with `try_send`, so a slow or disconnected consumer can never stall
//! the coordinator loop. A `Subscription` is the consumer end of that
//! buffer; dropping it unsubscribes. `forward` pumps a subscription
//! into a transport sink on its own task, tearing down on the first
//! failed delivery.

use std::fmt;

use roshambo_core::{Player, Scoreboard};
use tokio::sync::mpsc;

use crate::command::Command;
use crate::shutdown::ShutdownSignal;

/// Opaque handle identifying one subscriber registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriberId(pub(crate) u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct SubscriberIdGen {
    next: u64,
}

impl SubscriberIdGen {
    pub(crate) fn next_id(&mut self) -> SubscriberId {
        self.next += 1;
        SubscriberId(self.next)
    }
}

/// A lazy, infinite, non-restartable feed of items from the
/// coordinator.
///
/// Ends (returns `None`) when the coordinator drops the subscriber:
/// on session shutdown, or after the intake buffer overflowed. Dropping
/// the subscription unsubscribes; that is safe even while the
/// coordinator is shutting down.
pub struct Subscription<T> {
    id: SubscriberId,
    rx: mpsc::Receiver<T>,
    commands: mpsc::Sender<Command>,
    unsubscribe: fn(SubscriberId) -> Command,
}

/// Live roster feed: the roster snapshot at subscription time, then
/// every later connect.
pub type RosterStream = Subscription<Player>;

/// Live score feed: one `Scoreboard` per resolved round.
pub type ScoreStream = Subscription<Scoreboard>;

impl<T> Subscription<T> {
    pub(crate) fn new(
        id: SubscriberId,
        rx: mpsc::Receiver<T>,
        commands: mpsc::Sender<Command>,
        unsubscribe: fn(SubscriberId) -> Command,
    ) -> Self {
        Subscription {
            id,
            rx,
            commands,
            unsubscribe,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next item, or `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        // Best effort: if the mailbox is gone or full the coordinator
        // notices the closed buffer on its next send anyway.
        let _ = self.commands.try_send((self.unsubscribe)(self.id));
    }
}

/// Outbound delivery target for one subscriber, implemented by the
/// transport layer.
pub trait DeliverySink<T> {
    type Error: fmt::Display;

    fn send(&mut self, item: T) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}

/// Per-subscriber delivery pump.
///
/// Forwards buffered items to the sink in arrival order. The first
/// transport failure, the end of the feed, or shutdown terminates the
/// task; dropping the subscription then unsubscribes.
pub async fn forward<T, S>(mut subscription: Subscription<T>, mut sink: S, mut shutdown: ShutdownSignal)
where
    S: DeliverySink<T>,
{
    loop {
        tokio::select! {
            item = subscription.next() => match item {
                Some(item) => {
                    if let Err(e) = sink.send(item).await {
                        tracing::warn!(subscriber = %subscription.id(), "delivery failed: {e}");
                        break;
                    }
                }
                None => break,
            },
            _ = shutdown.cancelled() => break,
        }
    }
}
