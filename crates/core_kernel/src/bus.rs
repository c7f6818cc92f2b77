//! Process-scoped publish/subscribe bus for domain events
//!
//! A bus is an ordinary value: the application creates one instance and
//! hands it (behind an `Arc`) to every component that publishes or listens.
//! Tests create their own isolated bus.
//!
//! Delivery is best-effort fan-out to every live subscription. The bus is
//! for distribution only; the repositories remain the source of truth.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by event bus implementations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    /// Internal lock was poisoned by a panicking publisher
    #[error("event bus lock poisoned")]
    Poisoned,

    /// The bus is closed and no longer accepts messages
    #[error("event bus closed")]
    Closed,
}

/// A subscription to a bus.
///
/// Each subscription receives its own copy of every message published after
/// it was created.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drains every message that is already queued.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Publish/subscribe contract.
pub trait EventBus<M>: Send + Sync {
    /// Delivers `message` to every live subscription.
    fn publish(&self, message: M) -> Result<(), BusError>;

    /// Opens a new subscription.
    fn subscribe(&self) -> Subscription<M>;
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Dead subscriptions are dropped on the next publish
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscriptions still attached.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    fn publish(&self, message: M) -> Result<(), BusError> {
        let mut subs = self.subscribers.lock().map_err(|_| BusError::Poisoned)?;
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it simply never receives.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}
