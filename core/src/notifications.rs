//! Synchronous publish/subscribe channel carrying presentation-facing notifications.
//!
//! A [`NotificationBus`] is an owned value: each match (and each test) creates
//! its own and hands clones to the components that publish. Clones share the
//! same subscriber list. Delivery happens on the publishing thread, in
//! subscription order, and nothing is buffered for late subscribers.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use crate::Outcome;

/// Discrete notification delivered to subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Notification {
    /// The ledger balance changed.
    MoneyChanged {
        /// Balance after the mutation.
        balance: u64,
    },
    /// A wave began spawning.
    WaveStarted {
        /// One-based index of the wave.
        wave: u32,
        /// Total number of waves in the schedule.
        total: u32,
    },
    /// An enemy reached the end of its path.
    EnemyLeaked {
        /// Power carried by the enemy.
        power: u32,
        /// Leak ratio after accounting for the enemy.
        leak_ratio: f64,
    },
    /// The match reached a terminal state.
    GameOver {
        /// Outcome of the match.
        outcome: Outcome,
    },
}

/// Handle returned by [`NotificationBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&Notification) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

/// Cloneable handle to a shared subscriber list.
#[derive(Clone, Default)]
pub struct NotificationBus {
    subscribers: Arc<RwLock<Subscribers>>,
}

impl NotificationBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked for every subsequently published notification.
    ///
    /// Callbacks must not subscribe or unsubscribe on the same bus; doing so
    /// from inside a delivery would deadlock.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.entries.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns `false` when the handle was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.entries.len();
        subscribers.entries.retain(|(entry, _)| *entry != id);
        subscribers.entries.len() != before
    }

    /// Delivers the notification to every subscriber in subscription order.
    pub fn publish(&self, notification: &Notification) {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in &subscribers.entries {
            callback(notification);
        }
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
