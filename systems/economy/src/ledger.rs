//! Lock-free money counter.

use std::sync::atomic::{AtomicU64, Ordering};

use lane_defence_core::{Notification, NotificationBus};

/// Player money shared between the tick thread and the income task.
///
/// Spending never overdraws: a spend either succeeds in full or leaves the
/// balance untouched. Every successful mutation publishes
/// [`Notification::MoneyChanged`].
#[derive(Debug)]
pub struct Ledger {
    balance: AtomicU64,
    notifications: NotificationBus,
}

impl Ledger {
    /// Creates a ledger holding `initial` money.
    #[must_use]
    pub fn new(initial: u64, notifications: NotificationBus) -> Self {
        Self {
            balance: AtomicU64::new(initial),
            notifications,
        }
    }

    /// Current balance.
    #[must_use]
    pub fn balance(&self) -> u64 {
        self.balance.load(Ordering::Acquire)
    }

    /// Reports whether `amount` could be spent right now.
    #[must_use]
    pub fn can_afford(&self, amount: u64) -> bool {
        self.balance() >= amount
    }

    /// Withdraws `amount` if the balance covers it.
    ///
    /// Returns `false`, without mutating anything, when funds are insufficient.
    pub fn spend(&self, amount: u64) -> bool {
        let mut current = self.balance.load(Ordering::Acquire);
        loop {
            if current < amount {
                return false;
            }
            match self.balance.compare_exchange_weak(
                current,
                current - amount,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.publish(current - amount);
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Credits `amount` and returns the new balance.
    pub fn add(&self, amount: u64) -> u64 {
        let balance = self
            .balance
            .fetch_add(amount, Ordering::AcqRel)
            .wrapping_add(amount);
        self.publish(balance);
        balance
    }

    fn publish(&self, balance: u64) {
        self.notifications
            .publish(&Notification::MoneyChanged { balance });
    }
}
