#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player economy: an atomic [`Ledger`] plus a background income task.
//!
//! The income task runs on a tokio runtime independent of the simulation
//! tick. Pausing aborts it; resuming spawns a fresh task whose first credit
//! lands a full interval later, so a pause never produces a catch-up burst.

mod ledger;

use std::{sync::Arc, time::Duration};

use lane_defence_core::config::MoneyConfig;
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

pub use ledger::Ledger;

/// Lifecycle of the income task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EconomyState {
    /// Never started, or stopped for good.
    Stopped,
    /// Income is being credited.
    Running,
    /// Income is suspended until [`Economy::resume`].
    Paused,
}

/// Owns the periodic income task crediting a shared [`Ledger`].
#[derive(Debug)]
pub struct Economy {
    ledger: Arc<Ledger>,
    income: u64,
    interval: Duration,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
    state: EconomyState,
}

impl Economy {
    /// Creates a stopped economy that will credit `config.income` every
    /// `config.income_interval()` once started.
    #[must_use]
    pub fn new(ledger: Arc<Ledger>, config: &MoneyConfig, runtime: Handle) -> Self {
        Self {
            ledger,
            income: config.income,
            interval: config.income_interval(),
            runtime,
            task: None,
            state: EconomyState::Stopped,
        }
    }

    /// Shared ledger credited by the income task.
    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EconomyState {
        self.state
    }

    /// Starts crediting income. Does nothing while already running.
    pub fn start(&mut self) {
        if self.state == EconomyState::Running {
            return;
        }
        self.arm();
    }

    /// Suspends income until [`Economy::resume`] is called.
    pub fn pause(&mut self) {
        if self.state != EconomyState::Running {
            return;
        }
        self.disarm();
        self.state = EconomyState::Paused;
    }

    /// Restarts income after a pause with a fresh time base.
    pub fn resume(&mut self) {
        if self.state != EconomyState::Paused {
            return;
        }
        self.arm();
    }

    /// Stops income permanently; only [`Economy::start`] re-enables it.
    pub fn stop(&mut self) {
        self.disarm();
        self.state = EconomyState::Stopped;
    }

    fn arm(&mut self) {
        self.disarm();
        self.state = EconomyState::Running;
        if self.interval.is_zero() {
            warn!("income interval is zero, passive income disabled");
            return;
        }

        let ledger = Arc::clone(&self.ledger);
        let income = self.income;
        let period = self.interval;
        self.task = Some(self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let _ = ticker.tick().await;
                let balance = ledger.add(income);
                debug!(income, balance, "income credited");
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Economy {
    fn drop(&mut self) {
        self.disarm();
    }
}
