#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step orchestration of the world and its systems.
//!
//! Each tick runs the wave scheduler, enemy movement and cooldown decay,
//! targeting, firing, projectiles, placeables, special events, cleanup and
//! finally rules, applying every batch of commands to the world before the
//! next system reads it. Presentation-facing notifications are published
//! once the tick has settled.

mod chance;
mod clock;

use std::{fmt, sync::Arc, time::Duration};

use lane_defence_core::{
    config::{Balance, ConfigError, LevelLayout, WaveSchedule},
    ChanceSource,
    Command,
    DefenderView,
    EnemyView,
    Event,
    Notification,
    NotificationBus,
    Outcome,
    PlaceableSnapshot,
    PlacementError,
    ProjectileSnapshot,
};
use lane_defence_system_air_strike::{AirStrike, PendingStrike};
use lane_defence_system_builder::{BuildError, BuildOption, BuildRequest, Builder};
use lane_defence_system_economy::{Economy, Ledger};
use lane_defence_system_rules::Rules;
use lane_defence_system_spawning::WaveScheduler;
use lane_defence_system_tower_combat::TowerCombat;
use lane_defence_system_tower_targeting::TowerTargeting;
use lane_defence_world::{self as world, query, GridMap, PathError, World};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{info, trace, warn};

pub use chance::SeededChance;
pub use clock::FrameClock;

/// Everything needed to set up a match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchSetup {
    /// Stats, prices and thresholds.
    pub balance: Balance,
    /// Level geometry and slots.
    pub level: LevelLayout,
    /// Waves to play.
    pub schedule: WaveSchedule,
}

impl MatchSetup {
    /// Validates every section of the setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.balance.validate()?;
        self.level.validate()?;
        self.schedule.validate()
    }
}

/// Failures raised while building a [`Simulation`].
#[derive(Debug, Error)]
pub enum SetupError {
    /// A configuration value was out of range.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A level path could not be built.
    #[error("invalid level path: {0}")]
    Path(#[from] PathError),
}

/// Lifecycle of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Created but not started; build orders are accepted.
    Ready,
    /// Ticks advance the match.
    Running,
    /// Ticks are ignored until [`Simulation::resume`].
    Paused,
    /// Stopped for good.
    Stopped,
}

/// Authoritative match state plus the systems that drive it.
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    air_strike: AirStrike,
    rules: Rules,
    builder: Builder,
    economy: Economy,
    notifications: NotificationBus,
    chance: Box<dyn ChanceSource>,
    clock: FrameClock,
    state: RunState,
    commands: Vec<Command>,
    events: Vec<Event>,
    notices: Vec<Event>,
}

impl Simulation {
    /// Validates the setup and builds a match that has not started yet.
    ///
    /// The income task is spawned on `runtime` once the match starts.
    pub fn new(
        setup: MatchSetup,
        runtime: Handle,
        chance: Box<dyn ChanceSource>,
    ) -> Result<Self, SetupError> {
        setup.validate()?;
        let MatchSetup {
            balance,
            level,
            schedule,
        } = setup;

        let world = World::new(&level, balance.clone())?;
        let notifications = NotificationBus::new();
        let ledger = Arc::new(Ledger::new(balance.money.start, notifications.clone()));
        let economy = Economy::new(ledger, &balance.money, runtime);
        let rules = Rules::for_match(&schedule, &balance);

        Ok(Self {
            world,
            scheduler: WaveScheduler::new(schedule),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            air_strike: AirStrike::new(balance.raid, level.columns, level.rows),
            rules,
            builder: Builder::new(balance),
            economy,
            notifications,
            chance,
            clock: FrameClock::default(),
            state: RunState::Ready,
            commands: Vec::new(),
            events: Vec::new(),
            notices: Vec::new(),
        })
    }

    /// Starts the match clock and passive income.
    pub fn start(&mut self) {
        if self.state != RunState::Ready {
            return;
        }
        info!(
            waves = self.scheduler.total_waves(),
            money = self.money(),
            leak_power = self.rules.total_power(),
            "match started"
        );
        self.state = RunState::Running;
        self.clock.reset();
        self.economy.start();
    }

    /// Freezes simulation time and income without discarding any state.
    pub fn pause(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.state = RunState::Paused;
        self.economy.pause();
    }

    /// Continues after a pause; the time spent paused is not simulated.
    pub fn resume(&mut self) {
        if self.state != RunState::Paused {
            return;
        }
        self.state = RunState::Running;
        self.clock.reset();
        self.economy.resume();
    }

    /// Ends the match without deciding it.
    pub fn stop(&mut self) {
        self.state = RunState::Stopped;
        self.economy.stop();
    }

    /// Advances the match by the time measured on the frame clock.
    ///
    /// Returns the step that was simulated.
    pub fn advance_frame(&mut self) -> Duration {
        let dt = self.clock.frame();
        let _ = self.tick(dt);
        dt
    }

    /// Advances the match by `dt` and returns the events the tick produced.
    ///
    /// Nothing happens unless the match is running and undecided.
    pub fn tick(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        if self.state != RunState::Running || self.rules.outcome().is_some() {
            return &self.events;
        }
        let leaked_before = self.rules.leaked_power();

        self.scheduler.handle(
            dt,
            self.chance.as_mut(),
            &mut self.commands,
            &mut self.events,
        );
        self.flush();

        self.commands.push(Command::Tick { dt });
        self.flush();

        let tile_size = query::grid(&self.world).tile_size();
        self.targeting.handle(
            &query::defender_view(&self.world),
            &query::enemy_view(&self.world),
            tile_size,
            &mut self.commands,
        );
        self.flush();

        self.combat.handle(
            &query::defender_view(&self.world),
            &query::enemy_view(&self.world),
            self.chance.as_mut(),
            &mut self.commands,
        );
        self.flush();

        self.commands.push(Command::AdvanceProjectiles { dt });
        self.flush();
        self.commands.push(Command::AdvancePlaceables { dt });
        self.flush();

        self.air_strike.handle(
            &self.events,
            &query::defender_view(&self.world),
            dt,
            &mut self.commands,
            &mut self.notices,
        );
        self.events.append(&mut self.notices);
        self.flush();

        self.commands.push(Command::ClearCasualties);
        self.flush();

        self.rules.handle(
            &self.events,
            self.scheduler.all_waves_complete(),
            query::alive_enemy_count(&self.world),
            &mut self.notices,
        );
        self.events.append(&mut self.notices);

        self.publish(leaked_before);
        if self.rules.outcome().is_some() {
            self.economy.stop();
        }
        trace!(
            tick = query::tick_index(&self.world),
            events = self.events.len(),
            "tick settled"
        );
        &self.events
    }

    /// Buys the requested item, placing it immediately.
    ///
    /// Returns the amount spent.
    pub fn build(&mut self, request: BuildRequest) -> Result<u64, BuildError> {
        if self.rules.outcome().is_some() || self.state == RunState::Stopped {
            return Err(BuildError::MatchOver);
        }

        let cost = self.builder.handle(
            request,
            self.economy.ledger(),
            |cell| query::slot(&self.world, cell),
            &mut self.commands,
        )?;

        let mut placed = Vec::new();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut placed);
        }
        let rejection = placed.iter().find_map(|event| match event {
            Event::PlacementRejected { reason, .. } => Some(*reason),
            _ => None,
        });
        match rejection {
            None => Ok(cost),
            Some(reason) => {
                warn!(%reason, cost, "placement rejected after payment, refunding");
                let _ = self.economy.ledger().add(cost);
                Err(match reason {
                    PlacementError::NotASlot { cell } => BuildError::NotASlot { cell },
                    PlacementError::Occupied { cell, defender } => {
                        BuildError::Occupied { cell, defender }
                    }
                })
            }
        }
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn publish(&self, leaked_before: u64) {
        let total_power = self.rules.total_power();
        let mut leaked = leaked_before;
        for event in &self.events {
            let notification = match event {
                Event::WaveStarted { wave, total } => Notification::WaveStarted {
                    wave: *wave,
                    total: *total,
                },
                Event::EnemyLeaked { power, .. } => {
                    leaked += u64::from(*power);
                    let leak_ratio = if total_power == 0 {
                        0.0
                    } else {
                        leaked as f64 / total_power as f64
                    };
                    Notification::EnemyLeaked {
                        power: *power,
                        leak_ratio,
                    }
                }
                Event::GameDecided { outcome } => Notification::GameOver { outcome: *outcome },
                _ => continue,
            };
            self.notifications.publish(&notification);
        }
    }

    /// Bus carrying money, wave, leak and game-over notifications.
    #[must_use]
    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    /// Shared money ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        self.economy.ledger()
    }

    /// Current balance.
    #[must_use]
    pub fn money(&self) -> u64 {
        self.economy.ledger().balance()
    }

    /// Purchasable items with their prices.
    #[must_use]
    pub fn catalogue(&self) -> Vec<(BuildOption, u64)> {
        self.builder.catalogue()
    }

    /// One-based index of the wave in progress, `0` before the first wave.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.scheduler.current_wave()
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        self.scheduler.total_waves()
    }

    /// Leaked power divided by the total leakable power.
    #[must_use]
    pub fn leak_ratio(&self) -> f64 {
        self.rules.leak_ratio()
    }

    /// Power that may still leak before the match is lost.
    #[must_use]
    pub fn remaining_leak_allowance(&self) -> u64 {
        self.rules.remaining_leak_allowance()
    }

    /// Terminal outcome, once decided.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.rules.outcome()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Level geometry and slot occupancy.
    #[must_use]
    pub fn grid(&self) -> &GridMap {
        query::grid(&self.world)
    }

    /// Snapshots of every tracked enemy.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshots of every standing defender.
    #[must_use]
    pub fn defenders(&self) -> DefenderView {
        query::defender_view(&self.world)
    }

    /// Snapshots of the projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectiles(&self.world)
    }

    /// Snapshots of the active placeables.
    #[must_use]
    pub fn placeables(&self) -> Vec<PlaceableSnapshot> {
        query::placeables(&self.world)
    }

    /// Strikes counting down toward impact.
    #[must_use]
    pub fn pending_strikes(&self) -> &[PendingStrike] {
        self.air_strike.pending()
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        query::tick_index(&self.world)
    }

    /// Read-only access to the world for adapters that need more detail.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.state)
            .field("tick", &query::tick_index(&self.world))
            .field("wave", &self.scheduler.current_wave())
            .field("money", &self.money())
            .field("outcome", &self.rules.outcome())
            .finish_non_exhaustive()
    }
}
