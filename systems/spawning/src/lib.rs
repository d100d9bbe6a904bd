#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler responsible for emitting enemy spawn commands.
//!
//! Each wave moves through `Idle -> Delaying -> Spawning -> Complete`. Time is
//! consumed as a budget, so a single large step may finish a delay, emit
//! several spawns and start the next wave in one call. Leftover time always
//! carries into the next phase.

use std::time::Duration;

use lane_defence_core::{
    config::{WaveSchedule, WaveSpec},
    ChanceSource,
    Command,
    EnemyKind,
    Event,
    Lane,
};
use tracing::{debug, info, warn};

/// Publicly observable scheduler phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Between waves, about to arm the next delay.
    Idle,
    /// Waiting for the current wave's start delay.
    Delaying,
    /// Emitting the current wave's groups.
    Spawning,
    /// Every wave has been emitted.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Delaying { remaining: Duration },
    Spawning { until_next: Duration },
    Complete,
    Finished,
}

/// Finite-state scheduler that times wave starts and enemy spawns.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: Vec<WaveSpec>,
    phase: Phase,
    wave_index: usize,
    group_index: usize,
    spawned_in_group: u32,
    next_lane: Lane,
    spawned: u64,
}

impl WaveScheduler {
    /// Creates a scheduler positioned before the first wave.
    #[must_use]
    pub fn new(schedule: WaveSchedule) -> Self {
        Self {
            waves: schedule.waves,
            phase: Phase::Idle,
            wave_index: 0,
            group_index: 0,
            spawned_in_group: 0,
            next_lane: Lane::Left,
            spawned: 0,
        }
    }

    /// Advances the scheduler by `dt`.
    ///
    /// Spawn and special-event commands are pushed to `out`; wave lifecycle
    /// and skipped-spawn notices are pushed to `events`.
    pub fn handle(
        &mut self,
        dt: Duration,
        chance: &mut dyn ChanceSource,
        out: &mut Vec<Command>,
        events: &mut Vec<Event>,
    ) {
        let mut budget = dt;
        loop {
            match self.phase {
                Phase::Idle => {
                    self.phase = match self.waves.get(self.wave_index) {
                        Some(wave) => Phase::Delaying {
                            remaining: wave.start_delay(),
                        },
                        None => Phase::Finished,
                    };
                }
                Phase::Delaying { remaining } => {
                    if budget < remaining {
                        self.phase = Phase::Delaying {
                            remaining: remaining - budget,
                        };
                        return;
                    }
                    budget -= remaining;
                    self.begin_wave(chance, out, events);
                }
                Phase::Spawning { until_next } => {
                    if budget < until_next {
                        self.phase = Phase::Spawning {
                            until_next: until_next - budget,
                        };
                        return;
                    }
                    budget -= until_next;
                    self.phase = match self.spawn_next(out, events) {
                        Some(gap) => Phase::Spawning { until_next: gap },
                        None => Phase::Complete,
                    };
                }
                Phase::Complete => {
                    let wave = self.wave_number();
                    info!(wave, "wave complete");
                    events.push(Event::WaveCompleted { wave });
                    self.wave_index += 1;
                    self.phase = Phase::Idle;
                }
                Phase::Finished => return,
            }
        }
    }

    /// One-based index of the wave being delayed or spawned, `0` before the first.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        match self.phase {
            Phase::Spawning { .. } | Phase::Complete => self.wave_number(),
            Phase::Idle | Phase::Delaying { .. } => self.wave_index as u32,
            Phase::Finished => self.total_waves(),
        }
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        self.waves.len() as u32
    }

    /// Reports whether every wave has been emitted.
    #[must_use]
    pub fn all_waves_complete(&self) -> bool {
        self.wave_index >= self.waves.len()
    }

    /// Current phase of the scheduler.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        match self.phase {
            Phase::Idle | Phase::Complete => WavePhase::Idle,
            Phase::Delaying { .. } => WavePhase::Delaying,
            Phase::Spawning { .. } => WavePhase::Spawning,
            Phase::Finished => WavePhase::Finished,
        }
    }

    /// Number of spawn commands emitted over the whole run.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    fn wave_number(&self) -> u32 {
        self.wave_index as u32 + 1
    }

    fn begin_wave(
        &mut self,
        chance: &mut dyn ChanceSource,
        out: &mut Vec<Command>,
        events: &mut Vec<Event>,
    ) {
        self.group_index = 0;
        self.spawned_in_group = 0;
        self.phase = Phase::Spawning {
            until_next: Duration::ZERO,
        };

        let wave = self.wave_number();
        let total = self.total_waves();
        info!(wave, total, "wave started");
        events.push(Event::WaveStarted { wave, total });

        let probability = self
            .waves
            .get(self.wave_index)
            .map_or(0.0, |spec| spec.special_event_chance);
        if probability > 0.0 && chance.succeeds(probability) {
            debug!(wave, "special event launched");
            out.push(Command::LaunchRaid);
        }
    }

    /// Emits the next spawn of the current wave and returns the wait before
    /// the following one, or `None` once the wave is exhausted.
    fn spawn_next(&mut self, out: &mut Vec<Command>, events: &mut Vec<Event>) -> Option<Duration> {
        let wave_number = self.wave_number();
        let wave = self.waves.get(self.wave_index)?;

        while let Some(group) = wave.groups.get(self.group_index) {
            if self.spawned_in_group < group.count {
                break;
            }
            self.group_index += 1;
            self.spawned_in_group = 0;
        }
        let group = wave.groups.get(self.group_index)?;

        match EnemyKind::from_identifier(&group.enemy) {
            Some(kind) => {
                let lane = if kind.is_airborne() {
                    None
                } else {
                    let lane = self.next_lane;
                    self.next_lane = lane.next();
                    Some(lane)
                };
                out.push(Command::SpawnEnemy { kind, lane });
                self.spawned += 1;
            }
            None => {
                warn!(
                    wave = wave_number,
                    identifier = %group.enemy,
                    "skipping spawn with unknown enemy identifier"
                );
                events.push(Event::SpawnSkipped {
                    wave: wave_number,
                    identifier: group.enemy.clone(),
                });
            }
        }
        self.spawned_in_group += 1;

        if self.spawned_in_group < group.count {
            return Some(group.gap());
        }

        let offset = wave.groups[self.group_index + 1..]
            .iter()
            .position(|next| next.count > 0)?;
        self.group_index += 1 + offset;
        self.spawned_in_group = 0;
        wave.groups.get(self.group_index).map(|next| next.gap())
    }
}
