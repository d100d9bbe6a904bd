#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Victory and defeat evaluation driven by the leak ledger.
//!
//! The total leakable power is summed once over the whole schedule. Leaks add
//! their power until the match is decided; once decided the outcome is sticky
//! and further leaks or checks change nothing.

use lane_defence_core::{
    config::{Balance, WaveSchedule},
    EnemyKind,
    Event,
    Outcome,
};
use tracing::info;

/// Sums `count × power` over every recognised scheduled enemy, plus one
/// aircraft's power for every wave that may launch a special event.
///
/// Unknown identifiers never spawn, so they contribute nothing.
#[must_use]
pub fn total_leak_power(schedule: &WaveSchedule, balance: &Balance) -> u64 {
    schedule
        .waves
        .iter()
        .map(|wave| {
            let groups: u64 = wave
                .groups
                .iter()
                .filter_map(|group| {
                    EnemyKind::from_identifier(&group.enemy).map(|kind| {
                        u64::from(group.count) * u64::from(balance.enemies.get(kind).power)
                    })
                })
                .sum();
            let raid = if wave.special_event_chance > 0.0 {
                u64::from(balance.enemies.aircraft.power)
            } else {
                0
            };
            groups + raid
        })
        .sum()
}

/// Leak ledger plus terminal-state evaluation.
#[derive(Clone, Debug)]
pub struct Rules {
    total_power: u64,
    leaked_power: u64,
    threshold: f64,
    outcome: Option<Outcome>,
}

impl Rules {
    /// Creates rules for a match with the given total and leak-ratio threshold.
    #[must_use]
    pub fn new(total_power: u64, threshold: f64) -> Self {
        Self {
            total_power,
            leaked_power: 0,
            threshold,
            outcome: None,
        }
    }

    /// Creates rules for the schedule using the balance's threshold.
    #[must_use]
    pub fn for_match(schedule: &WaveSchedule, balance: &Balance) -> Self {
        Self::new(
            total_leak_power(schedule, balance),
            balance.rules.leak_ratio_defeat,
        )
    }

    /// Records leaks from `events` and evaluates the match state.
    ///
    /// Pushes `Event::GameDecided` on the call that decides the match.
    pub fn handle(
        &mut self,
        events: &[Event],
        all_waves_complete: bool,
        alive_enemies: usize,
        out: &mut Vec<Event>,
    ) {
        if self.outcome.is_some() {
            return;
        }

        for event in events {
            if let Event::EnemyLeaked { power, .. } = event {
                self.record_leak(*power);
            }
        }

        let outcome = if all_waves_complete && alive_enemies == 0 {
            Outcome::Victory
        } else if self.total_power > 0 && self.leak_ratio() >= self.threshold {
            Outcome::Defeat
        } else {
            return;
        };

        info!(
            ?outcome,
            leaked = self.leaked_power,
            total = self.total_power,
            "match decided"
        );
        self.outcome = Some(outcome);
        out.push(Event::GameDecided { outcome });
    }

    /// Adds leaked power. Ignored once the match is decided.
    pub fn record_leak(&mut self, power: u32) {
        if self.outcome.is_none() {
            self.leaked_power = self.leaked_power.saturating_add(u64::from(power));
        }
    }

    /// Leaked power divided by total power, `0` when nothing can leak.
    #[must_use]
    pub fn leak_ratio(&self) -> f64 {
        if self.total_power == 0 {
            0.0
        } else {
            self.leaked_power as f64 / self.total_power as f64
        }
    }

    /// Power that may still leak before defeat.
    #[must_use]
    pub fn remaining_leak_allowance(&self) -> u64 {
        let limit = (self.total_power as f64 * self.threshold).ceil() as u64;
        limit.saturating_sub(self.leaked_power).saturating_sub(1)
    }

    /// Total leakable power.
    #[must_use]
    pub fn total_power(&self) -> u64 {
        self.total_power
    }

    /// Power leaked so far.
    #[must_use]
    pub fn leaked_power(&self) -> u64 {
        self.leaked_power
    }

    /// Terminal outcome, once decided.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Clears leaks and the outcome, keeping total and threshold.
    pub fn reset(&mut self) {
        self.leaked_power = 0;
        self.outcome = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{
        config::{SpawnGroup, WaveSpec},
        EnemyId,
    };

    fn leak(power: u32) -> Event {
        Event::EnemyLeaked {
            enemy: EnemyId::new(0),
            kind: EnemyKind::Soldier,
            power,
        }
    }

    fn run(rules: &mut Rules, events: &[Event], complete: bool, alive: usize) -> Vec<Event> {
        let mut out = Vec::new();
        rules.handle(events, complete, alive, &mut out);
        out
    }

    #[test]
    fn total_power_sums_counts_and_special_events() {
        let group = |enemy: &str, count| SpawnGroup {
            enemy: enemy.to_owned(),
            count,
            gap_secs: 1.0,
        };
        let schedule = WaveSchedule {
            waves: vec![
                WaveSpec {
                    start_delay_secs: 0.0,
                    groups: vec![group("soldier", 3), group("tank", 2), group("ghost", 7)],
                    special_event_chance: 0.0,
                },
                WaveSpec {
                    start_delay_secs: 0.0,
                    groups: vec![group("soldier_heavy", 1)],
                    special_event_chance: 0.3,
                },
            ],
        };
        assert_eq!(
            total_leak_power(&schedule, &Balance::default()),
            3 + 6 + 2 + 3
        );
    }

    #[test]
    fn defeat_triggers_at_exactly_the_threshold() {
        let mut rules = Rules::new(40, 0.1);
        assert!(run(&mut rules, &[leak(3)], false, 5).is_empty());
        assert_eq!(rules.remaining_leak_allowance(), 0);

        assert_eq!(
            run(&mut rules, &[leak(1)], false, 5),
            vec![Event::GameDecided {
                outcome: Outcome::Defeat,
            }]
        );
        assert_eq!(rules.leak_ratio(), 0.1);
    }

    #[test]
    fn ceil_of_fractional_limits_triggers_defeat() {
        let mut rules = Rules::new(25, 0.1);
        assert_eq!(rules.remaining_leak_allowance(), 2);
        assert!(run(&mut rules, &[leak(2)], false, 1).is_empty());
        assert_eq!(run(&mut rules, &[leak(1)], false, 1).len(), 1);
        assert_eq!(rules.outcome(), Some(Outcome::Defeat));
    }

    #[test]
    fn victory_is_checked_before_defeat() {
        let mut rules = Rules::new(10, 0.1);
        let out = run(&mut rules, &[leak(5)], true, 0);
        assert_eq!(
            out,
            vec![Event::GameDecided {
                outcome: Outcome::Victory,
            }]
        );
    }

    #[test]
    fn outcomes_are_sticky() {
        let mut rules = Rules::new(10, 0.5);
        let _ = run(&mut rules, &[], true, 0);
        assert_eq!(rules.outcome(), Some(Outcome::Victory));

        assert!(run(&mut rules, &[leak(10)], false, 3).is_empty());
        assert_eq!(rules.leaked_power(), 0);
        rules.record_leak(4);
        assert_eq!(rules.outcome(), Some(Outcome::Victory));
        assert_eq!(rules.leaked_power(), 0);

        rules.reset();
        assert_eq!(rules.outcome(), None);
        assert_eq!(rules.total_power(), 10);
    }

    #[test]
    fn empty_totals_never_lose() {
        let mut rules = Rules::new(0, 0.1);
        assert!(run(&mut rules, &[leak(0)], false, 1).is_empty());
        assert_eq!(rules.leak_ratio(), 0.0);
    }

    #[test]
    fn victory_waits_for_live_enemies() {
        let mut rules = Rules::for_match(&WaveSchedule::default(), &Balance::default());
        assert!(run(&mut rules, &[], true, 1).is_empty());
        assert!(run(&mut rules, &[], false, 0).is_empty());
        assert_eq!(run(&mut rules, &[], true, 0).len(), 1);
    }
}
