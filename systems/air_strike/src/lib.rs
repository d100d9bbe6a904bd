#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Special-event strike planning and delayed execution.
//!
//! When an aircraft crosses its midpoint the system scores every grid row and
//! column by the defenders standing on it, schedules a strike on the best line
//! and, after a warning delay, emits the command that damages every defender
//! on that line.

use std::time::Duration;

use lane_defence_core::{config::RaidConfig, Command, DefenderView, Event, StrikeLine};
use tracing::debug;

/// Strike waiting for its warning delay to elapse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingStrike {
    /// Row or column that will be struck.
    pub line: StrikeLine,
    /// Warning time left before the strike lands.
    pub remaining: Duration,
}

/// Special-event strike system.
#[derive(Debug)]
pub struct AirStrike {
    config: RaidConfig,
    columns: u32,
    rows: u32,
    pending: Vec<PendingStrike>,
    row_scores: Vec<u64>,
    column_scores: Vec<u64>,
}

impl AirStrike {
    /// Creates the system for a grid of the given dimensions.
    #[must_use]
    pub fn new(config: RaidConfig, columns: u32, rows: u32) -> Self {
        Self {
            config,
            columns,
            rows,
            pending: Vec::new(),
            row_scores: Vec::new(),
            column_scores: Vec::new(),
        }
    }

    /// Counts down pending strikes, emitting `Command::StrikeLine` for those
    /// that are due, then plans a strike for every `RaidMidpointReached` event.
    pub fn handle(
        &mut self,
        events: &[Event],
        defenders: &DefenderView,
        dt: Duration,
        out: &mut Vec<Command>,
        notices: &mut Vec<Event>,
    ) {
        let damage = self.config.damage;
        self.pending.retain_mut(|strike| {
            strike.remaining = strike.remaining.saturating_sub(dt);
            if strike.remaining.is_zero() {
                out.push(Command::StrikeLine {
                    line: strike.line,
                    damage,
                });
                false
            } else {
                true
            }
        });

        for event in events {
            if let Event::RaidMidpointReached { enemy } = event {
                let line = self.plan(defenders);
                let delay = self.config.warning_delay();
                debug!(?enemy, ?line, ?delay, "strike scheduled");
                self.pending.push(PendingStrike {
                    line,
                    remaining: delay,
                });
                notices.push(Event::StrikeScheduled { line, delay });
            }
        }
    }

    /// Picks the line holding the most valuable defenders.
    ///
    /// Rows are scored first and win ties; a column must score strictly
    /// higher to be chosen. When nothing scores above zero the middle row is
    /// used.
    pub fn plan(&mut self, defenders: &DefenderView) -> StrikeLine {
        self.row_scores.clear();
        self.row_scores.resize(self.rows as usize, 0);
        self.column_scores.clear();
        self.column_scores.resize(self.columns as usize, 0);

        for defender in defenders.iter() {
            if defender.destroyed {
                continue;
            }
            let weight = if defender.kind.is_air_defense() {
                self.config.air_defense_weight
            } else {
                self.config.tower_weight
            };
            let score = u64::from(defender.max_hp) * u64::from(weight);
            if let Some(row) = self.row_scores.get_mut(defender.cell.row() as usize) {
                *row += score;
            }
            if let Some(column) = self.column_scores.get_mut(defender.cell.column() as usize) {
                *column += score;
            }
        }

        let (row, row_score) = best(&self.row_scores);
        let (column, column_score) = best(&self.column_scores);
        if column_score > row_score {
            StrikeLine::Column(column)
        } else if row_score > 0 {
            StrikeLine::Row(row)
        } else {
            StrikeLine::Row(self.rows / 2)
        }
    }

    /// Strikes still counting down, in scheduling order.
    #[must_use]
    pub fn pending(&self) -> &[PendingStrike] {
        &self.pending
    }
}

/// Index and value of the first maximum.
fn best(scores: &[u64]) -> (u32, u64) {
    let mut best = (0, 0);
    for (index, score) in scores.iter().enumerate() {
        if *score > best.1 {
            best = (index as u32, *score);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{
        CellCoord, DefenderId, DefenderKind, DefenderSnapshot, EnemyId, Vec2, Weapon,
    };

    fn defender(
        id: u32,
        kind: DefenderKind,
        column: u32,
        row: u32,
        max_hp: u32,
    ) -> DefenderSnapshot {
        DefenderSnapshot {
            id: DefenderId::new(id),
            kind,
            cell: CellCoord::new(column, row),
            position: Vec2::ZERO,
            hp: max_hp,
            max_hp,
            range_tiles: 3.0,
            weapon: Weapon::Instant { damage: 1 },
            target: None,
            ready_in: Duration::ZERO,
            destroyed: false,
        }
    }

    fn system() -> AirStrike {
        AirStrike::new(RaidConfig::default(), 16, 9)
    }

    #[test]
    fn empty_maps_fall_back_to_the_middle_row() {
        let mut strike = system();
        assert_eq!(
            strike.plan(&DefenderView::from_snapshots(Vec::new())),
            StrikeLine::Row(4)
        );
    }

    #[test]
    fn rows_win_ties_against_columns() {
        let mut strike = system();
        let view = DefenderView::from_snapshots(vec![defender(
            1,
            DefenderKind::FastTower,
            3,
            2,
            100,
        )]);
        assert_eq!(strike.plan(&view), StrikeLine::Row(2));
    }

    #[test]
    fn columns_win_when_strictly_better() {
        let mut strike = system();
        let view = DefenderView::from_snapshots(vec![
            defender(1, DefenderKind::FastTower, 5, 1, 100),
            defender(2, DefenderKind::FastTower, 5, 6, 100),
            defender(3, DefenderKind::FastTower, 9, 6, 50),
        ]);
        assert_eq!(strike.plan(&view), StrikeLine::Column(5));
    }

    #[test]
    fn air_defenses_weigh_more_than_towers() {
        let mut strike = system();
        let view = DefenderView::from_snapshots(vec![
            defender(1, DefenderKind::FastTower, 1, 1, 100),
            defender(2, DefenderKind::FastTower, 2, 1, 100),
            defender(3, DefenderKind::HeavyAirDefense, 7, 5, 150),
        ]);
        assert_eq!(strike.plan(&view), StrikeLine::Row(5));
    }

    #[test]
    fn destroyed_defenders_do_not_count() {
        let mut strike = system();
        let mut fallen = defender(1, DefenderKind::FastTower, 1, 1, 100);
        fallen.destroyed = true;
        assert_eq!(
            strike.plan(&DefenderView::from_snapshots(vec![fallen])),
            StrikeLine::Row(4)
        );
    }

    #[test]
    fn zero_weights_fall_back_to_the_middle_row() {
        let mut strike = AirStrike::new(
            RaidConfig {
                tower_weight: 0,
                air_defense_weight: 0,
                ..RaidConfig::default()
            },
            16,
            9,
        );
        let view = DefenderView::from_snapshots(vec![
            defender(1, DefenderKind::FastTower, 2, 1, 100),
            defender(2, DefenderKind::LightAirDefense, 6, 7, 80),
        ]);
        assert_eq!(strike.plan(&view), StrikeLine::Row(4));
    }

    #[test]
    fn strikes_land_after_the_warning_delay() {
        let mut strike = system();
        let view = DefenderView::from_snapshots(vec![defender(
            1,
            DefenderKind::PowerTower,
            4,
            3,
            150,
        )]);
        let mut out = Vec::new();
        let mut notices = Vec::new();

        strike.handle(
            &[Event::RaidMidpointReached {
                enemy: EnemyId::new(8),
            }],
            &view,
            Duration::from_millis(16),
            &mut out,
            &mut notices,
        );
        assert!(out.is_empty());
        assert_eq!(
            notices,
            vec![Event::StrikeScheduled {
                line: StrikeLine::Row(3),
                delay: Duration::from_secs(1),
            }]
        );
        assert_eq!(
            strike.pending(),
            &[PendingStrike {
                line: StrikeLine::Row(3),
                remaining: Duration::from_secs(1),
            }]
        );

        strike.handle(
            &[],
            &view,
            Duration::from_millis(600),
            &mut out,
            &mut notices,
        );
        assert!(out.is_empty());
        assert_eq!(strike.pending()[0].remaining, Duration::from_millis(400));

        strike.handle(
            &[],
            &view,
            Duration::from_millis(400),
            &mut out,
            &mut notices,
        );
        assert_eq!(
            out,
            vec![Command::StrikeLine {
                line: StrikeLine::Row(3),
                damage: 50,
            }]
        );
        assert!(strike.pending().is_empty());
    }
}
