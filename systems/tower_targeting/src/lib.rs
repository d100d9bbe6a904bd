#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic defender targets from world snapshots.
//!
//! A defender keeps its current target for as long as that enemy is alive and
//! of a kind it can engage, even after the enemy leaves its range. Otherwise
//! the system scans the enemies in identifier order and picks the one with the
//! highest priority among those in range, as scored by a pluggable
//! [`PriorityTable`].

use std::collections::BTreeMap;

use lane_defence_core::{
    Command, DefenderKind, DefenderSnapshot, DefenderView, EnemyId, EnemySnapshot, EnemyView,
};

/// Everything a priority function may inspect about a candidate.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    /// Defender choosing a target.
    pub defender: &'a DefenderSnapshot,
    /// Enemy being scored.
    pub enemy: &'a EnemySnapshot,
    /// Distance between the two in world units.
    pub distance: f32,
    /// Defender range in world units.
    pub range: f32,
}

/// Scores a candidate; larger values are preferred.
pub type PriorityFn = fn(&Candidate<'_>) -> f32;

/// Prefers the enemy furthest along its path.
#[must_use]
pub fn progress_priority(candidate: &Candidate<'_>) -> f32 {
    candidate.enemy.progress
}

/// Prefers advanced enemies with a bonus for proximity.
#[must_use]
pub fn proximity_priority(candidate: &Candidate<'_>) -> f32 {
    let closeness = if candidate.range > 0.0 {
        1.0 - candidate.distance / candidate.range
    } else {
        0.0
    };
    candidate.enemy.progress + closeness * 0.5
}

/// Prefers advanced enemies with a bonus for remaining health.
#[must_use]
pub fn durability_priority(candidate: &Candidate<'_>) -> f32 {
    candidate.enemy.progress + candidate.enemy.hp_ratio() * 0.5
}

/// Per-kind priority functions with a shared fallback.
#[derive(Clone, Debug)]
pub struct PriorityTable {
    fallback: PriorityFn,
    overrides: BTreeMap<DefenderKind, PriorityFn>,
}

impl PriorityTable {
    /// Creates a table that scores every kind with `fallback`.
    #[must_use]
    pub fn new(fallback: PriorityFn) -> Self {
        Self {
            fallback,
            overrides: BTreeMap::new(),
        }
    }

    /// Returns the table with `priority` registered for `kind`.
    #[must_use]
    pub fn with(mut self, kind: DefenderKind, priority: PriorityFn) -> Self {
        self.set(kind, priority);
        self
    }

    /// Registers `priority` for `kind`, replacing any previous entry.
    pub fn set(&mut self, kind: DefenderKind, priority: PriorityFn) {
        let _ = self.overrides.insert(kind, priority);
    }

    /// Priority function used for `kind`.
    #[must_use]
    pub fn get(&self, kind: DefenderKind) -> PriorityFn {
        self.overrides.get(&kind).copied().unwrap_or(self.fallback)
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::new(progress_priority)
            .with(DefenderKind::FastTower, proximity_priority)
            .with(DefenderKind::PowerTower, durability_priority)
    }
}

/// Defender targeting system.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    priorities: PriorityTable,
}

impl TowerTargeting {
    /// Creates a targeting system with the standard priority table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a targeting system that scores candidates with `priorities`.
    #[must_use]
    pub fn with_priorities(priorities: PriorityTable) -> Self {
        Self { priorities }
    }

    /// Mutable access to the priority table.
    pub fn priorities_mut(&mut self) -> &mut PriorityTable {
        &mut self.priorities
    }

    /// Emits `Command::AssignTarget` for every defender whose target changes.
    pub fn handle(
        &mut self,
        defenders: &DefenderView,
        enemies: &EnemyView,
        tile_size: f32,
        out: &mut Vec<Command>,
    ) {
        for defender in defenders.iter() {
            if defender.destroyed {
                continue;
            }

            let kept = defender
                .target
                .and_then(|id| enemies.get(id))
                .filter(|enemy| is_engageable(defender, enemy))
                .map(|enemy| enemy.id);
            let target = kept.or_else(|| self.select(defender, enemies, tile_size));

            if target != defender.target {
                out.push(Command::AssignTarget {
                    defender: defender.id,
                    target,
                });
            }
        }
    }

    fn select(
        &self,
        defender: &DefenderSnapshot,
        enemies: &EnemyView,
        tile_size: f32,
    ) -> Option<EnemyId> {
        let priority = self.priorities.get(defender.kind);
        let range = defender.range_tiles * tile_size;

        let mut best = None;
        let mut best_priority = -1.0;
        for enemy in enemies.iter() {
            if !is_engageable(defender, enemy) {
                continue;
            }
            let distance = defender.position.distance(enemy.position);
            if distance > range {
                continue;
            }

            let score = priority(&Candidate {
                defender,
                enemy,
                distance,
                range,
            });
            if score > best_priority {
                best_priority = score;
                best = Some(enemy.id);
            }
        }
        best
    }
}

fn is_engageable(defender: &DefenderSnapshot, enemy: &EnemySnapshot) -> bool {
    enemy.state.is_alive() && defender.kind.can_target(enemy.kind)
}
