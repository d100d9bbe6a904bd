//! Authoritative enemy state and per-variant behaviour.

use std::{collections::BTreeMap, time::Duration};

use lane_defence_core::{
    config::EnemyStats, EnemyId, EnemyKind, EnemySnapshot, EnemyState, Lane, Vec2,
};

use crate::path::GridPath;

/// Own-path progress at which an aircraft triggers its strike.
pub(crate) const RAID_MIDPOINT: f32 = 0.5;
/// Radius, in tiles, within which armored enemies engage targets.
pub(crate) const ARMOR_ENGAGEMENT_TILES: f32 = 2.0;
/// Time between two attacks of an armored enemy.
pub(crate) const ARMOR_ATTACK_INTERVAL: Duration = Duration::from_secs(1);

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The enemy was no longer alive, nothing changed.
    Ignored,
    /// Hit points dropped but the enemy survived.
    Wounded,
    /// The hit dropped the enemy to zero hit points.
    Killed,
}

/// Transitions observed while advancing an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Advance {
    /// The enemy reached the end of its path during this step.
    pub(crate) reached_end: bool,
    /// The aircraft crossed its strike midpoint during this step.
    pub(crate) crossed_midpoint: bool,
}

/// Variant payload driving the per-tick hooks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Behaviour {
    /// Follows the path and nothing else.
    Infantry,
    /// Periodically damages the closest nearby target.
    Armored {
        /// Damage dealt per second of attack interval.
        dps: u32,
        /// Time left before the next attack.
        reload: Duration,
    },
    /// Flies its own line and triggers a strike at the midpoint.
    Airborne {
        /// Set once the midpoint strike was triggered.
        strike_triggered: bool,
    },
}

impl Behaviour {
    fn for_kind(kind: EnemyKind, stats: &EnemyStats) -> Self {
        match kind {
            EnemyKind::Soldier | EnemyKind::FastSoldier | EnemyKind::HeavySoldier => {
                Self::Infantry
            }
            EnemyKind::Tank => Self::Armored {
                dps: stats.defender_dps.unwrap_or(0),
                reload: Duration::ZERO,
            },
            EnemyKind::Aircraft => Self::Airborne {
                strike_triggered: false,
            },
        }
    }
}

/// Active slow applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Slow {
    multiplier: f32,
    remaining: Duration,
}

impl Slow {
    const NONE: Self = Self {
        multiplier: 1.0,
        remaining: Duration::ZERO,
    };
}

/// Enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) state: EnemyState,
    pub(crate) position: Vec2,
    pub(crate) progress: f32,
    pub(crate) lane: Option<Lane>,
    pub(crate) power: u32,
    pub(crate) behaviour: Behaviour,
    hp: u32,
    max_hp: u32,
    speed_tiles: f32,
    slow: Slow,
}

impl Enemy {
    /// Creates an enemy at the start of the provided path.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        stats: &EnemyStats,
        lane: Option<Lane>,
        path: &GridPath,
        lane_offset: f32,
    ) -> Self {
        let offset = lane.map_or(0.0, |lane| lane.signed_offset(lane_offset));
        Self {
            id,
            kind,
            state: EnemyState::Alive,
            position: path.lane_position(0.0, offset),
            progress: 0.0,
            lane,
            power: stats.power,
            behaviour: Behaviour::for_kind(kind, stats),
            hp: stats.hp,
            max_hp: stats.hp,
            speed_tiles: stats.speed_tiles,
            slow: Slow::NONE,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Applies a slow; the stronger multiplier and the longer duration win.
    pub(crate) fn apply_slow(&mut self, multiplier: f32, duration: Duration) {
        if !self.is_alive() {
            return;
        }
        self.slow.multiplier = self.slow.multiplier.min(multiplier.clamp(0.0, 1.0));
        self.slow.remaining = self.slow.remaining.max(duration);
    }

    /// Counts down active status effects, restoring full speed on expiry.
    pub(crate) fn decay_status(&mut self, dt: Duration) {
        if self.slow.remaining.is_zero() {
            self.slow = Slow::NONE;
            return;
        }
        self.slow.remaining = self.slow.remaining.saturating_sub(dt);
        if self.slow.remaining.is_zero() {
            self.slow = Slow::NONE;
        }
    }

    /// Moves the enemy along its path and reports the transitions it crossed.
    pub(crate) fn advance(
        &mut self,
        path: &GridPath,
        tile_size: f32,
        lane_offset: f32,
        dt: Duration,
    ) -> Advance {
        let mut advance = Advance::default();
        if !self.is_alive() {
            return advance;
        }

        let length = path.total_length();
        let before = self.progress;
        if length > 0.0 {
            let distance = self.speed_tiles * self.slow.multiplier * tile_size * dt.as_secs_f32();
            self.progress = (self.progress + distance / length).clamp(before, 1.0);
        } else {
            self.progress = 1.0;
        }

        let offset = match self.lane {
            Some(lane) => lane.signed_offset(lane_offset),
            None => 0.0,
        };
        self.position = path.lane_position(self.progress, offset);

        if let Behaviour::Airborne { strike_triggered } = &mut self.behaviour {
            if !*strike_triggered && self.progress >= RAID_MIDPOINT {
                *strike_triggered = true;
                advance.crossed_midpoint = true;
            }
        }

        if self.progress >= 1.0 {
            self.state = EnemyState::Leaked;
            advance.reached_end = true;
        }
        advance
    }

    /// Subtracts hit points. Dead or leaked enemies ignore further damage.
    ///
    /// Aircraft are destroyed by any non-zero hit.
    pub(crate) fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        if amount == 0 {
            return DamageOutcome::Wounded;
        }

        self.hp = if self.kind.is_airborne() {
            0
        } else {
            self.hp.saturating_sub(amount)
        };
        if self.hp == 0 {
            self.state = EnemyState::Dead;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Destroys the enemy outright.
    pub(crate) fn destroy(&mut self) -> DamageOutcome {
        self.take_damage(self.hp.max(1))
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            state: self.state,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            progress: self.progress,
            lane: self.lane,
            slow_multiplier: self.slow.multiplier,
            power: self.power,
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn allocate(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, enemy: Enemy) {
        let _ = self.entries.insert(enemy.id, enemy);
    }

    /// Looks the handle up again, yielding the enemy only while it is alive.
    pub(crate) fn live_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.get_mut(id).filter(|enemy| enemy.is_alive())
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.entries.values_mut()
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Drops every enemy that is no longer alive.
    pub(crate) fn clear_casualties(&mut self) {
        self.entries.retain(|_, enemy| enemy.is_alive());
    }
}
