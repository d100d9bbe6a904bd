//! Homing projectiles in flight.

use std::collections::BTreeMap;

use lane_defence_core::{DefenderId, EnemyId, ProjectileId, ProjectileSnapshot, Vec2};

/// Near-miss radius expressed as a fraction of a tile.
pub(crate) const NEAR_MISS_TILES: f32 = 5.0 / 64.0;

/// Projectile stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) source: DefenderId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    /// World units per second.
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) active: bool,
}

/// Result of moving a projectile for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Flight {
    /// Still travelling.
    Travelling,
    /// Reached the target this step.
    Arrived,
}

impl Projectile {
    /// Moves toward the freshly sampled target position.
    ///
    /// Arrival happens when the remaining distance fits within this step or
    /// drops inside the near-miss radius.
    pub(crate) fn fly_toward(&mut self, target: Vec2, step: f32, near_miss: f32) -> Flight {
        let to_target = target - self.position;
        let distance = to_target.length();
        if distance <= step || distance < near_miss {
            self.position = target;
            return Flight::Arrived;
        }
        self.position += to_target / distance * step;
        Flight::Travelling
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            source: self.source,
            target: self.target,
            position: self.position,
            damage: self.damage,
        }
    }
}

/// Registry that stores projectiles and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn allocate(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, projectile: Projectile) {
        let _ = self.entries.insert(projectile.id, projectile);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.entries.values_mut()
    }

    pub(crate) fn clear_spent(&mut self) {
        self.entries.retain(|_, projectile| projectile.active);
    }
}
