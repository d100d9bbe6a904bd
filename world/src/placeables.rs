//! Speed bumps and bombs dropped on placeable slots.

use std::{collections::BTreeMap, time::Duration};

use lane_defence_core::{
    config::PlaceableRoster, CellCoord, PlaceableId, PlaceableKind, PlaceableSnapshot, Vec2,
};

/// Duration of the slow refreshed by a speed bump every tick.
pub(crate) const SPEED_BUMP_SLOW: Duration = Duration::from_millis(500);
/// Blast radius relative to the bomb's trigger radius.
pub(crate) const BLAST_FACTOR: f32 = 1.2;

/// Variant payload of a placeable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Effect {
    /// Slows ground enemies inside its radius until it expires.
    SpeedBump {
        multiplier: f32,
        radius: f32,
        remaining: Duration,
    },
    /// Explodes once a ground enemy comes within `trigger_radius`.
    Bomb { damage: u32, trigger_radius: f32 },
}

/// Placeable stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Placeable {
    pub(crate) id: PlaceableId,
    pub(crate) kind: PlaceableKind,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) effect: Effect,
    pub(crate) spent: bool,
}

impl Placeable {
    pub(crate) fn new(
        id: PlaceableId,
        kind: PlaceableKind,
        roster: &PlaceableRoster,
        cell: CellCoord,
        position: Vec2,
        tile_size: f32,
    ) -> Self {
        let effect = match kind {
            PlaceableKind::SpeedBump => Effect::SpeedBump {
                multiplier: roster.speed_bump.slow_multiplier,
                radius: roster.speed_bump.radius_tiles * tile_size,
                remaining: Duration::try_from_secs_f32(roster.speed_bump.duration_secs)
                    .unwrap_or(Duration::ZERO),
            },
            PlaceableKind::Bomb => Effect::Bomb {
                damage: roster.bomb.damage,
                trigger_radius: roster.bomb.radius_tiles * tile_size,
            },
        };
        Self {
            id,
            kind,
            cell,
            position,
            effect,
            spent: false,
        }
    }

    pub(crate) fn snapshot(&self) -> PlaceableSnapshot {
        let (remaining, armed) = match self.effect {
            Effect::SpeedBump { remaining, .. } => (Some(remaining), false),
            Effect::Bomb { .. } => (None, !self.spent),
        };
        PlaceableSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            remaining,
            armed,
        }
    }
}

/// Registry that stores placeables and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct PlaceableRegistry {
    entries: BTreeMap<PlaceableId, Placeable>,
    next_placeable_id: PlaceableId,
}

impl PlaceableRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_placeable_id: PlaceableId::new(0),
        }
    }

    pub(crate) fn allocate(&mut self) -> PlaceableId {
        let id = self.next_placeable_id;
        self.next_placeable_id = PlaceableId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, placeable: Placeable) {
        let _ = self.entries.insert(placeable.id, placeable);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Placeable> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Placeable> {
        self.entries.values_mut()
    }

    pub(crate) fn clear_spent(&mut self) {
        self.entries.retain(|_, placeable| !placeable.spent);
    }
}
