//! Authoritative tower and air defense state management utilities.

use std::{collections::BTreeMap, time::Duration};

use lane_defence_core::{
    config::DefenderStats, CellCoord, DefenderId, DefenderKind, DefenderSnapshot, EnemyId, Vec2,
    Weapon,
};

/// Defender stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Defender {
    /// Identifier allocated by the world for the defender.
    pub(crate) id: DefenderId,
    /// Kind of defender that was constructed.
    pub(crate) kind: DefenderKind,
    /// Build slot occupied by the defender.
    pub(crate) cell: CellCoord,
    /// Centre of the build slot.
    pub(crate) position: Vec2,
    /// Weapon discharged on each shot.
    pub(crate) weapon: Weapon,
    /// Enemy currently tracked.
    pub(crate) target: Option<EnemyId>,
    /// Time left until the defender may fire again.
    pub(crate) cooldown: Duration,
    /// Set once hit points reach zero.
    pub(crate) destroyed: bool,
    hp: u32,
    max_hp: u32,
    range_tiles: f32,
    reload: Duration,
}

impl Defender {
    pub(crate) fn new(
        id: DefenderId,
        kind: DefenderKind,
        stats: &DefenderStats,
        cell: CellCoord,
        position: Vec2,
    ) -> Self {
        Self {
            id,
            kind,
            cell,
            position,
            weapon: stats.weapon,
            target: None,
            cooldown: Duration::ZERO,
            destroyed: false,
            hp: stats.hp,
            max_hp: stats.hp,
            range_tiles: stats.range_tiles,
            reload: stats.reload(),
        }
    }

    /// Reports whether the defender may fire this tick.
    pub(crate) fn is_ready(&self) -> bool {
        !self.destroyed && self.cooldown.is_zero()
    }

    /// Starts the reload countdown after a shot.
    pub(crate) fn start_reload(&mut self) {
        self.cooldown = self.reload;
    }

    /// Subtracts hit points, returning `true` on the hit that destroys the defender.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        if self.destroyed {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.destroyed = true;
            self.target = None;
            return true;
        }
        false
    }

    pub(crate) fn snapshot(&self) -> DefenderSnapshot {
        DefenderSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            range_tiles: self.range_tiles,
            weapon: self.weapon,
            target: self.target,
            ready_in: self.cooldown,
            destroyed: self.destroyed,
        }
    }
}

/// Registry that stores defenders and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct DefenderRegistry {
    entries: BTreeMap<DefenderId, Defender>,
    next_defender_id: DefenderId,
}

impl DefenderRegistry {
    /// Creates an empty defender registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_defender_id: DefenderId::new(0),
        }
    }

    pub(crate) fn allocate(&mut self) -> DefenderId {
        let id = self.next_defender_id;
        self.next_defender_id = DefenderId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, defender: Defender) {
        let _ = self.entries.insert(defender.id, defender);
    }

    pub(crate) fn get_mut(&mut self, id: DefenderId) -> Option<&mut Defender> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Defender> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Defender> {
        self.entries.values_mut()
    }

    /// Drops destroyed defenders. Their slots were released when they fell.
    pub(crate) fn clear_casualties(&mut self) {
        self.entries.retain(|_, defender| !defender.destroyed);
    }
}
