#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The world owns every live entity collection. It is mutated exclusively
//! through [`apply`], which executes one [`Command`] and reports what happened
//! as [`Event`] values, and it is observed through the read-only [`query`]
//! functions.

mod defenders;
mod enemies;
mod grid;
mod path;
mod placeables;
mod projectiles;

use std::time::Duration;

use lane_defence_core::{
    config::{Balance, LevelLayout},
    CellCoord,
    Command,
    DefenderId,
    DefenderKind,
    EnemyId,
    EnemyKind,
    Event,
    Lane,
    PlaceableKind,
    PlacementError,
    StrikeLine,
    Vec2,
    Weapon,
    WELCOME_BANNER,
};

pub use grid::{GridMap, NamedPath, SlotKind, SlotState};
pub use path::{GridPath, PathError};

use defenders::{Defender, DefenderRegistry};
use enemies::{
    Behaviour, DamageOutcome, Enemy, EnemyRegistry, ARMOR_ATTACK_INTERVAL, ARMOR_ENGAGEMENT_TILES,
};
use placeables::{Effect, Placeable, PlaceableRegistry, BLAST_FACTOR, SPEED_BUMP_SLOW};
use projectiles::{Flight, Projectile, ProjectileRegistry, NEAR_MISS_TILES};

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: GridMap,
    balance: Balance,
    enemies: EnemyRegistry,
    defenders: DefenderRegistry,
    projectiles: ProjectileRegistry,
    placeables: PlaceableRegistry,
    elapsed: Duration,
    tick_index: u64,
}

impl World {
    /// Creates an empty world for the provided level and balance sheet.
    pub fn new(layout: &LevelLayout, balance: Balance) -> Result<Self, PathError> {
        Ok(Self {
            banner: WELCOME_BANNER,
            grid: GridMap::from_layout(layout)?,
            balance,
            enemies: EnemyRegistry::new(),
            defenders: DefenderRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            placeables: PlaceableRegistry::new(),
            elapsed: Duration::ZERO,
            tick_index: 0,
        })
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, lane: Option<Lane>, out_events: &mut Vec<Event>) {
        let lane = if kind.is_airborne() { None } else { lane };
        let path = if kind.is_airborne() {
            self.grid.flight_path()
        } else {
            self.grid.main_path()
        };
        let id = self.enemies.allocate();
        let enemy = Enemy::spawn(
            id,
            kind,
            self.balance.enemies.get(kind),
            lane,
            path,
            self.grid.lane_offset(),
        );
        self.enemies.insert(enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            lane,
        });
    }

    fn place_defender(&mut self, kind: DefenderKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        let slot = match self.grid.slot(cell) {
            Some(slot) if slot.kind == SlotKind::Build => slot,
            _ => {
                out_events.push(Event::PlacementRejected {
                    cell,
                    reason: PlacementError::NotASlot { cell },
                });
                return;
            }
        };
        if let Some(occupant) = slot.occupant {
            out_events.push(Event::PlacementRejected {
                cell,
                reason: PlacementError::Occupied {
                    cell,
                    defender: occupant,
                },
            });
            return;
        }

        let id = self.defenders.allocate();
        let defender = Defender::new(
            id,
            kind,
            self.balance.defenders.get(kind),
            cell,
            self.grid.cell_center(cell),
        );
        self.defenders.insert(defender);
        self.grid.occupy(cell, id);
        out_events.push(Event::DefenderPlaced {
            defender: id,
            kind,
            cell,
        });
    }

    fn place_placeable(
        &mut self,
        kind: PlaceableKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        if self.grid.slot(cell).map(|slot| slot.kind) != Some(SlotKind::Placeable) {
            out_events.push(Event::PlacementRejected {
                cell,
                reason: PlacementError::NotASlot { cell },
            });
            return;
        }

        let id = self.placeables.allocate();
        let placeable = Placeable::new(
            id,
            kind,
            &self.balance.placeables,
            cell,
            self.grid.cell_center(cell),
            self.grid.tile_size(),
        );
        self.placeables.insert(placeable);
        out_events.push(Event::PlaceablePlaced {
            placeable: id,
            kind,
            cell,
        });
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let tile_size = self.grid.tile_size();
        let lane_offset = self.grid.lane_offset();
        for enemy in self.enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }
            enemy.decay_status(dt);
            let path = if enemy.kind.is_airborne() {
                self.grid.flight_path()
            } else {
                self.grid.main_path()
            };
            let advance = enemy.advance(path, tile_size, lane_offset, dt);
            if advance.crossed_midpoint {
                out_events.push(Event::RaidMidpointReached { enemy: enemy.id });
            }
            if advance.reached_end {
                out_events.push(Event::EnemyLeaked {
                    enemy: enemy.id,
                    kind: enemy.kind,
                    power: enemy.power,
                });
            }
        }
    }

    fn run_armor(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut attacks = Vec::new();
        for enemy in self.enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }
            if let Behaviour::Armored { dps, reload } = &mut enemy.behaviour {
                *reload = reload.saturating_sub(dt);
                if reload.is_zero() {
                    *reload = ARMOR_ATTACK_INTERVAL;
                    let damage = (*dps as f32 * ARMOR_ATTACK_INTERVAL.as_secs_f32()).round() as u32;
                    attacks.push((enemy.id, enemy.position, damage));
                }
            }
        }

        let radius = ARMOR_ENGAGEMENT_TILES * self.grid.tile_size();
        for (attacker, origin, damage) in attacks {
            match self.armor_target(attacker, origin, radius) {
                Some(ArmorTarget::Defender(id)) => {
                    if let Some(defender) = self.defenders.get_mut(id) {
                        hurt_defender(defender, &mut self.grid, damage, out_events);
                    }
                }
                Some(ArmorTarget::Enemy(id)) => {
                    if let Some(enemy) = self.enemies.get_mut(id) {
                        hurt_enemy(enemy, damage, out_events);
                    }
                }
                None => {}
            }
        }
    }

    /// Closest tower, else closest air defense, else closest other ground enemy.
    fn armor_target(&self, attacker: EnemyId, origin: Vec2, radius: f32) -> Option<ArmorTarget> {
        let standing = || self.defenders.iter().filter(|unit| !unit.destroyed);
        closest(
            origin,
            radius,
            standing()
                .filter(|defender| !defender.kind.is_air_defense())
                .map(|defender| (defender.id, defender.position)),
        )
        .or_else(|| {
            closest(
                origin,
                radius,
                standing()
                    .filter(|defender| defender.kind.is_air_defense())
                    .map(|defender| (defender.id, defender.position)),
            )
        })
        .map(ArmorTarget::Defender)
        .or_else(|| {
            closest(
                origin,
                radius,
                self.enemies
                    .iter()
                    .filter(|enemy| {
                        enemy.id != attacker && enemy.is_alive() && !enemy.kind.is_airborne()
                    })
                    .map(|enemy| (enemy.id, enemy.position)),
            )
            .map(ArmorTarget::Enemy)
        })
    }

    fn fire(&mut self, defender_id: DefenderId, target: EnemyId, out_events: &mut Vec<Event>) {
        let tile_size = self.grid.tile_size();
        let Some(defender) = self.defenders.get_mut(defender_id) else {
            return;
        };
        if !defender.is_ready() {
            return;
        }
        let Some(enemy) = self.enemies.live_mut(target) else {
            return;
        };
        if !defender.kind.can_target(enemy.kind) {
            return;
        }

        match defender.weapon {
            Weapon::Projectile {
                damage,
                speed_tiles,
            } => {
                let id = self.projectiles.allocate();
                self.projectiles.insert(Projectile {
                    id,
                    source: defender.id,
                    target,
                    position: defender.position,
                    speed: speed_tiles * tile_size,
                    damage,
                    active: true,
                });
                out_events.push(Event::ProjectileLaunched {
                    projectile: id,
                    defender: defender.id,
                    target,
                });
            }
            Weapon::Instant { damage } => hurt_enemy(enemy, damage, out_events),
            Weapon::Flak { .. } => return,
        }
        defender.start_reload();
    }

    fn fire_flak(
        &mut self,
        defender_id: DefenderId,
        target: EnemyId,
        hit: bool,
        out_events: &mut Vec<Event>,
    ) {
        let Some(defender) = self.defenders.get_mut(defender_id) else {
            return;
        };
        if !defender.is_ready() || !matches!(defender.weapon, Weapon::Flak { .. }) {
            return;
        }
        let Some(enemy) = self.enemies.live_mut(target) else {
            return;
        };
        if !defender.kind.can_target(enemy.kind) {
            return;
        }

        defender.start_reload();
        out_events.push(Event::FlakResolved {
            defender: defender_id,
            target,
            hit,
        });
        if hit && enemy.destroy() == DamageOutcome::Killed {
            out_events.push(Event::EnemyKilled {
                enemy: enemy.id,
                kind: enemy.kind,
            });
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let near_miss = NEAR_MISS_TILES * self.grid.tile_size();
        for projectile in self.projectiles.iter_mut() {
            if !projectile.active {
                continue;
            }
            let Some(enemy) = self.enemies.live_mut(projectile.target) else {
                projectile.active = false;
                continue;
            };

            let step = projectile.speed * dt.as_secs_f32();
            if projectile.fly_toward(enemy.position, step, near_miss) == Flight::Arrived {
                projectile.active = false;
                hurt_enemy(enemy, projectile.damage, out_events);
            }
        }
    }

    fn advance_placeables(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for placeable in self.placeables.iter_mut() {
            if placeable.spent {
                continue;
            }
            let origin = placeable.position;
            match &mut placeable.effect {
                Effect::SpeedBump {
                    multiplier,
                    radius,
                    remaining,
                } => {
                    *remaining = remaining.saturating_sub(dt);
                    if remaining.is_zero() {
                        placeable.spent = true;
                        continue;
                    }
                    for enemy in self.enemies.iter_mut() {
                        if is_ground_target(enemy) && enemy.position.distance(origin) <= *radius {
                            enemy.apply_slow(*multiplier, SPEED_BUMP_SLOW);
                        }
                    }
                }
                Effect::Bomb {
                    damage,
                    trigger_radius,
                } => {
                    let triggered = self.enemies.iter().any(|enemy| {
                        is_ground_target(enemy)
                            && enemy.position.distance(origin) <= *trigger_radius
                    });
                    if !triggered {
                        continue;
                    }

                    let blast = *trigger_radius * BLAST_FACTOR;
                    let mut enemies_hit = 0;
                    for enemy in self.enemies.iter_mut() {
                        if is_ground_target(enemy) && enemy.position.distance(origin) <= blast {
                            enemies_hit += 1;
                            hurt_enemy(enemy, *damage, out_events);
                        }
                    }
                    placeable.spent = true;
                    out_events.push(Event::BombDetonated {
                        placeable: placeable.id,
                        enemies_hit,
                    });
                }
            }
        }
    }

    fn strike_line(&mut self, line: StrikeLine, damage: u32, out_events: &mut Vec<Event>) {
        let mut defenders_hit = 0;
        for defender in self.defenders.iter_mut() {
            if defender.destroyed || !line.contains(defender.cell) {
                continue;
            }
            defenders_hit += 1;
            hurt_defender(defender, &mut self.grid, damage, out_events);
        }
        out_events.push(Event::StrikeLanded {
            line,
            defenders_hit,
        });
    }

    fn clear_casualties(&mut self) {
        self.enemies.clear_casualties();
        self.defenders.clear_casualties();
        self.projectiles.clear_spent();
        self.placeables.clear_spent();
    }
}

#[derive(Clone, Copy, Debug)]
enum ArmorTarget {
    Defender(DefenderId),
    Enemy(EnemyId),
}

/// First candidate with the smallest distance inside the radius.
fn closest<T>(origin: Vec2, radius: f32, candidates: impl Iterator<Item = (T, Vec2)>) -> Option<T> {
    let mut best: Option<(T, f32)> = None;
    for (id, position) in candidates {
        let distance = origin.distance(position);
        let closer = match &best {
            Some((_, current)) => distance < *current,
            None => true,
        };
        if distance <= radius && closer {
            best = Some((id, distance));
        }
    }
    best.map(|(id, _)| id)
}

fn is_ground_target(enemy: &Enemy) -> bool {
    enemy.is_alive() && !enemy.kind.is_airborne()
}

fn hurt_enemy(enemy: &mut Enemy, amount: u32, out_events: &mut Vec<Event>) {
    if enemy.take_damage(amount) == DamageOutcome::Killed {
        out_events.push(Event::EnemyKilled {
            enemy: enemy.id,
            kind: enemy.kind,
        });
    }
}

/// Damages a defender, releasing its slot on the hit that destroys it.
fn hurt_defender(
    defender: &mut Defender,
    grid: &mut GridMap,
    amount: u32,
    out_events: &mut Vec<Event>,
) {
    if defender.take_damage(amount) {
        grid.release(defender.cell, defender.id);
        out_events.push(Event::DefenderDestroyed {
            defender: defender.id,
            kind: defender.kind,
            cell: defender.cell,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            world.advance_enemies(dt, out_events);
            world.run_armor(dt, out_events);
            for defender in world.defenders.iter_mut() {
                defender.cooldown = defender.cooldown.saturating_sub(dt);
            }
        }
        Command::SpawnEnemy { kind, lane } => world.spawn_enemy(kind, lane, out_events),
        Command::LaunchRaid => world.spawn_enemy(EnemyKind::Aircraft, None, out_events),
        Command::PlaceDefender { kind, cell } => world.place_defender(kind, cell, out_events),
        Command::PlacePlaceable { kind, cell } => world.place_placeable(kind, cell, out_events),
        Command::AssignTarget { defender, target } => {
            if let Some(defender) = world.defenders.get_mut(defender) {
                if !defender.destroyed {
                    defender.target = target;
                }
            }
        }
        Command::Fire { defender, target } => world.fire(defender, target, out_events),
        Command::FireFlak {
            defender,
            target,
            hit,
        } => world.fire_flak(defender, target, hit, out_events),
        Command::AdvanceProjectiles { dt } => world.advance_projectiles(dt, out_events),
        Command::AdvancePlaceables { dt } => world.advance_placeables(dt, out_events),
        Command::StrikeLine { line, damage } => world.strike_line(line, damage, out_events),
        Command::ClearCasualties => world.clear_casualties(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{GridMap, SlotState, World};
    use lane_defence_core::{
        config::Balance, CellCoord, DefenderView, EnemyView, PlaceableSnapshot, ProjectileSnapshot,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the level geometry and slots.
    #[must_use]
    pub fn grid(world: &World) -> &GridMap {
        &world.grid
    }

    /// Provides read-only access to the balance sheet the world was built with.
    #[must_use]
    pub fn balance(world: &World) -> &Balance {
        &world.balance
    }

    /// Captures a read-only view of every enemy still tracked by the world.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of every defender still tracked by the world.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        DefenderView::from_snapshots(
            world
                .defenders
                .iter()
                .map(|defender| defender.snapshot())
                .collect(),
        )
    }

    /// Snapshots of the projectiles in flight, ordered by identifier.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .filter(|projectile| projectile.active)
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Snapshots of the active placeables, ordered by identifier.
    #[must_use]
    pub fn placeables(world: &World) -> Vec<PlaceableSnapshot> {
        world
            .placeables
            .iter()
            .filter(|placeable| !placeable.spent)
            .map(|placeable| placeable.snapshot())
            .collect()
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn alive_enemy_count(world: &World) -> usize {
        world.enemies.alive_count()
    }

    /// State of the slot at the cell, or `None` when the cell is not a slot.
    #[must_use]
    pub fn slot(world: &World, cell: CellCoord) -> Option<SlotState> {
        world.grid.slot(cell)
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
