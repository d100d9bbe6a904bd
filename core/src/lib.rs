#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod config;
mod notifications;

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use notifications::{Notification, NotificationBus, SubscriptionId};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the clock, moves enemies, runs enemy hooks and decays defender cooldowns.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a ground or airborne enemy enter the level.
    SpawnEnemy {
        /// Variant of enemy to create.
        kind: EnemyKind,
        /// Lane assigned to ground enemies; airborne enemies carry no lane.
        lane: Option<Lane>,
    },
    /// Requests that a special-event aircraft enter the level.
    LaunchRaid,
    /// Requests construction of a defender on a build slot.
    PlaceDefender {
        /// Variant of defender to construct.
        kind: DefenderKind,
        /// Build slot that will host the defender.
        cell: CellCoord,
    },
    /// Requests that a placeable be dropped on a placeable slot.
    PlacePlaceable {
        /// Variant of placeable to drop.
        kind: PlaceableKind,
        /// Placeable slot that receives the item.
        cell: CellCoord,
    },
    /// Replaces the target reference held by a defender.
    AssignTarget {
        /// Defender whose target changes.
        defender: DefenderId,
        /// Newly acquired target, or `None` to clear the reference.
        target: Option<EnemyId>,
    },
    /// Requests that a defender discharge its weapon at its target.
    Fire {
        /// Defender that fires.
        defender: DefenderId,
        /// Enemy the shot is aimed at.
        target: EnemyId,
    },
    /// Requests that an air defense resolve a pre-rolled flak shot.
    FireFlak {
        /// Air defense that fires.
        defender: DefenderId,
        /// Airborne enemy the shot is aimed at.
        target: EnemyId,
        /// Outcome of the hit roll performed by the combat system.
        hit: bool,
    },
    /// Advances every active projectile toward its target.
    AdvanceProjectiles {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Advances speed bump lifetimes and checks armed bombs.
    AdvancePlaceables {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Damages every live defender on a grid row or column.
    StrikeLine {
        /// Row or column receiving the strike.
        line: StrikeLine,
        /// Damage dealt to each defender on the line.
        damage: u32,
    },
    /// Removes dead or leaked enemies, destroyed defenders and spent projectiles or placeables.
    ClearCasualties,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the wave scheduler began spawning a wave.
    WaveStarted {
        /// One-based index of the wave.
        wave: u32,
        /// Total number of waves in the schedule.
        total: u32,
    },
    /// Announces that every group of a wave has been emitted.
    WaveCompleted {
        /// One-based index of the wave.
        wave: u32,
    },
    /// Reports that a spawn was skipped because the schedule named an unknown enemy.
    SpawnSkipped {
        /// One-based index of the wave containing the bad entry.
        wave: u32,
        /// Identifier that failed to resolve.
        identifier: String,
    },
    /// Confirms that an enemy entered the level.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Variant of the enemy.
        kind: EnemyKind,
        /// Lane the enemy travels in, if it is ground based.
        lane: Option<Lane>,
    },
    /// Reports that an enemy reached the end of its path.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Variant of the enemy.
        kind: EnemyKind,
        /// Power contributed toward the defeat threshold.
        power: u32,
    },
    /// Reports that an enemy's hit points reached zero.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Variant of the enemy.
        kind: EnemyKind,
    },
    /// Reports that a special-event aircraft crossed the midpoint of its flight.
    RaidMidpointReached {
        /// Identifier of the aircraft.
        enemy: EnemyId,
    },
    /// Confirms that a defender was constructed.
    DefenderPlaced {
        /// Identifier allocated to the defender.
        defender: DefenderId,
        /// Variant of the defender.
        kind: DefenderKind,
        /// Build slot now occupied by the defender.
        cell: CellCoord,
    },
    /// Reports that a defender's hit points reached zero and its slot was released.
    DefenderDestroyed {
        /// Identifier of the destroyed defender.
        defender: DefenderId,
        /// Variant of the defender.
        kind: DefenderKind,
        /// Build slot that became free again.
        cell: CellCoord,
    },
    /// Confirms that a placeable was dropped.
    PlaceablePlaced {
        /// Identifier allocated to the placeable.
        placeable: PlaceableId,
        /// Variant of the placeable.
        kind: PlaceableKind,
        /// Placeable slot hosting the item.
        cell: CellCoord,
    },
    /// Reports that a placement command could not be honoured.
    PlacementRejected {
        /// Cell named by the rejected command.
        cell: CellCoord,
        /// Reason the world refused the placement.
        reason: PlacementError,
    },
    /// Confirms that a projectile left its defender.
    ProjectileLaunched {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Defender that fired the projectile.
        defender: DefenderId,
        /// Enemy the projectile tracks.
        target: EnemyId,
    },
    /// Reports the outcome of a flak shot.
    FlakResolved {
        /// Air defense that fired.
        defender: DefenderId,
        /// Aircraft the shot was aimed at.
        target: EnemyId,
        /// Indicates whether the shot destroyed the aircraft.
        hit: bool,
    },
    /// Reports that a bomb exploded.
    BombDetonated {
        /// Identifier of the bomb.
        placeable: PlaceableId,
        /// Number of enemies caught in the blast.
        enemies_hit: u32,
    },
    /// Announces that a strike was planned and is counting down.
    StrikeScheduled {
        /// Row or column that will be struck.
        line: StrikeLine,
        /// Warning time before the strike lands.
        delay: Duration,
    },
    /// Reports that a planned strike landed.
    StrikeLanded {
        /// Row or column that was struck.
        line: StrikeLine,
        /// Number of defenders damaged by the strike.
        defenders_hit: u32,
    },
    /// Announces that the match reached a terminal state.
    GameDecided {
        /// Outcome of the match.
        outcome: Outcome,
    },
}

/// Terminal result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// All waves completed and every enemy was dealt with.
    Victory,
    /// Too much enemy power leaked through.
    Defeat,
}

/// Source of probabilistic outcomes that can be replaced for deterministic tests.
pub trait ChanceSource {
    /// Returns `true` with the provided probability.
    fn succeeds(&mut self, probability: f32) -> bool;
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower or air defense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a speed bump or bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceableId(u32);

impl PlaceableId {
    /// Creates a new placeable identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single tile expressed as column and row coordinates.
///
/// Serialized as a `[column, row]` pair so level files stay compact.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl From<[u32; 2]> for CellCoord {
    fn from([column, row]: [u32; 2]) -> Self {
        Self::new(column, row)
    }
}

impl From<CellCoord> for [u32; 2] {
    fn from(cell: CellCoord) -> Self {
        [cell.column, cell.row]
    }
}

/// One of the two parallel tracks ground enemies follow along a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    /// Lane zero, displaced against the path's left-hand perpendicular.
    Left,
    /// Lane one, displaced along the path's left-hand perpendicular.
    Right,
}

impl Lane {
    /// Numeric lane index, `0` or `1`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Lane that follows this one in round-robin order.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Signed perpendicular displacement applied for this lane.
    #[must_use]
    pub fn signed_offset(self, distance: f32) -> f32 {
        match self {
            Self::Left => -distance,
            Self::Right => distance,
        }
    }
}

/// Enemy variants that can appear in a wave schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline infantry.
    Soldier,
    /// Quick, fragile infantry.
    FastSoldier,
    /// Slow, durable infantry.
    HeavySoldier,
    /// Armored vehicle that attacks nearby defenders.
    Tank,
    /// Special-event aircraft that triggers a strike mid-flight.
    Aircraft,
}

const ENEMY_ALIASES: [(&str, EnemyKind); 10] = [
    ("soldier", EnemyKind::Soldier),
    ("soldier_fast", EnemyKind::FastSoldier),
    ("soldierFast", EnemyKind::FastSoldier),
    ("fast_soldier", EnemyKind::FastSoldier),
    ("soldier_heavy", EnemyKind::HeavySoldier),
    ("soldierHeavy", EnemyKind::HeavySoldier),
    ("heavy_soldier", EnemyKind::HeavySoldier),
    ("tank", EnemyKind::Tank),
    ("aircraft", EnemyKind::Aircraft),
    ("plane", EnemyKind::Aircraft),
];

impl EnemyKind {
    /// Every enemy variant in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Soldier,
        Self::FastSoldier,
        Self::HeavySoldier,
        Self::Tank,
        Self::Aircraft,
    ];

    /// Resolves a schedule identifier such as `"soldierFast"` into a variant.
    ///
    /// Matching ignores ASCII case. Unknown identifiers yield `None`.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        ENEMY_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(identifier))
            .map(|(_, kind)| *kind)
    }

    /// Canonical schedule identifier for the variant.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Soldier => "soldier",
            Self::FastSoldier => "soldier_fast",
            Self::HeavySoldier => "soldier_heavy",
            Self::Tank => "tank",
            Self::Aircraft => "aircraft",
        }
    }

    /// Reports whether the variant flies instead of following a path.
    #[must_use]
    pub const fn is_airborne(self) -> bool {
        matches!(self, Self::Aircraft)
    }
}

/// Towers and air defenses that can be built on a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefenderKind {
    /// Rapid-fire tower that favours nearby targets.
    FastTower,
    /// Heavy-hitting tower that favours durable targets.
    PowerTower,
    /// Turret firing slow, heavy shells.
    TankTower,
    /// Cheap air defense with a modest hit chance.
    LightAirDefense,
    /// Expensive air defense with a high hit chance.
    HeavyAirDefense,
}

impl DefenderKind {
    /// Every defender variant in declaration order.
    pub const ALL: [Self; 5] = [
        Self::FastTower,
        Self::PowerTower,
        Self::TankTower,
        Self::LightAirDefense,
        Self::HeavyAirDefense,
    ];

    /// Reports whether the defender is an air defense.
    #[must_use]
    pub const fn is_air_defense(self) -> bool {
        matches!(self, Self::LightAirDefense | Self::HeavyAirDefense)
    }

    /// Reports whether the defender is able to engage the provided enemy variant.
    ///
    /// Ground towers only engage ground enemies and air defenses only engage aircraft.
    #[must_use]
    pub const fn can_target(self, enemy: EnemyKind) -> bool {
        self.is_air_defense() == enemy.is_airborne()
    }
}

/// Consumable items dropped on placeable slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlaceableKind {
    /// Timed area that slows ground enemies.
    SpeedBump,
    /// One-shot explosive triggered by proximity.
    Bomb,
}

impl PlaceableKind {
    /// Every placeable variant in declaration order.
    pub const ALL: [Self; 2] = [Self::SpeedBump, Self::Bomb];
}

/// Weapon carried by a defender.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Weapon {
    /// Spawns a homing projectile that deals damage on arrival.
    Projectile {
        /// Damage applied when the projectile connects.
        damage: u32,
        /// Flight speed measured in tiles per second.
        speed_tiles: f32,
    },
    /// Applies damage to the target immediately.
    Instant {
        /// Damage applied per shot.
        damage: u32,
    },
    /// Rolls a hit chance; a hit destroys the target outright.
    Flak {
        /// Probability in `[0, 1]` that a shot destroys its target.
        hit_chance: f32,
    },
}

/// Lifecycle state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Moving along its path.
    Alive,
    /// Reached the end of its path without being destroyed.
    Leaked,
    /// Hit points reached zero.
    Dead,
}

impl EnemyState {
    /// Reports whether the enemy is still in play.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Grid row or column targeted by a strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrikeLine {
    /// Every tile sharing the provided row index.
    Row(u32),
    /// Every tile sharing the provided column index.
    Column(u32),
}

impl StrikeLine {
    /// Reports whether the cell lies on this line.
    #[must_use]
    pub const fn contains(self, cell: CellCoord) -> bool {
        match self {
            Self::Row(row) => cell.row == row,
            Self::Column(column) => cell.column == column,
        }
    }
}

/// Reasons a placement command can be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The cell is not a slot accepting the requested item.
    #[error("cell ({}, {}) is not a slot for this item", .cell.column(), .cell.row())]
    NotASlot {
        /// Cell named by the request.
        cell: CellCoord,
    },
    /// A defender already occupies the build slot.
    #[error(
        "cell ({}, {}) is occupied by defender {}",
        .cell.column(),
        .cell.row(),
        .defender.get()
    )]
    Occupied {
        /// Cell named by the request.
        cell: CellCoord,
        /// Defender holding the slot.
        defender: DefenderId,
    },
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Lifecycle state of the enemy.
    pub state: EnemyState,
    /// World position including any lane offset.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points at creation.
    pub max_hp: u32,
    /// Progress along the enemy's own path in `[0, 1]`.
    pub progress: f32,
    /// Lane occupied by ground enemies.
    pub lane: Option<Lane>,
    /// Current speed multiplier applied by slows.
    pub slow_multiplier: f32,
    /// Power contributed toward defeat if the enemy leaks.
    pub power: u32,
}

impl EnemySnapshot {
    /// Ratio of remaining to maximum hit points.
    #[must_use]
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}

/// Read-only snapshot describing all enemies within the level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    ///
    /// Snapshots are ordered by identifier, which matches spawn order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.state.is_alive())
            .count()
    }

    /// Number of snapshots captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single defender's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderSnapshot {
    /// Identifier allocated to the defender by the world.
    pub id: DefenderId,
    /// Variant of the defender.
    pub kind: DefenderKind,
    /// Build slot occupied by the defender.
    pub cell: CellCoord,
    /// World position of the slot centre.
    pub position: Vec2,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points at construction.
    pub max_hp: u32,
    /// Engagement range expressed in tiles.
    pub range_tiles: f32,
    /// Weapon used when firing.
    pub weapon: Weapon,
    /// Enemy currently tracked, if any.
    pub target: Option<EnemyId>,
    /// Time remaining until the defender may fire again.
    pub ready_in: Duration,
    /// Indicates whether the defender was destroyed this tick.
    pub destroyed: bool,
}

/// Read-only snapshot describing all defenders within the level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured defender snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for the provided defender.
    #[must_use]
    pub fn get(&self, id: DefenderId) -> Option<&DefenderSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of snapshots captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Defender that fired the projectile.
    pub source: DefenderId,
    /// Enemy the projectile tracks.
    pub target: EnemyId,
    /// Current world position.
    pub position: Vec2,
    /// Damage applied on arrival.
    pub damage: u32,
}

/// Immutable representation of a speed bump or bomb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaceableSnapshot {
    /// Identifier allocated to the placeable.
    pub id: PlaceableId,
    /// Variant of the placeable.
    pub kind: PlaceableKind,
    /// Slot hosting the placeable.
    pub cell: CellCoord,
    /// World position of the slot centre.
    pub position: Vec2,
    /// Lifetime left for timed placeables.
    pub remaining: Option<Duration>,
    /// Indicates whether a bomb is still waiting to detonate.
    pub armed: bool,
}
