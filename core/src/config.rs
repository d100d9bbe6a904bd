//! Declarative balance, level and wave schedule configuration.
//!
//! Every structure deserializes with `serde` and falls back to a playable
//! default for omitted fields. Loaders call the `validate` methods once at
//! load time; the simulation assumes validated input afterwards.

use std::{collections::BTreeSet, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::{CellCoord, DefenderKind, EnemyKind, PlaceableKind, Weapon};

/// Problems detected while validating configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A numeric field fell outside its accepted interval.
    #[error("{field} must lie within [{min}, {max}] but was {value}")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: String,
        /// Value supplied by the configuration.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// The level declares no enemy paths.
    #[error("level declares no paths")]
    NoPaths,
    /// A path lists fewer than two waypoints.
    #[error("path `{name}` needs at least two waypoints, found {count}")]
    TooFewWaypoints {
        /// Name of the path.
        name: String,
        /// Number of waypoints supplied.
        count: usize,
    },
    /// A waypoint or slot lies outside the grid.
    #[error("cell ({column}, {row}) lies outside the {columns}x{rows} grid")]
    CellOutsideGrid {
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// A cell is declared as a slot more than once.
    #[error("cell ({column}, {row}) is declared as a slot more than once")]
    DuplicateSlot {
        /// Column of the offending cell.
        column: u32,
        /// Row of the offending cell.
        row: u32,
    },
}

/// Complete balance sheet for a match.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Balance {
    /// Starting money and passive income.
    pub money: MoneyConfig,
    /// Per-defender statistics.
    pub defenders: DefenderRoster,
    /// Per-enemy statistics.
    pub enemies: EnemyRoster,
    /// Speed bump and bomb statistics.
    pub placeables: PlaceableRoster,
    /// Special-event strike tuning.
    pub raid: RaidConfig,
    /// Victory and defeat thresholds.
    pub rules: RulesConfig,
}

impl Balance {
    /// Validates every nested section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.money.validate()?;
        for kind in DefenderKind::ALL {
            self.defenders.get(kind).validate(kind)?;
        }
        for kind in EnemyKind::ALL {
            let stats = self.enemies.get(kind);
            check_range(
                format!("enemies.{}.speed_tiles", kind.identifier()),
                stats.speed_tiles,
                0.0,
                f32::MAX,
            )?;
        }
        self.placeables.validate()?;
        self.raid.validate()?;
        self.rules.validate()
    }
}

/// Starting money and periodic income.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoneyConfig {
    /// Balance available when the match starts.
    pub start: u64,
    /// Amount credited once per income interval.
    pub income: u64,
    /// Length of the income interval in seconds.
    pub income_interval_secs: f32,
}

impl MoneyConfig {
    /// Income interval as a duration.
    #[must_use]
    pub fn income_interval(&self) -> Duration {
        seconds(self.income_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "money.income_interval_secs".to_owned(),
            self.income_interval_secs,
            0.001,
            f32::MAX,
        )
    }
}

impl Default for MoneyConfig {
    fn default() -> Self {
        Self {
            start: 100,
            income: 10,
            income_interval_secs: 1.0,
        }
    }
}

/// Statistics shared by towers and air defenses.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefenderStats {
    /// Price paid to build the defender.
    pub cost: u64,
    /// Engagement range in tiles.
    pub range_tiles: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Hit points at construction.
    pub hp: u32,
    /// Weapon discharged on each shot.
    pub weapon: Weapon,
}

impl DefenderStats {
    /// Time between consecutive shots.
    #[must_use]
    pub fn reload(&self) -> Duration {
        if self.fire_rate > 0.0 {
            seconds(1.0 / self.fire_rate)
        } else {
            Duration::MAX
        }
    }

    fn validate(&self, kind: DefenderKind) -> Result<(), ConfigError> {
        let prefix = format!("defenders.{kind:?}");
        check_range(
            format!("{prefix}.range_tiles"),
            self.range_tiles,
            0.0,
            f32::MAX,
        )?;
        check_range(
            format!("{prefix}.fire_rate"),
            self.fire_rate,
            0.001,
            f32::MAX,
        )?;
        match self.weapon {
            Weapon::Flak { hit_chance } => {
                check_range(format!("{prefix}.weapon.hit_chance"), hit_chance, 0.0, 1.0)
            }
            Weapon::Projectile { speed_tiles, .. } => check_range(
                format!("{prefix}.weapon.speed_tiles"),
                speed_tiles,
                0.001,
                f32::MAX,
            ),
            Weapon::Instant { .. } => Ok(()),
        }
    }
}

/// Statistics for every defender variant.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefenderRoster {
    /// Rapid-fire tower.
    pub fast_tower: DefenderStats,
    /// Heavy-hitting tower.
    pub power_tower: DefenderStats,
    /// Shell-firing turret.
    pub tank_tower: DefenderStats,
    /// Cheap air defense.
    pub light_air_defense: DefenderStats,
    /// Expensive air defense.
    pub heavy_air_defense: DefenderStats,
}

impl DefenderRoster {
    /// Statistics for the provided variant.
    #[must_use]
    pub const fn get(&self, kind: DefenderKind) -> &DefenderStats {
        match kind {
            DefenderKind::FastTower => &self.fast_tower,
            DefenderKind::PowerTower => &self.power_tower,
            DefenderKind::TankTower => &self.tank_tower,
            DefenderKind::LightAirDefense => &self.light_air_defense,
            DefenderKind::HeavyAirDefense => &self.heavy_air_defense,
        }
    }
}

impl Default for DefenderRoster {
    fn default() -> Self {
        Self {
            fast_tower: DefenderStats {
                cost: 50,
                range_tiles: 3.0,
                fire_rate: 2.0,
                hp: 100,
                weapon: Weapon::Projectile {
                    damage: 10,
                    speed_tiles: 8.0,
                },
            },
            power_tower: DefenderStats {
                cost: 100,
                range_tiles: 3.5,
                fire_rate: 0.5,
                hp: 150,
                weapon: Weapon::Projectile {
                    damage: 45,
                    speed_tiles: 6.0,
                },
            },
            tank_tower: DefenderStats {
                cost: 150,
                range_tiles: 2.5,
                fire_rate: 0.75,
                hp: 250,
                weapon: Weapon::Projectile {
                    damage: 30,
                    speed_tiles: 4.7,
                },
            },
            light_air_defense: DefenderStats {
                cost: 75,
                range_tiles: 4.0,
                fire_rate: 1.0,
                hp: 80,
                weapon: Weapon::Flak { hit_chance: 0.6 },
            },
            heavy_air_defense: DefenderStats {
                cost: 120,
                range_tiles: 4.5,
                fire_rate: 1.0,
                hp: 120,
                weapon: Weapon::Flak { hit_chance: 0.8 },
            },
        }
    }
}

/// Statistics for a single enemy variant.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyStats {
    /// Hit points at creation.
    pub hp: u32,
    /// Base movement speed in tiles per second.
    pub speed_tiles: f32,
    /// Power contributed toward defeat on leaking.
    pub power: u32,
    /// Damage per second dealt to nearby defenders by armored variants.
    #[serde(default)]
    pub defender_dps: Option<u32>,
}

/// Statistics for every enemy variant.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyRoster {
    /// Baseline infantry.
    pub soldier: EnemyStats,
    /// Quick infantry.
    pub fast_soldier: EnemyStats,
    /// Durable infantry.
    pub heavy_soldier: EnemyStats,
    /// Armored vehicle.
    pub tank: EnemyStats,
    /// Special-event aircraft.
    pub aircraft: EnemyStats,
}

impl EnemyRoster {
    /// Statistics for the provided variant.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Soldier => &self.soldier,
            EnemyKind::FastSoldier => &self.fast_soldier,
            EnemyKind::HeavySoldier => &self.heavy_soldier,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Aircraft => &self.aircraft,
        }
    }
}

impl Default for EnemyRoster {
    fn default() -> Self {
        Self {
            soldier: EnemyStats {
                hp: 50,
                speed_tiles: 1.0,
                power: 1,
                defender_dps: None,
            },
            fast_soldier: EnemyStats {
                hp: 30,
                speed_tiles: 1.8,
                power: 1,
                defender_dps: None,
            },
            heavy_soldier: EnemyStats {
                hp: 120,
                speed_tiles: 0.6,
                power: 2,
                defender_dps: None,
            },
            tank: EnemyStats {
                hp: 300,
                speed_tiles: 0.5,
                power: 3,
                defender_dps: Some(20),
            },
            aircraft: EnemyStats {
                hp: 50,
                speed_tiles: 3.0,
                power: 3,
                defender_dps: None,
            },
        }
    }
}

/// Speed bump statistics.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedBumpStats {
    /// Price paid to drop the speed bump.
    pub cost: u64,
    /// Speed multiplier applied to enemies in the area.
    pub slow_multiplier: f32,
    /// Lifetime of the speed bump in seconds.
    pub duration_secs: f32,
    /// Radius of the slowing area in tiles.
    pub radius_tiles: f32,
}

impl Default for SpeedBumpStats {
    fn default() -> Self {
        Self {
            cost: 25,
            slow_multiplier: 0.5,
            duration_secs: 8.0,
            radius_tiles: 0.75,
        }
    }
}

/// Bomb statistics.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BombStats {
    /// Price paid to drop the bomb.
    pub cost: u64,
    /// Damage dealt to each enemy in the blast.
    pub damage: u32,
    /// Trigger radius in tiles; the blast reaches 1.2 times further.
    pub radius_tiles: f32,
}

impl Default for BombStats {
    fn default() -> Self {
        Self {
            cost: 40,
            damage: 80,
            radius_tiles: 1.0,
        }
    }
}

/// Statistics for every placeable variant.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceableRoster {
    /// Speed bump statistics.
    pub speed_bump: SpeedBumpStats,
    /// Bomb statistics.
    pub bomb: BombStats,
}

impl PlaceableRoster {
    /// Price of the provided variant.
    #[must_use]
    pub const fn cost(&self, kind: PlaceableKind) -> u64 {
        match kind {
            PlaceableKind::SpeedBump => self.speed_bump.cost,
            PlaceableKind::Bomb => self.bomb.cost,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "placeables.speed_bump.slow_multiplier".to_owned(),
            self.speed_bump.slow_multiplier,
            0.0,
            1.0,
        )?;
        check_range(
            "placeables.speed_bump.duration_secs".to_owned(),
            self.speed_bump.duration_secs,
            0.0,
            f32::MAX,
        )?;
        check_range(
            "placeables.bomb.radius_tiles".to_owned(),
            self.bomb.radius_tiles,
            0.0,
            f32::MAX,
        )
    }
}

/// Special-event strike tuning.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaidConfig {
    /// Warning time between planning and landing, in seconds.
    pub warning_delay_secs: f32,
    /// Damage dealt to each defender on the struck line.
    pub damage: u32,
    /// Score multiplier applied to a tower's maximum hit points.
    pub tower_weight: u32,
    /// Score multiplier applied to an air defense's maximum hit points.
    pub air_defense_weight: u32,
}

impl RaidConfig {
    /// Warning time as a duration.
    #[must_use]
    pub fn warning_delay(&self) -> Duration {
        seconds(self.warning_delay_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "raid.warning_delay_secs".to_owned(),
            self.warning_delay_secs,
            0.0,
            f32::MAX,
        )
    }
}

impl Default for RaidConfig {
    fn default() -> Self {
        Self {
            warning_delay_secs: 1.0,
            damage: 50,
            tower_weight: 2,
            air_defense_weight: 3,
        }
    }
}

/// Victory and defeat thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Fraction of total power that may leak before the match is lost.
    pub leak_ratio_defeat: f64,
}

impl RulesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.leak_ratio_defeat > 0.0 && self.leak_ratio_defeat <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field: "rules.leak_ratio_defeat".to_owned(),
                value: self.leak_ratio_defeat,
                min: 0.0,
                max: 1.0,
            })
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            leak_ratio_defeat: 0.1,
        }
    }
}

/// Named polyline given in grid coordinates.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathSpec {
    /// Human-readable name of the path.
    pub name: String,
    /// Waypoints visited in order; converted to tile centres.
    pub waypoints: Vec<CellCoord>,
}

/// Geometry of a level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelLayout {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Perpendicular lane displacement in tiles.
    pub lane_offset_tiles: f32,
    /// Enemy paths; the first one is the main path.
    pub paths: Vec<PathSpec>,
    /// Tiles that accept towers and air defenses.
    pub build_slots: Vec<CellCoord>,
    /// Tiles that accept speed bumps and bombs.
    pub placeable_slots: Vec<CellCoord>,
}

impl LevelLayout {
    /// Validates grid dimensions, paths and slots.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "level.tile_size".to_owned(),
            self.tile_size,
            0.001,
            f32::MAX,
        )?;
        check_range(
            "level.lane_offset_tiles".to_owned(),
            self.lane_offset_tiles,
            0.0,
            0.5,
        )?;
        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        for path in &self.paths {
            if path.waypoints.len() < 2 {
                return Err(ConfigError::TooFewWaypoints {
                    name: path.name.clone(),
                    count: path.waypoints.len(),
                });
            }
            for waypoint in &path.waypoints {
                self.check_inside(*waypoint)?;
            }
        }

        let mut seen = BTreeSet::new();
        for slot in self.build_slots.iter().chain(&self.placeable_slots) {
            self.check_inside(*slot)?;
            if !seen.insert(*slot) {
                return Err(ConfigError::DuplicateSlot {
                    column: slot.column(),
                    row: slot.row(),
                });
            }
        }
        Ok(())
    }

    fn check_inside(&self, cell: CellCoord) -> Result<(), ConfigError> {
        if cell.column() < self.columns && cell.row() < self.rows {
            Ok(())
        } else {
            Err(ConfigError::CellOutsideGrid {
                column: cell.column(),
                row: cell.row(),
                columns: self.columns,
                rows: self.rows,
            })
        }
    }
}

impl Default for LevelLayout {
    fn default() -> Self {
        let cells = |pairs: &[[u32; 2]]| -> Vec<CellCoord> {
            pairs.iter().copied().map(CellCoord::from).collect()
        };
        Self {
            columns: 16,
            rows: 9,
            tile_size: 64.0,
            lane_offset_tiles: 0.25,
            paths: vec![PathSpec {
                name: "main".to_owned(),
                waypoints: cells(&[[0, 1], [5, 1], [5, 7], [11, 7], [11, 3], [15, 3]]),
            }],
            build_slots: cells(&[
                [3, 2],
                [4, 4],
                [6, 3],
                [6, 6],
                [8, 6],
                [10, 5],
                [12, 4],
                [12, 2],
                [9, 8],
                [14, 4],
            ]),
            placeable_slots: cells(&[[2, 1], [5, 4], [8, 7], [11, 5], [13, 3]]),
        }
    }
}

/// Ordered list of waves.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveSchedule {
    /// Waves in the order they are played.
    pub waves: Vec<WaveSpec>,
}

impl WaveSchedule {
    /// Validates timings and probabilities of every wave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, wave) in self.waves.iter().enumerate() {
            let prefix = format!("schedule.waves[{index}]");
            check_range(
                format!("{prefix}.start_delay_secs"),
                wave.start_delay_secs,
                0.0,
                f32::MAX,
            )?;
            check_range(
                format!("{prefix}.special_event_chance"),
                wave.special_event_chance,
                0.0,
                1.0,
            )?;
            for (group_index, group) in wave.groups.iter().enumerate() {
                check_range(
                    format!("{prefix}.groups[{group_index}].gap_secs"),
                    group.gap_secs,
                    0.0,
                    f32::MAX,
                )?;
            }
        }
        Ok(())
    }
}

impl Default for WaveSchedule {
    fn default() -> Self {
        let group = |enemy: &str, count, gap_secs| SpawnGroup {
            enemy: enemy.to_owned(),
            count,
            gap_secs,
        };
        Self {
            waves: vec![
                WaveSpec {
                    start_delay_secs: 2.0,
                    groups: vec![group("soldier", 6, 1.2)],
                    special_event_chance: 0.0,
                },
                WaveSpec {
                    start_delay_secs: 5.0,
                    groups: vec![group("soldier", 5, 1.0), group("soldier_fast", 4, 0.6)],
                    special_event_chance: 0.0,
                },
                WaveSpec {
                    start_delay_secs: 5.0,
                    groups: vec![group("soldier_heavy", 4, 1.5), group("tank", 1, 3.0)],
                    special_event_chance: 0.5,
                },
                WaveSpec {
                    start_delay_secs: 6.0,
                    groups: vec![group("soldier_fast", 6, 0.5), group("tank", 2, 4.0)],
                    special_event_chance: 1.0,
                },
            ],
        }
    }
}

/// Single wave of the schedule.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveSpec {
    /// Seconds to wait after the previous wave completes.
    #[serde(default)]
    pub start_delay_secs: f32,
    /// Enemy groups spawned one after another.
    pub groups: Vec<SpawnGroup>,
    /// Probability in `[0, 1]` that the wave launches a special event.
    #[serde(default)]
    pub special_event_chance: f32,
}

impl WaveSpec {
    /// Start delay as a duration.
    #[must_use]
    pub fn start_delay(&self) -> Duration {
        seconds(self.start_delay_secs)
    }
}

/// Group of identical enemies within a wave.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnGroup {
    /// Enemy identifier such as `"soldier"` or `"tank"`.
    pub enemy: String,
    /// Number of enemies emitted by the group.
    pub count: u32,
    /// Seconds between spawns, also waited before the group's first spawn
    /// when it follows another group.
    pub gap_secs: f32,
}

impl SpawnGroup {
    /// Inter-spawn gap as a duration.
    #[must_use]
    pub fn gap(&self) -> Duration {
        seconds(self.gap_secs)
    }
}

/// Converts non-negative finite seconds into a duration, clamping anything else to zero.
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

fn check_range(field: String, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(min),
            max: f64::from(max),
        })
    }
}
