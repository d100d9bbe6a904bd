//! Tile grid, named paths and slot occupancy for a level.

use std::collections::BTreeMap;

use lane_defence_core::{config::LevelLayout, CellCoord, DefenderId, Vec2};

use crate::path::{GridPath, PathError};

/// Named polyline enemies can follow.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedPath {
    name: String,
    path: GridPath,
}

impl NamedPath {
    /// Name declared by the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World-space polyline.
    #[must_use]
    pub fn path(&self) -> &GridPath {
        &self.path
    }
}

/// Items a slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Accepts towers and air defenses.
    Build,
    /// Accepts speed bumps and bombs, which never occupy the slot.
    Placeable,
}

/// Current state of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotState {
    /// Items the slot accepts.
    pub kind: SlotKind,
    /// Defender currently holding the slot.
    pub occupant: Option<DefenderId>,
}

impl SlotState {
    /// Reports whether a defender could be built here right now.
    #[must_use]
    pub fn is_buildable(&self) -> bool {
        self.kind == SlotKind::Build && self.occupant.is_none()
    }
}

/// Static level geometry plus mutable slot occupancy.
#[derive(Clone, Debug)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    tile_size: f32,
    lane_offset: f32,
    paths: Vec<NamedPath>,
    flight_path: GridPath,
    slots: BTreeMap<CellCoord, SlotState>,
}

impl GridMap {
    /// Builds the grid described by the layout.
    ///
    /// Path waypoints are converted from grid coordinates to tile centres.
    pub fn from_layout(layout: &LevelLayout) -> Result<Self, PathError> {
        let tile_size = layout.tile_size;
        let paths = layout
            .paths
            .iter()
            .map(|spec| {
                let waypoints = spec
                    .waypoints
                    .iter()
                    .map(|cell| centre_of(*cell, tile_size))
                    .collect();
                GridPath::new(waypoints).map(|path| NamedPath {
                    name: spec.name.clone(),
                    path,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if paths.is_empty() {
            return Err(PathError::MissingPath);
        }

        let width = layout.columns as f32 * tile_size;
        let middle = layout.rows as f32 * tile_size / 2.0;
        let flight_path = GridPath::new(vec![Vec2::new(0.0, middle), Vec2::new(width, middle)])?;

        let mut slots = BTreeMap::new();
        for cell in &layout.build_slots {
            let _ = slots.insert(
                *cell,
                SlotState {
                    kind: SlotKind::Build,
                    occupant: None,
                },
            );
        }
        for cell in &layout.placeable_slots {
            let _ = slots.insert(
                *cell,
                SlotState {
                    kind: SlotKind::Placeable,
                    occupant: None,
                },
            );
        }

        Ok(Self {
            columns: layout.columns,
            rows: layout.rows,
            tile_size,
            lane_offset: layout.lane_offset_tiles * tile_size,
            paths,
            flight_path,
            slots,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Perpendicular lane displacement in world units.
    #[must_use]
    pub const fn lane_offset(&self) -> f32 {
        self.lane_offset
    }

    /// World-space centre of a tile.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        centre_of(cell, self.tile_size)
    }

    /// Tile containing the point, or `None` outside the grid.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let column = (point.x / self.tile_size) as u32;
        let row = (point.y / self.tile_size) as u32;
        (column < self.columns && row < self.rows).then(|| CellCoord::new(column, row))
    }

    /// All paths in declaration order.
    #[must_use]
    pub fn paths(&self) -> &[NamedPath] {
        &self.paths
    }

    /// Path followed by ground enemies.
    #[must_use]
    pub fn main_path(&self) -> &GridPath {
        &self.paths[0].path
    }

    /// Looks up a path by name.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&GridPath> {
        self.paths
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.path)
    }

    /// Straight line crossing the middle of the map, flown by aircraft.
    #[must_use]
    pub fn flight_path(&self) -> &GridPath {
        &self.flight_path
    }

    /// Shortest distance between the point and any path.
    #[must_use]
    pub fn distance_to_path(&self, point: Vec2) -> f32 {
        self.paths
            .iter()
            .map(|named| named.path.distance_to(point))
            .fold(f32::INFINITY, f32::min)
    }

    /// Reports whether the point lies within `tolerance` of any path.
    #[must_use]
    pub fn is_on_path(&self, point: Vec2, tolerance: f32) -> bool {
        self.distance_to_path(point) <= tolerance
    }

    /// State of the slot at the cell, or `None` when the cell is not a slot.
    #[must_use]
    pub fn slot(&self, cell: CellCoord) -> Option<SlotState> {
        self.slots.get(&cell).copied()
    }

    /// Every slot in row-major coordinate order.
    pub fn slots(&self) -> impl Iterator<Item = (CellCoord, SlotState)> + '_ {
        self.slots.iter().map(|(cell, state)| (*cell, *state))
    }

    pub(crate) fn occupy(&mut self, cell: CellCoord, defender: DefenderId) {
        if let Some(slot) = self.slots.get_mut(&cell) {
            slot.occupant = Some(defender);
        }
    }

    pub(crate) fn release(&mut self, cell: CellCoord, defender: DefenderId) {
        if let Some(slot) = self.slots.get_mut(&cell) {
            if slot.occupant == Some(defender) {
                slot.occupant = None;
            }
        }
    }
}

fn centre_of(cell: CellCoord, tile_size: f32) -> Vec2 {
    Vec2::new(
        cell.column() as f32 * tile_size + tile_size / 2.0,
        cell.row() as f32 * tile_size + tile_size / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridMap {
        GridMap::from_layout(&LevelLayout::default()).expect("default layout")
    }

    #[test]
    fn converts_between_cells_and_world_points() {
        let grid = grid();
        let cell = CellCoord::new(3, 2);
        let centre = grid.cell_center(cell);
        assert_eq!(centre, Vec2::new(224.0, 160.0));
        assert_eq!(grid.cell_at(centre), Some(cell));
        assert_eq!(grid.cell_at(Vec2::new(-1.0, 5.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(16.0 * 64.0, 5.0)), None);
    }

    #[test]
    fn main_path_starts_at_first_waypoint_centre() {
        let grid = grid();
        assert_eq!(grid.main_path().position_at(0.0), Vec2::new(32.0, 96.0));
        assert!(grid.path("main").is_some());
        assert!(grid.path("side").is_none());
        assert!(grid.is_on_path(Vec2::new(100.0, 100.0), 8.0));
        assert!(!grid.is_on_path(Vec2::new(100.0, 300.0), 8.0));
    }

    #[test]
    fn flight_path_crosses_the_middle_row() {
        let grid = grid();
        let flight = grid.flight_path();
        assert_eq!(flight.position_at(0.0), Vec2::new(0.0, 288.0));
        assert_eq!(flight.position_at(1.0), Vec2::new(1024.0, 288.0));
    }

    #[test]
    fn occupancy_is_released_only_by_its_holder() {
        let mut grid = grid();
        let cell = LevelLayout::default().build_slots[0];
        let holder = DefenderId::new(4);

        grid.occupy(cell, holder);
        assert_eq!(
            grid.slot(cell).map(|slot| slot.occupant),
            Some(Some(holder))
        );
        assert!(!grid.slot(cell).map_or(false, |slot| slot.is_buildable()));

        grid.release(cell, DefenderId::new(5));
        assert!(!grid.slot(cell).map_or(false, |slot| slot.is_buildable()));

        grid.release(cell, holder);
        assert!(grid.slot(cell).map_or(false, |slot| slot.is_buildable()));
    }

    #[test]
    fn placeable_slots_are_never_buildable() {
        let grid = grid();
        let cell = LevelLayout::default().placeable_slots[0];
        let slot = grid.slot(cell).expect("placeable slot");
        assert_eq!(slot.kind, SlotKind::Placeable);
        assert!(!slot.is_buildable());
    }
}
