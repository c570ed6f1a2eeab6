//! Tile grid, terrain tags and world-space routes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{LevelStyleId, RouteId};

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Decorative features that block both building and walking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Boulder.
    Rock,
    /// Tree or shrub.
    Tree,
    /// Pond tile.
    Water,
    /// Crumbled masonry.
    Ruin,
}

/// Terrain tag attached to every tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Open ground that accepts towers.
    Buildable,
    /// Carved corridor walked by enemies.
    Path,
    /// Route entry tile on the map edge.
    Spawn,
    /// Route exit tile guarding the base.
    End,
    /// Blocked decorative feature.
    Obstacle(ObstacleKind),
}

impl Terrain {
    /// Reports whether enemies may walk across the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path | Self::Spawn | Self::End)
    }

    /// Reports whether a tower may be placed on the tile.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        matches!(self, Self::Buildable)
    }
}

/// Rectangular array of terrain-tagged tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<Terrain>,
}

impl Grid {
    /// Creates a grid with every tile tagged [`Terrain::Buildable`].
    #[must_use]
    pub fn new(columns: u32, rows: u32, tile_size: f32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            tile_size,
            tiles: vec![Terrain::Buildable; capacity],
        }
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

    /// Edge length of one tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.column() < self.columns && tile.row() < self.rows
    }

    /// Terrain of the tile, or `None` when out of bounds.
    #[must_use]
    pub fn terrain(&self, tile: TileCoord) -> Option<Terrain> {
        self.index(tile).and_then(|index| self.tiles.get(index).copied())
    }

    /// Retags a tile. Out-of-bounds coordinates are ignored and report `false`.
    pub fn set_terrain(&mut self, tile: TileCoord, terrain: Terrain) -> bool {
        match self.index(tile).and_then(|index| self.tiles.get_mut(index)) {
            Some(slot) => {
                *slot = terrain;
                true
            }
            None => false,
        }
    }

    /// Reports whether enemies may walk across the tile.
    #[must_use]
    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        self.terrain(tile).is_some_and(Terrain::is_walkable)
    }

    /// World-space centre of the tile.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            (tile.column() as f32 + 0.5) * self.tile_size,
            (tile.row() as f32 + 0.5) * self.tile_size,
        )
    }

    /// Iterates over every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, Terrain)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, terrain)| {
            let index = index as u32;
            (TileCoord::new(index % columns, index / columns), *terrain)
        })
    }

    /// Collects the coordinates of every tile tagged with the terrain.
    #[must_use]
    pub fn tiles_with(&self, terrain: Terrain) -> Vec<TileCoord> {
        self.iter()
            .filter(|(_, candidate)| *candidate == terrain)
            .map(|(tile, _)| tile)
            .collect()
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let row = usize::try_from(tile.row()).ok()?;
        let column = usize::try_from(tile.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// World-space polyline walked by enemies from spawn to base.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    points: Vec<Vec2>,
    cumulative: Vec<f32>,
}

impl Route {
    /// Builds a route from its ordered points.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (index, point) in points.iter().enumerate() {
            if index > 0 {
                total += points[index - 1].distance(*point);
            }
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    /// Ordered route points.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Point at the index, if any.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    /// Number of points in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the route has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Full polyline length in world units.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Distance travelled by a walker heading for `next_index` at `position`.
    #[must_use]
    pub fn progress(&self, next_index: usize, position: Vec2) -> f32 {
        match (self.points.get(next_index), self.cumulative.get(next_index)) {
            (Some(point), Some(length)) => (length - position.distance(*point)).max(0.0),
            _ => self.total_length(),
        }
    }
}

/// Output of the level generator.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    /// Style the level was generated from.
    pub style: LevelStyleId,
    /// Difficulty index taken from the style.
    pub difficulty: u32,
    /// Tagged tile grid.
    pub grid: Grid,
    /// Tile sequences confirmed by the pathfinder, one per route.
    pub tile_routes: Vec<Vec<TileCoord>>,
    /// World-space polylines, parallel to `tile_routes`.
    pub routes: Vec<Route>,
}

impl Level {
    /// Looks up a route by identifier.
    #[must_use]
    pub fn route(&self, route: RouteId) -> Option<&Route> {
        self.routes.get(route.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_fully_buildable() {
        let grid = Grid::new(4, 3, 10.0);
        assert_eq!(grid.iter().count(), 12);
        assert!(grid.iter().all(|(_, terrain)| terrain == Terrain::Buildable));
    }

    #[test]
    fn out_of_bounds_tiles_are_rejected() {
        let mut grid = Grid::new(2, 2, 10.0);
        assert_eq!(grid.terrain(TileCoord::new(2, 0)), None);
        assert!(!grid.set_terrain(TileCoord::new(0, 2), Terrain::Path));
        assert!(grid.set_terrain(TileCoord::new(1, 1), Terrain::Path));
        assert!(grid.is_walkable(TileCoord::new(1, 1)));
    }

    #[test]
    fn tile_centers_scale_with_tile_size() {
        let grid = Grid::new(5, 5, 40.0);
        assert_eq!(grid.tile_center(TileCoord::new(2, 1)), Vec2::new(100.0, 60.0));
    }

    #[test]
    fn route_progress_accumulates_segment_lengths() {
        let route = Route::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 20.0),
        ]);
        assert_eq!(route.total_length(), 30.0);
        assert_eq!(route.progress(1, Vec2::new(4.0, 0.0)), 4.0);
        assert_eq!(route.progress(2, Vec2::new(10.0, 5.0)), 15.0);
        assert_eq!(route.progress(3, Vec2::new(10.0, 20.0)), 30.0);
    }
}
