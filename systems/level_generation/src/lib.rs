#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural level generation: route carving, pathfinder confirmation and
//! obstacle scattering.

use log::{debug, trace, warn};
use rampart_core::{
    FeatureSpec, GameConfig, Grid, Level, LevelStyleId, Route, RouteShape, Terrain, TileCoord,
    Vec2,
};
use rand::Rng;
use thiserror::Error;

mod pathfinder;

pub use pathfinder::find_route;

/// Placement attempts per obstacle instance before it is skipped.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 12;

/// Probability that a wandering walk steps toward the far edge.
const WANDER_FORWARD_BIAS: f64 = 0.55;

/// Reasons a level could not be generated. None of them are fatal; the caller
/// may retry with another seed or style.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The style id is not in the level style table.
    #[error("unknown level style `{0}`")]
    UnknownStyle(LevelStyleId),
    /// The style carved no routes at all.
    #[error("level style `{0}` carved no routes")]
    NoRoutes(LevelStyleId),
    /// The pathfinder could not confirm a carved route.
    #[error("pathfinder could not confirm carved route {route}")]
    UnconfirmedRoute {
        /// Index of the route in carving order.
        route: usize,
    },
}

/// Generates a level for the style using the supplied random source.
pub fn generate_level(
    config: &GameConfig,
    style_id: &LevelStyleId,
    rng: &mut impl Rng,
) -> Result<Level, GenerationError> {
    let Some(style) = config.level_style(style_id) else {
        warn!("level generation failed: unknown style `{style_id}`");
        return Err(GenerationError::UnknownStyle(style_id.clone()));
    };

    let mut grid = Grid::new(style.columns, style.rows, style.tile_size);
    let mut tile_routes = Vec::new();

    for spec in &style.routes {
        for _ in 0..spec.count {
            let (spawn, end) = match spec.shape {
                RouteShape::Elbow => carve_elbow(&mut grid, rng),
                RouteShape::Wander => carve_wander(&mut grid, rng),
            };
            let _ = grid.set_terrain(spawn, Terrain::Spawn);
            let _ = grid.set_terrain(end, Terrain::End);

            let tiles = find_route(&grid, spawn, end);
            if tiles.is_empty() {
                warn!(
                    "level generation failed: route {} of `{style_id}` is not connected",
                    tile_routes.len()
                );
                return Err(GenerationError::UnconfirmedRoute {
                    route: tile_routes.len(),
                });
            }
            trace!(
                "carved {:?} route from {spawn:?} to {end:?} ({} tiles)",
                spec.shape,
                tiles.len()
            );
            tile_routes.push(tiles);
        }
    }

    if tile_routes.is_empty() {
        warn!("level generation failed: style `{style_id}` carved no routes");
        return Err(GenerationError::NoRoutes(style_id.clone()));
    }

    for feature in &style.features {
        scatter_feature(&mut grid, feature, rng);
    }

    let routes = tile_routes
        .iter()
        .map(|tiles| route_polyline(&grid, tiles))
        .collect();

    debug!(
        "generated level `{style_id}`: {}x{} grid, {} route(s)",
        grid.columns(),
        grid.rows(),
        tile_routes.len()
    );

    Ok(Level {
        style: style_id.clone(),
        difficulty: style.difficulty,
        grid,
        tile_routes,
        routes,
    })
}

/// Converts a tile sequence into a world-space polyline through tile centres,
/// keeping only the endpoints and the tiles where the heading changes.
#[must_use]
pub fn route_polyline(grid: &Grid, tiles: &[TileCoord]) -> Route {
    let mut points: Vec<Vec2> = Vec::with_capacity(tiles.len());
    for (index, tile) in tiles.iter().enumerate() {
        let is_endpoint = index == 0 || index + 1 == tiles.len();
        if is_endpoint || heading_changes(tiles[index - 1], *tile, tiles[index + 1]) {
            points.push(grid.tile_center(*tile));
        }
    }
    Route::new(points)
}

fn heading_changes(previous: TileCoord, current: TileCoord, next: TileCoord) -> bool {
    let incoming = (
        i64::from(current.column()) - i64::from(previous.column()),
        i64::from(current.row()) - i64::from(previous.row()),
    );
    let outgoing = (
        i64::from(next.column()) - i64::from(current.column()),
        i64::from(next.row()) - i64::from(current.row()),
    );
    incoming != outgoing
}

/// Carves a route from the left edge to the right edge with at most one
/// right-angle turn and returns its endpoints.
///
/// The vertical leg runs down either the entry column or the exit column, so
/// the route runs straight when both rows match.
fn carve_elbow(grid: &mut Grid, rng: &mut impl Rng) -> (TileCoord, TileCoord) {
    let last_column = grid.columns() - 1;
    let entry_row = rng.gen_range(0..grid.rows());
    let exit_row = rng.gen_range(0..grid.rows());
    let (leg_column, run_row) = if rng.gen_bool(0.5) {
        (0, exit_row)
    } else {
        (last_column, entry_row)
    };

    for column in 0..=last_column {
        carve(grid, TileCoord::new(column, run_row));
    }
    for row in entry_row.min(exit_row)..=entry_row.max(exit_row) {
        carve(grid, TileCoord::new(leg_column, row));
    }

    (
        TileCoord::new(0, entry_row),
        TileCoord::new(last_column, exit_row),
    )
}

/// Carves a random walk biased toward the far edge and returns its endpoints.
fn carve_wander(grid: &mut Grid, rng: &mut impl Rng) -> (TileCoord, TileCoord) {
    let last_column = grid.columns() - 1;
    let last_row = grid.rows() - 1;
    let start = TileCoord::new(0, rng.gen_range(0..grid.rows()));
    let step_budget = grid.columns().saturating_mul(grid.rows()).saturating_mul(2);

    let mut current = start;
    let mut steps = 0_u32;
    carve(grid, current);

    while current.column() < last_column {
        steps = steps.saturating_add(1);
        let forward = steps >= step_budget || rng.gen_bool(WANDER_FORWARD_BIAS);
        current = if forward {
            TileCoord::new(current.column() + 1, current.row())
        } else if rng.gen_bool(0.5) && current.row() > 0 {
            TileCoord::new(current.column(), current.row() - 1)
        } else if current.row() < last_row {
            TileCoord::new(current.column(), current.row() + 1)
        } else {
            TileCoord::new(current.column() + 1, current.row())
        };
        carve(grid, current);
    }

    (start, current)
}

fn carve(grid: &mut Grid, tile: TileCoord) {
    if grid.terrain(tile) == Some(Terrain::Buildable) {
        let _ = grid.set_terrain(tile, Terrain::Path);
    }
}

fn scatter_feature(grid: &mut Grid, feature: &FeatureSpec, rng: &mut impl Rng) {
    let count = rng.gen_range(feature.min..=feature.max);
    for _ in 0..count {
        let placed = (0..MAX_PLACEMENT_ATTEMPTS).any(|_| {
            let tile = TileCoord::new(
                rng.gen_range(0..grid.columns()),
                rng.gen_range(0..grid.rows()),
            );
            grid.terrain(tile) == Some(Terrain::Buildable)
                && grid.set_terrain(tile, Terrain::Obstacle(feature.kind))
        });
        if !placed {
            trace!("skipped {:?} after {MAX_PLACEMENT_ATTEMPTS} attempts", feature.kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::ObstacleKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn polyline_keeps_only_corners() {
        let grid = Grid::new(4, 4, 10.0);
        let tiles = [
            TileCoord::new(0, 0),
            TileCoord::new(1, 0),
            TileCoord::new(2, 0),
            TileCoord::new(2, 1),
            TileCoord::new(2, 2),
            TileCoord::new(3, 2),
        ];
        let route = route_polyline(&grid, &tiles);
        assert_eq!(
            route.points(),
            &[
                Vec2::new(5.0, 5.0),
                Vec2::new(25.0, 5.0),
                Vec2::new(25.0, 25.0),
                Vec2::new(35.0, 25.0),
            ]
        );
    }

    #[test]
    fn elbow_spans_both_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut grid = Grid::new(12, 8, 10.0);
        let (spawn, end) = carve_elbow(&mut grid, &mut rng);
        assert_eq!(spawn.column(), 0);
        assert_eq!(end.column(), 11);
        assert!(grid.is_walkable(spawn));
        assert!(grid.is_walkable(end));
    }

    #[test]
    fn elbow_turns_at_most_once() {
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = Grid::new(12, 8, 10.0);
            let (spawn, end) = carve_elbow(&mut grid, &mut rng);
            let rise = spawn.row().abs_diff(end.row());

            let carved = grid
                .iter()
                .filter(|(_, terrain)| *terrain == Terrain::Path)
                .count();
            assert_eq!(carved, 12 + rise as usize, "seed {seed}");

            let route = route_polyline(&grid, &find_route(&grid, spawn, end));
            let corners = if rise == 0 { 2 } else { 3 };
            assert_eq!(route.len(), corners, "seed {seed}");
        }
    }

    #[test]
    fn wander_reaches_far_edge_on_single_row_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut grid = Grid::new(6, 1, 10.0);
        let (spawn, end) = carve_wander(&mut grid, &mut rng);
        assert_eq!(spawn, TileCoord::new(0, 0));
        assert_eq!(end, TileCoord::new(5, 0));
    }

    #[test]
    fn features_never_overwrite_walkable_tiles() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = Grid::new(3, 1, 10.0);
        for column in 0..3 {
            let _ = grid.set_terrain(TileCoord::new(column, 0), Terrain::Path);
        }
        let feature = FeatureSpec {
            kind: ObstacleKind::Rock,
            min: 5,
            max: 5,
        };
        scatter_feature(&mut grid, &feature, &mut rng);
        assert!(grid.iter().all(|(_, terrain)| terrain == Terrain::Path));
    }
}
