//! Uniform-cost A* search over the walkable tiles of a grid.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use rampart_core::{Grid, TileCoord};

/// Finds the shortest 4-directional walkable route between two tiles.
///
/// The returned sequence starts with `start` and ends with `end`. An empty
/// vector means no connected route exists (or either endpoint is blocked);
/// callers treat it as a generation failure. Ties between equally short
/// routes are broken by heap order over `(f, h, tile)`, so the result is
/// stable for a given grid.
#[must_use]
pub fn find_route(grid: &Grid, start: TileCoord, end: TileCoord) -> Vec<TileCoord> {
    if !grid.is_walkable(start) || !grid.is_walkable(end) {
        return Vec::new();
    }

    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<TileCoord, TileCoord> = HashMap::new();
    let mut best_cost: HashMap<TileCoord, u32> = HashMap::new();

    let _ = best_cost.insert(start, 0);
    open.push(Reverse((start.manhattan_distance(end), start.manhattan_distance(end), start)));

    while let Some(Reverse((_, _, tile))) = open.pop() {
        if tile == end {
            return reconstruct(&came_from, start, end);
        }

        let cost = best_cost.get(&tile).copied().unwrap_or(u32::MAX);
        for neighbor in neighbors(tile, grid.columns(), grid.rows()) {
            if !grid.is_walkable(neighbor) {
                continue;
            }

            let next_cost = cost.saturating_add(1);
            if best_cost
                .get(&neighbor)
                .is_some_and(|known| *known <= next_cost)
            {
                continue;
            }

            let _ = best_cost.insert(neighbor, next_cost);
            let _ = came_from.insert(neighbor, tile);
            let heuristic = neighbor.manhattan_distance(end);
            open.push(Reverse((next_cost + heuristic, heuristic, neighbor)));
        }
    }

    Vec::new()
}

fn reconstruct(
    came_from: &HashMap<TileCoord, TileCoord>,
    start: TileCoord,
    end: TileCoord,
) -> Vec<TileCoord> {
    let mut route = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(previous) => {
                current = *previous;
                route.push(current);
            }
            None => return Vec::new(),
        }
    }
    route.reverse();
    route
}

fn neighbors(tile: TileCoord, columns: u32, rows: u32) -> impl Iterator<Item = TileCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = tile.row().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(tile.column(), row));
        count += 1;
    }

    if let Some(column) = tile.column().checked_add(1) {
        if column < columns {
            candidates[count] = Some(TileCoord::new(column, tile.row()));
            count += 1;
        }
    }

    if let Some(row) = tile.row().checked_add(1) {
        if row < rows {
            candidates[count] = Some(TileCoord::new(tile.column(), row));
            count += 1;
        }
    }

    if let Some(column) = tile.column().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(column, tile.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
