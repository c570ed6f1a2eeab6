//! Shared fixtures and entity builders for Rampart tests.
//!
//! The fixture tables are deliberately small and round-numbered so scenario
//! tests can assert exact health, currency and cooldown values.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

use rampart_core::{
    Arena, Enemy, EnemyId, EnemyKind, GameConfig, Grid, Level, LevelStyleId, Route, RouteId,
    Terrain, TileCoord, Tower, TowerId, TowerKind, Vec2,
};

/// Tile edge length used by every fixture level style.
pub const TILE_SIZE: f32 = 40.0;

/// Row carrying the route of [`straight_level`].
pub const STRAIGHT_ROUTE_ROW: u32 = 5;

pub const FIXTURE_TOML: &str = r#"
[economy]
starting_currency = 500
starting_base_health = 10
first_wave_delay = 2.0

[projectiles]
retarget_radius = 60.0
chain_radius = 120.0

[waves]
count_base = 2.0
count_per_wave = 1.0
count_per_difficulty = 0.0
spawn_cooldown_base = 1.0
spawn_cooldown_per_wave = 0.0
spawn_cooldown_per_difficulty = 0.0
spawn_cooldown_min = 0.5

[[difficulties]]
inter_wave_delay = 5.0
stat_modifier = 1.0
refund_percent = 70

[[difficulties]]
inter_wave_delay = 3.0
stat_modifier = 2.0
refund_percent = 50

[towers.arrow]
cost = 100
stats = { damage = 10.0, range = 100.0, fire_rate = 1.0 }
attack = { kind = "standard_projectile", speed = 200.0 }

[towers.arrow.upgrades.sharp]
cost = 30
modifiers = [{ stat = "damage", op = "add", value = 5.0 }]

[towers.arrow.upgrades.rapid]
cost = 40
modifiers = [{ stat = "fire_rate", op = "multiply", value = 2.0 }]

[towers.needle]
cost = 80
stats = { damage = 10.0, range = 100.0, fire_rate = 1.0, pierce = 1 }
attack = { kind = "standard_projectile", speed = 100.0 }

[towers.cannon]
cost = 120
stats = { damage = 10.0, range = 100.0, fire_rate = 1.0 }

[towers.cannon.attack]
kind = "standard_projectile"
speed = 200.0
blast_radius = 30.0
on_blast = [{ kind = "slow", potency = 0.5, duration = 1.0 }]

[towers.zapper]
cost = 90
stats = { damage = 10.0, range = 100.0, fire_rate = 1.0, chains = 1 }
attack = { kind = "standard_projectile", speed = 1000.0 }

[towers.frost]
cost = 60
stats = { range = 100.0, fire_rate = 1.0 }

[towers.frost.attack]
kind = "attached_effect"
effects = [{ kind = "slow", potency = 0.5, duration = 2.0 }]

[towers.firepit]
cost = 150
stats = { damage = 10.0, range = 100.0, fire_rate = 0.0 }

[towers.firepit.attack]
kind = "ground_aura"
radius = 50.0
duration = 3.0

[towers.banner]
cost = 75
stats = { range = 0.0 }

[towers.banner.support]
radius = 100.0
buffs = [
    { kind = "damage_multiplier", value = 2.0 },
    { kind = "range_multiplier", value = 1.5 },
]

[towers.glacier]
cost = 110
stats = { range = 0.0 }
enemy_aura = { radius = 60.0, effects = [{ kind = "slow", potency = 0.25, duration = 1.0 }] }

[enemies.grunt]
health = 100.0
speed = 50.0
reward = 10
collision_damage = 2

[enemies.brute]
health = 200.0
speed = 20.0
armor = 5.0
reward = 25
collision_damage = 5
min_difficulty = 1
immunities = ["stun"]

[level_styles.line]
columns = 20
rows = 12
tile_size = 40.0
difficulty = 0
routes = [{ shape = "elbow", count = 1 }]

[level_styles.twin]
columns = 20
rows = 12
tile_size = 40.0
difficulty = 1
routes = [{ shape = "elbow", count = 1 }, { shape = "wander", count = 1 }]
features = [
    { kind = "rock", min = 3, max = 5 },
    { kind = "tree", min = 2, max = 4 },
]

[level_styles.barren]
columns = 10
rows = 6
tile_size = 40.0
difficulty = 0
routes = []
"#;

/// Parses the fixture tables.
pub fn fixture_config() -> GameConfig {
    GameConfig::from_toml_str(FIXTURE_TOML).expect("fixture config must parse")
}

/// Builds a fixture grunt heading for the second point of route zero.
pub fn grunt(id: EnemyId, position: Vec2) -> Enemy {
    Enemy {
        id,
        kind: EnemyKind::from("grunt"),
        position,
        health: 100.0,
        max_health: 100.0,
        route: RouteId::new(0),
        route_index: 1,
        effects: Vec::new(),
        base_speed: 50.0,
        base_armor: 0.0,
        speed: 50.0,
        armor: 0.0,
        reward: 10,
        collision_damage: 2,
    }
}

/// Allocates one grunt per position, with identifiers following slice order.
pub fn enemy_arena(positions: &[Vec2]) -> Arena<EnemyId, Enemy> {
    let mut arena = Arena::new();
    for position in positions {
        let _ = arena.allocate(|id| grunt(id, *position));
    }
    arena
}

/// Builds a tower of the fixture type standing at `position`.
pub fn tower(config: &GameConfig, id: TowerId, kind: &str, position: Vec2) -> Tower {
    let kind = TowerKind::from(kind);
    let definition = config.tower(&kind).expect("fixture tower type");
    Tower {
        id,
        tile: TileCoord::new(
            (position.x / TILE_SIZE).max(0.0) as u32,
            (position.y / TILE_SIZE).max(0.0) as u32,
        ),
        kind,
        position,
        cooldown: 0.0,
        upgrades: Vec::new(),
        invested: definition.cost,
        stats: definition.stats,
    }
}

/// Allocates towers of the given fixture types and positions.
pub fn tower_arena(config: &GameConfig, entries: &[(&str, Vec2)]) -> Arena<TowerId, Tower> {
    let mut arena = Arena::new();
    for (kind, position) in entries {
        let _ = arena.allocate(|id| tower(config, id, kind, *position));
    }
    arena
}

/// Hand-built 20x12 level with one straight route along [`STRAIGHT_ROUTE_ROW`].
pub fn straight_level() -> Level {
    let mut grid = Grid::new(20, 12, TILE_SIZE);
    let mut tiles = Vec::new();
    for column in 0..20 {
        let tile = TileCoord::new(column, STRAIGHT_ROUTE_ROW);
        let terrain = match column {
            0 => Terrain::Spawn,
            19 => Terrain::End,
            _ => Terrain::Path,
        };
        let _ = grid.set_terrain(tile, terrain);
        tiles.push(tile);
    }
    let start = grid.tile_center(TileCoord::new(0, STRAIGHT_ROUTE_ROW));
    let end = grid.tile_center(TileCoord::new(19, STRAIGHT_ROUTE_ROW));
    Level {
        style: LevelStyleId::from("line"),
        difficulty: 0,
        grid,
        tile_routes: vec![tiles],
        routes: vec![Route::new(vec![start, end])],
    }
}
