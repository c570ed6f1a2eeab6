use std::{
    collections::{BTreeSet, HashSet},
    time::Duration,
};

use rampart_core::{
    CommandError, EffectKind, EnemyId, Event, GameConfig, LevelStyleId, Terrain, TileCoord,
    TowerKind, UpgradeId, Vec2,
};
use rampart_simulation::{SessionSnapshot, Simulation};
use rampart_test_utils::fixture_config;
use rampart_world::{query, World};

const STEP: Duration = Duration::from_millis(50);

fn started(config: GameConfig, seed: u64, style: &str) -> Simulation {
    let mut simulation = Simulation::new(config, seed);
    simulation
        .start_session(&LevelStyleId::from(style))
        .expect("fixture style generates");
    simulation
}

fn tiles_beside_route(world: &World) -> Vec<TileCoord> {
    let level = query::level(world);
    let grid = &level.grid;
    let mut tiles = BTreeSet::new();
    for tile in level.tile_routes.iter().flatten() {
        for (dc, dr) in [(-1_i64, 0_i64), (1, 0), (0, -1), (0, 1)] {
            let column = i64::from(tile.column()) + dc;
            let row = i64::from(tile.row()) + dr;
            if column < 0 || row < 0 {
                continue;
            }
            let candidate = TileCoord::new(column as u32, row as u32);
            if grid.terrain(candidate).is_some_and(Terrain::is_buildable) {
                let _ = tiles.insert(candidate);
            }
        }
    }
    tiles.into_iter().collect()
}

fn build_line(simulation: &mut Simulation, kinds: &[&str]) {
    let tiles = tiles_beside_route(simulation.world().expect("session running"));
    assert!(tiles.len() >= kinds.len(), "not enough tiles beside the route");
    for (kind, tile) in kinds.iter().zip(tiles) {
        let _ = simulation
            .place_tower(TowerKind::from(*kind), tile)
            .expect("placement beside the route succeeds");
    }
}

/// Advances until the first enemy enters and returns where it stands.
fn first_spawn(simulation: &mut Simulation) -> (EnemyId, Vec2) {
    for _ in 0..200 {
        for event in simulation.advance(STEP) {
            if let Event::EnemySpawned { enemy, .. } = event {
                let world = simulation.world().expect("session running");
                let position = query::enemies(world)
                    .get(enemy)
                    .expect("spawned enemy is live")
                    .position;
                return (enemy, position);
            }
        }
    }
    panic!("no enemy spawned");
}

/// Buildable tiles ordered by the distance of their centre from `point`.
fn buildable_near(world: &World, point: Vec2) -> Vec<(TileCoord, f32)> {
    let grid = query::grid(world);
    let mut tiles: Vec<(TileCoord, f32)> = grid
        .iter()
        .filter(|(_, terrain)| terrain.is_buildable())
        .map(|(tile, _)| (tile, grid.tile_center(tile).distance(point)))
        .collect();
    tiles.sort_by(|a, b| a.1.total_cmp(&b.1));
    tiles
}

#[test]
fn combat_lands_before_enemies_move_within_a_tick() {
    let mut simulation = started(fixture_config(), 13, "line");
    let (enemy, spawned_at) = first_spawn(&mut simulation);
    let near = buildable_near(simulation.world().expect("session running"), spawned_at);
    let (zapper_tile, zapper_distance) = near[0];
    let (frost_tile, frost_distance) = near[1];
    // A zapper bolt covers 50 units per 50ms step.
    assert!(zapper_distance <= 50.0);
    assert!(frost_distance <= 100.0);

    let _ = simulation
        .place_tower(TowerKind::from("zapper"), zapper_tile)
        .expect("zapper is affordable");
    let frost = simulation
        .place_tower(TowerKind::from("frost"), frost_tile)
        .expect("frost is affordable");
    let _ = simulation.advance(STEP);

    let world = simulation.world().expect("session running");
    let grunt = query::enemies(world).get(enemy).expect("grunt survives one volley");
    assert_eq!(grunt.health, 90.0);
    assert_eq!(grunt.effects.len(), 1);
    let slow = &grunt.effects[0];
    assert_eq!(slow.kind, EffectKind::Slow);
    assert_eq!(slow.potency, 0.5);
    assert_eq!(slow.source, frost);
    assert!((slow.remaining - (2.0 - STEP.as_secs_f32())).abs() < 1e-4);

    // Half of the grunt's 50 units per second.
    assert_eq!(grunt.speed, 25.0);
    let walked = grunt.position.distance(spawned_at);
    assert!((walked - 25.0 * STEP.as_secs_f32()).abs() < 1e-4, "walked {walked}");
    assert!(query::projectiles(world).is_empty());
}

#[test]
fn ground_auras_drop_where_the_target_stood_before_it_moved() {
    let mut simulation = started(fixture_config(), 13, "line");
    let (enemy, spawned_at) = first_spawn(&mut simulation);
    let (tile, distance) =
        buildable_near(simulation.world().expect("session running"), spawned_at)[0];
    assert!(distance <= 100.0);

    let _ = simulation
        .place_tower(TowerKind::from("firepit"), tile)
        .expect("firepit is affordable");
    let _ = simulation.advance(STEP);

    let world = simulation.world().expect("session running");
    let auras: Vec<Vec2> = query::auras(world)
        .iter()
        .map(|(_, aura)| aura.position)
        .collect();
    assert_eq!(auras, vec![spawned_at]);
    let grunt = query::enemies(world).get(enemy).expect("grunt is live");
    assert_ne!(grunt.position, spawned_at);
    assert!((grunt.health - (100.0 - 10.0 * STEP.as_secs_f32())).abs() < 1e-3);
}

#[test]
fn selling_right_after_placing_refunds_the_floored_share() {
    let mut simulation = started(fixture_config(), 8, "line");
    let tile = tiles_beside_route(simulation.world().expect("session running"))[0];

    // 70% of 75 is 52.5.
    let tower = simulation
        .place_tower(TowerKind::from("banner"), tile)
        .expect("banner is affordable");
    assert_eq!(simulation.snapshot().expect("running").currency, 500 - 75);
    assert_eq!(simulation.sell_tower(tower), Ok(52));

    let world = simulation.world().expect("session running");
    assert_eq!(query::currency(world), 500 - 75 + 52);
    assert_eq!(query::tower_at(world, tile), None);
    assert_eq!(
        simulation.advance(STEP)[..2],
        [
            Event::TowerPlaced {
                tower,
                kind: TowerKind::from("banner"),
                tile,
                cost: 75,
            },
            Event::TowerSold { tower, refund: 52 },
        ]
    );
}

#[test]
fn currency_is_conserved_across_a_fought_session() {
    let mut config = fixture_config();
    config.economy.starting_currency = 3_000;
    let mut simulation = started(config, 11, "line");
    build_line(&mut simulation, &["arrow"; 20]);

    let first = rampart_core::TowerId::new(0);
    let second = rampart_core::TowerId::new(1);
    simulation
        .purchase_upgrade(first, UpgradeId::from("sharp"))
        .expect("upgrade is affordable");
    let _ = simulation.sell_tower(second).expect("tower exists");

    let mut events = Vec::new();
    for _ in 0..1_200 {
        events.extend(simulation.advance(STEP));
    }

    let mut expected: i64 = 3_000;
    let mut killed = HashSet::new();
    let mut leaked = HashSet::new();
    for event in &events {
        match event {
            Event::TowerPlaced { cost, .. } | Event::TowerUpgraded { cost, .. } => {
                expected -= i64::from(*cost);
            }
            Event::TowerSold { refund, .. } => expected += i64::from(*refund),
            Event::EnemyKilled { enemy, reward } => {
                expected += i64::from(*reward);
                assert!(killed.insert(*enemy), "{enemy} died twice");
            }
            Event::EnemyReachedBase { enemy, .. } => {
                assert!(leaked.insert(*enemy), "{enemy} leaked twice");
            }
            _ => {}
        }
    }

    let snapshot = simulation.snapshot().expect("session running");
    assert_eq!(i64::from(snapshot.currency), expected);
    assert!(!killed.is_empty(), "a lined route should kill enemies");
    assert!(killed.is_disjoint(&leaked));
}

#[test]
fn every_leaked_enemy_charges_the_base_once() {
    let mut simulation = started(fixture_config(), 3, "line");
    let mut leaked: Vec<EnemyId> = Vec::new();
    let mut cleared = false;

    for _ in 0..4_000 {
        for event in simulation.advance(STEP) {
            match event {
                Event::EnemyReachedBase { enemy, damage } => {
                    assert_eq!(damage, 2);
                    leaked.push(enemy);
                }
                Event::WaveCleared { wave: 1 } => cleared = true,
                _ => {}
            }
        }
        if cleared {
            break;
        }
    }

    assert!(cleared, "wave one never cleared");
    let unique: HashSet<_> = leaked.iter().copied().collect();
    assert_eq!(leaked.len(), 3);
    assert_eq!(unique.len(), 3);
    let snapshot = simulation.snapshot().expect("session running");
    assert_eq!(snapshot.base_health, 4);
    assert_eq!(snapshot.enemies, 0);
}

#[test]
fn undefended_base_ends_the_session() {
    let mut simulation = started(fixture_config(), 5, "line");
    let mut destroyed = 0;

    for _ in 0..10_000 {
        destroyed += simulation
            .advance(STEP)
            .iter()
            .filter(|event| matches!(event, Event::BaseDestroyed))
            .count();
        if !simulation.is_active() {
            break;
        }
    }

    assert_eq!(destroyed, 1);
    let snapshot = simulation.snapshot().expect("session kept for inspection");
    assert_eq!(snapshot.base_health, 0);
    assert!(!snapshot.active);
    assert!(simulation.advance(STEP).is_empty());
    assert_eq!(simulation.snapshot(), Some(snapshot));
}

#[test]
fn upgrades_are_bought_once() {
    let mut simulation = started(fixture_config(), 8, "line");
    build_line(&mut simulation, &["arrow"]);
    let tower = rampart_core::TowerId::new(0);

    simulation
        .purchase_upgrade(tower, UpgradeId::from("sharp"))
        .expect("first purchase succeeds");
    let repeat = simulation.purchase_upgrade(tower, UpgradeId::from("sharp"));

    assert_eq!(
        repeat,
        Err(CommandError::DuplicateUpgrade {
            tower,
            upgrade: UpgradeId::from("sharp"),
        })
    );
    let world = simulation.world().expect("session running");
    assert_eq!(query::currency(world), 370);
    assert_eq!(
        query::towers(world).get(tower).expect("tower").stats.damage,
        15.0
    );
}

#[test]
fn rejected_commands_leave_currency_untouched() {
    let mut simulation = started(fixture_config(), 8, "line");
    let world = simulation.world().expect("session running");
    let path = query::level(world).tile_routes[0][1];

    assert_eq!(
        simulation.place_tower(TowerKind::from("arrow"), path),
        Err(CommandError::NotBuildable(path))
    );
    assert_eq!(
        simulation.sell_tower(rampart_core::TowerId::new(42)),
        Err(CommandError::UnknownTower(rampart_core::TowerId::new(42)))
    );
    assert_eq!(simulation.snapshot().expect("running").currency, 500);
}

fn replay(seed: u64) -> (Vec<Event>, Option<SessionSnapshot>) {
    let mut simulation = started(fixture_config(), seed, "twin");
    build_line(&mut simulation, &["arrow", "cannon", "frost", "firepit"]);

    let mut events = Vec::new();
    for _ in 0..800 {
        events.extend(simulation.advance(STEP));
    }
    (events, simulation.snapshot())
}

#[test]
fn same_seed_replays_identically() {
    let first = replay(21);
    let second = replay(21);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .0
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { wave: 1, .. })));
}
