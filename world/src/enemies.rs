//! Enemy lifecycle: spawning, the central damage path and route completion.

use log::{debug, info, warn};
use rampart_core::{
    mitigate, DamageKind, EffectPayload, Enemy, EnemyId, EnemyKind, Event, GameConfig, RouteId,
    TowerId,
};

use crate::World;

/// Creates an enemy at the first point of its route, scaled for the current
/// wave and difficulty.
pub(crate) fn spawn(
    world: &mut World,
    config: &GameConfig,
    kind: EnemyKind,
    route: RouteId,
    out_events: &mut Vec<Event>,
) {
    let Some(definition) = config.enemy(&kind) else {
        warn!("ignored spawn of unknown enemy type `{kind}`");
        return;
    };
    let Some(start) = world.level.route(route).and_then(|path| path.point(0)) else {
        warn!("ignored spawn of `{kind}` on missing route {}", route.get());
        return;
    };

    let modifier = config
        .difficulty(world.level.difficulty)
        .map_or(1.0, |difficulty| difficulty.stat_modifier);
    let waves_survived = world.wave.saturating_sub(1) as f32;
    let health = definition.health
        * (1.0 + definition.health_growth_per_wave * waves_survived).max(0.0)
        * modifier;
    let speed = definition.speed * modifier.sqrt();

    let enemy = world.enemies.allocate(|id| Enemy {
        id,
        kind: kind.clone(),
        position: start,
        health,
        max_health: health,
        route,
        route_index: 1,
        effects: Vec::new(),
        base_speed: speed,
        base_armor: definition.armor,
        speed,
        armor: definition.armor,
        reward: definition.reward,
        collision_damage: definition.collision_damage,
    });
    out_events.push(Event::EnemySpawned { enemy, kind, route });
}

/// Central damage path: mitigates, subtracts and resolves death exactly once.
pub(crate) fn damage(
    world: &mut World,
    enemy: EnemyId,
    amount: f32,
    kind: DamageKind,
    out_events: &mut Vec<Event>,
) {
    let Some(target) = world.enemies.get_mut(enemy) else {
        return;
    };
    target.health -= mitigate(amount, target.armor, kind);
    if target.health > 0.0 {
        return;
    }

    if let Some(dead) = world.enemies.remove(enemy) {
        world.currency = world.currency.saturating_add(dead.reward);
        out_events.push(Event::EnemyKilled {
            enemy,
            reward: dead.reward,
        });
    }
}

/// Removes an enemy that walked its whole route and charges the base.
pub(crate) fn reach_base(world: &mut World, enemy: EnemyId, out_events: &mut Vec<Event>) {
    let Some(leaked) = world.enemies.remove(enemy) else {
        return;
    };
    let damage = leaked.collision_damage;
    world.base_health = world.base_health.saturating_sub(damage);
    debug!("{enemy} reached the base for {damage}");
    out_events.push(Event::EnemyReachedBase { enemy, damage });

    if world.base_health == 0 && world.active {
        world.active = false;
        info!("base destroyed during wave {}", world.wave);
        out_events.push(Event::BaseDestroyed);
    }
}

/// Attaches or refreshes a status effect through the resolver's policy.
pub(crate) fn apply_effect(
    world: &mut World,
    config: &GameConfig,
    enemy: EnemyId,
    effect: &EffectPayload,
    source: TowerId,
) {
    let Some(target) = world.enemies.get_mut(enemy) else {
        return;
    };
    let Some(definition) = config.enemy(&target.kind) else {
        return;
    };
    let _ = rampart_system_status_effects::apply(&mut target.effects, definition, effect, source);
}
