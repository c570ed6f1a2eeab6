#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy movement along bound routes, with speed and armor derived from
//! active status effects every tick.

use std::time::Duration;

use rampart_core::{ActiveEffect, Arena, Command, EffectKind, Enemy, EnemyId, Level};

/// Speed and armor after folding an enemy's active effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedStats {
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Flat armor.
    pub armor: f32,
}

/// Folds active effects into base speed and armor.
///
/// Slows add up and are capped at a full stop; a stun counts as a full stop.
/// Armor breaks subtract from base armor, which never drops below zero.
#[must_use]
pub fn fold_effects(base_speed: f32, base_armor: f32, effects: &[ActiveEffect]) -> DerivedStats {
    let mut slow = 0.0_f32;
    let mut armor_break = 0.0_f32;
    for effect in effects {
        match effect.kind {
            EffectKind::Slow => slow += effect.potency.max(0.0),
            EffectKind::Stun => slow = 1.0,
            EffectKind::ArmorBreak => armor_break += effect.potency.max(0.0),
            EffectKind::Burn | EffectKind::Bleed | EffectKind::Poison => {}
        }
    }

    DerivedStats {
        speed: (base_speed.max(0.0) * (1.0 - slow.min(1.0))).max(0.0),
        armor: (base_armor - armor_break).max(0.0),
    }
}

/// Pure system that advances enemies along their routes.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits one movement or route-completion command per enemy.
    pub fn handle(
        &mut self,
        dt: Duration,
        enemies: &Arena<EnemyId, Enemy>,
        level: &Level,
        out: &mut Vec<Command>,
    ) {
        let seconds = dt.as_secs_f32();
        for (id, enemy) in enemies.iter() {
            let derived = fold_effects(enemy.base_speed, enemy.base_armor, &enemy.effects);

            let Some(next) = level
                .route(enemy.route)
                .and_then(|route| route.point(enemy.route_index))
            else {
                out.push(Command::EnemyReachedBase { enemy: id });
                continue;
            };

            let step = derived.speed * seconds;
            let remaining = enemy.position.distance(next);
            let (position, route_index) = if step >= remaining {
                (next, enemy.route_index + 1)
            } else {
                let direction = (next - enemy.position).normalize_or_zero();
                (enemy.position + direction * step, enemy.route_index)
            };

            out.push(Command::MoveEnemy {
                enemy: id,
                position,
                route_index,
                speed: derived.speed,
                armor: derived.armor,
            });
        }
    }
}
