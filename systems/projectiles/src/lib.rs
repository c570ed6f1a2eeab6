#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile flight and impact resolution.
//!
//! Every projectile homes on its current target. On impact it damages the
//! target and anything caught in its blast, then either keeps flying (pierce),
//! jumps to a fresh enemy near the impact (chain) or is destroyed. A projectile
//! never damages the same enemy twice within one flight.

use std::time::Duration;

use log::trace;
use rampart_core::{
    within_radius, Arena, Command, DamageKind, EffectPayload, Enemy, EnemyId, Projectile,
    ProjectileId, ProjectileTuning, TowerId, Vec2,
};

/// Pure system that advances projectiles and resolves their hits.
#[derive(Debug, Default)]
pub struct Projectiles;

impl Projectiles {
    /// Emits movement, damage and lifecycle commands for every projectile.
    pub fn handle(
        &mut self,
        dt: Duration,
        tuning: &ProjectileTuning,
        projectiles: &Arena<ProjectileId, Projectile>,
        enemies: &Arena<EnemyId, Enemy>,
        out: &mut Vec<Command>,
    ) {
        let seconds = dt.as_secs_f32();
        for (id, projectile) in projectiles.iter() {
            let mut next = projectile.clone();

            let live_target = enemies
                .get(next.target)
                .filter(|_| !next.has_hit(next.target));
            let target = match live_target {
                Some(enemy) => enemy,
                None => match nearest_untouched(
                    enemies,
                    &next,
                    next.position,
                    tuning.retarget_radius,
                ) {
                    Some(enemy) => {
                        next.target = enemy.id;
                        enemy
                    }
                    None => {
                        trace!("{id} fizzled");
                        out.push(Command::RemoveProjectile { projectile: id });
                        continue;
                    }
                },
            };

            let step = next.speed * seconds;
            let remaining = next.position.distance(target.position);
            if step < remaining {
                let direction = (target.position - next.position).normalize_or_zero();
                next.position += direction * step;
                out.push(Command::UpdateProjectile { projectile: next });
                continue;
            }

            next.position = target.position;
            strike(&mut next, target, enemies, out);

            if next.pierce > 0 {
                next.pierce -= 1;
                out.push(Command::UpdateProjectile { projectile: next });
            } else if next.chains > 0 {
                match nearest_untouched(enemies, &next, target.position, tuning.chain_radius) {
                    Some(enemy) => {
                        trace!("{id} chains from {} to {}", target.id, enemy.id);
                        next.target = enemy.id;
                        next.chains -= 1;
                        out.push(Command::UpdateProjectile { projectile: next });
                    }
                    None => out.push(Command::RemoveProjectile { projectile: id }),
                }
            } else {
                out.push(Command::RemoveProjectile { projectile: id });
            }
        }
    }
}

/// Applies primary and blast damage, recording every struck enemy.
fn strike(
    projectile: &mut Projectile,
    target: &Enemy,
    enemies: &Arena<EnemyId, Enemy>,
    out: &mut Vec<Command>,
) {
    if !projectile.has_hit(target.id) {
        hit(target.id, projectile.damage, &projectile.on_hit, projectile.source, out);
        projectile.hit.push(target.id);
    }

    let Some(radius) = projectile.blast_radius else {
        return;
    };
    let victims: Vec<EnemyId> = enemies
        .iter()
        .filter(|(id, enemy)| {
            !projectile.has_hit(*id) && within_radius(target.position, enemy.position, radius)
        })
        .map(|(id, _)| id)
        .collect();
    for victim in victims {
        hit(victim, projectile.damage, &projectile.on_blast, projectile.source, out);
        projectile.hit.push(victim);
    }
}

fn hit(
    enemy: EnemyId,
    damage: f32,
    effects: &[EffectPayload],
    source: TowerId,
    out: &mut Vec<Command>,
) {
    out.push(Command::DamageEnemy {
        enemy,
        amount: damage,
        kind: DamageKind::Direct,
    });
    for effect in effects {
        out.push(Command::ApplyStatusEffect {
            enemy,
            effect: *effect,
            source,
        });
    }
}

/// Closest enemy within `radius` of `origin` that the projectile has not yet
/// struck. Ties go to the lower identifier.
fn nearest_untouched<'a>(
    enemies: &'a Arena<EnemyId, Enemy>,
    projectile: &Projectile,
    origin: Vec2,
    radius: f32,
) -> Option<&'a Enemy> {
    let mut best: Option<(f32, &Enemy)> = None;
    for (id, enemy) in enemies.iter() {
        if projectile.has_hit(id) || !within_radius(origin, enemy.position, radius) {
            continue;
        }
        let distance = origin.distance_squared(enemy.position);
        match best {
            Some((closest, _)) if closest <= distance => {}
            _ => best = Some((distance, enemy)),
        }
    }
    best.map(|(_, enemy)| enemy)
}
