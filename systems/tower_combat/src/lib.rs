#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns targeting decisions into attacks, maintains tower
//! cooldowns and emits passive enemy auras.

use std::time::Duration;

use log::trace;
use rampart_core::{
    within_radius, Arena, AttackKind, AuraSpec, Command, DamageKind, Enemy, EnemyId, GameConfig,
    ProjectileSpec, Tower, TowerId, TowerTarget,
};

/// Cooldown applied after an attack by a tower whose fire rate is not positive.
pub const FALLBACK_COOLDOWN: f32 = 1.0;

/// Tower combat system that queues attack and cooldown commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits attacks for targeted towers, cooldown updates for every tower
    /// whose timer changed and passive aura effects for enemies in range.
    ///
    /// `targets` must be ordered by tower identifier, as produced by the
    /// targeting system.
    pub fn handle(
        &mut self,
        dt: Duration,
        config: &GameConfig,
        towers: &Arena<TowerId, Tower>,
        enemies: &Arena<EnemyId, Enemy>,
        targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();
        let seconds = dt.as_secs_f32();

        for (id, tower) in towers.iter() {
            let Some(definition) = config.tower(&tower.kind) else {
                continue;
            };

            let fired = match (find_target(targets, id), &definition.attack) {
                (Some(target), Some(attack)) => {
                    dispatch(attack, id, tower, target, &mut self.scratch);
                    Some(reset_cooldown(target.stats.fire_rate))
                }
                _ => None,
            };
            let cooldown = fired.unwrap_or_else(|| (tower.cooldown - seconds).max(0.0));
            if cooldown != tower.cooldown {
                self.scratch.push(Command::SetTowerCooldown { tower: id, cooldown });
            }

            if let Some(aura) = &definition.enemy_aura {
                for (enemy_id, enemy) in enemies.iter() {
                    if !within_radius(tower.position, enemy.position, aura.radius) {
                        continue;
                    }
                    for effect in &aura.effects {
                        self.scratch.push(Command::ApplyStatusEffect {
                            enemy: enemy_id,
                            effect: *effect,
                            source: id,
                        });
                    }
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Translates one attack into the commands that realise it.
///
/// Projectiles launch from the tower, ground auras anchor at the target's
/// position and attached effects land on the target directly, together with
/// the tower's damage when it has any.
pub fn dispatch(
    attack: &AttackKind,
    source: TowerId,
    tower: &Tower,
    target: &TowerTarget,
    out: &mut Vec<Command>,
) {
    let stats = target.stats;
    match attack {
        AttackKind::StandardProjectile {
            speed,
            blast_radius,
            on_hit,
            on_blast,
        } => {
            trace!("{source} fires at {}", target.enemy);
            out.push(Command::SpawnProjectile {
                spec: ProjectileSpec {
                    source,
                    position: tower.position,
                    target: target.enemy,
                    speed: *speed,
                    damage: stats.damage,
                    blast_radius: *blast_radius,
                    pierce: stats.pierce,
                    chains: stats.chains,
                    on_hit: on_hit.clone(),
                    on_blast: on_blast.clone(),
                },
            });
        }
        AttackKind::GroundAura {
            radius,
            duration,
            effects,
        } => {
            trace!("{source} drops an aura under {}", target.enemy);
            out.push(Command::SpawnAura {
                spec: AuraSpec {
                    source,
                    position: target.enemy_position,
                    radius: *radius,
                    duration: *duration,
                    damage_per_second: stats.damage,
                    effects: effects.clone(),
                },
            });
        }
        AttackKind::AttachedEffect { effects } => {
            for effect in effects {
                out.push(Command::ApplyStatusEffect {
                    enemy: target.enemy,
                    effect: *effect,
                    source,
                });
            }
            if stats.damage > 0.0 {
                out.push(Command::DamageEnemy {
                    enemy: target.enemy,
                    amount: stats.damage,
                    kind: DamageKind::Direct,
                });
            }
        }
    }
}

/// Seconds until the next attack for the given effective fire rate.
#[must_use]
pub fn reset_cooldown(fire_rate: f32) -> f32 {
    if fire_rate > 0.0 {
        1.0 / fire_rate
    } else {
        FALLBACK_COOLDOWN
    }
}

fn find_target(targets: &[TowerTarget], tower: TowerId) -> Option<&TowerTarget> {
    targets
        .binary_search_by_key(&tower, |target| target.tower)
        .ok()
        .map(|index| &targets[index])
}
