#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ground aura ageing and area damage.

use std::time::Duration;

use log::trace;
use rampart_core::{within_radius, Arena, Aura, AuraId, Command, DamageKind, Enemy, EnemyId};

/// Pure system that ages ground auras and applies them to enemies inside.
#[derive(Debug, Default)]
pub struct Auras;

impl Auras {
    /// Emits area damage, effect applications and lifetime updates.
    ///
    /// Damage is paid for the part of the tick the aura was still alive, so an
    /// aura deals exactly `damage_per_second * duration` over its lifetime.
    pub fn handle(
        &mut self,
        dt: Duration,
        auras: &Arena<AuraId, Aura>,
        enemies: &Arena<EnemyId, Enemy>,
        out: &mut Vec<Command>,
    ) {
        let seconds = dt.as_secs_f32();
        for (id, aura) in auras.iter() {
            let active = seconds.min(aura.remaining.max(0.0));
            let damage = aura.damage_per_second * active;

            for (enemy_id, enemy) in enemies.iter() {
                if !within_radius(aura.position, enemy.position, aura.radius) {
                    continue;
                }
                if damage > 0.0 {
                    out.push(Command::DamageEnemy {
                        enemy: enemy_id,
                        amount: damage,
                        kind: DamageKind::Periodic,
                    });
                }
                for effect in &aura.effects {
                    out.push(Command::ApplyStatusEffect {
                        enemy: enemy_id,
                        effect: *effect,
                        source: aura.source,
                    });
                }
            }

            let remaining = aura.remaining - seconds;
            if remaining <= 0.0 {
                trace!("{id} expired");
                out.push(Command::RemoveAura { aura: id });
            } else {
                out.push(Command::UpdateAura {
                    aura: id,
                    remaining,
                });
            }
        }
    }
}
