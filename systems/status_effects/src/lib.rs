#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Status effect resolution: application with refresh semantics, per-tick
//! decay and damage-over-time payout.

use std::time::Duration;

use log::trace;
use rampart_core::{
    ActiveEffect, Arena, Command, DamageKind, EffectPayload, Enemy, EnemyDefinition, EnemyId,
    TowerId,
};

/// Attaches or refreshes a status effect in an enemy's effect list.
///
/// Immune enemy types ignore the payload. An existing instance of the same
/// kind keeps the larger potency and the longer remaining duration, and is
/// credited to the latest source. Returns whether the list changed.
pub fn apply(
    effects: &mut Vec<ActiveEffect>,
    definition: &EnemyDefinition,
    payload: &EffectPayload,
    source: TowerId,
) -> bool {
    if definition.is_immune_to(payload.kind) {
        trace!("ignored {:?} from {source}: immune", payload.kind);
        return false;
    }

    match effects.iter_mut().find(|effect| effect.kind == payload.kind) {
        Some(existing) => {
            existing.potency = existing.potency.max(payload.potency);
            existing.remaining = existing.remaining.max(payload.duration);
            existing.source = source;
        }
        // An expired payload cannot start a new instance.
        None if payload.duration <= 0.0 => return false,
        None => effects.push(ActiveEffect {
            kind: payload.kind,
            potency: payload.potency,
            remaining: payload.duration,
            source,
        }),
    }
    true
}

/// Pure system that ages active effects and pays out damage over time.
#[derive(Debug, Default)]
pub struct StatusEffects;

impl StatusEffects {
    /// Emits the decayed effect lists and periodic damage for one tick.
    pub fn handle(&mut self, dt: Duration, enemies: &Arena<EnemyId, Enemy>, out: &mut Vec<Command>) {
        let seconds = dt.as_secs_f32();
        if seconds <= 0.0 {
            return;
        }

        for (id, enemy) in enemies.iter() {
            if enemy.effects.is_empty() {
                continue;
            }

            let survivors = decay(&enemy.effects, seconds);
            out.push(Command::SetStatusEffects {
                enemy: id,
                effects: survivors.clone(),
            });

            for effect in survivors
                .iter()
                .filter(|effect| effect.kind.is_damage_over_time())
            {
                let amount = effect.potency * seconds;
                if amount > 0.0 {
                    out.push(Command::DamageEnemy {
                        enemy: id,
                        amount,
                        kind: DamageKind::Periodic,
                    });
                }
            }
        }
    }
}

fn decay(effects: &[ActiveEffect], seconds: f32) -> Vec<ActiveEffect> {
    effects
        .iter()
        .filter_map(|effect| {
            let remaining = effect.remaining - seconds;
            (remaining > 0.0).then_some(ActiveEffect {
                remaining,
                ..*effect
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{EffectKind, EnemyKind, Vec2};
    use rampart_test_utils::{enemy_arena, fixture_config};

    fn burning(potency: f32, remaining: f32) -> ActiveEffect {
        ActiveEffect {
            kind: EffectKind::Burn,
            potency,
            remaining,
            source: TowerId::new(0),
        }
    }

    #[test]
    fn immune_types_ignore_payloads() {
        let config = fixture_config();
        let brute = config.enemy(&EnemyKind::from("brute")).expect("brute");
        let mut effects = Vec::new();
        let stun = EffectPayload::new(EffectKind::Stun, 1.0, 2.0);

        assert!(!apply(&mut effects, brute, &stun, TowerId::new(1)));
        assert!(effects.is_empty());
    }

    #[test]
    fn refresh_reassigns_source_without_stacking() {
        let config = fixture_config();
        let grunt = config.enemy(&EnemyKind::from("grunt")).expect("grunt");
        let mut effects = Vec::new();

        let _ = apply(
            &mut effects,
            grunt,
            &EffectPayload::new(EffectKind::Slow, 0.5, 1.0),
            TowerId::new(1),
        );
        let _ = apply(
            &mut effects,
            grunt,
            &EffectPayload::new(EffectKind::Slow, 0.2, 3.0),
            TowerId::new(2),
        );

        assert_eq!(
            effects,
            vec![ActiveEffect {
                kind: EffectKind::Slow,
                potency: 0.5,
                remaining: 3.0,
                source: TowerId::new(2),
            }]
        );
    }

    #[test]
    fn zero_duration_payload_still_refreshes_existing_instance() {
        let config = fixture_config();
        let grunt = config.enemy(&EnemyKind::from("grunt")).expect("grunt");
        let mut effects = Vec::new();

        let _ = apply(
            &mut effects,
            grunt,
            &EffectPayload::new(EffectKind::Slow, 0.2, 1.0),
            TowerId::new(0),
        );
        let changed = apply(
            &mut effects,
            grunt,
            &EffectPayload::new(EffectKind::Slow, 0.8, 0.0),
            TowerId::new(1),
        );

        assert!(changed);
        assert_eq!(
            effects,
            vec![ActiveEffect {
                kind: EffectKind::Slow,
                potency: 0.8,
                remaining: 1.0,
                source: TowerId::new(1),
            }]
        );
    }

    #[test]
    fn zero_duration_payload_does_not_start_an_instance() {
        let config = fixture_config();
        let grunt = config.enemy(&EnemyKind::from("grunt")).expect("grunt");
        let mut effects = Vec::new();

        let changed = apply(
            &mut effects,
            grunt,
            &EffectPayload::new(EffectKind::Burn, 3.0, 0.0),
            TowerId::new(0),
        );

        assert!(!changed);
        assert!(effects.is_empty());
    }

    #[test]
    fn decay_drops_effects_that_run_out() {
        let survivors = decay(&[burning(4.0, 0.5), burning(4.0, 2.0)], 0.5);
        assert_eq!(survivors, vec![burning(4.0, 1.5)]);
    }

    #[test]
    fn damage_over_time_pays_potency_times_dt() {
        let mut enemies = enemy_arena(&[Vec2::ZERO]);
        let id = EnemyId::new(0);
        if let Some(enemy) = enemies.get_mut(id) {
            enemy.effects = vec![burning(8.0, 2.0)];
        }

        let mut out = Vec::new();
        StatusEffects.handle(Duration::from_millis(250), &enemies, &mut out);

        assert_eq!(
            out,
            vec![
                Command::SetStatusEffects {
                    enemy: id,
                    effects: vec![burning(8.0, 1.75)],
                },
                Command::DamageEnemy {
                    enemy: id,
                    amount: 2.0,
                    kind: DamageKind::Periodic,
                },
            ]
        );
    }

    #[test]
    fn expired_damage_over_time_pays_nothing() {
        let mut enemies = enemy_arena(&[Vec2::ZERO]);
        let id = EnemyId::new(0);
        if let Some(enemy) = enemies.get_mut(id) {
            enemy.effects = vec![burning(8.0, 0.1)];
        }

        let mut out = Vec::new();
        StatusEffects.handle(Duration::from_millis(250), &enemies, &mut out);

        assert_eq!(
            out,
            vec![Command::SetStatusEffects {
                enemy: id,
                effects: Vec::new(),
            }]
        );
    }

    #[test]
    fn enemies_without_effects_are_skipped() {
        let enemies = enemy_arena(&[Vec2::ZERO, Vec2::ONE]);
        let mut out = Vec::new();
        StatusEffects.handle(Duration::from_secs(1), &enemies, &mut out);
        assert!(out.is_empty());
    }
}
