use proptest::prelude::*;
use rampart_core::{ActiveEffect, EffectKind, TowerId};
use rampart_system_movement::fold_effects;

fn active_effect() -> impl Strategy<Value = ActiveEffect> {
    let kind = prop_oneof![
        Just(EffectKind::Slow),
        Just(EffectKind::Stun),
        Just(EffectKind::ArmorBreak),
        Just(EffectKind::Burn),
        Just(EffectKind::Bleed),
        Just(EffectKind::Poison),
    ];
    (kind, -5.0_f32..20.0, 0.01_f32..5.0).prop_map(|(kind, potency, remaining)| ActiveEffect {
        kind,
        potency,
        remaining,
        source: TowerId::new(0),
    })
}

proptest! {
    #[test]
    fn derived_speed_and_armor_are_never_negative(
        base_speed in 0.0_f32..500.0,
        base_armor in 0.0_f32..50.0,
        effects in proptest::collection::vec(active_effect(), 0..8),
    ) {
        let derived = fold_effects(base_speed, base_armor, &effects);
        prop_assert!(derived.speed >= 0.0);
        prop_assert!(derived.armor >= 0.0);
        prop_assert!(derived.speed <= base_speed);
        prop_assert!(derived.armor <= base_armor);
    }

    #[test]
    fn stun_always_stops(
        base_speed in 0.0_f32..500.0,
        mut effects in proptest::collection::vec(active_effect(), 0..8),
    ) {
        effects.push(ActiveEffect {
            kind: EffectKind::Stun,
            potency: 0.0,
            remaining: 1.0,
            source: TowerId::new(1),
        });
        prop_assert_eq!(fold_effects(base_speed, 0.0, &effects).speed, 0.0);
    }
}
