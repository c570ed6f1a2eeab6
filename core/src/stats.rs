//! Tower combat statistics, upgrade modifiers and damage mitigation.

use serde::{Deserialize, Serialize};

/// Fraction of incoming direct damage that always passes through armor.
pub const MINIMUM_DAMAGE_FRACTION: f32 = 0.1;

/// Combat statistics a tower attacks with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Damage per hit, or damage per second for ground auras.
    #[serde(default)]
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Attacks per second.
    #[serde(default)]
    pub fire_rate: f32,
    /// Additional enemies a projectile flies through.
    #[serde(default)]
    pub pierce: u32,
    /// Redirections a projectile performs after a terminal hit.
    #[serde(default)]
    pub chains: u32,
}

impl CombatStats {
    /// Folds upgrade modifiers into the stats.
    ///
    /// Every stat becomes `(base + sum of adds) * product of multipliers`, so the
    /// result does not depend on purchase order. Counts round down and never go
    /// negative.
    #[must_use]
    pub fn with_modifiers<'a>(&self, modifiers: impl IntoIterator<Item = &'a StatModifier>) -> Self {
        let mut adds = [0.0_f32; StatKind::COUNT];
        let mut multipliers = [1.0_f32; StatKind::COUNT];
        for modifier in modifiers {
            let slot = modifier.stat.slot();
            match modifier.op {
                ModifierOp::Add => adds[slot] += modifier.value,
                ModifierOp::Multiply => multipliers[slot] *= modifier.value,
            }
        }

        let fold = |stat: StatKind, base: f32| {
            let slot = stat.slot();
            ((base + adds[slot]) * multipliers[slot]).max(0.0)
        };

        Self {
            damage: fold(StatKind::Damage, self.damage),
            range: fold(StatKind::Range, self.range),
            fire_rate: fold(StatKind::FireRate, self.fire_rate),
            pierce: fold(StatKind::Pierce, self.pierce as f32).floor() as u32,
            chains: fold(StatKind::Chains, self.chains as f32).floor() as u32,
        }
    }

    /// Applies a support buff multiplicatively.
    #[must_use]
    pub fn buffed(mut self, buff: &SupportBuff) -> Self {
        let value = buff.value.max(0.0);
        match buff.kind {
            SupportKind::DamageMultiplier => self.damage *= value,
            SupportKind::FireRateMultiplier => self.fire_rate *= value,
            SupportKind::RangeMultiplier => self.range *= value,
        }
        self
    }
}

/// Statistic targeted by an upgrade modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// Damage per hit.
    Damage,
    /// Targeting radius.
    Range,
    /// Attacks per second.
    FireRate,
    /// Pierce charges.
    Pierce,
    /// Chain charges.
    Chains,
}

impl StatKind {
    const COUNT: usize = 5;

    const fn slot(self) -> usize {
        match self {
            Self::Damage => 0,
            Self::Range => 1,
            Self::FireRate => 2,
            Self::Pierce => 3,
            Self::Chains => 4,
        }
    }
}

/// How a modifier combines with the base value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierOp {
    /// Added to the base before multipliers.
    Add,
    /// Multiplied after all additions.
    Multiply,
}

/// Single stat change granted by an upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    /// Statistic that changes.
    pub stat: StatKind,
    /// Combination rule.
    pub op: ModifierOp,
    /// Amount added or factor applied.
    pub value: f32,
}

/// Stat multiplied by a support aura.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportKind {
    /// Multiplies damage.
    DamageMultiplier,
    /// Multiplies attacks per second.
    FireRateMultiplier,
    /// Multiplies targeting radius.
    RangeMultiplier,
}

/// Buff granted to towers inside a support aura.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportBuff {
    /// Stat the buff multiplies.
    pub kind: SupportKind,
    /// Multiplicative factor.
    pub value: f32,
}

/// How damage interacts with armor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageKind {
    /// Projectile and blast hits; reduced by armor.
    Direct,
    /// Damage over time and ground auras; ignores armor.
    Periodic,
}

/// Damage that remains after armor is taken into account.
#[must_use]
pub fn mitigate(amount: f32, armor: f32, kind: DamageKind) -> f32 {
    if amount <= 0.0 {
        return 0.0;
    }
    match kind {
        DamageKind::Periodic => amount,
        DamageKind::Direct => (amount - armor.max(0.0)).max(amount * MINIMUM_DAMAGE_FRACTION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> CombatStats {
        CombatStats {
            damage: 10.0,
            range: 100.0,
            fire_rate: 1.0,
            pierce: 0,
            chains: 1,
        }
    }

    #[test]
    fn modifiers_add_before_multiplying() {
        let modifiers = [
            StatModifier {
                stat: StatKind::Damage,
                op: ModifierOp::Multiply,
                value: 2.0,
            },
            StatModifier {
                stat: StatKind::Damage,
                op: ModifierOp::Add,
                value: 5.0,
            },
        ];
        let stats = base().with_modifiers(&modifiers);
        assert_eq!(stats.damage, 30.0);
        assert_eq!(stats.range, 100.0);
    }

    #[test]
    fn counts_round_down_and_clamp_at_zero() {
        let modifiers = [
            StatModifier {
                stat: StatKind::Pierce,
                op: ModifierOp::Add,
                value: 1.7,
            },
            StatModifier {
                stat: StatKind::Chains,
                op: ModifierOp::Add,
                value: -3.0,
            },
        ];
        let stats = base().with_modifiers(&modifiers);
        assert_eq!(stats.pierce, 1);
        assert_eq!(stats.chains, 0);
    }

    #[test]
    fn support_buffs_multiply_the_named_stat() {
        let stats = base().buffed(&SupportBuff {
            kind: SupportKind::RangeMultiplier,
            value: 1.5,
        });
        assert_eq!(stats.range, 150.0);
        assert_eq!(stats.damage, 10.0);
    }

    #[test]
    fn armor_never_blocks_more_than_the_floor() {
        assert_eq!(mitigate(10.0, 3.0, DamageKind::Direct), 7.0);
        assert_eq!(mitigate(10.0, 50.0, DamageKind::Direct), 1.0);
        assert_eq!(mitigate(10.0, 50.0, DamageKind::Periodic), 10.0);
        assert_eq!(mitigate(-4.0, 0.0, DamageKind::Direct), 0.0);
    }
}
