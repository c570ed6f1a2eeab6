//! Status effect kinds, configured payloads and live instances.

use serde::{Deserialize, Serialize};

use crate::TowerId;

/// Kinds of status effect an enemy can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Fractional speed reduction; potency 0.25 removes a quarter of base speed.
    Slow,
    /// Full stop; potency is ignored and counts as a 100% slow.
    Stun,
    /// Flat armor reduction.
    ArmorBreak,
    /// Fire damage over time; potency is damage per second.
    Burn,
    /// Bleed damage over time; potency is damage per second.
    Bleed,
    /// Poison damage over time; potency is damage per second.
    Poison,
}

impl EffectKind {
    /// Reports whether the kind pays out damage every tick while active.
    #[must_use]
    pub const fn is_damage_over_time(self) -> bool {
        matches!(self, Self::Burn | Self::Bleed | Self::Poison)
    }
}

/// Configured status effect carried by an attack, aura or projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectPayload {
    /// Kind of effect applied.
    pub kind: EffectKind,
    /// Strength of the effect; meaning depends on the kind.
    #[serde(default)]
    pub potency: f32,
    /// Seconds the effect lasts once applied.
    pub duration: f32,
}

impl EffectPayload {
    /// Creates a payload.
    #[must_use]
    pub const fn new(kind: EffectKind, potency: f32, duration: f32) -> Self {
        Self {
            kind,
            potency,
            duration,
        }
    }
}

/// Status effect currently attached to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveEffect {
    /// Kind of the effect; at most one instance per kind per enemy.
    pub kind: EffectKind,
    /// Strength of the effect.
    pub potency: f32,
    /// Seconds left before the effect lapses.
    pub remaining: f32,
    /// Tower that most recently applied the effect.
    pub source: TowerId,
}
