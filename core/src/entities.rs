//! Plain data records for every live entity kind.

use glam::Vec2;

use crate::{
    ActiveEffect, AuraId, CombatStats, EffectPayload, EnemyId, EnemyKind, ProjectileId, RouteId,
    TileCoord, TowerId, TowerKind, UpgradeId,
};

/// Enemy walking one of the level's routes.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Type definition key.
    pub kind: EnemyKind,
    /// Current world position.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Route bound at spawn time.
    pub route: RouteId,
    /// Index of the next route point the enemy walks toward.
    pub route_index: usize,
    /// Active status effects, at most one per kind.
    pub effects: Vec<ActiveEffect>,
    /// Speed before effects, scaled by difficulty at spawn.
    pub base_speed: f32,
    /// Armor before effects.
    pub base_armor: f32,
    /// Speed after folding active effects, refreshed every tick.
    pub speed: f32,
    /// Armor after folding active effects, refreshed every tick.
    pub armor: f32,
    /// Currency awarded on kill.
    pub reward: u32,
    /// Base health removed on route completion.
    pub collision_damage: u32,
}

/// Tower placed on a buildable tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Type definition key.
    pub kind: TowerKind,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// World-space centre of the tile.
    pub position: Vec2,
    /// Seconds until the tower may attack again.
    pub cooldown: f32,
    /// Upgrades purchased, in purchase order.
    pub upgrades: Vec<UpgradeId>,
    /// Currency spent on placement and upgrades.
    pub invested: u32,
    /// Base stats with purchased upgrades folded in. Support buffs are not included.
    pub stats: CombatStats,
}

impl Tower {
    /// Reports whether the upgrade was already purchased.
    #[must_use]
    pub fn has_upgrade(&self, upgrade: &UpgradeId) -> bool {
        self.upgrades.iter().any(|owned| owned == upgrade)
    }
}

/// Attack decision for one ready tower during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that will attack.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Enemy position when it was selected.
    pub enemy_position: Vec2,
    /// Tower stats with nearby support buffs applied for this attack only.
    pub stats: CombatStats,
}

/// Parameters for creating a projectile; the world allocates the identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpec {
    /// Tower that fired.
    pub source: TowerId,
    /// Launch position.
    pub position: Vec2,
    /// Initial target.
    pub target: EnemyId,
    /// Flight speed in world units per second.
    pub speed: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Splash radius around each struck target.
    pub blast_radius: Option<f32>,
    /// Pierce charges.
    pub pierce: u32,
    /// Chain charges.
    pub chains: u32,
    /// Effects applied to primary targets.
    pub on_hit: Vec<EffectPayload>,
    /// Effects applied to blast victims.
    pub on_blast: Vec<EffectPayload>,
}

/// Projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Tower that fired.
    pub source: TowerId,
    /// Current world position.
    pub position: Vec2,
    /// Enemy the projectile is flying toward.
    pub target: EnemyId,
    /// Flight speed in world units per second.
    pub speed: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Splash radius around each struck target.
    pub blast_radius: Option<f32>,
    /// Remaining pierce charges.
    pub pierce: u32,
    /// Remaining chain charges.
    pub chains: u32,
    /// Enemies already struck during this flight, without duplicates.
    pub hit: Vec<EnemyId>,
    /// Effects applied to primary targets.
    pub on_hit: Vec<EffectPayload>,
    /// Effects applied to blast victims.
    pub on_blast: Vec<EffectPayload>,
}

impl Projectile {
    /// Builds a fresh projectile from its spec.
    #[must_use]
    pub fn from_spec(id: ProjectileId, spec: ProjectileSpec) -> Self {
        Self {
            id,
            source: spec.source,
            position: spec.position,
            target: spec.target,
            speed: spec.speed,
            damage: spec.damage,
            blast_radius: spec.blast_radius,
            pierce: spec.pierce,
            chains: spec.chains,
            hit: Vec::new(),
            on_hit: spec.on_hit,
            on_blast: spec.on_blast,
        }
    }

    /// Reports whether the enemy was already struck during this flight.
    #[must_use]
    pub fn has_hit(&self, enemy: EnemyId) -> bool {
        self.hit.contains(&enemy)
    }
}

/// Parameters for creating a ground aura; the world allocates the identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct AuraSpec {
    /// Tower that created the aura.
    pub source: TowerId,
    /// Anchor position.
    pub position: Vec2,
    /// Effect radius.
    pub radius: f32,
    /// Lifetime in seconds.
    pub duration: f32,
    /// Damage per second dealt to enemies inside.
    pub damage_per_second: f32,
    /// Effects applied to enemies inside every tick.
    pub effects: Vec<EffectPayload>,
}

/// Persistent ground-anchored area effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Aura {
    /// Identifier allocated by the world.
    pub id: AuraId,
    /// Tower that created the aura.
    pub source: TowerId,
    /// Anchor position.
    pub position: Vec2,
    /// Effect radius.
    pub radius: f32,
    /// Seconds left before expiry.
    pub remaining: f32,
    /// Lifetime at creation.
    pub duration: f32,
    /// Damage per second dealt to enemies inside.
    pub damage_per_second: f32,
    /// Effects applied to enemies inside every tick.
    pub effects: Vec<EffectPayload>,
}

impl Aura {
    /// Builds a fresh aura from its spec.
    #[must_use]
    pub fn from_spec(id: AuraId, spec: AuraSpec) -> Self {
        Self {
            id,
            source: spec.source,
            position: spec.position,
            radius: spec.radius,
            remaining: spec.duration,
            duration: spec.duration,
            damage_per_second: spec.damage_per_second,
            effects: spec.effects,
        }
    }
}

/// Reports whether `point` lies within `radius` of `center`, boundary included.
#[must_use]
pub fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    center.distance_squared(point) <= radius * radius
}
