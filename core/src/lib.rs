#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rampart simulation.
//!
//! This crate defines the message surface that connects the orchestrator,
//! the authoritative world, and pure systems. Systems read immutable
//! [`Arena`] views of the previous tick's entities and respond exclusively
//! with [`Command`] batches; the world executes each batch via its `apply`
//! entry point and broadcasts [`Event`] values describing what changed.
//! Static lookup tables live in [`GameConfig`] and are never mutated.

use std::time::Duration;

use thiserror::Error;

mod arena;
mod config;
mod effects;
mod entities;
mod grid;
mod ids;
mod stats;

pub use arena::Arena;
pub use config::{
    AttackKind, ConfigError, DifficultyDefinition, EconomyConfig, EnemyAura, EnemyDefinition,
    FeatureSpec, GameConfig, LevelStyle, ProjectileTuning, RouteShape, RouteSpec, SupportAura,
    TowerDefinition, UpgradeDefinition, WaveScaling,
};
pub use effects::{ActiveEffect, EffectKind, EffectPayload};
pub use entities::{
    within_radius, Aura, AuraSpec, Enemy, Projectile, ProjectileSpec, Tower, TowerTarget,
};
pub use glam::Vec2;
pub use grid::{Grid, Level, ObstacleKind, Route, Terrain, TileCoord};
pub use ids::{
    ArenaId, AuraId, EnemyId, EnemyKind, LevelStyleId, ProjectileId, RouteId, TowerId, TowerKind,
    UpgradeId,
};
pub use stats::{
    mitigate, CombatStats, DamageKind, ModifierOp, StatKind, StatModifier, SupportBuff,
    SupportKind, MINIMUM_DAMAGE_FRACTION,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests creation of an enemy at the start of a route.
    SpawnEnemy {
        /// Type of enemy to create.
        kind: EnemyKind,
        /// Route the enemy is bound to for its whole life.
        route: RouteId,
    },
    /// Commits an enemy's movement and derived stats for the tick.
    MoveEnemy {
        /// Enemy that moved.
        enemy: EnemyId,
        /// New world position.
        position: Vec2,
        /// Index of the next route point.
        route_index: usize,
        /// Speed after folding effects.
        speed: f32,
        /// Armor after folding effects.
        armor: f32,
    },
    /// Reports that an enemy consumed its entire route.
    EnemyReachedBase {
        /// Enemy that completed its route.
        enemy: EnemyId,
    },
    /// Routes damage through the central damage path.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Damage before mitigation.
        amount: f32,
        /// Whether armor applies.
        kind: DamageKind,
    },
    /// Applies or refreshes a status effect on an enemy.
    ApplyStatusEffect {
        /// Enemy receiving the effect.
        enemy: EnemyId,
        /// Effect applied.
        effect: EffectPayload,
        /// Tower responsible for the application.
        source: TowerId,
    },
    /// Replaces an enemy's effect list after decay.
    SetStatusEffects {
        /// Enemy whose effects changed.
        enemy: EnemyId,
        /// Surviving effects.
        effects: Vec<ActiveEffect>,
    },
    /// Commits a tower's attack cooldown.
    SetTowerCooldown {
        /// Tower whose cooldown changed.
        tower: TowerId,
        /// Seconds until the next attack.
        cooldown: f32,
    },
    /// Creates a projectile.
    SpawnProjectile {
        /// Projectile parameters.
        spec: ProjectileSpec,
    },
    /// Replaces a projectile's record after it moved or struck.
    UpdateProjectile {
        /// Replacement record.
        projectile: Projectile,
    },
    /// Destroys a projectile that expired or fizzled.
    RemoveProjectile {
        /// Projectile to destroy.
        projectile: ProjectileId,
    },
    /// Creates a ground aura.
    SpawnAura {
        /// Aura parameters.
        spec: AuraSpec,
    },
    /// Commits an aura's remaining lifetime.
    UpdateAura {
        /// Aura that aged.
        aura: AuraId,
        /// Seconds left.
        remaining: f32,
    },
    /// Destroys an expired aura.
    RemoveAura {
        /// Aura to destroy.
        aura: AuraId,
    },
    /// Announces the start of a wave.
    BeginWave {
        /// Wave number, starting at one.
        wave: u32,
        /// Enemies queued for the wave.
        enemies: u32,
    },
    /// Announces that a wave was fully spawned and cleared.
    EndWave {
        /// Wave number that cleared.
        wave: u32,
    },
    /// Player request to build a tower.
    PlaceTower {
        /// Tower type to build.
        kind: TowerKind,
        /// Tile to build on.
        tile: TileCoord,
    },
    /// Player request to sell a tower.
    SellTower {
        /// Tower to sell.
        tower: TowerId,
    },
    /// Player request to buy an upgrade.
    PurchaseUpgrade {
        /// Tower receiving the upgrade.
        tower: TowerId,
        /// Upgrade purchased.
        upgrade: UpgradeId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A wave began spawning.
    WaveStarted {
        /// Wave number.
        wave: u32,
        /// Enemies queued.
        enemies: u32,
    },
    /// A wave finished spawning and every enemy is gone.
    WaveCleared {
        /// Wave number.
        wave: u32,
    },
    /// An enemy entered the map.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Enemy type.
        kind: EnemyKind,
        /// Route the enemy walks.
        route: RouteId,
    },
    /// An enemy's health reached zero.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Currency awarded.
        reward: u32,
    },
    /// An enemy completed its route and damaged the base.
    EnemyReachedBase {
        /// Enemy that leaked.
        enemy: EnemyId,
        /// Base health removed.
        damage: u32,
    },
    /// A tower was built.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Tower type.
        kind: TowerKind,
        /// Occupied tile.
        tile: TileCoord,
        /// Currency spent.
        cost: u32,
    },
    /// A tower was sold.
    TowerSold {
        /// Tower removed.
        tower: TowerId,
        /// Currency refunded.
        refund: u32,
    },
    /// A tower upgrade was purchased.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Upgrade purchased.
        upgrade: UpgradeId,
        /// Currency spent.
        cost: u32,
    },
    /// A projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        source: TowerId,
        /// Initial target.
        target: EnemyId,
    },
    /// A projectile was destroyed.
    ProjectileExpired {
        /// Destroyed projectile.
        projectile: ProjectileId,
    },
    /// A ground aura was created.
    AuraCreated {
        /// Identifier assigned to the aura.
        aura: AuraId,
        /// Tower that created it.
        source: TowerId,
    },
    /// A ground aura ran out.
    AuraExpired {
        /// Destroyed aura.
        aura: AuraId,
    },
    /// Base health reached zero; the session is over.
    BaseDestroyed,
    /// A player command was rejected without any state change.
    CommandRejected {
        /// Why the command was rejected.
        reason: CommandError,
    },
}

/// Reasons a player command may be rejected by the world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No session is running.
    #[error("no active session")]
    NoActiveSession,
    /// The player cannot pay for the command.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Price of the command.
        needed: u32,
        /// Currency on hand.
        available: u32,
    },
    /// The tile lies outside the grid.
    #[error("tile {0:?} is outside the grid")]
    OutOfBounds(TileCoord),
    /// The tile's terrain does not accept towers.
    #[error("tile {0:?} is not buildable")]
    NotBuildable(TileCoord),
    /// Another tower already stands on the tile.
    #[error("tile {0:?} is already occupied")]
    Occupied(TileCoord),
    /// The tower type does not exist.
    #[error("unknown tower type `{0}`")]
    UnknownTowerKind(TowerKind),
    /// No live tower has the identifier.
    #[error("unknown tower {0}")]
    UnknownTower(TowerId),
    /// The tower's upgrade tree has no such upgrade.
    #[error("tower {tower} has no upgrade `{upgrade}`")]
    UnknownUpgrade {
        /// Targeted tower.
        tower: TowerId,
        /// Requested upgrade.
        upgrade: UpgradeId,
    },
    /// The upgrade was already purchased for the tower.
    #[error("tower {tower} already owns upgrade `{upgrade}`")]
    DuplicateUpgrade {
        /// Targeted tower.
        tower: TowerId,
        /// Requested upgrade.
        upgrade: UpgradeId,
    },
}
