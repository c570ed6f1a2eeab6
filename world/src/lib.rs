#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Rampart.
//!
//! The world owns every live entity arena together with the scalar session
//! fields. It is only ever mutated through [`apply`], which executes one
//! [`Command`] and reports the outcome as [`Event`] values.

use std::collections::BTreeMap;

use log::{debug, warn};
use rampart_core::{
    Arena, Aura, AuraId, Command, CommandError, Enemy, EnemyId, Event, GameConfig, Level,
    Projectile, ProjectileId, TileCoord, Tower, TowerId,
};

mod enemies;
mod towers;

/// Represents the authoritative state of one play session.
#[derive(Clone, Debug)]
pub struct World {
    level: Level,
    enemies: Arena<EnemyId, Enemy>,
    towers: Arena<TowerId, Tower>,
    projectiles: Arena<ProjectileId, Projectile>,
    auras: Arena<AuraId, Aura>,
    occupancy: BTreeMap<TileCoord, TowerId>,
    currency: u32,
    base_health: u32,
    wave: u32,
    active: bool,
    tick_index: u64,
}

impl World {
    /// Creates an active session on the provided level with the configured
    /// starting economy.
    #[must_use]
    pub fn new(config: &GameConfig, level: Level) -> Self {
        Self {
            level,
            enemies: Arena::new(),
            towers: Arena::new(),
            projectiles: Arena::new(),
            auras: Arena::new(),
            occupancy: BTreeMap::new(),
            currency: config.economy.starting_currency,
            base_health: config.economy.starting_base_health,
            wave: 0,
            active: true,
            tick_index: 0,
        }
    }

    fn spend(&mut self, amount: u32) -> Result<(), CommandError> {
        if self.currency < amount {
            return Err(CommandError::InsufficientFunds {
                needed: amount,
                available: self.currency,
            });
        }
        self.currency -= amount;
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands referring to entities that no longer exist are ignored; player
/// commands that fail validation leave the world untouched and report a
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, config: &GameConfig, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if !world.active {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { kind, route } => {
            enemies::spawn(world, config, kind, route, out_events);
        }
        Command::MoveEnemy {
            enemy,
            position,
            route_index,
            speed,
            armor,
        } => {
            if let Some(enemy) = world.enemies.get_mut(enemy) {
                enemy.position = position;
                enemy.route_index = route_index;
                enemy.speed = speed;
                enemy.armor = armor;
            }
        }
        Command::EnemyReachedBase { enemy } => {
            enemies::reach_base(world, enemy, out_events);
        }
        Command::DamageEnemy {
            enemy,
            amount,
            kind,
        } => {
            enemies::damage(world, enemy, amount, kind, out_events);
        }
        Command::ApplyStatusEffect {
            enemy,
            effect,
            source,
        } => {
            enemies::apply_effect(world, config, enemy, &effect, source);
        }
        Command::SetStatusEffects { enemy, effects } => {
            if let Some(enemy) = world.enemies.get_mut(enemy) {
                enemy.effects = effects;
            }
        }
        Command::SetTowerCooldown { tower, cooldown } => {
            if let Some(tower) = world.towers.get_mut(tower) {
                tower.cooldown = cooldown.max(0.0);
            }
        }
        Command::SpawnProjectile { spec } => {
            let source = spec.source;
            let target = spec.target;
            let projectile = world
                .projectiles
                .allocate(|id| Projectile::from_spec(id, spec));
            out_events.push(Event::ProjectileFired {
                projectile,
                source,
                target,
            });
        }
        Command::UpdateProjectile { projectile } => {
            let id = projectile.id;
            if !world.projectiles.replace(id, projectile) {
                debug!("dropped update for expired {id}");
            }
        }
        Command::RemoveProjectile { projectile } => {
            if world.projectiles.remove(projectile).is_some() {
                out_events.push(Event::ProjectileExpired { projectile });
            }
        }
        Command::SpawnAura { spec } => {
            let source = spec.source;
            let aura = world.auras.allocate(|id| Aura::from_spec(id, spec));
            out_events.push(Event::AuraCreated { aura, source });
        }
        Command::UpdateAura { aura, remaining } => {
            if let Some(aura) = world.auras.get_mut(aura) {
                aura.remaining = remaining;
            }
        }
        Command::RemoveAura { aura } => {
            if world.auras.remove(aura).is_some() {
                out_events.push(Event::AuraExpired { aura });
            }
        }
        Command::BeginWave { wave, enemies } => {
            world.wave = wave;
            out_events.push(Event::WaveStarted { wave, enemies });
        }
        Command::EndWave { wave } => {
            out_events.push(Event::WaveCleared { wave });
        }
        Command::PlaceTower { kind, tile } => {
            let outcome = guard_active(world).and_then(|()| towers::place(world, config, kind, tile));
            report(outcome, out_events);
        }
        Command::SellTower { tower } => {
            let outcome = guard_active(world).and_then(|()| towers::sell(world, config, tower));
            report(outcome, out_events);
        }
        Command::PurchaseUpgrade { tower, upgrade } => {
            let outcome = guard_active(world)
                .and_then(|()| towers::upgrade(world, config, tower, upgrade));
            report(outcome, out_events);
        }
    }
}

fn guard_active(world: &World) -> Result<(), CommandError> {
    if world.active {
        Ok(())
    } else {
        Err(CommandError::NoActiveSession)
    }
}

fn report(outcome: Result<Event, CommandError>, out_events: &mut Vec<Event>) {
    match outcome {
        Ok(event) => out_events.push(event),
        Err(reason) => {
            warn!("command rejected: {reason}");
            out_events.push(Event::CommandRejected { reason });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rampart_core::{
        Arena, Aura, AuraId, Enemy, EnemyId, Grid, Level, Projectile, ProjectileId, Route,
        TileCoord, Tower, TowerId,
    };

    use super::World;

    /// Level the session is played on.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Tagged tile grid of the level.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.level.grid
    }

    /// World-space route polylines.
    #[must_use]
    pub fn routes(world: &World) -> &[Route] {
        &world.level.routes
    }

    /// Live enemies keyed by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> &Arena<EnemyId, Enemy> {
        &world.enemies
    }

    /// Live towers keyed by identifier.
    #[must_use]
    pub fn towers(world: &World) -> &Arena<TowerId, Tower> {
        &world.towers
    }

    /// Projectiles in flight keyed by identifier.
    #[must_use]
    pub fn projectiles(world: &World) -> &Arena<ProjectileId, Projectile> {
        &world.projectiles
    }

    /// Live ground auras keyed by identifier.
    #[must_use]
    pub fn auras(world: &World) -> &Arena<AuraId, Aura> {
        &world.auras
    }

    /// Tower standing on the tile, if any.
    #[must_use]
    pub fn tower_at(world: &World, tile: TileCoord) -> Option<TowerId> {
        world.occupancy.get(&tile).copied()
    }

    /// Currency balance.
    #[must_use]
    pub fn currency(world: &World) -> u32 {
        world.currency
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(world: &World) -> u32 {
        world.base_health
    }

    /// Most recently started wave; zero before the first one.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Reports whether the session still accepts ticks and player commands.
    #[must_use]
    pub fn is_active(world: &World) -> bool {
        world.active
    }

    /// Number of ticks processed since the session started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
