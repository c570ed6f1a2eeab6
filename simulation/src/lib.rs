#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestrator and session lifecycle for Rampart.
//!
//! [`Simulation`] owns the static configuration, the seeded random source
//! and every system. Each call to [`Simulation::advance`] runs the systems
//! in a fixed order; every system reads the arenas as they stood when it
//! started and its whole command batch is applied to the world before the
//! next system runs.

use std::time::Duration;

use log::{debug, info};
use rampart_core::{
    Command, CommandError, Event, GameConfig, LevelStyleId, TileCoord, TowerId, TowerKind,
    TowerTarget, UpgradeId,
};
use rampart_system_auras::Auras;
use rampart_system_level_generation::{generate_level, GenerationError};
use rampart_system_movement::Movement;
use rampart_system_projectiles::Projectiles;
use rampart_system_spawning::{Spawning, WavePhase};
use rampart_system_status_effects::StatusEffects;
use rampart_system_tower_combat::TowerCombat;
use rampart_system_tower_targeting::TowerTargeting;
use rampart_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Scalar view of a running session for presentation layers.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Style the level was generated from.
    pub style: LevelStyleId,
    /// Most recently started wave.
    pub wave: u32,
    /// Wave director state.
    pub phase: WavePhase,
    /// Currency balance.
    pub currency: u32,
    /// Remaining base health.
    pub base_health: u32,
    /// Whether the session still advances.
    pub active: bool,
    /// Ticks processed so far.
    pub ticks: u64,
    /// Live enemy count.
    pub enemies: usize,
    /// Live tower count.
    pub towers: usize,
    /// Projectiles in flight.
    pub projectiles: usize,
    /// Live ground auras.
    pub auras: usize,
}

#[derive(Debug)]
struct Session {
    world: World,
    spawning: Spawning,
}

/// Deterministic driver for one play session at a time.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    rng: ChaCha8Rng,
    session: Option<Session>,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    auras: Auras,
    status_effects: StatusEffects,
    movement: Movement,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    pending: Vec<Event>,
}

impl Simulation {
    /// Creates an idle simulation whose random source is seeded with `seed`.
    #[must_use]
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            session: None,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: Projectiles,
            auras: Auras,
            status_effects: StatusEffects,
            movement: Movement,
            targets: Vec::new(),
            commands: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Static configuration the simulation was built with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Generates a level for `style` and replaces any running session.
    ///
    /// # Errors
    ///
    /// Returns the generator's error when no level could be built; the
    /// previous session, if any, is kept untouched.
    pub fn start_session(&mut self, style: &LevelStyleId) -> Result<(), GenerationError> {
        let level = generate_level(&self.config, style, &mut self.rng)?;
        info!(
            "session started on `{style}` ({} routes, difficulty {})",
            level.routes.len(),
            level.difficulty
        );
        self.session = Some(Session {
            world: World::new(&self.config, level),
            spawning: Spawning::new(self.config.economy.first_wave_delay),
        });
        self.targets.clear();
        self.pending.clear();
        Ok(())
    }

    /// Reports whether a session exists and has not ended.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| query::is_active(&session.world))
    }

    /// Read-only access to the session world for the query functions.
    #[must_use]
    pub fn world(&self) -> Option<&World> {
        self.session.as_ref().map(|session| &session.world)
    }

    /// Captures the scalar session fields and entity counts.
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let session = self.session.as_ref()?;
        let world = &session.world;
        Some(SessionSnapshot {
            style: query::level(world).style.clone(),
            wave: query::wave(world),
            phase: session.spawning.phase(),
            currency: query::currency(world),
            base_health: query::base_health(world),
            active: query::is_active(world),
            ticks: query::tick_index(world),
            enemies: query::enemies(world).len(),
            towers: query::towers(world).len(),
            projectiles: query::projectiles(world).len(),
            auras: query::auras(world).len(),
        })
    }

    /// Runs one tick and returns every event it produced, preceded by the
    /// events of player commands issued since the previous tick.
    ///
    /// Does nothing unless a session is active.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = std::mem::take(&mut self.pending);
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        if !query::is_active(&session.world) {
            return events;
        }

        let config = &self.config;
        let world = &mut session.world;
        let commands = &mut self.commands;
        world::apply(world, config, Command::Tick { dt }, &mut events);

        self.targeting.handle(
            dt,
            config,
            query::towers(world),
            query::enemies(world),
            query::level(world),
            &mut self.targets,
        );
        self.combat.handle(
            dt,
            config,
            query::towers(world),
            query::enemies(world),
            &self.targets,
            commands,
        );
        if !commit(world, config, commands, &mut events) {
            return events;
        }

        self.projectiles.handle(
            dt,
            &config.projectiles,
            query::projectiles(world),
            query::enemies(world),
            commands,
        );
        if !commit(world, config, commands, &mut events) {
            return events;
        }

        self.auras
            .handle(dt, query::auras(world), query::enemies(world), commands);
        if !commit(world, config, commands, &mut events) {
            return events;
        }

        self.status_effects
            .handle(dt, query::enemies(world), commands);
        if !commit(world, config, commands, &mut events) {
            return events;
        }

        self.movement
            .handle(dt, query::enemies(world), query::level(world), commands);
        if !commit(world, config, commands, &mut events) {
            return events;
        }

        let live_enemies = query::enemies(world).len();
        session.spawning.handle(
            dt,
            config,
            query::level(world),
            live_enemies,
            &mut self.rng,
            commands,
        );
        let _ = commit(world, config, commands, &mut events);

        log_milestones(&events);
        events
    }

    /// Builds a tower of `kind` on `tile`.
    ///
    /// # Errors
    ///
    /// Returns why the world rejected the placement; nothing changes then.
    pub fn place_tower(&mut self, kind: TowerKind, tile: TileCoord) -> Result<TowerId, CommandError> {
        match self.issue(Command::PlaceTower { kind, tile })? {
            Event::TowerPlaced { tower, .. } => Ok(tower),
            _ => Err(CommandError::NoActiveSession),
        }
    }

    /// Sells `tower` and returns the refunded currency.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownTower`] when the tower does not exist.
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<u32, CommandError> {
        match self.issue(Command::SellTower { tower })? {
            Event::TowerSold { refund, .. } => Ok(refund),
            _ => Err(CommandError::NoActiveSession),
        }
    }

    /// Buys `upgrade` for `tower`.
    ///
    /// # Errors
    ///
    /// Returns why the purchase was rejected; nothing changes then.
    pub fn purchase_upgrade(
        &mut self,
        tower: TowerId,
        upgrade: UpgradeId,
    ) -> Result<(), CommandError> {
        match self.issue(Command::PurchaseUpgrade { tower, upgrade })? {
            Event::TowerUpgraded { .. } => Ok(()),
            _ => Err(CommandError::NoActiveSession),
        }
    }

    fn issue(&mut self, command: Command) -> Result<Event, CommandError> {
        let Some(session) = self.session.as_mut() else {
            return Err(CommandError::NoActiveSession);
        };
        let mut events = Vec::new();
        world::apply(&mut session.world, &self.config, command, &mut events);
        self.pending.extend(events.iter().cloned());

        match events.into_iter().next() {
            Some(Event::CommandRejected { reason }) => Err(reason),
            Some(event) => Ok(event),
            None => Err(CommandError::NoActiveSession),
        }
    }
}

/// Applies a system's whole batch and reports whether the session survived it.
fn commit(
    world: &mut World,
    config: &GameConfig,
    commands: &mut Vec<Command>,
    events: &mut Vec<Event>,
) -> bool {
    for command in commands.drain(..) {
        world::apply(world, config, command, events);
    }
    query::is_active(world)
}

fn log_milestones(events: &[Event]) {
    for event in events {
        match event {
            Event::WaveStarted { wave, enemies } => {
                info!("wave {wave} started with {enemies} enemies");
            }
            Event::WaveCleared { wave } => info!("wave {wave} cleared"),
            Event::BaseDestroyed => info!("base destroyed, session over"),
            Event::EnemyKilled { enemy, reward } => debug!("{enemy} killed for {reward}"),
            _ => {}
        }
    }
}
