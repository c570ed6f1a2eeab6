#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director: inter-wave countdown, spawn queue construction and
//! paced enemy creation.

use std::{collections::VecDeque, time::Duration};

use log::{debug, warn};
use rampart_core::{Command, EnemyKind, GameConfig, Level, RouteId};
use rand::Rng;

/// Externally visible wave director state.
#[derive(Clone, Debug, PartialEq)]
pub enum WavePhase {
    /// Waiting for the next wave to begin.
    Countdown {
        /// Seconds until the next wave.
        remaining: f32,
    },
    /// Draining the spawn queue of the current wave.
    Spawning {
        /// Enemies still waiting to enter the map.
        queued: usize,
        /// Seconds until the next spawn.
        cooldown: f32,
    },
}

#[derive(Clone, Debug)]
enum Phase {
    Countdown { remaining: f32 },
    Spawning { queue: VecDeque<EnemyKind>, cooldown: f32 },
}

/// Stateful system that paces waves and requests enemy creation.
#[derive(Clone, Debug)]
pub struct Spawning {
    phase: Phase,
    wave: u32,
}

impl Spawning {
    /// Creates a director counting down to the first wave.
    #[must_use]
    pub fn new(first_wave_delay: f32) -> Self {
        Self {
            phase: Phase::Countdown {
                remaining: first_wave_delay,
            },
            wave: 0,
        }
    }

    /// Number of the most recently started wave; zero before the first wave.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Current countdown or spawning state.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        match &self.phase {
            Phase::Countdown { remaining } => WavePhase::Countdown {
                remaining: *remaining,
            },
            Phase::Spawning { queue, cooldown } => WavePhase::Spawning {
                queued: queue.len(),
                cooldown: *cooldown,
            },
        }
    }

    /// Advances the director by one tick.
    ///
    /// `live_enemies` is the number of enemies on the map; a drained wave only
    /// ends once it reaches zero.
    pub fn handle(
        &mut self,
        dt: Duration,
        config: &GameConfig,
        level: &Level,
        live_enemies: usize,
        rng: &mut impl Rng,
        out: &mut Vec<Command>,
    ) {
        let seconds = dt.as_secs_f32();
        let difficulty = level.difficulty;

        match &mut self.phase {
            Phase::Countdown { remaining } => {
                *remaining -= seconds;
                if *remaining > 0.0 {
                    return;
                }

                self.wave = self.wave.saturating_add(1);
                let count = config.waves.enemy_count(self.wave, difficulty);
                let queue = build_queue(config, difficulty, count, rng);
                debug!("wave {} begins with {} enemies", self.wave, queue.len());
                out.push(Command::BeginWave {
                    wave: self.wave,
                    enemies: u32::try_from(queue.len()).unwrap_or(u32::MAX),
                });
                self.phase = Phase::Spawning {
                    queue,
                    cooldown: 0.0,
                };
                // The first enemy enters on the tick its wave begins.
                self.spawn_next(config, level, rng, out);
            }
            Phase::Spawning { queue, cooldown } => {
                if queue.is_empty() {
                    if live_enemies > 0 {
                        return;
                    }
                    out.push(Command::EndWave { wave: self.wave });
                    let delay = config
                        .difficulty(difficulty)
                        .map_or(0.0, |definition| definition.inter_wave_delay);
                    self.phase = Phase::Countdown { remaining: delay };
                    return;
                }

                *cooldown -= seconds;
                if *cooldown > 0.0 {
                    return;
                }
                self.spawn_next(config, level, rng, out);
            }
        }
    }

    /// Pops the head of the spawn queue onto a random route and restarts the
    /// spawn cooldown.
    fn spawn_next(
        &mut self,
        config: &GameConfig,
        level: &Level,
        rng: &mut impl Rng,
        out: &mut Vec<Command>,
    ) {
        let Phase::Spawning { queue, cooldown } = &mut self.phase else {
            return;
        };
        if level.routes.is_empty() {
            warn!("wave {} cannot spawn: level has no routes", self.wave);
            queue.clear();
            return;
        }

        if let Some(kind) = queue.pop_front() {
            let index = rng.gen_range(0..level.routes.len());
            let route = RouteId::new(u32::try_from(index).unwrap_or(u32::MAX));
            out.push(Command::SpawnEnemy { kind, route });
        }
        *cooldown = config.waves.spawn_cooldown(self.wave, level.difficulty);
    }
}

/// Samples `count` enemy types uniformly from those eligible at `difficulty`.
fn build_queue(
    config: &GameConfig,
    difficulty: u32,
    count: u32,
    rng: &mut impl Rng,
) -> VecDeque<EnemyKind> {
    let eligible: Vec<&EnemyKind> = config
        .enemies
        .iter()
        .filter(|(_, definition)| definition.min_difficulty <= difficulty)
        .map(|(kind, _)| kind)
        .collect();
    if eligible.is_empty() {
        warn!("no enemy types are eligible at difficulty {difficulty}");
        return VecDeque::new();
    }

    (0..count)
        .map(|_| eligible[rng.gen_range(0..eligible.len())].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_test_utils::{fixture_config, straight_level};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn countdown_starts_the_first_wave() {
        let config = fixture_config();
        let level = straight_level();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut director = Spawning::new(2.0);
        let mut out = Vec::new();

        director.handle(Duration::from_secs(1), &config, &level, 0, &mut rng, &mut out);
        assert!(out.is_empty());
        assert_eq!(director.phase(), WavePhase::Countdown { remaining: 1.0 });

        director.handle(Duration::from_secs(1), &config, &level, 0, &mut rng, &mut out);
        assert_eq!(
            out,
            vec![
                Command::BeginWave { wave: 1, enemies: 3 },
                Command::SpawnEnemy {
                    kind: EnemyKind::from("grunt"),
                    route: RouteId::new(0),
                },
            ]
        );
        assert_eq!(director.wave(), 1);
        assert_eq!(
            director.phase(),
            WavePhase::Spawning {
                queued: 2,
                cooldown: 1.0
            }
        );
    }

    #[test]
    fn queue_only_holds_eligible_types() {
        let config = fixture_config();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let easy = build_queue(&config, 0, 50, &mut rng);
        assert_eq!(easy.len(), 50);
        assert!(easy.iter().all(|kind| kind == &EnemyKind::from("grunt")));

        let hard = build_queue(&config, 1, 200, &mut rng);
        assert!(hard.iter().any(|kind| kind == &EnemyKind::from("brute")));
        assert!(hard.iter().any(|kind| kind == &EnemyKind::from("grunt")));
    }

    #[test]
    fn spawns_are_paced_by_cooldown() {
        let config = fixture_config();
        let level = straight_level();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut director = Spawning::new(0.0);
        let mut out = Vec::new();

        director.handle(Duration::ZERO, &config, &level, 0, &mut rng, &mut out);
        out.clear();

        let mut spawned = 0;
        for _ in 0..4 {
            director.handle(Duration::from_millis(500), &config, &level, 0, &mut rng, &mut out);
            spawned += out
                .drain(..)
                .filter(|command| matches!(command, Command::SpawnEnemy { .. }))
                .count();
        }

        assert_eq!(spawned, 2);
    }

    #[test]
    fn drained_wave_waits_for_the_field_to_clear() {
        let config = fixture_config();
        let level = straight_level();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut director = Spawning::new(0.0);
        let mut out = Vec::new();

        director.handle(Duration::ZERO, &config, &level, 0, &mut rng, &mut out);
        for _ in 0..3 {
            director.handle(Duration::from_secs(1), &config, &level, 1, &mut rng, &mut out);
        }
        out.clear();

        director.handle(Duration::from_secs(1), &config, &level, 2, &mut rng, &mut out);
        assert!(out.is_empty());

        director.handle(Duration::from_secs(1), &config, &level, 0, &mut rng, &mut out);
        assert_eq!(out, vec![Command::EndWave { wave: 1 }]);
        assert_eq!(director.phase(), WavePhase::Countdown { remaining: 5.0 });
    }

    #[test]
    fn second_wave_grows() {
        let config = fixture_config();
        let level = straight_level();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut director = Spawning::new(0.0);
        let mut out = Vec::new();

        director.handle(Duration::ZERO, &config, &level, 0, &mut rng, &mut out);
        for _ in 0..4 {
            director.handle(Duration::from_secs(1), &config, &level, 0, &mut rng, &mut out);
        }
        for _ in 0..5 {
            director.handle(Duration::from_secs(1), &config, &level, 0, &mut rng, &mut out);
        }

        assert_eq!(
            out.iter()
                .filter(|command| matches!(command, Command::BeginWave { .. }))
                .collect::<Vec<_>>(),
            vec![
                &Command::BeginWave { wave: 1, enemies: 3 },
                &Command::BeginWave { wave: 2, enemies: 4 },
            ]
        );
    }
}
