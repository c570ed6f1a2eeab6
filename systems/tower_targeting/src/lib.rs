#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects deterministic tower targets from the previous
//! tick's entity arenas.

use std::time::Duration;

use rampart_core::{
    within_radius, Arena, CombatStats, Enemy, EnemyId, GameConfig, Level, SupportBuff, Tower,
    TowerId, TowerTarget, Vec2,
};

/// Tower targeting system that reuses scratch buffers between ticks.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    supports: Vec<SupportSource>,
    candidates: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a target for every tower whose cooldown lapses this tick.
    ///
    /// The output buffer is cleared before populating it. Towers that are
    /// still cooling down, that have no attack, or that find nothing in range
    /// produce no entry.
    pub fn handle(
        &mut self,
        dt: Duration,
        config: &GameConfig,
        towers: &Arena<TowerId, Tower>,
        enemies: &Arena<EnemyId, Enemy>,
        level: &Level,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_supports(config, towers);
        self.prepare_candidates(enemies, level);

        let seconds = dt.as_secs_f32();
        for (id, tower) in towers.iter() {
            if (tower.cooldown - seconds).max(0.0) > 0.0 {
                continue;
            }
            let attacks = config
                .tower(&tower.kind)
                .is_some_and(|definition| definition.attack.is_some());
            if !attacks {
                continue;
            }

            let stats = self.buffed_stats(id, tower);
            let mut best: Option<&EnemyCandidate> = None;
            for candidate in &self.candidates {
                if !within_radius(tower.position, candidate.position, stats.range) {
                    continue;
                }
                match best {
                    Some(existing) if !candidate.precedes(existing) => {}
                    _ => best = Some(candidate),
                }
            }

            if let Some(candidate) = best {
                out.push(TowerTarget {
                    tower: id,
                    enemy: candidate.id,
                    enemy_position: candidate.position,
                    stats,
                });
            }
        }
    }

    /// Stats the tower would attack with right now, support buffs included.
    #[must_use]
    pub fn buffed_stats(&self, id: TowerId, tower: &Tower) -> CombatStats {
        self.supports
            .iter()
            .filter(|support| support.tower != id)
            .filter(|support| within_radius(support.position, tower.position, support.radius))
            .flat_map(|support| support.buffs.iter())
            .fold(tower.stats, |stats, buff| stats.buffed(buff))
    }

    fn prepare_supports(&mut self, config: &GameConfig, towers: &Arena<TowerId, Tower>) {
        self.supports.clear();
        for (id, tower) in towers.iter() {
            let Some(aura) = config
                .tower(&tower.kind)
                .and_then(|definition| definition.support.as_ref())
            else {
                continue;
            };
            self.supports.push(SupportSource {
                tower: id,
                position: tower.position,
                radius: aura.radius,
                buffs: aura.buffs.clone(),
            });
        }
    }

    fn prepare_candidates(&mut self, enemies: &Arena<EnemyId, Enemy>, level: &Level) {
        self.candidates.clear();
        self.candidates.reserve(enemies.len());
        for (id, enemy) in enemies.iter() {
            let progress = level
                .route(enemy.route)
                .map_or(0.0, |route| route.progress(enemy.route_index, enemy.position));
            self.candidates.push(EnemyCandidate {
                id,
                position: enemy.position,
                progress,
            });
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct SupportSource {
    tower: TowerId,
    position: Vec2,
    radius: f32,
    buffs: Vec<SupportBuff>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    progress: f32,
}

impl EnemyCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.id < other.id
    }
}
