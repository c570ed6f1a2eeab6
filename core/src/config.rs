//! Immutable configuration tables loaded once before any session starts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CombatStats, EffectKind, EffectPayload, EnemyKind, LevelStyleId, ObstacleKind, StatModifier,
    SupportBuff, TowerKind, UpgradeId,
};

/// Complete set of static lookup tables consumed by the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Session-start economy values.
    pub economy: EconomyConfig,
    /// Projectile re-acquisition radii.
    pub projectiles: ProjectileTuning,
    /// Wave size and spawn cadence coefficients.
    pub waves: WaveScaling,
    /// Difficulty levels, indexed by position.
    pub difficulties: Vec<DifficultyDefinition>,
    /// Tower type table.
    pub towers: BTreeMap<TowerKind, TowerDefinition>,
    /// Enemy type table.
    pub enemies: BTreeMap<EnemyKind, EnemyDefinition>,
    /// Level style table.
    pub level_styles: BTreeMap<LevelStyleId, LevelStyle>,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-table references and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enemies.is_empty() {
            return Err(ConfigError::NoEnemies);
        }
        if self.difficulties.is_empty() {
            return Err(ConfigError::NoDifficulties);
        }
        for (index, difficulty) in self.difficulties.iter().enumerate() {
            if difficulty.refund_percent > 100 {
                return Err(ConfigError::RefundAboveFull {
                    difficulty: index as u32,
                    percent: difficulty.refund_percent,
                });
            }
            if difficulty.stat_modifier <= 0.0 || !difficulty.stat_modifier.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: format!("difficulties[{index}].stat_modifier"),
                });
            }
        }
        for (id, style) in &self.level_styles {
            if style.columns < 2 || style.rows < 1 {
                return Err(ConfigError::GridTooSmall {
                    style: id.clone(),
                    columns: style.columns,
                    rows: style.rows,
                });
            }
            if style.tile_size <= 0.0 || !style.tile_size.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: format!("level_styles.{id}.tile_size"),
                });
            }
            if self.difficulty(style.difficulty).is_none() {
                return Err(ConfigError::UnknownDifficulty {
                    style: id.clone(),
                    difficulty: style.difficulty,
                });
            }
            for feature in &style.features {
                if feature.min > feature.max {
                    return Err(ConfigError::InvalidValue {
                        field: format!("level_styles.{id}.features.{:?}", feature.kind),
                    });
                }
            }
        }
        for (kind, tower) in &self.towers {
            let stats = &tower.stats;
            if ![stats.range, stats.damage, stats.fire_rate]
                .into_iter()
                .all(non_negative)
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("towers.{kind}.stats"),
                });
            }
            match &tower.attack {
                Some(AttackKind::StandardProjectile {
                    speed,
                    blast_radius,
                    ..
                }) => {
                    if !(speed.is_finite() && *speed > 0.0) {
                        return Err(ConfigError::InvalidValue {
                            field: format!("towers.{kind}.attack.speed"),
                        });
                    }
                    if blast_radius.is_some_and(|radius| !non_negative(radius)) {
                        return Err(ConfigError::InvalidValue {
                            field: format!("towers.{kind}.attack.blast_radius"),
                        });
                    }
                }
                Some(AttackKind::GroundAura {
                    radius, duration, ..
                }) => {
                    if !non_negative(*radius) || !non_negative(*duration) {
                        return Err(ConfigError::InvalidValue {
                            field: format!("towers.{kind}.attack"),
                        });
                    }
                }
                Some(AttackKind::AttachedEffect { .. }) | None => {}
            }
            for (upgrade, definition) in &tower.upgrades {
                if !definition
                    .modifiers
                    .iter()
                    .all(|modifier| modifier.value.is_finite())
                {
                    return Err(ConfigError::InvalidValue {
                        field: format!("towers.{kind}.upgrades.{upgrade}"),
                    });
                }
            }
        }
        for (kind, enemy) in &self.enemies {
            let healthy = enemy.health.is_finite() && enemy.health > 0.0;
            if !healthy
                || !non_negative(enemy.speed)
                || !non_negative(enemy.armor)
                || !enemy.health_growth_per_wave.is_finite()
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("enemies.{kind}"),
                });
            }
        }
        Ok(())
    }

    /// Looks up a difficulty level.
    #[must_use]
    pub fn difficulty(&self, level: u32) -> Option<&DifficultyDefinition> {
        self.difficulties.get(usize::try_from(level).ok()?)
    }

    /// Looks up a tower type.
    #[must_use]
    pub fn tower(&self, kind: &TowerKind) -> Option<&TowerDefinition> {
        self.towers.get(kind)
    }

    /// Looks up an enemy type.
    #[must_use]
    pub fn enemy(&self, kind: &EnemyKind) -> Option<&EnemyDefinition> {
        self.enemies.get(kind)
    }

    /// Looks up a level style.
    #[must_use]
    pub fn level_style(&self, style: &LevelStyleId) -> Option<&LevelStyle> {
        self.level_styles.get(style)
    }
}

/// Finite and at least zero; rejects NaN, which fails every comparison.
fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

/// Errors raised while loading configuration. All of them are startup-fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The enemy table is empty.
    #[error("configuration defines no enemy types")]
    NoEnemies,
    /// The difficulty table is empty.
    #[error("configuration defines no difficulty levels")]
    NoDifficulties,
    /// A level style references a difficulty that does not exist.
    #[error("level style `{style}` references unknown difficulty {difficulty}")]
    UnknownDifficulty {
        /// Offending style.
        style: LevelStyleId,
        /// Missing difficulty index.
        difficulty: u32,
    },
    /// A level style grid is too small to hold a route.
    #[error("level style `{style}` grid {columns}x{rows} is too small")]
    GridTooSmall {
        /// Offending style.
        style: LevelStyleId,
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// A difficulty refunds more than the full investment.
    #[error("difficulty {difficulty} refunds {percent}% which exceeds 100%")]
    RefundAboveFull {
        /// Offending difficulty index.
        difficulty: u32,
        /// Configured percentage.
        percent: u32,
    },
    /// A numeric field is negative, zero or non-finite where that is not allowed.
    #[error("invalid value for `{field}`")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
    },
}

/// Values used when a session starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Currency granted at session start.
    pub starting_currency: u32,
    /// Player base health at session start.
    pub starting_base_health: u32,
    /// Countdown in seconds before the first wave.
    pub first_wave_delay: f32,
}

/// Radii used when a projectile looks for a new target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTuning {
    /// Search radius around a projectile whose target vanished.
    pub retarget_radius: f32,
    /// Search radius around the struck enemy when chaining.
    pub chain_radius: f32,
}

/// Coefficients of the linear wave-size and spawn-cadence formulas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveScaling {
    /// Enemies in every wave.
    pub count_base: f32,
    /// Extra enemies per wave number.
    pub count_per_wave: f32,
    /// Extra enemies per difficulty level.
    pub count_per_difficulty: f32,
    /// Seconds between spawns before reductions.
    pub spawn_cooldown_base: f32,
    /// Cooldown reduction per wave number.
    pub spawn_cooldown_per_wave: f32,
    /// Cooldown reduction per difficulty level.
    pub spawn_cooldown_per_difficulty: f32,
    /// Lower clamp for the spawn cooldown.
    pub spawn_cooldown_min: f32,
}

impl WaveScaling {
    /// Number of enemies queued for the wave.
    #[must_use]
    pub fn enemy_count(&self, wave: u32, difficulty: u32) -> u32 {
        let count = self.count_base
            + self.count_per_wave * wave as f32
            + self.count_per_difficulty * difficulty as f32;
        count.max(0.0).floor() as u32
    }

    /// Seconds between consecutive spawns within the wave.
    #[must_use]
    pub fn spawn_cooldown(&self, wave: u32, difficulty: u32) -> f32 {
        let cooldown = self.spawn_cooldown_base
            - self.spawn_cooldown_per_wave * wave as f32
            - self.spawn_cooldown_per_difficulty * difficulty as f32;
        cooldown.max(self.spawn_cooldown_min)
    }
}

/// Per-level difficulty parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyDefinition {
    /// Countdown in seconds between waves.
    pub inter_wave_delay: f32,
    /// Multiplier applied to enemy stats at spawn.
    pub stat_modifier: f32,
    /// Percentage of total investment refunded on sale.
    pub refund_percent: u32,
}

/// Static definition of a tower type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerDefinition {
    /// Placement cost.
    pub cost: u32,
    /// Base combat statistics.
    pub stats: CombatStats,
    /// Active attack, if the tower attacks at all.
    #[serde(default)]
    pub attack: Option<AttackKind>,
    /// Passive buff granted to nearby towers.
    #[serde(default)]
    pub support: Option<SupportAura>,
    /// Passive effects applied to nearby enemies every tick.
    #[serde(default)]
    pub enemy_aura: Option<EnemyAura>,
    /// One-time purchasable upgrades.
    #[serde(default)]
    pub upgrades: BTreeMap<UpgradeId, UpgradeDefinition>,
}

/// Closed set of attack behaviours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttackKind {
    /// Fires a projectile that homes on the target.
    StandardProjectile {
        /// Flight speed in world units per second.
        speed: f32,
        /// Splash radius around the struck enemy.
        #[serde(default)]
        blast_radius: Option<f32>,
        /// Effects applied to the primary target.
        #[serde(default)]
        on_hit: Vec<EffectPayload>,
        /// Effects applied to enemies caught in the blast.
        #[serde(default)]
        on_blast: Vec<EffectPayload>,
    },
    /// Drops a persistent damaging zone at the target's position.
    GroundAura {
        /// Zone radius.
        radius: f32,
        /// Zone lifetime in seconds.
        duration: f32,
        /// Effects applied to enemies in the zone every tick.
        #[serde(default)]
        effects: Vec<EffectPayload>,
    },
    /// Applies effects straight to the target without an intermediate entity.
    AttachedEffect {
        /// Effects applied to the target.
        effects: Vec<EffectPayload>,
    },
}

/// Passive stat buff emitted by a support tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportAura {
    /// Towers whose centre lies within this radius are buffed.
    pub radius: f32,
    /// Buffs granted.
    pub buffs: Vec<SupportBuff>,
}

/// Passive effects emitted onto enemies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyAura {
    /// Enemies within this radius are affected.
    pub radius: f32,
    /// Effects applied every tick.
    pub effects: Vec<EffectPayload>,
}

/// Purchasable one-time tower upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    /// Purchase price.
    pub cost: u32,
    /// Stat changes granted.
    pub modifiers: Vec<StatModifier>,
}

/// Static definition of an enemy type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Base maximum health.
    pub health: f32,
    /// Base speed in world units per second.
    pub speed: f32,
    /// Base flat armor.
    #[serde(default)]
    pub armor: f32,
    /// Currency awarded on kill.
    pub reward: u32,
    /// Base health removed when the enemy reaches the end of its route.
    pub collision_damage: u32,
    /// Fractional health growth per wave after the first.
    #[serde(default)]
    pub health_growth_per_wave: f32,
    /// Lowest difficulty at which the type is eligible for waves.
    #[serde(default)]
    pub min_difficulty: u32,
    /// Effect kinds the type ignores.
    #[serde(default)]
    pub immunities: BTreeSet<EffectKind>,
}

impl EnemyDefinition {
    /// Reports whether the type ignores the effect kind.
    #[must_use]
    pub fn is_immune_to(&self, kind: EffectKind) -> bool {
        self.immunities.contains(&kind)
    }
}

/// Parameters for procedurally generating a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelStyle {
    /// Grid columns.
    pub columns: u32,
    /// Grid rows.
    pub rows: u32,
    /// Tile edge length in world units.
    pub tile_size: f32,
    /// Difficulty level index.
    pub difficulty: u32,
    /// Route shapes to carve.
    pub routes: Vec<RouteSpec>,
    /// Obstacle features to scatter.
    #[serde(default)]
    pub features: Vec<FeatureSpec>,
}

/// Number of routes of one shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Shape carved.
    pub shape: RouteShape,
    /// Routes of this shape.
    pub count: u32,
}

/// Route carving strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteShape {
    /// Straight run with a single vertical dog-leg at a random column.
    Elbow,
    /// Biased random walk toward the far edge.
    Wander,
}

/// Obstacle feature scatter range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Obstacle placed.
    pub kind: ObstacleKind,
    /// Minimum instances.
    pub min: u32,
    /// Maximum instances.
    pub max: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [economy]
        starting_currency = 100
        starting_base_health = 20
        first_wave_delay = 5.0

        [projectiles]
        retarget_radius = 60.0
        chain_radius = 120.0

        [waves]
        count_base = 4.0
        count_per_wave = 2.0
        count_per_difficulty = 1.0
        spawn_cooldown_base = 1.5
        spawn_cooldown_per_wave = 0.1
        spawn_cooldown_per_difficulty = 0.05
        spawn_cooldown_min = 0.4

        [[difficulties]]
        inter_wave_delay = 10.0
        stat_modifier = 1.0
        refund_percent = 70

        [towers.arrow]
        cost = 50
        stats = { damage = 5.0, range = 100.0, fire_rate = 2.0 }
        attack = { kind = "standard_projectile", speed = 300.0 }

        [enemies.grunt]
        health = 20.0
        speed = 40.0
        reward = 5
        collision_damage = 1
        immunities = ["stun"]

        [level_styles.meadow]
        columns = 20
        rows = 12
        tile_size = 40.0
        difficulty = 0
        routes = [{ shape = "elbow", count = 1 }]
    "#;

    #[test]
    fn minimal_document_parses() {
        let config = GameConfig::from_toml_str(MINIMAL).expect("valid config");
        let arrow = config.tower(&TowerKind::from("arrow")).expect("arrow tower");
        assert!(matches!(
            arrow.attack,
            Some(AttackKind::StandardProjectile { speed, blast_radius: None, .. }) if speed == 300.0
        ));
        let grunt = config.enemy(&EnemyKind::from("grunt")).expect("grunt");
        assert!(grunt.is_immune_to(EffectKind::Stun));
        assert!(!grunt.is_immune_to(EffectKind::Slow));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let document = MINIMAL.replace("difficulty = 0", "difficulty = 3");
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::UnknownDifficulty { difficulty: 3, .. })
        ));
    }

    #[test]
    fn refund_above_full_is_rejected() {
        let document = MINIMAL.replace("refund_percent = 70", "refund_percent = 140");
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::RefundAboveFull { percent: 140, .. })
        ));
    }

    #[test]
    fn nan_and_negative_stats_are_rejected() {
        let document = MINIMAL.replace("health = 20.0", "health = nan");
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::InvalidValue { field }) if field == "enemies.grunt"
        ));

        let document = MINIMAL.replace("range = 100.0", "range = nan");
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::InvalidValue { field }) if field == "towers.arrow.stats"
        ));

        let document = MINIMAL.replace("speed = 40.0", "speed = -1.0");
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::InvalidValue { field }) if field == "enemies.grunt"
        ));

        let document = MINIMAL.replace("speed = 300.0", "speed = inf");
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::InvalidValue { field }) if field == "towers.arrow.attack.speed"
        ));
    }

    #[test]
    fn non_finite_upgrade_modifier_is_rejected() {
        let document = MINIMAL.replace(
            "attack = { kind = \"standard_projectile\", speed = 300.0 }",
            "attack = { kind = \"standard_projectile\", speed = 300.0 }\n\
             upgrades.sharp = { cost = 10, modifiers = [{ stat = \"damage\", op = \"add\", value = nan }] }",
        );
        assert!(matches!(
            GameConfig::from_toml_str(&document),
            Err(ConfigError::InvalidValue { field }) if field == "towers.arrow.upgrades.sharp"
        ));
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        assert!(matches!(
            GameConfig::from_toml_str("economy = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn wave_formulas_follow_linear_coefficients() {
        let config = GameConfig::from_toml_str(MINIMAL).expect("valid config");
        assert_eq!(config.waves.enemy_count(3, 1), 11);
        assert!((config.waves.spawn_cooldown(2, 0) - 1.3).abs() < 1e-6);
        assert_eq!(config.waves.spawn_cooldown(40, 0), 0.4);
    }
}
