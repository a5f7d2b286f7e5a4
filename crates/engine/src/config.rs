//! Match configuration.

use crate::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure. Read-only for the lifetime of a match.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub speeds: SpeedConfig,
    #[serde(default)]
    pub consumption: ConsumptionConfig,
    #[serde(default)]
    pub scores: ScoreConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub wormholes: WormholeConfig,
    #[serde(default)]
    pub afterburner: AfterburnerConfig,
    #[serde(default = "default_gas_clouds")]
    pub gas_clouds: ObstacleConfig,
    #[serde(default = "default_asteroid_fields")]
    pub asteroid_fields: ObstacleConfig,
    #[serde(default)]
    pub torpedo: TorpedoConfig,
    #[serde(default)]
    pub teleport: TeleportConfig,
    #[serde(default)]
    pub shield: ShieldConfig,
    #[serde(default)]
    pub supernova: SupernovaConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            speeds: SpeedConfig::default(),
            consumption: ConsumptionConfig::default(),
            scores: ScoreConfig::default(),
            food: FoodConfig::default(),
            wormholes: WormholeConfig::default(),
            afterburner: AfterburnerConfig::default(),
            gas_clouds: default_gas_clouds(),
            asteroid_fields: default_asteroid_fields(),
            torpedo: TorpedoConfig::default(),
            teleport: TeleportConfig::default(),
            shield: ShieldConfig::default(),
            supernova: SupernovaConfig::default(),
            seeds: SeedConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, writing the defaults there first if
    /// the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Rescale the bot-count driven values for `bot_count` bots.
    pub fn with_bot_count(mut self, bot_count: u32) -> Self {
        let bots = bot_count as i32;
        self.game.bot_count = bot_count;
        self.game.map_radius = bots * self.game.map_radius_ratio;
        self.game.max_rounds = self.game.map_radius.max(0) as u32;
        self.game.start_radius = bots * self.game.start_radius_ratio;
        self.food.starting_food_count = bot_count * self.food.starting_food_count_ratio;
        self.wormholes.count = bot_count * self.wormholes.count_ratio;
        self
    }

    /// Reject bundles no match can be played with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.game.bot_count == 0 {
            return Err(EngineError::Config("bot_count must be at least 1".into()));
        }
        if self.game.map_radius <= 0 {
            return Err(EngineError::Config("map_radius must be positive".into()));
        }
        if self.game.start_radius >= self.game.map_radius {
            return Err(EngineError::Config(format!(
                "start_radius {} must be inside map_radius {}",
                self.game.start_radius, self.game.map_radius
            )));
        }
        if self.game.radius_shrink_per_tick < 0 {
            return Err(EngineError::Config("radius_shrink_per_tick must not be negative".into()));
        }
        if self.game.max_rounds == 0 {
            return Err(EngineError::Config("max_rounds must be at least 1".into()));
        }
        if self.speeds.ratio <= 0.0 {
            return Err(EngineError::Config("speeds.ratio must be positive".into()));
        }
        if let Some(seeds) = &self.seeds.player_seeds
            && seeds.len() < self.game.bot_count as usize
        {
            return Err(EngineError::Config(format!(
                "{} player seeds configured for {} bots",
                seeds.len(),
                self.game.bot_count
            )));
        }
        if self.seeds.min_seed >= self.seeds.max_seed {
            return Err(EngineError::Config("seeds.min_seed must be below seeds.max_seed".into()));
        }
        Ok(())
    }
}

/// Match-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameConfig {
    #[serde(default = "default_bot_count")]
    pub bot_count: u32,
    /// Tick limit; the match is decided on placements when reached.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Target delay between ticks in milliseconds.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_map_radius")]
    pub map_radius: i32,
    #[serde(default = "default_map_radius_ratio")]
    pub map_radius_ratio: i32,
    #[serde(default = "default_start_radius")]
    pub start_radius: i32,
    #[serde(default = "default_start_radius_ratio")]
    pub start_radius_ratio: i32,
    #[serde(default = "default_starting_player_size")]
    pub starting_player_size: i32,
    /// Bots below this size are removed.
    #[serde(default = "default_minimum_player_size")]
    pub minimum_player_size: i32,
    /// How far the arena edge moves in every tick.
    #[serde(default = "default_radius_shrink_per_tick")]
    pub radius_shrink_per_tick: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bot_count: default_bot_count(),
            max_rounds: default_max_rounds(),
            tick_rate_ms: default_tick_rate_ms(),
            map_radius: default_map_radius(),
            map_radius_ratio: default_map_radius_ratio(),
            start_radius: default_start_radius(),
            start_radius_ratio: default_start_radius_ratio(),
            starting_player_size: default_starting_player_size(),
            minimum_player_size: default_minimum_player_size(),
            radius_shrink_per_tick: default_radius_shrink_per_tick(),
        }
    }
}

fn default_bot_count() -> u32 {
    4
}
fn default_max_rounds() -> u32 {
    1000
}
fn default_tick_rate_ms() -> u64 {
    40
}
fn default_map_radius() -> i32 {
    1000
}
fn default_map_radius_ratio() -> i32 {
    250
}
fn default_start_radius() -> i32 {
    400
}
fn default_start_radius_ratio() -> i32 {
    100
}
fn default_starting_player_size() -> i32 {
    10
}
fn default_minimum_player_size() -> i32 {
    5
}
fn default_radius_shrink_per_tick() -> i32 {
    1
}

/// Speed derivation. Speed is `ceil(ratio / size)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeedConfig {
    #[serde(default = "default_speed_ratio")]
    pub ratio: f64,
    #[serde(default = "default_starting_speed")]
    pub starting_speed: i32,
    /// Floor applied by the asteroid field penalty.
    #[serde(default = "default_speed_minimum")]
    pub minimum: i32,
    #[serde(default = "default_speed_maximum")]
    pub maximum: i32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            ratio: default_speed_ratio(),
            starting_speed: default_starting_speed(),
            minimum: default_speed_minimum(),
            maximum: default_speed_maximum(),
        }
    }
}

fn default_speed_ratio() -> f64 {
    200.0
}
fn default_starting_speed() -> i32 {
    20
}
fn default_speed_minimum() -> i32 {
    1
}
fn default_speed_maximum() -> i32 {
    60
}

/// Consumption ratios per object type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsumptionConfig {
    /// Fraction of the consumer's size taken from a smaller bot.
    #[serde(default = "default_player_consumption")]
    pub player: f64,
    /// Wormhole shrink factor per traversal.
    #[serde(default = "default_wormhole_consumption")]
    pub wormhole: f64,
    /// Food multiplier while the superfood effect is active.
    #[serde(default = "default_superfood_consumption")]
    pub superfood: i32,
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self {
            player: default_player_consumption(),
            wormhole: default_wormhole_consumption(),
            superfood: default_superfood_consumption(),
        }
    }
}

fn default_player_consumption() -> f64 {
    0.5
}
fn default_wormhole_consumption() -> f64 {
    0.5
}
fn default_superfood_consumption() -> i32 {
    2
}

/// Score awarded per event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoreConfig {
    #[serde(default = "default_food_score")]
    pub food: i32,
    #[serde(default = "default_player_score")]
    pub player: i32,
    #[serde(default = "default_wormhole_score")]
    pub wormhole: i32,
    #[serde(default = "default_superfood_score")]
    pub superfood: i32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            food: default_food_score(),
            player: default_player_score(),
            wormhole: default_wormhole_score(),
            superfood: default_superfood_score(),
        }
    }
}

fn default_food_score() -> i32 {
    1
}
fn default_player_score() -> i32 {
    10
}
fn default_wormhole_score() -> i32 {
    1
}
fn default_superfood_score() -> i32 {
    2
}

/// Food placement and consumption.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_size")]
    pub food_size: i32,
    /// Movers larger than this cannot eat.
    #[serde(default = "default_max_consumption_size")]
    pub max_consumption_size: i32,
    #[serde(default = "default_starting_food_count")]
    pub starting_food_count: u32,
    #[serde(default = "default_starting_food_count_ratio")]
    pub starting_food_count_ratio: u32,
    /// Food placed around each start position.
    #[serde(default = "default_player_safe_food")]
    pub player_safe_food: u32,
    /// Percentage of world food placed as superfood.
    #[serde(default = "default_superfood_percentage")]
    pub superfood_percentage: u32,
    #[serde(default = "default_superfood_effect_duration")]
    pub superfood_effect_duration: i32,
    #[serde(default = "default_food_min_separation")]
    pub min_separation: i32,
    #[serde(default = "default_max_starting_separation")]
    pub max_starting_separation: i32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            food_size: default_food_size(),
            max_consumption_size: default_max_consumption_size(),
            starting_food_count: default_starting_food_count(),
            starting_food_count_ratio: default_starting_food_count_ratio(),
            player_safe_food: default_player_safe_food(),
            superfood_percentage: default_superfood_percentage(),
            superfood_effect_duration: default_superfood_effect_duration(),
            min_separation: default_food_min_separation(),
            max_starting_separation: default_max_starting_separation(),
        }
    }
}

fn default_food_size() -> i32 {
    3
}
fn default_max_consumption_size() -> i32 {
    350
}
fn default_starting_food_count() -> u32 {
    400
}
fn default_starting_food_count_ratio() -> u32 {
    100
}
fn default_player_safe_food() -> u32 {
    10
}
fn default_superfood_percentage() -> u32 {
    5
}
fn default_superfood_effect_duration() -> i32 {
    5
}
fn default_food_min_separation() -> i32 {
    8
}
fn default_max_starting_separation() -> i32 {
    60
}

/// Wormhole pairs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WormholeConfig {
    /// Total wormholes; pairs are `count / 2`.
    #[serde(default = "default_wormhole_count")]
    pub count: u32,
    #[serde(default = "default_wormhole_count_ratio")]
    pub count_ratio: u32,
    #[serde(default)]
    pub seed: Option<i32>,
    #[serde(default = "default_wormhole_start_size")]
    pub start_size: i32,
    #[serde(default = "default_wormhole_min_size")]
    pub min_size: i32,
    #[serde(default = "default_wormhole_max_size")]
    pub max_size: i32,
    #[serde(default = "default_wormhole_min_separation")]
    pub min_separation: i32,
    /// Per-tick growth factor, capped at `max_size`.
    #[serde(default = "default_wormhole_growth_rate")]
    pub growth_rate: f64,
}

impl Default for WormholeConfig {
    fn default() -> Self {
        Self {
            count: default_wormhole_count(),
            count_ratio: default_wormhole_count_ratio(),
            seed: None,
            start_size: default_wormhole_start_size(),
            min_size: default_wormhole_min_size(),
            max_size: default_wormhole_max_size(),
            min_separation: default_wormhole_min_separation(),
            growth_rate: default_wormhole_growth_rate(),
        }
    }
}

fn default_wormhole_count() -> u32 {
    4
}
fn default_wormhole_count_ratio() -> u32 {
    1
}
fn default_wormhole_start_size() -> i32 {
    20
}
fn default_wormhole_min_size() -> i32 {
    10
}
fn default_wormhole_max_size() -> i32 {
    100
}
fn default_wormhole_min_separation() -> i32 {
    200
}
fn default_wormhole_growth_rate() -> f64 {
    1.01
}

/// Afterburner effect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AfterburnerConfig {
    #[serde(default = "default_afterburner_cost")]
    pub size_consumption_per_tick: i32,
    /// Added to the size-derived speed while active.
    #[serde(default = "default_afterburner_speed_bonus")]
    pub speed_bonus: i32,
}

impl Default for AfterburnerConfig {
    fn default() -> Self {
        Self {
            size_consumption_per_tick: default_afterburner_cost(),
            speed_bonus: default_afterburner_speed_bonus(),
        }
    }
}

fn default_afterburner_cost() -> i32 {
    1
}
fn default_afterburner_speed_bonus() -> i32 {
    20
}

/// Gas clouds and asteroid fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObstacleConfig {
    #[serde(default = "default_obstacle_count")]
    pub count: u32,
    #[serde(default = "default_obstacle_size")]
    pub size: i32,
    #[serde(default)]
    pub seed: Option<i32>,
    /// Size drained (gas) or speed removed (asteroids) per tick.
    #[serde(default = "default_obstacle_affect")]
    pub affect_per_tick: i32,
    #[serde(default = "default_obstacle_player_distance")]
    pub min_distance_from_players: i32,
}

fn default_obstacle_count() -> u32 {
    8
}
fn default_obstacle_size() -> i32 {
    40
}
fn default_obstacle_affect() -> i32 {
    1
}
fn default_obstacle_player_distance() -> i32 {
    100
}

fn default_gas_clouds() -> ObstacleConfig {
    ObstacleConfig {
        count: default_obstacle_count(),
        size: default_obstacle_size(),
        seed: None,
        affect_per_tick: 1,
        min_distance_from_players: default_obstacle_player_distance(),
    }
}

fn default_asteroid_fields() -> ObstacleConfig {
    ObstacleConfig {
        count: default_obstacle_count(),
        size: default_obstacle_size(),
        seed: None,
        affect_per_tick: 5,
        min_distance_from_players: default_obstacle_player_distance(),
    }
}

/// Torpedo salvos.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorpedoConfig {
    #[serde(default = "default_torpedo_size")]
    pub size: i32,
    #[serde(default = "default_torpedo_speed")]
    pub speed: i32,
    /// Size the firing bot pays per salvo.
    #[serde(default = "default_torpedo_cost")]
    pub cost: i32,
    #[serde(default = "default_torpedo_starting_count")]
    pub starting_count: i32,
    #[serde(default = "default_torpedo_max_count")]
    pub max_count: i32,
    /// One salvo regenerates every `charge_rate` ticks.
    #[serde(default = "default_torpedo_charge_rate")]
    pub charge_rate: u32,
}

impl Default for TorpedoConfig {
    fn default() -> Self {
        Self {
            size: default_torpedo_size(),
            speed: default_torpedo_speed(),
            cost: default_torpedo_cost(),
            starting_count: default_torpedo_starting_count(),
            max_count: default_torpedo_max_count(),
            charge_rate: default_torpedo_charge_rate(),
        }
    }
}

fn default_torpedo_size() -> i32 {
    10
}
fn default_torpedo_speed() -> i32 {
    60
}
fn default_torpedo_cost() -> i32 {
    5
}
fn default_torpedo_starting_count() -> i32 {
    2
}
fn default_torpedo_max_count() -> i32 {
    5
}
fn default_torpedo_charge_rate() -> u32 {
    10
}

/// Teleporters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeleportConfig {
    #[serde(default = "default_teleport_size")]
    pub size: i32,
    #[serde(default = "default_teleport_speed")]
    pub speed: i32,
    #[serde(default = "default_teleport_cost")]
    pub cost: i32,
    #[serde(default = "default_teleport_starting_count")]
    pub starting_count: i32,
    #[serde(default = "default_teleport_max_count")]
    pub max_count: i32,
    #[serde(default = "default_teleport_charge_rate")]
    pub charge_rate: u32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            size: default_teleport_size(),
            speed: default_teleport_speed(),
            cost: default_teleport_cost(),
            starting_count: default_teleport_starting_count(),
            max_count: default_teleport_max_count(),
            charge_rate: default_teleport_charge_rate(),
        }
    }
}

fn default_teleport_size() -> i32 {
    10
}
fn default_teleport_speed() -> i32 {
    20
}
fn default_teleport_cost() -> i32 {
    20
}
fn default_teleport_starting_count() -> i32 {
    1
}
fn default_teleport_max_count() -> i32 {
    10
}
fn default_teleport_charge_rate() -> u32 {
    100
}

/// Shields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShieldConfig {
    #[serde(default = "default_shield_cost")]
    pub cost: i32,
    #[serde(default = "default_shield_effect_duration")]
    pub effect_duration: i32,
    #[serde(default)]
    pub starting_count: i32,
    #[serde(default = "default_shield_max_count")]
    pub max_count: i32,
    #[serde(default = "default_shield_charge_rate")]
    pub charge_rate: u32,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            cost: default_shield_cost(),
            effect_duration: default_shield_effect_duration(),
            starting_count: 0,
            max_count: default_shield_max_count(),
            charge_rate: default_shield_charge_rate(),
        }
    }
}

fn default_shield_cost() -> i32 {
    20
}
fn default_shield_effect_duration() -> i32 {
    20
}
fn default_shield_max_count() -> i32 {
    1
}
fn default_shield_charge_rate() -> u32 {
    150
}

/// Supernova pickup, bomb and blast.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupernovaConfig {
    /// Earliest pickup spawn, as a fraction of `max_rounds`.
    #[serde(default = "default_pickup_window_start")]
    pub pickup_window_start: f64,
    /// Latest pickup spawn, as a fraction of `max_rounds`.
    #[serde(default = "default_pickup_window_end")]
    pub pickup_window_end: f64,
    #[serde(default)]
    pub seed: Option<i32>,
    #[serde(default = "default_pickup_size")]
    pub pickup_size: i32,
    #[serde(default = "default_bomb_size")]
    pub bomb_size: i32,
    #[serde(default = "default_bomb_speed")]
    pub bomb_speed: i32,
    /// Blast radius as a fraction of the world radius at detonation.
    #[serde(default = "default_blast_radius_ratio")]
    pub blast_radius_ratio: f64,
    #[serde(default = "default_blast_damage")]
    pub damage: i32,
    /// Size of the gas cloud left behind by a detonation.
    #[serde(default = "default_cloud_size")]
    pub cloud_size: i32,
}

impl Default for SupernovaConfig {
    fn default() -> Self {
        Self {
            pickup_window_start: default_pickup_window_start(),
            pickup_window_end: default_pickup_window_end(),
            seed: None,
            pickup_size: default_pickup_size(),
            bomb_size: default_bomb_size(),
            bomb_speed: default_bomb_speed(),
            blast_radius_ratio: default_blast_radius_ratio(),
            damage: default_blast_damage(),
            cloud_size: default_cloud_size(),
        }
    }
}

fn default_pickup_window_start() -> f64 {
    0.25
}
fn default_pickup_window_end() -> f64 {
    0.75
}
fn default_pickup_size() -> i32 {
    5
}
fn default_bomb_size() -> i32 {
    10
}
fn default_bomb_speed() -> i32 {
    20
}
fn default_blast_radius_ratio() -> f64 {
    0.25
}
fn default_blast_damage() -> i32 {
    20
}
fn default_cloud_size() -> i32 {
    40
}

/// Player seeds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedConfig {
    /// One seed per bot; drawn at random when absent.
    #[serde(default)]
    pub player_seeds: Option<Vec<i32>>,
    #[serde(default = "default_min_seed")]
    pub min_seed: i32,
    #[serde(default = "default_max_seed")]
    pub max_seed: i32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            player_seeds: None,
            min_seed: default_min_seed(),
            max_seed: default_max_seed(),
        }
    }
}

fn default_min_seed() -> i32 {
    1000
}
fn default_max_seed() -> i32 {
    9999
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [game]
            bot_count = 2

            [torpedo]
            cost = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.game.bot_count, 2);
        assert_eq!(config.game.map_radius, 1000);
        assert_eq!(config.torpedo.cost, 7);
        assert_eq!(config.torpedo.size, 10);
        assert_eq!(config.asteroid_fields.affect_per_tick, 5);
        assert_eq!(config.gas_clouds.affect_per_tick, 1);
    }

    #[test]
    fn test_default_matches_empty_file() {
        let empty = Config::from_toml_str("").unwrap();
        let default = Config::default();
        assert_eq!(default.gas_clouds.count, empty.gas_clouds.count);
        assert_eq!(default.asteroid_fields.count, 8);
        assert_eq!(default.asteroid_fields.affect_per_tick, empty.asteroid_fields.affect_per_tick);
        assert_eq!(default.asteroid_fields.affect_per_tick, 5);
        assert_eq!(default.game.radius_shrink_per_tick, 1);
        assert_eq!(toml::to_string(&default).unwrap(), toml::to_string(&empty).unwrap());
    }

    #[test]
    fn test_with_bot_count_rescales() {
        let config = Config::default().with_bot_count(8);
        assert_eq!(config.game.bot_count, 8);
        assert_eq!(config.game.map_radius, 2000);
        assert_eq!(config.game.max_rounds, 2000);
        assert_eq!(config.game.start_radius, 800);
        assert_eq!(config.food.starting_food_count, 800);
        assert_eq!(config.wormholes.count, 8);
    }

    #[test]
    fn test_validate_rejects_short_seed_list() {
        let mut config = Config::default();
        config.seeds.player_seeds = Some(vec![1, 2]);
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));

        config.seeds.player_seeds = Some(vec![1, 2, 3, 4]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_bots() {
        let mut config = Config::default();
        config.game.bot_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.wormholes.start_size, 20);
        assert_eq!(parsed.seeds.player_seeds, None);
    }
}
