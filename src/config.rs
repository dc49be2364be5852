//! Combat configuration
//!
//! Tunables for the battle loop, crit rerolls, skill connects and PvP
//! scaling. Loaded from defaults, then an optional TOML file, then
//! `SKIRMISH_`-prefixed environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SKIRMISH_";

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Maximum number of rounds before the battle is settled without a kill
    pub round_limit: u32,
    /// Fraction of the triggering damage dealt back by a counter
    pub counter_rate: f64,
    /// Base percent chance for a skill connect
    pub connect_base_chance: f64,
    /// Extra connect percent per full 100 proficiency
    pub connect_prof_bonus_per_100: f64,
    /// Maximum number of connects chained off one trigger
    pub connect_max_chain: u32,
    /// Damage bonus per chained connect (0.15 = +15% per link)
    pub connect_damage_bonus: f64,
    /// CRI threshold floor
    pub min_cri: i32,
    /// CRI threshold used when a source does not give one
    pub default_cri: i32,
    /// Upper bound on crit rerolls within a single damage check
    pub crit_loop_ceiling: u32,
    /// `first_strike` duel: share of max hp lost that ends the duel
    pub first_strike_ratio: f64,
    /// `half_loss` duel: remaining share of max hp that ends the duel
    pub half_loss_ratio: f64,
    /// PvP base hp before level scaling
    pub pvp_base_hp: i32,
    /// PvP hp gained per level
    pub pvp_hp_per_level: i32,
    /// PvP levels needed for +1 atk/def/agi
    pub pvp_levels_per_stat: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            round_limit: 30,
            counter_rate: 0.5,
            connect_base_chance: 30.0,
            connect_prof_bonus_per_100: 5.0,
            connect_max_chain: 3,
            connect_damage_bonus: 0.15,
            min_cri: 5,
            default_cri: 10,
            crit_loop_ceiling: 999,
            first_strike_ratio: 0.10,
            half_loss_ratio: 0.50,
            pvp_base_hp: 100,
            pvp_hp_per_level: 10,
            pvp_levels_per_stat: 10,
        }
    }
}

impl CombatConfig {
    /// Layered provider: defaults, optional TOML file, environment
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(CombatConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the configuration
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(path))
    }

    /// Extract from an arbitrary provider and validate
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: CombatConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break loop termination or the rules
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "round_limit",
                reason: "must be at least 1",
            });
        }
        // A threshold of 2 would make every d66 a crit and the reroll loop endless.
        if self.min_cri < 3 {
            return Err(ConfigError::Invalid {
                field: "min_cri",
                reason: "must be at least 3",
            });
        }
        if self.default_cri < self.min_cri {
            return Err(ConfigError::Invalid {
                field: "default_cri",
                reason: "must not be below min_cri",
            });
        }
        if self.counter_rate < 0.0 {
            return Err(ConfigError::Invalid {
                field: "counter_rate",
                reason: "must not be negative",
            });
        }
        if self.connect_damage_bonus < 0.0 {
            return Err(ConfigError::Invalid {
                field: "connect_damage_bonus",
                reason: "must not be negative",
            });
        }
        for (field, ratio) in [
            ("first_strike_ratio", self.first_strike_ratio),
            ("half_loss_ratio", self.half_loss_ratio),
        ] {
            if ratio <= 0.0 || ratio > 1.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be in (0, 1]",
                });
            }
        }
        if self.pvp_levels_per_stat == 0 {
            return Err(ConfigError::Invalid {
                field: "pvp_levels_per_stat",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
