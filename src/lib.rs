//! skirmish - turn-based combat engine for a text RPG
//!
//! Resolves one encounter at a time: dice-driven hit and damage checks,
//! weapon innate effects, an equippable skill system with connect chains,
//! boss special mechanics and PvP duel modes. Every battle is synchronous
//! and owns its inputs; randomness comes from an injected [`combat::Roller`].

pub mod battle;
pub mod combat;
pub mod config;
pub mod error;
pub mod scenario;
pub mod skills;

pub use battle::{run_battle, run_pve, run_pvp, BattleKind, BattleSetup, DuelMode};
pub use combat::{BattleResult, Fighter, Outcome, RandRoller, Roller, ScriptedRoller, Stats};
pub use config::CombatConfig;
pub use error::{BuildError, ConfigError, ScenarioError};
pub use scenario::Scenario;
