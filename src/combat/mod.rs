//! Combat system module
//!
//! Building blocks of a battle:
//! - Dice rolling through an injectable [`Roller`]
//! - Fighter stats, immutable boosts and per-battle combatant state
//! - Innate weapon effects
//! - Plain attack resolution (hit check, damage check, counters)
//! - Boss special mechanics
//! - Construction of fighters from unit, weapon, pvp and boss data
//! - The structured battle log

pub mod builder;
pub mod damage;
pub mod dice;
pub mod effects;
pub mod log;
pub mod mechanics;
pub mod state;

pub use builder::{
    build_ally, build_boss, build_enemy, build_pvp_contestant, BossData, BossPhase, PvpContestant,
    TitleModifiers, UnitData, WeaponData,
};
pub use damage::{dam_check, hit_check, process_attack, AttackOutcome, DamageCheck, HitCheck};
pub use dice::{RandRoller, Roller, ScriptedRoller};
pub use effects::{InnateContext, InnateEffect, InnateKind};
pub use log::{BattleResult, EndReason, LogEntry, MechanicKind, Outcome};
pub use mechanics::SpecialMechanics;
pub use state::{Combatant, Fighter, StatBoost, Stats};
