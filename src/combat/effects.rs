//! Weapon innate effects
//!
//! Innate effects are permanent passives baked into a weapon. They are
//! flattened once per battle into an [`InnateContext`]:
//! - damage multipliers compose multiplicatively
//! - everything else is additive
//! - stat boosts are applied to the fighter exactly once

use serde::{Deserialize, Serialize};

use super::state::{Fighter, StatBoost};

/// Kind and magnitude of an innate effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InnateKind {
    /// Outgoing plain-attack damage multiplier
    DamageMult(f64),
    AtkBoost(i32),
    DefBoost(i32),
    AgiBoost(i32),
    /// Lowers the crit threshold
    CriBoost(i32),
    /// Extra starting hp
    HpBoost(i32),
    /// Fraction of dealt damage healed
    Lifesteal(f64),
    /// Fraction of defender DEF ignored
    IgnoreDef(f64),
    /// Added to AGI when defending
    EvasionBoost(i32),
    /// Percent chance to stun on hit
    StunChance(f64),
    /// Percent chance to counter a landed hit
    CounterChance(f64),
    /// Always act first unless a skill says otherwise
    Initiative(bool),
    /// Fraction of incoming plain-attack damage removed
    DamageReduction(f64),
}

impl std::fmt::Display for InnateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InnateKind::DamageMult(v) => write!(f, "damage x{}", v),
            InnateKind::AtkBoost(v) => write!(f, "ATK {:+}", v),
            InnateKind::DefBoost(v) => write!(f, "DEF {:+}", v),
            InnateKind::AgiBoost(v) => write!(f, "AGI {:+}", v),
            InnateKind::CriBoost(v) => write!(f, "CRI {:+}", v),
            InnateKind::HpBoost(v) => write!(f, "HP {:+}", v),
            InnateKind::Lifesteal(v) => write!(f, "lifesteal {}%", v * 100.0),
            InnateKind::IgnoreDef(v) => write!(f, "ignore {}% DEF", v * 100.0),
            InnateKind::EvasionBoost(v) => write!(f, "evasion {:+}", v),
            InnateKind::StunChance(v) => write!(f, "stun {}%", v),
            InnateKind::CounterChance(v) => write!(f, "counter {}%", v),
            InnateKind::Initiative(_) => write!(f, "initiative"),
            InnateKind::DamageReduction(v) => write!(f, "damage -{}%", v * 100.0),
        }
    }
}

/// An innate effect attached to a weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnateEffect {
    pub id: String,
    pub name: String,
    pub effect: InnateKind,
}

impl InnateEffect {
    /// Create an innate effect
    pub fn new(id: &str, name: &str, effect: InnateKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            effect,
        }
    }
}

/// Flattened innate modifiers for one fighter
#[derive(Debug, Clone, PartialEq)]
pub struct InnateContext {
    pub damage_mult: f64,
    pub atk_boost: i32,
    pub def_boost: i32,
    pub agi_boost: i32,
    pub cri_boost: i32,
    pub hp_boost: i32,
    pub lifesteal: f64,
    pub ignore_def: f64,
    pub evasion_boost: i32,
    pub stun_chance: f64,
    pub counter_chance: f64,
    pub initiative: bool,
    pub damage_reduction: f64,
}

impl Default for InnateContext {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            atk_boost: 0,
            def_boost: 0,
            agi_boost: 0,
            cri_boost: 0,
            hp_boost: 0,
            lifesteal: 0.0,
            ignore_def: 0.0,
            evasion_boost: 0,
            stun_chance: 0.0,
            counter_chance: 0.0,
            initiative: false,
            damage_reduction: 0.0,
        }
    }
}

impl InnateContext {
    /// Flatten a weapon's effect list
    pub fn from_effects(effects: &[InnateEffect]) -> Self {
        effects.iter().fold(Self::default(), |mut ctx, e| {
            match e.effect {
                InnateKind::DamageMult(v) => ctx.damage_mult *= v,
                InnateKind::AtkBoost(v) => ctx.atk_boost += v,
                InnateKind::DefBoost(v) => ctx.def_boost += v,
                InnateKind::AgiBoost(v) => ctx.agi_boost += v,
                InnateKind::CriBoost(v) => ctx.cri_boost += v,
                InnateKind::HpBoost(v) => ctx.hp_boost += v,
                InnateKind::Lifesteal(v) => ctx.lifesteal += v,
                InnateKind::IgnoreDef(v) => ctx.ignore_def += v,
                InnateKind::EvasionBoost(v) => ctx.evasion_boost += v,
                InnateKind::StunChance(v) => ctx.stun_chance += v,
                InnateKind::CounterChance(v) => ctx.counter_chance += v,
                InnateKind::Initiative(on) => ctx.initiative |= on,
                InnateKind::DamageReduction(v) => ctx.damage_reduction += v,
            }
            ctx
        })
    }

    /// Stat part of the context
    pub fn stat_boost(&self) -> StatBoost {
        StatBoost {
            atk: self.atk_boost,
            def: self.def_boost,
            agi: self.agi_boost,
            cri: self.cri_boost,
        }
    }

    /// Apply stat and hp boosts to a fighter, returning the boosted fighter
    pub fn apply_to(&self, fighter: Fighter, min_cri: i32) -> Fighter {
        let stats = fighter.stats.boosted(self.stat_boost(), min_cri);
        let mut fighter = fighter.with_stats(stats);
        if self.hp_boost != 0 {
            fighter.hp = (fighter.hp + self.hp_boost).max(1);
        }
        fighter
    }
}
