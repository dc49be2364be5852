//! Fighter state
//!
//! A [`Fighter`] is a plain value owned by one battle. Stat changes go
//! through [`Stats::boosted`], which returns a new value instead of
//! mutating a shared one. A [`Combatant`] bundles a fighter with its
//! innate context and optional skill context for the length of a battle.

use serde::{Deserialize, Serialize};

use super::effects::{InnateContext, InnateEffect};
use crate::skills::{apply_passive_skills, SkillContext, SkillEvent};

/// Core combat stats
///
/// `atk`/`def` are dice counts, `agi` is added to hit and initiative
/// rolls, `cri` is the d66 threshold for a crit reroll (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub atk: i32,
    pub def: i32,
    pub agi: i32,
    pub cri: i32,
}

/// Additive stat change; a positive `cri` lowers the crit threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBoost {
    pub atk: i32,
    pub def: i32,
    pub agi: i32,
    pub cri: i32,
}

impl StatBoost {
    /// Whether this boost changes nothing
    pub fn is_zero(&self) -> bool {
        *self == StatBoost::default()
    }

    /// Component-wise sum
    pub fn plus(self, other: StatBoost) -> StatBoost {
        StatBoost {
            atk: self.atk + other.atk,
            def: self.def + other.def,
            agi: self.agi + other.agi,
            cri: self.cri + other.cri,
        }
    }
}

impl Stats {
    /// Create a stat block
    pub fn new(atk: i32, def: i32, agi: i32, cri: i32) -> Self {
        Self { atk, def, agi, cri }
    }

    /// Apply a boost, returning the new stats.
    ///
    /// Counts never drop below 0 and `cri` never below `min_cri`.
    pub fn boosted(self, boost: StatBoost, min_cri: i32) -> Stats {
        Stats {
            atk: (self.atk + boost.atk).max(0),
            def: (self.def + boost.def).max(0),
            agi: (self.agi + boost.agi).max(0),
            cri: (self.cri - boost.cri).max(min_cri),
        }
    }
}

/// A combat-ready fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fighter {
    pub name: String,
    /// Current hit points
    pub hp: i32,
    /// Fixed at battle start after innate and shield additions
    pub max_hp: i32,
    pub stats: Stats,
    /// Permanent weapon passives
    #[serde(default)]
    pub innate_effects: Vec<InnateEffect>,
    /// Equipped weapon type, used by boss affinity checks
    #[serde(default)]
    pub weapon_type: Option<String>,
    /// Set by a boss AGI check; scales outgoing skill damage
    #[serde(default)]
    pub agi_penalty_mult: Option<f64>,
    /// Set by a boss weapon-affinity check; scales outgoing skill damage
    #[serde(default)]
    pub weapon_affinity_mult: Option<f64>,
}

impl Fighter {
    /// Create a fighter at full health
    pub fn new(name: impl Into<String>, hp: i32, stats: Stats) -> Self {
        Self {
            name: name.into(),
            hp,
            max_hp: hp,
            stats,
            innate_effects: Vec::new(),
            weapon_type: None,
            agi_penalty_mult: None,
            weapon_affinity_mult: None,
        }
    }

    /// Attach weapon innate effects
    pub fn with_innate(mut self, effects: Vec<InnateEffect>) -> Self {
        self.innate_effects = effects;
        self
    }

    /// Set the equipped weapon type
    pub fn with_weapon_type(mut self, weapon_type: impl Into<String>) -> Self {
        self.weapon_type = Some(weapon_type.into());
        self
    }

    /// Replace the stat block
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    /// Check if the fighter is out of the battle
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Current hp as a fraction of max hp
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.max_hp)
    }

    /// Lose hp, never going below 0. Returns hp actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let lost = amount.max(0).min(self.hp.max(0));
        self.hp = (self.hp - amount.max(0)).max(0);
        lost
    }

    /// Heal (cannot exceed max_hp). Returns hp actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let actual = amount.max(0).min((self.max_hp - self.hp).max(0));
        self.hp += actual;
        actual
    }

    /// Fix max hp to the current hp
    pub fn seal_max_hp(&mut self) {
        self.max_hp = self.hp;
    }
}

/// A fighter plus everything derived for one battle
#[derive(Debug, Clone)]
pub struct Combatant {
    pub fighter: Fighter,
    pub innate: InnateContext,
    pub skills: Option<SkillContext>,
    /// Cumulative damage taken this battle
    pub damage_taken: i32,
}

impl Combatant {
    /// Prepare a fighter for battle.
    ///
    /// Order is fixed: innate boosts, then passive skills (which may add
    /// shield hp), then max hp is sealed to the resulting hp.
    pub fn prepare(
        fighter: Fighter,
        mut skills: Option<SkillContext>,
        min_cri: i32,
        events: &mut Vec<SkillEvent>,
    ) -> Self {
        let innate = InnateContext::from_effects(&fighter.innate_effects);
        let mut fighter = innate.apply_to(fighter, min_cri);
        if let Some(ctx) = skills.as_mut() {
            fighter = apply_passive_skills(fighter, ctx, min_cri, events);
        }
        fighter.seal_max_hp();
        Self {
            fighter,
            innate,
            skills,
            damage_taken: 0,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.fighter.name
    }

    /// Check if this side is out of the battle
    pub fn is_defeated(&self) -> bool {
        self.fighter.is_defeated()
    }

    /// Lose hp and track cumulative damage taken
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let lost = self.fighter.take_damage(amount);
        self.damage_taken += amount.max(0);
        lost
    }

    /// Evasion added to AGI when defending a hit check
    pub fn evasion(&self) -> i32 {
        let skill = self
            .skills
            .as_ref()
            .map_or(0, |s| s.active_boosts.evasion);
        self.innate.evasion_boost + skill
    }

    /// Percent chance to counter a landed hit
    pub fn counter_chance(&self) -> f64 {
        let skill = self.skills.as_ref().map_or(0.0, |s| s.counter_chance);
        self.innate.counter_chance + skill
    }

    /// Damage reduction from passive and conditional skills
    pub fn skill_damage_reduction(&self) -> f64 {
        self.skills
            .as_ref()
            .map_or(0.0, |s| s.active_boosts.damage_reduction)
    }

    /// Whether a skill grants first action
    pub fn skill_initiative(&self) -> bool {
        self.skills.as_ref().is_some_and(|s| s.initiative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_returns_new_value() {
        let base = Stats::new(3, 2, 4, 9);
        let boosted = base.boosted(
            StatBoost {
                atk: 1,
                def: -5,
                agi: 2,
                cri: 6,
            },
            5,
        );
        assert_eq!(base, Stats::new(3, 2, 4, 9));
        assert_eq!(boosted, Stats::new(4, 0, 6, 5));
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut fighter = Fighter::new("Kirito", 10, Stats::new(1, 1, 1, 10));
        assert_eq!(fighter.take_damage(4), 4);
        assert_eq!(fighter.take_damage(20), 6);
        assert_eq!(fighter.hp, 0);
        assert!(fighter.is_defeated());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut fighter = Fighter::new("Asuna", 20, Stats::default());
        fighter.take_damage(5);
        assert_eq!(fighter.heal(10), 5);
        assert_eq!(fighter.hp, 20);
    }

    #[test]
    fn test_combatant_tracks_damage_taken() {
        let fighter = Fighter::new("Klein", 30, Stats::new(2, 2, 2, 10));
        let mut c = Combatant::prepare(fighter, None, 5, &mut Vec::new());
        c.take_damage(7);
        c.take_damage(50);
        assert_eq!(c.damage_taken, 57);
        assert_eq!(c.fighter.hp, 0);
    }
}
