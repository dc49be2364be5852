//! Per-battle skill context
//!
//! Equipped skills are partitioned by trigger type and parsed once.
//! Running boosts, the once-only conditional set and the katana mastery
//! synergy live here for the length of one battle.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::effects::{parse_skill_effects, ParsedSkillEffects, Skill, TriggerType};
use super::mods::{EquippedSkill, ModDef, ModTable};
use crate::combat::StatBoost;

/// Skill id that enables the katana synergy
pub const KATANA_MASTERY_ID: &str = "katana_mastery";

/// Lowest and highest effective trigger chance, in percent
pub const TRIGGER_CHANCE_MIN: f64 = 1.0;
pub const TRIGGER_CHANCE_MAX: f64 = 95.0;

/// An equipped skill with its mods resolved and effects parsed
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSkill {
    pub skill: Skill,
    pub mods: Vec<ModDef>,
    pub effects: ParsedSkillEffects,
}

impl LoadedSkill {
    /// Resolve mod ids against the table; unknown ids are skipped
    pub fn load(equipped: &EquippedSkill, table: &ModTable) -> Self {
        let mods: Vec<ModDef> = equipped
            .mods
            .iter()
            .filter_map(|id| {
                let found = table.get(id).cloned();
                if found.is_none() {
                    warn!(skill = %equipped.skill.id, mod_id = %id, "unknown mod ignored");
                }
                found
            })
            .collect();
        let effects = parse_skill_effects(&equipped.skill, &mods);
        Self {
            skill: equipped.skill.clone(),
            mods,
            effects,
        }
    }
}

/// Boosts accumulated from passive and activated conditional skills
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActiveBoosts {
    pub atk: i32,
    pub def: i32,
    pub agi: i32,
    pub cri: i32,
    pub evasion: i32,
    pub damage_reduction: f64,
}

impl ActiveBoosts {
    /// Add the stat part of a boost
    pub fn add_stats(&mut self, boost: StatBoost) {
        self.atk += boost.atk;
        self.def += boost.def;
        self.agi += boost.agi;
        self.cri += boost.cri;
    }
}

/// One-shot buff from a conditional skill, consumed by the next skill attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackBuff {
    pub damage_mult: f64,
    pub guaranteed_crit: bool,
}

/// Skill state for one fighter in one battle
#[derive(Debug, Clone, PartialEq)]
pub struct SkillContext {
    pub passives: Vec<LoadedSkill>,
    pub conditionals: Vec<LoadedSkill>,
    /// In equip order; trigger rolls walk this list
    pub probabilities: Vec<LoadedSkill>,
    pub active_boosts: ActiveBoosts,
    pub shield_hp: i32,
    /// Percent of max hp healed at round end
    pub heal_per_round: f64,
    /// Percent; the highest single source counts
    pub counter_chance: f64,
    pub initiative: bool,
    pub conditional_activated: HashSet<String>,
    pub katana_mastery_active: bool,
    pub katana_trigger_bonus: f64,
    pub katana_damage_bonus: f64,
    /// Skill proficiency; every full 100 improves connect odds
    pub proficiency: u32,
    pub conditional_attack_buff: Option<AttackBuff>,
}

impl SkillContext {
    /// Context with no skills equipped
    pub fn empty(proficiency: u32) -> Self {
        Self {
            passives: Vec::new(),
            conditionals: Vec::new(),
            probabilities: Vec::new(),
            active_boosts: ActiveBoosts::default(),
            shield_hp: 0,
            heal_per_round: 0.0,
            counter_chance: 0.0,
            initiative: false,
            conditional_activated: HashSet::new(),
            katana_mastery_active: false,
            katana_trigger_bonus: 0.0,
            katana_damage_bonus: 0.0,
            proficiency,
            conditional_attack_buff: None,
        }
    }

    /// Whether no skill is equipped
    pub fn is_empty(&self) -> bool {
        self.passives.is_empty() && self.conditionals.is_empty() && self.probabilities.is_empty()
    }

    /// Fold a skill's lasting effects into the running totals
    pub(crate) fn absorb(&mut self, effects: &ParsedSkillEffects) {
        self.active_boosts.add_stats(effects.stat_boost());
        self.active_boosts.evasion += effects.evasion_boost;
        self.active_boosts.damage_reduction += effects.damage_reduction;
        self.shield_hp += effects.shield_hp;
        self.heal_per_round += effects.heal_per_round;
        self.counter_chance = self.counter_chance.max(effects.counter);
        self.initiative |= effects.initiative;
    }

    /// Effective trigger chance of a probability skill, in percent
    pub fn effective_trigger_chance(&self, loaded: &LoadedSkill) -> f64 {
        let base = match loaded.skill.trigger_type {
            TriggerType::Probability => loaded.skill.trigger_chance.unwrap_or(0.0),
            _ => 0.0,
        };
        let katana = if self.katana_mastery_active && loaded.skill.is_katana() {
            self.katana_trigger_bonus
        } else {
            0.0
        };
        (base + loaded.effects.trigger_bonus + katana).clamp(TRIGGER_CHANCE_MIN, TRIGGER_CHANCE_MAX)
    }
}

/// Post-motion delay after mod reductions, never negative
pub fn effective_delay(loaded: &LoadedSkill) -> f64 {
    (loaded.skill.post_motion_delay.unwrap_or(0.0) - loaded.effects.delay_reduction).max(0.0)
}

/// Partition equipped skills and detect katana mastery
pub fn build_skill_context(equipped: &[EquippedSkill], table: &ModTable, proficiency: u32) -> SkillContext {
    let mut ctx = SkillContext::empty(proficiency);

    for entry in equipped {
        let loaded = LoadedSkill::load(entry, table);
        if loaded.skill.id == KATANA_MASTERY_ID {
            ctx.katana_mastery_active = true;
            ctx.katana_trigger_bonus = loaded.effects.katana_trigger_bonus;
            ctx.katana_damage_bonus = loaded.effects.katana_damage_bonus;
        }
        match loaded.skill.trigger_type {
            TriggerType::Passive => ctx.passives.push(loaded),
            TriggerType::Conditional => ctx.conditionals.push(loaded),
            TriggerType::Probability => ctx.probabilities.push(loaded),
        }
    }

    ctx
}

/// Skill activity reported alongside the battle log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillEvent {
    PassiveApplied {
        fighter: String,
        skill_id: String,
        skill_name: String,
    },
    ConditionalActivated {
        fighter: String,
        skill_id: String,
        skill_name: String,
        round: u32,
    },
    SkillTriggered {
        fighter: String,
        skill_id: String,
        chance: f64,
    },
    SkillConnect {
        fighter: String,
        from: String,
        to: String,
        chain: u32,
    },
    Heal {
        fighter: String,
        amount: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::effects::SkillEffect;
    use crate::skills::mods::ModEffect;

    fn skill(id: &str, trigger: TriggerType, weapon: Option<&str>, chance: Option<f64>) -> Skill {
        Skill {
            id: id.to_string(),
            name_cn: String::new(),
            name_jp: id.to_string(),
            color: None,
            weapon_type: weapon.map(str::to_string),
            trigger_type: trigger,
            trigger_condition: None,
            trigger_chance: chance,
            post_motion_delay: Some(2.0),
            effects: vec![],
        }
    }

    fn mastery() -> Skill {
        let mut s = skill(KATANA_MASTERY_ID, TriggerType::Passive, Some("katana"), None);
        s.effects = vec![
            SkillEffect::KatanaTriggerBonus(10.0),
            SkillEffect::KatanaDamageBonus(0.2),
        ];
        s
    }

    #[test]
    fn test_partition_and_mastery() {
        let equipped = vec![
            EquippedSkill::new(mastery()),
            EquippedSkill::new(skill("iai", TriggerType::Probability, Some("katana"), Some(20.0))),
            EquippedSkill::new(skill("rally", TriggerType::Conditional, None, None)),
        ];
        let ctx = build_skill_context(&equipped, &ModTable::new(), 150);
        assert_eq!(ctx.passives.len(), 1);
        assert_eq!(ctx.conditionals.len(), 1);
        assert_eq!(ctx.probabilities.len(), 1);
        assert!(ctx.katana_mastery_active);
        assert_eq!(ctx.katana_damage_bonus, 0.2);
        assert_eq!(ctx.proficiency, 150);
    }

    #[test]
    fn test_trigger_chance_with_bonuses() {
        let table = ModTable::from_defs([ModDef {
            id: "focus".to_string(),
            name: "Focus".to_string(),
            effects: vec![ModEffect::TriggerBonus(5.0)],
        }]);
        let equipped = vec![
            EquippedSkill::new(mastery()),
            EquippedSkill::new(skill("iai", TriggerType::Probability, Some("katana"), Some(20.0)))
                .with_mod("focus"),
            EquippedSkill::new(skill("slash", TriggerType::Probability, Some("sword"), Some(20.0)))
                .with_mod("focus"),
        ];
        let ctx = build_skill_context(&equipped, &table, 0);
        assert_eq!(ctx.effective_trigger_chance(&ctx.probabilities[0]), 35.0);
        assert_eq!(ctx.effective_trigger_chance(&ctx.probabilities[1]), 25.0);
    }

    #[test]
    fn test_trigger_chance_clamped() {
        let equipped = vec![
            EquippedSkill::new(skill("sure", TriggerType::Probability, None, Some(150.0))),
            EquippedSkill::new(skill("never", TriggerType::Probability, None, None)),
        ];
        let ctx = build_skill_context(&equipped, &ModTable::new(), 0);
        assert_eq!(ctx.effective_trigger_chance(&ctx.probabilities[0]), 95.0);
        assert_eq!(ctx.effective_trigger_chance(&ctx.probabilities[1]), 1.0);
    }

    #[test]
    fn test_effective_delay_floors_at_zero() {
        let table = ModTable::from_defs([ModDef {
            id: "swift".to_string(),
            name: "Swift".to_string(),
            effects: vec![ModEffect::DelayReduction(1.5), ModEffect::DelayReduction(1.5)],
        }]);
        let plain = LoadedSkill::load(
            &EquippedSkill::new(skill("a", TriggerType::Probability, None, Some(10.0))),
            &table,
        );
        assert_eq!(effective_delay(&plain), 2.0);
        let modded = LoadedSkill::load(
            &EquippedSkill::new(skill("b", TriggerType::Probability, None, Some(10.0))).with_mod("swift"),
            &table,
        );
        assert_eq!(effective_delay(&modded), 0.0);
    }

    #[test]
    fn test_unknown_mod_skipped() {
        let loaded = LoadedSkill::load(
            &EquippedSkill::new(skill("a", TriggerType::Probability, None, Some(10.0))).with_mod("ghost"),
            &ModTable::new(),
        );
        assert!(loaded.mods.is_empty());
    }
}
