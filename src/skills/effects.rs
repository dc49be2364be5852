//! Skill definitions and effect parsing
//!
//! A skill's effect list plus its installed mods reduce to one
//! [`ParsedSkillEffects`]. Base effects of the same kind add up, except
//! `damage_mult` and `hit_count`, where the last entry wins. Mods only
//! add on top.

use serde::{Deserialize, Serialize};

use super::mods::{ModDef, ModEffect};
use crate::combat::StatBoost;

/// Weapon type that the katana mastery synergy applies to
pub const KATANA: &str = "katana";

/// How a skill fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Always on from battle start
    Passive,
    /// Fires once when an hp threshold is crossed
    Conditional,
    /// Rolled each round
    Probability,
}

/// Hp threshold for a conditional skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    #[serde(rename = "hp_below_50")]
    HpBelow50,
    #[serde(rename = "hp_below_30")]
    HpBelow30,
    #[serde(rename = "hp_below_10")]
    HpBelow10,
}

impl TriggerCondition {
    /// Hp ratio the fighter must fall below
    pub fn threshold(&self) -> f64 {
        match self {
            TriggerCondition::HpBelow50 => 0.5,
            TriggerCondition::HpBelow30 => 0.3,
            TriggerCondition::HpBelow10 => 0.1,
        }
    }

    /// Whether the given hp ratio satisfies the condition
    pub fn is_met(&self, hp_ratio: f64) -> bool {
        hp_ratio < self.threshold()
    }
}

/// One base skill effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SkillEffect {
    DamageMult(f64),
    HitCount(u32),
    GuaranteedCrit(bool),
    IgnoreDef(f64),
    Initiative(bool),
    Lifesteal(f64),
    /// Percent
    StunChance(f64),
    AtkBoost(i32),
    DefBoost(i32),
    AgiBoost(i32),
    CriBoost(i32),
    EvasionBoost(i32),
    DamageReduction(f64),
    /// Percent of max hp per round
    HealPerRound(f64),
    /// Percent chance to counter
    Counter(f64),
    ShieldHp(i32),
    KatanaTriggerBonus(f64),
    KatanaDamageBonus(f64),
    RareEncounterBonus(f64),
}

/// Static skill definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(default)]
    pub name_jp: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub weapon_type: Option<String>,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub trigger_condition: Option<TriggerCondition>,
    #[serde(default)]
    pub trigger_chance: Option<f64>,
    #[serde(default)]
    pub post_motion_delay: Option<f64>,
    #[serde(default)]
    pub effects: Vec<SkillEffect>,
}

impl Skill {
    /// Display name, preferring the Chinese name
    pub fn name(&self) -> &str {
        if !self.name_cn.is_empty() {
            &self.name_cn
        } else if !self.name_jp.is_empty() {
            &self.name_jp
        } else {
            &self.id
        }
    }

    /// Whether this is a katana skill
    pub fn is_katana(&self) -> bool {
        self.weapon_type.as_deref() == Some(KATANA)
    }
}

/// Flattened skill effects with mod bonuses folded in
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSkillEffects {
    pub damage_mult: f64,
    pub hit_count: u32,
    pub guaranteed_crit: bool,
    pub ignore_def: f64,
    pub initiative: bool,
    pub lifesteal: f64,
    pub stun_chance: f64,
    pub atk_boost: i32,
    pub def_boost: i32,
    pub agi_boost: i32,
    pub cri_boost: i32,
    pub evasion_boost: i32,
    pub damage_reduction: f64,
    pub heal_per_round: f64,
    pub counter: f64,
    pub shield_hp: i32,
    pub katana_trigger_bonus: f64,
    pub katana_damage_bonus: f64,
    pub rare_encounter_bonus: f64,
    /// Lowers the crit threshold of this skill's hits (mods)
    pub crit_bonus: i32,
    /// Added to the trigger chance (mods)
    pub trigger_bonus: f64,
    /// Subtracted from the post-motion delay (mods)
    pub delay_reduction: f64,
}

impl Default for ParsedSkillEffects {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            hit_count: 1,
            guaranteed_crit: false,
            ignore_def: 0.0,
            initiative: false,
            lifesteal: 0.0,
            stun_chance: 0.0,
            atk_boost: 0,
            def_boost: 0,
            agi_boost: 0,
            cri_boost: 0,
            evasion_boost: 0,
            damage_reduction: 0.0,
            heal_per_round: 0.0,
            counter: 0.0,
            shield_hp: 0,
            katana_trigger_bonus: 0.0,
            katana_damage_bonus: 0.0,
            rare_encounter_bonus: 0.0,
            crit_bonus: 0,
            trigger_bonus: 0.0,
            delay_reduction: 0.0,
        }
    }
}

impl ParsedSkillEffects {
    /// Stat part of the effects
    pub fn stat_boost(&self) -> StatBoost {
        StatBoost {
            atk: self.atk_boost,
            def: self.def_boost,
            agi: self.agi_boost,
            cri: self.cri_boost,
        }
    }
}

/// Reduce a skill and its mods to one flat effect set
pub fn parse_skill_effects(skill: &Skill, mods: &[ModDef]) -> ParsedSkillEffects {
    let mut out = ParsedSkillEffects::default();

    for effect in &skill.effects {
        match *effect {
            SkillEffect::DamageMult(v) => out.damage_mult = v,
            SkillEffect::HitCount(v) => out.hit_count = v,
            SkillEffect::GuaranteedCrit(on) => out.guaranteed_crit |= on,
            SkillEffect::IgnoreDef(v) => out.ignore_def += v,
            SkillEffect::Initiative(on) => out.initiative |= on,
            SkillEffect::Lifesteal(v) => out.lifesteal += v,
            SkillEffect::StunChance(v) => out.stun_chance += v,
            SkillEffect::AtkBoost(v) => out.atk_boost += v,
            SkillEffect::DefBoost(v) => out.def_boost += v,
            SkillEffect::AgiBoost(v) => out.agi_boost += v,
            SkillEffect::CriBoost(v) => out.cri_boost += v,
            SkillEffect::EvasionBoost(v) => out.evasion_boost += v,
            SkillEffect::DamageReduction(v) => out.damage_reduction += v,
            SkillEffect::HealPerRound(v) => out.heal_per_round += v,
            SkillEffect::Counter(v) => out.counter += v,
            SkillEffect::ShieldHp(v) => out.shield_hp += v,
            SkillEffect::KatanaTriggerBonus(v) => out.katana_trigger_bonus += v,
            SkillEffect::KatanaDamageBonus(v) => out.katana_damage_bonus += v,
            SkillEffect::RareEncounterBonus(v) => out.rare_encounter_bonus += v,
        }
    }

    for effect in mods.iter().flat_map(|m| m.effects.iter()) {
        match *effect {
            ModEffect::DamageMultBonus(v) => out.damage_mult += v,
            ModEffect::ExtraHit(v) => out.hit_count += v,
            ModEffect::CritBonus(v) => out.crit_bonus += v,
            ModEffect::TriggerBonus(v) => out.trigger_bonus += v,
            ModEffect::DelayReduction(v) => out.delay_reduction += v,
            ModEffect::StunBonus(v) => out.stun_chance += v,
            ModEffect::LifestealBonus(v) => out.lifesteal += v,
            ModEffect::IgnoreDefBonus(v) => out.ignore_def += v,
            ModEffect::ShieldBonus(v) => out.shield_hp += v,
            ModEffect::HealBonus(v) => out.heal_per_round += v,
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(effects: Vec<SkillEffect>) -> Skill {
        Skill {
            id: "horizontal".to_string(),
            name_cn: "水平斩".to_string(),
            name_jp: "ホリゾンタル".to_string(),
            color: None,
            weapon_type: Some("sword".to_string()),
            trigger_type: TriggerType::Probability,
            trigger_condition: None,
            trigger_chance: Some(20.0),
            post_motion_delay: Some(1.0),
            effects,
        }
    }

    fn module(id: &str, effects: Vec<ModEffect>) -> ModDef {
        ModDef {
            id: id.to_string(),
            name: id.to_string(),
            effects,
        }
    }

    #[test]
    fn test_defaults() {
        let parsed = parse_skill_effects(&skill(vec![]), &[]);
        assert_eq!(parsed.damage_mult, 1.0);
        assert_eq!(parsed.hit_count, 1);
        assert!(!parsed.guaranteed_crit);
    }

    #[test]
    fn test_damage_mult_last_write_wins() {
        let parsed = parse_skill_effects(
            &skill(vec![SkillEffect::DamageMult(1.5), SkillEffect::DamageMult(2.0)]),
            &[],
        );
        assert_eq!(parsed.damage_mult, 2.0);
    }

    #[test]
    fn test_additive_effects() {
        let parsed = parse_skill_effects(
            &skill(vec![
                SkillEffect::AtkBoost(2),
                SkillEffect::AtkBoost(1),
                SkillEffect::Lifesteal(0.1),
                SkillEffect::StunChance(15.0),
            ]),
            &[],
        );
        assert_eq!(parsed.atk_boost, 3);
        assert_eq!(parsed.lifesteal, 0.1);
        assert_eq!(parsed.stun_chance, 15.0);
    }

    #[test]
    fn test_mods_add_on_top() {
        let parsed = parse_skill_effects(
            &skill(vec![SkillEffect::DamageMult(1.5), SkillEffect::HitCount(2)]),
            &[
                module("sharp", vec![ModEffect::DamageMultBonus(0.2)]),
                module("twin", vec![ModEffect::ExtraHit(1), ModEffect::TriggerBonus(5.0)]),
                module("quick", vec![ModEffect::DelayReduction(0.5)]),
            ],
        );
        assert!((parsed.damage_mult - 1.7).abs() < 1e-9);
        assert_eq!(parsed.hit_count, 3);
        assert_eq!(parsed.trigger_bonus, 5.0);
        assert_eq!(parsed.delay_reduction, 0.5);
    }

    #[test]
    fn test_skill_json() {
        let json = r#"{
            "id": "sonic_leap",
            "nameCn": "音速冲击",
            "nameJp": "ソニックリープ",
            "color": "blue",
            "weaponType": "sword",
            "triggerType": "probability",
            "triggerChance": 25,
            "postMotionDelay": 1,
            "effects": [{"type": "damage_mult", "value": 1.8}, {"type": "hit_count", "value": 2}]
        }"#;
        let parsed: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.trigger_type, TriggerType::Probability);
        assert_eq!(parsed.trigger_chance, Some(25.0));
        assert_eq!(parsed.effects.len(), 2);
        assert_eq!(parsed.name(), "音速冲击");
    }

    #[test]
    fn test_condition_json_and_threshold() {
        let cond: TriggerCondition = serde_json::from_str(r#""hp_below_30""#).unwrap();
        assert_eq!(cond, TriggerCondition::HpBelow30);
        assert!(cond.is_met(0.29));
        assert!(!cond.is_met(0.3));
    }
}
