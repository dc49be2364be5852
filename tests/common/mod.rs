//! Common test utilities - fixtures for battle and skill tests

#![allow(dead_code)]

use skirmish::combat::effects::{InnateEffect, InnateKind};
use skirmish::combat::{BattleResult, Fighter, LogEntry, Stats};
use skirmish::skills::{
    build_skill_context, EquippedSkill, ModTable, Skill, SkillContext, SkillEffect, SkillEvent,
    TriggerCondition, TriggerType,
};

/// Fighter with explicit stats
pub fn fighter(name: &str, hp: i32, atk: i32, def: i32, agi: i32) -> Fighter {
    Fighter::new(name, hp, Stats::new(atk, def, agi, 10))
}

/// Attach innate effects to a fighter
pub fn with_innate(fighter: Fighter, kinds: Vec<InnateKind>) -> Fighter {
    let effects = kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| InnateEffect::new(&format!("innate_{}", i), "Innate", kind))
        .collect();
    fighter.with_innate(effects)
}

/// Fighter nobody can hit with constant dice
pub fn untouchable(name: &str, hp: i32) -> Fighter {
    with_innate(fighter(name, hp, 1, 0, 0), vec![InnateKind::EvasionBoost(100)])
}

fn skill(id: &str, trigger_type: TriggerType, effects: Vec<SkillEffect>) -> Skill {
    Skill {
        id: id.to_string(),
        name_cn: String::new(),
        name_jp: id.to_string(),
        color: None,
        weapon_type: None,
        trigger_type,
        trigger_condition: None,
        trigger_chance: None,
        post_motion_delay: None,
        effects,
    }
}

pub fn passive(id: &str, effects: Vec<SkillEffect>) -> Skill {
    skill(id, TriggerType::Passive, effects)
}

pub fn conditional(id: &str, condition: TriggerCondition, effects: Vec<SkillEffect>) -> Skill {
    let mut s = skill(id, TriggerType::Conditional, effects);
    s.trigger_condition = Some(condition);
    s
}

pub fn probability(id: &str, chance: f64, effects: Vec<SkillEffect>) -> Skill {
    let mut s = skill(id, TriggerType::Probability, effects);
    s.trigger_chance = Some(chance);
    s
}

/// Skill context from plain skills without mods
pub fn context(skills: Vec<Skill>, proficiency: u32) -> SkillContext {
    let equipped: Vec<_> = skills.into_iter().map(EquippedSkill::new).collect();
    build_skill_context(&equipped, &ModTable::new(), proficiency)
}

pub fn attacks(result: &BattleResult) -> Vec<&skirmish::combat::log::AttackEntry> {
    result
        .log
        .iter()
        .filter_map(|e| match e {
            LogEntry::Attack(a) => Some(a),
            _ => None,
        })
        .collect()
}

pub fn skill_attacks(result: &BattleResult) -> Vec<&skirmish::combat::log::SkillAttackEntry> {
    result
        .log
        .iter()
        .filter_map(|e| match e {
            LogEntry::SkillAttack(s) => Some(s),
            _ => None,
        })
        .collect()
}

pub fn count_events(result: &BattleResult, pred: impl Fn(&SkillEvent) -> bool) -> usize {
    result.skill_events.iter().filter(|e| pred(e)).count()
}
