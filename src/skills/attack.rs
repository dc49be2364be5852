//! Skill attacks and skill connect
//!
//! A skill attack always lands. Its damage is `hit_count` independent
//! damage checks, each scaled by the skill multiplier, the stashed
//! conditional buff, the katana synergy and any boss multipliers. The
//! connect chain bonus and the defender's skill damage reduction apply to
//! the sum.

use tracing::trace;

use super::context::{effective_delay, SkillContext};
use crate::combat::damage::{dam_check_with, scale_damage};
use crate::combat::log::{InnateEvent, LogEntry, MechanicKind, SkillAttackEntry};
use crate::combat::{Combatant, Roller};
use crate::config::CombatConfig;

/// What happened in one skill attack
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillAttackOutcome {
    pub skill_id: String,
    pub hits: Vec<i32>,
    pub damage: i32,
    pub crit_count: u32,
    pub stunned: bool,
    pub lifesteal: i32,
}

/// Resolve the probability skill at `skill_idx` as the `chain`-th link.
///
/// A guaranteed crit, from the skill itself or a pending conditional buff,
/// does not lower CRI to 2. The first crit check of each hit succeeds
/// without a draw and later rerolls use the clamped CRI, so the reroll
/// loop still stops on its own well before `crit_loop_ceiling`.
///
/// Returns `None` when the attacker has no such skill.
pub fn process_skill_attack(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    skill_idx: usize,
    chain: u32,
    config: &CombatConfig,
    dice: &mut dyn Roller,
    log: &mut Vec<LogEntry>,
) -> Option<SkillAttackOutcome> {
    let ctx = attacker.skills.as_mut()?;
    let loaded = ctx.probabilities.get(skill_idx)?.clone();
    let buff = ctx.conditional_attack_buff.take();
    let katana_bonus = if ctx.katana_mastery_active && loaded.skill.is_katana() {
        ctx.katana_damage_bonus
    } else {
        0.0
    };
    let effects = &loaded.effects;

    let mut innate_events = Vec::new();
    let mut mult = effects.damage_mult;
    if let Some(b) = buff {
        mult *= b.damage_mult;
    }
    mult *= 1.0 + katana_bonus;
    if let Some(m) = attacker.fighter.agi_penalty_mult {
        mult *= m;
        innate_events.push(InnateEvent {
            source: MechanicKind::AgiPenalty,
            multiplier: m,
        });
    }
    if let Some(m) = attacker.fighter.weapon_affinity_mult {
        mult *= m;
        innate_events.push(InnateEvent {
            source: MechanicKind::WeaponAffinity,
            multiplier: m,
        });
    }

    let guaranteed = effects.guaranteed_crit || buff.is_some_and(|b| b.guaranteed_crit);
    let cri = (attacker.fighter.stats.cri - effects.crit_bonus).max(config.min_cri);
    let def = ((f64::from(defender.fighter.stats.def) * (1.0 - effects.ignore_def)).floor() as i32).max(0);

    let mut outcome = SkillAttackOutcome {
        skill_id: loaded.skill.id.clone(),
        ..Default::default()
    };
    for _ in 0..effects.hit_count {
        let roll = dam_check_with(
            attacker.fighter.stats.atk,
            cri,
            def,
            config.crit_loop_ceiling,
            guaranteed,
            dice,
        );
        outcome.crit_count += roll.crit_count;
        outcome.hits.push(scale_damage(roll.damage, mult));
    }

    let mut damage: i32 = outcome.hits.iter().sum();
    if chain > 0 {
        let bonus = 1.0 + f64::from(chain) * config.connect_damage_bonus;
        damage = (f64::from(damage) * bonus).floor() as i32;
    }

    outcome.stunned = dice.d100_check(effects.stun_chance);

    if effects.lifesteal > 0.0 {
        let amount = (f64::from(damage) * effects.lifesteal).floor() as i32;
        outcome.lifesteal = attacker.fighter.heal(amount);
    }

    let reduction = defender.skill_damage_reduction();
    if reduction > 0.0 && damage > 0 {
        damage = scale_damage(damage, 1.0 - reduction);
    }

    defender.take_damage(damage);
    outcome.damage = damage;

    trace!(
        attacker = attacker.name(),
        skill = %loaded.skill.id,
        chain,
        damage,
        "skill attack"
    );

    log.push(LogEntry::SkillAttack(SkillAttackEntry {
        attacker: attacker.fighter.name.clone(),
        defender: defender.fighter.name.clone(),
        skill_id: loaded.skill.id.clone(),
        skill_name: loaded.skill.name().to_string(),
        chain,
        hits: outcome.hits.clone(),
        crit_count: outcome.crit_count,
        damage,
        lifesteal: outcome.lifesteal,
        stunned: outcome.stunned,
        attacker_hp: attacker.fighter.hp,
        defender_hp: defender.fighter.hp,
        innate_events,
    }));

    Some(outcome)
}

/// Percent chance to connect out of the skill at `current`
pub fn connect_chance(ctx: &SkillContext, current: usize, config: &CombatConfig) -> Option<f64> {
    let delay = effective_delay(ctx.probabilities.get(current)?);
    let tiers = f64::from(ctx.proficiency / 100);
    Some(config.connect_base_chance + tiers * config.connect_prof_bonus_per_100 - delay * 10.0)
}

/// Try to chain from the skill at `current` into another probability skill.
///
/// `chain` is the number of connects already made. The next skill is
/// picked uniformly among the others without rolling its own trigger.
pub fn try_skill_connect(
    ctx: &SkillContext,
    current: usize,
    chain: u32,
    config: &CombatConfig,
    dice: &mut dyn Roller,
) -> Option<usize> {
    if chain >= config.connect_max_chain {
        return None;
    }
    let chance = connect_chance(ctx, current, config)?;
    if chance <= 0.0 || !dice.d100_check(chance) {
        return None;
    }
    let candidates: Vec<usize> = (0..ctx.probabilities.len()).filter(|&i| i != current).collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[dice.pick(candidates.len())])
}
