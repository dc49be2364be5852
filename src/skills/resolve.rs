//! Skill resolution between attacks
//!
//! Passive skills apply once at battle start, conditional skills are
//! checked at the start of every round and fire at most once, probability
//! skills are rolled before each action, and heal-per-round runs after
//! both sides have acted.

use tracing::debug;

use super::context::{AttackBuff, SkillContext, SkillEvent};
use crate::combat::{Fighter, LogEntry, Roller, StatBoost};

/// Apply every passive skill and return the boosted fighter.
///
/// Boosts are summed first and applied to the stats once; shield hp is
/// added to current hp.
pub fn apply_passive_skills(
    fighter: Fighter,
    ctx: &mut SkillContext,
    min_cri: i32,
    events: &mut Vec<SkillEvent>,
) -> Fighter {
    let passives = ctx.passives.clone();
    let mut boost = StatBoost::default();

    for loaded in &passives {
        ctx.absorb(&loaded.effects);
        boost = boost.plus(loaded.effects.stat_boost());
        events.push(SkillEvent::PassiveApplied {
            fighter: fighter.name.clone(),
            skill_id: loaded.skill.id.clone(),
            skill_name: loaded.skill.name().to_string(),
        });
    }

    let stats = fighter.stats.boosted(boost, min_cri);
    let mut fighter = fighter.with_stats(stats);
    fighter.hp += ctx.shield_hp;
    fighter
}

/// Fire every conditional skill whose hp threshold is newly met.
///
/// Each conditional fires at most once per battle. A skill that grants a
/// damage multiplier above 1 or a guaranteed crit stashes it for the next
/// skill attack.
pub fn check_conditional_skills(
    mut fighter: Fighter,
    ctx: &mut SkillContext,
    min_cri: i32,
    round: u32,
    events: &mut Vec<SkillEvent>,
) -> Fighter {
    let ratio = fighter.hp_ratio();

    let ready: Vec<_> = ctx
        .conditionals
        .iter()
        .filter(|l| !ctx.conditional_activated.contains(&l.skill.id))
        .filter(|l| l.skill.trigger_condition.is_some_and(|c| c.is_met(ratio)))
        .cloned()
        .collect();

    for loaded in ready {
        let effects = &loaded.effects;
        ctx.conditional_activated.insert(loaded.skill.id.clone());
        ctx.absorb(effects);

        let stats = fighter.stats.boosted(effects.stat_boost(), min_cri);
        fighter = fighter.with_stats(stats);
        fighter.hp += effects.shield_hp;

        if effects.damage_mult > 1.0 || effects.guaranteed_crit {
            let buff = match ctx.conditional_attack_buff {
                Some(prev) => AttackBuff {
                    damage_mult: prev.damage_mult * effects.damage_mult,
                    guaranteed_crit: prev.guaranteed_crit || effects.guaranteed_crit,
                },
                None => AttackBuff {
                    damage_mult: effects.damage_mult,
                    guaranteed_crit: effects.guaranteed_crit,
                },
            };
            ctx.conditional_attack_buff = Some(buff);
        }

        debug!(fighter = %fighter.name, skill = %loaded.skill.id, round, "conditional skill activated");
        events.push(SkillEvent::ConditionalActivated {
            fighter: fighter.name.clone(),
            skill_id: loaded.skill.id.clone(),
            skill_name: loaded.skill.name().to_string(),
            round,
        });
    }

    fighter
}

/// Roll probability skills in equip order; the first success fires.
///
/// Returns the index into `ctx.probabilities`.
pub fn roll_skill_trigger(ctx: &SkillContext, dice: &mut dyn Roller) -> Option<usize> {
    ctx.probabilities
        .iter()
        .position(|loaded| dice.d100_check(ctx.effective_trigger_chance(loaded)))
}

/// Heal-per-round at the end of a round
pub fn apply_end_of_round_effects(
    fighter: &mut Fighter,
    ctx: &SkillContext,
    events: &mut Vec<SkillEvent>,
    log: &mut Vec<LogEntry>,
) -> i32 {
    if ctx.heal_per_round <= 0.0 || fighter.is_defeated() {
        return 0;
    }
    let amount = ((f64::from(fighter.max_hp) * ctx.heal_per_round / 100.0).floor() as i32).max(1);
    let healed = fighter.heal(amount);
    events.push(SkillEvent::Heal {
        fighter: fighter.name.clone(),
        amount: healed,
    });
    log.push(LogEntry::Heal {
        fighter: fighter.name.clone(),
        amount: healed,
        hp: fighter.hp,
    });
    healed
}
