//! Attack resolution
//!
//! Handles the atomic attacker -> defender exchange:
//! - Hit check (2d6 + AGI against 2d6 + AGI, natural 12 always hits)
//! - Damage check (ATK d66s against DEF d66s with open-ended crit rerolls)
//! - Innate modifiers: damage mult, ignore DEF, damage reduction,
//!   lifesteal, stun and counter

use tracing::trace;

use super::dice::{is_natural_max, Roller};
use super::log::{AttackEntry, LogEntry};
use super::state::Combatant;
use crate::config::CombatConfig;

/// Result of a hit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitCheck {
    pub success: bool,
    pub text: String,
    pub atk_roll: i32,
    pub def_roll: i32,
    pub atk_act: i32,
    pub def_act: i32,
}

/// Roll to hit. `def_agi` already includes any evasion.
pub fn hit_check(atk_agi: i32, def_agi: i32, dice: &mut dyn Roller) -> HitCheck {
    let atk_roll = dice.d66();
    let def_roll = dice.d66();
    let atk_act = atk_roll + atk_agi;
    let def_act = def_roll + def_agi;

    let (success, text) = if is_natural_max(atk_roll) {
        (true, "critical success (natural 12)".to_string())
    } else if atk_act >= def_act {
        (true, format!("hit ({} vs {})", atk_act, def_act))
    } else {
        (false, format!("miss ({} vs {})", atk_act, def_act))
    };

    HitCheck {
        success,
        text,
        atk_roll,
        def_roll,
        atk_act,
        def_act,
    }
}

/// Result of a damage check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageCheck {
    /// Final damage, at least 1
    pub damage: i32,
    pub attack_total: i32,
    pub defense_total: i32,
    pub crit_count: u32,
}

/// Roll damage: `atk` d66s plus crit rerolls against `def` d66s.
///
/// Each crit check draws a d66; at or above `cri` it adds one more d66 to
/// the attack and checks again. `ceiling` only guards against a
/// degenerate threshold.
pub fn dam_check(atk: i32, cri: i32, def: i32, ceiling: u32, dice: &mut dyn Roller) -> DamageCheck {
    dam_check_with(atk, cri, def, ceiling, false, dice)
}

/// Damage check where `guaranteed` makes the first crit check succeed
/// without a draw; further rerolls use `cri` as usual.
pub fn dam_check_with(
    atk: i32,
    cri: i32,
    def: i32,
    ceiling: u32,
    guaranteed: bool,
    dice: &mut dyn Roller,
) -> DamageCheck {
    let mut attack_total: i32 = (0..atk.max(0)).map(|_| dice.d66()).sum();
    let defense_total: i32 = (0..def.max(0)).map(|_| dice.d66()).sum();

    let mut crit_count = 0;
    if guaranteed && ceiling > 0 {
        attack_total += dice.d66();
        crit_count += 1;
    }
    while crit_count < ceiling && dice.d66() >= cri {
        attack_total += dice.d66();
        crit_count += 1;
    }

    DamageCheck {
        damage: (attack_total - defense_total).max(1),
        attack_total,
        defense_total,
        crit_count,
    }
}

/// Scale damage and keep it at least 1
pub fn scale_damage(damage: i32, mult: f64) -> i32 {
    ((f64::from(damage) * mult).floor() as i32).max(1)
}

/// What happened in one plain attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackOutcome {
    pub hit: bool,
    pub damage: i32,
    /// The defender loses its retaliation this round
    pub stunned: bool,
    pub lifesteal: i32,
    pub counter_damage: i32,
}

/// Resolve one plain attack and append its log entry
pub fn process_attack(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    config: &CombatConfig,
    dice: &mut dyn Roller,
    log: &mut Vec<LogEntry>,
) -> AttackOutcome {
    let def_agi = defender.fighter.stats.agi + defender.evasion();
    let check = hit_check(attacker.fighter.stats.agi, def_agi, dice);
    let mut outcome = AttackOutcome::default();
    let mut crit_count = 0;

    if check.success {
        outcome.hit = true;

        let ignore = attacker.innate.ignore_def;
        let def = ((f64::from(defender.fighter.stats.def) * (1.0 - ignore)).floor() as i32).max(0);
        let roll = dam_check(
            attacker.fighter.stats.atk,
            attacker.fighter.stats.cri,
            def,
            config.crit_loop_ceiling,
            dice,
        );
        crit_count = roll.crit_count;

        let mut damage = roll.damage;
        if attacker.innate.damage_mult != 1.0 {
            damage = scale_damage(damage, attacker.innate.damage_mult);
        }
        if defender.innate.damage_reduction > 0.0 {
            damage = scale_damage(damage, 1.0 - defender.innate.damage_reduction);
        }

        defender.take_damage(damage);
        outcome.damage = damage;

        if attacker.innate.lifesteal > 0.0 {
            let amount = (f64::from(damage) * attacker.innate.lifesteal).floor() as i32;
            outcome.lifesteal = attacker.fighter.heal(amount);
        }

        outcome.stunned = dice.d100_check(attacker.innate.stun_chance);

        if !defender.is_defeated() && !outcome.stunned && dice.d100_check(defender.counter_chance()) {
            let counter = scale_damage(damage, config.counter_rate);
            attacker.take_damage(counter);
            outcome.counter_damage = counter;
        }
    }

    trace!(
        attacker = attacker.name(),
        defender = defender.name(),
        hit = outcome.hit,
        damage = outcome.damage,
        "plain attack"
    );

    log.push(LogEntry::Attack(AttackEntry {
        attacker: attacker.fighter.name.clone(),
        defender: defender.fighter.name.clone(),
        hit: outcome.hit,
        text: check.text,
        atk_roll: check.atk_roll,
        def_roll: check.def_roll,
        atk_act: check.atk_act,
        def_act: check.def_act,
        damage: outcome.damage,
        crit_count,
        lifesteal: outcome.lifesteal,
        stunned: outcome.stunned,
        counter_damage: outcome.counter_damage,
        attacker_hp: attacker.fighter.hp,
        defender_hp: defender.fighter.hp,
    }));

    outcome
}
