//! Battle orchestration
//!
//! One round loop serves PvE and PvP, with or without skills:
//! - Round start: conditional skills for both sides
//! - Initiative: skill initiative, then innate initiative, then d66 + AGI
//! - Each side acts once: a triggered skill (plus any connects) or a
//!   plain attack; a stunned second actor loses its action
//! - Round end: boss weapon-break roll, then skill heals
//!
//! Win conditions are checked after every individual attack. A fighter
//! without a skill context behaves exactly like one with an empty context.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::log::{BattleResult, EndReason, LogEntry, MechanicNote, Outcome};
use crate::combat::mechanics::{apply_per_round_mechanics, apply_special_mechanics, SpecialMechanics};
use crate::combat::{process_attack, Combatant, Fighter, Roller};
use crate::config::CombatConfig;
use crate::skills::{
    apply_end_of_round_effects, check_conditional_skills, process_skill_attack, roll_skill_trigger,
    try_skill_connect, SkillContext, SkillEvent,
};

/// PvP victory rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelMode {
    /// Only hp reaching 0 ends the duel early
    #[default]
    Standard,
    /// First side to take a share of its max hp loses
    FirstStrike,
    /// First side to fall to a share of its max hp loses
    HalfLoss,
}

impl DuelMode {
    fn end_reason(self) -> Option<EndReason> {
        match self {
            DuelMode::Standard => None,
            DuelMode::FirstStrike => Some(EndReason::FirstStrike),
            DuelMode::HalfLoss => Some(EndReason::HalfLoss),
        }
    }

    /// Whether `c` has lost under this mode's early-exit rule
    fn crossed(self, c: &Combatant, config: &CombatConfig) -> bool {
        let max_hp = f64::from(c.fighter.max_hp);
        match self {
            DuelMode::Standard => false,
            DuelMode::FirstStrike => f64::from(c.damage_taken) >= max_hp * config.first_strike_ratio,
            DuelMode::HalfLoss => f64::from(c.fighter.hp) <= max_hp * config.half_loss_ratio,
        }
    }
}

/// Which rule set a battle runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleKind {
    /// Round limit ends in a draw
    Pve,
    /// Round limit goes to the higher hp, ties to the challenger
    Pvp(DuelMode),
}

/// Everything one battle needs
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub kind: BattleKind,
    /// Player, ally or PvP challenger; the outcome is from this side
    pub player: Fighter,
    pub player_skills: Option<SkillContext>,
    pub opponent: Fighter,
    pub opponent_skills: Option<SkillContext>,
    /// Boss mechanics, applied against the player
    pub mechanics: Option<SpecialMechanics>,
}

impl BattleSetup {
    /// PvE setup without skills or mechanics
    pub fn pve(player: Fighter, opponent: Fighter) -> Self {
        Self {
            kind: BattleKind::Pve,
            player,
            player_skills: None,
            opponent,
            opponent_skills: None,
            mechanics: None,
        }
    }

    /// PvP setup without skills
    pub fn pvp(challenger: Fighter, defender: Fighter, mode: DuelMode) -> Self {
        Self {
            kind: BattleKind::Pvp(mode),
            ..Self::pve(challenger, defender)
        }
    }

    /// Attach the player's skills
    pub fn with_player_skills(mut self, ctx: SkillContext) -> Self {
        self.player_skills = Some(ctx);
        self
    }

    /// Attach the opponent's skills
    pub fn with_opponent_skills(mut self, ctx: SkillContext) -> Self {
        self.opponent_skills = Some(ctx);
        self
    }

    /// Attach boss mechanics
    pub fn with_mechanics(mut self, mechanics: SpecialMechanics) -> Self {
        self.mechanics = Some(mechanics);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Player,
    Opponent,
}

impl Side {
    fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Verdict {
    winner: Side,
    reason: EndReason,
}

#[derive(Debug, Default)]
struct Action {
    /// At least one attack connected
    landed: bool,
    stunned: bool,
    verdict: Option<Verdict>,
}

struct Battle<'a> {
    kind: BattleKind,
    config: &'a CombatConfig,
    log: Vec<LogEntry>,
    events: Vec<SkillEvent>,
}

/// Run a PvE battle: player (with optional skills) against an enemy or boss
pub fn run_pve(
    player: Fighter,
    player_skills: Option<SkillContext>,
    opponent: Fighter,
    mechanics: Option<SpecialMechanics>,
    config: &CombatConfig,
    dice: &mut dyn Roller,
) -> BattleResult {
    run_battle(
        BattleSetup {
            kind: BattleKind::Pve,
            player,
            player_skills,
            opponent,
            opponent_skills: None,
            mechanics,
        },
        config,
        dice,
    )
}

/// Run a PvP duel; the outcome is from the challenger's side
pub fn run_pvp(
    challenger: Fighter,
    challenger_skills: Option<SkillContext>,
    defender: Fighter,
    defender_skills: Option<SkillContext>,
    mode: DuelMode,
    config: &CombatConfig,
    dice: &mut dyn Roller,
) -> BattleResult {
    run_battle(
        BattleSetup {
            kind: BattleKind::Pvp(mode),
            player: challenger,
            player_skills: challenger_skills,
            opponent: defender,
            opponent_skills: defender_skills,
            mechanics: None,
        },
        config,
        dice,
    )
}

/// Resolve a battle to completion
pub fn run_battle(setup: BattleSetup, config: &CombatConfig, dice: &mut dyn Roller) -> BattleResult {
    let mut battle = Battle {
        kind: setup.kind,
        config,
        log: Vec::new(),
        events: Vec::new(),
    };
    battle.run(setup, dice)
}

impl Battle<'_> {
    fn run(&mut self, setup: BattleSetup, dice: &mut dyn Roller) -> BattleResult {
        let min_cri = self.config.min_cri;
        let mut player = Combatant::prepare(setup.player, setup.player_skills, min_cri, &mut self.events);
        let mut opponent = Combatant::prepare(setup.opponent, setup.opponent_skills, min_cri, &mut self.events);

        let mut notes: Vec<MechanicNote> = Vec::new();
        if let Some(mechanics) = &setup.mechanics {
            let (fighter, applied) = apply_special_mechanics(player.fighter.clone(), mechanics, &mut self.log);
            player.fighter = fighter;
            notes = applied;
        }

        debug!(
            player = player.name(),
            opponent = opponent.name(),
            kind = ?self.kind,
            player_hp = player.fighter.hp,
            opponent_hp = opponent.fighter.hp,
            "battle start"
        );

        let initial_hp = player.fighter.hp;
        let mut durability = 0;
        let mut rounds = 0;
        let mut verdict = already_decided(&player, &opponent);

        if verdict.is_none() {
            for round in 1..=self.config.round_limit {
                rounds = round;
                verdict = self.play_round(
                    round,
                    &mut player,
                    &mut opponent,
                    setup.mechanics.as_ref(),
                    &mut durability,
                    dice,
                );
                if verdict.is_some() {
                    break;
                }
            }
        }

        let (outcome, winner, reason) = match verdict {
            Some(v) => {
                let outcome = match v.winner {
                    Side::Player => Outcome::Win,
                    Side::Opponent => Outcome::Lose,
                };
                (outcome, Some(v.winner), v.reason)
            }
            None => self.round_limit_outcome(&player, &opponent),
        };
        let winner = winner.map(|side| match side {
            Side::Player => player.fighter.name.clone(),
            Side::Opponent => opponent.fighter.name.clone(),
        });

        debug!(?outcome, ?reason, rounds, winner = ?winner, "battle end");
        self.log.push(LogEntry::End {
            outcome,
            winner,
            rounds,
            reason,
        });

        BattleResult {
            log: std::mem::take(&mut self.log),
            outcome,
            win: outcome == Outcome::Win,
            dead: player.is_defeated(),
            initial_hp,
            final_hp: player.fighter.hp,
            opponent_final_hp: opponent.fighter.hp,
            rounds,
            skill_events: std::mem::take(&mut self.events),
            weapon_durability_damage: durability,
            special_mechanics: notes,
        }
    }

    fn play_round(
        &mut self,
        round: u32,
        player: &mut Combatant,
        opponent: &mut Combatant,
        mechanics: Option<&SpecialMechanics>,
        durability: &mut i32,
        dice: &mut dyn Roller,
    ) -> Option<Verdict> {
        self.log.push(LogEntry::Round { round });
        self.check_conditionals(player, round);
        self.check_conditionals(opponent, round);

        let first = initiative(player, opponent, dice);
        let mut opponent_landed = false;

        let (a, b) = ordered(first, player, opponent);
        let action = self.act(first, a, b, dice);
        opponent_landed |= first == Side::Opponent && action.landed;
        if action.verdict.is_some() {
            return action.verdict;
        }

        if action.stunned {
            self.log.push(LogEntry::Stun {
                fighter: b.fighter.name.clone(),
                by: a.fighter.name.clone(),
            });
        } else {
            let second = first.other();
            let (a, b) = ordered(second, player, opponent);
            let action = self.act(second, a, b, dice);
            opponent_landed |= second == Side::Opponent && action.landed;
            if action.verdict.is_some() {
                return action.verdict;
            }
        }

        if opponent_landed {
            if let Some(m) = mechanics {
                apply_per_round_mechanics(m, durability, dice, &mut self.log);
            }
        }
        self.end_of_round(player);
        self.end_of_round(opponent);
        None
    }

    fn check_conditionals(&mut self, c: &mut Combatant, round: u32) {
        let Combatant { fighter, skills, .. } = c;
        if let Some(ctx) = skills.as_mut() {
            let min_cri = self.config.min_cri;
            *fighter = check_conditional_skills(fighter.clone(), ctx, min_cri, round, &mut self.events);
        }
    }

    fn end_of_round(&mut self, c: &mut Combatant) {
        let Combatant { fighter, skills, .. } = c;
        if let Some(ctx) = skills.as_ref() {
            apply_end_of_round_effects(fighter, ctx, &mut self.events, &mut self.log);
        }
    }

    /// One side's action: a triggered skill with its connects, or a plain attack
    fn act(
        &mut self,
        side: Side,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        dice: &mut dyn Roller,
    ) -> Action {
        let mut action = Action::default();
        let mut triggered = None;
        if let Some(ctx) = attacker.skills.as_ref() {
            if let Some(idx) = roll_skill_trigger(ctx, dice) {
                let loaded = &ctx.probabilities[idx];
                self.events.push(SkillEvent::SkillTriggered {
                    fighter: attacker.fighter.name.clone(),
                    skill_id: loaded.skill.id.clone(),
                    chance: ctx.effective_trigger_chance(loaded),
                });
                triggered = Some(idx);
            }
        }

        let Some(mut current) = triggered else {
            let outcome = process_attack(attacker, defender, self.config, dice, &mut self.log);
            action.landed = outcome.hit;
            action.stunned = outcome.stunned;
            action.verdict = self.verdict(side, attacker, defender);
            return action;
        };

        let mut chain = 0;
        loop {
            if let Some(outcome) =
                process_skill_attack(attacker, defender, current, chain, self.config, dice, &mut self.log)
            {
                action.landed = true;
                action.stunned |= outcome.stunned;
            }
            action.verdict = self.verdict(side, attacker, defender);
            if action.verdict.is_some() {
                return action;
            }

            let Some(ctx) = attacker.skills.as_ref() else {
                break;
            };
            let Some(next) = try_skill_connect(ctx, current, chain, self.config, dice) else {
                break;
            };
            chain += 1;
            self.events.push(SkillEvent::SkillConnect {
                fighter: attacker.fighter.name.clone(),
                from: ctx.probabilities[current].skill.id.clone(),
                to: ctx.probabilities[next].skill.id.clone(),
                chain,
            });
            current = next;
        }
        action
    }

    /// Win check after a single attack by `side`
    fn verdict(&self, side: Side, attacker: &Combatant, defender: &Combatant) -> Option<Verdict> {
        let win = |winner, reason| Some(Verdict { winner, reason });
        if defender.is_defeated() {
            return win(side, EndReason::Defeat);
        }
        if attacker.is_defeated() {
            return win(side.other(), EndReason::Defeat);
        }
        let BattleKind::Pvp(mode) = self.kind else {
            return None;
        };
        let reason = mode.end_reason()?;
        if mode.crossed(defender, self.config) {
            win(side, reason)
        } else if mode.crossed(attacker, self.config) {
            win(side.other(), reason)
        } else {
            None
        }
    }

    fn round_limit_outcome(&self, player: &Combatant, opponent: &Combatant) -> (Outcome, Option<Side>, EndReason) {
        match self.kind {
            BattleKind::Pve => (Outcome::Draw, None, EndReason::RoundLimit),
            BattleKind::Pvp(_) if player.fighter.hp >= opponent.fighter.hp => {
                (Outcome::Win, Some(Side::Player), EndReason::RoundLimit)
            }
            BattleKind::Pvp(_) => (Outcome::Lose, Some(Side::Opponent), EndReason::RoundLimit),
        }
    }
}

/// A side that enters at 0 hp loses before round 1
fn already_decided(player: &Combatant, opponent: &Combatant) -> Option<Verdict> {
    let loser = if player.is_defeated() {
        Side::Player
    } else if opponent.is_defeated() {
        Side::Opponent
    } else {
        return None;
    };
    Some(Verdict {
        winner: loser.other(),
        reason: EndReason::Defeat,
    })
}

/// Who acts first this round
fn initiative(player: &Combatant, opponent: &Combatant, dice: &mut dyn Roller) -> Side {
    if player.skill_initiative() {
        return Side::Player;
    }
    if opponent.skill_initiative() {
        return Side::Opponent;
    }
    if player.innate.initiative {
        return Side::Player;
    }
    if opponent.innate.initiative {
        return Side::Opponent;
    }
    let p = dice.d66() + player.fighter.stats.agi;
    let o = dice.d66() + opponent.fighter.stats.agi;
    if p >= o {
        Side::Player
    } else {
        Side::Opponent
    }
}

/// (actor, target) for the given acting side
fn ordered<'c>(
    side: Side,
    player: &'c mut Combatant,
    opponent: &'c mut Combatant,
) -> (&'c mut Combatant, &'c mut Combatant) {
    match side {
        Side::Player => (player, opponent),
        Side::Opponent => (opponent, player),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::dice::ScriptedRoller;
    use crate::combat::effects::{InnateEffect, InnateKind};
    use crate::combat::Stats;

    fn fighter(name: &str, hp: i32, stats: Stats) -> Fighter {
        Fighter::new(name, hp, stats)
    }

    #[test]
    fn test_initiative_order() {
        let config = CombatConfig::default();
        let quick = Combatant::prepare(
            fighter("Quick", 10, Stats::new(1, 0, 0, 10))
                .with_innate(vec![InnateEffect::new("first", "First", InnateKind::Initiative(true))]),
            None,
            config.min_cri,
            &mut Vec::new(),
        );
        let slow = Combatant::prepare(fighter("Slow", 10, Stats::new(1, 0, 9, 10)), None, 5, &mut Vec::new());

        let mut dice = ScriptedRoller::constant(0.5);
        assert_eq!(initiative(&slow, &quick, &mut dice), Side::Opponent);
        assert_eq!(dice.draws(), 0);
        assert_eq!(initiative(&slow, &slow.clone(), &mut dice), Side::Player);
        assert_eq!(dice.draws(), 4);
    }

    #[test]
    fn test_dead_on_arrival() {
        let mut player = fighter("Ghost", 10, Stats::default());
        player.hp = 0;
        let mut dice = ScriptedRoller::constant(0.5);
        let result = run_battle(
            BattleSetup::pve(player, fighter("Rat", 5, Stats::default())),
            &CombatConfig::default(),
            &mut dice,
        );
        assert_eq!(result.outcome, Outcome::Lose);
        assert_eq!(result.rounds, 0);
        assert!(result.dead);
        assert_eq!(dice.draws(), 0);
    }

    #[test]
    fn test_first_actor_kill_ends_round() {
        // both d66 = 8; player AGI wins initiative, 3 atk d66s vs 0 def
        let player = fighter("Kirito", 50, Stats::new(3, 0, 5, 10));
        let rat = fighter("Rat", 10, Stats::new(1, 0, 0, 10));
        let mut dice = ScriptedRoller::constant(0.5);
        let result = run_battle(BattleSetup::pve(player, rat), &CombatConfig::default(), &mut dice);

        assert!(result.win);
        assert_eq!(result.rounds, 1);
        assert_eq!(result.final_hp, 50);
        assert_eq!(result.opponent_final_hp, 0);
        let attacks = result.log.iter().filter(|e| matches!(e, LogEntry::Attack(_))).count();
        assert_eq!(attacks, 1);
    }

    #[test]
    fn test_pvp_round_limit_tie_goes_to_challenger() {
        let config = CombatConfig {
            round_limit: 2,
            ..CombatConfig::default()
        };
        // zero atk vs zero atk: every hit deals the floor of 1
        let a = fighter("Challenger", 20, Stats::new(0, 0, 0, 10));
        let b = fighter("Defender", 20, Stats::new(0, 0, 0, 10));
        let mut dice = ScriptedRoller::constant(0.5);
        let result = run_battle(BattleSetup::pvp(a, b, DuelMode::Standard), &config, &mut dice);
        assert_eq!(result.final_hp, result.opponent_final_hp);
        assert_eq!(result.outcome, Outcome::Win);
        assert!(matches!(
            result.end_entry(),
            Some(LogEntry::End {
                reason: EndReason::RoundLimit,
                ..
            })
        ));
    }
}
