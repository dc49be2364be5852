//! Battle log and result
//!
//! The log is a flat list of tagged entries consumed by settlement and
//! narration collaborators. Every entry renders to one line of text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::skills::SkillEvent;

/// Outcome from the player's (or challenger's) point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

/// Why a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A side reached 0 hp
    Defeat,
    /// Duel: cumulative damage crossed the first-strike share
    FirstStrike,
    /// Duel: hp fell to the half-loss share
    HalfLoss,
    /// Round limit reached with both sides standing
    RoundLimit,
}

/// Which boss mechanic a note refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanicKind {
    AgiPenalty,
    WeaponAffinity,
    WeaponBreak,
    PersistentDebuff,
}

/// Pre-battle record of a special mechanic check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicNote {
    pub mechanic: MechanicKind,
    pub triggered: bool,
    pub multiplier: Option<f64>,
    pub description: String,
}

/// Boss-imposed multiplier folded into a skill attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InnateEvent {
    pub source: MechanicKind,
    pub multiplier: f64,
}

/// One plain attacker -> defender exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackEntry {
    pub attacker: String,
    pub defender: String,
    pub hit: bool,
    pub text: String,
    pub atk_roll: i32,
    pub def_roll: i32,
    pub atk_act: i32,
    pub def_act: i32,
    pub damage: i32,
    pub crit_count: u32,
    pub lifesteal: i32,
    pub stunned: bool,
    pub counter_damage: i32,
    pub attacker_hp: i32,
    pub defender_hp: i32,
}

/// One skill attack, possibly a link in a connect chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAttackEntry {
    pub attacker: String,
    pub defender: String,
    pub skill_id: String,
    pub skill_name: String,
    /// 0 for the triggered skill, n for the n-th connect
    pub chain: u32,
    pub hits: Vec<i32>,
    pub crit_count: u32,
    pub damage: i32,
    pub lifesteal: i32,
    pub stunned: bool,
    pub attacker_hp: i32,
    pub defender_hp: i32,
    pub innate_events: Vec<InnateEvent>,
}

/// A battle log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    Round {
        round: u32,
    },
    Attack(AttackEntry),
    SkillAttack(SkillAttackEntry),
    Stun {
        fighter: String,
        by: String,
    },
    SpecialMechanic(MechanicNote),
    WeaponBreak {
        damage: i32,
        total: i32,
    },
    Heal {
        fighter: String,
        amount: i32,
        hp: i32,
    },
    End {
        outcome: Outcome,
        winner: Option<String>,
        rounds: u32,
        reason: EndReason,
    },
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Round { round } => write!(f, "-- Round {} --", round),
            LogEntry::Attack(a) if a.hit => {
                write!(
                    f,
                    "{} hits {} for {} damage ({} HP left)",
                    a.attacker, a.defender, a.damage, a.defender_hp
                )?;
                if a.crit_count > 0 {
                    write!(f, " [crit x{}]", a.crit_count)?;
                }
                if a.lifesteal > 0 {
                    write!(f, " [drains {}]", a.lifesteal)?;
                }
                if a.stunned {
                    write!(f, " [stun]")?;
                }
                if a.counter_damage > 0 {
                    write!(f, "; {} counters for {}", a.defender, a.counter_damage)?;
                }
                Ok(())
            }
            LogEntry::Attack(a) => write!(f, "{} attacks {}: {}", a.attacker, a.defender, a.text),
            LogEntry::SkillAttack(s) => {
                if s.chain > 0 {
                    write!(f, "Connect {}! ", s.chain)?;
                }
                write!(
                    f,
                    "{} uses {} on {}: {} hit(s) for {} damage ({} HP left)",
                    s.attacker,
                    s.skill_name,
                    s.defender,
                    s.hits.len(),
                    s.damage,
                    s.defender_hp
                )?;
                for event in &s.innate_events {
                    write!(f, " [{:?} x{}]", event.source, event.multiplier)?;
                }
                if s.stunned {
                    write!(f, " [stun]")?;
                }
                Ok(())
            }
            LogEntry::Stun { fighter, by } => {
                write!(f, "{} is stunned by {} and cannot act", fighter, by)
            }
            LogEntry::SpecialMechanic(note) => write!(f, "[{:?}] {}", note.mechanic, note.description),
            LogEntry::WeaponBreak { damage, total } => write!(
                f,
                "The weapon cracks: -{} durability ({} this battle)",
                damage, total
            ),
            LogEntry::Heal {
                fighter,
                amount,
                hp,
            } => write!(f, "{} recovers {} HP ({} HP)", fighter, amount, hp),
            LogEntry::End {
                winner: Some(name),
                rounds,
                reason,
                ..
            } => write!(f, "{} wins after {} round(s) ({:?})", name, rounds, reason),
            LogEntry::End { rounds, .. } => write!(f, "Draw after {} round(s)", rounds),
        }
    }
}

/// Everything a battle returns to its caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResult {
    pub log: Vec<LogEntry>,
    pub outcome: Outcome,
    #[serde(with = "flag")]
    pub win: bool,
    /// Player ended at 0 hp
    #[serde(with = "flag")]
    pub dead: bool,
    pub initial_hp: i32,
    pub final_hp: i32,
    pub opponent_final_hp: i32,
    pub rounds: u32,
    pub skill_events: Vec<SkillEvent>,
    /// Durability damage accumulated from weapon-break rolls
    pub weapon_durability_damage: i32,
    pub special_mechanics: Vec<MechanicNote>,
}

impl BattleResult {
    /// Plain-text rendering of the log, one entry per line
    pub fn narrate(&self) -> String {
        self.log
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The terminal `end` entry
    pub fn end_entry(&self) -> Option<&LogEntry> {
        self.log
            .iter()
            .rev()
            .find(|e| matches!(e, LogEntry::End { .. }))
    }
}

/// `win` and `dead` travel as 0/1 on the wire
mod flag {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(D::Error::invalid_value(Unexpected::Unsigned(u64::from(n)), &"0 or 1")),
        }
    }
}
