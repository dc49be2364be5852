//! Boss special mechanics
//!
//! Pre-battle checks set transient multipliers on the player fighter:
//! - AGI penalty when the player is too slow
//! - Weapon affinity (immune, resist, weak) by equipped weapon type
//!
//! Weapon break is rolled per round after the boss lands a hit. The
//! persistent debuff is reported only; a collaborator applies it after
//! the battle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dice::Roller;
use super::log::{LogEntry, MechanicKind, MechanicNote};
use super::state::Fighter;

/// Slow fighters deal less skill damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgiPenalty {
    pub threshold: i32,
    pub damage_mult: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Weapon-type affinity lists and multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponAffinity {
    #[serde(default)]
    pub immune: Vec<String>,
    #[serde(default)]
    pub resist: Vec<String>,
    #[serde(default)]
    pub weak: Vec<String>,
    #[serde(default)]
    pub immune_mult: f64,
    #[serde(default = "default_resist_mult")]
    pub resist_mult: f64,
    #[serde(default = "default_weak_mult")]
    pub weak_mult: f64,
}

fn default_resist_mult() -> f64 {
    0.5
}

fn default_weak_mult() -> f64 {
    1.5
}

/// Chance to damage the player's weapon when the boss lands a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponBreak {
    /// Percent chance per round
    pub chance: f64,
    pub min_damage: i32,
    pub max_damage: i32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Post-battle debuff, applied by a collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentDebuff {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Boss mechanics descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialMechanics {
    #[serde(default)]
    pub agi_penalty: Option<AgiPenalty>,
    #[serde(default)]
    pub weapon_affinity: Option<WeaponAffinity>,
    #[serde(default)]
    pub weapon_break: Option<WeaponBreak>,
    #[serde(default)]
    pub persistent_debuff: Option<PersistentDebuff>,
}

/// Affinity class of a weapon type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affinity {
    Immune,
    Resist,
    Weak,
    Neutral,
}

impl WeaponAffinity {
    /// Classify a weapon type; immune wins over resist, resist over weak
    pub fn classify(&self, weapon_type: &str) -> Affinity {
        let listed = |list: &[String]| list.iter().any(|w| w.eq_ignore_ascii_case(weapon_type));
        if listed(&self.immune) {
            Affinity::Immune
        } else if listed(&self.resist) {
            Affinity::Resist
        } else if listed(&self.weak) {
            Affinity::Weak
        } else {
            Affinity::Neutral
        }
    }

    /// Multiplier for a class, `None` when neutral
    pub fn multiplier(&self, affinity: Affinity) -> Option<f64> {
        match affinity {
            Affinity::Immune => Some(self.immune_mult),
            Affinity::Resist => Some(self.resist_mult),
            Affinity::Weak => Some(self.weak_mult),
            Affinity::Neutral => None,
        }
    }
}

/// Run the pre-battle checks against the player.
///
/// Returns the updated fighter and the notes, which are also appended to
/// the log.
pub fn apply_special_mechanics(
    mut player: Fighter,
    mechanics: &SpecialMechanics,
    log: &mut Vec<LogEntry>,
) -> (Fighter, Vec<MechanicNote>) {
    let mut notes = Vec::new();

    if let Some(penalty) = &mechanics.agi_penalty {
        let triggered = player.stats.agi < penalty.threshold;
        let description = if triggered {
            player.agi_penalty_mult = Some(penalty.damage_mult);
            penalty.description.clone().unwrap_or_else(|| {
                format!(
                    "{} is too slow (AGI {} < {}): skill damage x{}",
                    player.name, player.stats.agi, penalty.threshold, penalty.damage_mult
                )
            })
        } else {
            format!(
                "{} keeps pace (AGI {} >= {})",
                player.name, player.stats.agi, penalty.threshold
            )
        };
        notes.push(MechanicNote {
            mechanic: MechanicKind::AgiPenalty,
            triggered,
            multiplier: triggered.then_some(penalty.damage_mult),
            description,
        });
    }

    if let (Some(affinity), Some(weapon_type)) = (&mechanics.weapon_affinity, player.weapon_type.clone()) {
        let class = affinity.classify(&weapon_type);
        if let Some(mult) = affinity.multiplier(class) {
            player.weapon_affinity_mult = Some(mult);
            notes.push(MechanicNote {
                mechanic: MechanicKind::WeaponAffinity,
                triggered: true,
                multiplier: Some(mult),
                description: format!("{} affinity {:?}: skill damage x{}", weapon_type, class, mult),
            });
        }
    }

    if let Some(wb) = &mechanics.weapon_break {
        notes.push(MechanicNote {
            mechanic: MechanicKind::WeaponBreak,
            triggered: false,
            multiplier: None,
            description: wb.description.clone().unwrap_or_else(|| {
                format!(
                    "Each landed boss hit has a {}% chance to deal {}-{} durability damage",
                    wb.chance, wb.min_damage, wb.max_damage
                )
            }),
        });
    }

    if let Some(debuff) = &mechanics.persistent_debuff {
        notes.push(MechanicNote {
            mechanic: MechanicKind::PersistentDebuff,
            triggered: false,
            multiplier: None,
            description: debuff
                .description
                .clone()
                .unwrap_or_else(|| format!("Defeat leaves a lasting mark: {}", debuff.name)),
        });
    }

    debug!(player = %player.name, notes = notes.len(), "special mechanics applied");
    log.extend(notes.iter().cloned().map(LogEntry::SpecialMechanic));
    (player, notes)
}

/// Roll weapon break after a round in which the boss landed a hit.
///
/// Returns the durability damage dealt this round (0 if none).
pub fn apply_per_round_mechanics(
    mechanics: &SpecialMechanics,
    durability_total: &mut i32,
    dice: &mut dyn Roller,
    log: &mut Vec<LogEntry>,
) -> i32 {
    let Some(wb) = &mechanics.weapon_break else {
        return 0;
    };
    if !dice.d100_check(wb.chance) {
        return 0;
    }
    let damage = dice.range_inclusive(wb.min_damage, wb.max_damage);
    *durability_total += damage;
    log.push(LogEntry::WeaponBreak {
        damage,
        total: *durability_total,
    });
    damage
}
