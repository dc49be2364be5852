//! Scenario files
//!
//! A scenario is a JSON document describing one battle: the mod table,
//! both sides and their loadouts. The CLI reads one, builds the fighters
//! and runs the battle.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battle::{run_battle, BattleKind, BattleSetup, DuelMode};
use crate::combat::builder::{
    build_ally, build_boss, build_enemy, build_pvp_contestant, BossData, PvpContestant, TitleModifiers,
    UnitData, WeaponData,
};
use crate::combat::{BattleResult, Roller};
use crate::config::CombatConfig;
use crate::error::{BuildError, ScenarioError};
use crate::skills::{build_skill_context, EquippedSkill, ModDef, ModTable, SkillContext};

/// Equipped skills and proficiency for one side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Loadout {
    pub skills: Vec<EquippedSkill>,
    pub proficiency: u32,
}

impl Loadout {
    /// `None` when nothing is equipped
    pub fn context(&self, mods: &ModTable) -> Option<SkillContext> {
        if self.skills.is_empty() {
            return None;
        }
        Some(build_skill_context(&self.skills, mods, self.proficiency))
    }
}

/// PvE battle: an ally against an enemy or a boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PveScenario {
    pub ally: UnitData,
    #[serde(default)]
    pub weapon: Option<WeaponData>,
    #[serde(default)]
    pub title: Option<TitleModifiers>,
    #[serde(default)]
    pub loadout: Loadout,
    #[serde(default)]
    pub enemy: Option<UnitData>,
    #[serde(default)]
    pub boss: Option<BossData>,
}

/// One duelist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duelist {
    pub contestant: PvpContestant,
    #[serde(default)]
    pub title: Option<TitleModifiers>,
    #[serde(default)]
    pub loadout: Loadout,
}

/// PvP duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PvpScenario {
    #[serde(default)]
    pub duel_mode: DuelMode,
    pub challenger: Duelist,
    pub defender: Duelist,
}

/// The battle a scenario describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioBattle {
    Pve(PveScenario),
    Pvp(PvpScenario),
}

/// A complete scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub mods: Vec<ModDef>,
    pub battle: ScenarioBattle,
}

impl Scenario {
    /// Parse a scenario from JSON text
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_json(&text)?;
        info!(path = %path.display(), "scenario loaded");
        Ok(scenario)
    }

    /// Build fighters and skill contexts for this scenario
    pub fn setup(&self, config: &CombatConfig) -> Result<BattleSetup, BuildError> {
        let mods = ModTable::from_defs(self.mods.iter().cloned());
        match &self.battle {
            ScenarioBattle::Pve(pve) => {
                let player = build_ally(&pve.ally, pve.weapon.as_ref(), pve.title.as_ref(), config)?;
                let (opponent, mechanics) = match (&pve.boss, &pve.enemy) {
                    (Some(boss), _) => build_boss(boss, config)?,
                    (None, Some(enemy)) => (build_enemy(enemy, config)?, None),
                    (None, None) => return Err(BuildError::MissingParticipant("an enemy or a boss")),
                };
                Ok(BattleSetup {
                    kind: BattleKind::Pve,
                    player,
                    player_skills: pve.loadout.context(&mods),
                    opponent,
                    opponent_skills: None,
                    mechanics,
                })
            }
            ScenarioBattle::Pvp(pvp) => {
                let challenger =
                    build_pvp_contestant(&pvp.challenger.contestant, pvp.challenger.title.as_ref(), config)?;
                let defender = build_pvp_contestant(&pvp.defender.contestant, pvp.defender.title.as_ref(), config)?;
                Ok(BattleSetup {
                    kind: BattleKind::Pvp(pvp.duel_mode),
                    player: challenger,
                    player_skills: pvp.challenger.loadout.context(&mods),
                    opponent: defender,
                    opponent_skills: pvp.defender.loadout.context(&mods),
                    mechanics: None,
                })
            }
        }
    }

    /// Build and run the battle
    pub fn run(&self, config: &CombatConfig, dice: &mut dyn Roller) -> Result<BattleResult, BuildError> {
        let setup = self.setup(config)?;
        Ok(run_battle(setup, config, dice))
    }
}
