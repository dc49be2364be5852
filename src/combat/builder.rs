//! Fighter builder
//!
//! Assembles combat-ready fighters from caller data:
//! - PvE ally (or player) plus an optional weapon
//! - PvP contestant with level scaling
//! - Enemy NPC
//! - Boss with its activated phases and special mechanics
//!
//! Title modifiers are multiplicative and applied after every additive
//! source. This is the only place input is validated.

use serde::{Deserialize, Serialize};

use super::effects::InnateEffect;
use super::mechanics::SpecialMechanics;
use super::state::{Fighter, Stats};
use crate::config::CombatConfig;
use crate::error::BuildError;

/// Weapon stat block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponData {
    pub name: String,
    #[serde(default)]
    pub weapon_type: Option<String>,
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub agi: i32,
    #[serde(default)]
    pub cri: Option<i32>,
    #[serde(default)]
    pub innate_effects: Vec<InnateEffect>,
}

/// Base stats of an ally, player character or enemy NPC
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitData {
    pub name: String,
    pub hp: i32,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub agi: i32,
    #[serde(default)]
    pub cri: Option<i32>,
}

/// Duel participant; stats come from the weapon and level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PvpContestant {
    pub name: String,
    pub level: u32,
    pub weapon: WeaponData,
}

/// One boss phase; only `active` phases contribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BossPhase {
    pub name: String,
    pub active: bool,
    pub hp_bonus: i32,
    pub atk_bonus: i32,
    pub def_bonus: i32,
    pub agi_bonus: i32,
    /// Lowers the crit threshold
    pub cri_bonus: i32,
}

/// Raid boss definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossData {
    pub name: String,
    pub hp: i32,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub agi: i32,
    #[serde(default)]
    pub cri: Option<i32>,
    #[serde(default)]
    pub special_mechanics: Option<SpecialMechanics>,
    #[serde(default)]
    pub phases: Vec<BossPhase>,
}

/// Multiplicative title bonuses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleModifiers {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub agi: f64,
}

impl Default for TitleModifiers {
    fn default() -> Self {
        Self {
            hp: 1.0,
            atk: 1.0,
            def: 1.0,
            agi: 1.0,
        }
    }
}

impl TitleModifiers {
    fn validate(&self, fighter: &str) -> Result<(), BuildError> {
        for (field, value) in [("hp", self.hp), ("atk", self.atk), ("def", self.def), ("agi", self.agi)] {
            if value <= 0.0 || !value.is_finite() {
                return Err(BuildError::InvalidMultiplier {
                    fighter: fighter.to_string(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    fn scale(value: i32, mult: f64) -> i32 {
        (f64::from(value) * mult).floor() as i32
    }
}

/// Raw totals gathered from every source before validation
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    hp: i32,
    atk: i32,
    def: i32,
    agi: i32,
    cri: Option<i32>,
}

impl Totals {
    fn with_weapon(mut self, weapon: &WeaponData) -> Self {
        self.hp += weapon.hp;
        self.atk += weapon.atk;
        self.def += weapon.def;
        self.agi += weapon.agi;
        // Weapon cri replaces the base threshold when both are given.
        if weapon.cri.is_some() {
            self.cri = weapon.cri;
        }
        self
    }

    fn with_title(self, title: Option<&TitleModifiers>) -> Self {
        let Some(t) = title else {
            return self;
        };
        Self {
            hp: TitleModifiers::scale(self.hp, t.hp),
            atk: TitleModifiers::scale(self.atk, t.atk),
            def: TitleModifiers::scale(self.def, t.def),
            agi: TitleModifiers::scale(self.agi, t.agi),
            cri: self.cri,
        }
    }

    fn into_fighter(self, name: &str, config: &CombatConfig) -> Result<Fighter, BuildError> {
        if name.trim().is_empty() {
            return Err(BuildError::MissingName);
        }
        if self.hp <= 0 {
            return Err(BuildError::NonPositiveHp {
                fighter: name.to_string(),
                hp: self.hp,
            });
        }
        for (field, value) in [("atk", self.atk), ("def", self.def), ("agi", self.agi)] {
            if value < 0 {
                return Err(BuildError::NegativeStat {
                    fighter: name.to_string(),
                    field,
                    value,
                });
            }
        }
        let cri = self.cri.unwrap_or(config.default_cri).max(config.min_cri);
        Ok(Fighter::new(name, self.hp, Stats::new(self.atk, self.def, self.agi, cri)))
    }
}

fn unit_totals(unit: &UnitData) -> Totals {
    Totals {
        hp: unit.hp,
        atk: unit.atk,
        def: unit.def,
        agi: unit.agi,
        cri: unit.cri,
    }
}

fn attach_weapon(fighter: Fighter, weapon: Option<&WeaponData>) -> Fighter {
    match weapon {
        Some(w) => {
            let fighter = fighter.with_innate(w.innate_effects.clone());
            match &w.weapon_type {
                Some(t) => fighter.with_weapon_type(t.clone()),
                None => fighter,
            }
        }
        None => fighter,
    }
}

/// Build a PvE ally (or player) with an optional weapon and title
pub fn build_ally(
    unit: &UnitData,
    weapon: Option<&WeaponData>,
    title: Option<&TitleModifiers>,
    config: &CombatConfig,
) -> Result<Fighter, BuildError> {
    if let Some(t) = title {
        t.validate(&unit.name)?;
    }
    let mut totals = unit_totals(unit);
    if let Some(w) = weapon {
        totals = totals.with_weapon(w);
    }
    let fighter = totals.with_title(title).into_fighter(&unit.name, config)?;
    Ok(attach_weapon(fighter, weapon))
}

/// Build an ordinary enemy NPC
pub fn build_enemy(unit: &UnitData, config: &CombatConfig) -> Result<Fighter, BuildError> {
    unit_totals(unit).into_fighter(&unit.name, config)
}

/// Build a PvP contestant: base hp plus per-level hp, stats from the
/// weapon plus one point per `pvp_levels_per_stat` levels
pub fn build_pvp_contestant(
    contestant: &PvpContestant,
    title: Option<&TitleModifiers>,
    config: &CombatConfig,
) -> Result<Fighter, BuildError> {
    if let Some(t) = title {
        t.validate(&contestant.name)?;
    }
    let level = i32::try_from(contestant.level).unwrap_or(i32::MAX);
    let per_stat = i32::try_from(config.pvp_levels_per_stat.max(1)).unwrap_or(i32::MAX);
    let level_stat = level / per_stat;
    let base = Totals {
        hp: config.pvp_base_hp.saturating_add(level.saturating_mul(config.pvp_hp_per_level)),
        atk: level_stat,
        def: level_stat,
        agi: level_stat,
        cri: None,
    };
    let fighter = base
        .with_weapon(&contestant.weapon)
        .with_title(title)
        .into_fighter(&contestant.name, config)?;
    Ok(attach_weapon(fighter, Some(&contestant.weapon)))
}

/// Build a boss with every active phase applied.
///
/// Returns the fighter and its special mechanics, if any.
pub fn build_boss(
    boss: &BossData,
    config: &CombatConfig,
) -> Result<(Fighter, Option<SpecialMechanics>), BuildError> {
    let mut totals = Totals {
        hp: boss.hp,
        atk: boss.atk,
        def: boss.def,
        agi: boss.agi,
        cri: boss.cri,
    };
    let mut cri_bonus = 0;
    for phase in boss.phases.iter().filter(|p| p.active) {
        totals.hp += phase.hp_bonus;
        totals.atk += phase.atk_bonus;
        totals.def += phase.def_bonus;
        totals.agi += phase.agi_bonus;
        cri_bonus += phase.cri_bonus;
    }
    totals.cri = Some(totals.cri.unwrap_or(config.default_cri) - cri_bonus);
    let fighter = totals.into_fighter(&boss.name, config)?;
    Ok((fighter, boss.special_mechanics.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::effects::InnateKind;

    fn unit(name: &str, hp: i32, atk: i32, def: i32, agi: i32) -> UnitData {
        UnitData {
            name: name.to_string(),
            hp,
            atk,
            def,
            agi,
            cri: None,
        }
    }

    fn sword() -> WeaponData {
        WeaponData {
            name: "Elucidator".to_string(),
            weapon_type: Some("sword".to_string()),
            hp: 20,
            atk: 3,
            def: 1,
            agi: 2,
            cri: Some(8),
            innate_effects: vec![InnateEffect::new("sharp", "Sharp", InnateKind::AtkBoost(1))],
        }
    }

    #[test]
    fn test_ally_with_weapon() {
        let config = CombatConfig::default();
        let fighter = build_ally(&unit("Kirito", 80, 1, 1, 3), Some(&sword()), None, &config).unwrap();
        assert_eq!(fighter.hp, 100);
        assert_eq!(fighter.max_hp, 100);
        assert_eq!(fighter.stats, Stats::new(4, 2, 5, 8));
        assert_eq!(fighter.weapon_type.as_deref(), Some("sword"));
        assert_eq!(fighter.innate_effects.len(), 1);
    }

    #[test]
    fn test_title_applies_after_weapon() {
        let config = CombatConfig::default();
        let title = TitleModifiers {
            hp: 1.5,
            atk: 1.5,
            ..Default::default()
        };
        let fighter =
            build_ally(&unit("Kirito", 80, 1, 1, 3), Some(&sword()), Some(&title), &config).unwrap();
        assert_eq!(fighter.hp, 150);
        assert_eq!(fighter.stats.atk, 6);
        assert_eq!(fighter.stats.def, 2);
    }

    #[test]
    fn test_missing_cri_defaults_and_clamps() {
        let config = CombatConfig::default();
        let fighter = build_enemy(&unit("Kobold", 30, 1, 1, 1), &config).unwrap();
        assert_eq!(fighter.stats.cri, 10);

        let mut sharp = unit("Sharp", 30, 1, 1, 1);
        sharp.cri = Some(2);
        let fighter = build_enemy(&sharp, &config).unwrap();
        assert_eq!(fighter.stats.cri, 5);
    }

    #[test]
    fn test_pvp_level_scaling() {
        let config = CombatConfig::default();
        let contestant = PvpContestant {
            name: "Asuna".to_string(),
            level: 25,
            weapon: sword(),
        };
        let fighter = build_pvp_contestant(&contestant, None, &config).unwrap();
        assert_eq!(fighter.hp, 100 + 250 + 20);
        assert_eq!(fighter.stats, Stats::new(5, 3, 4, 8));
    }

    #[test]
    fn test_boss_active_phases_only() {
        let config = CombatConfig::default();
        let boss = BossData {
            name: "Illfang".to_string(),
            hp: 500,
            atk: 4,
            def: 3,
            agi: 2,
            cri: Some(9),
            special_mechanics: Some(SpecialMechanics::default()),
            phases: vec![
                BossPhase {
                    name: "Enraged".to_string(),
                    active: true,
                    hp_bonus: 100,
                    atk_bonus: 2,
                    cri_bonus: 2,
                    ..Default::default()
                },
                BossPhase {
                    name: "Berserk".to_string(),
                    active: false,
                    atk_bonus: 10,
                    ..Default::default()
                },
            ],
        };
        let (fighter, mechanics) = build_boss(&boss, &config).unwrap();
        assert_eq!(fighter.hp, 600);
        assert_eq!(fighter.stats, Stats::new(6, 3, 2, 7));
        assert!(mechanics.is_some());
    }

    #[test]
    fn test_rejects_bad_input() {
        let config = CombatConfig::default();
        assert_eq!(
            build_enemy(&unit("", 10, 1, 1, 1), &config),
            Err(BuildError::MissingName)
        );
        assert!(matches!(
            build_enemy(&unit("Ghost", 0, 1, 1, 1), &config),
            Err(BuildError::NonPositiveHp { .. })
        ));
        assert!(matches!(
            build_enemy(&unit("Wisp", 10, -1, 1, 1), &config),
            Err(BuildError::NegativeStat { field: "atk", .. })
        ));
        let title = TitleModifiers {
            agi: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            build_ally(&unit("Klein", 10, 1, 1, 1), None, Some(&title), &config),
            Err(BuildError::InvalidMultiplier { field: "agi", .. })
        ));
    }
}
