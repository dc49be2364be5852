//! Skill mods
//!
//! Mods are small always-on bonuses installed on an equipped skill. The
//! [`ModTable`] is built by the caller and passed into context
//! construction; there is no global registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::effects::Skill;

/// One mod bonus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ModEffect {
    DamageMultBonus(f64),
    ExtraHit(u32),
    /// Lowers the crit threshold of the skill's hits
    CritBonus(i32),
    TriggerBonus(f64),
    DelayReduction(f64),
    StunBonus(f64),
    LifestealBonus(f64),
    IgnoreDefBonus(f64),
    ShieldBonus(i32),
    HealBonus(f64),
}

/// Mod definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub effects: Vec<ModEffect>,
}

/// A skill as equipped: the definition plus installed mod ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedSkill {
    pub skill: Skill,
    #[serde(default)]
    pub mods: Vec<String>,
}

impl EquippedSkill {
    /// Equip a skill without mods
    pub fn new(skill: Skill) -> Self {
        Self {
            skill,
            mods: Vec::new(),
        }
    }

    /// Install a mod by id
    pub fn with_mod(mut self, id: &str) -> Self {
        self.mods.push(id.to_string());
        self
    }
}

/// Lookup table of known mods
#[derive(Debug, Clone, Default)]
pub struct ModTable {
    mods: HashMap<String, ModDef>,
}

impl ModTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of definitions; later ids replace earlier ones
    pub fn from_defs(defs: impl IntoIterator<Item = ModDef>) -> Self {
        Self {
            mods: defs.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    /// Parse a JSON array of mod definitions
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let defs: Vec<ModDef> = serde_json::from_str(json)?;
        Ok(Self::from_defs(defs))
    }

    /// Add or replace a mod
    pub fn insert(&mut self, def: ModDef) {
        self.mods.insert(def.id.clone(), def);
    }

    /// Get a mod by id
    pub fn get(&self, id: &str) -> Option<&ModDef> {
        self.mods.get(id)
    }

    /// Number of known mods
    pub fn len(&self) -> usize {
        self.mods.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let table = ModTable::from_json(
            r#"[
                {"id": "twin", "name": "Twin Edge", "effects": [{"type": "extra_hit", "value": 1}]},
                {"id": "swift", "name": "Swift", "effects": [{"type": "delay_reduction", "value": 0.5}]}
            ]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("twin").unwrap().effects, vec![ModEffect::ExtraHit(1)]);
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_later_definition_wins() {
        let table = ModTable::from_defs([
            ModDef {
                id: "a".to_string(),
                name: "first".to_string(),
                effects: vec![],
            },
            ModDef {
                id: "a".to_string(),
                name: "second".to_string(),
                effects: vec![],
            },
        ]);
        assert_eq!(table.get("a").unwrap().name, "second");
    }
}
