//! Skill system
//!
//! Skills come in three trigger types:
//! - Passive: applied once before the first round
//! - Conditional: fire once when the owner's hp drops below a threshold
//! - Probability: rolled before each action and replace the plain attack
//!
//! Probability skills can connect into each other, and mods installed on a
//! skill adjust its parsed effects.

pub mod attack;
pub mod context;
pub mod effects;
pub mod mods;
pub mod resolve;

pub use attack::{process_skill_attack, try_skill_connect, SkillAttackOutcome};
pub use context::{build_skill_context, LoadedSkill, SkillContext, SkillEvent};
pub use effects::{parse_skill_effects, ParsedSkillEffects, Skill, SkillEffect, TriggerCondition, TriggerType};
pub use mods::{EquippedSkill, ModDef, ModEffect, ModTable};
pub use resolve::{apply_end_of_round_effects, apply_passive_skills, check_conditional_skills, roll_skill_trigger};
