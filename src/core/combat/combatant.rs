//! Combatant records.
//!
//! A combatant is one participant in an encounter: a player character or a
//! monster with hit points, an initiative value and optional stat-block
//! metadata. HP is always kept in `[0, max_hp]`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::adjustment::parse_whole_number;
use super::error::ValidationError;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CombatantType {
    #[default]
    Player,
    Monster,
}

impl CombatantType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Monster => "Monster",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Player => Self::Monster,
            Self::Monster => Self::Player,
        }
    }
}

/// Declared damage defenses from a stat block.
///
/// Entries are damage-type tags ("fire", "slashing", ...). Matching is
/// case-insensitive and exact after trimming.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DamageDefenses {
    pub damage_immunities: Vec<String>,
    pub damage_resistances: Vec<String>,
    pub damage_vulnerabilities: Vec<String>,
}

impl DamageDefenses {
    pub fn is_immune_to(&self, damage_type: &str) -> bool {
        contains_tag(&self.damage_immunities, damage_type)
    }

    pub fn resists(&self, damage_type: &str) -> bool {
        contains_tag(&self.damage_resistances, damage_type)
    }

    pub fn is_vulnerable_to(&self, damage_type: &str) -> bool {
        contains_tag(&self.damage_vulnerabilities, damage_type)
    }

    pub fn is_empty(&self) -> bool {
        self.damage_immunities.is_empty()
            && self.damage_resistances.is_empty()
            && self.damage_vulnerabilities.is_empty()
    }

    /// Trim entries and drop blanks and case-insensitive duplicates.
    pub fn normalized(mut self) -> Self {
        normalize_tags(&mut self.damage_immunities);
        normalize_tags(&mut self.damage_resistances);
        normalize_tags(&mut self.damage_vulnerabilities);
        self
    }
}

/// Case-folding key shared by lookups and de-duplication.
fn tag_key(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn contains_tag(tags: &[String], damage_type: &str) -> bool {
    let wanted = tag_key(damage_type);
    !wanted.is_empty() && tags.iter().any(|t| tag_key(t) == wanted)
}

pub(crate) fn normalize_tags(tags: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    tags.retain_mut(|tag| {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return false;
        }
        let key = tag_key(trimmed);
        if seen.contains(&key) {
            return false;
        }
        seen.push(key);
        *tag = trimmed.to_string();
        true
    });
}

// ============================================================================
// Combatant
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub combatant_type: CombatantType,
    pub max_hp: i32,
    pub current_hp: i32,
    pub initiative: i32,
    /// Insertion marker; earlier combatants win initiative ties.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub defenses: DamageDefenses,
}

impl Combatant {
    pub fn is_down(&self) -> bool {
        self.current_hp == 0
    }

    /// Fraction of max HP remaining, in `[0.0, 1.0]`.
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }

    /// Subtract already-resolved damage. Returns HP actually lost.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let before = self.current_hp;
        self.current_hp = before.saturating_sub(amount).max(0);
        before - self.current_hp
    }

    /// Add healing, capped at max HP. Returns HP actually restored.
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        let before = self.current_hp;
        self.current_hp = before.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    pub(crate) fn reset_hp(&mut self) {
        self.current_hp = self.max_hp;
    }

    /// Force `current_hp` back into `[0, max_hp]`.
    pub(crate) fn clamp_hp(&mut self) {
        self.current_hp = self.current_hp.clamp(0, self.max_hp.max(0));
    }
}

// ============================================================================
// Creation input
// ============================================================================

/// Validated input for creating a combatant.
///
/// Built either from typed values with [`NewCombatant::new`] or from raw form
/// text with [`NewCombatant::from_form`]. The store re-checks name and max HP
/// so a hand-built value cannot bypass validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCombatant {
    pub name: String,
    pub combatant_type: CombatantType,
    pub max_hp: i32,
    pub initiative: i32,
    pub armor_class: Option<i32>,
    pub notes: String,
    pub tags: Vec<String>,
    pub defenses: DamageDefenses,
}

impl NewCombatant {
    pub fn new(name: impl Into<String>, max_hp: i32, initiative: i32, combatant_type: CombatantType) -> Self {
        Self {
            name: name.into(),
            combatant_type,
            max_hp,
            initiative,
            armor_class: None,
            notes: String::new(),
            tags: vec![],
            defenses: DamageDefenses::default(),
        }
    }

    /// Parse the add-combatant form.
    ///
    /// Numbers are truncated toward zero; initiative may be zero or negative.
    pub fn from_form(
        name: &str,
        max_hp: &str,
        initiative: &str,
        combatant_type: CombatantType,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let max_hp_value = parse_whole_number(max_hp)
            .filter(|hp| *hp > 0)
            .ok_or_else(|| ValidationError::InvalidMaxHp(max_hp.trim().to_string()))?;
        let initiative_value = parse_whole_number(initiative)
            .ok_or_else(|| ValidationError::InvalidInitiative(initiative.trim().to_string()))?;

        Ok(Self::new(name, max_hp_value, initiative_value, combatant_type))
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = Some(armor_class);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_defenses(mut self, defenses: DamageDefenses) -> Self {
        self.defenses = defenses;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.max_hp <= 0 {
            return Err(ValidationError::InvalidMaxHp(self.max_hp.to_string()));
        }
        Ok(())
    }

    pub(crate) fn into_combatant(self, id: String, created_at: DateTime<Utc>) -> Combatant {
        let mut tags = self.tags;
        normalize_tags(&mut tags);
        Combatant {
            id,
            name: self.name.trim().to_string(),
            combatant_type: self.combatant_type,
            max_hp: self.max_hp,
            current_hp: self.max_hp,
            initiative: self.initiative,
            created_at,
            armor_class: self.armor_class,
            notes: self.notes,
            tags,
            defenses: self.defenses.normalized(),
        }
    }
}

/// Partial edit of descriptive fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatantPatch {
    pub name: Option<String>,
    pub combatant_type: Option<CombatantType>,
    pub armor_class: Option<Option<i32>>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub defenses: Option<DamageDefenses>,
}

impl CombatantPatch {
    pub(crate) fn apply(self, combatant: &mut Combatant) -> Result<(), ValidationError> {
        let name = match self.name {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyName);
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        if let Some(name) = name {
            combatant.name = name;
        }
        if let Some(combatant_type) = self.combatant_type {
            combatant.combatant_type = combatant_type;
        }
        if let Some(armor_class) = self.armor_class {
            combatant.armor_class = armor_class;
        }
        if let Some(notes) = self.notes {
            combatant.notes = notes;
        }
        if let Some(mut tags) = self.tags {
            normalize_tags(&mut tags);
            combatant.tags = tags;
        }
        if let Some(defenses) = self.defenses {
            combatant.defenses = defenses.normalized();
        }
        Ok(())
    }
}
