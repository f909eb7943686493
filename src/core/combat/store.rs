//! Combatant Store.
//!
//! Owns the canonical list of combatants and the mutation rules around it.
//! Operations on an id that is not (or no longer) present are silent no-ops
//! and report `None`/`false`; only malformed user input is an error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::adjustment::{parse_adjustment, parse_whole_number};
use super::combatant::{Combatant, CombatantPatch, CombatantType, NewCombatant};
use super::error::ValidationError;
use super::modifiers::{resolve_typed, DamageResponse, ManualModifier};

/// Outcome of a damage or healing adjustment on one combatant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HpChange {
    /// Amount after modifiers, before clamping.
    pub amount: i32,
    pub before: i32,
    pub after: i32,
}

impl HpChange {
    /// HP actually lost (positive) or gained (negative).
    pub fn delta(&self) -> i32 {
        self.before - self.after
    }
}

/// Per-target result of a typed bulk hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedHit {
    pub combatant_id: String,
    pub response: DamageResponse,
    pub change: HpChange,
}

#[derive(Debug, Clone, Default)]
pub struct CombatantStore {
    combatants: Vec<Combatant>,
    last_created_at: Option<DateTime<Utc>>,
}

impl CombatantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-sanitized records (see `snapshot`).
    pub fn from_combatants(combatants: Vec<Combatant>) -> Self {
        let last_created_at = combatants.iter().map(|c| c.created_at).max();
        Self {
            combatants,
            last_created_at,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn as_slice(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    // ── Creation / removal ──────────────────────────────────────────────────

    /// Validate and insert a combatant at full HP.
    ///
    /// `created_at` is forced strictly after every earlier insertion so that
    /// initiative ties always break in insertion order, even when the clock
    /// has not moved between two adds.
    pub fn add(&mut self, new: NewCombatant, now: DateTime<Utc>) -> Result<&Combatant, ValidationError> {
        new.validate()?;

        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);

        let combatant = new.into_combatant(Uuid::new_v4().to_string(), created_at);
        tracing::debug!(id = %combatant.id, name = %combatant.name, initiative = combatant.initiative, "Combatant added");
        self.combatants.push(combatant);
        Ok(&self.combatants[self.combatants.len() - 1])
    }

    /// Remove a combatant. Absent ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Combatant> {
        let pos = self.combatants.iter().position(|c| c.id == id)?;
        let removed = self.combatants.remove(pos);
        tracing::debug!(id = %removed.id, name = %removed.name, "Combatant removed");
        Some(removed)
    }

    /// Remove every combatant of one type. Returns how many were removed.
    pub fn clear_by_type(&mut self, combatant_type: CombatantType) -> usize {
        let before = self.combatants.len();
        self.combatants.retain(|c| c.combatant_type != combatant_type);
        let removed = before - self.combatants.len();
        if removed > 0 {
            tracing::debug!(?combatant_type, removed, "Cleared combatants by type");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.combatants.clear();
    }

    // ── HP ──────────────────────────────────────────────────────────────────

    /// Apply a resolved damage amount through the manual modifier toggle.
    pub fn apply_damage(&mut self, id: &str, amount: i32, modifier: ManualModifier) -> Option<HpChange> {
        if amount <= 0 {
            return None;
        }
        let combatant = self.get_mut(id)?;
        let adjusted = modifier.apply(amount);
        let before = combatant.current_hp;
        combatant.take_damage(adjusted);
        Some(HpChange {
            amount: adjusted,
            before,
            after: combatant.current_hp,
        })
    }

    /// Parse a multi-term damage entry (`"5 3"`) and apply it.
    ///
    /// `Err` for input without a positive total, `Ok(None)` for an unknown id.
    pub fn apply_damage_text(
        &mut self,
        id: &str,
        raw: &str,
        modifier: ManualModifier,
    ) -> Result<Option<HpChange>, ValidationError> {
        let amount = parse_adjustment(raw)?;
        Ok(self.apply_damage(id, amount, modifier))
    }

    /// Typed bulk damage: each target resolves the hit against its own declared defenses.
    ///
    /// Unknown ids are skipped. Targets listed twice are hit twice.
    pub fn apply_typed_damage(
        &mut self,
        ids: &[String],
        raw: &str,
        damage_type: &str,
    ) -> Result<Vec<TypedHit>, ValidationError> {
        let amount = parse_adjustment(raw)?;
        let mut hits = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(combatant) = self.get_mut(id) else {
                continue;
            };
            let (adjusted, response) = resolve_typed(&combatant.defenses, damage_type, amount);
            let before = combatant.current_hp;
            combatant.take_damage(adjusted);
            hits.push(TypedHit {
                combatant_id: combatant.id.clone(),
                response,
                change: HpChange {
                    amount: adjusted,
                    before,
                    after: combatant.current_hp,
                },
            });
        }
        Ok(hits)
    }

    /// Heal by a resolved amount. Healing ignores damage modifiers.
    pub fn apply_healing(&mut self, id: &str, amount: i32) -> Option<HpChange> {
        if amount <= 0 {
            return None;
        }
        let combatant = self.get_mut(id)?;
        let before = combatant.current_hp;
        combatant.heal(amount);
        Some(HpChange {
            amount,
            before,
            after: combatant.current_hp,
        })
    }

    pub fn apply_healing_text(&mut self, id: &str, raw: &str) -> Result<Option<HpChange>, ValidationError> {
        let amount = parse_adjustment(raw)?;
        Ok(self.apply_healing(id, amount))
    }

    /// Restore a combatant to max HP.
    pub fn reset(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(combatant) => {
                combatant.reset_hp();
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&mut self) {
        for combatant in &mut self.combatants {
            combatant.reset_hp();
        }
    }

    // ── Edits ───────────────────────────────────────────────────────────────

    pub fn update_initiative(&mut self, id: &str, value: i32) -> bool {
        match self.get_mut(id) {
            Some(combatant) => {
                combatant.initiative = value;
                true
            }
            None => false,
        }
    }

    /// Text variant of [`update_initiative`](Self::update_initiative).
    /// Unparsable or non-finite input is ignored.
    pub fn update_initiative_text(&mut self, id: &str, raw: &str) -> bool {
        match parse_whole_number(raw) {
            Some(value) => self.update_initiative(id, value),
            None => false,
        }
    }

    /// Edit descriptive metadata. HP and initiative are not touched.
    pub fn update_details(&mut self, id: &str, patch: CombatantPatch) -> Result<bool, ValidationError> {
        match self.get_mut(id) {
            Some(combatant) => {
                patch.apply(combatant)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
