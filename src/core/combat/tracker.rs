//! Combat tracker facade.
//!
//! Ties the store, the initiative ordering and the turn cycle together. Every
//! mutating call ends with an explicit [`CombatTracker::reconcile`] so the
//! manual order and the turn holder are always valid for the current roster.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::clock::{Clock, SystemClock};
use super::combatant::{Combatant, CombatantPatch, CombatantType, NewCombatant};
use super::error::ValidationError;
use super::modifiers::ManualModifier;
use super::ordering::ManualOrder;
use super::snapshot::{CombatSnapshot, SNAPSHOT_VERSION};
use super::stats::CombatStatsSummary;
use super::store::{CombatantStore, HpChange, TypedHit};
use super::turn_cycle::{ActiveTurn, Reconciled, TurnCycle, TurnHistoryEntry};

pub struct CombatTracker {
    store: CombatantStore,
    manual_order: ManualOrder,
    cycle: TurnCycle,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CombatTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatTracker")
            .field("store", &self.store)
            .field("manual_order", &self.manual_order)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Default for CombatTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatTracker {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: CombatantStore::new(),
            manual_order: ManualOrder::new(),
            cycle: TurnCycle::new(),
            clock,
        }
    }

    /// Placeholder name for turns whose combatant was removed mid-turn.
    pub fn with_unknown_label(mut self, label: impl Into<String>) -> Self {
        self.cycle = self.cycle.with_unknown_label(label);
        self
    }

    /// Rebuild a tracker from an already-sanitized snapshot. Combat is idle afterwards.
    pub fn from_snapshot(snapshot: CombatSnapshot, clock: Arc<dyn Clock>) -> Self {
        let mut tracker = Self::with_clock(clock);
        tracker.load_snapshot(snapshot);
        tracker
    }

    /// Replace roster, manual order and history with a snapshot's contents.
    pub fn load_snapshot(&mut self, snapshot: CombatSnapshot) {
        self.store = CombatantStore::from_combatants(snapshot.combatants);
        self.manual_order = ManualOrder::new();
        if let Some(ids) = snapshot.manual_order {
            self.manual_order.set(ids, self.store.as_slice());
        }
        self.cycle = std::mem::take(&mut self.cycle).with_history(snapshot.history);
        self.cycle.dismiss_stats();
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            version: SNAPSHOT_VERSION,
            combatants: self.store.as_slice().to_vec(),
            manual_order: self.manual_order.ids().map(<[String]>::to_vec),
            history: self.cycle.history().to_vec(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Roster queries ──────────────────────────────────────────────────────

    pub fn combatants(&self) -> &[Combatant] {
        self.store.as_slice()
    }

    pub fn get(&self, id: &str) -> Option<&Combatant> {
        self.store.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Ids in the order turns are taken.
    pub fn effective_order(&self) -> Vec<String> {
        self.manual_order.effective_order(self.store.as_slice())
    }

    /// Combatants in the order turns are taken.
    pub fn ordered_combatants(&self) -> Vec<&Combatant> {
        self.effective_order()
            .iter()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    pub fn has_manual_order(&self) -> bool {
        self.manual_order.is_active()
    }

    // ── Roster mutations ────────────────────────────────────────────────────

    /// Add a combatant and return its id.
    pub fn add_combatant(&mut self, new: NewCombatant) -> Result<String, ValidationError> {
        let now = self.now();
        let id = self.store.add(new, now)?.id.clone();
        self.reconcile();
        Ok(id)
    }

    /// Parse the add form and add the combatant.
    pub fn add_from_form(
        &mut self,
        name: &str,
        max_hp: &str,
        initiative: &str,
        combatant_type: CombatantType,
    ) -> Result<String, ValidationError> {
        let new = NewCombatant::from_form(name, max_hp, initiative, combatant_type)?;
        self.add_combatant(new)
    }

    pub fn remove_combatant(&mut self, id: &str) -> Option<Combatant> {
        let removed = self.store.remove(id);
        self.reconcile();
        removed
    }

    pub fn clear_by_type(&mut self, combatant_type: CombatantType) -> usize {
        let removed = self.store.clear_by_type(combatant_type);
        self.reconcile();
        removed
    }

    pub fn clear_all(&mut self) {
        self.store.clear();
        self.manual_order.clear();
        self.reconcile();
    }

    pub fn update_initiative(&mut self, id: &str, value: i32) -> bool {
        let changed = self.store.update_initiative(id, value);
        self.reconcile();
        changed
    }

    /// Unparsable or non-finite input is ignored.
    pub fn update_initiative_text(&mut self, id: &str, raw: &str) -> bool {
        let changed = self.store.update_initiative_text(id, raw);
        self.reconcile();
        changed
    }

    /// Edit descriptive fields. Returns `Ok(false)` for an unknown id.
    pub fn update_details(&mut self, id: &str, patch: CombatantPatch) -> Result<bool, ValidationError> {
        self.store.update_details(id, patch)
    }

    // ── HP ──────────────────────────────────────────────────────────────────

    /// Damage from a (possibly multi-term) entry through the manual modifier toggle.
    pub fn apply_damage(
        &mut self,
        id: &str,
        raw: &str,
        modifier: ManualModifier,
    ) -> Result<Option<HpChange>, ValidationError> {
        self.store.apply_damage_text(id, raw, modifier)
    }

    /// Typed area damage resolved against each target's declared defenses.
    pub fn apply_typed_damage(
        &mut self,
        ids: &[String],
        raw: &str,
        damage_type: &str,
    ) -> Result<Vec<TypedHit>, ValidationError> {
        self.store.apply_typed_damage(ids, raw, damage_type)
    }

    pub fn apply_healing(&mut self, id: &str, raw: &str) -> Result<Option<HpChange>, ValidationError> {
        self.store.apply_healing_text(id, raw)
    }

    pub fn reset_hp(&mut self, id: &str) -> bool {
        self.store.reset(id)
    }

    pub fn reset_all_hp(&mut self) {
        self.store.reset_all();
    }

    // ── Manual order ────────────────────────────────────────────────────────

    pub fn set_manual_order(&mut self, ids: Vec<String>) {
        self.manual_order.set(ids, self.store.as_slice());
    }

    pub fn move_up(&mut self, id: &str) -> bool {
        self.manual_order.move_up(id, self.store.as_slice())
    }

    pub fn move_down(&mut self, id: &str) -> bool {
        self.manual_order.move_down(id, self.store.as_slice())
    }

    pub fn clear_manual_order(&mut self) {
        self.manual_order.clear();
    }

    // ── Turn cycle ──────────────────────────────────────────────────────────

    pub fn start_combat(&mut self) -> bool {
        let order = self.effective_order();
        let now = self.now();
        self.cycle.start(&order, now)
    }

    pub fn advance_turn(&mut self) -> bool {
        let order = self.effective_order();
        let now = self.now();
        self.cycle.advance(self.store.as_slice(), &order, now)
    }

    pub fn end_combat(&mut self) -> Option<CombatStatsSummary> {
        let now = self.now();
        self.cycle.end(self.store.as_slice(), now).cloned()
    }

    pub fn is_in_turn(&self) -> bool {
        self.cycle.is_in_turn()
    }

    pub fn active_turn(&self) -> Option<&ActiveTurn> {
        self.cycle.active()
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.cycle.active_combatant_id().and_then(|id| self.store.get(id))
    }

    pub fn turn_number(&self) -> Option<usize> {
        self.cycle.turn_number()
    }

    pub fn round(&self) -> Option<u32> {
        self.cycle.round()
    }

    /// Live clock for the active turn. Display only.
    pub fn elapsed(&self) -> Option<Duration> {
        self.cycle.elapsed(self.now())
    }

    pub fn history(&self) -> &[TurnHistoryEntry] {
        self.cycle.history()
    }

    pub fn stats(&self) -> Option<&CombatStatsSummary> {
        self.cycle.summary()
    }

    pub fn stats_visible(&self) -> bool {
        self.cycle.stats_visible()
    }

    pub fn dismiss_stats(&mut self) {
        self.cycle.dismiss_stats();
    }

    /// Sanitize the manual order and re-validate the turn holder.
    ///
    /// Called after every roster mutation; safe to call at any time.
    pub fn reconcile(&mut self) -> Reconciled {
        self.manual_order.sanitize(self.store.as_slice());
        let order = self.effective_order();
        let now = self.now();
        self.cycle.reconcile(&order, now)
    }
}
