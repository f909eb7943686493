//! Test Fixtures

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::core::combat::{
    CombatTracker, CombatantType, DamageDefenses, ManualClock, NewCombatant, TurnHistoryEntry,
};

// =============================================================================
// Clock & Tracker Fixtures
// =============================================================================

/// `secs` seconds after the Unix epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(secs)
}

/// An empty tracker driven by a manual clock starting at the epoch.
pub fn create_test_tracker() -> (CombatTracker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_epoch());
    (CombatTracker::with_clock(clock.clone()), clock)
}

/// A tracker holding one 20 HP player per `(name, initiative)` pair, added in order.
pub fn create_tracker_with(roster: &[(&str, i32)]) -> (CombatTracker, Arc<ManualClock>, Vec<String>) {
    let (mut tracker, clock) = create_test_tracker();
    let ids = roster
        .iter()
        .map(|(name, init)| add_player(&mut tracker, name, *init))
        .collect();
    (tracker, clock, ids)
}

// =============================================================================
// Combatant Fixtures
// =============================================================================

pub fn add_player(tracker: &mut CombatTracker, name: &str, initiative: i32) -> String {
    tracker
        .add_combatant(NewCombatant::new(name, 20, initiative, CombatantType::Player))
        .expect("fixture combatant is valid")
}

pub fn add_monster(tracker: &mut CombatTracker, name: &str, max_hp: i32, initiative: i32) -> String {
    tracker
        .add_combatant(NewCombatant::new(name, max_hp, initiative, CombatantType::Monster))
        .expect("fixture combatant is valid")
}

pub fn defenses(immune: &[&str], resist: &[&str], vulnerable: &[&str]) -> DamageDefenses {
    let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
    DamageDefenses {
        damage_immunities: owned(immune),
        damage_resistances: owned(resist),
        damage_vulnerabilities: owned(vulnerable),
    }
}

/// Names in the order turns are taken.
pub fn turn_order_names(tracker: &CombatTracker) -> Vec<String> {
    tracker
        .ordered_combatants()
        .into_iter()
        .map(|c| c.name.clone())
        .collect()
}

pub fn current_hp(tracker: &CombatTracker, id: &str) -> i32 {
    tracker.get(id).expect("combatant exists").current_hp
}

// =============================================================================
// History Fixtures
// =============================================================================

/// A turn for `id` starting at `start_secs` and lasting `duration_ms`.
pub fn history_entry(id: &str, start_secs: i64, duration_ms: i64) -> TurnHistoryEntry {
    let started = at(start_secs);
    TurnHistoryEntry::new(
        id,
        id.to_uppercase(),
        started,
        started + Duration::milliseconds(duration_ms),
        1,
    )
}
