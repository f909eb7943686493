//! Turn cycle behaviour across roster changes.

use rstest::rstest;

use crate::core::combat::{Clock, CombatantPatch, Reconciled, ValidationError};
use crate::tests::common::fixtures::*;

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
#[case(9)]
fn test_history_grows_by_one_per_advance(#[case] advances: usize) {
    let (mut tracker, clock, _) = create_tracker_with(&[("A", 20), ("B", 15), ("C", 10)]);
    tracker.start_combat();
    for _ in 0..advances {
        clock.advance_secs(3);
        tracker.advance_turn();
    }
    assert_eq!(tracker.history().len(), advances);

    tracker.end_combat();
    assert_eq!(tracker.history().len(), advances + 1);
    assert!(tracker.active_turn().is_none());
}

#[test]
fn test_advance_from_last_wraps_and_bumps_round() {
    let (mut tracker, _, ids) = create_tracker_with(&[("A", 20), ("B", 15)]);
    tracker.start_combat();
    tracker.advance_turn();
    assert_eq!(tracker.round(), Some(1));
    assert_eq!(tracker.active_turn().unwrap().combatant_id, ids[1]);

    tracker.advance_turn();
    assert_eq!(tracker.active_turn().unwrap().combatant_id, ids[0]);
    assert_eq!(tracker.round(), Some(2));
    assert_eq!(tracker.turn_number(), Some(3));
}

#[test]
fn test_advance_while_idle_starts_combat() {
    let (mut tracker, _, ids) = create_tracker_with(&[("A", 5), ("B", 18)]);
    assert!(tracker.advance_turn());
    assert_eq!(tracker.active_turn().unwrap().combatant_id, ids[1]);
    assert!(tracker.history().is_empty());
}

#[test]
fn test_start_and_advance_on_empty_roster_do_nothing() {
    let (mut tracker, _) = create_test_tracker();
    assert!(!tracker.start_combat());
    assert!(!tracker.advance_turn());
    assert!(tracker.end_combat().is_none());
    assert!(!tracker.is_in_turn());
}

#[test]
fn test_restart_clears_previous_history() {
    let (mut tracker, clock, _) = create_tracker_with(&[("A", 20), ("B", 15)]);
    tracker.start_combat();
    clock.advance_secs(5);
    tracker.advance_turn();
    tracker.end_combat();
    assert_eq!(tracker.history().len(), 2);

    tracker.start_combat();
    assert!(tracker.history().is_empty());
    assert!(!tracker.stats_visible());
    assert!(tracker.stats().is_none());
}

#[test]
fn test_emptying_the_roster_returns_to_idle() {
    let (mut tracker, _, ids) = create_tracker_with(&[("A", 20), ("B", 15)]);
    tracker.start_combat();
    tracker.remove_combatant(&ids[0]);
    assert!(tracker.is_in_turn());
    tracker.remove_combatant(&ids[1]);
    assert!(!tracker.is_in_turn());
    assert!(tracker.elapsed().is_none());
    assert_eq!(tracker.reconcile(), Reconciled::Unchanged);
}

#[test]
fn test_clearing_monsters_reselects_a_player() {
    let (mut tracker, clock) = create_test_tracker();
    let goblin = add_monster(&mut tracker, "Goblin", 7, 22);
    let hero = add_player(&mut tracker, "Hero", 11);
    tracker.start_combat();
    assert_eq!(tracker.active_turn().unwrap().combatant_id, goblin);

    clock.advance_secs(8);
    assert_eq!(tracker.clear_by_type(crate::core::combat::CombatantType::Monster), 1);
    let active = tracker.active_turn().unwrap();
    assert_eq!(active.combatant_id, hero);
    assert_eq!(active.started_at, clock.now());
}

#[test]
fn test_elapsed_tracks_the_clock_without_touching_history() {
    let (mut tracker, clock, _) = create_tracker_with(&[("A", 20)]);
    tracker.start_combat();
    clock.advance_secs(42);
    assert_eq!(tracker.elapsed().unwrap().num_seconds(), 42);
    assert!(tracker.history().is_empty());
}

#[test]
fn test_initiative_edit_mid_combat_keeps_the_turn_holder() {
    let (mut tracker, _, ids) = create_tracker_with(&[("A", 20), ("B", 15)]);
    tracker.start_combat();
    assert!(tracker.update_initiative(&ids[1], 30));
    assert_eq!(tracker.active_turn().unwrap().combatant_id, ids[0]);
    assert_eq!(turn_order_names(&tracker), vec!["B", "A"]);

    // A is now last, so the next turn wraps to B.
    tracker.advance_turn();
    assert_eq!(tracker.active_turn().unwrap().combatant_id, ids[1]);
    assert_eq!(tracker.round(), Some(2));
}

#[test]
fn test_rename_mid_turn_is_recorded_under_the_new_name() {
    let (mut tracker, clock, ids) = create_tracker_with(&[("Goblin", 12)]);
    tracker.start_combat();
    clock.advance_secs(4);

    let patch = CombatantPatch {
        name: Some("  Goblin Boss ".to_string()),
        notes: Some("Holds the bridge".to_string()),
        ..CombatantPatch::default()
    };
    assert_eq!(tracker.update_details(&ids[0], patch), Ok(true));
    assert_eq!(tracker.active_turn().unwrap().combatant_id, ids[0]);

    tracker.end_combat();
    assert_eq!(tracker.history()[0].combatant_name, "Goblin Boss");
    assert_eq!(tracker.get(&ids[0]).unwrap().notes, "Holds the bridge");
}

#[test]
fn test_rejected_details_edit_leaves_combatant_untouched() {
    let (mut tracker, _, ids) = create_tracker_with(&[("Goblin", 12)]);
    let patch = CombatantPatch {
        name: Some("   ".to_string()),
        notes: Some("lost".to_string()),
        ..CombatantPatch::default()
    };
    assert_eq!(tracker.update_details(&ids[0], patch), Err(ValidationError::EmptyName));

    let goblin = tracker.get(&ids[0]).unwrap();
    assert_eq!(goblin.name, "Goblin");
    assert!(goblin.notes.is_empty());
    assert_eq!(tracker.update_details("missing", CombatantPatch::default()), Ok(false));
}
