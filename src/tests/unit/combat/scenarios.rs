//! Worked encounter scenarios.

use crate::core::combat::{Clock, CombatantType, DamageResponse, ManualModifier, NewCombatant};
use crate::tests::common::fixtures::*;

#[test]
fn test_initiative_ties_go_to_the_earlier_combatant() {
    let (tracker, _, _) = create_tracker_with(&[("A", 15), ("B", 15), ("C", 20)]);
    assert_eq!(turn_order_names(&tracker), vec!["C", "A", "B"]);
}

#[test]
fn test_multi_term_damage_is_summed() {
    let (mut tracker, _, ids) = create_tracker_with(&[("A", 15)]);
    let change = tracker
        .apply_damage(&ids[0], "5 3", ManualModifier::Normal)
        .unwrap()
        .unwrap();
    assert_eq!(change.amount, 8);
    assert_eq!(current_hp(&tracker, &ids[0]), 12);
}

#[test]
fn test_three_turn_combat_produces_three_entries() {
    let (mut tracker, clock, _) = create_tracker_with(&[("A", 15), ("B", 12), ("C", 9)]);
    assert!(tracker.start_combat());
    clock.advance_secs(10);
    tracker.advance_turn();
    clock.advance_secs(20);
    tracker.advance_turn();
    clock.advance_secs(30);
    let stats = tracker.end_combat().unwrap();

    assert_eq!(tracker.history().len(), 3);
    assert_eq!(stats.total_turns, 3);
    assert_eq!(stats.total_duration_ms, 60_000);
    assert_eq!(stats.longest_turn.unwrap().combatant_name, "C");
    assert_eq!(stats.fastest_turn.unwrap().combatant_name, "A");
    assert!(!tracker.is_in_turn());
    assert!(tracker.stats_visible());
}

#[test]
fn test_typed_fire_damage_against_resistance_rounds_up() {
    let (mut tracker, _) = create_test_tracker();
    let id = tracker
        .add_combatant(
            NewCombatant::new("Salamander", 30, 12, CombatantType::Monster)
                .with_defenses(defenses(&[], &["fire"], &[])),
        )
        .unwrap();

    let hits = tracker.apply_typed_damage(&[id.clone()], "10", "fire").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].response, DamageResponse::Resistant);
    assert_eq!(hits[0].change.amount, 5);
    assert_eq!(current_hp(&tracker, &id), 25);

    // Odd amounts keep the extra point on the typed path.
    tracker.apply_typed_damage(&[id.clone()], "7", "FIRE").unwrap();
    assert_eq!(current_hp(&tracker, &id), 21);
}

#[test]
fn test_removing_the_active_combatant_keeps_combat_running() {
    let (mut tracker, clock, ids) = create_tracker_with(&[("A", 20), ("B", 15), ("C", 10)]);
    tracker.start_combat();
    clock.advance_secs(6);
    tracker.advance_turn();
    assert_eq!(tracker.active_combatant().unwrap().name, "B");

    clock.advance_secs(4);
    tracker.remove_combatant(&ids[1]);

    let active = tracker.active_turn().unwrap();
    assert_eq!(active.combatant_id, ids[0]);
    assert_eq!(active.started_at, clock.now());
    assert!(tracker.is_in_turn());

    // A's earlier turn keeps its captured name once A is gone too.
    tracker.remove_combatant(&ids[0]);
    assert_eq!(tracker.history()[0].combatant_name, "A");
    assert_eq!(tracker.active_combatant().unwrap().name, "C");
}

#[test]
fn test_damage_to_unknown_combatant_is_a_silent_no_op() {
    let (mut tracker, _, ids) = create_tracker_with(&[("A", 10)]);
    let result = tracker.apply_damage("missing", "5", ManualModifier::Normal);
    assert_eq!(result, Ok(None));
    assert_eq!(current_hp(&tracker, &ids[0]), 20);
}
