//! Property-based tests for the turn cycle

use chrono::Duration;
use proptest::prelude::*;

use crate::tests::common::fixtures::{add_player, at, create_test_tracker};

proptest! {
    /// Property: after a start, every advance closes exactly one turn and
    /// ending combat closes one more
    #[test]
    fn prop_history_length_matches_advances(
        roster_size in 1usize..7,
        advances in prop::collection::vec(0i64..120, 0..30)
    ) {
        let (mut tracker, clock) = create_test_tracker();
        for i in 0..roster_size {
            add_player(&mut tracker, &format!("P{i}"), i as i32);
        }
        prop_assert!(tracker.start_combat());
        for secs in &advances {
            clock.advance_secs(*secs);
            prop_assert!(tracker.advance_turn());
        }
        prop_assert_eq!(tracker.history().len(), advances.len());

        let summary = tracker.end_combat().unwrap();
        prop_assert_eq!(tracker.history().len(), advances.len() + 1);
        prop_assert_eq!(summary.total_turns, advances.len() + 1);
        prop_assert!(tracker.active_turn().is_none());
        prop_assert!(tracker.elapsed().is_none());
    }

    /// Property: rounds advance once per full pass through the roster
    #[test]
    fn prop_round_counts_full_passes(roster_size in 1usize..6, advances in 0usize..40) {
        let (mut tracker, _) = create_test_tracker();
        for i in 0..roster_size {
            add_player(&mut tracker, &format!("P{i}"), i as i32);
        }
        tracker.start_combat();
        for _ in 0..advances {
            tracker.advance_turn();
        }
        let expected_round = 1 + (advances / roster_size) as u32;
        prop_assert_eq!(tracker.round(), Some(expected_round));
        let expected_holder = &tracker.effective_order()[advances % roster_size];
        prop_assert_eq!(&tracker.active_turn().unwrap().combatant_id, expected_holder);
    }

    /// Property: durations are never negative, even if the clock steps backwards
    #[test]
    fn prop_durations_never_negative(steps in prop::collection::vec(-300i64..300, 1..20)) {
        let (mut tracker, clock) = create_test_tracker();
        add_player(&mut tracker, "A", 10);
        add_player(&mut tracker, "B", 5);
        clock.set(at(10_000));
        tracker.start_combat();
        for secs in steps {
            clock.advance(Duration::seconds(secs));
            tracker.advance_turn();
        }
        tracker.end_combat();
        for entry in tracker.history() {
            prop_assert!(entry.duration_ms >= 0);
        }
        let stats = tracker.stats().unwrap();
        prop_assert!(stats.total_duration_ms >= 0);
    }
}
