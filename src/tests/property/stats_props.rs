//! Property-based tests for combat statistics

use proptest::prelude::*;

use crate::core::combat::{compute_stats, TurnHistoryEntry};
use crate::tests::common::fixtures::history_entry;

/// Turns spread over a handful of combatants.
fn arb_history() -> impl Strategy<Value = Vec<TurnHistoryEntry>> {
    prop::collection::vec((0usize..4, 0i64..90_000), 1..40).prop_map(|turns| {
        turns
            .into_iter()
            .enumerate()
            .map(|(i, (who, ms))| history_entry(&format!("c{who}"), i as i64 * 100, ms))
            .collect()
    })
}

proptest! {
    /// Property: one combatant's rollup matches the raw history
    #[test]
    fn prop_single_combatant_rollup(durations in prop::collection::vec(0i64..600_000, 1..30)) {
        let history: Vec<TurnHistoryEntry> = durations
            .iter()
            .enumerate()
            .map(|(i, ms)| history_entry("solo", i as i64 * 1_000, *ms))
            .collect();
        let stats = compute_stats(&history);
        let total: i64 = durations.iter().sum();

        prop_assert_eq!(stats.per_combatant.len(), 1);
        let solo = &stats.per_combatant[0];
        prop_assert_eq!(solo.turn_count, durations.len());
        prop_assert_eq!(solo.total_duration_ms, total);
        prop_assert!((solo.average_duration_ms - total as f64 / durations.len() as f64).abs() < 1e-6);
        prop_assert_eq!(solo.longest_turn_ms, *durations.iter().max().unwrap());
    }

    /// Property: totals agree between the summary and the rollups
    #[test]
    fn prop_totals_are_consistent(history in arb_history()) {
        let stats = compute_stats(&history);
        let total: i64 = history.iter().map(|e| e.duration_ms).sum();

        prop_assert_eq!(stats.total_turns, history.len());
        prop_assert_eq!(stats.total_duration_ms, total);
        prop_assert_eq!(
            stats.per_combatant.iter().map(|c| c.total_duration_ms).sum::<i64>(),
            total
        );
        prop_assert_eq!(
            stats.per_combatant.iter().map(|c| c.turn_count).sum::<usize>(),
            history.len()
        );
        for pair in stats.per_combatant.windows(2) {
            prop_assert!(pair[0].total_duration_ms >= pair[1].total_duration_ms);
        }
    }

    /// Property: longest and fastest are the first entries holding the extreme
    #[test]
    fn prop_extremes_take_first_occurrence(history in arb_history()) {
        let stats = compute_stats(&history);
        let max = history.iter().map(|e| e.duration_ms).max().unwrap();
        let min = history.iter().map(|e| e.duration_ms).min().unwrap();
        let first_max = history.iter().find(|e| e.duration_ms == max).unwrap();
        let first_min = history.iter().find(|e| e.duration_ms == min).unwrap();

        prop_assert_eq!(stats.longest_turn.as_ref(), Some(first_max));
        prop_assert_eq!(stats.fastest_turn.as_ref(), Some(first_min));
    }

    /// Property: slowest and quickest averages bound every rollup
    #[test]
    fn prop_average_extremes_bound_rollups(history in arb_history()) {
        let stats = compute_stats(&history);
        let slowest = stats.slowest_average.as_ref().unwrap();
        let quickest = stats.quickest_average.as_ref().unwrap();
        for c in &stats.per_combatant {
            prop_assert!(slowest.average_duration_ms >= c.average_duration_ms);
            prop_assert!(quickest.average_duration_ms <= c.average_duration_ms);
        }
    }
}

#[test]
fn test_empty_history_yields_empty_summary() {
    let stats = compute_stats(&[]);
    assert!(stats.is_empty());
    assert_eq!(stats.total_duration_ms, 0);
    assert!(stats.average_turn_duration_ms.is_none());
    assert!(stats.longest_turn.is_none());
    assert!(stats.per_combatant.is_empty());
}
