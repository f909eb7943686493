//! Property-based tests for initiative ordering

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Duration;
use proptest::prelude::*;

use crate::core::combat::{
    compare_initiative, initiative_order, Combatant, CombatantType, ManualOrder, NewCombatant,
};
use crate::tests::common::fixtures::at;

// ============================================================================
// Strategies
// ============================================================================

/// Initiatives paired with creation offsets; small ranges force plenty of ties.
fn arb_roster() -> impl Strategy<Value = Vec<Combatant>> {
    prop::collection::vec((-5i32..25, 0i64..4), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (initiative, created))| {
                NewCombatant::new(format!("c{i}"), 10, initiative, CombatantType::Monster)
                    .into_combatant(format!("id-{i:02}"), at(0) + Duration::seconds(created))
            })
            .collect()
    })
}

proptest! {
    /// Property: adjacent combatants in the computed order never compare as Greater
    #[test]
    fn prop_order_is_sorted(roster in arb_roster()) {
        let order = initiative_order(&roster);
        let by_id = |id: &String| roster.iter().find(|c| &c.id == id).unwrap();
        for pair in order.windows(2) {
            let (a, b) = (by_id(&pair[0]), by_id(&pair[1]));
            prop_assert_ne!(compare_initiative(a, b), Ordering::Greater);
            prop_assert!(a.initiative >= b.initiative);
        }
    }

    /// Property: the order does not depend on how the roster is stored
    #[test]
    fn prop_order_ignores_input_order(
        (roster, shuffled) in arb_roster().prop_flat_map(|r| {
            let copy = r.clone();
            (Just(r), Just(copy).prop_shuffle())
        })
    ) {
        prop_assert_eq!(initiative_order(&roster), initiative_order(&shuffled));
    }

    /// Property: sorting an already sorted roster changes nothing
    #[test]
    fn prop_sort_is_idempotent(roster in arb_roster()) {
        let order = initiative_order(&roster);
        let sorted: Vec<Combatant> = order
            .iter()
            .filter_map(|id| roster.iter().find(|c| &c.id == id).cloned())
            .collect();
        prop_assert_eq!(initiative_order(&sorted), order);
    }

    /// Property: the comparator is a total order (only identical ids compare Equal)
    #[test]
    fn prop_comparator_is_total(roster in arb_roster()) {
        for a in &roster {
            for b in &roster {
                let forward = compare_initiative(a, b);
                prop_assert_eq!(forward, compare_initiative(b, a).reverse());
                prop_assert_eq!(forward == Ordering::Equal, a.id == b.id);
            }
        }
    }

    /// Property: whatever the override says, the effective order is a permutation
    /// of the roster and the override never survives equal to the automatic order
    #[test]
    fn prop_manual_order_is_a_permutation(
        roster in arb_roster(),
        picks in prop::collection::vec(0usize..20, 0..20)
    ) {
        let mut manual = ManualOrder::new();
        let ids: Vec<String> = picks.iter().map(|i| format!("id-{i:02}")).collect();
        manual.set(ids, &roster);

        let effective = manual.effective_order(&roster);
        let expected: HashSet<&str> = roster.iter().map(|c| c.id.as_str()).collect();
        let actual: HashSet<&str> = effective.iter().map(String::as_str).collect();
        prop_assert_eq!(effective.len(), roster.len());
        prop_assert_eq!(actual, expected);

        if let Some(ids) = manual.ids() {
            prop_assert_ne!(ids.to_vec(), initiative_order(&roster));
        }
    }
}
