//! Property-based tests for HP bookkeeping

use proptest::prelude::*;

use crate::core::combat::{CombatantStore, CombatantType, ManualModifier, NewCombatant};
use crate::tests::common::fixtures::at;

#[derive(Debug, Clone)]
enum HpOp {
    Damage(i32, ManualModifier),
    DamageText(String),
    Heal(i32),
    HealText(String),
    Reset,
}

fn arb_modifier() -> impl Strategy<Value = ManualModifier> {
    prop_oneof![
        Just(ManualModifier::Normal),
        Just(ManualModifier::Resistant),
        Just(ManualModifier::Vulnerable),
    ]
}

/// Free-form adjustment entries, including junk and negative terms.
fn arb_adjustment_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,3}( [0-9]{1,3}){0,3}",
        "[0-9]{1,3}(,[0-9]{1,3}){0,3}",
        "[0-9+ ,.-]{0,12}",
        "[a-z0-9 ]{0,8}",
    ]
}

fn arb_op() -> impl Strategy<Value = HpOp> {
    prop_oneof![
        (i32::MIN..i32::MAX, arb_modifier()).prop_map(|(a, m)| HpOp::Damage(a, m)),
        arb_adjustment_text().prop_map(HpOp::DamageText),
        (-50i32..500).prop_map(HpOp::Heal),
        arb_adjustment_text().prop_map(HpOp::HealText),
        Just(HpOp::Reset),
    ]
}

proptest! {
    /// Property: current HP stays within [0, max] after every step
    #[test]
    fn prop_hp_always_clamped(
        max_hp in 1i32..500,
        ops in prop::collection::vec(arb_op(), 1..40)
    ) {
        let mut store = CombatantStore::new();
        let id = store
            .add(NewCombatant::new("Target", max_hp, 10, CombatantType::Monster), at(0))
            .unwrap()
            .id
            .clone();

        for op in ops {
            match op {
                HpOp::Damage(amount, modifier) => {
                    store.apply_damage(&id, amount, modifier);
                }
                HpOp::DamageText(raw) => {
                    let _ = store.apply_damage_text(&id, &raw, ManualModifier::Normal);
                }
                HpOp::Heal(amount) => {
                    store.apply_healing(&id, amount);
                }
                HpOp::HealText(raw) => {
                    let _ = store.apply_healing_text(&id, &raw);
                }
                HpOp::Reset => {
                    store.reset(&id);
                }
            }
            let c = store.get(&id).unwrap();
            prop_assert!(c.current_hp >= 0 && c.current_hp <= c.max_hp,
                "HP {} escaped [0, {}]", c.current_hp, c.max_hp);
            prop_assert_eq!(c.max_hp, max_hp);
        }
    }

    /// Property: damage never raises HP and healing never lowers it
    #[test]
    fn prop_adjustments_move_hp_one_way(
        max_hp in 1i32..500,
        damage in arb_adjustment_text(),
        heal in arb_adjustment_text()
    ) {
        let mut store = CombatantStore::new();
        let id = store
            .add(NewCombatant::new("Target", max_hp, 10, CombatantType::Player), at(0))
            .unwrap()
            .id
            .clone();

        let before = store.get(&id).unwrap().current_hp;
        let _ = store.apply_damage_text(&id, &damage, ManualModifier::Normal);
        let after_damage = store.get(&id).unwrap().current_hp;
        prop_assert!(after_damage <= before);

        let _ = store.apply_healing_text(&id, &heal);
        let after_heal = store.get(&id).unwrap().current_hp;
        prop_assert!(after_heal >= after_damage);
    }

    /// Property: rejected entries leave HP untouched
    #[test]
    fn prop_rejected_entry_is_no_op(max_hp in 1i32..500, raw in "[a-z ]{0,10}") {
        let mut store = CombatantStore::new();
        let id = store
            .add(NewCombatant::new("Target", max_hp, 10, CombatantType::Player), at(0))
            .unwrap()
            .id
            .clone();
        store.apply_damage(&id, 1, ManualModifier::Normal);
        let before = store.get(&id).unwrap().current_hp;

        prop_assert!(store.apply_damage_text(&id, &raw, ManualModifier::Normal).is_err());
        prop_assert!(store.apply_healing_text(&id, &raw).is_err());
        prop_assert_eq!(store.get(&id).unwrap().current_hp, before);
    }
}
