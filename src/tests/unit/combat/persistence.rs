//! Saving and restoring a tracker through snapshots.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use crate::core::combat::{
    Clock, CombatSnapshot, CombatTracker, CombatantType, ManualClock, ManualModifier, NewCombatant,
    RecordError, UNKNOWN_COMBATANT,
};
use crate::tests::common::fixtures::*;

#[test]
fn test_tracker_survives_a_save_and_reload() {
    let (mut tracker, clock, ids) = create_tracker_with(&[("A", 20), ("B", 15), ("C", 10)]);
    tracker
        .apply_damage(&ids[1], "7", ManualModifier::Normal)
        .unwrap();
    tracker.set_manual_order(vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);
    tracker.start_combat();
    clock.advance_secs(12);
    tracker.advance_turn();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("combat.json");
    tracker.snapshot().save_to_file(&path).unwrap();

    let report = CombatSnapshot::load_from_file(&path, clock.now()).unwrap();
    assert!(report.rejected.is_empty());
    assert_eq!(report.reissued_ids, 0);

    let restored = CombatTracker::from_snapshot(report.snapshot, Arc::new(ManualClock::at_epoch()));
    assert_eq!(restored.effective_order(), tracker.effective_order());
    assert_eq!(current_hp(&restored, &ids[1]), 13);
    assert_eq!(restored.history(), tracker.history());
    assert!(restored.has_manual_order());
    // The live turn is not persisted.
    assert!(!restored.is_in_turn());
}

#[test]
fn test_descriptive_fields_survive_a_reload() {
    let (mut tracker, clock) = create_test_tracker();
    let id = tracker
        .add_combatant(
            NewCombatant::new("Vampire Spawn", 82, 14, CombatantType::Monster)
                .with_armor_class(15)
                .with_notes("Regenerates unless in sunlight")
                .with_tags(["undead", " Undead ", "", "boss"])
                .with_defenses(defenses(&[], &["necrotic"], &["radiant"])),
        )
        .unwrap();

    let json = tracker.snapshot().to_json_pretty().unwrap();
    let report = CombatSnapshot::import_str(&json, clock.now()).unwrap();
    let restored = CombatTracker::from_snapshot(report.snapshot, clock.clone());

    let spawn = restored.get(&id).unwrap();
    assert_eq!(spawn.armor_class, Some(15));
    assert_eq!(spawn.notes, "Regenerates unless in sunlight");
    assert_eq!(spawn.tags, vec!["undead", "boss"]);
    assert!(spawn.defenses.resists("Necrotic"));
    assert!(spawn.defenses.is_vulnerable_to("radiant"));
}

#[test]
fn test_import_sanitizes_untrusted_records() {
    let payload = json!({
        "version": 1,
        "combatants": [
            { "id": "x", "name": "Ogre", "maxHp": 59, "currentHp": 80, "initiative": "8.9" },
            { "id": "x", "name": "Ogre Twin", "maxHp": 59, "type": "Monster" },
            { "name": "Ghost", "maxHp": 0 },
            { "name": "   ", "maxHp": 10 },
            "not a record",
            { "name": "Imp", "maxHp": 10, "damageResistances": "fire, cold" }
        ],
        "history": [
            { "combatantId": "x", "startedAt": "2026-01-01T00:00:00Z", "endedAt": "2026-01-01T00:00:05Z" },
            { "combatantId": "x" }
        ]
    });

    let report = CombatSnapshot::import_value(payload, at(0)).unwrap();
    let combatants = &report.snapshot.combatants;
    assert_eq!(combatants.len(), 3);
    assert_eq!(combatants[0].current_hp, 59);
    assert_eq!(combatants[0].initiative, 8);
    assert_ne!(combatants[1].id, "x");
    assert_eq!(report.reissued_ids, 1);
    assert_eq!(report.clamped_hp, 1);
    assert_eq!(
        combatants[2].defenses.damage_resistances,
        vec!["fire".to_string(), "cold".to_string()]
    );

    let errors: Vec<&RecordError> = report.rejected.iter().map(|r| &r.error).collect();
    assert_eq!(
        errors,
        vec![&RecordError::InvalidMaxHp, &RecordError::MissingName, &RecordError::NotAnObject]
    );

    assert_eq!(report.snapshot.history.len(), 1);
    assert_eq!(report.dropped_history, 1);
    assert_eq!(report.snapshot.history[0].duration_ms, 5_000);
    assert_eq!(report.snapshot.history[0].combatant_name, UNKNOWN_COMBATANT);
}

#[test]
fn test_records_without_timestamps_keep_file_order_on_ties() {
    let payload = json!([
        { "name": "First", "maxHp": 5, "initiative": 10 },
        { "name": "Second", "maxHp": 5, "initiative": 10 }
    ]);
    let report = CombatSnapshot::import_value(payload, at(100)).unwrap();
    let tracker = CombatTracker::from_snapshot(report.snapshot, Arc::new(ManualClock::at_epoch()));
    assert_eq!(turn_order_names(&tracker), vec!["First", "Second"]);
}
