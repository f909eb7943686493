//! Combat Module
//!
//! Initiative & turn management for an encounter: the combatant roster,
//! initiative ordering with an optional manual override, the turn cycle with
//! per-turn timing, damage modifiers and end-of-combat statistics.

pub mod adjustment;
pub mod clock;
pub mod combatant;
pub mod error;
pub mod modifiers;
pub mod ordering;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod tracker;
pub mod turn_cycle;

// Re-exports for convenience
pub use adjustment::{parse_adjustment, parse_whole_number, sum_positive_terms};
pub use clock::{Clock, ManualClock, SystemClock};
pub use combatant::{Combatant, CombatantPatch, CombatantType, DamageDefenses, NewCombatant};
pub use error::{RecordError, SnapshotError, SnapshotResult, ValidationError};
pub use modifiers::{resolve_typed, DamageResponse, ManualModifier};
pub use ordering::{compare_initiative, initiative_order, ManualOrder};
pub use snapshot::{CombatSnapshot, ImportReport, RejectedRecord, SNAPSHOT_VERSION};
pub use stats::{compute_stats, format_duration_ms, CombatStatsSummary, CombatantTurnStats};
pub use store::{CombatantStore, HpChange, TypedHit};
pub use tracker::CombatTracker;
pub use turn_cycle::{ActiveTurn, Reconciled, TurnCycle, TurnHistoryEntry, UNKNOWN_COMBATANT};
