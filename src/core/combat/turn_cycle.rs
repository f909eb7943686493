//! Turn Cycle state machine.
//!
//! ```text
//!            start / advance                 advance
//!   Idle ───────────────────────▶ InTurn ◀────────────┐
//!    ▲                              │  └──────────────┘
//!    └──────── end / empty roster ──┘
//! ```
//!
//! The cycle only holds combatant *ids*. Every transition takes the current
//! roster and effective order as arguments, so a combatant removed mid-fight
//! is handled by the next call rather than by a dangling reference.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::combatant::Combatant;
use super::stats::{compute_stats, CombatStatsSummary};

pub const UNKNOWN_COMBATANT: &str = "Unknown combatant";

// ============================================================================
// History
// ============================================================================

/// One completed turn. The name is captured when the turn closes so the entry
/// survives the combatant being removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TurnHistoryEntry {
    pub combatant_id: String,
    pub combatant_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// `max(0, ended_at - started_at)` in milliseconds.
    pub duration_ms: i64,
    #[serde(default = "first_round")]
    pub round: u32,
}

fn first_round() -> u32 {
    1
}

impl TurnHistoryEntry {
    pub fn new(
        combatant_id: impl Into<String>,
        combatant_name: impl Into<String>,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        round: u32,
    ) -> Self {
        Self {
            combatant_id: combatant_id.into(),
            combatant_name: combatant_name.into(),
            started_at,
            ended_at,
            duration_ms: (ended_at - started_at).num_milliseconds().max(0),
            round,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }
}

// ============================================================================
// Active turn
// ============================================================================

/// Present exactly while combat is running; id and start time live and die together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTurn {
    pub combatant_id: String,
    pub started_at: DateTime<Utc>,
    pub round: u32,
}

/// What [`TurnCycle::reconcile`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Unchanged,
    /// The roster emptied; combat dropped back to idle.
    Idled,
    /// The turn holder disappeared; the first combatant in order now holds the turn.
    Reselected { combatant_id: String },
}

#[derive(Debug, Clone)]
pub struct TurnCycle {
    active: Option<ActiveTurn>,
    history: Vec<TurnHistoryEntry>,
    summary: Option<CombatStatsSummary>,
    stats_visible: bool,
    unknown_label: String,
}

impl Default for TurnCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnCycle {
    pub fn new() -> Self {
        Self {
            active: None,
            history: Vec::new(),
            summary: None,
            stats_visible: false,
            unknown_label: UNKNOWN_COMBATANT.to_string(),
        }
    }

    /// Name recorded for turns whose combatant was removed before the turn closed.
    pub fn with_unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = label.into();
        self
    }

    /// Restore a finished history (e.g. from a snapshot). Always idle afterwards.
    pub fn with_history(mut self, history: Vec<TurnHistoryEntry>) -> Self {
        self.active = None;
        self.history = history;
        self.summary = None;
        self.stats_visible = false;
        self
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn is_in_turn(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveTurn> {
        self.active.as_ref()
    }

    pub fn active_combatant_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.combatant_id.as_str())
    }

    pub fn turn_started_at(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.started_at)
    }

    pub fn round(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.round)
    }

    pub fn history(&self) -> &[TurnHistoryEntry] {
        &self.history
    }

    /// 1-based number of the turn in progress.
    pub fn turn_number(&self) -> Option<usize> {
        self.active.as_ref().map(|_| self.history.len() + 1)
    }

    /// Live clock for the active turn. Display only.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.active
            .as_ref()
            .map(|a| (now - a.started_at).max(Duration::zero()))
    }

    pub fn summary(&self) -> Option<&CombatStatsSummary> {
        self.summary.as_ref()
    }

    pub fn stats_visible(&self) -> bool {
        self.stats_visible
    }

    pub fn dismiss_stats(&mut self) {
        self.stats_visible = false;
    }

    // ── Transitions ─────────────────────────────────────────────────────────

    /// Begin a fresh combat with the first combatant in `order`.
    ///
    /// Clears the previous history. Does nothing for an empty roster.
    pub fn start(&mut self, order: &[String], now: DateTime<Utc>) -> bool {
        let Some(first) = order.first() else {
            return false;
        };
        self.history.clear();
        self.summary = None;
        self.stats_visible = false;
        self.active = Some(ActiveTurn {
            combatant_id: first.clone(),
            started_at: now,
            round: 1,
        });
        tracing::info!(combatant_id = %first, combatants = order.len(), "Combat started");
        true
    }

    /// Close the current turn and hand it to the next combatant in `order`.
    ///
    /// Starts combat when idle. If the turn holder is no longer in `order`
    /// the first combatant takes over.
    pub fn advance(&mut self, roster: &[Combatant], order: &[String], now: DateTime<Utc>) -> bool {
        if order.is_empty() {
            return false;
        }
        let Some(current) = self.active.as_ref() else {
            return self.start(order, now);
        };

        let (next_index, wrapped) = match order.iter().position(|id| *id == current.combatant_id) {
            Some(index) => {
                let next = (index + 1) % order.len();
                (next, next == 0)
            }
            None => (0, false),
        };
        let round = if wrapped { current.round + 1 } else { current.round };

        self.record_turn(roster, now);
        let next_id = order[next_index].clone();
        tracing::debug!(combatant_id = %next_id, round, "Turn advanced");
        self.active = Some(ActiveTurn {
            combatant_id: next_id,
            started_at: now,
            round,
        });
        true
    }

    /// Close the final turn, compute statistics and return to idle.
    pub fn end(&mut self, roster: &[Combatant], now: DateTime<Utc>) -> Option<&CombatStatsSummary> {
        if self.active.is_none() {
            return None;
        }
        self.record_turn(roster, now);
        self.active = None;
        let summary = compute_stats(&self.history);
        tracing::info!(
            turns = summary.total_turns,
            total_ms = summary.total_duration_ms,
            "Combat ended"
        );
        self.summary = Some(summary);
        self.stats_visible = true;
        self.summary.as_ref()
    }

    /// Re-validate the turn holder after the roster changed.
    pub fn reconcile(&mut self, order: &[String], now: DateTime<Utc>) -> Reconciled {
        if self.active.is_none() {
            return Reconciled::Unchanged;
        }
        let Some(first) = order.first() else {
            self.active = None;
            tracing::debug!("Roster emptied mid-combat, returning to idle");
            return Reconciled::Idled;
        };
        let Some(active) = self.active.as_mut() else {
            return Reconciled::Unchanged;
        };
        if order.iter().any(|id| *id == active.combatant_id) {
            return Reconciled::Unchanged;
        }

        tracing::debug!(
            removed = %active.combatant_id,
            combatant_id = %first,
            "Turn holder left the roster, reselecting"
        );
        active.combatant_id = first.clone();
        active.started_at = now;
        Reconciled::Reselected {
            combatant_id: first.clone(),
        }
    }

    fn record_turn(&mut self, roster: &[Combatant], now: DateTime<Utc>) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let name = roster
            .iter()
            .find(|c| c.id == active.combatant_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| self.unknown_label.clone());
        self.history.push(TurnHistoryEntry::new(
            active.combatant_id.clone(),
            name,
            active.started_at,
            now,
            active.round,
        ));
    }
}
