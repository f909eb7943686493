//! Combat Statistics Aggregator.
//!
//! A pure fold over the finished turn history. Extremes are picked with a
//! left fold that only replaces the running best on a strict improvement, so
//! the first entry wins every tie.

use serde::{Deserialize, Serialize};

use super::turn_cycle::TurnHistoryEntry;

/// Turn-time rollup for one combatant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombatantTurnStats {
    pub combatant_id: String,
    /// Name from the combatant's most recent turn.
    pub combatant_name: String,
    pub total_duration_ms: i64,
    pub turn_count: usize,
    pub longest_turn_ms: i64,
    pub average_duration_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombatStatsSummary {
    pub total_duration_ms: i64,
    pub total_turns: usize,
    /// `None` when there were no turns.
    pub average_turn_duration_ms: Option<f64>,
    pub longest_turn: Option<TurnHistoryEntry>,
    pub fastest_turn: Option<TurnHistoryEntry>,
    /// Sorted by total time, most first.
    pub per_combatant: Vec<CombatantTurnStats>,
    pub slowest_average: Option<CombatantTurnStats>,
    pub quickest_average: Option<CombatantTurnStats>,
}

impl CombatStatsSummary {
    pub fn is_empty(&self) -> bool {
        self.total_turns == 0
    }

    pub fn for_combatant(&self, combatant_id: &str) -> Option<&CombatantTurnStats> {
        self.per_combatant.iter().find(|c| c.combatant_id == combatant_id)
    }
}

/// First element for which `better(candidate, best)` never held.
fn first_extreme<'a, T, F>(items: impl IntoIterator<Item = &'a T>, better: F) -> Option<&'a T>
where
    T: 'a,
    F: Fn(&T, &T) -> bool,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(current) if !better(item, current) => Some(current),
        _ => Some(item),
    })
}

pub fn compute_stats(history: &[TurnHistoryEntry]) -> CombatStatsSummary {
    if history.is_empty() {
        return CombatStatsSummary::default();
    }

    // Imported history can carry absurd spans; totals saturate rather than overflow.
    let total_duration_ms = history
        .iter()
        .fold(0i64, |total, h| total.saturating_add(h.duration_ms));
    let total_turns = history.len();

    let longest_turn = first_extreme(history, |a, b| a.duration_ms > b.duration_ms).cloned();
    let fastest_turn = first_extreme(history, |a, b| a.duration_ms < b.duration_ms).cloned();

    // Group in first-appearance order so the stable sort below keeps it for ties.
    let mut per_combatant: Vec<CombatantTurnStats> = Vec::new();
    for entry in history {
        match per_combatant
            .iter_mut()
            .find(|c| c.combatant_id == entry.combatant_id)
        {
            Some(stats) => {
                stats.total_duration_ms = stats.total_duration_ms.saturating_add(entry.duration_ms);
                stats.turn_count += 1;
                stats.longest_turn_ms = stats.longest_turn_ms.max(entry.duration_ms);
                stats.combatant_name.clone_from(&entry.combatant_name);
            }
            None => per_combatant.push(CombatantTurnStats {
                combatant_id: entry.combatant_id.clone(),
                combatant_name: entry.combatant_name.clone(),
                total_duration_ms: entry.duration_ms,
                turn_count: 1,
                longest_turn_ms: entry.duration_ms,
                average_duration_ms: 0.0,
            }),
        }
    }
    for stats in &mut per_combatant {
        stats.average_duration_ms = stats.total_duration_ms as f64 / stats.turn_count as f64;
    }
    per_combatant.sort_by(|a, b| b.total_duration_ms.cmp(&a.total_duration_ms));

    let slowest_average =
        first_extreme(&per_combatant, |a, b| a.average_duration_ms > b.average_duration_ms).cloned();
    let quickest_average =
        first_extreme(&per_combatant, |a, b| a.average_duration_ms < b.average_duration_ms).cloned();

    CombatStatsSummary {
        total_duration_ms,
        total_turns,
        average_turn_duration_ms: Some(total_duration_ms as f64 / total_turns as f64),
        longest_turn,
        fastest_turn,
        per_combatant,
        slowest_average,
        quickest_average,
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up. Negative input renders as zero.
pub fn format_duration_ms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
