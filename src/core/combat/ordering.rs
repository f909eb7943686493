//! Initiative ordering.
//!
//! The automatic order is never stored: it is recomputed from the roster on
//! every query (initiative descending, then creation time ascending). A GM may
//! layer a [`ManualOrder`] on top; it is reconciled against the roster after
//! every change and thrown away as soon as it matches the automatic order.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::combatant::Combatant;

/// Initiative comparator: higher initiative first, earlier-created first on ties.
///
/// Ids break the (otherwise impossible) case of identical creation stamps in
/// imported data, which keeps this a total order.
pub fn compare_initiative(a: &Combatant, b: &Combatant) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Roster ids in automatic initiative order. The input slice is not touched.
pub fn initiative_order(combatants: &[Combatant]) -> Vec<String> {
    let mut sorted: Vec<&Combatant> = combatants.iter().collect();
    sorted.sort_by(|a, b| compare_initiative(a, b));
    sorted.into_iter().map(|c| c.id.clone()).collect()
}

/// Host-specified permutation of the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualOrder {
    ids: Option<Vec<String>>,
}

impl ManualOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.ids.is_some()
    }

    pub fn ids(&self) -> Option<&[String]> {
        self.ids.as_deref()
    }

    pub fn clear(&mut self) {
        self.ids = None;
    }

    /// Install an override and immediately reconcile it with the roster.
    pub fn set(&mut self, ids: Vec<String>, combatants: &[Combatant]) {
        self.ids = Some(ids);
        self.sanitize(combatants);
    }

    /// Reconcile against the roster.
    ///
    /// Stale and duplicate ids are dropped, combatants missing from the
    /// override are appended in initiative order, and the override is
    /// discarded once it equals the automatic order.
    pub fn sanitize(&mut self, combatants: &[Combatant]) {
        let Some(ids) = self.ids.take() else {
            return;
        };
        let automatic = initiative_order(combatants);
        let present: HashSet<&str> = automatic.iter().map(String::as_str).collect();

        let mut seen: HashSet<String> = HashSet::with_capacity(ids.len());
        let mut reconciled: Vec<String> = ids
            .into_iter()
            .filter(|id| present.contains(id.as_str()) && seen.insert(id.clone()))
            .collect();
        for id in &automatic {
            if !seen.contains(id) {
                reconciled.push(id.clone());
            }
        }

        if reconciled != automatic {
            self.ids = Some(reconciled);
        } else {
            tracing::debug!("Manual order matches initiative order, collapsing");
        }
    }

    /// The order turns are actually taken in.
    pub fn effective_order(&self, combatants: &[Combatant]) -> Vec<String> {
        let mut copy = self.clone();
        copy.sanitize(combatants);
        match copy.ids {
            Some(ids) => ids,
            None => initiative_order(combatants),
        }
    }

    /// Swap a combatant with the one before it in the effective order.
    pub fn move_up(&mut self, id: &str, combatants: &[Combatant]) -> bool {
        self.shift(id, combatants, -1)
    }

    /// Swap a combatant with the one after it in the effective order.
    pub fn move_down(&mut self, id: &str, combatants: &[Combatant]) -> bool {
        self.shift(id, combatants, 1)
    }

    fn shift(&mut self, id: &str, combatants: &[Combatant], step: isize) -> bool {
        let mut order = self.effective_order(combatants);
        let Some(pos) = order.iter().position(|o| o == id) else {
            return false;
        };
        let Some(target) = pos.checked_add_signed(step).filter(|t| *t < order.len()) else {
            return false;
        };
        order.swap(pos, target);
        self.set(order, combatants);
        true
    }
}
