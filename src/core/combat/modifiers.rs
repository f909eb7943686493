//! Damage modifier resolution.
//!
//! There are two independent paths and they round differently:
//!
//! - **Manual toggle** ([`ManualModifier`]): a per-adjustment flag the GM
//!   flips on the damage entry. Resistant halves rounding *down*.
//! - **Typed damage** ([`resolve_typed`]): bulk/area damage tagged with a
//!   damage type and matched against each target's declared
//!   [`DamageDefenses`]. Resistant halves rounding *up*.
//!
//! The two conventions are kept as separate functions on purpose; do not
//! fold them together.

use serde::{Deserialize, Serialize};

use super::combatant::DamageDefenses;

/// Single-select modifier toggle on a damage entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManualModifier {
    #[default]
    Normal,
    Resistant,
    Vulnerable,
}

impl ManualModifier {
    /// Selecting the active modifier again clears it.
    pub fn select(self, choice: ManualModifier) -> ManualModifier {
        if self == choice {
            ManualModifier::Normal
        } else {
            choice
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Resistant => "resistant (½)",
            Self::Vulnerable => "vulnerable (×2)",
        }
    }

    /// Manual path: `floor(amount / 2)` when resistant, `amount * 2` when vulnerable.
    pub fn apply(self, amount: i32) -> i32 {
        if amount <= 0 {
            return 0;
        }
        match self {
            Self::Normal => amount,
            Self::Resistant => amount / 2,
            Self::Vulnerable => amount.saturating_mul(2),
        }
    }
}

/// How a typed hit interacted with the target's defenses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DamageResponse {
    Immune,
    Resistant,
    Vulnerable,
    Normal,
}

impl DamageResponse {
    /// Immunity wins over resistance, which wins over vulnerability.
    pub fn classify(defenses: &DamageDefenses, damage_type: &str) -> Self {
        if defenses.is_immune_to(damage_type) {
            Self::Immune
        } else if defenses.resists(damage_type) {
            Self::Resistant
        } else if defenses.is_vulnerable_to(damage_type) {
            Self::Vulnerable
        } else {
            Self::Normal
        }
    }
}

/// Typed path: immune → 0, resistant → `ceil(amount / 2)`, vulnerable → `amount * 2`.
pub fn resolve_typed(defenses: &DamageDefenses, damage_type: &str, amount: i32) -> (i32, DamageResponse) {
    let response = DamageResponse::classify(defenses, damage_type);
    if amount <= 0 {
        return (0, response);
    }
    let adjusted = match response {
        DamageResponse::Immune => 0,
        DamageResponse::Resistant => amount / 2 + amount % 2,
        DamageResponse::Vulnerable => amount.saturating_mul(2),
        DamageResponse::Normal => amount,
    };
    (adjusted, response)
}
