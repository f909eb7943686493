//! Combat snapshot import/export.
//!
//! Snapshots are plain JSON. Loading never trusts the payload: each combatant
//! record is decoded on its own into `Result<Combatant, RecordError>`, bad
//! records are dropped and reported, and the survivors are clamped and
//! de-duplicated before the tracker sees them. Active-turn state is never
//! persisted.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::adjustment::{parse_whole_number, whole_number_from_f64};
use super::combatant::{normalize_tags, Combatant, CombatantType, DamageDefenses};
use super::error::{RecordError, SnapshotError, SnapshotResult};
use super::turn_cycle::{TurnHistoryEntry, UNKNOWN_COMBATANT};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombatSnapshot {
    pub version: u32,
    pub combatants: Vec<Combatant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_order: Option<Vec<String>>,
    #[serde(default)]
    pub history: Vec<TurnHistoryEntry>,
}

impl Default for CombatSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            combatants: vec![],
            manual_order: None,
            history: vec![],
        }
    }
}

/// A combatant record that did not survive import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub index: usize,
    pub error: RecordError,
}

/// Result of importing a snapshot payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub snapshot: CombatSnapshot,
    pub rejected: Vec<RejectedRecord>,
    /// Records whose id was missing or already taken.
    pub reissued_ids: usize,
    /// Records whose current HP was outside `[0, max_hp]`.
    pub clamped_hp: usize,
    pub dropped_history: usize,
}

impl CombatSnapshot {
    pub fn to_json_pretty(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot, creating parent directories as needed.
    ///
    /// Writes to a sibling temp file first and renames it into place.
    pub fn save_to_file(&self, path: &Path) -> SnapshotResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = self.to_json_pretty()?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        tracing::info!(path = %path.display(), combatants = self.combatants.len(), "Combat snapshot saved");
        Ok(())
    }

    pub fn load_from_file(path: &Path, loaded_at: DateTime<Utc>) -> SnapshotResult<ImportReport> {
        let text = fs::read_to_string(path)?;
        let report = Self::import_str(&text, loaded_at)?;
        tracing::info!(
            path = %path.display(),
            combatants = report.snapshot.combatants.len(),
            rejected = report.rejected.len(),
            "Combat snapshot loaded"
        );
        Ok(report)
    }

    pub fn import_str(text: &str, loaded_at: DateTime<Utc>) -> SnapshotResult<ImportReport> {
        let value: Value = serde_json::from_str(text)?;
        Self::import_value(value, loaded_at)
    }

    /// Sanitize an arbitrary JSON payload.
    ///
    /// Accepts a snapshot object or a bare array of combatant records.
    /// `loaded_at` stamps records that carry no creation time, one
    /// microsecond apart so their list order is kept for initiative ties.
    pub fn import_value(value: Value, loaded_at: DateTime<Utc>) -> SnapshotResult<ImportReport> {
        let (records, manual_order, history) = match value {
            Value::Array(records) => (records, None, Vec::new()),
            Value::Object(mut root) => {
                let version = root
                    .get("version")
                    .and_then(Value::as_u64)
                    .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
                    .unwrap_or(SNAPSHOT_VERSION);
                if version > SNAPSHOT_VERSION {
                    return Err(SnapshotError::UnsupportedVersion(version));
                }
                let records = match root.remove("combatants") {
                    Some(Value::Array(records)) => records,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => {
                        return Err(SnapshotError::Layout(format!(
                            "'combatants' must be an array, found {}",
                            json_kind(&other)
                        )))
                    }
                };
                let manual_order = root.remove("manualOrder").and_then(string_list);
                let history = match root.remove("history") {
                    Some(Value::Array(entries)) => entries,
                    _ => Vec::new(),
                };
                (records, manual_order, history)
            }
            other => {
                return Err(SnapshotError::Layout(format!(
                    "expected an object or array, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut combatants = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut reissued_ids = 0;
        let mut clamped_hp = 0;

        for (index, record) in records.into_iter().enumerate() {
            let fallback_created = loaded_at + Duration::microseconds(index as i64);
            match decode_combatant(&record, fallback_created) {
                Ok(decoded) => {
                    let mut combatant = decoded.combatant;
                    if decoded.hp_clamped {
                        clamped_hp += 1;
                    }
                    if combatant.id.is_empty() || seen_ids.contains(&combatant.id) {
                        combatant.id = Uuid::new_v4().to_string();
                        reissued_ids += 1;
                    }
                    seen_ids.insert(combatant.id.clone());
                    combatants.push(combatant);
                }
                Err(error) => {
                    tracing::warn!(index, %error, "Dropping invalid combatant record");
                    rejected.push(RejectedRecord { index, error });
                }
            }
        }

        let total_history = history.len();
        let history: Vec<TurnHistoryEntry> = history.iter().filter_map(decode_history_entry).collect();
        let dropped_history = total_history - history.len();
        if dropped_history > 0 {
            tracing::warn!(dropped_history, "Dropped malformed turn history entries");
        }

        Ok(ImportReport {
            snapshot: CombatSnapshot {
                version: SNAPSHOT_VERSION,
                combatants,
                manual_order,
                history,
            },
            rejected,
            reissued_ids,
            clamped_hp,
            dropped_history,
        })
    }
}

// ============================================================================
// Record decoding
// ============================================================================

struct DecodedCombatant {
    combatant: Combatant,
    hp_clamped: bool,
}

fn decode_combatant(value: &Value, fallback_created: DateTime<Utc>) -> Result<DecodedCombatant, RecordError> {
    let record = value.as_object().ok_or(RecordError::NotAnObject)?;

    let name = record
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(RecordError::MissingName)?
        .to_string();

    let max_hp = number_field(record, "maxHp")
        .filter(|hp| *hp > 0)
        .ok_or(RecordError::InvalidMaxHp)?;

    let raw_current = number_field(record, "currentHp").unwrap_or(max_hp);
    let current_hp = raw_current.clamp(0, max_hp);

    let combatant_type = match record.get("type").and_then(Value::as_str) {
        Some(t) if t.trim().eq_ignore_ascii_case("monster") => CombatantType::Monster,
        Some(t) if t.trim().eq_ignore_ascii_case("player") => CombatantType::Player,
        None => CombatantType::Player,
        Some(other) => return Err(RecordError::Malformed(format!("unknown combatant type '{other}'"))),
    };

    let created_at = match record.get("createdAt") {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RecordError::Malformed(format!("createdAt: {e}")))?,
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| RecordError::Malformed("createdAt out of range".to_string()))?,
        _ => fallback_created,
    };

    let id = record
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let mut tags = list_field(record, "tags");
    normalize_tags(&mut tags);

    let defenses = DamageDefenses {
        damage_immunities: list_field(record, "damageImmunities"),
        damage_resistances: list_field(record, "damageResistances"),
        damage_vulnerabilities: list_field(record, "damageVulnerabilities"),
    }
    .normalized();

    Ok(DecodedCombatant {
        combatant: Combatant {
            id,
            name,
            combatant_type,
            max_hp,
            current_hp,
            initiative: number_field(record, "initiative").unwrap_or(0),
            created_at,
            armor_class: number_field(record, "armorClass"),
            notes: record
                .get("notes")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            tags,
            defenses,
        },
        hp_clamped: raw_current != current_hp,
    })
}

/// Numbers or numeric strings, truncated toward zero.
fn number_field(record: &Map<String, Value>, key: &str) -> Option<i32> {
    match record.get(key)? {
        Value::Number(n) => n.as_f64().and_then(whole_number_from_f64),
        Value::String(s) => parse_whole_number(s),
        _ => None,
    }
}

/// String arrays, or a single comma-separated string as stat blocks often use.
fn list_field(record: &Map<String, Value>, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::String(s)) => s.split(',').map(|p| p.trim().to_string()).collect(),
        Some(value) => string_list(value.clone()).unwrap_or_default(),
        None => Vec::new(),
    }
}

fn string_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHistoryEntry {
    combatant_id: String,
    #[serde(default)]
    combatant_name: Option<String>,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    #[serde(default)]
    round: Option<u32>,
}

/// Durations are always recomputed from the timestamps.
fn decode_history_entry(value: &Value) -> Option<TurnHistoryEntry> {
    let raw: RawHistoryEntry = serde_json::from_value(value.clone()).ok()?;
    let name = raw
        .combatant_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_COMBATANT.to_string());
    Some(TurnHistoryEntry::new(
        raw.combatant_id,
        name,
        raw.started_at,
        raw.ended_at,
        raw.round.unwrap_or(1).max(1),
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
