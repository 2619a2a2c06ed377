//! Staff roster — typed records and the normalization step that turns
//! loosely typed tabular rows into them.
//!
//! RULE: Scoring never sees raw rows. Every field is coerced here, once,
//! and any field that fails coercion is recorded as a `FieldIssue` on the
//! record instead of aborting the load.

use crate::{
    config::RosterConfig,
    error::{DeskError, DeskResult},
    types::StaffId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Transient self-reported "weather" of a staff member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodStatus {
    #[default]
    Normal,
    Storm,
    Sunshine,
    IceCream,
}

impl MoodStatus {
    pub const ALL: [MoodStatus; 4] = [
        MoodStatus::Normal,
        MoodStatus::Storm,
        MoodStatus::Sunshine,
        MoodStatus::IceCream,
    ];

    /// Parse an English or German label. Case, spaces and underscores
    /// are ignored ("ice_cream", "Ice Cream", "Eisschlecken").
    pub fn from_label(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "normal" => Some(Self::Normal),
            "storm" | "gewitter" => Some(Self::Storm),
            "sunshine" | "sonnenschein" => Some(Self::Sunshine),
            "icecream" | "eisschlecken" => Some(Self::IceCream),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal   => "Normal",
            Self::Storm    => "Storm",
            Self::Sunshine => "Sunshine",
            Self::IceCream => "IceCream",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Normal   => "🟢",
            Self::Storm    => "🔴",
            Self::Sunshine => "🟡",
            Self::IceCream => "⚪",
        }
    }
}

/// A field that could not be coerced. The raw value is kept so that a
/// saved roster round-trips the operator's input unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field:  String,
    pub raw:    Value,
    pub reason: String,
}

/// One employee, fully typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id:                  StaffId,
    pub display_name:        String,
    pub employment_fraction: f64, // 0.0–1.0
    pub ward_fraction:       f64, // 0.0–1.0
    pub available:           bool,
    pub present_morning:     bool,
    pub present_afternoon:   bool,
    pub mood_status:         MoodStatus,
    pub umbrella_friend:     bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues:              Vec<FieldIssue>,
}

impl StaffRecord {
    /// Available, present all day, Normal mood, no umbrella.
    pub fn new(
        id: impl Into<StaffId>,
        display_name: impl Into<String>,
        employment_fraction: f64,
        ward_fraction: f64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            employment_fraction: clamp_fraction(employment_fraction),
            ward_fraction: clamp_fraction(ward_fraction),
            available: true,
            present_morning: true,
            present_afternoon: true,
            mood_status: MoodStatus::Normal,
            umbrella_friend: false,
            issues: Vec::new(),
        }
    }

    pub fn with_mood(mut self, mood: MoodStatus) -> Self {
        self.mood_status = mood;
        self
    }

    pub fn with_umbrella_friend(mut self, umbrella_friend: bool) -> Self {
        self.umbrella_friend = umbrella_friend;
        self
    }

    /// Sets the base flag and both presence defaults together.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self.present_morning = available;
        self.present_afternoon = available;
        self
    }

    /// True when every field coerced cleanly.
    pub fn is_well_formed(&self) -> bool {
        self.issues.is_empty()
    }

    fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }

    fn raw_for(&self, field: &str) -> Option<&Value> {
        self.issues.iter().find(|i| i.field == field).map(|i| &i.raw)
    }
}

fn clamp_fraction(f: f64) -> f64 {
    if f.is_nan() { f } else { f.clamp(0.0, 1.0) }
}

// ── Raw rows ──────────────────────────────────────────────────────────

/// A loosely typed roster row as it arrives from a tabular source.
/// Every field is optional and may be a string, a number or a boolean.
/// The German column names of the legacy staff sheet are accepted.
/// A sheet may carry several id columns; the first non-empty of `id`,
/// `kuerzel` and `MA` wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStaffRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kuerzel: Option<Value>,
    #[serde(default, rename = "MA", skip_serializing_if = "Option::is_none")]
    pub staff_code: Option<Value>,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Value>,
    #[serde(default, alias = "anstellungs_prozent", skip_serializing_if = "Option::is_none")]
    pub employment_percent: Option<Value>,
    #[serde(default, alias = "stationaer_anteil", skip_serializing_if = "Option::is_none")]
    pub ward_percent: Option<Value>,
    #[serde(default, alias = "verfuegbar", skip_serializing_if = "Option::is_none")]
    pub available: Option<Value>,
    #[serde(default, alias = "weather", skip_serializing_if = "Option::is_none")]
    pub mood_status: Option<Value>,
    #[serde(default, alias = "regenschirm", skip_serializing_if = "Option::is_none")]
    pub umbrella_friend: Option<Value>,
}

impl RawStaffRow {
    /// Coerce into a typed record. `row` is the 0-based source row,
    /// used only for error reporting.
    ///
    /// Missing values default: percents to 0, `available` to true,
    /// `umbrella_friend` to false, mood to Normal.
    pub fn normalize(&self, row: usize) -> DeskResult<StaffRecord> {
        let id = [&self.id, &self.kuerzel, &self.staff_code, &self.display_name]
            .into_iter()
            .filter_map(present)
            .map(coerce_text)
            .find(|s| !s.is_empty())
            .ok_or(DeskError::MissingStaffId { row })?;
        let display_name = present(&self.display_name)
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.clone());

        let mut issues = Vec::new();

        let employment_fraction =
            coerce_field("employment_percent", &self.employment_percent, 0.0, coerce_percent, &mut issues);
        let ward_fraction =
            coerce_field("ward_percent", &self.ward_percent, 0.0, coerce_percent, &mut issues);
        let available =
            coerce_field("available", &self.available, true, coerce_bool, &mut issues);
        let umbrella_friend =
            coerce_field("umbrella_friend", &self.umbrella_friend, false, coerce_bool, &mut issues);
        let mood_status =
            coerce_field("mood_status", &self.mood_status, MoodStatus::Normal, coerce_mood, &mut issues);

        for issue in &issues {
            log::warn!(
                "roster: row {row} ({id}) field {} = {} not usable: {}",
                issue.field, issue.raw, issue.reason
            );
        }

        Ok(StaffRecord {
            id,
            display_name,
            employment_fraction,
            ward_fraction,
            available,
            present_morning: available,
            present_afternoon: available,
            mood_status,
            umbrella_friend,
            issues,
        })
    }
}

impl From<&StaffRecord> for RawStaffRow {
    fn from(r: &StaffRecord) -> Self {
        let percent = |field: &str, fraction: f64| {
            r.raw_for(field)
                .cloned()
                .unwrap_or_else(|| serde_json::json!(round_percent(fraction)))
        };
        Self {
            id: Some(Value::String(r.id.clone())),
            kuerzel: None,
            staff_code: None,
            display_name: Some(Value::String(r.display_name.clone())),
            employment_percent: Some(percent("employment_percent", r.employment_fraction)),
            ward_percent: Some(percent("ward_percent", r.ward_fraction)),
            available: Some(r.raw_for("available").cloned().unwrap_or(Value::Bool(r.available))),
            mood_status: Some(
                r.raw_for("mood_status")
                    .cloned()
                    .unwrap_or_else(|| Value::String(r.mood_status.label().into())),
            ),
            umbrella_friend: Some(
                r.raw_for("umbrella_friend")
                    .cloned()
                    .unwrap_or(Value::Bool(r.umbrella_friend)),
            ),
        }
    }
}

fn round_percent(fraction: f64) -> f64 {
    (fraction * 10_000.0).round() / 100.0
}

/// `None` and JSON `null` both count as "missing".
fn present(v: &Option<Value>) -> Option<&Value> {
    v.as_ref().filter(|v| !v.is_null())
}

fn coerce_field<T>(
    field: &str,
    value: &Option<Value>,
    default: T,
    coerce: fn(&Value) -> Result<T, String>,
    issues: &mut Vec<FieldIssue>,
) -> T {
    let Some(raw) = present(value) else {
        return default;
    };
    match coerce(raw) {
        Ok(v) => v,
        Err(reason) => {
            issues.push(FieldIssue {
                field: field.to_string(),
                raw: raw.clone(),
                reason,
            });
            default
        }
    }
}

fn coerce_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Percent (0–100) to fraction (0–1), clamped.
fn coerce_percent(v: &Value) -> Result<f64, String> {
    let pct = match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("unrepresentable number {n}"))?,
        Value::String(s) => {
            let t = s.trim().trim_end_matches('%').trim().replace(',', ".");
            if t.is_empty() {
                return Ok(0.0);
            }
            t.parse::<f64>().map_err(|_| format!("'{s}' is not a number"))?
        }
        other => return Err(format!("expected a percentage, got {other}")),
    };
    if !pct.is_finite() {
        return Err(format!("{pct} is not finite"));
    }
    Ok((pct / 100.0).clamp(0.0, 1.0))
}

fn coerce_bool(v: &Value) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => Ok(false),
            Some(f) if f == 1.0 => Ok(true),
            _ => Err(format!("{n} is not a flag")),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "ja" | "j" | "x" | "wahr" => Ok(true),
            "false" | "0" | "no" | "n" | "nein" | "" | "falsch" => Ok(false),
            _ => Err(format!("'{s}' is not a flag")),
        },
        other => Err(format!("expected a flag, got {other}")),
    }
}

fn coerce_mood(v: &Value) -> Result<MoodStatus, String> {
    match v {
        Value::String(s) if s.trim().is_empty() => Ok(MoodStatus::Normal),
        Value::String(s) => MoodStatus::from_label(s).ok_or_else(|| format!("unknown mood '{s}'")),
        other => Err(format!("expected a mood label, got {other}")),
    }
}

// ── Roster ────────────────────────────────────────────────────────────

/// A validated roster: ids are unique and low-employment staff are gone.
/// Order is the source order and acts as the ranking tie-breaker.
/// Build it through from_rows() or from_records() so the id check runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Roster {
    records: Vec<StaffRecord>,
}

impl Roster {
    /// Normalize raw rows, drop staff at or below the minimum employment
    /// fraction and reject duplicate ids.
    pub fn from_rows(rows: &[RawStaffRow], config: &RosterConfig) -> DeskResult<Self> {
        let mut records = Vec::with_capacity(rows.len());
        for (row, raw) in rows.iter().enumerate() {
            let record = raw.normalize(row)?;
            if !record.has_issue("employment_percent")
                && record.employment_fraction <= config.min_employment_fraction
            {
                log::info!(
                    "roster: dropping {} (employment {:.2} <= {:.2})",
                    record.id, record.employment_fraction, config.min_employment_fraction
                );
                continue;
            }
            records.push(record);
        }
        Self::from_records(records)
    }

    /// Wrap already-typed records. Only id uniqueness is checked.
    pub fn from_records(records: Vec<StaffRecord>) -> DeskResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for r in &records {
            if !seen.insert(r.id.as_str()) {
                return Err(DeskError::DuplicateStaffId { id: r.id.clone() });
            }
        }
        Ok(Self { records })
    }

    /// Read a JSON array of raw rows.
    pub fn load(path: &str, config: &RosterConfig) -> DeskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DeskError::Io {
            path: path.to_string(),
            source,
        })?;
        let rows: Vec<RawStaffRow> = serde_json::from_str(&content)?;
        let roster = Self::from_rows(&rows, config)?;
        log::info!("roster: loaded {} of {} rows from {path}", roster.len(), rows.len());
        Ok(roster)
    }

    /// Write the roster back as raw rows (percent values, mood labels).
    pub fn save(&self, path: &str) -> DeskResult<()> {
        let json = serde_json::to_string_pretty(&self.to_rows())?;
        std::fs::write(path, json).map_err(|source| DeskError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(())
    }

    pub fn to_rows(&self) -> Vec<RawStaffRow> {
        self.records.iter().map(RawStaffRow::from).collect()
    }

    /// Single placeholder record used when no staff sheet is available.
    pub fn demo() -> Self {
        Self {
            records: vec![StaffRecord::new("DEMO", "DEMO", 1.0, 0.5)],
        }
    }

    pub fn records(&self) -> &[StaffRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StaffRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&StaffRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: &str) -> DeskResult<&mut StaffRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DeskError::UnknownStaff { id: id.to_string() })
    }

    // ── Staff-facing status edits ─────────────────────────────────

    pub fn set_mood(&mut self, id: &str, mood: MoodStatus) -> DeskResult<()> {
        let r = self.get_mut(id)?;
        r.mood_status = mood;
        r.issues.retain(|i| i.field != "mood_status");
        Ok(())
    }

    pub fn set_umbrella_friend(&mut self, id: &str, umbrella_friend: bool) -> DeskResult<()> {
        let r = self.get_mut(id)?;
        r.umbrella_friend = umbrella_friend;
        r.issues.retain(|i| i.field != "umbrella_friend");
        Ok(())
    }

    pub fn set_available(&mut self, id: &str, available: bool) -> DeskResult<()> {
        let r = self.get_mut(id)?;
        r.available = available;
        r.present_morning = available;
        r.present_afternoon = available;
        r.issues.retain(|i| i.field != "available");
        Ok(())
    }

    pub fn set_presence(&mut self, id: &str, morning: bool, afternoon: bool) -> DeskResult<()> {
        let r = self.get_mut(id)?;
        r.present_morning = morning;
        r.present_afternoon = afternoon;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a StaffRecord;
    type IntoIter = std::slice::Iter<'a, StaffRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
