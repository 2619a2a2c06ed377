//! Per-session attendance: who is in this morning, who this afternoon.

use crate::{
    roster::{Roster, StaffRecord},
    types::StaffId,
};
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Half-day slot an assignment falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftPeriod {
    #[serde(rename = "AM")]
    Morning,
    #[serde(rename = "PM")]
    Afternoon,
}

impl ShiftPeriod {
    /// Morning before 12:00, afternoon from 12:00 on.
    pub fn at<T: Timelike>(time: &T) -> Self {
        if time.hour() < 12 { Self::Morning } else { Self::Afternoon }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning   => "AM",
            Self::Afternoon => "PM",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "AM" => Some(Self::Morning),
            "PM" => Some(Self::Afternoon),
            _ => None,
        }
    }
}

/// Morning and afternoon presence maps for one session.
///
/// Ids absent from a map fall back to the record's own
/// `present_morning` / `present_afternoon` flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub morning:   HashMap<StaffId, bool>,
    pub afternoon: HashMap<StaffId, bool>,
}

impl Attendance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed both maps from the roster's presence flags, the way the
    /// attendance sheet starts out at the beginning of a shift.
    pub fn from_roster(roster: &Roster) -> Self {
        let mut att = Self::new();
        for r in roster {
            att.set(&r.id, r.present_morning, r.present_afternoon);
        }
        att
    }

    pub fn set(&mut self, id: &str, morning: bool, afternoon: bool) {
        self.morning.insert(id.to_string(), morning);
        self.afternoon.insert(id.to_string(), afternoon);
    }

    pub fn is_present(&self, record: &StaffRecord) -> bool {
        let am = self.morning.get(&record.id).copied().unwrap_or(record.present_morning);
        let pm = self.afternoon.get(&record.id).copied().unwrap_or(record.present_afternoon);
        am || pm
    }
}

/// Availability after applying the attendance override, if any.
/// Without attendance the base `available` flag governs.
pub fn effective_availability(record: &StaffRecord, attendance: Option<&Attendance>) -> bool {
    match attendance {
        Some(att) => att.is_present(record),
        None => record.available,
    }
}
