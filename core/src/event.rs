//! Desk events — everything the operator did during a session.
//!
//! Events are appended to the event log in the order they happen.
//! Variants are only ever appended, never removed or reordered.

use crate::{
    attendance::ShiftPeriod,
    types::{SessionId, StaffId},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    SessionOpened {
        session_id: SessionId,
        roster_size: usize,
    },
    Assigned {
        assignment_id: String,
        staff_id: StaffId,
        score: f64,
        period: ShiftPeriod,
    },
    Previewed {
        staff_id: StaffId,
        score: f64,
    },
    RotationWrapped {
        rotations_completed: u64,
    },
    RotationReset {
        committed: usize,
        previewed: usize,
    },
    NoCandidate {
        action: String, // "suggest" | "assign" | "skip"
    },
}

impl DeskEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionOpened { .. }   => "session_opened",
            Self::Assigned { .. }        => "assigned",
            Self::Previewed { .. }       => "previewed",
            Self::RotationWrapped { .. } => "rotation_wrapped",
            Self::RotationReset { .. }   => "rotation_reset",
            Self::NoCandidate { .. }     => "no_candidate",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub session_id: SessionId,
    pub event_type: String,
    pub payload:    String, // JSON-serialized DeskEvent
}

impl EventLogEntry {
    pub fn decode(&self) -> serde_json::Result<DeskEvent> {
        serde_json::from_str(&self.payload)
    }
}

/// One committed consultation assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub assignment_id: String,
    pub session_id:    SessionId,
    pub staff_id:      StaffId,
    pub display_name:  String,
    pub score:         f64,
    pub assigned_at:   NaiveDateTime,
    pub period:        ShiftPeriod,
}
