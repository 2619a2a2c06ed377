//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The desk calls store methods — it never executes SQL directly.

use crate::{
    attendance::ShiftPeriod,
    error::{DeskError, DeskResult},
    event::{AssignmentRecord, EventLogEntry},
};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct DeskStore {
    conn: Connection,
}

impl DeskStore {
    /// Open (or create) the desk database at `path`.
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_desk.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    pub fn insert_session(
        &self,
        session_id: &str,
        version: &str,
        opened_at: NaiveDateTime,
    ) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO session (session_id, version, opened_at) VALUES (?1, ?2, ?3)",
            params![session_id, version, opened_at.format(TIMESTAMP_FORMAT).to_string()],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, event_type, payload) VALUES (?1, ?2, ?3)",
            params![entry.session_id, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> DeskResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    session_id: row.get(1)?,
                    event_type: row.get(2)?,
                    payload:    row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, session_id: &str, event_type: &str) -> DeskResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Assignment log ─────────────────────────────────────────

    pub fn insert_assignment(&self, rec: &AssignmentRecord) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO assignment_log
               (assignment_id, session_id, staff_id, display_name, score, assigned_at, period)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                rec.assignment_id,
                rec.session_id,
                rec.staff_id,
                rec.display_name,
                rec.score,
                rec.assigned_at.format(TIMESTAMP_FORMAT).to_string(),
                rec.period.label(),
            ],
        )?;
        Ok(())
    }

    /// Assignments of a session in the order they were made.
    pub fn assignments_for_session(&self, session_id: &str) -> DeskResult<Vec<AssignmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT assignment_id, session_id, staff_id, display_name, score, assigned_at, period
             FROM assignment_log WHERE session_id = ?1
             ORDER BY rowid ASC",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(assignment_id, session_id, staff_id, display_name, score, at, period)| {
                let assigned_at = NaiveDateTime::parse_from_str(&at, TIMESTAMP_FORMAT)
                    .map_err(|e| anyhow::anyhow!("bad assigned_at '{at}' for {assignment_id}: {e}"))?;
                let period = ShiftPeriod::from_label(&period)
                    .ok_or_else(|| anyhow::anyhow!("bad period '{period}' for {assignment_id}"))?;
                Ok(AssignmentRecord {
                    assignment_id,
                    session_id,
                    staff_id,
                    display_name,
                    score,
                    assigned_at,
                    period,
                })
            })
            .collect::<Result<Vec<_>, DeskError>>()
    }

    /// Assignments per staff member for a session, most assigned first.
    pub fn assignment_counts(&self, session_id: &str) -> DeskResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT staff_id, COUNT(*) AS n FROM assignment_log
             WHERE session_id = ?1
             GROUP BY staff_id
             ORDER BY n DESC, staff_id ASC",
        )?;
        let counts = stmt
            .query_map(params![session_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
