//! The duty desk — one operator session over one shift.
//!
//! The desk owns the rotation state and the store. The roster and the
//! attendance sheet are owned by the caller and passed in on every call,
//! so edits made between calls are always seen.
//!
//! RULES:
//!   - Every operator action is recorded in the event log.
//!   - suggest() is read-only: no state change, no log entry.
//!   - Only assign() writes to the assignment log, and a turn is used up
//!     only once that write succeeded.
//!   - The clock is passed in; the desk never reads it.

use crate::{
    attendance::{Attendance, ShiftPeriod},
    config::DeskConfig,
    error::DeskResult,
    event::{AssignmentRecord, DeskEvent, EventLogEntry},
    queue::{AllocationQueue, AllocationState, Candidate},
    roster::Roster,
    store::DeskStore,
    types::SessionId,
};
use chrono::NaiveDateTime;

pub struct DutyDesk {
    pub session_id: SessionId,
    pub config:     DeskConfig,
    pub store:      DeskStore,
    queue:          AllocationQueue,
    state:          AllocationState,
}

impl DutyDesk {
    /// Events are keyed to the session row, so use open() unless the
    /// session is already registered in the store.
    pub fn new(session_id: SessionId, config: DeskConfig, store: DeskStore) -> Self {
        Self {
            queue: AllocationQueue::new(&config),
            state: AllocationState::new(),
            session_id,
            config,
            store,
        }
    }

    /// Register the session in the store and log its opening.
    /// The store must already be migrated.
    pub fn open(
        session_id: SessionId,
        config: DeskConfig,
        store: DeskStore,
        roster: &Roster,
        opened_at: NaiveDateTime,
    ) -> DeskResult<Self> {
        store.insert_session(&session_id, env!("CARGO_PKG_VERSION"), opened_at)?;
        let desk = Self::new(session_id, config, store);
        desk.record(DeskEvent::SessionOpened {
            session_id: desk.session_id.clone(),
            roster_size: roster.len(),
        })?;
        log::info!("desk: session {} opened with {} staff", desk.session_id, roster.len());
        Ok(desk)
    }

    /// Desk over a fresh in-memory store with default config.
    pub fn build_test(session_id: SessionId, roster: &Roster, opened_at: NaiveDateTime) -> DeskResult<Self> {
        let store = DeskStore::in_memory()?;
        store.migrate()?;
        Self::open(session_id, DeskConfig::default(), store, roster, opened_at)
    }

    pub fn state(&self) -> &AllocationState {
        &self.state
    }

    pub fn candidates(&self, roster: &Roster, attendance: Option<&Attendance>) -> Vec<Candidate> {
        self.queue.available_candidates(roster, attendance)
    }

    pub fn priority_list(&self, roster: &Roster, attendance: Option<&Attendance>) -> Vec<Candidate> {
        self.queue
            .priority_list(&self.state, roster, attendance, self.config.priority_list_len)
    }

    /// Who would get the next consultation. Safe to call on every
    /// redraw: a pending wrap is only applied by the next assign().
    pub fn suggest(&self, roster: &Roster, attendance: Option<&Attendance>) -> Option<Candidate> {
        let mut scratch = self.state.clone();
        self.queue.peek_next(&mut scratch, roster, attendance)
    }

    /// Assign the next consultation and write it to the assignment log.
    pub fn assign(
        &mut self,
        roster: &Roster,
        attendance: Option<&Attendance>,
        now: NaiveDateTime,
    ) -> DeskResult<Option<AssignmentRecord>> {
        let before = self.state.rotations_completed();
        let mut next = self.state.clone();
        let Some(candidate) = self.queue.commit_next(&mut next, roster, attendance) else {
            log::info!("desk: no one available to assign");
            self.record(DeskEvent::NoCandidate { action: "assign".into() })?;
            return Ok(None);
        };

        let rec = AssignmentRecord {
            assignment_id: uuid::Uuid::new_v4().to_string(),
            session_id:    self.session_id.clone(),
            staff_id:      candidate.record.id.clone(),
            display_name:  candidate.record.display_name.clone(),
            score:         candidate.score,
            assigned_at:   now,
            period:        ShiftPeriod::at(&now),
        };
        self.store.insert_assignment(&rec)?;
        self.state = next;
        self.record_wrap(before)?;
        self.record(DeskEvent::Assigned {
            assignment_id: rec.assignment_id.clone(),
            staff_id:      rec.staff_id.clone(),
            score:         rec.score,
            period:        rec.period,
        })?;
        log::info!(
            "desk: consultation assigned to {} ({}) at {} {}",
            rec.staff_id, rec.display_name, rec.assigned_at, rec.period.label()
        );
        Ok(Some(rec))
    }

    /// Pass on the current suggestion and show the next option.
    /// Nothing is assigned.
    pub fn skip(
        &mut self,
        roster: &Roster,
        attendance: Option<&Attendance>,
    ) -> DeskResult<Option<Candidate>> {
        match self.queue.preview_next(&mut self.state, roster, attendance) {
            Some(c) => {
                self.record(DeskEvent::Previewed {
                    staff_id: c.record.id.clone(),
                    score:    c.score,
                })?;
                Ok(Some(c))
            }
            None => {
                self.record(DeskEvent::NoCandidate { action: "skip".into() })?;
                Ok(None)
            }
        }
    }

    /// Start the rotation over.
    pub fn reset(&mut self) -> DeskResult<()> {
        let event = DeskEvent::RotationReset {
            committed: self.state.committed_ids().len(),
            previewed: self.state.preview_ids().len(),
        };
        self.queue.reset(&mut self.state);
        self.record(event)
    }

    pub fn assignment_log(&self) -> DeskResult<Vec<AssignmentRecord>> {
        self.store.assignments_for_session(&self.session_id)
    }

    pub fn events(&self) -> DeskResult<Vec<EventLogEntry>> {
        self.store.events_for_session(&self.session_id)
    }

    fn record_wrap(&self, rotations_before: u64) -> DeskResult<()> {
        let now = self.state.rotations_completed();
        if now > rotations_before {
            self.record(DeskEvent::RotationWrapped { rotations_completed: now })?;
        }
        Ok(())
    }

    fn record(&self, event: DeskEvent) -> DeskResult<()> {
        let entry = EventLogEntry {
            id:         None,
            session_id: self.session_id.clone(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(&event)?,
        };
        self.store.append_event(&entry)
    }
}
