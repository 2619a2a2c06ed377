//! Allocation queue — ranks the live roster and cycles through it.
//!
//! ROTATION:
//!   EMPTY → ACCUMULATING (one id per commit/preview)
//!         → WRAPPED (list covers every candidate, cleared on next pick)
//!         → EMPTY
//!
//! RULES:
//!   - The roster is re-ranked on every call. Nothing is cached.
//!   - Only commit_next() appends to committed_ids.
//!   - preview_next() never clears or extends committed_ids.
//!   - "No candidate" is None, never an error.

use crate::{
    attendance::{effective_availability, Attendance},
    config::{DeskConfig, ScoringConfig},
    roster::{Roster, StaffRecord},
    scorer::{score, umbrella_friend_count, ScoreContext},
    types::StaffId,
};
use serde::{Deserialize, Serialize};

/// A ranked, eligible staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Snapshot with `available` set to the effective availability.
    pub record: StaffRecord,
    pub score:  f64,
}

impl Candidate {
    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// Assignment history for one rotation. Owned by the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationState {
    committed_ids:       Vec<StaffId>,
    preview_ids:         Vec<StaffId>,
    rotations_completed: u64,
}

impl AllocationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids assigned this rotation, in assignment order.
    pub fn committed_ids(&self) -> &[StaffId] {
        &self.committed_ids
    }

    /// Ids shown as "next" options this preview cycle.
    pub fn preview_ids(&self) -> &[StaffId] {
        &self.preview_ids
    }

    /// Number of times the committed list wrapped around.
    pub fn rotations_completed(&self) -> u64 {
        self.rotations_completed
    }

    pub fn is_empty(&self) -> bool {
        self.committed_ids.is_empty() && self.preview_ids.is_empty()
    }

    /// Operator-triggered restart. Clears both lists.
    pub fn reset(&mut self) {
        self.committed_ids.clear();
        self.preview_ids.clear();
    }

    fn is_committed(&self, id: &str) -> bool {
        self.committed_ids.iter().any(|c| c == id)
    }

    fn is_previewed(&self, id: &str) -> bool {
        self.preview_ids.iter().any(|p| p == id)
    }
}

pub struct AllocationQueue {
    scoring:               ScoringConfig,
    eligibility_threshold: f64,
    day_before_vacation:   bool,
}

impl AllocationQueue {
    pub fn new(config: &DeskConfig) -> Self {
        Self {
            scoring:               config.scoring.clone(),
            eligibility_threshold: config.eligibility_threshold,
            day_before_vacation:   config.day_before_vacation,
        }
    }

    /// Effectively available staff scoring above the threshold, best
    /// first. Equal scores keep roster order.
    pub fn available_candidates(
        &self,
        roster: &Roster,
        attendance: Option<&Attendance>,
    ) -> Vec<Candidate> {
        let present: Vec<StaffRecord> = roster
            .iter()
            .filter(|r| effective_availability(r, attendance))
            .map(|r| StaffRecord { available: true, ..r.clone() })
            .collect();

        let ctx = ScoreContext {
            umbrella_friend_count: umbrella_friend_count(&present),
            day_before_vacation:   self.day_before_vacation,
        };

        let mut candidates: Vec<Candidate> = present
            .into_iter()
            .map(|record| {
                let score = score(&record, ctx, &self.scoring);
                Candidate { record, score }
            })
            .filter(|c| c.score > self.eligibility_threshold)
            .collect();

        // sort_by is stable: ties stay in roster order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        log::debug!(
            "queue: {} of {} staff eligible (umbrella friends: {})",
            candidates.len(), roster.len(), ctx.umbrella_friend_count
        );
        candidates
    }

    /// Best candidate not yet committed this rotation. Wraps the
    /// rotation first if everyone has been assigned.
    pub fn peek_next(
        &self,
        state: &mut AllocationState,
        roster: &Roster,
        attendance: Option<&Attendance>,
    ) -> Option<Candidate> {
        let candidates = self.available_candidates(roster, attendance);
        select_uncommitted(state, candidates)
    }

    /// As peek_next(), and records the pick in committed_ids.
    pub fn commit_next(
        &self,
        state: &mut AllocationState,
        roster: &Roster,
        attendance: Option<&Attendance>,
    ) -> Option<Candidate> {
        let picked = self.peek_next(state, roster, attendance)?;
        state.committed_ids.push(picked.record.id.clone());
        log::info!(
            "queue: committed {} (score {:.2}, {} this rotation)",
            picked.id(), picked.score, state.committed_ids.len()
        );
        Some(picked)
    }

    /// Next option for a "show me someone else" request. Skips both
    /// committed and already previewed staff; when the previews run
    /// out, the preview cycle restarts. Does not touch committed_ids.
    pub fn preview_next(
        &self,
        state: &mut AllocationState,
        roster: &Roster,
        attendance: Option<&Attendance>,
    ) -> Option<Candidate> {
        let candidates = self.available_candidates(roster, attendance);
        if candidates.is_empty() {
            return None;
        }

        let fresh = candidates
            .iter()
            .position(|c| !state.is_committed(c.id()) && !state.is_previewed(c.id()));
        let idx = match fresh {
            Some(i) => i,
            None => {
                log::debug!("queue: preview cycle wrapped after {} ids", state.preview_ids.len());
                state.preview_ids.clear();
                // With every candidate committed the commit side has not
                // wrapped yet; show the top candidate without wrapping it.
                candidates
                    .iter()
                    .position(|c| !state.is_committed(c.id()))
                    .unwrap_or(0)
            }
        };

        let picked = candidates.into_iter().nth(idx)?;
        state.preview_ids.push(picked.record.id.clone());
        Some(picked)
    }

    /// Clear the rotation.
    pub fn reset(&self, state: &mut AllocationState) {
        log::info!(
            "queue: rotation reset ({} committed, {} previewed)",
            state.committed_ids.len(), state.preview_ids.len()
        );
        state.reset();
    }

    /// The ranked list in rotation order: staff still due this rotation
    /// by score, then staff already assigned in assignment order.
    pub fn priority_list(
        &self,
        state: &AllocationState,
        roster: &Roster,
        attendance: Option<&Attendance>,
        limit: usize,
    ) -> Vec<Candidate> {
        let (mut done, mut due): (Vec<Candidate>, Vec<Candidate>) = self
            .available_candidates(roster, attendance)
            .into_iter()
            .partition(|c| state.is_committed(c.id()));

        done.sort_by_key(|c| {
            state
                .committed_ids
                .iter()
                .position(|id| id == c.id())
                .unwrap_or(usize::MAX)
        });

        due.extend(done);
        due.truncate(limit);
        due
    }
}

fn select_uncommitted(state: &mut AllocationState, candidates: Vec<Candidate>) -> Option<Candidate> {
    if candidates.is_empty() {
        return None;
    }
    match candidates.iter().position(|c| !state.is_committed(c.id())) {
        Some(i) => candidates.into_iter().nth(i),
        None => {
            state.committed_ids.clear();
            state.rotations_completed += 1;
            log::info!(
                "queue: rotation {} complete, starting over",
                state.rotations_completed
            );
            candidates.into_iter().next()
        }
    }
}
