//! Shared primitive types used across the desk.

/// Short staff code ("Kürzel"). Stable identity of a roster entry.
pub type StaffId = String;

/// The canonical desk session identifier. One session = one duty shift.
pub type SessionId = String;
