//! # lesson-engine
//!
//! Weekly lesson recurrence expansion and double-booking detection for
//! teacher/student batches.
//!
//! A batch (individual, dual or group) meets on one or two weekdays at a fixed
//! time for a set number of sessions. The engine turns that pattern into
//! concrete dated sessions, inverts a session count into the week the batch
//! ends in (and back), and refuses a schedule that would double-book a teacher
//! or student. Every date computation is a pure function of its inputs,
//! including "today", which callers always pass explicitly.
//!
//! ## Modules
//!
//! - [`weekday`] — Sunday-first weekday arithmetic
//! - [`recurrence`] — the weekly pattern value object
//! - [`generator`] — recurrence → list of dated sessions
//! - [`inverter`] — session count ↔ end date
//! - [`conflict`] — teacher/student double-booking detection
//! - [`model`] — schedules, groups and the participant directory
//! - [`draft`] — form input validation
//! - [`clock`] — 12-hour input and combined date-time conversion
//! - [`ical`] — RFC 5545 export via `rrule`
//! - [`store`] — the storage collaborator seam
//! - [`booking`] — validate → generate → check → persist lifecycle
//! - [`error`] — Error types

pub mod booking;
pub mod clock;
pub mod conflict;
pub mod draft;
pub mod error;
pub mod generator;
pub mod ical;
pub mod inverter;
pub mod model;
pub mod recurrence;
pub mod store;
pub mod weekday;

pub use booking::{BulkDeleteReport, Preview, Scheduler};
pub use conflict::{find_conflict, find_conflicts, Conflict, ConflictQuery, ConflictReason};
pub use draft::{GroupDraft, ScheduleDraft, SessionLength, TimeInput};
pub use error::{ScheduleError, StoreError, ValidationError};
pub use generator::{generate_sessions, plan_sessions, Session};
pub use inverter::{compute_end_date, sessions_from_end_date, start_from_end_date, total_sessions_until};
pub use model::{
    BatchType, Directory, GroupArrangement, Participants, Schedule, ScheduleId, StudentId, TeacherId,
};
pub use recurrence::RecurrenceSpec;
pub use store::{MemoryStore, ScheduleStore, StoreSnapshot};
pub use weekday::{date_for_weekday_in_week, next_occurrence, weekday_of, WeekdayName};
