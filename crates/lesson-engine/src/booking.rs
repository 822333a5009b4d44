//! The booking lifecycle: validate, generate, conflict-check, then persist.
//!
//! [`Scheduler`] holds an in-memory snapshot of the persisted schedules and
//! groups. Checks run against that snapshot only; nothing guards the window
//! between the check and the store round-trip, so two schedulers working from
//! stale snapshots can both commit a double-booking. The snapshot is mutated
//! only after the store reports success.

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::conflict::{find_conflict, ConflictQuery};
use crate::draft::{GroupDraft, ScheduleDraft};
use crate::error::{Result, ScheduleError, StoreError};
use crate::generator::{generate_sessions, Session};
use crate::model::{BatchType, Directory, GroupArrangement, Schedule, ScheduleId};
use crate::store::ScheduleStore;

/// A schedule that passed validation and conflict checks, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub schedule: Schedule,
    pub start_date: NaiveDate,
    pub sessions: Vec<Session>,
}

/// Outcome of a bulk delete. No rollback is attempted for partial failure.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<ScheduleId>,
    pub failed: Vec<(ScheduleId, StoreError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Scheduler<S> {
    store: S,
    schedules: Vec<Schedule>,
    groups: Vec<GroupArrangement>,
    directory: Directory,
}

impl<S: ScheduleStore> Scheduler<S> {
    /// Fetch everything from `store` and start from that snapshot.
    pub async fn load(store: S) -> Result<Self> {
        let mut scheduler = Self {
            store,
            schedules: Vec::new(),
            groups: Vec::new(),
            directory: Directory::default(),
        };
        scheduler.refresh().await?;
        Ok(scheduler)
    }

    /// Replace the snapshot with a full refetch.
    pub async fn refresh(&mut self) -> Result<()> {
        self.schedules = self.store.fetch_schedules().await?;
        self.groups = self.store.fetch_groups().await?;
        self.directory = self.store.fetch_directory().await?;
        debug!(
            schedules = self.schedules.len(),
            groups = self.groups.len(),
            "refreshed snapshot"
        );
        Ok(())
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn groups(&self) -> &[GroupArrangement] {
        &self.groups
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schedule(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == Some(id))
    }

    pub fn group(&self, id: ScheduleId) -> Option<&GroupArrangement> {
        self.groups.iter().find(|g| g.id == Some(id))
    }

    fn check(
        &self,
        draft: &ScheduleDraft,
        today: NaiveDate,
        editing: Option<&Schedule>,
    ) -> Result<Preview> {
        let valid = draft.validate(today)?;
        let schedule = valid.schedule;
        self.directory.check_eligible(
            schedule.participants.batch_type(),
            schedule.participants.student_ids(),
        )?;
        let sessions = generate_sessions(&schedule.recurrence, valid.start_date, schedule.time);
        debug!(count = sessions.len(), start = %valid.start_date, "generated sessions");

        let query = ConflictQuery {
            sessions: &sessions,
            time: schedule.time,
            teacher_id: &schedule.teacher_id,
            student_ids: schedule.participants.student_ids(),
            editing_id: editing.and_then(|e| e.id),
            editing_end_date: Some(editing.map_or(schedule.end_date, |e| e.end_date)),
        };
        if let Some(conflict) = find_conflict(&query, &self.schedules) {
            warn!(
                existing = ?conflict.schedule.id,
                date = %conflict.date,
                reason = %conflict.reason,
                "schedule conflict"
            );
            return Err(ScheduleError::Conflict {
                schedule: conflict.schedule.id,
                teacher_id: conflict.schedule.teacher_id.clone(),
                date: conflict.date,
                time: conflict.time,
                reason: conflict.reason,
            });
        }

        Ok(Preview {
            schedule,
            start_date: valid.start_date,
            sessions,
        })
    }

    /// Validate, generate and conflict-check a new schedule without persisting.
    pub fn preview(&self, draft: &ScheduleDraft, today: NaiveDate) -> Result<Preview> {
        self.check(draft, today, None)
    }

    /// Check and persist a new schedule.
    pub async fn create(&mut self, draft: &ScheduleDraft, today: NaiveDate) -> Result<Schedule> {
        let preview = self.check(draft, today, None)?;
        let saved = self.store.create_schedule(preview.schedule).await?;
        info!(id = ?saved.id, subject = %saved.subject, "schedule created");
        self.schedules.push(saved.clone());
        Ok(saved)
    }

    /// A draft pre-populated from the persisted schedule `id`.
    pub fn edit(&self, id: ScheduleId) -> Result<ScheduleDraft> {
        self.schedule(id)
            .map(ScheduleDraft::from_schedule)
            .ok_or(ScheduleError::UnknownSchedule(id))
    }

    /// Re-check an edited draft and replace the persisted schedule `id`.
    ///
    /// The record is marked rescheduled when its time, weekdays or end date move.
    pub async fn update(&mut self, id: ScheduleId, draft: &ScheduleDraft, today: NaiveDate) -> Result<Schedule> {
        let current = self
            .schedule(id)
            .cloned()
            .ok_or(ScheduleError::UnknownSchedule(id))?;
        let mut schedule = self.check(draft, today, Some(&current))?.schedule;

        schedule.id = Some(id);
        schedule.rescheduled = current.rescheduled
            || schedule.time != current.time
            || schedule.recurrence.weekdays() != current.recurrence.weekdays()
            || schedule.end_date != current.end_date;

        let saved = self.store.update_schedule(id, schedule).await?;
        info!(id, rescheduled = saved.rescheduled, "schedule updated");
        if let Some(slot) = self.schedules.iter_mut().find(|s| s.id == Some(id)) {
            *slot = saved.clone();
        }
        Ok(saved)
    }

    pub async fn delete(&mut self, id: ScheduleId) -> Result<()> {
        self.store.delete_schedule(id).await?;
        info!(id, "schedule deleted");
        self.schedules.retain(|s| s.id != Some(id));
        Ok(())
    }

    /// Issue one concurrent delete per id. Successful deletes leave the
    /// snapshot; failures stay in it until the next [`refresh`](Self::refresh).
    pub async fn bulk_delete(&mut self, ids: &[ScheduleId]) -> BulkDeleteReport {
        let store = &self.store;
        let outcomes = join_all(ids.iter().map(|&id| async move {
            (id, store.delete_schedule(id).await)
        }))
        .await;

        let mut report = BulkDeleteReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    warn!(id, error = %e, "bulk delete failed");
                    report.failed.push((id, e));
                }
            }
        }
        self.schedules
            .retain(|s| !s.id.is_some_and(|id| report.deleted.contains(&id)));
        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "bulk delete finished"
        );
        report
    }

    /// Persist a new group. Groups are not conflict-checked.
    pub async fn create_group(&mut self, draft: &GroupDraft, today: NaiveDate) -> Result<GroupArrangement> {
        let group = draft.validate(today)?;
        self.directory.check_eligible(BatchType::Group, &group.students)?;
        let saved = self.store.create_group(group).await?;
        info!(id = ?saved.id, name = %saved.group_name, "group created");
        self.groups.push(saved.clone());
        Ok(saved)
    }

    pub fn edit_group(&self, id: ScheduleId) -> Result<GroupDraft> {
        self.group(id)
            .map(GroupDraft::from_group)
            .ok_or(ScheduleError::UnknownSchedule(id))
    }

    pub async fn update_group(
        &mut self,
        id: ScheduleId,
        draft: &GroupDraft,
        today: NaiveDate,
    ) -> Result<GroupArrangement> {
        if self.group(id).is_none() {
            return Err(ScheduleError::UnknownSchedule(id));
        }
        let mut group = draft.validate(today)?;
        self.directory.check_eligible(BatchType::Group, &group.students)?;
        group.id = Some(id);
        let saved = self.store.update_group(id, group).await?;
        info!(id, "group updated");
        if let Some(slot) = self.groups.iter_mut().find(|g| g.id == Some(id)) {
            *slot = saved.clone();
        }
        Ok(saved)
    }

    pub async fn delete_group(&mut self, id: ScheduleId) -> Result<()> {
        self.store.delete_group(id).await?;
        info!(id, "group deleted");
        self.groups.retain(|g| g.id != Some(id));
        Ok(())
    }
}
