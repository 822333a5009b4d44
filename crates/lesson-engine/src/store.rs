//! The storage collaborator seam.
//!
//! Implementations own transport and persistence. Create assigns an id and
//! echoes the persisted record; update and delete of an unknown id fail with
//! [`StoreError::NotFound`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Directory, GroupArrangement, Schedule, ScheduleId};

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn fetch_schedules(&self) -> Result<Vec<Schedule>, StoreError>;

    async fn fetch_groups(&self) -> Result<Vec<GroupArrangement>, StoreError>;

    async fn fetch_directory(&self) -> Result<Directory, StoreError>;

    async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, StoreError>;

    async fn update_schedule(&self, id: ScheduleId, schedule: Schedule) -> Result<Schedule, StoreError>;

    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), StoreError>;

    async fn create_group(&self, group: GroupArrangement) -> Result<GroupArrangement, StoreError>;

    async fn update_group(
        &self,
        id: ScheduleId,
        group: GroupArrangement,
    ) -> Result<GroupArrangement, StoreError>;

    async fn delete_group(&self, id: ScheduleId) -> Result<(), StoreError>;
}

/// Shared stores, so several schedulers can work against one backend.
#[async_trait]
impl<T: ScheduleStore + ?Sized> ScheduleStore for Arc<T> {
    async fn fetch_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        (**self).fetch_schedules().await
    }

    async fn fetch_groups(&self) -> Result<Vec<GroupArrangement>, StoreError> {
        (**self).fetch_groups().await
    }

    async fn fetch_directory(&self) -> Result<Directory, StoreError> {
        (**self).fetch_directory().await
    }

    async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, StoreError> {
        (**self).create_schedule(schedule).await
    }

    async fn update_schedule(&self, id: ScheduleId, schedule: Schedule) -> Result<Schedule, StoreError> {
        (**self).update_schedule(id, schedule).await
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), StoreError> {
        (**self).delete_schedule(id).await
    }

    async fn create_group(&self, group: GroupArrangement) -> Result<GroupArrangement, StoreError> {
        (**self).create_group(group).await
    }

    async fn update_group(
        &self,
        id: ScheduleId,
        group: GroupArrangement,
    ) -> Result<GroupArrangement, StoreError> {
        (**self).update_group(id, group).await
    }

    async fn delete_group(&self, id: ScheduleId) -> Result<(), StoreError> {
        (**self).delete_group(id).await
    }
}

/// Everything a store holds, in one serializable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub next_id: ScheduleId,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub groups: Vec<GroupArrangement>,
    #[serde(default)]
    pub directory: Directory,
}

impl StoreSnapshot {
    fn allocate_id(&mut self) -> ScheduleId {
        self.next_id += 1;
        self.next_id
    }

    pub fn insert_schedule(&mut self, mut schedule: Schedule) -> Schedule {
        schedule.id = Some(self.allocate_id());
        self.schedules.push(schedule.clone());
        schedule
    }

    pub fn replace_schedule(&mut self, id: ScheduleId, mut schedule: Schedule) -> Result<Schedule, StoreError> {
        let slot = self
            .schedules
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        schedule.id = Some(id);
        *slot = schedule.clone();
        Ok(schedule)
    }

    pub fn remove_schedule(&mut self, id: ScheduleId) -> Result<(), StoreError> {
        let before = self.schedules.len();
        self.schedules.retain(|s| s.id != Some(id));
        if self.schedules.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    pub fn insert_group(&mut self, mut group: GroupArrangement) -> GroupArrangement {
        group.id = Some(self.allocate_id());
        self.groups.push(group.clone());
        group
    }

    pub fn replace_group(
        &mut self,
        id: ScheduleId,
        mut group: GroupArrangement,
    ) -> Result<GroupArrangement, StoreError> {
        let slot = self
            .groups
            .iter_mut()
            .find(|g| g.id == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        group.id = Some(id);
        *slot = group.clone();
        Ok(group)
    }

    pub fn remove_group(&mut self, id: ScheduleId) -> Result<(), StoreError> {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != Some(id));
        if self.groups.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

/// In-process store backed by a [`StoreSnapshot`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            inner: Mutex::new(snapshot),
        }
    }

    pub fn with_directory(directory: Directory) -> Self {
        Self::new(StoreSnapshot {
            directory,
            ..StoreSnapshot::default()
        })
    }

    /// A copy of the current contents.
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreSnapshot>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Request("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn fetch_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.lock()?.schedules.clone())
    }

    async fn fetch_groups(&self) -> Result<Vec<GroupArrangement>, StoreError> {
        Ok(self.lock()?.groups.clone())
    }

    async fn fetch_directory(&self) -> Result<Directory, StoreError> {
        Ok(self.lock()?.directory.clone())
    }

    async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, StoreError> {
        Ok(self.lock()?.insert_schedule(schedule))
    }

    async fn update_schedule(&self, id: ScheduleId, schedule: Schedule) -> Result<Schedule, StoreError> {
        self.lock()?.replace_schedule(id, schedule)
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), StoreError> {
        self.lock()?.remove_schedule(id)
    }

    async fn create_group(&self, group: GroupArrangement) -> Result<GroupArrangement, StoreError> {
        Ok(self.lock()?.insert_group(group))
    }

    async fn update_group(
        &self,
        id: ScheduleId,
        group: GroupArrangement,
    ) -> Result<GroupArrangement, StoreError> {
        self.lock()?.replace_group(id, group)
    }

    async fn delete_group(&self, id: ScheduleId) -> Result<(), StoreError> {
        self.lock()?.remove_group(id)
    }
}
