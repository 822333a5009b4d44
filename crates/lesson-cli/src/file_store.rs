//! A [`ScheduleStore`] persisted as one JSON document.
//!
//! Every call re-reads the file, so separate `lessons` invocations see each
//! other's writes. A missing file is an empty store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lesson_engine::{
    Directory, GroupArrangement, Schedule, ScheduleId, ScheduleStore, StoreError, StoreSnapshot,
};
use tokio::sync::Mutex;
use tracing::debug;

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn request_error(&self, action: &str, e: impl std::fmt::Display) -> StoreError {
        StoreError::Request(format!("Failed to {} {}: {}", action, self.path.display(), e))
    }

    async fn read(&self) -> Result<StoreSnapshot, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(StoreSnapshot::default()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| self.request_error("parse", e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreSnapshot::default()),
            Err(e) => Err(self.request_error("read", e)),
        }
    }

    async fn write(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| self.request_error("encode", e))?;
        // Write a sibling file and rename it over the store so a crash mid-write
        // leaves the previous document intact.
        let staging = self.staging_path();
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| self.request_error("write", e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.request_error("replace", e))?;
        debug!(path = %self.path.display(), schedules = snapshot.schedules.len(), "store written");
        Ok(())
    }

    /// Read, apply `change`, and write back only if it succeeded.
    async fn modify<T, F>(&self, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read().await?;
        let out = change(&mut snapshot)?;
        self.write(&snapshot).await?;
        Ok(out)
    }
}

#[async_trait]
impl ScheduleStore for JsonFileStore {
    async fn fetch_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.read().await?.schedules)
    }

    async fn fetch_groups(&self) -> Result<Vec<GroupArrangement>, StoreError> {
        Ok(self.read().await?.groups)
    }

    async fn fetch_directory(&self) -> Result<Directory, StoreError> {
        Ok(self.read().await?.directory)
    }

    async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, StoreError> {
        self.modify(|s| Ok(s.insert_schedule(schedule))).await
    }

    async fn update_schedule(&self, id: ScheduleId, schedule: Schedule) -> Result<Schedule, StoreError> {
        self.modify(|s| s.replace_schedule(id, schedule)).await
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), StoreError> {
        self.modify(|s| s.remove_schedule(id)).await
    }

    async fn create_group(&self, group: GroupArrangement) -> Result<GroupArrangement, StoreError> {
        self.modify(|s| Ok(s.insert_group(group))).await
    }

    async fn update_group(
        &self,
        id: ScheduleId,
        group: GroupArrangement,
    ) -> Result<GroupArrangement, StoreError> {
        self.modify(|s| s.replace_group(id, group)).await
    }

    async fn delete_group(&self, id: ScheduleId) -> Result<(), StoreError> {
        self.modify(|s| s.remove_group(id)).await
    }
}
