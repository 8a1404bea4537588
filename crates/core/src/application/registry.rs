// Active-application registry
use crate::domain::ActiveApplicationRecord;
use crate::port::TimeProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Applications the controller launched and has not closed yet
///
/// Keys are lowercased, trimmed application names. Every method is a single
/// locked table operation; nothing is persisted and nothing is evicted.
pub struct ApplicationRegistry {
    apps: Mutex<HashMap<String, ActiveApplicationRecord>>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ApplicationRegistry {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            apps: Mutex::new(HashMap::new()),
            time_provider,
        }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    // A poisoned table is still a consistent table: every mutation is one insert/remove
    fn table(&self) -> MutexGuard<'_, HashMap<String, ActiveApplicationRecord>> {
        self.apps.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace the record for `name`
    pub fn register(&self, name: &str, command: &str) -> ActiveApplicationRecord {
        let key = Self::key(name);
        let record = ActiveApplicationRecord {
            name: key.clone(),
            start_time: self.time_provider.now_millis(),
            command: command.to_string(),
        };
        self.table().insert(key, record.clone());
        debug!(app = %record.name, command = %record.command, "Application registered");
        record
    }

    pub fn unregister(&self, name: &str) -> Option<ActiveApplicationRecord> {
        let removed = self.table().remove(&Self::key(name));
        if let Some(record) = &removed {
            debug!(app = %record.name, "Application unregistered");
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table().contains_key(&Self::key(name))
    }

    /// Snapshot copy, sorted by name
    pub fn list(&self) -> Vec<ActiveApplicationRecord> {
        let mut records: Vec<_> = self.table().values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}
