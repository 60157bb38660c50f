use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use fair_share_core::{GameResultInput, GameResultRecord};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive lock poisoned")]
    Poisoned,
}

/// Volatile store of finished-game summaries. Lives as long as the process;
/// records are never updated or removed.
#[derive(Debug, Default)]
pub struct ResultArchive {
    inner: RwLock<ArchiveInner>,
}

#[derive(Debug, Default)]
struct ArchiveInner {
    records: HashMap<Uuid, StoredResult>,
    next_seq: u64,
}

#[derive(Debug)]
struct StoredResult {
    seq: u64,
    record: GameResultRecord,
}

impl ResultArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, input: GameResultInput) -> Result<GameResultRecord, ArchiveError> {
        self.save_at(input, Utc::now())
    }

    pub fn save_at(
        &self,
        input: GameResultInput,
        completed_at: DateTime<Utc>,
    ) -> Result<GameResultRecord, ArchiveError> {
        let mut inner = self.inner.write().map_err(|_| ArchiveError::Poisoned)?;
        let record = GameResultRecord::new(input, Uuid::new_v4(), completed_at);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(
            record.id,
            StoredResult {
                seq,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    /// All records, newest first. Records completed at the same instant come
    /// out in reverse insertion order.
    pub fn list(&self) -> Result<Vec<GameResultRecord>, ArchiveError> {
        let inner = self.inner.read().map_err(|_| ArchiveError::Poisoned)?;
        let mut stored: Vec<&StoredResult> = inner.records.values().collect();
        stored.sort_by(|a, b| {
            b.record
                .completed_at
                .cmp(&a.record.completed_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(stored.into_iter().map(|s| s.record.clone()).collect())
    }

    pub fn len(&self) -> Result<usize, ArchiveError> {
        let inner = self.inner.read().map_err(|_| ArchiveError::Poisoned)?;
        Ok(inner.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, ArchiveError> {
        self.len().map(|len| len == 0)
    }

    /// Leaves the lock poisoned, as a writer that panicked mid-insert would.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                let _guard = self.inner.write().unwrap();
                panic!("writer panicked while holding the archive lock");
            });
            assert!(writer.join().is_err());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(name: &str) -> GameResultInput {
        GameResultInput {
            participant1_name: name.to_string(),
            participant2_name: "Bo".to_string(),
            home_type: "house".to_string(),
            has_children: false,
            has_pets: true,
            has_car: false,
            participant1_tasks: 3,
            participant2_tasks: 2,
            together_tasks: 1,
        }
    }

    #[test]
    fn save_assigns_fresh_ids() {
        let archive = ResultArchive::new();
        let a = archive.save(input("a")).unwrap();
        let b = archive.save(input("b")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(archive.len().unwrap(), 2);
        assert!(archive.list().unwrap().contains(&a));
    }

    #[test]
    fn poisoned_lock_fails_every_operation() {
        let archive = ResultArchive::new();
        archive.save(input("before")).unwrap();
        archive.poison();

        assert!(matches!(archive.save(input("after")), Err(ArchiveError::Poisoned)));
        assert!(matches!(archive.list(), Err(ArchiveError::Poisoned)));
        assert!(matches!(archive.len(), Err(ArchiveError::Poisoned)));
        assert!(matches!(archive.is_empty(), Err(ArchiveError::Poisoned)));

        let inner = archive.inner.read().unwrap_err().into_inner();
        assert_eq!(inner.records.len(), 1);
    }

    #[test]
    fn list_is_newest_first() {
        let archive = ResultArchive::new();
        let now = Utc::now();
        archive.save_at(input("middle"), now).unwrap();
        archive
            .save_at(input("oldest"), now - Duration::minutes(5))
            .unwrap();
        archive
            .save_at(input("newest"), now + Duration::minutes(5))
            .unwrap();

        let names: Vec<String> = archive
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.participant1_name)
            .collect();
        assert_eq!(names, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn same_instant_lists_later_insert_first() {
        let archive = ResultArchive::new();
        let now = Utc::now();
        archive.save_at(input("first"), now).unwrap();
        archive.save_at(input("second"), now).unwrap();
        let listed = archive.list().unwrap();
        assert_eq!(listed[0].participant1_name, "second");
        assert_eq!(listed[1].participant1_name, "first");
    }
}
