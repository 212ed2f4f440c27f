// In-memory repository: the whole collection lives in one ordered Vec

use super::Repository;
use crate::error::{RegistryError, Result};
use crate::record::Record;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Clone)]
pub struct MemoryRepository<R> {
    records: Arc<RwLock<Vec<R>>>,
}

impl<R: Record> MemoryRepository<R> {
    pub fn new() -> Self {
        MemoryRepository {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<R>>> {
        self.records
            .read()
            .map_err(|_| RegistryError::Internal(format!("{} store lock poisoned", R::ENTITY)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<R>>> {
        self.records
            .write()
            .map_err(|_| RegistryError::Internal(format!("{} store lock poisoned", R::ENTITY)))
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Repository for MemoryRepository<R> {
    type Record = R;

    fn list(&self) -> Result<Vec<R>> {
        Ok(self.read()?.clone())
    }

    fn get(&self, id: Uuid) -> Result<Option<R>> {
        Ok(self.read()?.iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, record: &R) -> Result<()> {
        let mut records = self.write()?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(RegistryError::conflict(format!(
                "{} id already exists: {}",
                R::ENTITY,
                record.id()
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    fn update(&self, record: &R) -> Result<()> {
        let mut records = self.write()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| RegistryError::not_found(R::ENTITY, record.id()))?;
        *slot = record.clone();
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: Uuid,
        label: &'static str,
    }

    impl Record for Entry {
        const ENTITY: &'static str = "Entry";

        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn entry(label: &'static str) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            label,
        }
    }

    #[test]
    fn test_insert_keeps_order() {
        let repo = MemoryRepository::new();
        for label in ["a", "b", "c"] {
            repo.insert(&entry(label)).unwrap();
        }

        let labels: Vec<&str> = repo.list().unwrap().iter().map(|p| p.label).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_id_is_conflict() {
        let repo = MemoryRepository::new();
        let p = entry("a");
        repo.insert(&p).unwrap();

        let err = repo.insert(&p).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let repo = MemoryRepository::new();
        let mut p = entry("a");
        repo.insert(&p).unwrap();

        p.label = "z";
        repo.update(&p).unwrap();
        assert_eq!(repo.get(p.id).unwrap().unwrap().label, "z");

        assert!(repo.delete(p.id).unwrap());
        assert!(!repo.delete(p.id).unwrap());
        assert!(repo.get(p.id).unwrap().is_none());

        let err = repo.update(&p).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }
}
