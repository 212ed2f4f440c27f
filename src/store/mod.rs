// 🗄️ Storage - repository contract behind both registries
//
// The registries own validation, uniqueness and id assignment; a repository only
// stores and returns whole records. Two backends:
// - MemoryRepository: ordered Vec behind a RwLock (tests, server without a database)
// - Sqlite*Repository: durable store on a shared rusqlite connection

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::record::Record;
use uuid::Uuid;

pub use memory::MemoryRepository;
pub use sqlite::{setup_database, SqliteBranchRepository, SqliteCategoryRepository, SqliteStore};

pub trait Repository: Send + Sync {
    type Record: Record;

    /// All records, in insertion order
    fn list(&self) -> Result<Vec<Self::Record>>;

    fn get(&self, id: Uuid) -> Result<Option<Self::Record>>;

    /// Store a new record. A duplicate id is a `Conflict`.
    fn insert(&self, record: &Self::Record) -> Result<()>;

    /// Replace the stored record with the same id. Missing id is `NotFound`.
    fn update(&self, record: &Self::Record) -> Result<()>;

    /// Remove a record; `false` when nothing had that id
    fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Lets a registry hold a store chosen at runtime
impl<T> Repository for Box<T>
where
    T: Repository + ?Sized,
{
    type Record = T::Record;

    fn list(&self) -> Result<Vec<Self::Record>> {
        (**self).list()
    }

    fn get(&self, id: Uuid) -> Result<Option<Self::Record>> {
        (**self).get(id)
    }

    fn insert(&self, record: &Self::Record) -> Result<()> {
        (**self).insert(record)
    }

    fn update(&self, record: &Self::Record) -> Result<()> {
        (**self).update(record)
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        (**self).delete(id)
    }
}
