// SQLite repositories - one connection shared by the category and branch tables

use super::Repository;
use crate::branch::BranchRecord;
use crate::category::CategoryRecord;
use crate::error::{RegistryError, Result};
use crate::record::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Categories Table (value is the business key)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL UNIQUE,
            label TEXT NOT NULL,
            description TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Branches Table (name is unique regardless of case)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS branches (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,
            address TEXT,
            phone TEXT,
            email TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// SHARED CONNECTION
// ============================================================================

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn categories(&self) -> SqliteCategoryRepository {
        SqliteCategoryRepository {
            conn: Arc::clone(&self.conn),
        }
    }

    pub fn branches(&self) -> SqliteBranchRepository {
        SqliteBranchRepository {
            conn: Arc::clone(&self.conn),
        }
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| RegistryError::Internal("database connection lock poisoned".to_string()))
}

// Fixed-width so the text column sorts like the instant it holds
fn timestamp_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn timestamp_from_sql(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn uuid_from_sql(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn require_changed<R: Record>(changed: usize, record: &R) -> Result<()> {
    if changed == 0 {
        Err(RegistryError::not_found(R::ENTITY, record.id()))
    } else {
        Ok(())
    }
}

// ============================================================================
// CATEGORIES
// ============================================================================

#[derive(Clone)]
pub struct SqliteCategoryRepository {
    conn: Arc<Mutex<Connection>>,
}

const CATEGORY_COLUMNS: &str =
    "id, name, value, label, description, is_active, created_at, updated_at";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryRecord> {
    Ok(CategoryRecord {
        id: uuid_from_sql(row, 0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        label: row.get(3)?,
        description: row.get(4)?,
        is_active: row.get(5)?,
        created_at: timestamp_from_sql(row, 6)?,
        updated_at: timestamp_from_sql(row, 7)?,
    })
}

impl Repository for SqliteCategoryRepository {
    type Record = CategoryRecord;

    fn list(&self) -> Result<Vec<CategoryRecord>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY rowid"
        ))?;
        let records = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn get(&self, id: Uuid) -> Result<Option<CategoryRecord>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id.to_string()], category_from_row)?;
        let record = rows.next().transpose()?;
        Ok(record)
    }

    fn insert(&self, c: &CategoryRecord) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO categories (
                id, name, value, label, description, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                c.id.to_string(),
                c.name,
                c.value,
                c.label,
                c.description,
                c.is_active,
                timestamp_to_sql(c.created_at),
                timestamp_to_sql(c.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update(&self, c: &CategoryRecord) -> Result<()> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            "UPDATE categories
             SET name = ?2, value = ?3, label = ?4, description = ?5,
                 is_active = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                c.id.to_string(),
                c.name,
                c.value,
                c.label,
                c.description,
                c.is_active,
                timestamp_to_sql(c.updated_at),
            ],
        )?;
        require_changed(changed, c)
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            "DELETE FROM categories WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }
}

// ============================================================================
// BRANCHES
// ============================================================================

#[derive(Clone)]
pub struct SqliteBranchRepository {
    conn: Arc<Mutex<Connection>>,
}

const BRANCH_COLUMNS: &str =
    "id, name, description, address, phone, email, is_active, created_at, updated_at";

fn branch_from_row(row: &Row<'_>) -> rusqlite::Result<BranchRecord> {
    Ok(BranchRecord {
        id: uuid_from_sql(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        address: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        is_active: row.get(6)?,
        created_at: timestamp_from_sql(row, 7)?,
        updated_at: timestamp_from_sql(row, 8)?,
    })
}

impl Repository for SqliteBranchRepository {
    type Record = BranchRecord;

    fn list(&self) -> Result<Vec<BranchRecord>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches ORDER BY rowid"
        ))?;
        let records = stmt
            .query_map([], branch_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn get(&self, id: Uuid) -> Result<Option<BranchRecord>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id.to_string()], branch_from_row)?;
        let record = rows.next().transpose()?;
        Ok(record)
    }

    fn insert(&self, b: &BranchRecord) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO branches (
                id, name, description, address, phone, email,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                b.id.to_string(),
                b.name,
                b.description,
                b.address,
                b.phone,
                b.email,
                b.is_active,
                timestamp_to_sql(b.created_at),
                timestamp_to_sql(b.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update(&self, b: &BranchRecord) -> Result<()> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute(
            "UPDATE branches
             SET name = ?2, description = ?3, address = ?4, phone = ?5, email = ?6,
                 is_active = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                b.id.to_string(),
                b.name,
                b.description,
                b.address,
                b.phone,
                b.email,
                b.is_active,
                timestamp_to_sql(b.updated_at),
            ],
        )?;
        require_changed(changed, b)
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let conn = lock(&self.conn)?;
        let changed = conn.execute("DELETE FROM branches WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }
}
