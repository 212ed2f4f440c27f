// 🏷️ Category Registry - product categories used across operational settings
//
// "Category UUID is IDENTITY (never changes), value is the business key (unique)"
//
// - value: lowercase slug (e.g. "frozen-products"), unique across active AND inactive records
// - label: always mirrors name
// - inactive categories are hidden from the default listing but stay addressable

use crate::error::{RegistryError, Result};
use crate::patch::Patch;
use crate::record::{next_updated_at, Listing, Record};
use crate::store::{MemoryRepository, Repository};
use crate::validation::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

/// Seed categories: (name, value, description)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Frozen Products", "frozen-products", "Frozen and chilled goods"),
    ("Fresh Produce", "fresh-produce", "Fruit and vegetables"),
    ("Dairy", "dairy", "Milk, cheese and eggs"),
    ("Beverages", "beverages", "Soft drinks, juices and water"),
    ("Bakery", "bakery", "Bread and pastries"),
];

// ============================================================================
// CATEGORY RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    /// Stable identity (UUID) - NEVER changes
    pub id: Uuid,

    /// Display name (≤100 chars)
    pub name: String,

    /// Unique slug matching ^[a-z0-9-]+$
    pub value: String,

    /// Mirrors `name`
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryRecord {
    fn new(name: String, value: String, description: Option<String>) -> Self {
        let now = Utc::now();

        CategoryRecord {
            id: Uuid::new_v4(),
            label: name.clone(),
            name,
            value,
            description,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for CategoryRecord {
    const ENTITY: &'static str = "Category";

    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// INPUTS
// ============================================================================

/// Create request. Missing fields deserialize empty so they surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        NewCategory {
            name: name.into(),
            value: value.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update. Omitted fields are left alone; `description` can be cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

// ============================================================================
// CATEGORY REGISTRY
// ============================================================================

/// Owns the category collection and its lifecycle.
///
/// Every mutation runs under `write_lock`, so the uniqueness check and the
/// write it guards cannot interleave with another writer.
pub struct CategoryRegistry<S = MemoryRepository<CategoryRecord>> {
    store: S,
    write_lock: Mutex<()>,
}

impl CategoryRegistry<MemoryRepository<CategoryRecord>> {
    /// Create new empty in-memory registry
    pub fn new() -> Self {
        Self::with_store(MemoryRepository::new())
    }

    /// Create in-memory registry with default categories pre-loaded
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        if let Err(e) = registry.seed_defaults() {
            warn!(error = %e, "failed to seed default categories");
        }
        registry
    }
}

impl Default for CategoryRegistry<MemoryRepository<CategoryRecord>> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<S> CategoryRegistry<S>
where
    S: Repository<Record = CategoryRecord>,
{
    pub fn with_store(store: S) -> Self {
        CategoryRegistry {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Insert the default categories, skipping any whose value already exists
    pub fn seed_defaults(&self) -> Result<usize> {
        let mut created = 0;
        for (name, value, description) in DEFAULT_CATEGORIES {
            match self.create(NewCategory::new(*name, *value).with_description(*description)) {
                Ok(_) => created += 1,
                Err(RegistryError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Active categories only
    pub fn list_active(&self) -> Result<Listing<CategoryRecord>> {
        let records: Vec<CategoryRecord> = self
            .all_records("list_active")?
            .into_iter()
            .filter(|c| c.is_active)
            .collect();
        debug!(count = records.len(), "listed active categories");
        Ok(Listing::new(records))
    }

    /// Every category, active or not
    pub fn list_all(&self) -> Result<Listing<CategoryRecord>> {
        let records = self.all_records("list_all")?;
        debug!(count = records.len(), "listed all categories");
        Ok(Listing::new(records))
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<CategoryRecord> {
        self.store
            .get(id)
            .map_err(|e| e.logged(CategoryRecord::ENTITY, "get_by_id"))?
            .ok_or_else(|| RegistryError::not_found(CategoryRecord::ENTITY, id))
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    pub fn create(&self, input: NewCategory) -> Result<CategoryRecord> {
        let description = input.description.filter(|d| !d.is_empty());

        let mut v = Validator::new();
        v.required_text("name", "Name", &input.name, NAME_MAX);
        v.category_value("value", &input.value);
        v.optional_text("description", "Description", description.as_deref(), DESCRIPTION_MAX);
        v.finish().map_err(|e| rejected("create", e))?;

        let _guard = self.lock_writes()?;
        self.ensure_value_available(&input.value, None)
            .map_err(|e| rejected("create", e))?;

        let record = CategoryRecord::new(input.name, input.value, description);
        self.store
            .insert(&record)
            .map_err(|e| e.logged(CategoryRecord::ENTITY, "create"))?;

        info!(category_id = %record.id, value = %record.value, "category created");
        Ok(record)
    }

    pub fn update(&self, id: Uuid, changes: UpdateCategory) -> Result<CategoryRecord> {
        let description = changes.description.empty_as_clear();

        let mut v = Validator::new();
        if let Some(name) = &changes.name {
            v.required_text("name", "Name", name, NAME_MAX);
        }
        if let Some(value) = &changes.value {
            v.category_value("value", value);
        }
        v.optional_text("description", "Description", description.as_str(), DESCRIPTION_MAX);
        v.finish().map_err(|e| rejected("update", e))?;

        let _guard = self.lock_writes()?;
        let mut record = self.get_by_id(id)?;

        if let Some(value) = &changes.value {
            self.ensure_value_available(value, Some(id))
                .map_err(|e| rejected("update", e))?;
        }

        if let Some(name) = changes.name {
            record.label = name.clone();
            record.name = name;
        }
        if let Some(value) = changes.value {
            record.value = value;
        }
        description.apply_to(&mut record.description);
        record.updated_at = next_updated_at(record.updated_at);

        self.store
            .update(&record)
            .map_err(|e| e.logged(CategoryRecord::ENTITY, "update"))?;

        info!(category_id = %record.id, "category updated");
        Ok(record)
    }

    /// Hard delete; the id never comes back
    pub fn delete(&self, id: Uuid) -> Result<CategoryRecord> {
        let _guard = self.lock_writes()?;
        let record = self.get_by_id(id)?;
        let removed = self
            .store
            .delete(id)
            .map_err(|e| e.logged(CategoryRecord::ENTITY, "delete"))?;

        if !removed {
            return Err(RegistryError::not_found(CategoryRecord::ENTITY, id));
        }

        info!(category_id = %id, "category deleted");
        Ok(record)
    }

    /// Flip `is_active`
    pub fn toggle_status(&self, id: Uuid) -> Result<CategoryRecord> {
        let _guard = self.lock_writes()?;
        let mut record = self.get_by_id(id)?;

        record.is_active = !record.is_active;
        record.updated_at = next_updated_at(record.updated_at);

        self.store
            .update(&record)
            .map_err(|e| e.logged(CategoryRecord::ENTITY, "toggle_status"))?;

        info!(category_id = %record.id, is_active = record.is_active, "category status toggled");
        Ok(record)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn all_records(&self, operation: &str) -> Result<Vec<CategoryRecord>> {
        self.store
            .list()
            .map_err(|e| e.logged(CategoryRecord::ENTITY, operation))
    }

    /// Exact, case-sensitive match against every record except `exclude`
    fn ensure_value_available(&self, value: &str, exclude: Option<Uuid>) -> Result<()> {
        let taken = self
            .all_records("uniqueness_check")?
            .iter()
            .any(|c| c.value == value && Some(c.id) != exclude);

        if taken {
            Err(RegistryError::conflict(format!(
                "A category with value '{value}' already exists"
            )))
        } else {
            Ok(())
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| RegistryError::Internal("category write lock poisoned".to_string()))
    }
}

fn rejected(operation: &str, err: RegistryError) -> RegistryError {
    warn!(operation, error = %err, "category write rejected");
    err
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_creation() {
        let registry = CategoryRegistry::new();
        let category = registry
            .create(NewCategory::new("Frozen Products", "frozen-products"))
            .unwrap();

        assert_eq!(category.name, "Frozen Products");
        assert_eq!(category.label, "Frozen Products");
        assert_eq!(category.value, "frozen-products");
        assert!(category.is_active);
        assert!(category.description.is_none());
        assert_eq!(category.created_at, category.updated_at);
    }

    #[test]
    fn test_category_registry_initialization() {
        let registry = CategoryRegistry::with_defaults();

        let listing = registry.list_active().unwrap();
        assert_eq!(listing.total, DEFAULT_CATEGORIES.len());

        let values: Vec<&str> = listing.records.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"frozen-products"));
        assert!(values.contains(&"dairy"));
    }

    #[test]
    fn test_seed_defaults_is_repeatable() {
        let registry = CategoryRegistry::with_defaults();
        assert_eq!(registry.seed_defaults().unwrap(), 0);
        assert_eq!(registry.list_all().unwrap().total, DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_create_reports_every_invalid_field() {
        let registry = CategoryRegistry::new();
        let err = registry
            .create(NewCategory::new("", "Has Spaces").with_description("x".repeat(501)))
            .unwrap_err();

        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "value", "description"]);
        assert_eq!(registry.list_all().unwrap().total, 0);
    }

    #[test]
    fn test_duplicate_value_conflicts_even_when_inactive() {
        let registry = CategoryRegistry::with_defaults();
        let frozen = registry
            .list_all()
            .unwrap()
            .records
            .into_iter()
            .find(|c| c.value == "frozen-products")
            .unwrap();
        registry.toggle_status(frozen.id).unwrap();

        let err = registry
            .create(NewCategory::new("X", "frozen-products"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
    }

    #[test]
    fn test_value_match_is_case_sensitive_exact() {
        let registry = CategoryRegistry::new();
        registry.create(NewCategory::new("Dairy", "dairy")).unwrap();

        // Different value, no conflict
        assert!(registry.create(NewCategory::new("Dairy 2", "dairy-2")).is_ok());
    }

    #[test]
    fn test_update_name_mirrors_label() {
        let registry = CategoryRegistry::new();
        let c = registry.create(NewCategory::new("Dairy", "dairy")).unwrap();

        let updated = registry
            .update(
                c.id,
                UpdateCategory {
                    name: Some("Dairy & Eggs".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Dairy & Eggs");
        assert_eq!(updated.label, "Dairy & Eggs");
        assert_eq!(updated.value, "dairy");
        assert!(updated.updated_at > c.updated_at);
        assert_eq!(updated.created_at, c.created_at);
    }

    #[test]
    fn test_update_value_excludes_itself() {
        let registry = CategoryRegistry::new();
        let c = registry.create(NewCategory::new("Dairy", "dairy")).unwrap();
        registry.create(NewCategory::new("Bakery", "bakery")).unwrap();

        // Re-sending its own value is fine
        let same = UpdateCategory {
            value: Some("dairy".to_string()),
            ..Default::default()
        };
        assert!(registry.update(c.id, same).is_ok());

        let taken = UpdateCategory {
            value: Some("bakery".to_string()),
            ..Default::default()
        };
        let err = registry.update(c.id, taken).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
        assert_eq!(registry.get_by_id(c.id).unwrap().value, "dairy");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let registry = CategoryRegistry::new();
        let err = registry
            .update(Uuid::new_v4(), UpdateCategory::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_toggle_and_delete() {
        let registry = CategoryRegistry::new();
        let c = registry.create(NewCategory::new("Dairy", "dairy")).unwrap();

        let toggled = registry.toggle_status(c.id).unwrap();
        assert!(!toggled.is_active);
        assert_eq!(registry.list_active().unwrap().total, 0);
        assert_eq!(registry.list_all().unwrap().total, 1);

        registry.delete(c.id).unwrap();
        assert!(matches!(
            registry.delete(c.id).unwrap_err(),
            RegistryError::NotFound { .. }
        ));
        assert!(matches!(
            registry.toggle_status(c.id).unwrap_err(),
            RegistryError::NotFound { .. }
        ));
    }
}
