// 🏬 Branch Registry - physical locations of the business
//
// Branch name is the business key: unique regardless of case ("Main Branch" == "main branch").
// Contact fields are optional and stored as absent, never as empty strings.

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
pub const ADDRESS_MAX: usize = 200;
pub const PHONE_MAX: usize = 20;

/// Seed branches: (name, description)
pub const DEFAULT_BRANCHES: &[(&str, &str)] = &[
    ("Main Branch", "Head office and main store"),
    ("North Branch", "Northern district store"),
];

// ============================================================================
// BRANCH RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub id: Uuid,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for BranchRecord {
    const ENTITY: &'static str = "Branch";

    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// INPUTS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBranch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewBranch {
    pub fn new(name: impl Into<String>) -> Self {
        NewBranch {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_contact(
        mut self,
        address: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Self {
        self.address = address.map(str::to_string);
        self.phone = phone.map(str::to_string);
        self.email = email.map(str::to_string);
        self
    }
}

/// Partial update; every optional field can be kept, set or cleared
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBranch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub address: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// BRANCH REGISTRY
// ============================================================================

/// Owns the branch collection. Writes are serialized by `write_lock`.
pub struct BranchRegistry<S = MemoryRepository<BranchRecord>> {
    store: S,
    write_lock: Mutex<()>,
}

impl BranchRegistry<MemoryRepository<BranchRecord>> {
    pub fn new() -> Self {
        Self::with_store(MemoryRepository::new())
    }

    /// In-memory registry with the default branches pre-loaded
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        if let Err(e) = registry.seed_defaults() {
            warn!(error = %e, "failed to seed default branches");
        }
        registry
    }
}

impl Default for BranchRegistry<MemoryRepository<BranchRecord>> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<S> BranchRegistry<S>
where
    S: Repository<Record = BranchRecord>,
{
    pub fn with_store(store: S) -> Self {
        BranchRegistry {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn seed_defaults(&self) -> Result<usize> {
        let mut created = 0;
        for (name, description) in DEFAULT_BRANCHES {
            match self.create(NewBranch::new(*name).with_description(*description)) {
                Ok(_) => created += 1,
                Err(RegistryError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    pub fn list_active(&self) -> Result<Listing<BranchRecord>> {
        let records: Vec<BranchRecord> = self
            .all_records("list_active")?
            .into_iter()
            .filter(|b| b.is_active)
            .collect();
        debug!(count = records.len(), "listed active branches");
        Ok(Listing::new(records))
    }

    pub fn list_all(&self) -> Result<Listing<BranchRecord>> {
        let records = self.all_records("list_all")?;
        debug!(count = records.len(), "listed all branches");
        Ok(Listing::new(records))
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<BranchRecord> {
        self.store
            .get(id)
            .map_err(|e| e.logged(BranchRecord::ENTITY, "get_by_id"))?
            .ok_or_else(|| RegistryError::not_found(BranchRecord::ENTITY, id))
    }

    pub fn create(&self, input: NewBranch) -> Result<BranchRecord> {
        let description = non_empty(input.description);
        let address = non_empty(input.address);
        let phone = non_empty(input.phone);
        let email = non_empty(input.email);

        let mut v = Validator::new();
        v.required_text("name", "Name", &input.name, NAME_MAX);
        v.optional_text("description", "Description", description.as_deref(), DESCRIPTION_MAX);
        v.optional_text("address", "Address", address.as_deref(), ADDRESS_MAX);
        v.optional_text("phone", "Phone", phone.as_deref(), PHONE_MAX);
        v.email("email", email.as_deref());
        v.finish().map_err(|e| rejected("create", e))?;

        let _guard = self.lock_writes()?;
        self.ensure_name_available(&input.name, None)
            .map_err(|e| rejected("create", e))?;

        let now = Utc::now();
        let record = BranchRecord {
            id: Uuid::new_v4(),
            name: input.name,
            description,
            address,
            phone,
            email,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(&record)
            .map_err(|e| e.logged(BranchRecord::ENTITY, "create"))?;

        info!(branch_id = %record.id, name = %record.name, "branch created");
        Ok(record)
    }

    pub fn update(&self, id: Uuid, changes: UpdateBranch) -> Result<BranchRecord> {
        let description = changes.description.empty_as_clear();
        let address = changes.address.empty_as_clear();
        let phone = changes.phone.empty_as_clear();
        let email = changes.email.empty_as_clear();

        let mut v = Validator::new();
        if let Some(name) = &changes.name {
            v.required_text("name", "Name", name, NAME_MAX);
        }
        v.optional_text("description", "Description", description.as_str(), DESCRIPTION_MAX);
        v.optional_text("address", "Address", address.as_str(), ADDRESS_MAX);
        v.optional_text("phone", "Phone", phone.as_str(), PHONE_MAX);
        v.email("email", email.as_str());
        v.finish().map_err(|e| rejected("update", e))?;

        let _guard = self.lock_writes()?;
        let mut record = self.get_by_id(id)?;

        if let Some(name) = &changes.name {
            self.ensure_name_available(name, Some(id))
                .map_err(|e| rejected("update", e))?;
        }

        if let Some(name) = changes.name {
            record.name = name;
        }
        description.apply_to(&mut record.description);
        address.apply_to(&mut record.address);
        phone.apply_to(&mut record.phone);
        email.apply_to(&mut record.email);
        record.updated_at = next_updated_at(record.updated_at);

        self.store
            .update(&record)
            .map_err(|e| e.logged(BranchRecord::ENTITY, "update"))?;

        info!(branch_id = %record.id, "branch updated");
        Ok(record)
    }

    pub fn delete(&self, id: Uuid) -> Result<BranchRecord> {
        let _guard = self.lock_writes()?;
        let record = self.get_by_id(id)?;
        let removed = self
            .store
            .delete(id)
            .map_err(|e| e.logged(BranchRecord::ENTITY, "delete"))?;

        if !removed {
            return Err(RegistryError::not_found(BranchRecord::ENTITY, id));
        }

        info!(branch_id = %id, "branch deleted");
        Ok(record)
    }

    pub fn toggle_status(&self, id: Uuid) -> Result<BranchRecord> {
        let _guard = self.lock_writes()?;
        let mut record = self.get_by_id(id)?;

        record.is_active = !record.is_active;
        record.updated_at = next_updated_at(record.updated_at);

        self.store
            .update(&record)
            .map_err(|e| e.logged(BranchRecord::ENTITY, "toggle_status"))?;

        info!(branch_id = %record.id, is_active = record.is_active, "branch status toggled");
        Ok(record)
    }

    fn all_records(&self, operation: &str) -> Result<Vec<BranchRecord>> {
        self.store
            .list()
            .map_err(|e| e.logged(BranchRecord::ENTITY, operation))
    }

    /// Case-insensitive match against every record except `exclude`
    fn ensure_name_available(&self, name: &str, exclude: Option<Uuid>) -> Result<()> {
        let wanted = name.to_lowercase();
        let taken = self
            .all_records("uniqueness_check")?
            .iter()
            .any(|b| b.name.to_lowercase() == wanted && Some(b.id) != exclude);

        if taken {
            Err(RegistryError::conflict(format!(
                "A branch named '{name}' already exists"
            )))
        } else {
            Ok(())
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| RegistryError::Internal("branch write lock poisoned".to_string()))
    }
}

fn rejected(operation: &str, err: RegistryError) -> RegistryError {
    warn!(operation, error = %err, "branch write rejected");
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_creation_stores_absent_fields() {
        let registry = BranchRegistry::new();
        let branch = registry
            .create(NewBranch::new("Harbour").with_contact(Some(""), Some("555-0100"), None))
            .unwrap();

        assert_eq!(branch.name, "Harbour");
        assert_eq!(branch.address, None);
        assert_eq!(branch.phone.as_deref(), Some("555-0100"));
        assert_eq!(branch.email, None);
        assert!(branch.is_active);
    }

    #[test]
    fn test_name_conflict_ignores_case() {
        let registry = BranchRegistry::with_defaults();
        let err = registry.create(NewBranch::new("main branch")).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
    }

    #[test]
    fn test_create_validates_contact_fields() {
        let registry = BranchRegistry::new();
        let input = NewBranch::new("Harbour").with_contact(
            Some(&"a".repeat(201)),
            Some("+1 (555) 010-0100 ext 42"),
            Some("not-an-email"),
        );

        let err = registry.create(input).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["address", "phone", "email"]);
        assert_eq!(registry.list_all().unwrap().total, 0);
    }

    #[test]
    fn test_rename_to_own_name_in_other_case() {
        let registry = BranchRegistry::new();
        let b = registry.create(NewBranch::new("Harbour")).unwrap();

        let renamed = registry
            .update(
                b.id,
                UpdateBranch {
                    name: Some("HARBOUR".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "HARBOUR");
    }

    #[test]
    fn test_rename_onto_other_branch_conflicts() {
        let registry = BranchRegistry::with_defaults();
        let b = registry.create(NewBranch::new("Harbour")).unwrap();

        let err = registry
            .update(
                b.id,
                UpdateBranch {
                    name: Some("NORTH BRANCH".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));
        assert_eq!(registry.get_by_id(b.id).unwrap().name, "Harbour");
    }

    #[test]
    fn test_update_sets_and_clears_contact_fields() {
        let registry = BranchRegistry::new();
        let b = registry
            .create(NewBranch::new("Harbour").with_contact(
                Some("1 Quay St"),
                Some("555-0100"),
                Some("harbour@example.com"),
            ))
            .unwrap();

        let updated = registry
            .update(
                b.id,
                UpdateBranch {
                    address: Patch::Clear,
                    phone: Patch::Set(String::new()),
                    email: Patch::Set("quay@example.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.address, None);
        assert_eq!(updated.phone, None);
        assert_eq!(updated.email.as_deref(), Some("quay@example.com"));
        assert!(updated.updated_at > b.updated_at);
    }

    #[test]
    fn test_update_rejects_invalid_email() {
        let registry = BranchRegistry::new();
        let b = registry.create(NewBranch::new("Harbour")).unwrap();

        let err = registry
            .update(
                b.id,
                UpdateBranch {
                    email: Patch::Set("not-an-email".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::ValidationFailed(_)));
        assert_eq!(registry.get_by_id(b.id).unwrap(), b);
    }

    #[test]
    fn test_toggle_twice_restores_status() {
        let registry = BranchRegistry::new();
        let b = registry.create(NewBranch::new("Harbour")).unwrap();

        let once = registry.toggle_status(b.id).unwrap();
        let twice = registry.toggle_status(b.id).unwrap();

        assert!(!once.is_active);
        assert!(twice.is_active);
        assert!(once.updated_at > b.updated_at);
        assert!(twice.updated_at > once.updated_at);
    }
}
