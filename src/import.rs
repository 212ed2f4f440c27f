// 📥 CSV Import - bulk-load categories or branches through the registries
//
// Each row goes through the normal create path (validation + uniqueness).
// Rejected rows are skipped and reported; I/O and parse failures abort.

use crate::branch::{BranchRecord, BranchRegistry, NewBranch};
use crate::category::{CategoryRecord, CategoryRegistry, NewCategory};
use crate::error::RegistryError;
use crate::store::Repository;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    /// One line per skipped row: "line N: reason"
    pub errors: Vec<String>,
}

/// CSV columns: name, value, description
pub fn import_categories<S>(
    registry: &CategoryRegistry<S>,
    csv_path: &Path,
) -> Result<ImportSummary>
where
    S: Repository<Record = CategoryRecord>,
{
    import_rows(csv_path, |row: NewCategory| registry.create(row).map(|_| ()))
}

/// CSV columns: name, description, address, phone, email
pub fn import_branches<S>(registry: &BranchRegistry<S>, csv_path: &Path) -> Result<ImportSummary>
where
    S: Repository<Record = BranchRecord>,
{
    import_rows(csv_path, |row: NewBranch| registry.create(row).map(|_| ()))
}

fn import_rows<T, F>(csv_path: &Path, mut create: F) -> Result<ImportSummary>
where
    T: DeserializeOwned,
    F: FnMut(T) -> std::result::Result<(), RegistryError>,
{
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut summary = ImportSummary::default();

    for (index, result) in rdr.deserialize().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row: T = result.with_context(|| format!("Failed to parse CSV line {line}"))?;

        match create(row) {
            Ok(()) => summary.imported += 1,
            Err(e @ (RegistryError::ValidationFailed(_) | RegistryError::Conflict { .. })) => {
                warn!(line, error = %e, "skipping CSV row");
                summary.skipped += 1;
                summary.errors.push(format!("line {line}: {e}"));
            }
            Err(e) => return Err(e).with_context(|| format!("Import aborted at line {line}")),
        }
    }

    info!(
        file = %csv_path.display(),
        imported = summary.imported,
        skipped = summary.skipped,
        "CSV import finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_import_categories_skips_bad_rows() {
        let registry = CategoryRegistry::with_defaults();
        let file = csv_file(
            "name,value,description\n\
             Snacks,snacks,Chips and nuts\n\
             Bad Value,Bad Value,\n\
             Frozen Again,frozen-products,\n\
             Household,household,\n",
        );

        let summary = import_categories(&registry, file.path()).unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 2);
        assert!(summary.errors[0].starts_with("line 3:"));
        assert!(summary.errors[1].starts_with("line 4:"));

        let snacks = registry
            .list_active()
            .unwrap()
            .records
            .into_iter()
            .find(|c| c.value == "snacks")
            .unwrap();
        assert_eq!(snacks.description.as_deref(), Some("Chips and nuts"));
    }

    #[test]
    fn test_import_branches_stores_blank_columns_as_absent() {
        let registry = BranchRegistry::new();
        let file = csv_file(
            "name,description,address,phone,email\n\
             Harbour,,1 Quay St,,harbour@example.com\n\
             harbour,,,,\n",
        );

        let summary = import_branches(&registry, file.path()).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);

        let harbour = &registry.list_all().unwrap().records[0];
        assert_eq!(harbour.address.as_deref(), Some("1 Quay St"));
        assert_eq!(harbour.phone, None);
        assert_eq!(harbour.description, None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let registry = BranchRegistry::new();
        assert!(import_branches(&registry, Path::new("no/such/file.csv")).is_err());
    }
}
