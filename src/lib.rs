// Operational Settings - Core Library
// Category and branch registries, exposed for the CLI, the API server, and tests

pub mod error;
pub mod validation;
pub mod patch;
pub mod record;
pub mod store;          // Repository trait + memory/SQLite backends
pub mod category;       // Category Registry
pub mod branch;         // Branch Registry
pub mod auth;           // Authorization Gate
pub mod config;
pub mod import;         // CSV bulk import

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use error::{RegistryError, Result};
pub use validation::FieldError;
pub use patch::Patch;
pub use record::{Listing, Record};
pub use store::{
    MemoryRepository, Repository, SqliteBranchRepository, SqliteCategoryRepository, SqliteStore,
    setup_database,
};
pub use category::{CategoryRecord, CategoryRegistry, NewCategory, UpdateCategory};
pub use branch::{BranchRecord, BranchRegistry, NewBranch, UpdateBranch};
pub use auth::{Authenticator, Caller, Role, TokenAuthenticator, TokenGrant, require_admin};
pub use config::{AppConfig, init_tracing};
pub use import::{ImportSummary, import_branches, import_categories};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
