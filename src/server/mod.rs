// 🌐 HTTP Surface - REST API with Axum
//
// /api/categories and /api/branches, same seven-operation shape each.
// Authentication and the admin check run as extractors before any handler body.

mod branches;
mod categories;
mod extract;
mod response;

pub use extract::{AdminCaller, ApiJson, AuthenticatedCaller};
pub use response::{ApiError, ApiResponse};

use crate::auth::{Authenticator, TokenAuthenticator};
use crate::branch::{BranchRecord, BranchRegistry};
use crate::category::{CategoryRecord, CategoryRegistry};
use crate::config::AppConfig;
use crate::error::{RegistryError, Result};
use crate::store::{MemoryRepository, Repository, SqliteStore};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub type CategoryStore = Box<dyn Repository<Record = CategoryRecord>>;
pub type BranchStore = Box<dyn Repository<Record = BranchRecord>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryRegistry<CategoryStore>>,
    pub branches: Arc<BranchRegistry<BranchStore>>,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        categories: CategoryRegistry<CategoryStore>,
        branches: BranchRegistry<BranchStore>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        AppState {
            categories: Arc::new(categories),
            branches: Arc::new(branches),
            auth,
        }
    }

    /// In-memory registries, optionally seeded
    pub fn in_memory(auth: Arc<dyn Authenticator>, seed: bool) -> Result<Self> {
        let categories: CategoryStore = Box::new(MemoryRepository::<CategoryRecord>::new());
        let branches: BranchStore = Box::new(MemoryRepository::<BranchRecord>::new());
        Self::with_stores(categories, branches, auth, seed)
    }

    /// SQLite when `database.path` is set, memory otherwise
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tokens = TokenAuthenticator::new(&config.tokens);
        if tokens.is_empty() {
            warn!("no API tokens configured; every request will be rejected with 401");
        } else {
            info!(tokens = tokens.len(), "bearer tokens loaded");
        }
        let auth: Arc<dyn Authenticator> = Arc::new(tokens);

        match &config.database.path {
            Some(path) => {
                info!(path = %path.display(), "using SQLite store");
                let store = SqliteStore::open(path)?;
                Self::with_stores(
                    Box::new(store.categories()),
                    Box::new(store.branches()),
                    auth,
                    config.seed_defaults,
                )
            }
            None => {
                info!("no database configured, using in-memory store");
                Self::in_memory(auth, config.seed_defaults)
            }
        }
    }

    fn with_stores(
        categories: CategoryStore,
        branches: BranchStore,
        auth: Arc<dyn Authenticator>,
        seed: bool,
    ) -> Result<Self> {
        let categories = CategoryRegistry::with_store(categories);
        let branches = BranchRegistry::with_store(branches);

        if seed {
            let c = categories.seed_defaults()?;
            let b = branches.seed_defaults()?;
            info!(categories = c, branches = b, "seeded default records");
        }

        Ok(Self::new(categories, branches, auth))
    }
}

/// Registry calls may block on the SQLite connection, so they run on the blocking pool
async fn blocking<T, F>(task: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(outcome) => outcome.map_err(ApiError::from),
        Err(e) => {
            error!(error = %e, "registry task did not complete");
            Err(RegistryError::Internal(e.to_string()).into())
        }
    }
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK", "Service is healthy"))
}

/// Build the full router: `/api/...` routes plus permissive CORS
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Categories
        .route(
            "/categories",
            get(categories::list_active).post(categories::create),
        )
        .route("/categories/all", get(categories::list_all))
        .route(
            "/categories/:id",
            get(categories::get_by_id)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/categories/:id/toggle-status",
            patch(categories::toggle_status),
        )
        // Branches
        .route("/branches", get(branches::list_active).post(branches::create))
        .route("/branches/all", get(branches::list_all))
        .route(
            "/branches/:id",
            get(branches::get_by_id)
                .put(branches::update)
                .delete(branches::delete),
        )
        .route("/branches/:id/toggle-status", patch(branches::toggle_status))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
