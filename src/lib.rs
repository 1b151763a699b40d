//! Gradecast backend
//!
//! Predicts student pass/fail outcomes from a fixed 13-feature tabular
//! schema and serves login, data upload, prediction and retraining over
//! HTTP. Teachers get full access; students can read their own record.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         GRADECAST                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────────┐  │
//! │  │  API     │  │ Identity │  │  Schema   │  │ Inference  │  │
//! │  │  (Axum)  │  │ (JWT)    │  │ Normalizer│  │ Adapter    │  │
//! │  └────┬─────┘  └────┬─────┘  └─────┬─────┘  └─────┬──────┘  │
//! │       └─────────────┴──────────────┴──────────────┘          │
//! │                    ▼                         ▼               │
//! │            ┌──────────────┐          ┌──────────────┐        │
//! │            │ students.csv │          │  model.json  │        │
//! │            │ (TableStore) │          │ (Classifier  │        │
//! │            │              │          │    Store)    │        │
//! │            └──────────────┘          └──────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Structured logging via [`tracing`]; set `RUST_LOG` to control
//! verbosity (e.g. `RUST_LOG=gradecast=debug`).

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod model;
pub mod schema;
pub mod scoring;
pub mod table;
pub mod trainer;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};

use model::ClassifierStore;
use table::store::TableStore;
use trainer::Trainer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub tables: Arc<TableStore>,
    pub classifiers: Arc<ClassifierStore>,
    pub trainer: Arc<Trainer>,
}

impl AppState {
    pub fn from_config(config: config::Config) -> Self {
        let tables = Arc::new(TableStore::new(config.data_dir.clone()));
        let classifiers = Arc::new(ClassifierStore::open(config.model_path.clone()));
        let trainer = Arc::new(Trainer::new(
            &config.train_command,
            Duration::from_secs(config.train_timeout_secs),
        ));
        Self { config, tables, classifiers, trainer }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/login", post(handlers::auth::login));

    // Uploads carry spreadsheets, so they get a larger body limit.
    let upload_routes = Router::new()
        .route("/api/upload", post(handlers::upload::upload))
        .layer(DefaultBodyLimit::max(handlers::upload::MAX_UPLOAD_BYTES));

    // Protected routes (valid claim required; role checks live in handlers)
    let protected_routes = Router::new()
        .route("/api/students", get(handlers::students::list))
        .route("/api/train", post(handlers::train::train))
        .route("/api/predict", post(handlers::predict::predict))
        .merge(upload_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let router = Router::new().merge(public_routes).merge(protected_routes);

    // Everything else falls through to the frontend build when present.
    let router = if state.config.frontend_dir.is_dir() {
        let index = state.config.frontend_dir.join("index.html");
        router.fallback_service(
            ServeDir::new(&state.config.frontend_dir).fallback(ServeFile::new(index)),
        )
    } else {
        router.fallback(frontend_stub)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn frontend_stub() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Backend running. Frontend not built." }))
}
