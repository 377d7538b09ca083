//! Cycle and PCOS symptom logging backend.
//!
//! Calendar events (periods, ovulation, spotting, notes), the monthly
//! average cycle length derived from period starts, symptom and treatment
//! logs, a directory of places with reviews, and the PCOS reference
//! catalog, all served as JSON over axum. Storage is PostgreSQL through sqlx, or
//! an in-memory store when no database is configured.

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod catalog;
pub mod config;
pub mod cycle;
pub mod dates;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use state::AppState;

/// The full HTTP surface with logging and CORS layers applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::events::routes(state.clone()))
        .merge(routes::cycle_length::routes(state.clone()))
        .merge(routes::places::routes(state.clone()))
        .merge(routes::symptoms::routes(state.clone()))
        .merge(routes::treatments::routes(state))
        .merge(routes::catalog::routes())
        .route("/health", get(|| async { "✅ Backend up" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
