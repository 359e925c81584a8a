pub mod categories;
pub mod expenses;
pub mod metrics;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;

use crate::auth;
use crate::error::AppError;
use crate::state::AppState;
use crate::xsrf::mutation_header_middleware;

/// All API routes, nested under `/api`.
///
/// Login, logout and health are public. Everything else sits behind the
/// session gate. The anti-forgery header check wraps both groups.
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        // Categories
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            put(categories::rename).delete(categories::delete),
        )
        // Expenses
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/:id",
            get(expenses::show)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        // Metrics
        .route("/metrics/month", get(metrics::month))
        .route_layer(middleware::from_fn_with_state(state, auth::require_session));

    let api = public
        .merge(protected)
        .layer(middleware::from_fn(mutation_header_middleware));

    Router::new().nest("/api", api).fallback(fallback)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn fallback() -> AppError {
    AppError::NotFound("Route not found".into())
}
