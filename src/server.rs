use std::net::SocketAddr;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{create_pool, migrations};
use crate::handlers;
use crate::state::AppState;

/// CORS for a single configured origin, with credentials so the session
/// cookie is sent along.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
            return None;
        }
    };

    tracing::info!(origin = ?origin, "CORS enabled");
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                CONTENT_TYPE,
                ACCEPT,
                HeaderName::from_static("x-requested-with"),
            ])
            .allow_credentials(true),
    )
}

/// Assemble the router and middleware stack around an existing state.
///
/// From the outside in: request tracing, compression, optional CORS, cookie
/// handling, then the per-route gates set up in [`handlers::routes`].
pub fn build_router(state: AppState) -> Router {
    let mut app = handlers::routes(state.clone()).layer(CookieManagerLayer::new());

    if let Some(cors) = state.config.cors_origin.as_deref().and_then(cors_layer) {
        app = app.layer(cors);
    }

    app.layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the database pool and runs migrations before assembling the
/// router. Returns the shared state and a ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.database_path)?;

    {
        let mut conn = db.get()?;
        migrations::run_migrations(&mut conn, &config.migrations_path)?;
    }

    let state = AppState::new(db, config);
    let app = build_router(state.clone());

    Ok((state, app))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task. Peer addresses
/// are exposed to handlers for login rate limiting.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        if let Err(e) = axum::serve(listener, service).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((actual_port, handle))
}
