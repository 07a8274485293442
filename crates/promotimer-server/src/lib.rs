//! Promotimer delivery endpoint.
//!
//! Composes the candidate supplier, temporal validity guard and priority
//! resolver from promotimer-core behind a small axum API, records an
//! impression for the selected timer and returns the normalized storefront
//! payload. Open CORS: the endpoint is called from arbitrary storefront
//! origins.

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Create the axum application with middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::create_router().with_state(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
