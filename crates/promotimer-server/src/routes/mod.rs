pub mod health;
pub mod storefront;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/storefront/timer", get(storefront::storefront_timer))
}
