//! Router assembly

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, health, posts};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full application router.
///
/// Write routes and `/me` carry the bearer-token gate as a route layer;
/// everything else is public.
pub fn router(state: Arc<AppState>) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), require_auth);

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health))
        // Auth endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/me", get(auth::me).route_layer(gate.clone()))
        // Blog endpoints
        .route(
            "/blogs",
            get(posts::list_posts).merge(post(posts::create_post).route_layer(gate.clone())),
        )
        .route(
            "/blogs/:id",
            get(posts::get_post).merge(
                put(posts::update_post)
                    .delete(posts::delete_post)
                    .route_layer(gate),
            ),
        )
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
