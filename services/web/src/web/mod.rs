pub mod auth;
pub mod flash;
pub mod forms;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod state;
pub mod views;

pub use middleware::{require_auth, AuthenticatedUser, RequestContext};
pub use state::AppState;

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the full application router around the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(pages::home_page))
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route(
            "/register",
            get(auth::register_page).post(auth::register_handler),
        )
        .route(
            "/logout",
            get(auth::logout_handler).post(auth::logout_handler),
        )
        .route(
            "/exercise",
            get(pages::exercise_page).post(pages::exercise_handler),
        );

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/routine_proposal",
            axum::routing::post(pages::routine_proposal_handler),
        )
        .route("/track_record", get(pages::track_record_page))
        .route(
            "/add_exercise",
            get(pages::add_exercise_page).post(pages::add_exercise_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
