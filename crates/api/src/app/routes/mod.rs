use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod sweets;
pub mod system;

/// Routes that never look at the `Authorization` header.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

/// Routes that run behind the caller-resolving middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/sweets", sweets::router())
        // Clients that append a trailing slash to the collection path.
        .route("/sweets/", get(sweets::list_sweets).post(sweets::create_sweet))
}
