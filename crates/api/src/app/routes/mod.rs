use axum::Router;

pub mod common;
pub mod customers;
pub mod godowns;
pub mod products;
pub mod projects;
pub mod system;

/// Router for every business endpoint (everything except `/health`).
pub fn router() -> Router {
    Router::new()
        .nest("/godowns", godowns::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/projects", projects::router())
}
