use crate::state::AppState;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::path::Path;
use tower_http::services::ServeDir;

mod sighting;

pub fn router(upload_dir: &Path) -> Router<AppState> {
    Router::new()
        .merge(sighting::router())
        .route("/health", get(health))
        .nest_service("/uploads", ServeDir::new(upload_dir))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "healthy" })
}
