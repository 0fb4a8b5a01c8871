// src/api/router.rs

use axum::routing::{get, patch, post};
use axum::Router;

use super::handlers;
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/import/search", get(handlers::search))
        .route("/api/items/import", post(handlers::import_item))
        .route(
            "/api/items/import-with-status",
            post(handlers::import_item_with_status),
        )
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/items/:id",
            get(handlers::get_item).delete(handlers::delete_item),
        )
        .route("/api/items/:id/entries", get(handlers::list_entries))
        .route("/api/items/:id/segments", get(handlers::list_segments))
        .route("/api/items/:id/notes", get(handlers::list_notes))
        .route("/api/entries", post(handlers::create_entry))
        .route(
            "/api/entries/:id",
            patch(handlers::update_entry).delete(handlers::delete_entry),
        )
        .route("/api/notes", post(handlers::create_note))
        .route("/api/segments", post(handlers::create_segment))
        .route("/api/types", get(handlers::list_types))
        .route("/api/types/seed", post(handlers::seed_types))
        .with_state(state)
}
