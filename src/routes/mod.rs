//! HTTP route handlers.
//!
//! Each sub-module handles one domain:
//!
//! - `items`: the five HTML pages (listing, create form, detail, edit form,
//!   delete)
//! - `health`: liveness and readiness probes

pub mod health;
pub mod items;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Assemble the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(items::list_items))
        .route("/items/new", get(items::new_item_form).post(items::create_item))
        .route("/items/{id}", get(items::show_item))
        .route("/items/{id}/edit", get(items::edit_item_form).post(items::update_item))
        .route("/items/{id}/delete", post(items::delete_item))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .with_state(state)
        // Globales Body-Limit (64 KB) – Formulare sind klein
        .layer(DefaultBodyLimit::max(64 * 1024))
}
