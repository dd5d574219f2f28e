//! Route definitions for the Item Weight Measure form host

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/item-weight-measure", item_weight_measure_routes())
}

/// Form routes: snapshot, lifecycle events, row edits and actions
fn item_weight_measure_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_form))
        .route("/onload", post(handlers::on_load))
        .route("/refresh", post(handlers::on_refresh))
        .route("/query", put(handlers::update_query))
        .route("/generate", post(handlers::generate))
        .route("/reset-to-zero", post(handlers::reset_to_zero))
        .route("/tables/:table/:index", put(handlers::edit_row))
}
