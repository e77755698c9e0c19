//! CSV export of filtered reports.

use crate::state::AppState;
use axum::Router;

pub mod writer;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::export_routes()
}
