//! Append-only progress ledger for reports.

use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{ProgressEntry, ProgressEntryView};

pub fn router() -> Router<AppState> {
    handlers::progress_routes()
}
