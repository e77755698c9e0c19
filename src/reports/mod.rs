use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod query;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{Report, ReportStatus};

pub fn router() -> Router<AppState> {
    handlers::report_routes()
}
