//! Helpdesk backend for school issue reports: reporters file reports against a school
//! (NPSN) and category, admins move them through `baru` → `proses` → `selesai` while
//! every change is recorded in a progress ledger.

pub mod app;
pub mod auth;
pub mod categories;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod nullable;
pub mod pagination;
pub mod progress;
pub mod reports;
pub mod state;
pub mod users;
pub mod validate;
