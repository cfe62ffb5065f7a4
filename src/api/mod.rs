//! HTTP API for the upload/transcription/completion pipeline

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, start_http_server, AppState};
