//! # Classbell Gateway
//!
//! HTTP surface through which the change-trigger collaborator invokes the
//! event sources: document snapshots arrive as JSON bodies on paths that
//! mirror the store hierarchy, path parameters carry the document ids.

pub mod routes;
pub mod server;

pub use server::{build_router, serve, AppState};
