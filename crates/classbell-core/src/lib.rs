//! # Classbell Core
//!
//! Shared foundation for the Classbell notification fan-out service:
//! domain types, the crate-wide error type, and the TOML configuration
//! system. Everything here is plain data; no I/O.

pub mod config;
pub mod error;
pub mod types;

pub use config::ClassbellConfig;
pub use error::{ClassbellError, Result};
pub use types::{
    ClassDoc, NotificationKind, NotificationRecord, PushContent, TaskDoc, UserProfile,
};
