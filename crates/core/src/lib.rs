//! Core types and shared functionality for guichet.
//!
//! This crate provides:
//! - Generation-keyed response cache with SQLite backend
//! - Offline fallback message table and payload types
//! - Asset manifest for install-time pre-population
//! - Intercepted request model
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod offline;
pub mod request;

pub use cache::{CacheDb, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use manifest::AssetManifest;
pub use offline::OfflinePayload;
pub use request::{Destination, InterceptedRequest};
