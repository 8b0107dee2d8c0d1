//! SQLite-backed response cache keyed by generation.
//!
//! This module provides a persistent cache for response snapshots using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Exact (method, URL) lookup within a named cache generation
//! - Generation-wide eviction (entries never expire individually)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
