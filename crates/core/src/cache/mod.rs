//! SQLite-backed named cache stores.
//!
//! This module provides persistent request/response stores addressed by
//! name, with async access via tokio-rusqlite. It supports:
//!
//! - Opening (and lazily creating) stores by name
//! - Insertion-ordered key enumeration, used by the eviction policy
//! - Lookups within one store or across every store in creation order
//! - Deleting single entries or whole stores

pub mod connection;
pub mod eviction;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheStorage;
pub use eviction::limit_cache_size;
pub use store::CacheStore;
