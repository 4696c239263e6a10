//! Core types and shared functionality for offline-agent.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend, plus the eviction policy
//! - Request and response descriptors
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheStorage, CacheStore};
pub use error::Error;
pub use http::{Destination, Headers, Request, RequestMode, Response};
