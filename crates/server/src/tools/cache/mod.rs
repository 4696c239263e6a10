//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and trimming the agent's
//! cache stores.

pub mod list;
pub mod trim;

pub use list::{CacheListParams, list_impl};
pub use trim::{CacheTrimParams, trim_impl};
