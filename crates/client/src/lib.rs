//! Client code for offline-agent.
//!
//! This crate provides the network seam and the caching agent itself:
//! lifecycle, request routing and the per-route strategies.

pub mod agent;
pub mod fetch;

#[cfg(test)]
mod testing;

pub use agent::{ActivateReport, Agent, AgentSettings, AgentState, FetchOutcome, InstallReport, Route};
pub use fetch::{FetchConfig, HttpNetwork, Network};
