//! Application layer for the kanban board.
//!
//! This crate provides the observable task store, the view-binding service,
//! configuration, and user-facing token parsing shared by front ends.

pub mod config;
pub mod filter_util;
pub mod gateway;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use config::{API_URL_ENV, ApiConfig, BoardConfig, ProjectConfig, default_config_path};
pub use filter_util::{
    FilterBuildError, FilterBuildResult, TaskFilterBuilder, parse_due_date, parse_priority_tokens, parse_sort,
    parse_status_tokens,
};
pub use gateway::TaskGateway;
pub use service::{MutationCallbacks, TaskService};
pub use store::{BoardColumn, StoreSnapshot, SubscriptionId, TaskStore};
