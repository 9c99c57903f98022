//! Cached option-list loading for select UIs backed by a remote HTTP API
//!
//! This crate provides:
//! - A process-wide TTL cache of raw option lists keyed by locator
//! - Shape extraction over the handful of response layouts upstream returns
//! - A reactive `{options, loading, error}` view per subscriber, guarded
//!   against stale in-flight responses
//!
//! ```no_run
//! use std::sync::Arc;
//! use options_loader::{HttpOptionsClient, OptionRecord, OptionsLoader};
//!
//! # async fn demo() {
//! let client = Arc::new(HttpOptionsClient::new("https://helpdesk.example.com/api"));
//! let loader = OptionsLoader::new(client);
//!
//! let departments = loader.subscribe(|d| OptionRecord {
//!     value: d["code"].as_str().unwrap_or_default().to_string(),
//!     label: d["name"].as_str().unwrap_or_default().to_string(),
//! });
//! departments.load(Some("/inventory/departments/"));
//!
//! let mut state = departments.state();
//! state.changed().await.ok();
//! for option in &state.borrow().options {
//!     println!("{} ({})", option.label, option.value);
//! }
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod extract;
pub mod loader;

pub use cache::OptionsCache;
pub use client::{HttpOptionsClient, OptionsClient};
pub use extract::{DEFAULT_RULES, ShapeRule, extract_items, extract_with};
pub use loader::{
    LOAD_ERROR, LoaderConfig, OptionRecord, OptionsLoader, OptionsState, OptionsSubscription,
};
