//! # Storage Layer
//!
//! Persistence for prog, backed by a single SQLite file.
//!
//! ## Tables
//!
//! | Table | Contents |
//! |-------|----------|
//! | `items` | Tasks and epics, with status, priority and parent epic |
//! | `deps` | `(item_id, depends_on)` edges |
//! | `logs` | Append-only messages per item |
//! | `projects` | Known project names |
//!
//! ## Concurrency Safety
//!
//! - WAL journal plus a busy timeout: concurrent `prog` processes wait for
//!   the writer lock instead of failing
//! - Multi-statement writes run in an `IMMEDIATE` transaction, so they take
//!   the writer lock (waiting on the busy timeout) before their first read
//!
//! ## Key Types
//!
//! - [`Store`] - Handle to the database; all item, dependency and log operations
//! - [`StatusReport`] - Aggregate view returned by [`Store::project_status`]
//! - [`Config`] - User configuration from `~/.prog/config.toml`

mod config;
mod deps;
mod items;
mod logs;
mod report;
mod store;

pub use config::{Config, ConfigError};
pub use report::StatusReport;
pub use store::{Result, Store, StoreError};
