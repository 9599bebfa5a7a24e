//! prog - Lightweight task tracking for agents
//!
//! prog keeps tasks and epics in a local SQLite database, tracks
//! dependencies between them, and answers "what can I work on next?".
//! Items are scoped by project so one database can serve many repositories.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Item, ItemType, Log, Status, ValidationError};
pub use storage::{StatusReport, Store, StoreError};
