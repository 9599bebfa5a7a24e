//! Domain models for prog
//!
//! Contains the core types and rules without any I/O concerns.

mod graph;
mod id;
mod item;

pub use graph::DependencyGraph;
pub use id::{generate_id, new_id};
pub use item::{Item, ItemType, Log, Status, ValidationError};
