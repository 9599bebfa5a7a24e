//! Item domain model
//!
//! Items are the units of work tracked by prog. An item is either a task or
//! an epic; epics may act as parents for other items.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value that violates one of the item invariants
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// The field that failed validation (`type`, `status`, `title`, `parent`, ...)
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Kind of item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Task,
    Epic,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Task => "task",
            ItemType::Epic => "epic",
        }
    }

    /// Prefix used for identifiers of this type
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ItemType::Task => "ts",
            ItemType::Epic => "ep",
        }
    }

    pub fn is_epic(&self) -> bool {
        matches!(self, ItemType::Epic)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(ItemType::Task),
            "epic" => Ok(ItemType::Epic),
            other => Err(ValidationError::new(
                "type",
                format!("{:?} (valid: task, epic)", other),
            )),
        }
    }
}

/// Status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Blocked,
    Done,
}

impl Status {
    /// All statuses, in report order
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Blocked,
        Status::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Blocked => "blocked",
            Status::Done => "done",
        }
    }

    /// Returns true if this status satisfies dependents
    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Done)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "in_progress" => Ok(Status::InProgress),
            "blocked" => Ok(Status::Blocked),
            "done" => Ok(Status::Done),
            other => Err(ValidationError::new(
                "status",
                format!("{:?} (valid: open, in_progress, blocked, done)", other),
            )),
        }
    }
}

/// A task or epic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Type-prefixed identifier (`ts-a1b2c3`, `ep-a1b2c3`)
    pub id: String,

    /// Project namespace; empty means unscoped
    pub project: String,

    #[serde(rename = "type")]
    pub item_type: ItemType,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub status: Status,

    /// Lower is more urgent (1=high, 2=medium, 3=low)
    pub priority: i64,

    /// Parent epic, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Default priority for new items
    pub const DEFAULT_PRIORITY: i64 = 2;

    /// Creates an open, unscoped item stamped with the current time
    pub fn new(id: impl Into<String>, item_type: ItemType, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            project: String::new(),
            item_type,
            title: title.into(),
            description: String::new(),
            status: Status::Open,
            priority: Self::DEFAULT_PRIORITY,
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Checks the invariants that do not need the store
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "title must not be empty"));
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::new("parent", "an item cannot be its own parent"));
        }
        Ok(())
    }
}

/// An append-only log entry attached to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub id: i64,
    pub item_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
