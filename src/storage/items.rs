//! Item storage: create, read, status/description/parent updates and the
//! ready-work query.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, ToSql, TransactionBehavior};

use super::store::{item_from_row, timestamp, Result, Store, StoreError, ITEM_COLUMNS};
use crate::domain::{Item, ItemType, Status, ValidationError};

/// Ordering shared by every item listing
const ITEM_ORDER: &str = "ORDER BY priority ASC, created_at ASC, id ASC";

impl Store {
    /// Persists a new item with the timestamps it carries
    pub fn create_item(&mut self, item: &Item) -> Result<()> {
        item.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(parent_id) = &item.parent_id {
            require_epic(&tx, parent_id)?;
        }

        tx.execute(
            "INSERT INTO items (id, project, type, title, description, status, priority, parent_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                item.id,
                item.project,
                item.item_type.as_str(),
                item.title,
                item.description,
                item.status.as_str(),
                item.priority,
                item.parent_id,
                timestamp(&item.created_at),
                timestamp(&item.updated_at),
            ],
        )?;

        if !item.project.is_empty() {
            tx.execute(
                "INSERT OR IGNORE INTO projects (name, created_at) VALUES (?1, ?2)",
                params![item.project, timestamp(&Utc::now())],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Fetches a single item
    pub fn get_item(&self, id: &str) -> Result<Item> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS),
                params![id],
                item_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Lists items in `project` (all projects when empty), optionally by status
    pub fn list_items(&self, project: &str, status: Option<Status>) -> Result<Vec<Item>> {
        let mut sql = format!("SELECT {} FROM items WHERE 1 = 1", ITEM_COLUMNS);
        let mut args: Vec<&dyn ToSql> = Vec::new();

        if !project.is_empty() {
            sql.push_str(" AND project = ?");
            args.push(&project);
        }

        let status_str = status.map(|s| s.as_str());
        if let Some(status_str) = &status_str {
            sql.push_str(" AND status = ?");
            args.push(status_str);
        }

        sql.push(' ');
        sql.push_str(ITEM_ORDER);

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(args.as_slice(), item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Sets the status of an item
    pub fn update_status(&self, id: &str, status: Status) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE items SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), timestamp(&Utc::now())],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Replaces the description of an item
    pub fn set_description(&self, id: &str, text: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE items SET description = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, text, timestamp(&Utc::now())],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Appends `text` to the description on a new line
    pub fn append_description(&self, id: &str, text: &str) -> Result<()> {
        // Read and write happen in one statement, so concurrent appends cannot lose text
        let changed = self.conn.execute(
            "UPDATE items
             SET description = CASE WHEN description = '' THEN ?2 ELSE description || char(10) || ?2 END,
                 updated_at = ?3
             WHERE id = ?1",
            params![id, text, timestamp(&Utc::now())],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Makes `parent_id` (which must be an epic) the parent of `child_id`
    ///
    /// Fails if `child_id` is `parent_id` itself or one of its ancestors.
    pub fn set_parent(&mut self, child_id: &str, parent_id: &str) -> Result<()> {
        if child_id == parent_id {
            return Err(ValidationError::new("parent", "an item cannot be its own parent").into());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        require_epic(&tx, parent_id)?;
        if is_ancestor(&tx, child_id, parent_id)? {
            return Err(ValidationError::new(
                "parent",
                format!("{} is an ancestor of {}, nesting would create a cycle", child_id, parent_id),
            )
            .into());
        }

        let changed = tx.execute(
            "UPDATE items SET parent_id = ?2, updated_at = ?3 WHERE id = ?1",
            params![child_id, parent_id, timestamp(&Utc::now())],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(child_id.to_string()));
        }

        tx.commit()?;
        Ok(())
    }

    /// Lists the direct children of an epic
    pub fn children(&self, parent_id: &str) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items WHERE parent_id = ?1 {}",
            ITEM_COLUMNS, ITEM_ORDER
        ))?;
        let items = stmt
            .query_map(params![parent_id], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Open items whose dependencies are all done (or that have none)
    pub fn ready_items(&self, project: &str) -> Result<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items i
             WHERE i.status = 'open'
             AND (?1 = '' OR i.project = ?1)
             AND NOT EXISTS (
                 SELECT 1 FROM deps d
                 JOIN items dep ON d.depends_on = dep.id
                 WHERE d.item_id = i.id
                 AND dep.status != 'done'
             )
             {}",
            ITEM_COLUMNS, ITEM_ORDER
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![project], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

/// Fails unless `id` exists and is an epic
fn require_epic(conn: &rusqlite::Connection, id: &str) -> Result<()> {
    let item_type: Option<String> = conn
        .query_row("SELECT type FROM items WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;

    let item_type: ItemType = item_type
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?
        .parse()?;

    if !item_type.is_epic() {
        return Err(ValidationError::new(
            "parent",
            format!("{} is a {}, only epics can be parents", id, item_type),
        )
        .into());
    }
    Ok(())
}

/// Returns true if `ancestor_id` appears in the parent chain of `id`
fn is_ancestor(conn: &rusqlite::Connection, ancestor_id: &str, id: &str) -> Result<bool> {
    let found: bool = conn.query_row(
        "WITH RECURSIVE chain(id) AS (
             SELECT parent_id FROM items WHERE id = ?1
             UNION
             SELECT i.parent_id FROM items i JOIN chain c ON i.id = c.id
         )
         SELECT EXISTS (SELECT 1 FROM chain WHERE id = ?2)",
        params![id, ancestor_id],
        |row| row.get(0),
    )?;
    Ok(found)
}
