//! Append-only item logs

use chrono::Utc;
use rusqlite::params;

use super::store::{parse_timestamp, timestamp, Result, Store, StoreError};
use crate::domain::Log;

impl Store {
    /// Appends a log entry to an item
    pub fn add_log(&self, item_id: &str, message: &str) -> Result<()> {
        let changed = self.conn.execute(
            "INSERT INTO logs (item_id, message, created_at)
             SELECT id, ?2, ?3 FROM items WHERE id = ?1",
            params![item_id, message, timestamp(&Utc::now())],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(item_id.to_string()));
        }
        Ok(())
    }

    /// All logs for an item, oldest first
    pub fn get_logs(&self, item_id: &str) -> Result<Vec<Log>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, message, created_at
             FROM logs WHERE item_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;

        let logs = stmt
            .query_map(params![item_id], |row| {
                let created_at: String = row.get(3)?;
                Ok(Log {
                    id: row.get(0)?,
                    item_id: row.get(1)?,
                    message: row.get(2)?,
                    created_at: parse_timestamp(3, &created_at)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{new_id, Item, ItemType};
    use crate::storage::store::tests::setup_store;

    #[test]
    fn logs_come_back_in_order() {
        let (_dir, mut store) = setup_store();
        let item = Item::new(new_id(ItemType::Task), ItemType::Task, "Task");
        store.create_item(&item).unwrap();

        store.add_log(&item.id, "first").unwrap();
        store.add_log(&item.id, "second").unwrap();
        store.add_log(&item.id, "third").unwrap();

        let logs = store.get_logs(&item.id).unwrap();
        let messages: Vec<_> = logs.iter().map(|l| l.message.as_str()).collect();

        assert_eq!(messages, vec!["first", "second", "third"]);
        assert!(logs.iter().all(|l| l.item_id == item.id));
        assert!(logs.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn logs_belong_to_one_item() {
        let (_dir, mut store) = setup_store();
        let a = Item::new(new_id(ItemType::Task), ItemType::Task, "A");
        let b = Item::new(new_id(ItemType::Task), ItemType::Task, "B");
        store.create_item(&a).unwrap();
        store.create_item(&b).unwrap();

        store.add_log(&a.id, "for a").unwrap();

        assert_eq!(store.get_logs(&a.id).unwrap().len(), 1);
        assert!(store.get_logs(&b.id).unwrap().is_empty());
    }

    #[test]
    fn no_logs_is_empty_not_error() {
        let (_dir, store) = setup_store();
        assert!(store.get_logs("ts-000000").unwrap().is_empty());
    }

    #[test]
    fn add_log_requires_existing_item() {
        let (_dir, store) = setup_store();
        let err = store.add_log("nonexistent", "message").unwrap_err();

        assert!(err.is_not_found());
        assert!(store.get_logs("nonexistent").unwrap().is_empty());
    }
}
