//! Dependency edges between items

use rusqlite::{params, Connection, TransactionBehavior};

use super::store::{Result, Store, StoreError};
use crate::domain::DependencyGraph;

impl Store {
    /// Records that `item_id` cannot be ready until `depends_on` is done
    ///
    /// Adding an edge that already exists is a no-op. Edges that would make
    /// an item wait on itself are rejected.
    pub fn add_dep(&mut self, item_id: &str, depends_on: &str) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for id in [item_id, depends_on] {
            if !item_exists(&tx, id)? {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }

        let mut graph = DependencyGraph::from_edges(all_edges(&tx)?);
        graph.add_dependency(item_id, depends_on)?;

        tx.execute(
            "INSERT OR IGNORE INTO deps (item_id, depends_on) VALUES (?1, ?2)",
            params![item_id, depends_on],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// IDs that `item_id` depends on
    pub fn get_deps(&self, item_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT depends_on FROM deps WHERE item_id = ?1 ORDER BY depends_on")?;
        let ids = stmt
            .query_map(params![item_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Dependencies of `item_id` that are not done yet
    pub fn unmet_deps(&self, item_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT dep.id FROM deps d
             JOIN items dep ON d.depends_on = dep.id
             WHERE d.item_id = ?1
             AND dep.status != 'done'
             ORDER BY dep.id",
        )?;
        let ids = stmt
            .query_map(params![item_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

fn item_exists(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM items WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn all_edges(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT item_id, depends_on FROM deps")?;
    let edges = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{new_id, Item, ItemType, Status};
    use crate::storage::store::tests::setup_store;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn add_task(store: &mut Store, title: &str) -> Item {
        let item = Item::new(new_id(ItemType::Task), ItemType::Task, title);
        store.create_item(&item).unwrap();
        item
    }

    fn ready_ids(store: &Store) -> Vec<String> {
        store.ready_items("").unwrap().into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn add_and_get_deps() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");
        let b = add_task(&mut store, "B");
        let c = add_task(&mut store, "C");

        store.add_dep(&a.id, &b.id).unwrap();
        store.add_dep(&a.id, &c.id).unwrap();

        let mut expected = vec![b.id.clone(), c.id.clone()];
        expected.sort();
        assert_eq!(store.get_deps(&a.id).unwrap(), expected);
        assert!(store.get_deps(&b.id).unwrap().is_empty());
    }

    #[test]
    fn add_dep_is_idempotent() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");
        let b = add_task(&mut store, "B");

        store.add_dep(&a.id, &b.id).unwrap();
        store.add_dep(&a.id, &b.id).unwrap();

        assert_eq!(store.get_deps(&a.id).unwrap(), vec![b.id]);
    }

    #[test]
    fn add_dep_requires_both_endpoints() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");

        assert!(store.add_dep(&a.id, "nonexistent").unwrap_err().is_not_found());
        assert!(store.add_dep("nonexistent", &a.id).unwrap_err().is_not_found());
        assert!(store.get_deps(&a.id).unwrap().is_empty());
    }

    #[test]
    fn add_dep_waits_for_another_writer() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");
        let b = add_task(&mut store, "B");

        let other = Store::open(store.path()).unwrap();
        let (locked_tx, locked_rx) = mpsc::channel();
        let writer = thread::spawn(move || {
            other
                .conn
                .execute_batch(
                    "BEGIN IMMEDIATE;
                     INSERT INTO projects (name, created_at) VALUES ('other', '2024-01-01T00:00:00.000000Z');",
                )
                .unwrap();
            locked_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(300));
            other.conn.execute_batch("COMMIT").unwrap();
        });

        locked_rx.recv().unwrap();
        store.add_dep(&a.id, &b.id).unwrap();
        writer.join().unwrap();

        assert_eq!(store.get_deps(&a.id).unwrap(), vec![b.id]);
        assert_eq!(store.list_projects().unwrap(), vec!["other".to_string()]);
    }

    #[test]
    fn add_dep_rejects_self_dependency() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");

        assert!(store.add_dep(&a.id, &a.id).unwrap_err().is_validation());
    }

    #[test]
    fn add_dep_rejects_cycle() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");
        let b = add_task(&mut store, "B");
        let c = add_task(&mut store, "C");
        store.add_dep(&a.id, &b.id).unwrap();
        store.add_dep(&b.id, &c.id).unwrap();

        let err = store.add_dep(&c.id, &a.id).unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("cycle"));
        assert!(store.get_deps(&c.id).unwrap().is_empty());
    }

    #[test]
    fn item_without_deps_is_ready() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");

        assert_eq!(ready_ids(&store), vec![a.id]);
    }

    #[test]
    fn readiness_follows_dependency_status() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");
        let b = add_task(&mut store, "B");
        store.add_dep(&a.id, &b.id).unwrap();

        let ready = ready_ids(&store);
        assert!(!ready.contains(&a.id));
        assert!(ready.contains(&b.id));
        assert_eq!(store.unmet_deps(&a.id).unwrap(), vec![b.id.clone()]);

        store.update_status(&b.id, Status::InProgress).unwrap();
        assert!(!ready_ids(&store).contains(&a.id));

        store.update_status(&b.id, Status::Done).unwrap();
        let ready = ready_ids(&store);
        assert!(ready.contains(&a.id));
        assert!(!ready.contains(&b.id));
        assert!(store.unmet_deps(&a.id).unwrap().is_empty());
    }

    #[test]
    fn item_waits_for_every_dependency() {
        let (_dir, mut store) = setup_store();
        let a = add_task(&mut store, "A");
        let b = add_task(&mut store, "B");
        let c = add_task(&mut store, "C");
        store.add_dep(&a.id, &b.id).unwrap();
        store.add_dep(&a.id, &c.id).unwrap();

        store.update_status(&b.id, Status::Done).unwrap();
        assert!(!ready_ids(&store).contains(&a.id));

        store.update_status(&c.id, Status::Done).unwrap();
        assert!(ready_ids(&store).contains(&a.id));
    }
}
