//! Project status reporting
//!
//! Pure composition over the item and dependency queries.

use rusqlite::params;
use serde::Serialize;

use super::store::{item_from_row, Result, Store, ITEM_COLUMNS};
use crate::domain::{Item, Status};

/// Snapshot of a project's work
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Project the report covers; empty means all projects
    pub project: String,

    pub open: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub done: usize,
    pub ready: usize,

    /// Most recently completed first
    pub recent_done: Vec<Item>,
    pub in_progress_items: Vec<Item>,
    pub blocked_items: Vec<Item>,
    pub ready_items: Vec<Item>,
}

impl StatusReport {
    pub fn total(&self) -> usize {
        self.open + self.in_progress + self.blocked + self.done
    }
}

impl Store {
    /// Number of completed items shown in a status report by default
    pub const RECENT_DONE_LIMIT: usize = 5;

    /// Builds a status report for `project` (all projects when empty)
    pub fn project_status(&self, project: &str) -> Result<StatusReport> {
        self.project_status_limited(project, Self::RECENT_DONE_LIMIT)
    }

    /// Like [`Store::project_status`] with a custom recently-done limit
    pub fn project_status_limited(&self, project: &str, recent_done_limit: usize) -> Result<StatusReport> {
        let mut report = StatusReport {
            project: project.to_string(),
            ..Default::default()
        };

        for status in Status::ALL {
            let count = self.count_items(project, status)?;
            match status {
                Status::Open => report.open = count,
                Status::InProgress => report.in_progress = count,
                Status::Blocked => report.blocked = count,
                Status::Done => report.done = count,
            }
        }

        report.recent_done = self.recently_done(project, recent_done_limit)?;
        report.in_progress_items = self.list_items(project, Some(Status::InProgress))?;
        report.blocked_items = self.list_items(project, Some(Status::Blocked))?;
        report.ready_items = self.ready_items(project)?;
        report.ready = report.ready_items.len();

        Ok(report)
    }

    fn count_items(&self, project: &str, status: Status) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE (?1 = '' OR project = ?1) AND status = ?2",
            params![project, status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn recently_done(&self, project: &str, limit: usize) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items
             WHERE (?1 = '' OR project = ?1) AND status = 'done'
             ORDER BY updated_at DESC, id ASC
             LIMIT ?2",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![project, limit as i64], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{new_id, ItemType};
    use crate::storage::store::tests::setup_store;

    fn add(store: &mut Store, project: &str, title: &str) -> Item {
        let item = Item::new(new_id(ItemType::Task), ItemType::Task, title).with_project(project);
        store.create_item(&item).unwrap();
        item
    }

    #[test]
    fn empty_store_reports_zeroes() {
        let (_dir, store) = setup_store();
        let report = store.project_status("").unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(report.ready, 0);
        assert!(report.recent_done.is_empty());
        assert!(report.ready_items.is_empty());
    }

    #[test]
    fn counts_and_lists_by_status() {
        let (_dir, mut store) = setup_store();
        let open = add(&mut store, "p", "open");
        let waiting = add(&mut store, "p", "waiting");
        let started = add(&mut store, "p", "started");
        let stuck = add(&mut store, "p", "stuck");
        let finished = add(&mut store, "p", "finished");
        add(&mut store, "other", "elsewhere");

        store.add_dep(&waiting.id, &started.id).unwrap();
        store.update_status(&started.id, Status::InProgress).unwrap();
        store.update_status(&stuck.id, Status::Blocked).unwrap();
        store.update_status(&finished.id, Status::Done).unwrap();

        let report = store.project_status("p").unwrap();

        assert_eq!(report.project, "p");
        assert_eq!(report.open, 2);
        assert_eq!(report.in_progress, 1);
        assert_eq!(report.blocked, 1);
        assert_eq!(report.done, 1);
        assert_eq!(report.ready, 1);
        assert_eq!(report.ready_items[0].id, open.id);
        assert_eq!(report.in_progress_items[0].id, started.id);
        assert_eq!(report.blocked_items[0].id, stuck.id);
        assert_eq!(report.recent_done[0].id, finished.id);

        assert_eq!(store.project_status("").unwrap().total(), 6);
    }

    #[test]
    fn recent_done_is_limited_and_newest_first() {
        let (_dir, mut store) = setup_store();
        let items: Vec<Item> = (0..4).map(|i| add(&mut store, "", &format!("t{}", i))).collect();
        for item in &items {
            store.update_status(&item.id, Status::Done).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let report = store.project_status_limited("", 2).unwrap();

        assert_eq!(report.done, 4);
        assert_eq!(report.recent_done.len(), 2);
        assert_eq!(report.recent_done[0].id, items[3].id);
        assert_eq!(report.recent_done[1].id, items[2].id);
    }
}
