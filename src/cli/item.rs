//! Item CLI commands

use anyhow::Result;

use super::app::{with_store, Settings};
use super::output::Output;
use crate::domain::{new_id, Item, ItemType, Status};

/// Arguments of `prog add`
pub struct NewItem {
    pub title: String,
    pub epic: bool,
    pub priority: Option<i64>,
    pub parent: Option<String>,
    pub description: Option<String>,
}

pub fn add(settings: &Settings, output: &Output, new: NewItem) -> Result<()> {
    let item_type = if new.epic { ItemType::Epic } else { ItemType::Task };

    let mut item = Item::new(new_id(item_type), item_type, new.title)
        .with_project(settings.project.clone())
        .with_priority(new.priority.unwrap_or(settings.default_priority));
    if let Some(parent) = new.parent {
        item = item.with_parent(parent);
    }
    if let Some(description) = new.description {
        item = item.with_description(description);
    }

    with_store(settings, output, |store| {
        store.create_item(&item)?;
        Ok(())
    })?;
    output.verbose_ctx("add", &format!("Created {} {}", item.item_type, item.id));

    if output.is_json() {
        output.data(&item);
    } else {
        println!("{}", item.id);
    }
    Ok(())
}

pub fn show(settings: &Settings, output: &Output, id: &str) -> Result<()> {
    let (item, logs, deps, unmet, children) = with_store(settings, output, |store| {
        let item = store.get_item(id)?;
        let logs = store.get_logs(id)?;
        let deps = store.get_deps(id)?;
        let unmet = store.unmet_deps(id)?;
        let children = if item.item_type.is_epic() {
            store.children(id)?
        } else {
            vec![]
        };
        Ok((item, logs, deps, unmet, children))
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "item": item,
            "deps": deps,
            "unmet_deps": unmet,
            "children": children,
            "logs": logs,
        }));
        return Ok(());
    }

    println!("ID:          {}", item.id);
    println!("Type:        {}", item.item_type);
    println!("Project:     {}", item.project);
    println!("Title:       {}", item.title);
    println!("Status:      {}", item.status);
    println!("Priority:    {}", item.priority);
    println!("Created:     {}", item.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:     {}", item.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(parent) = &item.parent_id {
        println!("Parent:      {}", parent);
    }

    if !item.description.is_empty() {
        println!("\nDescription:\n{}", item.description);
    }

    if !deps.is_empty() {
        println!("\nDependencies:");
        for dep in &deps {
            let state = if unmet.contains(dep) { "waiting" } else { "done" };
            println!("  - {} ({})", dep, state);
        }
    }

    if !children.is_empty() {
        let complete = children.iter().filter(|c| c.status.is_complete()).count();
        println!("\nChildren ({}/{} done):", complete, children.len());
        for child in &children {
            println!("  [{}] {} ({})", child.id, child.title, child.status);
        }
    }

    if !logs.is_empty() {
        println!("\nLogs:");
        for log in &logs {
            println!("  [{}] {}", log.created_at.format("%Y-%m-%d %H:%M"), log.message);
        }
    }

    Ok(())
}

fn set_status(settings: &Settings, output: &Output, id: &str, status: Status) -> Result<()> {
    with_store(settings, output, |store| {
        store.update_status(id, status)?;
        Ok(())
    })?;
    output.verbose_ctx("status", &format!("{} -> {}", id, status));
    Ok(())
}

pub fn start(settings: &Settings, output: &Output, id: &str) -> Result<()> {
    set_status(settings, output, id, Status::InProgress)?;
    output.success(&format!("Started {}", id));
    Ok(())
}

pub fn done(settings: &Settings, output: &Output, id: &str) -> Result<()> {
    set_status(settings, output, id, Status::Done)?;
    output.success(&format!("Completed {}", id));
    Ok(())
}

pub fn block(settings: &Settings, output: &Output, id: &str, reason: &str) -> Result<()> {
    with_store(settings, output, |store| {
        store.update_status(id, Status::Blocked)?;
        store.add_log(id, &format!("Blocked: {}", reason))?;
        Ok(())
    })?;
    output.success(&format!("Blocked {}: {}", id, reason));
    Ok(())
}

pub fn log(settings: &Settings, output: &Output, id: &str, message: &str) -> Result<()> {
    with_store(settings, output, |store| {
        store.add_log(id, message)?;
        Ok(())
    })?;
    output.success(&format!("Logged to {}", id));
    Ok(())
}

pub fn append(settings: &Settings, output: &Output, id: &str, text: &str) -> Result<()> {
    with_store(settings, output, |store| {
        store.append_description(id, text)?;
        Ok(())
    })?;
    output.success(&format!("Appended to {}", id));
    Ok(())
}

pub fn describe(settings: &Settings, output: &Output, id: &str, text: &str) -> Result<()> {
    with_store(settings, output, |store| {
        store.set_description(id, text)?;
        Ok(())
    })?;
    output.success(&format!("Updated description of {}", id));
    Ok(())
}

pub fn parent(settings: &Settings, output: &Output, id: &str, parent: &str) -> Result<()> {
    with_store(settings, output, |store| {
        store.set_parent(id, parent)?;
        Ok(())
    })?;
    output.success(&format!("{} is now under {}", id, parent));
    Ok(())
}

pub fn dep(settings: &Settings, output: &Output, id: &str, on: &str) -> Result<()> {
    with_store(settings, output, |store| {
        store.add_dep(id, on)?;
        Ok(())
    })?;
    output.success(&format!("{} now depends on {}", id, on));
    Ok(())
}
