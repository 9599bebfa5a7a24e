//! Query commands (list, ready, status, projects, prime)

use anyhow::Result;

use super::app::{with_store, Settings};
use super::onboard::WORKFLOW;
use super::output::Output;
use crate::domain::{Item, Status};
use crate::storage::StatusReport;

/// List items in the current project
pub fn list(settings: &Settings, output: &Output, status: Option<&str>) -> Result<()> {
    let status: Option<Status> = status.map(str::parse::<Status>).transpose()?;

    let items = with_store(settings, output, |store| {
        Ok(store.list_items(&settings.project, status)?)
    })?;
    output.verbose_ctx("list", &format!("Found {} items", items.len()));

    output.items(&items, "No items");
    Ok(())
}

/// Show items ready to work on
pub fn ready(settings: &Settings, output: &Output) -> Result<()> {
    let items = with_store(settings, output, |store| {
        Ok(store.ready_items(&settings.project)?)
    })?;
    output.verbose_ctx("ready", &format!("Found {} ready items", items.len()));

    output.items(&items, "No ready tasks");
    Ok(())
}

/// List known projects
pub fn projects(settings: &Settings, output: &Output) -> Result<()> {
    let names = with_store(settings, output, |store| Ok(store.list_projects()?))?;

    if output.is_json() {
        output.data(&names);
    } else if names.is_empty() {
        println!("No projects");
    } else {
        for name in &names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn load_report(settings: &Settings, output: &Output) -> Result<StatusReport> {
    let report = with_store(settings, output, |store| {
        Ok(store.project_status_limited(&settings.project, settings.recent_done_limit)?)
    })?;
    output.verbose_ctx(
        "status",
        &format!("{} items, {} ready", report.total(), report.ready),
    );
    Ok(report)
}

/// Show project status overview
pub fn status(settings: &Settings, output: &Output) -> Result<()> {
    let report = load_report(settings, output)?;

    if output.is_json() {
        output.data(&report);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Print the status report and workflow reminders for an agent session
pub fn prime(settings: &Settings, output: &Output) -> Result<()> {
    let report = load_report(settings, output)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "report": report,
            "workflow": WORKFLOW,
        }));
        return Ok(());
    }

    println!("# Task Context");
    output.blank();
    print_report(&report);
    output.blank();
    println!("{}", WORKFLOW.trim_end());
    Ok(())
}

fn print_section(title: &str, items: &[Item], show_priority: bool) {
    if items.is_empty() {
        return;
    }
    println!("{}:", title);
    for item in items {
        if show_priority {
            println!("  [{}] {} (pri {})", item.id, item.title, item.priority);
        } else {
            println!("  [{}] {}", item.id, item.title);
        }
    }
    println!();
}

fn print_report(report: &StatusReport) {
    let project = if report.project.is_empty() {
        "(all)"
    } else {
        report.project.as_str()
    };
    println!("Project: {}", project);
    println!();

    println!(
        "Summary: {} open, {} in progress, {} blocked, {} done ({} ready)",
        report.open, report.in_progress, report.blocked, report.done, report.ready
    );
    println!();

    print_section("Recently completed", &report.recent_done, false);
    print_section("In progress", &report.in_progress_items, false);
    print_section("Blocked", &report.blocked_items, false);
    print_section("Ready for work", &report.ready_items, true);
}
