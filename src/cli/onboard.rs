//! Onboard command for AI integration
//!
//! Adds a `## Task Tracking` section with prog instructions to the
//! project's CLAUDE.md.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;

/// The heading that marks our section
const SECTION_HEADING: &str = "## Task Tracking";

/// Candidate file names, in order of preference
const CANDIDATES: [&str; 2] = ["CLAUDE.md", "claude.md"];

/// Day-to-day commands, shared with `prog prime`
pub const WORKFLOW: &str = r#"## Workflow

- `prog ready` - Show tasks ready to work on
- `prog add "title"` - Create a task (`--epic` for an epic, `--parent <id>` to nest it)
- `prog start <id>` - Start working on a task
- `prog log <id> "message"` - Record progress or decisions
- `prog block <id> "reason"` - Mark a task blocked
- `prog done <id>` - Mark a task complete
- `prog dep <id> --on <other>` - Make a task wait for another
"#;

fn snippet() -> String {
    format!(
        "{}\n\nThis project uses prog for task tracking. Run `prog prime` at the start of a session to load the current state.\n\n{}",
        SECTION_HEADING,
        WORKFLOW.replacen("## Workflow", "### Commands", 1)
    )
}

/// What the onboard command did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardAction {
    Created,
    Appended,
    AlreadyOnboarded,
    Replaced,
}

#[derive(Debug, Serialize)]
pub struct OnboardResult {
    pub filename: String,
    pub action: OnboardAction,
}

impl OnboardResult {
    fn message(&self) -> String {
        match self.action {
            OnboardAction::Created => format!("Created {} with task tracking instructions", self.filename),
            OnboardAction::Appended => format!("Added prog integration to {}", self.filename),
            OnboardAction::AlreadyOnboarded => format!(
                "Already onboarded: {} has a Task Tracking section (use --force to replace it)",
                self.filename
            ),
            OnboardAction::Replaced => format!("Updated Task Tracking section in {}", self.filename),
        }
    }
}

/// Finds an existing instructions file, matching the on-disk name exactly
fn find_existing(dir: &Path) -> Result<Option<PathBuf>> {
    let names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();

    Ok(CANDIDATES
        .iter()
        .find(|candidate| names.iter().any(|name| name == *candidate))
        .map(|name| dir.join(name)))
}

/// Returns the byte offset of the line that is exactly the Task Tracking heading
fn section_start(content: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim_end() == SECTION_HEADING {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

fn has_section(content: &str) -> bool {
    section_start(content).is_some()
}

/// Replaces the Task Tracking section (up to the next `## ` heading) with `snippet`
pub fn replace_section(content: &str, snippet: &str) -> String {
    let Some(start) = section_start(content) else {
        return content.to_string();
    };

    let mut result = content[..start].to_string();
    result.push_str(snippet);
    if !snippet.ends_with('\n') {
        result.push('\n');
    }

    let body_from = start + SECTION_HEADING.len();
    if let Some(next) = content[body_from..].find("\n## ") {
        result.push('\n');
        result.push_str(&content[body_from + next + 1..]);
    }

    result
}

/// Configures the instructions file in `dir`
pub fn onboard_dir(dir: &Path, force: bool) -> Result<OnboardResult> {
    let snippet = snippet();

    let Some(path) = find_existing(dir)? else {
        let path = dir.join(CANDIDATES[0]);
        fs::write(&path, &snippet)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(OnboardResult {
            filename: CANDIDATES[0].to_string(),
            action: OnboardAction::Created,
        });
    };

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;

    let (new_content, action) = if !has_section(&content) {
        let appended = if content.is_empty() {
            snippet
        } else if content.ends_with('\n') {
            format!("{}\n{}", content, snippet)
        } else {
            format!("{}\n\n{}", content, snippet)
        };
        (appended, OnboardAction::Appended)
    } else if force {
        (replace_section(&content, &snippet), OnboardAction::Replaced)
    } else {
        return Ok(OnboardResult {
            filename,
            action: OnboardAction::AlreadyOnboarded,
        });
    };

    fs::write(&path, new_content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(OnboardResult { filename, action })
}

/// Run the onboard command
pub fn run(output: &Output, dir: &Path, force: bool) -> Result<()> {
    output.verbose_ctx("onboard", &format!("Looking for CLAUDE.md in {}", dir.display()));
    let result = onboard_dir(dir, force)?;

    if output.is_json() {
        output.data(&result);
    } else {
        println!("{}", result.message());
    }
    Ok(())
}
