//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Database setup | `init`, `projects` |
//! | Item | Work item lifecycle | `add`, `start`, `done`, `block`, `log` |
//! | Query | Work state queries | `list`, `ready`, `status` |
//! | Agent | AI integration | `prime`, `onboard` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! prog --verbose ready
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod item;
mod onboard;
mod output;
mod query;

pub use app::{run, Cli, Commands, Settings};
pub use onboard::{onboard_dir, replace_section, OnboardAction, OnboardResult};
pub use output::{Output, OutputFormat};
