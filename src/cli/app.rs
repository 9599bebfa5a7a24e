//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{item, onboard, query};
use crate::storage::{Config, Store};

#[derive(Parser)]
#[command(name = "prog")]
#[command(author, version, about = "Lightweight task tracking for agents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the database (defaults to ~/.prog/prog.db)
    #[arg(long, global = true, env = "PROG_DB")]
    pub db: Option<PathBuf>,

    /// Project scope (omit for all projects)
    #[arg(long, short = 'p', global = true, env = "PROG_PROJECT")]
    pub project: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Create a new task or epic
    Add {
        /// Title words
        #[arg(required = true)]
        title: Vec<String>,

        /// Create an epic instead of a task
        #[arg(long, short = 'e')]
        epic: bool,

        /// Priority (1=high, 2=medium, 3=low)
        #[arg(long)]
        priority: Option<i64>,

        /// Parent epic ID
        #[arg(long)]
        parent: Option<String>,

        /// Initial description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// List items
    List {
        /// Filter by status (open, in_progress, blocked, done)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show open items with no unfinished dependencies
    Ready,

    /// Show item details, dependencies and logs
    Show {
        /// Item ID
        id: String,
    },

    /// Mark an item in progress
    Start {
        /// Item ID
        id: String,
    },

    /// Mark an item done
    Done {
        /// Item ID
        id: String,
    },

    /// Mark an item blocked and log the reason
    Block {
        /// Item ID
        id: String,

        /// Why the item is blocked
        #[arg(required = true)]
        reason: Vec<String>,
    },

    /// Add a log entry to an item
    Log {
        /// Item ID
        id: String,

        /// Log message
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Append text to an item's description
    Append {
        /// Item ID
        id: String,

        /// Text to append
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Replace an item's description
    Desc {
        /// Item ID
        id: String,

        /// New description
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Move an item under an epic
    Parent {
        /// Item ID
        id: String,

        /// Epic ID
        parent: String,
    },

    /// Add a dependency
    Dep {
        /// Item that will wait
        id: String,

        /// Item that must be done first
        #[arg(long)]
        on: String,
    },

    /// List known projects
    Projects,

    /// Show project status overview
    Status,

    /// Print session context for an agent
    Prime,

    /// Add task tracking instructions to CLAUDE.md
    Onboard {
        /// Replace an existing Task Tracking section
        #[arg(long)]
        force: bool,
    },
}

/// Settings resolved once per invocation from flags and the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub project: String,
    pub default_priority: i64,
    pub recent_done_limit: usize,
}

impl Settings {
    /// Flags win over the config file, which wins over built-in defaults
    pub fn resolve(cli: &Cli, config: Config) -> Result<Self> {
        let db_path = match cli.db.clone().or(config.db_path) {
            Some(path) => path,
            None => Store::default_path()?,
        };

        let project = cli
            .project
            .clone()
            .or(config.default_project)
            .unwrap_or_default();

        Ok(Self {
            db_path,
            project,
            default_priority: config.default_priority,
            recent_done_limit: config.recent_done_limit,
        })
    }
}

/// Opens the store, runs `f`, and closes the store whether or not `f` failed
pub(super) fn with_store<T>(
    settings: &Settings,
    output: &Output,
    f: impl FnOnce(&mut Store) -> Result<T>,
) -> Result<T> {
    output.verbose_ctx(
        "store",
        &format!("Opening database at: {}", settings.db_path.display()),
    );

    let mut store = Store::open(&settings.db_path)
        .with_context(|| format!("Failed to open database: {}", settings.db_path.display()))?;
    store.init().context("Failed to initialize database")?;

    let result = f(&mut store);
    let closed = store.close();

    let value = result?;
    closed.context("Failed to close database")?;
    Ok(value)
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    let config = Config::load()?;
    let settings = Settings::resolve(&cli, config)?;
    output.verbose(&format!(
        "prog starting: db={}, project={:?}",
        settings.db_path.display(),
        settings.project
    ));

    match cli.command {
        Commands::Init => {
            with_store(&settings, &output, |_| Ok(()))?;
            output.success(&format!(
                "Initialized prog database at {}",
                settings.db_path.display()
            ));
        }

        Commands::Add {
            title,
            epic,
            priority,
            parent,
            description,
        } => item::add(
            &settings,
            &output,
            item::NewItem {
                title: title.join(" "),
                epic,
                priority,
                parent,
                description,
            },
        )?,

        Commands::List { status } => query::list(&settings, &output, status.as_deref())?,
        Commands::Ready => query::ready(&settings, &output)?,
        Commands::Show { id } => item::show(&settings, &output, &id)?,
        Commands::Start { id } => item::start(&settings, &output, &id)?,
        Commands::Done { id } => item::done(&settings, &output, &id)?,
        Commands::Block { id, reason } => item::block(&settings, &output, &id, &reason.join(" "))?,
        Commands::Log { id, message } => item::log(&settings, &output, &id, &message.join(" "))?,
        Commands::Append { id, text } => item::append(&settings, &output, &id, &text.join(" "))?,
        Commands::Desc { id, text } => {
            item::describe(&settings, &output, &id, &text.join(" "))?
        }
        Commands::Parent { id, parent } => item::parent(&settings, &output, &id, &parent)?,
        Commands::Dep { id, on } => item::dep(&settings, &output, &id, &on)?,
        Commands::Projects => query::projects(&settings, &output)?,
        Commands::Status => query::status(&settings, &output)?,
        Commands::Prime => query::prime(&settings, &output)?,

        Commands::Onboard { force } => {
            let dir = std::env::current_dir().context("Failed to read current directory")?;
            onboard::run(&output, &dir, force)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
