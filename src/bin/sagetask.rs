use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use sagetask::ReminderError;
use sagetask::client::GeminiClient;
use sagetask::config::Config;
use sagetask::dashboard::{self, Filter};
use sagetask::model::validate::to_iso;
use sagetask::model::{TaskDraft, TaskPatch};
use sagetask::reminder::{
    CompletionBackend, PromptTemplate, ReminderService, SmartReminderInput,
    generate_smart_reminder,
};
use sagetask::storage::FileStore;
use sagetask::store::TaskStore;
use sagetask::workflow::{CreateOptions, create_task};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "sagetask", version, about = "Tasks with smart reminders")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Whose tasks to operate on
    #[arg(short, long, global = true, default_value = "local")]
    user: String,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a task; a due date triggers a reminder suggestion
    Add {
        description: String,
        #[arg(short, long, default_value = "home")]
        category: String,
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
        /// ISO 8601 instant, or YYYY-MM-DD for the end of that local day
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks, open ones first
    List {
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },
    /// Mark a task completed (or open again with --undo)
    Done {
        id: String,
        #[arg(long)]
        undo: bool,
    },
    Delete { id: String },
    /// Ask for a reminder without creating a task
    Remind {
        description: String,
        #[arg(short, long)]
        difficulty: String,
        #[arg(long)]
        due: String,
    },
}

/// Stands in for the model when no API key is configured.
struct Unconfigured;

#[async_trait]
impl CompletionBackend for Unconfigured {
    async fn complete(&self, _: &str, _: &Value) -> Result<String, ReminderError> {
        Err(ReminderError::unavailable("api_key is not configured"))
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("sagetask error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = Config::load().context("loading config")?;
    let data_dir = config.data_dir().context("no data directory available")?;
    let store = FileStore::new(data_dir)?;

    match cli.command {
        Command::Add {
            description,
            category,
            difficulty,
            due,
        } => {
            let service = build_service(&config)?;
            let draft = TaskDraft {
                description,
                category,
                difficulty,
                due_date: due.as_deref().map(|d| normalize_due(d, &Local)),
            };
            let options = CreateOptions {
                policy: config.reminder_policy,
                heuristic_fallback: config.heuristic_fallback,
            };
            let created = create_task(&draft, &service, options)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
            if let Some(w) = &created.warning {
                eprintln!("warning: {} ({})", w.user_message(), w);
            }
            let task = store.create(&cli.user, created.task).await?;
            println!("created {}", task.id);
            if let Some(r) = &task.smart_reminder {
                let at = dashboard::format_reminder(r, &Local);
                println!("  reminder: {}\n  why: {}", at, r.reasoning);
            }
        }
        Command::List { filter } => {
            let tasks = store.list(&cli.user).await?;
            let now = Utc::now();
            let shown = dashboard::filter_tasks(&dashboard::sort_tasks(&tasks), filter);
            for t in &shown {
                let mark = if t.completed { "x" } else { " " };
                let overdue = if dashboard::is_overdue(t, now) {
                    " OVERDUE"
                } else {
                    ""
                };
                println!(
                    "[{}] {}  {}  ({}, {})  {} / {}{}",
                    mark,
                    t.id,
                    t.description,
                    t.category,
                    t.difficulty,
                    dashboard::format_due(t.due_date, &Local),
                    dashboard::due_distance(t.due_date, now),
                    overdue
                );
                if let Some(r) = &t.smart_reminder {
                    let at = dashboard::format_reminder(r, &Local);
                    println!("      reminder {}: {}", at, r.reasoning);
                }
            }
            if shown.is_empty() {
                println!("No tasks yet.");
            }
            println!(
                "{} of {} completed",
                dashboard::completed_count(&tasks),
                tasks.len()
            );
        }
        Command::Done { id, undo } => {
            let task = store
                .update(&cli.user, &id, TaskPatch::completed(!undo))
                .await?;
            let verb = if task.completed {
                "completed"
            } else {
                "reopened"
            };
            println!("{} {}", verb, task.id);
        }
        Command::Delete { id } => {
            store.delete(&cli.user, &id).await?;
            println!("deleted {}", id);
        }
        Command::Remind {
            description,
            difficulty,
            due,
        } => {
            let service = build_service(&config)?;
            let input = SmartReminderInput {
                task_description: description,
                task_difficulty: difficulty,
                due_date: normalize_due(&due, &Local),
            };
            let reminder = generate_smart_reminder(&service, &input)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
            println!("{}", serde_json::to_string_pretty(&reminder)?);
        }
    }
    Ok(())
}

fn build_service(config: &Config) -> Result<ReminderService> {
    let template = match &config.prompt_template {
        Some(path) => PromptTemplate::from_file(path)?,
        None => PromptTemplate::default(),
    };
    let backend: Arc<dyn CompletionBackend> = if config.api_key.is_empty() {
        Arc::new(Unconfigured)
    } else {
        Arc::new(GeminiClient::from_config(config)?)
    };
    Ok(ReminderService::new(backend, template).with_timeout(config.timeout()))
}

/// `2024-01-10` becomes 23:59:59 of that day in `tz`, as a UTC instant;
/// anything else is passed through.
fn normalize_due<Tz: TimeZone>(raw: &str, tz: &Tz) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .and_then(|dt| tz.from_local_datetime(&dt).earliest())
    {
        Some(dt) => to_iso(dt.with_timezone(&Utc)),
        None => raw.to_string(),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SAGETASK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
