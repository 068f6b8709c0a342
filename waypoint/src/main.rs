//! waypoint - goal companion CLI
//!
//! Computes progress analytics from a user snapshot and asks the companion
//! for motivation, plans and advice. Works without any provider configured;
//! answers then come from static content.

mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use waypoint_core::companion::GoalBreakdownRequest;
use waypoint_core::config::PolicyName;
use waypoint_core::snapshot::{load_snapshot_file, InMemorySnapshotSource};
use waypoint_core::{
    Advisor, AnalyticsEngine, Clock, CompanionEngine, Config, EventKind, ExternalEvent,
    FixedClock, JsonFileSnapshotSource, SnapshotSource, SystemClock, UserSnapshot,
};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Goal companion: progress analytics, motivation and planning")]
#[command(version)]
struct Args {
    /// Config file (defaults to ~/.config/waypoint/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate streaks and triggers as of this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Provider ordering policy
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyArg>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Print provider statistics to stderr when done
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Motivational message for an event, or seeded by a snapshot's goals
    Motivate {
        /// Event name (7_days_streak, first_goal, goal_completed, ...)
        #[arg(required_unless_present = "snapshot")]
        event: Option<String>,

        /// Snapshot whose goals seed the message
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// User id when the snapshot path is a directory
        #[arg(long)]
        user: Option<String>,
    },
    /// Progress metrics, recommendations and narrative
    Progress {
        snapshot: PathBuf,
        #[arg(long)]
        user: Option<String>,
    },
    /// Events that fire for a snapshot, each with its message
    Triggers {
        snapshot: PathBuf,
        #[arg(long)]
        user: Option<String>,
        /// Signal that caused the check (action_completed, goal_created, goal_completed)
        #[arg(long, value_parser = parse_external)]
        event: Option<ExternalEvent>,
    },
    /// Split a goal into steps
    Breakdown {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        goal_type: Option<String>,
    },
    /// What to do next
    Navigate {
        snapshot: PathBuf,
        #[arg(long)]
        user: Option<String>,
    },
    /// Answer a question
    Advise {
        question: String,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Configured providers in the order they would be tried
    Providers,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fixed,
    SuccessRate,
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("invalid date {raw:?}: {e}"))
}

fn parse_external(raw: &str) -> std::result::Result<ExternalEvent, String> {
    raw.parse()
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    if let Some(policy) = args.policy {
        config.companion.policy = match policy {
            PolicyArg::Fixed => PolicyName::Fixed,
            PolicyArg::SuccessRate => PolicyName::SuccessRate,
        };
    }

    // Initialize logging (to file, stdout carries the answer)
    let _log_guard =
        waypoint_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("waypoint starting up");

    let clock: Arc<dyn Clock> = match args.today {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };
    let analytics = AnalyticsEngine::with_clock(config.analytics.clone(), clock);
    let companion =
        CompanionEngine::from_config(&config).context("failed to set up text providers")?;

    if let Command::Providers = args.command {
        render::providers(&config, &companion, args.json)?;
        return Ok(());
    }

    let (snapshot, user_id) = match &args.command {
        Command::Motivate { snapshot, user, .. } | Command::Advise { snapshot, user, .. } => {
            match snapshot {
                Some(path) => load(path, user.as_deref())
                    .map(|s| (Some(s.clone()), Some(s.user.id)))?,
                None => (None, None),
            }
        }
        Command::Progress { snapshot, user }
        | Command::Triggers { snapshot, user, .. }
        | Command::Navigate { snapshot, user } => {
            let s = load(snapshot, user.as_deref())?;
            let id = s.user.id.clone();
            (Some(s), Some(id))
        }
        Command::Breakdown { .. } | Command::Providers => (None, None),
    };

    let mut source = InMemorySnapshotSource::new();
    if let Some(snapshot) = snapshot {
        source.insert(snapshot);
    }
    let advisor = Advisor::new(Box::new(source), analytics, companion);
    let user_id = user_id.as_deref();

    match args.command {
        Command::Motivate { event, .. } => {
            let message = match (event, user_id) {
                (Some(event), _) => advisor
                    .companion()
                    .resolve_motivation(&EventKind::from(event)),
                (None, Some(id)) => advisor.motivate(id)?,
                (None, None) => anyhow::bail!("an event or --snapshot is required"),
            };
            render::motivation(&message, args.json)?;
        }
        Command::Progress { .. } => {
            let outcome = advisor.analyze_progress(require(user_id)?)?;
            render::progress(&outcome, args.json)?;
        }
        Command::Triggers { event, .. } => {
            let messages = advisor.handle_event(require(user_id)?, event)?;
            render::triggers(&messages, args.json)?;
        }
        Command::Breakdown {
            title,
            description,
            goal_type,
        } => {
            let request = GoalBreakdownRequest {
                title,
                description,
                goal_type,
            };
            render::breakdown(&advisor.break_goal_into_steps(&request), args.json)?;
        }
        Command::Navigate { .. } => {
            let advice = advisor.navigate(require(user_id)?)?;
            render::navigation(&advice, args.json)?;
        }
        Command::Advise { question, .. } => {
            let advice = advisor.advise(&question, user_id)?;
            render::advice(&advice, args.json)?;
        }
        Command::Providers => {}
    }

    if args.stats {
        render::stats(&advisor.companion().get_provider_stats())?;
    }

    tracing::info!("waypoint shutting down");
    Ok(())
}

/// Load one snapshot from a file, or from a directory of `<user>.json` files.
fn load(path: &Path, user: Option<&str>) -> Result<UserSnapshot> {
    let snapshot = match user {
        Some(id) => JsonFileSnapshotSource::new(path).load_snapshot(id),
        None => load_snapshot_file(path),
    };
    snapshot.with_context(|| format!("failed to load snapshot from {}", path.display()))
}

fn require(user_id: Option<&str>) -> Result<&str> {
    user_id.context("a snapshot is required for this command")
}
