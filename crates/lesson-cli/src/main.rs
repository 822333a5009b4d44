//! `lessons` CLI — plan, book and conflict-check recurring music lessons.
//!
//! ## Usage
//!
//! ```sh
//! # Preview four Monday sessions at 10:00 AM
//! lessons plan --weekday Monday --sessions 4 --hour 10 --meridiem am
//!
//! # Which week does a Mon/Wed batch of 9 sessions end in?
//! lessons end-date --weekday mon --weekday wed --sessions 9
//!
//! # Book a dual batch ending in the week of 2025-03-03
//! lessons book --subject Piano --teacher T1 --student S1 --student S2 \
//!   --weekday tue --until 2025-03-03 --hour 4 --meridiem pm --link https://meet.example/p
//!
//! # Delete several schedules at once
//! lessons delete 3 4 7
//!
//! # Print a schedule's recurrence as iCalendar text
//! lessons ics 3
//! ```

mod file_store;
mod settings;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use lesson_engine::clock::{self, Meridiem};
use lesson_engine::recurrence::earliest_start;
use lesson_engine::{
    compute_end_date, generate_sessions, ical, total_sessions_until, BatchType, GroupDraft,
    RecurrenceSpec, ScheduleDraft, ScheduleId, Scheduler, SessionLength, StudentId, TeacherId,
    TimeInput, WeekdayName,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::file_store::JsonFileStore;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "lessons",
    version,
    about = "Plan, book and conflict-check recurring music lessons"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON store file (overrides the configured store_path)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// TOML configuration file (defaults to ./lessons.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date as today instead of the clock in the configured timezone
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

/// Weekday pattern and length shared by every planning command.
#[derive(Args)]
struct PatternArgs {
    /// Weekday the batch meets on; repeat for a second day
    #[arg(long = "weekday", required = true)]
    weekdays: Vec<WeekdayName>,
    /// Total number of sessions
    #[arg(long, conflicts_with = "until")]
    sessions: Option<u32>,
    /// Last week of the batch (YYYY-MM-DD); the session count is derived
    #[arg(long)]
    until: Option<NaiveDate>,
}

impl PatternArgs {
    fn length(&self) -> Option<SessionLength> {
        match (self.sessions, self.until) {
            (Some(n), _) => Some(SessionLength::Count(n)),
            (None, Some(end)) => Some(SessionLength::EndDate(end)),
            (None, None) => None,
        }
    }
}

#[derive(Args)]
struct TimeArgs {
    /// Hour on a 12-hour clock (1-12)
    #[arg(long)]
    hour: u32,
    #[arg(long, default_value_t = 0)]
    minute: u32,
    /// am or pm
    #[arg(long)]
    meridiem: Meridiem,
}

impl From<&TimeArgs> for TimeInput {
    fn from(args: &TimeArgs) -> Self {
        TimeInput {
            hour: args.hour,
            minute: args.minute,
            meridiem: args.meridiem,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the sessions a pattern would generate
    Plan {
        #[command(flatten)]
        pattern: PatternArgs,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Print the week a pattern ends in
    EndDate {
        #[arg(long = "weekday", required = true)]
        weekdays: Vec<WeekdayName>,
        #[arg(long)]
        sessions: u32,
    },
    /// Book an individual (one --student) or dual (two) schedule
    Book {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        teacher: String,
        #[arg(long = "student", required = true)]
        students: Vec<String>,
        #[arg(long)]
        link: String,
        #[command(flatten)]
        pattern: PatternArgs,
        #[command(flatten)]
        time: TimeArgs,
        /// Validate and conflict-check without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Edit a booked schedule; omitted flags keep their current value
    Edit {
        id: ScheduleId,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long = "student")]
        students: Vec<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long = "weekday")]
        weekdays: Vec<WeekdayName>,
        #[arg(long, conflicts_with = "until")]
        sessions: Option<u32>,
        #[arg(long)]
        until: Option<NaiveDate>,
        #[arg(long, requires = "meridiem")]
        hour: Option<u32>,
        #[arg(long, requires = "hour")]
        minute: Option<u32>,
        #[arg(long, requires = "hour")]
        meridiem: Option<Meridiem>,
    },
    /// Delete one or more schedules
    Delete {
        #[arg(required = true)]
        ids: Vec<ScheduleId>,
    },
    /// Print every schedule and group as JSON
    List,
    /// Print a schedule's recurrence as iCalendar text
    Ics { id: ScheduleId },
    /// Manage group arrangements
    #[command(subcommand)]
    Group(GroupCommands),
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Create a group arrangement (not conflict-checked)
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        link: String,
        #[arg(long)]
        teacher: String,
        #[arg(long = "student", required = true)]
        students: Vec<String>,
        #[command(flatten)]
        pattern: PatternArgs,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Delete a group arrangement
    Delete { id: ScheduleId },
}

#[derive(Serialize)]
struct PlanOutput {
    start_date: NaiveDate,
    end_date: NaiveDate,
    sessions_per_week: u32,
    total_sessions: u32,
    sessions: Vec<lesson_engine::Session>,
    instants: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings.log_level);
    let tz = settings.tz()?;
    let today = cli.today.unwrap_or_else(|| clock::today_in(tz));
    let store_path = cli.store.unwrap_or(settings.store_path);

    match cli.command {
        Commands::Plan { pattern, time } => {
            let time = TimeInput::from(&time).to_time()?;
            let start = earliest_start(&pattern.weekdays, today);
            let total = match pattern.length() {
                Some(SessionLength::Count(n)) => n,
                Some(SessionLength::EndDate(end)) => total_sessions_until(&pattern.weekdays, start, end)?,
                None => bail!("Either --sessions or --until is required"),
            };
            let recurrence = RecurrenceSpec::new(pattern.weekdays, total)?;
            let sessions = generate_sessions(&recurrence, start, time);
            let output = PlanOutput {
                start_date: start,
                end_date: compute_end_date(&recurrence, start),
                sessions_per_week: recurrence.sessions_per_week(),
                total_sessions: recurrence.total_sessions(),
                instants: sessions.iter().map(|s| clock::combine(s.date, s.time)).collect(),
                sessions,
            };
            print_json(&output)?;
        }
        Commands::EndDate { weekdays, sessions } => {
            let recurrence = RecurrenceSpec::new(weekdays, sessions)?;
            let start = recurrence.earliest_start(today);
            println!("{}", compute_end_date(&recurrence, start));
        }
        Commands::Book {
            subject,
            teacher,
            students,
            link,
            pattern,
            time,
            dry_run,
        } => {
            let batch_type = batch_type_for(students.len())?;
            let draft = ScheduleDraft {
                subject,
                batch_type,
                students: students.into_iter().map(StudentId).collect(),
                teacher_id: Some(TeacherId(teacher)),
                length: pattern.length(),
                weekdays: pattern.weekdays,
                time: Some(TimeInput::from(&time)),
                meeting_link: link,
            };
            let mut scheduler = open(&store_path).await?;
            if dry_run {
                let preview = scheduler.preview(&draft, today)?;
                print_json(&preview.sessions)?;
            } else {
                let saved = scheduler.create(&draft, today).await?;
                print_json(&saved)?;
            }
        }
        Commands::Edit {
            id,
            subject,
            teacher,
            students,
            link,
            weekdays,
            sessions,
            until,
            hour,
            minute,
            meridiem,
        } => {
            let mut scheduler = open(&store_path).await?;
            let mut draft = scheduler.edit(id)?;
            if let Some(subject) = subject {
                draft.subject = subject;
            }
            if let Some(teacher) = teacher {
                draft.teacher_id = Some(TeacherId(teacher));
            }
            if !students.is_empty() {
                draft.batch_type = batch_type_for(students.len())?;
                draft.students = students.into_iter().map(StudentId).collect();
            }
            if let Some(link) = link {
                draft.meeting_link = link;
            }
            if !weekdays.is_empty() {
                draft.weekdays = weekdays;
            }
            if let Some(n) = sessions {
                draft.length = Some(SessionLength::Count(n));
            }
            if let Some(end) = until {
                draft.length = Some(SessionLength::EndDate(end));
            }
            if let (Some(hour), Some(meridiem)) = (hour, meridiem) {
                draft.time = Some(TimeInput {
                    hour,
                    minute: minute.unwrap_or(0),
                    meridiem,
                });
            }
            let saved = scheduler.update(id, &draft, today).await?;
            print_json(&saved)?;
        }
        Commands::Delete { ids } => {
            let mut scheduler = open(&store_path).await?;
            let report = scheduler.bulk_delete(&ids).await;
            for id in &report.deleted {
                println!("deleted {}", id);
            }
            for (id, error) in &report.failed {
                eprintln!("failed to delete {}: {}", id, error);
            }
            if !report.is_complete() {
                bail!(
                    "{} of {} deletes failed; run `lessons list` to see what remains",
                    report.failed.len(),
                    ids.len()
                );
            }
        }
        Commands::List => {
            let scheduler = open(&store_path).await?;
            print_json(&serde_json::json!({
                "schedules": scheduler.schedules(),
                "groups": scheduler.groups(),
            }))?;
        }
        Commands::Ics { id } => {
            let scheduler = open(&store_path).await?;
            let schedule = scheduler
                .schedule(id)
                .with_context(|| format!("No schedule with id {}", id))?;
            println!(
                "{}",
                ical::to_ical(&schedule.recurrence, schedule.start_date(), schedule.time, tz)
            );
        }
        Commands::Group(GroupCommands::Create {
            name,
            link,
            teacher,
            students,
            pattern,
            time,
        }) => {
            let draft = GroupDraft {
                group_name: name,
                class_link: link,
                teacher_id: Some(TeacherId(teacher)),
                students: students.into_iter().map(StudentId).collect(),
                length: pattern.length(),
                weekdays: pattern.weekdays,
                time: Some(TimeInput::from(&time)),
            };
            let mut scheduler = open(&store_path).await?;
            let saved = scheduler.create_group(&draft, today).await?;
            print_json(&saved)?;
        }
        Commands::Group(GroupCommands::Delete { id }) => {
            let mut scheduler = open(&store_path).await?;
            scheduler.delete_group(id).await?;
            println!("deleted group {}", id);
        }
    }

    Ok(())
}

/// One `--student` books an individual batch, two a dual one.
fn batch_type_for(students: usize) -> Result<BatchType> {
    match students {
        1 => Ok(BatchType::Individual),
        2 => Ok(BatchType::Dual),
        n => bail!(
            "Expected one --student (individual) or two (dual), got {}; use `lessons group create` for larger batches",
            n
        ),
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open(path: &std::path::Path) -> Result<Scheduler<JsonFileStore>> {
    let store = JsonFileStore::new(path);
    info!(path = %store.path().display(), "opening store");
    Scheduler::load(store)
        .await
        .with_context(|| format!("Failed to load store: {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
