mod commands;
mod render;
mod toast;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Weekday};
use clap::{Parser, Subcommand};
use datebook_core::backend::FileBackend;
use datebook_core::config::DatebookConfig;
use datebook_core::event::{Category, EventId, Period, Recurrence, parse_date, parse_time};
use datebook_core::service::EventService;
use datebook_core::store::EventStore;
use env_logger::Env;
use log::debug;

use crate::toast::Toast;

pub type Service = EventService<FileBackend, Toast>;

#[derive(Parser)]
#[command(name = "datebook")]
#[command(about = "Manage your calendar events, recurring series and double-bookings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event (or a recurring series)
    New {
        title: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Time (HH:MM), defaults to the configured default time
        #[arg(short, long, value_parser = time_arg)]
        time: Option<NaiveTime>,

        #[arg(long)]
        description: Option<String>,

        /// personal, work or other
        #[arg(short, long)]
        category: Option<Category>,

        /// none, daily, weekly, monthly or custom
        #[arg(short, long)]
        repeat: Option<Recurrence>,

        /// Custom repeat: every N periods
        #[arg(long)]
        every: Option<u32>,

        /// Custom repeat period: days, weeks or months
        #[arg(long)]
        period: Option<Period>,

        /// Custom weekly repeat days, e.g. Mon,Wed
        #[arg(long, value_delimiter = ',')]
        on: Vec<Weekday>,

        /// Create even if the slot is already taken
        #[arg(short, long)]
        yes: bool,
    },
    /// List events
    List {
        /// From this date (YYYY-MM-DD, or "start" for everything before)
        #[arg(long)]
        from: Option<String>,

        /// Until this date (YYYY-MM-DD, or "end" for everything after)
        #[arg(long)]
        to: Option<String>,

        /// Only these categories (repeatable or comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        category: Vec<Category>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one event
    Show { id: EventId },
    /// Change fields of one event (other instances of its series are untouched)
    Edit {
        id: EventId,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,

        #[arg(short, long, value_parser = time_arg)]
        time: Option<NaiveTime>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Move one event to another date
    Move {
        id: EventId,

        #[arg(value_parser = date_arg)]
        date: NaiveDate,
    },
    /// Delete one event (other instances of its series are kept)
    Delete { id: EventId },
    /// Show events occupying a date and time
    Conflicts {
        #[arg(short, long, value_parser = date_arg)]
        date: NaiveDate,

        #[arg(short, long, value_parser = time_arg)]
        time: NaiveTime,

        /// Ignore this event (e.g. the one being edited)
        #[arg(long)]
        exclude: Option<EventId>,
    },
    /// List the events that define recurring series
    Series,
    /// Delete every event
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = DatebookConfig::load().context("Failed to load datebook config")?;
    let mut service = open_service(&config);

    let result = match cli.command {
        Commands::New {
            title,
            date,
            time,
            description,
            category,
            repeat,
            every,
            period,
            on,
            yes,
        } => {
            let args = commands::new::NewArgs {
                title,
                date,
                time,
                description,
                category,
                repeat,
                every,
                period,
                on,
            };
            commands::new::run(&mut service, &config, args, yes)
        }
        Commands::List {
            from,
            to,
            category,
            json,
        } => commands::list::run(&service, from.as_deref(), to.as_deref(), category, json),
        Commands::Show { id } => commands::show::run(&service, id),
        Commands::Edit {
            id,
            title,
            date,
            time,
            description,
            clear_description,
            category,
        } => {
            let args = commands::edit::EditArgs {
                title,
                date,
                time,
                description,
                clear_description,
                category,
            };
            commands::edit::run(&mut service, id, args)
        }
        Commands::Move { id, date } => commands::edit::reschedule(&mut service, id, date),
        Commands::Delete { id } => commands::delete::run(&mut service, id),
        Commands::Conflicts {
            date,
            time,
            exclude,
        } => commands::conflicts::run(&service, date, time, exclude),
        Commands::Series => commands::series::run(&service),
        Commands::Clear { yes } => commands::clear::run(&mut service, yes),
    };

    service.close();
    result
}

fn open_service(config: &DatebookConfig) -> Service {
    let backend = config.backend();
    debug!("Event store: {}", backend.path_for(&config.storage_key).display());

    let store = EventStore::open_with_key(backend, config.storage_key.clone());
    EventService::with_notifier(store, Toast)
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn time_arg(s: &str) -> Result<NaiveTime, String> {
    parse_time(s).map_err(|e| e.to_string())
}
