use anyhow::{Result, bail};
use chrono::{Local, NaiveDate, NaiveTime, Weekday};
use datebook_core::config::DatebookConfig;
use datebook_core::event::{Category, EventDraft, Period, Recurrence, RecurrenceConfig};
use datebook_core::service::InstanceConflicts;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::Service;
use crate::render::{Render, describe_rule, format_date_label};

/// Conflicting instances listed before the rest are summarized
const CONFLICT_LIST_LIMIT: usize = 5;

pub struct NewArgs {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub repeat: Option<Recurrence>,
    pub every: Option<u32>,
    pub period: Option<Period>,
    pub on: Vec<Weekday>,
}

pub fn run(service: &mut Service, config: &DatebookConfig, args: NewArgs, yes: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let draft = build_draft(args, config.default_time(), config.default_category, today)?;

    let preview = service.preview(&draft);
    let conflicted: Vec<&InstanceConflicts> =
        preview.iter().filter(|p| !p.conflicts.is_empty()).collect();

    if !conflicted.is_empty() {
        print_conflicts(&conflicted, preview.len(), today);

        let proceed = yes
            || Confirm::new()
                .with_prompt("  Create anyway?")
                .default(false)
                .interact()?;
        if !proceed {
            println!("{}", "  Cancelled".dimmed());
            return Ok(());
        }
    }

    let created = service.create(draft);

    if let (Some(first), Some(last)) = (created.first(), created.last())
        && created.len() > 1
    {
        println!(
            "{}",
            format!(
                "  {} ({}), {} through {}",
                first.title,
                describe_rule(first.recurrence, first.recurrence_config.as_ref()),
                first.date,
                last.date
            )
            .dimmed()
        );
    }

    Ok(())
}

/// Turn command-line input into a validated draft.
///
/// Passing `--every`, `--period` or `--on` without `--repeat` implies a custom rule.
pub fn build_draft(
    args: NewArgs,
    default_time: NaiveTime,
    default_category: Category,
    today: NaiveDate,
) -> Result<EventDraft> {
    let has_custom_parts = args.every.is_some() || args.period.is_some() || !args.on.is_empty();

    let recurrence = match args.repeat {
        Some(repeat) => repeat,
        None if has_custom_parts => Recurrence::Custom,
        None => Recurrence::None,
    };

    if has_custom_parts && recurrence != Recurrence::Custom {
        bail!("--every, --period and --on only apply to --repeat custom");
    }

    let recurrence_config = if recurrence == Recurrence::Custom {
        let period = args.period.unwrap_or(if args.on.is_empty() {
            Period::Days
        } else {
            Period::Weeks
        });
        if !args.on.is_empty() && period != Period::Weeks {
            bail!("--on only applies to a weekly period");
        }
        Some(RecurrenceConfig::new(args.every.unwrap_or(1), period, args.on)?)
    } else {
        None
    };

    let draft = EventDraft {
        title: args.title.trim().to_string(),
        description: args.description.filter(|d| !d.trim().is_empty()),
        date: args.date.unwrap_or(today),
        time: args.time.unwrap_or(default_time),
        category: args.category.unwrap_or(default_category),
        recurrence,
        recurrence_config,
        original_event_id: None,
    };

    draft.validate()?;
    Ok(draft)
}

fn print_conflicts(conflicted: &[&InstanceConflicts], total: usize, today: NaiveDate) {
    let heading = if total == 1 {
        "  This event conflicts with:".to_string()
    } else {
        format!("  {} of {} occurrences conflict:", conflicted.len(), total)
    };
    println!("{}", heading.yellow());

    for entry in conflicted.iter().take(CONFLICT_LIST_LIMIT) {
        if total > 1 {
            println!("  {}", format_date_label(entry.instance.date, today).bold());
        }
        for event in &entry.conflicts {
            println!("  {}", event.render());
        }
    }

    if conflicted.len() > CONFLICT_LIST_LIMIT {
        let more = format!("  ... and {} more", conflicted.len() - CONFLICT_LIST_LIMIT);
        println!("{}", more.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn args(title: &str) -> NewArgs {
        NewArgs {
            title: title.to_string(),
            date: None,
            time: None,
            description: None,
            category: None,
            repeat: None,
            every: None,
            period: None,
            on: vec![],
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let draft = build_draft(args("  Dentist "), nine(), Category::Work, today()).unwrap();

        assert_eq!(draft.title, "Dentist");
        assert_eq!(draft.date, today());
        assert_eq!(draft.time, nine());
        assert_eq!(draft.category, Category::Work);
        assert_eq!(draft.recurrence, Recurrence::None);
        assert_eq!(draft.recurrence_config, None);
    }

    #[test]
    fn custom_parts_imply_custom_rule() {
        let mut input = args("Run");
        input.every = Some(2);
        input.on = vec![Weekday::Tue, Weekday::Thu];

        let draft = build_draft(input, nine(), Category::Personal, today()).unwrap();
        assert_eq!(draft.recurrence, Recurrence::Custom);

        let config = draft.recurrence_config.unwrap();
        assert_eq!(config.interval, 2);
        assert_eq!(config.period, Period::Weeks);
        assert_eq!(config.selected_days, vec![Weekday::Tue, Weekday::Thu]);
    }

    #[test]
    fn custom_parts_with_other_repeat_are_rejected() {
        let mut input = args("Run");
        input.repeat = Some(Recurrence::Daily);
        input.every = Some(3);

        assert!(build_draft(input, nine(), Category::Personal, today()).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut input = args("Run");
        input.every = Some(0);

        assert!(build_draft(input, nine(), Category::Personal, today()).is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(build_draft(args("   "), nine(), Category::Personal, today()).is_err());
    }

    #[test]
    fn custom_without_parts_repeats_daily() {
        let mut input = args("Water plants");
        input.repeat = Some(Recurrence::Custom);

        let draft = build_draft(input, nine(), Category::Personal, today()).unwrap();
        let config = draft.recurrence_config.unwrap();
        assert_eq!(config.interval, 1);
        assert_eq!(config.period, Period::Days);
    }
}
