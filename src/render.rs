//! TUI rendering traits for datebook types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to datebook-core types using owo_colors.

use chrono::NaiveDate;
use datebook_core::event::{Category, Event, Period, Recurrence, RecurrenceConfig};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Category {
    fn render(&self) -> String {
        let tag = format!("[{}]", self);
        match self {
            Category::Personal => tag.blue().to_string(),
            Category::Work => tag.yellow().to_string(),
            Category::Other => tag.magenta().to_string(),
        }
    }
}

impl Render for Event {
    /// One listing line: id, time, title, category and a repeat marker
    fn render(&self) -> String {
        let id = format!("#{}", self.id);
        let time = self.time.format("%H:%M").to_string();
        let repeat = if self.recurrence == Recurrence::None {
            String::new()
        } else {
            format!(" ({})", describe_rule(self.recurrence, self.recurrence_config.as_ref()))
        };

        format!(
            "  {:>6} {} {} {}{}",
            id.dimmed(),
            time,
            self.title,
            self.category.render(),
            repeat.dimmed()
        )
    }
}

/// Human-readable recurrence, e.g. "every 2 weeks on Mon, Wed"
pub fn describe_rule(recurrence: Recurrence, config: Option<&RecurrenceConfig>) -> String {
    match recurrence {
        Recurrence::None => "once".to_string(),
        Recurrence::Daily => "daily".to_string(),
        Recurrence::Weekly => "weekly".to_string(),
        Recurrence::Monthly => "monthly".to_string(),
        Recurrence::Unknown => "unrecognized repeat".to_string(),
        Recurrence::Custom => {
            let Some(config) = config else {
                return "daily".to_string();
            };

            let unit = match config.period {
                Period::Days => "day",
                Period::Weeks => "week",
                Period::Months => "month",
            };
            let mut text = if config.interval == 1 {
                format!("every {}", unit)
            } else {
                format!("every {} {}s", config.interval, unit)
            };

            if config.period == Period::Weeks && !config.selected_days.is_empty() {
                let days: Vec<String> = config.selected_days.iter().map(|d| d.to_string()).collect();
                text.push_str(&format!(" on {}", days.join(", ")));
            }

            text
        }
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed May 1 2024")
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    let diff = (date - today).num_days();
    match diff {
        -1 => "Yesterday".to_string(),
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}
