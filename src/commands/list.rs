use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use datebook_core::date_range::DateRange;
use datebook_core::event::{Category, Event};
use datebook_core::filter::EventFilter;
use owo_colors::OwoColorize;

use crate::Service;
use crate::render::{Render, format_date_label};

pub fn run(
    service: &Service,
    from: Option<&str>,
    to: Option<&str>,
    categories: Vec<Category>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();
    let range = DateRange::from_args(from, to, today).map_err(|e| anyhow!(e))?;

    let mut filter = EventFilter::default().with_range(range);
    if !categories.is_empty() {
        filter = filter.with_categories(categories);
    }

    let mut events = service.query(&filter);
    events.sort_by_key(|e| (e.date, e.time, e.id));

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    print_by_day(&events, today);
    Ok(())
}

/// Print events under a heading per day. Expects events sorted by date.
pub fn print_by_day(events: &[Event], today: NaiveDate) {
    let mut current_date: Option<NaiveDate> = None;

    for event in events {
        if current_date != Some(event.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(event.date, today).bold());
            current_date = Some(event.date);
        }

        println!("{}", event.render());
    }
}
