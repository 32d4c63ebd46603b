use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use datebook_core::event::{EventDraft, EventId};
use owo_colors::OwoColorize;

use crate::Service;
use crate::render::Render;

pub fn run(service: &Service, date: NaiveDate, time: NaiveTime, exclude: Option<EventId>) -> Result<()> {
    let candidate = EventDraft::new(String::new(), date, time);
    let conflicts = service.check_conflicts(&candidate, exclude);

    if conflicts.is_empty() {
        println!(
            "{}",
            format!("  {} {} is free", date, time.format("%H:%M")).green()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("  {} {} is taken by:", date, time.format("%H:%M")).yellow()
    );
    for event in &conflicts {
        println!("  {}", event.render());
    }

    Ok(())
}
