use anyhow::{Result, bail};
use chrono::Local;
use datebook_core::event::{EventDraft, EventId};
use owo_colors::OwoColorize;

use crate::Service;
use crate::render::{Render, describe_rule, format_date_label};

pub fn run(service: &Service, id: EventId) -> Result<()> {
    let Some(event) = service.get(id) else {
        bail!("Event #{} not found", id);
    };

    let today = Local::now().date_naive();

    println!("{} {}", event.title.bold(), event.category.render());
    println!(
        "  {} {}",
        format_date_label(event.date, today),
        event.time.format("%H:%M")
    );
    println!(
        "  {} {}",
        "Repeats:".dimmed(),
        describe_rule(event.recurrence, event.recurrence_config.as_ref())
    );
    if let Some(origin) = event.original_event_id {
        println!("  {} #{}", "Series of:".dimmed(), origin);
    }
    if let Some(description) = &event.description {
        println!();
        println!("  {}", description);
    }

    let slot = EventDraft::new(event.title.clone(), event.date, event.time);
    let conflicts = service.check_conflicts(&slot, Some(event.id));
    if !conflicts.is_empty() {
        println!();
        println!("{}", "  Shares its slot with:".yellow());
        for other in &conflicts {
            println!("  {}", other.render());
        }
    }

    Ok(())
}
