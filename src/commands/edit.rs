use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveTime};
use datebook_core::event::{Category, EventId, EventPatch};
use owo_colors::OwoColorize;

use crate::Service;
use crate::render::Render;

pub struct EditArgs {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub category: Option<Category>,
}

pub fn run(service: &mut Service, id: EventId, args: EditArgs) -> Result<()> {
    let patch = build_patch(args)?;

    if patch.is_empty() {
        bail!("Nothing to change. Pass at least one of --title, --date, --time, --description, --clear-description, --category");
    }

    apply(service, id, patch)
}

/// Move one event to `date`, like dragging it to another day.
pub fn reschedule(service: &mut Service, id: EventId, date: NaiveDate) -> Result<()> {
    warn_about_slot(service, id, Some(date), None);

    if service.move_event(id, date).is_none() {
        bail!("Event #{} not found", id);
    }
    Ok(())
}

fn apply(service: &mut Service, id: EventId, patch: EventPatch) -> Result<()> {
    if patch.date.is_some() || patch.time.is_some() {
        warn_about_slot(service, id, patch.date, patch.time);
    }

    if service.update(id, patch).is_none() {
        bail!("Event #{} not found", id);
    }
    Ok(())
}

/// Print the events already in the slot an event is about to move into.
fn warn_about_slot(service: &Service, id: EventId, date: Option<NaiveDate>, time: Option<NaiveTime>) {
    let Some(event) = service.get(id) else {
        return;
    };

    let mut candidate = event.to_draft();
    candidate.date = date.unwrap_or(event.date);
    candidate.time = time.unwrap_or(event.time);

    let conflicts = service.check_conflicts(&candidate, Some(id));
    if conflicts.is_empty() {
        return;
    }

    println!("{}", "  Note: the new slot is shared with:".yellow());
    for other in &conflicts {
        println!("  {}", other.render());
    }
}

pub fn build_patch(args: EditArgs) -> Result<EventPatch> {
    let title = match args.title {
        Some(t) if t.trim().is_empty() => bail!("Title cannot be empty"),
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };

    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.map(|d| if d.trim().is_empty() { None } else { Some(d) })
    };

    Ok(EventPatch {
        title,
        description,
        date: args.date,
        time: args.time,
        category: args.category,
        ..Default::default()
    })
}
