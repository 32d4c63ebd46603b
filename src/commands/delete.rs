use anyhow::{Result, bail};
use datebook_core::event::EventId;
use owo_colors::OwoColorize;

use crate::Service;

pub fn run(service: &mut Service, id: EventId) -> Result<()> {
    let Some(event) = service.get(id) else {
        bail!("Event #{} not found", id);
    };

    if !service.delete(id) {
        bail!("Event #{} not found", id);
    }

    println!("{}", format!("  Removed: {}", event).dimmed());
    Ok(())
}
