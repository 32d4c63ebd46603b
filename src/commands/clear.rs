use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::Service;

pub fn run(service: &mut Service, yes: bool) -> Result<()> {
    let count = service.store().len();

    if count == 0 {
        println!("{}", "No events to remove".dimmed());
        return Ok(());
    }

    let proceed = yes
        || Confirm::new()
            .with_prompt(format!("  Delete all {} events?", count))
            .default(false)
            .interact()?;

    if !proceed {
        println!("{}", "  Cancelled".dimmed());
        return Ok(());
    }

    service.clear();
    Ok(())
}
