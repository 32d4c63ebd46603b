use anyhow::Result;
use datebook_core::event::Event;
use owo_colors::OwoColorize;

use crate::Service;
use crate::render::Render;

pub fn run(service: &Service) -> Result<()> {
    let definitions = service.recurring_definitions();

    if definitions.is_empty() {
        println!("{}", "No recurring events".dimmed());
        return Ok(());
    }

    for event in &definitions {
        println!("{}", render_definition(event));
    }

    Ok(())
}

fn render_definition(event: &Event) -> String {
    format!("{}  {}", event.render(), format!("from {}", event.date).dimmed())
}
