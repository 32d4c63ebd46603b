//! Same-slot conflict detection.
//!
//! Two events conflict when they share both date and time. Conflicts are
//! advisory: nothing here prevents a write.

use crate::event::{Event, EventDraft, EventId, to_minute};

/// Stored events occupying the candidate's slot, in the order given.
/// The event with `exclude` as its id (usually the one being edited) is skipped.
pub fn find_conflicts<'a, I>(events: I, candidate: &EventDraft, exclude: Option<EventId>) -> Vec<Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    let time = to_minute(candidate.time);

    events
        .into_iter()
        .filter(|e| Some(e.id) != exclude)
        .filter(|e| e.date == candidate.date && e.time == time)
        .cloned()
        .collect()
}
