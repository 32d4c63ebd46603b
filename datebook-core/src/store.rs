//! Persistent event collection.
//!
//! All events plus the id allocator are serialized as one JSON blob,
//! `{"events": [...], "nextId": N}`, and rewritten after every mutation.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::StorageBackend;
use crate::error::{DatebookError, DatebookResult};
use crate::event::{Event, EventDraft, EventId, EventPatch};

/// Key the blob is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "calendar_events";

const FIRST_ID: EventId = 1;

/// Largest id the blob's original writers could represent exactly (2^53 - 1).
/// A stored `nextId` above it is treated as corrupt.
const MAX_STORED_ID: EventId = (1 << 53) - 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlobOut<'a> {
    events: &'a [Event],
    next_id: EventId,
}

/// Read side is looser: entries are decoded one by one and `nextId` may be absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobIn {
    #[serde(default)]
    events: Vec<Value>,
    #[serde(default)]
    next_id: Option<EventId>,
}

pub struct EventStore<B: StorageBackend> {
    backend: B,
    key: String,
    events: Vec<Event>,
    next_id: EventId,
    dirty: bool,
}

impl<B: StorageBackend> EventStore<B> {
    pub fn open(backend: B) -> Self {
        Self::open_with_key(backend, DEFAULT_STORAGE_KEY)
    }

    /// Load the store from `backend`. A missing, unreadable or malformed blob
    /// yields an empty store; this never fails.
    pub fn open_with_key(backend: B, key: impl Into<String>) -> Self {
        let key = key.into();

        let (events, next_id) = match backend.read(&key) {
            Ok(Some(text)) => decode(&key, &text),
            Ok(None) => {
                debug!("No stored events under '{}', starting empty", key);
                (Vec::new(), FIRST_ID)
            }
            Err(e) => {
                warn!("Failed to read events from '{}': {}", key, e);
                (Vec::new(), FIRST_ID)
            }
        };

        debug!(
            "Loaded {} event(s) from '{}', next id {}",
            events.len(),
            key,
            next_id
        );

        EventStore {
            backend,
            key,
            events,
            next_id,
            dirty: false,
        }
    }

    /// Store a new event under the next id.
    pub fn insert(&mut self, draft: EventDraft) -> Event {
        let id = self.allocate_id();
        let event = Event::from_draft(id, draft);

        self.events.push(event.clone());
        self.persist();

        event
    }

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.events.iter().find(|e| e.id == id).cloned()
    }

    /// Merge `patch` onto the event with `id`. Unknown ids change nothing.
    pub fn update(&mut self, id: EventId, patch: EventPatch) -> Option<Event> {
        let event = self.events.iter_mut().find(|e| e.id == id)?;
        event.apply(patch);
        let updated = event.clone();

        self.persist();

        Some(updated)
    }

    /// Remove the event with `id`. Returns false if there was none.
    pub fn delete(&mut self, id: EventId) -> bool {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            return false;
        };

        self.events.remove(index);
        self.persist();

        true
    }

    /// Borrow the stored events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Every event, in insertion order.
    pub fn list_all(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// Events dated within `start..=end`, in insertion order.
    pub fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .cloned()
            .collect()
    }

    /// Events that define a recurring series (recurring, with no origin reference).
    pub fn recurring_definitions(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.is_series_definition())
            .cloned()
            .collect()
    }

    /// Remove every event. The allocator keeps counting so ids are never reused.
    pub fn clear(&mut self) -> usize {
        let removed = self.events.len();
        self.events.clear();
        self.persist();
        removed
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The id the next insert will receive.
    pub fn next_id(&self) -> EventId {
        self.next_id
    }

    /// True when the last write failed and memory is ahead of the backend.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the current state to the backend.
    pub fn flush(&mut self) -> DatebookResult<()> {
        let blob = BlobOut {
            events: &self.events,
            next_id: self.next_id,
        };
        let text =
            serde_json::to_string(&blob).map_err(|e| DatebookError::Serialization(e.to_string()))?;

        self.backend.write(&self.key, &text)?;
        self.dirty = false;

        debug!("Wrote {} event(s) to '{}'", self.events.len(), self.key);
        Ok(())
    }

    /// Tear the store down, making a last attempt to persist unsaved state.
    pub fn close(mut self) -> B {
        if self.dirty
            && let Err(e) = self.flush()
        {
            warn!("Closing with unsaved events in '{}': {}", self.key, e);
        }
        self.backend
    }

    fn allocate_id(&mut self) -> EventId {
        let id = self.next_id;
        assert!(
            self.events.iter().all(|e| e.id != id),
            "id allocator collided with stored event {}",
            id
        );
        let Some(next) = id.checked_add(1) else {
            panic!("id allocator exhausted at {}", id);
        };
        self.next_id = next;
        id
    }

    /// Persist after a mutation. Failures keep the in-memory result.
    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to save events to '{}': {}", self.key, e);
            self.dirty = true;
        }
    }
}

/// Decode a stored blob, recovering from whatever is wrong with it.
fn decode(key: &str, text: &str) -> (Vec<Event>, EventId) {
    let blob: BlobIn = match serde_json::from_str(text) {
        Ok(blob) => blob,
        Err(e) => {
            warn!("Stored events under '{}' are malformed, starting empty: {}", key, e);
            return (Vec::new(), FIRST_ID);
        }
    };

    let events: Vec<Event> = blob
        .events
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Event>(value) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping unreadable event in '{}': {}", key, e);
                None
            }
        })
        .collect();

    let after_max = events.iter().map(|e| e.id).max().map_or(FIRST_ID, |max| max.saturating_add(1));

    let next_id = match blob.next_id {
        Some(n) if n > MAX_STORED_ID => {
            warn!(
                "Stored next id {} in '{}' is out of range, using {}",
                n, key, after_max
            );
            after_max
        }
        Some(n) if n >= after_max => n,
        Some(n) if n > 0 => {
            warn!(
                "Stored next id {} in '{}' would reuse an existing id, using {}",
                n, key, after_max
            );
            after_max
        }
        _ => after_max,
    };

    (events, next_id)
}
