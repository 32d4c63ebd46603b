//! Entry points for callers.
//!
//! `EventService` ties expansion, conflict checks and the store together and
//! reports each mutation to a [`Notifier`]. Callers that keep a view in sync
//! re-read with `list_all` (or `query`) after each call.

use chrono::NaiveDate;
use log::debug;

use crate::backend::StorageBackend;
use crate::conflict::find_conflicts;
use crate::event::{Event, EventDraft, EventId, EventPatch};
use crate::filter::EventFilter;
use crate::notify::{Action, Notice, Notifier, Outcome, Silent};
use crate::recurrence::expand;
use crate::store::EventStore;

/// One instance of an expanded draft and the stored events in its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConflicts {
    pub instance: EventDraft,
    pub conflicts: Vec<Event>,
}

/// A stored instance and the conflicts it had at the moment it was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInstance {
    pub event: Event,
    pub conflicts: Vec<Event>,
}

pub struct EventService<B: StorageBackend, N: Notifier = Silent> {
    store: EventStore<B>,
    notifier: N,
}

impl<B: StorageBackend> EventService<B, Silent> {
    pub fn new(store: EventStore<B>) -> Self {
        EventService {
            store,
            notifier: Silent,
        }
    }
}

impl<B: StorageBackend, N: Notifier> EventService<B, N> {
    pub fn with_notifier(store: EventStore<B>, notifier: N) -> Self {
        EventService { store, notifier }
    }

    pub fn store(&self) -> &EventStore<B> {
        &self.store
    }

    /// Tear down the service and its store, returning the backend.
    pub fn close(self) -> B {
        self.store.close()
    }

    // MUTATIONS:

    /// Expand `draft` and insert every instance in order.
    ///
    /// Instances are inserted one at a time; each insert is persisted on its own.
    pub fn create(&mut self, draft: EventDraft) -> Vec<Event> {
        self.insert_series(draft, false)
            .into_iter()
            .map(|created| created.event)
            .collect()
    }

    /// Like [`create`](Self::create), but reports for every instance the stored
    /// events that occupied its slot just before it was inserted. Conflicts never
    /// stop an insert.
    pub fn create_with_conflicts(&mut self, draft: EventDraft) -> Vec<CreatedInstance> {
        self.insert_series(draft, true)
    }

    /// Patch exactly one stored event. Other instances of its series are untouched.
    pub fn update(&mut self, id: EventId, patch: EventPatch) -> Option<Event> {
        let updated = self.store.update(id, patch);
        self.report(Action::Update, updated.as_ref().map(|_| 1));
        updated
    }

    /// Reschedule one event to `date`, keeping everything else.
    pub fn move_event(&mut self, id: EventId, date: NaiveDate) -> Option<Event> {
        self.update(
            id,
            EventPatch {
                date: Some(date),
                ..Default::default()
            },
        )
    }

    /// Delete exactly one stored event. Never cascades to its series.
    pub fn delete(&mut self, id: EventId) -> bool {
        let deleted = self.store.delete(id);
        self.report(Action::Delete, deleted.then_some(1));
        deleted
    }

    /// Remove every event. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.store.clear();
        self.report(Action::Clear, Some(removed));
        removed
    }

    // QUERIES:

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.store.get(id)
    }

    pub fn list_all(&self) -> Vec<Event> {
        self.store.list_all()
    }

    pub fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Event> {
        self.store.list_by_date_range(start, end)
    }

    /// Events passing `filter`, in insertion order.
    pub fn query(&self, filter: &EventFilter) -> Vec<Event> {
        self.store
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    pub fn recurring_definitions(&self) -> Vec<Event> {
        self.store.recurring_definitions()
    }

    /// Stored events sharing `candidate`'s date and time, skipping `exclude`.
    pub fn check_conflicts(&self, candidate: &EventDraft, exclude: Option<EventId>) -> Vec<Event> {
        find_conflicts(self.store.iter(), candidate, exclude)
    }

    /// Expand `draft` without storing anything and list each instance's conflicts.
    pub fn preview(&self, draft: &EventDraft) -> Vec<InstanceConflicts> {
        expand(draft)
            .into_iter()
            .map(|instance| {
                let conflicts = self.check_conflicts(&instance, None);
                InstanceConflicts {
                    instance,
                    conflicts,
                }
            })
            .collect()
    }

    fn insert_series(&mut self, draft: EventDraft, with_conflicts: bool) -> Vec<CreatedInstance> {
        let instances = expand(&draft);
        let mut created = Vec::with_capacity(instances.len());

        for instance in instances {
            let conflicts = if with_conflicts {
                self.check_conflicts(&instance, None)
            } else {
                Vec::new()
            };
            let event = self.store.insert(instance);
            created.push(CreatedInstance { event, conflicts });
        }

        debug!(
            "Created {} event(s) for '{}'",
            created.len(),
            draft.title
        );
        self.report(Action::Create, Some(created.len()));

        created
    }

    /// `count` is `None` when the addressed event did not exist.
    fn report(&self, action: Action, count: Option<usize>) {
        let outcome = match count {
            None => Outcome::NotFound,
            Some(count) if self.store.is_dirty() => Outcome::Unsaved { count },
            Some(count) => Outcome::Success { count },
        };
        self.notifier.notify(&Notice { action, outcome });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::date_range::DateRange;
    use crate::error::{DatebookError, DatebookResult};
    use crate::event::{Category, Recurrence};
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ten() -> NaiveTime {
        NaiveTime::from_hms_opt(10, 0, 0).unwrap()
    }

    fn make_service() -> EventService<MemoryBackend> {
        EventService::new(EventStore::open(MemoryBackend::new()))
    }

    fn recording_service() -> (
        EventService<MemoryBackend, impl Notifier>,
        Rc<RefCell<Vec<Notice>>>,
    ) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let seen = Rc::clone(&seen);
            move |notice: &Notice| seen.borrow_mut().push(notice.clone())
        };
        let service = EventService::with_notifier(EventStore::open(MemoryBackend::new()), sink);
        (service, seen)
    }

    #[test]
    fn create_single_event() {
        let mut service = make_service();
        let created = service.create(EventDraft::new("Dentist", date(2024, 5, 1), ten()));

        assert_eq!(created.len(), 1);
        assert_eq!(service.list_all(), created);
    }

    #[test]
    fn create_daily_series_stores_every_instance() {
        let mut service = make_service();
        let draft = EventDraft {
            recurrence: Recurrence::Daily,
            ..EventDraft::new("Walk", date(2024, 1, 1), ten())
        };

        let created = service.create(draft);
        assert_eq!(created.len(), 367);
        assert_eq!(service.store().len(), 367);
        assert_eq!(created.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(created.last().unwrap().date, date(2025, 1, 1));

        let ids: Vec<EventId> = created.iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn update_touches_only_the_addressed_instance() {
        let mut service = make_service();
        let series = service.create(EventDraft {
            recurrence: Recurrence::Weekly,
            ..EventDraft::new("Piano", date(2024, 3, 4), ten())
        });

        let target = &series[2];
        let updated = service
            .update(
                target.id,
                EventPatch {
                    title: Some("Piano recital".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Piano recital");

        let retitled: Vec<EventId> = service
            .list_all()
            .into_iter()
            .filter(|e| e.title != "Piano")
            .map(|e| e.id)
            .collect();
        assert_eq!(retitled, vec![target.id]);
    }

    #[test]
    fn delete_never_cascades() {
        let mut service = make_service();
        let series = service.create(EventDraft {
            recurrence: Recurrence::Monthly,
            ..EventDraft::new("Rent", date(2024, 1, 1), ten())
        });

        assert!(service.delete(series[0].id));
        assert_eq!(service.store().len(), series.len() - 1);
        assert_eq!(service.get(series[0].id), None);
        assert_eq!(service.get(series[1].id), Some(series[1].clone()));
    }

    #[test]
    fn delete_unknown_id_leaves_store_unchanged() {
        let mut service = make_service();
        service.create(EventDraft::new("a", date(2024, 1, 1), ten()));
        let before = service.list_all();

        assert!(!service.delete(12345));
        assert_eq!(service.list_all(), before);
    }

    #[test]
    fn conflicts_on_shared_slot() {
        let mut service = make_service();
        let existing = service.create(EventDraft::new("Standup", date(2024, 5, 1), ten()));

        let candidate = EventDraft::new("Interview", date(2024, 5, 1), ten());
        assert_eq!(service.check_conflicts(&candidate, None), existing);

        let elsewhere = EventDraft::new("Interview", date(2024, 5, 1), NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert!(service.check_conflicts(&elsewhere, None).is_empty());

        assert!(service.check_conflicts(&candidate, Some(existing[0].id)).is_empty());
    }

    #[test]
    fn create_with_conflicts_reports_per_instance_but_inserts_all() {
        let mut service = make_service();
        let blocker = service.create(EventDraft::new("Dentist", date(2024, 5, 3), ten()));

        let created = service.create_with_conflicts(EventDraft {
            recurrence: Recurrence::Daily,
            ..EventDraft::new("Gym", date(2024, 5, 1), ten())
        });

        let conflicted: Vec<NaiveDate> = created
            .iter()
            .filter(|c| !c.conflicts.is_empty())
            .map(|c| c.event.date)
            .collect();
        assert_eq!(conflicted, vec![date(2024, 5, 3)]);
        assert_eq!(created[2].conflicts, blocker);
        assert_eq!(service.store().len(), created.len() + 1);
    }

    #[test]
    fn preview_does_not_write() {
        let mut service = make_service();
        service.create(EventDraft::new("Dentist", date(2024, 5, 8), ten()));

        let preview = service.preview(&EventDraft {
            recurrence: Recurrence::Weekly,
            ..EventDraft::new("Class", date(2024, 5, 1), ten())
        });

        assert_eq!(preview.len(), 53);
        assert_eq!(preview[1].instance.date, date(2024, 5, 8));
        assert_eq!(preview[1].conflicts.len(), 1);
        assert_eq!(service.store().len(), 1);
    }

    #[test]
    fn move_event_changes_only_date() {
        let mut service = make_service();
        let original = service.create(EventDraft::new("Call", date(2024, 5, 1), ten())).remove(0);

        let moved = service.move_event(original.id, date(2024, 5, 9)).unwrap();
        assert_eq!(moved, Event { date: date(2024, 5, 9), ..original });
        assert_eq!(service.move_event(999, date(2024, 5, 9)), None);
    }

    #[test]
    fn query_and_range() {
        let mut service = make_service();
        service.create(EventDraft {
            category: Category::Work,
            ..EventDraft::new("Review", date(2024, 5, 1), ten())
        });
        service.create(EventDraft::new("Yoga", date(2024, 5, 2), ten()));
        service.create(EventDraft::new("Trip", date(2024, 6, 1), ten()));

        let work = EventFilter::default().with_categories([Category::Work]);
        let titles: Vec<String> = service.query(&work).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Review"]);

        let may = EventFilter::default().with_range(DateRange::new(date(2024, 5, 1), date(2024, 5, 31)));
        assert_eq!(service.query(&may).len(), 2);
        assert_eq!(service.list_by_range(date(2024, 5, 2), date(2024, 6, 1)).len(), 2);
    }

    #[test]
    fn recurring_definitions_follow_origin_reference() {
        let mut service = make_service();
        service.create(EventDraft {
            recurrence: Recurrence::Weekly,
            ..EventDraft::new("Choir", date(2024, 1, 1), ten())
        });

        // Without an origin reference every weekly instance counts as a definition.
        assert_eq!(service.recurring_definitions().len(), 53);

        let mut linked = EventDraft {
            recurrence: Recurrence::Weekly,
            ..EventDraft::new("Band", date(2024, 1, 2), ten())
        };
        linked.original_event_id = Some(1);
        service.create(linked);
        assert_eq!(service.recurring_definitions().len(), 53);
    }

    #[test]
    fn notices_follow_each_mutation() {
        let (mut service, seen) = recording_service();

        let created = service.create(EventDraft {
            recurrence: Recurrence::Custom,
            recurrence_config: Some(
                crate::event::RecurrenceConfig::new(6, crate::event::Period::Months, vec![]).unwrap(),
            ),
            ..EventDraft::new("Checkup", date(2024, 1, 15), ten())
        });
        service.update(created[0].id, EventPatch::default());
        service.delete(404);

        let notices = seen.borrow();
        assert_eq!(
            *notices,
            vec![
                Notice {
                    action: Action::Create,
                    outcome: Outcome::Success { count: 3 },
                },
                Notice {
                    action: Action::Update,
                    outcome: Outcome::Success { count: 1 },
                },
                Notice {
                    action: Action::Delete,
                    outcome: Outcome::NotFound,
                },
            ]
        );
    }

    /// Backend that refuses every write.
    struct ReadOnly;

    impl StorageBackend for ReadOnly {
        fn read(&self, _key: &str) -> DatebookResult<Option<String>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _contents: &str) -> DatebookResult<()> {
            Err(DatebookError::Persistence("read-only".into()))
        }
    }

    #[test]
    fn unsaved_writes_still_return_results() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let seen = Rc::clone(&seen);
            move |notice: &Notice| seen.borrow_mut().push(notice.clone())
        };
        let mut service = EventService::with_notifier(EventStore::open(ReadOnly), sink);

        let created = service.create(EventDraft::new("Offline", date(2024, 1, 1), ten()));
        assert_eq!(service.get(created[0].id), Some(created[0].clone()));
        assert_eq!(
            seen.borrow()[0].outcome,
            Outcome::Unsaved { count: 1 }
        );
    }

    #[test]
    fn log_notifier_observes_without_changing_results() {
        let backend = MemoryBackend::new();
        let mut service =
            EventService::with_notifier(EventStore::open(backend.clone()), crate::notify::LogNotifier);

        let created = service.create(EventDraft::new("Logged", date(2024, 1, 1), ten()));
        assert!(!service.delete(99));
        assert_eq!(service.clear(), 1);

        let reloaded = EventStore::open(backend);
        assert!(reloaded.is_empty());
        assert_eq!(reloaded.next_id(), created[0].id + 1);
    }
}
