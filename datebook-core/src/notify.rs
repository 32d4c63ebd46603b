//! Notification sink.
//!
//! The service reports the outcome of each mutating call here. Sinks are
//! observers only; nothing they do affects the stored data.

use std::fmt;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Applied and persisted. `count` is the number of events affected.
    Success { count: usize },
    /// The addressed event does not exist
    NotFound,
    /// Applied in memory but the write to the backend failed
    Unsaved { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub action: Action,
    pub outcome: Outcome,
}

pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

impl<F> Notifier for F
where
    F: Fn(&Notice),
{
    fn notify(&self, notice: &Notice) {
        self(notice)
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _notice: &Notice) {}
}

/// Forwards notices to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.outcome {
            Outcome::Unsaved { .. } => warn!("{}", notice),
            _ => info!("{}", notice),
        }
    }
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Clear => "clear",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.action, &self.outcome) {
            (Action::Create, Outcome::Success { count: 1 }) => write!(f, "Event created"),
            (Action::Create, Outcome::Success { count }) => write!(f, "{} events created", count),
            (Action::Update, Outcome::Success { .. }) => write!(f, "Event updated"),
            (Action::Delete, Outcome::Success { .. }) => write!(f, "Event deleted"),
            (Action::Clear, Outcome::Success { count }) => write!(f, "{} events removed", count),
            (action, Outcome::NotFound) => write!(f, "Could not {}: event not found", action),
            (action, Outcome::Unsaved { count }) => write!(
                f,
                "{} applied to {} event(s) but could not be saved",
                action, count
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn closures_are_notifiers() {
        let seen = RefCell::new(Vec::new());
        let sink = |notice: &Notice| seen.borrow_mut().push(notice.clone());

        sink.notify(&Notice {
            action: Action::Delete,
            outcome: Outcome::NotFound,
        });

        assert_eq!(seen.borrow().len(), 1);
        assert!(!seen.borrow()[0].is_success());
    }

    #[test]
    fn display_messages() {
        let created = Notice {
            action: Action::Create,
            outcome: Outcome::Success { count: 3 },
        };
        assert_eq!(created.to_string(), "3 events created");

        let unsaved = Notice {
            action: Action::Update,
            outcome: Outcome::Unsaved { count: 1 },
        };
        assert_eq!(
            unsaved.to_string(),
            "update applied to 1 event(s) but could not be saved"
        );
    }
}
