//! Terminal notifier: prints a one-line message after each change.

use datebook_core::notify::{LogNotifier, Notice, Notifier, Outcome};
use owo_colors::OwoColorize;

/// Prints successes in green and unsaved changes in yellow. Unknown ids are
/// reported by the command itself, which knows the id that was asked for.
/// Every notice also goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct Toast;

impl Notifier for Toast {
    fn notify(&self, notice: &Notice) {
        LogNotifier.notify(notice);

        match notice.outcome {
            Outcome::Success { .. } => println!("{}", format!("  {}", notice).green()),
            Outcome::Unsaved { .. } => eprintln!("{}", format!("  {}", notice).yellow()),
            Outcome::NotFound => {}
        }
    }
}
