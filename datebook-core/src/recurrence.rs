//! Recurrence expansion.
//!
//! Turns one event draft into the dated series it defines. The draft's
//! recurrence fields are resolved once into a [`RecurrenceRule`]; expansion
//! itself never deals with malformed input.

use chrono::{Days, Months, NaiveDate};
use log::debug;

use crate::event::{EventDraft, Period, Recurrence, RecurrenceConfig};

/// How far past the defining date a series is materialized.
pub const HORIZON_MONTHS: u32 = 12;

/// Distance between consecutive occurrences. Counts are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Days(u32),
    Weeks(u32),
    Months(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    /// Not recurring
    Once,
    Every(Step),
    /// Recurrence value not understood; only the defining event is produced
    Unrecognized,
}

impl Step {
    fn from_config(config: &RecurrenceConfig) -> Self {
        let n = config.interval.max(1);
        match config.period {
            Period::Days => Step::Days(n),
            Period::Weeks => Step::Weeks(n),
            Period::Months => Step::Months(n),
        }
    }

    /// The occurrence following `from`, or `None` once it leaves chrono's
    /// representable range.
    ///
    /// Month steps clamp to the last day of shorter months, and the clamped
    /// day carries forward: Jan 31 gives Feb 29 (leap year), Mar 29, Apr 29, ...
    pub fn advance(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Step::Days(n) => from.checked_add_days(Days::new(u64::from(n))),
            Step::Weeks(n) => from.checked_add_days(Days::new(7 * u64::from(n))),
            Step::Months(n) => from.checked_add_months(Months::new(n)),
        }
    }
}

impl RecurrenceRule {
    /// Resolve the rule a draft describes. A custom rule without a usable
    /// config repeats daily.
    pub fn for_draft(draft: &EventDraft) -> Self {
        match draft.recurrence {
            Recurrence::None => RecurrenceRule::Once,
            Recurrence::Daily => RecurrenceRule::Every(Step::Days(1)),
            Recurrence::Weekly => RecurrenceRule::Every(Step::Weeks(1)),
            Recurrence::Monthly => RecurrenceRule::Every(Step::Months(1)),
            Recurrence::Custom => RecurrenceRule::Every(
                draft
                    .recurrence_config
                    .as_ref()
                    .map(Step::from_config)
                    .unwrap_or(Step::Days(1)),
            ),
            Recurrence::Unknown => RecurrenceRule::Unrecognized,
        }
    }
}

/// Last date a series starting on `start` may reach (inclusive).
pub fn horizon(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_months(Months::new(HORIZON_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// Expand a draft into its series.
///
/// Element 0 is always the draft itself, unchanged. Every further element is a
/// copy of the draft with only `date` moved, up to and including the horizon.
pub fn expand(draft: &EventDraft) -> Vec<EventDraft> {
    let rule = RecurrenceRule::for_draft(draft);
    let mut instances = vec![draft.clone()];

    let step = match rule {
        RecurrenceRule::Every(step) => step,
        RecurrenceRule::Once | RecurrenceRule::Unrecognized => return instances,
    };

    let last = horizon(draft.date);
    let mut cursor = draft.date;

    while let Some(next) = step.advance(cursor) {
        if next > last {
            break;
        }

        let mut instance = draft.clone();
        instance.date = next;
        instances.push(instance);
        cursor = next;
    }

    debug!(
        "Expanded '{}' ({:?}) into {} instance(s) through {}",
        draft.title,
        rule,
        instances.len(),
        last
    );

    instances
}
