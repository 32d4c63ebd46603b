//! Event model.
//!
//! `Event` is what the store holds. `EventDraft` is the same record before an id
//! has been allocated, and `EventPatch` carries only the fields an update changes.
//! Field names and formats match the persisted blob: camelCase keys, dates as
//! `YYYY-MM-DD` and times as 24-hour `HH:MM`.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DatebookError, DatebookResult};

/// Store-assigned identifier. Allocation starts at 1 and never reuses a value.
pub type EventId = u64;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A stored calendar event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Only interpreted when `recurrence` is `Custom`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_config"
    )]
    pub recurrence_config: Option<RecurrenceConfig>,
    /// Back-reference to the event that defines this instance's series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<EventId>,
}

/// An event that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub category: Category,
    pub recurrence: Recurrence,
    pub recurrence_config: Option<RecurrenceConfig>,
    pub original_event_id: Option<EventId>,
}

/// Fields to change on an existing event. `None` leaves a field untouched;
/// the nested options on clearable fields use `Some(None)` to clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub category: Option<Category>,
    pub recurrence: Option<Recurrence>,
    pub recurrence_config: Option<Option<RecurrenceConfig>>,
    pub original_event_id: Option<Option<EventId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Work,
    /// Also absorbs category strings this version does not know
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
    /// A recurrence string this version does not understand. Expands to the
    /// defining event only.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Days,
    Weeks,
    Months,
}

/// Rule for `Recurrence::Custom`: repeat every `interval` `period`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRecurrenceConfig")]
pub struct RecurrenceConfig {
    pub interval: u32,
    pub period: Period,
    /// Weekday codes ("Mon", "Tue", ...), meaningful only for `Period::Weeks`
    pub selected_days: Vec<Weekday>,
}

/// Wire form accepted on read: interval and period may be missing, and a
/// period or weekday that isn't understood doesn't sink the rest.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecurrenceConfig {
    #[serde(default)]
    interval: Option<u32>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    selected_days: Vec<Value>,
}

impl From<RawRecurrenceConfig> for RecurrenceConfig {
    fn from(raw: RawRecurrenceConfig) -> Self {
        let period = match raw.period.as_deref().map(Period::from_str) {
            Some(Ok(period)) => period,
            Some(Err(e)) => {
                warn!("{}, repeating by days", e);
                Period::Days
            }
            None => Period::Days,
        };

        let selected_days = raw
            .selected_days
            .iter()
            .filter_map(|day| day.as_str()?.parse::<Weekday>().ok())
            .collect();

        RecurrenceConfig {
            interval: raw.interval.filter(|n| *n > 0).unwrap_or(1),
            period,
            selected_days,
        }
    }
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        RecurrenceConfig {
            interval: 1,
            period: Period::Days,
            selected_days: Vec::new(),
        }
    }
}

impl RecurrenceConfig {
    pub fn new(interval: u32, period: Period, selected_days: Vec<Weekday>) -> DatebookResult<Self> {
        if interval == 0 {
            return Err(DatebookError::Parse(
                "Recurrence interval must be at least 1".into(),
            ));
        }

        let mut days: Vec<Weekday> = Vec::new();
        if period == Period::Weeks {
            for day in selected_days {
                if !days.contains(&day) {
                    days.push(day);
                }
            }
        }

        Ok(RecurrenceConfig {
            interval,
            period,
            selected_days: days,
        })
    }

    /// Parse the JSON text form, e.g. `{"interval":2,"period":"weeks"}`.
    pub fn parse(text: &str) -> DatebookResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| DatebookError::Parse(format!("Invalid recurrence config '{}': {}", text, e)))
    }
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        EventDraft {
            title: title.into(),
            description: None,
            date,
            time,
            category: Category::default(),
            recurrence: Recurrence::default(),
            recurrence_config: None,
            original_event_id: None,
        }
    }

    /// Check the fields a form would reject before the draft reaches the store.
    pub fn validate(&self) -> DatebookResult<()> {
        if self.title.trim().is_empty() {
            return Err(DatebookError::Validation("Title is required".into()));
        }
        Ok(())
    }
}

impl Event {
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        Event {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: to_minute(draft.time),
            category: draft.category,
            recurrence: draft.recurrence,
            recurrence_config: draft.recurrence_config,
            original_event_id: draft.original_event_id,
        }
    }

    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            time: self.time,
            category: self.category,
            recurrence: self.recurrence,
            recurrence_config: self.recurrence_config.clone(),
            original_event_id: self.original_event_id,
        }
    }

    /// Merge the patched fields onto this event. The id never changes.
    pub fn apply(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(time) = patch.time {
            self.time = to_minute(time);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(recurrence) = patch.recurrence {
            self.recurrence = recurrence;
        }
        if let Some(config) = patch.recurrence_config {
            self.recurrence_config = config;
        }
        if let Some(original) = patch.original_event_id {
            self.original_event_id = original;
        }
    }

    /// Whether this event defines a series rather than being a plain event or
    /// a generated instance that points back at its origin.
    pub fn is_series_definition(&self) -> bool {
        self.recurrence != Recurrence::None && self.original_event_id.is_none()
    }
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} {})",
            self.title,
            self.date.format(DATE_FORMAT),
            self.time.format(TIME_FORMAT)
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Category {
    type Err = DatebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            "other" => Ok(Category::Other),
            _ => Err(DatebookError::Parse(format!(
                "Unknown category '{}'. Expected personal, work or other",
                s
            ))),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Custom => "custom",
            Recurrence::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Recurrence {
    type Err = DatebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            "custom" => Ok(Recurrence::Custom),
            _ => Err(DatebookError::Parse(format!(
                "Unknown recurrence '{}'. Expected none, daily, weekly, monthly or custom",
                s
            ))),
        }
    }
}

impl FromStr for Period {
    type Err = DatebookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(Period::Days),
            "week" | "weeks" => Ok(Period::Weeks),
            "month" | "months" => Ok(Period::Months),
            _ => Err(DatebookError::Parse(format!(
                "Unknown period '{}'. Expected days, weeks or months",
                s
            ))),
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(s: &str) -> DatebookResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DatebookError::Parse(format!("Invalid date '{}'. Expected YYYY-MM-DD", s)))
}

/// Parse a 24-hour `HH:MM` time. A trailing `:SS` is accepted and dropped.
pub fn parse_time(s: &str) -> DatebookResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map(to_minute)
        .map_err(|_| DatebookError::Parse(format!("Invalid time '{}'. Expected HH:MM", s)))
}

/// Drop seconds and below; event times have minute precision.
pub fn to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Read a recurrence config stored either as an object or as JSON text.
/// Anything unreadable is dropped so the event itself still loads.
fn lenient_config<'de, D>(deserializer: D) -> Result<Option<RecurrenceConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => RecurrenceConfig::parse(&text),
        Some(other) => serde_json::from_value(other)
            .map_err(|e| DatebookError::Parse(format!("Invalid recurrence config: {}", e))),
    };

    match parsed {
        Ok(config) => Ok(Some(config)),
        Err(e) => {
            warn!("Dropping recurrence config: {}", e);
            Ok(None)
        }
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_time(&text).map_err(serde::de::Error::custom)
    }
}
