//! Date range for filtering events.

use chrono::{Days, NaiveDate};

use crate::event::parse_date;

/// Days shown by default when listing without an explicit end.
pub const DEFAULT_LIST_DAYS: u64 = 30;

/// Inclusive range of calendar dates.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Unbounded in both directions
    pub fn all() -> Self {
        DateRange::default()
    }

    /// Build a range from command-line arguments.
    /// - `from`: "start" for unbounded, or YYYY-MM-DD; defaults to `today`
    /// - `to`: "end" for unbounded, or YYYY-MM-DD; defaults to `from` + DEFAULT_LIST_DAYS
    pub fn from_args(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self, String> {
        let from_date = match from {
            Some("start") => None,
            Some(s) => Some(parse_date(s).map_err(|e| e.to_string())?),
            None => Some(today),
        };

        let to_date = match to {
            Some("end") => None,
            Some(s) => Some(parse_date(s).map_err(|e| e.to_string())?),
            None => from_date
                .unwrap_or(today)
                .checked_add_days(Days::new(DEFAULT_LIST_DAYS)),
        };

        if let (Some(f), Some(t)) = (from_date, to_date)
            && f > t
        {
            return Err(format!("Range start {} is after range end {}", f, t));
        }

        Ok(DateRange {
            from: from_date,
            to: to_date,
        })
    }

    /// Whether `date` falls inside the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn contains_is_inclusive() {
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31));
        assert!(range.contains(date(2024, 5, 1)));
        assert!(range.contains(date(2024, 5, 31)));
        assert!(!range.contains(date(2024, 4, 30)));
        assert!(!range.contains(date(2024, 6, 1)));
    }

    #[test]
    fn unbounded_ends() {
        assert!(DateRange::all().contains(date(1900, 1, 1)));

        let range = DateRange {
            from: None,
            to: Some(date(2024, 1, 1)),
        };
        assert!(range.contains(date(1999, 12, 31)));
        assert!(!range.contains(date(2024, 1, 2)));
    }

    #[test]
    fn from_args_defaults() {
        let today = date(2024, 5, 10);

        let range = DateRange::from_args(None, None, today).unwrap();
        assert_eq!(range.from, Some(today));
        assert_eq!(range.to, Some(date(2024, 6, 9)));

        let range = DateRange::from_args(Some("start"), Some("end"), today).unwrap();
        assert_eq!(range, DateRange::all());

        let range = DateRange::from_args(Some("2024-01-01"), None, today).unwrap();
        assert_eq!(range.to, Some(date(2024, 1, 31)));
    }

    #[test]
    fn from_args_rejects_bad_input() {
        let today = date(2024, 5, 10);
        assert!(DateRange::from_args(Some("May 1"), None, today).is_err());
        assert!(DateRange::from_args(Some("2024-05-02"), Some("2024-05-01"), today).is_err());
    }
}
