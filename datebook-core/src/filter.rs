//! Category and date filtering for event listings.

use std::collections::HashSet;

use crate::date_range::DateRange;
use crate::event::{Category, Event};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Categories to show. An empty set shows nothing.
    pub categories: HashSet<Category>,
    pub range: DateRange,
}

impl Default for EventFilter {
    /// Every category, all dates
    fn default() -> Self {
        EventFilter {
            categories: [Category::Personal, Category::Work, Category::Other]
                .into_iter()
                .collect(),
            range: DateRange::all(),
        }
    }
}

impl EventFilter {
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Flip one category on or off.
    pub fn toggle(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.categories.contains(&event.category) && self.range.contains(event.date)
    }
}
