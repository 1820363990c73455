use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::mpsc::{Receiver, Sender, channel};

/// A record type that can be searched, bucketed and sorted by a view.
pub trait ViewRecord {
    type SortKey: Copy + PartialEq;

    /// String fields eligible for substring search. A record with no
    /// searchable fields simply never matches a non-empty term.
    fn search_fields(&self) -> Vec<&str>;

    /// Categorical values this record belongs to.
    fn category_values(&self) -> Vec<&str>;

    fn compare_by(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    Records,
    Search,
    Category,
    Sort,
}

/// Holds a record collection plus the user-controlled view parameters and
/// derives the visible, ordered subset on demand. Single-owner; every
/// mutation notifies subscribers so a presentation layer can re-render.
pub struct ListView<R: ViewRecord> {
    records: Vec<R>,
    search_term: String,
    category_filter: Option<String>,
    sort_key: R::SortKey,
    direction: SortDirection,
    subscribers: Vec<Sender<ViewChange>>,
}

impl<R: ViewRecord> ListView<R> {
    pub fn new(sort_key: R::SortKey) -> Self {
        Self::with_sort(sort_key, SortDirection::Ascending)
    }

    pub fn with_sort(sort_key: R::SortKey, direction: SortDirection) -> Self {
        Self {
            records: Vec::new(),
            search_term: String::new(),
            category_filter: None,
            sort_key,
            direction,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<ViewChange> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: ViewChange) {
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }

    /// Replaces the working collection wholesale.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.notify(ViewChange::Records);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// The term is used as given; whitespace is not trimmed here, so a
    /// blank-but-nonempty term is a real search.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.notify(ViewChange::Search);
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_category_filter(&mut self, value: Option<String>) {
        self.category_filter = value;
        self.notify(ViewChange::Category);
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category_filter.as_deref()
    }

    /// Sorting by the active key again flips direction; a new key starts
    /// ascending.
    pub fn set_sort(&mut self, key: R::SortKey) {
        if key == self.sort_key {
            self.direction = self.direction.flipped();
        } else {
            self.sort_key = key;
            self.direction = SortDirection::Ascending;
        }
        self.notify(ViewChange::Sort);
    }

    pub fn sort_key(&self) -> R::SortKey {
        self.sort_key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Filter, then stable-sort. Descending flips the comparator result
    /// rather than reversing the output, so ties keep their input order in
    /// both directions.
    pub fn visible_records(&self) -> Vec<&R> {
        let needle = self.search_term.to_lowercase();
        let mut rows: Vec<&R> = self
            .records
            .iter()
            .filter(|r| self.matches_search(r, &needle) && self.matches_category(r))
            .collect();

        let key = self.sort_key;
        let direction = self.direction;
        rows.sort_by(|a, b| {
            let ord = a.compare_by(b, key);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        rows
    }

    fn matches_search(&self, record: &R, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    fn matches_category(&self, record: &R) -> bool {
        let Some(wanted) = self.category_filter.as_deref() else {
            return true;
        };
        record.category_values().iter().any(|value| *value == wanted)
    }

    /// Sorted, deduplicated category values over the full collection.
    /// Deliberately ignores the active search term and filter.
    pub fn unique_categories(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        for record in &self.records {
            for value in record.category_values() {
                seen.insert(value.to_string());
            }
        }
        seen.into_iter().collect()
    }
}
