//! Search/filter predicate and query state.

use super::Listable;
use std::fmt;

const ALL_LABEL: &str = "All";

/// Category dropdown selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Value(String),
}

impl Filter {
    /// Parse a dropdown value; `"All"` and blank select everything.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_LABEL {
            Self::All
        } else {
            Self::Value(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_LABEL),
            Self::Value(value) => f.write_str(value),
        }
    }
}

/// Page-local list state: search box, dropdown, and current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search_term: String,
    pub filter: Filter,
    /// 1-based.
    pub page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filter: Filter::All,
            page: 1,
        }
    }
}

impl ListQuery {
    pub fn new(search_term: impl Into<String>, filter: Filter) -> Self {
        Self {
            search_term: search_term.into(),
            filter,
            page: 1,
        }
    }

    /// Whether `record` belongs to the filtered view.
    pub fn matches<R: Listable + ?Sized>(&self, record: &R) -> bool {
        matches_search(record, &self.search_term) && matches_filter(record, &self.filter)
    }
}

/// Case-insensitive substring match over the record's search fields.
///
/// An empty term matches every record, including ones whose searched fields
/// are empty or absent.
pub fn matches_search<R: Listable + ?Sized>(record: &R, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .search_fields()
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Exact match of the record's category against the dropdown.
pub fn matches_filter<R: Listable + ?Sized>(record: &R, filter: &Filter) -> bool {
    match filter {
        Filter::All => true,
        Filter::Value(expected) => record.category().as_deref() == Some(expected.as_str()),
    }
}

/// Derive the filtered view, preserving server order.
pub fn filter_records<'a, R: Listable>(records: &'a [R], query: &ListQuery) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| query.matches(*record))
        .collect()
}

/// Distinct category values in first-seen order, for building a dropdown.
pub fn filter_options<R: Listable>(records: &[R]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for record in records {
        if let Some(category) = record.category() {
            if !options.iter().any(|seen| *seen == *category) {
                options.push(category.into_owned());
            }
        }
    }
    options
}
