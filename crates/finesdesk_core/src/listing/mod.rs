//! Client-side search, category filter and pagination for list pages.
//!
//! Every list page fetches a flat collection, derives a filtered view from a
//! [`ListQuery`], and shows one [`Paginator`] window of it. Nothing here is
//! stored; views are recomputed from the records on demand.

mod paginator;
mod query;

pub use paginator::{total_pages, Paginator};
pub use query::{filter_options, filter_records, matches_filter, matches_search, Filter, ListQuery};

use std::borrow::Cow;

/// A record that can be searched and filtered by a list page.
pub trait Listable {
    /// Text fields the search box matches against. `None` marks an absent
    /// value, which never matches a non-empty search.
    fn search_fields(&self) -> Vec<Option<Cow<'_, str>>>;

    /// Value compared against the category dropdown, if the page has one.
    fn category(&self) -> Option<Cow<'_, str>>;
}
