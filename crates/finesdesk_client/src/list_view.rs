//! List page controller: fetch, search, filter, paginate, refetch on notice.

use crate::api::{fetch_records, Backend};
use crossbeam_channel::Receiver;
use finesdesk_core::listing::{filter_options, filter_records};
use finesdesk_core::{
    AppError, Filter, Invalidation, InvalidationBus, ListQuery, Paginator, Record, RequestTicket,
    RequestTracker,
};
use std::future::Future;
use tracing::{debug, warn};

type Scope<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// Result of one list fetch, stamped with the ticket it was issued under.
pub struct Fetched<R> {
    ticket: RequestTicket,
    result: Result<Vec<R>, AppError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Records replaced; carries the new collection size.
    Replaced(usize),
    /// The fetch failed; previous records are kept.
    Failed(AppError),
    /// A newer fetch was issued, or the view was closed, before this arrived.
    Stale,
}

/// Page-local state for one list page.
///
/// Search and filter changes reset to page 1; a refetch clamps the current
/// page into the new range. Dropping the view cancels outstanding fetches.
pub struct ListView<R: Record, B: Backend> {
    backend: B,
    records: Vec<R>,
    query: ListQuery,
    tracker: RequestTracker,
    invalidations: Receiver<Invalidation>,
    scope: Option<Scope<R>>,
    last_error: Option<AppError>,
}

impl<R: Record, B: Backend> ListView<R, B> {
    /// Create an empty view subscribed to changes of `R`'s resource.
    pub fn new(backend: B, bus: &InvalidationBus) -> Self {
        Self {
            backend,
            records: Vec::new(),
            query: ListQuery::default(),
            tracker: RequestTracker::new(),
            invalidations: bus.subscribe(&[R::RESOURCE]),
            scope: None,
            last_error: None,
        }
    }

    /// Keep only records accepted by `scope` whenever a fetch is applied.
    pub fn with_scope(mut self, scope: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.scope = Some(Box::new(scope));
        self
    }

    /// Issue a fetch. The returned future owns everything it needs, so it can
    /// be awaited after later fetches have been issued.
    pub fn start_fetch(&self) -> impl Future<Output = Fetched<R>> + Send + 'static {
        let ticket = self.tracker.issue();
        let backend = self.backend.clone();
        async move {
            let result = fetch_records::<R, B>(&backend).await;
            Fetched { ticket, result }
        }
    }

    /// Apply a finished fetch unless it has been superseded.
    pub fn apply(&mut self, fetched: Fetched<R>) -> Applied {
        if !fetched.ticket.is_current() {
            warn!(
                resource = %R::RESOURCE,
                seq = fetched.ticket.seq(),
                "discarding stale list response"
            );
            return Applied::Stale;
        }
        match fetched.result {
            Ok(mut records) => {
                if let Some(scope) = self.scope.as_ref() {
                    records.retain(|record| scope(record));
                }
                self.records = records;
                self.last_error = None;
                self.clamp_page();
                debug!(resource = %R::RESOURCE, count = self.records.len(), "list replaced");
                Applied::Replaced(self.records.len())
            }
            Err(err) => {
                warn!(resource = %R::RESOURCE, "list fetch failed: {}", err);
                self.last_error = Some(err.clone());
                Applied::Failed(err)
            }
        }
    }

    /// Fetch and apply in one step.
    ///
    /// # Returns
    /// The number of records now held. After [`ListView::close`] the fetched
    /// result is discarded and this is the count the view already had.
    ///
    /// # Errors
    /// Returns the fetch error; previously loaded records stay in place.
    pub async fn refresh(&mut self) -> Result<usize, AppError> {
        let fetched = self.start_fetch().await;
        match self.apply(fetched) {
            Applied::Replaced(count) => Ok(count),
            Applied::Failed(err) => Err(err),
            Applied::Stale => Ok(self.records.len()),
        }
    }

    /// Drain pending change notices.
    ///
    /// # Returns
    /// `true` when at least one notice was pending.
    pub fn take_invalidations(&self) -> bool {
        let mut pending = false;
        while self.invalidations.try_recv().is_ok() {
            pending = true;
        }
        pending
    }

    /// Refetch if a mutation touched this resource since the last check.
    ///
    /// # Returns
    /// `true` when a refetch ran.
    ///
    /// # Errors
    /// Returns the refetch error.
    pub async fn sync(&mut self) -> Result<bool, AppError> {
        if !self.take_invalidations() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Stop applying results of outstanding fetches.
    pub fn close(&self) {
        self.tracker.cancel();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.query.search_term = term.into();
        self.query.page = 1;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.query.filter = filter;
        self.query.page = 1;
    }

    /// Records matching the current search and filter, in server order.
    pub fn filtered(&self) -> Vec<&R> {
        filter_records(&self.records, &self.query)
    }

    pub fn pager(&self) -> Paginator {
        Paginator::new(self.filtered().len(), self.query.page)
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&R> {
        let filtered = self.filtered();
        let pager = Paginator::new(filtered.len(), self.query.page);
        pager.window(&filtered).to_vec()
    }

    /// Dropdown values present in the loaded records.
    pub fn filter_options(&self) -> Vec<String> {
        filter_options(&self.records)
    }

    fn navigate(&mut self, step: impl FnOnce(&mut Paginator)) {
        let mut pager = self.pager();
        step(&mut pager);
        self.query.page = pager.page();
    }

    fn clamp_page(&mut self) {
        self.navigate(|_| {});
    }

    pub fn first_page(&mut self) {
        self.navigate(Paginator::first);
    }

    pub fn last_page(&mut self) {
        self.navigate(Paginator::last);
    }

    pub fn next_page(&mut self) {
        self.navigate(Paginator::next);
    }

    pub fn previous_page(&mut self) {
        self.navigate(Paginator::previous);
    }

    pub fn jump_to(&mut self, page: usize) {
        self.navigate(|pager| pager.jump_to(page));
    }
}

impl<R: Record, B: Backend> Drop for ListView<R, B> {
    fn drop(&mut self) {
        self.tracker.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{students_body, StubBackend};
    use finesdesk_core::models::{Fine, Student};
    use finesdesk_core::{Change, Resource};
    use serde_json::json;

    fn view(backend: &StubBackend, bus: &InvalidationBus) -> ListView<Student, StubBackend> {
        ListView::new(backend.clone(), bus)
    }

    #[tokio::test]
    async fn refresh_loads_and_pages_records() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(23));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);

        assert_eq!(list.refresh().await, Ok(23));
        assert_eq!(list.page_rows().len(), 10);
        assert_eq!(list.pager().total_pages(), 3);
        list.last_page();
        assert_eq!(list.query().page, 3);
        assert_eq!(list.page_rows().len(), 3);
        assert_eq!(list.pager().summary(), "Showing 21 to 23 of 23 items.");
    }

    #[tokio::test]
    async fn search_and_filter_reset_to_first_page() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(30));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);
        list.refresh().await.expect("refresh");

        list.jump_to(3);
        list.set_search("reyes");
        assert_eq!(list.query().page, 1);
        assert_eq!(list.filtered().len(), 15);

        list.next_page();
        list.set_filter(Filter::parse("2nd Year"));
        assert_eq!(list.query().page, 1);
        assert!(list
            .filtered()
            .iter()
            .all(|s| s.year_level == "2nd Year" && s.last_name == "Reyes"));
        assert_eq!(list.filter_options(), vec!["1st Year", "2nd Year"]);
    }

    #[tokio::test]
    async fn refetch_clamps_page_to_new_range() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(25));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);
        list.refresh().await.expect("refresh");
        list.jump_to(3);

        backend.set_list(Resource::Students, students_body(12));
        list.refresh().await.expect("refresh");
        assert_eq!(list.query().page, 2);
        assert_eq!(list.page_rows().len(), 2);
    }

    #[tokio::test]
    async fn late_response_from_superseded_fetch_is_discarded() {
        let backend = StubBackend::default();
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);

        backend.set_list(Resource::Students, students_body(3));
        let first = list.start_fetch();
        backend.set_list(Resource::Students, students_body(5));
        let second = list.start_fetch();

        let second = second.await;
        let first = first.await;
        assert_eq!(list.apply(second), Applied::Replaced(5));
        assert_eq!(list.apply(first), Applied::Stale);
        assert_eq!(list.records().len(), 5);
    }

    #[tokio::test]
    async fn closed_view_ignores_results() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(4));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);

        let pending = list.start_fetch();
        list.close();
        assert_eq!(list.apply(pending.await), Applied::Stale);
        assert!(list.records().is_empty());
    }

    #[tokio::test]
    async fn refresh_after_close_keeps_the_previous_count() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(4));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);
        assert_eq!(list.refresh().await, Ok(4));

        list.close();
        backend.set_list(Resource::Students, students_body(9));
        assert_eq!(list.refresh().await, Ok(4));
        assert_eq!(list.records().len(), 4);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_records() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(4));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);
        list.refresh().await.expect("refresh");

        backend.set_offline(true);
        let err = list.refresh().await.expect_err("offline");
        assert!(matches!(err, AppError::Transport(_)));
        assert_eq!(list.records().len(), 4);
        assert_eq!(list.last_error(), Some(&err));

        backend.set_offline(false);
        list.refresh().await.expect("refresh");
        assert_eq!(list.last_error(), None);
    }

    #[tokio::test]
    async fn sync_refetches_only_after_own_resource_changes() {
        let backend = StubBackend::default();
        backend.set_list(Resource::Students, students_body(2));
        let bus = InvalidationBus::new();
        let mut list = view(&backend, &bus);
        list.refresh().await.expect("refresh");
        assert_eq!(backend.list_calls(), 1);

        bus.publish(Invalidation {
            resource: Resource::Events,
            change: Change::Deleted {
                id: "1".to_string(),
            },
        });
        assert_eq!(list.sync().await, Ok(false));

        backend.set_list(Resource::Students, students_body(1));
        bus.publish(Invalidation {
            resource: Resource::Students,
            change: Change::Deleted {
                id: "2".to_string(),
            },
        });
        bus.publish(Invalidation {
            resource: Resource::Students,
            change: Change::Created { id: None },
        });
        assert_eq!(list.sync().await, Ok(true));
        assert_eq!(backend.list_calls(), 2);
        assert!(list.records().iter().all(|s| s.id != 2));
    }

    #[tokio::test]
    async fn scope_limits_applied_records() {
        let backend = StubBackend::default();
        backend.set_list(
            Resource::Fines,
            json!({ "success": true, "data": [
                { "id": 1, "student_id": "2024-0001", "student_name": "A", "violation": "Late",
                  "amount": 20.0, "status": "unpaid", "issued_on": "2024-09-02" },
                { "id": 2, "student_id": "2024-0002", "student_name": "B", "violation": "Late",
                  "amount": 20.0, "status": "paid", "issued_on": "2024-09-03" }
            ]}),
        );
        let bus = InvalidationBus::new();
        let mut list: ListView<Fine, StubBackend> = ListView::new(backend.clone(), &bus)
            .with_scope(|fine: &Fine| fine.student_id == "2024-0002");
        assert_eq!(list.refresh().await, Ok(1));
        assert_eq!(list.records()[0].id, 2);
    }
}
