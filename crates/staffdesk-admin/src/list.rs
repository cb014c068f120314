//! Paginated list controller.
//!
//! One [`ListController`] backs one list screen. It owns the query (page,
//! page size, search, sort) and the last applied page. Every fetch is tagged
//! with a [`FetchTicket`] carrying a monotonic sequence number; only the
//! result of the latest ticket is applied, so overlapping requests can finish
//! in any order without an older page overwriting a newer one.
//!
//! Mutators come in two flavours. `set_search`, `set_sort`, `set_page`, and
//! `delete` fetch synchronously through the controller's [`ResourceApi`]. The
//! `*_deferred` variants only change state and hand back the ticket, so the
//! call can run on a [`FetchDispatcher`] while the owner keeps handling input.

#![allow(missing_docs)]

use std::time::{Duration, Instant};

use smol_str::SmolStr;
use staffdesk_client::{RemoteError, ResourceApi};
use staffdesk_model::{
    page_count, EntitySchema, ListQuery, ModelError, PageResult, Record, SortDirection, SortSpec,
};
use tracing::debug;

use crate::dispatch::{Completion, FetchDispatcher};
use crate::error::AdminError;

/// Fetch state of the list screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStatus {
    #[default]
    Idle,
    /// A fetch was issued and its result has not been applied yet.
    Fetching,
    /// The latest fetch failed; the previous rows stay visible.
    Error(RemoteError),
}

/// Identity of one issued fetch: the sequence number plus the query it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: ListQuery,
}

/// What [`ListController::apply`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Rows and total replaced the previous page.
    Applied,
    /// A newer fetch was issued after this one; the result was dropped.
    Stale,
    /// The requested page is past the last page. The controller moved to
    /// `page` and the caller must fetch again.
    Clamped { page: u32 },
    /// The latest fetch failed. The query went back to the one behind the
    /// visible rows.
    Failed(RemoteError),
}

/// List state for one collection.
#[derive(Debug)]
pub struct ListController<A> {
    api: A,
    query: ListQuery,
    /// Query behind the rows on screen; restored when a fetch fails.
    shown: ListQuery,
    page: Option<PageResult>,
    status: ListStatus,
    issued: u64,
}

impl<A: ResourceApi> ListController<A> {
    /// Page 1, no search, server order. Nothing is fetched yet.
    pub fn new(api: A, page_size: u32) -> Self {
        let query = ListQuery::new(page_size);
        Self {
            api,
            shown: query.clone(),
            query,
            page: None,
            status: ListStatus::Idle,
            issued: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.api.schema()
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn is_fetching(&self) -> bool {
        self.status == ListStatus::Fetching
    }

    /// Error of the latest fetch, if it failed.
    pub fn last_error(&self) -> Option<&RemoteError> {
        match &self.status {
            ListStatus::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Last applied page, `None` before the first successful fetch.
    pub fn page_result(&self) -> Option<&PageResult> {
        self.page.as_ref()
    }

    /// Rows of the last applied page.
    pub fn rows(&self) -> &[Record] {
        match &self.page {
            Some(page) => &page.rows,
            None => &[],
        }
    }

    /// Total matching rows, once known.
    pub fn total_count(&self) -> Option<u64> {
        self.page.as_ref().map(|page| page.total_count)
    }

    /// `max(1, ceil(total / page_size))`; 1 until a total is known.
    pub fn max_page(&self) -> u32 {
        self.total_count()
            .map_or(1, |total| page_count(total, self.query.page_size))
    }

    pub fn can_previous(&self) -> bool {
        self.query.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.query.page < self.max_page()
    }

    /// Direction of `column` when it is the active sort column.
    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.query
            .sort
            .as_ref()
            .filter(|sort| sort.field == column)
            .map(|sort| sort.direction)
    }

    /// Issues the next sequence number for the current query.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.status = ListStatus::Fetching;
        FetchTicket {
            seq: self.issued,
            query: self.query.clone(),
        }
    }

    /// Applies the result of `ticket` if it is the latest one issued.
    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<PageResult, RemoteError>,
    ) -> ApplyOutcome {
        if ticket.seq != self.issued {
            debug!(
                entity = self.schema().title,
                seq = ticket.seq,
                latest = self.issued,
                "discarding stale list response"
            );
            return ApplyOutcome::Stale;
        }
        let page = match result {
            Ok(page) => page,
            Err(err) => {
                self.query = self.shown.clone();
                self.status = ListStatus::Error(err.clone());
                return ApplyOutcome::Failed(err);
            }
        };
        let max_page = page.page_count(ticket.query.page_size);
        self.page = Some(page);
        self.status = ListStatus::Idle;
        if ticket.query.page > max_page {
            debug!(
                entity = self.schema().title,
                requested = ticket.query.page,
                max_page,
                "clamping list page"
            );
            self.query.page = max_page;
            self.shown = self.query.clone();
            return ApplyOutcome::Clamped { page: max_page };
        }
        self.shown = ticket.query.clone();
        ApplyOutcome::Applied
    }

    /// Fetches the current query now. A clamp is followed by one more fetch
    /// of the corrected page.
    pub fn refresh(&mut self) -> Result<ApplyOutcome, RemoteError> {
        let mut outcome = self.fetch_now();
        if matches!(outcome, ApplyOutcome::Clamped { .. }) {
            outcome = self.fetch_now();
        }
        match outcome {
            ApplyOutcome::Failed(err) => Err(err),
            outcome => Ok(outcome),
        }
    }

    fn fetch_now(&mut self) -> ApplyOutcome {
        let ticket = self.begin_fetch();
        let result = self.api.list(&ticket.query);
        self.apply(&ticket, result)
    }

    /// Sets the search term and fetches. The page is kept as is; an
    /// out-of-range page is corrected by the clamp.
    pub fn set_search(&mut self, term: &str) -> Result<ApplyOutcome, RemoteError> {
        self.query.search = term.to_string();
        self.refresh()
    }

    pub fn set_search_deferred(&mut self, term: &str) -> FetchTicket {
        self.query.search = term.to_string();
        self.begin_fetch()
    }

    /// Header click on `column`: the active column toggles its direction, a
    /// new column starts ascending.
    pub fn set_sort(&mut self, column: &str) -> Result<ApplyOutcome, AdminError> {
        self.toggle_sort(column)?;
        Ok(self.refresh()?)
    }

    pub fn set_sort_deferred(&mut self, column: &str) -> Result<FetchTicket, AdminError> {
        self.toggle_sort(column)?;
        Ok(self.begin_fetch())
    }

    fn toggle_sort(&mut self, column: &str) -> Result<(), ModelError> {
        let schema = self.schema();
        schema.require_field(column)?;
        if !schema.is_sortable(column) {
            return Err(ModelError::InvalidInput {
                field: SmolStr::new(column),
                message: "column is not sortable".into(),
            });
        }
        let direction = self
            .sort_direction(column)
            .map_or(SortDirection::Ascending, SortDirection::toggled);
        self.query.sort = Some(SortSpec {
            field: SmolStr::new(column),
            direction,
        });
        Ok(())
    }

    /// Moves to page `n` and fetches. Returns `false` without fetching when
    /// `n` is outside `1..=max_page`.
    pub fn set_page(&mut self, n: u32) -> Result<bool, RemoteError> {
        if !self.accepts_page(n) {
            return Ok(false);
        }
        self.query.page = n;
        self.refresh()?;
        Ok(true)
    }

    pub fn set_page_deferred(&mut self, n: u32) -> Option<FetchTicket> {
        if !self.accepts_page(n) {
            return None;
        }
        self.query.page = n;
        Some(self.begin_fetch())
    }

    fn accepts_page(&self, n: u32) -> bool {
        (1..=self.max_page()).contains(&n)
    }

    pub fn next_page(&mut self) -> Result<bool, RemoteError> {
        self.set_page(self.query.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Result<bool, RemoteError> {
        self.set_page(self.query.page.saturating_sub(1))
    }

    /// Deletes `id`, then re-fetches the current page. Nothing is removed
    /// locally; a page emptied by the delete clamps to the new last page.
    pub fn delete(&mut self, id: i64) -> Result<ApplyOutcome, RemoteError> {
        self.api.delete(id)?;
        self.refresh()
    }

    /// Applies every completion the dispatcher has ready and dispatches the
    /// follow-up fetch after a clamp.
    pub fn pump<D>(&mut self, dispatcher: &FetchDispatcher<D>) -> Vec<ApplyOutcome>
    where
        D: ResourceApi + Clone + Send + 'static,
    {
        dispatcher
            .try_completions()
            .into_iter()
            .map(|completion| self.apply_completion(dispatcher, completion))
            .collect()
    }

    /// Blocks until the latest fetch is applied or `timeout` passes.
    /// Returns the last non-stale outcome.
    pub fn settle<D>(
        &mut self,
        dispatcher: &FetchDispatcher<D>,
        timeout: Duration,
    ) -> Option<ApplyOutcome>
    where
        D: ResourceApi + Clone + Send + 'static,
    {
        let deadline = Instant::now() + timeout;
        let mut last = None;
        while self.is_fetching() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            let Some(completion) = dispatcher.wait(remaining) else {
                break;
            };
            let outcome = self.apply_completion(dispatcher, completion);
            if outcome != ApplyOutcome::Stale {
                last = Some(outcome);
            }
        }
        last
    }

    fn apply_completion<D>(
        &mut self,
        dispatcher: &FetchDispatcher<D>,
        completion: Completion,
    ) -> ApplyOutcome
    where
        D: ResourceApi + Clone + Send + 'static,
    {
        let outcome = self.apply(&completion.ticket, completion.result);
        if matches!(outcome, ApplyOutcome::Clamped { .. }) {
            dispatcher.dispatch(self.begin_fetch());
        }
        outcome
    }
}
