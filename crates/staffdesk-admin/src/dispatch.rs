//! Background list fetches.

#![allow(missing_docs)]

use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use staffdesk_client::{RemoteError, ResourceApi};
use staffdesk_model::PageResult;
use tracing::debug;

use crate::list::FetchTicket;

/// A finished background fetch.
#[derive(Debug)]
pub struct Completion {
    pub ticket: FetchTicket,
    pub result: Result<PageResult, RemoteError>,
}

/// Runs `list` calls on worker threads and queues their completions.
///
/// Completions arrive in the order the calls finish, not the order they were
/// dispatched; [`crate::ListController::apply`] drops the stale ones.
pub struct FetchDispatcher<A> {
    api: A,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
}

impl<A> FetchDispatcher<A>
where
    A: ResourceApi + Clone + Send + 'static,
{
    pub fn new(api: A) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            api,
            sender,
            receiver,
        }
    }

    /// Starts the fetch for `ticket` on its own thread.
    pub fn dispatch(&self, ticket: FetchTicket) {
        let api = self.api.clone();
        let sender = self.sender.clone();
        debug!(seq = ticket.seq, page = ticket.query.page, "dispatching list fetch");
        thread::spawn(move || {
            let result = api.list(&ticket.query);
            // Fails only once the dispatcher is dropped.
            let _ = sender.send(Completion { ticket, result });
        });
    }

    /// Completions ready now, without blocking.
    pub fn try_completions(&self) -> Vec<Completion> {
        self.receiver.try_iter().collect()
    }

    /// Next completion, waiting at most `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<Completion> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossbeam_channel::bounded;
    use staffdesk_model::schema::EMPLOYEE;
    use staffdesk_model::{EntitySchema, ListQuery, PageMeta, Record};

    use super::*;
    use crate::list::{ApplyOutcome, ListController};

    /// Blocks each page until the test releases it.
    #[derive(Clone)]
    struct GatedEmployees {
        gates: Arc<Vec<(u32, Receiver<()>)>>,
    }

    impl GatedEmployees {
        fn new(pages: &[u32]) -> (Self, Vec<Sender<()>>) {
            let mut gates = Vec::new();
            let mut releases = Vec::new();
            for page in pages {
                let (release, gate) = bounded(1);
                gates.push((*page, gate));
                releases.push(release);
            }
            let api = Self {
                gates: Arc::new(gates),
            };
            (api, releases)
        }
    }

    impl ResourceApi for GatedEmployees {
        fn schema(&self) -> &'static EntitySchema {
            &EMPLOYEE
        }

        fn list(&self, query: &ListQuery) -> Result<PageResult, RemoteError> {
            let gate = self.gates.iter().find(|(page, _)| *page == query.page);
            if let Some((_, gate)) = gate {
                let _ = gate.recv_timeout(Duration::from_secs(5));
            }
            let first = i64::from(query.page - 1) * 10 + 1;
            Ok(PageResult {
                rows: (first..first + 10)
                    .map(|id| Record::new().with("id", id))
                    .collect(),
                total_count: 30,
                meta: PageMeta::default(),
            })
        }

        fn get(&self, _id: i64) -> Result<Record, RemoteError> {
            Err(RemoteError::from_status(404, ""))
        }

        fn create(&self, fields: &Record) -> Result<Record, RemoteError> {
            Ok(fields.clone())
        }

        fn update(&self, _id: i64, fields: &Record) -> Result<Record, RemoteError> {
            Ok(fields.clone())
        }

        fn delete(&self, _id: i64) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[test]
    fn late_response_for_an_older_page_is_discarded() {
        let (api, releases) = GatedEmployees::new(&[1, 2]);
        let dispatcher = FetchDispatcher::new(api.clone());
        let mut list = ListController::new(api, 10);

        let first = list.begin_fetch();
        dispatcher.dispatch(first);
        // Page 2 is only navigable once a total is known.
        let _ = releases[0].send(());
        assert_eq!(
            list.settle(&dispatcher, Duration::from_secs(5)),
            Some(ApplyOutcome::Applied)
        );

        let page_one = list.set_page_deferred(1).expect("page 1");
        let page_two = list.set_page_deferred(2).expect("page 2");
        dispatcher.dispatch(page_one);
        dispatcher.dispatch(page_two);

        let _ = releases[1].send(());
        assert_eq!(
            list.settle(&dispatcher, Duration::from_secs(5)),
            Some(ApplyOutcome::Applied)
        );
        assert_eq!(list.rows().first().and_then(Record::id), Some(11));

        let _ = releases[0].send(());
        let late = dispatcher
            .wait(Duration::from_secs(5))
            .expect("page 1 completion");
        assert_eq!(late.ticket.query.page, 1);
        assert_eq!(list.apply(&late.ticket, late.result), ApplyOutcome::Stale);
        assert_eq!(list.rows().first().and_then(Record::id), Some(11));
        assert_eq!(list.query().page, 2);
    }

    #[test]
    fn pump_drains_ready_completions() {
        let (api, _releases) = GatedEmployees::new(&[]);
        let dispatcher = FetchDispatcher::new(api.clone());
        let mut list = ListController::new(api, 10);
        dispatcher.dispatch(list.begin_fetch());

        let mut outcomes = Vec::new();
        for _ in 0..500 {
            outcomes.extend(list.pump(&dispatcher));
            if !list.is_fetching() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(outcomes, [ApplyOutcome::Applied]);
        assert_eq!(list.rows().len(), 10);
    }
}
