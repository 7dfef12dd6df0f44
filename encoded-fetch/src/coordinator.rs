//! Drives a [`FetchSession`] on the tokio runtime
//!
//! The coordinator owns the session behind a mutex that is never held across
//! an `.await`. Each ticket becomes one spawned task that races the fetch
//! against the ticket's cancellation token; whatever it gets back is applied
//! through [`FetchSession::resolve_response`], which discards it if the
//! ticket was superseded in the meantime. State changes are published on a
//! `watch` channel so the owning view can re-render.

use crate::client::HttpFetcher;
use crate::session::{FetchSession, FetchTicket, SessionState};
use crate::types::{ErrorPayload, FetchResponse, FetchedResults, FetchedValue, SlotSpec};
use encoded_common::{ErrorChainExt, Pretty};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Shared {
    session: Mutex<FetchSession>,
    state: watch::Sender<SessionState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FetchSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, session: &FetchSession) {
        let state = session.state();
        let changed = self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed && state.is_settled() {
            info!(?state, slots = session.results().len(), "fetch session settled");
        }
    }
}

/// Fetches a view's declared slots concurrently and reports when they are
/// all in.
///
/// Dropping the coordinator cancels every outstanding request.
pub struct FetchCoordinator<F: HttpFetcher> {
    fetcher: Arc<F>,
    shared: Arc<Shared>,
}

impl<F: HttpFetcher> FetchCoordinator<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_session(fetcher, FetchSession::new())
    }

    /// Coordinator around a pre-configured session, e.g. one with
    /// `ignore_errors` set.
    pub fn with_session(fetcher: F, session: FetchSession) -> Self {
        let (state, _) = watch::channel(session.state());
        Self {
            fetcher: Arc::new(fetcher),
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                state,
            }),
        }
    }

    /// Replace the declared slot set.
    ///
    /// Slots missing from `specs` are unmounted, changed slots are re-fetched
    /// and unchanged slots keep their values. Outside a tokio runtime each
    /// request resolves to an error payload instead of being fetched.
    pub fn update(&self, specs: Vec<SlotSpec>) {
        debug!("declared slots: {}", Pretty(&specs));
        let tickets = {
            let mut session = self.shared.lock();

            let declared: HashSet<&str> = specs.iter().map(|spec| spec.name.as_str()).collect();
            let stale: Vec<String> = session
                .slot_names()
                .filter(|name| !declared.contains(name))
                .map(str::to_string)
                .collect();
            for name in &stale {
                session.unmount(name);
            }

            let mut tickets: Vec<FetchTicket> = specs
                .into_iter()
                .filter_map(|spec| session.declare(spec))
                .collect();
            tickets.extend(session.issue_pending());

            self.shared.publish(&session);
            tickets
        };

        debug!(requests = tickets.len(), "slots updated");
        for ticket in tickets {
            self.spawn(ticket);
        }
    }

    /// Unmount one slot, cancelling its request.
    pub fn unmount(&self, name: &str) -> bool {
        let tickets = {
            let mut session = self.shared.lock();
            if !session.unmount(name) {
                return false;
            }
            let tickets = session.issue_pending();
            self.shared.publish(&session);
            tickets
        };
        for ticket in tickets {
            self.spawn(ticket);
        }
        true
    }

    /// Cancel every request and forget every slot.
    pub fn shutdown(&self) {
        let mut session = self.shared.lock();
        session.clear();
        self.shared.publish(&session);
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    pub fn results(&self) -> FetchedResults {
        self.shared.lock().results()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Wait until nothing is loading, then return the state reached.
    pub async fn settled(&self) -> SessionState {
        let mut receiver = self.shared.state.subscribe();
        let settled = match receiver.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }

    fn spawn(&self, ticket: FetchTicket) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(slot = %ticket.name, url = %ticket.url, "no tokio runtime; fetch not started");
            let payload = ErrorPayload::new(
                "No async runtime",
                None,
                Some(format!("{} was requested outside a tokio runtime", ticket.url)),
            );
            let mut session = self.shared.lock();
            if session.resolve(&ticket, FetchedValue::Error(payload)) {
                self.shared.publish(&session);
            }
            return;
        };
        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.shared);

        runtime.spawn(async move {
            let token = ticket.token().clone();
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!(slot = %ticket.name, request = ticket.id, "fetch abandoned");
                    return;
                }
                outcome = fetcher.fetch(&ticket.url, ticket.expected) => outcome,
            };

            let response = outcome.unwrap_or_else(|err| {
                warn!(
                    slot = %ticket.name,
                    url = %ticket.url,
                    error = %err.error_chain(),
                    "fetch failed"
                );
                FetchResponse::from(FetchedValue::Error(err.to_payload()))
            });

            let mut session = shared.lock();
            if session.resolve_response(&ticket, response) {
                shared.publish(&session);
            }
        });
    }
}

impl<F: HttpFetcher> Drop for FetchCoordinator<F> {
    fn drop(&mut self) {
        self.shared.lock().clear();
    }
}
