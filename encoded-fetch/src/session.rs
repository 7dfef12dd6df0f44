//! Fetch session state machine
//!
//! [`FetchSession`] holds the slots one view has declared and decides which
//! requests to issue and which responses to keep. It performs no I/O: each
//! request it wants is handed out as a [`FetchTicket`], and the response comes
//! back through [`FetchSession::resolve`]. A ticket is honoured only while it
//! is the slot's current request and its token has not been cancelled, so a
//! superseded or unmounted request can never change the session.
//!
//! While the session is [`SessionState::Failed`], outstanding requests of the
//! other slots are cancelled and new declarations are recorded without being
//! issued. They are issued by [`FetchSession::issue_pending`] once no error
//! remains.

use crate::types::{ExpectedType, FetchResponse, FetchedResults, FetchedValue, SlotSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Aggregate state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// No slots declared
    Idle,
    /// At least one active slot has no value yet
    Loading,
    /// Every active slot has a value and none is an error
    Ready,
    /// At least one slot holds an error
    Failed,
}

impl SessionState {
    /// Whether there is nothing left to wait for.
    pub fn is_settled(self) -> bool {
        !matches!(self, SessionState::Loading)
    }
}

/// One request the session wants issued.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub expected: ExpectedType,
    token: CancellationToken,
}

impl FetchTicket {
    /// Cancelled when the request is superseded or its slot is unmounted.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    token: CancellationToken,
}

#[derive(Debug)]
struct Slot {
    spec: SlotSpec,
    in_flight: Option<InFlight>,
    value: Option<FetchedValue>,
    etag: Option<String>,
}

impl Slot {
    fn new(spec: SlotSpec) -> Self {
        Self {
            spec,
            in_flight: None,
            value: None,
            etag: None,
        }
    }

    fn cancel(&mut self) {
        if let Some(request) = self.in_flight.take() {
            trace!(slot = %self.spec.name, request = request.id, "request cancelled");
            request.token.cancel();
        }
    }

    fn needs_request(&self) -> bool {
        self.spec.is_active() && self.value.is_none() && self.in_flight.is_none()
    }
}

/// Slots declared by one view, with their requests and values.
#[derive(Debug, Default)]
pub struct FetchSession {
    slots: IndexMap<String, Slot>,
    next_id: u64,
    ignore_errors: bool,
}

impl FetchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// With `ignore_errors`, error values are kept as ordinary results and
    /// never move the session to [`SessionState::Failed`].
    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }

    /// Declare or re-declare a slot.
    ///
    /// An unchanged declaration keeps the slot's value and any request in
    /// flight. A changed URL or expected type cancels the slot's request,
    /// drops its value and returns a ticket for the new request, unless the
    /// slot became inactive or the session is failed.
    pub fn declare(&mut self, spec: SlotSpec) -> Option<FetchTicket> {
        let name = spec.name.clone();
        match self.slots.get_mut(&name) {
            Some(slot) if slot.spec.url == spec.url && slot.spec.expected == spec.expected => {
                slot.spec.etag_name = spec.etag_name;
                return None;
            }
            Some(slot) => {
                debug!(slot = %name, url = ?spec.url, "slot changed");
                slot.cancel();
                slot.value = None;
                slot.etag = None;
                slot.spec = spec;
            }
            None => {
                debug!(slot = %name, url = ?spec.url, "slot declared");
                self.slots.insert(name.clone(), Slot::new(spec));
            }
        }

        if self.has_error() {
            trace!(slot = %name, "session failed; request deferred");
            return None;
        }
        self.issue(&name)
    }

    /// Remove a slot, cancelling its request. Returns whether it existed.
    pub fn unmount(&mut self, name: &str) -> bool {
        match self.slots.shift_remove(name) {
            Some(mut slot) => {
                slot.cancel();
                debug!(slot = %name, "slot unmounted");
                true
            }
            None => false,
        }
    }

    /// Cancel every request and forget every slot.
    pub fn clear(&mut self) {
        for slot in self.slots.values_mut() {
            slot.cancel();
        }
        self.slots.clear();
    }

    /// Tickets for active slots that have neither a value nor a request,
    /// provided the session is not failed.
    pub fn issue_pending(&mut self) -> Vec<FetchTicket> {
        if self.has_error() {
            return Vec::new();
        }
        let names: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.needs_request())
            .map(|(name, _)| name.clone())
            .collect();
        names.iter().filter_map(|name| self.issue(name)).collect()
    }

    /// Apply a response value. See [`resolve_response`](Self::resolve_response).
    pub fn resolve(&mut self, ticket: &FetchTicket, value: FetchedValue) -> bool {
        self.resolve_response(ticket, FetchResponse::from(value))
    }

    /// Store `response` in the ticket's slot if the ticket is still current.
    /// Returns whether the session changed.
    pub fn resolve_response(&mut self, ticket: &FetchTicket, response: FetchResponse) -> bool {
        if ticket.is_cancelled() {
            trace!(slot = %ticket.name, request = ticket.id, "late response discarded");
            return false;
        }
        let Some(slot) = self.slots.get_mut(&ticket.name) else {
            return false;
        };
        if slot.in_flight.as_ref().map(|r| r.id) != Some(ticket.id) {
            trace!(slot = %ticket.name, request = ticket.id, "stale response discarded");
            return false;
        }

        slot.in_flight = None;
        slot.etag = response.etag;
        let failed = response.value.is_error() && !self.ignore_errors;
        slot.value = Some(response.value);
        debug!(slot = %ticket.name, request = ticket.id, failed, "slot resolved");

        if failed {
            warn!(slot = %ticket.name, url = %ticket.url, "fetch failed; cancelling sibling requests");
            for slot in self.slots.values_mut() {
                slot.cancel();
            }
        }
        true
    }

    pub fn state(&self) -> SessionState {
        if self.slots.is_empty() {
            SessionState::Idle
        } else if self.has_error() {
            SessionState::Failed
        } else if self
            .slots
            .values()
            .any(|slot| slot.spec.is_active() && slot.value.is_none())
        {
            SessionState::Loading
        } else {
            SessionState::Ready
        }
    }

    /// Values of resolved slots by name, plus each configured `ETag` entry.
    ///
    /// An `ETag` entry never shadows a declared slot of the same name.
    pub fn results(&self) -> FetchedResults {
        let mut results = FetchedResults::default();
        for (name, slot) in &self.slots {
            if let Some(value) = &slot.value {
                results.insert(name.clone(), value.clone());
            }
            if let (Some(etag_name), Some(etag)) = (&slot.spec.etag_name, &slot.etag) {
                if self.slots.contains_key(etag_name) {
                    warn!(
                        slot = %name,
                        etag_name = %etag_name,
                        "etag name collides with a declared slot; skipped"
                    );
                    continue;
                }
                results.insert(etag_name.clone(), FetchedValue::Text(etag.clone()));
            }
        }
        results
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Whether the slot has a request outstanding.
    pub fn is_in_flight(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    fn has_error(&self) -> bool {
        !self.ignore_errors
            && self
                .slots
                .values()
                .any(|slot| slot.value.as_ref().is_some_and(FetchedValue::is_error))
    }

    fn issue(&mut self, name: &str) -> Option<FetchTicket> {
        let slot = self.slots.get_mut(name)?;
        let url = slot.spec.url.clone()?;

        self.next_id += 1;
        let id = self.next_id;
        let token = CancellationToken::new();
        slot.in_flight = Some(InFlight {
            id,
            token: token.clone(),
        });
        trace!(slot = %name, request = id, url = %url, "request issued");

        Some(FetchTicket {
            id,
            name: name.to_string(),
            url,
            expected: slot.spec.expected,
            token,
        })
    }
}
