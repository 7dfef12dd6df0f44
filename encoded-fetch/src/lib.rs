//! Named-slot fetch coordination for ENCODE portal views
//!
//! A view declares the remote resources it needs as named [`SlotSpec`]s.
//! The [`FetchCoordinator`] fetches them concurrently, cancels requests that
//! are superseded or whose slot goes away, and reports one aggregate
//! [`SessionState`]. Failed requests become [`ErrorPayload`] values with an
//! `@type` of `["AjaxError", "Error"]`, so an error view can be picked from a
//! view registry like any other object.
//!
//! ```no_run
//! use encoded_fetch::{FetchCoordinator, HttpClient, SessionState, SlotSpec};
//!
//! # async fn run() -> encoded_fetch::Result<()> {
//! let coordinator = FetchCoordinator::new(HttpClient::new()?);
//! coordinator.update(vec![
//!     SlotSpec::json("context", "https://www.encodeproject.org/experiments/ENCSR000AKS/"),
//!     SlotSpec::json("files", "https://www.encodeproject.org/search/?type=File"),
//! ]);
//!
//! if coordinator.settled().await == SessionState::Ready {
//!     let results = coordinator.results();
//!     println!("{}", results.to_json());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`FetchSession`] is the same state machine without any I/O, for callers
//! that drive requests themselves.

pub mod client;
pub mod coordinator;
pub mod error;
pub mod session;
pub mod types;

pub use client::{HttpClient, HttpFetcher};
pub use coordinator::FetchCoordinator;
pub use error::{FetchError, Result};
pub use session::{FetchSession, FetchTicket, SessionState};
pub use types::{
    ErrorPayload, ExpectedType, FetchResponse, FetchedResults, FetchedValue, SlotSpec,
    ERROR_TYPE, ERROR_TYPES,
};
