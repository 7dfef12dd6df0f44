//! Coordinator behaviour with responses released by the test.

use async_trait::async_trait;
use encoded_fetch::{
    ExpectedType, FetchCoordinator, FetchError, FetchResponse, FetchSession, FetchedValue,
    HttpFetcher, SessionState, SlotSpec,
};
use encoded_views::{SubKey, ViewRegistry};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

type Reply = encoded_fetch::Result<FetchResponse>;

/// Fetcher whose requests stay pending until the test answers them.
#[derive(Clone, Default)]
struct ManualFetcher {
    waiting: Arc<Mutex<HashMap<String, oneshot::Sender<Reply>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl HttpFetcher for ManualFetcher {
    async fn fetch(&self, url: &str, _expected: ExpectedType) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.waiting.lock().unwrap().insert(url.to_string(), tx);
        self.calls.lock().unwrap().push(url.to_string());
        rx.await.unwrap_or_else(|_| {
            Err(FetchError::Parse {
                url: url.to_string(),
                message: "test dropped the request".into(),
            })
        })
    }
}

impl ManualFetcher {
    async fn wait_for_request(&self, url: &str) {
        within(async {
            while !self.waiting.lock().unwrap().contains_key(url) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
    }

    /// Answer the pending request for `url`; false if nobody is listening.
    async fn respond(&self, url: &str, reply: Reply) -> bool {
        self.wait_for_request(url).await;
        let tx = self.waiting.lock().unwrap().remove(url).unwrap();
        tx.send(reply).is_ok()
    }

    async fn respond_json(&self, url: &str, value: serde_json::Value) -> bool {
        self.respond(url, Ok(FetchResponse::from(FetchedValue::Json(value))))
            .await
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

/// Give spawned tasks a chance to apply anything they still hold.
async fn let_tasks_run() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn superseded_request_never_overwrites_slot() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::json("context", "/first/")]);
    fetcher.wait_for_request("/first/").await;
    coordinator.update(vec![SlotSpec::json("context", "/second/")]);

    fetcher.respond_json("/second/", json!({"from": "second"})).await;
    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);

    fetcher.respond_json("/first/", json!({"from": "first"})).await;
    let_tasks_run().await;

    assert_eq!(
        coordinator.results().get("context"),
        Some(&FetchedValue::Json(json!({"from": "second"})))
    );
    assert_eq!(coordinator.state(), SessionState::Ready);
}

#[tokio::test]
async fn loading_until_all_slots_resolve() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());
    let mut states = coordinator.subscribe();

    coordinator.update(vec![
        SlotSpec::json("experiment", "/experiments/ENCSR000AKS/"),
        SlotSpec::json("files", "/search/?type=File"),
    ]);
    assert_eq!(coordinator.state(), SessionState::Loading);

    // Both requests are issued before either is answered.
    fetcher.wait_for_request("/experiments/ENCSR000AKS/").await;
    fetcher.wait_for_request("/search/?type=File").await;

    fetcher
        .respond_json("/experiments/ENCSR000AKS/", json!({"accession": "ENCSR000AKS"}))
        .await;
    let_tasks_run().await;
    assert_eq!(coordinator.state(), SessionState::Loading);
    assert!(coordinator.results().contains("experiment"));

    fetcher
        .respond_json("/search/?type=File", json!({"@graph": []}))
        .await;
    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);

    within(states.wait_for(|state| *state == SessionState::Ready))
        .await
        .unwrap();
    assert_eq!(coordinator.results().len(), 2);
}

#[tokio::test]
async fn one_error_fails_the_session() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![
        SlotSpec::json("experiment", "/experiments/ENCSR000AKS/"),
        SlotSpec::json("biosample", "/biosamples/ENCBS000AAA/"),
    ]);

    fetcher
        .respond_json("/experiments/ENCSR000AKS/", json!({"accession": "ENCSR000AKS"}))
        .await;
    fetcher
        .respond(
            "/biosamples/ENCBS000AAA/",
            Err(FetchError::Status {
                url: "/biosamples/ENCBS000AAA/".into(),
                status: 403,
                reason: Some("Forbidden"),
            }),
        )
        .await;

    assert_eq!(within(coordinator.settled()).await, SessionState::Failed);

    let results = coordinator.results();
    let (name, value) = results.error().unwrap();
    assert_eq!(name, "biosample");
    let payload = value.as_error().unwrap();
    assert_eq!(payload.code, Some(403));
    assert_eq!(payload.title, "403 Forbidden");
    assert_eq!(payload.status, "error");

    // The error payload dispatches to the error view like any other object.
    let mut content = ViewRegistry::new("content");
    content.register("item view", "Item", SubKey::Default);
    content.register("error view", "Error", SubKey::Default);
    assert_eq!(content.lookup(value, SubKey::Default), Some(&"error view"));
}

#[tokio::test]
async fn error_cancels_siblings_still_loading() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::json("a", "/a/"), SlotSpec::json("b", "/b/")]);
    fetcher.wait_for_request("/b/").await;

    fetcher
        .respond_json("/a/", json!({"@type": ["HTTPNotFound", "Error"]}))
        .await;
    assert_eq!(within(coordinator.settled()).await, SessionState::Failed);

    fetcher.respond_json("/b/", json!({"late": true})).await;
    let_tasks_run().await;
    assert!(!coordinator.results().contains("b"));
    assert_eq!(coordinator.state(), SessionState::Failed);
}

#[tokio::test]
async fn ignore_errors_hands_over_error_values() {
    let fetcher = ManualFetcher::default();
    let session = FetchSession::new().with_ignore_errors(true);
    let coordinator = FetchCoordinator::with_session(fetcher.clone(), session);

    coordinator.update(vec![SlotSpec::json("a", "/a/"), SlotSpec::json("b", "/b/")]);
    fetcher
        .respond(
            "/a/",
            Err(FetchError::Parse {
                url: "/a/".into(),
                message: "EOF".into(),
            }),
        )
        .await;
    fetcher.respond_json("/b/", json!({})).await;

    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);
    assert!(coordinator.results().get("a").unwrap().is_error());
}

#[tokio::test]
async fn unmounted_slot_ignores_late_response() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::json("a", "/a/"), SlotSpec::json("b", "/b/")]);
    fetcher.wait_for_request("/b/").await;

    coordinator.update(vec![SlotSpec::json("a", "/a/")]);
    fetcher.respond_json("/b/", json!({"late": true})).await;
    fetcher.respond_json("/a/", json!({"ok": true})).await;

    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);
    let_tasks_run().await;
    let results = coordinator.results();
    assert!(!results.contains("b"));
    assert_eq!(results.len(), 1);

    // `a` was not re-requested by the second update.
    assert_eq!(fetcher.calls().iter().filter(|u| u.as_str() == "/a/").count(), 1);
}

#[tokio::test]
async fn unmount_single_slot() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::json("a", "/a/"), SlotSpec::json("b", "/b/")]);
    fetcher.wait_for_request("/b/").await;

    assert!(coordinator.unmount("b"));
    assert!(!coordinator.unmount("b"));
    fetcher.respond_json("/a/", json!({})).await;

    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);
}

#[tokio::test]
async fn shutdown_discards_everything() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::json("a", "/a/")]);
    fetcher.wait_for_request("/a/").await;

    coordinator.shutdown();
    assert_eq!(coordinator.state(), SessionState::Idle);

    fetcher.respond_json("/a/", json!({})).await;
    let_tasks_run().await;
    assert!(coordinator.results().is_empty());
    assert_eq!(coordinator.state(), SessionState::Idle);
}

#[tokio::test]
async fn inactive_slots_do_not_block_readiness() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::inactive("later")]);
    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);
    assert!(fetcher.calls().is_empty());

    coordinator.update(vec![SlotSpec::json("later", "/later/")]);
    assert_eq!(coordinator.state(), SessionState::Loading);
    fetcher.respond_json("/later/", json!({})).await;
    assert_eq!(within(coordinator.settled()).await, SessionState::Ready);
}

#[test]
fn update_outside_runtime_fails_instead_of_panicking() {
    let fetcher = ManualFetcher::default();
    let coordinator = FetchCoordinator::new(fetcher.clone());

    coordinator.update(vec![SlotSpec::json("a", "/a/")]);

    assert_eq!(coordinator.state(), SessionState::Failed);
    let results = coordinator.results();
    let payload = results.get("a").unwrap().as_error().unwrap();
    assert_eq!(payload.title, "No async runtime");
    assert!(fetcher.calls().is_empty());
}
