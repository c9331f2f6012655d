//! Shared fixtures for unit tests: a throwaway axum API and wiring helpers.

use std::sync::{Arc, Mutex};

use axum::Router;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::events::SessionEvents;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::supervisor::Navigator;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_api(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let addr = listener.local_addr().expect("mock api addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock api serve");
    });
    format!("http://{addr}")
}

/// Base URL of a port nobody is listening on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}")
}

pub struct Harness {
    pub storage: Arc<MemoryStore>,
    pub events: SessionEvents,
    pub api: ApiClient,
}

pub fn harness(base_url: &str) -> Harness {
    let config = ClientConfig::new(base_url).expect("valid base url");
    let storage = Arc::new(MemoryStore::new());
    let events = SessionEvents::new();
    let shared: Arc<dyn KeyValueStore> = storage.clone();
    let api = ApiClient::new(&config, shared, events.clone()).expect("api client");
    Harness { storage, events, api }
}

/// Navigator that records every requested path.
#[derive(Default)]
pub struct RecordingNavigator {
    pub visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().expect("navigator mutex").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().expect("navigator mutex").push(path.to_owned());
    }
}
