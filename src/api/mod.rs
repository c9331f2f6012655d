//! Authenticated HTTP client: the single egress point to the storefront API.
//!
//! DESIGN
//! ======
//! The bearer credential is read from persisted storage on every request,
//! never from a session store instance, so any component holding the client
//! sends whatever credential is current.
//!
//! A 401 purges the persisted session and publishes
//! `SessionEvent::Invalidated`. Navigation is left to subscribers. Other
//! statuses pass through untouched; nothing is retried.
//!
//! TRADE-OFFS
//! ==========
//! The purge does not compare the rejected credential with the persisted
//! one. A 401 for an old token that lands after a fresh login still clears
//! the new session; storage stays the single truth and the user signs in
//! again.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::events::{SessionEvent, SessionEvents};
use crate::storage::{AUTH_TOKEN_KEY, KeyValueStore, purge_session};
pub use types::{ApiError, AuthReply};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    storage: Arc<dyn KeyValueStore>,
    events: SessionEvents,
}

impl ApiClient {
    /// Build a client against `config.base_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, storage: Arc<dyn KeyValueStore>, events: SessionEvents) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config: Arc::new(config.clone()), storage, events })
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current persisted credential. Unreadable storage counts as none.
    fn credential(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "credential read failed; sending unauthenticated");
                None
            }
        }
    }

    // =========================================================================
    // DATA REQUESTS
    // =========================================================================

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx statuses, and undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send::<()>(Method::GET, path, None).await?;
        decode(resp).await
    }

    /// `POST path` with a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx statuses, and undecodable bodies.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(Method::POST, path, Some(body)).await?;
        decode(resp).await
    }

    /// `PUT path` with a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx statuses, and undecodable bodies.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(Method::PUT, path, Some(body)).await?;
        decode(resp).await
    }

    /// `PATCH path` with a JSON body and decode the JSON reply.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx statuses, and undecodable bodies.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(Method::PATCH, path, Some(body)).await?;
        decode(resp).await
    }

    /// `DELETE path`, ignoring any body.
    ///
    /// # Errors
    ///
    /// Network failures and non-2xx statuses.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Issue a request with the bearer credential attached and the 401
    /// interceptor armed. Returns the response only for 2xx statuses.
    ///
    /// # Errors
    ///
    /// Network failures and non-2xx statuses.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let credential = self.credential();
        let mut req = self.http.request(method.clone(), self.config.url(path));
        if let Some(token) = &credential {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), authenticated = credential.is_some(), "api response");

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate(path, credential.is_some());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(resp)
    }

    /// Purge the persisted session after a 401 and announce it.
    ///
    /// A request whose credential was already purged by a concurrent 401
    /// stays quiet; anonymous requests always announce.
    fn invalidate(&self, path: &str, carried_credential: bool) {
        let purged = match purge_session(self.storage.as_ref()) {
            Ok(had_token) => had_token,
            Err(e) => {
                tracing::error!(error = %e, "session purge after 401 failed");
                true
            }
        };

        if purged || !carried_credential {
            tracing::warn!(path, "request unauthorized; session invalidated");
            self.events.emit(SessionEvent::Invalidated {
                path: path.to_owned(),
                status: StatusCode::UNAUTHORIZED.as_u16(),
            });
        } else {
            tracing::debug!(path, "request unauthorized; session already invalidated");
        }
    }

    // =========================================================================
    // AUTH REQUESTS
    // =========================================================================

    /// `POST` to an authentication endpoint without the 401 interceptor.
    /// Rejected credentials must not tear down an existing session.
    ///
    /// # Errors
    ///
    /// Only transport failures; every status is returned in the reply.
    pub async fn authenticate<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<AuthReply, reqwest::Error> {
        let resp = self.http.post(self.config.url(path)).json(body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(AuthReply { status, body })
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
