//! # Remote Document Store Client
//!
//! HTTPS client for the hosted realtime database backing the shared
//! collections.
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Store Protocol                              │
//! │                                                                         │
//! │  Read      GET  {database_url}/{key}.json        → JSON value | null   │
//! │  Write     PUT  {database_url}/{key}.json        whole-value replace   │
//! │  Subscribe GET  {database_url}/{key}.json                              │
//! │            Accept: text/event-stream             put/patch frames      │
//! │                                                                         │
//! │  auth={api_key} is appended when an API key is configured.             │
//! │  401/403 → permission denied → the store drops to local-only mode.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Listener Lifecycle
//! One background task per subscribed collection. A broken stream
//! reconnects with exponential backoff; a `cancel`/`auth_revoked` frame or
//! a 401/403 ends the task after notifying the store, which then disables
//! remote mode for the rest of the session.

use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RemoteSettings;
use crate::error::{StoreError, StoreResult};
use crate::sse::{EventStreamParser, ServerEvent};

/// Fallback reconnect delay if the backoff policy ever runs dry.
const FALLBACK_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// An update pushed from a collection listener to the store.
#[derive(Debug)]
pub enum ListenerUpdate {
    /// The subscribed key has a (possibly unchanged) new value.
    Value { key: String, value: Value },

    /// The server refused the subscription; remote mode must end.
    PermissionDenied { key: String },
}

/// Client for the remote document store.
#[derive(Debug)]
pub struct RemoteStore {
    client: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

impl RemoteStore {
    /// Builds a client from the remote settings.
    ///
    /// Fails with [`StoreError::RemoteUnavailable`] when no database URL is
    /// configured, and with [`StoreError::InvalidConfig`] when the URL does
    /// not parse. Either way the caller falls back to local-only mode.
    pub fn new(settings: &RemoteSettings) -> StoreResult<Self> {
        let raw = settings
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                StoreError::RemoteUnavailable("no database URL configured".to_string())
            })?;

        // Validate eagerly so a bad URL is a startup fallback, not a
        // per-request surprise.
        Url::parse(raw)?;

        Ok(RemoteStore {
            client: reqwest::Client::new(),
            base: raw.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn key_url(&self, key: &str) -> StoreResult<Url> {
        let mut url = Url::parse(&format!("{}/{}.json", self.base, key))?;
        if let Some(api_key) = &self.api_key {
            url.query_pairs_mut().append_pair("auth", api_key);
        }
        Ok(url)
    }

    /// Fetches the whole value stored under a key (`null` when absent).
    pub async fn fetch(&self, key: &str) -> StoreResult<Value> {
        let response = self.client.get(self.key_url(key)?).send().await?;
        let response = check_status(key, response)?;
        Ok(response.json().await?)
    }

    /// Replaces the whole value stored under a key.
    pub async fn put(&self, key: &str, value: &Value) -> StoreResult<()> {
        let response = self
            .client
            .put(self.key_url(key)?)
            .json(value)
            .send()
            .await?;
        check_status(key, response)?;
        Ok(())
    }

    /// Spawns the listener task for one collection key.
    ///
    /// The task runs until the update channel closes, the server revokes
    /// the subscription, or a permission error occurs.
    pub fn spawn_listener(
        self: &Arc<Self>,
        key: &str,
        tx: mpsc::Sender<ListenerUpdate>,
    ) -> JoinHandle<()> {
        let remote = Arc::clone(self);
        let key = key.to_string();
        tokio::spawn(async move {
            remote.listen(key, tx).await;
        })
    }

    async fn listen(self: Arc<Self>, key: String, tx: mpsc::Sender<ListenerUpdate>) {
        let mut policy = ExponentialBackoff {
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        };

        info!(key, "Subscribing to remote collection");

        loop {
            if tx.is_closed() {
                return;
            }

            match self.stream_once(&key, &tx, &mut policy).await {
                // Channel closed mid-stream: the store is gone.
                Ok(()) => return,
                Err(err) if err.is_permission_denied() => {
                    warn!(key, error = %err, "Remote subscription revoked");
                    let _ = tx
                        .send(ListenerUpdate::PermissionDenied { key: key.clone() })
                        .await;
                    return;
                }
                Err(err) => {
                    debug!(key, error = %err, "Remote stream interrupted, will reconnect");
                }
            }

            let delay = policy.next_backoff().unwrap_or(FALLBACK_RECONNECT_DELAY);
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs one subscription stream to completion.
    ///
    /// Returns `Ok(())` only when the update channel closed (the listener
    /// should stop); every other exit is an error the caller classifies.
    async fn stream_once(
        &self,
        key: &str,
        tx: &mpsc::Sender<ListenerUpdate>,
        policy: &mut ExponentialBackoff,
    ) -> StoreResult<()> {
        let response = self
            .client
            .get(self.key_url(key)?)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = check_status(key, response)?;

        let mut parser = EventStreamParser::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for event in parser.push(&chunk)? {
                match event {
                    ServerEvent::Put { path, data } if path == "/" => {
                        policy.reset();
                        if self.forward(tx, key, data).await.is_err() {
                            return Ok(());
                        }
                    }
                    ServerEvent::Put { .. } | ServerEvent::Patch { .. } => {
                        // Sub-path update: the store compares whole values,
                        // so refetch the key instead of splicing paths.
                        policy.reset();
                        let value = self.fetch(key).await?;
                        if self.forward(tx, key, value).await.is_err() {
                            return Ok(());
                        }
                    }
                    ServerEvent::KeepAlive => {}
                    ServerEvent::Cancel | ServerEvent::AuthRevoked => {
                        return Err(StoreError::PermissionDenied(format!(
                            "subscription to '{}' cancelled by the server",
                            key
                        )));
                    }
                }
            }
        }

        Err(StoreError::StreamClosed(format!(
            "'{}' event stream ended",
            key
        )))
    }

    async fn forward(
        &self,
        tx: &mpsc::Sender<ListenerUpdate>,
        key: &str,
        value: Value,
    ) -> Result<(), ()> {
        tx.send(ListenerUpdate::Value {
            key: key.to_string(),
            value,
        })
        .await
        .map_err(|_| ())
    }
}

fn check_status(key: &str, response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::PermissionDenied(format!(
            "{} for '{}'",
            status, key
        )));
    }
    if !status.is_success() {
        return Err(StoreError::RequestFailed(format!(
            "unexpected status {} for '{}'",
            status, key
        )));
    }
    Ok(response)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteSettings;

    fn settings(url: &str) -> RemoteSettings {
        RemoteSettings {
            database_url: Some(url.to_string()),
            api_key: None,
            project_id: None,
        }
    }

    #[test]
    fn test_new_requires_database_url() {
        let err = RemoteStore::new(&RemoteSettings::default()).unwrap_err();
        assert!(matches!(err, StoreError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_new_rejects_unparseable_url() {
        let err = RemoteStore::new(&settings("not a url")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_key_url_shape() {
        let remote =
            RemoteStore::new(&settings("https://example-rtdb.firebasedatabase.app/")).unwrap();
        let url = remote.key_url("categories").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example-rtdb.firebasedatabase.app/categories.json"
        );
    }

    #[test]
    fn test_key_url_carries_auth_param() {
        let mut settings = settings("https://example-rtdb.firebasedatabase.app");
        settings.api_key = Some("secret-key".to_string());
        let remote = RemoteStore::new(&settings).unwrap();

        let url = remote.key_url("orders").unwrap();
        assert!(url.as_str().ends_with("orders.json?auth=secret-key"));
    }
}
