//! qBittorrent torrent client implementation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;

use super::{AddTorrentRequest, TorrentClient, TorrentClientError};

/// qBittorrent client implementation (Web API v2).
pub struct QBittorrentClient {
    client: Client,
    config: QBittorrentConfig,
    /// Session marker (the cookie itself lives in the cookie jar).
    session: Arc<RwLock<Option<String>>>,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: QBittorrentConfig) -> Result<Self, TorrentClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| TorrentClientError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Login and store session cookie.
    async fn login(&self) -> Result<(), TorrentClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            let mut session = self.session.write().await;
            *session = Some("authenticated".to_string());
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(TorrentClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TorrentClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a valid session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), TorrentClientError> {
        let session = self.session.read().await;
        if session.is_some() {
            return Ok(());
        }
        drop(session);
        self.login().await
    }

    async fn reauthenticate(&self) -> Result<(), TorrentClientError> {
        warn!("qBittorrent session expired, re-authenticating");
        {
            let mut session = self.session.write().await;
            *session = None;
        }
        self.login().await
    }

    /// Make an authenticated GET request.
    async fn get(&self, endpoint: &str) -> Result<String, TorrentClientError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let mut response = self.client.get(&url).send().await.map_err(map_send_error)?;

        if response.status().as_u16() == 403 {
            self.reauthenticate().await?;
            response = self.client.get(&url).send().await.map_err(map_send_error)?;
        }

        read_body(response).await
    }

    /// Make an authenticated POST request with multipart data.
    ///
    /// `build_form` is called again for the retry after a re-login, since a
    /// multipart form cannot be reused once sent.
    async fn post_multipart<F>(&self, endpoint: &str, build_form: F) -> Result<String, TorrentClientError>
    where
        F: Fn() -> Result<multipart::Form, TorrentClientError>,
    {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let mut response = self
            .client
            .post(&url)
            .multipart(build_form()?)
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status().as_u16() == 403 {
            self.reauthenticate().await?;
            response = self
                .client
                .post(&url)
                .multipart(build_form()?)
                .send()
                .await
                .map_err(map_send_error)?;
        }

        read_body(response).await
    }

    fn add_form(&self, request: &AddTorrentRequest) -> Result<multipart::Form, TorrentClientError> {
        let file_part = multipart::Part::bytes(request.data.clone())
            .file_name(format!("{}.torrent", request.name))
            .mime_str("application/x-bittorrent")
            .map_err(|e| TorrentClientError::InvalidTorrent(e.to_string()))?;

        let mut form = multipart::Form::new()
            .part("torrents", file_part)
            .text("savepath", request.destination.to_string_lossy().into_owned())
            .text("contentLayout", "NoSubfolder")
            .text("skip_checking", "false");

        if let Some(category) = &self.config.category {
            form = form.text("category", category.clone());
        }
        if self.config.paused {
            form = form.text("paused", "true").text("stopped", "true");
        }
        Ok(form)
    }
}

/// Subset of the qBittorrent torrent info response.
#[derive(Debug, Deserialize)]
struct QBTorrentHash {
    hash: String,
}

fn map_send_error(e: reqwest::Error) -> TorrentClientError {
    if e.is_timeout() {
        TorrentClientError::Timeout
    } else if e.is_connect() {
        TorrentClientError::ConnectionFailed(e.to_string())
    } else {
        TorrentClientError::ApiError(e.to_string())
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, TorrentClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
    }
    response
        .text()
        .await
        .map_err(|e| TorrentClientError::ApiError(e.to_string()))
}

/// Parse the `/torrents/info` body into a set of lowercase hashes.
fn parse_hashes(body: &str) -> Result<HashSet<String>, TorrentClientError> {
    let torrents: Vec<QBTorrentHash> = serde_json::from_str(body)
        .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;
    Ok(torrents.into_iter().map(|t| t.hash.to_lowercase()).collect())
}

/// Interpret the `/torrents/add` body. Newer versions answer with JSON.
fn parse_add_response(body: &str) -> bool {
    let body = body.trim();
    if body.starts_with('{') {
        return serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("success_count").and_then(|c| c.as_u64()))
            .is_some_and(|count| count > 0);
    }
    body.contains("Ok.")
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn list_info_hashes(&self) -> Result<HashSet<String>, TorrentClientError> {
        let body = self.get("/api/v2/torrents/info").await?;
        let hashes = parse_hashes(&body)?;
        debug!(count = hashes.len(), "Fetched torrent hashes from qBittorrent");
        Ok(hashes)
    }

    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<bool, TorrentClientError> {
        let body = self
            .post_multipart("/api/v2/torrents/add", || self.add_form(&request))
            .await?;

        let accepted = parse_add_response(&body);
        if !accepted {
            warn!(
                info_hash = %request.info_hash,
                response = %body.chars().take(100).collect::<String>(),
                "qBittorrent declined torrent"
            );
        }
        Ok(accepted)
    }
}
