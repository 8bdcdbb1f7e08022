// SPDX-License-Identifier: GPL-3.0-or-later

use crate::dispatcher::RateLimitedDispatcher;
use crate::error::{CatalogError, Result};
use crate::models::{SearchQuery, SearchResponse, TokenResponse};
use crate::session::CatalogSession;
use reqwest::Client;
use spotcheck_domain::CatalogCandidate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

const CATALOG_API_BASE: &str = "https://api.spotify.com";
const CATALOG_AUTH_BASE: &str = "https://accounts.spotify.com";
const USER_AGENT: &str = concat!("spotcheck/", env!("CARGO_PKG_VERSION"));

/// OAuth client-credentials pair for the catalog.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Catalog API client with rate limiting and an explicit shared session.
///
/// Every search passes through the [`RateLimitedDispatcher`], so concurrent
/// callers are admitted FIFO and never exceed the configured rate.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    api_base_url: String,
    auth_base_url: String,
    credentials: ClientCredentials,
    session: Arc<CatalogSession>,
    dispatcher: RateLimitedDispatcher,
    search_limit: u32,
}

impl CatalogClient {
    /// Create a client builder for custom configuration.
    pub fn builder(credentials: ClientCredentials) -> CatalogClientBuilder {
        CatalogClientBuilder::new(credentials)
    }

    /// Acquire (or re-acquire) an access token via the client-credentials
    /// grant and store it in the shared session.
    pub async fn authenticate(&self) -> Result<()> {
        let url = format!("{}/api/token", self.auth_base_url);
        trace!(target: "catalog", "POST {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        debug!(target: "catalog", "token response status: {}", status);

        if status == 400 || status == 401 || status == 403 {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CatalogError::AuthFailed(message));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("failed to parse token response: {}", e))
        })?;

        self.session
            .store(token.access_token, Duration::from_secs(token.expires_in))
            .await;

        Ok(())
    }

    /// Search the catalog for tracks matching the query.
    ///
    /// Rate-limited: the call start waits for dispatcher admission. A 401
    /// marks the session expired and surfaces as
    /// [`CatalogError::TokenExpired`]; a 429 surfaces as
    /// [`CatalogError::RateLimitExceeded`] so an operator can tune the
    /// interval.
    pub async fn search_tracks(&self, query: &SearchQuery) -> Result<Vec<CatalogCandidate>> {
        let _permit = self.dispatcher.admit().await;

        let bearer = self.session.bearer().await?;

        let url = format!("{}/v1/search", self.api_base_url);
        trace!(target: "catalog", "GET {} q={}", url, query.query);

        let limit = self.search_limit.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer)
            .query(&[
                ("q", query.query.as_str()),
                ("type", "track"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!(target: "catalog", "search response status: {}", status);

        if status == 401 {
            self.session.mark_expired().await;
            return Err(CatalogError::TokenExpired);
        }

        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "catalog", "search response body: {}", body);

        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            CatalogError::InvalidResponse(format!("failed to parse search response: {}", e))
        })?;

        Ok(parsed
            .tracks
            .items
            .into_iter()
            .map(|item| item.into_candidate())
            .collect())
    }

    /// The shared session handle, e.g. for inspecting auth state.
    pub fn session(&self) -> &Arc<CatalogSession> {
        &self.session
    }
}

/// Builder for configuring a catalog client.
#[derive(Debug)]
pub struct CatalogClientBuilder {
    credentials: ClientCredentials,
    api_base_url: String,
    auth_base_url: String,
    timeout: Duration,
    rate_limit_interval: Duration,
    max_concurrent: usize,
    search_limit: u32,
    session: Option<Arc<CatalogSession>>,
}

impl CatalogClientBuilder {
    pub fn new(credentials: ClientCredentials) -> Self {
        Self {
            credentials,
            api_base_url: CATALOG_API_BASE.to_string(),
            auth_base_url: CATALOG_AUTH_BASE.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit_interval: Duration::from_millis(666),
            max_concurrent: 1,
            search_limit: 20,
            session: None,
        }
    }

    /// Set a custom API base URL (useful for testing with mock servers).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set a custom token endpoint base URL (useful for testing).
    pub fn auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set rate limit interval between call starts.
    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// Set the bound on in-flight catalog calls.
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Set the number of candidates requested per search.
    pub fn search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    /// Share an existing session instead of creating a fresh one.
    pub fn session(mut self, session: Arc<CatalogSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the catalog client.
    pub fn build(self) -> Result<CatalogClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let dispatcher = RateLimitedDispatcher::new(self.max_concurrent, self.rate_limit_interval);

        Ok(CatalogClient {
            client,
            api_base_url: self.api_base_url,
            auth_base_url: self.auth_base_url,
            credentials: self.credentials,
            session: self.session.unwrap_or_default(),
            dispatcher,
            search_limit: self.search_limit,
        })
    }
}
