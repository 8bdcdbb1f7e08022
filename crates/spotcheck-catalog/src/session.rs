// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{CatalogError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Safety margin subtracted from the advertised token lifetime.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Lifecycle of the shared client-credentials session:
/// `Unauthenticated -> Authenticated -> Expired -> Authenticated -> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated {
        token: String,
        acquired_at: Instant,
        expires_in: Duration,
    },
    Expired,
}

/// Shared authenticated session for the catalog API.
///
/// One session is held per run and read by every dispatch call. Refresh is
/// driven by the client: `bearer()` reports expiry distinctly so the
/// orchestrator can decide to refresh and retry.
#[derive(Debug, Clone, Default)]
pub struct CatalogSession {
    state: Arc<Mutex<SessionState>>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unauthenticated
    }
}

impl CatalogSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition to `Authenticated` with a freshly acquired token.
    pub async fn store(&self, token: String, expires_in: Duration) {
        let mut state = self.state.lock().await;
        *state = SessionState::Authenticated {
            token,
            acquired_at: Instant::now(),
            expires_in,
        };
        debug!(target: "catalog", expires_in_secs = expires_in.as_secs(), "session authenticated");
    }

    /// Current bearer token, or the reason none is usable.
    ///
    /// A token past its advertised lifetime transitions the session to
    /// `Expired` and surfaces as [`CatalogError::TokenExpired`].
    pub async fn bearer(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        match &*state {
            SessionState::Unauthenticated => Err(CatalogError::AuthFailed(
                "no access token acquired".to_string(),
            )),
            SessionState::Expired => Err(CatalogError::TokenExpired),
            SessionState::Authenticated {
                token,
                acquired_at,
                expires_in,
            } => {
                let lifetime = expires_in.saturating_sub(EXPIRY_SKEW);
                if acquired_at.elapsed() >= lifetime {
                    *state = SessionState::Expired;
                    Err(CatalogError::TokenExpired)
                } else {
                    Ok(token.clone())
                }
            }
        }
    }

    /// Force the session into `Expired`, e.g. after the API rejects the
    /// token before its advertised lifetime elapsed.
    pub async fn mark_expired(&self) {
        let mut state = self.state.lock().await;
        *state = SessionState::Expired;
        debug!(target: "catalog", "session marked expired");
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(&*self.state.lock().await, SessionState::Authenticated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_unauthenticated() {
        let session = CatalogSession::new();
        assert!(!session.is_authenticated().await);
        assert!(matches!(
            session.bearer().await,
            Err(CatalogError::AuthFailed(_))
        ));
    }

    #[tokio::test]
    async fn stores_and_returns_token() {
        let session = CatalogSession::new();
        session
            .store("abc123".to_string(), Duration::from_secs(3600))
            .await;
        assert!(session.is_authenticated().await);
        assert_eq!(session.bearer().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn short_lived_token_reports_expiry() {
        let session = CatalogSession::new();
        // Lifetime below the skew margin counts as already expired
        session
            .store("abc123".to_string(), Duration::from_secs(5))
            .await;
        assert!(matches!(
            session.bearer().await,
            Err(CatalogError::TokenExpired)
        ));
        // And the state machine has moved to Expired
        assert!(matches!(
            session.bearer().await,
            Err(CatalogError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn reauthentication_recovers_expired_session() {
        let session = CatalogSession::new();
        session.mark_expired().await;
        assert!(matches!(
            session.bearer().await,
            Err(CatalogError::TokenExpired)
        ));

        session
            .store("fresh".to_string(), Duration::from_secs(3600))
            .await;
        assert_eq!(session.bearer().await.unwrap(), "fresh");
    }
}
