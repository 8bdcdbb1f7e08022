// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("access token expired")]
    TokenExpired,

    #[error("catalog rate limit exceeded")]
    RateLimitExceeded,

    #[error("invalid response from catalog API: {0}")]
    InvalidResponse(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

impl CatalogError {
    /// True for failures the orchestrator can fix by refreshing the session.
    pub fn is_auth_expiry(&self) -> bool {
        matches!(self, CatalogError::TokenExpired)
    }
}
