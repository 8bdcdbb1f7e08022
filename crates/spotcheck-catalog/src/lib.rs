// SPDX-License-Identifier: GPL-3.0-or-later

//! Authenticated, rate-limited client for the remote music catalog.
//!
//! This crate wraps the catalog's client-credentials token endpoint and
//! track search endpoint. All outbound calls pass through a
//! [`RateLimitedDispatcher`] so the configured request rate is never
//! exceeded, no matter how many lookups are ready concurrently.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod session;

pub use client::{CatalogClient, CatalogClientBuilder, ClientCredentials};
pub use dispatcher::RateLimitedDispatcher;
pub use error::{CatalogError, Result};
pub use models::SearchQuery;
pub use session::{CatalogSession, SessionState};
