// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconciliation pipeline orchestration.
//!
//! Discovery and tag extraction run concurrently across files; the catalog
//! dispatch stage is the serialization point, throttled inside
//! [`CatalogClient`] by its rate-limited dispatcher. Outcomes are emitted
//! in completion order.

use crate::discovery::{DiscoveryError, FileDiscovery};
use crate::matcher;
use crate::tags::{TagReader, TagSource};
use spotcheck_catalog::{CatalogClient, CatalogError, SearchQuery};
use spotcheck_config::ScanConfig;
use spotcheck_domain::{Outcome, Verdict};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Orchestrates discovery, extraction, dispatch and classification for one
/// directory tree. Individual file failures never abort the run.
pub struct ReconciliationPipeline<T: TagSource + 'static> {
    client: Arc<CatalogClient>,
    tags: Arc<T>,
    discovery: FileDiscovery,
    max_in_flight: usize,
}

impl ReconciliationPipeline<TagReader> {
    pub fn new(client: Arc<CatalogClient>, scan: &ScanConfig) -> Self {
        Self::with_tag_source(client, Arc::new(TagReader::new()), scan)
    }
}

impl<T: TagSource + 'static> ReconciliationPipeline<T> {
    pub fn with_tag_source(client: Arc<CatalogClient>, tags: Arc<T>, scan: &ScanConfig) -> Self {
        Self {
            client,
            tags,
            discovery: FileDiscovery::from_config(scan),
            max_in_flight: scan.max_in_flight.max(1),
        }
    }

    /// Start a reconciliation run over `root`.
    ///
    /// Returns a channel yielding one [`Outcome`] per discovered file, in
    /// completion order. A missing or unreadable root fails the run before
    /// any dispatch. Cancelling the token stops admitting new files
    /// immediately; in-flight lookups are abandoned.
    pub async fn run(
        &self,
        root: &Path,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<Outcome>, DiscoveryError> {
        let discovered = self.discovery.discover(root)?;
        info!(
            target: "pipeline",
            root = %root.display(),
            files = discovered.files.len(),
            "scan started"
        );

        let (tx, rx) = mpsc::channel(64);

        let client = self.client.clone();
        let tags = self.tags.clone();
        let max_in_flight = self.max_in_flight;

        tokio::spawn(async move {
            for (path, cause) in discovered.errors {
                let _ = tx.send(Outcome::DiscoveryError { path, cause }).await;
            }

            let in_flight = Arc::new(Semaphore::new(max_in_flight));

            for path in discovered.files {
                // Backpressure on the extraction stage; admission itself is
                // cancellable so shutdown is not delayed by a full queue.
                let permit = tokio::select! {
                    _ = cancel.cancelled() => break,
                    permit = in_flight.clone().acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let client = client.clone();
                let tags = tags.clone();
                let tx = tx.clone();
                let cancel = cancel.clone();

                tokio::spawn(async move {
                    let _permit = permit;
                    let display_path = path.clone();
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            debug!(target: "pipeline", path = %display_path.display(), "cancelled; abandoning lookup");
                        }
                        outcome = process_file(client, tags, path) => {
                            let _ = tx.send(outcome).await;
                        }
                    }
                });
            }

            if cancel.is_cancelled() {
                info!(target: "pipeline", "scan cancelled; no further files admitted");
            }
        });

        Ok(rx)
    }
}

/// Produce exactly one outcome for one discovered path.
async fn process_file<T: TagSource + 'static>(
    client: Arc<CatalogClient>,
    tags: Arc<T>,
    path: PathBuf,
) -> Outcome {
    // Tag reading is blocking file I/O; keep it off the runtime workers so
    // slow media cannot starve the dispatcher's timers.
    let extracted = {
        let tags = tags.clone();
        let path = path.clone();
        tokio::task::spawn_blocking(move || tags.read(&path)).await
    };

    let track = match extracted {
        Ok(Ok(track)) => track,
        Ok(Err(e)) => {
            warn!(
                target: "pipeline",
                path = %path.display(),
                error = %e,
                "tag extraction failed"
            );
            return Outcome::MetadataError {
                path,
                cause: e.to_string(),
            };
        }
        Err(e) => {
            warn!(
                target: "pipeline",
                path = %path.display(),
                error = %e,
                "tag extraction task failed"
            );
            return Outcome::MetadataError {
                path,
                cause: e.to_string(),
            };
        }
    };

    let query = SearchQuery::for_track(&track);
    debug!(target: "pipeline", query = %query.query, "dispatching catalog search");

    let mut result = client.search_tracks(&query).await;

    // Expiry mid-run: refresh the shared session once and retry this file.
    if matches!(result, Err(ref e) if e.is_auth_expiry()) {
        warn!(target: "pipeline", "access token expired; refreshing session");
        result = match client.authenticate().await {
            Ok(()) => client.search_tracks(&query).await,
            Err(e) => Err(e),
        };
    }

    match result {
        Ok(candidates) => Outcome::Verdict(matcher::classify(track, candidates)),
        Err(e) => {
            let cause = match &e {
                CatalogError::RateLimitExceeded => "rate_limit_rejected".to_string(),
                other => other.to_string(),
            };
            Outcome::Verdict(Verdict::NoResponse { track, cause })
        }
    }
}
