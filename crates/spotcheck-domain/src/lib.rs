// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Value Objects
// ============================================================================

/// Parsed tag metadata for one on-disk audio file.
///
/// Produced once per discovered file, owned by the pipeline for the
/// duration of one reconciliation attempt and discarded after its
/// verdict is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTrack {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub source_path: PathBuf,
}

impl LocalTrack {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        album: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            source_path: source_path.into(),
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// One release returned by the catalog's search endpoint.
///
/// Zero-or-many per search call, scoped to a single match evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub catalog_url: String,
}

/// Why a candidate existed for artist + title but did not fully match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    AlbumMismatch,
}

impl std::fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchReason::AlbumMismatch => write!(f, "album_mismatch"),
        }
    }
}

// ============================================================================
// Verdicts & Outcomes
// ============================================================================

/// Classified result of comparing one local file against catalog
/// search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// A candidate with an exactly equal album name was found.
    Match {
        track: LocalTrack,
        candidate: CatalogCandidate,
    },
    /// Candidates existed for artist + title but none matched the album.
    /// `candidate` is the last candidate scanned.
    PartialMismatch {
        track: LocalTrack,
        candidate: CatalogCandidate,
        reason: MismatchReason,
    },
    /// The search succeeded but returned zero candidates.
    NoResult { track: LocalTrack },
    /// The search failed before any candidates could be evaluated.
    NoResponse { track: LocalTrack, cause: String },
}

impl Verdict {
    pub fn track(&self) -> &LocalTrack {
        match self {
            Verdict::Match { track, .. }
            | Verdict::PartialMismatch { track, .. }
            | Verdict::NoResult { track }
            | Verdict::NoResponse { track, .. } => track,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            Verdict::Match { .. } => "match",
            Verdict::PartialMismatch { .. } => "partial",
            Verdict::NoResult { .. } => "no_result",
            Verdict::NoResponse { .. } => "no_response",
        }
    }
}

/// Everything the pipeline can emit for one discovered path.
///
/// Exactly one outcome is produced per file that entered the pipeline;
/// a file whose tags cannot be read never reaches the matcher and is
/// reported as `MetadataError`, never folded into `NoResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Verdict(Verdict),
    MetadataError { path: PathBuf, cause: String },
    DiscoveryError { path: PathBuf, cause: String },
}

impl Outcome {
    pub fn status_label(&self) -> &'static str {
        match self {
            Outcome::Verdict(verdict) => verdict.status_label(),
            Outcome::MetadataError { .. } => "metadata_error",
            Outcome::DiscoveryError { .. } => "discovery_error",
        }
    }
}

// ============================================================================
// Run Aggregation
// ============================================================================

/// Per-status counters accumulated over one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub matched: usize,
    pub partial_mismatches: usize,
    pub no_results: usize,
    pub no_responses: usize,
    pub metadata_errors: usize,
    pub discovery_errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Verdict(Verdict::Match { .. }) => self.matched += 1,
            Outcome::Verdict(Verdict::PartialMismatch { .. }) => self.partial_mismatches += 1,
            Outcome::Verdict(Verdict::NoResult { .. }) => self.no_results += 1,
            Outcome::Verdict(Verdict::NoResponse { .. }) => self.no_responses += 1,
            Outcome::MetadataError { .. } => self.metadata_errors += 1,
            Outcome::DiscoveryError { .. } => self.discovery_errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched
            + self.partial_mismatches
            + self.no_results
            + self.no_responses
            + self.metadata_errors
            + self.discovery_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> LocalTrack {
        LocalTrack::new("Daft Punk", "One More Time", "Discovery", "/music/omt.flac")
    }

    fn candidate(album: &str) -> CatalogCandidate {
        CatalogCandidate {
            artist: "Daft Punk".to_string(),
            title: "One More Time".to_string(),
            album: album.to_string(),
            catalog_url: "https://example.test/track/1".to_string(),
        }
    }

    #[test]
    fn verdict_exposes_originating_track() {
        let verdict = Verdict::PartialMismatch {
            track: track(),
            candidate: candidate("Homework"),
            reason: MismatchReason::AlbumMismatch,
        };
        assert_eq!(verdict.track().title, "One More Time");
        assert_eq!(verdict.status_label(), "partial");
    }

    #[test]
    fn mismatch_reason_renders_snake_case() {
        assert_eq!(MismatchReason::AlbumMismatch.to_string(), "album_mismatch");
    }

    #[test]
    fn summary_counts_each_outcome_kind() {
        let mut summary = RunSummary::default();
        summary.record(&Outcome::Verdict(Verdict::Match {
            track: track(),
            candidate: candidate("Discovery"),
        }));
        summary.record(&Outcome::Verdict(Verdict::NoResult { track: track() }));
        summary.record(&Outcome::MetadataError {
            path: PathBuf::from("/music/broken.mp3"),
            cause: "unreadable tag".to_string(),
        });

        assert_eq!(summary.matched, 1);
        assert_eq!(summary.no_results, 1);
        assert_eq!(summary.metadata_errors, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn verdict_serializes_with_status_tag() {
        let verdict = Verdict::NoResult { track: track() };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "no_result");
    }
}
