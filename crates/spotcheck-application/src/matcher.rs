// SPDX-License-Identifier: GPL-3.0-or-later

//! Pure verdict classification.

use spotcheck_domain::{CatalogCandidate, LocalTrack, MismatchReason, Verdict};
use tracing::trace;

/// Classify one local track against the candidates the catalog returned.
///
/// Candidates are scanned in catalog order (typically relevance-ranked);
/// the first candidate whose album name exactly equals the track's album
/// wins. Equality is case-sensitive with no normalization. When no
/// candidate matches, the last-scanned candidate is kept as the
/// representative counter-example. Deterministic, no I/O.
pub fn classify(track: LocalTrack, candidates: Vec<CatalogCandidate>) -> Verdict {
    let mut last_scanned = None;

    for candidate in candidates {
        if candidate.album == track.album {
            trace!(
                target: "matcher",
                album = %candidate.album,
                "album match"
            );
            return Verdict::Match { track, candidate };
        }

        trace!(
            target: "matcher",
            local = %track.album,
            remote = %candidate.album,
            "album mismatch"
        );
        last_scanned = Some(candidate);
    }

    match last_scanned {
        Some(candidate) => Verdict::PartialMismatch {
            track,
            candidate,
            reason: MismatchReason::AlbumMismatch,
        },
        None => Verdict::NoResult { track },
    }
}
