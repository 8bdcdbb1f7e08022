// SPDX-License-Identifier: GPL-3.0-or-later

//! Outcome aggregation and table rendering.

use spotcheck_domain::{Outcome, RunSummary, Verdict};

const HEADERS: [&str; 6] = ["status", "artist", "album", "title", "reason", "catalog_url"];

/// One row of the final results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub status: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub reason: String,
    pub catalog_url: String,
}

impl ReportRow {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Verdict(verdict) => {
                let track = verdict.track();
                let (reason, catalog_url) = match verdict {
                    Verdict::Match { candidate, .. } => {
                        (String::new(), candidate.catalog_url.clone())
                    }
                    Verdict::PartialMismatch {
                        candidate, reason, ..
                    } => (reason.to_string(), candidate.catalog_url.clone()),
                    Verdict::NoResult { .. } => (String::new(), String::new()),
                    Verdict::NoResponse { cause, .. } => (cause.clone(), String::new()),
                };
                Self {
                    status: verdict.status_label().to_string(),
                    artist: track.artist.clone(),
                    album: track.album.clone(),
                    title: track.title.clone(),
                    reason,
                    catalog_url,
                }
            }
            Outcome::MetadataError { path, cause } => Self {
                status: outcome.status_label().to_string(),
                artist: String::new(),
                album: String::new(),
                title: path.display().to_string(),
                reason: cause.clone(),
                catalog_url: String::new(),
            },
            Outcome::DiscoveryError { path, cause } => Self {
                status: outcome.status_label().to_string(),
                artist: String::new(),
                album: String::new(),
                title: path.display().to_string(),
                reason: cause.clone(),
                catalog_url: String::new(),
            },
        }
    }

    fn columns(&self) -> [&str; 6] {
        [
            &self.status,
            &self.artist,
            &self.album,
            &self.title,
            &self.reason,
            &self.catalog_url,
        ]
    }
}

/// Accumulate per-status counters over a run's outcomes.
pub fn summarize(outcomes: &[Outcome]) -> RunSummary {
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        summary.record(outcome);
    }
    summary
}

/// Render outcomes as an aligned text table keyed by
/// status/artist/album/title/reason/catalog_url.
pub fn render_table(outcomes: &[Outcome]) -> String {
    let rows: Vec<ReportRow> = outcomes.iter().map(ReportRow::from_outcome).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, column) in widths.iter_mut().zip(row.columns()) {
            *width = (*width).max(column.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS, &widths);

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let separator_refs: Vec<&str> = separator.iter().map(String::as_str).collect();
    push_row(&mut out, &separator_refs, &widths);

    for row in &rows {
        push_row(&mut out, &row.columns(), &widths);
    }

    out
}

fn push_row(out: &mut String, columns: &[&str], widths: &[usize]) {
    for (i, (column, width)) in columns.iter().zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(column);
        for _ in column.len()..*width {
            out.push(' ');
        }
    }
    // Trim trailing padding on the last column
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotcheck_domain::{CatalogCandidate, LocalTrack, MismatchReason};
    use std::path::PathBuf;

    fn match_outcome() -> Outcome {
        Outcome::Verdict(Verdict::Match {
            track: LocalTrack::new("Daft Punk", "One More Time", "Discovery", "/m/omt.flac"),
            candidate: CatalogCandidate {
                artist: "Daft Punk".to_string(),
                title: "One More Time".to_string(),
                album: "Discovery".to_string(),
                catalog_url: "https://open.spotify.com/track/omt".to_string(),
            },
        })
    }

    fn partial_outcome() -> Outcome {
        Outcome::Verdict(Verdict::PartialMismatch {
            track: LocalTrack::new("Daft Punk", "One More Time", "Discovery", "/m/omt.flac"),
            candidate: CatalogCandidate {
                artist: "Daft Punk".to_string(),
                title: "One More Time".to_string(),
                album: "Homework".to_string(),
                catalog_url: "https://open.spotify.com/track/omt2".to_string(),
            },
            reason: MismatchReason::AlbumMismatch,
        })
    }

    #[test]
    fn row_carries_mismatch_reason() {
        let row = ReportRow::from_outcome(&partial_outcome());
        assert_eq!(row.status, "partial");
        assert_eq!(row.reason, "album_mismatch");
        assert_eq!(row.catalog_url, "https://open.spotify.com/track/omt2");
    }

    #[test]
    fn metadata_error_row_shows_path_and_cause() {
        let outcome = Outcome::MetadataError {
            path: PathBuf::from("/m/broken.mp3"),
            cause: "no tags present in file".to_string(),
        };
        let row = ReportRow::from_outcome(&outcome);
        assert_eq!(row.status, "metadata_error");
        assert_eq!(row.title, "/m/broken.mp3");
        assert_eq!(row.reason, "no tags present in file");
    }

    #[test]
    fn table_has_header_and_one_line_per_outcome() {
        let outcomes = vec![match_outcome(), partial_outcome()];
        let table = render_table(&outcomes);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4); // header + separator + 2 rows
        assert!(lines[0].starts_with("status"));
        assert!(lines[2].starts_with("match"));
        assert!(lines[3].starts_with("partial"));
    }

    #[test]
    fn summary_reflects_outcomes() {
        let outcomes = vec![match_outcome(), partial_outcome(), partial_outcome()];
        let summary = summarize(&outcomes);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.partial_mismatches, 2);
        assert_eq!(summary.total(), 3);
    }
}
