// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use spotcheck_domain::{CatalogCandidate, LocalTrack};

/// Token endpoint response for the client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Search query parameters.
///
/// Derived deterministically from a [`LocalTrack`]: artist and title,
/// whitespace-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn for_track(track: &LocalTrack) -> Self {
        Self {
            query: format!("{} {}", track.artist, track.title),
        }
    }
}

/// Top-level search response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

/// One page of track search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPage {
    pub total: u32,
    #[serde(default)]
    pub items: Vec<TrackItem>,
}

/// A single track search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Artist credit on a search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

/// Album a track search result belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

impl TrackItem {
    /// Flatten a wire result into the candidate shape the matcher consumes.
    ///
    /// The track's own page URL is preferred; the album URL is the fallback.
    pub fn into_candidate(self) -> CatalogCandidate {
        let catalog_url = self
            .external_urls
            .spotify
            .or(self.album.external_urls.spotify)
            .unwrap_or_default();

        let artist = self
            .artists
            .into_iter()
            .map(|a| a.name)
            .collect::<Vec<_>>()
            .join(", ");

        CatalogCandidate {
            artist,
            title: self.name,
            album: self.album.name,
            catalog_url,
        }
    }
}
