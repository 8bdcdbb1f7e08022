// SPDX-License-Identifier: GPL-3.0-or-later

//! Embedded tag extraction backed by `lofty`.

use lofty::file::TaggedFileExt;
use lofty::prelude::Accessor;
use lofty::probe::Probe;
use spotcheck_domain::LocalTrack;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading tags from one file.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read tags: {0}")]
    ReadFailed(#[from] lofty::error::LoftyError),

    #[error("no tags present in file")]
    NoTags,

    #[error("tags missing artist or title")]
    MissingFields,
}

/// Source of parsed tag metadata, one [`LocalTrack`] per file.
///
/// The seam exists so the pipeline can be exercised without real audio
/// fixtures.
pub trait TagSource: Send + Sync {
    fn read(&self, path: &Path) -> Result<LocalTrack, TagError>;
}

/// Tag reader over `lofty`, covering ID3, Vorbis comments and MP4 atoms.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagReader;

impl TagReader {
    pub fn new() -> Self {
        Self
    }

    fn text(value: Option<std::borrow::Cow<'_, str>>) -> String {
        value.map(|v| v.trim().to_string()).unwrap_or_default()
    }
}

impl TagSource for TagReader {
    fn read(&self, path: &Path) -> Result<LocalTrack, TagError> {
        if !path.exists() {
            return Err(TagError::FileNotFound(path.display().to_string()));
        }

        let tagged = Probe::open(path)?.read()?;

        let tag = tagged
            .primary_tag()
            .or_else(|| tagged.tags().first())
            .ok_or(TagError::NoTags)?;

        let artist = Self::text(tag.artist());
        let title = Self::text(tag.title());
        let album = Self::text(tag.album());

        // Without artist and title there is nothing to query for; an empty
        // album is allowed and simply never matches.
        if artist.is_empty() || title.is_empty() {
            return Err(TagError::MissingFields);
        }

        debug!(
            target: "tags",
            path = %path.display(),
            artist = %artist,
            title = %title,
            album = %album,
            "tags extracted"
        );

        Ok(LocalTrack::new(artist, title, album, path))
    }
}
