// SPDX-License-Identifier: GPL-3.0-or-later

//! Audio file discovery over a directory tree.

use spotcheck_config::ScanConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Run-scoped discovery failures. Traversal errors below the root are
/// recoverable and reported per path instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("scan root not found: {0}")]
    RootNotFound(String),

    #[error("scan root is not a directory: {0}")]
    NotADirectory(String),

    #[error("cannot read scan root: {0}")]
    RootUnreadable(String),
}

/// Result of one directory walk: recognized audio files plus any subtrees
/// that could not be traversed.
#[derive(Debug, Default)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

/// Directory walker with an extension allow-list.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extensions: Vec<String>,
    follow_symlinks: bool,
}

impl FileDiscovery {
    pub fn new(extensions: &[String], follow_symlinks: bool) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            follow_symlinks,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(&config.extensions, config.follow_symlinks)
    }

    /// Case-insensitive suffix match against the allow-list.
    pub fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    /// Walk `root` recursively, collecting recognized audio files.
    ///
    /// A missing or non-directory root is fatal; unreadable subtrees are
    /// recorded and skipped.
    pub fn discover(&self, root: &Path) -> Result<Discovered, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(DiscoveryError::NotADirectory(root.display().to_string()));
        }

        let mut discovered = Discovered::default();

        for entry in walkdir::WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .into_iter()
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.is_audio_file(path) {
                        discovered.files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    // A traversal failure on the root itself means the scan
                    // never started; only errors below the root are
                    // recoverable.
                    if e.depth() == 0 || e.path() == Some(root) {
                        return Err(DiscoveryError::RootUnreadable(format!(
                            "{}: {}",
                            root.display(),
                            e
                        )));
                    }
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    warn!(
                        target: "discovery",
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable subtree"
                    );
                    discovered.errors.push((path, e.to_string()));
                }
            }
        }

        debug!(
            target: "discovery",
            files = discovered.files.len(),
            errors = discovered.errors.len(),
            "directory walk complete"
        );

        Ok(discovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(
            &[
                "flac".to_string(),
                "mp3".to_string(),
                "m4a".to_string(),
            ],
            false,
        )
    }

    #[test]
    fn recognizes_allowed_extensions_case_insensitively() {
        let d = discovery();
        assert!(d.is_audio_file(Path::new("/music/a.flac")));
        assert!(d.is_audio_file(Path::new("/music/b.MP3")));
        assert!(d.is_audio_file(Path::new("/music/c.M4A")));
        assert!(!d.is_audio_file(Path::new("/music/cover.jpg")));
        assert!(!d.is_audio_file(Path::new("/music/noextension")));
    }

    #[test]
    fn walks_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("artist/album");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("track.flac"), b"x").unwrap();
        fs::write(nested.join("track.FLAC.txt"), b"x").unwrap();
        fs::write(dir.path().join("loose.Mp3"), b"x").unwrap();

        let discovered = discovery().discover(dir.path()).unwrap();

        let mut names: Vec<_> = discovered
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["loose.Mp3", "track.flac"]);
        assert!(discovered.errors.is_empty());
    }

    #[test]
    fn missing_root_is_fatal() {
        let result = discovery().discover(Path::new("/nonexistent/spotcheck-test"));
        assert!(matches!(result, Err(DiscoveryError::RootNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_root_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("locked");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("track.flac"), b"x").unwrap();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged processes bypass mode checks; nothing to observe then.
        if fs::read_dir(&root).is_ok() {
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = discovery().discover(&root);
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(DiscoveryError::RootUnreadable(_))));
    }

    #[test]
    fn file_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.mp3");
        fs::write(&file, b"x").unwrap();

        let result = discovery().discover(&file);
        assert!(matches!(result, Err(DiscoveryError::NotADirectory(_))));
    }
}
