//! Local archive of raw uploads
//!
//! Every accepted document is written verbatim to
//! `<root>/<run_id>/<utc timestamp>-<file name>` before it is parsed, so a
//! batch can be re-derived from the exact bytes the device exported.
//!
//! Files are created exclusively. When two uploads land on the same name in
//! the same millisecond, the later one becomes `<stamp>-<n>-<file name>`.

use chrono::Utc;
use ferment_common::types::RunId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::error::{ServerError, ServerResult};

/// Name used when the client sent no usable file name
pub const FALLBACK_FILE_NAME: &str = "upload.csv";

/// Filesystem limit on one path component, in bytes
const MAX_FILE_NAME_LENGTH: usize = 255;

/// Room kept for the `-<n>` collision counter
const COLLISION_SUFFIX_RESERVE: usize = 6;

const MAX_CREATE_ATTEMPTS: usize = 10_000;

/// Extensions longer than this are treated as part of the stem
const MAX_EXTENSION_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct UploadArchive {
    root: PathBuf,
    enabled: bool,
}

/// Where an archived document landed
#[derive(Debug, Clone)]
pub struct ArchivedUpload {
    pub path: PathBuf,
    pub size: usize,
}

impl UploadArchive {
    pub fn new(root: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            root: root.into(),
            enabled,
        }
    }

    /// Archive that stores nothing
    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create the root directory up front so permission problems show at startup
    pub async fn ensure_root(&self) -> ServerResult<()> {
        if self.enabled {
            tokio::fs::create_dir_all(&self.root).await?;
        }
        Ok(())
    }

    /// Write `content` under the run's directory
    ///
    /// Returns `None` when archiving is disabled.
    #[instrument(skip(self, content), fields(run_id = %run_id, size = content.len()))]
    pub async fn store(
        &self,
        run_id: &RunId,
        file_name: Option<&str>,
        content: &[u8],
    ) -> ServerResult<Option<ArchivedUpload>> {
        if !self.enabled {
            return Ok(None);
        }

        let dir = self.root.join(run_id.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string();
        let budget = MAX_FILE_NAME_LENGTH - stamp.len() - 1 - COLLISION_SUFFIX_RESERVE;
        let name = fit_file_name(
            &sanitize_file_name(file_name.unwrap_or(FALLBACK_FILE_NAME)),
            budget,
        );

        for attempt in 0..MAX_CREATE_ATTEMPTS {
            let path = if attempt == 0 {
                dir.join(format!("{}-{}", stamp, name))
            } else {
                dir.join(format!("{}-{}-{}", stamp, attempt, name))
            };

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            file.write_all(content).await?;
            file.flush().await?;
            debug!(path = %path.display(), "Archived upload");

            return Ok(Some(ArchivedUpload {
                path,
                size: content.len(),
            }));
        }

        Err(ServerError::ArchiveNameExhausted(
            format!("{}-{}", stamp, name),
            MAX_CREATE_ATTEMPTS,
        ))
    }
}

/// Shorten an ASCII name to `max_len` bytes, keeping a short extension
fn fit_file_name(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LENGTH => name.split_at(dot),
        _ => (name, ""),
    };

    let keep = max_len.saturating_sub(extension.len());
    format!("{}{}", &stem[..keep.min(stem.len())], extension)
}

/// Reduce a client-supplied name to one safe path component
///
/// Directory parts (either separator) are dropped, anything outside
/// `[A-Za-z0-9._-]` becomes `_`, and leading dots are stripped so the result
/// can never be `.`, `..` or hidden.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }

    cleaned.chars().take(MAX_FILE_NAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> RunId {
        RunId::parse("R001002").unwrap()
    }

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("run_01.csv"), "run_01.csv");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\exports\\run.csv"), "run.csv");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_file_name("run 1 (final).csv"), "run_1__final_.csv");
    }

    #[test]
    fn test_sanitize_falls_back_when_nothing_left() {
        assert_eq!(sanitize_file_name(""), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name(".."), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name("dir/"), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
    }

    #[tokio::test]
    async fn test_store_writes_under_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = UploadArchive::new(dir.path(), true);

        let stored = archive
            .store(&run(), Some("export.csv"), b"h1\nh2\n")
            .await
            .unwrap()
            .unwrap();

        assert!(stored.path.starts_with(dir.path().join("R001002")));
        assert!(stored
            .path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-export.csv"));
        assert_eq!(stored.size, 6);
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"h1\nh2\n");
    }

    #[tokio::test]
    async fn test_store_without_name_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let archive = UploadArchive::new(dir.path(), true);

        let stored = archive.store(&run(), None, b"x").await.unwrap().unwrap();
        assert!(stored
            .path
            .to_string_lossy()
            .ends_with(FALLBACK_FILE_NAME));
    }

    #[test]
    fn test_fit_file_name_keeps_extension() {
        let long = format!("{}.csv", "a".repeat(300));
        let fitted = fit_file_name(&long, 100);
        assert_eq!(fitted.len(), 100);
        assert!(fitted.ends_with("aaa.csv"));

        assert_eq!(fit_file_name("short.csv", 100), "short.csv");
        assert_eq!(fit_file_name(&"b".repeat(50), 10), "b".repeat(10));
    }

    #[tokio::test]
    async fn test_store_accepts_very_long_names() {
        let dir = tempfile::tempdir().unwrap();
        let archive = UploadArchive::new(dir.path(), true);
        let name = format!("{}.csv", "a".repeat(300));

        let stored = archive
            .store(&run(), Some(&name), b"h1\nh2\n")
            .await
            .unwrap()
            .unwrap();

        let file_name = stored.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.len() <= MAX_FILE_NAME_LENGTH);
        assert!(file_name.ends_with(".csv"));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"h1\nh2\n");
    }

    #[tokio::test]
    async fn test_repeated_uploads_never_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let archive = UploadArchive::new(dir.path(), true);

        let mut paths = std::collections::HashSet::new();
        for i in 0..200 {
            let content = format!("upload {}", i);
            let stored = archive
                .store(&run(), Some("export.csv"), content.as_bytes())
                .await
                .unwrap()
                .unwrap();
            assert!(paths.insert(stored.path));
        }

        let mut entries = tokio::fs::read_dir(dir.path().join("R001002")).await.unwrap();
        let mut on_disk = 0;
        while entries.next_entry().await.unwrap().is_some() {
            on_disk += 1;
        }
        assert_eq!(on_disk, 200);
    }

    #[tokio::test]
    async fn test_disabled_archive_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = UploadArchive::new(dir.path().join("uploads"), false);

        archive.ensure_root().await.unwrap();
        assert!(archive.store(&run(), Some("a.csv"), b"x").await.unwrap().is_none());
        assert!(!dir.path().join("uploads").exists());
    }
}
