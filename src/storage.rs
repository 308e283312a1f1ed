use async_trait::async_trait;
use chrono::Utc;
use std::{path::PathBuf, sync::Arc};

/// Largest accepted upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Only PDF documents may be uploaded.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Sub-directory of the uploads root holding resource files.
const RESOURCES_DIR: &str = "resources";

/// StoredFile
///
/// Where an uploaded file ended up: its generated name and public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
}

// 1. StorageService Contract
/// StorageService
///
/// Abstract contract for persisting uploaded resource files. Handlers depend on
/// the trait so the disk-backed store can be swapped for the mock in tests.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the upload directories if they are missing.
    async fn ensure_ready(&self) -> Result<(), String>;

    /// Writes `bytes` under a unique name derived from `original_name` and
    /// returns the stored name and the URL it is served from.
    async fn store_resource_file(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, String>;
}

// 2. The Real Implementation (local disk)
/// LocalDiskStorage
///
/// Writes uploads to `<root>/resources/<millis>_<sanitized name>`. The root is
/// served statically under `/uploads`, so the returned URL is
/// `/uploads/resources/<file name>`.
#[derive(Clone, Debug)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resources_dir(&self) -> PathBuf {
        self.root.join(RESOURCES_DIR)
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_ready(&self) -> Result<(), String> {
        tokio::fs::create_dir_all(self.resources_dir())
            .await
            .map_err(|e| format!("Failed to create {}: {e}", self.resources_dir().display()))
    }

    async fn store_resource_file(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, String> {
        self.ensure_ready().await?;

        let filename = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(original_name)
        );
        let path = self.resources_dir().join(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored uploaded file");

        Ok(StoredFile {
            url: format!("/uploads/{RESOURCES_DIR}/{filename}"),
            filename,
        })
    }
}

/// sanitize_filename
///
/// Replaces every character outside `[A-Za-z0-9.-]` with `_`. Path separators
/// are among the replaced characters, so the result is always a single path
/// segment.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "upload.pdf".to_string()
    } else {
        sanitized
    }
}

/// Checks the declared content type and the size of an upload.
pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), String> {
    if content_type != Some(PDF_CONTENT_TYPE) {
        return Err("Only PDF files are allowed".to_string());
    }
    if size > MAX_UPLOAD_BYTES {
        return Err("File size must be less than 10MB".to_string());
    }
    Ok(())
}

// 3. The Mock Implementation (For Tests)
/// MockStorageService
///
/// Writes nothing. Returns the URL the disk store would have produced, or a
/// simulated failure when `should_fail` is set.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_ready(&self) -> Result<(), String> {
        Ok(())
    }

    async fn store_resource_file(
        &self,
        original_name: &str,
        _bytes: &[u8],
    ) -> Result<StoredFile, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }
        let filename = format!("0_{}", sanitize_filename(original_name));
        Ok(StoredFile {
            url: format!("/uploads/{RESOURCES_DIR}/{filename}"),
            filename,
        })
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
