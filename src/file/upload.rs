//! File upload pipeline.
//!
//! An upload moves through `Validating -> Storing -> PersistingMetadata ->
//! Committed`. A failure after bytes reach the disk removes them again
//! (`RolledBack`), so no stored file outlives a failed upload and no row
//! points at a missing payload.

use std::fmt;
use std::path::PathBuf;

use sqlx::SqlitePool;
use tracing::{debug, error, info, Instrument};

use super::layout::FilesystemLayout;
use super::metadata::{FileMetadata, FileRepository, NewFile};
use super::store::FolderStore;
use super::{ALLOWED_CONTENT_TYPES, MAX_FILENAME_LENGTH, MAX_UPLOAD_SIZE};
use crate::{CabinetError, Result};

/// Stage of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Checking type and size.
    Validating,
    /// Writing bytes to disk.
    Storing,
    /// Recording the file row.
    PersistingMetadata,
    /// Bytes and row are both in place.
    Committed,
    /// A later stage failed and stored bytes were removed.
    RolledBack,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Validating => "validating",
            UploadStage::Storing => "storing",
            UploadStage::PersistingMetadata => "persisting_metadata",
            UploadStage::Committed => "committed",
            UploadStage::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// An incoming file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Filename as sent by the client.
    pub filename: String,
    /// Declared content type.
    pub content_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content,
        }
    }
}

/// Where a payload was written.
#[derive(Debug, Clone)]
pub struct StoredRef {
    /// Name on disk.
    pub stored_name: String,
    /// Path relative to the upload root.
    pub storage_path: String,
    /// Absolute path.
    pub path: PathBuf,
}

/// Normalize a content type: parameters dropped, lowercased.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Reduce a client filename to its last path segment.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Validate content type and size against the upload policy.
///
/// Returns the normalized content type.
pub fn validate(content_type: &str, size: u64) -> Result<String> {
    let content_type = normalize_content_type(content_type);
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(CabinetError::UnsupportedType(content_type));
    }
    if size > MAX_UPLOAD_SIZE {
        return Err(CabinetError::TooLarge {
            size,
            max: MAX_UPLOAD_SIZE,
        });
    }
    if size == 0 {
        return Err(CabinetError::Validation("file is empty".to_string()));
    }
    Ok(content_type)
}

fn validate_filename(filename: &str) -> Result<String> {
    let filename = sanitize_filename(filename);
    if filename.is_empty() {
        return Err(CabinetError::Validation("filename is required".to_string()));
    }
    if filename.chars().count() > MAX_FILENAME_LENGTH {
        return Err(CabinetError::Validation(format!(
            "filename must be at most {MAX_FILENAME_LENGTH} characters"
        )));
    }
    Ok(filename)
}

/// Upload pipeline bound to a pool and a layout.
pub struct UploadPipeline<'a> {
    pool: &'a SqlitePool,
    layout: &'a FilesystemLayout,
}

impl<'a> UploadPipeline<'a> {
    /// Create a new UploadPipeline.
    pub fn new(pool: &'a SqlitePool, layout: &'a FilesystemLayout) -> Self {
        Self { pool, layout }
    }

    /// Write the payload under the folder's directory.
    ///
    /// A partially written file is removed before the error is returned.
    pub async fn store(
        &self,
        owner_id: i64,
        folder_id: i64,
        filename: &str,
        content_type: &str,
        content: &[u8],
    ) -> Result<StoredRef> {
        let dir = self.layout.folder_dir(owner_id, folder_id);
        self.layout.ensure_dir(&dir).await?;

        let stored_name = FilesystemLayout::unique_name(filename, content_type);
        let path = dir.join(&stored_name);

        if let Err(e) = self.layout.write(&dir, &stored_name, content).await {
            self.discard(&path).await;
            return Err(e);
        }

        Ok(StoredRef {
            storage_path: FilesystemLayout::relative_path(owner_id, folder_id, &stored_name),
            stored_name,
            path,
        })
    }

    /// Record the file row for a stored payload.
    pub async fn persist_metadata(
        &self,
        folder_id: i64,
        filename: &str,
        content_type: &str,
        size: u64,
        stored: &StoredRef,
    ) -> Result<FileMetadata> {
        let size = i64::try_from(size).map_err(|_| CabinetError::TooLarge {
            size,
            max: MAX_UPLOAD_SIZE,
        })?;

        FileRepository::new(self.pool)
            .create(&NewFile {
                folder_id,
                filename: filename.to_string(),
                stored_name: stored.stored_name.clone(),
                storage_path: stored.storage_path.clone(),
                content_type: content_type.to_string(),
                size,
            })
            .await
    }

    /// Run the full pipeline for `owner_id` uploading into `folder_id`.
    ///
    /// Validation happens before the ownership check, and both happen
    /// before any disk I/O.
    pub async fn upload(
        &self,
        owner_id: i64,
        folder_id: i64,
        request: UploadRequest,
    ) -> Result<FileMetadata> {
        let span = tracing::debug_span!("upload", owner_id = owner_id, folder_id = folder_id);
        self.run(owner_id, folder_id, request).instrument(span).await
    }

    async fn run(&self, owner_id: i64, folder_id: i64, request: UploadRequest) -> Result<FileMetadata> {
        debug!(stage = %UploadStage::Validating, "Upload stage");
        let size = request.content.len() as u64;
        let content_type = validate(&request.content_type, size)?;
        let filename = validate_filename(&request.filename)?;

        let folder = FolderStore::new(self.pool, self.layout)
            .get(owner_id, folder_id)
            .await?;

        debug!(stage = %UploadStage::Storing, "Upload stage");
        let stored = self
            .store(owner_id, folder.id, &filename, &content_type, &request.content)
            .await
            .inspect_err(|_| debug!(stage = %UploadStage::RolledBack, "Upload stage"))?;

        debug!(stage = %UploadStage::PersistingMetadata, "Upload stage");
        match self
            .persist_metadata(folder.id, &filename, &content_type, size, &stored)
            .await
        {
            Ok(metadata) => {
                debug!(stage = %UploadStage::Committed, "Upload stage");
                info!(
                    owner_id = owner_id,
                    folder_id = folder.id,
                    file_id = metadata.id,
                    size = size,
                    "File uploaded"
                );
                Ok(metadata)
            }
            Err(e) => {
                self.discard(&stored.path).await;
                debug!(stage = %UploadStage::RolledBack, "Upload stage");
                Err(e)
            }
        }
    }

    /// Best-effort removal of a stored payload.
    async fn discard(&self, path: &std::path::Path) {
        if let Err(e) = self.layout.remove_file(path).await {
            error!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Database, FilesystemLayout, i64) {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        users.create(&NewUser::new("a@x.com", "h")).await.unwrap();
        users.create(&NewUser::new("b@x.com", "h")).await.unwrap();
        let layout = FilesystemLayout::new(dir.path());
        let folder = FolderStore::new(db.pool(), &layout)
            .create(1, "docs")
            .await
            .unwrap();
        (dir, db, layout, folder.id)
    }

    fn pdf() -> UploadRequest {
        UploadRequest::new("report.pdf", "application/pdf", b"%PDF-1.4 test".to_vec())
    }

    fn entries(layout: &FilesystemLayout, owner_id: i64, folder_id: i64) -> usize {
        std::fs::read_dir(layout.folder_dir(owner_id, folder_id))
            .map(|rd| rd.count())
            .unwrap_or(0)
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("Image/PNG"), "image/png");
        assert_eq!(
            normalize_content_type("application/pdf; charset=binary"),
            "application/pdf"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\a.png"), "a.png");
        assert_eq!(sanitize_filename("dir/"), "");
    }

    #[test]
    fn test_validate() {
        for ct in ALLOWED_CONTENT_TYPES {
            assert!(validate(ct, 1).is_ok());
        }
        assert!(matches!(
            validate("text/plain", 10),
            Err(CabinetError::UnsupportedType(_))
        ));
        assert!(matches!(
            validate("image/png", MAX_UPLOAD_SIZE + 1),
            Err(CabinetError::TooLarge { .. })
        ));
        assert!(validate("image/png", MAX_UPLOAD_SIZE).is_ok());
        assert!(matches!(
            validate("image/png", 0),
            Err(CabinetError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_commits() {
        let (_dir, db, layout, folder_id) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let file = pipeline.upload(1, folder_id, pdf()).await.unwrap();

        assert_eq!(file.folder_id, folder_id);
        assert_eq!(file.filename, "report.pdf");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.size, 13);
        assert!(file.storage_path.starts_with(&format!("1/{folder_id}/")));
        assert!(file.stored_name.ends_with(".pdf"));
        assert_eq!(layout.read(&file.storage_path).await.unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_unsupported_type_touches_nothing() {
        let (_dir, db, layout, folder_id) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let request = UploadRequest::new("notes.txt", "text/plain", b"hello".to_vec());
        let result = pipeline.upload(1, folder_id, request).await;

        assert!(matches!(result, Err(CabinetError::UnsupportedType(_))));
        assert!(!layout.folder_dir(1, folder_id).exists());
    }

    #[tokio::test]
    async fn test_too_large_touches_nothing() {
        let (_dir, db, layout, folder_id) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let content = vec![0u8; MAX_UPLOAD_SIZE as usize + 1];
        let request = UploadRequest::new("big.png", "image/png", content);
        let result = pipeline.upload(1, folder_id, request).await;

        assert!(matches!(result, Err(CabinetError::TooLarge { .. })));
        assert!(!layout.folder_dir(1, folder_id).exists());
    }

    #[tokio::test]
    async fn test_foreign_folder_touches_nothing() {
        let (_dir, db, layout, folder_id) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let result = pipeline.upload(2, folder_id, pdf()).await;

        assert!(matches!(result, Err(CabinetError::NotFound(_))));
        assert!(!layout.folder_dir(2, folder_id).exists());
        assert_eq!(entries(&layout, 1, folder_id), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_removes_stored_file() {
        let (_dir, db, layout, folder_id) = setup().await;
        sqlx::raw_sql(
            "CREATE TRIGGER reject_files BEFORE INSERT ON files
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let result = pipeline.upload(1, folder_id, pdf()).await;

        assert!(matches!(result, Err(CabinetError::Database(_))));
        assert_eq!(entries(&layout, 1, folder_id), 0);
    }

    #[tokio::test]
    async fn test_store_then_persist() {
        let (_dir, db, layout, folder_id) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let stored = pipeline
            .store(1, folder_id, "pic.gif", "image/gif", b"GIF89a")
            .await
            .unwrap();
        assert!(stored.path.exists());

        let file = pipeline
            .persist_metadata(folder_id, "pic.gif", "image/gif", 6, &stored)
            .await
            .unwrap();
        assert_eq!(file.storage_path, stored.storage_path);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_names() {
        let (_dir, db, layout, folder_id) = setup().await;
        let pipeline = UploadPipeline::new(db.pool(), &layout);

        let (a, b, c, d) = tokio::join!(
            pipeline.upload(1, folder_id, pdf()),
            pipeline.upload(1, folder_id, pdf()),
            pipeline.upload(1, folder_id, pdf()),
            pipeline.upload(1, folder_id, pdf())
        );
        let files = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];

        let names: std::collections::HashSet<_> =
            files.iter().map(|f| f.stored_name.as_str()).collect();
        assert_eq!(names.len(), 4);
        assert_eq!(entries(&layout, 1, folder_id), 4);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(UploadStage::PersistingMetadata.to_string(), "persisting_metadata");
        assert_eq!(UploadStage::RolledBack.to_string(), "rolled_back");
    }
}
