use ml_roadmap::storage::{
    LocalDiskStorage, MAX_UPLOAD_BYTES, MockStorageService, PDF_CONTENT_TYPE, StorageService,
    sanitize_filename, validate_upload,
};

#[test]
fn test_sanitize_filename_keeps_safe_characters() {
    assert_eq!(sanitize_filename("lecture-01.pdf"), "lecture-01.pdf");
    assert_eq!(sanitize_filename("My Notes (v2).pdf"), "My_Notes__v2_.pdf");
    assert_eq!(sanitize_filename("Ünite 1.pdf"), "_nite_1.pdf");
}

#[test]
fn test_sanitize_filename_flattens_paths() {
    let sanitized = sanitize_filename("../../etc/passwd");
    assert!(!sanitized.contains('/'));
    assert_eq!(sanitized, ".._.._etc_passwd");
    assert_eq!(sanitize_filename(""), "upload.pdf");
}

#[test]
fn test_validate_upload_accepts_pdf_up_to_limit() {
    assert!(validate_upload(Some(PDF_CONTENT_TYPE), 1024).is_ok());
    assert!(validate_upload(Some(PDF_CONTENT_TYPE), MAX_UPLOAD_BYTES).is_ok());
}

#[test]
fn test_validate_upload_rejects_other_types_and_oversize() {
    assert_eq!(
        validate_upload(Some("image/png"), 10).unwrap_err(),
        "Only PDF files are allowed"
    );
    assert!(validate_upload(None, 10).is_err());
    assert_eq!(
        validate_upload(Some(PDF_CONTENT_TYPE), MAX_UPLOAD_BYTES + 1).unwrap_err(),
        "File size must be less than 10MB"
    );
}

#[tokio::test]
async fn test_local_disk_storage_writes_under_resources() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalDiskStorage::new(dir.path());
    storage.ensure_ready().await.unwrap();
    assert!(dir.path().join("resources").is_dir());

    let stored = storage
        .store_resource_file("week 1.pdf", b"%PDF-1.4 test")
        .await
        .unwrap();

    assert!(stored.filename.ends_with("_week_1.pdf"));
    assert_eq!(stored.url, format!("/uploads/resources/{}", stored.filename));

    let written = std::fs::read(dir.path().join("resources").join(&stored.filename)).unwrap();
    assert_eq!(written, b"%PDF-1.4 test");
}

#[tokio::test]
async fn test_local_disk_storage_creates_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalDiskStorage::new(dir.path().join("nested").join("uploads"));

    let stored = storage.store_resource_file("a.pdf", b"x").await.unwrap();
    assert!(stored.url.starts_with("/uploads/resources/"));
}

#[tokio::test]
async fn test_mock_storage_mirrors_disk_urls() {
    let stored = MockStorageService::new()
        .store_resource_file("slides.pdf", b"")
        .await
        .unwrap();
    assert_eq!(stored.filename, "0_slides.pdf");
    assert_eq!(stored.url, "/uploads/resources/0_slides.pdf");
}

#[tokio::test]
async fn test_mock_storage_can_fail() {
    let result = MockStorageService::new_failing()
        .store_resource_file("slides.pdf", b"")
        .await;
    assert!(result.is_err());
}
