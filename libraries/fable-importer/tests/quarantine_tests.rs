//! Quarantine listing after real import sessions


use fable_importer::quarantine::{list_quarantined, load_quarantine_reasons};
use fable_importer::session::REASON_EXTRACTION_FAILED;
use fable_importer::{FileScanner, ImportService};
use fable_metadata::MetadataExtractor;
use test_helpers::{write_corrupt, Workspace};

#[tokio::test]
async fn test_quarantined_files_carry_their_reason() {
    let ws = Workspace::new();
    write_corrupt(&ws.config.import_dir, "Broken Book - Someone.epub");

    let service = ImportService::new(ws.config.clone());
    service.start_import(false).unwrap();
    service.wait().await;

    // A stray file dropped into quarantine by hand has no recorded reason
    write_corrupt(&ws.config.quarantine_dir, "stray.epub");

    let files = list_quarantined(
        &ws.config.quarantine_dir,
        service.log_store(),
        &MetadataExtractor::new(),
        &FileScanner::default(),
    )
    .unwrap();

    assert_eq!(files.len(), 2);

    let broken = &files[0];
    assert_eq!(broken.file_name, "Broken Book - Someone.epub");
    assert_eq!(broken.metadata.title, "Broken Book");
    assert_eq!(broken.metadata.author, "Someone");
    assert!(broken.file_size > 0);
    let reason = broken.reason.as_ref().unwrap();
    assert_eq!(reason.reason, REASON_EXTRACTION_FAILED);
    assert!(!reason.error_detail.is_empty());

    let stray = &files[1];
    assert_eq!(stray.file_name, "stray.epub");
    assert!(stray.reason.is_none());
}

#[tokio::test]
async fn test_dry_run_records_do_not_explain_quarantine() {
    let ws = Workspace::new();
    write_corrupt(&ws.config.import_dir, "bad.epub");

    let service = ImportService::new(ws.config.clone());
    service.start_import(true).unwrap();
    service.wait().await;

    assert!(load_quarantine_reasons(service.log_store()).is_empty());
}
